//! Domain model for hadron species and their decay channels.
//!
//! # Responsibility
//! - Define the particle and decay channel records shared by every stage.
//! - Own the in-memory catalog produced by the master-table loader.
//!
//! # Invariants
//! - A `Catalog` is never mutated after construction; filtering stages
//!   build a new catalog.
//! - Half-integer quantum numbers are stored exactly (doubled integers).

pub mod catalog;
pub mod decay;
pub mod particle;
