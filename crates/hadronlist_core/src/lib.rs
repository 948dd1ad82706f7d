//! Core domain logic for the hadron list exporter.
//! This crate is the single source of truth for physics invariants.

pub mod export;
pub mod logging;
pub mod model;
pub mod reduce;
pub mod service;
pub mod table;
pub mod validate;

pub use export::{
    export, ExportError, ExportFormat, ExportOptions, ExportResult, StatisticsConvention,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::catalog::{Catalog, DecayTable};
pub use model::decay::DecayChannel;
pub use model::particle::{Charges, HalfInt, Parity, Particle, Pid};
pub use reduce::{
    reduce_multibody, suggest_intermediates, ChannelMapping, IntermediateStates, MappingError,
    Product, ReducedChannel, Reduction, UnmappedMultibody,
};
pub use service::check_service::{
    check_files, check_lists, CheckError, CheckFinding, CheckOptions, CheckReport,
};
pub use service::export_service::{
    render_all, DirectorySink, ExportConfig, ExportService, ExportSummary, OutputSink,
    RenderedExport, RenderedFile,
};
pub use table::master::{load_master, parse_master};
pub use table::{ParseError, ParseResult};
pub use validate::{
    validate, ConservationError, ValidatedModel, ValidationPolicy, ValidationWarning, Violation,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
