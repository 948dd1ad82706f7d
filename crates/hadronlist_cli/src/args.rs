use clap::{Args, Parser, Subcommand};
use hadronlist_core::{
    CheckOptions, ExportConfig, ExportFormat, ExportOptions, StatisticsConvention,
    ValidationPolicy,
};
use std::path::PathBuf;

/// Hadron list exporter - PDG master table to Thermal-FIST and SMASH inputs
#[derive(Parser, Debug)]
#[command(name = "hadronlist")]
#[command(version)]
#[command(about = "Export a PDG hadron master table to transport and thermal model inputs", long_about = None)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Also write rotating log files into this directory
    #[arg(long = "log-dir", global = true)]
    pub log_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate the master table and write the requested lists
    Export(ExportArgs),
    /// Check an existing Thermal-FIST particle list and decay table pair
    Check(CheckArgs),
    /// Write a candidate intermediate-state mapping for multi-body channels
    SuggestIntermediates(SuggestArgs),
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Master table (particles and decays sections)
    #[arg(long = "master")]
    pub master: PathBuf,

    /// Output directory
    #[arg(long = "out", default_value = "output")]
    pub out: PathBuf,

    /// Intermediate-state mapping (JSON) for multi-body channels
    #[arg(long = "intermediates")]
    pub intermediates: Option<PathBuf>,

    /// Format to write; repeat for several (default: all)
    #[arg(long = "format")]
    pub formats: Vec<ExportFormat>,

    /// Fail when a multi-body channel has no intermediate state
    #[arg(long = "strict-smash")]
    pub strict_smash: bool,

    /// Encode Thermal-FIST statistics as -1 boson / +1 fermion
    #[arg(long = "signed-statistics")]
    pub signed_statistics: bool,

    /// Relative tolerance on branching ratio sums
    #[arg(long = "br-tolerance", default_value_t = hadronlist_core::validate::DEFAULT_BR_TOLERANCE)]
    pub br_tolerance: f64,

    /// Q-value (GeV) below which a channel is reported as marginal
    #[arg(long = "marginal-margin", default_value_t = hadronlist_core::validate::DEFAULT_MARGINAL_MARGIN)]
    pub marginal_margin: f64,

    /// Also write the mass spectrum table
    #[arg(long = "plot")]
    pub plot: bool,

    /// Reference mass-ordered list shown next to the spectrum
    #[arg(long = "compare", requires = "plot")]
    pub compare: Option<PathBuf>,
}

impl ExportArgs {
    pub fn into_config(self) -> ExportConfig {
        let statistics = if self.signed_statistics {
            StatisticsConvention::Signed
        } else {
            StatisticsConvention::ZeroOne
        };
        ExportConfig {
            intermediates: self.intermediates,
            formats: self.formats,
            strict_smash: self.strict_smash,
            options: ExportOptions { statistics },
            policy: ValidationPolicy {
                br_rel_tolerance: self.br_tolerance,
                marginal_margin: self.marginal_margin,
            },
            spectrum: self.plot,
            compare: self.compare,
            ..ExportConfig::new(self.master, self.out)
        }
    }
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Thermal-FIST particle list
    #[arg(long = "plist")]
    pub plist: PathBuf,

    /// Thermal-FIST decay table
    #[arg(long = "decays")]
    pub decays: PathBuf,

    /// Absolute tolerance on branching ratio sums
    #[arg(long = "abs-tol-br", default_value_t = hadronlist_core::service::check_service::DEFAULT_ABS_TOL_BR)]
    pub abs_tol_br: f64,

    /// Relative tolerance on branching ratio sums
    #[arg(long = "rel-tol-br", default_value_t = hadronlist_core::service::check_service::DEFAULT_REL_TOL_BR)]
    pub rel_tol_br: f64,

    /// Treat decays of a stable particle as an error
    #[arg(long = "strict-stable")]
    pub strict_stable: bool,

    /// Only check electric charge, not B, S and C
    #[arg(long = "no-bscc")]
    pub no_bscc: bool,
}

impl CheckArgs {
    pub fn options(&self) -> CheckOptions {
        CheckOptions {
            abs_tol_br: self.abs_tol_br,
            rel_tol_br: self.rel_tol_br,
            strict_stable: self.strict_stable,
            check_bscc: !self.no_bscc,
        }
    }
}

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Master table (particles and decays sections)
    #[arg(long = "master")]
    pub master: PathBuf,

    /// Where to write the suggested mapping
    #[arg(long = "out")]
    pub out: PathBuf,
}
