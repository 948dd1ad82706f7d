//! `hadronlist` command line entry point.
//!
//! # Responsibility
//! - Parse flags, initialize logging, and dispatch to core services.
//! - Report warnings and summaries on stderr; exit non-zero on fatal errors.

mod args;

use args::{CheckArgs, Cli, Command, ExportArgs, SuggestArgs};
use clap::Parser;
use hadronlist_core::{
    check_files, default_log_level, init_logging, load_master, suggest_intermediates,
    DirectorySink, ExportService,
};
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    if let Err(err) = init_logging(level, cli.log_dir.as_deref()) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    let outcome = match cli.command {
        Command::Export(args) => run_export(args),
        Command::Check(args) => run_check(&args),
        Command::SuggestIntermediates(args) => run_suggest(&args),
    };
    match outcome {
        Ok(code) => code,
        Err(message) => {
            error!("event=cli_exit module=cli status=error");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run_export(args: ExportArgs) -> Result<ExitCode, String> {
    let config = args.into_config();
    let service = ExportService::new(DirectorySink::new(&config.out_dir));
    let summary = service.run(&config).map_err(|err| err.to_string())?;

    for warning in &summary.warnings {
        eprintln!("warning: {warning}");
    }
    for record in &summary.unmapped {
        eprintln!("warning: {record}");
    }
    eprintln!(
        "exported {} particles into {} files ({} warnings, {} unmapped multi-body channels)",
        summary.particles,
        summary.written.len(),
        summary.warnings.len(),
        summary.unmapped.len()
    );
    for path in &summary.written {
        eprintln!("  {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}

fn run_check(args: &CheckArgs) -> Result<ExitCode, String> {
    let report =
        check_files(&args.plist, &args.decays, &args.options()).map_err(|err| err.to_string())?;

    for finding in &report.warnings {
        eprintln!("warning: {finding}");
    }
    for finding in &report.errors {
        eprintln!("error: {finding}");
    }
    eprintln!(
        "checked {} decay blocks: {} errors, {} warnings",
        report.blocks,
        report.errors.len(),
        report.warnings.len()
    );
    Ok(if report.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_suggest(args: &SuggestArgs) -> Result<ExitCode, String> {
    let catalog = load_master(&args.master).map_err(|err| err.to_string())?;
    let states = suggest_intermediates(&catalog);
    let json = states.to_json_pretty().map_err(|err| err.to_string())?;
    if let Some(parent) = args.out.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create `{}`: {err}", parent.display()))?;
    }
    std::fs::write(&args.out, json)
        .map_err(|err| format!("failed to write `{}`: {err}", args.out.display()))?;
    eprintln!(
        "suggested {} intermediate-state mappings into {}",
        states.len(),
        args.out.display()
    );
    Ok(ExitCode::SUCCESS)
}
