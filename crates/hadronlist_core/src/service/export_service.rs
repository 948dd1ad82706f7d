//! Export use-case service.
//!
//! # Responsibility
//! - Run the batch pipeline: load, validate, reduce, render, write.
//! - Render every requested file in memory before anything is written.
//!
//! # Invariants
//! - Any fatal error is raised before the first output file is touched.
//! - Output files appear through a temporary sibling and a rename; a
//!   failed rename restores the files that were already replaced.
//! - Two runs over the same input produce byte-identical files.

use crate::export::spectrum::{render_spectrum, SPECTRUM_FILE_NAME};
use crate::export::{export, ExportError, ExportFormat, ExportOptions, ExportResult};
use crate::model::catalog::Catalog;
use crate::reduce::{reduce_multibody, IntermediateStates, Reduction, UnmappedMultibody};
use crate::table::listing::parse_mass_order;
use crate::table::master::load_master;
use crate::table::read_text;
use crate::validate::{validate, ValidationPolicy, ValidationWarning};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Settings for one export run, usually built from command line flags.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    pub master: PathBuf,
    pub out_dir: PathBuf,
    /// Intermediate-state mapping; without one every multi-body channel is
    /// unmapped for SMASH.
    pub intermediates: Option<PathBuf>,
    /// Requested formats; empty means all of them.
    pub formats: Vec<ExportFormat>,
    /// Fail instead of dropping unmapped multi-body channels from SMASH output.
    pub strict_smash: bool,
    pub options: ExportOptions,
    pub policy: ValidationPolicy,
    /// Also write the mass spectrum table.
    pub spectrum: bool,
    /// Reference mass-ordered list shown next to the spectrum.
    pub compare: Option<PathBuf>,
}

impl ExportConfig {
    pub fn new(master: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            master: master.into(),
            out_dir: out_dir.into(),
            intermediates: None,
            formats: Vec::new(),
            strict_smash: false,
            options: ExportOptions::default(),
            policy: ValidationPolicy::default(),
            spectrum: false,
            compare: None,
        }
    }

    /// Requested formats without duplicates, in canonical order.
    pub fn effective_formats(&self) -> Vec<ExportFormat> {
        if self.formats.is_empty() {
            return ExportFormat::ALL.to_vec();
        }
        let mut formats = self.formats.clone();
        formats.sort_unstable();
        formats.dedup();
        formats
    }
}

/// A rendered output file that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub file_name: &'static str,
    pub contents: String,
}

/// Everything a run produced, before writing.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedExport {
    pub files: Vec<RenderedFile>,
    pub warnings: Vec<ValidationWarning>,
    pub unmapped: Vec<UnmappedMultibody>,
    pub particles: usize,
}

/// Outcome of [`ExportService::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub written: Vec<PathBuf>,
    pub warnings: Vec<ValidationWarning>,
    pub unmapped: Vec<UnmappedMultibody>,
    pub particles: usize,
}

/// Destination of rendered files.
pub trait OutputSink {
    /// Writes every file or none of them, returning the final paths.
    fn write_all(&self, files: &[RenderedFile]) -> ExportResult<Vec<PathBuf>>;
}

/// Writes into a directory via `.<name>.tmp` siblings renamed into place.
///
/// Existing files are moved to `.<name>.bak` while the new set is committed
/// and restored if any rename fails, so the directory holds either the
/// previous files or the complete new set.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn io_error(path: &Path, source: std::io::Error) -> ExportError {
        ExportError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl OutputSink for DirectorySink {
    fn write_all(&self, files: &[RenderedFile]) -> ExportResult<Vec<PathBuf>> {
        let created = !self.dir.exists();
        std::fs::create_dir_all(&self.dir).map_err(|err| Self::io_error(&self.dir, err))?;
        let abandon = |staged: &[StagedFile]| {
            for entry in staged {
                entry.discard();
            }
            if created {
                let _ = std::fs::remove_dir(&self.dir);
            }
        };

        let mut staged: Vec<StagedFile> = Vec::with_capacity(files.len());
        for file in files {
            let entry = StagedFile::new(&self.dir, file.file_name);
            if let Err(err) = std::fs::write(&entry.temp, &file.contents) {
                let temp = entry.temp.clone();
                staged.push(entry);
                abandon(&staged);
                return Err(Self::io_error(&temp, err));
            }
            staged.push(entry);
        }

        let mut committed: Vec<bool> = Vec::with_capacity(staged.len());
        for entry in &staged {
            match entry.commit() {
                Ok(backed_up) => committed.push(backed_up),
                Err(err) => {
                    for (done, backed_up) in staged[..committed.len()].iter().zip(&committed).rev() {
                        done.roll_back(*backed_up);
                    }
                    abandon(&staged[committed.len()..]);
                    warn!(
                        "event=export_write module=service status=rolled_back file={} committed={}",
                        entry.target.display(),
                        committed.len()
                    );
                    return Err(Self::io_error(&entry.target, err));
                }
            }
        }

        for (entry, backed_up) in staged.iter().zip(&committed) {
            entry.finish(*backed_up);
        }
        Ok(staged.into_iter().map(|entry| entry.target).collect())
    }
}

/// One output file between staging and commit.
struct StagedFile {
    target: PathBuf,
    temp: PathBuf,
    backup: PathBuf,
}

impl StagedFile {
    fn new(dir: &Path, file_name: &str) -> Self {
        Self {
            target: dir.join(file_name),
            temp: dir.join(format!(".{file_name}.tmp")),
            backup: dir.join(format!(".{file_name}.bak")),
        }
    }

    /// Renames the temporary file over the target; an existing regular file
    /// is moved to the backup first. Returns whether a backup was taken.
    fn commit(&self) -> std::io::Result<bool> {
        let backed_up = std::fs::symlink_metadata(&self.target)
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if backed_up {
            std::fs::rename(&self.target, &self.backup)?;
        }
        if let Err(err) = std::fs::rename(&self.temp, &self.target) {
            if backed_up {
                let _ = std::fs::rename(&self.backup, &self.target);
            }
            return Err(err);
        }
        Ok(backed_up)
    }

    fn roll_back(&self, backed_up: bool) {
        if backed_up {
            let _ = std::fs::rename(&self.backup, &self.target);
        } else {
            let _ = std::fs::remove_file(&self.target);
        }
    }

    fn discard(&self) {
        let _ = std::fs::remove_file(&self.temp);
    }

    fn finish(&self, backed_up: bool) {
        if backed_up {
            let _ = std::fs::remove_file(&self.backup);
        }
    }
}

/// Export service facade over an output sink.
pub struct ExportService<S: OutputSink> {
    sink: S,
}

impl<S: OutputSink> ExportService<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Loads the master table named by `config`, renders every requested
    /// file and writes them through the sink.
    pub fn run(&self, config: &ExportConfig) -> ExportResult<ExportSummary> {
        let catalog = load_master(&config.master)?;
        info!(
            "event=master_loaded module=service status=ok particles={} mothers={} path={}",
            catalog.len(),
            catalog.decay_table().len(),
            config.master.display()
        );
        let rendered = render_all(&catalog, config)?;
        let written = self.sink.write_all(&rendered.files)?;
        info!(
            "event=export_written module=service status=ok files={} out_dir={}",
            written.len(),
            config.out_dir.display()
        );
        Ok(ExportSummary {
            written,
            warnings: rendered.warnings,
            unmapped: rendered.unmapped,
            particles: rendered.particles,
        })
    }
}

/// Validates `catalog` and renders every file requested by `config`.
///
/// # Errors
/// - [`ExportError::Validation`] on physical inconsistencies.
/// - [`ExportError::Mapping`] for an invalid intermediate-state file.
/// - [`ExportError::UnmappedMultibody`] under `strict_smash`.
/// - Renderer errors such as [`ExportError::MissingParity`].
pub fn render_all(catalog: &Catalog, config: &ExportConfig) -> ExportResult<RenderedExport> {
    let model = validate(catalog, &config.policy)?;
    let formats = config.effective_formats();

    let reduction = if formats.iter().any(|format| format.is_smash()) {
        let states = match &config.intermediates {
            Some(path) => IntermediateStates::load(path)?,
            None => IntermediateStates::default(),
        };
        let reduction = reduce_multibody(&model.catalog, &states)?;
        if config.strict_smash && !reduction.unmapped.is_empty() {
            warn!(
                "event=export_render module=service status=error unmapped={}",
                reduction.unmapped.len()
            );
            return Err(ExportError::UnmappedMultibody(reduction.unmapped));
        }
        reduction
    } else {
        Reduction::default()
    };

    let mut files = Vec::with_capacity(formats.len() + 1);
    for format in formats {
        files.push(RenderedFile {
            file_name: format.file_name(),
            contents: export(&model.catalog, &reduction, format, &config.options)?,
        });
    }
    if config.spectrum {
        let reference = match &config.compare {
            Some(path) => Some(parse_mass_order(&read_text(path)?)?),
            None => None,
        };
        files.push(RenderedFile {
            file_name: SPECTRUM_FILE_NAME,
            contents: render_spectrum(&model.catalog, reference.as_deref()),
        });
    }

    info!(
        "event=export_render module=service status=ok files={} warnings={} unmapped={}",
        files.len(),
        model.warnings.len(),
        reduction.unmapped.len()
    );
    Ok(RenderedExport {
        files,
        particles: model.catalog.len(),
        warnings: model.warnings,
        unmapped: reduction.unmapped,
    })
}
