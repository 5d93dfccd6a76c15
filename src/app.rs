use serde::Serialize;

use crate::config::Sources;
use crate::domain::{DatasetState, Variant};
use crate::error::ShapesError;
use crate::extract;
use crate::fetch::Fetcher;
use crate::layout::DatasetLayout;
use crate::migrate::Migrator;

#[derive(Debug, Clone, Copy)]
pub struct DownloadOptions {
    pub force: bool,
    pub skip_migration: bool,
    pub variant: Variant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadAction {
    SkippedExisting,
    Downloaded,
    Replaced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MigrationOutcome {
    Migrated,
    Skipped,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadResult {
    pub variant: Variant,
    pub dataset_path: String,
    pub action: DownloadAction,
    pub migration: MigrationOutcome,
}

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Stage {
        message: String,
    },
    Transfer {
        bytes_transferred: u64,
        total_bytes: Option<u64>,
    },
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Clone)]
pub struct App<F: Fetcher, M: Migrator> {
    sources: Sources,
    fetcher: F,
    migrator: M,
}

impl<F: Fetcher, M: Migrator> App<F, M> {
    pub fn new(sources: Sources, fetcher: F, migrator: M) -> Self {
        Self {
            sources,
            fetcher,
            migrator,
        }
    }

    /// Runs the acquisition pipeline: inspect, resolve, fetch, extract,
    /// migrate. The old dataset directory is only removed once a replacement
    /// has been fully staged, so a failed fetch never loses data.
    pub fn download(
        &self,
        layout: &DatasetLayout,
        options: DownloadOptions,
        sink: &dyn ProgressSink,
    ) -> Result<DownloadResult, ShapesError> {
        sink.event(ProgressEvent::Stage {
            message: format!("Downloading in {}.", layout.root()),
        });

        let state = layout.inspect()?;
        if state == DatasetState::Present && !options.force {
            sink.event(ProgressEvent::Stage {
                message: "Dataset already exists. Skipping download. \
                          Use `--force` to download anyway."
                    .to_string(),
            });
            return Ok(DownloadResult {
                variant: options.variant,
                dataset_path: layout.dataset_dir().to_string(),
                action: DownloadAction::SkippedExisting,
                migration: MigrationOutcome::Skipped,
            });
        }

        // Resolve before anything destructive, so an unconfigured variant
        // can never cost an existing dataset.
        let descriptor = self.sources.resolve(options.variant)?;
        let replacing = state == DatasetState::Present;
        if replacing {
            sink.event(ProgressEvent::Stage {
                message: "Dataset already exists. Re-downloading.".to_string(),
            });
        }

        layout.ensure_root()?;
        let archive = layout.archive_path();
        if let Err(err) = self
            .fetcher
            .fetch(&descriptor, archive.as_std_path(), sink)
        {
            let _ = layout.remove_archive();
            return Err(err);
        }

        sink.event(ProgressEvent::Stage {
            message: "Extracting archive...".to_string(),
        });
        let staged = extract::unpack_archive(archive.as_std_path(), layout.root().as_std_path());
        layout.remove_archive()?;
        let staged = staged?;

        if replacing {
            layout.remove_dataset_dir()?;
        }
        extract::promote(staged.path(), layout.root().as_std_path())?;
        drop(staged);

        let dataset_dir = layout.dataset_dir();
        if layout.inspect()? != DatasetState::Present {
            return Err(ShapesError::ExtractionIncomplete(
                dataset_dir.into_std_path_buf(),
            ));
        }

        let migration = if options.skip_migration {
            MigrationOutcome::Skipped
        } else {
            sink.event(ProgressEvent::Stage {
                message: "Migrating dataset...".to_string(),
            });
            match self.migrator.migrate(dataset_dir.as_std_path(), false) {
                Ok(()) => MigrationOutcome::Migrated,
                Err(err) => {
                    tracing::warn!(error = %err, "migration failed, dataset kept as extracted");
                    MigrationOutcome::Failed {
                        reason: err.to_string(),
                    }
                }
            }
        };

        Ok(DownloadResult {
            variant: options.variant,
            dataset_path: dataset_dir.to_string(),
            action: if replacing {
                DownloadAction::Replaced
            } else {
                DownloadAction::Downloaded
            },
            migration,
        })
    }
}
