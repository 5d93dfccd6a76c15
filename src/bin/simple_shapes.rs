use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use simple_shapes_dataset::app::{
    App, DownloadAction, DownloadOptions, DownloadResult, MigrationOutcome,
};
use simple_shapes_dataset::config::Sources;
use simple_shapes_dataset::domain::Variant;
use simple_shapes_dataset::error::ShapesError;
use simple_shapes_dataset::fetch::HttpFetcher;
use simple_shapes_dataset::layout::DatasetLayout;
use simple_shapes_dataset::migrate::SystemMigrator;
use simple_shapes_dataset::output::{ConsoleOutput, JsonOutput, OutputMode};

#[derive(Parser)]
#[command(name = "simple-shapes")]
#[command(about = "Acquire the precomputed simple shapes dataset")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Download precomputed dataset")]
    Download(DownloadArgs),
}

#[derive(Args)]
struct DownloadArgs {
    /// Where to download the dataset.
    #[arg(long, short = 'p', default_value = ".")]
    path: String,

    /// Force download, even if the dataset is already downloaded.
    #[arg(long)]
    force: bool,

    /// Skip migration of the dataset. Useful if you need the old version.
    #[arg(long)]
    no_migration: bool,

    /// Download the reduced-size variant instead of the full dataset.
    #[arg(long)]
    light: bool,
}

// Exit codes, one per outcome class:
// 0 success, 1 other failure, 2 dataset already present (no-op),
// 3 unknown variant, 4 network failure, 5 archive/extraction failure,
// 6 migration failed but dataset usable.
//
// The error is mapped before it is handed to miette, so the code never
// collapses to the generic 1.
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            let code = map_exit_code(&error);
            eprintln!("{:?}", miette::Report::new(error));
            ExitCode::from(code)
        }
    }
}

fn map_exit_code(error: &ShapesError) -> u8 {
    match error {
        ShapesError::UnknownVariant(_) => 3,
        ShapesError::Http(_)
        | ShapesError::HttpStatus { .. }
        | ShapesError::TruncatedDownload { .. } => 4,
        ShapesError::Archive(_)
        | ShapesError::PathTraversal(_)
        | ShapesError::ExtractionIncomplete(_) => 5,
        ShapesError::Migration(_) => 6,
        ShapesError::Filesystem(_) => 1,
    }
}

fn result_exit_code(result: &DownloadResult) -> u8 {
    if matches!(result.migration, MigrationOutcome::Failed { .. }) {
        return 6;
    }
    match result.action {
        DownloadAction::SkippedExisting => 2,
        DownloadAction::Downloaded | DownloadAction::Replaced => 0,
    }
}

fn run(cli: Cli) -> Result<ExitCode, ShapesError> {
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    match cli.command {
        Commands::Download(args) => run_download(args, output_mode),
    }
}

fn run_download(args: DownloadArgs, output_mode: OutputMode) -> Result<ExitCode, ShapesError> {
    let layout = if args.path == "." {
        DatasetLayout::current_dir()?
    } else {
        DatasetLayout::new(args.path.into())
    };

    let options = DownloadOptions {
        force: args.force,
        skip_migration: args.no_migration,
        variant: if args.light {
            Variant::Light
        } else {
            Variant::Full
        },
    };

    let fetcher = HttpFetcher::new()?;
    let migrator = SystemMigrator::new();
    let app = App::new(Sources::from_env(), fetcher, migrator);

    let result = match output_mode {
        OutputMode::NonInteractive => {
            let result = app.download(&layout, options, &JsonOutput)?;
            JsonOutput::print_download(&result)
                .map_err(|err| ShapesError::Filesystem(err.to_string()))?;
            result
        }
        OutputMode::Interactive => {
            let sink = ConsoleOutput;
            let result = app.download(&layout, options, &sink)?;
            eprintln!();
            ConsoleOutput::print_download(&result);
            result
        }
    };

    Ok(ExitCode::from(result_exit_code(&result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn every_error_class_has_its_exit_code() {
        assert_eq!(map_exit_code(&ShapesError::UnknownVariant("light".into())), 3);
        assert_eq!(map_exit_code(&ShapesError::Http("refused".into())), 4);
        assert_eq!(
            map_exit_code(&ShapesError::HttpStatus {
                status: 404,
                url: "https://example.org/a.tar.gz".into(),
            }),
            4
        );
        assert_eq!(
            map_exit_code(&ShapesError::TruncatedDownload {
                received: 10,
                expected: 100,
            }),
            4
        );
        assert_eq!(map_exit_code(&ShapesError::Archive("bad gzip".into())), 5);
        assert_eq!(map_exit_code(&ShapesError::PathTraversal("../x".into())), 5);
        assert_eq!(
            map_exit_code(&ShapesError::ExtractionIncomplete(PathBuf::from("/tmp/d"))),
            5
        );
        assert_eq!(map_exit_code(&ShapesError::Migration("old schema".into())), 6);
        assert_eq!(map_exit_code(&ShapesError::Filesystem("denied".into())), 1);
    }

    #[test]
    fn unresolved_variant_maps_to_configuration_code() {
        // The same error the download path produces for `--light` with no
        // configured source.
        let err = Sources::default().resolve(Variant::Light).unwrap_err();
        assert_eq!(map_exit_code(&err), 3);
    }

    #[test]
    fn result_codes_cover_success_noop_and_migration_failure() {
        let mut result = DownloadResult {
            variant: Variant::Full,
            dataset_path: "/data/simple_shapes_dataset".into(),
            action: DownloadAction::Downloaded,
            migration: MigrationOutcome::Migrated,
        };
        assert_eq!(result_exit_code(&result), 0);

        result.action = DownloadAction::Replaced;
        result.migration = MigrationOutcome::Skipped;
        assert_eq!(result_exit_code(&result), 0);

        result.action = DownloadAction::SkippedExisting;
        assert_eq!(result_exit_code(&result), 2);

        result.action = DownloadAction::Downloaded;
        result.migration = MigrationOutcome::Failed {
            reason: "unsupported schema".into(),
        };
        assert_eq!(result_exit_code(&result), 6);
    }
}
