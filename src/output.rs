use std::io::{self, Write};

use serde::Serialize;

use crate::app::{DownloadResult, MigrationOutcome, ProgressEvent, ProgressSink};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

/// Machine-readable result printing for `--non-interactive` runs. Progress
/// events are swallowed so stdout stays valid JSON.
pub struct JsonOutput;

impl JsonOutput {
    pub fn print_download(result: &DownloadResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

/// Plain console sink: stage messages on their own lines, transfer progress
/// on a single rewritten line.
pub struct ConsoleOutput;

impl ConsoleOutput {
    pub fn print_download(result: &DownloadResult) {
        match &result.migration {
            MigrationOutcome::Migrated => {
                println!("Dataset ready at {} (migrated).", result.dataset_path);
            }
            MigrationOutcome::Skipped => {
                println!("Dataset ready at {}.", result.dataset_path);
            }
            MigrationOutcome::Failed { reason } => {
                println!(
                    "Dataset ready at {}, but migration failed: {reason}",
                    result.dataset_path
                );
            }
        }
    }
}

impl ProgressSink for ConsoleOutput {
    fn event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Stage { message } => println!("{message}"),
            ProgressEvent::Transfer {
                bytes_transferred,
                total_bytes,
            } => {
                let mut stderr = io::stderr();
                let line = match total_bytes {
                    Some(total) if total > 0 => format!(
                        "\rdownloaded {} / {} ({}%)",
                        human_bytes(bytes_transferred),
                        human_bytes(total),
                        bytes_transferred * 100 / total
                    ),
                    _ => format!("\rdownloaded {}", human_bytes(bytes_transferred)),
                };
                let _ = stderr.write_all(line.as_bytes());
                let _ = stderr.flush();
            }
        }
    }
}

fn human_bytes(value: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = value as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{value} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
