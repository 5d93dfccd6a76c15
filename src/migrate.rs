use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::ShapesError;

pub const MIGRATION_TOOL: &str = "simple-shapes-migrate";

/// Upgrades an unpacked dataset to the current on-disk schema. The
/// transformation itself lives outside this crate; callers only decide
/// whether and when to run it.
pub trait Migrator: Send + Sync {
    fn migrate(&self, dataset_path: &Path, dry_run: bool) -> Result<(), ShapesError>;
}

/// Runs the `simple-shapes-migrate` executable found on PATH.
#[derive(Debug, Clone)]
pub struct SystemMigrator {
    tool: Option<PathBuf>,
}

impl SystemMigrator {
    pub fn new() -> Self {
        Self {
            tool: find_in_path(MIGRATION_TOOL),
        }
    }

    pub fn with_tool(tool: PathBuf) -> Self {
        Self { tool: Some(tool) }
    }

    pub fn tool_available(&self) -> bool {
        self.tool.is_some()
    }
}

impl Default for SystemMigrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Migrator for SystemMigrator {
    fn migrate(&self, dataset_path: &Path, dry_run: bool) -> Result<(), ShapesError> {
        let tool = self
            .tool
            .as_ref()
            .ok_or_else(|| ShapesError::Migration(format!("{MIGRATION_TOOL} not found on PATH")))?;

        let mut cmd = Command::new(tool);
        cmd.arg(dataset_path);
        if dry_run {
            cmd.arg("--dry-run");
        }
        let output = cmd
            .output()
            .map_err(|err| ShapesError::Migration(err.to_string()))?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            format!("{MIGRATION_TOOL} exited with {}", output.status)
        } else {
            stderr
        };
        Err(ShapesError::Migration(message))
    }
}

fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for path in std::env::split_paths(&path_var) {
        let exe = path.join(format!("{name}.exe"));
        if exe.exists() {
            return Some(exe);
        }
        let plain = path.join(name);
        if plain.exists() {
            return Some(plain);
        }
    }
    None
}
