use std::fs::{self, File};
use std::path::{Component, Path};

use flate2::read::GzDecoder;
use tar::Archive;
use tempfile::TempDir;

use crate::error::ShapesError;
use crate::layout::atomic_rename_dir;

/// Unpacks a gzip-compressed tar archive into a fresh staging directory
/// created inside `parent`, so a later promotion into the final location is a
/// same-filesystem rename. The staging directory is removed when the returned
/// handle drops, which keeps failed extractions invisible.
pub fn unpack_archive(archive_path: &Path, parent: &Path) -> Result<TempDir, ShapesError> {
    let file = File::open(archive_path).map_err(|err| {
        ShapesError::Filesystem(format!("open archive {}: {err}", archive_path.display()))
    })?;
    let staging = tempfile::Builder::new()
        .prefix("simple-shapes-extract")
        .tempdir_in(parent)
        .map_err(|err| ShapesError::Filesystem(err.to_string()))?;

    let mut archive = Archive::new(GzDecoder::new(file));
    for entry in archive
        .entries()
        .map_err(|err| ShapesError::Archive(err.to_string()))?
    {
        let mut entry = entry.map_err(|err| ShapesError::Archive(err.to_string()))?;
        let member_path = entry
            .path()
            .map_err(|err| ShapesError::Archive(err.to_string()))?
            .into_owned();
        if !member_path_is_safe(&member_path) {
            return Err(ShapesError::PathTraversal(
                member_path.display().to_string(),
            ));
        }
        let unpacked = entry
            .unpack_in(staging.path())
            .map_err(|err| ShapesError::Archive(err.to_string()))?;
        if !unpacked {
            return Err(ShapesError::PathTraversal(
                member_path.display().to_string(),
            ));
        }
    }

    Ok(staging)
}

/// Moves every top-level entry of the staging directory into
/// `destination_root`, replacing same-named entries.
pub fn promote(staging: &Path, destination_root: &Path) -> Result<(), ShapesError> {
    let entries =
        fs::read_dir(staging).map_err(|err| ShapesError::Filesystem(err.to_string()))?;
    for entry in entries {
        let entry = entry.map_err(|err| ShapesError::Filesystem(err.to_string()))?;
        let target = destination_root.join(entry.file_name());
        if entry.path().is_dir() {
            atomic_rename_dir(&entry.path(), &target)
                .map_err(|err| ShapesError::Filesystem(err.to_string()))?;
        } else {
            if target.exists() {
                fs::remove_file(&target)
                    .map_err(|err| ShapesError::Filesystem(err.to_string()))?;
            }
            fs::rename(entry.path(), &target)
                .map_err(|err| ShapesError::Filesystem(err.to_string()))?;
        }
    }
    Ok(())
}

fn member_path_is_safe(path: &Path) -> bool {
    path.components().all(|component| {
        matches!(component, Component::Normal(_) | Component::CurDir)
    })
}
