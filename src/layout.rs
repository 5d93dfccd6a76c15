use std::fs;
use std::io;
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};

use crate::domain::DatasetState;
use crate::error::ShapesError;

pub const DATASET_DIR_NAME: &str = "simple_shapes_dataset";
pub const ARCHIVE_NAME: &str = "simple_shapes_dataset.tar.gz";

/// Derived paths for one invocation: the user-supplied root, the dataset
/// directory under it and the staging archive next to it.
#[derive(Debug, Clone)]
pub struct DatasetLayout {
    root: Utf8PathBuf,
}

impl DatasetLayout {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn current_dir() -> Result<Self, ShapesError> {
        let cwd = std::env::current_dir().map_err(|err| ShapesError::Filesystem(err.to_string()))?;
        let root = Utf8PathBuf::from_path_buf(cwd)
            .map_err(|_| ShapesError::Filesystem("non-utf8 working directory".to_string()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn dataset_dir(&self) -> Utf8PathBuf {
        self.root.join(DATASET_DIR_NAME)
    }

    pub fn archive_path(&self) -> Utf8PathBuf {
        self.root.join(ARCHIVE_NAME)
    }

    pub fn ensure_root(&self) -> Result<(), ShapesError> {
        fs::create_dir_all(self.root.as_std_path())
            .map_err(|err| ShapesError::Filesystem(err.to_string()))
    }

    pub fn inspect(&self) -> Result<DatasetState, ShapesError> {
        match self.dataset_dir().as_std_path().try_exists() {
            Ok(true) => Ok(DatasetState::Present),
            Ok(false) => Ok(DatasetState::Absent),
            Err(err) => Err(ShapesError::Filesystem(err.to_string())),
        }
    }

    pub fn remove_dataset_dir(&self) -> Result<(), ShapesError> {
        let dir = self.dataset_dir();
        if dir.as_std_path().exists() {
            fs::remove_dir_all(dir.as_std_path())
                .map_err(|err| ShapesError::Filesystem(err.to_string()))?;
        }
        Ok(())
    }

    pub fn remove_archive(&self) -> Result<(), ShapesError> {
        let archive = self.archive_path();
        if archive.as_std_path().exists() {
            fs::remove_file(archive.as_std_path())
                .map_err(|err| ShapesError::Filesystem(err.to_string()))?;
        }
        Ok(())
    }
}

pub fn atomic_rename_dir(from: &Path, to: &Path) -> io::Result<()> {
    if to.exists() {
        fs::remove_dir_all(to)?;
    }
    fs::rename(from, to)
}
