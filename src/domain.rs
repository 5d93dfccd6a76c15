use std::fmt;

use serde::Serialize;

/// Named flavor of the dataset, each with its own remote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Full,
    Light,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Full => write!(f, "full"),
            Variant::Light => write!(f, "light"),
        }
    }
}

/// Resolved download source for one variant. Immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantDescriptor {
    pub variant: Variant,
    pub url: String,
    pub expected_bytes: Option<u64>,
}

/// On-disk state of the dataset directory. Existence only; a directory left
/// behind by an interrupted extraction never reaches the final location, so
/// Present means a completed unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetState {
    Absent,
    Present,
}
