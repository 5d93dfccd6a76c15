use crate::domain::{Variant, VariantDescriptor};
use crate::error::ShapesError;

// Mirror of https://zenodo.org/records/8112838/files/simple_shapes_dataset.tar.gz
const FULL_DATASET_URL: &str = "https://drive.usercontent.google.com/download?id=1gZt7xg2ZqUwo1kKZPghVz3DxY8Rm0epT&export=download&authuser=1&confirm=t&uuid=a6900eb0-76af-499a-bef0-b5906145e2bd&at=AEz70l5mWvxvYf-tvzzWb2S6zAiA:1740754052715";

const FULL_URL_ENV: &str = "SIMPLE_SHAPES_FULL_URL";
const LIGHT_URL_ENV: &str = "SIMPLE_SHAPES_LIGHT_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub url: String,
    pub expected_bytes: Option<u64>,
}

/// Table mapping variant tags to download sources, resolved once at startup.
/// A variant without an entry is an explicit error, never a fallback.
#[derive(Debug, Clone)]
pub struct Sources {
    full: Option<SourceEntry>,
    light: Option<SourceEntry>,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            full: Some(SourceEntry {
                url: FULL_DATASET_URL.to_string(),
                expected_bytes: None,
            }),
            // No light archive is published yet.
            light: None,
        }
    }
}

impl Sources {
    pub fn new(full: Option<SourceEntry>, light: Option<SourceEntry>) -> Self {
        Self { full, light }
    }

    /// Built-in table with per-variant URL overrides taken from the
    /// environment.
    pub fn from_env() -> Self {
        let mut sources = Self::default();
        if let Some(url) = env_url(FULL_URL_ENV) {
            sources.full = Some(SourceEntry {
                url,
                expected_bytes: None,
            });
        }
        if let Some(url) = env_url(LIGHT_URL_ENV) {
            sources.light = Some(SourceEntry {
                url,
                expected_bytes: None,
            });
        }
        sources
    }

    pub fn resolve(&self, variant: Variant) -> Result<VariantDescriptor, ShapesError> {
        let entry = match variant {
            Variant::Full => self.full.as_ref(),
            Variant::Light => self.light.as_ref(),
        };
        let entry = entry.ok_or_else(|| ShapesError::UnknownVariant(variant.to_string()))?;
        Ok(VariantDescriptor {
            variant,
            url: entry.url.clone(),
            expected_bytes: entry.expected_bytes,
        })
    }
}

fn env_url(name: &str) -> Option<String> {
    let value = std::env::var(name).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}
