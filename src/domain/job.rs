use super::location::ObjectLocation;
use std::path::{Component, Path, PathBuf};

/// Prefix under which every published asset lands in the output bucket.
pub const DESTINATION_ROOT: &str = "processed";

/// Derive the job identifier from a source key: everything before the first `.`.
pub fn job_id(key: &str) -> &str {
    match key.find('.') {
        Some(idx) => &key[..idx],
        None => key,
    }
}

/// One transcoding job: the source object plus the scratch paths it owns.
#[derive(Debug, Clone)]
pub struct Job {
    pub source: ObjectLocation,
    /// Source key as configured; seeds the scratch names and the destination prefix.
    pub key: String,
    pub id: String,
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
}

impl Job {
    pub fn new(source: ObjectLocation, key: impl Into<String>, scratch_root: &Path) -> Self {
        let key = key.into();
        let path = Path::new(&key);
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "source".to_string());
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| file_name.clone());

        Self {
            source,
            id: job_id(&key).to_string(),
            input_path: scratch_root.join(&file_name),
            output_dir: scratch_root.join(format!("processed_{}", stem)),
            key,
        }
    }

    /// `processed/<key>`
    pub fn destination_prefix(&self) -> String {
        format!("{}/{}", DESTINATION_ROOT, self.key)
    }

    /// Destination key for a file at `relative` under the output directory.
    pub fn destination_key(&self, relative: &Path) -> String {
        let relative = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().to_string()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}", self.destination_prefix(), relative)
    }
}
