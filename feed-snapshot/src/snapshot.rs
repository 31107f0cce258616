use crate::types::{AggregatorError, Result, Snapshot, SourcesFile};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Read and decode the sources file.
pub fn load_sources(path: &Path) -> Result<SourcesFile> {
    let raw = fs::read_to_string(path)?;
    let sources: SourcesFile = serde_json::from_str(&raw)?;
    debug!(
        "Loaded {} categories from {}",
        sources.categories.len(),
        path.display()
    );
    Ok(sources)
}

impl Snapshot {
    /// Write the document in one step: serialize into a temporary file next
    /// to `path`, then rename it over the target.
    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let json = serde_json::to_vec(self)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.persist(path)?;

        info!("Wrote snapshot ({} bytes) to {}", json.len(), path.display());
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Snapshot> {
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(AggregatorError::from)
    }
}
