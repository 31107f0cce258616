use anyhow::Context;
use anyhow::Result;
use serde_json::Map;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::defs::hash_link;
use crate::defs::LanguagePreference;
use crate::defs::ReadStatus;
use crate::defs::DEFAULT_LANGUAGE;
use crate::defs::LANG_KEY;
use crate::defs::READ_KEY;

/// Reader state in a flat JSON key-value file, one string value per key.
/// The read set is stored as a JSON-encoded array under `READ_KEY`.
pub struct JsonFileStore {
    path: PathBuf,
    read_ids: BTreeSet<String>,
    language: String,
}

fn load_entries(path: &Path) -> Map<String, Value> {
    fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<Map<String, Value>>(&raw).ok())
        .unwrap_or_default()
}

fn load_read_ids(entries: &Map<String, Value>) -> BTreeSet<String> {
    entries
        .get(READ_KEY)
        .and_then(Value::as_str)
        .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
        .map(|ids| ids.into_iter().collect())
        .unwrap_or_default()
}

impl JsonFileStore {
    /// Open the store at `path`. A missing or corrupt file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        let read_ids = load_read_ids(&entries);
        let language = entries
            .get(LANG_KEY)
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_owned();

        Self { path, read_ids, language }
    }

    fn save(&self) -> Result<()> {
        let mut entries = load_entries(&self.path);
        let ids: Vec<&String> = self.read_ids.iter().collect();
        entries.insert(READ_KEY.to_owned(), Value::String(serde_json::to_string(&ids)?));
        entries.insert(LANG_KEY.to_owned(), Value::String(self.language.clone()));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(&entries)?)
            .with_context(|| format!("writing reader state to {}", self.path.display()))?;
        Ok(())
    }
}

impl ReadStatus for JsonFileStore {
    fn is_read(&self, link: &str) -> bool {
        self.read_ids.contains(&hash_link(link))
    }

    fn mark_as_read(&mut self, link: &str) -> Result<()> {
        self.read_ids.insert(hash_link(link));
        self.save()
    }

    fn mark_all_as_read(&mut self, links: &[&str]) -> Result<()> {
        self.read_ids.extend(links.iter().map(|link| hash_link(link)));
        self.save()
    }

    fn read_count(&self) -> usize {
        self.read_ids.len()
    }
}

impl LanguagePreference for JsonFileStore {
    fn target_language(&self) -> &str {
        &self.language
    }

    fn set_language(&mut self, code: &str) -> Result<()> {
        self.language = code.to_owned();
        self.save()
    }
}
