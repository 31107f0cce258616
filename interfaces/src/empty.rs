use anyhow::Result;
use std::collections::HashSet;

use crate::defs::hash_link;
use crate::defs::LanguagePreference;
use crate::defs::ReadStatus;
use crate::defs::DEFAULT_LANGUAGE;

/// Non-persistent store, for callers that do not keep reader state.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    read_ids: HashSet<String>,
    language: String,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            read_ids: HashSet::new(),
            language: DEFAULT_LANGUAGE.to_owned(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadStatus for MemoryStore {
    fn is_read(&self, link: &str) -> bool {
        self.read_ids.contains(&hash_link(link))
    }

    fn mark_as_read(&mut self, link: &str) -> Result<()> {
        self.read_ids.insert(hash_link(link));
        Ok(())
    }

    fn mark_all_as_read(&mut self, links: &[&str]) -> Result<()> {
        self.read_ids.extend(links.iter().map(|link| hash_link(link)));
        Ok(())
    }

    fn read_count(&self) -> usize {
        self.read_ids.len()
    }
}

impl LanguagePreference for MemoryStore {
    fn target_language(&self) -> &str {
        &self.language
    }

    fn set_language(&mut self, code: &str) -> Result<()> {
        self.language = code.to_owned();
        Ok(())
    }
}
