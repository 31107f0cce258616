use anyhow::Result;

/// Storage key holding the JSON array of read link ids.
pub const READ_KEY: &str = "rss-reader-read";
/// Storage key holding the preferred target language code.
pub const LANG_KEY: &str = "rss-reader-lang";
pub const DEFAULT_LANGUAGE: &str = "zh-CN";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

pub const LANGUAGES: &[Language] = &[
    Language { code: "zh-CN", name: "中文 (简体)" },
    Language { code: "zh-TW", name: "中文 (繁體)" },
    Language { code: "ja", name: "日本語" },
    Language { code: "ko", name: "한국어" },
    Language { code: "es", name: "Español" },
    Language { code: "fr", name: "Français" },
    Language { code: "de", name: "Deutsch" },
    Language { code: "ru", name: "Русский" },
    Language { code: "pt", name: "Português" },
    Language { code: "ar", name: "العربية" },
];

/// Identifier for a link in the read set: 32-bit `h * 31 + unit` over the
/// UTF-16 code units, wrapping, printed as a signed decimal.
pub fn hash_link(link: &str) -> String {
    link.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
        .to_string()
}

// Object style note:
// These are the reader-side collaborators of the snapshot. The fetch and
// translate pipeline never reads or writes them; a reader UI owns them and
// keys everything by the link-derived id from `hash_link`.

pub trait ReadStatus {
    fn is_read(&self, link: &str) -> bool;
    fn mark_as_read(&mut self, link: &str) -> Result<()>;
    fn mark_all_as_read(&mut self, links: &[&str]) -> Result<()>;
    fn read_count(&self) -> usize;
}

pub trait LanguagePreference {
    fn target_language(&self) -> &str;
    fn set_language(&mut self, code: &str) -> Result<()>;
}
