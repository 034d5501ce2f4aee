//! Localization: closed language set and per-entry name struct.

use serde::{Deserialize, Serialize};

/// Languages the catalog carries names for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    ZhHans,
    EnUs,
    JaJp,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::ZhHans, Language::EnUs, Language::JaJp];

    /// IETF-style tag used in the persisted catalog document.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::ZhHans => "zh-HANS",
            Language::EnUs => "en-US",
            Language::JaJp => "ja-JP",
        }
    }
}

/// Fixed per-entry name record, one field per supported language.
///
/// Every field must be non-empty; `Catalog::validate` enforces this at load
/// time so lookups never have to handle a missing translation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedName {
    #[serde(rename = "zh-HANS")]
    pub zh_hans: String,
    #[serde(rename = "en-US")]
    pub en_us: String,
    #[serde(rename = "ja-JP")]
    pub ja_jp: String,
}

impl LocalizedName {
    pub fn new(zh_hans: &str, en_us: &str, ja_jp: &str) -> Self {
        Self {
            zh_hans: zh_hans.to_string(),
            en_us: en_us.to_string(),
            ja_jp: ja_jp.to_string(),
        }
    }

    pub fn get(&self, lang: Language) -> &str {
        match lang {
            Language::ZhHans => &self.zh_hans,
            Language::EnUs => &self.en_us,
            Language::JaJp => &self.ja_jp,
        }
    }

    pub fn is_complete(&self) -> bool {
        Language::ALL.iter().all(|&lang| !self.get(lang).is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_tags() {
        assert_eq!(Language::ZhHans.tag(), "zh-HANS");
        assert_eq!(Language::EnUs.tag(), "en-US");
        assert_eq!(Language::JaJp.tag(), "ja-JP");
    }

    #[test]
    fn test_completeness() {
        let name = LocalizedName::new("点赞", "Like", "いいね");
        assert!(name.is_complete());
        assert!(!LocalizedName::default().is_complete());
        assert_eq!(name.get(Language::EnUs), "Like");
    }
}
