//! 翻訳テーブル（英語 / ヒンディー語）
//!
//! キー → 文字列のフラットなJSONを埋め込み、初回参照時に読み込む。
//! 参照は「指定言語 → 既定言語（英語） → キーそのもの」の順にフォールバックする。
//! `{{name}}` 形式のプレースホルダは呼び出し側の値で置換する。

use crate::types::Language;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fmt::Display;

const EN_JSON: &str = include_str!("../i18n/en.json");
const HI_JSON: &str = include_str!("../i18n/hi.json");

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("valid placeholder regex");
    static ref GLOBAL: TranslationStore = TranslationStore::from_sources(EN_JSON, HI_JSON);
}

/// フラットな翻訳テーブル
pub type TranslationMap = HashMap<String, String>;

/// 2言語分の翻訳テーブル
///
/// 読み込み後は変更しない。
#[derive(Debug, Clone, Default)]
pub struct TranslationStore {
    en: TranslationMap,
    hi: TranslationMap,
}

impl TranslationStore {
    /// 埋め込みテーブルを使うプロセス共通ストア
    pub fn global() -> &'static TranslationStore {
        &GLOBAL
    }

    /// JSON文字列から構築
    ///
    /// パースに失敗したテーブルは空として扱い、キーがそのまま返るようになる。
    pub fn from_sources(en_json: &str, hi_json: &str) -> Self {
        Self {
            en: parse_table(Language::En, en_json),
            hi: parse_table(Language::Hi, hi_json),
        }
    }

    fn table(&self, language: Language) -> &TranslationMap {
        match language {
            Language::En => &self.en,
            Language::Hi => &self.hi,
        }
    }

    /// 翻訳文字列を取得
    pub fn t(&self, language: Language, key: &str) -> String {
        self.resolve(language, key).to_string()
    }

    /// プレースホルダ置換付きで翻訳文字列を取得
    ///
    /// 値が渡されなかったプレースホルダはそのまま残す。
    pub fn t_with(&self, language: Language, key: &str, args: &[(&str, &dyn Display)]) -> String {
        let template = self.resolve(language, key);
        if args.is_empty() {
            return template.to_string();
        }

        PLACEHOLDER
            .replace_all(template, |caps: &Captures| {
                let name = &caps[1];
                args.iter()
                    .find(|(arg, _)| *arg == name)
                    .map(|(_, value)| value.to_string())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    fn resolve<'a>(&'a self, language: Language, key: &'a str) -> &'a str {
        if let Some(text) = self.table(language).get(key) {
            return text;
        }
        if let Some(text) = self.table(Language::BASE).get(key) {
            tracing::debug!(key, language = %language, "translation missing, using base language");
            return text;
        }
        key
    }

    pub fn contains(&self, language: Language, key: &str) -> bool {
        self.table(language).contains_key(key)
    }

    /// 既定言語にあって指定言語に無いキー（ソート済み）
    pub fn missing_keys(&self, language: Language) -> Vec<String> {
        let table = self.table(language);
        let mut missing: Vec<String> = self
            .table(Language::BASE)
            .keys()
            .filter(|key| !table.contains_key(*key))
            .cloned()
            .collect();
        missing.sort();
        missing
    }
}

fn parse_table(language: Language, source: &str) -> TranslationMap {
    match serde_json::from_str(source) {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!(language = %language, error = %e, "failed to load translation table");
            TranslationMap::new()
        }
    }
}

/// グローバルストアでの翻訳（ショートハンド）
pub fn t(language: Language, key: &str) -> String {
    TranslationStore::global().t(language, key)
}

/// グローバルストアでのプレースホルダ付き翻訳（ショートハンド）
pub fn t_with(language: Language, key: &str, args: &[(&str, &dyn Display)]) -> String {
    TranslationStore::global().t_with(language, key, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> TranslationStore {
        TranslationStore::from_sources(
            r#"{"greeting": "Hello {{name}}", "only_en": "English only", "card": "Dosha #{{index}} of {{index}}"}"#,
            r#"{"greeting": "नमस्ते {{name}}"}"#,
        )
    }

    #[test]
    fn test_lookup_active_language() {
        assert_eq!(store().t(Language::Hi, "greeting"), "नमस्ते {{name}}");
    }

    #[test]
    fn test_fallback_to_base_language() {
        assert_eq!(store().t(Language::Hi, "only_en"), "English only");
    }

    #[test]
    fn test_fallback_to_key() {
        assert_eq!(store().t(Language::En, "no_such_key"), "no_such_key");
    }

    #[test]
    fn test_placeholder_substitution() {
        let s = store();
        assert_eq!(s.t_with(Language::En, "greeting", &[("name", &"Asha")]), "Hello Asha");
        assert_eq!(s.t_with(Language::En, "card", &[("index", &3)]), "Dosha #3 of 3");
    }

    #[test]
    fn test_unknown_placeholder_left_intact() {
        let s = store();
        assert_eq!(s.t_with(Language::En, "greeting", &[("other", &1)]), "Hello {{name}}");
    }

    #[test]
    fn test_broken_table_degrades_to_keys() {
        let s = TranslationStore::from_sources("{not json", "[]");
        assert_eq!(s.t(Language::En, "form_title"), "form_title");
        assert_eq!(s.t(Language::Hi, "form_title"), "form_title");
    }

    #[test]
    fn test_missing_keys() {
        assert_eq!(store().missing_keys(Language::Hi), vec!["card".to_string(), "only_en".to_string()]);
    }

    #[test]
    fn test_embedded_tables_in_sync() {
        let global = TranslationStore::global();
        assert!(global.contains(Language::En, "result_title"));
        assert!(global.missing_keys(Language::Hi).is_empty(), "hi.json is missing keys");
    }

    #[test]
    fn test_embedded_direction_keys() {
        let global = TranslationStore::global();
        for direction in crate::types::EntranceDirection::ALL {
            assert!(global.contains(Language::En, direction.i18n_key()));
            assert!(global.contains(Language::Hi, direction.i18n_key()));
        }
    }
}
