//! Display strings for symbolic keys.
//!
//! Ships with Norwegian (`nb`) and English (`en`) strings for the keys the
//! issue layer needs. Deployments can add locales or override strings through
//! [`LocaleConfig`](crate::config::LocaleConfig).

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::config::LocaleConfig;

/// Key for the "published" label.
pub const KEY_PUBLISHED: &str = "app.issues.edit.published";
/// Key for the "not published" label.
pub const KEY_NOT_PUBLISHED: &str = "app.issues.edit.not_published";
/// Key shown in place of a missing user.
pub const KEY_NOBODY: &str = "app.nobody";

type Table = HashMap<String, HashMap<String, String>>;

static BUILTIN: Lazy<Table> = Lazy::new(|| {
    let mut table: Table = HashMap::new();

    let nb = table.entry("nb".to_string()).or_default();
    nb.insert(KEY_PUBLISHED.to_string(), "Publisert".to_string());
    nb.insert(KEY_NOT_PUBLISHED.to_string(), "Ikke publisert".to_string());
    nb.insert(KEY_NOBODY.to_string(), "ingen".to_string());

    let en = table.entry("en".to_string()).or_default();
    en.insert(KEY_PUBLISHED.to_string(), "Published".to_string());
    en.insert(KEY_NOT_PUBLISHED.to_string(), "Not published".to_string());
    en.insert(KEY_NOBODY.to_string(), "nobody".to_string());

    table
});

/// Resolves symbolic keys to display strings.
#[derive(Debug, Clone)]
pub struct Localizer {
    locale: String,
    table: Table,
}

impl Default for Localizer {
    fn default() -> Self {
        Self::from_config(&LocaleConfig::default())
    }
}

impl Localizer {
    /// Build a localizer from the built-in strings plus configured overrides.
    #[must_use]
    pub fn from_config(config: &LocaleConfig) -> Self {
        let mut table = BUILTIN.clone();
        for (locale, strings) in &config.translations {
            table
                .entry(locale.clone())
                .or_default()
                .extend(strings.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        Self {
            locale: config.default_locale.clone(),
            table,
        }
    }

    /// A copy of this localizer using another locale.
    #[must_use]
    pub fn with_locale(&self, locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
            table: self.table.clone(),
        }
    }

    /// The active locale.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Translate `key` in the active locale.
    ///
    /// Missing keys fall back to the `nb` strings and finally to the key
    /// itself.
    #[must_use]
    pub fn t(&self, key: &str) -> String {
        self.lookup(&self.locale, key)
            .or_else(|| self.lookup("nb", key))
            .map_or_else(|| key.to_string(), str::to_string)
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&str> {
        self.table
            .get(locale)
            .and_then(|strings| strings.get(key))
            .map(String::as_str)
    }
}
