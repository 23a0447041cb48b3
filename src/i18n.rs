/*
 *  i18n.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Label and weekday translation from locale message tables
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Flat English-key to phrase table. Unknown keys translate to themselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct I18n {
    locale: String,
    messages: BTreeMap<String, String>,
}

impl I18n {
    /// No table; every key comes back unchanged.
    pub fn english() -> Self {
        Self { locale: "en_US".to_string(), messages: BTreeMap::new() }
    }

    pub fn from_messages(locale: impl Into<String>, messages: BTreeMap<String, String>) -> Self {
        Self { locale: locale.into(), messages }
    }

    /// Load `<dir>/<locale>/messages.json`. A missing or unreadable table
    /// falls back to English.
    pub fn load(dir: &Path, locale: &str) -> Self {
        let path = dir.join(locale).join("messages.json");
        if !path.exists() {
            debug!("no message table at {}, using English", path.display());
            return Self { locale: locale.to_string(), messages: BTreeMap::new() };
        }
        let parsed = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|s| serde_json::from_str::<BTreeMap<String, String>>(&s).map_err(|e| e.to_string()));
        match parsed {
            Ok(messages) => {
                debug!("loaded {} messages for {}", messages.len(), locale);
                Self { locale: locale.to_string(), messages }
            }
            Err(e) => {
                warn!("ignoring {}: {}", path.display(), e);
                Self { locale: locale.to_string(), messages: BTreeMap::new() }
            }
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn tr<'a>(&'a self, key: &'a str) -> &'a str {
        self.messages.get(key).map(String::as_str).unwrap_or(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn unknown_keys_pass_through() {
        let i18n = I18n::english();
        assert_eq!(i18n.tr("Humidity"), "Humidity");
    }

    #[test]
    fn loads_locale_table() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("de_DE")).unwrap();
        fs::write(dir.path().join("de_DE/messages.json"), r#"{"Humidity": "Feuchte", "Mon": "Mo"}"#).unwrap();

        let i18n = I18n::load(dir.path(), "de_DE");
        assert_eq!(i18n.locale(), "de_DE");
        assert_eq!(i18n.tr("Humidity"), "Feuchte");
        assert_eq!(i18n.tr("Mon"), "Mo");
        assert_eq!(i18n.tr("Sunset"), "Sunset");
    }

    #[test]
    fn broken_table_falls_back() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("xx")).unwrap();
        fs::write(dir.path().join("xx/messages.json"), "{not json").unwrap();
        assert_eq!(I18n::load(dir.path(), "xx").tr("Wind"), "Wind");
        assert_eq!(I18n::load(dir.path(), "missing").tr("Wind"), "Wind");
    }

    #[test]
    fn bundled_german_table() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("locale");
        let i18n = I18n::load(&dir, "de_DE");
        assert_eq!(i18n.tr("Sunrise"), "Aufgang");
        assert_eq!(i18n.tr("Sun"), "So");
    }
}
