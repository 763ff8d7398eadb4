//! Localization lookup for block labels, progress lines, and champion names.
//!
//! A run merges the champion display names resolved from the metadata feed
//! into the translator, so adapters can print localized champion names while
//! working with canonical ids. Missing keys humanize the key instead of
//! erroring — label lookup is best-effort by design.

use std::collections::HashMap;

const EN_STRINGS: &[(&str, &str)] = &[
    ("starter", "starter items"),
    ("core_items", "core items"),
    ("endgame_items", "endgame items"),
    ("boots", "boots"),
    ("consumables", "consumables"),
    ("trinkets", "trinkets"),
    ("frequent", "frequent"),
    ("wins", "wins"),
    ("winrate", "win rate"),
    ("starting_items", "starting items"),
    ("core_alternatives", "core alternatives"),
    ("situational_items", "situational items"),
    ("elixir", "elixir"),
    ("upgrade_ultimate", "upgrade ultimate"),
    ("processing", "processing"),
    ("unknown", "unknown"),
    ("aram", "aram"),
    ("top", "top"),
    ("middle", "middle"),
    ("jungle", "jungle"),
    ("adc", "adc"),
    ("support", "support"),
    ("lol_version", "fetching game version"),
    ("downloading_champs", "downloading champions"),
    ("deleting_old_builds", "deleting old builds"),
    ("all_builds_available", "all builds available"),
];

/// Per-run translator. Champion names are merged in during roster
/// resolution; the table is read-only during adapter fan-out.
#[derive(Debug, Clone)]
pub struct Translator {
    locale: String,
    strings: HashMap<String, String>,
}

impl Translator {
    pub fn new(locale: impl Into<String>) -> Self {
        let strings = EN_STRINGS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            locale: locale.into(),
            strings,
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// The metadata feed's locale identifier for the active locale.
    pub fn riot_locale(&self) -> &'static str {
        match self.locale.as_str() {
            "de" => "de_DE",
            "es" => "es_ES",
            "fr" => "fr_FR",
            "ko" => "ko_KR",
            "pt" => "pt_BR",
            "zh" => "zh_CN",
            _ => "en_US",
        }
    }

    /// Look up `key`, falling back to a humanized form of the key itself.
    pub fn t(&self, key: &str) -> String {
        self.strings
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.replace(['_', '-'], " "))
    }

    /// Title-cased lookup, used for block labels.
    pub fn tc(&self, key: &str) -> String {
        title_case(&self.t(key))
    }

    /// Merge champion display names (canonical id → localized name).
    pub fn merge_champion_names(&mut self, names: HashMap<String, String>) {
        self.strings.extend(names);
    }
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_key_resolves() {
        let t = Translator::new("en");
        assert_eq!(t.t("boots"), "boots");
        assert_eq!(t.tc("core_items"), "Core Items");
    }

    #[test]
    fn missing_key_humanizes() {
        let t = Translator::new("en");
        assert_eq!(t.t("some_unknown_key"), "some unknown key");
    }

    #[test]
    fn merged_champion_names_resolve() {
        let mut t = Translator::new("en");
        let mut names = HashMap::new();
        names.insert("monkeyking".to_string(), "Wukong".to_string());
        t.merge_champion_names(names);
        assert_eq!(t.t("monkeyking"), "Wukong");
    }

    #[test]
    fn riot_locale_mapping() {
        assert_eq!(Translator::new("en").riot_locale(), "en_US");
        assert_eq!(Translator::new("ko").riot_locale(), "ko_KR");
        assert_eq!(Translator::new("xx").riot_locale(), "en_US");
    }
}
