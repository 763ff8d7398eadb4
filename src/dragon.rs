//! Client for the authoritative game-metadata feed.
//!
//! Resolves the current game-data version, the champion roster with
//! localized display names, the item-name lookup used by markup sources, and
//! the special-item substitution map. All of these are fatal to a run when
//! unreachable — every downstream stage depends on them.

use std::collections::HashMap;

use serde::Deserialize;

use crate::errors::{Error, Result};
use crate::scheduler::Scheduler;

#[derive(Debug, Deserialize)]
struct Realms {
    v: String,
}

#[derive(Debug, Deserialize)]
struct ChampionResponse {
    data: HashMap<String, ChampionInfo>,
}

#[derive(Debug, Deserialize)]
struct ChampionInfo {
    id: String,
    key: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ItemResponse {
    data: HashMap<String, ItemInfo>,
}

#[derive(Debug, Deserialize)]
struct ItemInfo {
    name: String,
    #[serde(rename = "specialRecipe")]
    special_recipe: Option<u64>,
    #[serde(rename = "requiredAlly")]
    required_ally: Option<String>,
    #[serde(default)]
    from: Vec<String>,
}

/// Champion roster and lookups resolved from the metadata feed.
#[derive(Debug, Clone)]
pub struct ChampionData {
    /// Canonical champion ids (lowercase, spaces stripped), sorted.
    pub roster: Vec<String>,
    /// Canonical id → numeric champion key.
    pub champ_ids: HashMap<String, String>,
    /// Canonical id → localized display name, for the translator.
    pub names: HashMap<String, String>,
}

/// Resolve the current game-data version (e.g. "6.6.1").
pub async fn get_version(scheduler: &Scheduler, base: &str) -> Result<String> {
    let realms: Realms = scheduler.get_json(&format!("{base}/realms/na.json")).await?;
    Ok(realms.v)
}

/// Resolve the champion roster and name translations for `locale`.
pub async fn get_champions(
    scheduler: &Scheduler,
    base: &str,
    version: &str,
    locale: &str,
) -> Result<ChampionData> {
    let url = format!("{base}/cdn/{version}/data/{locale}/champion.json");
    let response: ChampionResponse = scheduler.get_json(&url).await?;
    if response.data.is_empty() {
        return Err(Error::MissingData("champion roster".to_string()));
    }
    Ok(champion_data_from(response))
}

/// Resolve the item display-name → id lookup used by markup sources.
pub async fn get_item_names(
    scheduler: &Scheduler,
    base: &str,
    version: &str,
) -> Result<HashMap<String, String>> {
    let url = format!("{base}/cdn/{version}/data/en_US/item.json");
    let response: ItemResponse = scheduler.get_json(&url).await?;
    if response.data.is_empty() {
        return Err(Error::MissingData("item metadata".to_string()));
    }
    Ok(response
        .data
        .into_iter()
        .map(|(id, info)| (info.name, id))
        .collect())
}

/// Resolve the special-item substitution map: conditional-recipe items map
/// to their recipe id, ally-gated items to their first component.
pub async fn get_special_items(
    scheduler: &Scheduler,
    base: &str,
    version: &str,
) -> Result<HashMap<String, String>> {
    let url = format!("{base}/cdn/{version}/data/en_US/item.json");
    let response: ItemResponse = scheduler.get_json(&url).await?;
    Ok(special_items_from(response))
}

fn champion_data_from(response: ChampionResponse) -> ChampionData {
    let mut names: HashMap<String, String> = HashMap::new();
    let mut champ_ids = HashMap::new();
    let mut roster = Vec::new();

    for (key, info) in &response.data {
        let canonical = canonical_champion(key);
        names.insert(canonical.clone(), info.name.clone());
        champ_ids.insert(info.id.to_lowercase(), info.key.clone());
        roster.push(canonical);
    }

    // The client-facing alias has no roster entry of its own.
    if let Some(name) = names.get("monkeyking").cloned() {
        names.insert("wukong".to_string(), name);
    }

    roster.sort();
    ChampionData {
        roster,
        champ_ids,
        names,
    }
}

fn special_items_from(response: ItemResponse) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for (id, info) in response.data {
        if let Some(recipe) = info.special_recipe {
            map.insert(id, recipe.to_string());
        } else if info.required_ally.is_some() {
            if let Some(component) = info.from.first() {
                map.insert(id, component.clone());
            }
        }
    }
    map
}

/// Canonical champion identifier: lowercase, spaces stripped.
pub fn canonical_champion(name: &str) -> String {
    name.to_lowercase().replace(' ', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_strips_spaces_and_case() {
        assert_eq!(canonical_champion("Aurelion Sol"), "aurelionsol");
        assert_eq!(canonical_champion("Ahri"), "ahri");
    }

    #[test]
    fn champion_data_builds_lookups_and_alias() {
        let response: ChampionResponse = serde_json::from_str(
            r#"{"data": {
                "Ahri": {"id": "Ahri", "key": "103", "name": "Ahri"},
                "MonkeyKing": {"id": "MonkeyKing", "key": "62", "name": "Wukong"},
                "AurelionSol": {"id": "AurelionSol", "key": "136", "name": "Aurelion Sol"}
            }}"#,
        )
        .unwrap();

        let data = champion_data_from(response);
        assert_eq!(data.roster, vec!["ahri", "aurelionsol", "monkeyking"]);
        assert_eq!(data.champ_ids["monkeyking"], "62");
        assert_eq!(data.names["wukong"], "Wukong");
        assert_eq!(data.names["aurelionsol"], "Aurelion Sol");
    }

    #[test]
    fn special_items_prefer_recipe_then_ally_component() {
        let response: ItemResponse = serde_json::from_str(
            r#"{"data": {
                "2010": {"name": "Biscuit", "specialRecipe": 2003},
                "7000": {"name": "Forgefire", "requiredAlly": "Ornn", "from": ["3068"]},
                "1001": {"name": "Boots"}
            }}"#,
        )
        .unwrap();

        let map = special_items_from(response);
        assert_eq!(map.len(), 2);
        assert_eq!(map["2010"], "2003");
        assert_eq!(map["7000"], "3068");
    }
}
