//! Shared transforms for turning scraped data into item-set blocks.
//!
//! Everything here is pure: id-list folding, skill-order formatting, version
//! splicing, and the consumables/trinkets embellishment shared by all
//! adapters.

use crate::config::Options;
use crate::models::{ItemBlock, ItemEntry};
use crate::translate::Translator;

/// Item ids for the consumables block offered on every build.
const CONSUMABLES: [&str; 6] = ["2003", "2031", "2055", "2138", "2139", "2140"];

/// Item ids for the trinket-upgrades block.
const TRINKET_UPGRADES: [&str; 3] = ["3340", "3363", "3364"];

/// Skill flavor text attached to embellishment block labels when the adapter
/// was able to parse skill orders.
#[derive(Debug, Clone, Default)]
pub struct SkillLabels {
    pub most_freq: Option<String>,
    pub highest_win: Option<String>,
}

/// Folds a scraped id list into unique `(id, count)` entries.
///
/// Counts are occurrences of the id in the input; first-occurrence order is
/// preserved. The Biscuit of Rejuvenation variant (2010) is normalized to the
/// orderable Total Biscuit (2003) before counting.
pub fn array_to_builds<S: AsRef<str>>(ids: &[S]) -> Vec<ItemEntry> {
    let normalized: Vec<String> = ids
        .iter()
        .map(|id| {
            let id = id.as_ref();
            if id == "2010" {
                "2003".to_string()
            } else {
                id.to_string()
            }
        })
        .collect();

    let mut entries: Vec<ItemEntry> = Vec::new();
    for id in &normalized {
        match entries.iter_mut().find(|e| e.id == *id) {
            Some(entry) => entry.count += 1,
            None => entries.push(ItemEntry::new(id.clone(), 1)),
        }
    }
    entries
}

/// Collapses a per-level skill sequence to shorthand form.
///
/// The first 9 levels are grouped by ability letter (excluding the ultimate,
/// "R"), ranked by descending pick count, and rendered as
/// `"<first 4 picks dot-joined> - <ranking '>'-joined>"`. Input letters are
/// case-insensitive; ties keep first-appearance order.
pub fn shorthand_skills<S: AsRef<str>>(skills: &[S]) -> String {
    let upper: Vec<String> = skills
        .iter()
        .map(|s| s.as_ref().to_uppercase())
        .collect();

    let mut counts: Vec<(String, u32)> = Vec::new();
    for skill in upper.iter().take(9) {
        if skill == "R" {
            continue;
        }
        match counts.iter_mut().find(|(s, _)| s == skill) {
            Some((_, n)) => *n += 1,
            None => counts.push((skill.clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let first_picks = upper
        .iter()
        .take(4)
        .cloned()
        .collect::<Vec<_>>()
        .join(".");
    let ranking = counts
        .into_iter()
        .map(|(s, _)| s)
        .collect::<Vec<_>>()
        .join(">");

    format!("{} - {}", first_picks, ranking)
}

/// Splices a full version number down to its first two parts ("6.6.1" → "6.6").
pub fn splice_version(version: &str) -> String {
    version.split('.').take(2).collect::<Vec<_>>().join(".")
}

/// Normalizes a site position label to the shared vocabulary.
pub fn normalize_position(position: &str) -> String {
    match position.trim().to_lowercase().as_str() {
        "mid" => "middle".to_string(),
        "ad carry" | "bottom" | "bot" => "adc".to_string(),
        "jungler" => "jungle".to_string(),
        other => other.to_string(),
    }
}

/// Appends (or prepends) the consumables and trinket-upgrade blocks per the
/// user's settings, optionally decorating the labels with skill flavor text.
pub fn trinks_con(
    blocks: &mut Vec<ItemBlock>,
    skills: &SkillLabels,
    options: &Options,
    t: &Translator,
) {
    if options.consumables {
        let mut title = t.tc("consumables");
        if let Some(most_freq) = &skills.most_freq {
            title = format!("{} | {}: {}", title, t.tc("frequent"), most_freq);
        }
        let block = ItemBlock {
            block_type: title,
            items: CONSUMABLES
                .iter()
                .map(|id| ItemEntry::new(*id, 1))
                .collect(),
        };
        if options.consumables_position.is_beginning() {
            blocks.insert(0, block);
        } else {
            blocks.push(block);
        }
    }

    if options.trinkets {
        let mut title = t.tc("trinkets");
        if let Some(highest_win) = &skills.highest_win {
            title = format!("{} | {}: {}", title, t.tc("wins"), highest_win);
        }
        let block = ItemBlock {
            block_type: title,
            items: TRINKET_UPGRADES
                .iter()
                .map(|id| ItemEntry::new(*id, 1))
                .collect(),
        };
        if options.trinkets_position.is_beginning() {
            blocks.insert(0, block);
        } else {
            blocks.push(block);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BlockPosition, Options};

    #[test]
    fn array_to_builds_counts_and_aliases() {
        let entries = array_to_builds(&["3040", "3040", "2010"]);
        assert_eq!(entries.len(), 2);
        assert!(entries.contains(&ItemEntry::new("3040", 2)));
        assert!(entries.contains(&ItemEntry::new("2003", 1)));
    }

    #[test]
    fn array_to_builds_preserves_first_occurrence_order() {
        let entries = array_to_builds(&["1001", "3006", "1001"]);
        assert_eq!(entries[0], ItemEntry::new("1001", 2));
        assert_eq!(entries[1], ItemEntry::new("3006", 1));
    }

    #[test]
    fn shorthand_ranks_by_count_excluding_ultimate() {
        let skills = ["Q", "W", "Q", "E", "Q", "W", "R", "Q", "W"];
        assert_eq!(shorthand_skills(&skills), "Q.W.Q.E - Q>W>E");
    }

    #[test]
    fn shorthand_is_case_insensitive() {
        let skills = ["q", "w", "q", "e", "q", "w", "r", "q", "w"];
        assert_eq!(shorthand_skills(&skills), "Q.W.Q.E - Q>W>E");
    }

    #[test]
    fn splice_version_keeps_two_parts() {
        assert_eq!(splice_version("6.6.1"), "6.6");
        assert_eq!(splice_version("11.24"), "11.24");
    }

    #[test]
    fn position_vocabulary() {
        assert_eq!(normalize_position("mid"), "middle");
        assert_eq!(normalize_position("ad carry"), "adc");
        assert_eq!(normalize_position("Jungler"), "jungle");
        assert_eq!(normalize_position("support"), "support");
    }

    #[test]
    fn trinks_con_appends_blocks_at_end() {
        let mut options = Options::default();
        options.consumables = true;
        options.trinkets = true;
        options.consumables_position = BlockPosition::End;
        options.trinkets_position = BlockPosition::End;

        let t = Translator::new("en");
        let mut blocks = vec![ItemBlock {
            block_type: "Starter".to_string(),
            items: vec![],
        }];
        trinks_con(&mut blocks, &SkillLabels::default(), &options, &t);

        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].block_type, "Starter");
        assert_eq!(blocks[1].items.len(), CONSUMABLES.len());
        assert_eq!(blocks[2].items.len(), TRINKET_UPGRADES.len());
    }

    #[test]
    fn trinks_con_prepends_and_decorates() {
        let mut options = Options::default();
        options.consumables = true;
        options.consumables_position = BlockPosition::Beginning;
        options.trinkets = false;

        let t = Translator::new("en");
        let mut blocks = vec![ItemBlock {
            block_type: "Core".to_string(),
            items: vec![],
        }];
        let skills = SkillLabels {
            most_freq: Some("Q.W.E.Q - Q>W>E".to_string()),
            highest_win: None,
        };
        trinks_con(&mut blocks, &skills, &options, &t);

        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].block_type.contains("Q.W.E.Q"));
    }
}
