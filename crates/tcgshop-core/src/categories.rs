//! Static category → group mapping used to bucket catalog categories into
//! storefront sections (one per game line, plus accessories).

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Built-in mapping used when no YAML file is configured.
const DEFAULT_GROUPS: &[(&str, &[&str])] = &[
    (
        "Pokémon",
        &[
            "Pokémon Singles",
            "Pokémon Booster Packs",
            "Pokémon Booster Boxes",
            "Pokémon Elite Trainer Boxes",
        ],
    ),
    (
        "Magic: The Gathering",
        &[
            "MTG Singles",
            "MTG Booster Packs",
            "MTG Booster Boxes",
            "MTG Commander Decks",
        ],
    ),
    (
        "Yu-Gi-Oh!",
        &["Yu-Gi-Oh! Singles", "Yu-Gi-Oh! Booster Packs", "Yu-Gi-Oh! Structure Decks"],
    ),
    ("One Piece", &["One Piece Booster Packs", "One Piece Starter Decks"]),
    ("Lorcana", &["Lorcana Booster Packs", "Lorcana Starter Decks"]),
    (
        "Accessories",
        &["Sleeves", "Deck Boxes", "Binders", "Playmats", "Toploaders"],
    ),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryGroupConfig {
    pub group: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryGroupsFile {
    pub groups: Vec<CategoryGroupConfig>,
}

/// Case-insensitive lookup from category display name to group name.
#[derive(Debug, Clone, Default)]
pub struct CategoryGroups {
    by_category: HashMap<String, String>,
}

impl CategoryGroups {
    /// The built-in trading-card-game mapping.
    #[must_use]
    pub fn builtin() -> Self {
        let groups = DEFAULT_GROUPS
            .iter()
            .map(|(group, categories)| CategoryGroupConfig {
                group: (*group).to_string(),
                categories: categories.iter().map(|c| (*c).to_string()).collect(),
            })
            .collect();
        Self::from_file(CategoryGroupsFile { groups })
    }

    fn from_file(file: CategoryGroupsFile) -> Self {
        let by_category = file
            .groups
            .into_iter()
            .flat_map(|g| {
                let group = g.group;
                g.categories
                    .into_iter()
                    .map(move |c| (lookup_key(&c), group.clone()))
            })
            .collect();
        Self { by_category }
    }

    /// Returns the group for a category name; `None` means ungrouped.
    #[must_use]
    pub fn group_for(&self, category_name: &str) -> Option<&str> {
        self.by_category
            .get(&lookup_key(category_name))
            .map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_category.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_category.is_empty()
    }
}

fn lookup_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Load and validate a category-group mapping from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_category_groups(path: &Path) -> Result<CategoryGroups, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoryFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: CategoryGroupsFile = serde_yaml::from_str(&content)?;

    validate_groups(&file)?;

    Ok(CategoryGroups::from_file(file))
}

fn validate_groups(file: &CategoryGroupsFile) -> Result<(), ConfigError> {
    let mut seen_groups = HashSet::new();
    let mut seen_categories: HashMap<String, &str> = HashMap::new();

    for group in &file.groups {
        if group.group.trim().is_empty() {
            return Err(ConfigError::Validation(
                "group name must be non-empty".to_string(),
            ));
        }

        if !seen_groups.insert(lookup_key(&group.group)) {
            return Err(ConfigError::Validation(format!(
                "duplicate group: '{}'",
                group.group
            )));
        }

        for category in &group.categories {
            if category.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "group '{}' lists an empty category name",
                    group.group
                )));
            }
            if let Some(previous) = seen_categories.insert(lookup_key(category), &group.group) {
                return Err(ConfigError::Validation(format!(
                    "category '{category}' is mapped to both '{previous}' and '{}'",
                    group.group
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "categories_test.rs"]
mod tests;
