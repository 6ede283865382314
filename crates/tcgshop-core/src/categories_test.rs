use std::path::Path;

use super::*;

fn group(name: &str, categories: &[&str]) -> CategoryGroupConfig {
    CategoryGroupConfig {
        group: name.to_string(),
        categories: categories.iter().map(|c| (*c).to_string()).collect(),
    }
}

#[test]
fn builtin_resolves_known_category() {
    let groups = CategoryGroups::builtin();
    assert_eq!(groups.group_for("MTG Singles"), Some("Magic: The Gathering"));
    assert_eq!(groups.group_for("Sleeves"), Some("Accessories"));
}

#[test]
fn lookup_is_case_and_whitespace_insensitive() {
    let groups = CategoryGroups::builtin();
    assert_eq!(groups.group_for("  pokémon singles "), Some("Pokémon"));
}

#[test]
fn unknown_category_is_ungrouped() {
    let groups = CategoryGroups::builtin();
    assert!(groups.group_for("Board Games").is_none());
}

#[test]
fn empty_mapping_groups_nothing() {
    let groups = CategoryGroups::default();
    assert!(groups.is_empty());
    assert!(groups.group_for("MTG Singles").is_none());
}

#[test]
fn validate_rejects_empty_group_name() {
    let file = CategoryGroupsFile {
        groups: vec![group(" ", &["Sleeves"])],
    };
    let err = validate_groups(&file).unwrap_err();
    assert!(err.to_string().contains("non-empty"));
}

#[test]
fn validate_rejects_duplicate_group() {
    let file = CategoryGroupsFile {
        groups: vec![group("Lorcana", &["A"]), group("lorcana", &["B"])],
    };
    let err = validate_groups(&file).unwrap_err();
    assert!(err.to_string().contains("duplicate group"));
}

#[test]
fn validate_rejects_category_in_two_groups() {
    let file = CategoryGroupsFile {
        groups: vec![
            group("Accessories", &["Playmats"]),
            group("Lorcana", &["playmats"]),
        ],
    };
    let err = validate_groups(&file).unwrap_err();
    assert!(err.to_string().contains("mapped to both"));
}

#[test]
fn validate_accepts_builtin_shape() {
    let file = CategoryGroupsFile {
        groups: vec![
            group("Pokémon", &["Pokémon Singles"]),
            group("Accessories", &["Sleeves", "Binders"]),
        ],
    };
    assert!(validate_groups(&file).is_ok());
}

#[test]
fn load_category_groups_missing_file_is_io_error() {
    let err = load_category_groups(Path::new("/definitely/not/here.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::CategoryFileIo { .. }));
}

#[test]
fn load_category_groups_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("category_groups.yaml");
    assert!(path.exists(), "category_groups.yaml missing at {path:?}");
    let result = load_category_groups(&path);
    assert!(result.is_ok(), "failed to load category_groups.yaml: {result:?}");
    let groups = result.unwrap();
    assert_eq!(groups.group_for("Pokémon Booster Packs"), Some("Pokémon"));
}
