use std::{fs, path::Path};

use livevars::{
    DocumentSource, FsVault, InMemoryVault, PropertyStore, PropertyTree, SourceError, Value,
    store::NO_VALUE,
};
use serde_json::json;
use tempfile::TempDir;

fn write(root: &Path, path: &str, contents: &str) {
    let file = root.join(path);
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(file, contents).unwrap();
}

fn fs_vault() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "budget.md",
        "---\ntotal: 120\nitems:\n  - name: rent\n    cost: 100\n  - name: food\n    cost: 20\n---\n# Budget\n",
    );
    write(dir.path(), "projects/plan.md", "---\ntotal: 5\nowner: Kim\n---\nBody\n");
    write(dir.path(), "projects/notes.txt", "---\nignored: true\n---\n");
    write(dir.path(), ".obsidian/hidden.md", "---\nsecret: 1\n---\n");
    write(dir.path(), "plain.md", "No front matter here\n");
    dir
}

#[test]
fn test_fs_vault_lists_markdown_only() {
    let dir = fs_vault();
    let vault = FsVault::new(dir.path());
    assert_eq!(
        vault.documents().unwrap(),
        vec!["budget.md", "plain.md", "projects/plan.md"]
    );
}

#[test]
fn test_fs_vault_reads_front_matter() {
    let dir = fs_vault();
    let vault = FsVault::new(dir.path());
    let properties = vault.properties("projects/plan.md").unwrap();
    assert_eq!(properties["total"], Value::Integer(5));
    assert_eq!(properties["owner"], Value::from("Kim"));
    assert!(vault.properties("plain.md").unwrap().is_empty());
    assert!(matches!(
        vault.properties("missing.md"),
        Err(SourceError::NotFound(_))
    ));
}

#[test]
fn test_broken_front_matter_does_not_hide_vault() {
    let dir = fs_vault();
    write(dir.path(), "broken.md", "---\nkey: [unclosed\n---\n");
    let vault = FsVault::new(dir.path());
    assert!(matches!(
        vault.properties("broken.md"),
        Err(SourceError::FrontMatter { .. })
    ));

    let tree = PropertyTree::build(&vault).unwrap();
    assert_eq!(tree.document("broken.md").map(|p| p.len()), Some(0));
    assert_eq!(tree.get("budget.md/total"), Some(Value::Integer(120)));
}

#[test]
fn test_global_paths() {
    let dir = fs_vault();
    let store = PropertyStore::new(FsVault::new(dir.path())).unwrap();
    assert_eq!(store.get("budget.md/items[1].cost"), Some(Value::Integer(20)));
    assert_eq!(store.get("projects/plan.md/owner"), Some(Value::from("Kim")));
    assert_eq!(
        store.get("projects/plan.md"),
        Some(Value::from(json!({"total": 5, "owner": "Kim"})))
    );
    assert_eq!(store.get("projects"), None);
    assert_eq!(store.get("total"), None);
    assert!(store.active_document().is_none());
}

#[test]
fn test_local_paths_shadow_global() {
    let dir = fs_vault();
    let mut store = PropertyStore::new(FsVault::new(dir.path())).unwrap();
    store.refresh_for("projects/plan.md").unwrap();

    assert_eq!(store.active_document(), Some("projects/plan.md"));
    assert_eq!(store.get("total"), Some(Value::Integer(5)));
    assert_eq!(store.get("budget.md/total"), Some(Value::Integer(120)));

    let paths = store.find_paths_containing("total");
    assert_eq!(
        paths,
        vec!["total", "budget.md/total", "projects/plan.md/total"]
    );
    assert_eq!(store.find_local_paths_containing("o"), vec!["total", "owner"]);
}

#[test]
fn test_prefix_search() {
    let dir = fs_vault();
    let store = PropertyStore::new(FsVault::new(dir.path())).unwrap();
    assert_eq!(
        store.find_paths_starting_with("budget.md/items["),
        vec![
            "budget.md/items[0]",
            "budget.md/items[0].name",
            "budget.md/items[0].cost",
            "budget.md/items[1]",
            "budget.md/items[1].name",
            "budget.md/items[1].cost",
        ]
    );
}

#[test]
fn test_properties_carry_values() {
    let dir = fs_vault();
    let mut store = PropertyStore::new(FsVault::new(dir.path())).unwrap();
    store.refresh_for("budget.md").unwrap();

    let properties = store.find_local_properties_containing("items[0]");
    let pairs: Vec<(&str, &str)> = properties
        .iter()
        .map(|p| (p.key.as_str(), p.value.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("items[0]", r#"{"name":"rent","cost":100}"#),
            ("items[0].name", "rent"),
            ("items[0].cost", "100"),
        ]
    );
}

#[test]
fn test_previews() {
    let dir = fs_vault();
    let mut store = PropertyStore::new(FsVault::new(dir.path())).unwrap();
    store.refresh_for("budget.md").unwrap();
    assert_eq!(store.preview_of("total"), "120");
    assert_eq!(store.preview_of("items[1].name"), "food");
    assert_eq!(store.preview_of("projects/plan.md/owner"), "Kim");
    assert_eq!(store.preview_of("nothing"), NO_VALUE);
    assert_eq!(store.preview_of("projects/plan.md"), r#"{"total":5,"owner":"Kim"}"#);
    assert_eq!(store.preview_of("projects"), NO_VALUE);
}

#[test]
fn test_refresh_picks_up_changes() {
    let dir = fs_vault();
    let mut store = PropertyStore::new(FsVault::new(dir.path())).unwrap();
    store.refresh_for("budget.md").unwrap();
    let before = store.snapshot();

    write(dir.path(), "budget.md", "---\ntotal: 130\nextra:\n  deep: yes\n---\n");
    write(dir.path(), "projects/new.md", "---\nfresh: 1\n---\n");
    store.refresh().unwrap();

    assert_eq!(store.get("total"), Some(Value::Integer(130)));
    assert_eq!(store.get("extra.deep"), Some(Value::from("yes")));
    assert_eq!(store.get("items"), None);
    assert_eq!(store.get("projects/new.md/fresh"), Some(Value::Integer(1)));

    // The old snapshot is untouched
    assert_eq!(before.get("budget.md/total"), Some(Value::Integer(120)));
}

#[test]
fn test_refresh_twice_gives_equal_trees() {
    let dir = fs_vault();
    let mut store = PropertyStore::new(FsVault::new(dir.path())).unwrap();
    store.refresh().unwrap();
    let first = store.snapshot();
    store.refresh().unwrap();
    assert_eq!(*first, *store.snapshot());
}

#[test]
fn test_removed_document_disappears() {
    let mut vault = InMemoryVault::new();
    vault.insert_json("a.md", json!({"x": 1}));
    vault.insert_json("b.md", json!({"y": 2}));
    let mut store = PropertyStore::new(vault.clone()).unwrap();
    assert_eq!(store.get("b.md/y"), Some(Value::Integer(2)));

    vault.remove("b.md");
    store = PropertyStore::new(vault).unwrap();
    assert_eq!(store.get("b.md/y"), None);
    assert!(store.find_paths_containing("b.md").is_empty());
}

#[test]
fn test_resolve_local() {
    let dir = fs_vault();
    let store = PropertyStore::new(FsVault::new(dir.path())).unwrap();
    let local = store.resolve_local("projects/plan.md").unwrap();
    assert_eq!(local.keys().collect::<Vec<_>>(), vec!["total", "owner"]);
    assert!(store.resolve_local("projects").is_none());
}

#[test]
fn test_read_and_write_body() {
    let dir = fs_vault();
    let vault = FsVault::new(dir.path());
    let body = vault.read_body("projects/plan.md").unwrap();
    assert!(body.ends_with("Body\n"));

    vault.write_body("projects/plan.md", "---\ntotal: 6\n---\n").unwrap();
    assert_eq!(vault.properties("projects/plan.md").unwrap()["total"], Value::Integer(6));
}

#[test]
fn test_find_properties_across_scopes() {
    let dir = fs_vault();
    let mut store = PropertyStore::new(FsVault::new(dir.path())).unwrap();
    store.refresh_for("projects/plan.md").unwrap();

    let properties = store.find_properties_containing("owner");
    let pairs: Vec<(&str, &str)> = properties
        .iter()
        .map(|p| (p.key.as_str(), p.value.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![("owner", "Kim"), ("projects/plan.md/owner", "Kim")]
    );
}

#[test]
fn test_document_paths_carry_their_properties() {
    let dir = fs_vault();
    let store = PropertyStore::new(FsVault::new(dir.path())).unwrap();
    let properties = store.find_properties_containing("plan");
    let pairs: Vec<(&str, &str)> = properties
        .iter()
        .map(|p| (p.key.as_str(), p.value.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("projects/plan.md", r#"{"total":5,"owner":"Kim"}"#),
            ("projects/plan.md/total", "5"),
            ("projects/plan.md/owner", "Kim"),
        ]
    );
}
