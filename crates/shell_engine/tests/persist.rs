use std::fs;

use serde_json::{json, Map, Value};
use shell_engine::{PersistError, StoreDir};
use tempfile::TempDir;

fn theme(name: &str) -> Map<String, Value> {
    let mut values = Map::new();
    values.insert("currentTheme".to_string(), json!(name));
    values
}

#[test]
fn replace_creates_the_directory_and_overwrites() {
    let temp = TempDir::new().unwrap();
    let dir = StoreDir::new(temp.path().join("data"));
    assert_eq!(dir.read("settings.json").unwrap(), None);

    let first = dir.replace("settings.json", &theme("light")).unwrap();
    let second = dir.replace("settings.json", &theme("dark")).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, temp.path().join("data").join("settings.json"));
    let text = dir.read("settings.json").unwrap().unwrap();
    assert!(text.ends_with('\n'));
    assert_eq!(
        serde_json::from_str::<Value>(&text).unwrap(),
        json!({"currentTheme": "dark"})
    );
    let leftovers = fs::read_dir(dir.root()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[test]
fn namespace_is_a_plain_file_name() {
    let temp = TempDir::new().unwrap();
    let dir = StoreDir::new(temp.path().to_path_buf());

    for namespace in ["", "../settings.json", "nested/settings.json"] {
        assert!(matches!(
            dir.replace(namespace, &theme("light")),
            Err(PersistError::InvalidNamespace(_))
        ));
    }
}

#[test]
fn root_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let dir = StoreDir::new(file_path.clone());
    let result = dir.replace("settings.json", &theme("light"));

    assert!(matches!(result, Err(PersistError::NotADirectory(_))));
    assert_eq!(fs::read_to_string(&file_path).unwrap(), "x");
}
