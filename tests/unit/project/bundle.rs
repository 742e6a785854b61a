use super::*;

#[test]
fn normalize_rel_path_cleans_separators_and_dots() {
    assert_eq!(normalize_rel_path("img\\bg.png").unwrap(), "img/bg.png");
    assert_eq!(normalize_rel_path("./a//b/./c.png").unwrap(), "a/b/c.png");
}

#[test]
fn normalize_rel_path_rejects_escapes() {
    assert!(normalize_rel_path("/etc/passwd").is_err());
    assert!(normalize_rel_path("a/../../b").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn lookups_use_normalized_keys() {
    let b = ProjectBundle::from_files([("img/./bg.png", vec![1u8, 2, 3])]).unwrap();
    assert_eq!(b.get("img/bg.png"), Some(&[1u8, 2, 3][..]));
    assert_eq!(b.get("img\\bg.png"), Some(&[1u8, 2, 3][..]));
    assert_eq!(b.len(), 1);
}

#[test]
fn from_dir_reads_nested_files() {
    let root = std::env::temp_dir().join(format!("zepp_bundle_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(root.join("img/sub")).unwrap();
    std::fs::write(root.join("app.json"), b"{}").unwrap();
    std::fs::write(root.join("img/sub/x.png"), b"px").unwrap();

    let b = ProjectBundle::from_dir(&root).unwrap();
    assert_eq!(b.get("app.json"), Some(&b"{}"[..]));
    assert_eq!(b.get("img/sub/x.png"), Some(&b"px"[..]));

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn from_dir_rejects_missing_root() {
    let err = ProjectBundle::from_dir("/definitely/not/here").unwrap_err();
    assert!(matches!(err, PlayerError::ProjectLoad(_)));
}
