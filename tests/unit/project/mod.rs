use super::*;

fn manifest_json(extra: &str) -> String {
    format!(
        r#"{{
            "app": {{"appId": 1000, "appName": "Demo", "appType": "watchface"}},
            "screen": {{"width": 192, "height": 490}},
            "pages": ["watchface/index.zs"]{extra}
        }}"#
    )
}

fn bundle(manifest: String, page: &str) -> ProjectBundle {
    ProjectBundle::from_files([
        (MANIFEST_FILE, manifest.into_bytes()),
        ("watchface/index.zs", page.as_bytes().to_vec()),
    ])
    .unwrap()
}

#[test]
fn minimal_bundle_compiles_with_conventional_hooks() {
    let p = Project::from_bundle(bundle(
        manifest_json(""),
        "fn init() {} fn draw() { fill_rect(0, 0, 10, 10, 0xffffff); }",
    ))
    .unwrap();
    assert_eq!(p.identity(), "1000");
    assert_eq!(p.screen(), ScreenSize::new(192, 490).unwrap());
    assert_eq!(p.shift_step_ms(), 1000);
    assert_eq!(p.hooks().init.as_deref(), Some("init"));
    assert_eq!(p.hooks().draw.as_deref(), Some("draw"));
    assert_eq!(p.hooks().shift, None);
    assert_eq!(p.hooks().back, None);
    assert_eq!(p.manifest().app.app_type, AppType::Watchface);
}

#[test]
fn declared_hooks_must_exist() {
    let err = Project::from_bundle(bundle(
        manifest_json(r#", "hooks": {"draw": "render"}"#),
        "fn draw() {}",
    ))
    .unwrap_err();
    assert!(err.to_string().contains("render"));
}

#[test]
fn malformed_manifest_is_a_load_error() {
    let err = Project::from_bundle(bundle("{ not json".to_owned(), "")).unwrap_err();
    assert!(matches!(err, PlayerError::ProjectLoad(_)));

    let err = Project::from_bundle(bundle(
        manifest_json(r#", "mystery": 1"#),
        "",
    ))
    .unwrap_err();
    assert!(err.to_string().contains("mystery"));
}

#[test]
fn missing_declared_resource_fails() {
    let err = Project::from_bundle(bundle(
        manifest_json(r#", "resources": ["img/bg.png"]"#),
        "fn draw() {}",
    ))
    .unwrap_err();
    assert!(err.to_string().contains("missing resource 'img/bg.png'"));
}

#[test]
fn syntax_error_reports_page_line_and_column() {
    let err = Project::from_bundle(bundle(manifest_json(""), "fn draw() {\n  let = 3;\n}"))
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("watchface/index.zs:2:"), "{msg}");
}

#[test]
fn zero_screen_is_rejected() {
    let manifest = r#"{"app": {"appId": 1, "appName": "x"}, "screen": {"width": 0, "height": 10}, "pages": ["p.zs"]}"#;
    let b = ProjectBundle::from_files([(MANIFEST_FILE, manifest), ("p.zs", "")]).unwrap();
    assert!(Project::from_bundle(b).is_err());
}

#[test]
fn fingerprint_tracks_resource_bytes() {
    let a = Project::from_bundle(bundle(manifest_json(""), "fn draw() {}")).unwrap();
    let b = Project::from_bundle(bundle(manifest_json(""), "fn draw() {}")).unwrap();
    let c = Project::from_bundle(bundle(manifest_json(""), "fn draw() { }")).unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), c.fingerprint());
}
