use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PlayerError::project_load("x")
            .to_string()
            .contains("project load error:")
    );
    assert!(
        PlayerError::runtime("x")
            .to_string()
            .contains("runtime error:")
    );
    assert!(PlayerError::asset("x").to_string().contains("asset error:"));
    assert!(
        PlayerError::render("x")
            .to_string()
            .contains("render error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PlayerError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert!(!err.is_app_fault());
    assert!(PlayerError::runtime("x").is_app_fault());
}
