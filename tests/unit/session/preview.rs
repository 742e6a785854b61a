use serde_json::json;

use super::*;
use crate::project::{MANIFEST_FILE, Project, ProjectBundle};

const CLOCK: &str = r#"
let shifts = 0;
fn shift() { shifts = shifts + 1; }
fn draw() {
    if (render_level() == 2) { fill_rect(0, 0, 240, 240, 0x000000); }
    else { fill_rect(0, 0, 240, 240, 0x3366ff); }
    fill_circle(120, 120, 20, 0xffffff);
}
"#;

fn manifest() -> String {
    json!({
        "app": {"appId": 5, "appName": "clock"},
        "screen": {"width": 240, "height": 240},
        "pages": ["index.zs"]
    })
    .to_string()
}

fn player() -> Player {
    let mut p = Player::new("square_240").unwrap();
    let bundle = ProjectBundle::from_files([
        (MANIFEST_FILE, manifest().into_bytes()),
        ("index.zs", CLOCK.as_bytes().to_vec()),
    ])
    .unwrap();
    p.load(Project::from_bundle(bundle).unwrap()).unwrap();
    p.init().unwrap();
    p
}

#[test]
fn still_with_stages_keeps_caller_config() {
    let mut p = player();
    let out = p.preview(&PreviewOpts::default().with_stages(true)).unwrap();
    assert_eq!(out.stages.len(), 2);
    assert_eq!(out.stages.last(), Some(&out.preview));
    assert!(out.frames.is_empty());
    assert_eq!(p.config().render_level, RenderLevel::Normal);
}

#[test]
fn animated_frames_switch_to_aod_halfway_and_shift_each_frame() {
    let mut p = player();
    let out = p.preview(&PreviewOpts::default().with_frames(4)).unwrap();
    assert_eq!(out.frames.len(), 4);
    assert_eq!(out.frames[1].pixel(5, 5), Some([0x33, 0x66, 0xff, 255]));
    assert_eq!(out.frames[2].pixel(5, 5), Some([0, 0, 0, 255]));
    assert_eq!(p.runtime().global("shifts"), Some(&crate::script::Value::Num(4.0)));
}

#[test]
fn default_animation_length() {
    assert_eq!(PreviewOpts::ANIMATED_FRAMES, 120);
}

#[test]
fn batch_counts_failures_and_continues() {
    let root = std::env::temp_dir().join(format!("zepp_preview_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&root);
    let good = root.join("good");
    std::fs::create_dir_all(&good).unwrap();
    std::fs::write(good.join(MANIFEST_FILE), manifest()).unwrap();
    std::fs::write(good.join("index.zs"), CLOCK).unwrap();
    let missing = root.join("missing");

    let opts = PreviewOpts::default().with_profile("square_240");
    let mut seen = Vec::new();
    let summary = preview_batch(&[&missing, &good], &opts, |path, out| {
        seen.push((path.to_path_buf(), out.preview.width));
        Ok(())
    });

    assert_eq!(summary, BatchSummary { processed: 1, failed: 1 });
    assert_eq!(seen, vec![(good.clone(), 240)]);
    std::fs::remove_dir_all(&root).unwrap();
}
