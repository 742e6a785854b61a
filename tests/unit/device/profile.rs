use super::*;

#[test]
fn default_profile_is_first_and_registered() {
    let d = DeviceProfile::default();
    assert_eq!(d.name, DeviceProfile::DEFAULT_NAME);
    assert_eq!(DeviceProfile::all()[0], d);
    assert_eq!(DeviceProfile::by_name("mi_band7").unwrap(), &d);
}

#[test]
fn unknown_profile_lists_known_names() {
    let err = DeviceProfile::by_name("pebble").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("pebble"));
    assert!(msg.contains("square_240"));
}

#[test]
fn names_are_unique() {
    let mut names: Vec<&str> = DeviceProfile::all().iter().map(|p| p.name).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), DeviceProfile::all().len());
}

#[test]
fn round_shape_masks_corners_but_not_center() {
    let p = DeviceProfile::by_name("round_192").unwrap();
    assert!(p.shape.covers(p.screen, 96, 96));
    assert!(p.shape.covers(p.screen, 96, 0));
    assert!(!p.shape.covers(p.screen, 0, 0));
    assert!(!p.shape.covers(p.screen, 191, 191));
}

#[test]
fn rounded_rect_keeps_edges_and_clips_corner() {
    let p = DeviceProfile::by_name("mi_band7").unwrap();
    assert!(p.shape.covers(p.screen, 0, 245));
    assert!(p.shape.covers(p.screen, 96, 0));
    assert!(!p.shape.covers(p.screen, 0, 0));
    assert!(!p.shape.covers(p.screen, 191, 489));
}

#[test]
fn rect_shape_covers_everything() {
    let p = DeviceProfile::by_name("square_240").unwrap();
    assert!(p.shape.covers(p.screen, 0, 0));
    assert!(p.shape.covers(p.screen, 239, 239));
    assert_eq!(p.shape.as_str(), "rect");
}

#[test]
fn rotated_size_swaps_axes_for_quarter_turns() {
    let p = DeviceProfile::default();
    assert_eq!(p.rotated_size(Rotation::Deg90).width, 490);
    assert_eq!(p.rotated_size(Rotation::Deg180).width, 192);
}
