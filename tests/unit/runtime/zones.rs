use super::*;

fn all() -> Vec<PointerPhase> {
    PointerPhase::ALL.to_vec()
}

#[test]
fn circle_over_lower_rect_wins_at_center() {
    let mut r = EventZoneRegistry::new();
    let center = Point::new(96.0, 96.0);
    r.register(
        "circle".into(),
        ZoneShape::Circle { center, radius: 10.0 },
        1,
        "on_circle".into(),
        all(),
    );
    r.register(
        "rect".into(),
        ZoneShape::Rect(Rect::new(50.0, 50.0, 150.0, 150.0)),
        0,
        "on_rect".into(),
        all(),
    );
    assert_eq!(r.hit_test(center).unwrap().id, "circle");
    assert_eq!(r.hit_test(Point::new(60.0, 60.0)).unwrap().id, "rect");
    assert!(r.hit_test(Point::new(10.0, 10.0)).is_none());
}

#[test]
fn equal_z_resolves_to_most_recent_registration() {
    let mut r = EventZoneRegistry::new();
    let rect = ZoneShape::Rect(Rect::new(0.0, 0.0, 10.0, 10.0));
    r.register("a".into(), rect, 0, "h".into(), all());
    r.register("b".into(), rect, 0, "h".into(), all());
    assert_eq!(r.hit_test(Point::new(5.0, 5.0)).unwrap().id, "b");

    r.register("a".into(), rect, 0, "h".into(), all());
    assert_eq!(r.len(), 2);
    assert_eq!(r.hit_test(Point::new(5.0, 5.0)).unwrap().id, "a");
}

#[test]
fn remove_and_clear() {
    let mut r = EventZoneRegistry::new();
    let rect = ZoneShape::Rect(Rect::new(0.0, 0.0, 10.0, 10.0));
    r.register("a".into(), rect, 0, "h".into(), all());
    assert!(r.remove("a"));
    assert!(!r.remove("a"));
    r.register("b".into(), rect, 0, "h".into(), all());
    r.clear();
    assert!(r.is_empty());
}

#[test]
fn rect_edges_are_inclusive_and_circle_bounds_enclose() {
    let s = ZoneShape::Rect(Rect::new(0.0, 0.0, 10.0, 10.0));
    assert!(s.contains(Point::new(10.0, 10.0)));
    let c = ZoneShape::Circle {
        center: Point::new(5.0, 5.0),
        radius: 2.0,
    };
    assert_eq!(c.bounds(), Rect::new(3.0, 3.0, 7.0, 7.0));
    assert!(!c.contains(Point::new(3.0, 3.0)));
}

#[test]
fn phases_parse_and_listen() {
    assert_eq!(PointerPhase::parse("up"), Some(PointerPhase::Up));
    assert_eq!(PointerPhase::parse("UP"), None);
    let mut r = EventZoneRegistry::new();
    r.register(
        "a".into(),
        ZoneShape::Rect(Rect::new(0.0, 0.0, 1.0, 1.0)),
        0,
        "h".into(),
        vec![PointerPhase::Up],
    );
    let z = r.iter().next().unwrap();
    assert!(z.listens(PointerPhase::Up));
    assert!(!z.listens(PointerPhase::Down));
}
