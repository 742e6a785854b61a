use super::*;

fn state() -> DeviceState {
    let mut s = DeviceState::new(
        *DeviceProfile::by_name("round_192").unwrap(),
        Arc::new(AssetResolver::new()),
    );
    s.storage.set_namespace("test");
    s
}

fn call(s: &mut DeviceState, name: &str, args: Vec<Value>) -> Result<Value, ExecError> {
    s.call(name, &args).expect("host function exists")
}

fn n(v: f64) -> Value {
    Value::Num(v)
}

#[test]
fn drawing_calls_record_ops_in_order() {
    let mut s = state();
    call(&mut s, "fill_rect", vec![n(0.0), n(0.0), n(10.0), n(5.0), n(255.0)]).unwrap();
    call(&mut s, "fill_circle", vec![n(5.0), n(5.0), n(3.0), n(f64::from(0x80ff_0000u32))]).unwrap();
    call(&mut s, "line", vec![n(0.0), n(0.0), n(9.0), n(9.0), n(0.0), n(2.0)]).unwrap();
    let kinds: Vec<&str> = s.ops.iter().map(DrawOp::kind).collect();
    assert_eq!(kinds, ["fill_rect", "fill_circle", "line"]);
    assert_eq!(
        s.ops[0],
        DrawOp::FillRect {
            rect: Rect::new(0.0, 0.0, 10.0, 5.0),
            radius: 0.0,
            color: Rgba8::rgb(0, 0, 255),
        }
    );
    let DrawOp::FillCircle { color, .. } = &s.ops[1] else {
        panic!("expected circle");
    };
    assert_eq!(color.a, 0x80);
}

#[test]
fn bad_arguments_are_reported() {
    let mut s = state();
    let err = call(&mut s, "fill_rect", vec![n(0.0)]).unwrap_err();
    assert!(err.message.contains("expected 5..6 args"));
    let err = call(&mut s, "fill_rect", vec![n(0.0), n(0.0), n(-1.0), n(1.0), n(0.0)]).unwrap_err();
    assert!(err.message.contains(">= 0"));
    let err = call(&mut s, "image", vec![n(1.0), n(0.0), n(0.0)]).unwrap_err();
    assert!(err.message.contains("expected string"));
    assert!(s.ops.is_empty());
}

#[test]
fn unknown_names_fall_through() {
    let mut s = state();
    assert!(s.call("launch_missiles", &[]).is_none());
}

#[test]
fn text_uses_current_font_and_set_font_null_restores_default() {
    let mut s = state();
    s.default_font = Some("fonts/main.ttf".into());
    s.reset_transient();
    let text_args = || {
        vec![n(0.0), n(0.0), n(100.0), n(20.0), n(16.0), n(0xffffff as f64), Value::from("hi")]
    };
    call(&mut s, "text", text_args()).unwrap();
    call(&mut s, "set_font", vec![Value::from("fonts/alt.ttf")]).unwrap();
    call(&mut s, "text", text_args()).unwrap();
    call(&mut s, "set_font", vec![Value::Null]).unwrap();
    call(&mut s, "text", text_args()).unwrap();
    let fonts: Vec<Option<&str>> = s
        .ops
        .iter()
        .map(|op| match op {
            DrawOp::Text { font, .. } => font.as_deref(),
            _ => None,
        })
        .collect();
    assert_eq!(
        fonts,
        [Some("fonts/main.ttf"), Some("fonts/alt.ttf"), Some("fonts/main.ttf")]
    );
}

#[test]
fn zones_register_with_defaults_and_explicit_phases() {
    let mut s = state();
    call(
        &mut s,
        "zone_rect",
        vec![Value::from("btn"), n(0.0), n(0.0), n(50.0), n(50.0), Value::from("on_btn")],
    )
    .unwrap();
    call(
        &mut s,
        "zone_circle",
        vec![
            n(7.0),
            n(25.0),
            n(25.0),
            n(5.0),
            Value::from("on_dot"),
            n(3.0),
            Value::from("up"),
        ],
    )
    .unwrap();
    let top = s.zones.hit_test(Point::new(25.0, 25.0)).unwrap();
    assert_eq!(top.id, "7");
    assert_eq!(top.z_index, 3);
    assert_eq!(top.phases, vec![PointerPhase::Up]);
    let btn = s.zones.hit_test(Point::new(2.0, 2.0)).unwrap();
    assert_eq!(btn.phases.len(), 3);

    assert_eq!(call(&mut s, "zone_remove", vec![n(7.0)]).unwrap(), Value::Bool(true));
    assert!(call(
        &mut s,
        "zone_rect",
        vec![
            Value::from("x"),
            n(0.0),
            n(0.0),
            n(1.0),
            n(1.0),
            Value::from("h"),
            n(0.0),
            Value::from("tap"),
        ],
    )
    .is_err());
}

#[test]
fn storage_round_trips_script_values() {
    let mut s = state();
    let list = Value::List(vec![n(1.0), Value::from("a")]);
    call(&mut s, "storage_set", vec![Value::from("k"), list.clone()]).unwrap();
    assert_eq!(call(&mut s, "storage_get", vec![Value::from("k")]).unwrap(), list);
    assert_eq!(
        call(&mut s, "storage_get", vec![Value::from("missing"), n(9.0)]).unwrap(),
        n(9.0)
    );
    call(&mut s, "storage_set", vec![Value::from("k"), Value::Null]).unwrap();
    assert_eq!(call(&mut s, "storage_get", vec![Value::from("k")]).unwrap(), Value::Null);
}

#[test]
fn timers_schedule_relative_to_clock_and_cancel() {
    let mut s = state();
    s.clock_ms = 500;
    let id = call(&mut s, "timer_once", vec![n(100.0), Value::from("h")]).unwrap();
    call(&mut s, "timer_every", vec![n(50.0), Value::from("g"), n(1.0)]).unwrap();
    assert_eq!(s.timers.next_due(), Some(550));
    assert_eq!(
        call(&mut s, "timer_cancel", vec![id.clone()]).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(call(&mut s, "timer_cancel", vec![id]).unwrap(), Value::Bool(false));
    assert!(call(&mut s, "timer_once", vec![n(-1.0), Value::from("h")]).is_err());
}

#[test]
fn constants_reflect_profile_and_view() {
    let mut s = state();
    s.render_level = RenderLevel::Aod;
    s.rotation = Rotation::Deg270;
    s.clock_ms = 61_000;
    assert_eq!(call(&mut s, "screen_width", vec![]).unwrap(), n(192.0));
    assert_eq!(call(&mut s, "screen_shape", vec![]).unwrap(), Value::from("round"));
    assert_eq!(call(&mut s, "render_level", vec![]).unwrap(), n(2.0));
    assert_eq!(call(&mut s, "rotation", vec![]).unwrap(), n(270.0));
    assert_eq!(call(&mut s, "now", vec![]).unwrap(), n(61_000.0));
    assert_eq!(
        call(&mut s, "clock", vec![]).unwrap(),
        Value::List(vec![n(10.0), n(10.0), n(31.0)])
    );
    assert!(call(&mut s, "now", vec![n(1.0)]).is_err());
}

#[test]
fn log_joins_args_into_console() {
    let mut s = state();
    call(&mut s, "log", vec![Value::from("steps"), n(42.0), Value::Bool(true)]).unwrap();
    assert_eq!(s.console, vec!["steps 42 true".to_owned()]);
}

#[test]
fn asset_load_returns_null_for_missing() {
    let mut s = state();
    assert_eq!(call(&mut s, "asset_load", vec![Value::from("nope.png")]).unwrap(), Value::Null);
}

#[test]
fn draw_op_cap_is_enforced() {
    let mut s = state();
    for _ in 0..MAX_DRAW_OPS {
        s.ops.push(DrawOp::FillCircle {
            center: Point::ZERO,
            radius: 1.0,
            color: Rgba8::BLACK,
        });
    }
    let err = call(&mut s, "fill_circle", vec![n(0.0), n(0.0), n(1.0), n(0.0)]).unwrap_err();
    assert!(err.message.contains("draw ops"));
}

#[test]
fn arc_sweep_is_limited_to_one_turn() {
    let mut s = state();
    let args = |end: f64| vec![n(96.0), n(96.0), n(40.0), n(30.0), n(end), n(0.0)];
    call(&mut s, "stroke_arc", args(3_600_000.0)).unwrap();
    call(&mut s, "stroke_arc", args(-1e308)).unwrap();
    call(&mut s, "stroke_arc", args(120.0)).unwrap();
    let ends: Vec<f64> = s
        .ops
        .iter()
        .map(|op| match op {
            DrawOp::StrokeArc { end_deg, .. } => *end_deg,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(ends, [390.0, -330.0, 120.0]);
}
