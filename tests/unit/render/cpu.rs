use super::*;
use crate::assets::TextAlign;

fn size() -> ScreenSize {
    ScreenSize::new(16, 16).unwrap()
}

fn pixel(pm: &vello_cpu::Pixmap, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * 16 + x) * 4) as usize;
    let d = pm.data_as_u8_slice();
    [d[i], d[i + 1], d[i + 2], d[i + 3]]
}

fn draw(op: DrawOp, assets: &ResolvedAssets) -> (vello_cpu::Pixmap, bool) {
    let mut r = CpuRasterizer::new();
    r.begin_pass();
    let mut pm = vello_cpu::Pixmap::new(16, 16);
    let ok = r.draw_op(&op, assets, size(), &mut pm).unwrap();
    (pm, ok)
}

#[test]
fn fill_rect_covers_only_its_area() {
    let (pm, ok) = draw(
        DrawOp::FillRect {
            rect: Rect::new(0.0, 0.0, 8.0, 8.0),
            radius: 0.0,
            color: Rgba8::rgb(0, 255, 0),
        },
        &ResolvedAssets::new(),
    );
    assert!(ok);
    assert_eq!(pixel(&pm, 3, 3), [0, 255, 0, 255]);
    assert_eq!(pixel(&pm, 12, 12), [0, 0, 0, 0]);
}

#[test]
fn scratch_is_replaced_between_ops() {
    let mut r = CpuRasterizer::new();
    let mut pm = vello_cpu::Pixmap::new(16, 16);
    let assets = ResolvedAssets::new();
    r.draw_op(
        &DrawOp::FillRect {
            rect: Rect::new(0.0, 0.0, 16.0, 16.0),
            radius: 0.0,
            color: Rgba8::rgb(255, 0, 0),
        },
        &assets,
        size(),
        &mut pm,
    )
    .unwrap();
    r.draw_op(
        &DrawOp::FillCircle {
            center: Point::new(2.0, 2.0),
            radius: 1.0,
            color: Rgba8::rgb(0, 0, 255),
        },
        &assets,
        size(),
        &mut pm,
    )
    .unwrap();
    assert_eq!(pixel(&pm, 12, 12), [0, 0, 0, 0]);
}

#[test]
fn image_draws_at_origin() {
    let img = DecodedImage {
        width: 2,
        height: 2,
        rgba8_premul: Arc::new([0u8, 0, 255, 255].repeat(4)),
    };
    let mut assets = ResolvedAssets::new();
    assets.insert("dot.png".to_owned(), Ok(Arc::new(DecodedAsset::Image(img))));
    let (pm, ok) = draw(
        DrawOp::Image {
            path: "dot.png".to_owned(),
            origin: Point::new(4.0, 4.0),
            size: Some((4.0, 4.0)),
            alpha: 255,
        },
        &assets,
    );
    assert!(ok);
    assert_eq!(pixel(&pm, 5, 5), [0, 0, 255, 255]);
    assert_eq!(pixel(&pm, 1, 1), [0, 0, 0, 0]);
}

#[test]
fn missing_image_becomes_placeholder() {
    let mut assets = ResolvedAssets::new();
    assets.insert("gone.png".to_owned(), Err("missing".to_owned()));
    let (pm, ok) = draw(
        DrawOp::Image {
            path: "gone.png".to_owned(),
            origin: Point::new(0.0, 0.0),
            size: Some((8.0, 8.0)),
            alpha: 255,
        },
        &assets,
    );
    assert!(!ok);
    assert_ne!(pixel(&pm, 4, 4)[3], 0);
    assert_eq!(pixel(&pm, 12, 12), [0, 0, 0, 0]);
}

#[test]
fn text_without_font_becomes_placeholder() {
    let (pm, ok) = draw(
        DrawOp::Text {
            text: "12:00".to_owned(),
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            size_px: 8.0,
            color: Rgba8::rgb(255, 255, 255),
            font: None,
            align: TextAlign::Left,
        },
        &ResolvedAssets::new(),
    );
    assert!(!ok);
    assert_ne!(pixel(&pm, 5, 5)[3], 0);
}

#[test]
fn zone_outlines_leave_interior_clear() {
    let zone = EventZone {
        id: "z".to_owned(),
        shape: ZoneShape::Rect(Rect::new(2.0, 2.0, 14.0, 14.0)),
        z_index: 0,
        handler: "h".to_owned(),
        phases: vec![crate::runtime::zones::PointerPhase::Up],
        seq: 0,
    };
    let mut r = CpuRasterizer::new();
    let mut pm = vello_cpu::Pixmap::new(16, 16);
    r.draw_zone_outlines([zone].iter(), size(), &mut pm)
        .unwrap();
    assert_ne!(pixel(&pm, 2, 8)[3], 0);
    assert_eq!(pixel(&pm, 8, 8), [0, 0, 0, 0]);
}

#[test]
fn huge_arc_sweep_renders_promptly() {
    let start = std::time::Instant::now();
    let (pm, ok) = draw(
        DrawOp::StrokeArc {
            center: Point::new(8.0, 8.0),
            radius: 5.0,
            start_deg: 0.0,
            end_deg: 3.6e8,
            line_width: 2.0,
            color: Rgba8::rgb(255, 255, 255),
        },
        &ResolvedAssets::new(),
    );
    assert!(ok);
    assert!(start.elapsed() < std::time::Duration::from_secs(5));
    assert_ne!(pixel(&pm, 8, 3)[3], 0);
    assert_eq!(pixel(&pm, 8, 8), [0, 0, 0, 0]);
}
