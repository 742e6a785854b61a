use std::io::Cursor;
use std::sync::Barrier;

use super::*;

fn png(w: u32, h: u32) -> Arc<[u8]> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    Arc::from(buf)
}

fn table(entries: &[(&str, Arc<[u8]>)]) -> Arc<ResourceTable> {
    Arc::new(
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), Arc::clone(v)))
            .collect(),
    )
}

#[test]
fn concurrent_resolves_share_one_decode() {
    let r = AssetResolver::new();
    r.set_project_resources(table(&[("img/bg.png", png(4, 4))]), 1);

    let barrier = Barrier::new(8);
    let handles: Vec<Arc<DecodedAsset>> = std::thread::scope(|s| {
        let joins: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    r.resolve("img/bg.png", "round_192").unwrap()
                })
            })
            .collect();
        joins.into_iter().map(|j| j.join().unwrap()).collect()
    });

    assert_eq!(r.decode_count(), 1);
    assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
}

#[test]
fn variant_directory_wins_over_plain_path() {
    let r = AssetResolver::new();
    r.set_project_resources(
        table(&[("img/bg.png", png(1, 1)), ("round_192/img/bg.png", png(2, 2))]),
        1,
    );
    assert_eq!(r.resolve_image("img/bg.png", "round_192").unwrap().width, 2);
    assert_eq!(r.resolve_image("img/bg.png", "square_240").unwrap().width, 1);
}

#[test]
fn project_resources_shadow_system_resources() {
    let r = AssetResolver::new();
    r.register_system_resource("skins/s.png", png(3, 3).to_vec()).unwrap();
    r.set_project_resources(table(&[]), 1);
    assert_eq!(r.resolve_image("skins/s.png", "").unwrap().width, 3);

    r.set_project_resources(table(&[("skins/s.png", png(5, 5))]), 2);
    assert_eq!(r.resolve_image("skins/s.png", "").unwrap().width, 5);
}

#[test]
fn failures_are_cached_and_reported_as_asset_errors() {
    let r = AssetResolver::new();
    r.set_project_resources(table(&[("bad.png", Arc::from(&b"nope"[..]))]), 1);
    let err = r.resolve("missing.png", "").unwrap_err();
    assert!(matches!(err, PlayerError::Asset(_)));
    assert!(r.resolve("bad.png", "").is_err());
    assert!(r.resolve("bad.png", "").is_err());
    assert_eq!(r.decode_count(), 2);
}

#[test]
fn clear_forces_redecode_and_variant_is_part_of_the_key() {
    let r = AssetResolver::new();
    r.set_project_resources(table(&[("a.png", png(1, 1))]), 1);
    r.resolve("a.png", "round_192").unwrap();
    r.resolve("a.png", "round_192").unwrap();
    assert_eq!(r.decode_count(), 1);

    r.resolve("a.png", "square_240").unwrap();
    assert_eq!(r.decode_count(), 2);

    r.clear();
    assert_eq!(r.cached_len(), 0);
    r.resolve("a.png", "round_192").unwrap();
    assert_eq!(r.decode_count(), 3);
}

#[test]
fn same_fingerprint_keeps_cache_new_fingerprint_drops_it() {
    let r = AssetResolver::new();
    let t = table(&[("a.png", png(1, 1))]);
    r.set_project_resources(Arc::clone(&t), 7);
    r.resolve("a.png", "").unwrap();
    r.set_project_resources(Arc::clone(&t), 7);
    assert_eq!(r.cached_len(), 1);
    r.set_project_resources(t, 8);
    assert_eq!(r.cached_len(), 0);
}

#[test]
fn exists_probes_without_decoding() {
    let r = AssetResolver::new();
    r.set_project_resources(table(&[("a.png", png(1, 1))]), 1);
    assert!(r.exists("./a.png", "x"));
    assert!(!r.exists("b.png", "x"));
    assert!(!r.exists("../a.png", "x"));
    assert_eq!(r.decode_count(), 0);
}
