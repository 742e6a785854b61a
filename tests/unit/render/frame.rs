use super::*;

#[test]
fn filled_frame_has_expected_size_and_pixels() {
    let f = FrameRGBA::filled(ScreenSize::new(3, 2).unwrap(), [1, 2, 3, 255]);
    assert_eq!(f.data.len(), 24);
    assert_eq!(f.pixel(2, 1), Some([1, 2, 3, 255]));
    assert_eq!(f.pixel(3, 0), None);
    f.check_len().unwrap();
}

#[test]
fn straight_alpha_unpremultiplies() {
    let f = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![64, 32, 0, 128, 0, 0, 0, 0],
        premultiplied: true,
    };
    assert_eq!(f.to_straight_rgba8(), vec![128, 64, 0, 128, 0, 0, 0, 0]);

    let straight = FrameRGBA {
        premultiplied: false,
        ..f.clone()
    };
    assert_eq!(straight.to_straight_rgba8(), f.data);
}
