use std::io::Cursor;

use super::*;

fn png_1x1(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(1, 1, rgba.to_vec()).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let prepared = decode_image(&png_1x1([100, 50, 200, 128])).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn corrupt_image_is_an_error() {
    assert!(decode_image(b"not a png").is_err());
}

#[test]
fn decode_asset_dispatches_on_extension() {
    let png = png_1x1([1, 2, 3, 255]);
    let a = decode_asset("img/a.PNG", &png).unwrap();
    assert_eq!(a.as_image("img/a.PNG").unwrap().width, 1);
    assert!(a.as_font("img/a.PNG").is_err());

    let font = decode_asset("fonts/x.ttf", &[0, 1, 0, 0, 9, 9]).unwrap();
    assert!(matches!(font, DecodedAsset::Font(_)));
    assert!(decode_asset("fonts/x.ttf", b"GIF89a").is_err());
}

#[test]
fn font_validation_checks_magic() {
    assert!(validate_font(b"OTTO....").is_ok());
    assert!(validate_font(b"ttcf....").is_ok());
    assert!(validate_font(b"wOF").is_err());
    assert!(validate_font(b"wOFF....").is_err());
}
