//! Decode encoder output with an independent PNG reader.

use image::ImageFormat;
use imgpack::png::{encode_png, encode_png_rgb, GrayPlane, RgbPlanes};

fn decode(png: &[u8]) -> image::RgbImage {
    image::load_from_memory_with_format(png, ImageFormat::Png)
        .expect("valid PNG")
        .to_rgb8()
}

#[test]
fn test_solid_red_2x2() {
    let png = encode_png_rgb(2, 2, |_, _| [255, 0, 0]).unwrap();
    let img = decode(&png);
    assert_eq!(img.dimensions(), (2, 2));
    assert!(img.pixels().all(|p| p.0 == [255, 0, 0]));
}

#[test]
fn test_single_pixel() {
    let png = encode_png_rgb(1, 1, |_, _| [1, 2, 3]).unwrap();
    assert_eq!(decode(&png).get_pixel(0, 0).0, [1, 2, 3]);
}

#[test]
fn test_odd_dimensions_gradient() {
    let (w, h) = (17u32, 5u32);
    let png = encode_png_rgb(w, h, |x, y| [x as u8 * 15, y as u8 * 50, (x + y) as u8]).unwrap();
    let img = decode(&png);
    assert_eq!(img.dimensions(), (w, h));
    for y in 0..h {
        for x in 0..w {
            assert_eq!(img.get_pixel(x, y).0, [x as u8 * 15, y as u8 * 50, (x + y) as u8]);
        }
    }
}

#[test]
fn test_grayscale_as_rgb() {
    let data: Vec<u8> = (0..12).map(|i| i * 20).collect();
    let png = encode_png(&GrayPlane::new(4, 3, &data)).unwrap();
    let img = decode(&png);
    assert_eq!(img.get_pixel(3, 2).0, [220, 220, 220]);
    assert_eq!(img.get_pixel(1, 0).0, [20, 20, 20]);
}

#[test]
fn test_planar_rgb() {
    let r = [10u8, 20, 30, 40];
    let g = [50u8, 60, 70, 80];
    let b = [90u8, 100, 110, 120];
    let png = encode_png(&RgbPlanes::new(2, 2, &r, &g, &b)).unwrap();
    let img = decode(&png);
    assert_eq!(img.get_pixel(0, 0).0, [10, 50, 90]);
    assert_eq!(img.get_pixel(1, 1).0, [40, 80, 120]);
}
