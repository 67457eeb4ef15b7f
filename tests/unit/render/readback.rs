use super::*;

#[test]
fn gpu_rows_are_flipped_to_top_down() {
    // 1x3 frame: bottom row first from the GPU.
    let gpu_rows = vec![
        3, 3, 3, 255, //
        2, 2, 2, 255, //
        1, 1, 1, 255,
    ];
    let frame = FrameRGBA::from_gpu_rows(1, 3, gpu_rows, ColorSpace::Srgb).unwrap();
    assert_eq!(frame.pixel(0, 0), Some([1, 1, 1, 255]));
    assert_eq!(frame.pixel(0, 2), Some([3, 3, 3, 255]));
    assert_eq!(frame.pixel(1, 0), None);
    assert!(!frame.premultiplied);
}

#[test]
fn flip_rows_handles_even_counts() {
    let mut data = vec![1, 1, 2, 2, 3, 3, 4, 4];
    flip_rows(&mut data, 2);
    assert_eq!(data, vec![4, 4, 3, 3, 2, 2, 1, 1]);
}

#[test]
fn wrong_length_is_rejected() {
    assert!(FrameRGBA::from_gpu_rows(2, 2, vec![0; 15], ColorSpace::Srgb).is_err());
}

#[test]
fn converts_to_an_image() {
    let frame = FrameRGBA::from_gpu_rows(2, 1, vec![9, 8, 7, 6, 5, 4, 3, 2], ColorSpace::Srgb)
        .unwrap();
    let img = frame.to_image().unwrap();
    assert_eq!(img.dimensions(), (2, 1));
    assert_eq!(img.get_pixel(1, 0).0, [5, 4, 3, 2]);
}
