use genesys_types::*;

#[test]
fn new_image_is_zeroed() {
    let image = Image::new(5, 3, PixelFormat::Rgb888).unwrap();
    assert_eq!(image.row_bytes(), 15);
    assert_eq!(image.data().len(), 45);
    assert!(image.data().iter().all(|byte| *byte == 0));
}

#[test]
fn pixel_access() {
    let mut image = Image::new(4, 2, PixelFormat::I16).unwrap();
    image.set_pixel(3, 1, Pixel::gray(0xbeef)).unwrap();
    assert_eq!(image.get_pixel(3, 1).unwrap(), Pixel::gray(0xbeef));
    assert_eq!(image.get_raw_channel(3, 1, 0).unwrap(), 0xbeef);
    assert_eq!(&image.row(1)[6..8], &[0xef, 0xbe]);
    assert_eq!(image.get_pixel(3, 0).unwrap(), Pixel::gray(0));
}

#[test]
fn from_data_checks_length() {
    assert_eq!(
        Image::from_data(4, 2, PixelFormat::I8, vec![0; 7]),
        Err(Error::RowTooSmall {
            length: 7,
            required: 8
        })
    );
    let image = Image::from_data(4, 2, PixelFormat::I8, (0..10).collect()).unwrap();
    assert_eq!(image.row(1), &[4, 5, 6, 7]);
    assert_eq!(image.into_data().len(), 8);
}
