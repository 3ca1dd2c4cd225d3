use genesys_types::*;

const ALL_FORMATS: [PixelFormat; 8] = [
    PixelFormat::I1,
    PixelFormat::Rgb111,
    PixelFormat::I8,
    PixelFormat::Rgb888,
    PixelFormat::Bgr888,
    PixelFormat::I16,
    PixelFormat::Rgb161616,
    PixelFormat::Bgr161616,
];

#[test]
fn row_bytes() {
    assert_eq!(get_pixel_row_bytes(PixelFormat::I1, 9).unwrap(), 2);
    assert_eq!(get_pixel_row_bytes(PixelFormat::Rgb111, 3).unwrap(), 2);
    assert_eq!(get_pixel_row_bytes(PixelFormat::I8, 10).unwrap(), 10);
    assert_eq!(get_pixel_row_bytes(PixelFormat::Bgr888, 10).unwrap(), 30);
    assert_eq!(get_pixel_row_bytes(PixelFormat::I16, 10).unwrap(), 20);
    assert_eq!(get_pixel_row_bytes(PixelFormat::Rgb161616, 10).unwrap(), 60);
    assert_eq!(
        get_pixel_row_bytes(PixelFormat::Unknown, 10),
        Err(Error::UnknownFormat)
    );
}

#[test]
fn format_width() {
    assert_eq!(get_pixel_format_width(PixelFormat::I1, 2).unwrap(), 16);
    assert_eq!(get_pixel_format_width(PixelFormat::Rgb888, 30).unwrap(), 10);
    assert_eq!(get_pixel_format_width(PixelFormat::Bgr161616, 61).unwrap(), 10);
}

#[test]
fn create_format() {
    for format in ALL_FORMATS {
        let created = create_pixel_format(
            format.depth().unwrap(),
            format.channels().unwrap(),
            format.color_order().unwrap(),
        )
        .unwrap();
        assert_eq!(created, format);
    }
    assert_eq!(
        create_pixel_format(8, 3, ColorOrder::Gbr),
        Err(Error::UnsupportedFormat {
            depth: 8,
            channels: 3,
            order: ColorOrder::Gbr,
        })
    );
    assert!(create_pixel_format(12, 1, ColorOrder::Rgb).is_err());
    assert!(create_pixel_format(1, 3, ColorOrder::Bgr).is_err());
}

#[test]
fn gray_8_to_rgb() {
    let input = [0x00u8, 0x7f, 0xff];
    let mut output = [0u8; 9];
    convert_pixel_row_format(&input, PixelFormat::I8, &mut output, PixelFormat::Rgb888, 3)
        .unwrap();
    assert_eq!(output, [0x00, 0x00, 0x00, 0x7f, 0x7f, 0x7f, 0xff, 0xff, 0xff]);
    for x in 0..3 {
        assert_eq!(
            get_raw_channel_from_row(&output, x, 0, PixelFormat::Rgb888).unwrap(),
            input[x] as u16
        );
    }
}

#[test]
fn rgb_to_bgr_swaps_channels() {
    let input = [1u8, 2, 3, 4, 5, 6];
    let mut output = [0u8; 6];
    convert_pixel_row_format(&input, PixelFormat::Rgb888, &mut output, PixelFormat::Bgr888, 2)
        .unwrap();
    assert_eq!(output, [3, 2, 1, 6, 5, 4]);
}

#[test]
fn rgb_to_gray_averages() {
    let input = [30u8, 60, 90];
    let mut output = [0u8; 1];
    convert_pixel_row_format(&input, PixelFormat::Rgb888, &mut output, PixelFormat::I8, 1)
        .unwrap();
    assert_eq!(output, [60]);
}

#[test]
fn scaling_between_depths() {
    let pixel = get_pixel_from_row(&[0xab], 0, PixelFormat::I8).unwrap();
    assert_eq!(pixel, Pixel::gray(0xabab));
    let mut wide = [0u8; 2];
    set_pixel_to_row(&mut wide, 0, pixel, PixelFormat::I16).unwrap();
    assert_eq!(wide, [0xab, 0xab]);
    let mut narrow = [0u8; 1];
    set_pixel_to_row(&mut narrow, 0, Pixel::gray(0x1234), PixelFormat::I8).unwrap();
    assert_eq!(narrow, [0x12]);
}

#[test]
fn one_bit_threshold() {
    let mut row = [0u8; 1];
    set_pixel_to_row(&mut row, 0, Pixel::gray(0x8001), PixelFormat::I1).unwrap();
    set_pixel_to_row(&mut row, 1, Pixel::gray(0x8000), PixelFormat::I1).unwrap();
    set_pixel_to_row(&mut row, 7, Pixel::gray(0xffff), PixelFormat::I1).unwrap();
    assert_eq!(row, [0b1000_0001]);
    assert_eq!(
        get_pixel_from_row(&row, 0, PixelFormat::I1).unwrap(),
        Pixel::gray(0xffff)
    );
    assert_eq!(
        get_pixel_from_row(&row, 1, PixelFormat::I1).unwrap(),
        Pixel::gray(0)
    );
}

#[test]
fn rgb111_raw_pixel() {
    let mut row = [0u8; 1];
    set_raw_pixel_to_row(&mut row, 0, RawPixel::new([0b101, 0, 0, 0, 0, 0]), PixelFormat::Rgb111)
        .unwrap();
    assert_eq!(row, [0b1010_0000]);
    assert_eq!(
        get_raw_pixel_from_row(&row, 0, PixelFormat::Rgb111).unwrap(),
        RawPixel::new([0b101, 0, 0, 0, 0, 0])
    );
    assert_eq!(
        get_pixel_from_row(&row, 0, PixelFormat::Rgb111).unwrap(),
        Pixel::new(0xffff, 0, 0xffff)
    );
}

#[test]
fn sixteen_bit_little_endian() {
    let mut row = [0u8; 6];
    set_raw_channel_to_row(&mut row, 0, 2, 0x1234, PixelFormat::Rgb161616).unwrap();
    assert_eq!(row, [0, 0, 0, 0, 0x34, 0x12]);
    assert_eq!(
        get_pixel_from_row(&row, 0, PixelFormat::Bgr161616).unwrap(),
        Pixel::new(0x1234, 0, 0)
    );
}

#[test]
fn unknown_format_is_rejected() {
    let mut row = [0u8; 6];
    assert_eq!(
        get_pixel_from_row(&row, 0, PixelFormat::Unknown),
        Err(Error::UnknownFormat)
    );
    assert_eq!(
        set_raw_channel_to_row(&mut row, 0, 0, 1, PixelFormat::Unknown),
        Err(Error::UnknownFormat)
    );
}

#[test]
fn convert_checks_lengths() {
    let input = [0u8; 2];
    let mut output = [0u8; 5];
    assert_eq!(
        convert_pixel_row_format(&input, PixelFormat::I8, &mut output, PixelFormat::Rgb888, 2),
        Err(Error::RowTooSmall {
            length: 5,
            required: 6
        })
    );
}

proptest::proptest! {
    #[test]
    fn same_format_conversion_is_identity(
        format_index in 0usize..8,
        data in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..96),
    ) {
        let format = ALL_FORMATS[format_index];
        let width = get_pixel_format_width(format, data.len()).unwrap();
        let bytes = get_pixel_row_bytes(format, width).unwrap();
        let mut output = vec![0u8; bytes];
        convert_pixel_row_format(&data, format, &mut output, format, width).unwrap();
        proptest::prop_assert_eq!(&output[..], &data[..bytes]);
    }

    #[test]
    fn raw_pixel_round_trip(
        format_index in 2usize..8,
        data in proptest::collection::vec(proptest::prelude::any::<u8>(), 6..64),
    ) {
        let format = ALL_FORMATS[format_index];
        let width = get_pixel_format_width(format, data.len()).unwrap();
        let mut output = vec![0u8; get_pixel_row_bytes(format, width).unwrap()];
        for x in 0..width {
            let raw = get_raw_pixel_from_row(&data, x, format).unwrap();
            set_raw_pixel_to_row(&mut output, x, raw, format).unwrap();
        }
        proptest::prop_assert_eq!(&output[..], &data[..output.len()]);
    }
}
