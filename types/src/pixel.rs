use crate::Error;

/// Order in which color channels are laid out in memory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ColorOrder {
    Rgb,
    Gbr,
    Bgr,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PixelFormat {
    Unknown,
    I1,
    Rgb111,
    I8,
    Rgb888,
    Bgr888,
    I16,
    Rgb161616,
    Bgr161616,
}

impl PixelFormat {
    pub fn depth(self) -> Result<usize, Error> {
        match self {
            Self::I1 | Self::Rgb111 => Ok(1),
            Self::I8 | Self::Rgb888 | Self::Bgr888 => Ok(8),
            Self::I16 | Self::Rgb161616 | Self::Bgr161616 => Ok(16),
            Self::Unknown => Err(Error::UnknownFormat),
        }
    }

    pub fn channels(self) -> Result<usize, Error> {
        match self {
            Self::I1 | Self::I8 | Self::I16 => Ok(1),
            Self::Rgb111
            | Self::Rgb888
            | Self::Bgr888
            | Self::Rgb161616
            | Self::Bgr161616 => Ok(3),
            Self::Unknown => Err(Error::UnknownFormat),
        }
    }

    pub fn color_order(self) -> Result<ColorOrder, Error> {
        match self {
            Self::I1 | Self::Rgb111 | Self::I8 | Self::Rgb888 | Self::I16 | Self::Rgb161616 => {
                Ok(ColorOrder::Rgb)
            }
            Self::Bgr888 | Self::Bgr161616 => Ok(ColorOrder::Bgr),
            Self::Unknown => Err(Error::UnknownFormat),
        }
    }

    /// Bytes used by one pixel, or `None` for packed 1-bit formats.
    pub fn bytes_per_pixel(self) -> Result<Option<usize>, Error> {
        let depth = self.depth()?;
        if depth < 8 {
            Ok(None)
        } else {
            Ok(Some(depth / 8 * self.channels()?))
        }
    }
}

/// Logical pixel value, always 16 bits per channel.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

impl Pixel {
    pub const fn new(r: u16, g: u16, b: u16) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(value: u16) -> Self {
        Self {
            r: value,
            g: value,
            b: value,
        }
    }

    /// Unweighted average of the three channels.
    pub fn to_gray(self) -> u16 {
        ((self.r as u32 + self.g as u32 + self.b as u32) / 3) as u16
    }
}

/// Physical pixel value as stored in a row, up to 6 bytes.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RawPixel {
    pub data: [u8; 6],
}

impl RawPixel {
    pub const fn new(data: [u8; 6]) -> Self {
        Self { data }
    }

    pub fn from_slice(slice: &[u8]) -> Self {
        let mut data = [0u8; 6];
        data[..slice.len()].copy_from_slice(slice);
        Self { data }
    }
}

pub fn get_pixel_row_bytes(format: PixelFormat, width: usize) -> Result<usize, Error> {
    let bits = format.depth()? * format.channels()? * width;
    Ok((bits + 7) / 8)
}

pub fn get_pixel_format_width(format: PixelFormat, row_bytes: usize) -> Result<usize, Error> {
    Ok((row_bytes * 8) / (format.depth()? * format.channels()?))
}

pub fn create_pixel_format(
    depth: usize,
    channels: usize,
    order: ColorOrder,
) -> Result<PixelFormat, Error> {
    match (depth, channels, order) {
        (1, 1, _) => Ok(PixelFormat::I1),
        (1, 3, ColorOrder::Rgb) => Ok(PixelFormat::Rgb111),
        (8, 1, _) => Ok(PixelFormat::I8),
        (8, 3, ColorOrder::Rgb) => Ok(PixelFormat::Rgb888),
        (8, 3, ColorOrder::Bgr) => Ok(PixelFormat::Bgr888),
        (16, 1, _) => Ok(PixelFormat::I16),
        (16, 3, ColorOrder::Rgb) => Ok(PixelFormat::Rgb161616),
        (16, 3, ColorOrder::Bgr) => Ok(PixelFormat::Bgr161616),
        (depth, channels, order) => Err(Error::UnsupportedFormat {
            depth,
            channels,
            order,
        }),
    }
}

fn get_bit(data: &[u8], index: usize) -> u8 {
    (data[index / 8] >> (7 - (index % 8))) & 1
}

fn set_bit(data: &mut [u8], index: usize, value: u8) {
    let shift = 7 - (index % 8);
    data[index / 8] = (data[index / 8] & !(1 << shift)) | ((value & 1) << shift);
}

fn get_u16(data: &[u8], index: usize) -> u16 {
    u16::from_le_bytes([data[index], data[index + 1]])
}

fn set_u16(data: &mut [u8], index: usize, value: u16) {
    data[index..index + 2].copy_from_slice(&value.to_le_bytes());
}

fn expand_bit(bit: u8) -> u16 {
    if bit > 0 {
        0xffff
    } else {
        0x0000
    }
}

fn expand_u8(value: u8) -> u16 {
    value as u16 * 0x101
}

pub fn get_pixel_from_row(data: &[u8], x: usize, format: PixelFormat) -> Result<Pixel, Error> {
    Ok(match format {
        PixelFormat::I1 => Pixel::gray(expand_bit(get_bit(data, x))),
        PixelFormat::Rgb111 => Pixel::new(
            expand_bit(get_bit(data, x * 3)),
            expand_bit(get_bit(data, x * 3 + 1)),
            expand_bit(get_bit(data, x * 3 + 2)),
        ),
        PixelFormat::I8 => Pixel::gray(expand_u8(data[x])),
        PixelFormat::Rgb888 => Pixel::new(
            expand_u8(data[x * 3]),
            expand_u8(data[x * 3 + 1]),
            expand_u8(data[x * 3 + 2]),
        ),
        PixelFormat::Bgr888 => Pixel::new(
            expand_u8(data[x * 3 + 2]),
            expand_u8(data[x * 3 + 1]),
            expand_u8(data[x * 3]),
        ),
        PixelFormat::I16 => Pixel::gray(get_u16(data, x * 2)),
        PixelFormat::Rgb161616 => Pixel::new(
            get_u16(data, x * 6),
            get_u16(data, x * 6 + 2),
            get_u16(data, x * 6 + 4),
        ),
        PixelFormat::Bgr161616 => Pixel::new(
            get_u16(data, x * 6 + 4),
            get_u16(data, x * 6 + 2),
            get_u16(data, x * 6),
        ),
        PixelFormat::Unknown => return Err(Error::UnknownFormat),
    })
}

pub fn set_pixel_to_row(
    data: &mut [u8],
    x: usize,
    pixel: Pixel,
    format: PixelFormat,
) -> Result<(), Error> {
    match format {
        PixelFormat::I1 => set_bit(data, x, (pixel.to_gray() > 0x8000) as u8),
        PixelFormat::Rgb111 => {
            set_bit(data, x * 3, (pixel.r > 0x8000) as u8);
            set_bit(data, x * 3 + 1, (pixel.g > 0x8000) as u8);
            set_bit(data, x * 3 + 2, (pixel.b > 0x8000) as u8);
        }
        PixelFormat::I8 => data[x] = (pixel.to_gray() >> 8) as u8,
        PixelFormat::Rgb888 => {
            data[x * 3] = (pixel.r >> 8) as u8;
            data[x * 3 + 1] = (pixel.g >> 8) as u8;
            data[x * 3 + 2] = (pixel.b >> 8) as u8;
        }
        PixelFormat::Bgr888 => {
            data[x * 3] = (pixel.b >> 8) as u8;
            data[x * 3 + 1] = (pixel.g >> 8) as u8;
            data[x * 3 + 2] = (pixel.r >> 8) as u8;
        }
        PixelFormat::I16 => set_u16(data, x * 2, pixel.to_gray()),
        PixelFormat::Rgb161616 => {
            set_u16(data, x * 6, pixel.r);
            set_u16(data, x * 6 + 2, pixel.g);
            set_u16(data, x * 6 + 4, pixel.b);
        }
        PixelFormat::Bgr161616 => {
            set_u16(data, x * 6, pixel.b);
            set_u16(data, x * 6 + 2, pixel.g);
            set_u16(data, x * 6 + 4, pixel.r);
        }
        PixelFormat::Unknown => return Err(Error::UnknownFormat),
    }
    Ok(())
}

pub fn get_raw_pixel_from_row(
    data: &[u8],
    x: usize,
    format: PixelFormat,
) -> Result<RawPixel, Error> {
    Ok(match format {
        PixelFormat::I1 => RawPixel::from_slice(&[get_bit(data, x)]),
        PixelFormat::Rgb111 => RawPixel::from_slice(&[(get_bit(data, x * 3) << 2)
            | (get_bit(data, x * 3 + 1) << 1)
            | get_bit(data, x * 3 + 2)]),
        PixelFormat::I8 => RawPixel::from_slice(&data[x..x + 1]),
        PixelFormat::Rgb888 | PixelFormat::Bgr888 => RawPixel::from_slice(&data[x * 3..x * 3 + 3]),
        PixelFormat::I16 => RawPixel::from_slice(&data[x * 2..x * 2 + 2]),
        PixelFormat::Rgb161616 | PixelFormat::Bgr161616 => {
            RawPixel::from_slice(&data[x * 6..x * 6 + 6])
        }
        PixelFormat::Unknown => return Err(Error::UnknownFormat),
    })
}

pub fn set_raw_pixel_to_row(
    data: &mut [u8],
    x: usize,
    pixel: RawPixel,
    format: PixelFormat,
) -> Result<(), Error> {
    match format {
        PixelFormat::I1 => set_bit(data, x, pixel.data[0]),
        PixelFormat::Rgb111 => {
            set_bit(data, x * 3, pixel.data[0] >> 2);
            set_bit(data, x * 3 + 1, pixel.data[0] >> 1);
            set_bit(data, x * 3 + 2, pixel.data[0]);
        }
        PixelFormat::I8 => data[x] = pixel.data[0],
        PixelFormat::Rgb888 | PixelFormat::Bgr888 => {
            data[x * 3..x * 3 + 3].copy_from_slice(&pixel.data[..3])
        }
        PixelFormat::I16 => data[x * 2..x * 2 + 2].copy_from_slice(&pixel.data[..2]),
        PixelFormat::Rgb161616 | PixelFormat::Bgr161616 => {
            data[x * 6..x * 6 + 6].copy_from_slice(&pixel.data)
        }
        PixelFormat::Unknown => return Err(Error::UnknownFormat),
    }
    Ok(())
}

/// Reads channel `channel` of pixel `x` without rescaling.
///
/// The channel index is positional: channel 0 is the first channel in memory,
/// which is red for RGB formats and blue for BGR formats.
pub fn get_raw_channel_from_row(
    data: &[u8],
    x: usize,
    channel: usize,
    format: PixelFormat,
) -> Result<u16, Error> {
    Ok(match format {
        PixelFormat::I1 => get_bit(data, x) as u16,
        PixelFormat::Rgb111 => get_bit(data, x * 3 + channel) as u16,
        PixelFormat::I8 => data[x] as u16,
        PixelFormat::Rgb888 | PixelFormat::Bgr888 => data[x * 3 + channel] as u16,
        PixelFormat::I16 => get_u16(data, x * 2),
        PixelFormat::Rgb161616 | PixelFormat::Bgr161616 => get_u16(data, x * 6 + channel * 2),
        PixelFormat::Unknown => return Err(Error::UnknownFormat),
    })
}

pub fn set_raw_channel_to_row(
    data: &mut [u8],
    x: usize,
    channel: usize,
    value: u16,
    format: PixelFormat,
) -> Result<(), Error> {
    match format {
        PixelFormat::I1 => set_bit(data, x, value as u8),
        PixelFormat::Rgb111 => set_bit(data, x * 3 + channel, value as u8),
        PixelFormat::I8 => data[x] = value as u8,
        PixelFormat::Rgb888 | PixelFormat::Bgr888 => data[x * 3 + channel] = value as u8,
        PixelFormat::I16 => set_u16(data, x * 2, value),
        PixelFormat::Rgb161616 | PixelFormat::Bgr161616 => set_u16(data, x * 6 + channel * 2, value),
        PixelFormat::Unknown => return Err(Error::UnknownFormat),
    }
    Ok(())
}

/// Converts `count` pixels from `input` to `output`.
///
/// Identical formats are copied byte for byte. Other combinations go through
/// [`Pixel`]: gray sources are duplicated into all channels and color sources
/// collapse to gray with [`Pixel::to_gray`].
pub fn convert_pixel_row_format(
    input: &[u8],
    input_format: PixelFormat,
    output: &mut [u8],
    output_format: PixelFormat,
    count: usize,
) -> Result<(), Error> {
    let input_bytes = get_pixel_row_bytes(input_format, count)?;
    let output_bytes = get_pixel_row_bytes(output_format, count)?;
    if input.len() < input_bytes {
        return Err(Error::RowTooSmall {
            length: input.len(),
            required: input_bytes,
        });
    }
    if output.len() < output_bytes {
        return Err(Error::RowTooSmall {
            length: output.len(),
            required: output_bytes,
        });
    }
    if input_format == output_format {
        output[..input_bytes].copy_from_slice(&input[..input_bytes]);
        return Ok(());
    }
    for x in 0..count {
        let pixel = get_pixel_from_row(input, x, input_format)?;
        set_pixel_to_row(output, x, pixel, output_format)?;
    }
    Ok(())
}
