use crate::pixel;
use crate::Error;
use crate::Pixel;
use crate::PixelFormat;
use crate::RawPixel;

/// Full frame stored as consecutive rows of `row_bytes` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: usize,
    height: usize,
    format: PixelFormat,
    row_bytes: usize,
    data: Vec<u8>,
}

impl Image {
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Result<Self, Error> {
        let row_bytes = pixel::get_pixel_row_bytes(format, width)?;
        Ok(Self {
            width,
            height,
            format,
            row_bytes,
            data: vec![0; row_bytes * height],
        })
    }

    pub fn from_data(
        width: usize,
        height: usize,
        format: PixelFormat,
        mut data: Vec<u8>,
    ) -> Result<Self, Error> {
        let row_bytes = pixel::get_pixel_row_bytes(format, width)?;
        if data.len() < row_bytes * height {
            return Err(Error::RowTooSmall {
                length: data.len(),
                required: row_bytes * height,
            });
        }
        data.truncate(row_bytes * height);
        Ok(Self {
            width,
            height,
            format,
            row_bytes,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.row_bytes..(y + 1) * self.row_bytes]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        &mut self.data[y * self.row_bytes..(y + 1) * self.row_bytes]
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Result<Pixel, Error> {
        pixel::get_pixel_from_row(self.row(y), x, self.format)
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, value: Pixel) -> Result<(), Error> {
        let format = self.format;
        pixel::set_pixel_to_row(self.row_mut(y), x, value, format)
    }

    pub fn get_raw_pixel(&self, x: usize, y: usize) -> Result<RawPixel, Error> {
        pixel::get_raw_pixel_from_row(self.row(y), x, self.format)
    }

    pub fn set_raw_pixel(&mut self, x: usize, y: usize, value: RawPixel) -> Result<(), Error> {
        let format = self.format;
        pixel::set_raw_pixel_to_row(self.row_mut(y), x, value, format)
    }

    pub fn get_raw_channel(&self, x: usize, y: usize, channel: usize) -> Result<u16, Error> {
        pixel::get_raw_channel_from_row(self.row(y), x, channel, self.format)
    }

    pub fn set_raw_channel(
        &mut self,
        x: usize,
        y: usize,
        channel: usize,
        value: u16,
    ) -> Result<(), Error> {
        let format = self.format;
        pixel::set_raw_channel_to_row(self.row_mut(y), x, channel, value, format)
    }
}
