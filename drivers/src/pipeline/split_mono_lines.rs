use crate::error::Error;
use genesys_types::PixelFormat;

/// Emits each channel of a color row as its own single-channel row.
pub struct Node {
    width: usize,
    height: usize,
    format: PixelFormat,
    row_bytes: usize,
    source_format: PixelFormat,
    buffer: Vec<u8>,
    next_channel: usize,
}

impl Node {
    pub fn new(source: &super::Node) -> Result<Self, Error> {
        let source_format = source.format();
        let format = match source_format {
            PixelFormat::Rgb111 => PixelFormat::I1,
            PixelFormat::Rgb888 | PixelFormat::Bgr888 => PixelFormat::I8,
            PixelFormat::Rgb161616 | PixelFormat::Bgr161616 => PixelFormat::I16,
            format => return Err(Error::UnsupportedSplitFormat(format)),
        };
        Ok(Self {
            width: source.width(),
            height: source.height() * 3,
            format,
            row_bytes: super::row_bytes(format, source.width())?,
            source_format,
            buffer: vec![0; source.row_bytes()],
            next_channel: 0,
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

    pub fn eof(&self, upstream: &[super::Node]) -> bool {
        self.next_channel == 0 && super::eof(upstream)
    }

    pub fn get_next_row_data(
        &mut self,
        upstream: &mut [super::Node],
        out: &mut [u8],
    ) -> Result<(), Error> {
        if self.next_channel == 0 {
            super::next_row(upstream, &mut self.buffer)?;
        }
        for x in 0..self.width {
            let value = genesys_types::get_raw_channel_from_row(
                &self.buffer,
                x,
                self.next_channel,
                self.source_format,
            )?;
            genesys_types::set_raw_channel_to_row(out, x, 0, value, self.format)?;
        }
        self.next_channel = (self.next_channel + 1) % 3;
        Ok(())
    }
}
