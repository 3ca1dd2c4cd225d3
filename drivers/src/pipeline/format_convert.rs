use crate::error::Error;
use genesys_types::PixelFormat;

/// Converts every row of the source to `format`.
pub struct Node {
    width: usize,
    height: usize,
    format: PixelFormat,
    row_bytes: usize,
    source_format: PixelFormat,
    buffer: Vec<u8>,
}

impl Node {
    pub fn new(source: &super::Node, format: PixelFormat) -> Result<Self, Error> {
        Ok(Self {
            width: source.width(),
            height: source.height(),
            format,
            row_bytes: super::row_bytes(format, source.width())?,
            source_format: source.format(),
            buffer: vec![0; source.row_bytes()],
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
        super::eof(upstream)
    }

    pub fn get_next_row_data(
        &mut self,
        upstream: &mut [super::Node],
        out: &mut [u8],
    ) -> Result<(), Error> {
        if self.source_format == self.format {
            return super::next_row(upstream, out);
        }
        super::next_row(upstream, &mut self.buffer)?;
        genesys_types::convert_pixel_row_format(
            &self.buffer,
            self.source_format,
            out,
            self.format,
            self.width,
        )?;
        Ok(())
    }
}
