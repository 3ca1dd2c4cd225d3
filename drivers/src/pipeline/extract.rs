use crate::error::Error;
use genesys_types::PixelFormat;

/// Crops the `width` by `height` rectangle at (`offset_x`, `offset_y`).
///
/// Rows below the end of the source and columns past its right edge are
/// filled with zeros.
pub struct Node {
    offset_x: usize,
    offset_y: usize,
    width: usize,
    height: usize,
    format: PixelFormat,
    row_bytes: usize,
    source_width: usize,
    source_height: usize,
    source_line: usize,
    current_line: usize,
    buffer: Vec<u8>,
}

impl Node {
    pub fn new(
        source: &super::Node,
        offset_x: usize,
        offset_y: usize,
        width: usize,
        height: usize,
    ) -> Result<Self, Error> {
        let format = source.format();
        Ok(Self {
            offset_x,
            offset_y,
            width,
            height,
            format,
            row_bytes: super::row_bytes(format, width)?,
            source_width: source.width(),
            source_height: source.height(),
            source_line: 0,
            current_line: 0,
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

    pub fn eof(&self, _upstream: &[super::Node]) -> bool {
        self.current_line >= self.height
    }

    pub fn get_next_row_data(
        &mut self,
        upstream: &mut [super::Node],
        out: &mut [u8],
    ) -> Result<(), Error> {
        let target_line = self.offset_y + self.current_line;
        while self.source_line < target_line && self.source_line < self.source_height {
            super::next_row(upstream, &mut self.buffer)?;
            self.source_line += 1;
        }
        self.current_line += 1;
        out.fill(0);
        if target_line >= self.source_height {
            return Ok(());
        }
        super::next_row(upstream, &mut self.buffer)?;
        self.source_line += 1;
        let copied_width = self
            .source_width
            .saturating_sub(self.offset_x)
            .min(self.width);
        if copied_width == 0 {
            return Ok(());
        }
        match self.format.bytes_per_pixel()? {
            Some(bytes_per_pixel) => {
                let start = self.offset_x * bytes_per_pixel;
                let length = copied_width * bytes_per_pixel;
                out[..length].copy_from_slice(&self.buffer[start..start + length]);
            }
            None => {
                for x in 0..copied_width {
                    let raw = genesys_types::get_raw_pixel_from_row(
                        &self.buffer,
                        self.offset_x + x,
                        self.format,
                    )?;
                    genesys_types::set_raw_pixel_to_row(out, x, raw, self.format)?;
                }
            }
        }
        Ok(())
    }
}
