use crate::error::Error;
use genesys_types::ColorOrder;
use genesys_types::PixelFormat;

/// Merges three consecutive single-channel rows into one color row.
///
/// Row `i` of each triplet fills the positional channel `i`.
pub struct Node {
    width: usize,
    height: usize,
    format: PixelFormat,
    row_bytes: usize,
    source_format: PixelFormat,
    source_row_bytes: usize,
    buffer: Vec<u8>,
}

impl Node {
    pub fn new(source: &super::Node, color_order: ColorOrder) -> Result<Self, Error> {
        let source_format = source.format();
        let unsupported = || Error::UnsupportedMergeFormat {
            format: source_format,
            order: color_order,
        };
        if source_format.channels().map_err(|_| unsupported())? != 1 {
            return Err(unsupported());
        }
        let format = genesys_types::create_pixel_format(
            source_format.depth().map_err(|_| unsupported())?,
            3,
            color_order,
        )
        .map_err(|_| unsupported())?;
        Ok(Self {
            width: source.width(),
            height: source.height() / 3,
            format,
            row_bytes: super::row_bytes(format, source.width())?,
            source_format,
            source_row_bytes: source.row_bytes(),
            buffer: vec![0; source.row_bytes() * 3],
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
        for line in self.buffer.chunks_exact_mut(self.source_row_bytes.max(1)) {
            super::next_row(upstream, line)?;
        }
        for channel in 0..3 {
            let line =
                &self.buffer[channel * self.source_row_bytes..(channel + 1) * self.source_row_bytes];
            for x in 0..self.width {
                let value = genesys_types::get_raw_channel_from_row(line, x, 0, self.source_format)?;
                genesys_types::set_raw_channel_to_row(out, x, channel, value, self.format)?;
            }
        }
        Ok(())
    }
}
