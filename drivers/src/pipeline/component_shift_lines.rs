use super::buffer::RowBuffer;
use crate::error::Error;
use genesys_types::PixelFormat;

/// Realigns color channels captured on different lines.
///
/// The red, green and blue channels of output row `y` come from source rows
/// `y + shift_r`, `y + shift_g` and `y + shift_b`.
pub struct Node {
    width: usize,
    height: usize,
    format: PixelFormat,
    row_bytes: usize,
    /// Shift of each positional channel.
    channel_shifts: [usize; 3],
    extra_height: usize,
    buffer: RowBuffer,
}

impl Node {
    pub fn new(
        source: &super::Node,
        shift_r: usize,
        shift_g: usize,
        shift_b: usize,
    ) -> Result<Self, Error> {
        let format = source.format();
        let channel_shifts = match format {
            PixelFormat::Rgb111 | PixelFormat::Rgb888 | PixelFormat::Rgb161616 => {
                [shift_r, shift_g, shift_b]
            }
            PixelFormat::Bgr888 | PixelFormat::Bgr161616 => [shift_b, shift_g, shift_r],
            format => return Err(Error::UnsupportedShiftFormat(format)),
        };
        let extra_height = shift_r.max(shift_g).max(shift_b);
        Ok(Self {
            width: source.width(),
            height: source.height().saturating_sub(extra_height),
            format,
            row_bytes: source.row_bytes(),
            channel_shifts,
            extra_height,
            buffer: RowBuffer::new(source.row_bytes()),
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
        while self.buffer.len() < self.extra_height + 1 {
            super::next_row(upstream, self.buffer.push_back())?;
        }
        for (channel, shift) in self.channel_shifts.iter().enumerate() {
            let row = self.buffer.get(*shift);
            for x in 0..self.width {
                let value = genesys_types::get_raw_channel_from_row(row, x, channel, self.format)?;
                genesys_types::set_raw_channel_to_row(out, x, channel, value, self.format)?;
            }
        }
        self.buffer.pop_front();
        Ok(())
    }
}
