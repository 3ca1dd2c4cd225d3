use super::buffer::RowBuffer;
use crate::error::Error;
use genesys_types::PixelFormat;

pub const MAX_SHIFTS: usize = 2;

/// Realigns staggered sensors, pixel `x` of output row `y` comes from
/// source row `y + shifts[x % shifts.len()]`.
pub struct Node {
    width: usize,
    height: usize,
    format: PixelFormat,
    row_bytes: usize,
    shifts: Vec<usize>,
    extra_height: usize,
    buffer: RowBuffer,
}

impl Node {
    pub fn new(source: &super::Node, shifts: &[usize]) -> Result<Self, Error> {
        if shifts.is_empty() || shifts.len() > MAX_SHIFTS {
            return Err(Error::UnsupportedShiftCount {
                count: shifts.len(),
                maximum: MAX_SHIFTS,
            });
        }
        let extra_height = shifts.iter().copied().max().unwrap_or(0);
        Ok(Self {
            width: source.width(),
            height: source.height().saturating_sub(extra_height),
            format: source.format(),
            row_bytes: source.row_bytes(),
            shifts: shifts.to_vec(),
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
        for x in (0..self.width).step_by(self.shifts.len()) {
            for (index, shift) in self.shifts.iter().enumerate() {
                if x + index >= self.width {
                    break;
                }
                let raw = genesys_types::get_raw_pixel_from_row(
                    self.buffer.get(*shift),
                    x + index,
                    self.format,
                )?;
                genesys_types::set_raw_pixel_to_row(out, x + index, raw, self.format)?;
            }
        }
        self.buffer.pop_front();
        Ok(())
    }
}
