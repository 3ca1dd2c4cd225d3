use crate::error::Error;
use genesys_types::PixelFormat;

/// Rows read from an in-memory array.
pub struct Node {
    width: usize,
    height: usize,
    format: PixelFormat,
    row_bytes: usize,
    data: Vec<u8>,
    next_row: usize,
    eof: bool,
}

impl Node {
    pub fn new(
        width: usize,
        height: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, Error> {
        let row_bytes = super::row_bytes(format, width)?;
        if data.len() < row_bytes * height {
            return Err(Error::ArrayTooSmall {
                length: data.len(),
                required: row_bytes * height,
            });
        }
        Ok(Self {
            width,
            height,
            format,
            row_bytes,
            data,
            next_row: 0,
            eof: height == 0,
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
        self.eof
    }

    pub fn get_next_row_data(
        &mut self,
        _upstream: &mut [super::Node],
        out: &mut [u8],
    ) -> Result<(), Error> {
        if self.next_row >= self.height {
            self.eof = true;
            return Ok(());
        }
        let start = self.next_row * self.row_bytes;
        out.copy_from_slice(&self.data[start..start + self.row_bytes]);
        self.next_row += 1;
        self.eof = self.next_row >= self.height;
        Ok(())
    }
}
