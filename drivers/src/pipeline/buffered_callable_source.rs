use super::buffer::Buffer;
use super::buffer::Producer;
use crate::error::Error;
use genesys_types::PixelFormat;

/// Rows cut from the byte stream of a producer callback.
pub struct Node {
    width: usize,
    height: usize,
    format: PixelFormat,
    row_bytes: usize,
    buffer: Buffer,
    current_line: usize,
    eof: bool,
}

impl Node {
    /// The producer is called with `batch_size` bytes at a time.
    pub fn new(
        width: usize,
        height: usize,
        format: PixelFormat,
        batch_size: usize,
        producer: Producer,
    ) -> Result<Self, Error> {
        Ok(Self {
            width,
            height,
            format,
            row_bytes: super::row_bytes(format, width)?,
            buffer: Buffer::new(batch_size, None, producer),
            current_line: 0,
            eof: false,
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
        if self.current_line >= self.height {
            tracing::warn!(
                line = self.current_line,
                height = self.height,
                "row read past the end of the callable source"
            );
            self.eof = true;
            return Ok(());
        }
        if !self.buffer.get_data(out)? {
            tracing::warn!(line = self.current_line, "callable source ran out of data");
            self.eof = true;
        }
        self.current_line += 1;
        if self.current_line >= self.height {
            self.eof = true;
        }
        Ok(())
    }
}
