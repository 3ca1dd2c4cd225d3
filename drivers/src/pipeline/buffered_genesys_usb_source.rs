use super::buffer::Buffer;
use super::buffer::Producer;
use crate::error::Error;
use genesys_types::PixelFormat;

/// Rows of a scan read from the ASIC FIFO.
///
/// The producer is asked for at most `total_size` bytes, in chunks of
/// `buffer_size` bytes.
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
    pub fn new(
        width: usize,
        height: usize,
        format: PixelFormat,
        total_size: usize,
        buffer_size: usize,
        producer: Producer,
    ) -> Result<Self, Error> {
        let row_bytes = super::row_bytes(format, width)?;
        tracing::debug!(
            width,
            height,
            ?format,
            total_size,
            buffer_size,
            "usb source"
        );
        Ok(Self {
            width,
            height,
            format,
            row_bytes,
            buffer: Buffer::new(buffer_size, Some(total_size), producer),
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

    /// Bytes not yet requested from the device.
    pub fn remaining_bytes(&self) -> usize {
        self.buffer.remaining().unwrap_or(0)
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
                "row read past the end of the scan"
            );
            self.eof = true;
            return Ok(());
        }
        if !self.buffer.get_data(out)? {
            tracing::warn!(
                line = self.current_line,
                "the scan data ended before the last row"
            );
            self.eof = true;
        }
        self.current_line += 1;
        if self.current_line >= self.height {
            self.eof = true;
        }
        Ok(())
    }
}
