use crate::error::Error;

/// Fills the whole slice with the next bytes of a stream.
pub type Producer = Box<dyn FnMut(&mut [u8]) -> Result<(), Error> + Send>;

/// Byte stream fetched from a producer in fixed-size chunks.
pub struct Buffer {
    producer: Producer,
    chunk_size: usize,
    remaining: Option<usize>,
    data: Vec<u8>,
    available: usize,
    position: usize,
}

impl Buffer {
    /// `remaining` caps the total number of bytes requested from the producer.
    pub fn new(chunk_size: usize, remaining: Option<usize>, producer: Producer) -> Self {
        Self {
            producer,
            chunk_size: chunk_size.max(1),
            remaining,
            data: Vec::new(),
            available: 0,
            position: 0,
        }
    }

    pub fn remaining(&self) -> Option<usize> {
        self.remaining
    }

    fn refill(&mut self) -> Result<bool, Error> {
        let size = match self.remaining {
            Some(0) => return Ok(false),
            Some(remaining) => remaining.min(self.chunk_size),
            None => self.chunk_size,
        };
        self.data.resize(size, 0);
        (self.producer)(&mut self.data[..size])?;
        self.available = size;
        self.position = 0;
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= size;
        }
        Ok(true)
    }

    /// Copies the next `out.len()` bytes.
    ///
    /// Returns false if the stream ended first, `out` is then partially written.
    pub fn get_data(&mut self, out: &mut [u8]) -> Result<bool, Error> {
        let mut written = 0;
        while written < out.len() {
            if self.position == self.available && !self.refill()? {
                return Ok(false);
            }
            let count = (out.len() - written).min(self.available - self.position);
            out[written..written + count]
                .copy_from_slice(&self.data[self.position..self.position + count]);
            written += count;
            self.position += count;
        }
        Ok(true)
    }
}

/// Rolling window of rows, oldest first.
#[derive(Debug, Clone)]
pub struct RowBuffer {
    row_bytes: usize,
    rows: std::collections::VecDeque<Vec<u8>>,
}

impl RowBuffer {
    pub fn new(row_bytes: usize) -> Self {
        Self {
            row_bytes,
            rows: std::collections::VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a zeroed row and returns it for filling.
    pub fn push_back(&mut self) -> &mut [u8] {
        let index = self.rows.len();
        self.rows.push_back(vec![0; self.row_bytes]);
        &mut self.rows[index]
    }

    pub fn pop_front(&mut self) {
        self.rows.pop_front();
    }

    pub fn get(&self, index: usize) -> &[u8] {
        &self.rows[index]
    }
}
