use crate::error::Error;
use genesys_types::PixelFormat;

/// Reassembles lines that the sensor delivers as interleaved segments.
///
/// Each output row is built from `interleaved_lines` source rows laid end to
/// end. For every group of `pixels_per_chunk` pixels and every segment `s`,
/// the chunk at `group * pixels_per_chunk + segment_pixels * segment_order[s]`
/// moves to `(group * segment_count + s) * pixels_per_chunk`.
pub struct Node {
    width: usize,
    height: usize,
    format: PixelFormat,
    row_bytes: usize,
    segment_order: Vec<usize>,
    segment_pixels: usize,
    interleaved_lines: usize,
    pixels_per_chunk: usize,
    source_row_bytes: usize,
    buffer: Vec<u8>,
}

impl Node {
    pub fn new(
        source: &super::Node,
        output_width: usize,
        segment_order: &[usize],
        segment_pixels: usize,
        interleaved_lines: usize,
        pixels_per_chunk: usize,
    ) -> Result<Self, Error> {
        if interleaved_lines == 0 || source.height() % interleaved_lines != 0 {
            return Err(Error::InterleaveMismatch {
                height: source.height(),
                interleaved_lines,
            });
        }
        let segment_order = if segment_order.is_empty() {
            vec![0]
        } else {
            segment_order.to_vec()
        };
        let pixels_per_chunk = pixels_per_chunk.max(1);
        let groups_count = output_width / (segment_order.len() * pixels_per_chunk);
        let input_pixels = source.width() * interleaved_lines;
        if groups_count > 0 {
            for (segment, order) in segment_order.iter().enumerate() {
                let last = (groups_count - 1) * pixels_per_chunk
                    + segment_pixels * order
                    + pixels_per_chunk;
                if last > input_pixels {
                    return Err(Error::SegmentOutOfRange { segment });
                }
            }
        }
        let format = source.format();
        Ok(Self {
            width: output_width,
            height: source.height() / interleaved_lines,
            format,
            row_bytes: super::row_bytes(format, output_width)?,
            segment_order,
            segment_pixels,
            interleaved_lines,
            pixels_per_chunk,
            source_row_bytes: source.row_bytes(),
            buffer: vec![0; source.row_bytes() * interleaved_lines],
        })
    }

    /// Interleaves the pixels of `interleaved_lines` consecutive rows into one row.
    pub fn deinterleave_lines(
        source: &super::Node,
        interleaved_lines: usize,
        pixels_per_chunk: usize,
    ) -> Result<Self, Error> {
        let segment_order: Vec<usize> = (0..interleaved_lines).collect();
        Self::new(
            source,
            source.width() * interleaved_lines,
            &segment_order,
            source.width(),
            interleaved_lines,
            pixels_per_chunk,
        )
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
        for line in self
            .buffer
            .chunks_exact_mut(self.source_row_bytes.max(1))
            .take(self.interleaved_lines)
        {
            super::next_row(upstream, line)?;
        }
        out.fill(0);
        let segment_count = self.segment_order.len();
        let groups_count = self.width / (segment_count * self.pixels_per_chunk);
        for group in 0..groups_count {
            for (segment, order) in self.segment_order.iter().enumerate() {
                let input_offset = group * self.pixels_per_chunk + self.segment_pixels * order;
                let output_offset = (group * segment_count + segment) * self.pixels_per_chunk;
                for pixel in 0..self.pixels_per_chunk {
                    let raw = genesys_types::get_raw_pixel_from_row(
                        &self.buffer,
                        input_offset + pixel,
                        self.format,
                    )?;
                    genesys_types::set_raw_pixel_to_row(
                        out,
                        output_offset + pixel,
                        raw,
                        self.format,
                    )?;
                }
            }
        }
        Ok(())
    }
}
