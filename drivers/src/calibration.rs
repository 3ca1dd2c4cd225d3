use crate::error::Error;
use crate::error::Warning;
use crate::flag::Flag;
use crate::frontend::Frontend;
use crate::sensor::SensorExposure;
use crate::session::ScanSession;
use genesys_types::PixelFormat;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Kind {
    Lamp,
    Gain,
    Offset,
}

/// Calibration targets and limits, values are on the 16-bit scale.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Configuration {
    pub lamp_target: u32,
    pub gain_target: u32,
    pub offset_target: u32,
    /// Width of the accepted band below each target.
    pub tolerance: u32,
    pub lamp_ceiling: u32,
    pub lamp_iterations: u32,
    pub gain_iterations: u32,
    pub offset_iterations: u32,
    pub warmup_retries: u32,
    pub warmup_delay_ms: u64,
    /// Largest relative change between two warm-up lines, in percent.
    pub warmup_stability_percent: u32,
    pub shading_target_scale: u32,
    /// Added to the dark average of each channel.
    pub offset_tweak: [i32; 3],
    /// Applied to the white sum of each channel, in percent.
    pub gain_tweak: [u32; 3],
    /// Reuses cached coarse results for an identical setup.
    pub skip_coarse_if_cached: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            lamp_target: 0xc000,
            gain_target: 0xd000,
            offset_target: 0x0800,
            tolerance: 8000,
            lamp_ceiling: 0x3fff,
            lamp_iterations: 20,
            gain_iterations: 12,
            offset_iterations: 12,
            warmup_retries: 5,
            warmup_delay_ms: 1000,
            warmup_stability_percent: 1,
            shading_target_scale: 0xfa00,
            offset_tweak: [0; 3],
            gain_tweak: [100; 3],
            skip_coarse_if_cached: true,
        }
    }
}

/// Accepted measurements, `[low, high]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Band {
    pub low: u32,
    pub high: u32,
}

impl Band {
    pub fn new(target: u32, tolerance: u32) -> Self {
        Self {
            low: target.saturating_sub(tolerance),
            high: target,
        }
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.low && value <= self.high
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    Adjusting,
    InBand,
    /// The bounds met or the ceiling was hit before reaching the band.
    LimitReached,
}

/// Bisection over a control value whose response grows with the value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BoundedSearch {
    min: u32,
    max: u32,
    current: u32,
    ceiling: u32,
    status: SearchStatus,
    iterations: u32,
}

fn midpoint(low: u32, high: u32) -> u32 {
    low + (high - low) / 2
}

impl BoundedSearch {
    /// Starts at the middle of `[min, max]`.
    pub fn new(min: u32, max: u32, ceiling: u32) -> Self {
        Self::with_start(min, max, ceiling, midpoint(min, max.max(min)))
    }

    pub fn with_start(min: u32, max: u32, ceiling: u32, start: u32) -> Self {
        let max = max.max(min);
        Self {
            min,
            max,
            current: start.clamp(min, max).min(ceiling.max(min)),
            ceiling: ceiling.max(min),
            status: SearchStatus::Adjusting,
            iterations: 0,
        }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn is_done(&self) -> bool {
        self.status != SearchStatus::Adjusting
    }

    /// Stops an unfinished search at its current value.
    pub fn give_up(&mut self) {
        if self.status == SearchStatus::Adjusting {
            self.status = SearchStatus::LimitReached;
        }
    }

    /// Feeds the response to the current value, returns the new status.
    ///
    /// Once the search leaves [`SearchStatus::Adjusting`] it ignores further
    /// measurements.
    pub fn update(&mut self, measured: u32, band: Band) -> SearchStatus {
        if self.status != SearchStatus::Adjusting {
            return self.status;
        }
        self.iterations += 1;
        if band.contains(measured) {
            self.status = SearchStatus::InBand;
            return self.status;
        }
        if measured > band.high {
            self.max = self.current;
            self.current = midpoint(self.min, self.current);
        } else {
            if self.current >= self.ceiling {
                self.status = SearchStatus::LimitReached;
                return self.status;
            }
            self.min = self.current;
            self.current = self
                .current
                .saturating_mul(2)
                .max(self.current + 1)
                .min(midpoint(self.current, self.max))
                .min(self.ceiling);
        }
        if self.min + 1 >= self.max {
            self.status = SearchStatus::LimitReached;
        }
        self.status
    }
}

/// Runs one search per channel until every channel is settled.
///
/// `measure` receives the current value of each channel and returns the
/// response of each channel. Channels still adjusting after
/// `max_iterations` measurements are stopped. Every channel that ends
/// outside its band is logged and stored as a warning.
pub fn run_search<Measure>(
    kind: Kind,
    searches: &mut [BoundedSearch],
    band: Band,
    max_iterations: u32,
    flag: &Flag<Warning>,
    mut measure: Measure,
) -> Result<(), Error>
where
    Measure: FnMut(&[u32]) -> Result<Vec<u32>, Error>,
{
    for iteration in 0..max_iterations {
        if flag.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if searches.iter().all(BoundedSearch::is_done) {
            break;
        }
        let values: Vec<u32> = searches.iter().map(BoundedSearch::current).collect();
        let measured = measure(&values)?;
        for (channel, (search, measured)) in searches.iter_mut().zip(measured).enumerate() {
            let status = search.update(measured, band);
            tracing::debug!(
                ?kind,
                iteration,
                channel,
                value = values[channel],
                measured,
                ?status,
                "calibration step"
            );
        }
    }
    for (channel, search) in searches.iter_mut().enumerate() {
        search.give_up();
        if search.status() == SearchStatus::LimitReached {
            tracing::warn!(
                ?kind,
                channel,
                value = search.current(),
                "calibration stopped outside the target band"
            );
            flag.store_warning(Warning::CalibrationLimit {
                kind,
                channel,
                value: search.current(),
            });
        }
    }
    Ok(())
}

/// True when `current` is within `percent` of `previous`, per channel.
pub fn is_stable(previous: &[u32], current: &[u32], percent: u32) -> bool {
    previous.iter().zip(current).all(|(previous, current)| {
        let difference = previous.abs_diff(*current) as u64;
        difference * 100 <= *previous.max(current) as u64 * percent as u64
    })
}

/// Sum of every pixel and channel over `lines` rows, indexed `pixel * channels + channel`.
pub fn sum_lines(
    data: &[u8],
    format: PixelFormat,
    pixels: usize,
    lines: usize,
) -> Result<Vec<u64>, Error> {
    let channels = format.channels()?;
    let row_bytes = genesys_types::get_pixel_row_bytes(format, pixels)?;
    let mut sums = vec![0u64; pixels * channels];
    for row in data.chunks_exact(row_bytes.max(1)).take(lines) {
        for x in 0..pixels {
            let pixel = genesys_types::get_pixel_from_row(row, x, format)?;
            let values = [pixel.r, pixel.g, pixel.b];
            for channel in 0..channels {
                sums[x * channels + channel] += values[channel] as u64;
            }
        }
    }
    Ok(sums)
}

/// Average of each channel over a whole image.
pub fn average_channels(
    data: &[u8],
    format: PixelFormat,
    pixels: usize,
    lines: usize,
) -> Result<Vec<u32>, Error> {
    let channels = format.channels()?;
    let sums = sum_lines(data, format, pixels, lines)?;
    let count = (pixels * lines).max(1) as u64;
    Ok((0..channels)
        .map(|channel| {
            let total: u64 = sums.iter().skip(channel).step_by(channels).sum();
            (total / count) as u32
        })
        .collect())
}

/// Per-pixel dark level, `sum / lines + tweak` clamped to 16 bits.
pub fn compute_dark(sums: &[u64], lines: u32, channels: usize, offset_tweak: &[i32; 3]) -> Vec<u16> {
    sums.iter()
        .enumerate()
        .map(|(index, sum)| {
            let average = (sum / lines.max(1) as u64) as i64;
            (average + offset_tweak[index % channels] as i64).clamp(0, u16::MAX as i64) as u16
        })
        .collect()
}

/// White coefficient `target_scale * 16384 * lines / (sum * tweak)`.
///
/// A zero sum gives the largest coefficient.
pub fn compute_white_coefficient(sum: u64, lines: u32, target_scale: u32, gain_percent: u32) -> u16 {
    let denominator = sum as u128 * gain_percent as u128;
    if denominator == 0 {
        return u16::MAX;
    }
    let numerator = target_scale as u128 * 16384 * lines as u128 * 100;
    (numerator / denominator).min(u16::MAX as u128) as u16
}

/// Shading RAM layout, per pixel and channel: dark then coefficient, both
/// little-endian.
pub fn build_shading_data(
    dark: &[u16],
    white_sums: &[u64],
    lines: u32,
    channels: usize,
    configuration: &Configuration,
) -> Vec<u8> {
    let mut data = Vec::with_capacity(white_sums.len() * 4);
    for (index, sum) in white_sums.iter().enumerate() {
        let coefficient = compute_white_coefficient(
            *sum,
            lines,
            configuration.shading_target_scale,
            configuration.gain_tweak[index % channels],
        );
        data.extend_from_slice(&dark.get(index).copied().unwrap_or(0).to_le_bytes());
        data.extend_from_slice(&coefficient.to_le_bytes());
    }
    data
}

/// Number of shading lines at `resolution`.
pub fn shading_line_count(resolution: u32) -> u32 {
    if resolution > 75 {
        64
    } else {
        32
    }
}

/// Geometry that decides whether coarse calibration results can be reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct CurrentSetup {
    pub pixels: u32,
    pub lines: u32,
    pub exposure: u32,
    pub xres: u32,
    pub ccd_size_divisor: u32,
    pub stagger: u32,
    pub max_shift: u32,
}

impl CurrentSetup {
    pub fn from_session(session: &ScanSession, exposure: u32) -> Self {
        Self {
            pixels: session.output_pixels,
            lines: session.output_line_count,
            exposure,
            xres: session.params.xres,
            ccd_size_divisor: session.ccd_size_divisor,
            stagger: session.num_staggered_lines,
            max_shift: session.max_color_shift_lines,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub setup: CurrentSetup,
    pub frontend: Frontend,
    pub exposure: SensorExposure,
}

#[derive(Debug, Clone, Default)]
pub struct Cache {
    entries: Vec<CacheEntry>,
}

impl Cache {
    pub fn find(&self, setup: &CurrentSetup) -> Option<&CacheEntry> {
        self.entries.iter().find(|entry| entry.setup == *setup)
    }

    pub fn insert(&mut self, entry: CacheEntry) {
        self.entries.retain(|existing| existing.setup != entry.setup);
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
