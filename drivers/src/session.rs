use crate::error::Error;
use crate::properties::AsicType;
use crate::properties::Model;
use crate::sensor::Sensor;
use crate::settings::ColorFilter;
use crate::settings::ScanColorMode;
use crate::settings::ScanFlags;
use crate::settings::ScanMethod;
use genesys_types::ColorOrder;

/// Marks a numeric parameter that the caller did not fill in.
pub const NOT_SET: u32 = u32::MAX;

pub const MM_PER_INCH: f32 = 25.4;

/// Raw scan request.
///
/// `startx` is in `xres` units, `starty` in motor steps at the motor base
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupParams {
    pub xres: u32,
    pub yres: u32,
    pub startx: u32,
    pub starty: u32,
    pub pixels: u32,
    /// Pixels returned to the caller, zero to use `pixels`.
    pub requested_pixels: u32,
    pub lines: u32,
    pub depth: u32,
    pub channels: u32,
    pub scan_method: ScanMethod,
    pub scan_mode: ScanColorMode,
    pub color_filter: ColorFilter,
    pub true_gray: bool,
    pub flags: ScanFlags,
}

impl Default for SetupParams {
    fn default() -> Self {
        Self {
            xres: NOT_SET,
            yres: NOT_SET,
            startx: NOT_SET,
            starty: NOT_SET,
            pixels: NOT_SET,
            requested_pixels: 0,
            lines: NOT_SET,
            depth: NOT_SET,
            channels: NOT_SET,
            scan_method: ScanMethod::Flatbed,
            scan_mode: ScanColorMode::ColorSinglePass,
            color_filter: ColorFilter::None,
            true_gray: false,
            flags: ScanFlags::empty(),
        }
    }
}

impl SetupParams {
    pub fn assert_valid(&self) -> Result<(), Error> {
        for (name, value) in [
            ("xres", self.xres),
            ("yres", self.yres),
            ("startx", self.startx),
            ("starty", self.starty),
            ("pixels", self.pixels),
            ("lines", self.lines),
            ("depth", self.depth),
            ("channels", self.channels),
        ] {
            if value == NOT_SET {
                return Err(Error::IncompleteParameters(name));
            }
        }
        Ok(())
    }

    pub fn get_requested_pixels(&self) -> u32 {
        if self.requested_pixels == 0 {
            self.pixels
        } else {
            self.requested_pixels
        }
    }
}

/// Scan geometry derived from [`SetupParams`] and the sensor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanSession {
    pub params: SetupParams,
    pub computed: bool,
    pub full_resolution: u32,
    pub optical_resolution: u32,
    pub ccd_size_divisor: u32,
    pub optical_pixels: u32,
    pub optical_line_count: u32,
    pub output_resolution: u32,
    pub output_startx: u32,
    pub output_pixels: u32,
    pub output_channel_bytes: u32,
    pub output_line_bytes: u32,
    /// Bytes per line as delivered by the ASIC.
    pub output_line_bytes_raw: u32,
    pub output_line_count: u32,
    pub output_total_bytes: u64,
    pub output_total_bytes_raw: u64,
    pub num_staggered_lines: u32,
    pub stagger_y_shifts: Vec<usize>,
    pub color_shift_lines_r: u32,
    pub color_shift_lines_g: u32,
    pub color_shift_lines_b: u32,
    pub max_color_shift_lines: u32,
    pub segment_count: u32,
    pub segment_order: Vec<usize>,
    pub output_segment_pixel_group_count: u32,
    pub conseq_pixel_dist: u32,
    pub interleaved_lines: u32,
    pub pixel_startx: u32,
    pub pixel_endx: u32,
    pub buffer_size_read: usize,
    pub enable_ledadd: bool,
}

impl ScanSession {
    pub fn assert_computed(&self) -> Result<(), Error> {
        if self.computed {
            Ok(())
        } else {
            Err(Error::SessionNotComputed)
        }
    }
}

/// Pixel count granularity of the ASIC line buffer.
pub fn align_pixels(asic_type: AsicType, channels: u32, pixels: u32) -> u32 {
    let alignment = match (asic_type, channels) {
        (AsicType::Gl841, _) => 4,
        (_, 3) => 12,
        _ => 32,
    };
    pixels.div_ceil(alignment) * alignment
}

fn ccd_size_divisor(sensor: &Sensor, xres: u32) -> u32 {
    [4, 2]
        .into_iter()
        .find(|divisor| {
            sensor.ccd_size_divisor >= *divisor
                && xres as u64 * *divisor as u64 <= sensor.optical_res as u64
        })
        .unwrap_or(1)
}

fn row_bytes(depth: u32, channels: u32, pixels: u32) -> Result<u32, Error> {
    let format = genesys_types::create_pixel_format(depth as usize, channels as usize, ColorOrder::Rgb)?;
    Ok(genesys_types::get_pixel_row_bytes(format, pixels as usize)? as u32)
}

pub fn compute_session(
    model: &Model,
    sensor: &Sensor,
    params: SetupParams,
) -> Result<ScanSession, Error> {
    params.assert_valid()?;
    if !matches!(params.depth, 1 | 8 | 16) {
        return Err(Error::UnsupportedDepth(params.depth));
    }
    if sensor.exposure_lperiod < 0 {
        return Err(Error::ExposureNotDefined);
    }
    let mut session = ScanSession {
        params,
        ..ScanSession::default()
    };
    let params = &session.params;
    let channels = params.channels;

    session.full_resolution = sensor.optical_res;
    session.ccd_size_divisor = ccd_size_divisor(sensor, params.xres);
    session.optical_resolution = sensor.optical_res / session.ccd_size_divisor;
    if params.xres > session.optical_resolution || params.xres == 0 {
        return Err(Error::ResolutionTooHigh {
            resolution: params.xres,
            optical: session.optical_resolution,
        });
    }
    session.output_resolution = params.xres;

    session.segment_count = sensor.segment_count();
    let alignment = 2 * session.ccd_size_divisor * session.segment_count;
    let optical_pixels = (params.pixels as u64 * session.optical_resolution as u64)
        .div_ceil(params.xres as u64) as u32;
    session.optical_pixels = optical_pixels.div_ceil(alignment) * alignment;
    session.output_pixels = (session.optical_pixels as u64 * params.xres as u64
        / session.optical_resolution as u64) as u32;
    session.output_startx = params.startx;

    if !params.flags.contains(ScanFlags::IGNORE_STAGGER_OFFSET) {
        session.stagger_y_shifts = sensor
            .stagger_y
            .iter()
            .map(|shift| (*shift as u64 * params.yres as u64 / sensor.optical_res as u64) as usize)
            .collect();
        if session.stagger_y_shifts.iter().all(|shift| *shift == 0) {
            session.stagger_y_shifts.clear();
        }
    }
    session.num_staggered_lines = session
        .stagger_y_shifts
        .iter()
        .copied()
        .max()
        .unwrap_or(0) as u32;

    if channels > 1 && !params.flags.contains(ScanFlags::IGNORE_COLOR_OFFSET) {
        let scale = |shift: u32| {
            (shift as u64 * params.yres as u64 / model.motor.base_ydpi.max(1) as u64) as u32
        };
        session.color_shift_lines_r = scale(model.ld_shift_r);
        session.color_shift_lines_g = scale(model.ld_shift_g);
        session.color_shift_lines_b = scale(model.ld_shift_b);
    }
    session.max_color_shift_lines = session
        .color_shift_lines_r
        .max(session.color_shift_lines_g)
        .max(session.color_shift_lines_b);

    session.output_line_count =
        params.lines + session.max_color_shift_lines + session.num_staggered_lines;
    session.optical_line_count = if model.is_cis {
        session.output_line_count * channels
    } else {
        session.output_line_count
    };

    session.output_channel_bytes = params.depth.div_ceil(8);
    session.output_line_bytes = row_bytes(params.depth, channels, session.output_pixels)?;
    session.output_line_bytes_raw = row_bytes(
        params.depth,
        if model.is_cis { 1 } else { channels },
        session.output_pixels,
    )?;
    session.output_total_bytes =
        session.output_line_bytes as u64 * session.output_line_count as u64;
    session.output_total_bytes_raw =
        session.output_line_bytes_raw as u64 * session.optical_line_count as u64;

    session.segment_order = sensor.segment_order.to_vec();
    session.output_segment_pixel_group_count = session.output_pixels / session.segment_count;
    session.conseq_pixel_dist = session.output_segment_pixel_group_count;
    session.interleaved_lines = sensor.interleaved_lines.max(1);

    session.pixel_startx = (params.startx as u64 * session.optical_resolution as u64
        / params.xres as u64) as u32
        + sensor.dummy_pixel;
    session.pixel_endx = session.pixel_startx + session.optical_pixels;

    session.buffer_size_read = session.output_line_bytes_raw as usize
        * session.optical_line_count.clamp(1, 32) as usize;
    session.enable_ledadd = model.is_cis && channels == 1 && params.true_gray;

    session.computed = true;
    tracing::debug!(
        xres = session.params.xres,
        optical_resolution = session.optical_resolution,
        ccd_size_divisor = session.ccd_size_divisor,
        output_pixels = session.output_pixels,
        output_line_count = session.output_line_count,
        "computed session"
    );
    Ok(session)
}
