use crate::error::Error;
use crate::properties::Model;
use crate::register::RegisterSetting;
use crate::settings::ScanMethod;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct SensorExposure {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl SensorExposure {
    pub const fn new(red: u16, green: u16, blue: u16) -> Self {
        Self { red, green, blue }
    }

    /// Replaces zero times, the ASIC stalls on a zero exposure.
    pub fn fixup(self) -> Self {
        Self {
            red: self.red.max(1),
            green: self.green.max(1),
            blue: self.blue.max(1),
        }
    }
}

/// Sensor mode, valid for a set of resolutions, channel counts and methods.
///
/// Empty `resolutions`, `channels` or `methods` match any value.
#[derive(Debug)]
pub struct Sensor {
    pub optical_res: u32,
    pub resolutions: &'static [u32],
    pub channels: &'static [u32],
    pub methods: &'static [ScanMethod],
    pub register_dpihw: u32,
    pub register_dpiset: u32,
    pub shading_resolution: u32,
    /// Pixels skipped at the start of the shading RAM.
    pub shading_pixel_offset: i32,
    pub ccd_size_divisor: u32,
    pub black_pixels: u32,
    pub dummy_pixel: u32,
    pub gain_white_ref: u32,
    pub exposure: SensorExposure,
    /// Line period in pixel clocks, negative when undefined.
    pub exposure_lperiod: i32,
    pub segment_order: &'static [usize],
    /// Per-line pixel shift of staggered sensors.
    pub stagger_y: &'static [u32],
    pub interleaved_lines: u32,
    pub gamma: [f32; 3],
    pub custom_regs: &'static [RegisterSetting],
    pub custom_fe_regs: &'static [RegisterSetting],
}

impl Sensor {
    pub fn matches(&self, resolution: u32, channels: u32, method: ScanMethod) -> bool {
        (self.resolutions.is_empty() || self.resolutions.contains(&resolution))
            && (self.channels.is_empty() || self.channels.contains(&channels))
            && (self.methods.is_empty() || self.methods.contains(&method))
    }

    pub fn segment_count(&self) -> u32 {
        (self.segment_order.len() as u32).max(1)
    }
}

pub fn find_sensor(
    model: &'static Model,
    resolution: u32,
    channels: u32,
    method: ScanMethod,
) -> Result<&'static Sensor, Error> {
    model
        .sensors
        .iter()
        .find(|sensor| sensor.matches(resolution, channels, method))
        .ok_or(Error::SensorNotFound {
            resolution,
            channels,
            method,
        })
}

