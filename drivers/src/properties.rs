use crate::frontend;
use crate::motor;
use crate::register::RegisterSetting;
use crate::sensor;
use crate::settings::ScanMethod;
use genesys_types::ColorOrder;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AsicType {
    Gl841,
    Gl842,
    Gl843,
}

impl AsicType {
    /// Largest slope table accepted by the motor RAM.
    pub fn max_slope_table_size(self) -> usize {
        match self {
            AsicType::Gl841 | AsicType::Gl842 => 255,
            AsicType::Gl843 => 1024,
        }
    }
}

bitflags::bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ModelFlags: u32 {
        /// The ASIC has no gamma RAM.
        const NO_GAMMA = 1 << 0;
        const DISABLE_SHADING_CALIBRATION = 1 << 1;
        const DISABLE_FAST_FEEDING = 1 << 2;
        /// Shading lines are scanned without moving the head.
        const SHADING_NO_MOVE = 1 << 3;
        const DARK_CALIBRATION = 1 << 4;
        const OFFSET_CALIBRATION = 1 << 5;
        const WARMUP = 1 << 6;
        const CUSTOM_GAMMA = 1 << 7;
        /// Shading is applied by the host, the ASIC shading stage stays off.
        const HOST_SIDE_CALIBRATION = 1 << 8;
    }
}

/// Register settings toggled when the transparency adapter is in use.
#[derive(Debug)]
pub struct XpaSettings {
    pub lamp_on: &'static [RegisterSetting],
    pub lamp_off: &'static [RegisterSetting],
    /// Registers that drive the adapter motor together with the head.
    pub motor: &'static [RegisterSetting],
}

/// Static description of a scanner model.
///
/// Distances are in millimetres, measured from the home position.
#[derive(Debug)]
pub struct Model {
    pub name: &'static str,
    pub vendor: &'static str,
    pub model: &'static str,
    pub asic_type: AsicType,
    pub flags: ModelFlags,
    pub is_cis: bool,
    /// Channel order of line-mode (CIS) scans.
    pub line_mode_color_order: ColorOrder,
    pub default_method: ScanMethod,
    pub methods: &'static [ScanMethod],
    pub x_offset: f32,
    pub y_offset: f32,
    pub x_size: f32,
    pub y_size: f32,
    pub x_offset_ta: f32,
    pub y_offset_ta: f32,
    pub x_size_ta: f32,
    pub y_size_ta: f32,
    /// Distance between the flatbed sensor and the adapter sensor.
    pub y_offset_sensor_to_ta: f32,
    pub y_offset_calib_white: f32,
    pub x_size_calib_mm: f32,
    pub ld_shift_r: u32,
    pub ld_shift_g: u32,
    pub ld_shift_b: u32,
    /// Number of steps the head runs past the home sensor.
    pub post_scan: u32,
    pub sensors: &'static [sensor::Sensor],
    pub motor: motor::Motor,
    pub frontend: frontend::Descriptor,
    pub gpo: &'static [RegisterSetting],
    /// Model overrides applied on top of the ASIC default registers.
    pub init_registers: &'static [RegisterSetting],
    pub xpa: Option<XpaSettings>,
}

impl Model {
    pub fn has_method(&self, method: ScanMethod) -> bool {
        self.methods.contains(&method)
    }
}
