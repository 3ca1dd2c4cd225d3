#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum ScanMethod {
    #[default]
    Flatbed,
    Transparency,
    TransparencyInfrared,
}

impl ScanMethod {
    pub fn is_transparency(self) -> bool {
        matches!(
            self,
            ScanMethod::Transparency | ScanMethod::TransparencyInfrared
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum ScanColorMode {
    Lineart,
    Halftone,
    Gray,
    #[default]
    ColorSinglePass,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum ColorFilter {
    Red,
    #[default]
    Green,
    Blue,
    None,
}

bitflags::bitflags! {
    /// Per-session switches of the register programmer.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct ScanFlags: u32 {
        const DISABLE_SHADING = 1 << 0;
        const DISABLE_GAMMA = 1 << 1;
        const DISABLE_BUFFER_FULL_MOVE = 1 << 2;
        const IGNORE_STAGGER_OFFSET = 1 << 3;
        const IGNORE_COLOR_OFFSET = 1 << 4;
        const DISABLE_LAMP = 1 << 5;
        const SINGLE_LINE = 1 << 6;
        const FEEDING = 1 << 7;
        const USE_XPA = 1 << 8;
        const REVERSE = 1 << 9;
        const AUTO_GO_HOME = 1 << 10;
        const DISABLE_FAST_FEEDING = 1 << 11;
    }
}

/// User-level scan request.
///
/// `tl_x` and `tl_y` are in millimetres from the top-left corner of the
/// scan area, `pixels` and `lines` are in output resolution units.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Settings {
    pub scan_method: ScanMethod,
    pub scan_mode: ScanColorMode,
    pub xres: u32,
    pub yres: u32,
    pub tl_x: f32,
    pub tl_y: f32,
    pub lines: u32,
    pub pixels: u32,
    pub depth: u32,
    pub color_filter: ColorFilter,
    /// Lit with all three colors at once on CIS sensors.
    pub true_gray: bool,
    /// Lineart threshold in percent.
    pub threshold: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scan_method: ScanMethod::Flatbed,
            scan_mode: ScanColorMode::ColorSinglePass,
            xres: 300,
            yres: 300,
            tl_x: 0.0,
            tl_y: 0.0,
            lines: 3507,
            pixels: 2480,
            depth: 8,
            color_filter: ColorFilter::Green,
            true_gray: false,
            threshold: 50,
        }
    }
}

impl Settings {
    pub fn get_channels(&self) -> u32 {
        match self.scan_mode {
            ScanColorMode::ColorSinglePass => 3,
            _ => 1,
        }
    }
}
