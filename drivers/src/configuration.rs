use crate::calibration;
use crate::settings::Settings;
use crate::usb;

/// Everything a caller can tune before opening a scanner.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Configuration {
    pub settings: Settings,
    pub calibration: calibration::Configuration,
    pub usb: usb::Configuration,
}

impl Configuration {
    pub fn deserialize_bincode(data: &[u8]) -> bincode::Result<Configuration> {
        bincode::deserialize(data)
    }
}
