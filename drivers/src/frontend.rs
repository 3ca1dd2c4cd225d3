use crate::register::RegisterSetting;
use crate::register::RegisterSettingSet;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FrontendType {
    Unknown,
    Wolfson,
    AnalogDevices,
}

/// Frontend register addresses of the per-channel offset and gain.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FrontendLayout {
    pub frontend_type: FrontendType,
    pub offset_addr: [u8; 3],
    pub gain_addr: [u8; 3],
}

pub const WOLFSON_LAYOUT: FrontendLayout = FrontendLayout {
    frontend_type: FrontendType::Wolfson,
    offset_addr: [0x20, 0x21, 0x22],
    gain_addr: [0x28, 0x29, 0x2a],
};

pub const ANALOG_DEVICES_LAYOUT: FrontendLayout = FrontendLayout {
    frontend_type: FrontendType::AnalogDevices,
    offset_addr: [0x05, 0x06, 0x07],
    gain_addr: [0x02, 0x03, 0x04],
};

#[derive(Debug)]
pub struct Descriptor {
    pub layout: FrontendLayout,
    pub registers: &'static [RegisterSetting],
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrontendAction {
    /// Restores the power-on register values.
    Init,
    Set,
    PowerSave,
}

/// Host copy of the analog frontend registers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontend {
    pub layout: FrontendLayout,
    pub registers: RegisterSettingSet,
}

impl Frontend {
    pub fn from_descriptor(descriptor: &Descriptor) -> Self {
        Self {
            layout: descriptor.layout,
            registers: RegisterSettingSet::from_slice(descriptor.registers),
        }
    }

    pub fn get_gain(&self, channel: usize) -> u8 {
        self.registers
            .get_value(self.layout.gain_addr[channel] as u16)
            .unwrap_or(0)
    }

    pub fn set_gain(&mut self, channel: usize, value: u8) {
        self.registers.set(RegisterSetting::new(
            self.layout.gain_addr[channel] as u16,
            value,
        ));
    }

    pub fn get_offset(&self, channel: usize) -> u8 {
        self.registers
            .get_value(self.layout.offset_addr[channel] as u16)
            .unwrap_or(0)
    }

    pub fn set_offset(&mut self, channel: usize, value: u8) {
        self.registers.set(RegisterSetting::new(
            self.layout.offset_addr[channel] as u16,
            value,
        ));
    }

    /// Configuration register, 0 to 3.
    pub fn reg(&self, address: u8) -> u8 {
        self.registers.get_value(address as u16).unwrap_or(0)
    }
}
