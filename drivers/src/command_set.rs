use crate::device::Device;
use crate::error::Error;
use crate::frontend::FrontendAction;
use crate::gl842;
use crate::properties::AsicType;
use crate::register::RegisterSet;
use crate::sensor::Sensor;
use crate::sensor::SensorExposure;
use crate::session::ScanSession;
use crate::settings::Settings;

/// ASIC-specific register programming.
///
/// Methods that build a register image take it as a separate argument, the
/// caller decides when it is written and whether it replaces
/// `device.registers`.
pub trait CommandSet: Send + Sync {
    fn asic_type(&self) -> AsicType;

    /// Detects a cold start, boots the ASIC and parks the head.
    fn init(&self, device: &mut Device) -> Result<(), Error>;

    fn asic_boot(&self, device: &mut Device, cold: bool) -> Result<(), Error>;

    fn set_fe(&self, device: &mut Device, sensor: &Sensor, action: FrontendAction)
        -> Result<(), Error>;

    fn calculate_scan_session(
        &self,
        device: &Device,
        sensor: &Sensor,
        settings: &Settings,
    ) -> Result<ScanSession, Error>;

    /// Programs `registers` for the scan described by `device.settings`.
    fn init_regs_for_scan(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        registers: &mut RegisterSet,
    ) -> Result<(), Error>;

    fn init_regs_for_scan_session(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        registers: &mut RegisterSet,
        session: &ScanSession,
    ) -> Result<(), Error>;

    fn init_regs_for_shading(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        registers: &mut RegisterSet,
    ) -> Result<ScanSession, Error>;

    fn init_regs_for_warmup(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        registers: &mut RegisterSet,
    ) -> Result<ScanSession, Error>;

    fn begin_scan(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        registers: &mut RegisterSet,
        start_motor: bool,
    ) -> Result<(), Error>;

    fn end_scan(
        &self,
        device: &mut Device,
        registers: &mut RegisterSet,
        check_stop: bool,
    ) -> Result<(), Error>;

    fn move_back_home(&self, device: &mut Device, wait_until_home: bool) -> Result<(), Error>;

    /// Adjusts the exposure of each channel, returns the calibrated exposure.
    fn led_calibration(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        registers: &mut RegisterSet,
    ) -> Result<SensorExposure, Error>;

    fn offset_calibration(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        registers: &mut RegisterSet,
    ) -> Result<(), Error>;

    fn coarse_gain_calibration(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        registers: &mut RegisterSet,
        dpi: u32,
    ) -> Result<(), Error>;

    fn send_gamma_table(&self, device: &mut Device, sensor: &Sensor) -> Result<(), Error>;

    fn send_shading_data(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        data: &[u8],
    ) -> Result<(), Error>;

    fn set_xpa_lamp_power(&self, device: &mut Device, on: bool) -> Result<(), Error>;
}

pub fn command_set(asic_type: AsicType) -> Result<&'static dyn CommandSet, Error> {
    match asic_type {
        AsicType::Gl842 => Ok(&gl842::CommandSetGl842),
        asic_type => Err(Error::UnsupportedAsic(asic_type)),
    }
}
