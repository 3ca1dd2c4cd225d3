//! Command set of the GL842 ASIC.

pub mod registers;

use crate::calibration;
use crate::command_set::CommandSet;
use crate::device::Device;
use crate::error::Error;
use crate::error::Warning;
use crate::frontend::FrontendAction;
use crate::frontend::FrontendType;
use crate::gamma;
use crate::motor;
use crate::pipeline;
use crate::properties::AsicType;
use crate::properties::Model;
use crate::properties::ModelFlags;
use crate::register::MotorMode;
use crate::register::RegisterSet;
use crate::register::RegisterSetting;
use crate::sensor::Sensor;
use crate::sensor::SensorExposure;
use crate::session;
use crate::session::ScanSession;
use crate::session::SetupParams;
use crate::settings::ColorFilter;
use crate::settings::ScanColorMode;
use crate::settings::ScanFlags;
use crate::settings::Settings;
use registers::*;

const STEP_MULTIPLIER: usize = 2;

const SCAN_TABLE: usize = 0;
const BACKTRACK_TABLE: usize = 1;
const STOP_TABLE: usize = 2;
const FAST_TABLE: usize = 3;
const HOME_TABLE: usize = 4;

/// Feed length of a homing move, the home sensor stops it earlier.
const HOME_MOVE_STEPS: u32 = 40000;
const HOME_POLL_ATTEMPTS: u32 = 300;
const STOP_POLL_ATTEMPTS: u32 = 10;
const POLL_DELAY_MS: u64 = 100;

/// Dark and white words of the three channels.
const SHADING_BYTES_PER_PIXEL: usize = 2 * 2 * 3;

const DEFAULT_REGISTERS: &[RegisterSetting] = &[
    RegisterSetting::new(REG_0X01, 0x00),
    RegisterSetting::new(REG_0X02, 0x78),
    RegisterSetting::new(REG_0X03, 0x1f),
    RegisterSetting::new(REG_0X04, 0x10),
    RegisterSetting::new(REG_0X05, 0x80),
    RegisterSetting::new(REG_0X06, 0x18),
    RegisterSetting::new(REG_0X08, 0x00),
    RegisterSetting::new(REG_0X09, 0x00),
    RegisterSetting::new(REG_0X0A, 0x00),
    RegisterSetting::new(REG_0X0B, 0x09),
    // exposure, overwritten by the sensor setup
    RegisterSetting::new(REG_EXPR, 0x00),
    RegisterSetting::new(REG_EXPR + 1, 0x00),
    RegisterSetting::new(REG_EXPG, 0x00),
    RegisterSetting::new(REG_EXPG + 1, 0x00),
    RegisterSetting::new(REG_EXPB, 0x00),
    RegisterSetting::new(REG_EXPB + 1, 0x00),
    RegisterSetting::new(REG_0X16, 0x33),
    RegisterSetting::new(REG_0X17, 0x1c),
    RegisterSetting::new(REG_0X18, 0x10),
    RegisterSetting::new(REG_0X19, 0x2a),
    RegisterSetting::new(REG_0X1A, 0x04),
    RegisterSetting::new(REG_0X1B, 0x00),
    RegisterSetting::new(REG_0X1C, 0x20),
    RegisterSetting::new(REG_0X1D, 0x04),
    RegisterSetting::new(REG_0X1E, 0x10),
    RegisterSetting::new(REG_0X1F, 0x01),
    RegisterSetting::new(REG_0X20, 0x10),
    RegisterSetting::new(REG_STEPNO, 0x04),
    RegisterSetting::new(REG_FWDSTEP, 0x01),
    RegisterSetting::new(REG_BWDSTEP, 0x01),
    RegisterSetting::new(REG_FASTNO, 0x04),
    RegisterSetting::new(REG_LINCNT, 0x00),
    RegisterSetting::new(REG_LINCNT + 1, 0x00),
    RegisterSetting::new(REG_LINCNT + 2, 0x00),
    RegisterSetting::new(REG_DPISET, 0x02),
    RegisterSetting::new(REG_DPISET + 1, 0x58),
    RegisterSetting::new(REG_0X2E, 0x80),
    RegisterSetting::new(REG_0X2F, 0x80),
    RegisterSetting::new(REG_STRPIXEL, 0x00),
    RegisterSetting::new(REG_STRPIXEL + 1, 0x00),
    RegisterSetting::new(REG_ENDPIXEL, 0x00),
    RegisterSetting::new(REG_ENDPIXEL + 1, 0x00),
    RegisterSetting::new(REG_DUMMY, 0x24),
    RegisterSetting::new(REG_MAXWD, 0x00),
    RegisterSetting::new(REG_MAXWD + 1, 0x00),
    RegisterSetting::new(REG_MAXWD + 2, 0x00),
    RegisterSetting::new(REG_LPERIOD, 0x00),
    RegisterSetting::new(REG_LPERIOD + 1, 0x00),
    RegisterSetting::new(REG_FEEDL, 0x00),
    RegisterSetting::new(REG_FEEDL + 1, 0x00),
    RegisterSetting::new(REG_FEEDL + 2, 0x00),
    RegisterSetting::new(REG_0X52, 0x02),
    RegisterSetting::new(REG_0X53, 0x04),
    RegisterSetting::new(REG_0X54, 0x06),
    RegisterSetting::new(REG_0X55, 0x08),
    RegisterSetting::new(REG_0X56, 0x0a),
    RegisterSetting::new(REG_0X57, 0x00),
    RegisterSetting::new(REG_0X58, 0x59),
    RegisterSetting::new(REG_0X59, 0x31),
    RegisterSetting::new(REG_0X5A, 0x40),
    RegisterSetting::new(REG_0X5E, 0x1f),
    RegisterSetting::new(REG_FMOVDEC, 0x01),
    RegisterSetting::new(REG_Z1MOD, 0x00),
    RegisterSetting::new(REG_Z1MOD + 1, 0x00),
    RegisterSetting::new(REG_Z1MOD + 2, 0x00),
    RegisterSetting::new(REG_Z2MOD, 0x00),
    RegisterSetting::new(REG_Z2MOD + 1, 0x00),
    RegisterSetting::new(REG_Z2MOD + 2, 0x00),
    RegisterSetting::new(REG_0X67, 0x7f),
    RegisterSetting::new(REG_0X68, 0x7f),
    RegisterSetting::new(REG_FSHDEC, 0x01),
    RegisterSetting::new(REG_FMOVNO, 0x04),
    RegisterSetting::new(REG_0X6B, 0x01),
    RegisterSetting::new(REG_0X6C, 0x00),
    RegisterSetting::new(REG_0X6D, 0x00),
    RegisterSetting::new(REG_0X6E, 0x00),
    RegisterSetting::new(REG_0X6F, 0x00),
    RegisterSetting::new(REG_0X70, 0x00),
    RegisterSetting::new(REG_0X71, 0x02),
    RegisterSetting::new(REG_0X72, 0x00),
    RegisterSetting::new(REG_0X73, 0x00),
    RegisterSetting::new(REG_0X74, 0x00),
    RegisterSetting::new(REG_0X75, 0x00),
    RegisterSetting::new(REG_0X76, 0x3c),
    RegisterSetting::new(REG_0X77, 0x00),
    RegisterSetting::new(REG_0X78, 0x00),
    RegisterSetting::new(REG_0X79, 0x9f),
    RegisterSetting::new(REG_0X7A, 0x00),
    RegisterSetting::new(REG_0X7B, 0x00),
    RegisterSetting::new(REG_0X7C, 0x55),
    RegisterSetting::new(REG_0X7D, 0x00),
    RegisterSetting::new(REG_0X7E, 0x08),
    RegisterSetting::new(REG_0X7F, 0x00),
    RegisterSetting::new(REG_0X80, 0x00),
    RegisterSetting::new(REG_0X87, 0x00),
];

fn clamp_u8(value: u32) -> u8 {
    value.min(u8::MAX as u32) as u8
}

fn clamp_u16(value: u32) -> u16 {
    value.min(u16::MAX as u32) as u16
}

/// ASIC defaults with the model overrides and GPIO settings on top.
///
/// Overrides of addresses missing from the defaults are added as new
/// registers.
pub fn init_registers(model: &Model) -> Result<RegisterSet, Error> {
    let mut registers = RegisterSet::new();
    for setting in DEFAULT_REGISTERS {
        registers.init_reg(setting.address, setting.value);
    }
    for setting in model.init_registers.iter().chain(model.gpo.iter()) {
        if registers.has_reg(setting.address) {
            registers.set8_mask(setting.address, setting.value, setting.mask)?;
        } else {
            registers.init_reg(setting.address, setting.value & setting.mask);
        }
    }
    Ok(registers)
}

pub fn scanner_read_status(device: &Device) -> Result<u8, Error> {
    let status = device.transport().read_register(REG_0X41)?;
    tracing::trace!(status, "scanner status");
    Ok(status)
}

/// Clears the scan bit and waits for the motor to stop.
pub fn scanner_stop_action(device: &Device) -> Result<(), Error> {
    let status = scanner_read_status(device)?;
    if (status & REG_0X41_MOTORENB) == 0 {
        tracing::debug!("motor is already stopped");
        return Ok(());
    }
    let transport = device.transport();
    let value = transport.read_register(REG_0X01)? & !REG_0X01_SCAN;
    transport.write_register(REG_0X01, value)?;
    transport.sleep_ms(POLL_DELAY_MS);
    for _ in 0..STOP_POLL_ATTEMPTS {
        if (scanner_read_status(device)? & REG_0X41_MOTORENB) == 0 {
            return Ok(());
        }
        transport.sleep_ms(POLL_DELAY_MS);
    }
    Err(Error::MotorStopTimeout)
}

fn set_head_pos_zero(device: &mut Device) {
    device.head_pos_primary = Some(0);
    device.head_pos_secondary = device.model.xpa.as_ref().map(|_| 0);
}

/// Head positions after a move of `steps`, checked before the move starts.
fn advance_head_positions(
    device: &Device,
    mode: MotorMode,
    reverse: bool,
    steps: u32,
) -> Result<(Option<u32>, Option<u32>), Error> {
    let advance = |position: Option<u32>| -> Result<Option<u32>, Error> {
        let position = position.ok_or(Error::HeadPositionUnknown)?;
        if reverse {
            position
                .checked_sub(steps)
                .map(Some)
                .ok_or(Error::HeadBehindHome { position, steps })
        } else {
            Ok(Some(position.saturating_add(steps)))
        }
    };
    Ok(match mode {
        MotorMode::Primary => (
            advance(device.head_pos_primary)?,
            device.head_pos_secondary,
        ),
        MotorMode::Secondary => (
            device.head_pos_primary,
            advance(device.head_pos_secondary)?,
        ),
        MotorMode::PrimaryAndSecondary => (
            advance(device.head_pos_primary)?,
            advance(device.head_pos_secondary)?,
        ),
    })
}

fn send_slope_table(
    device: &Device,
    table: usize,
    slope_table: &motor::MotorSlopeTable,
) -> Result<(), Error> {
    if table >= SLOPE_TABLE_COUNT {
        return Err(Error::InvalidSlopeTable(table));
    }
    let maximum = device.model.asic_type.max_slope_table_size();
    if slope_table.len() > maximum {
        return Err(Error::SlopeTableTooLarge {
            size: slope_table.len(),
            maximum,
        });
    }
    tracing::trace!(table, steps = slope_table.len(), "send slope table");
    device.transport().write_gamma(
        WRITE_GAMMA_OPCODE,
        SLOPE_TABLE_ADDRESS + SLOPE_TABLE_STRIDE * table as u32,
        &slope_table.to_bytes(),
    )
}

/// Scan request of `settings` in session units.
fn scan_params(device: &Device, settings: &Settings) -> SetupParams {
    let model = device.model;
    let (x_offset, y_offset, flags) = if settings.scan_method.is_transparency() {
        (
            model.x_offset_ta,
            model.y_offset_ta + model.y_offset_sensor_to_ta,
            ScanFlags::USE_XPA,
        )
    } else {
        (model.x_offset, model.y_offset, ScanFlags::empty())
    };
    let channels = settings.get_channels();
    SetupParams {
        xres: settings.xres,
        yres: settings.yres,
        startx: ((x_offset + settings.tl_x) * settings.xres as f32 / session::MM_PER_INCH).max(0.0)
            as u32,
        starty: ((y_offset + settings.tl_y) * model.motor.base_ydpi as f32
            / session::MM_PER_INCH)
            .max(0.0) as u32,
        pixels: session::align_pixels(model.asic_type, channels, settings.pixels),
        requested_pixels: settings.pixels,
        lines: settings.lines,
        depth: settings.depth,
        channels,
        scan_method: settings.scan_method,
        scan_mode: settings.scan_mode,
        color_filter: settings.color_filter,
        true_gray: settings.true_gray,
        flags,
    }
}

fn calibration_resolution(sensor: &Sensor) -> u32 {
    if sensor.shading_resolution == 0 {
        sensor.optical_res
    } else {
        sensor.shading_resolution
    }
}

/// Color 16-bit request over the calibration width of the model.
fn calibration_params(
    device: &Device,
    resolution: u32,
    starty: u32,
    lines: u32,
    flags: ScanFlags,
) -> SetupParams {
    let model = device.model;
    let pixels = (model.x_size_calib_mm * resolution as f32 / session::MM_PER_INCH) as u32;
    let mut flags = flags
        | ScanFlags::DISABLE_SHADING
        | ScanFlags::DISABLE_GAMMA
        | ScanFlags::IGNORE_STAGGER_OFFSET
        | ScanFlags::IGNORE_COLOR_OFFSET;
    if device.settings.scan_method.is_transparency() {
        flags |= ScanFlags::USE_XPA;
    }
    SetupParams {
        xres: resolution,
        yres: resolution,
        startx: 0,
        starty,
        pixels: session::align_pixels(model.asic_type, 3, pixels),
        requested_pixels: pixels,
        lines,
        depth: 16,
        channels: 3,
        scan_method: device.settings.scan_method,
        scan_mode: ScanColorMode::ColorSinglePass,
        color_filter: ColorFilter::None,
        true_gray: false,
        flags,
    }
}

fn init_optical_regs(
    device: &Device,
    sensor: &Sensor,
    registers: &mut RegisterSet,
    session: &ScanSession,
    exposure: u32,
) -> Result<(), Error> {
    let model = device.model;
    let params = &session.params;
    registers.apply_settings(sensor.custom_regs)?;
    let sensor_exposure = device
        .calibrated_exposure
        .unwrap_or(sensor.exposure)
        .fixup();
    registers.set16(REG_EXPR, sensor_exposure.red)?;
    registers.set16(REG_EXPG, sensor_exposure.green)?;
    registers.set16(REG_EXPB, sensor_exposure.blue)?;
    registers.set16(REG_STRPIXEL, clamp_u16(session.pixel_startx))?;
    registers.set16(REG_ENDPIXEL, clamp_u16(session.pixel_endx))?;

    let shading = !params.flags.contains(ScanFlags::DISABLE_SHADING)
        && !model.flags.contains(ModelFlags::HOST_SIDE_CALIBRATION);
    let mut value = registers.get8(REG_0X01)?
        & !(REG_0X01_SCAN
            | REG_0X01_DVDSET
            | REG_0X01_SHDAREA
            | REG_0X01_CISSET
            | REG_0X01_STAGGER);
    if shading {
        value |= REG_0X01_DVDSET | REG_0X01_SHDAREA;
    }
    if model.is_cis {
        value |= REG_0X01_CISSET;
    }
    if session.num_staggered_lines > 0 {
        value |= REG_0X01_STAGGER;
    }
    registers.set8(REG_0X01, value)?;

    let lamp = !params.flags.contains(ScanFlags::DISABLE_LAMP);
    let xpa = params.flags.contains(ScanFlags::USE_XPA);
    let mut value = registers.get8(REG_0X03)? & !(REG_0X03_LAMPPWR | REG_0X03_XPASEL);
    if lamp {
        value |= REG_0X03_LAMPPWR;
    }
    if xpa {
        value |= REG_0X03_XPASEL;
    }
    registers.set8(REG_0X03, value)?;
    registers.set8(
        REG_0X19,
        if lamp {
            REG_0X19_LAMP_ON
        } else {
            REG_0X19_LAMP_OFF
        },
    )?;
    registers.state.is_lamp_on = lamp;
    registers.state.is_xpa_on = xpa;

    let mut value = registers.get8(REG_0X04)?
        & !(REG_0X04_LINEART | REG_0X04_BITSET | REG_0X04_AFEMOD | REG_0X04_FILTER);
    match params.depth {
        1 => value |= REG_0X04_LINEART,
        16 => value |= REG_0X04_BITSET,
        _ => (),
    }
    if params.channels == 1 {
        value |= match params.color_filter {
            ColorFilter::Red => REG_0X04_FILTER_RED,
            ColorFilter::Blue => REG_0X04_FILTER_BLUE,
            ColorFilter::Green | ColorFilter::None => REG_0X04_FILTER_GREEN,
        };
    } else {
        value |= match device.frontend.layout.frontend_type {
            FrontendType::AnalogDevices => REG_0X04_LAYOUT_ANALOG_DEVICES,
            _ => REG_0X04_LAYOUT_WOLFSON,
        };
    }
    registers.set8(REG_0X04, value)?;

    let dpihw = match sensor.register_dpihw {
        0..=600 => REG_0X05_DPIHW_600,
        601..=1200 => REG_0X05_DPIHW_1200,
        1201..=2400 => REG_0X05_DPIHW_2400,
        _ => REG_0X05_DPIHW_4800,
    };
    let gamma = !model.flags.contains(ModelFlags::NO_GAMMA)
        && !params.flags.contains(ScanFlags::DISABLE_GAMMA)
        && params.depth < 16;
    let mut value = registers.get8(REG_0X05)? & !(REG_0X05_DPIHW | REG_0X05_GMMENB);
    value |= dpihw;
    if gamma {
        value |= REG_0X05_GMMENB;
    }
    registers.set8(REG_0X05, value)?;

    let dpiset = if sensor.register_dpiset == 0 {
        session.output_resolution * session.ccd_size_divisor
    } else {
        sensor.register_dpiset
    };
    registers.set16(REG_DPISET, clamp_u16(dpiset))?;
    registers.set8(REG_DUMMY, clamp_u8(sensor.dummy_pixel))?;
    registers.set24(REG_MAXWD, session.output_line_bytes_raw >> 1)?;
    registers.set16(REG_LPERIOD, clamp_u16(exposure / (exposure / 65536 + 1)))?;
    registers.set8_mask(
        REG_0X87,
        if session.enable_ledadd {
            REG_0X87_LEDADD
        } else {
            0
        },
        REG_0X87_LEDADD,
    )?;
    tracing::debug!(
        startx = session.pixel_startx,
        endx = session.pixel_endx,
        dpiset,
        shading,
        gamma,
        lamp,
        "optical registers"
    );
    Ok(())
}

fn init_motor_regs(
    device: &Device,
    registers: &mut RegisterSet,
    session: &ScanSession,
    exposure: u32,
    slope_dpi: u32,
) -> Result<(), Error> {
    let model = device.model;
    let params = &session.params;
    let flags = params.flags;
    let motor_on = !flags.contains(ScanFlags::SINGLE_LINE);
    let profile = motor::get_motor_profile(
        model.motor.profiles,
        exposure,
        params.yres,
        params.scan_method,
    )?;
    let fast_profile = if model.motor.fast_profiles.is_empty() {
        profile
    } else {
        motor::get_motor_profile(
            model.motor.fast_profiles,
            0,
            params.yres,
            params.scan_method,
        )?
    };
    let scan_table = motor::create_slope_table(
        model.asic_type,
        &model.motor,
        slope_dpi,
        exposure,
        STEP_MULTIPLIER,
        profile,
    )?;
    let fast_table =
        motor::create_slope_table_fastest(model.asic_type, STEP_MULTIPLIER, fast_profile)?;
    let move_steps = params.starty;
    let use_fast_fed = !flags.contains(ScanFlags::DISABLE_FAST_FEEDING)
        && !model.flags.contains(ModelFlags::DISABLE_FAST_FEEDING)
        && move_steps as usize > 2 * fast_table.len();

    let mut value = registers.get8(REG_0X02)?
        & !(REG_0X02_ACDCDIS
            | REG_0X02_AGOHOME
            | REG_0X02_MTRPWR
            | REG_0X02_FASTFED
            | REG_0X02_MTRREV);
    if motor_on {
        value |= REG_0X02_MTRPWR;
    }
    if use_fast_fed {
        value |= REG_0X02_FASTFED;
    }
    if flags.contains(ScanFlags::AUTO_GO_HOME) {
        value |= REG_0X02_AGOHOME;
    }
    if flags.contains(ScanFlags::DISABLE_BUFFER_FULL_MOVE) {
        value |= REG_0X02_ACDCDIS;
    }
    if flags.contains(ScanFlags::REVERSE) {
        value |= REG_0X02_MTRREV;
    }
    registers.set8(REG_0X02, value)?;
    registers.set24(
        REG_LINCNT,
        if flags.contains(ScanFlags::FEEDING) {
            0
        } else {
            session.optical_line_count
        },
    )?;

    for (table, slope_table) in [
        (SCAN_TABLE, &scan_table),
        (BACKTRACK_TABLE, &scan_table),
        (STOP_TABLE, &scan_table),
        (FAST_TABLE, &fast_table),
        (HOME_TABLE, &fast_table),
    ] {
        send_slope_table(device, table, slope_table)?;
    }
    let scan_steps = (scan_table.len() / STEP_MULTIPLIER) as u32;
    let fast_steps = (fast_table.len() / STEP_MULTIPLIER) as u32;
    registers.set8(REG_STEPNO, clamp_u8(scan_steps))?;
    registers.set8(REG_FASTNO, clamp_u8(fast_steps))?;
    registers.set8(REG_FSHDEC, clamp_u8(scan_steps))?;
    registers.set8(REG_FMOVNO, clamp_u8(fast_steps))?;
    registers.set8(REG_FMOVDEC, clamp_u8(fast_steps))?;

    // steps spent accelerating and decelerating are part of the feed
    let distance = if use_fast_fed {
        scan_steps + fast_steps * 2
    } else {
        scan_steps
    };
    let feedl = if move_steps > distance {
        move_steps - distance
    } else {
        1
    };
    registers.set24(REG_FEEDL, feedl)?;

    let (z1, z2) = motor::calculate_zmod(
        use_fast_fed,
        exposure,
        &scan_table,
        scan_table.len(),
        feedl,
        scan_steps,
    );
    registers.set24(REG_Z1MOD, z1)?;
    registers.set24(REG_Z2MOD, z2)?;
    registers.set8_mask(
        REG_0X67,
        (profile.step_type.shift() << 6) as u8,
        REG_0X67_STEPSEL,
    )?;
    registers.set8_mask(
        REG_0X68,
        (fast_profile.step_type.shift() << 6) as u8,
        REG_0X68_FSTPSEL,
    )?;

    let xpa_motor = model
        .xpa
        .as_ref()
        .filter(|xpa| flags.contains(ScanFlags::USE_XPA) && !xpa.motor.is_empty());
    if let Some(xpa) = xpa_motor {
        registers.apply_settings(xpa.motor)?;
    }
    registers.state.is_motor_on = motor_on;
    registers.state.motor_mode = if xpa_motor.is_some() {
        MotorMode::PrimaryAndSecondary
    } else {
        MotorMode::Primary
    };
    tracing::debug!(
        move_steps,
        feedl,
        use_fast_fed,
        scan_steps,
        fast_steps,
        z1,
        z2,
        "motor registers"
    );
    Ok(())
}

pub struct CommandSetGl842;

impl CommandSetGl842 {
    /// Scans the single line of `session` and returns the average of each channel.
    fn scan_calibration_line(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        registers: &mut RegisterSet,
        session: &ScanSession,
    ) -> Result<Vec<u32>, Error> {
        device.transport().write_registers(registers)?;
        self.begin_scan(device, sensor, registers, false)?;
        let mut stack =
            pipeline::build_image_pipeline(device.model, session, device.transport_handle())?;
        let data = stack.get_all_data()?;
        self.end_scan(device, registers, true)?;
        calibration::average_channels(
            &data,
            stack.output_format()?,
            stack.output_width()?,
            stack.output_height()?,
        )
    }

    /// Repeats the warm-up line until two consecutive lines agree.
    fn wait_for_lamp(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        registers: &mut RegisterSet,
        session: &ScanSession,
        configuration: &calibration::Configuration,
    ) -> Result<(), Error> {
        let mut previous = self.scan_calibration_line(device, sensor, registers, session)?;
        for retry in 0..configuration.warmup_retries {
            if device.flag().is_cancelled() {
                return Err(Error::Cancelled);
            }
            device.transport().sleep_ms(configuration.warmup_delay_ms);
            let current = self.scan_calibration_line(device, sensor, registers, session)?;
            if calibration::is_stable(
                &previous,
                &current,
                configuration.warmup_stability_percent,
            ) {
                tracing::debug!(retry, ?current, "lamp is warm");
                return Ok(());
            }
            previous = current;
        }
        tracing::warn!(
            retries = configuration.warmup_retries,
            "lamp did not stabilise"
        );
        Ok(())
    }
}

impl CommandSet for CommandSetGl842 {
    fn asic_type(&self) -> AsicType {
        AsicType::Gl842
    }

    fn init(&self, device: &mut Device) -> Result<(), Error> {
        let _span = tracing::debug_span!("gl842_init").entered();
        let value = device.transport().read_register(REG_0X06)?;
        let cold = (value & REG_0X06_PWRBIT) == 0;
        device.head_pos_primary = None;
        device.head_pos_secondary = None;
        self.asic_boot(device, cold)?;
        let sensor = device.find_sensor()?;
        self.set_fe(device, sensor, FrontendAction::Init)?;
        self.send_gamma_table(device, sensor)?;
        device.calibration_cache.clear();
        self.move_back_home(device, true)
    }

    fn asic_boot(&self, device: &mut Device, cold: bool) -> Result<(), Error> {
        let _span = tracing::debug_span!("asic_boot", cold).entered();
        if cold {
            device.transport().write_register(REG_0X0E, 0x01)?;
            device.transport().write_register(REG_0X0E, 0x00)?;
        }
        device.registers = init_registers(device.model)?;
        let transport = device.transport();
        transport.write_registers(&device.registers)?;
        transport.write_0x8c(0x10, 0x94)?;
        // RAM address
        transport.write_register(REG_0X2A, 0x00)?;
        transport.write_register(REG_0X2B, 0x00)?;
        for setting in device.model.gpo {
            transport.write_register(setting.address, device.registers.get8(setting.address)?)?;
        }
        device.initial_registers = device.registers.clone();
        Ok(())
    }

    fn set_fe(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        action: FrontendAction,
    ) -> Result<(), Error> {
        let _span = tracing::debug_span!("set_fe", ?action).entered();
        if action == FrontendAction::PowerSave {
            tracing::debug!("frontend power saving is not used");
            return Ok(());
        }
        let frontend_type = match device.registers.get8(REG_0X04)? & REG_0X04_FESET {
            0x00 => FrontendType::Wolfson,
            0x02 => FrontendType::AnalogDevices,
            other => return Err(Error::UnsupportedFrontend(other)),
        };
        if action == FrontendAction::Init {
            device.frontend = device.frontend_initial.clone();
            device.frontend.registers.merge(sensor.custom_fe_regs);
        }
        if device.frontend.layout.frontend_type != frontend_type {
            return Err(Error::InvalidFrontendLayout);
        }
        let transport = device.transport();
        let frontend = &device.frontend;
        for address in (0..4u8).filter(|address| {
            !frontend.layout.offset_addr.contains(address)
                && !frontend.layout.gain_addr.contains(address)
        }) {
            transport.write_fe_register(address, frontend.reg(address) as u16)?;
        }
        for channel in 0..3 {
            transport.write_fe_register(
                frontend.layout.offset_addr[channel],
                frontend.get_offset(channel) as u16,
            )?;
            transport.write_fe_register(
                frontend.layout.gain_addr[channel],
                frontend.get_gain(channel) as u16,
            )?;
        }
        Ok(())
    }

    fn calculate_scan_session(
        &self,
        device: &Device,
        sensor: &Sensor,
        settings: &Settings,
    ) -> Result<ScanSession, Error> {
        session::compute_session(device.model, sensor, scan_params(device, settings))
    }

    fn init_regs_for_scan(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        registers: &mut RegisterSet,
    ) -> Result<(), Error> {
        let _span = tracing::debug_span!("init_regs_for_scan").entered();
        let mut params = scan_params(device, &device.settings);
        if device.shading_data.is_empty() {
            params.flags |= ScanFlags::DISABLE_SHADING;
        }
        if !gamma::has_effective_gamma(sensor, &device.custom_gamma) {
            params.flags |= ScanFlags::DISABLE_GAMMA;
        }
        let session = session::compute_session(device.model, sensor, params)?;
        self.init_regs_for_scan_session(device, sensor, registers, &session)?;
        device.session = session;
        Ok(())
    }

    fn init_regs_for_scan_session(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        registers: &mut RegisterSet,
        session: &ScanSession,
    ) -> Result<(), Error> {
        session.assert_computed()?;
        if sensor.exposure_lperiod < 0 {
            return Err(Error::ExposureNotDefined);
        }
        let params = &session.params;
        let _span = tracing::debug_span!(
            "init_regs_for_scan_session",
            xres = params.xres,
            yres = params.yres,
            lines = params.lines,
            flags = ?params.flags
        )
        .entered();
        let exposure = sensor.exposure_lperiod as u32;
        let slope_dpi = if device.model.is_cis {
            params.yres * params.channels
        } else {
            params.yres
        };
        init_optical_regs(device, sensor, registers, session, exposure)?;
        init_motor_regs(device, registers, session, exposure, slope_dpi)
    }

    fn init_regs_for_shading(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        registers: &mut RegisterSet,
    ) -> Result<ScanSession, Error> {
        let _span = tracing::debug_span!("init_regs_for_shading").entered();
        let model = device.model;
        let resolution = calibration_resolution(sensor);
        let starty = if model.flags.contains(ModelFlags::SHADING_NO_MOVE) {
            0
        } else {
            (model.y_offset_calib_white * model.motor.base_ydpi as f32 / session::MM_PER_INCH)
                as u32
        };
        let params = calibration_params(
            device,
            resolution,
            starty,
            calibration::shading_line_count(resolution),
            ScanFlags::DISABLE_BUFFER_FULL_MOVE,
        );
        let session = session::compute_session(model, sensor, params)?;
        self.init_regs_for_scan_session(device, sensor, registers, &session)?;
        Ok(session)
    }

    fn init_regs_for_warmup(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        registers: &mut RegisterSet,
    ) -> Result<ScanSession, Error> {
        let _span = tracing::debug_span!("init_regs_for_warmup").entered();
        let params = calibration_params(
            device,
            calibration_resolution(sensor),
            0,
            1,
            ScanFlags::SINGLE_LINE,
        );
        let session = session::compute_session(device.model, sensor, params)?;
        self.init_regs_for_scan_session(device, sensor, registers, &session)?;
        Ok(session)
    }

    fn begin_scan(
        &self,
        device: &mut Device,
        _sensor: &Sensor,
        registers: &mut RegisterSet,
        start_motor: bool,
    ) -> Result<(), Error> {
        let _span = tracing::debug_span!("begin_scan", start_motor).entered();
        let positions = if start_motor && registers.state.is_motor_on {
            let steps = registers.get24(REG_FEEDL)? + registers.get24(REG_LINCNT)?;
            let reverse = (registers.get8(REG_0X02)? & REG_0X02_MTRREV) != 0;
            Some(advance_head_positions(
                device,
                registers.state.motor_mode,
                reverse,
                steps,
            )?)
        } else {
            None
        };
        if registers.state.is_xpa_on {
            self.set_xpa_lamp_power(device, true)?;
        }
        let transport = device.transport();
        transport.write_register(REG_0X0D, REG_0X0D_CLRLNCNT | REG_0X0D_CLRMCNT)?;
        let value = transport.read_register(REG_0X01)? | REG_0X01_SCAN;
        transport.write_register(REG_0X01, value)?;
        registers.set8(REG_0X01, value)?;
        if start_motor {
            transport.write_register(REG_0X0F, 1)?;
        }
        if let Some((primary, secondary)) = positions {
            device.head_pos_primary = primary;
            device.head_pos_secondary = secondary;
            tracing::debug!(?primary, ?secondary, "head moved");
        }
        Ok(())
    }

    fn end_scan(
        &self,
        device: &mut Device,
        registers: &mut RegisterSet,
        check_stop: bool,
    ) -> Result<(), Error> {
        let _span = tracing::debug_span!("end_scan", check_stop).entered();
        if registers.state.is_xpa_on {
            self.set_xpa_lamp_power(device, false)?;
        }
        if check_stop {
            scanner_stop_action(device)?;
        }
        let value = registers.get8(REG_0X01)? & !REG_0X01_SCAN;
        registers.set8(REG_0X01, value)
    }

    fn move_back_home(&self, device: &mut Device, wait_until_home: bool) -> Result<(), Error> {
        let _span = tracing::debug_span!("move_back_home", wait_until_home).entered();
        if (scanner_read_status(device)? & REG_0X41_HOMESNR) != 0 {
            tracing::debug!("head is already home");
            set_head_pos_zero(device);
            return Ok(());
        }
        scanner_stop_action(device)?;
        let sensor = device.find_sensor()?;
        let params = SetupParams {
            xres: device.settings.xres,
            yres: device.settings.yres,
            startx: 0,
            starty: HOME_MOVE_STEPS,
            pixels: session::align_pixels(device.model.asic_type, 1, 16),
            requested_pixels: 0,
            lines: 0,
            depth: 8,
            channels: 1,
            scan_method: device.settings.scan_method,
            scan_mode: ScanColorMode::Gray,
            color_filter: ColorFilter::Green,
            true_gray: false,
            flags: ScanFlags::DISABLE_SHADING
                | ScanFlags::DISABLE_GAMMA
                | ScanFlags::DISABLE_LAMP
                | ScanFlags::IGNORE_STAGGER_OFFSET
                | ScanFlags::IGNORE_COLOR_OFFSET
                | ScanFlags::FEEDING
                | ScanFlags::REVERSE,
        };
        let session = session::compute_session(device.model, sensor, params)?;
        let mut registers = device.registers.clone();
        self.init_regs_for_scan_session(device, sensor, &mut registers, &session)?;
        let transport = device.transport();
        transport.write_registers(&registers)?;
        transport.write_register(REG_0X0F, 1)?;
        if !wait_until_home {
            set_head_pos_zero(device);
            return Ok(());
        }
        for attempt in 0..HOME_POLL_ATTEMPTS {
            if (scanner_read_status(device)? & REG_0X41_HOMESNR) != 0 {
                tracing::debug!(attempt, "head reached home");
                set_head_pos_zero(device);
                return Ok(());
            }
            device.transport().sleep_ms(POLL_DELAY_MS);
        }
        scanner_stop_action(device)?;
        Err(Error::HomeTimeout)
    }

    fn led_calibration(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        registers: &mut RegisterSet,
    ) -> Result<SensorExposure, Error> {
        let _span = tracing::debug_span!("led_calibration").entered();
        let session = self.init_regs_for_warmup(device, sensor, registers)?;
        let configuration = device.calibration.clone();
        let flag = device.flag();
        if device.model.flags.contains(ModelFlags::WARMUP) {
            self.wait_for_lamp(device, sensor, registers, &session, &configuration)?;
        }
        let exposure = device.calibrated_exposure.unwrap_or(sensor.exposure);
        let mut searches = [exposure.red, exposure.green, exposure.blue].map(|value| {
            calibration::BoundedSearch::with_start(
                1,
                configuration.lamp_ceiling,
                configuration.lamp_ceiling,
                value as u32,
            )
        });
        calibration::run_search(
            calibration::Kind::Lamp,
            &mut searches,
            calibration::Band::new(configuration.lamp_target, configuration.tolerance),
            configuration.lamp_iterations,
            &flag,
            |values| {
                for (address, value) in [REG_EXPR, REG_EXPG, REG_EXPB].into_iter().zip(values) {
                    registers.set16(address, clamp_u16(*value))?;
                }
                self.scan_calibration_line(device, sensor, registers, &session)
            },
        )?;
        let exposure = SensorExposure::new(
            clamp_u16(searches[0].current()),
            clamp_u16(searches[1].current()),
            clamp_u16(searches[2].current()),
        )
        .fixup();
        registers.set16(REG_EXPR, exposure.red)?;
        registers.set16(REG_EXPG, exposure.green)?;
        registers.set16(REG_EXPB, exposure.blue)?;
        tracing::debug!(?exposure, "lamp calibrated");
        Ok(exposure)
    }

    fn offset_calibration(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        registers: &mut RegisterSet,
    ) -> Result<(), Error> {
        let _span = tracing::debug_span!("offset_calibration").entered();
        let params = calibration_params(
            device,
            calibration_resolution(sensor),
            0,
            1,
            ScanFlags::SINGLE_LINE | ScanFlags::DISABLE_LAMP,
        );
        let session = session::compute_session(device.model, sensor, params)?;
        self.init_regs_for_scan_session(device, sensor, registers, &session)?;
        let configuration = device.calibration.clone();
        let flag = device.flag();
        let mut searches: [calibration::BoundedSearch; 3] = std::array::from_fn(|channel| {
            calibration::BoundedSearch::with_start(0, 255, 255, device.frontend.get_offset(channel) as u32)
        });
        calibration::run_search(
            calibration::Kind::Offset,
            &mut searches,
            calibration::Band::new(configuration.offset_target, configuration.tolerance),
            configuration.offset_iterations,
            &flag,
            |values| {
                for (channel, value) in values.iter().enumerate() {
                    device.frontend.set_offset(channel, clamp_u8(*value));
                }
                self.set_fe(device, sensor, FrontendAction::Set)?;
                self.scan_calibration_line(device, sensor, registers, &session)
            },
        )?;
        for (channel, search) in searches.iter().enumerate() {
            device.frontend.set_offset(channel, clamp_u8(search.current()));
        }
        tracing::debug!(
            offsets = ?searches.map(|search| search.current()),
            "offset calibrated"
        );
        self.set_fe(device, sensor, FrontendAction::Set)
    }

    fn coarse_gain_calibration(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        registers: &mut RegisterSet,
        dpi: u32,
    ) -> Result<(), Error> {
        let _span = tracing::debug_span!("coarse_gain_calibration", dpi).entered();
        let params = calibration_params(device, dpi, 0, 1, ScanFlags::SINGLE_LINE);
        let session = session::compute_session(device.model, sensor, params)?;
        self.init_regs_for_scan_session(device, sensor, registers, &session)?;
        let configuration = device.calibration.clone();
        let flag = device.flag();
        let mut searches: [calibration::BoundedSearch; 3] = std::array::from_fn(|channel| {
            calibration::BoundedSearch::with_start(0, 255, 255, device.frontend.get_gain(channel) as u32)
        });
        calibration::run_search(
            calibration::Kind::Gain,
            &mut searches,
            calibration::Band::new(configuration.gain_target, configuration.tolerance),
            configuration.gain_iterations,
            &flag,
            |values| {
                for (channel, value) in values.iter().enumerate() {
                    device.frontend.set_gain(channel, clamp_u8(*value));
                }
                self.set_fe(device, sensor, FrontendAction::Set)?;
                self.scan_calibration_line(device, sensor, registers, &session)
            },
        )?;
        for (channel, search) in searches.iter().enumerate() {
            device.frontend.set_gain(channel, clamp_u8(search.current()));
        }
        tracing::debug!(
            gains = ?searches.map(|search| search.current()),
            "gain calibrated"
        );
        self.set_fe(device, sensor, FrontendAction::Set)
    }

    fn send_gamma_table(&self, device: &mut Device, sensor: &Sensor) -> Result<(), Error> {
        if device.model.flags.contains(ModelFlags::NO_GAMMA) {
            tracing::debug!("no gamma RAM");
            return Ok(());
        }
        let data =
            gamma::generate_gamma_buffer(sensor, &device.custom_gamma, gamma::GAMMA_TABLE_SIZE);
        device
            .transport()
            .write_gamma(WRITE_GAMMA_OPCODE, 0x0000, &data)
    }

    fn send_shading_data(
        &self,
        device: &mut Device,
        sensor: &Sensor,
        data: &[u8],
    ) -> Result<(), Error> {
        let _span = tracing::debug_span!("send_shading_data", size = data.len()).entered();
        let session = &device.session;
        session.assert_computed()?;
        let shading_resolution = calibration_resolution(sensor) as i64;
        let xres = (session.params.xres as i64).max(1);
        let shading_area = (device.registers.get8(REG_0X01)? & REG_0X01_SHDAREA) != 0;
        let (offset, length) = if shading_area {
            let offset = session.params.startx as i64 * shading_resolution / xres
                + sensor.shading_pixel_offset as i64;
            let length = session.output_pixels as i64 * shading_resolution / xres;
            (
                offset.max(0) as usize * SHADING_BYTES_PER_PIXEL,
                length as usize * SHADING_BYTES_PER_PIXEL,
            )
        } else {
            let offset = (sensor.shading_pixel_offset as i64).max(0) as usize
                * SHADING_BYTES_PER_PIXEL;
            (offset, data.len().saturating_sub(offset))
        };
        let available = data.len().saturating_sub(offset);
        let window = if length > available {
            tracing::warn!(offset, length, available, "shading window clamped");
            device.flag().store_warning(Warning::ShadingWindowClamped {
                offset,
                length,
                available,
            });
            &data[data.len() - available..]
        } else {
            &data[offset..offset + length]
        };
        device
            .transport()
            .write_buffer(WRITE_BUFFER_OPCODE, 0, window)
    }

    fn set_xpa_lamp_power(&self, device: &mut Device, on: bool) -> Result<(), Error> {
        let xpa = device.model.xpa.as_ref().ok_or(Error::MissingXpaSettings)?;
        let settings = if on { xpa.lamp_on } else { xpa.lamp_off };
        let transport = device.transport();
        for setting in settings {
            let value = transport.read_register(setting.address)?;
            transport.write_register(
                setting.address,
                (value & !setting.mask) | (setting.value & setting.mask),
            )?;
        }
        tracing::debug!(on, "transparency lamp");
        Ok(())
    }
}
