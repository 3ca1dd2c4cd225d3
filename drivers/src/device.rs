use crate::calibration;
use crate::command_set::command_set;
use crate::command_set::CommandSet;
use crate::configuration::Configuration;
use crate::error::Error;
use crate::error::Warning;
use crate::flag::Flag;
use crate::frontend::Frontend;
use crate::frontend::FrontendAction;
use crate::pipeline;
use crate::properties::Model;
use crate::properties::ModelFlags;
use crate::register::RegisterSet;
use crate::sensor;
use crate::sensor::Sensor;
use crate::sensor::SensorExposure;
use crate::session;
use crate::session::ScanSession;
use crate::settings::ScanFlags;
use crate::settings::Settings;
use crate::transport::Transport;
use genesys_types::Image;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum State {
    Uninitialized,
    Idle,
    Scanning,
}

/// An opened scanner.
///
/// Every operation takes `&mut self`, a device runs one scan at a time.
pub struct Device {
    pub model: &'static Model,
    transport: std::sync::Arc<dyn Transport>,
    command_set: &'static dyn CommandSet,
    pub registers: RegisterSet,
    pub initial_registers: RegisterSet,
    pub frontend: Frontend,
    pub frontend_initial: Frontend,
    pub settings: Settings,
    pub calibration: calibration::Configuration,
    /// Session of the last programmed scan.
    pub session: ScanSession,
    /// Motor steps from home, `None` until the head is parked.
    pub head_pos_primary: Option<u32>,
    pub head_pos_secondary: Option<u32>,
    pub custom_gamma: [Option<Vec<u16>>; 3],
    pub calibrated_exposure: Option<SensorExposure>,
    pub shading_data: Vec<u8>,
    pub calibration_cache: calibration::Cache,
    pipeline: pipeline::Stack,
    flag: Flag<Warning>,
    state: State,
}

impl Device {
    pub fn new(
        model: &'static Model,
        transport: std::sync::Arc<dyn Transport>,
        configuration: Configuration,
    ) -> Result<Self, Error> {
        let frontend = Frontend::from_descriptor(&model.frontend);
        Ok(Self {
            model,
            transport,
            command_set: command_set(model.asic_type)?,
            registers: RegisterSet::new(),
            initial_registers: RegisterSet::new(),
            frontend: frontend.clone(),
            frontend_initial: frontend,
            settings: configuration.settings,
            calibration: configuration.calibration,
            session: ScanSession::default(),
            head_pos_primary: None,
            head_pos_secondary: None,
            custom_gamma: [None, None, None],
            calibrated_exposure: None,
            shading_data: Vec::new(),
            calibration_cache: calibration::Cache::default(),
            pipeline: pipeline::Stack::new(),
            flag: Flag::new(),
            state: State::Uninitialized,
        })
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn transport_handle(&self) -> std::sync::Arc<dyn Transport> {
        self.transport.clone()
    }

    pub fn command_set(&self) -> &'static dyn CommandSet {
        self.command_set
    }

    /// Cancellation and warning flag shared with callers.
    pub fn flag(&self) -> Flag<Warning> {
        self.flag.clone()
    }

    pub fn state(&self) -> State {
        self.state
    }

    fn expect_state(&self, operation: &'static str, expected: &[State]) -> Result<(), Error> {
        if expected.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn check_cancelled(&self) -> Result<(), Error> {
        if self.flag.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    pub fn find_sensor(&self) -> Result<&'static Sensor, Error> {
        sensor::find_sensor(
            self.model,
            self.settings.xres,
            self.settings.get_channels(),
            self.settings.scan_method,
        )
    }

    /// Replaces the generated gamma curve of `channel` (0 red, 1 green, 2 blue).
    pub fn set_custom_gamma(
        &mut self,
        channel: usize,
        table: Option<Vec<u16>>,
    ) -> Result<(), Error> {
        let slot = self
            .custom_gamma
            .get_mut(channel)
            .ok_or(Error::InvalidChannel(channel))?;
        *slot = table;
        Ok(())
    }

    pub fn init(&mut self) -> Result<(), Error> {
        self.expect_state("init", &[State::Uninitialized, State::Idle])?;
        let _span = tracing::debug_span!("init", model = self.model.name).entered();
        self.command_set.init(self)?;
        self.state = State::Idle;
        Ok(())
    }

    /// Coarse calibration (lamp, offset, gain) followed by shading.
    pub fn calibrate(&mut self) -> Result<(), Error> {
        self.expect_state("calibrate", &[State::Idle])?;
        let _span = tracing::debug_span!("calibrate").entered();
        self.check_cancelled()?;
        let command_set = self.command_set;
        let sensor = self.find_sensor()?;
        let session = command_set.calculate_scan_session(self, sensor, &self.settings)?;
        let setup = calibration::CurrentSetup::from_session(
            &session,
            sensor.exposure_lperiod.max(0) as u32,
        );
        let cached = if self.calibration.skip_coarse_if_cached {
            self.calibration_cache.find(&setup).cloned()
        } else {
            None
        };
        match cached {
            Some(entry) => {
                tracing::debug!(?setup, "reusing cached coarse calibration");
                self.frontend = entry.frontend;
                self.calibrated_exposure = Some(entry.exposure);
                command_set.set_fe(self, sensor, FrontendAction::Set)?;
            }
            None => {
                let mut registers = self.registers.clone();
                let exposure = command_set.led_calibration(self, sensor, &mut registers)?;
                self.calibrated_exposure = Some(exposure);
                if self.model.flags.contains(ModelFlags::OFFSET_CALIBRATION) {
                    command_set.offset_calibration(self, sensor, &mut registers)?;
                }
                command_set.coarse_gain_calibration(
                    self,
                    sensor,
                    &mut registers,
                    sensor.optical_res,
                )?;
                self.calibration_cache.insert(calibration::CacheEntry {
                    setup,
                    frontend: self.frontend.clone(),
                    exposure,
                });
            }
        }
        if self
            .model
            .flags
            .contains(ModelFlags::DISABLE_SHADING_CALIBRATION)
        {
            self.shading_data.clear();
        } else {
            self.shading_calibration(sensor)?;
        }
        command_set.move_back_home(self, true)
    }

    fn shading_calibration(&mut self, sensor: &'static Sensor) -> Result<(), Error> {
        let command_set = self.command_set;
        let mut registers = self.registers.clone();
        let session = command_set.init_regs_for_shading(self, sensor, &mut registers)?;
        let pixels = session.params.get_requested_pixels() as usize;
        let lines = session.params.lines;
        let format = genesys_types::PixelFormat::Rgb161616;
        let dark_sums = if self.model.flags.contains(ModelFlags::DARK_CALIBRATION) {
            let mut params = session.params.clone();
            params.flags |= ScanFlags::DISABLE_LAMP;
            let dark_session = session::compute_session(self.model, sensor, params)?;
            let data = self.scan_lines(sensor, &dark_session)?;
            calibration::sum_lines(&data, format, pixels, lines as usize)?
        } else {
            vec![0; pixels * 3]
        };
        let dark = calibration::compute_dark(&dark_sums, lines, 3, &self.calibration.offset_tweak);
        let data = self.scan_lines(sensor, &session)?;
        let white_sums = calibration::sum_lines(&data, format, pixels, lines as usize)?;
        self.shading_data =
            calibration::build_shading_data(&dark, &white_sums, lines, 3, &self.calibration);
        tracing::debug!(pixels, lines, bytes = self.shading_data.len(), "shading computed");
        Ok(())
    }

    /// Runs a complete scan of `session` and returns its pixels.
    fn scan_lines(&mut self, sensor: &'static Sensor, session: &ScanSession) -> Result<Vec<u8>, Error> {
        self.check_cancelled()?;
        let command_set = self.command_set;
        let moves = !self.model.flags.contains(ModelFlags::SHADING_NO_MOVE);
        let mut registers = self.registers.clone();
        command_set.init_regs_for_scan_session(self, sensor, &mut registers, session)?;
        self.transport.write_registers(&registers)?;
        command_set.begin_scan(self, sensor, &mut registers, moves)?;
        let mut stack = pipeline::build_image_pipeline(self.model, session, self.transport.clone())?;
        let data = stack.get_all_data()?;
        command_set.end_scan(self, &mut registers, true)?;
        if moves {
            command_set.move_back_home(self, true)?;
        }
        Ok(data)
    }

    pub fn start_scan(&mut self) -> Result<(), Error> {
        self.expect_state("start_scan", &[State::Idle])?;
        let _span = tracing::debug_span!("start_scan").entered();
        self.check_cancelled()?;
        let command_set = self.command_set;
        let sensor = self.find_sensor()?;
        let mut registers = self.registers.clone();
        command_set.init_regs_for_scan(self, sensor, &mut registers)?;
        self.transport.write_registers(&registers)?;
        self.registers = registers.clone();
        if !self.shading_data.is_empty() {
            let data = self.shading_data.clone();
            command_set.send_shading_data(self, sensor, &data)?;
        }
        command_set.send_gamma_table(self, sensor)?;
        command_set.begin_scan(self, sensor, &mut registers, true)?;
        self.registers = registers;
        self.pipeline =
            pipeline::build_image_pipeline(self.model, &self.session, self.transport.clone())?;
        self.state = State::Scanning;
        Ok(())
    }

    pub fn output_width(&self) -> Result<usize, Error> {
        self.pipeline.output_width()
    }

    pub fn output_height(&self) -> Result<usize, Error> {
        self.pipeline.output_height()
    }

    pub fn output_format(&self) -> Result<genesys_types::PixelFormat, Error> {
        self.pipeline.output_format()
    }

    pub fn output_row_bytes(&self) -> Result<usize, Error> {
        self.pipeline.output_row_bytes()
    }

    pub fn eof(&self) -> bool {
        self.pipeline.eof()
    }

    pub fn read_row(&mut self, out: &mut [u8]) -> Result<(), Error> {
        self.expect_state("read_row", &[State::Scanning])?;
        self.check_cancelled()?;
        self.pipeline.get_next_row_data(out)
    }

    /// Reads every remaining row of the scan.
    pub fn read_image(&mut self) -> Result<Image, Error> {
        self.expect_state("read_image", &[State::Scanning])?;
        let width = self.pipeline.output_width()?;
        let height = self.pipeline.output_height()?;
        let format = self.pipeline.output_format()?;
        let row_bytes = self.pipeline.output_row_bytes()?;
        let mut data = vec![0u8; row_bytes * height];
        for row in data.chunks_exact_mut(row_bytes.max(1)) {
            self.check_cancelled()?;
            self.pipeline.get_next_row_data(row)?;
        }
        Ok(Image::from_data(width, height, format, data)?)
    }

    /// Stops the scan and parks the head.
    pub fn end_scan(&mut self) -> Result<(), Error> {
        self.expect_state("end_scan", &[State::Scanning])?;
        let _span = tracing::debug_span!("end_scan").entered();
        let command_set = self.command_set;
        let mut registers = self.registers.clone();
        command_set.end_scan(self, &mut registers, true)?;
        self.registers = registers;
        self.pipeline.clear();
        self.state = State::Idle;
        command_set.move_back_home(self, true)
    }
}
