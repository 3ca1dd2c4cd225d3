use crate::properties;
use crate::settings;
use crate::usb;
use genesys_types::ColorOrder;
use genesys_types::PixelFormat;

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error(transparent)]
    Usb(#[from] usb::Error),

    #[error(transparent)]
    Format(#[from] genesys_types::Error),

    #[error("register 0x{0:02x} not found")]
    RegisterNotFound(u16),

    #[error("register setting 0x{0:02x} not found")]
    RegisterSettingNotFound(u16),

    #[error("register address 0x{0:04x} is out of range")]
    InvalidAddress(u16),

    #[error("array is too small ({length} bytes given, {required} bytes required)")]
    ArrayTooSmall { length: usize, required: usize },

    #[error("height {height} is not a multiple of the interleaved line count {interleaved_lines}")]
    InterleaveMismatch {
        height: usize,
        interleaved_lines: usize,
    },

    #[error("segment {segment} reads past the end of the interleaved buffer")]
    SegmentOutOfRange { segment: usize },

    #[error("cannot merge mono lines with format {format:?} into color order {order:?}")]
    UnsupportedMergeFormat {
        format: PixelFormat,
        order: ColorOrder,
    },

    #[error("cannot split mono lines from format {0:?}")]
    UnsupportedSplitFormat(PixelFormat),

    #[error("cannot shift color components of format {0:?}")]
    UnsupportedShiftFormat(PixelFormat),

    #[error("unsupported number of pixel shifts {count} (1 to {maximum} supported)")]
    UnsupportedShiftCount { count: usize, maximum: usize },

    #[error("the image pipeline is empty")]
    EmptyPipeline,

    #[error("the image pipeline already has a source")]
    PipelineNotEmpty,

    #[error("the scan session has not been computed")]
    SessionNotComputed,

    #[error("setup parameter \"{0}\" is not set")]
    IncompleteParameters(&'static str),

    #[error("unsupported depth {0}")]
    UnsupportedDepth(u32),

    #[error("output resolution {resolution} is higher than the optical resolution {optical}")]
    ResolutionTooHigh { resolution: u32, optical: u32 },

    #[error("the sensor exposure is not defined")]
    ExposureNotDefined,

    #[error("unsupported frontend type {0}")]
    UnsupportedFrontend(u8),

    #[error("invalid frontend layout")]
    InvalidFrontendLayout,

    #[error("no sensor for {resolution} dpi, {channels} channels and method {method:?}")]
    SensorNotFound {
        resolution: u32,
        channels: u32,
        method: settings::ScanMethod,
    },

    #[error("no motor profile for {resolution} dpi and exposure {exposure}")]
    MotorProfileNotFound { resolution: u32, exposure: u32 },

    #[error("slope table has {size} entries ({maximum} allowed)")]
    SlopeTableTooLarge { size: usize, maximum: usize },

    #[error("slope table {0} does not exist")]
    InvalidSlopeTable(usize),

    #[error("the {0:?} ASIC is not supported")]
    UnsupportedAsic(properties::AsicType),

    #[error("no transparency lamp settings for this scanner")]
    MissingXpaSettings,

    #[error("the scan head position is not known")]
    HeadPositionUnknown,

    #[error("cannot move the scan head {steps} steps back from position {position}")]
    HeadBehindHome { position: u32, steps: u32 },

    #[error("the motor did not stop")]
    MotorStopTimeout,

    #[error("timeout while waiting for the scan head to go home")]
    HomeTimeout,

    #[error("channel {0} does not exist (0 to 2 supported)")]
    InvalidChannel(usize),

    #[error("the operation was cancelled")]
    Cancelled,

    #[error("{operation} is not allowed in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: crate::device::State,
    },
}

impl From<rusb::Error> for Error {
    fn from(error: rusb::Error) -> Self {
        usb::Error::from(error).into()
    }
}

/// Non-fatal conditions collected during calibration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    CalibrationLimit {
        kind: crate::calibration::Kind,
        channel: usize,
        value: u32,
    },
    ShadingWindowClamped {
        offset: usize,
        length: usize,
        available: usize,
    },
}
