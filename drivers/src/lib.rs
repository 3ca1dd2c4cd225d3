pub mod calibration;
pub mod command_set;
pub mod configuration;
pub mod device;
pub mod devices;
pub mod error;
pub mod flag;
pub mod frontend;
pub mod gamma;
pub mod gl842;
pub mod motor;
pub mod pipeline;
pub mod properties;
pub mod register;
pub mod sensor;
pub mod session;
pub mod settings;
pub mod transport;
pub mod usb;

pub use crate::configuration::Configuration;
pub use crate::device::Device;
pub use crate::devices::list_devices;
pub use crate::devices::open;
pub use crate::devices::Type;
pub use crate::error::Error;
pub use crate::error::Warning;
pub use crate::usb::Configuration as UsbConfiguration;

pub use bincode;
pub use genesys_types as types;
pub use libusb1_sys;
pub use rusb;
