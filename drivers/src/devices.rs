use crate::configuration::Configuration;
use crate::device::Device;
use crate::error::Error;
use crate::properties::Model;
use crate::usb;
use rusb::UsbContext;

macro_rules! register {
    ($($module:ident),+) => {
        paste::paste! {
            $(
                pub mod $module;
            )+

            #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
            pub enum Type {
                $(
                    [<$module:camel>],
                )+
            }

            impl std::fmt::Display for Type {
                fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    match self {
                        $(
                            Self::[<$module:camel>] => write!(formatter, stringify!($module)),
                        )+
                    }
                }
            }

            impl Type {
                pub fn name(self) -> &'static str  {
                    match self {
                        $(
                            Type::[<$module:camel>] => $module::MODEL.name,
                        )+
                    }
                }

                pub fn model(self) -> &'static Model {
                    match self {
                        $(
                            Type::[<$module:camel>] => &$module::MODEL,
                        )+
                    }
                }

                pub fn vendor_and_product_id(self) -> (u16, u16) {
                    match self {
                        $(
                            Type::[<$module:camel>] => ($module::VENDOR_ID, $module::PRODUCT_ID),
                        )+
                    }
                }
            }

            pub struct ListedDevice {
                pub device_type: Type,
                pub speed: usb::Speed,
                pub serial: String,
            }

            pub fn list_devices() -> rusb::Result<Vec<ListedDevice>> {
                let context = rusb::Context::new()?;
                let devices = context.devices()?;
                let mut result = Vec::new();
                $(
                    result.extend(
                        usb::list_serials_and_speeds(&devices, $module::VENDOR_ID, $module::PRODUCT_ID)?
                            .into_iter()
                            .map(|(serial, speed)| ListedDevice {
                                device_type: Type::[<$module:camel>],
                                speed,
                                serial,
                            }),
                    );
                )+
                Ok(result)
            }

            /// Opens the first known scanner, or the one with the given serial.
            ///
            /// The returned device is not initialised, call [`Device::init`].
            pub fn open(
                serial: Option<&str>,
                configuration: Configuration,
            ) -> Result<Device, Error>
            {
                let context = rusb::Context::new()?;
                $(
                    match usb::Interface::open(
                        &context,
                        $module::VENDOR_ID,
                        $module::PRODUCT_ID,
                        serial,
                        configuration.usb.clone(),
                    ) {
                        Ok(interface) => {
                            tracing::debug!(
                                device_type = %Type::[<$module:camel>],
                                serial = interface.serial(),
                                speed = %interface.speed(),
                                "found scanner"
                            );
                            return Device::new(
                                &$module::MODEL,
                                std::sync::Arc::new(interface),
                                configuration,
                            );
                        }
                        Err(usb::Error::Serial(_)) | Err(usb::Error::Device) => (),
                        Err(error) => return Err(error.into()),
                    }
                )+
                Err(match serial {
                    Some(serial) => usb::Error::Serial(serial.to_owned()),
                    None => usb::Error::Device,
                }
                .into())
            }

            #[derive(Debug, PartialEq, Eq)]
            pub struct ParseTypeError {
                on: String
            }

            impl std::fmt::Display for ParseTypeError {
                fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    write!(formatter, "unknown device type \"{}\"", self.on)
                }
            }

            impl std::str::FromStr for Type {
                type Err = ParseTypeError;

                fn from_str(string: &str) -> Result<Self, Self::Err> {
                    match string {
                        $(
                            stringify!($module) => Ok(Self::[<$module:camel>]),
                        )+
                        _ => Err(Self::Err {on: string.to_owned()}),
                    }
                }
            }
        }
    };
}

register! { canon_lide_90, plustek_opticfilm_7200 }
