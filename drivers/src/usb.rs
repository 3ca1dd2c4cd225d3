use crate::error;
use crate::register::RegisterSet;
use crate::transport::Transport;
use rusb::UsbContext;

pub const REQUEST_TYPE_IN: u8 = libusb1_sys::constants::LIBUSB_ENDPOINT_IN
    | libusb1_sys::constants::LIBUSB_REQUEST_TYPE_VENDOR
    | libusb1_sys::constants::LIBUSB_RECIPIENT_DEVICE;
pub const REQUEST_TYPE_OUT: u8 = libusb1_sys::constants::LIBUSB_ENDPOINT_OUT
    | libusb1_sys::constants::LIBUSB_REQUEST_TYPE_VENDOR
    | libusb1_sys::constants::LIBUSB_RECIPIENT_DEVICE;

pub const REQUEST_REGISTER: u8 = 0x0c;
pub const REQUEST_BUFFER: u8 = 0x04;

pub const VALUE_BUFFER: u16 = 0x82;
pub const VALUE_SET_REGISTER: u16 = 0x83;
pub const VALUE_READ_REGISTER: u16 = 0x84;
pub const VALUE_WRITE_REGISTER: u16 = 0x85;
pub const VALUE_BUF_ENDACCESS: u16 = 0x8c;
pub const VALUE_GET_REGISTER: u16 = 0x8e;
pub const INDEX: u16 = 0x00;

pub const BULK_IN: u8 = 0x00;
pub const BULK_OUT: u8 = 0x01;
pub const BULK_RAM: u8 = 0x00;
pub const BULK_REGISTER: u8 = 0x11;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Configuration {
    pub timeout: std::time::Duration,
    pub bulk_in_endpoint: u8,
    pub bulk_out_endpoint: u8,
    pub maximum_transfer_size: usize,
    pub bulk_register_writes: bool,
}

pub const DEFAULT_CONFIGURATION: Configuration = Configuration {
    timeout: std::time::Duration::from_secs(5),
    bulk_in_endpoint: 0x81,
    bulk_out_endpoint: 0x02,
    maximum_transfer_size: 0xeff0,
    bulk_register_writes: false,
};

impl Default for Configuration {
    fn default() -> Self {
        DEFAULT_CONFIGURATION
    }
}

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error(transparent)]
    Rusb(#[from] rusb::Error),

    #[error("device with serial not found")]
    Serial(String),

    #[error("device not found")]
    Device,

    #[error("short transfer ({requested} bytes requested, {transferred} bytes transferred)")]
    ShortTransfer {
        requested: usize,
        transferred: usize,
    },

    #[error("the device is already used by another program")]
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Speed {
    Unknown,
    Low,
    Full,
    High,
    Super,
    SuperPlus,
}

impl From<rusb::Speed> for Speed {
    fn from(speed: rusb::Speed) -> Self {
        match speed {
            rusb::Speed::Low => Self::Low,
            rusb::Speed::Full => Self::Full,
            rusb::Speed::High => Self::High,
            rusb::Speed::Super => Self::Super,
            rusb::Speed::SuperPlus => Self::SuperPlus,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for Speed {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(match self {
            Self::Unknown => "USB Unknown speed",
            Self::Low => "USB 1.0 Low Speed (1.5 Mb/s)",
            Self::Full => "USB 1.1 Full Speed (12 Mb/s)",
            Self::High => "USB 2.0 High Speed (480 Mb/s)",
            Self::Super => "USB 3.0 SuperSpeed (5.0 Gb/s)",
            Self::SuperPlus => "USB 3.1 SuperSpeed+ (10.0 Gb/s)",
        })
    }
}

fn read_serial(handle: &rusb::DeviceHandle<rusb::Context>) -> rusb::Result<String> {
    let device = handle.device();
    let descriptor = device.device_descriptor()?;
    match descriptor.serial_number_string_index() {
        Some(_) => handle.read_serial_number_string_ascii(&descriptor),
        // most scanners have no serial number
        None => Ok(format!(
            "{:03}:{:03}",
            device.bus_number(),
            device.address()
        )),
    }
}

fn matches(device: &rusb::Device<rusb::Context>, vendor_id: u16, product_id: u16) -> bool {
    match device.device_descriptor() {
        Ok(descriptor) => {
            descriptor.vendor_id() == vendor_id && descriptor.product_id() == product_id
        }
        Err(_) => false,
    }
}

pub fn list_serials_and_speeds(
    devices: &rusb::DeviceList<rusb::Context>,
    vendor_id: u16,
    product_id: u16,
) -> rusb::Result<Vec<(String, Speed)>> {
    let mut result = Vec::new();
    for device in devices
        .iter()
        .filter(|device| matches(device, vendor_id, product_id))
    {
        result.push((read_serial(&device.open()?)?, device.speed().into()));
    }
    Ok(result)
}

pub fn handle_from_serial(
    context: &rusb::Context,
    vendor_id: u16,
    product_id: u16,
    serial: Option<&str>,
) -> Result<(rusb::DeviceHandle<rusb::Context>, String), Error> {
    match context.devices()?.iter().find_map(
        |device| -> Option<rusb::Result<(rusb::DeviceHandle<rusb::Context>, String)>> {
            if !matches(&device, vendor_id, product_id) {
                return None;
            }
            let handle = match device.open() {
                Ok(handle) => handle,
                Err(error) => return Some(Err(error)),
            };
            let device_serial = match read_serial(&handle) {
                Ok(serial) => serial,
                Err(error) => return Some(Err(error)),
            };
            match serial {
                Some(serial) if serial != device_serial => None,
                _ => Some(Ok((handle, device_serial))),
            }
        },
    ) {
        Some(result) => Ok(result?),
        None => Err(match serial {
            Some(serial) => Error::Serial(serial.to_owned()),
            None => Error::Device,
        }),
    }
}

/// USB transport for GL84x ASICs.
pub struct Interface {
    handle: rusb::DeviceHandle<rusb::Context>,
    configuration: Configuration,
    serial: String,
}

impl Interface {
    pub fn open(
        context: &rusb::Context,
        vendor_id: u16,
        product_id: u16,
        serial: Option<&str>,
        configuration: Configuration,
    ) -> Result<Self, Error> {
        let (mut handle, serial) = handle_from_serial(context, vendor_id, product_id, serial)?;
        match handle.claim_interface(0) {
            Ok(()) => (),
            Err(rusb::Error::Busy) => return Err(Error::Busy),
            Err(error) => return Err(error.into()),
        }
        tracing::debug!(serial, "opened scanner");
        Ok(Self {
            handle,
            configuration,
            serial,
        })
    }

    pub fn serial(&self) -> String {
        self.serial.clone()
    }

    pub fn speed(&self) -> Speed {
        self.handle.device().speed().into()
    }

    fn control_out(&self, request: u8, value: u16, index: u16, data: &[u8]) -> Result<(), Error> {
        let written = self.handle.write_control(
            REQUEST_TYPE_OUT,
            request,
            value,
            index,
            data,
            self.configuration.timeout,
        )?;
        if written != data.len() {
            return Err(Error::ShortTransfer {
                requested: data.len(),
                transferred: written,
            });
        }
        Ok(())
    }

    fn control_in(&self, request: u8, value: u16, index: u16, data: &mut [u8]) -> Result<(), Error> {
        let read = self.handle.read_control(
            REQUEST_TYPE_IN,
            request,
            value,
            index,
            data,
            self.configuration.timeout,
        )?;
        if read != data.len() {
            return Err(Error::ShortTransfer {
                requested: data.len(),
                transferred: read,
            });
        }
        Ok(())
    }

    fn send_bulk_header(&self, direction: u8, size: usize) -> Result<(), Error> {
        let size = (size as u32).to_le_bytes();
        self.control_out(
            REQUEST_BUFFER,
            VALUE_BUFFER,
            INDEX,
            &[
                direction, BULK_RAM, 0x82, 0x00, size[0], size[1], size[2], size[3],
            ],
        )
    }

    fn bulk_write_data(&self, address: u8, data: &[u8]) -> Result<(), Error> {
        self.control_out(REQUEST_REGISTER, VALUE_SET_REGISTER, INDEX, &[address])?;
        for chunk in data.chunks(self.configuration.maximum_transfer_size.max(1)) {
            self.send_bulk_header(BULK_OUT, chunk.len())?;
            let written = self.handle.write_bulk(
                self.configuration.bulk_out_endpoint,
                chunk,
                self.configuration.timeout,
            )?;
            if written != chunk.len() {
                return Err(Error::ShortTransfer {
                    requested: chunk.len(),
                    transferred: written,
                });
            }
        }
        Ok(())
    }

    fn check_address(address: u16) -> Result<u8, error::Error> {
        u8::try_from(address).map_err(|_| error::Error::InvalidAddress(address))
    }
}

impl Transport for Interface {
    fn write_register(&self, address: u16, value: u8) -> Result<(), error::Error> {
        let address = Self::check_address(address)?;
        tracing::trace!(address, value, "write register");
        self.control_out(REQUEST_REGISTER, VALUE_SET_REGISTER, INDEX, &[address])?;
        self.control_out(REQUEST_REGISTER, VALUE_WRITE_REGISTER, INDEX, &[value])?;
        Ok(())
    }

    fn read_register(&self, address: u16) -> Result<u8, error::Error> {
        let address = Self::check_address(address)?;
        self.control_out(REQUEST_REGISTER, VALUE_SET_REGISTER, INDEX, &[address])?;
        let mut value = [0u8; 1];
        self.control_in(REQUEST_REGISTER, VALUE_READ_REGISTER, INDEX, &mut value)?;
        tracing::trace!(address, value = value[0], "read register");
        Ok(value[0])
    }

    fn write_registers(&self, registers: &RegisterSet) -> Result<(), error::Error> {
        if !self.configuration.bulk_register_writes {
            for register in registers {
                self.write_register(register.address, register.value)?;
            }
            return Ok(());
        }
        let mut data = Vec::with_capacity(registers.len() * 2);
        for register in registers {
            data.push(Self::check_address(register.address)?);
            data.push(register.value);
        }
        let size = (data.len() as u32).to_le_bytes();
        self.control_out(
            REQUEST_BUFFER,
            VALUE_SET_REGISTER,
            INDEX,
            &[
                BULK_OUT,
                BULK_REGISTER,
                0x00,
                0x00,
                size[0],
                size[1],
                size[2],
                size[3],
            ],
        )?;
        let written = self.handle.write_bulk(
            self.configuration.bulk_out_endpoint,
            &data,
            self.configuration.timeout,
        )?;
        if written != data.len() {
            return Err(Error::ShortTransfer {
                requested: data.len(),
                transferred: written,
            }
            .into());
        }
        Ok(())
    }

    fn write_buffer(&self, opcode: u8, address: u32, data: &[u8]) -> Result<(), error::Error> {
        self.write_register(0x2b, ((address >> 4) & 0xff) as u8)?;
        self.write_register(0x2a, ((address >> 12) & 0xff) as u8)?;
        self.bulk_write_data(opcode, data)?;
        Ok(())
    }

    fn write_gamma(&self, opcode: u8, address: u32, data: &[u8]) -> Result<(), error::Error> {
        self.write_register(0x5b, ((address >> 12) & 0xff) as u8)?;
        self.write_register(0x5c, ((address >> 4) & 0xff) as u8)?;
        self.bulk_write_data(opcode, data)?;
        // the RAM address must be reset after a gamma or slope upload
        self.write_register(0x5b, 0)?;
        self.write_register(0x5c, 0)?;
        Ok(())
    }

    fn write_fe_register(&self, address: u8, value: u16) -> Result<(), error::Error> {
        let mut registers = RegisterSet::with_order(crate::register::Order::Sequential);
        registers.init_reg(0x51, address);
        registers.init_reg(0x3a, ((value >> 8) & 0xff) as u8);
        registers.init_reg(0x3b, (value & 0xff) as u8);
        self.write_registers(&registers)
    }

    fn bulk_read_data(&self, address: u8, data: &mut [u8]) -> Result<(), error::Error> {
        self.control_out(REQUEST_REGISTER, VALUE_SET_REGISTER, INDEX, &[address])?;
        self.send_bulk_header(BULK_IN, data.len())?;
        let maximum = self.configuration.maximum_transfer_size.max(1);
        for chunk in data.chunks_mut(maximum) {
            let read = self.handle.read_bulk(
                self.configuration.bulk_in_endpoint,
                chunk,
                self.configuration.timeout,
            )?;
            if read != chunk.len() {
                return Err(Error::ShortTransfer {
                    requested: chunk.len(),
                    transferred: read,
                }
                .into());
            }
        }
        Ok(())
    }

    fn write_0x8c(&self, index: u8, value: u8) -> Result<(), error::Error> {
        self.control_out(REQUEST_REGISTER, VALUE_BUF_ENDACCESS, index as u16, &[value])?;
        Ok(())
    }

    fn sleep_ms(&self, milliseconds: u64) {
        std::thread::sleep(std::time::Duration::from_millis(milliseconds));
    }
}
