use crate::error::Error;
use crate::gl842::registers;
use crate::register::Register;
use crate::register::RegisterSet;

/// Blocking access to the scanner ASIC.
///
/// Every method is a complete transfer: a call returns once the device has
/// acknowledged it.
pub trait Transport: Send + Sync {
    fn write_register(&self, address: u16, value: u8) -> Result<(), Error>;

    fn read_register(&self, address: u16) -> Result<u8, Error>;

    /// Writes every register of the set, in iteration order.
    fn write_registers(&self, registers: &RegisterSet) -> Result<(), Error>;

    fn write_buffer(&self, opcode: u8, address: u32, data: &[u8]) -> Result<(), Error>;

    fn write_gamma(&self, opcode: u8, address: u32, data: &[u8]) -> Result<(), Error>;

    fn write_fe_register(&self, address: u8, value: u16) -> Result<(), Error>;

    fn bulk_read_data(&self, address: u8, data: &mut [u8]) -> Result<(), Error>;

    fn write_0x8c(&self, index: u8, value: u8) -> Result<(), Error>;

    fn sleep_ms(&self, milliseconds: u64);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transfer {
    WriteRegister { address: u16, value: u8 },
    ReadRegister { address: u16, value: u8 },
    WriteRegisters(Vec<Register>),
    WriteBuffer { opcode: u8, address: u32, data: Vec<u8> },
    WriteGamma { opcode: u8, address: u32, data: Vec<u8> },
    WriteFeRegister { address: u8, value: u16 },
    BulkRead { address: u8, length: usize },
    Write0x8c { index: u8, value: u8 },
    Sleep(u64),
}

/// Fills `data` with scan bytes, `offset` counts the bytes served so far.
pub type Generator = Box<dyn FnMut(u64, &mut [u8]) + Send>;

struct Inner {
    registers: std::collections::BTreeMap<u16, u8>,
    frontend: std::collections::BTreeMap<u8, u16>,
    transfers: Vec<Transfer>,
    status: u8,
    generator: Generator,
    bytes_read: u64,
}

impl Inner {
    fn store(&mut self, address: u16, value: u8) {
        self.registers.insert(address, value);
        match address {
            registers::REG_0X0F => {
                if value != 0 {
                    let reverse = self
                        .registers
                        .get(&registers::REG_0X02)
                        .map_or(false, |value| (value & registers::REG_0X02_MTRREV) != 0);
                    if reverse {
                        // homing stops on the sensor
                        self.status |= registers::REG_0X41_HOMESNR;
                        self.status &= !registers::REG_0X41_MOTORENB;
                    } else {
                        self.status |= registers::REG_0X41_MOTORENB;
                        self.status &= !registers::REG_0X41_HOMESNR;
                    }
                }
            }
            registers::REG_0X01 => {
                if (value & registers::REG_0X01_SCAN) == 0 {
                    self.status &= !registers::REG_0X41_MOTORENB;
                }
            }
            _ => (),
        }
    }
}

/// In-memory scanner that records every transfer.
///
/// Registers keep the last written value, the status register follows the
/// start and stop actions, and bulk reads are served by a generator.
pub struct Recorder {
    inner: std::sync::Mutex<Inner>,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder {
    pub fn new() -> Self {
        Self::with_generator(Box::new(|_, data| data.fill(0xb0)))
    }

    pub fn with_generator(generator: Generator) -> Self {
        Self {
            inner: std::sync::Mutex::new(Inner {
                registers: std::collections::BTreeMap::new(),
                frontend: std::collections::BTreeMap::new(),
                transfers: Vec::new(),
                status: registers::REG_0X41_HOMESNR | registers::REG_0X41_FEEDFSH,
                generator,
                bytes_read: 0,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("mutex is not poisoned")
    }

    pub fn transfers(&self) -> Vec<Transfer> {
        self.lock().transfers.clone()
    }

    pub fn take_transfers(&self) -> Vec<Transfer> {
        std::mem::take(&mut self.lock().transfers)
    }

    pub fn register(&self, address: u16) -> Option<u8> {
        self.lock().registers.get(&address).copied()
    }

    pub fn fe_register(&self, address: u8) -> Option<u16> {
        self.lock().frontend.get(&address).copied()
    }

    pub fn status(&self) -> u8 {
        self.lock().status
    }

    pub fn set_status(&self, status: u8) {
        self.lock().status = status;
    }

    pub fn set_register(&self, address: u16, value: u8) {
        self.lock().registers.insert(address, value);
    }

    pub fn bytes_read(&self) -> u64 {
        self.lock().bytes_read
    }
}

impl Transport for Recorder {
    fn write_register(&self, address: u16, value: u8) -> Result<(), Error> {
        tracing::trace!(address, value, "write register");
        let mut inner = self.lock();
        inner
            .transfers
            .push(Transfer::WriteRegister { address, value });
        inner.store(address, value);
        Ok(())
    }

    fn read_register(&self, address: u16) -> Result<u8, Error> {
        let mut inner = self.lock();
        let value = if address == registers::REG_0X41 {
            inner.status
        } else {
            inner.registers.get(&address).copied().unwrap_or(0)
        };
        inner
            .transfers
            .push(Transfer::ReadRegister { address, value });
        tracing::trace!(address, value, "read register");
        Ok(value)
    }

    fn write_registers(&self, registers: &RegisterSet) -> Result<(), Error> {
        let mut inner = self.lock();
        inner
            .transfers
            .push(Transfer::WriteRegisters(registers.iter().copied().collect()));
        for register in registers {
            inner.store(register.address, register.value);
        }
        Ok(())
    }

    fn write_buffer(&self, opcode: u8, address: u32, data: &[u8]) -> Result<(), Error> {
        self.lock().transfers.push(Transfer::WriteBuffer {
            opcode,
            address,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn write_gamma(&self, opcode: u8, address: u32, data: &[u8]) -> Result<(), Error> {
        self.lock().transfers.push(Transfer::WriteGamma {
            opcode,
            address,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn write_fe_register(&self, address: u8, value: u16) -> Result<(), Error> {
        let mut inner = self.lock();
        inner
            .transfers
            .push(Transfer::WriteFeRegister { address, value });
        inner.frontend.insert(address, value);
        Ok(())
    }

    fn bulk_read_data(&self, address: u8, data: &mut [u8]) -> Result<(), Error> {
        let mut inner = self.lock();
        inner.transfers.push(Transfer::BulkRead {
            address,
            length: data.len(),
        });
        let offset = inner.bytes_read;
        (inner.generator)(offset, data);
        inner.bytes_read += data.len() as u64;
        Ok(())
    }

    fn write_0x8c(&self, index: u8, value: u8) -> Result<(), Error> {
        self.lock()
            .transfers
            .push(Transfer::Write0x8c { index, value });
        Ok(())
    }

    fn sleep_ms(&self, milliseconds: u64) {
        self.lock().transfers.push(Transfer::Sleep(milliseconds));
    }
}
