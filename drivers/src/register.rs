use crate::error::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Register {
    pub address: u16,
    pub value: u8,
}

/// Lookup and iteration discipline, fixed when the set is created.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Order {
    /// Ascending addresses, binary search.
    Sorted,
    /// Insertion order, linear search.
    Sequential,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum MotorMode {
    #[default]
    Primary,
    PrimaryAndSecondary,
    Secondary,
}

/// Host-side view of what the registers switch on once written.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct State {
    pub is_lamp_on: bool,
    pub is_xpa_on: bool,
    pub is_motor_on: bool,
    pub motor_mode: MotorMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSet {
    order: Order,
    registers: Vec<Register>,
    pub state: State,
}

impl Default for RegisterSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterSet {
    pub fn new() -> Self {
        Self::with_order(Order::Sorted)
    }

    pub fn with_order(order: Order) -> Self {
        Self {
            order,
            registers: Vec::new(),
            state: State::default(),
        }
    }

    pub fn order(&self) -> Order {
        self.order
    }

    fn position(&self, address: u16) -> Option<usize> {
        match self.order {
            Order::Sorted => self
                .registers
                .binary_search_by_key(&address, |register| register.address)
                .ok(),
            Order::Sequential => self
                .registers
                .iter()
                .position(|register| register.address == address),
        }
    }

    fn offset_address(address: u16, offset: u16) -> Result<u16, Error> {
        address
            .checked_add(offset)
            .ok_or(Error::InvalidAddress(address))
    }

    fn position_or_error(&self, address: u16) -> Result<usize, Error> {
        self.position(address)
            .ok_or(Error::RegisterNotFound(address))
    }

    pub fn init_reg(&mut self, address: u16, value: u8) {
        match self.order {
            Order::Sorted => match self
                .registers
                .binary_search_by_key(&address, |register| register.address)
            {
                Ok(index) => self.registers[index].value = value,
                Err(index) => self.registers.insert(index, Register { address, value }),
            },
            Order::Sequential => match self.position(address) {
                Some(index) => self.registers[index].value = value,
                None => self.registers.push(Register { address, value }),
            },
        }
    }

    pub fn has_reg(&self, address: u16) -> bool {
        self.position(address).is_some()
    }

    pub fn remove_reg(&mut self, address: u16) -> Result<(), Error> {
        let index = self.position_or_error(address)?;
        self.registers.remove(index);
        Ok(())
    }

    pub fn find_reg(&self, address: u16) -> Result<&Register, Error> {
        let index = self.position_or_error(address)?;
        Ok(&self.registers[index])
    }

    pub fn find_reg_mut(&mut self, address: u16) -> Result<&mut Register, Error> {
        let index = self.position_or_error(address)?;
        Ok(&mut self.registers[index])
    }

    pub fn get8(&self, address: u16) -> Result<u8, Error> {
        Ok(self.find_reg(address)?.value)
    }

    pub fn set8(&mut self, address: u16, value: u8) -> Result<(), Error> {
        self.find_reg_mut(address)?.value = value;
        Ok(())
    }

    /// Read-modify-write of the bits selected by `mask`.
    ///
    /// `value` is not shifted: callers pass it already aligned with `mask`.
    pub fn set8_mask(&mut self, address: u16, value: u8, mask: u8) -> Result<(), Error> {
        let register = self.find_reg_mut(address)?;
        register.value = (register.value & !mask) | (value & mask);
        Ok(())
    }

    pub fn get16(&self, address: u16) -> Result<u16, Error> {
        let high = self.get8(address)?;
        let low = self.get8(Self::offset_address(address, 1)?)?;
        Ok(u16::from_be_bytes([high, low]))
    }

    pub fn set16(&mut self, address: u16, value: u16) -> Result<(), Error> {
        let high = self.position_or_error(address)?;
        let low = self.position_or_error(Self::offset_address(address, 1)?)?;
        let [high_value, low_value] = value.to_be_bytes();
        self.registers[high].value = high_value;
        self.registers[low].value = low_value;
        Ok(())
    }

    pub fn get24(&self, address: u16) -> Result<u32, Error> {
        let high = self.get8(address)?;
        let middle = self.get8(Self::offset_address(address, 1)?)?;
        let low = self.get8(Self::offset_address(address, 2)?)?;
        Ok(u32::from_be_bytes([0, high, middle, low]))
    }

    /// Writes the lower 24 bits of `value`.
    pub fn set24(&mut self, address: u16, value: u32) -> Result<(), Error> {
        let indices = [
            self.position_or_error(address)?,
            self.position_or_error(Self::offset_address(address, 1)?)?,
            self.position_or_error(Self::offset_address(address, 2)?)?,
        ];
        let bytes = value.to_be_bytes();
        for (index, byte) in indices.into_iter().zip(bytes[1..].iter()) {
            self.registers[index].value = *byte;
        }
        Ok(())
    }

    /// Applies each setting with [`RegisterSet::set8_mask`].
    pub fn apply_settings<'a, Settings>(&mut self, settings: Settings) -> Result<(), Error>
    where
        Settings: IntoIterator<Item = &'a RegisterSetting>,
    {
        for setting in settings {
            self.set8_mask(setting.address, setting.value, setting.mask)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.registers.clear();
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Register> {
        self.registers.iter()
    }
}

impl<'a> IntoIterator for &'a RegisterSet {
    type Item = &'a Register;
    type IntoIter = std::slice::Iter<'a, Register>;

    fn into_iter(self) -> Self::IntoIter {
        self.registers.iter()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RegisterSetting {
    pub address: u16,
    pub value: u8,
    pub mask: u8,
}

impl RegisterSetting {
    pub const fn new(address: u16, value: u8) -> Self {
        Self {
            address,
            value,
            mask: 0xff,
        }
    }

    pub const fn masked(address: u16, value: u8, mask: u8) -> Self {
        Self {
            address,
            value,
            mask,
        }
    }
}

/// Register overrides in insertion order, at most one per address.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegisterSettingSet {
    settings: Vec<RegisterSetting>,
}

impl RegisterSettingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slice(settings: &[RegisterSetting]) -> Self {
        let mut result = Self::new();
        for setting in settings {
            result.set(*setting);
        }
        result
    }

    pub fn has(&self, address: u16) -> bool {
        self.settings
            .iter()
            .any(|setting| setting.address == address)
    }

    pub fn get(&self, address: u16) -> Result<&RegisterSetting, Error> {
        self.settings
            .iter()
            .find(|setting| setting.address == address)
            .ok_or(Error::RegisterSettingNotFound(address))
    }

    pub fn get_value(&self, address: u16) -> Result<u8, Error> {
        Ok(self.get(address)?.value)
    }

    pub fn set_value(&mut self, address: u16, value: u8) -> Result<(), Error> {
        match self
            .settings
            .iter_mut()
            .find(|setting| setting.address == address)
        {
            Some(setting) => {
                setting.value = value;
                Ok(())
            }
            None => Err(Error::RegisterSettingNotFound(address)),
        }
    }

    /// Inserts `setting`, replacing any setting with the same address.
    pub fn set(&mut self, setting: RegisterSetting) {
        match self
            .settings
            .iter_mut()
            .find(|existing| existing.address == setting.address)
        {
            Some(existing) => *existing = setting,
            None => self.settings.push(setting),
        }
    }

    /// Applies every setting of `other` on top of this set.
    pub fn merge<'a, Settings>(&mut self, other: Settings)
    where
        Settings: IntoIterator<Item = &'a RegisterSetting>,
    {
        for setting in other {
            self.set(*setting);
        }
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RegisterSetting> {
        self.settings.iter()
    }
}

impl<'a> IntoIterator for &'a RegisterSettingSet {
    type Item = &'a RegisterSetting;
    type IntoIter = std::slice::Iter<'a, RegisterSetting>;

    fn into_iter(self) -> Self::IntoIter {
        self.settings.iter()
    }
}

impl FromIterator<RegisterSetting> for RegisterSettingSet {
    fn from_iter<Iter: IntoIterator<Item = RegisterSetting>>(iter: Iter) -> Self {
        let mut result = Self::new();
        for setting in iter {
            result.set(setting);
        }
        result
    }
}
