use genesys_drivers::register::*;
use genesys_drivers::Error;

#[test]
fn sorted_set_keeps_addresses_ascending() {
    let mut registers = RegisterSet::new();
    for address in [0x30, 0x01, 0x10, 0x05] {
        registers.init_reg(address, address as u8);
    }
    let addresses: Vec<u16> = registers.iter().map(|register| register.address).collect();
    assert_eq!(addresses, vec![0x01, 0x05, 0x10, 0x30]);
}

#[test]
fn sequential_set_keeps_insertion_order() {
    let mut registers = RegisterSet::with_order(Order::Sequential);
    for address in [0x51, 0x3a, 0x3b] {
        registers.init_reg(address, 0);
    }
    registers.init_reg(0x51, 7);
    let addresses: Vec<u16> = registers.iter().map(|register| register.address).collect();
    assert_eq!(addresses, vec![0x51, 0x3a, 0x3b]);
    assert_eq!(registers.get8(0x51).unwrap(), 7);
}

#[test]
fn missing_register_is_an_error() {
    let mut registers = RegisterSet::new();
    registers.init_reg(0x10, 0);
    assert!(matches!(registers.get8(0x11), Err(Error::RegisterNotFound(0x11))));
    assert!(matches!(registers.set8(0x11, 1), Err(Error::RegisterNotFound(0x11))));
    // the low byte is missing, nothing is written
    assert!(registers.set16(0x10, 0xabcd).is_err());
    assert_eq!(registers.get8(0x10).unwrap(), 0);
    registers.remove_reg(0x10).unwrap();
    assert!(registers.is_empty());
    assert!(registers.remove_reg(0x10).is_err());
}

#[test]
fn multi_byte_values_are_big_endian() {
    let mut registers = RegisterSet::new();
    for address in 0x20..0x23 {
        registers.init_reg(address, 0);
    }
    registers.set24(0x20, 0x12_3456).unwrap();
    assert_eq!(registers.get8(0x20).unwrap(), 0x12);
    assert_eq!(registers.get8(0x21).unwrap(), 0x34);
    assert_eq!(registers.get8(0x22).unwrap(), 0x56);
    assert_eq!(registers.get16(0x21).unwrap(), 0x3456);
    registers.set16(0x20, 0xbeef).unwrap();
    assert_eq!(registers.get24(0x20).unwrap(), 0xbeef56);
}

#[test]
fn masked_settings_only_touch_their_bits() {
    let mut registers = RegisterSet::new();
    registers.init_reg(0x04, 0b1010_1010);
    registers
        .apply_settings(&[
            RegisterSetting::masked(0x04, 0b0000_0011, 0b0000_0011),
            RegisterSetting::masked(0x04, 0b0000_0000, 0b1000_0000),
        ])
        .unwrap();
    assert_eq!(registers.get8(0x04).unwrap(), 0b0010_1011);
}

#[test]
fn setting_set_replaces_by_address() {
    let mut settings = RegisterSettingSet::from_slice(&[
        RegisterSetting::new(0x20, 1),
        RegisterSetting::new(0x21, 2),
        RegisterSetting::new(0x20, 3),
    ]);
    assert_eq!(settings.len(), 2);
    assert_eq!(settings.get_value(0x20).unwrap(), 3);
    settings.set_value(0x21, 9).unwrap();
    assert_eq!(settings.get_value(0x21).unwrap(), 9);
    assert!(matches!(
        settings.set_value(0x22, 0),
        Err(Error::RegisterSettingNotFound(0x22))
    ));
    assert!(settings.has(0x21));
    assert!(!settings.has(0x22));
}

#[test]
fn merge_overlays_a_subset() {
    let mut settings = RegisterSettingSet::from_slice(&[
        RegisterSetting::new(0x00, 0x58),
        RegisterSetting::new(0x01, 0x03),
    ]);
    settings.merge(&[RegisterSetting::new(0x01, 0x0f), RegisterSetting::new(0x02, 0x24)]);
    let values: Vec<(u16, u8)> = settings
        .iter()
        .map(|setting| (setting.address, setting.value))
        .collect();
    assert_eq!(values, vec![(0x00, 0x58), (0x01, 0x0f), (0x02, 0x24)]);
}

proptest::proptest! {
    #[test]
    fn set_then_get_16(address in 0u16..0xfe, value: u16) {
        let mut registers = RegisterSet::new();
        registers.init_reg(address, 0);
        registers.init_reg(address + 1, 0);
        registers.set16(address, value).unwrap();
        proptest::prop_assert_eq!(registers.get16(address).unwrap(), value);
    }

    #[test]
    fn set24_keeps_the_low_24_bits(value: u32) {
        let mut registers = RegisterSet::new();
        for address in 0x38..0x3b {
            registers.init_reg(address, 0);
        }
        registers.set24(0x38, value).unwrap();
        proptest::prop_assert_eq!(registers.get24(0x38).unwrap(), value & 0xff_ffff);
    }

    #[test]
    fn sorted_lookups_find_every_register(
        addresses in proptest::collection::btree_set(0u16..0x100, 1..64)
    ) {
        let mut registers = RegisterSet::new();
        for address in addresses.iter().rev() {
            registers.init_reg(*address, (*address & 0xff) as u8);
        }
        proptest::prop_assert_eq!(registers.len(), addresses.len());
        for address in &addresses {
            proptest::prop_assert_eq!(registers.get8(*address).unwrap(), (*address & 0xff) as u8);
        }
    }
}
