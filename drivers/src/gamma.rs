use crate::sensor::Sensor;

pub const GAMMA_TABLE_SIZE: usize = 256;

/// `65535 * (i / size) ^ (1 / gamma)`, saturated at 65535.
pub fn create_gamma_table(size: usize, gamma: f32) -> Vec<u16> {
    let gamma = if gamma > 0.0 { gamma as f64 } else { 1.0 };
    (0..size)
        .map(|index| {
            let value = 65535.0 * (index as f64 / size as f64).powf(1.0 / gamma);
            value.min(65535.0).max(0.0) as u16
        })
        .collect()
}

/// Custom table of `channel` if one is set, sensor default otherwise.
pub fn get_gamma_table(
    sensor: &Sensor,
    custom_gamma: &[Option<Vec<u16>>; 3],
    channel: usize,
    size: usize,
) -> Vec<u16> {
    match &custom_gamma[channel] {
        Some(custom) => (0..size)
            .map(|index| custom.get(index).copied().unwrap_or(u16::MAX))
            .collect(),
        None => create_gamma_table(size, sensor.gamma[channel]),
    }
}

/// Red, green and blue tables back to back, little-endian.
pub fn generate_gamma_buffer(
    sensor: &Sensor,
    custom_gamma: &[Option<Vec<u16>>; 3],
    size: usize,
) -> Vec<u8> {
    let mut buffer = vec![0u8; size * 2 * 3];
    for channel in 0..3 {
        let table = get_gamma_table(sensor, custom_gamma, channel, size);
        let offset = size * 2 * channel;
        for (index, value) in table.iter().enumerate() {
            buffer[offset + index * 2..offset + index * 2 + 2]
                .copy_from_slice(&value.to_le_bytes());
        }
    }
    buffer
}

/// True when at least one channel departs from the identity curve.
pub fn has_effective_gamma(sensor: &Sensor, custom_gamma: &[Option<Vec<u16>>; 3]) -> bool {
    custom_gamma.iter().any(Option::is_some) || sensor.gamma.iter().any(|gamma| *gamma != 1.0)
}
