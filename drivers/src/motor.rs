use crate::error::Error;
use crate::properties::AsicType;
use crate::settings::ScanMethod;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum StepType {
    Full,
    Half,
    Quarter,
    Eighth,
}

impl StepType {
    /// Binary logarithm of the microsteps per full step.
    pub fn shift(self) -> u32 {
        match self {
            StepType::Full => 0,
            StepType::Half => 1,
            StepType::Quarter => 2,
            StepType::Eighth => 3,
        }
    }
}

/// Acceleration curve from `initial_speed_w` to `max_speed_w`.
///
/// Speeds are step durations in pixel-time units, a lower value is faster.
/// The curve reaches `max_speed_w` after `minimum_steps` steps, `g` bends it
/// (1.0 is linear).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MotorSlope {
    pub initial_speed_w: u32,
    pub max_speed_w: u32,
    pub minimum_steps: u32,
    pub g: f32,
}

impl MotorSlope {
    pub const fn new(initial_speed_w: u32, max_speed_w: u32, minimum_steps: u32) -> Self {
        Self {
            initial_speed_w,
            max_speed_w,
            minimum_steps,
            g: 1.0,
        }
    }

    pub fn get_table_step_shifted(&self, step: u32, step_type: StepType) -> u32 {
        if step == 0 || self.initial_speed_w <= self.max_speed_w {
            return self.initial_speed_w >> step_type.shift();
        }
        let progress = if self.minimum_steps <= 1 {
            1.0f64
        } else {
            (step as f64 / (self.minimum_steps - 1) as f64).min(1.0)
        };
        let progress = progress.powf(self.g as f64);
        let speed = self.initial_speed_w as f64 * (1.0 - progress)
            + self.max_speed_w as f64 * progress;
        (speed.round() as u32) >> step_type.shift()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MotorSlopeTable {
    pub table: Vec<u16>,
    /// Sum of every step duration.
    pub pixeltime_sum: u64,
}

impl MotorSlopeTable {
    fn push(&mut self, speed: u32) {
        let speed = speed.min(u16::MAX as u32) as u16;
        self.table.push(speed);
        self.pixeltime_sum += speed as u64;
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Sum of the first `count` step durations.
    pub fn pixeltime_sum_until(&self, count: usize) -> u64 {
        self.table.iter().take(count).map(|speed| *speed as u64).sum()
    }

    /// Little-endian encoding expected by the slope RAM.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.table
            .iter()
            .flat_map(|speed| speed.to_le_bytes())
            .collect()
    }
}

/// Accelerates from the slope start down to `target_speed_w`.
///
/// The table ends with the final speed and is padded with it until its
/// length is a multiple of `steps_alignment` and at least `min_size`.
pub fn create_slope_table_for_speed(
    slope: &MotorSlope,
    target_speed_w: u32,
    step_type: StepType,
    steps_alignment: usize,
    min_size: usize,
    max_size: usize,
) -> Result<MotorSlopeTable, Error> {
    let steps_alignment = steps_alignment.max(1);
    let final_speed = (target_speed_w >> step_type.shift())
        .max(slope.max_speed_w >> step_type.shift());
    let mut table = MotorSlopeTable::default();
    let mut step = 0;
    loop {
        let current = slope.get_table_step_shifted(step, step_type);
        if current <= final_speed {
            break;
        }
        table.push(current);
        if table.len() > max_size {
            return Err(Error::SlopeTableTooLarge {
                size: table.len(),
                maximum: max_size,
            });
        }
        step += 1;
    }
    table.push(final_speed);
    while table.len() + 1 < max_size
        && (table.len() % steps_alignment != 0 || table.len() < min_size)
    {
        table.push(final_speed);
    }
    if table.len() > max_size {
        return Err(Error::SlopeTableTooLarge {
            size: table.len(),
            maximum: max_size,
        });
    }
    Ok(table)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MotorProfile {
    pub slope: MotorSlope,
    pub step_type: StepType,
    pub resolutions: &'static [u32],
    pub methods: &'static [ScanMethod],
    /// Longest exposure the profile supports, zero for no limit.
    pub max_exposure: u32,
}

impl MotorProfile {
    fn matches(&self, resolution: u32, method: ScanMethod) -> bool {
        (self.resolutions.is_empty() || self.resolutions.contains(&resolution))
            && (self.methods.is_empty() || self.methods.contains(&method))
    }
}

#[derive(Debug)]
pub struct Motor {
    pub base_ydpi: u32,
    pub profiles: &'static [MotorProfile],
    pub fast_profiles: &'static [MotorProfile],
}

/// Picks the profile for `resolution` and `method` that fits `exposure`.
///
/// A profile whose limit equals the exposure wins, otherwise the tightest
/// limit above it is used.
pub fn get_motor_profile(
    profiles: &'static [MotorProfile],
    exposure: u32,
    resolution: u32,
    method: ScanMethod,
) -> Result<&'static MotorProfile, Error> {
    let limit = |profile: &MotorProfile| {
        if profile.max_exposure == 0 {
            u32::MAX
        } else {
            profile.max_exposure
        }
    };
    let candidates = profiles
        .iter()
        .filter(|profile| profile.matches(resolution, method));
    if let Some(profile) = candidates
        .clone()
        .find(|profile| profile.max_exposure == exposure)
    {
        return Ok(profile);
    }
    candidates
        .filter(|profile| limit(profile) >= exposure)
        .min_by_key(|profile| limit(profile))
        .ok_or(Error::MotorProfileNotFound {
            resolution,
            exposure,
        })
}

/// Slope table of a scan move at `ydpi`.
pub fn create_slope_table(
    asic_type: AsicType,
    motor: &Motor,
    ydpi: u32,
    exposure: u32,
    step_multiplier: usize,
    profile: &MotorProfile,
) -> Result<MotorSlopeTable, Error> {
    let target_speed_w =
        (exposure as u64 * ydpi as u64 / motor.base_ydpi.max(1) as u64).min(u32::MAX as u64);
    create_slope_table_for_speed(
        &profile.slope,
        target_speed_w as u32,
        profile.step_type,
        step_multiplier,
        2 * step_multiplier,
        asic_type.max_slope_table_size(),
    )
}

/// Slope table that accelerates to the top speed of `profile`.
pub fn create_slope_table_fastest(
    asic_type: AsicType,
    step_multiplier: usize,
    profile: &MotorProfile,
) -> Result<MotorSlopeTable, Error> {
    create_slope_table_for_speed(
        &profile.slope,
        profile.slope.max_speed_w,
        profile.step_type,
        step_multiplier,
        2 * step_multiplier,
        asic_type.max_slope_table_size(),
    )
}

/// Z1 and Z2 phase modifiers of the motor, in pixel-time units.
pub fn calculate_zmod(
    two_table: bool,
    exposure_time: u32,
    slope_table: &MotorSlopeTable,
    acceleration_steps: usize,
    move_steps: u32,
    buffer_acceleration_steps: u32,
) -> (u32, u32) {
    if exposure_time == 0 {
        return (0, 0);
    }
    let exposure_time = exposure_time as u64;
    let sum = slope_table.pixeltime_sum_until(acceleration_steps);
    let z1 = (sum + buffer_acceleration_steps as u64 * exposure_time) % exposure_time;
    let sum = if two_table {
        sum + exposure_time
    } else {
        sum + move_steps as u64 * exposure_time
    };
    let z2 = sum % exposure_time;
    (z1 as u32, z2 as u32)
}
