use crate::frontend;
use crate::motor;
use crate::properties;
use crate::register::RegisterSetting;
use crate::sensor;
use crate::settings::ScanMethod;

pub const VENDOR_ID: u16 = 0x07b3;
pub const PRODUCT_ID: u16 = 0x0807;

const SENSOR_TIMING: &[RegisterSetting] = &[
    RegisterSetting::new(0x16, 0x27),
    RegisterSetting::new(0x17, 0x0c),
    RegisterSetting::new(0x18, 0x00),
    RegisterSetting::new(0x1a, 0x2a),
    RegisterSetting::new(0x1b, 0x00),
    RegisterSetting::new(0x1c, 0x20),
    RegisterSetting::new(0x1d, 0x84),
    RegisterSetting::new(0x52, 0x0a),
    RegisterSetting::new(0x53, 0x0d),
    RegisterSetting::new(0x54, 0x00),
    RegisterSetting::new(0x55, 0x03),
    RegisterSetting::new(0x56, 0x06),
    RegisterSetting::new(0x57, 0x08),
    RegisterSetting::new(0x58, 0x5b),
    RegisterSetting::new(0x59, 0x00),
    RegisterSetting::new(0x5a, 0x40),
    RegisterSetting::new(0x70, 0x00),
    RegisterSetting::new(0x71, 0x02),
    RegisterSetting::new(0x72, 0x00),
    RegisterSetting::new(0x73, 0x02),
];

const SENSORS: &[sensor::Sensor] = &[
    sensor::Sensor {
        optical_res: 7200,
        resolutions: &[600, 1200, 1800],
        channels: &[],
        methods: &[],
        register_dpihw: 1200,
        register_dpiset: 0,
        shading_resolution: 1200,
        shading_pixel_offset: 0,
        ccd_size_divisor: 4,
        black_pixels: 88,
        dummy_pixel: 20,
        gain_white_ref: 210,
        exposure: sensor::SensorExposure::new(0x2b00, 0x2600, 0x2400),
        exposure_lperiod: 12000,
        segment_order: &[],
        stagger_y: &[0, 4],
        interleaved_lines: 1,
        gamma: [1.0, 1.0, 1.0],
        custom_regs: SENSOR_TIMING,
        custom_fe_regs: &[],
    },
    sensor::Sensor {
        optical_res: 7200,
        resolutions: &[3600, 7200],
        channels: &[],
        methods: &[],
        register_dpihw: 2400,
        register_dpiset: 0,
        shading_resolution: 7200,
        shading_pixel_offset: 0,
        ccd_size_divisor: 1,
        black_pixels: 88,
        dummy_pixel: 20,
        gain_white_ref: 210,
        exposure: sensor::SensorExposure::new(0x2b00, 0x2600, 0x2400),
        exposure_lperiod: 24000,
        segment_order: &[],
        stagger_y: &[0, 4],
        interleaved_lines: 1,
        gamma: [1.0, 1.0, 1.0],
        custom_regs: SENSOR_TIMING,
        custom_fe_regs: &[],
    },
];

const PROFILES: &[motor::MotorProfile] = &[
    motor::MotorProfile {
        slope: motor::MotorSlope::new(10000, 1800, 160),
        step_type: motor::StepType::Half,
        resolutions: &[],
        methods: &[],
        max_exposure: 16000,
    },
    motor::MotorProfile {
        slope: motor::MotorSlope::new(10000, 1800, 160),
        step_type: motor::StepType::Quarter,
        resolutions: &[],
        methods: &[],
        max_exposure: 0,
    },
];

const FAST_PROFILES: &[motor::MotorProfile] = &[motor::MotorProfile {
    slope: motor::MotorSlope::new(10000, 1500, 160),
    step_type: motor::StepType::Half,
    resolutions: &[],
    methods: &[],
    max_exposure: 0,
}];

pub static MODEL: properties::Model = properties::Model {
    name: "plustek-opticfilm-7200",
    vendor: "Plustek",
    model: "OpticFilm 7200",
    asic_type: properties::AsicType::Gl842,
    flags: properties::ModelFlags::DARK_CALIBRATION
        .union(properties::ModelFlags::WARMUP)
        .union(properties::ModelFlags::CUSTOM_GAMMA)
        .union(properties::ModelFlags::SHADING_NO_MOVE),
    is_cis: false,
    line_mode_color_order: genesys_types::ColorOrder::Bgr,
    default_method: ScanMethod::Transparency,
    methods: &[ScanMethod::Transparency, ScanMethod::TransparencyInfrared],
    x_offset: 0.0,
    y_offset: 0.0,
    x_size: 36.0,
    y_size: 44.0,
    x_offset_ta: 0.5,
    y_offset_ta: 29.0,
    x_size_ta: 36.0,
    y_size_ta: 24.0,
    y_offset_sensor_to_ta: 0.0,
    y_offset_calib_white: 0.0,
    x_size_calib_mm: 36.0,
    ld_shift_r: 0,
    ld_shift_g: 12,
    ld_shift_b: 24,
    post_scan: 0,
    sensors: SENSORS,
    motor: motor::Motor {
        base_ydpi: 3600,
        profiles: PROFILES,
        fast_profiles: FAST_PROFILES,
    },
    frontend: frontend::Descriptor {
        layout: frontend::ANALOG_DEVICES_LAYOUT,
        registers: &[
            RegisterSetting::new(0x00, 0xf8),
            RegisterSetting::new(0x01, 0x80),
            RegisterSetting::new(0x02, 0x0a),
            RegisterSetting::new(0x03, 0x06),
            RegisterSetting::new(0x04, 0x05),
            RegisterSetting::new(0x05, 0x04),
            RegisterSetting::new(0x06, 0x03),
            RegisterSetting::new(0x07, 0x03),
        ],
    },
    gpo: &[
        RegisterSetting::new(0x6c, 0x4c),
        RegisterSetting::new(0x6d, 0x80),
        RegisterSetting::new(0x6e, 0x8c),
        RegisterSetting::new(0x6f, 0x00),
    ],
    init_registers: &[
        RegisterSetting::masked(0x04, 0x02, 0x03),
        RegisterSetting::new(0x05, 0x80),
        RegisterSetting::new(0x0a, 0x00),
        RegisterSetting::new(0x1e, 0x20),
        RegisterSetting::new(0x7e, 0x00),
    ],
    xpa: Some(properties::XpaSettings {
        lamp_on: &[RegisterSetting::masked(0x6c, 0x01, 0x01)],
        lamp_off: &[RegisterSetting::masked(0x6c, 0x00, 0x01)],
        motor: &[RegisterSetting::masked(0x6b, 0x02, 0x02)],
    }),
};
