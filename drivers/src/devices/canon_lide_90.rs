use crate::frontend;
use crate::motor;
use crate::properties;
use crate::register::RegisterSetting;
use crate::sensor;
use crate::settings::ScanMethod;

pub const VENDOR_ID: u16 = 0x04a9;
pub const PRODUCT_ID: u16 = 0x1900;

const SENSOR_TIMING: &[RegisterSetting] = &[
    RegisterSetting::new(0x16, 0x20),
    RegisterSetting::new(0x17, 0x06),
    RegisterSetting::new(0x18, 0x00),
    RegisterSetting::new(0x1a, 0x00),
    RegisterSetting::new(0x1b, 0x00),
    RegisterSetting::new(0x1c, 0x00),
    RegisterSetting::new(0x1d, 0x02),
    RegisterSetting::new(0x52, 0x00),
    RegisterSetting::new(0x53, 0x02),
    RegisterSetting::new(0x54, 0x04),
    RegisterSetting::new(0x55, 0x06),
    RegisterSetting::new(0x56, 0x04),
    RegisterSetting::new(0x57, 0x04),
    RegisterSetting::new(0x58, 0x04),
    RegisterSetting::new(0x59, 0x04),
    RegisterSetting::new(0x5a, 0x1a),
    RegisterSetting::new(0x70, 0x00),
    RegisterSetting::new(0x71, 0x02),
    RegisterSetting::new(0x72, 0x02),
    RegisterSetting::new(0x73, 0x04),
];

const SENSORS: &[sensor::Sensor] = &[
    sensor::Sensor {
        optical_res: 1200,
        resolutions: &[75, 100, 150, 300, 600],
        channels: &[],
        methods: &[],
        register_dpihw: 1200,
        register_dpiset: 0,
        shading_resolution: 600,
        shading_pixel_offset: 0,
        ccd_size_divisor: 2,
        black_pixels: 20,
        dummy_pixel: 253,
        gain_white_ref: 150,
        exposure: sensor::SensorExposure::new(0x0150, 0x0150, 0x0150),
        exposure_lperiod: 2800,
        segment_order: &[],
        stagger_y: &[],
        interleaved_lines: 1,
        gamma: [1.0, 1.0, 1.0],
        custom_regs: SENSOR_TIMING,
        custom_fe_regs: &[],
    },
    sensor::Sensor {
        optical_res: 2400,
        resolutions: &[1200, 2400],
        channels: &[],
        methods: &[],
        register_dpihw: 2400,
        register_dpiset: 0,
        shading_resolution: 2400,
        shading_pixel_offset: 0,
        ccd_size_divisor: 1,
        black_pixels: 20,
        dummy_pixel: 253,
        gain_white_ref: 150,
        exposure: sensor::SensorExposure::new(0x0150, 0x0150, 0x0150),
        exposure_lperiod: 5600,
        segment_order: &[],
        stagger_y: &[],
        interleaved_lines: 1,
        gamma: [1.0, 1.0, 1.0],
        custom_regs: SENSOR_TIMING,
        custom_fe_regs: &[],
    },
];

const PROFILES: &[motor::MotorProfile] = &[motor::MotorProfile {
    slope: motor::MotorSlope::new(8000, 2000, 120),
    step_type: motor::StepType::Full,
    resolutions: &[],
    methods: &[],
    max_exposure: 0,
}];

const FAST_PROFILES: &[motor::MotorProfile] = &[motor::MotorProfile {
    slope: motor::MotorSlope::new(8000, 1600, 120),
    step_type: motor::StepType::Full,
    resolutions: &[],
    methods: &[],
    max_exposure: 0,
}];

pub static MODEL: properties::Model = properties::Model {
    name: "canon-lide-90",
    vendor: "Canon",
    model: "LiDE 90",
    asic_type: properties::AsicType::Gl842,
    flags: properties::ModelFlags::DARK_CALIBRATION
        .union(properties::ModelFlags::OFFSET_CALIBRATION)
        .union(properties::ModelFlags::CUSTOM_GAMMA),
    is_cis: true,
    line_mode_color_order: genesys_types::ColorOrder::Rgb,
    default_method: ScanMethod::Flatbed,
    methods: &[ScanMethod::Flatbed],
    x_offset: 3.5,
    y_offset: 9.0,
    x_size: 216.0,
    y_size: 299.0,
    x_offset_ta: 0.0,
    y_offset_ta: 0.0,
    x_size_ta: 0.0,
    y_size_ta: 0.0,
    y_offset_sensor_to_ta: 0.0,
    y_offset_calib_white: 1.0,
    x_size_calib_mm: 216.0,
    ld_shift_r: 0,
    ld_shift_g: 0,
    ld_shift_b: 0,
    post_scan: 0,
    sensors: SENSORS,
    motor: motor::Motor {
        base_ydpi: 1200,
        profiles: PROFILES,
        fast_profiles: FAST_PROFILES,
    },
    frontend: frontend::Descriptor {
        layout: frontend::WOLFSON_LAYOUT,
        registers: &[
            RegisterSetting::new(0x00, 0x03),
            RegisterSetting::new(0x01, 0x23),
            RegisterSetting::new(0x02, 0x02),
            RegisterSetting::new(0x03, 0x07),
            RegisterSetting::new(0x20, 0x80),
            RegisterSetting::new(0x21, 0x80),
            RegisterSetting::new(0x22, 0x80),
            RegisterSetting::new(0x28, 0x02),
            RegisterSetting::new(0x29, 0x02),
            RegisterSetting::new(0x2a, 0x02),
        ],
    },
    gpo: &[
        RegisterSetting::new(0x6c, 0x02),
        RegisterSetting::new(0x6d, 0x00),
        RegisterSetting::new(0x6e, 0x7e),
        RegisterSetting::new(0x6f, 0x00),
    ],
    init_registers: &[
        RegisterSetting::new(0x03, 0x1f),
        RegisterSetting::masked(0x04, 0x00, 0x03),
        RegisterSetting::new(0x06, 0x18),
        RegisterSetting::new(0x0a, 0x18),
        RegisterSetting::new(0x1e, 0x10),
        RegisterSetting::new(0x1f, 0x01),
    ],
    xpa: None,
};
