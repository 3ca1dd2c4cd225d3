use genesys_drivers::devices::canon_lide_90;
use genesys_drivers::devices::plustek_opticfilm_7200;
use genesys_drivers::gamma;
use genesys_drivers::motor;
use genesys_drivers::properties::AsicType;
use genesys_drivers::sensor::Sensor;
use genesys_drivers::sensor::SensorExposure;
use genesys_drivers::session::*;
use genesys_drivers::settings::ColorFilter;
use genesys_drivers::settings::ScanColorMode;
use genesys_drivers::settings::ScanFlags;
use genesys_drivers::settings::ScanMethod;
use genesys_drivers::Error;

const HALF_SIZE_SENSOR: Sensor = Sensor {
    optical_res: 600,
    resolutions: &[150, 300],
    channels: &[],
    methods: &[],
    register_dpihw: 600,
    register_dpiset: 0,
    shading_resolution: 300,
    shading_pixel_offset: 0,
    ccd_size_divisor: 2,
    black_pixels: 0,
    dummy_pixel: 10,
    gain_white_ref: 0,
    exposure: SensorExposure::new(0x100, 0x100, 0x100),
    exposure_lperiod: 2800,
    segment_order: &[],
    stagger_y: &[],
    interleaved_lines: 1,
    gamma: [1.0, 1.0, 1.0],
    custom_regs: &[],
    custom_fe_regs: &[],
};

fn color_params(resolution: u32, pixels: u32, lines: u32) -> SetupParams {
    SetupParams {
        xres: resolution,
        yres: resolution,
        startx: 0,
        starty: 0,
        pixels: align_pixels(AsicType::Gl842, 3, pixels),
        requested_pixels: pixels,
        lines,
        depth: 8,
        channels: 3,
        scan_method: ScanMethod::Flatbed,
        scan_mode: ScanColorMode::ColorSinglePass,
        color_filter: ColorFilter::None,
        true_gray: false,
        flags: ScanFlags::empty(),
    }
}

#[test]
fn half_size_sensor_reads_at_half_resolution() {
    let session = compute_session(
        &canon_lide_90::MODEL,
        &HALF_SIZE_SENSOR,
        color_params(300, 600, 10),
    )
    .unwrap();
    assert!(session.computed);
    assert_eq!(session.output_resolution, 300);
    assert_eq!(session.ccd_size_divisor, 2);
    assert_eq!(session.optical_resolution, 300);
    assert_eq!(session.full_resolution, 600);
    assert_eq!(session.optical_pixels, 600);
    assert_eq!(session.output_pixels, 600);
    // CIS sensors read each color on its own line
    assert_eq!(session.optical_line_count, 30);
    assert_eq!(session.output_line_bytes, 1800);
    assert_eq!(session.output_line_bytes_raw, 600);
    assert_eq!(session.output_total_bytes_raw, 600 * 30);
    assert_eq!(session.pixel_startx, 10);
    assert_eq!(session.pixel_endx, 610);
    assert_eq!(session.params.get_requested_pixels(), 600);
}

#[test]
fn full_resolution_skips_the_divisor() {
    let mut params = color_params(600, 100, 1);
    params.pixels = 100;
    let session = compute_session(&canon_lide_90::MODEL, &HALF_SIZE_SENSOR, params).unwrap();
    assert_eq!(session.ccd_size_divisor, 1);
    assert_eq!(session.optical_resolution, 600);
    // optical pixels are aligned to twice the divisor
    assert_eq!(session.optical_pixels, 100);
}

#[test]
fn resolution_above_the_sensor_is_rejected() {
    let result = compute_session(
        &canon_lide_90::MODEL,
        &HALF_SIZE_SENSOR,
        color_params(1200, 600, 10),
    );
    assert!(matches!(
        result,
        Err(Error::ResolutionTooHigh {
            resolution: 1200,
            optical: 600
        })
    ));
}

#[test]
fn incomplete_parameters_are_rejected() {
    assert!(matches!(
        compute_session(
            &canon_lide_90::MODEL,
            &HALF_SIZE_SENSOR,
            SetupParams::default()
        ),
        Err(Error::IncompleteParameters("xres"))
    ));
    let mut params = color_params(300, 600, 10);
    params.lines = NOT_SET;
    assert!(matches!(
        compute_session(&canon_lide_90::MODEL, &HALF_SIZE_SENSOR, params),
        Err(Error::IncompleteParameters("lines"))
    ));
    let mut params = color_params(300, 600, 10);
    params.depth = 12;
    assert!(matches!(
        compute_session(&canon_lide_90::MODEL, &HALF_SIZE_SENSOR, params),
        Err(Error::UnsupportedDepth(12))
    ));
    assert!(matches!(
        ScanSession::default().assert_computed(),
        Err(Error::SessionNotComputed)
    ));
}

#[test]
fn pixel_alignment() {
    assert_eq!(align_pixels(AsicType::Gl842, 3, 100), 108);
    assert_eq!(align_pixels(AsicType::Gl842, 1, 33), 64);
    assert_eq!(align_pixels(AsicType::Gl841, 3, 5), 8);
    assert_eq!(align_pixels(AsicType::Gl843, 3, 120), 120);
}

#[test]
fn color_shifts_scale_with_resolution() {
    let model = &plustek_opticfilm_7200::MODEL;
    let mut params = color_params(600, 120, 10);
    params.scan_method = ScanMethod::Transparency;
    let session = compute_session(model, &model.sensors[0], params.clone()).unwrap();
    assert_eq!(session.ccd_size_divisor, 4);
    assert_eq!(session.color_shift_lines_r, 0);
    assert_eq!(session.color_shift_lines_g, 2);
    assert_eq!(session.color_shift_lines_b, 4);
    assert_eq!(session.max_color_shift_lines, 4);
    // the stagger is below one line at this resolution
    assert!(session.stagger_y_shifts.is_empty());
    assert_eq!(session.output_line_count, 14);
    assert_eq!(session.optical_line_count, 14);

    params.flags |= ScanFlags::IGNORE_COLOR_OFFSET;
    let session = compute_session(model, &model.sensors[0], params).unwrap();
    assert_eq!(session.max_color_shift_lines, 0);
    assert_eq!(session.output_line_count, 10);
}

#[test]
fn stagger_appears_at_high_resolution() {
    let model = &plustek_opticfilm_7200::MODEL;
    let session = compute_session(model, &model.sensors[1], color_params(3600, 120, 10)).unwrap();
    assert_eq!(session.stagger_y_shifts, vec![0, 2]);
    assert_eq!(session.num_staggered_lines, 2);
    assert_eq!(session.max_color_shift_lines, 24);
    assert_eq!(session.output_line_count, 10 + 24 + 2);

    let mut params = color_params(3600, 120, 10);
    params.flags |= ScanFlags::IGNORE_STAGGER_OFFSET;
    let session = compute_session(model, &model.sensors[1], params).unwrap();
    assert!(session.stagger_y_shifts.is_empty());
    assert_eq!(session.num_staggered_lines, 0);
}

#[test]
fn slope_tables_accelerate_to_the_target() {
    let model = &canon_lide_90::MODEL;
    let profile = motor::get_motor_profile(model.motor.profiles, 2800, 300, ScanMethod::Flatbed)
        .unwrap();
    let table =
        motor::create_slope_table(AsicType::Gl842, &model.motor, 900, 2800, 2, profile).unwrap();
    assert!(table.len() >= 4);
    assert_eq!(table.len() % 2, 0);
    assert!(table.len() <= AsicType::Gl842.max_slope_table_size());
    assert_eq!(table.table[0], 8000);
    assert!(table.table.windows(2).all(|pair| pair[0] >= pair[1]));
    assert_eq!(*table.table.last().unwrap(), 2100);
    assert_eq!(
        table.pixeltime_sum,
        table.table.iter().map(|speed| *speed as u64).sum::<u64>()
    );
    assert_eq!(table.to_bytes().len(), table.len() * 2);
    assert_eq!(&table.to_bytes()[..2], &8000u16.to_le_bytes());
}

#[test]
fn fastest_table_uses_the_step_type() {
    let model = &plustek_opticfilm_7200::MODEL;
    let profile = &model.motor.fast_profiles[0];
    let table = motor::create_slope_table_fastest(AsicType::Gl842, 2, profile).unwrap();
    assert_eq!(table.table[0], 5000);
    assert_eq!(*table.table.last().unwrap(), 750);
}

#[test]
fn oversized_slope_is_rejected() {
    let slope = motor::MotorSlope::new(60000, 100, 1000);
    assert!(matches!(
        motor::create_slope_table_for_speed(&slope, 100, motor::StepType::Full, 2, 4, 255),
        Err(Error::SlopeTableTooLarge { maximum: 255, .. })
    ));
}

#[test]
fn motor_profile_selection() {
    let profiles = plustek_opticfilm_7200::MODEL.motor.profiles;
    let short = motor::get_motor_profile(profiles, 12000, 600, ScanMethod::Transparency).unwrap();
    assert_eq!(short.step_type, motor::StepType::Half);
    let exact = motor::get_motor_profile(profiles, 16000, 600, ScanMethod::Transparency).unwrap();
    assert_eq!(exact.max_exposure, 16000);
    let long = motor::get_motor_profile(profiles, 24000, 600, ScanMethod::Transparency).unwrap();
    assert_eq!(long.step_type, motor::StepType::Quarter);
    assert!(matches!(
        motor::get_motor_profile(&[], 0, 300, ScanMethod::Flatbed),
        Err(Error::MotorProfileNotFound {
            resolution: 300,
            exposure: 0
        })
    ));
}

#[test]
fn zmod_stays_within_one_line() {
    let table = motor::create_slope_table_fastest(
        AsicType::Gl842,
        2,
        &canon_lide_90::MODEL.motor.fast_profiles[0],
    )
    .unwrap();
    let (z1, z2) = motor::calculate_zmod(false, 2800, &table, table.len(), 425, 10);
    assert!(z1 < 2800);
    assert!(z2 < 2800);
    assert_eq!(motor::calculate_zmod(true, 0, &table, table.len(), 425, 10), (0, 0));
}

#[test]
fn gamma_tables() {
    let identity = gamma::create_gamma_table(256, 1.0);
    assert_eq!(identity.len(), 256);
    assert_eq!(identity[0], 0);
    assert_eq!(identity[128], 32767);
    let bright = gamma::create_gamma_table(256, 2.2);
    assert!(bright[128] > identity[128]);

    let sensor = &canon_lide_90::MODEL.sensors[0];
    let mut custom = [None, None, None];
    assert!(!gamma::has_effective_gamma(sensor, &custom));
    custom[2] = Some(vec![7; 4]);
    assert!(gamma::has_effective_gamma(sensor, &custom));
    let blue = gamma::get_gamma_table(sensor, &custom, 2, 6);
    assert_eq!(blue, vec![7, 7, 7, 7, u16::MAX, u16::MAX]);
    let buffer = gamma::generate_gamma_buffer(sensor, &custom, 256);
    assert_eq!(buffer.len(), 256 * 2 * 3);
    assert_eq!(&buffer[512 * 2..512 * 2 + 2], &7u16.to_le_bytes());
}
