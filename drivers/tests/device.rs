use genesys_drivers::calibration::Kind;
use genesys_drivers::device::State;
use genesys_drivers::devices::canon_lide_90;
use genesys_drivers::devices::plustek_opticfilm_7200;
use genesys_drivers::gl842::registers::REG_0X06_PWRBIT;
use genesys_drivers::pipeline::build_image_pipeline;
use genesys_drivers::properties::Model;
use genesys_drivers::session::ScanSession;
use genesys_drivers::settings::ScanMethod;
use genesys_drivers::settings::Settings;
use genesys_drivers::transport::Recorder;
use genesys_drivers::transport::Transfer;
use genesys_drivers::types::PixelFormat;
use genesys_drivers::Configuration;
use genesys_drivers::Device;
use genesys_drivers::Error;
use genesys_drivers::Type;
use genesys_drivers::Warning;
use std::sync::Arc;

fn lide_settings() -> Settings {
    Settings {
        xres: 150,
        yres: 150,
        pixels: 100,
        lines: 20,
        ..Settings::default()
    }
}

fn film_settings() -> Settings {
    Settings {
        scan_method: ScanMethod::Transparency,
        xres: 600,
        yres: 600,
        pixels: 120,
        lines: 10,
        ..Settings::default()
    }
}

fn open(model: &'static Model, settings: Settings, recorder: &Arc<Recorder>) -> Device {
    Device::new(
        model,
        recorder.clone(),
        Configuration {
            settings,
            ..Configuration::default()
        },
    )
    .unwrap()
}

fn count_warnings(warnings: &[Warning], expected: Kind) -> usize {
    warnings
        .iter()
        .filter(|warning| matches!(warning, Warning::CalibrationLimit { kind, .. } if *kind == expected))
        .count()
}

#[test]
fn flatbed_scan() {
    let recorder = Arc::new(Recorder::new());
    let mut device = open(&canon_lide_90::MODEL, lide_settings(), &recorder);
    assert_eq!(device.state(), State::Uninitialized);

    device.init().unwrap();
    assert_eq!(device.state(), State::Idle);
    assert_eq!(device.head_pos_primary, Some(0));
    assert_eq!(device.head_pos_secondary, None);
    assert!(recorder.transfers().iter().any(|transfer| matches!(
        transfer,
        Transfer::WriteGamma { address: 0, data, .. } if data.len() == 256 * 2 * 3
    )));

    device.calibrate().unwrap();
    let warnings = device.flag().load_warnings();
    // the recorder answers every line with the same level, offset and gain
    // cannot reach their bands
    assert_eq!(count_warnings(&warnings, Kind::Lamp), 0);
    assert_eq!(count_warnings(&warnings, Kind::Offset), 3);
    assert_eq!(count_warnings(&warnings, Kind::Gain), 3);
    assert_eq!(warnings.len(), 6);
    assert_eq!(device.shading_data.len(), 5102 * 12);
    assert_eq!(
        device.calibrated_exposure.unwrap(),
        canon_lide_90::MODEL.sensors[0].exposure
    );
    assert_eq!(device.calibration_cache.len(), 1);
    assert_eq!(device.head_pos_primary, Some(0));

    recorder.take_transfers();
    device.start_scan().unwrap();
    assert_eq!(device.state(), State::Scanning);
    assert!(device.session.computed);
    assert!(device.head_pos_primary.unwrap() > 0);
    assert!(recorder.transfers().iter().any(|transfer| matches!(
        transfer,
        Transfer::WriteBuffer { address: 0, data, .. } if data.len() == 432 * 12
    )));
    assert_eq!(device.output_width().unwrap(), 100);
    assert_eq!(device.output_height().unwrap(), 20);
    assert_eq!(device.output_format().unwrap(), PixelFormat::Rgb888);

    let image = device.read_image().unwrap();
    assert_eq!(image.width(), 100);
    assert_eq!(image.height(), 20);
    assert_eq!(image.format(), PixelFormat::Rgb888);
    assert!(image.data().iter().all(|byte| *byte == 0xb0));
    assert!(device.eof());

    device.end_scan().unwrap();
    assert_eq!(device.state(), State::Idle);
    assert_eq!(device.head_pos_primary, Some(0));
    assert!(device.flag().load_warnings().is_empty());
}

#[test]
fn second_calibration_reuses_the_cache() {
    let recorder = Arc::new(Recorder::new());
    let mut device = open(&canon_lide_90::MODEL, lide_settings(), &recorder);
    device.init().unwrap();
    device.calibrate().unwrap();
    let frontend = device.frontend.clone();
    device.flag().load_warnings();

    device.calibrate().unwrap();
    assert!(device.flag().load_warnings().is_empty());
    assert_eq!(device.calibration_cache.len(), 1);
    assert_eq!(device.frontend, frontend);
    assert!(!device.shading_data.is_empty());
}

#[test]
fn cold_start_resets_the_asic() {
    let reset = |transfers: &[Transfer]| {
        transfers.iter().any(|transfer| {
            matches!(
                transfer,
                Transfer::WriteRegister {
                    address: 0x0e,
                    value: 1
                }
            )
        })
    };

    let recorder = Arc::new(Recorder::new());
    open(&canon_lide_90::MODEL, lide_settings(), &recorder)
        .init()
        .unwrap();
    assert!(reset(&recorder.transfers()));

    let recorder = Arc::new(Recorder::new());
    recorder.set_register(0x06, REG_0X06_PWRBIT);
    open(&canon_lide_90::MODEL, lide_settings(), &recorder)
        .init()
        .unwrap();
    assert!(!reset(&recorder.transfers()));
}

#[test]
fn operations_check_the_state() {
    let recorder = Arc::new(Recorder::new());
    let mut device = open(&canon_lide_90::MODEL, lide_settings(), &recorder);
    assert!(matches!(
        device.start_scan(),
        Err(Error::InvalidState {
            operation: "start_scan",
            state: State::Uninitialized
        })
    ));
    assert!(matches!(
        device.calibrate(),
        Err(Error::InvalidState { .. })
    ));
    let mut row = [0u8; 300];
    assert!(matches!(
        device.read_row(&mut row),
        Err(Error::InvalidState { .. })
    ));
    assert!(recorder.transfers().is_empty());
}

#[test]
fn cancellation_stops_operations() {
    let recorder = Arc::new(Recorder::new());
    let mut device = open(&canon_lide_90::MODEL, lide_settings(), &recorder);
    device.init().unwrap();
    let flag = device.flag();

    flag.cancel();
    assert!(matches!(device.calibrate(), Err(Error::Cancelled)));
    assert!(matches!(device.start_scan(), Err(Error::Cancelled)));
    flag.reset();

    device.start_scan().unwrap();
    flag.cancel();
    let mut row = vec![0u8; device.output_row_bytes().unwrap()];
    assert!(matches!(device.read_row(&mut row), Err(Error::Cancelled)));
    assert!(matches!(device.read_image(), Err(Error::Cancelled)));
    flag.reset();
    device.read_row(&mut row).unwrap();
    device.end_scan().unwrap();
}

#[test]
fn uncomputed_sessions_are_rejected() {
    let recorder = Arc::new(Recorder::new());
    let mut device = open(&canon_lide_90::MODEL, lide_settings(), &recorder);
    let sensor = device.find_sensor().unwrap();
    let mut registers = device.registers.clone();
    let command_set = device.command_set();
    assert!(matches!(
        command_set.init_regs_for_scan_session(
            &mut device,
            sensor,
            &mut registers,
            &ScanSession::default()
        ),
        Err(Error::SessionNotComputed)
    ));
    assert!(matches!(
        build_image_pipeline(
            &canon_lide_90::MODEL,
            &ScanSession::default(),
            recorder.clone()
        ),
        Err(Error::SessionNotComputed)
    ));
    assert!(matches!(
        command_set.send_shading_data(&mut device, sensor, &[7; 1200]),
        Err(Error::SessionNotComputed)
    ));
    assert!(recorder.transfers().is_empty());
}

#[test]
fn custom_gamma_channels_are_checked() {
    let recorder = Arc::new(Recorder::new());
    let mut device = open(&canon_lide_90::MODEL, lide_settings(), &recorder);
    device.set_custom_gamma(2, Some(vec![0; 256])).unwrap();
    assert_eq!(device.custom_gamma[2].as_ref().map(Vec::len), Some(256));
    assert!(matches!(
        device.set_custom_gamma(3, None),
        Err(Error::InvalidChannel(3))
    ));
    device.set_custom_gamma(2, None).unwrap();
    assert!(device.custom_gamma.iter().all(Option::is_none));
}

#[test]
fn missing_sensor_is_reported() {
    let recorder = Arc::new(Recorder::new());
    let settings = Settings {
        xres: 300,
        ..film_settings()
    };
    let mut device = open(&plustek_opticfilm_7200::MODEL, settings, &recorder);
    assert!(matches!(
        device.init(),
        Err(Error::SensorNotFound {
            resolution: 300,
            ..
        })
    ));
}

#[test]
fn transparency_scan() {
    let recorder = Arc::new(Recorder::new());
    let mut device = open(&plustek_opticfilm_7200::MODEL, film_settings(), &recorder);
    device.init().unwrap();
    assert_eq!(device.head_pos_secondary, Some(0));
    // the film scanner has an Analog Devices frontend
    assert_eq!(recorder.fe_register(0x00), Some(0xf8));

    device.calibrate().unwrap();
    let warnings = device.flag().load_warnings();
    assert_eq!(count_warnings(&warnings, Kind::Offset), 0);
    assert_eq!(count_warnings(&warnings, Kind::Gain), 3);
    assert_eq!(device.shading_data.len(), 1700 * 12);

    device.start_scan().unwrap();
    assert_eq!(recorder.register(0x6c), Some(0x4d));
    assert!(device.head_pos_secondary.unwrap() > 0);
    let image = device.read_image().unwrap();
    assert_eq!(image.width(), 120);
    assert_eq!(image.height(), 10);
    assert_eq!(image.format(), PixelFormat::Rgb888);
    assert!(image.data().iter().all(|byte| *byte == 0xb0));

    device.end_scan().unwrap();
    assert_eq!(recorder.register(0x6c), Some(0x4c));
    assert_eq!(device.head_pos_primary, Some(0));
    assert_eq!(device.head_pos_secondary, Some(0));
}

#[test]
fn pipelines_follow_the_sensor_layout() {
    let names = |model: &'static Model, settings: Settings| {
        let recorder = Arc::new(Recorder::new());
        let device = open(model, settings, &recorder);
        let sensor = device.find_sensor().unwrap();
        let session = device
            .command_set()
            .calculate_scan_session(&device, sensor, &device.settings)
            .unwrap();
        build_image_pipeline(model, &session, recorder)
            .unwrap()
            .nodes()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
    };
    assert_eq!(
        names(&canon_lide_90::MODEL, lide_settings()),
        vec!["buffered_genesys_usb_source", "merge_mono_lines", "extract"]
    );
    assert_eq!(
        names(&plustek_opticfilm_7200::MODEL, film_settings()),
        vec![
            "buffered_genesys_usb_source",
            "format_convert",
            "component_shift_lines",
            "extract"
        ]
    );
}

#[test]
fn device_types() {
    let device_type: Type = "canon_lide_90".parse().unwrap();
    assert_eq!(device_type, Type::CanonLide90);
    assert_eq!(device_type.to_string(), "canon_lide_90");
    assert_eq!(device_type.name(), "canon-lide-90");
    assert_eq!(
        Type::PlustekOpticfilm7200.vendor_and_product_id(),
        (0x07b3, 0x0807)
    );
    assert!("lide".parse::<Type>().is_err());
}

#[test]
fn configuration_round_trip() {
    let mut configuration = Configuration::default();
    configuration.settings = film_settings();
    configuration.calibration.gain_tweak = [100, 95, 110];
    let data = genesys_drivers::bincode::serialize(&configuration).unwrap();
    assert_eq!(
        Configuration::deserialize_bincode(&data).unwrap(),
        configuration
    );
}
