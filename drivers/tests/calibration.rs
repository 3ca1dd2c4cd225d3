use genesys_drivers::calibration::*;
use genesys_drivers::flag::Flag;
use genesys_drivers::types::PixelFormat;
use genesys_drivers::Error;
use genesys_drivers::Warning;

#[test]
fn band_is_below_the_target() {
    let band = Band::new(0xc000, 8000);
    assert_eq!(band.low, 0xc000 - 8000);
    assert!(band.contains(0xc000));
    assert!(band.contains(0xc000 - 8000));
    assert!(!band.contains(0xc001));
    assert_eq!(Band::new(100, 8000).low, 0);
}

#[test]
fn search_grows_from_zero() {
    let band = Band::new(2000, 1000);
    let mut search = BoundedSearch::with_start(0, 255, 255, 0);
    assert_eq!(search.update(0, band), SearchStatus::Adjusting);
    assert_eq!(search.current(), 1);
    assert_eq!(search.update(0, band), SearchStatus::Adjusting);
    assert_eq!(search.current(), 2);
}

#[test]
fn search_stops_at_the_ceiling() {
    let band = Band::new(2000, 1000);
    let mut search = BoundedSearch::with_start(1, 0x3fff, 0x3fff, 0x3fff);
    assert_eq!(search.update(0, band), SearchStatus::LimitReached);
    assert_eq!(search.current(), 0x3fff);
    assert_eq!(search.iterations(), 1);
    // settled searches ignore later measurements
    assert_eq!(search.update(1500, band), SearchStatus::LimitReached);
    assert_eq!(search.iterations(), 1);
}

#[test]
fn run_search_reaches_the_band() {
    let flag = Flag::<Warning>::new();
    let mut searches = [BoundedSearch::new(1, 0x3fff, 0x3fff); 3];
    let scales = [5, 8, 11];
    run_search(
        Kind::Lamp,
        &mut searches,
        Band::new(0xc000, 8000),
        64,
        &flag,
        |values| {
            Ok(values
                .iter()
                .zip(scales)
                .map(|(value, scale)| value * scale)
                .collect())
        },
    )
    .unwrap();
    for (search, scale) in searches.iter().zip(scales) {
        assert_eq!(search.status(), SearchStatus::InBand);
        assert!(Band::new(0xc000, 8000).contains(search.current() * scale));
    }
    assert!(flag.load_warnings().is_empty());
}

#[test]
fn run_search_reports_unreachable_targets() {
    let flag = Flag::<Warning>::new();
    let mut searches = [BoundedSearch::new(0, 255, 255); 3];
    let mut calls = 0;
    run_search(
        Kind::Gain,
        &mut searches,
        Band::new(0xd000, 8000),
        12,
        &flag,
        |values| {
            calls += 1;
            Ok(vec![100; values.len()])
        },
    )
    .unwrap();
    assert!(calls <= 12);
    let warnings = flag.load_warnings();
    assert_eq!(warnings.len(), 3);
    for (channel, warning) in warnings.iter().enumerate() {
        assert!(matches!(
            warning,
            Warning::CalibrationLimit {
                kind: Kind::Gain,
                channel: warning_channel,
                ..
            } if *warning_channel == channel
        ));
    }
    assert!(flag.load_warnings().is_empty());
}

#[test]
fn run_search_honours_cancellation() {
    let flag = Flag::<Warning>::new();
    flag.cancel();
    let mut searches = [BoundedSearch::new(0, 255, 255); 3];
    let result = run_search(
        Kind::Offset,
        &mut searches,
        Band::new(0x0800, 8000),
        12,
        &flag,
        |_| panic!("no measurement after cancellation"),
    );
    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(flag.is_cancelled());
    flag.reset();
    assert!(!flag.is_cancelled());
}

#[test]
fn stability_is_relative() {
    assert!(is_stable(&[1000, 2000], &[1009, 1990], 1));
    assert!(!is_stable(&[1000, 2000], &[1100, 2000], 1));
    assert!(is_stable(&[0, 0], &[0, 0], 1));
}

#[test]
fn sums_and_averages() {
    // two I16 pixels over two lines
    let data: Vec<u8> = [100u16, 200, 300, 400]
        .iter()
        .flat_map(|value| value.to_le_bytes())
        .collect();
    assert_eq!(
        sum_lines(&data, PixelFormat::I16, 2, 2).unwrap(),
        vec![400, 600]
    );
    assert_eq!(
        average_channels(&data, PixelFormat::I16, 2, 2).unwrap(),
        vec![250]
    );
    let color: Vec<u8> = [10u16, 20, 30]
        .iter()
        .flat_map(|value| value.to_le_bytes())
        .collect();
    assert_eq!(
        average_channels(&color, PixelFormat::Rgb161616, 1, 1).unwrap(),
        vec![10, 20, 30]
    );
}

#[test]
fn dark_levels_include_the_tweak() {
    let dark = compute_dark(&[640, 1280, 1920, 64], 64, 3, &[0, 5, -100]);
    assert_eq!(dark, vec![10, 25, 0, 1]);
}

#[test]
fn white_coefficients() {
    let lines = 64;
    assert_eq!(
        compute_white_coefficient(0x8000 * lines as u64, lines, 0xfa00, 100),
        32000
    );
    assert_eq!(
        compute_white_coefficient(0x8000 * lines as u64, lines, 0xfa00, 200),
        16000
    );
    assert_eq!(compute_white_coefficient(0, lines, 0xfa00, 100), u16::MAX);
    assert_eq!(compute_white_coefficient(lines as u64, lines, 0xfa00, 100), u16::MAX);
}

#[test]
fn shading_data_layout() {
    let configuration = Configuration::default();
    let lines = 64;
    let white = [0x8000 * lines as u64; 3];
    let data = build_shading_data(&[0x0102, 0x0304, 0x0506], &white, lines, 3, &configuration);
    assert_eq!(data.len(), 12);
    assert_eq!(&data[0..4], &[0x02, 0x01, 0x00, 0x7d]);
    assert_eq!(&data[4..6], &[0x04, 0x03]);
    assert_eq!(&data[8..10], &[0x06, 0x05]);
    assert_eq!(u16::from_le_bytes([data[10], data[11]]), 32000);
}

#[test]
fn shading_lines_depend_on_resolution() {
    assert_eq!(shading_line_count(75), 32);
    assert_eq!(shading_line_count(150), 64);
}

#[test]
fn cache_replaces_identical_setups() {
    let setup = CurrentSetup {
        pixels: 2480,
        lines: 3507,
        exposure: 2800,
        xres: 300,
        ccd_size_divisor: 2,
        stagger: 0,
        max_shift: 0,
    };
    let frontend = genesys_drivers::frontend::Frontend::from_descriptor(
        &genesys_drivers::devices::canon_lide_90::MODEL.frontend,
    );
    let mut cache = Cache::default();
    assert!(cache.find(&setup).is_none());
    for red in [10, 20] {
        cache.insert(CacheEntry {
            setup,
            frontend: frontend.clone(),
            exposure: genesys_drivers::sensor::SensorExposure::new(red, 1, 1),
        });
    }
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.find(&setup).unwrap().exposure.red, 20);
    let other = CurrentSetup { xres: 600, ..setup };
    assert!(cache.find(&other).is_none());
    cache.clear();
    assert!(cache.is_empty());
}

proptest::proptest! {
    #[test]
    fn bisection_converges_on_a_threshold(
        min in 0u32..100,
        span in 2u32..65_000,
        start_fraction in 0.0f64..=1.0,
        threshold_fraction in 0.0f64..=1.1,
    ) {
        let max = min + span;
        let start = min + (span as f64 * start_fraction) as u32;
        let threshold = min + (span as f64 * threshold_fraction) as u32;
        let band = Band::new(2000, 1000);
        let mut search = BoundedSearch::with_start(min, max, max, start);
        for _ in 0..200 {
            if search.is_done() {
                break;
            }
            let measured = if search.current() >= threshold { 5000 } else { 0 };
            search.update(measured, band);
        }
        proptest::prop_assert_eq!(search.status(), SearchStatus::LimitReached);
        proptest::prop_assert!(search.iterations() <= 40);
        proptest::prop_assert!(search.max() - search.min() <= 1 || search.current() == max);
        proptest::prop_assert!(search.current() >= min && search.current() <= max);
    }

    #[test]
    fn constant_response_ends_in_logarithmic_steps(
        min in 0u32..1000,
        span in 2u32..65_000,
        too_bright: bool,
    ) {
        let max = min + span;
        let band = Band::new(2000, 1000);
        let measured = if too_bright { band.high + 1 } else { 0 };
        let bound = 32 - (span - 1).leading_zeros();
        let mut search = BoundedSearch::new(min, max, max);
        for _ in 0..64 {
            if search.is_done() {
                break;
            }
            search.update(measured, band);
        }
        proptest::prop_assert_eq!(search.status(), SearchStatus::LimitReached);
        proptest::prop_assert!(search.iterations() <= bound);
        proptest::prop_assert!(search.max() - search.min() <= 1);
    }

    #[test]
    fn bisection_finds_a_reachable_band(scale in 4u32..=20, start in 1u32..0x3fff) {
        let band = Band::new(0xc000, 8000);
        let mut search = BoundedSearch::with_start(1, 0x3fff, 0x3fff, start);
        for _ in 0..64 {
            if search.is_done() {
                break;
            }
            let measured = search.current() * scale;
            search.update(measured, band);
        }
        proptest::prop_assert_eq!(search.status(), SearchStatus::InBand);
        proptest::prop_assert!(band.contains(search.current() * scale));
    }
}
