use genesys_drivers::pipeline::*;
use genesys_drivers::types::ColorOrder;
use genesys_drivers::types::PixelFormat;
use genesys_drivers::Error;

fn array_stack(width: usize, height: usize, format: PixelFormat, data: Vec<u8>) -> Stack {
    let mut stack = Stack::new();
    stack
        .push_source(array_source::Node::new(width, height, format, data).unwrap())
        .unwrap();
    stack
}

fn rows(stack: &mut Stack) -> Vec<Vec<u8>> {
    let row_bytes = stack.output_row_bytes().unwrap();
    stack
        .get_all_data()
        .unwrap()
        .chunks_exact(row_bytes)
        .map(<[u8]>::to_vec)
        .collect()
}

#[test]
fn merge_mono_lines_interleaves_three_rows() {
    let mut stack = array_stack(
        3,
        3,
        PixelFormat::I8,
        vec![10, 20, 30, 40, 50, 60, 70, 80, 90],
    );
    stack
        .push_node(|source| merge_mono_lines::Node::new(source, ColorOrder::Rgb))
        .unwrap();
    assert_eq!(stack.output_format().unwrap(), PixelFormat::Rgb888);
    assert_eq!(stack.output_height().unwrap(), 1);
    assert_eq!(
        rows(&mut stack),
        vec![vec![10, 40, 70, 20, 50, 80, 30, 60, 90]]
    );
}

#[test]
fn merge_mono_lines_rejects_color_input() {
    let stack = array_stack(1, 3, PixelFormat::Rgb888, vec![0; 9]);
    let result = merge_mono_lines::Node::new(&stack.nodes()[0], ColorOrder::Rgb);
    assert!(matches!(
        result,
        Err(Error::UnsupportedMergeFormat { .. })
    ));
}

#[test]
fn split_mono_lines_emits_one_row_per_channel() {
    let mut stack = array_stack(2, 1, PixelFormat::Rgb888, vec![1, 2, 3, 4, 5, 6]);
    stack.push_node(split_mono_lines::Node::new).unwrap();
    assert_eq!(stack.output_format().unwrap(), PixelFormat::I8);
    assert_eq!(stack.output_height().unwrap(), 3);
    assert_eq!(rows(&mut stack), vec![vec![1, 4], vec![2, 5], vec![3, 6]]);
    assert!(stack.eof());
}

#[test]
fn split_mono_lines_rejects_gray_input() {
    let stack = array_stack(2, 1, PixelFormat::I8, vec![0; 2]);
    assert!(matches!(
        split_mono_lines::Node::new(&stack.nodes()[0]),
        Err(Error::UnsupportedSplitFormat(PixelFormat::I8))
    ));
}

#[test]
fn extract_past_the_source_yields_blank_rows() {
    let height = 2;
    let mut stack = array_stack(4, height, PixelFormat::I8, vec![0xff; 8]);
    stack
        .push_node(|source| extract::Node::new(source, 0, height + 5, 4, 3))
        .unwrap();
    assert_eq!(rows(&mut stack), vec![vec![0; 4]; 3]);
    assert!(stack.eof());
}

#[test]
fn extract_crops_and_pads_columns() {
    let data: Vec<u8> = (0..12).collect();
    let mut stack = array_stack(4, 3, PixelFormat::I8, data);
    stack
        .push_node(|source| extract::Node::new(source, 2, 1, 3, 2))
        .unwrap();
    assert_eq!(rows(&mut stack), vec![vec![6, 7, 0], vec![10, 11, 0]]);
}

#[test]
fn extract_right_of_the_source_yields_blank_columns() {
    let mut stack = array_stack(4, 2, PixelFormat::I8, vec![0xff; 8]);
    stack
        .push_node(|source| extract::Node::new(source, 6, 0, 3, 2))
        .unwrap();
    assert_eq!(rows(&mut stack), vec![vec![0; 3]; 2]);

    let mut stack = array_stack(16, 1, PixelFormat::I1, vec![0xff; 2]);
    stack
        .push_node(|source| extract::Node::new(source, 20, 0, 8, 1))
        .unwrap();
    assert_eq!(rows(&mut stack), vec![vec![0]]);
}

#[test]
fn extract_crops_one_bit_rows() {
    let mut stack = array_stack(16, 1, PixelFormat::I1, vec![0b1000_0001, 0b1111_0000]);
    stack
        .push_node(|source| extract::Node::new(source, 7, 0, 8, 1))
        .unwrap();
    assert_eq!(rows(&mut stack), vec![vec![0b1111_1000]]);
}

#[test]
fn desegment_reorders_segments() {
    let mut stack = array_stack(4, 1, PixelFormat::I8, vec![1, 2, 3, 4]);
    stack
        .push_node(|source| desegment::Node::new(source, 4, &[1, 0], 2, 1, 1))
        .unwrap();
    assert_eq!(rows(&mut stack), vec![vec![3, 1, 4, 2]]);
}

#[test]
fn desegment_deinterleaves_lines() {
    let mut stack = array_stack(2, 4, PixelFormat::I8, (1..=8).collect());
    stack
        .push_node(|source| desegment::Node::deinterleave_lines(source, 2, 1))
        .unwrap();
    assert_eq!(stack.output_width().unwrap(), 4);
    assert_eq!(rows(&mut stack), vec![vec![1, 3, 2, 4], vec![5, 7, 6, 8]]);
}

#[test]
fn desegment_requires_a_divisor_of_the_height() {
    let height = 12;
    for interleaved_lines in 0..=height + 1 {
        let stack = array_stack(2, height, PixelFormat::I8, vec![0; 2 * height]);
        let result = desegment::Node::new(
            &stack.nodes()[0],
            2,
            &[0],
            2,
            interleaved_lines,
            1,
        );
        if interleaved_lines != 0 && height % interleaved_lines == 0 {
            assert!(result.is_ok(), "{interleaved_lines} divides {height}");
        } else {
            assert!(matches!(
                result,
                Err(Error::InterleaveMismatch { .. })
            ));
        }
    }
}

#[test]
fn desegment_rejects_segments_past_the_input() {
    let stack = array_stack(4, 1, PixelFormat::I8, vec![0; 4]);
    assert!(matches!(
        desegment::Node::new(&stack.nodes()[0], 4, &[0, 3], 2, 1, 1),
        Err(Error::SegmentOutOfRange { segment: 1 })
    ));
}

#[test]
fn component_shift_lines_realigns_channels() {
    let data: Vec<u8> = (0..4u8)
        .flat_map(|y| [y * 10 + 1, y * 10 + 2, y * 10 + 3])
        .collect();
    let mut stack = array_stack(1, 4, PixelFormat::Rgb888, data);
    stack
        .push_node(|source| component_shift_lines::Node::new(source, 0, 1, 2))
        .unwrap();
    assert_eq!(stack.output_height().unwrap(), 2);
    assert_eq!(rows(&mut stack), vec![vec![1, 12, 23], vec![11, 22, 33]]);
}

#[test]
fn pixel_shift_lines_alternates_rows() {
    let data: Vec<u8> = (0..3u8)
        .flat_map(|y| (0..4u8).map(move |x| y * 10 + x))
        .collect();
    let mut stack = array_stack(4, 3, PixelFormat::I8, data);
    stack
        .push_node(|source| pixel_shift_lines::Node::new(source, &[0, 1]))
        .unwrap();
    assert_eq!(stack.output_height().unwrap(), 2);
    assert_eq!(
        rows(&mut stack),
        vec![vec![0, 11, 2, 13], vec![10, 21, 12, 23]]
    );
}

#[test]
fn pixel_shift_lines_limits_the_shift_count() {
    let stack = array_stack(4, 4, PixelFormat::I8, vec![0; 16]);
    for shifts in [&[][..], &[0, 1, 2][..]] {
        assert!(matches!(
            pixel_shift_lines::Node::new(&stack.nodes()[0], shifts),
            Err(Error::UnsupportedShiftCount {
                maximum: pixel_shift_lines::MAX_SHIFTS,
                ..
            })
        ));
    }
}

#[test]
fn format_convert_swaps_color_order() {
    let mut stack = array_stack(2, 1, PixelFormat::Bgr888, vec![1, 2, 3, 4, 5, 6]);
    stack
        .push_node(|source| format_convert::Node::new(source, PixelFormat::Rgb888))
        .unwrap();
    assert_eq!(rows(&mut stack), vec![vec![3, 2, 1, 6, 5, 4]]);
}

#[test]
fn callable_source_cuts_rows_from_batches() {
    let mut next = 0u8;
    let mut stack = Stack::new();
    stack
        .push_source(
            buffered_callable_source::Node::new(
                4,
                3,
                PixelFormat::I8,
                5,
                Box::new(move |data: &mut [u8]| {
                    for byte in data.iter_mut() {
                        *byte = next;
                        next += 1;
                    }
                    Ok(())
                }),
            )
            .unwrap(),
        )
        .unwrap();
    assert_eq!(
        rows(&mut stack),
        vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9, 10, 11]]
    );
}

#[test]
fn usb_source_stops_at_the_total_size() {
    let mut stack = Stack::new();
    stack
        .push_source(
            buffered_genesys_usb_source::Node::new(
                4,
                3,
                PixelFormat::I8,
                8,
                3,
                Box::new(|data: &mut [u8]| {
                    data.fill(7);
                    Ok(())
                }),
            )
            .unwrap(),
        )
        .unwrap();
    let mut row = vec![0u8; 4];
    stack.get_next_row_data(&mut row).unwrap();
    stack.get_next_row_data(&mut row).unwrap();
    assert_eq!(row, vec![7; 4]);
    assert!(!stack.eof());
    stack.get_next_row_data(&mut row).unwrap();
    assert!(stack.eof());
}

#[test]
fn producer_errors_propagate() {
    let mut stack = Stack::new();
    stack
        .push_source(
            buffered_callable_source::Node::new(
                4,
                1,
                PixelFormat::I8,
                4,
                Box::new(|_: &mut [u8]| Err(Error::Cancelled)),
            )
            .unwrap(),
        )
        .unwrap();
    assert!(matches!(stack.get_all_data(), Err(Error::Cancelled)));
}

#[test]
fn stack_checks_its_shape() {
    let mut stack = Stack::new();
    assert!(matches!(stack.output_width(), Err(Error::EmptyPipeline)));
    assert!(matches!(
        stack.push_node(|source| format_convert::Node::new(source, PixelFormat::I8)),
        Err(Error::EmptyPipeline)
    ));
    assert!(stack.eof());
    stack
        .push_source(array_source::Node::new(2, 1, PixelFormat::I8, vec![1, 2]).unwrap())
        .unwrap();
    assert!(matches!(
        stack.push_source(array_source::Node::new(2, 1, PixelFormat::I8, vec![1, 2]).unwrap()),
        Err(Error::PipelineNotEmpty)
    ));
    let mut short = [0u8; 1];
    assert!(matches!(
        stack.get_next_row_data(&mut short),
        Err(Error::ArrayTooSmall {
            length: 1,
            required: 2
        })
    ));
    assert!(matches!(
        array_source::Node::new(2, 2, PixelFormat::I8, vec![0; 3]),
        Err(Error::ArrayTooSmall { .. })
    ));
}

#[test]
fn image_has_the_output_geometry() {
    let mut stack = array_stack(3, 3, PixelFormat::I8, (0..9).collect());
    stack
        .push_node(|source| merge_mono_lines::Node::new(source, ColorOrder::Bgr))
        .unwrap();
    stack
        .push_node(|source| format_convert::Node::new(source, PixelFormat::Rgb888))
        .unwrap();
    assert_eq!(stack.input_width().unwrap(), 3);
    assert_eq!(stack.input_height().unwrap(), 3);
    let image = stack.get_image().unwrap();
    assert_eq!(image.width(), 3);
    assert_eq!(image.height(), 1);
    assert_eq!(image.format(), PixelFormat::Rgb888);
    assert_eq!(image.data(), &[6, 3, 0, 7, 4, 1, 8, 5, 2]);
}
