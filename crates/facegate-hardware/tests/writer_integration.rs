//! Integration tests for WiegandWriter
//!
//! The mock output records every line write, so these tests check the
//! emitted bit order, electrical levels and pulse timing.

use facegate_core::{Level, LineConfig, OutputPolarity, Rail};
use facegate_hardware::devices::{AnyWiegandInput, AnyWiegandOutput};
use facegate_hardware::mock::{MockWiegandInput, MockWiegandOutput, MockWiegandOutputHandle};
use facegate_hardware::{WiegandReader, WiegandWriter};
use facegate_wiegand::bits_to_value;
use facegate_wiegand::parity::check_1_30_1;
use rstest::rstest;
use std::time::Duration;

fn started(config: LineConfig) -> (WiegandWriter, MockWiegandOutputHandle) {
    let (output, handle) = MockWiegandOutput::new();
    let mut writer = WiegandWriter::new(config, AnyWiegandOutput::Mock(output));
    writer.initialize().unwrap();
    (writer, handle)
}

fn bit_string(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

#[test]
fn test_send_raw_deadbeef_pattern() {
    let (mut writer, handle) = started(LineConfig::writer().build().unwrap());

    writer.send_raw(0xDEAD_BEEF).unwrap();

    assert_eq!(
        bit_string(&handle.decoded_bits()),
        "11011110101011011011111011101111"
    );
    // One active and one idle write per bit
    assert_eq!(handle.writes().len(), 64);
}

#[test]
fn test_exactly_one_rail_per_bit() {
    let (mut writer, handle) = started(LineConfig::writer().build().unwrap());

    writer.send_raw(0x0F0F_00FF).unwrap();

    let writes = handle.writes();
    for pair in writes.chunks(2) {
        assert_eq!(pair[0].rail, pair[1].rail);
        assert_eq!(pair[0].level, Level::High);
        assert_eq!(pair[1].level, Level::Low);
    }
    let ones = writes
        .iter()
        .filter(|w| w.rail == Rail::One && w.level == Level::High)
        .count();
    assert_eq!(ones, 0x0F0F_00FFu32.count_ones() as usize);
}

#[test]
fn test_lines_follow_config() {
    let config = LineConfig::writer().lines(5, 6).build().unwrap();
    let (mut writer, handle) = started(config);

    writer.send_bits(&[false, true]).unwrap();

    let lines: Vec<u32> = handle.writes().iter().map(|w| w.line).collect();
    assert_eq!(lines, vec![5, 5, 6, 6]);
}

#[rstest]
#[case::zero(0)]
#[case::all_ones(0x3FFF_FFFF)]
#[case::mixed(0x1234_5678)]
#[case::high_bits_ignored(0xFFFF_FFFF)]
fn test_parity_frame_layout(#[case] value: u32) {
    let (mut writer, handle) = started(LineConfig::writer().build().unwrap());

    writer.send_with_parity_1_30_1(value).unwrap();

    let bits = handle.decoded_bits();
    assert_eq!(bits.len(), 32);

    let frame = bits_to_value(&bits) as u32;
    assert!(check_1_30_1(frame));
    assert_eq!((frame >> 1) & 0x3FFF_FFFF, value & 0x3FFF_FFFF);

    // Leading bit + first 15 data bits even, trailing bit + last 15 odd
    assert_eq!(bits[..16].iter().filter(|&&b| b).count() % 2, 0);
    assert_eq!(bits[16..].iter().filter(|&&b| b).count() % 2, 1);
}

#[test]
fn test_active_low_polarity_levels() {
    let config = LineConfig::writer()
        .polarity(OutputPolarity::ActiveLow)
        .build()
        .unwrap();
    let (mut writer, handle) = started(config);
    assert_eq!(handle.level(Rail::Zero), Some(Level::High));

    writer.send_bits(&[true, false, true]).unwrap();

    let levels: Vec<Level> = handle.writes().iter().map(|w| w.level).collect();
    assert_eq!(
        levels,
        vec![
            Level::Low,
            Level::High,
            Level::Low,
            Level::High,
            Level::Low,
            Level::High
        ]
    );
    assert_eq!(handle.decoded_bits(), vec![true, false, true]);
    assert_eq!(handle.level(Rail::One), Some(Level::High));
}

#[test]
fn test_pulse_and_space_timing() {
    let config = LineConfig::writer()
        .pulse_width(Duration::from_micros(300))
        .pulse_space(Duration::from_micros(700))
        .build()
        .unwrap();
    let (mut writer, handle) = started(config);

    writer.send_bits(&[true, false, false, true]).unwrap();

    let writes = handle.writes();
    for (i, pair) in writes.windows(2).enumerate() {
        let held = pair[1].at.duration_since(pair[0].at);
        let minimum = if i % 2 == 0 {
            Duration::from_micros(300)
        } else {
            Duration::from_micros(700)
        };
        assert!(held >= minimum, "step {i} held {held:?}, expected {minimum:?}");
    }
}

#[test]
fn test_send_before_initialize() {
    let (output, handle) = MockWiegandOutput::new();
    let mut writer = WiegandWriter::new(
        LineConfig::writer().build().unwrap(),
        AnyWiegandOutput::Mock(output),
    );

    let err = writer.send_raw(0xDEAD_BEEF).unwrap_err();
    assert_eq!(err.to_string(), "Wiegand writer not initialized");
    assert!(
        writer
            .send_with_parity_1_30_1(5)
            .unwrap_err()
            .is_not_initialized()
    );
    assert!(!handle.is_claimed());
    assert!(handle.writes().is_empty());
}

#[test]
fn test_send_after_shutdown() {
    let (mut writer, handle) = started(LineConfig::writer().build().unwrap());
    writer.shutdown().unwrap();

    assert!(writer.send_raw(1).unwrap_err().is_not_initialized());
    assert!(handle.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_loopback_into_reader() {
    let (input, input_handle) = MockWiegandInput::new();
    let mut reader = WiegandReader::new(
        LineConfig::reader().build().unwrap(),
        AnyWiegandInput::Mock(input),
    );
    reader.initialize().await.unwrap();

    let (output, _output_handle) = MockWiegandOutput::wired(input_handle);
    let mut writer = WiegandWriter::new(
        LineConfig::writer()
            .pulse_width(Duration::from_micros(20))
            .pulse_space(Duration::from_micros(200))
            .build()
            .unwrap(),
        AnyWiegandOutput::Mock(output),
    );
    writer.initialize().unwrap();

    for value in [0xDEAD_BEEF, 0, u32::MAX] {
        writer.send_raw(value).unwrap();
        let received = reader
            .get_next_frame(Some(Duration::from_millis(500)))
            .await
            .unwrap();
        assert_eq!(received, Some(value));
    }

    writer.send_with_parity_1_30_1(0x2AAA_AAAA).unwrap();
    let received = reader
        .get_next_frame(Some(Duration::from_millis(500)))
        .await
        .unwrap()
        .unwrap();
    assert!(check_1_30_1(received));
    assert_eq!((received >> 1) & 0x3FFF_FFFF, 0x2AAA_AAAA);

    writer.shutdown().unwrap();
    reader.shutdown().await.unwrap();
}
