#[path = "support/mod.rs"]
mod support;

use landstalker_codec::{BitReader, BitWriter};
use support::prng::SplitMix64;

#[test]
fn fixed_width_fields_round_trip_across_byte_boundaries() {
    let mut rng = SplitMix64::new(1);
    let fields: Vec<(u32, u32)> = (0..200)
        .map(|_| {
            let n = 1 + rng.next_range(32) as u32;
            let max = if n == 32 { u32::MAX } else { (1u32 << n) - 1 };
            (rng.next_u64() as u32 & max, n)
        })
        .collect();

    let mut w = BitWriter::new();
    for &(value, n) in &fields {
        w.write_u(value, n);
    }
    let bytes = w.finish_bytes();

    let mut r = BitReader::new(&bytes);
    for &(value, n) in &fields {
        assert_eq!(r.read_u(n).unwrap(), value);
    }
}

#[test]
fn exp_golomb_codes_round_trip_for_a_wide_value_range() {
    let mut rng = SplitMix64::new(2);
    let values: Vec<u32> = (0..500).map(|_| (rng.next_u64() % 100_000) as u32).collect();

    let mut w = BitWriter::new();
    for &v in &values {
        w.write_ue(v);
    }
    let bytes = w.finish_bytes();

    let mut r = BitReader::new(&bytes);
    for &v in &values {
        assert_eq!(r.read_ue().unwrap(), v);
    }
}

#[test]
fn byte_alignment_is_idempotent_and_advances_to_a_multiple_of_8() {
    let mut w = BitWriter::new();
    w.write_u(0b101, 3);
    w.byte_align_write();
    assert_eq!(w.bit_pos() % 8, 0);
    let pos_after_first_align = w.bit_pos();
    w.byte_align_write();
    assert_eq!(w.bit_pos(), pos_after_first_align);
}

#[test]
fn reading_past_the_end_reports_truncated_not_a_panic() {
    let mut r = BitReader::new(&[0xFF]);
    r.read_u(8).unwrap();
    assert!(r.read_bool().is_err());
    assert!(r.read_u(1).is_err());
    assert!(r.read_ue().is_err());
}
