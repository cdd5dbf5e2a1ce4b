#[path = "support/mod.rs"]
mod support;

use landstalker_codec::{lz77_decode, lz77_encode};
use support::prng::SplitMix64;

#[test]
fn round_trips_random_bytes_of_varied_sizes() {
    let mut rng = SplitMix64::new(10);
    for len in [0usize, 1, 2, 3, 17, 18, 19, 64, 4096, 5000] {
        let input = rng.bytes(len);
        let encoded = lz77_encode(&input);
        let (decoded, consumed) = lz77_decode(&encoded).unwrap();
        assert_eq!(decoded, input, "len={len}");
        assert_eq!(consumed, encoded.len(), "len={len}");
    }
}

#[test]
fn round_trips_highly_repetitive_data_past_the_match_length_cap() {
    let input = vec![0xAB; 500];
    let encoded = lz77_encode(&input);
    let (decoded, _) = lz77_decode(&encoded).unwrap();
    assert_eq!(decoded, input);
}

#[test]
fn round_trips_data_spanning_more_than_one_offset_window() {
    // 4095 is MAX_OFFSET; a repeat exactly at the boundary and just beyond
    // it exercises the encoder's window-edge arithmetic.
    let mut input = vec![0u8; 4095];
    input.push(0x99);
    input.extend(std::iter::repeat(0x00).take(4095));
    input.push(0x99);
    let encoded = lz77_encode(&input);
    let (decoded, _) = lz77_decode(&encoded).unwrap();
    assert_eq!(decoded, input);
}

#[test]
fn decode_rejects_a_back_reference_before_the_start_of_output() {
    let bad = [0x00u8, 0xF0, 0x01];
    assert!(lz77_decode(&bad).is_err());
}

#[test]
fn decode_reports_truncation_instead_of_panicking_on_arbitrary_short_input() {
    for len in 0..8usize {
        let mut rng = SplitMix64::new(len as u64 + 99);
        let bytes = rng.bytes(len);
        let _ = lz77_decode(&bytes);
    }
}
