#[path = "support/mod.rs"]
mod support;

use landstalker_codec::{blockset_decode, blockset_encode, Block, Tile};
use support::prng::SplitMix64;

fn random_tile(rng: &mut SplitMix64) -> Tile {
    Tile {
        idx: (rng.next_u64() & 0x7FF) as u16,
        hflip: rng.next_range(2) == 0,
        vflip: rng.next_range(2) == 0,
        priority: rng.next_range(2) == 0,
    }
}

#[test]
fn round_trips_blocks_with_every_attribute_combination_represented() {
    let mut rng = SplitMix64::new(20);
    let mut blocks = Vec::new();
    for _ in 0..64 {
        let block: Block = [random_tile(&mut rng), random_tile(&mut rng), random_tile(&mut rng), random_tile(&mut rng)];
        blocks.push(block);
    }
    let encoded = blockset_encode(&blocks).unwrap();
    let decoded = blockset_decode(&encoded).unwrap();
    assert_eq!(decoded, blocks);
}

#[test]
fn first_attribute_run_is_off_not_on() {
    // A single block whose first tile carries the priority attribute
    // forces the priority mask to emit a zero-length leading "off" run
    // before the run that turns it on.
    let block: Block = [
        Tile { idx: 1, hflip: false, vflip: false, priority: true },
        Tile { idx: 2, hflip: false, vflip: false, priority: false },
        Tile { idx: 3, hflip: false, vflip: false, priority: false },
        Tile { idx: 4, hflip: false, vflip: false, priority: false },
    ];
    let encoded = blockset_encode(&[block]).unwrap();
    let decoded = blockset_decode(&encoded).unwrap();
    assert_eq!(decoded, vec![block]);
}

#[test]
fn empty_blockset_round_trips() {
    let encoded = blockset_encode(&[]).unwrap();
    assert_eq!(encoded, vec![0x00, 0x00]);
    let decoded = blockset_decode(&encoded).unwrap();
    assert!(decoded.is_empty());
}

#[test]
fn decode_reports_errors_instead_of_panicking_on_truncated_input() {
    let encoded = blockset_encode(&[[Tile::new(5); 4]]).unwrap();
    for cut in 0..encoded.len() {
        let _ = blockset_decode(&encoded[..cut]);
    }
}
