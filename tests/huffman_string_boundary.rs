#[path = "support/mod.rs"]
mod support;

use landstalker_codec::{bank, huffman_compress, huffman_decompress, HuffmanTrees, EOF_CHAR};
use support::prng::SplitMix64;

const SAMPLE_STRINGS: &[&[u8]] =
    &[b"Nigel", b"Gumi Village", b"Mercator Castle", b"Lake Shrine", b"the King Nole's Labyrinth", b""];

fn build_corpus() -> Vec<u8> {
    let mut corpus = Vec::new();
    for s in SAMPLE_STRINGS {
        corpus.extend_from_slice(s);
        corpus.push(EOF_CHAR);
    }
    corpus
}

#[test]
fn round_trips_every_trained_string() {
    let trees = HuffmanTrees::build(&build_corpus(), EOF_CHAR);
    for s in SAMPLE_STRINGS {
        let encoded = huffman_compress(s, &trees, EOF_CHAR).unwrap();
        let (decoded, consumed) = huffman_decompress(&encoded, &trees, EOF_CHAR).unwrap();
        assert_eq!(&decoded, s);
        assert_eq!(consumed, encoded.len());
    }
}

#[test]
fn tree_table_round_trips_through_serialize_and_parse() {
    let trees = HuffmanTrees::build(&build_corpus(), EOF_CHAR);
    let (offsets, blob) = trees.serialize();
    let parsed = HuffmanTrees::parse(&offsets, &blob).unwrap();
    for s in SAMPLE_STRINGS {
        let encoded = huffman_compress(s, &parsed, EOF_CHAR).unwrap();
        let (decoded, _) = huffman_decompress(&encoded, &parsed, EOF_CHAR).unwrap();
        assert_eq!(&decoded, s);
    }
}

#[test]
fn string_bank_round_trips() {
    let trees = HuffmanTrees::build(&build_corpus(), EOF_CHAR);
    let strings: Vec<Vec<u8>> = SAMPLE_STRINGS.iter().map(|s| s.to_vec()).collect();
    let packed = bank::pack(&strings, &trees, EOF_CHAR).unwrap();
    let unpacked = bank::unpack(&packed, &trees, EOF_CHAR).unwrap();
    assert_eq!(unpacked, strings);
}

#[test]
fn compressing_an_unseen_byte_sequence_reports_unknown_context_rather_than_panicking() {
    let trees = HuffmanTrees::build(&build_corpus(), EOF_CHAR);
    let mut rng = SplitMix64::new(40);
    for _ in 0..20 {
        let junk = rng.bytes(8);
        let _ = huffman_compress(&junk, &trees, EOF_CHAR);
    }
}

#[test]
fn a_non_zero_eof_char_also_round_trips() {
    // Exercises the external huffman_trees_build/huffman_compress/
    // huffman_decompress signatures with a charset whose end-of-stream
    // sentinel is not byte 0, confirming eof_char is a caller-supplied
    // parameter and not hardcoded.
    const EOF: u8 = 0xFF;
    let mut corpus = Vec::new();
    for s in SAMPLE_STRINGS {
        corpus.extend_from_slice(s);
        corpus.push(EOF);
    }
    let trees = HuffmanTrees::build(&corpus, EOF);
    for s in SAMPLE_STRINGS {
        let encoded = huffman_compress(s, &trees, EOF).unwrap();
        let (decoded, consumed) = huffman_decompress(&encoded, &trees, EOF).unwrap();
        assert_eq!(&decoded, s);
        assert_eq!(consumed, encoded.len());
    }
}
