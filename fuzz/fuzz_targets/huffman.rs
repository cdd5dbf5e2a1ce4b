#![no_main]
use libfuzzer_sys::fuzz_target;

use landstalker_codec::{huffman_decompress, HuffmanTrees, EOF_CHAR};

// Splits the input three ways: an offsets table, the tree topology/symbol
// blob it indexes into, and a compressed stream, so both parsers (the table
// layout, then symbol decoding against whatever tree came out of it) get
// exercised on arbitrary bytes.
fuzz_target!(|data: &[u8]| {
    if data.len() < 6 {
        return;
    }
    let third = data.len() / 3;
    let offsets_len = third - (third % 2);
    if offsets_len == 0 {
        return;
    }
    let (offsets, rest) = data.split_at(offsets_len);
    let trees_len = rest.len() / 2;
    let (trees_bytes, stream) = rest.split_at(trees_len);
    if let Ok(trees) = HuffmanTrees::parse(offsets, trees_bytes) {
        let _ = huffman_decompress(stream, &trees, EOF_CHAR);
    }
});
