//! Context-sensitive Huffman compression for ROM string tables: each byte
//! is coded against a tree keyed by the byte immediately before it, so
//! common digraphs collapse to a handful of bits.

pub mod bank;
pub(crate) mod tree;

pub use tree::{HuffmanTrees, EOF_CHAR};

use crate::bitstream::{BitReader, BitWriter};
use crate::error::Result;

/// Compresses `plain` against a prebuilt tree set. The terminator (`eof`) is
/// written implicitly at the end of the stream; callers must not include it
/// in `plain`, and must pass the same `eof` the tree set was built with.
pub fn huffman_compress(plain: &[u8], trees: &HuffmanTrees, eof: u8) -> Result<Vec<u8>> {
    let mut w = BitWriter::new();
    let mut context = eof;
    for &byte in plain {
        trees.encode_symbol(context, byte, &mut w)?;
        context = byte;
    }
    trees.encode_symbol(context, eof, &mut w)?;
    Ok(w.finish_bytes())
}

/// Decompresses a Huffman stream, stopping at the terminator symbol.
/// Returns the decoded bytes (without the terminator) and the number of
/// input bytes consumed.
pub fn huffman_decompress(data: &[u8], trees: &HuffmanTrees, eof: u8) -> Result<(Vec<u8>, usize)> {
    let mut r = BitReader::new(data);
    let mut context = eof;
    let mut out = Vec::new();
    loop {
        let sym = trees.decode_symbol(context, &mut r)?;
        if sym == eof {
            break;
        }
        out.push(sym);
        context = sym;
    }
    Ok((out, r.byte_pos()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_trees(strings: &[&[u8]]) -> HuffmanTrees {
        let mut corpus = Vec::new();
        for s in strings {
            corpus.extend_from_slice(s);
            corpus.push(EOF_CHAR);
        }
        HuffmanTrees::build(&corpus, EOF_CHAR)
    }

    #[test]
    fn round_trips_a_trained_string() {
        let trees = build_trees(&[b"gumi village", b"mercator", b"greenmaze"]);
        let encoded = huffman_compress(b"mercator", &trees, EOF_CHAR).unwrap();
        let (decoded, consumed) = huffman_decompress(&encoded, &trees, EOF_CHAR).unwrap();
        assert_eq!(decoded, b"mercator");
        assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn empty_string_round_trips() {
        // Train on both a non-empty string and an empty one so the
        // EOF-context tree includes "immediately terminate" as an option.
        let trees = build_trees(&[b"x", b""]);
        let encoded = huffman_compress(b"", &trees, EOF_CHAR).unwrap();
        let (decoded, _) = huffman_decompress(&encoded, &trees, EOF_CHAR).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn unknown_context_is_reported() {
        let trees = build_trees(&[b"ab"]);
        let err = huffman_compress(b"z", &trees, EOF_CHAR).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::UnknownContext);
    }
}
