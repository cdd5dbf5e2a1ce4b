use crate::error::{CodecError, ErrorKind, Result};

use super::tree::HuffmanTrees;
use super::{huffman_compress, huffman_decompress};

/// Packs a bank of strings, each Huffman-compressed and framed with a
/// length byte that counts itself (`compressed.len() + 1`), terminated by a
/// `0x00` length byte once every string has been written.
pub fn pack(strings: &[Vec<u8>], trees: &HuffmanTrees, eof: u8) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for s in strings {
        let compressed = huffman_compress(s, trees, eof)?;
        let len = compressed.len() + 1;
        if len > 0xFF {
            return Err(CodecError::new(ErrorKind::EncodeConstraint, out.len()));
        }
        out.push(len as u8);
        out.extend_from_slice(&compressed);
    }
    out.push(0x00);
    Ok(out)
}

/// Unpacks a string bank: reads length-prefixed chunks until a `0x00` or
/// `0xFF` length byte, decompressing each through `trees`.
pub fn unpack(data: &[u8], trees: &HuffmanTrees, eof: u8) -> Result<Vec<Vec<u8>>> {
    let mut strings = Vec::new();
    let mut pos = 0usize;
    loop {
        let len = *data.get(pos).ok_or_else(|| CodecError::new(ErrorKind::Truncated, pos))?;
        if len == 0x00 || len == 0xFF {
            break;
        }
        let body_len = len as usize - 1;
        pos += 1;
        let body = data
            .get(pos..pos + body_len)
            .ok_or_else(|| CodecError::new(ErrorKind::Truncated, pos))?;
        let (decoded, _) = huffman_decompress(body, trees, eof)?;
        strings.push(decoded);
        pos += body_len;
    }
    Ok(strings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_round_trips_several_strings() {
        use crate::huffman::tree::EOF_CHAR;
        let strings: Vec<Vec<u8>> =
            vec![b"hello".to_vec(), b"world".to_vec(), b"landstalker".to_vec()];
        let mut corpus = Vec::new();
        for s in &strings {
            corpus.extend_from_slice(s);
            corpus.push(EOF_CHAR);
        }
        let trees = HuffmanTrees::build(&corpus, EOF_CHAR);
        let packed = pack(&strings, &trees, EOF_CHAR).unwrap();
        let unpacked = unpack(&packed, &trees, EOF_CHAR).unwrap();
        assert_eq!(unpacked, strings);
    }

    #[test]
    fn empty_bank_is_just_the_terminator() {
        use crate::huffman::tree::EOF_CHAR;
        let trees = HuffmanTrees::build(&[EOF_CHAR], EOF_CHAR);
        let packed = pack(&[], &trees, EOF_CHAR).unwrap();
        assert_eq!(packed, vec![0x00]);
    }
}
