use crate::bitstream::{BitReader, BitWriter};
use crate::error::Result;

/// One run-length entry: `extra` repeats of `pattern` beyond the first.
pub(crate) fn encode_heightmap(heightmap: &[u16]) -> Vec<(u32, u16)> {
    let mut runs: Vec<(u32, u16)> = Vec::new();
    for &h in heightmap {
        match runs.last_mut() {
            Some((extra, pattern)) if *pattern == h => *extra += 1,
            _ => runs.push((0, h)),
        }
    }
    runs
}

/// Writes the heightmap section: a 2-byte `(width, height)` header, then
/// each run as a 16-bit pattern followed by a byte-chain run-length (a
/// repeated `0xFF` prefix for counts of 255 or more, terminated by the
/// remainder).
pub(crate) fn serialize_heightmap(w: &mut BitWriter, hm_width: u8, hm_height: u8, runs: &[(u32, u16)]) {
    w.write_u(hm_width as u32, 8);
    w.write_u(hm_height as u32, 8);
    for &(extra, pattern) in runs {
        w.write_u(pattern as u32, 16);
        let mut remaining = extra;
        while remaining >= 0xFF {
            w.write_u(0xFF, 8);
            remaining -= 0xFF;
        }
        w.write_u(remaining, 8);
    }
}

pub(crate) fn decode_heightmap(r: &mut BitReader) -> Result<(u8, u8, Vec<u16>)> {
    let hm_width = r.read_u(8)? as u8;
    let hm_height = r.read_u(8)? as u8;
    let size = hm_width as usize * hm_height as usize;
    let mut heightmap = vec![0u16; size];

    let mut pattern = 0u16;
    let mut rle_count: i64 = 0;
    for cell in heightmap.iter_mut() {
        if rle_count == 0 {
            pattern = r.read_u(16)? as u16;
            rle_count = 1;
            loop {
                let chunk = r.read_u(8)?;
                rle_count += chunk as i64;
                if chunk != 0xFF {
                    break;
                }
            }
        }
        rle_count -= 1;
        *cell = pattern;
    }
    Ok((hm_width, hm_height, heightmap))
}
