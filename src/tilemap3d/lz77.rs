use crate::bitstream::{BitReader, BitWriter};
use crate::error::{CodecError, ErrorKind, Result};

use super::dictionary::find_match;

/// One LZ77 entry over the concatenated foreground||background tile stream:
/// either a run of uncompressed tiles (`back_offset_idx == 0`) or a genuine
/// back-reference into the offset dictionary. `vertical_info` records runs
/// of identical copies repeating every `width` (or `width+1`) tiles below
/// this entry, folded in by `identify_vertical_runs`.
pub(crate) struct Lz77Entry {
    pub run_length: usize,
    pub back_offset_idx: usize,
    pub index: usize,
    pub vertical_info: Vec<(bool, u32)>,
    pub deleted: bool,
}

/// Greedily covers the tile stream with dictionary back-references,
/// merging consecutive uncompressed positions into a single entry.
/// Returns the entry list and a parallel `compressed` flag per tile.
pub(crate) fn lz77_compress(tiles: &[u16], offsets: &[u16; 14]) -> (Vec<Lz77Entry>, Vec<bool>) {
    let mut entries =
        vec![Lz77Entry { run_length: 1, back_offset_idx: 0, index: 0, vertical_info: Vec::new(), deleted: false }];
    let mut compressed = vec![false; tiles.len()];
    let mut idx = 1usize;

    while idx < tiles.len() {
        let (back_offset_idx, run_length) = find_match(tiles, idx, offsets);
        let prev_is_uncompressed = entries.last().unwrap().back_offset_idx == 0;

        if back_offset_idx != 0 || !prev_is_uncompressed {
            entries.push(Lz77Entry {
                run_length,
                back_offset_idx,
                index: idx,
                vertical_info: Vec::new(),
                deleted: false,
            });
        } else {
            entries.last_mut().unwrap().run_length += 1;
        }

        let last = entries.last().unwrap();
        if last.back_offset_idx == 0 {
            idx += 1;
        } else {
            let run = last.run_length;
            for t in compressed.iter_mut().skip(idx).take(run) {
                *t = true;
            }
            idx += run;
        }
    }
    (entries, compressed)
}

/// Folds vertically-repeating copies of `entries[index]` into its
/// `vertical_info`, marking the absorbed entries deleted. Mirrors the
/// reference encoder exactly, including considering uncompressed ("new
/// tile") entries as eligible run heads, not only genuine back-references.
fn encode_vertical_run(index: usize, tiles_len: usize, width: usize, entries: &mut [Lz77Entry]) {
    let mut count = 0u32;
    let mut right_offset = false;
    let mut begin = true;
    let target_back_offset_idx = entries[index].back_offset_idx;
    let mut next_idx = entries[index].index;
    let mut prev_idx = next_idx;

    while next_idx < tiles_len {
        next_idx += width + (right_offset as usize);
        let found = entries[index..]
            .iter()
            .position(|e| !e.deleted && e.index == next_idx && e.back_offset_idx == target_back_offset_idx);

        if let Some(rel) = found {
            count += 1;
            entries[index + rel].deleted = true;
            prev_idx = next_idx;
        } else {
            if count > 0 {
                entries[index].vertical_info.push((right_offset, count));
                count = 0;
            } else if !begin {
                break;
            }
            begin = false;
            right_offset = !right_offset;
            next_idx = prev_idx;
        }
    }
}

/// Scans every surviving entry (in order) for vertical runs, then drops the
/// entries that got absorbed into one.
pub(crate) fn identify_vertical_runs(tiles_len: usize, width: usize, mut entries: Vec<Lz77Entry>) -> Vec<Lz77Entry> {
    for i in 0..entries.len() {
        if !entries[i].deleted {
            encode_vertical_run(i, tiles_len, width, &mut entries);
        }
    }
    entries.into_iter().filter(|e| !e.deleted).collect()
}

fn serialize_vertical_rle(w: &mut BitWriter, vertical_info: &[(bool, u32)]) {
    let mut begin = true;
    for &(right, count) in vertical_info {
        if begin {
            w.write_bool(right);
            begin = false;
        } else {
            w.write_bool(true);
        }
        for _ in 1..count {
            w.write_bool(true);
        }
        w.write_bool(false);
    }
    w.write_bool(false);
}

/// Writes the LZ77 section: a run of `(gap, back_offset_idx, has_vertical)`
/// triples (plus their vertical RLE payloads), terminated by a final gap
/// chosen so pass-one decoding walks exactly past the end of the buffer.
pub(crate) fn serialize_lz77(w: &mut BitWriter, entries: &[Lz77Entry], buffer_size: usize) {
    let mut last_idx: i64 = -1;
    for entry in entries {
        w.write_ue((entry.index as i64 - last_idx - 1) as u32);
        last_idx = entry.index as i64;

        if entry.back_offset_idx < 6 {
            w.write_u(entry.back_offset_idx as u32, 3);
        } else {
            w.write_u(3, 2);
            w.write_u((entry.back_offset_idx - 6) as u32, 3);
        }

        w.write_bool(!entry.vertical_info.is_empty());
        if !entry.vertical_info.is_empty() {
            serialize_vertical_rle(w, &entry.vertical_info);
        }
    }
    if last_idx < buffer_size as i64 {
        w.write_ue((buffer_size as i64 - last_idx) as u32);
    } else {
        w.write_ue(1);
    }
}

/// Reads one dictionary index command from the 3-bit-or-5-bit encoding:
/// `0..=5` fit directly in 3 bits; `6..=13` are signaled by `3` in the top
/// 2 bits followed by `(low_bit, 2 more bits)`.
fn read_dict_index(r: &mut BitReader) -> Result<usize> {
    let idx = r.read_u(3)? as usize;
    if idx > 5 {
        let low = idx & 1;
        let rest = r.read_u(2)? as usize;
        Ok(6 + ((low << 2) | rest))
    } else {
        Ok(idx)
    }
}

fn decode_vertical_rle(r: &mut BitReader, buffer: &mut [u16], dst_addr: usize, width: usize) -> Result<()> {
    let mut row_addr = dst_addr;
    let mut width_offset = r.read_bool()? as usize;
    loop {
        loop {
            row_addr += width + width_offset;
            if row_addr >= buffer.len() {
                return Err(CodecError::new(ErrorKind::OutOfRange, r.byte_pos()));
            }
            buffer[row_addr] = buffer[dst_addr];
            if !r.read_bool()? {
                break;
            }
        }
        width_offset ^= 1;
        if !r.read_bool()? {
            break;
        }
    }
    Ok(())
}

/// Pass one of the two-pass decode: walks the gap-encoded entry stream,
/// storing each entry's literal dictionary value (including the `0xFFFF`
/// "new tile" sentinel) into the sparse buffer, expanding any vertical RLE
/// as it goes.
pub(crate) fn decode_map_buffer_pass_one(
    r: &mut BitReader,
    offsets: &[u16; 14],
    buffer_size: usize,
    width: usize,
) -> Result<Vec<u16>> {
    let mut buffer = vec![0u16; buffer_size];
    let mut dst: i64 = -1;

    loop {
        let gap = r.read_ue()? as i64 + 1;
        dst += gap;
        if dst >= buffer_size as i64 {
            break;
        }
        let dict_idx = read_dict_index(r)?;
        buffer[dst as usize] = offsets[dict_idx];
        if r.read_bool()? {
            decode_vertical_rle(r, &mut buffer, dst as usize, width)?;
        }
    }
    Ok(buffer)
}
