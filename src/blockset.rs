use crate::bitstream::{BitReader, BitWriter};
use crate::error::{CodecError, ErrorKind, Result};
use crate::tile::{Attr, Block, Tile};

const ATTR_ORDER: [Attr; 3] = [Attr::Priority, Attr::Vflip, Attr::Hflip];
const QUEUE_SIZE: usize = 16;

/// Decodes a flat run of 16-bit tile descriptors packed as blockset data:
/// a block count, three exp-Golomb attribute-run masks, then an MTF-coded
/// tile-index stream with a "sibling tile" shortcut for adjacent pairs.
pub fn blockset_decode(data: &[u8]) -> Result<Vec<Block>> {
    let mut r = BitReader::new(data);
    let total_blocks = r.read_u(16)? as usize;
    let tile_count = total_blocks * 4;
    let mut tiles = vec![Tile::default(); tile_count];

    for &attr in &ATTR_ORDER {
        mask_tiles(&mut tiles, attr, &mut r)?;
    }

    let mut queue = [0u16; QUEUE_SIZE];
    let mut i = 0usize;
    while i < tiles.len() {
        let t1 = decode_tile_index(&mut r, &mut queue)?;
        tiles[i].idx = t1;
        if r.read_bool()? {
            tiles[i + 1].idx = if tiles[i].hflip { t1.wrapping_sub(1) } else { t1.wrapping_add(1) };
        } else {
            tiles[i + 1].idx = decode_tile_index(&mut r, &mut queue)?;
        }
        i += 2;
    }

    Ok(tiles.chunks_exact(4).map(|c| [c[0], c[1], c[2], c[3]]).collect())
}

/// Encodes a flat sequence of blocks (4 tiles each) into blockset data.
pub fn blockset_encode(blocks: &[Block]) -> Result<Vec<u8>> {
    if blocks.len() > 0xFFFF {
        return Err(CodecError::new(ErrorKind::EncodeConstraint, 0));
    }
    let tiles: Vec<Tile> = blocks.iter().flat_map(|b| b.iter().copied()).collect();

    let mut w = BitWriter::new();
    w.write_u(blocks.len() as u32, 16);

    for &attr in &ATTR_ORDER {
        encode_mask(&mut w, &tiles, attr);
    }

    let mut queue = [0u16; QUEUE_SIZE];
    let mut i = 0usize;
    while i < tiles.len() {
        encode_tile_index(&mut w, tiles[i].idx, &mut queue);
        let sibling = tiles[i + 1].idx
            == if tiles[i].hflip { tiles[i].idx.wrapping_sub(1) } else { tiles[i].idx.wrapping_add(1) };
        w.write_bool(sibling);
        if !sibling {
            encode_tile_index(&mut w, tiles[i + 1].idx, &mut queue);
        }
        i += 2;
    }

    Ok(w.finish_bytes())
}

/// Decodes one attribute's run-length mask and applies it to `tiles`.
///
/// `set_attr` toggles *before* each exp-Golomb read (so the first run, using
/// the first length value, is the "off" run), `num` accumulates the read
/// value and resets to 1 after each toggle — this exact shape is the wire
/// contract, not an implementation detail.
fn mask_tiles(tiles: &mut [Tile], attr: Attr, r: &mut BitReader) -> Result<()> {
    let mut set_attr = true;
    let mut i = 0usize;
    let mut num = 0u32;

    while i < tiles.len() {
        set_attr = !set_attr;
        num += r.read_ue()?;
        let num_usize = num as usize;
        if i + num_usize > tiles.len() {
            return Err(CodecError::new(ErrorKind::AttributeOverflow, r.byte_pos()));
        }
        if set_attr {
            for t in &mut tiles[i..i + num_usize] {
                t.set_attr(attr);
            }
        }
        i += num_usize;
        num = 1;
    }
    Ok(())
}

fn encode_mask(w: &mut BitWriter, tiles: &[Tile], attr: Attr) {
    let mut current_run = 0u32;
    let mut tile_has_attribute = false;

    for t in tiles {
        let new_state = t.has_attr(attr);
        if new_state != tile_has_attribute {
            tile_has_attribute = new_state;
            w.write_ue(current_run);
            current_run = 0;
        } else {
            current_run += 1;
        }
    }
    // The trailing run must always be flushed, even when its encoded length is
    // 0 (a transition on the very last tile leaves `current_run` at 0, but the
    // decoder's loop still expects one more `read_ue` to reach `tiles.len()`).
    if !tiles.is_empty() {
        w.write_ue(current_run);
    }
}

/// Decodes one tile index via the 16-slot move-to-front queue: a `1` flag
/// bit plus 4-bit queue index means "reuse and promote"; a `0` flag plus an
/// 11-bit literal means "new value, push to front, drop the oldest slot".
fn decode_tile_index(r: &mut BitReader, queue: &mut [u16; QUEUE_SIZE]) -> Result<u16> {
    if r.read_bool()? {
        let idx = r.read_u(4)? as usize;
        let val = queue[idx];
        queue.copy_within(0..idx, 1);
        queue[0] = val;
    } else {
        let val = r.read_u(11)? as u16;
        queue.copy_within(0..QUEUE_SIZE - 1, 1);
        queue[0] = val;
    }
    Ok(queue[0])
}

fn encode_tile_index(w: &mut BitWriter, tile_index: u16, queue: &mut [u16; QUEUE_SIZE]) {
    if let Some(idx) = queue.iter().position(|&v| v == tile_index) {
        w.write_bool(true);
        w.write_u(idx as u32, 4);
        queue.copy_within(0..idx, 1);
        queue[0] = tile_index;
    } else {
        w.write_bool(false);
        w.write_u(tile_index as u32, 11);
        queue.copy_within(0..QUEUE_SIZE - 1, 1);
        queue[0] = tile_index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_example_round_trips() {
        let block: Block = [Tile::default(); 4];
        let encoded = blockset_encode(&[block]).unwrap();
        let decoded = blockset_decode(&encoded).unwrap();
        assert_eq!(decoded, vec![block]);
    }

    #[test]
    fn header_encodes_block_count() {
        let blocks = vec![[Tile::default(); 4]; 3];
        let encoded = blockset_encode(&blocks).unwrap();
        assert_eq!(u16::from_be_bytes([encoded[0], encoded[1]]), 3);
    }

    #[test]
    fn round_trips_mixed_attributes_and_indices() {
        let mut blocks = Vec::new();
        for b in 0..20u16 {
            let mk = |i: u16| Tile { idx: (b * 4 + i) & 0x7FF, hflip: i % 2 == 0, vflip: b % 3 == 0, priority: b == 5 };
            blocks.push([mk(0), mk(1), mk(2), mk(3)]);
        }
        let encoded = blockset_encode(&blocks).unwrap();
        let decoded = blockset_decode(&encoded).unwrap();
        assert_eq!(decoded, blocks);
    }

    #[test]
    fn attribute_transition_on_the_last_tile_still_round_trips() {
        // hflip flips on every tile, so the final tile's state differs from
        // its predecessor: the trailing run's encoded length is 0, which must
        // still be flushed rather than dropped.
        let mk = |i: u16| Tile { idx: i, hflip: i % 2 == 0, vflip: false, priority: false };
        let block: Block = [mk(0), mk(1), mk(2), mk(3)];
        let encoded = blockset_encode(&[block]).unwrap();
        let decoded = blockset_decode(&encoded).unwrap();
        assert_eq!(decoded, vec![block]);
    }

    #[test]
    fn sibling_shortcut_used_for_adjacent_indices() {
        let block: Block = [
            Tile { idx: 5, hflip: false, vflip: false, priority: false },
            Tile { idx: 6, hflip: false, vflip: false, priority: false },
            Tile { idx: 0, hflip: false, vflip: false, priority: false },
            Tile { idx: 0, hflip: false, vflip: false, priority: false },
        ];
        let encoded = blockset_encode(&[block]).unwrap();
        let decoded = blockset_decode(&encoded).unwrap();
        assert_eq!(decoded, vec![block]);
    }
}
