use crate::bitstream::{BitReader, BitWriter};
use crate::error::{CodecError, ErrorKind, Result};
use crate::tile::Tile;

const MODE_COPY_TILE: u8 = 0x00;
const MODE_RLE_TILE_RUN: u8 = 0x40;
const MODE_RLE_LAST_RUN: u8 = 0x80;
const MODE_RLE_INCREMENT_RUN: u8 = 0xC0;
const MODE_MASK: u8 = 0xC0;

/// A rectangular, row-major grid of tiles compressed with an attribute-run
/// RLE section followed by a 4-mode tile-index state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tilemap2D {
    pub width: u8,
    pub height: u8,
    pub tiles: Vec<Tile>,
}

impl Tilemap2D {
    pub fn new(width: u8, height: u8, tiles: Vec<Tile>) -> Self {
        Self { width, height, tiles }
    }
}

enum Mode {
    CopyTile,
    RleTileRun,
    RleLastRun,
    RleIncrementRun,
}

fn mode_of(byte: u8) -> Mode {
    match byte & MODE_MASK {
        MODE_COPY_TILE => Mode::CopyTile,
        MODE_RLE_TILE_RUN => Mode::RleTileRun,
        MODE_RLE_LAST_RUN => Mode::RleLastRun,
        _ => Mode::RleIncrementRun,
    }
}

struct DecodeState {
    tiles: Vec<Tile>,
    tile_idx: usize,
    last: Option<u16>,
    incr: Option<u16>,
    done: bool,
}

/// Decodes a Tilemap2D asset, returning the model plus the number of bytes
/// consumed from `data`.
pub fn tilemap2d_decode(data: &[u8]) -> Result<(Tilemap2D, usize)> {
    if data.len() < 2 {
        return Err(CodecError::new(ErrorKind::Truncated, data.len()));
    }
    let width = data[0];
    let height = data[1];
    let total = width as usize * height as usize;
    let mut idx = 2usize;

    let mut tiles = vec![Tile::default(); total];
    idx = decode_tile_attributes(data, idx, &mut tiles)?;

    let mut ds = DecodeState { tiles, tile_idx: 0, last: None, incr: None, done: false };
    while !ds.done {
        let byte = *data.get(idx).ok_or_else(|| CodecError::new(ErrorKind::Truncated, idx))?;
        idx = match mode_of(byte) {
            Mode::CopyTile => decode_copy_tile(data, idx, &mut ds)?,
            Mode::RleTileRun => decode_rle_tile_run(data, idx, &mut ds)?,
            Mode::RleLastRun => decode_rle_last_run(data, idx, &mut ds)?,
            Mode::RleIncrementRun => decode_rle_increment_run(data, idx, &mut ds)?,
        };
    }

    Ok((Tilemap2D { width, height, tiles: ds.tiles }, idx))
}

fn decode_tile_attributes(data: &[u8], mut idx: usize, tiles: &mut [Tile]) -> Result<usize> {
    let mut i = 0usize;
    loop {
        let b0 = *data.get(idx).ok_or_else(|| CodecError::new(ErrorKind::Truncated, idx))?;
        let attrs = ((b0 & 0xF8) as u16) << 8;
        let mut length = (b0 & 0x03) as u32;
        let two_byte = b0 & 0x04 == 0;
        idx += 1;
        if two_byte {
            let b1 = *data.get(idx).ok_or_else(|| CodecError::new(ErrorKind::Truncated, idx))?;
            length = (length << 8) | b1 as u32;
            idx += 1;
            if length == 0 {
                return Ok(idx);
            }
        }
        let count = length as usize + 1;
        if i + count > tiles.len() {
            return Err(CodecError::new(ErrorKind::AttributeOverflow, idx));
        }
        for _ in 0..count {
            tiles[i] = Tile::from(attrs);
            i += 1;
        }
    }
}

fn decode_copy_tile(data: &[u8], idx: usize, ds: &mut DecodeState) -> Result<usize> {
    let b0 = *data.get(idx).ok_or_else(|| CodecError::new(ErrorKind::Truncated, idx))?;
    let b1 = *data.get(idx + 1).ok_or_else(|| CodecError::new(ErrorKind::Truncated, idx + 1))?;
    let val = (u16::from_be_bytes([b0, b1])) & 0x7FF;
    let idx = idx + 2;
    if val == 0x7FF {
        ds.done = true;
    } else {
        require_tile_slot(ds)?;
        ds.tiles[ds.tile_idx].idx = val;
        ds.tile_idx += 1;
    }
    Ok(idx)
}

fn decode_rle_tile_run(data: &[u8], idx: usize, ds: &mut DecodeState) -> Result<usize> {
    let b0 = *data.get(idx).ok_or_else(|| CodecError::new(ErrorKind::Truncated, idx))?;
    let b1 = *data.get(idx + 1).ok_or_else(|| CodecError::new(ErrorKind::Truncated, idx + 1))?;
    let count = ((b0 >> 3) & 7) as usize;
    let val = (u16::from_be_bytes([b0, b1])) & 0x7FF;
    let idx = idx + 2;
    for _ in 0..=count {
        require_tile_slot(ds)?;
        ds.tiles[ds.tile_idx].idx = val;
        ds.tile_idx += 1;
    }
    ds.last = Some(val);
    if ds.incr.is_none() {
        ds.incr = Some(val);
    }
    Ok(idx)
}

fn decode_rle_last_run(data: &[u8], idx: usize, ds: &mut DecodeState) -> Result<usize> {
    let b0 = *data.get(idx).ok_or_else(|| CodecError::new(ErrorKind::Truncated, idx))?;
    let count = (b0 & 0x3F) as usize;
    let last = ds.last.ok_or_else(|| CodecError::new(ErrorKind::InvalidMarker, idx))?;
    for _ in 0..=count {
        require_tile_slot(ds)?;
        ds.tiles[ds.tile_idx].idx = last;
        ds.tile_idx += 1;
    }
    Ok(idx + 1)
}

fn decode_rle_increment_run(data: &[u8], idx: usize, ds: &mut DecodeState) -> Result<usize> {
    let b0 = *data.get(idx).ok_or_else(|| CodecError::new(ErrorKind::Truncated, idx))?;
    let count = (b0 & 0x3F) as usize;
    let mut incr = ds.incr.ok_or_else(|| CodecError::new(ErrorKind::InvalidMarker, idx))?;
    for _ in 0..=count {
        incr = incr.wrapping_add(1);
        require_tile_slot(ds)?;
        ds.tiles[ds.tile_idx].idx = incr;
        ds.tile_idx += 1;
    }
    ds.incr = Some(incr);
    Ok(idx + 1)
}

fn require_tile_slot(ds: &DecodeState) -> Result<()> {
    if ds.tile_idx >= ds.tiles.len() {
        return Err(CodecError::new(ErrorKind::AttributeOverflow, ds.tile_idx));
    }
    Ok(())
}

struct EncodeState<'a> {
    out: Vec<u8>,
    tiles: &'a [Tile],
    tile_idx: usize,
    last: u16,
    incr: u16,
}

/// Encodes a Tilemap2D model into its wire form.
pub fn tilemap2d_encode(map: &Tilemap2D) -> Result<Vec<u8>> {
    if map.tiles.len() != map.width as usize * map.height as usize {
        return Err(CodecError::new(ErrorKind::EncodeConstraint, 0));
    }
    let mut out = vec![map.width, map.height];
    encode_tile_attributes(&mut out, &map.tiles);
    out = encode_tile_indices(out, &map.tiles)?;
    Ok(out)
}

fn encode_tile_attributes(out: &mut Vec<u8>, tiles: &[Tile]) {
    let mut idx = 0usize;
    while idx < tiles.len() {
        let mut count = 0usize;
        let prev_attrs = ((u16::from(tiles[idx]) & 0xF800) >> 8) as u8;
        while idx + count + 1 < tiles.len() && count < 0x400 {
            let cur_attrs = ((u16::from(tiles[idx + count + 1]) & 0xF800) >> 8) as u8;
            if prev_attrs != cur_attrs {
                break;
            }
            count += 1;
        }
        idx += count + 1;
        if count > 4 {
            out.push(prev_attrs | ((count >> 8) as u8));
            out.push((count & 0xFF) as u8);
        } else {
            out.push(prev_attrs | 4 | (count as u8 & 0x03));
        }
    }
    out.extend_from_slice(&[0x00, 0x00]);
}

fn encode_tile_indices(out: Vec<u8>, tiles: &[Tile]) -> Result<Vec<u8>> {
    if tiles.is_empty() {
        return Err(CodecError::new(ErrorKind::EncodeConstraint, 0));
    }
    let mut es = EncodeState { out, tiles, tile_idx: 0, last: tiles[0].idx, incr: tiles[0].idx };
    encode_rle_tile_run(&mut es);

    while es.tile_idx < tiles.len() {
        let start_tile = tiles[es.tile_idx].idx;
        if start_tile == es.last {
            encode_rle_last_run(&mut es);
        } else if start_tile == es.incr.wrapping_add(1) {
            encode_rle_increment_run(&mut es);
        } else if es.tile_idx + 1 < tiles.len() && start_tile == tiles[es.tile_idx + 1].idx {
            encode_rle_tile_run(&mut es);
        } else {
            encode_copy_tile(&mut es);
        }
    }

    es.out.extend_from_slice(&[0x07, 0xFF]);
    Ok(es.out)
}

fn encode_copy_tile(es: &mut EncodeState) {
    let start_tile = es.tiles[es.tile_idx].idx;
    es.out.extend_from_slice(&((MODE_COPY_TILE as u16) << 8 | start_tile).to_be_bytes());
    es.tile_idx += 1;
}

fn encode_rle_tile_run(es: &mut EncodeState) {
    let start_tile = es.tiles[es.tile_idx].idx;
    let mut count = 0usize;
    let mut j = es.tile_idx + 1;
    while count < 7 && j < es.tiles.len() && es.tiles[j].idx == start_tile {
        count += 1;
        j += 1;
    }
    es.out.push(MODE_RLE_TILE_RUN | (((count as u8) & 0x07) << 3) | (((start_tile >> 8) & 7) as u8));
    es.out.push((start_tile & 0xFF) as u8);
    es.last = start_tile;
    es.tile_idx += count + 1;
}

fn encode_rle_last_run(es: &mut EncodeState) {
    let mut count = 0usize;
    let mut j = es.tile_idx + 1;
    while count <= 0x3F && j < es.tiles.len() && es.tiles[j].idx == es.last {
        count += 1;
        j += 1;
    }
    es.out.push(MODE_RLE_LAST_RUN | count as u8);
    es.tile_idx += count + 1;
}

fn encode_rle_increment_run(es: &mut EncodeState) {
    let mut j = es.tile_idx + 1;
    es.incr = es.incr.wrapping_add(1);
    let mut count = 0usize;
    while count <= 0x3F && j < es.tiles.len() {
        let cur_tile = es.tiles[j].idx;
        if cur_tile != es.incr.wrapping_add(1) {
            break;
        }
        es.incr = es.incr.wrapping_add(1);
        count += 1;
        j += 1;
    }
    es.out.push(MODE_RLE_INCREMENT_RUN | count as u8);
    es.tile_idx += count + 1;
}
