//! The foreground/background tilemap codec: an LZ77-over-a-learned-offset-
//! dictionary scheme for the tile planes, plus a separate run-length-coded
//! heightmap plane.

mod dictionary;
mod heightmap;
mod lz77;

use crate::bitstream::{BitReader, BitWriter};
use crate::error::{CodecError, ErrorKind, Result};

use dictionary::{bit_length, make_offset_dictionary, make_tile_dictionary, TileDict, TileEntry};
use heightmap::{decode_heightmap, encode_heightmap, serialize_heightmap};
use lz77::{decode_map_buffer_pass_one, identify_vertical_runs, lz77_compress, serialize_lz77, Lz77Entry};

/// A rectangular foreground/background tile region plus its heightmap.
/// `foreground`/`background` are `width * height` raw tile-slot values (not
/// `Tile`: this codec's 16-bit slots are dictionary-compressed indices into
/// the sprite/tile bank, not VDP tile descriptors).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tilemap3D {
    pub left: u8,
    pub top: u8,
    pub width: usize,
    pub height: usize,
    pub foreground: Vec<u16>,
    pub background: Vec<u16>,
    pub hm_width: u8,
    pub hm_height: u8,
    pub heightmap: Vec<u16>,
}

fn serialize_header(w: &mut BitWriter, map: &Tilemap3D, dict: TileDict, offsets: &[u16; 14]) {
    w.write_u(map.left as u32, 8);
    w.write_u(map.top as u32, 8);
    w.write_u((map.width - 1) as u32, 8);
    w.write_u((map.height * 2 - 1) as u32, 8);
    w.write_u(dict.short as u32, 10);
    w.write_u(dict.long as u32, 10);
    for &offset in &offsets[dictionary::FIXED_SLOT_COUNT..] {
        w.write_u(offset as u32, 12);
    }
}

fn decode_header(r: &mut BitReader) -> Result<(u8, u8, usize, usize)> {
    let left = r.read_u(8)? as u8;
    let top = r.read_u(8)? as u8;
    let width = r.read_u(8)? as usize + 1;
    let height = (r.read_u(8)? as usize + 1) / 2;
    Ok((left, top, width, height))
}

fn decode_dictionaries(r: &mut BitReader, width: usize) -> Result<([u16; 14], TileDict)> {
    let short = r.read_u(10)? as u16;
    let long = r.read_u(10)? as u16;

    let mut offsets = [0u16; 14];
    offsets[0] = 0xFFFF;
    offsets[1] = 1;
    offsets[2] = 2;
    offsets[3] = width as u16;
    offsets[4] = (width * 2) as u16;
    offsets[5] = (width + 1) as u16;
    for slot in offsets[dictionary::FIXED_SLOT_COUNT..].iter_mut() {
        *slot = r.read_u(12)? as u16;
    }
    Ok((offsets, TileDict { long, short }))
}

fn serialize_tile_entries(w: &mut BitWriter, entries: &[TileEntry]) {
    for entry in entries {
        match *entry {
            TileEntry::DecodeLong { val, len } => {
                w.write_u(0, 2);
                if len > 0 {
                    w.write_u(val as u32, len);
                }
            }
            TileEntry::DecodeShort { val, len } => {
                w.write_u(1, 2);
                if len > 0 {
                    w.write_u(val as u32, len);
                }
            }
            TileEntry::IncrementLong => w.write_u(2, 2),
            TileEntry::IncrementShort => w.write_u(3, 2),
        }
    }
}

/// Pass two of the two-pass decode: walks the buffer left to right. A cell
/// holding a genuine dictionary offset is the head of a copy run; a cell
/// holding `0` (untouched) or `0xFFFF` (explicit "new tile" marker) needs a
/// 2-bit tile dictionary command.
fn decode_maps_pass_two(r: &mut BitReader, buffer: &mut [u16], dict: TileDict) -> Result<()> {
    let mut long_counter = dict.long as u32;
    let mut short_counter = dict.short as u32;
    let mut i = 0usize;

    while i < buffer.len() {
        if buffer[i] != 0xFFFF && buffer[i] != 0 {
            let offset = i as i64 - buffer[i] as i64;
            if offset < 0 {
                return Err(CodecError::new(ErrorKind::InvalidReference, r.byte_pos()));
            }
            let mut src = offset as usize;
            loop {
                buffer[i] = buffer[src];
                i += 1;
                src += 1;
                if i >= buffer.len() || buffer[i] != 0 {
                    break;
                }
            }
        } else {
            while i < buffer.len() && (buffer[i] == 0 || buffer[i] == 0xFFFF) {
                let cmd = r.read_u(2)?;
                let value: u32 = match cmd {
                    0 => {
                        if long_counter != 0 {
                            r.read_u(bit_length(long_counter))?
                        } else {
                            0
                        }
                    }
                    1 => {
                        if short_counter != dict.short as u32 {
                            let diff = short_counter - dict.short as u32;
                            r.read_u(bit_length(diff))? + dict.short as u32
                        } else {
                            dict.short as u32
                        }
                    }
                    2 => {
                        let v = long_counter;
                        long_counter += 1;
                        v
                    }
                    _ => {
                        let v = short_counter;
                        short_counter += 1;
                        v
                    }
                };
                buffer[i] = value as u16;
                i += 1;
            }
        }
    }
    Ok(())
}

/// Encodes a foreground/background tile plane plus heightmap into the
/// dictionary-LZ77 wire format.
pub fn tilemap3d_encode(map: &Tilemap3D) -> Result<Vec<u8>> {
    let plane_size = map.width * map.height;
    if map.foreground.len() != plane_size || map.background.len() != plane_size {
        return Err(CodecError::new(ErrorKind::EncodeConstraint, 0));
    }
    if map.heightmap.len() != map.hm_width as usize * map.hm_height as usize {
        return Err(CodecError::new(ErrorKind::EncodeConstraint, 0));
    }

    let tiles: Vec<u16> = map.foreground.iter().chain(map.background.iter()).copied().collect();
    let offsets = make_offset_dictionary(&tiles, map.width);
    let (entries, compressed) = lz77_compress(&tiles, &offsets);
    let entries: Vec<Lz77Entry> = identify_vertical_runs(tiles.len(), map.width, entries);
    let tile_dict = make_tile_dictionary(&tiles, &compressed);
    let tile_entries = dictionary::encode_tiles(&tiles, &compressed, tile_dict);
    let hm_runs = encode_heightmap(&map.heightmap);

    let mut w = BitWriter::new();
    serialize_header(&mut w, map, tile_dict, &offsets);
    serialize_lz77(&mut w, &entries, tiles.len());
    serialize_tile_entries(&mut w, &tile_entries);
    w.byte_align_write();
    serialize_heightmap(&mut w, map.hm_width, map.hm_height, &hm_runs);
    Ok(w.finish_bytes())
}

/// Decodes a dictionary-LZ77 tilemap, returning the map and the number of
/// input bytes consumed.
pub fn tilemap3d_decode(data: &[u8]) -> Result<(Tilemap3D, usize)> {
    let mut r = BitReader::new(data);
    let (left, top, width, height) = decode_header(&mut r)?;
    let (offsets, tile_dict) = decode_dictionaries(&mut r, width)?;

    let buffer_size = width * height * 2;
    let mut buffer = decode_map_buffer_pass_one(&mut r, &offsets, buffer_size, width)?;
    decode_maps_pass_two(&mut r, &mut buffer, tile_dict)?;
    r.byte_align_read();

    let plane_size = width * height;
    let foreground = buffer[..plane_size].to_vec();
    let background = buffer[plane_size..].to_vec();
    let (hm_width, hm_height, heightmap) = decode_heightmap(&mut r)?;

    Ok((
        Tilemap3D { left, top, width, height, foreground, background, hm_width, hm_height, heightmap },
        r.byte_pos(),
    ))
}
