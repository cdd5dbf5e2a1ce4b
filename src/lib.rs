//! Bit-exact codecs for Landstalker (Sega Mega Drive) ROM assets.
//!
//! Five independent formats, sharing only the bit-stream primitives in
//! [`bitstream`]:
//!
//! - [`lz77`] — the bounded-window LZ77 variant used to compress most raw
//!   asset blobs before any of the higher-level codecs below are applied.
//! - [`blockset`] — 16x16 tile blocksets (attribute run masks + an MTF tile
//!   index queue).
//! - [`tilemap2d`] — overworld-style 2D tilemaps (RLE/increment tile index
//!   state machine).
//! - [`tilemap3d`] — isometric room tilemaps (a learned LZ77 offset
//!   dictionary plus a separate heightmap plane).
//! - [`huffman`] — the context-sensitive Huffman compressor used for
//!   in-game string banks.

mod bitstream;
mod blockset;
mod error;
mod huffman;
mod lz77;
mod tile;
mod tilemap2d;
mod tilemap3d;

pub use bitstream::{BitReader, BitWriter};
pub use blockset::{blockset_decode, blockset_encode};
pub use error::{CodecError, ErrorKind, Result};
pub use huffman::{bank, huffman_compress, huffman_decompress, HuffmanTrees, EOF_CHAR};
pub use lz77::{lz77_decode, lz77_encode};
pub use tile::{Block, Tile};
pub use tilemap2d::{tilemap2d_decode, tilemap2d_encode, Tilemap2D};
pub use tilemap3d::{tilemap3d_decode, tilemap3d_encode, Tilemap3D};
