use std::collections::{BinaryHeap, HashMap};
use std::cmp::Reverse;

use crate::bitstream::{BitReader, BitWriter};
use crate::error::{CodecError, ErrorKind, Result};

enum Node {
    Leaf(u8),
    Internal { left: usize, right: usize },
}

/// A single context's Huffman tree, stored as a flat arena (no parent
/// pointers) so decode is a plain recursive preorder walk.
pub(crate) struct Tree {
    nodes: Vec<Node>,
    root: usize,
}

impl Tree {
    /// Builds a tree from symbol frequencies, merging the two lowest-weight
    /// nodes repeatedly. Ties are broken by insertion order (the order
    /// `freqs` lists its symbols, then the order internal nodes are
    /// created) so construction is deterministic regardless of hashing.
    fn build(freqs: &[(u8, u32)]) -> Self {
        let mut nodes = Vec::new();
        let mut heap: BinaryHeap<Reverse<(u32, u64, usize)>> = BinaryHeap::new();
        let mut order: u64 = 0;

        for &(sym, freq) in freqs {
            let idx = nodes.len();
            nodes.push(Node::Leaf(sym));
            heap.push(Reverse((freq, order, idx)));
            order += 1;
        }

        if heap.is_empty() {
            return Tree { nodes, root: usize::MAX };
        }

        while heap.len() > 1 {
            let Reverse((f1, _, i1)) = heap.pop().unwrap();
            let Reverse((f2, _, i2)) = heap.pop().unwrap();
            let new_idx = nodes.len();
            nodes.push(Node::Internal { left: i1, right: i2 });
            heap.push(Reverse((f1 + f2, order, new_idx)));
            order += 1;
        }
        let Reverse((_, _, root)) = heap.pop().unwrap();
        Tree { nodes, root }
    }

    fn is_single_leaf(&self) -> bool {
        matches!(self.nodes.get(self.root), Some(Node::Leaf(_)))
    }

    /// Writes `symbol`'s path from the root as a bit string. A single-leaf
    /// tree (one symbol ever followed this context) writes nothing, but
    /// still rejects a symbol that isn't the one that tree was built for.
    fn encode_symbol(&self, symbol: u8, w: &mut BitWriter) -> Result<()> {
        let mut path = Vec::new();
        if !find_path(&self.nodes, self.root, symbol, &mut path) {
            return Err(CodecError::new(ErrorKind::UnknownContext, w.byte_pos()));
        }
        if self.is_single_leaf() {
            return Ok(());
        }
        for bit in path {
            w.write_bool(bit);
        }
        Ok(())
    }

    fn decode_symbol(&self, r: &mut BitReader) -> Result<u8> {
        let mut idx = self.root;
        loop {
            match self.nodes.get(idx) {
                Some(Node::Leaf(sym)) => return Ok(*sym),
                Some(Node::Internal { left, right }) => {
                    idx = if r.read_bool()? { *right } else { *left };
                }
                None => return Err(CodecError::new(ErrorKind::InvalidMarker, r.byte_pos())),
            }
        }
    }

    /// Splits this tree into its preorder leaf symbols (reversed) and its
    /// byte-aligned preorder bit topology — the two pieces a context's tree
    /// is stored as on the wire, so a decoder can walk the topology forward
    /// while reading symbols backward from just below wherever it's placed.
    fn encode_tree(&self) -> (Vec<u8>, Vec<u8>) {
        let mut symbols = Vec::new();
        let mut w = BitWriter::new();
        encode_node(&self.nodes, self.root, &mut symbols, &mut w);
        symbols.reverse();
        (symbols, w.finish_bytes())
    }

    /// Reconstructs a tree whose topology starts at byte `offset` of
    /// `trees_bytes` and whose leaf symbols are read backward starting at
    /// `trees_bytes[offset - 1]`.
    fn decode_tree(trees_bytes: &[u8], offset: usize) -> Result<Self> {
        if offset > trees_bytes.len() {
            return Err(CodecError::new(ErrorKind::Truncated, offset));
        }
        let mut r = BitReader::new(&trees_bytes[offset..]);
        let mut next_sym = offset as isize - 1;
        let mut nodes = Vec::new();
        let root = parse_node(&mut r, trees_bytes, &mut next_sym, &mut nodes)?;
        Ok(Tree { nodes, root })
    }
}

fn find_path(nodes: &[Node], idx: usize, symbol: u8, path: &mut Vec<bool>) -> bool {
    match &nodes[idx] {
        Node::Leaf(sym) => *sym == symbol,
        Node::Internal { left, right } => {
            path.push(false);
            if find_path(nodes, *left, symbol, path) {
                return true;
            }
            path.pop();
            path.push(true);
            if find_path(nodes, *right, symbol, path) {
                return true;
            }
            path.pop();
            false
        }
    }
}

/// Preorder walk: `0` marks an internal node (recurse left then right), `1`
/// marks a leaf and pushes its symbol onto `symbols` (in preorder, so the
/// caller reverses before storing — the wire format reads them back-to-front).
fn encode_node(nodes: &[Node], idx: usize, symbols: &mut Vec<u8>, w: &mut BitWriter) {
    match &nodes[idx] {
        Node::Leaf(sym) => {
            w.write_bool(true);
            symbols.push(*sym);
        }
        Node::Internal { left, right } => {
            w.write_bool(false);
            encode_node(nodes, *left, symbols, w);
            encode_node(nodes, *right, symbols, w);
        }
    }
}

/// Mirrors `encode_node`: a `1` bit consumes the next symbol from
/// `trees_bytes[*next_sym]` and decrements the cursor, a `0` bit recurses.
fn parse_node(r: &mut BitReader, trees_bytes: &[u8], next_sym: &mut isize, nodes: &mut Vec<Node>) -> Result<usize> {
    if r.read_bool()? {
        if *next_sym < 0 {
            return Err(CodecError::new(ErrorKind::Truncated, r.byte_pos()));
        }
        let sym = trees_bytes[*next_sym as usize];
        *next_sym -= 1;
        nodes.push(Node::Leaf(sym));
        Ok(nodes.len() - 1)
    } else {
        let placeholder = nodes.len();
        nodes.push(Node::Internal { left: 0, right: 0 });
        let left = parse_node(r, trees_bytes, next_sym, nodes)?;
        let right = parse_node(r, trees_bytes, next_sym, nodes)?;
        nodes[placeholder] = Node::Internal { left, right };
        Ok(placeholder)
    }
}

/// One tree per context byte (the byte immediately preceding the symbol
/// being coded). The byte that starts a string and the byte that
/// terminates one are the same sentinel value, the caller's `eof_char` —
/// named per-call rather than stored here, since the tree topology itself
/// doesn't depend on which context value plays that role.
pub struct HuffmanTrees {
    pub(crate) trees: HashMap<u8, Tree>,
}

/// The conventional terminator used by this crate's own tests and fixtures
/// when a charset doesn't otherwise dictate one; callers with a specific
/// charset should pass its own `eof_char` to `build`/`huffman_compress`/
/// `huffman_decompress` instead of assuming this value.
pub const EOF_CHAR: u8 = 0x00;

impl HuffmanTrees {
    /// Learns a context-keyed tree set from a training corpus: a
    /// concatenation of strings, each conceptually terminated by `eof`.
    /// `corpus` must already include the terminator after each string
    /// (callers encoding a string bank pass the whole bank through).
    pub fn build(corpus: &[u8], eof: u8) -> Self {
        let mut freq: HashMap<u8, HashMap<u8, u32>> = HashMap::new();
        let mut context = eof;
        for &byte in corpus {
            *freq.entry(context).or_default().entry(byte).or_insert(0) += 1;
            context = if byte == eof { eof } else { byte };
        }

        let mut trees = HashMap::new();
        for (ctx, symbols) in freq {
            let mut ordered: Vec<(u8, u32)> = symbols.into_iter().collect();
            ordered.sort_by_key(|&(sym, _)| sym);
            trees.insert(ctx, Tree::build(&ordered));
        }
        HuffmanTrees { trees }
    }

    /// Serializes the tree table as a `char_offsets` index (one BE-16 entry
    /// per context from `0` up to the highest context key present, `0xFFFF`
    /// meaning "no tree for this context") and a separate `trees_bytes` blob.
    /// Each present context, in ascending key order, contributes its
    /// reversed preorder leaf symbols to `trees_bytes` followed immediately
    /// by its byte-aligned preorder bit topology; the recorded offset points
    /// at the byte where that topology starts, so its leaf symbols sit in
    /// the bytes just below it.
    pub fn serialize(&self) -> (Vec<u8>, Vec<u8>) {
        let Some(&max_ctx) = self.trees.keys().max() else {
            return (Vec::new(), Vec::new());
        };
        let mut offsets_bytes = Vec::with_capacity((max_ctx as usize + 1) * 2);
        let mut trees_bytes = Vec::new();
        for ctx in 0..=max_ctx {
            if let Some(tree) = self.trees.get(&ctx) {
                let (symbols, topology) = tree.encode_tree();
                trees_bytes.extend_from_slice(&symbols);
                let offset = trees_bytes.len() as u16;
                offsets_bytes.extend_from_slice(&offset.to_be_bytes());
                trees_bytes.extend_from_slice(&topology);
            } else {
                offsets_bytes.extend_from_slice(&0xFFFFu16.to_be_bytes());
            }
        }
        (offsets_bytes, trees_bytes)
    }

    /// Parses the two blobs `serialize` produces back into a tree table.
    pub fn parse(offsets_bytes: &[u8], trees_bytes: &[u8]) -> Result<Self> {
        if offsets_bytes.len() % 2 != 0 {
            return Err(CodecError::new(ErrorKind::Truncated, offsets_bytes.len()));
        }
        let mut trees = HashMap::new();
        for (ctx, pair) in offsets_bytes.chunks_exact(2).enumerate() {
            let offset = u16::from_be_bytes([pair[0], pair[1]]);
            if offset == 0xFFFF {
                continue;
            }
            let ctx = u8::try_from(ctx).map_err(|_| CodecError::new(ErrorKind::OutOfRange, ctx))?;
            trees.insert(ctx, Tree::decode_tree(trees_bytes, offset as usize)?);
        }
        Ok(HuffmanTrees { trees })
    }

    pub(crate) fn get(&self, ctx: u8) -> Result<&Tree> {
        self.trees.get(&ctx).ok_or_else(|| CodecError::new(ErrorKind::UnknownContext, 0))
    }

    pub(crate) fn decode_symbol(&self, ctx: u8, r: &mut BitReader) -> Result<u8> {
        self.get(ctx)?.decode_symbol(r)
    }

    pub(crate) fn encode_symbol(&self, ctx: u8, symbol: u8, w: &mut BitWriter) -> Result<()> {
        self.get(ctx)?.encode_symbol(symbol, w)
    }
}
