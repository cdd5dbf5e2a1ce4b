use std::collections::HashMap;

/// The 14-entry LZ77 back-offset dictionary: slots 0-5 are fixed (an
/// encode-time placeholder at 0, decode-time sentinel `0xFFFF`, then `1, 2,
/// width, 2*width, width+1`), slots 6-13 are learned by frequency analysis.
pub(crate) const FIXED_SLOT_COUNT: usize = 6;

pub(crate) fn bit_length(v: u32) -> u32 {
    32 - v.leading_zeros()
}

fn scan_match_run(tiles: &[u16], offset: usize, back: usize, lookahead: usize) -> usize {
    let mut run = 0usize;
    while run < lookahead && tiles[offset - back + run] == tiles[offset + run] {
        run += 1;
    }
    run
}

/// Finds the best-matching back-offset for `offset` against every candidate
/// in `1..=lookback`, and tallies the offsets that tie for the best run
/// length so the caller can learn the most useful dictionary entries.
fn find_match_frequency(tiles: &[u16], offset: usize, freq: &mut HashMap<u16, u32>) -> usize {
    let lookback = offset.min(4095);
    let lookahead = tiles.len() - offset;

    let mut best = 0usize;
    for back in 1..=lookback {
        let run = scan_match_run(tiles, offset, back, lookahead);
        if run > best {
            best = run;
        }
    }
    if best < 2 {
        return 0;
    }
    for back in 1..=lookback {
        let run = scan_match_run(tiles, offset, back, lookahead);
        if run == best {
            *freq.entry(back as u16).or_insert(0) += 1;
        }
    }
    best
}

/// Builds the offset dictionary by scanning the concatenated
/// foreground||background sequence for the back-offsets that most often
/// produce the longest matches, keeping the top 8 distinct offsets
/// (descending frequency, ties by ascending offset) beyond the 6 fixed ones.
pub(crate) fn make_offset_dictionary(tiles: &[u16], width: usize) -> [u16; 14] {
    let mut offsets: Vec<u16> = vec![0, 1, 2, width as u16, (width * 2) as u16, (width + 1) as u16];

    let mut freq: HashMap<u16, u32> = HashMap::new();
    let mut idx = 1usize;
    while idx < tiles.len() {
        let run = find_match_frequency(tiles, idx, &mut freq);
        idx += run.max(1);
    }

    let mut ranked: Vec<(u16, u32)> = freq.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    for (offset, _) in ranked {
        if !offsets.contains(&offset) {
            offsets.push(offset);
            if offsets.len() >= 14 {
                break;
            }
        }
    }
    offsets.resize(14, 0);
    offsets.try_into().unwrap()
}

/// Finds the longest match against the offset dictionary at `offset`,
/// returning `(dictionary_index, run_length)`. Index 0 (the placeholder
/// entry) is never a genuine match candidate; failing to find one returns
/// `(0, 1)`, the "uncompressed single tile" default.
pub(crate) fn find_match(tiles: &[u16], offset: usize, offsets: &[u16; 14]) -> (usize, usize) {
    let lookback = offset.min(4095);
    let lookahead = tiles.len() - offset;
    let mut best = (0usize, 0usize);

    for (i, &back) in offsets.iter().enumerate() {
        let back = back as usize;
        if back == 0 || back > lookback {
            continue;
        }
        let run = scan_match_run(tiles, offset, back, lookahead);
        if run > best.1 {
            best = (i, run);
        }
    }
    if best.1 == 0 {
        best = (0, 1);
    }
    best
}

/// An insertion-order-preserving counter map, mirroring the behavior of a
/// Python `dict`/`defaultdict` whose iteration order is its keys' first
/// insertion order — load-bearing here because `_get_tile_counts` and its
/// callers depend on that order to pick a deterministic tile dictionary key.
struct OrderedCounts {
    keys: Vec<u16>,
    values: Vec<u32>,
    index: HashMap<u16, usize>,
}

impl OrderedCounts {
    fn new() -> Self {
        Self { keys: Vec::new(), values: Vec::new(), index: HashMap::new() }
    }

    fn insert_default(&mut self, key: u16, value: u32) {
        if !self.index.contains_key(&key) {
            self.index.insert(key, self.keys.len());
            self.keys.push(key);
            self.values.push(value);
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct TileDict {
    pub long: u16,
    pub short: u16,
}

fn get_tile_counts(tiles: &[u16], compressed: &[bool]) -> (OrderedCounts, HashMap<u16, u32>) {
    let mut incrementing = OrderedCounts::new();
    let mut ranged: HashMap<u16, u32> = HashMap::new();

    for (i, &tile) in tiles.iter().enumerate() {
        if compressed[i] {
            continue;
        }
        for idx in 0..incrementing.keys.len() {
            let base = incrementing.keys[idx];
            let count = incrementing.values[idx];
            if tile == base.wrapping_add(count as u16) {
                incrementing.values[idx] += 1;
            }
            if base <= tile && tile < base.wrapping_add(count as u16) {
                *ranged.entry(tile).or_insert(0) += 1;
            }
        }
        incrementing.insert_default(tile, 1);
    }
    (incrementing, ranged)
}

fn calculate_short_tile_key(counts: &OrderedCounts) -> u16 {
    let mut best_idx = 0usize;
    for i in 1..counts.keys.len() {
        if counts.values[i] > counts.values[best_idx] {
            best_idx = i;
        }
    }
    counts.keys[best_idx]
}

fn calculate_long_tile_key(counts: &OrderedCounts) -> u16 {
    let max_tile = *counts.keys.iter().max().unwrap();
    let min_dict_entry: u16 = if max_tile == 0 { 0 } else { 1u16 << (bit_length(max_tile as u32) - 1) };
    for &base in &counts.keys {
        if base >= min_dict_entry {
            return base;
        }
    }
    min_dict_entry
}

/// Builds the two-key "long/short" incrementing tile dictionary by
/// analyzing runs of uncompressed tiles: `short` is the most frequent
/// increment base, `long` is the first base at or above the smallest power
/// of two covering the largest tile value seen.
pub(crate) fn make_tile_dictionary(tiles: &[u16], compressed: &[bool]) -> TileDict {
    let (incrementing, _ranged) = get_tile_counts(tiles, compressed);
    let short = calculate_short_tile_key(&incrementing);
    let long = calculate_long_tile_key(&incrementing);
    TileDict { long, short }
}

pub(crate) enum TileEntry {
    DecodeLong { val: u16, len: u32 },
    DecodeShort { val: u16, len: u32 },
    IncrementLong,
    IncrementShort,
}

/// Encodes each uncompressed tile as a dictionary command, in priority
/// order: increment-short, then increment-long, then decode-short (value
/// already within the short counter's established range), else decode-long.
///
/// `long_counter`/`short_counter` track the same running state pass two's
/// decoder does (seeded at the dictionary keys, advanced by every increment
/// command), since `DECODE_LONG`'s and `DECODE_SHORT`'s payload widths are
/// sized against the *current* counter, not the fixed dictionary key.
pub(crate) fn encode_tiles(tiles: &[u16], compressed: &[bool], dict: TileDict) -> Vec<TileEntry> {
    let mut entries = Vec::new();
    let mut long_counter: u32 = dict.long as u32;
    let mut short_counter: u32 = dict.short as u32;

    for (i, &tile) in tiles.iter().enumerate() {
        if compressed[i] {
            continue;
        }
        let tile32 = tile as u32;
        if tile32 == short_counter {
            entries.push(TileEntry::IncrementShort);
            short_counter += 1;
        } else if tile32 == long_counter {
            entries.push(TileEntry::IncrementLong);
            long_counter += 1;
        } else if dict.short as u32 <= tile32 && tile32 < short_counter {
            let diff = short_counter - dict.short as u32;
            entries.push(TileEntry::DecodeShort { val: tile - dict.short, len: bit_length(diff) });
        } else {
            entries.push(TileEntry::DecodeLong { val: tile, len: bit_length(long_counter) });
        }
    }
    entries
}
