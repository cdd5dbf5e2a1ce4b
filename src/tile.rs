/// A single 16x16 tile descriptor: an 11-bit tile index plus the three
/// flip/priority bits the Mega Drive VDP understands. Bits 13-14 of the
/// encoded value are reserved and always read/written as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tile {
    pub idx: u16,
    pub hflip: bool,
    pub vflip: bool,
    pub priority: bool,
}

impl Tile {
    pub fn new(idx: u16) -> Self {
        Self { idx: idx & 0x7FF, ..Default::default() }
    }

    pub(crate) fn has_attr(&self, attr: Attr) -> bool {
        match attr {
            Attr::Hflip => self.hflip,
            Attr::Vflip => self.vflip,
            Attr::Priority => self.priority,
        }
    }

    pub(crate) fn set_attr(&mut self, attr: Attr) {
        match attr {
            Attr::Hflip => self.hflip = true,
            Attr::Vflip => self.vflip = true,
            Attr::Priority => self.priority = true,
        }
    }
}

impl From<u16> for Tile {
    fn from(val: u16) -> Self {
        Tile {
            idx: val & 0x7FF,
            hflip: val & 0x0800 != 0,
            vflip: val & 0x1000 != 0,
            priority: val & 0x8000 != 0,
        }
    }
}

impl From<Tile> for u16 {
    fn from(t: Tile) -> u16 {
        (t.idx & 0x7FF)
            | if t.hflip { 0x0800 } else { 0 }
            | if t.vflip { 0x1000 } else { 0 }
            | if t.priority { 0x8000 } else { 0 }
    }
}

/// The three maskable tile attributes, in the fixed order the blockset codec
/// writes them: PRIORITY, VFLIP, HFLIP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Attr {
    Priority,
    Vflip,
    Hflip,
}

/// A 2x2 group of tiles; the unit the blockset codec operates on.
pub type Block = [Tile; 4];
