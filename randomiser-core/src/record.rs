use serde::{Deserialize, Serialize};

/// Storage width of a record field.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Width {
    U8,
    I8,
    U16,
    U32,
    /// Upper four bits of a byte.
    HighNibble,
    /// Lower four bits of a byte.
    LowNibble,
}

/// A typed field inside a fixed-size record: where it lives and which
/// numeric domain a write is clamped to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Field {
    pub offset: usize,
    pub width: Width,
    pub min: i64,
    pub max: i64,
}

impl Field {
    pub const fn u8(offset: usize) -> Self {
        Self { offset, width: Width::U8, min: 0, max: 0xFF }
    }

    pub const fn i8(offset: usize) -> Self {
        Self { offset, width: Width::I8, min: i8::MIN as i64, max: i8::MAX as i64 }
    }

    pub const fn u16(offset: usize) -> Self {
        Self { offset, width: Width::U16, min: 0, max: 0xFFFF }
    }

    pub const fn u32(offset: usize) -> Self {
        Self { offset, width: Width::U32, min: 0, max: 0xFFFF_FFFF }
    }

    pub const fn high_nibble(offset: usize) -> Self {
        Self { offset, width: Width::HighNibble, min: 0, max: 0x0F }
    }

    pub const fn low_nibble(offset: usize) -> Self {
        Self { offset, width: Width::LowNibble, min: 0, max: 0x0F }
    }

    /// Narrow the domain of an existing field, e.g. enemy growths that
    /// wrap past 127 in game.
    pub const fn clamped(self, min: i64, max: i64) -> Self {
        Self { min, max, ..self }
    }

    pub const fn byte_len(&self) -> usize {
        match self.width {
            Width::U8 | Width::I8 | Width::HighNibble | Width::LowNibble => 1,
            Width::U16 => 2,
            Width::U32 => 4,
        }
    }

    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min, self.max)
    }
}

/// A contiguous run of replacement bytes at an absolute image address.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Diff {
    pub address: usize,
    pub bytes: Vec<u8>,
}

impl Diff {
    pub fn new(address: usize, bytes: Vec<u8>) -> Self {
        Self { address, bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Fixed-size byte-backed record read out of the image.
///
/// The construction-time bytes are kept as an independent snapshot so that
/// diffs are always computed against what the image held and `reset` really
/// restores it. `dirty` tracks writes since the last `commit`; `outstanding`
/// tracks committed changes not yet handed to the patch ledger.
#[derive(Clone, Debug)]
pub struct Record {
    origin_offset: usize,
    original: Box<[u8]>,
    working: Vec<u8>,
    dirty: bool,
    outstanding: bool,
}

impl Record {
    pub fn new(bytes: &[u8], origin_offset: usize) -> Self {
        Self {
            origin_offset,
            original: bytes.to_vec().into_boxed_slice(),
            working: bytes.to_vec(),
            dirty: false,
            outstanding: false,
        }
    }

    pub fn origin_offset(&self) -> usize {
        self.origin_offset
    }

    pub fn len(&self) -> usize {
        self.working.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.working
    }

    pub fn original_bytes(&self) -> &[u8] {
        &self.original
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn has_outstanding_diff(&self) -> bool {
        self.outstanding
    }

    pub fn read(&self, field: Field) -> i64 {
        let o = field.offset;
        match field.width {
            Width::U8 => i64::from(self.working[o]),
            Width::I8 => i64::from(self.working[o] as i8),
            Width::U16 => i64::from(u16::from_le_bytes([self.working[o], self.working[o + 1]])),
            Width::U32 => i64::from(u32::from_le_bytes([
                self.working[o],
                self.working[o + 1],
                self.working[o + 2],
                self.working[o + 3],
            ])),
            Width::HighNibble => i64::from(self.working[o] >> 4),
            Width::LowNibble => i64::from(self.working[o] & 0x0F),
        }
    }

    /// Write `value` clamped to the field's domain. Always marks the record
    /// dirty, even when the stored bytes do not change.
    pub fn write(&mut self, field: Field, value: i64) {
        let v = field.clamp(value);
        let o = field.offset;
        match field.width {
            Width::U8 => self.working[o] = v as u8,
            Width::I8 => self.working[o] = (v as i8) as u8,
            Width::U16 => self.working[o..o + 2].copy_from_slice(&(v as u16).to_le_bytes()),
            Width::U32 => self.working[o..o + 4].copy_from_slice(&(v as u32).to_le_bytes()),
            Width::HighNibble => {
                self.working[o] = (self.working[o] & 0x0F) | ((v as u8) << 4);
            }
            Width::LowNibble => {
                self.working[o] = (self.working[o] & 0xF0) | (v as u8 & 0x0F);
            }
        }
        self.dirty = true;
    }

    pub fn read_u8(&self, offset: usize) -> u8 {
        self.working[offset]
    }

    pub fn write_u8(&mut self, offset: usize, value: u8) {
        self.write(Field::u8(offset), i64::from(value));
    }

    pub fn commit(&mut self) {
        if self.dirty {
            self.outstanding = true;
        }
        self.dirty = false;
    }

    /// Hand the committed changes to the caller as a single diff spanning
    /// the first through last byte that differs from the snapshot.
    pub fn extract_diff(&mut self) -> Option<Diff> {
        if !self.outstanding {
            return None;
        }
        self.outstanding = false;

        let first = self
            .working
            .iter()
            .zip(self.original.iter())
            .position(|(w, o)| w != o)?;
        let last = self
            .working
            .iter()
            .zip(self.original.iter())
            .rposition(|(w, o)| w != o)?;

        Some(Diff::new(
            self.origin_offset + first,
            self.working[first..=last].to_vec(),
        ))
    }

    pub fn reset(&mut self) {
        self.working.copy_from_slice(&self.original);
        self.dirty = false;
        self.outstanding = false;
    }
}
