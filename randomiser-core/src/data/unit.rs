use super::Entity;
use crate::record::{Field, Record};

pub const UNIT_RECORD_SIZE: usize = 0x10;
pub const ITEM_SLOTS: usize = 4;

const CHARACTER: Field = Field::u8(0x00);
const CLASS: Field = Field::u8(0x01);
const LEADER: Field = Field::u8(0x02);
const LEVEL: Field = Field::u8(0x03);
const LOADING_X: Field = Field::u8(0x04);
const LOADING_Y: Field = Field::u8(0x05);
const START_X: Field = Field::u8(0x06);
const START_Y: Field = Field::u8(0x07);
const FIRST_ITEM: usize = 0x08;
const AI: Field = Field::u8(0x0C);

/// A unit's four item slots, kept left-packed: no empty slot ever precedes
/// an occupied one.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ItemSlots([u8; ITEM_SLOTS]);

impl ItemSlots {
    pub fn new(slots: [u8; ITEM_SLOTS]) -> Self {
        let mut packed = Self(slots);
        packed.collapse();
        packed
    }

    pub fn as_array(&self) -> [u8; ITEM_SLOTS] {
        self.0
    }

    /// Occupied slots in order.
    pub fn ids(&self) -> Vec<u8> {
        self.0.iter().copied().filter(|&id| id != 0).collect()
    }

    pub fn len(&self) -> usize {
        self.0.iter().filter(|&&id| id != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == ITEM_SLOTS
    }

    pub fn contains(&self, id: u8) -> bool {
        id != 0 && self.0.contains(&id)
    }

    pub fn get(&self, slot: usize) -> u8 {
        self.0[slot]
    }

    /// Overwrite one slot; the slots are repacked afterwards, so clearing a
    /// slot shifts the later items left.
    pub fn set(&mut self, slot: usize, id: u8) {
        self.0[slot] = id;
        self.collapse();
    }

    /// Add items to the inventory. New IDs are placed from the last slot
    /// backward, existing items stay ahead of them, and the result is
    /// repacked. IDs the unit already holds are skipped. IDs that no longer
    /// fit are dropped and returned.
    pub fn give_items(&mut self, new_ids: &[u8]) -> Vec<u8> {
        let mut combined = self.ids();
        combined.extend(
            new_ids
                .iter()
                .rev()
                .copied()
                .filter(|&id| id != 0 && !self.contains(id)),
        );

        let dropped = combined.split_off(combined.len().min(ITEM_SLOTS));
        let mut slots = [0; ITEM_SLOTS];
        slots[..combined.len()].copy_from_slice(&combined);
        self.0 = slots;
        dropped
    }

    /// Remove the first occurrence of `id`. Returns whether it was present.
    pub fn remove_item(&mut self, id: u8) -> bool {
        match self.0.iter().position(|&slot| slot == id && id != 0) {
            Some(index) => {
                self.0[index] = 0;
                self.collapse();
                true
            }
            None => false,
        }
    }

    pub fn collapse(&mut self) {
        let ids = self.ids();
        self.0 = [0; ITEM_SLOTS];
        self.0[..ids.len()].copy_from_slice(&ids);
    }
}

/// One unit record of a chapter's deployment list.
#[derive(Clone, Debug)]
pub struct UnitPlacement {
    record: Record,
}

impl UnitPlacement {
    pub fn new(record: Record) -> Self {
        Self { record }
    }

    pub fn character_id(&self) -> u8 {
        self.record.read(CHARACTER) as u8
    }

    pub fn class_id(&self) -> u8 {
        self.record.read(CLASS) as u8
    }

    pub fn set_class_id(&mut self, class_id: u8) {
        self.record.write(CLASS, i64::from(class_id));
    }

    pub fn leader_id(&self) -> u8 {
        self.record.read(LEADER) as u8
    }

    pub fn level_byte(&self) -> u8 {
        self.record.read(LEVEL) as u8
    }

    pub fn loading_position(&self) -> (u8, u8) {
        (self.record.read(LOADING_X) as u8, self.record.read(LOADING_Y) as u8)
    }

    pub fn starting_position(&self) -> (u8, u8) {
        (self.record.read(START_X) as u8, self.record.read(START_Y) as u8)
    }

    pub fn ai(&self) -> u8 {
        self.record.read(AI) as u8
    }

    pub fn items(&self) -> ItemSlots {
        let mut slots = [0; ITEM_SLOTS];
        for (i, slot) in slots.iter_mut().enumerate() {
            *slot = self.record.read_u8(FIRST_ITEM + i);
        }
        ItemSlots(slots)
    }

    /// Store the slots back, left-packed.
    pub fn set_items(&mut self, mut items: ItemSlots) {
        items.collapse();
        for (i, id) in items.as_array().into_iter().enumerate() {
            self.record.write_u8(FIRST_ITEM + i, id);
        }
    }
}

impl Entity for UnitPlacement {
    fn id(&self) -> u8 {
        self.character_id()
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}
