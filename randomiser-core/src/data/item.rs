use serde::{Deserialize, Serialize};

use super::{Entity, Table, WeaponRank, WeaponType};
use crate::record::{Field, Record};

pub const ITEM_RECORD_SIZE: usize = 0x24;

const ID: Field = Field::u8(0x06);
const TYPE: Field = Field::u8(0x07);
const STAT_BONUSES: Field = Field::u32(0x0C);
const EFFECTIVENESS: Field = Field::u32(0x10);
const USES: Field = Field::u8(0x14);
const MIGHT: Field = Field::u8(0x15);
const HIT: Field = Field::u8(0x16);
const WEIGHT: Field = Field::u8(0x17);
const CRIT: Field = Field::u8(0x18);
const MIN_RANGE: Field = Field::high_nibble(0x19);
const MAX_RANGE: Field = Field::low_nibble(0x19);
const RANK: Field = Field::u8(0x1C);
const EFFECT: Field = Field::u8(0x1F);

fn ability_field(index: usize) -> Field {
    Field::u8(0x08 + index)
}

/// Restricts an item to specific classes or characters.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PrfLock {
    #[serde(default)]
    pub classes: Vec<u8>,
    #[serde(default)]
    pub characters: Vec<u8>,
}

impl PrfLock {
    pub fn allows(&self, class_id: u8, character_id: Option<u8>) -> bool {
        self.classes.contains(&class_id)
            || character_id.is_some_and(|id| self.characters.contains(&id))
    }
}

/// Rule-driven item properties.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ItemTraits {
    pub healing: bool,
    pub retained: bool,
    pub thief_only: bool,
    pub lock: Option<PrfLock>,
}

#[derive(Clone, Debug)]
pub struct ItemDef {
    record: Record,
    traits: ItemTraits,
}

impl ItemDef {
    pub fn new(record: Record, traits: ItemTraits) -> Self {
        Self { record, traits }
    }

    pub fn traits(&self) -> &ItemTraits {
        &self.traits
    }

    /// `None` for anything that is not a weapon or staff.
    pub fn weapon_type(&self) -> Option<WeaponType> {
        WeaponType::from_code(self.record.read(TYPE) as u8)
    }

    pub fn is_weapon(&self) -> bool {
        self.weapon_type().is_some_and(|ty| !ty.is_staff())
    }

    pub fn is_staff(&self) -> bool {
        self.weapon_type().is_some_and(WeaponType::is_staff)
    }

    pub fn rank_value(&self) -> u8 {
        self.record.read(RANK) as u8
    }

    pub fn rank(&self) -> WeaponRank {
        WeaponRank::from_value(self.rank_value())
    }

    pub fn uses(&self) -> i64 {
        self.record.read(USES)
    }

    pub fn set_uses(&mut self, value: i64) {
        self.record.write(USES, value);
    }

    pub fn might(&self) -> i64 {
        self.record.read(MIGHT)
    }

    pub fn set_might(&mut self, value: i64) {
        self.record.write(MIGHT, value);
    }

    pub fn hit(&self) -> i64 {
        self.record.read(HIT)
    }

    pub fn set_hit(&mut self, value: i64) {
        self.record.write(HIT, value);
    }

    pub fn weight(&self) -> i64 {
        self.record.read(WEIGHT)
    }

    pub fn set_weight(&mut self, value: i64) {
        self.record.write(WEIGHT, value);
    }

    pub fn crit(&self) -> i64 {
        self.record.read(CRIT)
    }

    pub fn set_crit(&mut self, value: i64) {
        self.record.write(CRIT, value);
    }

    pub fn min_range(&self) -> i64 {
        self.record.read(MIN_RANGE)
    }

    pub fn max_range(&self) -> i64 {
        self.record.read(MAX_RANGE)
    }

    pub fn set_min_range(&mut self, value: i64) {
        self.record.write(MIN_RANGE, value);
    }

    pub fn set_max_range(&mut self, value: i64) {
        self.record.write(MAX_RANGE, value);
    }

    pub fn is_ranged(&self) -> bool {
        self.max_range() >= 2
    }

    pub fn is_melee(&self) -> bool {
        self.min_range() == 1
    }

    /// One of the four ability bytes.
    pub fn ability(&self, index: usize) -> u8 {
        self.record.read(ability_field(index)) as u8
    }

    pub fn set_ability(&mut self, index: usize, value: u8) {
        self.record.write(ability_field(index), i64::from(value));
    }

    pub fn stat_bonus_pointer(&self) -> u32 {
        self.record.read(STAT_BONUSES) as u32
    }

    pub fn set_stat_bonus_pointer(&mut self, pointer: u32) {
        self.record.write(STAT_BONUSES, i64::from(pointer));
    }

    pub fn effectiveness_pointer(&self) -> u32 {
        self.record.read(EFFECTIVENESS) as u32
    }

    pub fn set_effectiveness_pointer(&mut self, pointer: u32) {
        self.record.write(EFFECTIVENESS, i64::from(pointer));
    }

    pub fn effect(&self) -> u8 {
        self.record.read(EFFECT) as u8
    }

    pub fn set_effect(&mut self, code: u8) {
        self.record.write(EFFECT, i64::from(code));
    }
}

impl Entity for ItemDef {
    fn id(&self) -> u8 {
        self.record.read(ID) as u8
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}

impl Table<ItemDef> {
    /// IDs of weapons (not staves) for randomisation passes, skipping
    /// locked items.
    pub fn unlocked_weapon_ids(&self) -> Vec<u8> {
        self.iter()
            .filter(|item| item.is_weapon() && item.traits().lock.is_none())
            .map(Entity::id)
            .collect()
    }

    pub fn of_type_and_rank(&self, ty: WeaponType, rank: WeaponRank) -> Vec<u8> {
        self.iter()
            .filter(|item| {
                item.weapon_type() == Some(ty)
                    && item.rank() == rank
                    && item.traits().lock.is_none()
            })
            .map(Entity::id)
            .collect()
    }

    /// Weapons locked to a class, for enemies of that class.
    pub fn locked_to_class(&self, class_id: u8) -> Vec<u8> {
        self.iter()
            .filter(|item| {
                item.traits()
                    .lock
                    .as_ref()
                    .is_some_and(|lock| lock.classes.contains(&class_id))
            })
            .map(Entity::id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::{item, item_bytes};

    #[test]
    fn range_nibbles_decode() {
        let bytes = item_bytes(0x01, WeaponType::Bow, 1, (2, 3));
        let bow = ItemDef::new(Record::new(&bytes, 0), ItemTraits::default());
        assert!(bow.is_ranged());
        assert!(!bow.is_melee());
        assert_eq!(bow.rank(), WeaponRank::E);
    }

    #[test]
    fn non_weapon_types_have_no_weapon_type() {
        let mut bytes = item_bytes(0x6C, WeaponType::Sword, 0, (0, 0));
        bytes[0x07] = 0x09;
        let vulnerary = ItemDef::new(Record::new(&bytes, 0), ItemTraits::default());
        assert_eq!(vulnerary.weapon_type(), None);
        assert!(!vulnerary.is_weapon());
        assert!(!vulnerary.is_staff());
    }

    #[test]
    fn table_queries_skip_locked_items() {
        let mut rapier = item(0x09, WeaponType::Sword, 1, (1, 1));
        rapier.traits.lock = Some(PrfLock { classes: vec![0x01], characters: vec![] });
        let table = Table::new(vec![item(0x01, WeaponType::Sword, 1, (1, 1)), rapier]);

        assert_eq!(table.of_type_and_rank(WeaponType::Sword, WeaponRank::E), vec![0x01]);
        assert_eq!(table.locked_to_class(0x01), vec![0x09]);
        assert_eq!(table.unlocked_weapon_ids(), vec![0x01]);
    }

    #[test]
    fn locks_allow_classes_or_characters() {
        let lock = PrfLock { classes: vec![2], characters: vec![7] };
        assert!(lock.allows(2, None));
        assert!(lock.allows(9, Some(7)));
        assert!(!lock.allows(9, Some(8)));
        assert!(!lock.allows(9, None));
    }
}
