use super::{Entity, Stat, WeaponType};
use crate::record::{Field, Record};

pub const CHARACTER_RECORD_SIZE: usize = 0x34;

const ID: Field = Field::u8(0x04);
const CLASS: Field = Field::u8(0x05);
const AFFINITY: Field = Field::u8(0x09);
const LEVEL: Field = Field::u8(0x0B);
const CON: Field = Field::i8(0x13);

fn base_field(stat: Stat) -> Field {
    Field::i8(0x0C + stat.index())
}

fn rank_field(ty: WeaponType) -> Field {
    Field::u8(0x14 + ty.storage_index())
}

fn growth_field(stat: Stat) -> Field {
    Field::u8(0x1C + stat.index())
}

/// Per-character properties that come from the game rules rather than the
/// record itself.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CharacterFlags {
    pub playable: bool,
    pub boss: bool,
    pub lord: bool,
    pub thief: bool,
    pub special: bool,
    /// Only ever placed in the designated safe classes.
    pub restricted: bool,
    pub requires_range: bool,
    pub requires_melee: bool,
}

#[derive(Clone, Debug)]
pub struct CharacterDef {
    record: Record,
    flags: CharacterFlags,
}

impl CharacterDef {
    pub fn new(record: Record, flags: CharacterFlags) -> Self {
        Self { record, flags }
    }

    pub fn flags(&self) -> &CharacterFlags {
        &self.flags
    }

    pub fn class_id(&self) -> u8 {
        self.record.read(CLASS) as u8
    }

    pub fn set_class_id(&mut self, class_id: u8) {
        self.record.write(CLASS, i64::from(class_id));
    }

    pub fn level(&self) -> i64 {
        self.record.read(LEVEL)
    }

    pub fn affinity(&self) -> u8 {
        self.record.read(AFFINITY) as u8
    }

    pub fn set_affinity(&mut self, value: u8) {
        self.record.write(AFFINITY, i64::from(value));
    }

    /// Personal modifier added on top of the class base.
    pub fn base(&self, stat: Stat) -> i64 {
        self.record.read(base_field(stat))
    }

    pub fn set_base(&mut self, stat: Stat, value: i64) {
        self.record.write(base_field(stat), value);
    }

    pub fn con(&self) -> i64 {
        self.record.read(CON)
    }

    pub fn set_con(&mut self, value: i64) {
        self.record.write(CON, value);
    }

    pub fn growth(&self, stat: Stat) -> i64 {
        self.record.read(growth_field(stat))
    }

    pub fn rank(&self, ty: WeaponType) -> u8 {
        self.record.read(rank_field(ty)) as u8
    }

    pub fn set_rank(&mut self, ty: WeaponType, value: u8) {
        self.record.write(rank_field(ty), i64::from(value));
    }

    /// Rank values of every type, in `WeaponType::ORDER`.
    pub fn ranks(&self) -> Vec<(WeaponType, u8)> {
        WeaponType::ORDER
            .into_iter()
            .map(|ty| (ty, self.rank(ty)))
            .collect()
    }
}

impl Entity for CharacterDef {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::character_bytes;

    #[test]
    fn personal_bases_are_signed() {
        let bytes = character_bytes(3, 0x10, &[(WeaponType::Sword, 71)]);
        let mut character = CharacterDef::new(Record::new(&bytes, 0), CharacterFlags::default());
        character.set_base(Stat::Def, -4);
        assert_eq!(character.base(Stat::Def), -4);
        character.set_base(Stat::Str, -200);
        assert_eq!(character.base(Stat::Str), -128);
    }

    #[test]
    fn ranks_follow_storage_layout() {
        let bytes = character_bytes(3, 0x10, &[(WeaponType::Staff, 31), (WeaponType::Dark, 1)]);
        let character = CharacterDef::new(Record::new(&bytes, 0), CharacterFlags::default());
        assert_eq!(character.id(), 3);
        assert_eq!(character.class_id(), 0x10);
        assert_eq!(character.rank(WeaponType::Staff), 31);
        assert_eq!(character.rank(WeaponType::Dark), 1);
        assert_eq!(character.rank(WeaponType::Anima), 0);
        assert_eq!(bytes[0x14 + 4], 31);
    }
}
