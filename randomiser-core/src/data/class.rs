use serde::{Deserialize, Serialize};

use super::{Entity, Stat, WeaponType};
use crate::record::{Field, Record};

pub const CLASS_RECORD_SIZE: usize = 0x54;

const ID: Field = Field::u8(0x04);
const CON: Field = Field::u8(0x11);
const MOV: Field = Field::u8(0x12);
const CON_CAP: Field = Field::u8(0x19);
const BASE_RANK_FLOOR: Field = Field::u8(0x23);
const ABILITIES: Field = Field::u32(0x28);

/// In-game growths past 127 wrap negative for enemies.
pub const MAX_GROWTH: i64 = 127;

fn base_field(stat: Stat) -> Field {
    match stat {
        Stat::Lck => Field::u8(0x1A),
        other => Field::u8(0x0B + other.index()),
    }
}

fn cap_field(stat: Stat) -> Field {
    match stat {
        Stat::Lck => Field::u8(0x22),
        other => Field::u8(0x13 + other.index()),
    }
}

fn growth_field(stat: Stat) -> Field {
    Field::u8(0x1B + stat.index()).clamped(0, MAX_GROWTH)
}

fn rank_field(ty: WeaponType) -> Field {
    Field::u8(0x2C + ty.storage_index())
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum ClassCategory {
    Flying,
    Thief,
    Lord,
    Special,
    Monster,
}

impl ClassCategory {
    pub const ALL: [ClassCategory; 5] = [
        ClassCategory::Flying,
        ClassCategory::Thief,
        ClassCategory::Lord,
        ClassCategory::Special,
        ClassCategory::Monster,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

#[derive(Clone, Debug)]
pub struct ClassDef {
    record: Record,
    categories: u8,
}

impl ClassDef {
    pub fn new(record: Record, categories: &[ClassCategory]) -> Self {
        let categories = categories.iter().fold(0, |acc, c| acc | c.bit());
        Self { record, categories }
    }

    pub fn is(&self, category: ClassCategory) -> bool {
        self.categories & category.bit() != 0
    }

    pub fn categories(&self) -> Vec<ClassCategory> {
        ClassCategory::ALL.into_iter().filter(|c| self.is(*c)).collect()
    }

    pub fn base(&self, stat: Stat) -> i64 {
        self.record.read(base_field(stat))
    }

    pub fn cap(&self, stat: Stat) -> i64 {
        self.record.read(cap_field(stat))
    }

    pub fn growth(&self, stat: Stat) -> i64 {
        self.record.read(growth_field(stat))
    }

    pub fn set_growth(&mut self, stat: Stat, value: i64) {
        self.record.write(growth_field(stat), value);
    }

    pub fn con(&self) -> i64 {
        self.record.read(CON)
    }

    pub fn con_cap(&self) -> i64 {
        self.record.read(CON_CAP)
    }

    pub fn mov(&self) -> i64 {
        self.record.read(MOV)
    }

    pub fn set_mov(&mut self, value: i64) {
        self.record.write(MOV, value);
    }

    pub fn abilities(&self) -> u32 {
        self.record.read(ABILITIES) as u32
    }

    pub fn base_rank_floor(&self) -> u8 {
        self.record.read(BASE_RANK_FLOOR) as u8
    }

    /// Highest rank value units of this class can reach; 0 means the class
    /// cannot use the type at all.
    pub fn rank_ceiling(&self, ty: WeaponType) -> u8 {
        self.record.read(rank_field(ty)) as u8
    }

    pub fn set_rank_ceiling(&mut self, ty: WeaponType, value: u8) {
        self.record.write(rank_field(ty), i64::from(value));
    }

    pub fn supports(&self, ty: WeaponType) -> bool {
        self.rank_ceiling(ty) > 0
    }

    /// Usable types in rank-transfer order.
    pub fn supported_types(&self) -> Vec<WeaponType> {
        WeaponType::ORDER
            .into_iter()
            .filter(|ty| self.supports(*ty))
            .collect()
    }

    pub fn can_attack(&self) -> bool {
        WeaponType::ORDER
            .into_iter()
            .any(|ty| !ty.is_staff() && self.supports(ty))
    }

    pub fn can_heal(&self) -> bool {
        self.supports(WeaponType::Staff)
    }

    /// Rough strength estimate used to keep scripted fights winnable.
    pub fn combat_rating(&self) -> i64 {
        let bases: i64 = [Stat::Hp, Stat::Str, Stat::Skl, Stat::Spd, Stat::Def, Stat::Res]
            .into_iter()
            .map(|s| self.base(s))
            .sum::<i64>()
            + self.con();
        let caps: i64 = Stat::ALL.into_iter().map(|s| self.cap(s)).sum::<i64>() + self.con_cap();
        5 * self.mov() + 8 * self.supported_types().len() as i64 + bases + caps / 4
    }
}

impl Entity for ClassDef {
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
