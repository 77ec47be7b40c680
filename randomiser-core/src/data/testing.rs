//! Small hand-built catalogs shared by the unit tests.

use super::character::CHARACTER_RECORD_SIZE;
use super::class::CLASS_RECORD_SIZE;
use super::item::ITEM_RECORD_SIZE;
use super::unit::UNIT_RECORD_SIZE;
use super::*;
use crate::layout::{GameRules, LockedItem, MustLoseTo};

pub const S: u8 = 251;

pub fn class_bytes(id: u8, mov: u8, ranks: &[(WeaponType, u8)]) -> Vec<u8> {
    let mut bytes = vec![0u8; CLASS_RECORD_SIZE];
    bytes[0x04] = id;
    // HP STR SKL SPD DEF RES CON
    bytes[0x0B..=0x11].copy_from_slice(&[18, 4, 4, 4, 4, 2, 8]);
    bytes[0x12] = mov;
    bytes[0x13..=0x19].copy_from_slice(&[60, 20, 20, 20, 20, 20, 20]);
    bytes[0x1B..=0x21].copy_from_slice(&[60, 40, 40, 40, 30, 20, 30]);
    bytes[0x22] = 30;
    bytes[0x23] = WeaponRank::E.value();
    for &(ty, value) in ranks {
        bytes[0x2C + ty.storage_index()] = value;
    }
    bytes
}

pub fn character_bytes(id: u8, class_id: u8, ranks: &[(WeaponType, u8)]) -> Vec<u8> {
    let mut bytes = vec![0u8; CHARACTER_RECORD_SIZE];
    bytes[0x04] = id;
    bytes[0x05] = class_id;
    bytes[0x0B] = 1;
    bytes[0x0C..=0x12].copy_from_slice(&[2, 1, 3, 2, 1, 0, 4]);
    for &(ty, value) in ranks {
        bytes[0x14 + ty.storage_index()] = value;
    }
    bytes[0x1C..=0x22].copy_from_slice(&[70, 40, 50, 50, 20, 20, 40]);
    bytes
}

pub fn item_bytes(id: u8, ty: WeaponType, rank: u8, range: (u8, u8)) -> Vec<u8> {
    let mut bytes = vec![0u8; ITEM_RECORD_SIZE];
    bytes[0x06] = id;
    bytes[0x07] = ty.code();
    bytes[0x08] = if ty.is_staff() { 0x04 } else { 0x01 };
    bytes[0x14] = 40;
    bytes[0x15] = 5;
    bytes[0x16] = 90;
    bytes[0x17] = 5;
    bytes[0x19] = (range.0 << 4) | range.1;
    bytes[0x1C] = rank;
    bytes
}

pub fn class(
    id: u8,
    mov: u8,
    ranks: &[(WeaponType, u8)],
    categories: &[ClassCategory],
) -> ClassDef {
    let offset = 0x1000 + usize::from(id) * CLASS_RECORD_SIZE;
    ClassDef::new(Record::new(&class_bytes(id, mov, ranks), offset), categories)
}

pub fn character(
    id: u8,
    class_id: u8,
    ranks: &[(WeaponType, u8)],
    flags: CharacterFlags,
) -> CharacterDef {
    let offset = 0x8000 + usize::from(id) * CHARACTER_RECORD_SIZE;
    CharacterDef::new(Record::new(&character_bytes(id, class_id, ranks), offset), flags)
}

pub fn item(id: u8, ty: WeaponType, rank: u8, range: (u8, u8)) -> ItemDef {
    let offset = 0x10000 + usize::from(id) * ITEM_RECORD_SIZE;
    ItemDef::new(Record::new(&item_bytes(id, ty, rank, range), offset), ItemTraits::default())
}

pub fn consumable(id: u8) -> ItemDef {
    let mut bytes = item_bytes(id, WeaponType::Sword, 0, (0, 0));
    bytes[0x07] = 0x09;
    bytes[0x08] = 0;
    let offset = 0x10000 + usize::from(id) * ITEM_RECORD_SIZE;
    ItemDef::new(Record::new(&bytes, offset), ItemTraits::default())
}

pub fn unit(index: usize, character: u8, class: u8, leader: u8, items: [u8; 4]) -> UnitPlacement {
    let mut bytes = [0u8; UNIT_RECORD_SIZE];
    bytes[0] = character;
    bytes[1] = class;
    bytes[2] = leader;
    bytes[8..12].copy_from_slice(&items);
    UnitPlacement::new(Record::new(&bytes, 0x20000 + index * UNIT_RECORD_SIZE))
}

pub mod ids {
    pub const MERCENARY: u8 = 0x01;
    pub const CAVALIER: u8 = 0x02;
    pub const WARRIOR: u8 = 0x03;
    pub const CLERIC: u8 = 0x04;
    pub const WYVERN: u8 = 0x05;
    pub const THIEF: u8 = 0x06;
    pub const LORD: u8 = 0x07;
    pub const MAGE: u8 = 0x08;

    pub const IRON_SWORD: u8 = 0x01;
    pub const STEEL_SWORD: u8 = 0x02;
    pub const SILVER_SWORD: u8 = 0x03;
    pub const IRON_LANCE: u8 = 0x04;
    pub const IRON_AXE: u8 = 0x05;
    pub const STEEL_AXE: u8 = 0x06;
    pub const IRON_BOW: u8 = 0x07;
    pub const STEEL_BOW: u8 = 0x08;
    pub const FIRE: u8 = 0x09;
    pub const HEAL: u8 = 0x0A;
    pub const LEGEND_SWORD: u8 = 0x0B;
    pub const RAPIER: u8 = 0x0C;
    pub const KILLER_LANCE: u8 = 0x0D;
    pub const VULNERARY: u8 = 0x6C;
    pub const LOCKPICK: u8 = 0x6D;
    pub const CHEST_KEY: u8 = 0x6E;

    pub const HERO: u8 = 0x01;
    pub const KNIGHT: u8 = 0x02;
    pub const PRIEST: u8 = 0x03;
    pub const ROGUE: u8 = 0x04;
    pub const TWIN_A: u8 = 0x05;
    pub const TWIN_B: u8 = 0x06;
    pub const BOSS: u8 = 0x40;
    pub const SOLDIER: u8 = 0x80;
}

pub fn rules() -> GameRules {
    use ids::*;
    GameRules {
        lord_classes: vec![LORD],
        thief_classes: vec![THIEF],
        flying_classes: vec![WYVERN],
        playable_characters: vec![HERO, KNIGHT, PRIEST, ROGUE, TWIN_A, TWIN_B],
        boss_characters: vec![BOSS],
        lord_characters: vec![HERO],
        thief_characters: vec![ROGUE],
        linked_characters: vec![vec![TWIN_A, TWIN_B]],
        must_lose_to: vec![MustLoseTo { boss: BOSS, character: HERO }],
        healing_staves: vec![HEAL],
        retained_items: vec![CHEST_KEY, LEGEND_SWORD],
        thief_items: vec![LOCKPICK],
        locked_items: vec![LockedItem {
            item: RAPIER,
            classes: vec![LORD],
            characters: vec![],
        }],
        stat_bonus_pointers: vec![0x08FF_0000, 0x08FF_0010],
        effectiveness_pointers: vec![0x08FE_0000],
        affinities: vec![1, 2, 3, 4, 5, 6, 7],
        ..GameRules::default()
    }
}

/// A tiny but complete game: every class family, a lord, a thief, a healer,
/// twins that must share a class, a boss with minions.
pub fn game() -> GameData {
    use ids::*;
    let rules = rules();

    let classes = vec![
        class(MERCENARY, 5, &[(WeaponType::Sword, S)], &[]),
        class(CAVALIER, 7, &[(WeaponType::Sword, S), (WeaponType::Lance, S)], &[]),
        class(WARRIOR, 5, &[(WeaponType::Axe, S), (WeaponType::Bow, S)], &[]),
        class(CLERIC, 5, &[(WeaponType::Staff, S)], &[]),
        class(WYVERN, 7, &[(WeaponType::Lance, S)], &[ClassCategory::Flying]),
        class(THIEF, 6, &[(WeaponType::Sword, S)], &[ClassCategory::Thief]),
        class(LORD, 5, &[(WeaponType::Sword, S)], &[ClassCategory::Lord]),
        class(MAGE, 5, &[(WeaponType::Anima, S)], &[]),
    ];

    let e = WeaponRank::E.value();
    let c = WeaponRank::C.value();
    let d = WeaponRank::D.value();
    let b = WeaponRank::B.value();
    let items: Vec<ItemDef> = vec![
        item(IRON_SWORD, WeaponType::Sword, e, (1, 1)),
        item(STEEL_SWORD, WeaponType::Sword, d, (1, 1)),
        item(SILVER_SWORD, WeaponType::Sword, b, (1, 1)),
        item(IRON_LANCE, WeaponType::Lance, e, (1, 1)),
        item(IRON_AXE, WeaponType::Axe, e, (1, 1)),
        item(STEEL_AXE, WeaponType::Axe, d, (1, 1)),
        item(IRON_BOW, WeaponType::Bow, e, (2, 2)),
        item(STEEL_BOW, WeaponType::Bow, d, (2, 2)),
        item(FIRE, WeaponType::Anima, e, (1, 2)),
        item(HEAL, WeaponType::Staff, e, (1, 1)),
        item(LEGEND_SWORD, WeaponType::Sword, S, (1, 1)),
        item(RAPIER, WeaponType::Sword, e, (1, 1)),
        item(KILLER_LANCE, WeaponType::Lance, d, (1, 1)),
        consumable(VULNERARY),
        consumable(LOCKPICK),
        consumable(CHEST_KEY),
    ]
    .into_iter()
    .map(|plain| ItemDef::new(plain.record().clone(), rules.item_traits(plain.id())))
    .collect();

    let characters: Vec<CharacterDef> = [
        (HERO, LORD, vec![(WeaponType::Sword, d)]),
        (KNIGHT, CAVALIER, vec![(WeaponType::Sword, c), (WeaponType::Lance, d)]),
        (PRIEST, CLERIC, vec![(WeaponType::Staff, d)]),
        (ROGUE, THIEF, vec![(WeaponType::Sword, e)]),
        (TWIN_A, MERCENARY, vec![(WeaponType::Sword, e)]),
        (TWIN_B, MERCENARY, vec![(WeaponType::Sword, e)]),
        (BOSS, MERCENARY, vec![(WeaponType::Sword, b)]),
    ]
    .into_iter()
    .map(|(id, class_id, ranks)| character(id, class_id, &ranks, rules.character_flags(id)))
    .collect();

    let units = vec![
        unit(0, HERO, LORD, 0, [RAPIER, IRON_SWORD, 0, 0]),
        unit(1, KNIGHT, CAVALIER, 0, [IRON_SWORD, VULNERARY, 0, 0]),
        unit(2, PRIEST, CLERIC, 0, [HEAL, 0, 0, 0]),
        unit(3, ROGUE, THIEF, 0, [IRON_SWORD, LOCKPICK, CHEST_KEY, 0]),
        unit(4, TWIN_A, MERCENARY, 0, [IRON_SWORD, 0, 0, 0]),
        unit(5, TWIN_B, MERCENARY, 0, [IRON_SWORD, 0, 0, 0]),
        unit(6, BOSS, MERCENARY, BOSS, [SILVER_SWORD, 0, 0, 0]),
        unit(7, SOLDIER, MERCENARY, BOSS, [IRON_SWORD, 0, 0, 0]),
        unit(8, SOLDIER, WYVERN, BOSS, [IRON_LANCE, VULNERARY, 0, 0]),
    ];

    GameData {
        classes: Table::new(classes),
        characters: Table::new(characters),
        items: Table::new(items),
        chapters: vec![Chapter {
            name: "Prologue".to_string(),
            lord_leader: HERO,
            class_safe: true,
            simplify: false,
            units,
        }],
        rules,
    }
}
