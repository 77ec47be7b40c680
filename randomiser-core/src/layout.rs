//! Per-version description of where the tables live in the image and which
//! IDs carry special meaning.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::character::CHARACTER_RECORD_SIZE;
use crate::data::class::CLASS_RECORD_SIZE;
use crate::data::item::ITEM_RECORD_SIZE;
use crate::data::unit::UNIT_RECORD_SIZE;
use crate::data::{
    Chapter, CharacterDef, CharacterFlags, ClassCategory, ClassDef, GameData, ItemDef, ItemTraits,
    PrfLock, Table, UnitPlacement,
};
use crate::record::Record;
use crate::{RandomiserError, Result};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TableLocation {
    pub offset: usize,
    pub count: usize,
}

impl TableLocation {
    fn span(&self, record_size: usize) -> Option<(usize, usize)> {
        let len = self.count.checked_mul(record_size)?;
        let end = self.offset.checked_add(len)?;
        Some((self.offset, end))
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChapterLayout {
    pub name: String,
    pub units: TableLocation,
    #[serde(default)]
    pub lord_leader: u8,
    /// Minions may take any class. When false they are limited to the
    /// safe classes.
    #[serde(default = "default_true")]
    pub class_safe: bool,
    #[serde(default)]
    pub simplify: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MustLoseTo {
    pub boss: u8,
    pub character: u8,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct LockedItem {
    pub item: u8,
    #[serde(default)]
    pub classes: Vec<u8>,
    #[serde(default)]
    pub characters: Vec<u8>,
}

/// Special-effect byte values for the effects that set one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EffectCodes {
    pub poison: u8,
    pub half_hp: u8,
    pub devil: u8,
}

impl Default for EffectCodes {
    fn default() -> Self {
        Self { poison: 0x01, half_hp: 0x03, devil: 0x04 }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    pub lord_classes: Vec<u8>,
    pub thief_classes: Vec<u8>,
    pub special_classes: Vec<u8>,
    pub flying_classes: Vec<u8>,
    pub monster_classes: Vec<u8>,

    pub playable_characters: Vec<u8>,
    pub boss_characters: Vec<u8>,
    pub lord_characters: Vec<u8>,
    pub thief_characters: Vec<u8>,
    pub special_characters: Vec<u8>,
    pub restricted_characters: Vec<u8>,
    pub range_required: Vec<u8>,
    pub melee_required: Vec<u8>,
    pub linked_characters: Vec<Vec<u8>>,
    pub must_lose_to: Vec<MustLoseTo>,
    /// Classes restricted characters may be placed in.
    pub safe_classes: Vec<u8>,

    pub healing_staves: Vec<u8>,
    pub retained_items: Vec<u8>,
    pub thief_items: Vec<u8>,
    pub locked_items: Vec<LockedItem>,

    pub stat_bonus_pointers: Vec<u32>,
    pub effectiveness_pointers: Vec<u32>,
    pub affinities: Vec<u8>,
    pub effect_codes: EffectCodes,
}

impl GameRules {
    pub fn class_categories(&self, id: u8) -> Vec<ClassCategory> {
        let table = [
            (ClassCategory::Flying, &self.flying_classes),
            (ClassCategory::Thief, &self.thief_classes),
            (ClassCategory::Lord, &self.lord_classes),
            (ClassCategory::Special, &self.special_classes),
            (ClassCategory::Monster, &self.monster_classes),
        ];
        table
            .into_iter()
            .filter(|(_, ids)| ids.contains(&id))
            .map(|(category, _)| category)
            .collect()
    }

    pub fn character_flags(&self, id: u8) -> CharacterFlags {
        CharacterFlags {
            playable: self.playable_characters.contains(&id),
            boss: self.boss_characters.contains(&id),
            lord: self.lord_characters.contains(&id),
            thief: self.thief_characters.contains(&id),
            special: self.special_characters.contains(&id),
            restricted: self.restricted_characters.contains(&id),
            requires_range: self.range_required.contains(&id),
            requires_melee: self.melee_required.contains(&id),
        }
    }

    pub fn item_traits(&self, id: u8) -> ItemTraits {
        ItemTraits {
            healing: self.healing_staves.contains(&id),
            retained: self.retained_items.contains(&id),
            thief_only: self.thief_items.contains(&id),
            lock: self
                .locked_items
                .iter()
                .find(|locked| locked.item == id)
                .map(|locked| PrfLock {
                    classes: locked.classes.clone(),
                    characters: locked.characters.clone(),
                }),
        }
    }

    pub fn has_monsters(&self) -> bool {
        !self.monster_classes.is_empty()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameLayout {
    pub name: String,
    pub game_code: String,
    pub game_code_offset: usize,
    pub classes: TableLocation,
    pub characters: TableLocation,
    pub items: TableLocation,
    #[serde(default)]
    pub chapters: Vec<ChapterLayout>,
    #[serde(default)]
    pub rules: GameRules,
}

impl GameLayout {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Check that `rom` is the image this layout describes: the game code
    /// matches and every table fits inside it.
    pub fn validate(&self, rom: &[u8]) -> Result<()> {
        let code = self.game_code.as_bytes();
        let found = self
            .game_code_offset
            .checked_add(code.len())
            .and_then(|end| rom.get(self.game_code_offset..end));
        if found != Some(code) {
            return Err(RandomiserError::Layout(format!(
                "image is not {} (expected game code {:?} at 0x{:X})",
                self.name, self.game_code, self.game_code_offset
            )));
        }

        let mut tables = vec![
            ("class table".to_string(), self.classes, CLASS_RECORD_SIZE),
            ("character table".to_string(), self.characters, CHARACTER_RECORD_SIZE),
            ("item table".to_string(), self.items, ITEM_RECORD_SIZE),
        ];
        for chapter in &self.chapters {
            tables.push((format!("{} unit list", chapter.name), chapter.units, UNIT_RECORD_SIZE));
        }

        for (name, location, size) in tables {
            match location.span(size) {
                Some((_, end)) if end <= rom.len() => {}
                _ => {
                    return Err(RandomiserError::Layout(format!(
                        "{name} at 0x{:X} ({} records) runs past the end of the image \
                         (0x{:X} bytes)",
                        location.offset,
                        location.count,
                        rom.len()
                    )))
                }
            }
        }
        Ok(())
    }

    /// Validate the image, then build every record.
    pub fn load(&self, rom: &[u8]) -> Result<GameData> {
        self.validate(rom)?;
        let rules = self.rules.clone();

        let classes = records(rom, self.classes, CLASS_RECORD_SIZE)
            .map(|record| {
                let id = record.read_u8(0x04);
                ClassDef::new(record, &rules.class_categories(id))
            })
            .collect();
        let characters = records(rom, self.characters, CHARACTER_RECORD_SIZE)
            .map(|record| {
                let id = record.read_u8(0x04);
                CharacterDef::new(record, rules.character_flags(id))
            })
            .collect();
        let items = records(rom, self.items, ITEM_RECORD_SIZE)
            .map(|record| {
                let id = record.read_u8(0x06);
                ItemDef::new(record, rules.item_traits(id))
            })
            .collect();
        let chapters = self
            .chapters
            .iter()
            .map(|chapter| Chapter {
                name: chapter.name.clone(),
                lord_leader: chapter.lord_leader,
                class_safe: chapter.class_safe,
                simplify: chapter.simplify,
                units: records(rom, chapter.units, UNIT_RECORD_SIZE)
                    .map(UnitPlacement::new)
                    .collect(),
            })
            .collect();

        log::debug!(
            "loaded {}: {} classes, {} characters, {} items, {} chapters",
            self.name,
            self.classes.count,
            self.characters.count,
            self.items.count,
            self.chapters.len()
        );

        Ok(GameData {
            classes: Table::new(classes),
            characters: Table::new(characters),
            items: Table::new(items),
            chapters,
            rules,
        })
    }
}

fn records(rom: &[u8], location: TableLocation, size: usize) -> impl Iterator<Item = Record> + '_ {
    (0..location.count).map(move |i| {
        let offset = location.offset + i * size;
        Record::new(&rom[offset..offset + size], offset)
    })
}
