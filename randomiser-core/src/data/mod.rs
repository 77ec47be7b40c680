//! Typed views over the record tables of the image.

use std::collections::BTreeMap;

use crate::layout::GameRules;
use crate::patch::DiffCompiler;
use crate::record::Record;

pub mod character;
pub mod class;
pub mod item;
pub mod rank;
pub mod unit;

#[cfg(test)]
pub mod testing;

pub use character::{CharacterDef, CharacterFlags};
pub use class::{ClassCategory, ClassDef};
pub use item::{ItemDef, ItemTraits, PrfLock};
pub use rank::{WeaponRank, WeaponType};
pub use unit::{ItemSlots, UnitPlacement};

/// Stats shared by class and character records.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Stat {
    Hp,
    Str,
    Skl,
    Spd,
    Def,
    Res,
    Lck,
}

impl Stat {
    pub const ALL: [Stat; 7] = [
        Stat::Hp,
        Stat::Str,
        Stat::Skl,
        Stat::Spd,
        Stat::Def,
        Stat::Res,
        Stat::Lck,
    ];

    /// The five stats that are redistributed when rebasing to a class.
    pub const COMBAT: [Stat; 5] = [Stat::Str, Stat::Skl, Stat::Spd, Stat::Def, Stat::Res];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Anything stored as one fixed-size record keyed by a one-byte ID.
pub trait Entity {
    fn id(&self) -> u8;
    fn record(&self) -> &Record;
    fn record_mut(&mut self) -> &mut Record;
}

/// Catalog in table (declaration) order with lookup by ID.
#[derive(Clone, Debug)]
pub struct Table<T> {
    entries: Vec<T>,
    index: BTreeMap<u8, usize>,
}

impl<T: Entity> Table<T> {
    /// The first entry with a given ID wins; later duplicates stay in the
    /// table (and in the patch) but are not reachable by ID.
    pub fn new(entries: Vec<T>) -> Self {
        let mut index = BTreeMap::new();
        for (i, entry) in entries.iter().enumerate() {
            index.entry(entry.id()).or_insert(i);
        }
        Self { entries, index }
    }

    pub fn get(&self, id: u8) -> Option<&T> {
        self.index.get(&id).map(|&i| &self.entries[i])
    }

    pub fn get_mut(&mut self, id: u8) -> Option<&mut T> {
        match self.index.get(&id) {
            Some(&i) => Some(&mut self.entries[i]),
            None => None,
        }
    }

    pub fn contains(&self, id: u8) -> bool {
        self.index.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut()
    }

    /// IDs in table order.
    pub fn ids(&self) -> Vec<u8> {
        self.entries.iter().map(Entity::id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn commit(&mut self) {
        for entry in &mut self.entries {
            entry.record_mut().commit();
        }
    }

    pub fn compile_diffs(&mut self, compiler: &mut DiffCompiler) {
        for entry in &mut self.entries {
            compiler.add_record(entry.record_mut());
        }
    }
}

/// Who is holding a weapon: a named character in its class, or a generic
/// unit whose ranks are its class's ceilings.
#[derive(Copy, Clone, Debug)]
pub enum Wielder<'a> {
    Character {
        character: &'a CharacterDef,
        class: &'a ClassDef,
    },
    Generic {
        class: &'a ClassDef,
    },
}

impl<'a> Wielder<'a> {
    pub fn class(&self) -> &'a ClassDef {
        match self {
            Wielder::Character { class, .. } | Wielder::Generic { class } => class,
        }
    }

    pub fn character_id(&self) -> Option<u8> {
        match self {
            Wielder::Character { character, .. } => Some(character.id()),
            Wielder::Generic { .. } => None,
        }
    }

    /// Effective rank value for a weapon type.
    pub fn rank(&self, ty: WeaponType) -> u8 {
        match self {
            Wielder::Character { character, class } => {
                if class.supports(ty) {
                    character.rank(ty)
                } else {
                    0
                }
            }
            Wielder::Generic { class } => class.rank_ceiling(ty),
        }
    }

    pub fn supports(&self, ty: WeaponType) -> bool {
        self.class().supports(ty)
    }

    /// Whether the item is a weapon or staff this wielder can equip.
    pub fn can_use(&self, item: &ItemDef) -> bool {
        let Some(ty) = item.weapon_type() else {
            return false;
        };
        if !self.supports(ty) {
            return false;
        }
        if let Some(lock) = &item.traits().lock {
            return lock.allows(self.class().id(), self.character_id());
        }
        let rank = self.rank(ty);
        rank > 0 && rank >= item.rank_value()
    }
}

#[derive(Clone, Debug)]
pub struct Chapter {
    pub name: String,
    pub lord_leader: u8,
    pub class_safe: bool,
    pub simplify: bool,
    pub units: Vec<UnitPlacement>,
}

/// Every table the randomiser mutates, plus the per-version rules.
#[derive(Clone, Debug)]
pub struct GameData {
    pub classes: Table<ClassDef>,
    pub characters: Table<CharacterDef>,
    pub items: Table<ItemDef>,
    pub chapters: Vec<Chapter>,
    pub rules: GameRules,
}

impl GameData {
    pub fn commit(&mut self) {
        self.classes.commit();
        self.characters.commit();
        self.items.commit();
        for chapter in &mut self.chapters {
            for unit in &mut chapter.units {
                unit.record_mut().commit();
            }
        }
    }

    /// Gather every committed change in a stable order: classes, characters,
    /// items, then chapter units chapter by chapter.
    pub fn compile_diffs(&mut self) -> DiffCompiler {
        let mut compiler = DiffCompiler::new();
        self.classes.compile_diffs(&mut compiler);
        self.characters.compile_diffs(&mut compiler);
        self.items.compile_diffs(&mut compiler);
        for chapter in &mut self.chapters {
            for unit in &mut chapter.units {
                compiler.add_record(unit.record_mut());
            }
        }
        compiler
    }

    /// Members of the character's linked group, the character itself first.
    pub fn linked_characters(&self, id: u8) -> Vec<u8> {
        let mut linked = vec![id];
        if let Some(group) = self.rules.linked_characters.iter().find(|g| g.contains(&id)) {
            linked.extend(group.iter().copied().filter(|&other| other != id));
        }
        linked
    }

    /// The playable character a boss is scripted to lose to.
    pub fn must_lose_to(&self, boss_id: u8) -> Option<u8> {
        self.rules
            .must_lose_to
            .iter()
            .find(|pair| pair.boss == boss_id)
            .map(|pair| pair.character)
    }

    /// Index of the first chapter placing this character, counting from 1.
    pub fn appearance_chapter(&self, character_id: u8) -> Option<usize> {
        self.chapters
            .iter()
            .position(|chapter| chapter.units.iter().any(|u| u.character_id() == character_id))
            .map(|i| i + 1)
    }
}
