//! Making enemies tougher: class growths, boss bases and better weapons.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::class::MAX_GROWTH;
use crate::data::{ClassCategory, GameData, ItemSlots, Stat, WeaponRank, WeaponType};
use crate::EntityIssue;

/// Applied to every class's growths, which only enemies use.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum GrowthBuff {
    /// Add this many points.
    Flat(i64),
    /// Grow by this percentage.
    Scale(i64),
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum BuffCurve {
    #[default]
    Linear,
    EaseInOut,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BossBuff {
    pub max: i64,
    #[serde(default)]
    pub curve: BuffCurve,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySettings {
    pub minion_growths: Option<GrowthBuff>,
    pub boss_bases: Option<BossBuff>,
    /// Chance in percent that a boss's minion gets better weapons.
    pub improve_minion_weapons: Option<u32>,
    /// Chance in percent that a boss gets better weapons.
    pub improve_boss_weapons: Option<u32>,
}

pub fn buff_minion_growths(data: &mut GameData, buff: GrowthBuff) {
    for class in data.classes.iter_mut() {
        for stat in Stat::ALL {
            let growth = class.growth(stat);
            let buffed = match buff {
                GrowthBuff::Flat(amount) => growth + amount,
                GrowthBuff::Scale(percent) => {
                    (growth as f64 * (1.0 + percent as f64 / 100.0)) as i64
                }
            };
            class.set_growth(stat, buffed.min(MAX_GROWTH));
        }
    }
}

/// Late bosses get more: the bonus follows the chapter of first
/// appearance over the total chapter count.
pub fn buff_boss_bases(data: &mut GameData, buff: BossBuff) {
    let chapter_count = data.chapters.len();
    if chapter_count == 0 {
        return;
    }

    for id in data.rules.boss_characters.clone() {
        let Some(chapter) = data.appearance_chapter(id) else {
            log::debug!("boss 0x{id:02X} never appears, skipping");
            continue;
        };
        let linear = chapter as f64 / chapter_count as f64;
        let factor = match buff.curve {
            BuffCurve::Linear => linear,
            BuffCurve::EaseInOut => {
                let rise = linear.powi(2);
                rise / (rise + (1.0 - linear).powi(2))
            }
        };
        let amount = buff.max.min((buff.max as f64 * factor).ceil() as i64);

        let Some(boss) = data.characters.get_mut(id) else {
            log::warn!("{}", EntityIssue::MissingCharacter { id });
            continue;
        };
        let Some(class) = data.classes.get(boss.class_id()) else {
            log::warn!("{}", EntityIssue::MissingClass { id: boss.class_id() });
            continue;
        };
        for stat in Stat::ALL {
            let ceiling = class.cap(stat) - class.base(stat);
            boss.set_base(stat, (boss.base(stat) + amount).min(ceiling));
        }
        log::debug!("boss 0x{id:02X} (chapter {chapter}/{chapter_count}) bases +{amount}");
    }
}

/// Swap each weapon or staff below rank A for a random one of the next
/// rank up, or for a weapon locked to the unit's class.
fn upgrade_weapons<R: Rng + ?Sized>(
    data: &GameData,
    class_id: u8,
    slots: ItemSlots,
    rng: &mut R,
) -> ItemSlots {
    let mut ids = slots.as_array();
    let locked = data.items.locked_to_class(class_id);
    for slot in &mut ids {
        let Some(item) = data.items.get(*slot) else {
            continue;
        };
        let Some(ty) = item.weapon_type() else {
            continue;
        };
        if item.rank() >= WeaponRank::A {
            continue;
        }
        let mut options = data.items.of_type_and_rank(ty, item.rank().successor());
        options.extend(locked.iter().copied());
        if !options.is_empty() {
            *slot = options[rng.gen_range(0..options.len())];
        }
    }
    ItemSlots::new(ids)
}

pub fn improve_minion_weapons<R: Rng + ?Sized>(data: &mut GameData, probability: u32, rng: &mut R) {
    let mut upgraded = 0;
    for chapter_index in 0..data.chapters.len() {
        for unit_index in 0..data.chapters[chapter_index].units.len() {
            let unit = &data.chapters[chapter_index].units[unit_index];
            if !data.rules.boss_characters.contains(&unit.leader_id()) {
                continue;
            }
            let class_id = unit.class_id();
            let Some(class) = data.classes.get(class_id) else {
                continue;
            };
            if class.is(ClassCategory::Thief) || rng.gen_range(0..100) >= probability {
                continue;
            }
            let slots = upgrade_weapons(data, class_id, unit.items(), rng);
            data.chapters[chapter_index].units[unit_index].set_items(slots);
            upgraded += 1;
        }
    }

    // Generic enemies use their class ceilings as ranks.
    for class in data.classes.iter_mut() {
        for ty in WeaponType::ORDER {
            if class.supports(ty) {
                class.set_rank_ceiling(ty, WeaponRank::A.value());
            }
        }
    }
    log::debug!("upgraded weapons for {upgraded} minions");
}

pub fn improve_boss_weapons<R: Rng + ?Sized>(data: &mut GameData, probability: u32, rng: &mut R) {
    for chapter_index in 0..data.chapters.len() {
        for unit_index in 0..data.chapters[chapter_index].units.len() {
            let unit = &data.chapters[chapter_index].units[unit_index];
            let character_id = unit.character_id();
            if !data.rules.boss_characters.contains(&character_id) {
                continue;
            }
            if rng.gen_range(0..100) < probability {
                let slots = upgrade_weapons(data, unit.class_id(), unit.items(), rng);
                data.chapters[chapter_index].units[unit_index].set_items(slots);
            }

            let Some(boss) = data.characters.get_mut(character_id) else {
                log::warn!("{}", EntityIssue::MissingCharacter { id: character_id });
                continue;
            };
            for ty in WeaponType::ORDER {
                if boss.rank(ty) > 0 {
                    boss.set_rank(ty, WeaponRank::S.value());
                }
            }
        }
    }
}
