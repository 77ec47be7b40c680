//! Class reassignment passes for playable characters, bosses and minions.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::classes::{candidate_classes, ClassOptions, ClassPicker};
use crate::data::{ClassCategory, GameData, Stat, Wielder};
use crate::inventory::{validate_inventory, InventoryOptions, WeaponReplacementPolicy};
use crate::transfer::{rebase_stats, transfer_weapon_ranks, BasesTransfer};
use crate::EntityIssue;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassSettings {
    pub randomize_playable: bool,
    pub randomize_bosses: bool,
    pub randomize_minions: bool,
    pub include_lords: bool,
    pub include_thieves: bool,
    pub include_special: bool,
    pub force_change: bool,
    pub assign_evenly: bool,
    pub separate_monsters: bool,
    pub weapon_policy: WeaponReplacementPolicy,
    pub bases_transfer: BasesTransfer,
}

impl Default for ClassSettings {
    fn default() -> Self {
        Self {
            randomize_playable: true,
            randomize_bosses: false,
            randomize_minions: false,
            include_lords: false,
            include_thieves: false,
            include_special: false,
            force_change: false,
            assign_evenly: false,
            separate_monsters: false,
            weapon_policy: WeaponReplacementPolicy::Strict,
            bases_transfer: BasesTransfer::AdjustToMatch,
        }
    }
}

/// One class change.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Reassignment {
    pub character: u8,
    pub from: u8,
    pub to: u8,
}

#[derive(Clone, Debug, Default)]
pub struct ClassReport {
    pub reassigned: Vec<Reassignment>,
    pub issues: Vec<EntityIssue>,
}

impl ClassReport {
    pub fn absorb(&mut self, other: ClassReport) {
        self.reassigned.extend(other.reassigned);
        self.issues.extend(other.issues);
    }

    fn issue(&mut self, issue: EntityIssue) {
        log::warn!("{issue}");
        self.issues.push(issue);
    }
}

/// Per-character knobs for moving one character (and its units) to a class.
struct Move {
    source: u8,
    target: u8,
    force_basic: bool,
    requires_range: bool,
    requires_melee: bool,
}

pub fn randomize_playable_classes<R: Rng + ?Sized>(
    data: &mut GameData,
    settings: &ClassSettings,
    rng: &mut R,
) -> ClassReport {
    let mut report = ClassReport::default();
    let mut picker = if settings.assign_evenly {
        ClassPicker::evenly(data.classes.ids())
    } else {
        ClassPicker::uniform()
    };
    let mut determined = BTreeSet::new();

    for id in data.characters.ids() {
        let Some(character) = data.characters.get(id) else {
            continue;
        };
        let flags = character.flags().clone();
        if !flags.playable || determined.contains(&id) {
            continue;
        }
        if (flags.lord && !settings.include_lords)
            || (flags.thief && !settings.include_thieves)
            || (flags.special && !settings.include_special)
        {
            continue;
        }

        let source_id = character.class_id();
        let Some(source) = data.classes.get(source_id) else {
            report.issue(EntityIssue::MissingClass { id: source_id });
            continue;
        };
        let options = ClassOptions {
            include_lords: settings.include_lords,
            include_thieves: settings.include_thieves,
            include_special: settings.include_special,
            force_change: settings.force_change,
            separate_monsters: settings.separate_monsters,
            class_restricted: flags.restricted,
            requires_range: flags.requires_range,
            requires_melee: flags.requires_melee,
            must_lose_to: None,
        };
        let candidates = candidate_classes(data, source, &options);
        let Some(target) =
            picker.pick(data, &candidates, source.is(ClassCategory::Flying), rng)
        else {
            report.issue(EntityIssue::NoCandidateClass { character: id, class: source_id });
            continue;
        };

        for linked in data.linked_characters(id) {
            determined.insert(linked);
            let step = Move {
                source: source_id,
                target,
                force_basic: false,
                requires_range: flags.requires_range,
                requires_melee: flags.requires_melee,
            };
            move_character(data, linked, &step, settings, &mut report, rng);
        }
    }

    report
}

pub fn randomize_boss_classes<R: Rng + ?Sized>(
    data: &mut GameData,
    settings: &ClassSettings,
    rng: &mut R,
) -> ClassReport {
    let mut report = ClassReport::default();
    let mut picker = ClassPicker::uniform();
    let mut determined = BTreeSet::new();

    for id in data.characters.ids() {
        let Some(character) = data.characters.get(id) else {
            continue;
        };
        let flags = character.flags().clone();
        if !flags.boss || determined.contains(&id) {
            continue;
        }

        let source_id = character.class_id();
        let Some(source) = data.classes.get(source_id) else {
            report.issue(EntityIssue::MissingClass { id: source_id });
            continue;
        };
        let must_lose_to = data
            .must_lose_to(id)
            .and_then(|hero| data.characters.get(hero))
            .map(|hero| hero.class_id());
        let options = ClassOptions {
            force_change: settings.force_change,
            separate_monsters: settings.separate_monsters,
            class_restricted: flags.restricted,
            requires_range: flags.requires_range,
            requires_melee: flags.requires_melee,
            must_lose_to,
            ..ClassOptions::default()
        };
        let candidates = candidate_classes(data, source, &options);
        let Some(target) =
            picker.pick(data, &candidates, source.is(ClassCategory::Flying), rng)
        else {
            report.issue(EntityIssue::NoCandidateClass { character: id, class: source_id });
            continue;
        };

        for linked in data.linked_characters(id) {
            determined.insert(linked);
            let step = Move {
                source: source_id,
                target,
                force_basic: must_lose_to.is_some() && linked == id,
                requires_range: flags.requires_range,
                requires_melee: flags.requires_melee,
            };
            move_character(data, linked, &step, settings, &mut report, rng);

            if must_lose_to.is_some() {
                if let Some(boss) = data.characters.get_mut(linked) {
                    for stat in [Stat::Skl, Stat::Spd, Stat::Def, Stat::Res] {
                        boss.set_base(stat, boss.base(stat) >> 1);
                    }
                }
            }
        }
    }

    report
}

/// Generic enemies: every unit that is neither a boss nor a playable
/// character and does not start as a thief.
pub fn randomize_minion_classes<R: Rng + ?Sized>(
    data: &mut GameData,
    settings: &ClassSettings,
    rng: &mut R,
) -> ClassReport {
    let mut report = ClassReport::default();
    let mut picker = ClassPicker::uniform();
    let inventory = InventoryOptions {
        policy: settings.weapon_policy,
        ..InventoryOptions::default()
    };

    for chapter_index in 0..data.chapters.len() {
        let chapter = &data.chapters[chapter_index];
        let lord_class = data
            .characters
            .get(chapter.lord_leader)
            .map(|lord| lord.class_id());
        let restricted = !chapter.class_safe;
        let simplify = chapter.simplify;

        for unit_index in 0..data.chapters[chapter_index].units.len() {
            let unit = &data.chapters[chapter_index].units[unit_index];
            let character_id = unit.character_id();
            let source_id = unit.class_id();
            if data.rules.boss_characters.contains(&character_id)
                || data.rules.playable_characters.contains(&character_id)
            {
                continue;
            }
            let Some(source) = data.classes.get(source_id) else {
                log::debug!(
                    "skipping minion 0x{character_id:02X} in unknown class 0x{source_id:02X}"
                );
                continue;
            };
            if source.is(ClassCategory::Thief) {
                continue;
            }

            let options = ClassOptions {
                force_change: settings.force_change,
                separate_monsters: settings.separate_monsters,
                class_restricted: restricted,
                must_lose_to: if simplify { lord_class } else { None },
                ..ClassOptions::default()
            };
            let candidates = candidate_classes(data, source, &options);
            let Some(target_id) =
                picker.pick(data, &candidates, source.is(ClassCategory::Flying), rng)
            else {
                report.issue(EntityIssue::NoCandidateClass {
                    character: character_id,
                    class: source_id,
                });
                continue;
            };
            let Some(target) = data.classes.get(target_id) else {
                continue;
            };

            let unit = &mut data.chapters[chapter_index].units[unit_index];
            log::debug!(
                "minion 0x{character_id:02X}: class 0x{source_id:02X} -> 0x{target_id:02X}, \
                 items {:02X?}",
                unit.items().ids()
            );
            unit.set_class_id(target_id);
            let (slots, _) = validate_inventory(
                &data.items,
                Wielder::Generic { class: target },
                unit.items(),
                &inventory,
                rng,
            );
            unit.set_items(slots);
            report.reassigned.push(Reassignment {
                character: character_id,
                from: source_id,
                to: target_id,
            });
        }
    }

    report
}

/// Put one character into its new class: ranks, bases, then the inventory
/// of every unit that places it.
fn move_character<R: Rng + ?Sized>(
    data: &mut GameData,
    character_id: u8,
    step: &Move,
    settings: &ClassSettings,
    report: &mut ClassReport,
    rng: &mut R,
) {
    let Some(source) = data.classes.get(step.source) else {
        report.issue(EntityIssue::MissingClass { id: step.source });
        return;
    };
    let Some(target) = data.classes.get(step.target) else {
        report.issue(EntityIssue::MissingClass { id: step.target });
        return;
    };
    let Some(character) = data.characters.get_mut(character_id) else {
        report.issue(EntityIssue::MissingCharacter { id: character_id });
        return;
    };

    log::debug!(
        "character 0x{character_id:02X}: class 0x{:02X} -> 0x{:02X}",
        step.source,
        step.target
    );
    character.set_class_id(step.target);
    transfer_weapon_ranks(character, target, rng);
    rebase_stats(character, source, target, settings.bases_transfer);
    report.reassigned.push(Reassignment {
        character: character_id,
        from: step.source,
        to: step.target,
    });

    let character = &*character;
    let wielder = Wielder::Character { character, class: target };
    let options = InventoryOptions {
        policy: settings.weapon_policy,
        force_basic: step.force_basic,
        requires_range: step.requires_range,
        requires_melee: step.requires_melee,
        ensure_equipment: true,
        left_thief_class: source.is(ClassCategory::Thief) && !target.is(ClassCategory::Thief),
    };

    for chapter in &mut data.chapters {
        for unit in chapter.units.iter_mut().filter(|u| u.character_id() == character_id) {
            if unit.class_id() != step.source {
                log::debug!(
                    "{}: unit for 0x{character_id:02X} starts in class 0x{:02X}, expected 0x{:02X}",
                    chapter.name,
                    unit.class_id(),
                    step.source
                );
            }
            unit.set_class_id(step.target);
            let (slots, changes) =
                validate_inventory(&data.items, wielder, unit.items(), &options, rng);
            if !changes.is_empty() {
                log::debug!(
                    "{}: 0x{character_id:02X} inventory now {:02X?}",
                    chapter.name,
                    slots.ids()
                );
            }
            unit.set_items(slots);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::{game, ids::*};
    use rand::{rngs::StdRng, SeedableRng};

    fn unit_of(data: &GameData, character: u8) -> &crate::data::UnitPlacement {
        data.chapters[0]
            .units
            .iter()
            .find(|u| u.character_id() == character)
            .unwrap()
    }

    #[test]
    fn playable_units_follow_their_character() {
        let mut data = game();
        let settings = ClassSettings { force_change: true, ..ClassSettings::default() };
        let mut rng = StdRng::seed_from_u64(10);
        let report = randomize_playable_classes(&mut data, &settings, &mut rng);

        for id in [KNIGHT, PRIEST, TWIN_A, TWIN_B] {
            let character = data.characters.get(id).unwrap();
            assert_eq!(unit_of(&data, id).class_id(), character.class_id());
            let class = data.classes.get(character.class_id()).unwrap();
            let wielder = Wielder::Character { character, class };
            for item_id in unit_of(&data, id).items().ids() {
                let item = data.items.get(item_id).unwrap();
                assert!(
                    item.weapon_type().is_none() || wielder.can_use(item),
                    "{id:#X} holds {item_id:#X}"
                );
            }
        }
        assert!(report.reassigned.iter().all(|r| r.from != r.to));
        // Lords and thieves stay put unless included.
        assert_eq!(data.characters.get(HERO).unwrap().class_id(), LORD);
        assert_eq!(data.characters.get(ROGUE).unwrap().class_id(), THIEF);
    }

    #[test]
    fn linked_characters_share_a_class() {
        for seed in 0..8 {
            let mut data = game();
            let mut rng = StdRng::seed_from_u64(seed);
            randomize_playable_classes(&mut data, &ClassSettings::default(), &mut rng);
            assert_eq!(
                data.characters.get(TWIN_A).unwrap().class_id(),
                data.characters.get(TWIN_B).unwrap().class_id()
            );
        }
    }

    #[test]
    fn thieves_lose_lockpicks_when_moved() {
        let mut data = game();
        let settings = ClassSettings {
            include_thieves: true,
            force_change: true,
            ..ClassSettings::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        randomize_playable_classes(&mut data, &settings, &mut rng);
        assert_ne!(data.characters.get(ROGUE).unwrap().class_id(), THIEF);
        let items = unit_of(&data, ROGUE).items();
        assert!(!items.contains(LOCKPICK));
        assert!(items.contains(CHEST_KEY));
    }

    #[test]
    fn must_lose_bosses_are_weakened() {
        let mut data = game();
        data.characters.get_mut(HERO).unwrap().set_class_id(CAVALIER);
        let before: Vec<i64> = [Stat::Skl, Stat::Spd, Stat::Def, Stat::Res]
            .iter()
            .map(|&s| data.characters.get(BOSS).unwrap().base(s))
            .collect();
        let settings = ClassSettings {
            bases_transfer: BasesTransfer::NoChange,
            ..ClassSettings::default()
        };
        let mut rng = StdRng::seed_from_u64(4);
        let report = randomize_boss_classes(&mut data, &settings, &mut rng);
        assert_eq!(report.reassigned.len(), 1);

        let boss = data.characters.get(BOSS).unwrap();
        let class = data.classes.get(boss.class_id()).unwrap();
        assert!(class.combat_rating() < data.classes.get(CAVALIER).unwrap().combat_rating());
        assert_eq!(unit_of(&data, BOSS).class_id(), boss.class_id());

        let after: Vec<i64> = [Stat::Skl, Stat::Spd, Stat::Def, Stat::Res]
            .iter()
            .map(|&s| boss.base(s))
            .collect();
        let halved: Vec<i64> = before.iter().map(|v| v >> 1).collect();
        assert_eq!(after, halved);
    }

    #[test]
    fn bosses_without_weaker_classes_stay_put() {
        let mut data = game();
        let mut rng = StdRng::seed_from_u64(4);
        let report = randomize_boss_classes(&mut data, &ClassSettings::default(), &mut rng);
        assert!(report.reassigned.is_empty());
        assert_eq!(
            report.issues,
            vec![EntityIssue::NoCandidateClass { character: BOSS, class: MERCENARY }]
        );
        assert_eq!(data.characters.get(BOSS).unwrap().class_id(), MERCENARY);
    }

    #[test]
    fn minions_change_class_and_keep_usable_gear() {
        let mut data = game();
        let settings = ClassSettings { force_change: true, ..ClassSettings::default() };
        let mut rng = StdRng::seed_from_u64(8);
        let report = randomize_minion_classes(&mut data, &settings, &mut rng);

        assert_eq!(report.reassigned.len(), 2);
        for unit in data.chapters[0].units.iter().filter(|u| u.character_id() == SOLDIER) {
            let class = data.classes.get(unit.class_id()).unwrap();
            assert!(!class.is(ClassCategory::Lord) && !class.is(ClassCategory::Thief));
            let wielder = Wielder::Generic { class };
            for id in unit.items().ids() {
                let item = data.items.get(id).unwrap();
                assert!(item.weapon_type().is_none() || wielder.can_use(item));
            }
        }
        // Boss and playable units are left to their own passes.
        assert_eq!(unit_of(&data, BOSS).class_id(), MERCENARY);
        assert_eq!(unit_of(&data, HERO).class_id(), LORD);
    }
}
