//! Making a unit's inventory match its (new) class.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::{Entity, ItemDef, ItemSlots, Table, WeaponRank, Wielder};
use crate::EntityIssue;

/// What replaces a weapon the unit can no longer use.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum WeaponReplacementPolicy {
    /// Closest weapon of the same type (or family) at or below the
    /// original's rank.
    #[default]
    Strict,
    /// Any usable weapon.
    AnyUsable,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct InventoryOptions {
    pub policy: WeaponReplacementPolicy,
    /// Replacements are the lowest-ranked usable weapons.
    pub force_basic: bool,
    pub requires_range: bool,
    pub requires_melee: bool,
    /// Give healers a healing staff and attackers a weapon if they end up
    /// without one.
    pub ensure_equipment: bool,
    /// The unit was moved out of a thief class.
    pub left_thief_class: bool,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InventoryChanges {
    pub replaced: Vec<(u8, u8)>,
    pub cleared: Vec<u8>,
    pub added: Vec<u8>,
    pub removed: Vec<u8>,
    pub restored: Vec<u8>,
}

impl InventoryChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Replace every weapon or staff `wielder` cannot use, then top up and give
/// back retained items.
pub fn validate_inventory<R: Rng + ?Sized>(
    items: &Table<ItemDef>,
    wielder: Wielder<'_>,
    slots: ItemSlots,
    options: &InventoryOptions,
    rng: &mut R,
) -> (ItemSlots, InventoryChanges) {
    let mut changes = InventoryChanges::default();
    let retained: Vec<u8> = slots
        .ids()
        .into_iter()
        .filter(|&id| items.get(id).is_some_and(|item| item.traits().retained))
        .collect();

    let mut ids = slots.as_array();
    for slot in &mut ids {
        let id = *slot;
        if id == 0 {
            continue;
        }
        let Some(item) = items.get(id) else {
            log::warn!("{}", EntityIssue::MissingItem { id });
            continue;
        };
        if item.weapon_type().is_none() || wielder.can_use(item) {
            continue;
        }
        match choose_replacement(items, wielder, item, options, rng) {
            Some(replacement) => {
                *slot = replacement;
                changes.replaced.push((id, replacement));
            }
            None => {
                log::warn!(
                    "{}",
                    EntityIssue::NoReplacement { item: id, class: wielder.class().id() }
                );
                *slot = 0;
                changes.cleared.push(id);
            }
        }
    }
    let mut slots = ItemSlots::new(ids);

    if options.left_thief_class {
        for id in slots.ids() {
            if items.get(id).is_some_and(|item| item.traits().thief_only) && slots.remove_item(id) {
                changes.removed.push(id);
            }
        }
    }

    if options.ensure_equipment {
        ensure_equipment(items, wielder, &mut slots, options, &mut changes, rng);
    }

    for id in retained {
        if slots.contains(id) {
            continue;
        }
        if slots.is_full() {
            let replacement = |held: &u8| {
                changes.replaced.iter().any(|(_, new)| new == held) || changes.added.contains(held)
            };
            let displaced = last_held(items, &slots, |item| !wielder.can_use(item))
                .or_else(|| slots.ids().into_iter().rev().find(replacement))
                .or_else(|| last_held(items, &slots, |_| true));
            if let Some(displaced) = displaced {
                slots.remove_item(displaced);
                changes.removed.push(displaced);
            }
        }
        if slots.give_items(&[id]).is_empty() {
            changes.restored.push(id);
        }
    }

    (slots, changes)
}

/// Last held item that is not retained and matches `eligible`.
fn last_held(
    items: &Table<ItemDef>,
    slots: &ItemSlots,
    eligible: impl Fn(&ItemDef) -> bool,
) -> Option<u8> {
    slots.ids().into_iter().rev().find(|&held| match items.get(held) {
        Some(item) => !item.traits().retained && eligible(item),
        None => true,
    })
}

/// Healers without a healing staff get one, attackers without a usable
/// weapon get a basic one. A full inventory gives up its last item that is
/// neither retained nor usable equipment, or failing that its last item
/// that is not retained.
fn ensure_equipment<R: Rng + ?Sized>(
    items: &Table<ItemDef>,
    wielder: Wielder<'_>,
    slots: &mut ItemSlots,
    options: &InventoryOptions,
    changes: &mut InventoryChanges,
    rng: &mut R,
) {
    let class = wielder.class();
    let holds = |slots: &ItemSlots, wanted: fn(&ItemDef) -> bool| {
        slots
            .ids()
            .into_iter()
            .filter_map(|id| items.get(id))
            .any(|item| wielder.can_use(item) && wanted(item))
    };

    if class.can_heal() && !holds(&*slots, |item: &ItemDef| item.traits().healing) {
        if let Some(staff) = healing_staff(items, wielder, rng) {
            give(items, wielder, slots, staff, changes);
        }
    }
    if class.can_attack() && !holds(&*slots, ItemDef::is_weapon) {
        if let Some(weapon) = basic_weapon(items, wielder, false, options.requires_range, rng) {
            give(items, wielder, slots, weapon, changes);
        }
    }
}

fn give(
    items: &Table<ItemDef>,
    wielder: Wielder<'_>,
    slots: &mut ItemSlots,
    id: u8,
    changes: &mut InventoryChanges,
) {
    if slots.is_full() {
        let displaced = last_held(items, slots, |item| !wielder.can_use(item))
            .or_else(|| last_held(items, slots, |_| true));
        if let Some(displaced) = displaced {
            slots.remove_item(displaced);
            changes.removed.push(displaced);
        }
    }
    if slots.give_items(&[id]).is_empty() {
        changes.added.push(id);
    } else {
        log::debug!("inventory full, could not add item 0x{id:02X}");
    }
}

fn choose_replacement<R: Rng + ?Sized>(
    items: &Table<ItemDef>,
    wielder: Wielder<'_>,
    original: &ItemDef,
    options: &InventoryOptions,
    rng: &mut R,
) -> Option<u8> {
    let staff_family = original.is_staff();

    if original.rank() == WeaponRank::S {
        let top: Vec<&ItemDef> = usable(items, wielder, staff_family)
            .filter(|item| item.rank() == WeaponRank::S)
            .collect();
        if let Some(id) = pick(&top, rng) {
            return Some(id);
        }
    }

    if options.force_basic {
        return basic_weapon(items, wielder, staff_family, options.requires_range, rng);
    }

    match options.policy {
        WeaponReplacementPolicy::Strict => sidegrade(items, wielder, original, rng),
        WeaponReplacementPolicy::AnyUsable => {
            random_weapon(items, wielder, staff_family, options, rng)
        }
    }
}

/// Usable weapons (or staves) that are not locked to someone.
fn usable<'a>(
    items: &'a Table<ItemDef>,
    wielder: Wielder<'a>,
    staff_family: bool,
) -> impl Iterator<Item = &'a ItemDef> + 'a {
    items.iter().filter(move |item| {
        item.weapon_type().is_some()
            && item.is_staff() == staff_family
            && item.traits().lock.is_none()
            && wielder.can_use(item)
    })
}

fn pick<R: Rng + ?Sized>(candidates: &[&ItemDef], rng: &mut R) -> Option<u8> {
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.gen_range(0..candidates.len())].id())
}

/// Same type when the wielder still has it, otherwise any usable type of
/// the same family, at the highest rank not above the original's.
fn sidegrade<R: Rng + ?Sized>(
    items: &Table<ItemDef>,
    wielder: Wielder<'_>,
    original: &ItemDef,
    rng: &mut R,
) -> Option<u8> {
    let staff_family = original.is_staff();
    let same_type = original.weapon_type().filter(|ty| wielder.supports(*ty));

    let candidates: Vec<&ItemDef> = usable(items, wielder, staff_family)
        .filter(|item| same_type.is_none() || item.weapon_type() == same_type)
        .filter(|item| item.rank_value() <= original.rank_value())
        .collect();
    let best = candidates.iter().map(|item| item.rank_value()).max()?;
    let top: Vec<&ItemDef> = candidates
        .into_iter()
        .filter(|item| item.rank_value() == best)
        .collect();
    pick(&top, rng)
}

fn random_weapon<R: Rng + ?Sized>(
    items: &Table<ItemDef>,
    wielder: Wielder<'_>,
    staff_family: bool,
    options: &InventoryOptions,
    rng: &mut R,
) -> Option<u8> {
    let all: Vec<&ItemDef> = usable(items, wielder, staff_family).collect();
    let fitting: Vec<&ItemDef> = all
        .iter()
        .copied()
        .filter(|item| {
            (!options.requires_range || item.is_ranged())
                && (!options.requires_melee || item.is_melee())
        })
        .collect();
    pick(&fitting, rng).or_else(|| pick(&all, rng))
}

/// Lowest-ranked usable weapon, ranged if the unit needs range.
pub fn basic_weapon<R: Rng + ?Sized>(
    items: &Table<ItemDef>,
    wielder: Wielder<'_>,
    staff_family: bool,
    requires_range: bool,
    rng: &mut R,
) -> Option<u8> {
    let mut candidates: Vec<&ItemDef> = usable(items, wielder, staff_family).collect();
    if requires_range && candidates.iter().any(|item| item.is_ranged()) {
        candidates.retain(|item| item.is_ranged());
    }
    let lowest = candidates.iter().map(|item| item.rank_value()).min()?;
    candidates.retain(|item| item.rank_value() == lowest);
    pick(&candidates, rng)
}

fn healing_staff<R: Rng + ?Sized>(
    items: &Table<ItemDef>,
    wielder: Wielder<'_>,
    rng: &mut R,
) -> Option<u8> {
    let staves: Vec<&ItemDef> = usable(items, wielder, true)
        .filter(|item| item.traits().healing)
        .collect();
    pick(&staves, rng)
}
