//! Moving a character's weapon ranks and personal bases onto a new class.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::{CharacterDef, ClassDef, Stat, WeaponType};
use crate::mapper::mapped_values;

/// Carry a character's existing ranks over to the types `target` supports.
///
/// Ranks are drawn at random from what the character already had, never
/// below the class's base-rank floor, and types the class cannot use drop to
/// zero. When the character had more ranks than the class has types, the
/// lowest ones are discarded first.
pub fn transfer_weapon_ranks<R: Rng + ?Sized>(
    character: &mut CharacterDef,
    target: &ClassDef,
    rng: &mut R,
) {
    let mut ranks: Vec<u8> = character
        .ranks()
        .into_iter()
        .map(|(_, value)| value)
        .filter(|&value| value > 0)
        .collect();
    ranks.sort_unstable();

    let supported = target.supported_types();
    if ranks.len() > supported.len() {
        ranks.drain(..ranks.len() - supported.len());
    }

    let floor = target.base_rank_floor();
    for ty in WeaponType::ORDER {
        if !target.supports(ty) {
            character.set_rank(ty, 0);
            continue;
        }
        let mut value = floor;
        if !ranks.is_empty() {
            let index = rng.gen_range(0..ranks.len());
            value = value.max(ranks[index]);
            if rng.gen_bool(0.5) {
                ranks.remove(index);
            }
        }
        character.set_rank(ty, value);
    }
}

/// How personal bases follow a character into a new class.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum BasesTransfer {
    /// Personal bases are left alone.
    NoChange,
    /// Keep effective stats (class base + personal base) where they were.
    #[default]
    AdjustToMatch,
    /// Keep the effective totals but reorder STR..RES to the new class's
    /// strengths.
    AdjustToClass,
}

pub fn rebase_stats(
    character: &mut CharacterDef,
    source: &ClassDef,
    target: &ClassDef,
    mode: BasesTransfer,
) {
    match mode {
        BasesTransfer::NoChange => {}
        BasesTransfer::AdjustToMatch => {
            for stat in Stat::ALL {
                shift_by_class_delta(character, source, target, stat);
            }
            let con = character.con();
            if con < 0 && -con > target.con() {
                character.set_con(-target.con());
            }
        }
        BasesTransfer::AdjustToClass => {
            shift_by_class_delta(character, source, target, Stat::Hp);
            shift_by_class_delta(character, source, target, Stat::Lck);

            let effective: Vec<i64> = Stat::COMBAT
                .iter()
                .map(|&stat| character.base(stat) + source.base(stat))
                .collect();
            let source_bases: Vec<i64> =
                Stat::COMBAT.iter().map(|&stat| source.base(stat)).collect();
            let target_bases: Vec<i64> =
                Stat::COMBAT.iter().map(|&stat| target.base(stat)).collect();

            let mapped = mapped_values(&effective, &source_bases, &target_bases);
            for (stat, value) in Stat::COMBAT.into_iter().zip(mapped) {
                character.set_base(stat, value - target.base(stat));
            }
        }
    }
}

fn shift_by_class_delta(
    character: &mut CharacterDef,
    source: &ClassDef,
    target: &ClassDef,
    stat: Stat,
) {
    let delta = source.base(stat) - target.base(stat);
    character.set_base(stat, character.base(stat) + delta);
}
