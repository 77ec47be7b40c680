//! Weapon stat variance and random weapon effects.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::data::{Entity, GameData, ItemDef, WeaponType};
use crate::layout::EffectCodes;

/// Vary a value by up to `variance` either way, then clamp into
/// `[min, max]`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StatVariance {
    pub min: i64,
    pub max: i64,
    pub variance: i64,
}

impl StatVariance {
    fn apply<R: Rng + ?Sized>(&self, value: i64, rng: &mut R) -> i64 {
        let delta = rng.gen_range(0..=self.variance.max(0));
        let varied = if rng.gen_bool(0.5) { value + delta } else { value - delta };
        varied.clamp(self.min, self.max.max(self.min))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum WeaponEffect {
    None,
    StatBoosts,
    Effectiveness,
    Unbreakable,
    Brave,
    ReverseTriangle,
    ExtendRange,
    HighCritical,
    MagicDamage,
    Poison,
    HalfHp,
    Devil,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponSettings {
    pub might: Option<StatVariance>,
    pub hit: Option<StatVariance>,
    pub weight: Option<StatVariance>,
    pub durability: Option<StatVariance>,
    /// Effects a weapon may be given; empty leaves effects alone.
    pub effects: Vec<WeaponEffect>,
}

impl WeaponSettings {
    pub fn varies_stats(&self) -> bool {
        self.might.is_some()
            || self.hit.is_some()
            || self.weight.is_some()
            || self.durability.is_some()
    }
}

pub fn randomize_weapon_stats<R: Rng + ?Sized>(
    data: &mut GameData,
    settings: &WeaponSettings,
    rng: &mut R,
) {
    for weapon in data.items.iter_mut().filter(|item| item.is_weapon()) {
        if let Some(might) = settings.might {
            weapon.set_might(might.apply(weapon.might(), rng));
        }
        if let Some(hit) = settings.hit {
            weapon.set_hit(hit.apply(weapon.hit(), rng));
        }
        if let Some(weight) = settings.weight {
            weapon.set_weight(weight.apply(weapon.weight(), rng));
        }
        if let Some(durability) = settings.durability {
            weapon.set_uses(durability.apply(weapon.uses(), rng));
        }
    }
}

const UNBREAKABLE: u8 = 0x08;
const BRAVE: u8 = 0x20;
const MAGIC_DAMAGE: u8 = 0x40;
const MAGIC: u8 = 0x02;
const REVERSE_TRIANGLE: u8 = 0x01;

struct EffectContext<'a> {
    stat_bonus_pointers: &'a [u32],
    effectiveness_pointers: &'a [u32],
    codes: EffectCodes,
}

type Eligible = fn(&ItemDef, &EffectContext<'_>) -> bool;
type Apply = fn(&mut ItemDef, &EffectContext<'_>, &mut dyn RngCore);

const EFFECTS: [(WeaponEffect, Eligible, Apply); 12] = [
    (WeaponEffect::None, always, leave_unchanged),
    (WeaponEffect::StatBoosts, eligible_stat_boosts, apply_stat_boosts),
    (WeaponEffect::Effectiveness, eligible_effectiveness, apply_effectiveness),
    (WeaponEffect::Unbreakable, eligible_unbreakable, apply_unbreakable),
    (WeaponEffect::Brave, eligible_brave, apply_brave),
    (WeaponEffect::ReverseTriangle, eligible_reverse_triangle, apply_reverse_triangle),
    (WeaponEffect::ExtendRange, eligible_extend_range, apply_extend_range),
    (WeaponEffect::HighCritical, eligible_high_critical, apply_high_critical),
    (WeaponEffect::MagicDamage, eligible_magic_damage, apply_magic_damage),
    (WeaponEffect::Poison, has_no_effect, apply_poison),
    (WeaponEffect::HalfHp, has_no_effect, apply_half_hp),
    (WeaponEffect::Devil, has_no_effect, apply_devil),
];

fn always(_: &ItemDef, _: &EffectContext<'_>) -> bool {
    true
}

fn leave_unchanged(_: &mut ItemDef, _: &EffectContext<'_>, _: &mut dyn RngCore) {}

fn eligible_stat_boosts(item: &ItemDef, ctx: &EffectContext<'_>) -> bool {
    item.stat_bonus_pointer() == 0 && !ctx.stat_bonus_pointers.is_empty()
}

fn apply_stat_boosts(item: &mut ItemDef, ctx: &EffectContext<'_>, rng: &mut dyn RngCore) {
    let pointers = ctx.stat_bonus_pointers;
    item.set_stat_bonus_pointer(pointers[rng.gen_range(0..pointers.len())]);
}

fn eligible_effectiveness(item: &ItemDef, ctx: &EffectContext<'_>) -> bool {
    item.effectiveness_pointer() == 0 && !ctx.effectiveness_pointers.is_empty()
}

fn apply_effectiveness(item: &mut ItemDef, ctx: &EffectContext<'_>, rng: &mut dyn RngCore) {
    let pointers = ctx.effectiveness_pointers;
    item.set_effectiveness_pointer(pointers[rng.gen_range(0..pointers.len())]);
}

fn eligible_unbreakable(item: &ItemDef, _: &EffectContext<'_>) -> bool {
    item.ability(0) & UNBREAKABLE == 0
}

fn apply_unbreakable(item: &mut ItemDef, _: &EffectContext<'_>, _: &mut dyn RngCore) {
    item.set_ability(0, item.ability(0) | UNBREAKABLE);
}

fn eligible_brave(item: &ItemDef, _: &EffectContext<'_>) -> bool {
    item.ability(0) & BRAVE == 0
}

fn apply_brave(item: &mut ItemDef, _: &EffectContext<'_>, _: &mut dyn RngCore) {
    item.set_ability(0, item.ability(0) | BRAVE);
}

fn eligible_reverse_triangle(item: &ItemDef, _: &EffectContext<'_>) -> bool {
    item.ability(1) & REVERSE_TRIANGLE == 0 && item.weapon_type() != Some(WeaponType::Bow)
}

fn apply_reverse_triangle(item: &mut ItemDef, _: &EffectContext<'_>, _: &mut dyn RngCore) {
    item.set_ability(1, item.ability(1) | REVERSE_TRIANGLE);
}

fn eligible_extend_range(item: &ItemDef, _: &EffectContext<'_>) -> bool {
    (item.min_range() == 2 || item.max_range() == 1) && item.weapon_type() != Some(WeaponType::Axe)
}

/// Ranged-only weapons gain melee (or reach 3), melee-only weapons gain
/// range 2.
fn apply_extend_range(item: &mut ItemDef, _: &EffectContext<'_>, rng: &mut dyn RngCore) {
    if item.min_range() == 2 {
        if item.max_range() == 3 || rng.gen_bool(0.5) {
            item.set_min_range(1);
        } else {
            item.set_max_range(3);
        }
    } else {
        item.set_max_range(2);
    }
}

fn eligible_high_critical(item: &ItemDef, _: &EffectContext<'_>) -> bool {
    item.crit() < 10
}

fn apply_high_critical(item: &mut ItemDef, _: &EffectContext<'_>, rng: &mut dyn RngCore) {
    item.set_crit(item.crit() + 5 * (4 + rng.gen_range(0..7)));
}

fn eligible_magic_damage(item: &ItemDef, _: &EffectContext<'_>) -> bool {
    item.ability(0) & (MAGIC_DAMAGE | MAGIC) == 0 && item.weapon_type() != Some(WeaponType::Axe)
}

fn apply_magic_damage(item: &mut ItemDef, _: &EffectContext<'_>, _: &mut dyn RngCore) {
    item.set_ability(0, item.ability(0) | MAGIC_DAMAGE);
    if item.max_range() == 1 {
        item.set_max_range(2);
    }
}

/// The status effects share one byte, so only one of them fits.
fn has_no_effect(item: &ItemDef, _: &EffectContext<'_>) -> bool {
    item.effect() == 0
}

fn apply_poison(item: &mut ItemDef, ctx: &EffectContext<'_>, _: &mut dyn RngCore) {
    item.set_effect(ctx.codes.poison);
}

fn apply_half_hp(item: &mut ItemDef, ctx: &EffectContext<'_>, _: &mut dyn RngCore) {
    item.set_effect(ctx.codes.half_hp);
}

fn apply_devil(item: &mut ItemDef, ctx: &EffectContext<'_>, _: &mut dyn RngCore) {
    item.set_effect(ctx.codes.devil);
    let might = item.might();
    item.set_might((might * 3 / 2).max(might + 5));
}

/// Give every unlocked weapon one effect drawn from those enabled that it
/// does not already have.
pub fn randomize_weapon_effects<R: RngCore>(
    data: &mut GameData,
    enabled: &[WeaponEffect],
    rng: &mut R,
) {
    let ctx = EffectContext {
        stat_bonus_pointers: &data.rules.stat_bonus_pointers,
        effectiveness_pointers: &data.rules.effectiveness_pointers,
        codes: data.rules.effect_codes,
    };

    for id in data.items.unlocked_weapon_ids() {
        let Some(weapon) = data.items.get_mut(id) else {
            continue;
        };
        let pool: Vec<&(WeaponEffect, Eligible, Apply)> = EFFECTS
            .iter()
            .filter(|(effect, eligible, _)| enabled.contains(effect) && eligible(&*weapon, &ctx))
            .collect();
        if pool.is_empty() {
            continue;
        }
        let (effect, _, apply) = pool[rng.gen_range(0..pool.len())];
        apply(weapon, &ctx, rng);
        log::debug!("weapon 0x{:02X} gets {effect:?}", weapon.id());
    }
}
