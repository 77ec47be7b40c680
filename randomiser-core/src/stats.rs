//! Class movement, character constitution and affinity passes.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::GameData;
use crate::EntityIssue;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MovementRange {
    pub min: i64,
    /// Exclusive.
    pub max: i64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConstitutionVariance {
    pub minimum: i64,
    pub variance: i64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatSettings {
    pub class_movement: Option<MovementRange>,
    pub constitution: Option<ConstitutionVariance>,
    pub affinity: bool,
}

/// Give every class that can move a new MOV in `[min, max)`.
pub fn randomize_class_movement<R: Rng + ?Sized>(
    data: &mut GameData,
    range: MovementRange,
    rng: &mut R,
) {
    if range.max <= range.min {
        log::warn!("movement range {}..{} is empty, leaving classes alone", range.min, range.max);
        return;
    }
    for class in data.classes.iter_mut().filter(|class| class.mov() > 0) {
        class.set_mov(rng.gen_range(range.min..range.max));
    }
}

/// Nudge each playable character's total CON up or down and store the
/// result back as the personal modifier.
pub fn randomize_constitution<R: Rng + ?Sized>(
    data: &mut GameData,
    settings: ConstitutionVariance,
    rng: &mut R,
) {
    for character in data.characters.iter_mut().filter(|c| c.flags().playable) {
        let Some(class) = data.classes.get(character.class_id()) else {
            log::warn!("{}", EntityIssue::MissingClass { id: character.class_id() });
            continue;
        };
        let class_con = class.con();
        let mut total = class_con + character.con();

        let delta = if settings.variance > 0 { rng.gen_range(0..settings.variance) } else { 0 };
        if rng.gen_bool(0.5) {
            total += delta;
        } else {
            total -= delta;
        }
        character.set_con(total.max(settings.minimum) - class_con);
    }
}

pub fn randomize_affinity<R: Rng + ?Sized>(data: &mut GameData, rng: &mut R) {
    if data.rules.affinities.is_empty() {
        return;
    }
    let values = &data.rules.affinities;
    for character in data.characters.iter_mut().filter(|c| c.flags().playable) {
        character.set_affinity(values[rng.gen_range(0..values.len())]);
    }
}
