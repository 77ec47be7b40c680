//! Which classes a unit may be moved into, and how one is picked.

use rand::Rng;

use crate::data::{ClassCategory, ClassDef, Entity, GameData, Wielder};
use crate::pool::PoolDistributor;

/// Filters applied to every candidate class.
#[derive(Clone, Debug, Default)]
pub struct ClassOptions {
    pub include_lords: bool,
    pub include_thieves: bool,
    pub include_special: bool,
    pub force_change: bool,
    pub separate_monsters: bool,
    /// Only the layout's safe classes are allowed.
    pub class_restricted: bool,
    pub requires_range: bool,
    pub requires_melee: bool,
    /// Class the unit has to stay weaker than.
    pub must_lose_to: Option<u8>,
}

type Gate = fn(&ClassOptions) -> bool;

fn admits_lords(options: &ClassOptions) -> bool {
    options.include_lords
}

fn admits_thieves(options: &ClassOptions) -> bool {
    options.include_thieves
}

fn admits_special(options: &ClassOptions) -> bool {
    options.include_special
}

/// Whether classes of a category are admitted under the given options.
const CATEGORY_GATES: [(ClassCategory, Gate); 3] = [
    (ClassCategory::Lord, admits_lords),
    (ClassCategory::Thief, admits_thieves),
    (ClassCategory::Special, admits_special),
];

fn passes_category_gates(
    candidate: &ClassDef,
    source: &ClassDef,
    options: &ClassOptions,
    has_monsters: bool,
) -> bool {
    let gated = CATEGORY_GATES
        .iter()
        .any(|(category, admit)| candidate.is(*category) && !admit(options));
    if gated {
        return false;
    }
    if has_monsters && options.separate_monsters {
        return candidate.is(ClassCategory::Monster) == source.is(ClassCategory::Monster);
    }
    true
}

/// A class has to be able to equip at least one catalog weapon covering the
/// unit's required ranges.
fn meets_range_requirements(data: &GameData, candidate: &ClassDef, options: &ClassOptions) -> bool {
    if !options.requires_range && !options.requires_melee {
        return true;
    }
    let wielder = Wielder::Generic { class: candidate };
    let usable: Vec<_> = data
        .items
        .iter()
        .filter(|item| item.is_weapon() && wielder.can_use(item))
        .collect();
    (!options.requires_range || usable.iter().any(|item| item.is_ranged()))
        && (!options.requires_melee || usable.iter().any(|item| item.is_melee()))
}

/// Candidate class IDs for a unit currently in `source`, in table order.
pub fn candidate_classes(data: &GameData, source: &ClassDef, options: &ClassOptions) -> Vec<u8> {
    let reference_rating = options
        .must_lose_to
        .and_then(|id| data.classes.get(id))
        .map(ClassDef::combat_rating);

    data.classes
        .iter()
        .filter(|candidate| !candidate.supported_types().is_empty())
        .filter(|candidate| {
            passes_category_gates(candidate, source, options, data.rules.has_monsters())
        })
        .filter(|candidate| !options.force_change || candidate.id() != source.id())
        .filter(|candidate| meets_range_requirements(data, candidate, options))
        .filter(|candidate| {
            !options.class_restricted || data.rules.safe_classes.contains(&candidate.id())
        })
        .filter(|candidate| match reference_rating {
            Some(rating) => candidate.combat_rating() < rating,
            None => true,
        })
        .map(Entity::id)
        .collect()
}

/// Picks one class out of a candidate list, either uniformly or spread
/// evenly over the whole catalog.
#[derive(Clone, Debug)]
pub struct ClassPicker {
    catalog: Vec<u8>,
    pool: Option<PoolDistributor<u8>>,
}

impl ClassPicker {
    pub fn uniform() -> Self {
        Self { catalog: Vec::new(), pool: None }
    }

    pub fn evenly(catalog: Vec<u8>) -> Self {
        let mut pool = PoolDistributor::new();
        pool.add_all(catalog.iter().copied());
        Self { catalog, pool: Some(pool) }
    }

    /// `was_flying` enables the single re-roll that keeps ground units from
    /// turning into fliers too often on uniform draws.
    pub fn pick<R: Rng + ?Sized>(
        &mut self,
        data: &GameData,
        candidates: &[u8],
        was_flying: bool,
        rng: &mut R,
    ) -> Option<u8> {
        if candidates.is_empty() {
            return None;
        }

        if let Some(pool) = self.pool.as_mut() {
            return pool.draw_from_subset(candidates, &self.catalog, rng);
        }

        let picked = candidates[rng.gen_range(0..candidates.len())];
        let became_flier = data
            .classes
            .get(picked)
            .is_some_and(|class| class.is(ClassCategory::Flying));
        if !was_flying && became_flier {
            return Some(candidates[rng.gen_range(0..candidates.len())]);
        }
        Some(picked)
    }
}
