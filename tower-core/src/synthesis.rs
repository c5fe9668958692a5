//! Hero synthesis: sacrifice heroes to grow another.
//!
//! Sacrificed heroes leave the roster for good. Callers are responsible
//! for reconciling parties and roles afterwards.

use crate::dice;
use crate::error::GameError;
use crate::hero::{Attribute, Hero, HeroId};
use rand::Rng;
use std::collections::HashSet;
use tracing::info;

pub const MAX_BUMP_CHANCE: f64 = 0.8;

/// Experience one sacrifice is worth.
pub fn sacrifice_exp(hero: &Hero) -> u64 {
    let star_factor = 1.0 + (hero.star as f64 - 1.0) * 0.2;
    (hero.level as f64 * 50.0 * star_factor) as u64
}

/// Chance that synthesis bumps a random attribute.
pub fn bump_chance(sacrifices: &[&Hero]) -> f64 {
    let stars: f64 = sacrifices
        .iter()
        .map(|h| (h.star as f64 - 1.0) * 0.05)
        .sum();
    (0.1 * sacrifices.len() as f64 + stars).min(MAX_BUMP_CHANCE)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisResult {
    pub base: HeroId,
    pub exp_gained: u64,
    pub message: String,
    pub improved: Option<Attribute>,
    pub removed: Vec<HeroId>,
}

/// Check the selection without changing anything.
pub fn validate(roster: &[Hero], base: HeroId, sacrifices: &[HeroId]) -> Result<(), GameError> {
    let base_hero = roster
        .iter()
        .find(|h| h.id == base)
        .ok_or(GameError::UnknownHero(base))?;
    if !base_hero.is_alive {
        return Err(GameError::HeroUnavailable { hero: base });
    }
    if sacrifices.is_empty() {
        return Err(GameError::InvalidSelection(
            "Choose at least one hero to sacrifice".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for id in sacrifices {
        if *id == base {
            return Err(GameError::InvalidSelection(
                "A hero cannot be sacrificed to itself".to_string(),
            ));
        }
        if !seen.insert(*id) {
            return Err(GameError::InvalidSelection(format!("{id} was chosen twice")));
        }
        if !roster.iter().any(|h| h.id == *id) {
            return Err(GameError::UnknownHero(*id));
        }
    }
    Ok(())
}

pub fn synthesize<R: Rng + ?Sized>(
    roster: &mut Vec<Hero>,
    base: HeroId,
    sacrifices: &[HeroId],
    rng: &mut R,
) -> Result<SynthesisResult, GameError> {
    validate(roster, base, sacrifices)?;

    let (exp_gained, chance) = {
        let consumed: Vec<&Hero> = roster
            .iter()
            .filter(|h| sacrifices.contains(&h.id))
            .collect();
        (consumed.iter().map(|h| sacrifice_exp(h)).sum::<u64>(), bump_chance(&consumed))
    };

    roster.retain(|h| !sacrifices.contains(&h.id));
    let hero = roster
        .iter_mut()
        .find(|h| h.id == base)
        .ok_or(GameError::UnknownHero(base))?;

    let message = hero.add_experience(exp_gained);
    let improved = if dice::chance(rng, chance) {
        let attrs = Attribute::all();
        let attr = attrs[rng.gen_range(0..attrs.len())];
        *hero.attributes.get_mut(attr) += 1;
        hero.refresh_stats();
        Some(attr)
    } else {
        None
    };

    info!(
        hero = %hero.name,
        sacrificed = sacrifices.len(),
        exp_gained,
        improved = ?improved,
        "Synthesis complete"
    );
    Ok(SynthesisResult {
        base,
        exp_gained,
        message,
        improved,
        removed: sacrifices.to_vec(),
    })
}
