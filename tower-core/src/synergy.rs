//! Party synergy from trait compatibility.
//!
//! A pure function of the members' traits; nothing is stored, so removing
//! a hero from a party needs no extra bookkeeping here.

use crate::traits::CharacterTrait;
use lazy_static::lazy_static;
use std::collections::HashMap;

use CharacterTrait::*;

lazy_static! {
    /// Directed pair multipliers; missing pairs are neutral.
    static ref COMPATIBILITY: HashMap<(CharacterTrait, CharacterTrait), f64> = {
        let rows: &[(CharacterTrait, &[(CharacterTrait, f64)])] = &[
            (Brave, &[(Brave, 1.15), (Cowardly, 0.8), (Wise, 1.1), (Kind, 1.05), (Evil, 0.9)]),
            (Cowardly, &[(Brave, 0.8), (Cunning, 1.1), (Lazy, 1.05)]),
            (Wise, &[(Brave, 1.1), (Wise, 1.1), (Cunning, 1.05), (Creative, 1.15)]),
            (Cunning, &[(Cowardly, 1.1), (Wise, 1.05), (Evil, 1.1)]),
            (Kind, &[(Brave, 1.05), (Kind, 1.1), (Wise, 1.05), (Evil, 0.7)]),
            (Evil, &[(Brave, 0.9), (Cunning, 1.1), (Kind, 0.7)]),
            (Lazy, &[(Cowardly, 1.05), (Slow, 1.1)]),
            (Lucky, &[(Brave, 1.1), (Lucky, 1.2)]),
            (Strong, &[(Brave, 1.1), (Strong, 1.1), (Weak, 0.9)]),
            (Weak, &[(Strong, 0.9), (Cunning, 1.05)]),
            (Fast, &[(Brave, 1.05), (Fast, 1.1), (Slow, 0.8)]),
            (Slow, &[(Fast, 0.8), (Lazy, 1.1)]),
            (Creative, &[(Wise, 1.15), (Creative, 1.1), (Practical, 0.9)]),
            (Practical, &[(Wise, 1.05), (Practical, 1.1), (Creative, 0.9)]),
        ];
        let mut map = HashMap::new();
        for (from, targets) in rows {
            for (to, value) in targets.iter() {
                map.insert((*from, *to), *value);
            }
        }
        map
    };
}

/// Lucky heroes get along with anyone not listed explicitly.
const LUCKY_WITH_ANYONE: f64 = 1.05;

pub const MIN_BONUS: f64 = 0.5;
pub const MAX_BONUS: f64 = 2.0;

pub fn compatibility(from: CharacterTrait, to: CharacterTrait) -> f64 {
    match COMPATIBILITY.get(&(from, to)) {
        Some(value) => *value,
        None if from == Lucky => LUCKY_WITH_ANYONE,
        None => 1.0,
    }
}

/// Bonus for `count` members sharing one trait.
pub fn set_bonus(count: usize) -> f64 {
    match count {
        3 => 1.15,
        4 => 1.25,
        5 => 1.4,
        _ => 1.0,
    }
}

fn trait_counts(traits: &[CharacterTrait]) -> Vec<(CharacterTrait, usize)> {
    let mut counts: Vec<(CharacterTrait, usize)> = Vec::new();
    for t in traits {
        match counts.iter_mut().find(|(seen, _)| seen == t) {
            Some((_, n)) => *n += 1,
            None => counts.push((*t, 1)),
        }
    }
    counts
}

/// Multiplier for a group: set bonuses times every ordered pair's
/// compatibility, clamped to `[MIN_BONUS, MAX_BONUS]`. Groups under two
/// heroes are neutral.
pub fn party_bonus(traits: &[CharacterTrait]) -> f64 {
    if traits.len() < 2 {
        return 1.0;
    }
    let mut bonus: f64 = trait_counts(traits)
        .into_iter()
        .map(|(_, n)| set_bonus(n))
        .product();
    for (i, a) in traits.iter().enumerate() {
        for (j, b) in traits.iter().enumerate() {
            if i != j {
                bonus *= compatibility(*a, *b);
            }
        }
    }
    bonus.clamp(MIN_BONUS, MAX_BONUS)
}

pub fn describe(bonus: f64) -> String {
    let pct = (bonus - 1.0) * 100.0;
    let label = if bonus >= 1.5 {
        "Perfect synergy"
    } else if bonus >= 1.2 {
        "Great compatibility"
    } else if bonus >= 1.0 {
        "Normal relations"
    } else if bonus >= 0.8 {
        "Tense relations"
    } else {
        "Conflict in the group"
    };
    format!("{label} ({pct:+.0}%)")
}

/// One line per trait set and per non-neutral pair.
pub fn details(traits: &[CharacterTrait]) -> Vec<String> {
    let mut lines = Vec::new();
    for (t, n) in trait_counts(traits) {
        if n >= 3 {
            let pct = ((set_bonus(n) - 1.0) * 100.0).round();
            lines.push(format!("{n}x {t}: +{pct}%"));
        }
    }
    for (i, a) in traits.iter().enumerate() {
        for b in &traits[i + 1..] {
            let value = compatibility(*a, *b);
            if (value - 1.0).abs() > f64::EPSILON {
                let arrow = if value > 1.0 { "up" } else { "down" };
                let pct = ((value - 1.0).abs() * 100.0).round();
                lines.push(format!("{a} <-> {b}: {arrow} {pct}%"));
            }
        }
    }
    lines
}
