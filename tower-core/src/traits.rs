//! Character traits and the combat behavior they select.
//!
//! Each trait is a closed enum variant. Fifteen of them carry their own
//! action table: a staircase of probability bands over a single roll
//! `r ∈ [0, 1)`, each band producing a different outcome. The remaining
//! traits share the default plain attack.
//!
//! Action functions are pure apart from the damage or healing they apply,
//! take the roll explicitly, and draw damage from the supplied generator,
//! so each band can be exercised in isolation.

use crate::dice::{self, roll_between, scale};
use crate::hero::{DamageReport, Hero};
use crate::monster::Monster;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Traits
// ============================================================================

/// A hero's fixed personality tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterTrait {
    Cunning,
    Greedy,
    Lazy,
    Lucky,
    Brave,
    Cowardly,
    Wise,
    Foolish,
    Kind,
    Evil,
    Loyal,
    Traitor,
    Optimist,
    Pessimist,
    Calm,
    HotTempered,
    Patient,
    Impatient,
    Strong,
    Weak,
    Fast,
    Slow,
    Handsome,
    Ugly,
    Sociable,
    Shy,
    Creative,
    Practical,
    Dreamer,
    Realist,
    Leader,
    Follower,
    Ambitious,
    Modest,
    Selfish,
    Altruist,
    Curious,
    Indifferent,
    Energetic,
    Tired,
}

impl CharacterTrait {
    pub const ALL: [CharacterTrait; 40] = [
        CharacterTrait::Cunning,
        CharacterTrait::Greedy,
        CharacterTrait::Lazy,
        CharacterTrait::Lucky,
        CharacterTrait::Brave,
        CharacterTrait::Cowardly,
        CharacterTrait::Wise,
        CharacterTrait::Foolish,
        CharacterTrait::Kind,
        CharacterTrait::Evil,
        CharacterTrait::Loyal,
        CharacterTrait::Traitor,
        CharacterTrait::Optimist,
        CharacterTrait::Pessimist,
        CharacterTrait::Calm,
        CharacterTrait::HotTempered,
        CharacterTrait::Patient,
        CharacterTrait::Impatient,
        CharacterTrait::Strong,
        CharacterTrait::Weak,
        CharacterTrait::Fast,
        CharacterTrait::Slow,
        CharacterTrait::Handsome,
        CharacterTrait::Ugly,
        CharacterTrait::Sociable,
        CharacterTrait::Shy,
        CharacterTrait::Creative,
        CharacterTrait::Practical,
        CharacterTrait::Dreamer,
        CharacterTrait::Realist,
        CharacterTrait::Leader,
        CharacterTrait::Follower,
        CharacterTrait::Ambitious,
        CharacterTrait::Modest,
        CharacterTrait::Selfish,
        CharacterTrait::Altruist,
        CharacterTrait::Curious,
        CharacterTrait::Indifferent,
        CharacterTrait::Energetic,
        CharacterTrait::Tired,
    ];

    /// Uniformly random trait.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let idx = rng.gen_range(0..Self::ALL.len());
        Self::ALL[idx]
    }

    pub fn name(&self) -> &'static str {
        match self {
            CharacterTrait::Cunning => "Cunning",
            CharacterTrait::Greedy => "Greedy",
            CharacterTrait::Lazy => "Lazy",
            CharacterTrait::Lucky => "Lucky",
            CharacterTrait::Brave => "Brave",
            CharacterTrait::Cowardly => "Cowardly",
            CharacterTrait::Wise => "Wise",
            CharacterTrait::Foolish => "Foolish",
            CharacterTrait::Kind => "Kind",
            CharacterTrait::Evil => "Evil",
            CharacterTrait::Loyal => "Loyal",
            CharacterTrait::Traitor => "Traitor",
            CharacterTrait::Optimist => "Optimist",
            CharacterTrait::Pessimist => "Pessimist",
            CharacterTrait::Calm => "Calm",
            CharacterTrait::HotTempered => "Hot-tempered",
            CharacterTrait::Patient => "Patient",
            CharacterTrait::Impatient => "Impatient",
            CharacterTrait::Strong => "Strong",
            CharacterTrait::Weak => "Weak",
            CharacterTrait::Fast => "Fast",
            CharacterTrait::Slow => "Slow",
            CharacterTrait::Handsome => "Handsome",
            CharacterTrait::Ugly => "Ugly",
            CharacterTrait::Sociable => "Sociable",
            CharacterTrait::Shy => "Shy",
            CharacterTrait::Creative => "Creative",
            CharacterTrait::Practical => "Practical",
            CharacterTrait::Dreamer => "Dreamer",
            CharacterTrait::Realist => "Realist",
            CharacterTrait::Leader => "Leader",
            CharacterTrait::Follower => "Follower",
            CharacterTrait::Ambitious => "Ambitious",
            CharacterTrait::Modest => "Modest",
            CharacterTrait::Selfish => "Selfish",
            CharacterTrait::Altruist => "Altruist",
            CharacterTrait::Curious => "Curious",
            CharacterTrait::Indifferent => "Indifferent",
            CharacterTrait::Energetic => "Energetic",
            CharacterTrait::Tired => "Tired",
        }
    }

    /// The action table for this trait, or `None` for traits that use
    /// [`default_action`].
    pub fn action_table(&self) -> Option<ActionFn> {
        let table: ActionFn = match self {
            CharacterTrait::Cunning => cunning_action,
            CharacterTrait::Greedy => greedy_action,
            CharacterTrait::Lazy => lazy_action,
            CharacterTrait::Lucky => lucky_action,
            CharacterTrait::Brave => brave_action,
            CharacterTrait::Cowardly => cowardly_action,
            CharacterTrait::Wise => wise_action,
            CharacterTrait::Kind => kind_action,
            CharacterTrait::Evil => evil_action,
            CharacterTrait::Strong => strong_action,
            CharacterTrait::Weak => weak_action,
            CharacterTrait::Fast => fast_action,
            CharacterTrait::Slow => slow_action,
            CharacterTrait::Creative => creative_action,
            CharacterTrait::Practical => practical_action,
            _ => return None,
        };
        Some(table)
    }
}

impl fmt::Display for CharacterTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// What an action did, for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Attack,
    DoubleAttack,
    Critical,
    SelfHeal,
    Stun,
    /// The hero spent the turn without affecting anyone.
    Idle,
}

/// Result of one hero action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub kind: ActionKind,
    pub message: String,
    /// Raw damage rolled before the target's defense.
    pub raw_damage: i32,
    pub damage: Option<DamageReport>,
    pub healed: i32,
}

impl ActionOutcome {
    fn idle(message: String) -> Self {
        Self {
            kind: ActionKind::Idle,
            message,
            raw_damage: 0,
            damage: None,
            healed: 0,
        }
    }

    /// The target died from this action.
    pub fn killed_target(&self) -> bool {
        self.damage.as_ref().map(|d| d.died).unwrap_or(false)
    }
}

/// A trait's action table: `(hero, target, roll, rng) -> outcome`.
pub type ActionFn = fn(&mut Hero, &mut Monster, f64, &mut dyn RngCore) -> ActionOutcome;

/// Roll the band and run the hero's action against `target`.
pub fn decide_action<R: RngCore>(hero: &mut Hero, target: &mut Monster, rng: &mut R) -> ActionOutcome {
    let roll = dice::roll_unit(rng);
    perform_action(hero, target, roll, rng)
}

/// Run the hero's action with an explicit band roll.
pub fn perform_action(
    hero: &mut Hero,
    target: &mut Monster,
    roll: f64,
    rng: &mut dyn RngCore,
) -> ActionOutcome {
    match hero.character_trait.action_table() {
        Some(action) => action(hero, target, roll, rng),
        None => default_action(hero, target, roll, rng),
    }
}

fn strike(kind: ActionKind, lead: String, target: &mut Monster, raw: i32) -> ActionOutcome {
    let report = target.take_damage(raw);
    ActionOutcome {
        kind,
        message: format!("{lead}\n{}", report.message),
        raw_damage: raw,
        damage: Some(report),
        healed: 0,
    }
}

fn plain_attack(hero: &Hero, target: &mut Monster, rng: &mut dyn RngCore) -> ActionOutcome {
    let raw = roll_between(rng, hero.attack / 2, hero.attack);
    let lead = format!("{} attacks {} for {} damage.", hero.name, target.name, raw);
    strike(ActionKind::Attack, lead, target, raw)
}

fn double_hit(hero: &Hero, rng: &mut dyn RngCore) -> i32 {
    roll_between(rng, hero.attack / 2, hero.attack) + roll_between(rng, hero.attack / 2, hero.attack)
}

fn critical_hit(hero: &Hero, rng: &mut dyn RngCore) -> i32 {
    roll_between(rng, hero.attack * 2, hero.attack * 3)
}

// ============================================================================
// Action Tables
// ============================================================================

/// `[atk/2, atk]` against the target.
pub fn default_action(
    hero: &mut Hero,
    target: &mut Monster,
    _roll: f64,
    rng: &mut dyn RngCore,
) -> ActionOutcome {
    plain_attack(hero, target, rng)
}

fn cunning_action(hero: &mut Hero, target: &mut Monster, roll: f64, rng: &mut dyn RngCore) -> ActionOutcome {
    if roll < 0.7 {
        plain_attack(hero, target, rng)
    } else if roll < 0.9 {
        let raw = double_hit(hero, rng);
        let lead = format!("{} pulls a sly trick! A double strike deals {} damage!", hero.name, raw);
        strike(ActionKind::DoubleAttack, lead, target, raw)
    } else {
        ActionOutcome::idle(format!("{} schemes instead of attacking.", hero.name))
    }
}

fn greedy_action(hero: &mut Hero, target: &mut Monster, roll: f64, rng: &mut dyn RngCore) -> ActionOutcome {
    if roll < 0.8 {
        let raw = roll_between(rng, hero.attack, scale(hero.attack, 1.5));
        let lead = format!("{} attacks greedily for {} damage!", hero.name, raw);
        strike(ActionKind::Attack, lead, target, raw)
    } else {
        ActionOutcome::idle(format!(
            "{} eyes {}'s shiny trinkets instead of attacking.",
            hero.name, target.name
        ))
    }
}

fn lazy_action(hero: &mut Hero, target: &mut Monster, roll: f64, rng: &mut dyn RngCore) -> ActionOutcome {
    if roll < 0.5 {
        let raw = roll_between(rng, hero.attack / 2, hero.attack);
        let lead = format!("{} reluctantly attacks for {} damage.", hero.name, raw);
        strike(ActionKind::Attack, lead, target, raw)
    } else {
        ActionOutcome::idle(format!("{} yawns and skips the turn.", hero.name))
    }
}

fn lucky_action(hero: &mut Hero, target: &mut Monster, roll: f64, rng: &mut dyn RngCore) -> ActionOutcome {
    if roll < 0.3 {
        ActionOutcome::idle(format!(
            "{} trips clumsily and happens to dodge an attack!",
            hero.name
        ))
    } else if roll < 0.8 {
        plain_attack(hero, target, rng)
    } else {
        let raw = critical_hit(hero, rng);
        let lead = format!("{} gets incredibly lucky! A critical hit deals {} damage!", hero.name, raw);
        strike(ActionKind::Critical, lead, target, raw)
    }
}

fn brave_action(hero: &mut Hero, target: &mut Monster, roll: f64, rng: &mut dyn RngCore) -> ActionOutcome {
    if roll < 0.8 {
        let raw = roll_between(rng, hero.attack, scale(hero.attack, 1.2)) + target.defense / 3;
        let lead = format!("{} charges in bravely, ignoring armor! Deals {} damage!", hero.name, raw);
        strike(ActionKind::Attack, lead, target, raw)
    } else {
        ActionOutcome::idle(format!("{} inspires the party with courage!", hero.name))
    }
}

fn cowardly_action(hero: &mut Hero, target: &mut Monster, roll: f64, rng: &mut dyn RngCore) -> ActionOutcome {
    if roll < 0.3 {
        ActionOutcome::idle(format!("{} flees from the fight in terror!", hero.name))
    } else if roll < 0.7 {
        let raw = roll_between(rng, hero.attack / 3, hero.attack / 2);
        let lead = format!("{} attacks timidly from afar for {} damage.", hero.name, raw);
        strike(ActionKind::Attack, lead, target, raw)
    } else {
        ActionOutcome::idle(format!("{} trembles with fear and cannot attack!", hero.name))
    }
}

fn wise_action(hero: &mut Hero, target: &mut Monster, roll: f64, rng: &mut dyn RngCore) -> ActionOutcome {
    if roll < 0.6 {
        let raw = roll_between(rng, hero.attack / 2, hero.attack) + hero.attributes.intelligence / 2;
        let lead = format!("{} strikes with precise wisdom for {} damage.", hero.name, raw);
        strike(ActionKind::Attack, lead, target, raw)
    } else if roll < 0.9 {
        let raw = roll_between(rng, hero.attack, scale(hero.attack, 1.5));
        let lead = format!("{} finds a weak spot! Deals {} damage.", hero.name, raw);
        strike(ActionKind::Attack, lead, target, raw)
    } else {
        ActionOutcome::idle(format!("{} studies the flow of battle.", hero.name))
    }
}

fn kind_action(hero: &mut Hero, target: &mut Monster, roll: f64, rng: &mut dyn RngCore) -> ActionOutcome {
    if roll < 0.5 {
        plain_attack(hero, target, rng)
    } else if roll < 0.8 {
        ActionOutcome::idle(format!(
            "{} tries to reason with {}, sapping its will to fight!",
            hero.name, target.name
        ))
    } else if hero.health_current * 10 < hero.health_max * 7 {
        let amount = hero.attributes.wisdom / 2;
        let healed = hero.heal(amount);
        ActionOutcome {
            kind: ActionKind::SelfHeal,
            message: format!("{} shows themself some kindness and recovers {} health!", hero.name, healed),
            raw_damage: 0,
            damage: None,
            healed,
        }
    } else {
        ActionOutcome::idle(format!("{} hesitates, unwilling to cause harm.", hero.name))
    }
}

fn evil_action(hero: &mut Hero, target: &mut Monster, roll: f64, rng: &mut dyn RngCore) -> ActionOutcome {
    if roll < 0.7 {
        let raw = roll_between(rng, hero.attack, scale(hero.attack, 1.8));
        let lead = format!("{} attacks viciously for {} damage!", hero.name, raw);
        strike(ActionKind::Attack, lead, target, raw)
    } else if roll < 0.9 {
        let raw = critical_hit(hero, rng);
        let lead = format!("{} unleashes their hatred! A monstrous blow deals {} damage!", hero.name, raw);
        strike(ActionKind::Critical, lead, target, raw)
    } else {
        ActionOutcome::idle(format!("{} savors {}'s suffering.", hero.name, target.name))
    }
}

fn strong_action(hero: &mut Hero, target: &mut Monster, roll: f64, rng: &mut dyn RngCore) -> ActionOutcome {
    if roll < 0.8 {
        let raw = roll_between(rng, hero.attack, scale(hero.attack, 1.6)) + hero.attributes.strength / 2;
        let lead = format!("{} puts their strength into a mighty blow! Deals {} damage.", hero.name, raw);
        strike(ActionKind::Attack, lead, target, raw)
    } else {
        target.stunned = target.is_alive;
        ActionOutcome {
            kind: ActionKind::Stun,
            message: format!("{} stuns {} with a crushing blow!", hero.name, target.name),
            raw_damage: 0,
            damage: None,
            healed: 0,
        }
    }
}

fn weak_action(hero: &mut Hero, target: &mut Monster, roll: f64, rng: &mut dyn RngCore) -> ActionOutcome {
    if roll < 0.4 {
        let raw = roll_between(rng, hero.attack / 3, hero.attack / 2);
        let lead = format!("{} attacks feebly for {} damage.", hero.name, raw);
        strike(ActionKind::Attack, lead, target, raw)
    } else if roll < 0.7 {
        let raw = roll_between(rng, hero.attack, scale(hero.attack, 1.2));
        let lead = format!("{} compensates with cunning! Deals {} damage.", hero.name, raw);
        strike(ActionKind::Attack, lead, target, raw)
    } else {
        ActionOutcome::idle(format!("{} looks for a way to avoid a straight fight.", hero.name))
    }
}

fn fast_action(hero: &mut Hero, target: &mut Monster, roll: f64, rng: &mut dyn RngCore) -> ActionOutcome {
    if roll < 0.6 {
        let raw = double_hit(hero, rng);
        let lead = format!("{} strikes twice in a blur! Deals {} damage!", hero.name, raw);
        strike(ActionKind::DoubleAttack, lead, target, raw)
    } else {
        let raw = roll_between(rng, hero.attack, scale(hero.attack, 1.3));
        let lead = format!("{} attacks with lightning speed! Deals {} damage.", hero.name, raw);
        strike(ActionKind::Attack, lead, target, raw)
    }
}

fn slow_action(hero: &mut Hero, target: &mut Monster, roll: f64, rng: &mut dyn RngCore) -> ActionOutcome {
    if roll < 0.4 {
        let raw = roll_between(rng, scale(hero.attack, 1.5), hero.attack * 2);
        let lead = format!("{} attacks slowly but heavily! Deals {} damage.", hero.name, raw);
        strike(ActionKind::Attack, lead, target, raw)
    } else {
        ActionOutcome::idle(format!("{} slowly winds up an attack...", hero.name))
    }
}

const CREATIVE_FLAVOR: [&str; 3] = [
    "tries an unexpected tactic!",
    "improvises mid-fight!",
    "takes a creative approach!",
];

fn creative_action(hero: &mut Hero, target: &mut Monster, roll: f64, rng: &mut dyn RngCore) -> ActionOutcome {
    let flavor = dice::pick(rng, &CREATIVE_FLAVOR).copied().unwrap_or(CREATIVE_FLAVOR[0]);
    if roll < 0.7 {
        let raw = roll_between(rng, hero.attack, scale(hero.attack, 1.8));
        let lead = format!("{} {} Deals {} damage.", hero.name, flavor, raw);
        strike(ActionKind::Attack, lead, target, raw)
    } else {
        ActionOutcome::idle(format!("{} {}", hero.name, flavor))
    }
}

fn practical_action(hero: &mut Hero, target: &mut Monster, roll: f64, rng: &mut dyn RngCore) -> ActionOutcome {
    if roll < 0.9 {
        let raw = roll_between(rng, scale(hero.attack, 0.8), scale(hero.attack, 1.2));
        let lead = format!("{} attacks efficiently for {} damage.", hero.name, raw);
        strike(ActionKind::Attack, lead, target, raw)
    } else {
        ActionOutcome::idle(format!("{} assesses the situation for the best opening.", hero.name))
    }
}
