//! Summoning heroes for gold.

use crate::dice;
use crate::error::GameError;
use crate::hero::Hero;
use crate::wallet::{Currency, Wallet};
use rand::Rng;
use tracing::info;

pub const SUMMON_COST: u64 = 50;

/// Star tier for a roll in `[0, 100)`: 70% 1★, 25% 2★, 4.9% 3★, 0.1% 4★.
pub fn star_for_roll(roll: f64) -> u8 {
    if roll < 70.0 {
        1
    } else if roll < 95.0 {
        2
    } else if roll < 99.9 {
        3
    } else {
        4
    }
}

pub fn roll_star<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    star_for_roll(dice::roll_unit(rng) * 100.0)
}

/// Pay `cost` and add a new hero to `roster` if the dormitory has room.
pub fn summon<R: Rng + ?Sized>(
    name: impl Into<String>,
    roster: &mut Vec<Hero>,
    capacity: usize,
    cost: u64,
    wallet: &mut Wallet,
    rng: &mut R,
) -> Result<usize, GameError> {
    if roster.len() >= capacity {
        return Err(GameError::RosterFull { capacity });
    }
    if !wallet.try_spend_gold(cost) {
        return Err(GameError::funds(Currency::Gold, cost, wallet.gold));
    }
    let star = roll_star(rng);
    let hero = Hero::summon(name, star, rng);
    info!(hero = %hero.name, star, character_trait = %hero.character_trait, "Hero summoned");
    roster.push(hero);
    Ok(roster.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_star_bands() {
        assert_eq!(star_for_roll(0.0), 1);
        assert_eq!(star_for_roll(69.99), 1);
        assert_eq!(star_for_roll(70.0), 2);
        assert_eq!(star_for_roll(94.99), 2);
        assert_eq!(star_for_roll(95.0), 3);
        assert_eq!(star_for_roll(99.89), 3);
        assert_eq!(star_for_roll(99.95), 4);
    }

    #[test]
    fn test_summon_pays_and_adds() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut roster = Vec::new();
        let mut wallet = Wallet::new(120, 0);
        let idx = summon("Hero 1", &mut roster, 5, SUMMON_COST, &mut wallet, &mut rng).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(wallet.gold, 70);
        let hero = &roster[0];
        assert_eq!(hero.level, hero.level_band().0);
        assert_eq!(hero.health_current, hero.health_max);
    }

    #[test]
    fn test_roster_full() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut roster = Vec::new();
        let mut wallet = Wallet::new(1_000, 0);
        summon("A", &mut roster, 1, SUMMON_COST, &mut wallet, &mut rng).unwrap();
        assert_eq!(
            summon("B", &mut roster, 1, SUMMON_COST, &mut wallet, &mut rng),
            Err(GameError::RosterFull { capacity: 1 })
        );
        assert_eq!(wallet.gold, 950);
    }

    #[test]
    fn test_cannot_afford() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut roster = Vec::new();
        let mut wallet = Wallet::new(49, 0);
        let err = summon("A", &mut roster, 5, SUMMON_COST, &mut wallet, &mut rng).unwrap_err();
        assert!(matches!(err, GameError::InsufficientFunds { needed: 50, available: 49, .. }));
        assert!(roster.is_empty());
    }
}
