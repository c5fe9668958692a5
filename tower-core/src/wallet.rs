//! Gold and crystal ledger.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two currencies the wallet tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    Gold,
    Crystals,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Gold => write!(f, "gold"),
            Currency::Crystals => write!(f, "crystals"),
        }
    }
}

/// Player balances. Subtraction is check-then-commit, so balances can
/// never go negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Wallet {
    pub gold: u64,
    pub crystals: u64,
}

impl Wallet {
    pub fn new(gold: u64, crystals: u64) -> Self {
        Self { gold, crystals }
    }

    pub fn balance(&self, currency: Currency) -> u64 {
        match currency {
            Currency::Gold => self.gold,
            Currency::Crystals => self.crystals,
        }
    }

    pub fn add_gold(&mut self, amount: u64) {
        self.gold = self.gold.saturating_add(amount);
    }

    pub fn add_crystals(&mut self, amount: u64) {
        self.crystals = self.crystals.saturating_add(amount);
    }

    pub fn can_afford_gold(&self, amount: u64) -> bool {
        self.gold >= amount
    }

    pub fn can_afford_crystals(&self, amount: u64) -> bool {
        self.crystals >= amount
    }

    /// Check-only query for a combined price.
    pub fn can_afford(&self, gold: u64, crystals: u64) -> bool {
        self.can_afford_gold(gold) && self.can_afford_crystals(crystals)
    }

    /// Deduct gold if the balance covers it. Returns false and leaves the
    /// wallet untouched otherwise.
    pub fn try_spend_gold(&mut self, amount: u64) -> bool {
        if !self.can_afford_gold(amount) {
            return false;
        }
        self.gold -= amount;
        true
    }

    pub fn try_spend_crystals(&mut self, amount: u64) -> bool {
        if !self.can_afford_crystals(amount) {
            return false;
        }
        self.crystals -= amount;
        true
    }

    /// Deduct both currencies together, or neither.
    pub fn try_spend(&mut self, gold: u64, crystals: u64) -> bool {
        if !self.can_afford(gold, crystals) {
            return false;
        }
        self.gold -= gold;
        self.crystals -= crystals;
        true
    }

    /// The first currency that falls short of a combined price, with the
    /// amount needed and available.
    pub fn shortfall(&self, gold: u64, crystals: u64) -> Option<(Currency, u64, u64)> {
        if !self.can_afford_gold(gold) {
            Some((Currency::Gold, gold, self.gold))
        } else if !self.can_afford_crystals(crystals) {
            Some((Currency::Crystals, crystals, self.crystals))
        } else {
            None
        }
    }
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} gold, {} crystals", self.gold, self.crystals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spend_checks_balance() {
        let mut wallet = Wallet::new(100, 5);
        assert!(wallet.try_spend_gold(60));
        assert_eq!(wallet.gold, 40);
        assert!(!wallet.try_spend_gold(41));
        assert_eq!(wallet.gold, 40);
        assert!(!wallet.try_spend_crystals(6));
        assert_eq!(wallet.crystals, 5);
    }

    #[test]
    fn test_combined_spend_is_all_or_nothing() {
        let mut wallet = Wallet::new(500, 10);
        assert!(!wallet.try_spend(100, 50));
        assert_eq!(wallet, Wallet::new(500, 10));
        assert!(wallet.try_spend(500, 10));
        assert_eq!(wallet, Wallet::new(0, 0));
    }

    #[test]
    fn test_shortfall_reports_first_missing_currency() {
        let wallet = Wallet::new(10, 1);
        assert_eq!(wallet.shortfall(20, 5), Some((Currency::Gold, 20, 10)));
        assert_eq!(wallet.shortfall(5, 5), Some((Currency::Crystals, 5, 1)));
        assert_eq!(wallet.shortfall(5, 1), None);
    }
}
