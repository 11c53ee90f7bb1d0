//! Off-chain view of one chain's escrow balances, keyed by
//! `(user, token)`. The authoritative ledger is the on-chain settlement
//! contract; this mirrors it for fast pre-checks and is kept
//! in sync by the chain client's write path.

use alloy_primitives::Address;
use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::error::EscrowError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Balance {
    pub total: Decimal,
    pub locked: Decimal,
}

impl Balance {
    pub fn available(&self) -> Decimal {
        self.total - self.locked
    }
}

#[derive(Default)]
pub struct EscrowLedger {
    balances: DashMap<(Address, Address), Balance>,
}

impl EscrowLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, user: Address, token: Address) -> Balance {
        self.balances.get(&(user, token)).map(|b| *b).unwrap_or_default()
    }

    /// Credits `total` without affecting `locked` (deposit, or a settlement
    /// receipt landing in the receiver's account).
    pub fn credit(&self, user: Address, token: Address, amount: Decimal) -> Result<(), EscrowError> {
        if amount <= Decimal::ZERO {
            return Err(EscrowError::InvalidAmount);
        }
        let mut entry = self.balances.entry((user, token)).or_default();
        entry.total += amount;
        Ok(())
    }

    /// Moves `amount` from `available` into `locked` (order admission hold).
    pub fn lock(&self, user: Address, token: Address, amount: Decimal) -> Result<(), EscrowError> {
        if amount <= Decimal::ZERO {
            return Err(EscrowError::InvalidAmount);
        }
        let mut entry = self.balances.entry((user, token)).or_default();
        let available = entry.available();
        if available < amount {
            return Err(EscrowError::InsufficientAvailable { available, amount });
        }
        entry.locked += amount;
        Ok(())
    }

    /// Releases a lock back to `available` without debiting `total`
    /// (cancel, or reversal of a lock that will not be settled).
    pub fn unlock(&self, user: Address, token: Address, amount: Decimal) -> Result<(), EscrowError> {
        if amount <= Decimal::ZERO {
            return Err(EscrowError::InvalidAmount);
        }
        let mut entry = self.balances.entry((user, token)).or_default();
        entry.locked -= amount;
        Ok(())
    }

    /// Debits a settled leg's sender: removes `amount` from both `locked`
    /// and `total`.
    pub fn settle_debit(&self, user: Address, token: Address, amount: Decimal) -> Result<(), EscrowError> {
        if amount <= Decimal::ZERO {
            return Err(EscrowError::InvalidAmount);
        }
        let mut entry = self.balances.entry((user, token)).or_default();
        if entry.locked < amount || entry.total < amount {
            return Err(EscrowError::InsufficientAvailable {
                available: entry.available(),
                amount,
            });
        }
        entry.locked -= amount;
        entry.total -= amount;
        Ok(())
    }

    /// Withdraws from `available` to outside the ledger (user withdrawal).
    pub fn withdraw(&self, user: Address, token: Address, amount: Decimal) -> Result<(), EscrowError> {
        if amount <= Decimal::ZERO {
            return Err(EscrowError::InvalidAmount);
        }
        let mut entry = self.balances.entry((user, token)).or_default();
        let available = entry.available();
        if available < amount {
            return Err(EscrowError::InsufficientAvailable { available, amount });
        }
        entry.total -= amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn addr(b: u8) -> Address {
        Address::repeat_byte(b)
    }

    #[test]
    fn lock_then_settle_debit_keeps_invariant() {
        let ledger = EscrowLedger::new();
        let user = addr(1);
        let token = addr(2);
        ledger.credit(user, token, dec!(100)).unwrap();
        ledger.lock(user, token, dec!(40)).unwrap();

        let balance = ledger.balance_of(user, token);
        assert_eq!(balance.available(), dec!(60));
        assert_eq!(balance.total, dec!(100));

        ledger.settle_debit(user, token, dec!(40)).unwrap();
        let balance = ledger.balance_of(user, token);
        assert_eq!(balance.total, dec!(60));
        assert_eq!(balance.locked, dec!(0));
        assert_eq!(balance.available(), dec!(60));
    }

    #[test]
    fn lock_rejects_insufficient_available() {
        let ledger = EscrowLedger::new();
        let user = addr(1);
        let token = addr(2);
        ledger.credit(user, token, dec!(10)).unwrap();
        let err = ledger.lock(user, token, dec!(20)).unwrap_err();
        assert_eq!(
            err,
            EscrowError::InsufficientAvailable {
                available: dec!(10),
                amount: dec!(20)
            }
        );
    }

    #[test]
    fn unlock_restores_availability_without_touching_total() {
        let ledger = EscrowLedger::new();
        let user = addr(1);
        let token = addr(2);
        ledger.credit(user, token, dec!(50)).unwrap();
        ledger.lock(user, token, dec!(30)).unwrap();
        ledger.unlock(user, token, dec!(30)).unwrap();
        let balance = ledger.balance_of(user, token);
        assert_eq!(balance.total, dec!(50));
        assert_eq!(balance.available(), dec!(50));
    }
}
