use serde::{Deserialize, Serialize};

use super::errors::LedgerError;
use super::value_objects::{AccountNumber, Money};

// ============================================================================
// Account Aggregate
// ============================================================================
//
// `version` is the optimistic concurrency token of the stored row. Mutations
// here never touch it; the store compares it on commit.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_number: AccountNumber,
    pub balance: Money,
    pub version: i64,
}

impl Account {
    pub fn new(account_number: AccountNumber, balance: Money) -> Self {
        Self {
            account_number,
            balance,
            version: 0,
        }
    }

    /// Decrease the balance, refusing to go negative
    pub fn withdraw(&mut self, amount: Money) -> Result<(), LedgerError> {
        let insufficient = LedgerError::InsufficientFunds {
            account: self.account_number,
            balance: self.balance,
            requested: amount,
        };
        match self.balance.checked_sub(amount) {
            Some(remaining) if !remaining.is_negative() => {
                self.balance = remaining;
                Ok(())
            }
            _ => Err(insufficient),
        }
    }

    pub fn deposit(&mut self, amount: Money) -> Result<(), LedgerError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow(self.account_number))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_withdraw_exact_balance() {
        let mut account = Account::new(AccountNumber(456), Money::from_major(15));
        account.withdraw(Money::from_major(15)).unwrap();
        assert_eq!(account.balance, Money::ZERO);
    }

    #[test]
    fn test_withdraw_insufficient_leaves_balance() {
        let mut account = Account::new(AccountNumber(456), Money::from_major(5));
        let err = account.withdraw(Money::from_major(15)).unwrap_err();

        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                account: AccountNumber(456),
                balance: Money::from_major(5),
                requested: Money::from_major(15),
            }
        );
        assert_eq!(account.balance, Money::from_major(5));
    }

    #[test]
    fn test_deposit() {
        let mut account = Account::new(AccountNumber(123), Money::ZERO);
        account.deposit(Money::from_minor(1500)).unwrap();
        assert_eq!(account.balance, Money::from_major(15));
    }

    #[test]
    fn test_deposit_overflow_leaves_balance() {
        let mut account = Account::new(AccountNumber(123), Money::from_minor(i64::MAX - 10));

        let err = account.deposit(Money::from_major(15)).unwrap_err();

        assert_eq!(err, LedgerError::BalanceOverflow(AccountNumber(123)));
        assert_eq!(account.balance, Money::from_minor(i64::MAX - 10));
    }
}
