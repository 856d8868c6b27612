//! Account ledger
//!
//! Balances live behind a short synchronous lock that is never held across an
//! `.await`, so every transfer is atomic with respect to other requests while
//! independent transfers still interleave in whatever order they arrive.
//!
//! There is no authorization here: a transfer is executed for any
//! session token, amount or account pair. That permissiveness is what the CSRF
//! scenarios exploit.

use lab_common::SessionToken;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Result of an executed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    pub from: String,
    pub to: String,
    pub amount: i64,
}

impl fmt::Display for TransferReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} transferred {} to {}", self.from, self.amount, self.to)
    }
}

#[derive(Debug, Default)]
pub struct Ledger {
    balances: Mutex<HashMap<String, i64>>,
}

impl Ledger {
    pub fn new(seed: impl IntoIterator<Item = (String, i64)>) -> Self {
        Self {
            balances: Mutex::new(seed.into_iter().collect()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, i64>> {
        // A panicking handler cannot leave a half-applied transfer behind, so
        // the map is still consistent after poisoning.
        self.balances.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Issue a session for `account`. Always succeeds; there is no password.
    pub fn login(&self, account: &str) -> SessionToken {
        debug!(account, "Issuing session");
        SessionToken::new(account)
    }

    /// Balance of `account`, 0 for accounts that do not exist
    pub fn balance(&self, account: &str) -> i64 {
        self.lock().get(account).copied().unwrap_or(0)
    }

    /// Move `amount` from the session's account to `to`.
    ///
    /// Negative amounts, self-transfers and overdrafts are all accepted.
    /// Unknown accounts are opened at 0. Arithmetic wraps, so the ledger
    /// total is conserved even at the edges of `i64`.
    pub fn transfer(&self, from: &SessionToken, to: &str, amount: i64) -> TransferReceipt {
        {
            let mut balances = self.lock();
            let debit = balances.entry(from.account().to_string()).or_insert(0);
            *debit = debit.wrapping_sub(amount);
            let credit = balances.entry(to.to_string()).or_insert(0);
            *credit = credit.wrapping_add(amount);
        }

        let receipt = TransferReceipt {
            from: from.account().to_string(),
            to: to.to_string(),
            amount,
        };
        info!(
            from = %receipt.from,
            to = %receipt.to,
            amount = receipt.amount,
            "{}",
            receipt
        );
        receipt
    }

    /// Whether `account` has ever held a balance
    pub fn has_account(&self, account: &str) -> bool {
        self.lock().contains_key(account)
    }

    /// Snapshot of every balance, sorted by account name
    pub fn accounts(&self) -> BTreeMap<String, i64> {
        self.lock().iter().map(|(k, v)| (k.clone(), *v)).collect()
    }

    /// Sum of all balances (wrapping, matching `transfer`)
    pub fn total(&self) -> i64 {
        self.lock().values().fold(0i64, |acc, v| acc.wrapping_add(*v))
    }
}
