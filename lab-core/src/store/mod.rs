//! In-memory domain state shared by the victim handlers
//!
//! The store is built once at startup and handed to handlers as an
//! `Arc<StateStore>`; nothing here is global.

pub mod article;
pub mod ledger;

pub use article::{Article, ArticleStore, MAX_COMMENTS};
pub use ledger::{Ledger, TransferReceipt};

use crate::config::SeedConfig;
use lab_common::SessionToken;

#[derive(Debug, Default)]
pub struct StateStore {
    pub ledger: Ledger,
    pub articles: ArticleStore,
}

impl StateStore {
    pub fn seeded(seed: &SeedConfig) -> Self {
        Self {
            ledger: Ledger::new(seed.accounts.clone()),
            articles: ArticleStore::new(seed.article.clone()),
        }
    }

    pub fn login(&self, account: &str) -> SessionToken {
        self.ledger.login(account)
    }

    pub fn balance(&self, account: &str) -> i64 {
        self.ledger.balance(account)
    }

    pub fn has_account(&self, account: &str) -> bool {
        self.ledger.has_account(account)
    }

    pub fn transfer(&self, from: &SessionToken, to: &str, amount: i64) -> TransferReceipt {
        self.ledger.transfer(from, to, amount)
    }

    pub fn post_comment(&self, text: &str) -> bool {
        self.articles.post_comment(text)
    }

    pub fn article(&self) -> Article {
        self.articles.article()
    }
}
