// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! In-memory mirror of the user's accounts, transactions and categories.
//!
//! Every write mutates local state first and then sends the matching
//! repository writes. What happens when one of those writes fails is decided
//! by the [`SyncPolicy`], and every write reports a [`WriteOutcome`].

use crate::error::{StoreError, StoreResult};
use crate::ledger;
use crate::models::{Account, AccountType, Category, CategoryKind, Transaction, default_categories};
use crate::repository::{Mutation, Repository, Step};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPolicy {
    /// Undo already-sent writes and restore local state.
    #[default]
    Rollback,
    /// Keep local state and retry the failed writes later.
    Queue,
}

impl FromStr for SyncPolicy {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rollback" => Ok(SyncPolicy::Rollback),
            "queue" => Ok(SyncPolicy::Queue),
            other => Err(StoreError::InvalidValue(format!(
                "unknown sync policy '{}', expected rollback|queue",
                other
            ))),
        }
    }
}

impl fmt::Display for SyncPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyncPolicy::Rollback => "rollback",
            SyncPolicy::Queue => "queue",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Synced,
    RolledBack { error: String },
    Queued { pending: usize },
}

impl WriteOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, WriteOutcome::Synced)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushReport {
    pub sent: usize,
    pub remaining: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub r#type: Option<AccountType>,
    pub balance: Option<Decimal>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub kind: Option<CategoryKind>,
    pub color: Option<String>,
    /// `Some(None)` clears the budget.
    pub budget: Option<Option<Decimal>>,
}

struct Snapshot {
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    categories: Vec<Category>,
}

pub struct Store<R: Repository> {
    repo: R,
    policy: SyncPolicy,
    accounts: Vec<Account>,
    /// Newest first.
    transactions: Vec<Transaction>,
    categories: Vec<Category>,
    /// Categories are the built-in defaults and not yet persisted.
    default_categories_only: bool,
    pending: VecDeque<Mutation>,
}

impl<R: Repository> Store<R> {
    pub fn new(repo: R, policy: SyncPolicy) -> Self {
        Self {
            repo,
            policy,
            accounts: Vec::new(),
            transactions: Vec::new(),
            categories: default_categories(),
            default_categories_only: true,
            pending: VecDeque::new(),
        }
    }

    /// Replaces local state with the repository's rows.
    pub fn load(&mut self) -> StoreResult<()> {
        let accounts = self.repo.fetch_accounts()?;
        let transactions = self.repo.fetch_transactions()?;
        let categories = self.repo.fetch_categories()?;
        debug!(
            backend = self.repo.name(),
            accounts = accounts.len(),
            transactions = transactions.len(),
            categories = categories.len(),
            pending = self.pending.len(),
            "loaded store"
        );
        self.accounts = accounts;
        self.transactions = transactions;
        if categories.is_empty() {
            self.categories = default_categories();
            self.default_categories_only = true;
        } else {
            self.categories = categories;
            self.default_categories_only = false;
        }

        // Backend rows predate anything still queued.
        let pending: Vec<Mutation> = self.pending.iter().cloned().collect();
        for m in &pending {
            self.replay(m);
        }
        if !self.repo.stores_opening_balance() {
            for a in &mut self.accounts {
                a.opening_balance = a.balance - ledger::net_effect(&self.transactions, &a.id);
            }
        }
        Ok(())
    }

    /// Applies a queued write to local state as if the backend had
    /// accepted it.
    fn replay(&mut self, m: &Mutation) {
        match m {
            Mutation::UpsertAccount { account } => {
                match self.accounts.iter_mut().find(|a| a.id == account.id) {
                    Some(a) => *a = account.clone(),
                    None => self.accounts.push(account.clone()),
                }
            }
            Mutation::DeleteAccount { id } => {
                self.accounts.retain(|a| &a.id != id);
                self.transactions.retain(|t| !t.touches(id));
            }
            Mutation::SetBalance {
                account_id,
                balance,
            } => {
                if let Some(a) = self.accounts.iter_mut().find(|a| &a.id == account_id) {
                    a.balance = *balance;
                }
            }
            Mutation::InsertTransaction { transaction } => {
                if self.transaction(&transaction.id).is_none() {
                    self.transactions.insert(0, transaction.clone());
                }
            }
            Mutation::UpdateTransaction { transaction } => {
                if let Some(t) = self.transactions.iter_mut().find(|t| t.id == transaction.id) {
                    *t = transaction.clone();
                }
            }
            Mutation::DeleteTransaction { id } => self.transactions.retain(|t| &t.id != id),
            Mutation::UpsertCategory { category } => {
                match self.categories.iter_mut().find(|c| c.id == category.id) {
                    Some(c) => *c = category.clone(),
                    None => self.categories.push(category.clone()),
                }
            }
            Mutation::DeleteCategory { id } => self.categories.retain(|c| &c.id != id),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn pending(&self) -> &VecDeque<Mutation> {
        &self.pending
    }

    /// Restores writes queued by an earlier session.
    pub fn restore_pending(&mut self, pending: Vec<Mutation>) {
        self.pending = pending.into();
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    /// Looks an account up by id or case-insensitive name.
    pub fn find_account(&self, key: &str) -> StoreResult<&Account> {
        let key = key.trim();
        self.accounts
            .iter()
            .find(|a| a.id == key)
            .or_else(|| self.accounts.iter().find(|a| a.name.eq_ignore_ascii_case(key)))
            .ok_or_else(|| StoreError::AccountNotFound(key.to_string()))
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Looks a transaction up by id or by an unambiguous id prefix.
    pub fn find_transaction(&self, key: &str) -> StoreResult<&Transaction> {
        let key = key.trim();
        if let Some(t) = self.transaction(key) {
            return Ok(t);
        }
        let mut hits = self.transactions.iter().filter(|t| t.id.starts_with(key));
        match (hits.next(), hits.next()) {
            (Some(t), None) if key.len() >= 4 => Ok(t),
            _ => Err(StoreError::TransactionNotFound(key.to_string())),
        }
    }

    /// Looks a category up by id or case-insensitive name.
    pub fn find_category(&self, key: &str) -> StoreResult<&Category> {
        let key = key.trim();
        self.categories
            .iter()
            .find(|c| c.id == key)
            .or_else(|| self.categories.iter().find(|c| c.name.eq_ignore_ascii_case(key)))
            .ok_or_else(|| StoreError::CategoryNotFound(key.to_string()))
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            accounts: self.accounts.clone(),
            transactions: self.transactions.clone(),
            categories: self.categories.clone(),
        }
    }

    fn restore(&mut self, s: Snapshot) {
        self.accounts = s.accounts;
        self.transactions = s.transactions;
        self.categories = s.categories;
    }

    /// Sends `steps` in order after local state has been mutated.
    fn commit(&mut self, steps: Vec<Step>, before: Snapshot) -> WriteOutcome {
        if !self.pending.is_empty() {
            let report = self.flush_pending();
            if report.remaining > 0 {
                return match self.policy {
                    SyncPolicy::Queue => {
                        self.pending.extend(steps.into_iter().map(|s| s.forward));
                        warn!(pending = self.pending.len(), "queued behind earlier writes");
                        WriteOutcome::Queued {
                            pending: self.pending.len(),
                        }
                    }
                    SyncPolicy::Rollback => {
                        self.restore(before);
                        let error = report
                            .error
                            .unwrap_or_else(|| "earlier writes still pending".to_string());
                        warn!(%error, "rolled back: earlier writes still pending");
                        WriteOutcome::RolledBack { error }
                    }
                };
            }
        }

        for (i, step) in steps.iter().enumerate() {
            debug!(backend = self.repo.name(), op = %step.forward.describe(), "send");
            let Err(e) = step.forward.send(&self.repo) else {
                continue;
            };
            warn!(op = %step.forward.describe(), error = %e, policy = %self.policy, "remote write failed");
            return match self.policy {
                SyncPolicy::Rollback => {
                    for done in steps[..i].iter().rev() {
                        for inv in &done.inverse {
                            if let Err(e2) = inv.send(&self.repo) {
                                warn!(op = %inv.describe(), error = %e2, "compensating write failed");
                            }
                        }
                    }
                    self.restore(before);
                    WriteOutcome::RolledBack {
                        error: e.to_string(),
                    }
                }
                SyncPolicy::Queue => {
                    self.pending
                        .extend(steps[i..].iter().map(|s| s.forward.clone()));
                    WriteOutcome::Queued {
                        pending: self.pending.len(),
                    }
                }
            };
        }
        WriteOutcome::Synced
    }

    /// Retries queued writes in order, stopping at the first failure.
    pub fn flush_pending(&mut self) -> FlushReport {
        let mut sent = 0;
        while let Some(m) = self.pending.front() {
            if let Err(e) = m.send(&self.repo) {
                warn!(op = %m.describe(), error = %e, "pending write still failing");
                return FlushReport {
                    sent,
                    remaining: self.pending.len(),
                    error: Some(e.to_string()),
                };
            }
            self.pending.pop_front();
            sent += 1;
        }
        if sent > 0 {
            info!(sent, "flushed pending writes");
        }
        FlushReport {
            sent,
            remaining: 0,
            error: None,
        }
    }

    /// Drops the queued write at `index` (0 = oldest) and reloads, so its
    /// local effect disappears. For writes the backend will never accept.
    pub fn discard_pending(&mut self, index: usize) -> StoreResult<Mutation> {
        let removed = self.pending.remove(index).ok_or_else(|| {
            StoreError::InvalidValue(format!(
                "no queued write #{} ({} pending)",
                index + 1,
                self.pending.len()
            ))
        })?;
        warn!(op = %removed.describe(), "discarded queued write");
        self.load()?;
        Ok(removed)
    }

    fn ensure_account(&self, id: &str) -> StoreResult<()> {
        if self.account(id).is_none() {
            return Err(StoreError::AccountNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Balance writes (with their inverses) for every account whose balance
    /// differs between the current state and `next`.
    fn balance_steps(&self, next: &[Account]) -> Vec<Step> {
        self.accounts
            .iter()
            .zip(next)
            .filter(|(old, new)| old.balance != new.balance)
            .map(|(old, new)| {
                Step::new(
                    Mutation::SetBalance {
                        account_id: new.id.clone(),
                        balance: new.balance,
                    },
                    vec![Mutation::SetBalance {
                        account_id: old.id.clone(),
                        balance: old.balance,
                    }],
                )
            })
            .collect()
    }

    /// Writes that undo deleting `account` together with the transactions
    /// in `claimed` that touch it.
    fn account_restore(account: &Account, txs: &[Transaction], claimed: &mut HashSet<String>) -> Vec<Mutation> {
        let mut inverse = vec![Mutation::UpsertAccount {
            account: account.clone(),
        }];
        for t in txs.iter().rev() {
            if t.touches(&account.id) && claimed.insert(t.id.clone()) {
                inverse.push(Mutation::InsertTransaction {
                    transaction: t.clone(),
                });
            }
        }
        inverse
    }

    // ── Accounts ────────────────────────────────────────────────────

    pub fn add_account(&mut self, account: Account) -> StoreResult<WriteOutcome> {
        if self.account(&account.id).is_some() {
            return Err(StoreError::DuplicateId(account.id));
        }
        debug!(id = %account.id, name = %account.name, "add account");
        let before = self.snapshot();
        let step = Step::new(
            Mutation::UpsertAccount {
                account: account.clone(),
            },
            vec![Mutation::DeleteAccount {
                id: account.id.clone(),
            }],
        );
        self.accounts.push(account);
        Ok(self.commit(vec![step], before))
    }

    /// Edits account fields. A direct balance edit is treated as an
    /// adjustment and moves the opening balance by the same amount.
    pub fn update_account(&mut self, id: &str, patch: AccountPatch) -> StoreResult<WriteOutcome> {
        let idx = self
            .accounts
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| StoreError::AccountNotFound(id.to_string()))?;
        let old = self.accounts[idx].clone();
        let mut new = old.clone();
        if let Some(name) = patch.name {
            new.name = name;
        }
        if let Some(t) = patch.r#type {
            new.r#type = t;
        }
        if let Some(color) = patch.color {
            new.color = color;
        }
        if let Some(balance) = patch.balance {
            new.opening_balance += balance - old.balance;
            new.balance = balance;
        }
        debug!(id, "update account");
        let before = self.snapshot();
        self.accounts[idx] = new.clone();
        let step = Step::new(
            Mutation::UpsertAccount { account: new },
            vec![Mutation::UpsertAccount { account: old }],
        );
        Ok(self.commit(vec![step], before))
    }

    /// Removes the account and every transaction that references it. Other
    /// accounts keep their balances; the effect of removed transfers is
    /// folded into their opening balances.
    pub fn delete_account(&mut self, id: &str) -> StoreResult<WriteOutcome> {
        let account = self
            .account(id)
            .cloned()
            .ok_or_else(|| StoreError::AccountNotFound(id.to_string()))?;
        debug!(id, "delete account");
        let before = self.snapshot();

        let (removed, kept): (Vec<Transaction>, Vec<Transaction>) = self
            .transactions
            .drain(..)
            .partition(|t| t.touches(id));
        self.transactions = kept;
        self.accounts.retain(|a| a.id != id);

        let mut steps = Vec::new();
        let mut claimed = HashSet::new();
        steps.push(Step::new(
            Mutation::DeleteAccount { id: id.to_string() },
            Self::account_restore(&account, &removed, &mut claimed),
        ));
        for other in self.accounts.iter_mut() {
            let folded: Decimal = removed
                .iter()
                .map(|t| ledger::signed_effect(t, &other.id))
                .sum();
            if folded.is_zero() {
                continue;
            }
            let old = other.clone();
            other.opening_balance += folded;
            steps.push(Step::new(
                Mutation::UpsertAccount {
                    account: other.clone(),
                },
                vec![Mutation::UpsertAccount { account: old }],
            ));
        }
        Ok(self.commit(steps, before))
    }

    // ── Transactions ────────────────────────────────────────────────

    fn check_references(&self, tx: &Transaction) -> StoreResult<()> {
        tx.validate()?;
        self.ensure_account(&tx.account_id)?;
        if let Some(to) = &tx.to_account_id {
            self.ensure_account(to)?;
        }
        Ok(())
    }

    pub fn add_transaction(&mut self, tx: Transaction) -> StoreResult<WriteOutcome> {
        self.check_references(&tx)?;
        if self.transaction(&tx.id).is_some() {
            return Err(StoreError::DuplicateId(tx.id));
        }
        debug!(id = %tx.id, kind = %tx.r#type, amount = %tx.amount, "add transaction");
        let next = ledger::rebalance(&self.accounts, None, Some(&tx));
        let mut steps = vec![Step::new(
            Mutation::InsertTransaction {
                transaction: tx.clone(),
            },
            vec![Mutation::DeleteTransaction { id: tx.id.clone() }],
        )];
        steps.extend(self.balance_steps(&next));

        let before = self.snapshot();
        self.accounts = next;
        self.transactions.insert(0, tx);
        Ok(self.commit(steps, before))
    }

    /// Replaces the transaction with the same id: the old effect is reverted
    /// and the new one applied in a single pass.
    pub fn update_transaction(&mut self, tx: Transaction) -> StoreResult<WriteOutcome> {
        let idx = self
            .transactions
            .iter()
            .position(|t| t.id == tx.id)
            .ok_or_else(|| StoreError::TransactionNotFound(tx.id.clone()))?;
        self.check_references(&tx)?;
        let old = self.transactions[idx].clone();
        debug!(id = %tx.id, "update transaction");
        let next = ledger::rebalance(&self.accounts, Some(&old), Some(&tx));
        let mut steps = vec![Step::new(
            Mutation::UpdateTransaction {
                transaction: tx.clone(),
            },
            vec![Mutation::UpdateTransaction { transaction: old }],
        )];
        steps.extend(self.balance_steps(&next));

        let before = self.snapshot();
        self.accounts = next;
        self.transactions[idx] = tx;
        Ok(self.commit(steps, before))
    }

    pub fn delete_transaction(&mut self, id: &str) -> StoreResult<WriteOutcome> {
        let idx = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::TransactionNotFound(id.to_string()))?;
        let old = self.transactions[idx].clone();
        debug!(id, "delete transaction");
        let next = ledger::rebalance(&self.accounts, Some(&old), None);
        let mut steps = vec![Step::new(
            Mutation::DeleteTransaction { id: id.to_string() },
            vec![Mutation::InsertTransaction { transaction: old }],
        )];
        steps.extend(self.balance_steps(&next));

        let before = self.snapshot();
        self.accounts = next;
        self.transactions.remove(idx);
        Ok(self.commit(steps, before))
    }

    // ── Categories ──────────────────────────────────────────────────

    fn ensure_unique_category(&self, name: &str, kind: CategoryKind, except: Option<&str>) -> StoreResult<()> {
        let clash = self.categories.iter().any(|c| {
            c.kind == kind && c.name.eq_ignore_ascii_case(name) && Some(c.id.as_str()) != except
        });
        if clash {
            return Err(StoreError::InvalidValue(format!(
                "{} category '{}' already exists",
                kind, name
            )));
        }
        Ok(())
    }

    /// Persists the built-in categories if the backend had none.
    pub fn seed_default_categories(&mut self) -> Option<WriteOutcome> {
        if !self.default_categories_only {
            return None;
        }
        let steps = self
            .categories
            .iter()
            .map(|c| {
                Step::new(
                    Mutation::UpsertCategory { category: c.clone() },
                    vec![Mutation::DeleteCategory { id: c.id.clone() }],
                )
            })
            .collect();
        let before = self.snapshot();
        let outcome = self.commit(steps, before);
        if !matches!(outcome, WriteOutcome::RolledBack { .. }) {
            self.default_categories_only = false;
        }
        Some(outcome)
    }

    pub fn add_category(&mut self, category: Category) -> StoreResult<WriteOutcome> {
        if self.categories.iter().any(|c| c.id == category.id) {
            return Err(StoreError::DuplicateId(category.id));
        }
        self.ensure_unique_category(&category.name, category.kind, None)?;
        debug!(name = %category.name, "add category");
        let before = self.snapshot();
        let step = Step::new(
            Mutation::UpsertCategory {
                category: category.clone(),
            },
            vec![Mutation::DeleteCategory {
                id: category.id.clone(),
            }],
        );
        self.categories.push(category);
        Ok(self.commit(vec![step], before))
    }

    /// Renaming a category does not relabel existing transactions.
    pub fn update_category(&mut self, id: &str, patch: CategoryPatch) -> StoreResult<WriteOutcome> {
        let idx = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| StoreError::CategoryNotFound(id.to_string()))?;
        let old = self.categories[idx].clone();
        let mut new = old.clone();
        if let Some(name) = patch.name {
            new.name = name;
        }
        if let Some(kind) = patch.kind {
            new.kind = kind;
        }
        if let Some(color) = patch.color {
            new.color = color;
        }
        if let Some(budget) = patch.budget {
            new.budget = budget;
        }
        self.ensure_unique_category(&new.name, new.kind, Some(id))?;
        let before = self.snapshot();
        self.categories[idx] = new.clone();
        let step = Step::new(
            Mutation::UpsertCategory { category: new },
            vec![Mutation::UpsertCategory { category: old }],
        );
        Ok(self.commit(vec![step], before))
    }

    pub fn delete_category(&mut self, id: &str) -> StoreResult<WriteOutcome> {
        let idx = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| StoreError::CategoryNotFound(id.to_string()))?;
        let before = self.snapshot();
        let old = self.categories.remove(idx);
        let step = Step::new(
            Mutation::DeleteCategory { id: id.to_string() },
            vec![Mutation::UpsertCategory { category: old }],
        );
        Ok(self.commit(vec![step], before))
    }

    /// Wipes accounts, transactions and categories, then restores the
    /// default categories.
    pub fn reset(&mut self) -> WriteOutcome {
        info!("resetting store");
        let before = self.snapshot();
        let mut steps = Vec::new();
        let mut claimed = HashSet::new();
        for a in &self.accounts {
            steps.push(Step::new(
                Mutation::DeleteAccount { id: a.id.clone() },
                Self::account_restore(a, &self.transactions, &mut claimed),
            ));
        }
        for c in &self.categories {
            steps.push(Step::new(
                Mutation::DeleteCategory { id: c.id.clone() },
                vec![Mutation::UpsertCategory { category: c.clone() }],
            ));
        }
        let defaults = default_categories();
        for c in &defaults {
            steps.push(Step::new(
                Mutation::UpsertCategory { category: c.clone() },
                vec![Mutation::DeleteCategory { id: c.id.clone() }],
            ));
        }
        let was_default = self.default_categories_only;
        self.accounts.clear();
        self.transactions.clear();
        self.categories = defaults;
        self.default_categories_only = false;
        let outcome = self.commit(steps, before);
        if matches!(outcome, WriteOutcome::RolledBack { .. }) {
            self.default_categories_only = was_default;
        }
        outcome
    }
}
