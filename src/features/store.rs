use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Serialize;
use thiserror::Error;

use super::transaction::{parse_date, Transaction, TransactionId};

const DEBIT: &str = "debit";
const CREDIT: &str = "credit";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("No transactions to aggregate over")]
    EmptyStore,

    #[error("Invalid date - {0}. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Sum of amounts is outside the representable decimal range")]
    Overflow,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Which of debit or credit transactions occur more often.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DominantType {
    Debit,
    Credit,
    /// Same count on both sides, including none of either
    Equal,
}

impl fmt::Display for DominantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DominantType::Debit => DEBIT,
            DominantType::Credit => CREDIT,
            DominantType::Equal => "equal",
        };
        f.write_str(name)
    }
}

/// Ordered, append-only collection of transactions.
/// Every query leaves the store untouched and keeps insertion order in its result.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
    /// Ids appended so far, only used to report duplicates
    seen_ids: HashSet<TransactionId>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
            seen_ids: HashSet::new(),
        }
    }

    /// Ids are not checked for uniqueness.
    pub fn append(&mut self, transaction: Transaction) {
        if !self.seen_ids.insert(transaction.id()) {
            debug!("Appending duplicate transaction id {}", transaction.id());
        }
        self.transactions.push(transaction);
    }

    pub fn extend<I>(&mut self, transactions: I)
    where
        I: IntoIterator<Item = Transaction>,
    {
        for transaction in transactions {
            self.append(transaction);
        }
    }

    pub fn all(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn unique_types(&self) -> HashSet<&str> {
        self.transactions
            .iter()
            .map(Transaction::transaction_type)
            .collect()
    }

    /// Sum of any subset of transactions. Zero when the subset is empty.
    ///
    /// Fails with [`StoreError::Overflow`] when a partial sum leaves the
    /// `Decimal` range (about ±7.9e28).
    pub fn sum_amounts<'a, I>(subset: I) -> StoreResult<Decimal>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        subset.into_iter().try_fold(dec!(0), |sum, tr| {
            sum.checked_add(tr.amount()).ok_or(StoreError::Overflow)
        })
    }

    pub fn total_amount(&self) -> StoreResult<Decimal> {
        Self::sum_amounts(&self.transactions)
    }

    /// Sums the transactions whose date components equal every filter given.
    ///
    /// Components are compared as numbers after splitting the date on `-`, so
    /// month `5` matches `"2023-05-01"`. No calendar validation takes place.
    pub fn total_amount_by_date(
        &self,
        year: Option<i64>,
        month: Option<i64>,
        day: Option<i64>,
    ) -> StoreResult<Decimal> {
        trace!("total_amount_by_date year={year:?} month={month:?} day={day:?}");

        let matches = |filter: Option<i64>, component: Option<i64>| match filter {
            Some(wanted) => component == Some(wanted),
            None => true,
        };

        Self::sum_amounts(self.transactions.iter().filter(|tr| {
            matches(year, tr.year()) && matches(month, tr.month()) && matches(day, tr.day())
        }))
    }

    /// Exact, case-sensitive match on the transaction type.
    pub fn by_type(&self, transaction_type: &str) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|tr| tr.transaction_type() == transaction_type)
            .collect()
    }

    /// Transactions dated between `start` and `end`, both inclusive.
    ///
    /// Bounds must be valid `YYYY-MM-DD` dates. Stored transactions whose date
    /// is not a valid calendar date never fall inside a range.
    pub fn in_date_range(&self, start: &str, end: &str) -> StoreResult<Vec<&Transaction>> {
        trace!("in_date_range start={start} end={end}");
        let start = calendar_bound(start)?;
        let end = calendar_bound(end)?;
        Ok(self.between(start, end))
    }

    fn between(&self, start: NaiveDate, end: NaiveDate) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|tr| match tr.calendar_date() {
                Some(date) => start <= date && date <= end,
                None => false,
            })
            .collect()
    }

    pub fn by_merchant(&self, merchant_name: &str) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|tr| tr.merchant_name() == merchant_name)
            .collect()
    }

    pub fn average_amount(&self) -> StoreResult<Decimal> {
        if self.transactions.is_empty() {
            return Err(StoreError::EmptyStore);
        }
        let count = Decimal::from(self.transactions.len());
        self.total_amount()?
            .checked_div(count)
            .ok_or(StoreError::Overflow)
    }

    /// Transactions with `min <= amount <= max`. Empty when `min > max`.
    pub fn by_amount_range(
        &self,
        min: impl Into<Decimal>,
        max: impl Into<Decimal>,
    ) -> Vec<&Transaction> {
        let (min, max) = (min.into(), max.into());
        trace!("by_amount_range min={min} max={max}");
        self.transactions
            .iter()
            .filter(|tr| min <= tr.amount() && tr.amount() <= max)
            .collect()
    }

    pub fn total_debit_amount(&self) -> StoreResult<Decimal> {
        Self::sum_amounts(self.by_type(DEBIT))
    }

    /// Month key ("01".."12") with the most transactions in `subset`.
    ///
    /// Ties go to the lowest month key. Transactions whose date has no month
    /// component are not counted.
    pub fn most_frequent_month_of<'a, I>(subset: I) -> StoreResult<String>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for tr in subset {
            if let Some(month) = tr.month_key() {
                *counts.entry(month).or_insert(0) += 1;
            }
        }

        // BTreeMap iterates in ascending key order and only a strictly
        // greater count replaces the current best.
        let mut best: Option<(&str, usize)> = None;
        for (month, count) in counts {
            match best {
                Some((_, best_count)) if best_count >= count => {}
                _ => best = Some((month, count)),
            }
        }

        best.map(|(month, _)| month.to_string())
            .ok_or(StoreError::EmptyStore)
    }

    pub fn most_frequent_month(&self) -> StoreResult<String> {
        Self::most_frequent_month_of(&self.transactions)
    }

    pub fn most_frequent_debit_month(&self) -> StoreResult<String> {
        Self::most_frequent_month_of(self.by_type(DEBIT))
    }

    /// Compares debit against credit counts. Other types are ignored.
    pub fn dominant_type(&self) -> DominantType {
        let (debits, credits) =
            self.transactions
                .iter()
                .fold((0usize, 0usize), |(debits, credits), tr| {
                    match tr.transaction_type() {
                        DEBIT => (debits + 1, credits),
                        CREDIT => (debits, credits + 1),
                        _ => (debits, credits),
                    }
                });

        match debits.cmp(&credits) {
            std::cmp::Ordering::Greater => DominantType::Debit,
            std::cmp::Ordering::Less => DominantType::Credit,
            std::cmp::Ordering::Equal => DominantType::Equal,
        }
    }

    /// Transactions dated on or before `date`.
    pub fn before_date(&self, date: &str) -> StoreResult<Vec<&Transaction>> {
        trace!("before_date date={date}");
        let end = calendar_bound(date)?;
        Ok(self.between(NaiveDate::MIN, end))
    }

    /// First transaction with the given id, in insertion order.
    pub fn find_by_id(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|tr| tr.id() == id)
    }

    pub fn descriptions(&self) -> Vec<&str> {
        self.transactions
            .iter()
            .map(Transaction::description)
            .collect()
    }
}

fn calendar_bound(raw: &str) -> StoreResult<NaiveDate> {
    parse_date(raw).ok_or_else(|| StoreError::InvalidDate(raw.to_string()))
}
