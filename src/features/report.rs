use std::collections::BTreeSet;

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::store::{DominantType, StoreError, StoreResult, TransactionStore};
use super::transaction::{Transaction, TransactionId};

/// Arguments for the date, merchant, amount and id queries of a [`Report`].
#[derive(Debug, Clone)]
pub struct ReportParams {
    pub year: i64,
    pub month: i64,
    pub day: i64,
    pub range_start: String,
    pub range_end: String,
    pub merchant: String,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub before: String,
    pub id: TransactionId,
}

impl Default for ReportParams {
    fn default() -> Self {
        Self {
            year: 2023,
            month: 5,
            day: 1,
            range_start: "2023-05-01".to_string(),
            range_end: "2023-05-04".to_string(),
            merchant: "SuperMart".to_string(),
            min_amount: dec!(50),
            max_amount: dec!(150),
            before: "2023-05-02".to_string(),
            id: TransactionId::new(1),
        }
    }
}

/// Answers to every store query in one serializable value.
#[derive(Serialize, Debug)]
pub struct Report<'a> {
    pub unique_types: BTreeSet<&'a str>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount_on_date: Decimal,
    pub debit_transactions: Vec<&'a Transaction>,
    pub transactions_in_date_range: Vec<&'a Transaction>,
    pub merchant_transactions: Vec<&'a Transaction>,
    /// `None` for an empty store
    #[serde(with = "rust_decimal::serde::float_option")]
    pub average_amount: Option<Decimal>,
    pub transactions_in_amount_range: Vec<&'a Transaction>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_debit_amount: Decimal,
    pub most_frequent_month: Option<String>,
    pub most_frequent_debit_month: Option<String>,
    pub dominant_type: DominantType,
    pub transactions_before_date: Vec<&'a Transaction>,
    pub transaction_by_id: Option<&'a Transaction>,
    pub descriptions: Vec<&'a str>,
}

impl<'a> Report<'a> {
    pub fn build(store: &'a TransactionStore, params: &ReportParams) -> StoreResult<Self> {
        Ok(Self {
            unique_types: store.unique_types().into_iter().collect(),
            total_amount: store.total_amount()?,
            total_amount_on_date: store.total_amount_by_date(
                Some(params.year),
                Some(params.month),
                Some(params.day),
            )?,
            debit_transactions: store.by_type("debit"),
            transactions_in_date_range: store
                .in_date_range(&params.range_start, &params.range_end)?,
            merchant_transactions: store.by_merchant(&params.merchant),
            average_amount: undefined_when_empty(store.average_amount())?,
            transactions_in_amount_range: store
                .by_amount_range(params.min_amount, params.max_amount),
            total_debit_amount: store.total_debit_amount()?,
            most_frequent_month: undefined_when_empty(store.most_frequent_month())?,
            most_frequent_debit_month: undefined_when_empty(store.most_frequent_debit_month())?,
            dominant_type: store.dominant_type(),
            transactions_before_date: store.before_date(&params.before)?,
            transaction_by_id: store.find_by_id(params.id),
            descriptions: store.descriptions(),
        })
    }
}

/// Aggregates with no data become `None`; any other failure still aborts the report.
fn undefined_when_empty<T>(result: StoreResult<T>) -> StoreResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(StoreError::EmptyStore) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> TransactionStore {
        let mut store = TransactionStore::new();
        store.append(Transaction::new(
            1,
            "2023-05-01",
            dec!(100),
            "debit",
            "Groceries",
            "SuperMart",
            "Visa",
        ));
        store.append(Transaction::new(
            2,
            "2023-05-01",
            dec!(-30),
            "credit",
            "Refund",
            "SuperMart",
            "Mastercard",
        ));
        store.append(Transaction::new(
            3,
            "2023-05-05",
            dec!(60),
            "debit",
            "Dinner",
            "Bistro",
            "Visa",
        ));
        store
    }

    #[test]
    fn test_report_with_default_params() {
        let store = store();
        let report = Report::build(&store, &ReportParams::default()).unwrap();

        assert_eq!(report.unique_types.into_iter().collect::<Vec<_>>(), vec!["credit", "debit"]);
        assert_eq!(report.total_amount, dec!(130));
        assert_eq!(report.total_amount_on_date, dec!(70));
        assert_eq!(report.debit_transactions.len(), 2);
        assert_eq!(report.transactions_in_date_range.len(), 2);
        assert_eq!(report.merchant_transactions.len(), 2);
        assert_eq!(report.transactions_in_amount_range.len(), 2);
        assert_eq!(report.total_debit_amount, dec!(160));
        assert_eq!(report.most_frequent_month.as_deref(), Some("05"));
        assert_eq!(report.dominant_type, DominantType::Debit);
        assert_eq!(report.transactions_before_date.len(), 2);
        assert_eq!(report.transaction_by_id.map(|tr| tr.description()), Some("Groceries"));
        assert_eq!(report.descriptions, vec!["Groceries", "Refund", "Dinner"]);
    }

    #[test]
    fn test_report_of_empty_store() {
        let store = TransactionStore::new();
        let report = Report::build(&store, &ReportParams::default()).unwrap();

        assert_eq!(report.average_amount, None);
        assert_eq!(report.most_frequent_month, None);
        assert_eq!(report.most_frequent_debit_month, None);
        assert_eq!(report.dominant_type, DominantType::Equal);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["average_amount"], serde_json::Value::Null);
        assert_eq!(json["dominant_type"], "equal");
    }

    #[test]
    fn test_report_fails_when_totals_overflow() {
        let mut store = store();
        store.append(Transaction::new(
            4,
            "2023-05-01",
            Decimal::MAX,
            "debit",
            "Yacht",
            "Harbour",
            "Amex",
        ));
        assert_eq!(
            Report::build(&store, &ReportParams::default()).unwrap_err(),
            StoreError::Overflow
        );
    }

    #[test]
    fn test_report_rejects_invalid_dates() {
        let params = ReportParams {
            before: "02/05/2023".to_string(),
            ..ReportParams::default()
        };
        assert_eq!(
            Report::build(&store(), &params).unwrap_err(),
            StoreError::InvalidDate("02/05/2023".to_string())
        );
    }
}
