use chrono::NaiveDate;
use rust_decimal::prelude::*;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct TransactionId(#[serde(deserialize_with = "deserialize_id")] i64);

impl TransactionId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for TransactionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ids arrive either as JSON numbers or as numeric strings
fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("transaction id is not an integer: {text}"))),
    }
}

/// A single card transaction as it appears in the input document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Transaction {
    #[serde(rename = "transaction_id")]
    id: TransactionId,

    /// `YYYY-MM-DD`, kept as written so that malformed dates survive loading
    #[serde(rename = "transaction_date")]
    date: String,

    /// Signed, no currency unit
    #[serde(rename = "transaction_amount", with = "rust_decimal::serde::float")]
    amount: Decimal,

    #[serde(rename = "transaction_type")]
    transaction_type: String,

    #[serde(rename = "transaction_description")]
    description: String,

    merchant_name: String,
    card_type: String,
}

impl Transaction {
    pub fn new(
        id: i64,
        date: impl Into<String>,
        amount: Decimal,
        transaction_type: impl Into<String>,
        description: impl Into<String>,
        merchant_name: impl Into<String>,
        card_type: impl Into<String>,
    ) -> Self {
        Self {
            id: TransactionId(id),
            date: date.into(),
            amount,
            transaction_type: transaction_type.into(),
            description: description.into(),
            merchant_name: merchant_name.into(),
            card_type: card_type.into(),
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn transaction_type(&self) -> &str {
        &self.transaction_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn merchant_name(&self) -> &str {
        &self.merchant_name
    }

    pub fn card_type(&self) -> &str {
        &self.card_type
    }

    /// Raw text of the n-th `-` separated date component, if present.
    fn date_component(&self, index: usize) -> Option<&str> {
        self.date.split('-').nth(index)
    }

    /// Numeric value of a date component. "05" reads as 5.
    fn numeric_component(&self, index: usize) -> Option<i64> {
        self.date_component(index)
            .and_then(|part| part.trim().parse().ok())
    }

    pub(crate) fn year(&self) -> Option<i64> {
        self.numeric_component(0)
    }

    pub(crate) fn month(&self) -> Option<i64> {
        self.numeric_component(1)
    }

    pub(crate) fn day(&self) -> Option<i64> {
        self.numeric_component(2)
    }

    /// Two character month key, e.g. "05".
    pub(crate) fn month_key(&self) -> Option<&str> {
        self.date_component(1)
    }

    /// The date as a calendar value, `None` when it is not a valid `YYYY-MM-DD` date.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}
