use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::store::TransactionStore;
use super::transaction::Transaction;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Unable to read transactions - {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON transactions - {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed CSV transactions - {0}")]
    Csv(#[from] csv::Error),

    #[error("Cannot tell the format of {0}. Use a .json or .csv file or pass --format")]
    UnknownFormat(PathBuf),
}

type LoadResult<T> = Result<T, LoadError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ArgEnum)]
pub enum Format {
    Json,
    Csv,
}

impl Format {
    pub fn from_path(path: &Path) -> LoadResult<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| LoadError::UnknownFormat(path.to_path_buf()))
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "csv" => Some(Format::Csv),
            _ => None,
        }
    }
}

/// Reads a JSON array of transactions.
pub fn load_json<R: Read>(reader: R) -> LoadResult<TransactionStore> {
    let transactions: Vec<Transaction> = serde_json::from_reader(reader)?;
    let mut store = TransactionStore::new();
    store.extend(transactions);
    Ok(store)
}

/// Reads headered CSV using the same column names as the JSON document.
pub fn load_csv<R: Read>(reader: R) -> LoadResult<TransactionStore> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .trim(csv::Trim::All)
        .from_reader(reader);

    let transactions = rdr
        .deserialize()
        .collect::<Result<Vec<Transaction>, csv::Error>>()?;

    let mut store = TransactionStore::new();
    store.extend(transactions);
    Ok(store)
}

/// Opens `path` and loads it, detecting the format from the extension unless one is given.
pub fn load_path(path: &Path, format: Option<Format>) -> LoadResult<TransactionStore> {
    let format = match format {
        Some(format) => format,
        None => Format::from_path(path)?,
    };
    let reader = BufReader::new(File::open(path)?);

    let store = match format {
        Format::Json => load_json(reader)?,
        Format::Csv => load_csv(reader)?,
    };
    debug!(
        "Loaded {} transactions from {} as {:?}",
        store.len(),
        path.display(),
        format
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    const JSON: &str = r#"[
        {
            "transaction_id": 1,
            "transaction_date": "2023-05-01",
            "transaction_amount": 100.0,
            "transaction_type": "debit",
            "transaction_description": "Groceries",
            "merchant_name": "SuperMart",
            "card_type": "Visa"
        },
        {
            "transaction_id": "2",
            "transaction_date": "2023-05-02",
            "transaction_amount": -30.5,
            "transaction_type": "credit",
            "transaction_description": "Refund",
            "merchant_name": "SuperMart",
            "card_type": "Mastercard"
        }
    ]"#;

    const CSV: &str = "\
transaction_id, transaction_date, transaction_amount, transaction_type, transaction_description, merchant_name, card_type
1, 2023-05-01, 100.0, debit, Groceries, SuperMart, Visa
2, 2023-05-02, -30.5, credit, Refund, SuperMart, Mastercard
";

    #[test]
    fn test_load_json() {
        let store = load_json(JSON.as_bytes()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.total_amount(), Ok(dec!(69.5)));
        assert_eq!(store.all()[1].description(), "Refund");
    }

    #[test]
    fn test_load_csv_matches_json() {
        let from_csv = load_csv(CSV.as_bytes()).unwrap();
        let from_json = load_json(JSON.as_bytes()).unwrap();
        assert_eq!(from_csv, from_json);
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let result = load_json(r#"[{"transaction_id": 1}]"#.as_bytes());
        assert!(matches!(result, Err(LoadError::Json(_))));
    }

    #[test]
    fn test_amount_beyond_decimal_range_is_rejected() {
        let data = JSON.replace("100.0", "1e30");
        assert!(matches!(
            load_json(data.as_bytes()),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn test_malformed_csv_is_rejected() {
        let data = "\
transaction_id,transaction_date,transaction_amount,transaction_type,transaction_description,merchant_name,card_type
1,2023-05-01,lots,debit,Groceries,SuperMart,Visa
";
        assert!(matches!(load_csv(data.as_bytes()), Err(LoadError::Csv(_))));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a/b.json")).unwrap(), Format::Json);
        assert_eq!(Format::from_path(Path::new("b.CSV")).unwrap(), Format::Csv);
        assert!(matches!(
            Format::from_path(Path::new("b.txt")),
            Err(LoadError::UnknownFormat(_))
        ));
        assert!(matches!(
            Format::from_path(Path::new("transactions")),
            Err(LoadError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_load_path_detects_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.json");
        File::create(&path)
            .unwrap()
            .write_all(JSON.as_bytes())
            .unwrap();

        let store = load_path(&path, None).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_load_path_explicit_format_overrides_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.txt");
        std::fs::write(&path, CSV).unwrap();

        assert!(load_path(&path, None).is_err());
        let store = load_path(&path, Some(Format::Csv)).unwrap();
        assert_eq!(store.by_type("credit").len(), 1);
    }

    #[test]
    fn test_load_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_path(&dir.path().join("missing.json"), None);
        assert!(matches!(result, Err(LoadError::Io(_))));
    }
}
