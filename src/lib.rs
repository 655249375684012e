#[macro_use]
extern crate log;

mod features;

pub use features::{
    load_csv, load_json, load_path, DominantType, Format, LoadError, Report, ReportParams,
    StoreError, StoreResult, Transaction, TransactionId, TransactionStore,
};
