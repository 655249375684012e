mod loader;
mod report;
mod store;
mod transaction;

pub use self::{
    loader::{load_csv, load_json, load_path, Format, LoadError},
    report::{Report, ReportParams},
    store::{DominantType, StoreError, StoreResult, TransactionStore},
    transaction::{Transaction, TransactionId},
};
