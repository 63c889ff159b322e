pub mod batch;
pub mod dry_run;
pub mod engine;

pub use batch::{delete_items, delete_results, BatchFailure, BatchReport};
pub use dry_run::{CategoryTotals, DryRunItem, DryRunLedger};
pub use engine::{safe_delete, safe_delete_with_whitelist, Deleter, SafeDelete};
