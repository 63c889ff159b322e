//! # SweepSafe
//!
//! A safety-first cleanup engine.
//!
//! SweepSafe finds reclaimable files (temp directories, browser and developer
//! caches) and deletes them through a single guarded choke point:
//!
//! - **Path Guard**: a hardcoded never-delete list plus structural checks on
//!   every path before anything is removed
//! - **Whitelist**: user glob patterns that are skipped during scans and
//!   refused at deletion time
//! - **Parallel Scan**: one worker per target, deterministic result order
//! - **Dry-Run Ledger**: every clean is previewed and exported before it runs
//! - **Partial Failure**: a batch skips the items it cannot delete and
//!   reports them, it never aborts half way

pub mod cleaner;
pub mod cli;
pub mod common;
pub mod scanner;
pub mod whitelist;
