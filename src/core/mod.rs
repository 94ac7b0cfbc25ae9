//! Core module - store, workbook fallback, resolver, configuration

pub mod config;
pub mod handover;
pub mod resolver;
pub mod store;
pub mod workbook;

pub use config::Config;
pub use handover::{project_dir, register_handover_file, HandoverError};
pub use resolver::{BackfillPolicy, ResolveError, Resolver};
pub use store::{ProjectStore, StoreError, StoredProject};
pub use workbook::{Workbook, WorkbookError};
