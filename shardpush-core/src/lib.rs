#![forbid(unsafe_code)]

pub mod archive;
pub mod batcher;
pub mod codec;
pub mod config;
pub mod domain;
pub mod driver;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod observer;
pub mod pipeline;
pub mod space;
pub mod stats;
pub mod upload;

// Re-exports: stable API surface
pub use config::RunConfig;
pub use domain::{Batch, BatchKind, FileRecord};
pub use driver::{Driver, RunOutcome, RunReport};
pub use ledger::{LedgerState, ProgressLedger};
pub use observer::{LogObserver, NoopObserver, RunObserver};
pub use space::SpaceGuard;
pub use upload::{CommandUploader, UploadOutcome, Uploader};
