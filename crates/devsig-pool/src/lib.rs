//! # devsig-pool — EUI-64 Identifier Pool
//!
//! Issues device identifiers from a line-oriented ledger file exactly once.
//!
//! - **Ledger** ([`ledger`]) — lossless parse and render of the ledger text,
//!   first-available lookup, and single-line marking.
//! - **Pool** ([`pool`]) — [`IdentifierPool::next_available`] and
//!   [`IdentifierPool::mark_used`] over the file, with every rewrite staged
//!   beside the ledger and renamed into place.
//! - **Lease** ([`lock`]) — `<ledger>.lock` held across allocate, write and
//!   mark by [`IdentifierPool::issue`].
//! - **Generation** ([`generate`]) — new ledger and list files for a range,
//!   with boundary identifiers pre-annotated `RESERVED`.
//!
//! The ledger is the only mutable artifact in the workspace. It is never
//! edited in place.

pub mod error;
pub mod generate;
pub mod ledger;
pub mod lock;
pub mod pool;

pub use error::PoolError;
pub use generate::{generate_range, range_len, RangeOutputs, RangeSummary, MAX_RANGE_LEN};
pub use ledger::{Annotation, Entry, Ledger, Line};
pub use lock::LedgerLock;
pub use pool::{mark_used, next_available, IdentifierPool, PendingMark};
