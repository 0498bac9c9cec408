//! One-shot health diagnostics.
//!
//! A fixed battery of independent probes inspects the database, filesystem,
//! process, backups, security settings and user activity. The aggregator
//! runs every probe, absorbs probe faults as CRITICAL findings, and rolls the
//! results up into a single verdict.

pub mod check;
pub mod config;
pub mod sys;
pub mod telemetry;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod utils;

pub use check::aggregator::{Aggregator, RunOptions};
pub use check::probes::Probe;
pub use check::report::{HealthReport, RollupPolicy, Summary, Verdict};
pub use check::result::{CheckResult, Finding, Severity};
pub use config::Config;
