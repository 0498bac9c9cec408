//! 核心实体行数非零

use crate::check::probes::Probe;
use crate::check::result::Finding;
use crate::config::IntegrityConfig;
use crate::sys::query::quote_ident;
use crate::sys::Env;
use crate::utils::{HealthError, Result};

pub struct IntegrityProbe {
    cfg: IntegrityConfig,
}

impl IntegrityProbe {
    pub fn new(cfg: IntegrityConfig) -> Self {
        Self { cfg }
    }
}

pub fn count_statement(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", quote_ident(table))
}

impl Probe for IntegrityProbe {
    fn id(&self) -> &'static str {
        "data_integrity"
    }

    fn name(&self) -> &'static str {
        "Data integrity"
    }

    fn evaluate(&self, env: &Env) -> Result<Finding> {
        let mut counts = Vec::new();
        let mut empty = Vec::new();
        let mut failed = Vec::new();

        for table in &self.cfg.tables {
            match env.query.scalar(&count_statement(table), &[]) {
                Ok(v) => {
                    let n = v.as_i64().ok_or_else(|| {
                        HealthError::Parse(format!("non-numeric row count for {}: {:?}", table, v))
                    })?;
                    if n == 0 {
                        empty.push(table.as_str());
                    }
                    counts.push(format!("{}={}", table, n));
                }
                Err(e) => failed.push(format!("{} ({})", table, e)),
            }
        }

        Ok(if !failed.is_empty() {
            Finding::critical(format!("row count failed for: {}", failed.join(", ")))
        } else if !empty.is_empty() {
            Finding::warning(format!(
                "empty tables: {} [{}]",
                empty.join(", "),
                counts.join(", ")
            ))
        } else {
            Finding::good(format!("row counts: {}", counts.join(", ")))
        })
    }
}
