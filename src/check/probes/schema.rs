//! 必需表是否存在

use std::collections::BTreeSet;

use crate::check::probes::Probe;
use crate::check::result::Finding;
use crate::config::SchemaConfig;
use crate::sys::Env;
use crate::utils::Result;

pub struct SchemaProbe {
    cfg: SchemaConfig,
}

impl SchemaProbe {
    pub fn new(cfg: SchemaConfig) -> Self {
        Self { cfg }
    }
}

impl Probe for SchemaProbe {
    fn id(&self) -> &'static str {
        "schema_presence"
    }

    fn name(&self) -> &'static str {
        "Schema presence"
    }

    fn evaluate(&self, env: &Env) -> Result<Finding> {
        let rows = match env.query.execute(&self.cfg.list_tables_query, &[]) {
            Ok(rows) => rows,
            Err(e) => return Ok(Finding::critical(format!("cannot list tables: {}", e))),
        };

        let observed: BTreeSet<&str> = rows
            .iter()
            .filter_map(|r| r.first())
            .filter_map(|v| v.as_str())
            .collect();

        let missing: Vec<&str> = self
            .cfg
            .required_tables
            .iter()
            .map(String::as_str)
            .filter(|t| !observed.contains(t))
            .collect();

        Ok(if missing.is_empty() {
            Finding::good(format!(
                "all {} required tables present",
                self.cfg.required_tables.len()
            ))
        } else {
            Finding::critical(format!(
                "{} of {} required tables missing: {}",
                missing.len(),
                self.cfg.required_tables.len(),
                missing.join(", ")
            ))
        })
    }
}
