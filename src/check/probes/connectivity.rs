//! 数据库往返延迟

use crate::check::probes::Probe;
use crate::check::result::Finding;
use crate::config::ConnectivityConfig;
use crate::sys::Env;
use crate::utils::Result;

pub struct ConnectivityProbe {
    cfg: ConnectivityConfig,
}

impl ConnectivityProbe {
    pub fn new(cfg: ConnectivityConfig) -> Self {
        Self { cfg }
    }
}

impl Probe for ConnectivityProbe {
    fn id(&self) -> &'static str {
        "connectivity"
    }

    fn name(&self) -> &'static str {
        "Database connectivity"
    }

    fn evaluate(&self, env: &Env) -> Result<Finding> {
        let elapsed_ms = match env.query.round_trip(&self.cfg.query) {
            Ok(d) => d.as_millis() as u64,
            Err(e) => return Ok(Finding::critical(format!("database unreachable: {}", e))),
        };

        let msg = format!("round-trip query took {}ms", elapsed_ms);
        Ok(if elapsed_ms < self.cfg.good_below_ms {
            Finding::good(msg)
        } else if elapsed_ms < self.cfg.warning_below_ms {
            Finding::warning(format!("{} (slow)", msg))
        } else {
            Finding::critical(format!("{} (too slow)", msg))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::probes::fixtures::query_env;
    use crate::check::result::Severity;
    use crate::sys::Value;
    use crate::testing::FakeQuery;
    use std::time::Duration;

    fn run_with_latency(ms: u64) -> Finding {
        let query = FakeQuery::new()
            .with_scalar("SELECT 1", Value::Integer(1))
            .with_latency(Duration::from_millis(ms));
        ConnectivityProbe::new(ConnectivityConfig::default())
            .evaluate(&query_env(query))
            .unwrap()
    }

    #[test]
    fn fast_round_trip_is_good() {
        let f = run_with_latency(12);
        assert_eq!(f.severity, Severity::Good);
        assert!(f.message.contains("12ms"));
    }

    #[test]
    fn latency_boundaries() {
        assert_eq!(run_with_latency(99).severity, Severity::Good);
        assert_eq!(run_with_latency(100).severity, Severity::Warning);
        assert_eq!(run_with_latency(499).severity, Severity::Warning);
        assert_eq!(run_with_latency(500).severity, Severity::Critical);
    }

    #[test]
    fn unreachable_database_is_critical_not_an_error() {
        let f = ConnectivityProbe::new(ConnectivityConfig::default())
            .evaluate(&query_env(FakeQuery::unreachable()))
            .unwrap();
        assert_eq!(f.severity, Severity::Critical);
        assert!(f.message.contains("unreachable"));
    }
}
