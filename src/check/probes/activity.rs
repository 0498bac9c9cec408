//! 近 N 天活跃的非特权用户占比

use chrono::Duration;

use crate::check::probes::Probe;
use crate::check::result::Finding;
use crate::config::ActivityConfig;
use crate::sys::{Env, Value};
use crate::utils::{HealthError, Result};

pub struct ActivityProbe {
    cfg: ActivityConfig,
}

impl ActivityProbe {
    pub fn new(cfg: ActivityConfig) -> Self {
        Self { cfg }
    }

    fn count(&self, env: &Env, statement: &str, params: &[Value]) -> Result<std::result::Result<i64, String>> {
        match env.query.scalar(statement, params) {
            Ok(v) => v
                .as_i64()
                .map(Ok)
                .ok_or_else(|| HealthError::Parse(format!("non-numeric user count: {:?}", v))),
            Err(e) => Ok(Err(e.to_string())),
        }
    }
}

impl Probe for ActivityProbe {
    fn id(&self) -> &'static str {
        "activity_level"
    }

    fn name(&self) -> &'static str {
        "User activity"
    }

    fn evaluate(&self, env: &Env) -> Result<Finding> {
        let total = match self.count(env, &self.cfg.total_users_query, &[])? {
            Ok(n) => n,
            Err(e) => return Ok(Finding::critical(format!("cannot count users: {}", e))),
        };
        if total <= 0 {
            return Ok(Finding::warning("no non-privileged users registered"));
        }

        let cutoff = env.clock.now() - Duration::days(self.cfg.window_days);
        let params = [Value::Text(cutoff.to_rfc3339())];
        let active = match self.count(env, &self.cfg.active_users_query, &params)? {
            Ok(n) => n,
            Err(e) => return Ok(Finding::critical(format!("cannot count active users: {}", e))),
        };

        let pct = active as f64 * 100.0 / total as f64;
        let msg = format!(
            "{} of {} users active in the last {} days ({:.1}%)",
            active, total, self.cfg.window_days, pct
        );
        Ok(if pct > self.cfg.good_above_percent {
            Finding::good(msg)
        } else if pct > self.cfg.warning_above_percent {
            Finding::warning(msg)
        } else {
            Finding::critical(msg)
        })
    }
}
