//! 本进程常驻内存相对配置上限
//! 来源：/proc/self/status 的 VmRSS

use std::path::Path;

use crate::check::probes::Probe;
use crate::check::result::Finding;
use crate::config::MemoryConfig;
use crate::sys::Env;
use crate::utils::{fmt_bytes, parse_size_to_bytes, HealthError, Result};

const STATUS: &str = "/proc/self/status";

pub struct MemoryProbe {
    cfg: MemoryConfig,
}

impl MemoryProbe {
    pub fn new(cfg: MemoryConfig) -> Self {
        Self { cfg }
    }
}

/// "VmRSS:     10240 kB" → bytes
fn parse_vm_rss(status: &str) -> Option<u64> {
    status
        .lines()
        .find(|l| l.starts_with("VmRSS:"))
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|v| v.parse::<u64>().ok())
        .map(|kb| kb * 1024)
}

impl Probe for MemoryProbe {
    fn id(&self) -> &'static str {
        "memory_usage"
    }

    fn name(&self) -> &'static str {
        "Memory usage"
    }

    fn evaluate(&self, env: &Env) -> Result<Finding> {
        let limit = parse_size_to_bytes(&self.cfg.limit)
            .filter(|n| *n > 0)
            .ok_or_else(|| HealthError::Config(format!("memory.limit invalid: {:?}", self.cfg.limit)))?;

        let status = match env.fs.read_to_string(Path::new(STATUS)) {
            Ok(s) => s,
            Err(e) => return Ok(Finding::critical(format!("cannot read process status: {}", e))),
        };
        let rss = parse_vm_rss(&status)
            .ok_or_else(|| HealthError::Parse("VmRSS missing from process status".to_string()))?;

        let pct = rss as f64 * 100.0 / limit as f64;
        let msg = format!(
            "{} resident of {} limit ({:.1}%)",
            fmt_bytes(rss),
            fmt_bytes(limit),
            pct
        );
        Ok(if pct < self.cfg.warning_at_percent {
            Finding::good(msg)
        } else if pct < self.cfg.critical_at_percent {
            Finding::warning(msg)
        } else {
            Finding::critical(msg)
        })
    }
}
