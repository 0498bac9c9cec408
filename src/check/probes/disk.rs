//! 磁盘空间占用

use crate::check::probes::Probe;
use crate::check::result::Finding;
use crate::config::DiskConfig;
use crate::sys::Env;
use crate::utils::{fmt_bytes, Result};

pub struct DiskProbe {
    cfg: DiskConfig,
}

impl DiskProbe {
    pub fn new(cfg: DiskConfig) -> Self {
        Self { cfg }
    }
}

impl Probe for DiskProbe {
    fn id(&self) -> &'static str {
        "disk_space"
    }

    fn name(&self) -> &'static str {
        "Disk space"
    }

    fn evaluate(&self, env: &Env) -> Result<Finding> {
        let path = self.cfg.path.display();
        let space = match env.fs.space(&self.cfg.path) {
            Ok(s) => s,
            Err(e) => return Ok(Finding::critical(format!("cannot stat {}: {}", path, e))),
        };
        if space.total_bytes == 0 {
            return Ok(Finding::critical(format!("{} reports zero capacity", path)));
        }

        let used = space.used_percent();
        let msg = format!(
            "{:.1}% used at {} ({} free of {})",
            used,
            path,
            fmt_bytes(space.available_bytes),
            fmt_bytes(space.total_bytes)
        );
        Ok(if used < self.cfg.warning_at_percent {
            Finding::good(msg)
        } else if used < self.cfg.critical_at_percent {
            Finding::warning(msg)
        } else {
            Finding::critical(msg)
        })
    }
}
