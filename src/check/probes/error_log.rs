//! 日志尾部的错误行数

use crate::check::probes::Probe;
use crate::check::result::Finding;
use crate::config::ErrorLogConfig;
use crate::sys::Env;
use crate::utils::Result;

pub struct ErrorLogProbe {
    cfg: ErrorLogConfig,
}

impl ErrorLogProbe {
    pub fn new(cfg: ErrorLogConfig) -> Self {
        Self { cfg }
    }

    fn count_errors(&self, tail: &[String]) -> usize {
        tail.iter()
            .filter(|l| self.cfg.markers.iter().any(|m| l.contains(m.as_str())))
            .count()
    }
}

impl Probe for ErrorLogProbe {
    fn id(&self) -> &'static str {
        "error_log_volume"
    }

    fn name(&self) -> &'static str {
        "Error log volume"
    }

    fn evaluate(&self, env: &Env) -> Result<Finding> {
        let path = &self.cfg.path;
        if !env.fs.exists(path) {
            return Ok(Finding::good(format!("no log file at {}", path.display())));
        }
        let tail = match env.fs.read_tail(path, self.cfg.tail_lines) {
            Ok(t) => t,
            Err(e) => return Ok(Finding::warning(format!("cannot read {}: {}", path.display(), e))),
        };

        let errors = self.count_errors(&tail);
        let msg = format!(
            "{} error lines in the last {} lines of {}",
            errors,
            self.cfg.tail_lines,
            path.display()
        );
        Ok(if errors == 0 {
            Finding::good(msg)
        } else if errors < self.cfg.critical_at {
            Finding::warning(msg)
        } else {
            Finding::critical(msg)
        })
    }
}
