//! 内核版本与内核模块
//! 来源：/proc/sys/kernel/osrelease, /sys/module/<name>

use std::path::{Path, PathBuf};

use crate::check::probes::Probe;
use crate::check::result::Finding;
use crate::config::RuntimeConfig;
use crate::sys::Env;
use crate::utils::{HealthError, Result};

const OSRELEASE: &str = "/proc/sys/kernel/osrelease";
const MODULE_DIR: &str = "/sys/module";

pub struct RuntimeProbe {
    cfg: RuntimeConfig,
}

impl RuntimeProbe {
    pub fn new(cfg: RuntimeConfig) -> Self {
        Self { cfg }
    }
}

/// "6.8.0-45-generic" → [6, 8, 0]；不足三段补零
pub fn parse_version(s: &str) -> Option<[u32; 3]> {
    let mut out = [0u32; 3];
    let mut parsed = 0;
    for (slot, part) in out.iter_mut().zip(s.trim().split('.')) {
        let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            break;
        }
        *slot = digits.parse().ok()?;
        parsed += 1;
        if digits.len() != part.len() {
            break;
        }
    }
    if parsed == 0 { None } else { Some(out) }
}

impl Probe for RuntimeProbe {
    fn id(&self) -> &'static str {
        "runtime_config"
    }

    fn name(&self) -> &'static str {
        "Runtime configuration"
    }

    fn evaluate(&self, env: &Env) -> Result<Finding> {
        let minimum = parse_version(&self.cfg.min_kernel).ok_or_else(|| {
            HealthError::Config(format!("runtime.min_kernel is not a version: {:?}", self.cfg.min_kernel))
        })?;

        let release = match env.fs.read_to_string(Path::new(OSRELEASE)) {
            Ok(s) => s.trim().to_string(),
            Err(e) => return Ok(Finding::critical(format!("cannot read kernel release: {}", e))),
        };
        let current = match parse_version(&release) {
            Some(v) => v,
            None => return Ok(Finding::critical(format!("unrecognised kernel release {:?}", release))),
        };

        if current < minimum {
            return Ok(Finding::critical(format!(
                "kernel {} is older than required {}",
                release, self.cfg.min_kernel
            )));
        }

        let missing: Vec<&str> = self
            .cfg
            .required_modules
            .iter()
            .map(String::as_str)
            .filter(|m| !env.fs.exists(&PathBuf::from(MODULE_DIR).join(m)))
            .collect();

        Ok(if missing.is_empty() {
            Finding::good(format!(
                "kernel {} (>= {}), {} required modules loaded",
                release,
                self.cfg.min_kernel,
                self.cfg.required_modules.len()
            ))
        } else {
            Finding::warning(format!(
                "kernel {} ok, missing modules: {}",
                release,
                missing.join(", ")
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::probes::fixtures::{fs_env, t0};
    use crate::check::result::Severity;
    use crate::testing::MemFs;

    fn cfg(min: &str, modules: &[&str]) -> RuntimeConfig {
        RuntimeConfig {
            min_kernel: min.to_string(),
            required_modules: modules.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn parses_kernel_releases() {
        assert_eq!(parse_version("6.18.44-fc-v130"), Some([6, 18, 44]));
        assert_eq!(parse_version("5.15.0-91-generic\n"), Some([5, 15, 0]));
        assert_eq!(parse_version("4.5"), Some([4, 5, 0]));
        assert_eq!(parse_version("6.1rc2"), Some([6, 1, 0]));
        assert_eq!(parse_version("linux"), None);
    }

    #[test]
    fn new_kernel_with_modules_is_good() {
        let fs = MemFs::new()
            .with_file(OSRELEASE, "6.8.0-45-generic\n", t0())
            .with_dir("/sys/module/overlay");
        let f = RuntimeProbe::new(cfg("5.4", &["overlay"])).evaluate(&fs_env(fs)).unwrap();
        assert_eq!(f.severity, Severity::Good);
        assert!(f.message.contains("6.8.0-45-generic"));
    }

    #[test]
    fn missing_module_is_warning() {
        let fs = MemFs::new().with_file(OSRELEASE, "6.8.0", t0());
        let f = RuntimeProbe::new(cfg("5.4", &["overlay", "br_netfilter"])).evaluate(&fs_env(fs)).unwrap();
        assert_eq!(f.severity, Severity::Warning);
        assert!(f.message.contains("overlay, br_netfilter"));
    }

    #[test]
    fn old_kernel_is_critical_even_with_missing_modules() {
        let fs = MemFs::new().with_file(OSRELEASE, "4.4.0", t0());
        let f = RuntimeProbe::new(cfg("4.5", &["overlay"])).evaluate(&fs_env(fs)).unwrap();
        assert_eq!(f.severity, Severity::Critical);
    }

    #[test]
    fn bad_minimum_is_a_fault() {
        let fs = MemFs::new().with_file(OSRELEASE, "6.8.0", t0());
        assert!(RuntimeProbe::new(cfg("latest", &[])).evaluate(&fs_env(fs)).is_err());
    }
}
