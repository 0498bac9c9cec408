//! 宿主机概况（INFO，仅描述，不参与判定）
//! 来源：/proc/sys/kernel/*, /proc/uptime

use std::path::Path;

use crate::check::probes::Probe;
use crate::check::result::Finding;
use crate::sys::{Env, FileSystem};
use crate::utils::Result;

pub struct SystemInfoProbe;

fn read_trimmed(fs: &dyn FileSystem, path: &str) -> String {
    fs.read_to_string(Path::new(path))
        .map(|s| s.trim().to_string())
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn uptime_seconds(fs: &dyn FileSystem) -> Option<u64> {
    fs.read_to_string(Path::new("/proc/uptime"))
        .ok()
        .and_then(|s| s.split_whitespace().next().map(|v| v.to_string()))
        .and_then(|v| v.parse::<f64>().ok())
        .map(|v| v as u64)
}

fn format_uptime(seconds: u64) -> String {
    let d = seconds / 86400;
    let h = (seconds % 86400) / 3600;
    let m = (seconds % 3600) / 60;
    if d > 0 {
        format!("{}d {}h {}m", d, h, m)
    } else if h > 0 {
        format!("{}h {}m", h, m)
    } else {
        format!("{}m", m)
    }
}

impl Probe for SystemInfoProbe {
    fn id(&self) -> &'static str {
        "system_info"
    }

    fn name(&self) -> &'static str {
        "System information"
    }

    fn evaluate(&self, env: &Env) -> Result<Finding> {
        let fs = env.fs.as_ref();
        let hostname = read_trimmed(fs, "/proc/sys/kernel/hostname");
        let kernel = read_trimmed(fs, "/proc/sys/kernel/osrelease");
        let uptime = uptime_seconds(fs)
            .map(format_uptime)
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Finding::info(format!(
            "host {} kernel {} arch {} uptime {} pid {}",
            hostname,
            kernel,
            std::env::consts::ARCH,
            uptime,
            nix::unistd::getpid()
        )))
    }
}
