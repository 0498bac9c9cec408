//! 目录存在且可写；缺失时创建
//! 唯一会修改外部状态的探针，重复执行结果不变

use crate::check::probes::Probe;
use crate::check::result::Finding;
use crate::config::PermissionsConfig;
use crate::sys::Env;
use crate::utils::Result;

pub struct PermissionsProbe {
    cfg: PermissionsConfig,
}

impl PermissionsProbe {
    pub fn new(cfg: PermissionsConfig) -> Self {
        Self { cfg }
    }
}

impl Probe for PermissionsProbe {
    fn id(&self) -> &'static str {
        "fs_permissions"
    }

    fn name(&self) -> &'static str {
        "Filesystem permissions"
    }

    fn evaluate(&self, env: &Env) -> Result<Finding> {
        let mut problems = Vec::new();

        for dir in &self.cfg.directories {
            if !env.fs.exists(dir) {
                if let Err(e) = env.fs.create_dir_all(dir) {
                    problems.push(format!("{} (cannot create: {})", dir.display(), e));
                    continue;
                }
                tracing::info!(dir = %dir.display(), "created missing directory");
            }
            if !env.fs.is_dir(dir) {
                problems.push(format!("{} (not a directory)", dir.display()));
            } else if !env.fs.is_writable(dir) {
                problems.push(format!("{} (not writable)", dir.display()));
            }
        }

        let total = self.cfg.directories.len();
        Ok(if problems.is_empty() {
            Finding::good(format!("{} of {} directories writable", total, total))
        } else {
            Finding::critical(format!(
                "{} of {} directories unusable: {}",
                problems.len(),
                total,
                problems.join("; ")
            ))
        })
    }
}
