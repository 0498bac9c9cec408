//! 最近一次备份的年龄

use crate::check::probes::Probe;
use crate::check::result::Finding;
use crate::config::BackupConfig;
use crate::sys::Env;
use crate::utils::Result;

pub struct BackupProbe {
    cfg: BackupConfig,
}

impl BackupProbe {
    pub fn new(cfg: BackupConfig) -> Self {
        Self { cfg }
    }
}

impl Probe for BackupProbe {
    fn id(&self) -> &'static str {
        "backup_freshness"
    }

    fn name(&self) -> &'static str {
        "Backup freshness"
    }

    fn evaluate(&self, env: &Env) -> Result<Finding> {
        let dir = &self.cfg.directory;
        let none_found = || {
            Finding::warning(format!(
                "no backups matching {} in {}",
                self.cfg.pattern,
                dir.display()
            ))
        };

        if !env.fs.is_dir(dir) {
            return Ok(none_found());
        }

        // 读不到 mtime 的文件跳过，不影响其他备份
        let newest = env
            .fs
            .glob(dir, &self.cfg.pattern)?
            .into_iter()
            .filter_map(|p| env.fs.modified(&p).ok().map(|m| (m, p)))
            .max_by_key(|(m, _)| *m);

        let (mtime, path) = match newest {
            Some(n) => n,
            None => return Ok(none_found()),
        };

        let age_secs = (env.clock.now() - mtime).num_seconds().max(0);
        let age_days = age_secs as f64 / 86_400.0;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let msg = format!("latest backup {} is {:.1} days old", name, age_days);

        Ok(if age_days <= self.cfg.fresh_days {
            Finding::good(msg)
        } else if age_days <= self.cfg.stale_days {
            Finding::warning(msg)
        } else {
            Finding::critical(msg)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::probes::fixtures::{fs_env, t0};
    use crate::check::result::Severity;
    use crate::testing::MemFs;
    use chrono::Duration;

    const DIR: &str = "data/backups";

    fn backup_aged(age: Duration) -> Finding {
        let fs = MemFs::new()
            .with_file(format!("{}/backup_old.sql", DIR), "", t0() - Duration::days(30))
            .with_file(format!("{}/backup_new.sql", DIR), "", t0() - age)
            .with_file(format!("{}/notes.txt", DIR), "", t0());
        BackupProbe::new(BackupConfig::default()).evaluate(&fs_env(fs)).unwrap()
    }

    #[test]
    fn picks_newest_matching_file() {
        let f = backup_aged(Duration::hours(6));
        assert_eq!(f.severity, Severity::Good);
        assert_eq!(f.message, "latest backup backup_new.sql is 0.2 days old");
    }

    #[test]
    fn age_boundaries_are_inclusive() {
        assert_eq!(backup_aged(Duration::days(1)).severity, Severity::Good);
        assert_eq!(backup_aged(Duration::days(1) + Duration::seconds(1)).severity, Severity::Warning);
        assert_eq!(backup_aged(Duration::days(7)).severity, Severity::Warning);
        assert_eq!(backup_aged(Duration::days(8)).severity, Severity::Critical);
    }

    #[test]
    fn missing_directory_is_warning() {
        let f = BackupProbe::new(BackupConfig::default()).evaluate(&fs_env(MemFs::new())).unwrap();
        assert_eq!(f.severity, Severity::Warning);
        assert!(f.message.starts_with("no backups"));
    }

    #[test]
    fn no_matching_files_is_warning() {
        let fs = MemFs::new().with_file(format!("{}/dump.tar", DIR), "", t0());
        let f = BackupProbe::new(BackupConfig::default()).evaluate(&fs_env(fs)).unwrap();
        assert_eq!(f.severity, Severity::Warning);
    }
}
