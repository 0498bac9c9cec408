//! 配置：TOML 文件 + 默认值
//! 所有阈值都是可调的运维策略，缺省值对应常见部署。

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::check::probes::runtime::parse_version;
use crate::utils::{parse_size_to_bytes, HealthError, Result};

/// activity.window_days 上限（约一百年）
const MAX_WINDOW_DAYS: i64 = 36_500;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub rollup: RollupConfig,
    pub database: DatabaseConfig,
    pub connectivity: ConnectivityConfig,
    pub schema: SchemaConfig,
    pub integrity: IntegrityConfig,
    pub disk: DiskConfig,
    pub runtime: RuntimeConfig,
    pub permissions: PermissionsConfig,
    pub memory: MemoryConfig,
    pub backup: BackupConfig,
    pub activity: ActivityConfig,
    pub error_log: ErrorLogConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Execution {
    #[default]
    Sequential,
    Parallel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub execution: Execution,
    /// 单个探针的时间预算；未设置时不限时
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RollupConfig {
    /// 警告数量超过该值时整体为 WARNING
    pub max_warnings: usize,
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self { max_warnings: 2 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/app.db"),
            busy_timeout_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    pub query: String,
    pub good_below_ms: u64,
    pub warning_below_ms: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            query: "SELECT 1".to_string(),
            good_below_ms: 100,
            warning_below_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub list_tables_query: String,
    pub required_tables: Vec<String>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            list_tables_query: "SELECT name FROM sqlite_master WHERE type = 'table'".to_string(),
            required_tables: default_tables(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
    pub tables: Vec<String>,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self { tables: default_tables() }
    }
}

fn default_tables() -> Vec<String> {
    ["users", "settings"].iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskConfig {
    pub path: PathBuf,
    pub warning_at_percent: f64,
    pub critical_at_percent: f64,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/"),
            warning_at_percent: 80.0,
            critical_at_percent: 90.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub min_kernel: String,
    pub required_modules: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            min_kernel: "4.5".to_string(),
            required_modules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsConfig {
    pub directories: Vec<PathBuf>,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            directories: ["data/uploads", "data/backups", "data/logs", "data/cache"]
                .iter()
                .map(PathBuf::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub limit: String,
    pub warning_at_percent: f64,
    pub critical_at_percent: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            limit: "128M".to_string(),
            warning_at_percent: 50.0,
            critical_at_percent: 80.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub directory: PathBuf,
    pub pattern: String,
    pub fresh_days: f64,
    pub stale_days: f64,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data/backups"),
            pattern: "backup_*.sql".to_string(),
            fresh_days: 1.0,
            stale_days: 7.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    pub total_users_query: String,
    /// `?1` 绑定为窗口起点（RFC 3339）
    pub active_users_query: String,
    pub window_days: i64,
    pub good_above_percent: f64,
    pub warning_above_percent: f64,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            total_users_query: "SELECT COUNT(*) FROM users WHERE role != 'admin'".to_string(),
            active_users_query:
                "SELECT COUNT(*) FROM users WHERE role != 'admin' AND last_login >= ?1".to_string(),
            window_days: 7,
            good_above_percent: 30.0,
            warning_above_percent: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorLogConfig {
    pub path: PathBuf,
    pub tail_lines: usize,
    pub markers: Vec<String>,
    /// 错误行数少于该值为 WARNING，否则 CRITICAL
    pub critical_at: usize,
}

impl Default for ErrorLogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/logs/error.log"),
            tail_lines: 100,
            markers: vec!["ERROR".to_string(), "CRITICAL".to_string()],
            critical_at: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityRule {
    pub key: String,
    pub expected: bool,
    pub description: String,
}

impl SecurityRule {
    fn new(key: &str, expected: bool, description: &str) -> Self {
        Self {
            key: key.to_string(),
            expected,
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub settings_file: PathBuf,
    pub rules: Vec<SecurityRule>,
    pub web_root: PathBuf,
    pub sensitive_files: Vec<String>,
    /// 违规数不超过该值为 WARNING，超过为 CRITICAL
    pub warning_max: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            settings_file: PathBuf::from("config/app.ini"),
            rules: vec![
                SecurityRule::new("display_errors", false, "debug error display enabled"),
                SecurityRule::new("session.cookie_httponly", true, "session cookies not HTTP-only"),
                SecurityRule::new("session.use_strict_mode", true, "session strict mode off"),
            ],
            web_root: PathBuf::from("public"),
            sensitive_files: [".env", ".git/config", "config.bak", "phpinfo.php", "backup.sql"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            warning_max: 2,
        }
    }
}

// ── 加载与校验 ──────────────────────────────────────────────────────────────

impl Config {
    /// 无路径时使用全部默认值
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)?;
                Self::from_toml(&content)?
            }
            None => Config::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Config> {
        toml::from_str(content).map_err(|e| HealthError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| HealthError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let c = &self.connectivity;
        ensure(
            c.good_below_ms <= c.warning_below_ms,
            "connectivity.good_below_ms must not exceed warning_below_ms",
        )?;
        ensure(
            self.disk.warning_at_percent <= self.disk.critical_at_percent,
            "disk.warning_at_percent must not exceed critical_at_percent",
        )?;
        ensure(
            self.memory.warning_at_percent <= self.memory.critical_at_percent,
            "memory.warning_at_percent must not exceed critical_at_percent",
        )?;
        match parse_size_to_bytes(&self.memory.limit) {
            Some(n) if n > 0 => {}
            _ => {
                return Err(HealthError::Config(format!(
                    "memory.limit is not a positive size: {:?}",
                    self.memory.limit
                )))
            }
        }
        ensure(
            self.backup.fresh_days <= self.backup.stale_days,
            "backup.fresh_days must not exceed stale_days",
        )?;
        ensure(
            self.activity.warning_above_percent <= self.activity.good_above_percent,
            "activity.warning_above_percent must not exceed good_above_percent",
        )?;
        ensure(
            self.activity.window_days > 0 && self.activity.window_days <= MAX_WINDOW_DAYS,
            "activity.window_days must be between 1 and 36500",
        )?;
        if parse_version(&self.runtime.min_kernel).is_none() {
            return Err(HealthError::Config(format!(
                "runtime.min_kernel is not a version: {:?}",
                self.runtime.min_kernel
            )));
        }
        glob::Pattern::new(&self.backup.pattern).map_err(|e| {
            HealthError::Config(format!("backup.pattern {:?}: {}", self.backup.pattern, e))
        })?;
        ensure(self.error_log.tail_lines > 0, "error_log.tail_lines must be positive")?;
        ensure(self.engine.probe_timeout_ms != Some(0), "engine.probe_timeout_ms must be positive")?;
        Ok(())
    }
}

fn ensure(cond: bool, msg: &str) -> Result<()> {
    if cond {
        Ok(())
    } else {
        Err(HealthError::Config(msg.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg.rollup.max_warnings, 2);
        assert_eq!(cfg.disk.warning_at_percent, 80.0);
        assert_eq!(cfg.engine.execution, Execution::Sequential);
        cfg.validate().unwrap();
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = Config::from_toml(
            r#"
            [engine]
            execution = "parallel"
            probe_timeout_ms = 250

            [disk]
            path = "/srv"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.engine.execution, Execution::Parallel);
        assert_eq!(cfg.engine.probe_timeout_ms, Some(250));
        assert_eq!(cfg.disk.path, PathBuf::from("/srv"));
        assert_eq!(cfg.disk.critical_at_percent, 90.0);
    }

    #[test]
    fn default_config_survives_toml_round_trip() {
        let text = Config::default().to_toml().unwrap();
        let back = Config::from_toml(&text).unwrap();
        assert_eq!(back.security.rules.len(), 3);
        assert_eq!(back.memory.limit, "128M");
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let mut cfg = Config::default();
        cfg.disk.warning_at_percent = 95.0;
        assert!(matches!(cfg.validate(), Err(HealthError::Config(_))));
    }

    #[test]
    fn rejects_bad_memory_limit() {
        let mut cfg = Config::default();
        cfg.memory.limit = "plenty".to_string();
        assert!(cfg.validate().is_err());
        cfg.memory.limit = "0".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_unparseable_kernel_version() {
        let mut cfg = Config::default();
        cfg.runtime.min_kernel = "latest".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, HealthError::Config(ref m) if m.contains("min_kernel")));
    }

    #[test]
    fn rejects_malformed_backup_pattern() {
        let mut cfg = Config::default();
        cfg.backup.pattern = "backup_[*.sql".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, HealthError::Config(ref m) if m.contains("backup.pattern")));
    }

    #[test]
    fn bounds_activity_window() {
        let mut cfg = Config::default();
        cfg.activity.window_days = 36_500;
        cfg.validate().unwrap();
        cfg.activity.window_days = i64::MAX;
        assert!(matches!(cfg.validate(), Err(HealthError::Config(_))));
        cfg.activity.window_days = 0;
        assert!(cfg.validate().is_err());
    }
}
