//! 探针：每个探针检查系统的一个侧面，产出一个 Finding
//!
//! 预期中的异常状态（表缺失、磁盘将满、备份过期……）本身就是诊断结论，
//! 以 WARNING / CRITICAL 返回；只有真正意外的情况才返回 `Err`，
//! 由聚合器转换为 CRITICAL 结果。

pub mod activity;
pub mod backup;
pub mod connectivity;
pub mod disk;
pub mod error_log;
pub mod integrity;
pub mod memory;
pub mod permissions;
pub mod runtime;
pub mod schema;
pub mod security;
pub mod system_info;

use std::sync::Arc;

use crate::check::result::Finding;
use crate::config::Config;
use crate::sys::Env;
use crate::utils::Result;

pub trait Probe: Send + Sync {
    /// 稳定的机器可读标识
    fn id(&self) -> &'static str;

    /// 人类可读名称
    fn name(&self) -> &'static str;

    fn evaluate(&self, env: &Env) -> Result<Finding>;
}

/// 按固定顺序构造全部探针
pub fn registry(config: &Config) -> Vec<Arc<dyn Probe>> {
    vec![
        Arc::new(connectivity::ConnectivityProbe::new(config.connectivity.clone())),
        Arc::new(schema::SchemaProbe::new(config.schema.clone())),
        Arc::new(integrity::IntegrityProbe::new(config.integrity.clone())),
        Arc::new(disk::DiskProbe::new(config.disk.clone())),
        Arc::new(runtime::RuntimeProbe::new(config.runtime.clone())),
        Arc::new(permissions::PermissionsProbe::new(config.permissions.clone())),
        Arc::new(memory::MemoryProbe::new(config.memory.clone())),
        Arc::new(backup::BackupProbe::new(config.backup.clone())),
        Arc::new(activity::ActivityProbe::new(config.activity.clone())),
        Arc::new(error_log::ErrorLogProbe::new(config.error_log.clone())),
        Arc::new(security::SecurityProbe::new(config.security.clone())),
        Arc::new(system_info::SystemInfoProbe),
    ]
}

/// 探针单元测试共用的协作者构造
#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Arc;

    use crate::sys::{Clock, Env, FileSystem, LocalFs, QueryExecutor};
    use crate::testing::{FakeQuery, FixedClock, MemFs};

    pub fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    pub fn env_with(query: FakeQuery, fs: MemFs, clock: FixedClock) -> Env {
        let query: Arc<dyn QueryExecutor> = Arc::new(query);
        let fs: Arc<dyn FileSystem> = Arc::new(fs);
        let clock: Arc<dyn Clock> = Arc::new(clock);
        Env::new(query, fs, clock)
    }

    pub fn query_env(query: FakeQuery) -> Env {
        env_with(query, MemFs::new(), FixedClock::at(t0()))
    }

    pub fn fs_env(fs: MemFs) -> Env {
        env_with(FakeQuery::new(), fs, FixedClock::at(t0()))
    }

    /// 真实磁盘，配合 tempfile 使用
    pub fn local_env() -> Env {
        let query: Arc<dyn QueryExecutor> = Arc::new(FakeQuery::new());
        let fs: Arc<dyn FileSystem> = Arc::new(LocalFs);
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::at(t0()));
        Env::new(query, fs, clock)
    }
}
