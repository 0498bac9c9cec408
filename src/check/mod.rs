pub mod aggregator;
pub mod output;
pub mod probes;
pub mod report;
pub mod result;

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::sys::{Env, LocalFs, SqliteExecutor, SystemClock};
use aggregator::{Aggregator, RunOptions};
use report::{HealthReport, RollupPolicy};

/// 生产环境的协作者：SQLite + 本地文件系统 + 系统时钟
pub fn production_env(config: &Config) -> Env {
    let query = SqliteExecutor::new(
        &config.database.path,
        Duration::from_millis(config.database.busy_timeout_ms),
    );
    Env::new(Arc::new(query), Arc::new(LocalFs), Arc::new(SystemClock))
}

pub fn build_aggregator(config: &Config, env: Env) -> Aggregator {
    let options = RunOptions {
        execution: config.engine.execution,
        probe_timeout: config.engine.probe_timeout_ms.map(Duration::from_millis),
        rollup: RollupPolicy { max_warnings: config.rollup.max_warnings },
    };
    Aggregator::new(probes::registry(config), env, options)
}

pub fn run_check(config: &Config) -> HealthReport {
    tracing::debug!(database = %config.database.path.display(), "starting health run");
    build_aggregator(config, production_env(config)).run_all()
}
