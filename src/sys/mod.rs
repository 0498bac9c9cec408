//! 外部协作者：数据库查询、文件系统、时钟
//!
//! 探针只通过这里的 trait 读取系统状态，生产实现与测试替身可互换。

pub mod clock;
pub mod fs;
pub mod query;

use std::sync::Arc;

pub use clock::{Clock, SystemClock};
pub use fs::{DiskSpace, FileSystem, LocalFs};
pub use query::{QueryExecutor, Row, SqliteExecutor, Value};

/// 注入给每个探针的协作者集合。克隆只复制 `Arc`。
#[derive(Clone)]
pub struct Env {
    pub query: Arc<dyn QueryExecutor>,
    pub fs: Arc<dyn FileSystem>,
    pub clock: Arc<dyn Clock>,
}

impl Env {
    pub fn new(
        query: Arc<dyn QueryExecutor>,
        fs: Arc<dyn FileSystem>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { query, fs, clock }
    }
}
