//! 协作者 trait 的内存替身（仅测试使用）
//!
//! 不接触真实数据库、磁盘或系统时钟。

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crate::sys::fs::last_lines;
use crate::sys::{Clock, DiskSpace, FileSystem, QueryExecutor, Row, Value};
use crate::utils::{HealthError, Result};

// ── FakeQuery ───────────────────────────────────────────────────────────────

/// 按语句原文返回预置结果；未预置的语句报查询错误（相当于表不存在）
#[derive(Debug, Default)]
pub struct FakeQuery {
    responses: Mutex<HashMap<String, std::result::Result<Vec<Row>, String>>>,
    unreachable: bool,
    latency: Option<Duration>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl FakeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// 所有语句都失败，如同数据库无法打开
    pub fn unreachable() -> Self {
        Self { unreachable: true, ..Self::default() }
    }

    pub fn with_rows(self, statement: &str, rows: Vec<Row>) -> Self {
        self.lock_responses().insert(statement.to_string(), Ok(rows));
        self
    }

    pub fn with_scalar(self, statement: &str, value: Value) -> Self {
        self.with_rows(statement, vec![vec![value]])
    }

    pub fn with_error(self, statement: &str, message: &str) -> Self {
        self.lock_responses()
            .insert(statement.to_string(), Err(message.to_string()));
        self
    }

    /// `round_trip` 报告的固定耗时
    pub fn with_latency(self, latency: Duration) -> Self {
        Self { latency: Some(latency), ..self }
    }

    /// 按调用顺序记录的语句与参数
    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    fn lock_responses(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<String, std::result::Result<Vec<Row>, String>>> {
        self.responses.lock().unwrap()
    }
}

impl QueryExecutor for FakeQuery {
    fn execute(&self, statement: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.calls
            .lock()
            .unwrap()
            .push((statement.to_string(), params.to_vec()));
        if self.unreachable {
            return Err(HealthError::Query("unable to open database file".to_string()));
        }
        match self.lock_responses().get(statement) {
            Some(Ok(rows)) => Ok(rows.clone()),
            Some(Err(msg)) => Err(HealthError::Query(msg.clone())),
            None => Err(HealthError::Query(format!("no such statement: {}", statement))),
        }
    }

    fn round_trip(&self, statement: &str) -> Result<Duration> {
        self.execute(statement, &[])?;
        Ok(self.latency.unwrap_or_default())
    }
}

// ── MemFs ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct MemFsState {
    files: BTreeMap<PathBuf, (String, DateTime<Utc>)>,
    dirs: BTreeSet<PathBuf>,
    read_only: BTreeSet<PathBuf>,
    deny_create: BTreeSet<PathBuf>,
    spaces: BTreeMap<PathBuf, DiskSpace>,
    created: Vec<PathBuf>,
}

/// 内存文件系统；目录默认可写，除非标记为只读
#[derive(Debug, Default)]
pub struct MemFs {
    state: Mutex<MemFsState>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.state.lock().unwrap().dirs.insert(path.into());
        self
    }

    pub fn with_read_only_dir(self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        {
            let mut st = self.state.lock().unwrap();
            st.dirs.insert(path.clone());
            st.read_only.insert(path);
        }
        self
    }

    /// 对该路径 `create_dir_all` 返回权限错误
    pub fn deny_create(self, path: impl Into<PathBuf>) -> Self {
        self.state.lock().unwrap().deny_create.insert(path.into());
        self
    }

    pub fn with_file(self, path: impl Into<PathBuf>, content: &str, modified: DateTime<Utc>) -> Self {
        let path = path.into();
        {
            let mut st = self.state.lock().unwrap();
            if let Some(parent) = path.parent() {
                st.dirs.insert(parent.to_path_buf());
            }
            st.files.insert(path, (content.to_string(), modified));
        }
        self
    }

    pub fn with_space(self, path: impl Into<PathBuf>, total_bytes: u64, available_bytes: u64) -> Self {
        self.state
            .lock()
            .unwrap()
            .spaces
            .insert(path.into(), DiskSpace { total_bytes, available_bytes });
        self
    }

    /// 经 `create_dir_all` 新建的目录，按创建顺序
    pub fn created_dirs(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().created.clone()
    }
}

impl FileSystem for MemFs {
    fn exists(&self, path: &Path) -> bool {
        let st = self.state.lock().unwrap();
        st.dirs.contains(path) || st.files.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.state.lock().unwrap().dirs.contains(path)
    }

    fn is_writable(&self, path: &Path) -> bool {
        let st = self.state.lock().unwrap();
        (st.dirs.contains(path) || st.files.contains_key(path)) && !st.read_only.contains(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut st = self.state.lock().unwrap();
        if st.deny_create.contains(path) {
            return Err(HealthError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "permission denied",
            )));
        }
        if st.dirs.insert(path.to_path_buf()) {
            st.created.push(path.to_path_buf());
        }
        Ok(())
    }

    fn space(&self, path: &Path) -> Result<DiskSpace> {
        self.state
            .lock()
            .unwrap()
            .spaces
            .get(path)
            .copied()
            .ok_or_else(|| HealthError::System(format!("statvfs {}: No such file or directory", path.display())))
    }

    fn glob(&self, dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let pat = glob::Pattern::new(pattern)?;
        let st = self.state.lock().unwrap();
        Ok(st
            .files
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| pat.matches(n))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    fn modified(&self, path: &Path) -> Result<DateTime<Utc>> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(path)
            .map(|(_, m)| *m)
            .ok_or_else(|| not_found(path))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(path)
            .map(|(c, _)| c.clone())
            .ok_or_else(|| not_found(path))
    }

    fn read_tail(&self, path: &Path, max_lines: usize) -> Result<Vec<String>> {
        Ok(last_lines(&self.read_to_string(path)?, max_lines))
    }
}

fn not_found(path: &Path) -> HealthError {
    HealthError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("{}: not found", path.display()),
    ))
}

// ── FixedClock ──────────────────────────────────────────────────────────────

/// 固定在某一时刻的时钟
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
