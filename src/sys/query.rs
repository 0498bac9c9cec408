//! 数据库查询接口
//! 生产实现：rusqlite（只读打开，每次查询独立连接）

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::utils::{HealthError, Result};

// ── 数据结构 ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// 数值型结果（COUNT(*) 等）转为 i64；文本形式的整数也接受。
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            Value::Real(v) => Some(*v as i64),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Null | Value::Blob(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

pub type Row = Vec<Value>;

pub trait QueryExecutor: Send + Sync {
    fn execute(&self, statement: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// 第一行第一列；无结果时返回 `Value::Null`。
    fn scalar(&self, statement: &str, params: &[Value]) -> Result<Value> {
        let rows = self.execute(statement, params)?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|r| r.into_iter().next())
            .unwrap_or(Value::Null))
    }

    /// 执行语句并返回往返耗时（单调时钟），不计建立连接的时间
    fn round_trip(&self, statement: &str) -> Result<Duration> {
        let started = Instant::now();
        self.execute(statement, &[])?;
        Ok(started.elapsed())
    }
}

// ── SQLite ──────────────────────────────────────────────────────────────────

/// 不持有共享连接：并行探针各自打开只读连接，互不排队
pub struct SqliteExecutor {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteExecutor {
    pub fn new(path: impl Into<PathBuf>, busy_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            busy_timeout,
        }
    }

    fn open(&self) -> Result<Connection> {
        // READ_ONLY：数据库不存在时直接报错，绝不创建空库
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| HealthError::Query(format!("open {}: {}", self.path.display(), e)))?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }
}

impl QueryExecutor for SqliteExecutor {
    fn execute(&self, statement: &str, params: &[Value]) -> Result<Vec<Row>> {
        let conn = self.open()?;
        run_statement(&conn, statement, params)
    }

    fn round_trip(&self, statement: &str) -> Result<Duration> {
        let conn = self.open()?;
        let started = Instant::now();
        run_statement(&conn, statement, &[])?;
        Ok(started.elapsed())
    }
}

fn run_statement(conn: &Connection, statement: &str, params: &[Value]) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(statement)?;
    let columns = stmt.column_count();
    let bound: Vec<rusqlite::types::Value> = params.iter().map(to_sql_value).collect();

    let mut rows = stmt.query(rusqlite::params_from_iter(bound.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(columns);
        for i in 0..columns {
            values.push(from_value_ref(row.get_ref(i)?));
        }
        out.push(values);
    }
    Ok(out)
}

fn to_sql_value(v: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;
    match v {
        Value::Null => Sql::Null,
        Value::Integer(i) => Sql::Integer(*i),
        Value::Real(f) => Sql::Real(*f),
        Value::Text(s) => Sql::Text(s.clone()),
        Value::Blob(b) => Sql::Blob(b.clone()),
    }
}

fn from_value_ref(v: ValueRef<'_>) -> Value {
    match v {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}

/// SQLite 标识符转义："name" → "\"name\""
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
