//! 单次探针结果

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    Warning,
    Good,
    /// 纯描述性结果，不参与汇总判定
    Info,
}

impl Severity {
    /// CRITICAL > WARNING > GOOD；INFO 不在该序列中
    fn rank(self) -> Option<u8> {
        match self {
            Severity::Critical => Some(2),
            Severity::Warning => Some(1),
            Severity::Good => Some(0),
            Severity::Info => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Warning => "WARNING",
            Severity::Good => "GOOD",
            Severity::Info => "INFO",
        }
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        Some(self.rank()?.cmp(&other.rank()?))
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// 探针返回的判定；由聚合器补上 id / name / 时间戳
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self { severity, message: message.into() }
    }

    pub fn good(message: impl Into<String>) -> Self {
        Self::new(Severity::Good, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(Severity::Critical, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    id: String,
    severity: Severity,
    name: String,
    message: String,
    observed_at: DateTime<Utc>,
}

impl CheckResult {
    pub fn new(id: &str, name: &str, finding: Finding, observed_at: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            severity: finding.severity,
            name: name.to_string(),
            message: finding.message,
            observed_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}
