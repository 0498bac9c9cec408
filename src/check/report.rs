//! 顶层报告结构体与汇总判定

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::check::result::{CheckResult, Severity};

/// 整体判定：只有三档，永远不会是 INFO
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Good,
    Warning,
    Critical,
}

impl Verdict {
    pub fn as_severity(self) -> Severity {
        match self {
            Verdict::Good => Severity::Good,
            Verdict::Warning => Severity::Warning,
            Verdict::Critical => Severity::Critical,
        }
    }

    /// 进程退出码：0 / 1 / 2
    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::Good => 0,
            Verdict::Warning => 1,
            Verdict::Critical => 2,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_severity().label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub critical: usize,
    pub warning: usize,
    pub good: usize,
    pub info: usize,
}

impl Summary {
    pub fn tally(results: &[CheckResult]) -> Self {
        let mut s = Summary::default();
        for r in results {
            match r.severity() {
                Severity::Critical => s.critical += 1,
                Severity::Warning => s.warning += 1,
                Severity::Good => s.good += 1,
                Severity::Info => s.info += 1,
            }
        }
        s
    }

    pub fn total(&self) -> usize {
        self.critical + self.warning + self.good + self.info
    }
}

/// 汇总规则，按顺序首个命中生效：
/// 1. 有 CRITICAL → CRITICAL
/// 2. WARNING 数 > max_warnings → WARNING
/// 3. 否则 GOOD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollupPolicy {
    pub max_warnings: usize,
}

impl Default for RollupPolicy {
    fn default() -> Self {
        Self { max_warnings: 2 }
    }
}

impl RollupPolicy {
    pub fn verdict(&self, summary: &Summary) -> Verdict {
        if summary.critical > 0 {
            Verdict::Critical
        } else if summary.warning > self.max_warnings {
            Verdict::Warning
        } else {
            Verdict::Good
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall: Verdict,
    pub results: Vec<CheckResult>,
    pub summary: Summary,
    pub generated_at: DateTime<Utc>,
}

impl HealthReport {
    pub fn build(results: Vec<CheckResult>, policy: &RollupPolicy, generated_at: DateTime<Utc>) -> Self {
        let summary = Summary::tally(&results);
        let overall = policy.verdict(&summary);
        Self { overall, results, summary, generated_at }
    }

    pub fn result(&self, id: &str) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.id() == id)
    }
}
