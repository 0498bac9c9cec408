//! 聚合器：执行全部探针，容忍单个探针失败，产出完整报告
//!
//! `run_all` 不会失败。探针返回 `Err`、panic 或超时都会被转换为
//! 对应探针的 CRITICAL 结果，其余探针照常执行。

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::check::probes::Probe;
use crate::check::report::{HealthReport, RollupPolicy};
use crate::check::result::{CheckResult, Finding};
use crate::config::Execution;
use crate::sys::Env;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub execution: Execution,
    pub probe_timeout: Option<Duration>,
    pub rollup: RollupPolicy,
}

pub struct Aggregator {
    probes: Vec<Arc<dyn Probe>>,
    env: Env,
    options: RunOptions,
}

impl Aggregator {
    pub fn new(probes: Vec<Arc<dyn Probe>>, env: Env, options: RunOptions) -> Self {
        Self { probes, env, options }
    }

    pub fn run_all(&self) -> HealthReport {
        let span = tracing::info_span!("health.run", probes = self.probes.len());
        let _enter = span.enter();

        let results = match (self.options.execution, self.options.probe_timeout) {
            (Execution::Sequential, None) => self.run_inline(),
            (Execution::Sequential, Some(t)) => self.run_sequential_bounded(t),
            (Execution::Parallel, t) => self.run_parallel(t),
        };

        let report = HealthReport::build(results, &self.options.rollup, self.env.clock.now());
        tracing::info!(
            overall = %report.overall,
            critical = report.summary.critical,
            warning = report.summary.warning,
            good = report.summary.good,
            info = report.summary.info,
            "health run finished"
        );
        report
    }

    // ── 执行模式 ────────────────────────────────────────────────────────────

    fn run_inline(&self) -> Vec<CheckResult> {
        self.probes
            .iter()
            .map(|p| {
                let outcome = evaluate_guarded(p.as_ref(), &self.env);
                self.stamp(p.as_ref(), outcome)
            })
            .collect()
    }

    fn run_sequential_bounded(&self, timeout: Duration) -> Vec<CheckResult> {
        self.probes
            .iter()
            .map(|p| {
                let outcome = match spawn_worker(p, &self.env) {
                    Ok(rx) => wait_for(p.as_ref(), &rx, Some(Instant::now() + timeout), timeout),
                    Err(f) => f,
                };
                self.stamp(p.as_ref(), outcome)
            })
            .collect()
    }

    /// 每个探针一个线程（池大小 = 探针数），按注册顺序汇合
    fn run_parallel(&self, timeout: Option<Duration>) -> Vec<CheckResult> {
        let started = Instant::now();
        let pending: Vec<_> = self
            .probes
            .iter()
            .map(|p| spawn_worker(p, &self.env))
            .collect();

        self.probes
            .iter()
            .zip(pending)
            .map(|(p, worker)| {
                let outcome = match worker {
                    Ok(rx) => match timeout {
                        Some(t) => wait_for(p.as_ref(), &rx, Some(started + t), t),
                        None => wait_for(p.as_ref(), &rx, None, Duration::ZERO),
                    },
                    Err(f) => f,
                };
                self.stamp(p.as_ref(), outcome)
            })
            .collect()
    }

    fn stamp(&self, probe: &dyn Probe, outcome: Finding) -> CheckResult {
        tracing::debug!(probe = probe.id(), severity = %outcome.severity, "probe finished");
        CheckResult::new(probe.id(), probe.name(), outcome, self.env.clock.now())
    }
}

// ── 故障隔离 ────────────────────────────────────────────────────────────────

fn evaluate_guarded(probe: &dyn Probe, env: &Env) -> Finding {
    match catch_unwind(AssertUnwindSafe(|| probe.evaluate(env))) {
        Ok(Ok(finding)) => finding,
        Ok(Err(e)) => {
            tracing::warn!(probe = probe.id(), error = %e, "probe failed");
            Finding::critical(format!("probe {} failed: {}", probe.id(), e))
        }
        Err(panic) => {
            let msg = panic_message(panic.as_ref());
            tracing::warn!(probe = probe.id(), panic = %msg, "probe panicked");
            Finding::critical(format!("probe {} panicked: {}", probe.id(), msg))
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn spawn_worker(probe: &Arc<dyn Probe>, env: &Env) -> Result<mpsc::Receiver<Finding>, Finding> {
    let (tx, rx) = mpsc::channel();
    let probe = Arc::clone(probe);
    let env = env.clone();
    let id = probe.id();
    thread::Builder::new()
        .name(format!("probe-{}", id))
        .spawn(move || {
            let outcome = evaluate_guarded(probe.as_ref(), &env);
            // 接收端超时后已放弃，发送失败可以忽略
            let _ = tx.send(outcome);
        })
        .map(|_| rx)
        .map_err(|e| {
            tracing::warn!(probe = id, error = %e, "cannot spawn probe worker");
            Finding::critical(format!("probe {} could not start: {}", id, e))
        })
}

/// `deadline` 为空时无限等待；超时的工作线程被放弃（detached）
fn wait_for(
    probe: &dyn Probe,
    rx: &mpsc::Receiver<Finding>,
    deadline: Option<Instant>,
    budget: Duration,
) -> Finding {
    let received = match deadline {
        Some(d) => rx
            .recv_timeout(d.saturating_duration_since(Instant::now()))
            .map_err(|e| matches!(e, mpsc::RecvTimeoutError::Timeout)),
        None => rx.recv().map_err(|_| false),
    };
    match received {
        Ok(outcome) => outcome,
        Err(true) => {
            tracing::warn!(probe = probe.id(), budget_ms = budget.as_millis() as u64, "probe timed out");
            Finding::critical(format!("timed out after {}ms", budget.as_millis()))
        }
        Err(false) => Finding::critical(format!("probe {} worker exited without a result", probe.id())),
    }
}
