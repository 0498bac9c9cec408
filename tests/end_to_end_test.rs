//! Full registry against a real SQLite file and a temporary directory tree.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Duration, Utc};
use healthprobe::check::probes::connectivity::ConnectivityProbe;
use healthprobe::check::probes::permissions::PermissionsProbe;
use healthprobe::check::{build_aggregator, production_env};
use healthprobe::config::{Config, ConnectivityConfig, Execution, PermissionsConfig};
use healthprobe::sys::{Env, LocalFs, SystemClock};
use healthprobe::testing::FakeQuery;
use healthprobe::utils::Result;
use healthprobe::{Aggregator, Finding, Probe, RunOptions, Severity};
use rusqlite::Connection;
use tempfile::TempDir;

fn seed_database(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, role TEXT, last_login TEXT);
         CREATE TABLE settings (key TEXT PRIMARY KEY, value TEXT);
         INSERT INTO settings VALUES ('site_name', 'demo');",
    )
    .unwrap();
    let recent = Utc::now().to_rfc3339();
    let stale = (Utc::now() - Duration::days(30)).to_rfc3339();
    for (name, role, login) in [
        ("root", "admin", recent.as_str()),
        ("ana", "member", recent.as_str()),
        ("bo", "member", recent.as_str()),
        ("cy", "member", stale.as_str()),
    ] {
        conn.execute(
            "INSERT INTO users (name, role, last_login) VALUES (?1, ?2, ?3)",
            [name, role, login],
        )
        .unwrap();
    }
}

fn workspace() -> (TempDir, Config) {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();

    let db = root.join("app.db");
    seed_database(&db);

    std::fs::create_dir_all(root.join("backups")).unwrap();
    std::fs::write(root.join("backups/backup_2024.sql"), "-- dump").unwrap();
    std::fs::create_dir_all(root.join("logs")).unwrap();
    std::fs::write(root.join("logs/error.log"), "INFO boot\nERROR disk hiccup\nINFO ok\n").unwrap();
    std::fs::write(
        root.join("app.ini"),
        "display_errors = Off\nsession.cookie_httponly = On\nsession.use_strict_mode = On\n",
    )
    .unwrap();
    std::fs::create_dir_all(root.join("public")).unwrap();

    let mut cfg = Config::default();
    cfg.database.path = db;
    cfg.connectivity.good_below_ms = 10_000;
    cfg.connectivity.warning_below_ms = 20_000;
    cfg.disk.path = root.to_path_buf();
    cfg.runtime.min_kernel = "2.6".to_string();
    cfg.permissions.directories = vec![root.join("uploads"), root.join("cache/sessions")];
    cfg.memory.limit = "64G".to_string();
    cfg.backup.directory = root.join("backups");
    cfg.error_log.path = root.join("logs/error.log");
    cfg.security.settings_file = root.join("app.ini");
    cfg.security.web_root = root.join("public");
    cfg.validate().unwrap();
    (tmp, cfg)
}

fn severity_of(report: &healthprobe::HealthReport, id: &str) -> Severity {
    report.result(id).unwrap_or_else(|| panic!("missing {}", id)).severity()
}

#[test]
fn healthy_workspace_reports_every_probe() {
    let (tmp, cfg) = workspace();
    let report = build_aggregator(&cfg, production_env(&cfg)).run_all();

    assert_eq!(report.results.len(), 12);
    assert_eq!(severity_of(&report, "connectivity"), Severity::Good);
    assert_eq!(severity_of(&report, "schema_presence"), Severity::Good);
    assert_eq!(severity_of(&report, "data_integrity"), Severity::Good);
    assert_eq!(severity_of(&report, "runtime_config"), Severity::Good);
    assert_eq!(severity_of(&report, "fs_permissions"), Severity::Good);
    assert_eq!(severity_of(&report, "memory_usage"), Severity::Good);
    assert_eq!(severity_of(&report, "backup_freshness"), Severity::Good);
    assert_eq!(severity_of(&report, "activity_level"), Severity::Good);
    assert_eq!(severity_of(&report, "error_log_volume"), Severity::Warning);
    assert_eq!(severity_of(&report, "security_posture"), Severity::Good);
    assert_eq!(severity_of(&report, "system_info"), Severity::Info);

    let activity = report.result("activity_level").unwrap();
    assert!(activity.message().starts_with("2 of 3 users"), "{}", activity.message());

    assert!(tmp.path().join("uploads").is_dir());
    assert!(tmp.path().join("cache/sessions").is_dir());
}

#[test]
fn missing_database_degrades_each_query_probe_independently() {
    let (tmp, mut cfg) = workspace();
    cfg.database.path = tmp.path().join("nope.db");
    let report = build_aggregator(&cfg, production_env(&cfg)).run_all();

    assert_eq!(report.results.len(), 12);
    for id in ["connectivity", "schema_presence", "data_integrity", "activity_level"] {
        assert_eq!(severity_of(&report, id), Severity::Critical, "{}", id);
    }
    assert_eq!(report.overall, healthprobe::Verdict::Critical);
    assert!(!tmp.path().join("nope.db").exists());
}

#[test]
fn parallel_and_sequential_agree() {
    let (_tmp, mut cfg) = workspace();
    let sequential = build_aggregator(&cfg, production_env(&cfg)).run_all();
    cfg.engine.execution = Execution::Parallel;
    cfg.engine.probe_timeout_ms = Some(30_000);
    let parallel = build_aggregator(&cfg, production_env(&cfg)).run_all();

    let ids = |r: &healthprobe::HealthReport| -> Vec<String> {
        r.results.iter().map(|c| c.id().to_string()).collect()
    };
    assert_eq!(ids(&sequential), ids(&parallel));
    for (a, b) in sequential.results.iter().zip(&parallel.results) {
        if a.id() != "disk_space" && a.id() != "memory_usage" && a.id() != "system_info" {
            assert_eq!(a.severity(), b.severity(), "{}", a.id());
        }
    }
}

#[test]
fn permissions_probe_is_idempotent_on_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let dirs: Vec<PathBuf> = vec![tmp.path().join("a/b"), tmp.path().join("c")];
    let probe = PermissionsProbe::new(PermissionsConfig { directories: dirs.clone() });
    let env = Env::new(Arc::new(FakeQuery::new()), Arc::new(LocalFs), Arc::new(SystemClock));

    let first = probe.evaluate(&env).unwrap();
    let second = probe.evaluate(&env).unwrap();

    assert_eq!(first.severity, Severity::Good);
    assert_eq!(first, second);
    assert!(dirs.iter().all(|d| d.is_dir()));
}

/// 在同一个数据库上跑一条耗时数秒的统计查询
struct HeavyCount;

impl Probe for HeavyCount {
    fn id(&self) -> &'static str {
        "heavy_count"
    }
    fn name(&self) -> &'static str {
        "Heavy count"
    }
    fn evaluate(&self, env: &Env) -> Result<Finding> {
        let n = env.query.scalar(
            "WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c WHERE x < 5000000) \
             SELECT COUNT(*) FROM c",
            &[],
        )?;
        Ok(Finding::good(format!("counted {:?}", n)))
    }
}

#[test]
fn connectivity_latency_excludes_sibling_queries_in_parallel() {
    let (_tmp, cfg) = workspace();
    let probes: Vec<Arc<dyn Probe>> = vec![
        Arc::new(HeavyCount),
        Arc::new(ConnectivityProbe::new(ConnectivityConfig::default())),
    ];
    let options = RunOptions { execution: Execution::Parallel, ..RunOptions::default() };
    let report = Aggregator::new(probes, production_env(&cfg), options).run_all();

    assert_eq!(severity_of(&report, "heavy_count"), Severity::Good);
    let connectivity = report.result("connectivity").unwrap();
    assert_eq!(connectivity.severity(), Severity::Good, "{}", connectivity.message());
}
