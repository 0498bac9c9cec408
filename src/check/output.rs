//! 输出层：接收 HealthReport，渲染 text 或 json

use std::io::Write;

use crate::check::report::HealthReport;
use crate::check::result::Severity;
use crate::utils::{HealthError, Result};

pub fn display(report: &HealthReport, format: &str, verbose: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render(&mut out, report, format, verbose)
}

pub fn render<W: Write>(out: &mut W, report: &HealthReport, format: &str, verbose: bool) -> Result<()> {
    match format {
        "json" => render_json(out, report),
        "text" => render_text(out, report, verbose),
        other  => Err(HealthError::Config(format!("unknown format: {}", other))),
    }
}

// ── JSON ────────────────────────────────────────────────────────────────────

fn render_json<W: Write>(out: &mut W, report: &HealthReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| HealthError::System(format!("JSON serialize: {}", e)))?;
    writeln!(out, "{}", json)?;
    Ok(())
}

// ── Text ────────────────────────────────────────────────────────────────────

fn render_text<W: Write>(out: &mut W, report: &HealthReport, verbose: bool) -> Result<()> {
    print_section(out, "HEALTH REPORT")?;
    writeln!(out, "  Generated at : {}", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(out, "  Overall      : {} {}", status_icon(report.overall.as_severity()), report.overall)?;

    print_section(out, &format!("CHECKS ({})", report.results.len()))?;
    let name_width = report.results.iter().map(|r| r.name().len()).max().unwrap_or(0);
    for r in &report.results {
        writeln!(out, "  {} {:<8} {:<nw$}  {}",
            status_icon(r.severity()), r.severity(), r.name(), r.message(),
            nw = name_width)?;
        if verbose {
            writeln!(out, "      id={}  observed {}",
                r.id(), r.observed_at().format("%H:%M:%S%.3f"))?;
        }
    }

    print_section(out, "SUMMARY")?;
    let s = &report.summary;
    writeln!(out, "  {} critical  {} warning  {} good  {} info",
        s.critical, s.warning, s.good, s.info)?;
    Ok(())
}

fn status_icon(s: Severity) -> &'static str {
    match s {
        Severity::Critical => "✗",
        Severity::Warning  => "⚠",
        Severity::Good     => "✓",
        Severity::Info     => "·",
    }
}

// ── 格式化工具 ───────────────────────────────────────────────────────────────

fn print_section<W: Write>(out: &mut W, title: &str) -> Result<()> {
    writeln!(out, "\n{}", "─".repeat(60))?;
    writeln!(out, "  {}", title)?;
    writeln!(out, "{}", "─".repeat(60))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::report::RollupPolicy;
    use crate::check::result::{CheckResult, Finding};
    use chrono::Utc;

    fn sample() -> HealthReport {
        let results = vec![
            CheckResult::new("disk_space", "Disk space", Finding::good("12.0% used at /"), Utc::now()),
            CheckResult::new("backup_freshness", "Backup freshness", Finding::warning("no backups"), Utc::now()),
        ];
        HealthReport::build(results, &RollupPolicy::default(), Utc::now())
    }

    #[test]
    fn text_lists_every_check_and_summary() {
        let mut buf = Vec::new();
        render(&mut buf, &sample(), "text", false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Overall      : ✓ GOOD"));
        assert!(text.contains("GOOD     Disk space        12.0% used at /"));
        assert!(text.contains("WARNING  Backup freshness  no backups"));
        assert!(text.contains("0 critical  1 warning  1 good  0 info"));
        assert!(!text.contains("id=disk_space"));
    }

    #[test]
    fn verbose_text_shows_ids() {
        let mut buf = Vec::new();
        render(&mut buf, &sample(), "text", true).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("id=disk_space"));
    }

    #[test]
    fn json_is_parseable() {
        let mut buf = Vec::new();
        render(&mut buf, &sample(), "json", false).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v["overall"], "GOOD");
        assert_eq!(v["results"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let mut buf = Vec::new();
        assert!(render(&mut buf, &sample(), "yaml", false).is_err());
    }
}
