//! 安全基线：配置项 + 不应暴露的敏感文件

use std::collections::HashMap;

use crate::check::probes::Probe;
use crate::check::result::Finding;
use crate::config::SecurityConfig;
use crate::sys::Env;
use crate::utils::Result;

pub struct SecurityProbe {
    cfg: SecurityConfig,
}

impl SecurityProbe {
    pub fn new(cfg: SecurityConfig) -> Self {
        Self { cfg }
    }
}

/// `key = value` 行；`;` / `#` 开头为注释，`[section]` 忽略
fn parse_settings(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with(';') && !l.starts_with('#') && !l.starts_with('['))
        .filter_map(|l| l.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().trim_matches('"').to_string()))
        .collect()
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.to_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Some(true),
        "0" | "off" | "false" | "no" | "" => Some(false),
        _ => None,
    }
}

impl SecurityProbe {
    fn violations(&self, env: &Env) -> Vec<String> {
        let mut out = Vec::new();

        match env.fs.read_to_string(&self.cfg.settings_file) {
            Ok(content) => {
                let settings = parse_settings(&content);
                for rule in &self.cfg.rules {
                    match settings.get(&rule.key).map(|v| parse_flag(v)) {
                        Some(Some(v)) if v == rule.expected => {}
                        Some(Some(_)) => out.push(rule.description.clone()),
                        Some(None) => out.push(format!("{} ({} unrecognised)", rule.description, rule.key)),
                        None => out.push(format!("{} ({} not set)", rule.description, rule.key)),
                    }
                }
            }
            Err(_) => out.push(format!(
                "settings file {} unreadable",
                self.cfg.settings_file.display()
            )),
        }

        for rel in &self.cfg.sensitive_files {
            let path = self.cfg.web_root.join(rel);
            if env.fs.exists(&path) {
                out.push(format!("sensitive file exposed: {}", path.display()));
            }
        }
        out
    }
}

impl Probe for SecurityProbe {
    fn id(&self) -> &'static str {
        "security_posture"
    }

    fn name(&self) -> &'static str {
        "Security posture"
    }

    fn evaluate(&self, env: &Env) -> Result<Finding> {
        let v = self.violations(env);
        Ok(match v.len() {
            0 => Finding::good("0 security issues"),
            n if n <= self.cfg.warning_max => {
                Finding::warning(format!("{} security issues: {}", n, v.join("; ")))
            }
            n => Finding::critical(format!("{} security issues: {}", n, v.join("; "))),
        })
    }
}
