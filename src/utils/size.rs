//! 容量字符串解析与格式化

/// 解析 "1.5GiB" / "128M" / "512K" / "4096" → bytes
///
/// 无法识别的单位或数字返回 `None`。
pub fn parse_size_to_bytes(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let (num_part, unit) = s.split_at(
        s.find(|c: char| c.is_alphabetic()).unwrap_or(s.len())
    );
    let num: f64 = num_part.trim().parse().ok()?;
    if num < 0.0 || !num.is_finite() {
        return None;
    }
    let multiplier: u64 = match unit.trim().to_uppercase().trim_end_matches('B') {
        ""         => 1,
        "KI" | "K" => 1 << 10,
        "MI" | "M" => 1 << 20,
        "GI" | "G" => 1 << 30,
        "TI" | "T" => 1 << 40,
        _ => return None,
    };
    Some((num * multiplier as f64) as u64)
}

pub fn fmt_bytes(b: u64) -> String {
    if b >= 1 << 30 {
        format!("{:.1}GiB", b as f64 / (1u64 << 30) as f64)
    } else if b >= 1 << 20 {
        format!("{:.1}MiB", b as f64 / (1u64 << 20) as f64)
    } else if b >= 1 << 10 {
        format!("{:.1}KiB", b as f64 / (1u64 << 10) as f64)
    } else {
        format!("{}B", b)
    }
}
