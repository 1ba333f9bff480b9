use anyhow::{Context, Result};
use std::path::Path;

/// Tokens that mark a missing sample.
const MISSING: [&str; 4] = ["nan", "null", "none", "-"];

/// Parse one voltage token; missing markers become `NaN`.
pub fn parse_voltage(token: &str) -> Option<f64> {
    let trimmed = token.trim();
    if trimmed.is_empty() || MISSING.iter().any(|m| trimmed.eq_ignore_ascii_case(m)) {
        return Some(f64::NAN);
    }
    trimmed.parse().ok()
}

/// Parse a newline-delimited voltage series, ignoring blank/comment lines.
/// `nan`, `null`, `none` and `-` mark missing samples.
pub fn parse_f64_series(text: &str) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let val = parse_voltage(trimmed)
            .with_context(|| format!("line {} is not f64: {}", idx + 1, trimmed))?;
        out.push(val);
    }
    if out.is_empty() {
        anyhow::bail!("no numeric samples found");
    }
    Ok(out)
}

/// Read a newline-delimited voltage series from disk.
pub fn read_f64_series(path: &Path) -> Result<Vec<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_f64_series(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_series_with_gaps() {
        let series = parse_f64_series("# lead II\n0.1\n\n-0.25\nNaN\nnull\n-\n1e-2\n").expect("parse");
        assert_eq!(series.len(), 6);
        assert_eq!(series[0], 0.1);
        assert_eq!(series[1], -0.25);
        assert!(series[2..5].iter().all(|v| v.is_nan()));
        assert_eq!(series[5], 0.01);
    }

    #[test]
    fn rejects_garbage_and_empty_input() {
        let err = parse_f64_series("0.1\nabc\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(parse_f64_series("# nothing\n\n").is_err());
    }
}
