use anyhow::Result;
use colored::Colorize;
use pipedrive::ApiResult;
use serde::Serialize;

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a call result. Returns whether the call succeeded.
pub fn print_result(result: &ApiResult) -> Result<bool> {
    print_json(result)?;

    if result.success() {
        return Ok(true);
    }

    let status = result
        .status()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let reason = if result.not_authorized() {
        "not authorized"
    } else if result.failed() {
        "request failed"
    } else {
        "unsuccessful"
    };
    let detail = result
        .get("error")
        .and_then(|e| e.as_str())
        .unwrap_or_default();

    eprintln!(
        "{} {} (HTTP {}) {}",
        "✗".red().bold(),
        reason.red(),
        status,
        detail.dimmed()
    );
    Ok(false)
}
