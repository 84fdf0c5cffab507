// ==========================================
// Setup Sheet Analyzer - HH:MM:SS durations
// ==========================================

/// Parse a report duration (`HH:MM:SS`, hours may exceed two digits)
/// into whole seconds.
///
/// # Returns
/// - `None`: not three `:`-separated non-negative integers, or the
///   total does not fit in a u64
pub fn parse_hhmmss(raw: &str) -> Option<u64> {
    let mut parts = raw.trim().split(':');
    let hours = parse_field(parts.next()?)?;
    let minutes = parse_field(parts.next()?)?;
    let seconds = parse_field(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

fn parse_field(field: &str) -> Option<u64> {
    let field = field.trim();
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Format seconds as zero-padded `HH:MM:SS`; fractions are rounded.
pub fn format_hhmmss(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}
