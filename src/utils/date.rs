use chrono::NaiveDate;

/// The operator's local calendar day.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Parse an inclusive `start`/`end` pair; `start` must not be after `end`.
pub fn parse_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), String> {
    let s = parse_date(start).ok_or_else(|| format!("Invalid start date: {}", start))?;
    let e = parse_date(end).ok_or_else(|| format!("Invalid end date: {}", end))?;

    if s > e {
        return Err(format!("Start date {} is after end date {}", s, e));
    }

    Ok((s, e))
}
