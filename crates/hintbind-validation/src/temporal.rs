//! Date, time, datetime and duration parsing
//!
//! ISO-8601 parsing is lenient in the usual web-framework way: single-digit
//! month/day/hour fields, optional seconds, up to six fractional digits and
//! `T` or space between date and time. Custom strftime formats are handled
//! by chrono.

use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
};
use once_cell::sync::Lazy;
use regex::Regex;

/// Token selecting ISO-8601 parsing inside an `input_formats` list
pub const ISO_8601: &str = "iso-8601";

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{1,2})(?::(\d{1,2})(?:[.,](\d{1,6})\d{0,6})?)?$").unwrap()
});

static DATETIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{4})-(\d{1,2})-(\d{1,2})[T ](\d{1,2}):(\d{1,2})(?::(\d{1,2})(?:[.,](\d{1,6})\d{0,6})?)?\s*(Z|[+-]\d{2}(?::?\d{2})?)?$",
    )
    .unwrap()
});

static ISO_DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([-+]?)P(?:(\d+(?:[.,]\d+)?)D)?(?:T(?:(\d+(?:[.,]\d+)?)H)?(?:(\d+(?:[.,]\d+)?)M)?(?:(\d+(?:[.,]\d+)?)S)?)?$",
    )
    .unwrap()
});

// ============================================================================
// ISO-8601
// ============================================================================

/// Parse `YYYY-MM-DD`
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let caps = DATE_RE.captures(s.trim())?;
    NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )
}

/// Parse `hh:mm[:ss[.uuuuuu]]`
pub fn parse_iso_time(s: &str) -> Option<NaiveTime> {
    let caps = TIME_RE.captures(s.trim())?;
    build_time(
        caps.get(1).map(|m| m.as_str()),
        caps.get(2).map(|m| m.as_str()),
        caps.get(3).map(|m| m.as_str()),
        caps.get(4).map(|m| m.as_str()),
    )
}

/// Parse `YYYY-MM-DDThh:mm[:ss[.uuuuuu]][Z|+HH:MM]`
///
/// Naive inputs get `default_tz`.
pub fn parse_iso_datetime(s: &str, default_tz: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let caps = DATETIME_RE.captures(s.trim())?;
    let date = NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )?;
    let time = build_time(
        caps.get(4).map(|m| m.as_str()),
        caps.get(5).map(|m| m.as_str()),
        caps.get(6).map(|m| m.as_str()),
        caps.get(7).map(|m| m.as_str()),
    )?;
    let offset = match caps.get(8) {
        Some(tz) => parse_offset(tz.as_str())?,
        None => default_tz,
    };
    offset
        .from_local_datetime(&NaiveDateTime::new(date, time))
        .single()
}

fn build_time(
    hour: Option<&str>,
    minute: Option<&str>,
    second: Option<&str>,
    fraction: Option<&str>,
) -> Option<NaiveTime> {
    let hour: u32 = hour?.parse().ok()?;
    let minute: u32 = minute?.parse().ok()?;
    let second: u32 = second.map(str::parse).transpose().ok()?.unwrap_or(0);
    let micro = match fraction {
        Some(f) => format!("{:0<6}", f).parse::<u32>().ok()?,
        None => 0,
    };
    NaiveTime::from_hms_micro_opt(hour, minute, second, micro)
}

fn parse_offset(tz: &str) -> Option<FixedOffset> {
    if tz == "Z" {
        return FixedOffset::east_opt(0);
    }
    let sign = if tz.starts_with('-') { -1 } else { 1 };
    let digits: String = tz[1..].chars().filter(|c| *c != ':').collect();
    let hours: i32 = digits.get(0..2)?.parse().ok()?;
    let minutes: i32 = match digits.get(2..4) {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

// ============================================================================
// Format-list parsing
// ============================================================================

/// Parse a date against an `input_formats` list (empty = ISO)
pub fn parse_date(s: &str, formats: &[String]) -> Option<NaiveDate> {
    if formats.is_empty() {
        return parse_iso_date(s);
    }
    formats.iter().find_map(|format| {
        if format == ISO_8601 {
            parse_iso_date(s)
        } else {
            NaiveDate::parse_from_str(s.trim(), format).ok()
        }
    })
}

/// Parse a time against an `input_formats` list (empty = ISO)
pub fn parse_time(s: &str, formats: &[String]) -> Option<NaiveTime> {
    if formats.is_empty() {
        return parse_iso_time(s);
    }
    formats.iter().find_map(|format| {
        if format == ISO_8601 {
            parse_iso_time(s)
        } else {
            NaiveTime::parse_from_str(s.trim(), format).ok()
        }
    })
}

/// Parse a datetime against an `input_formats` list (empty = ISO)
pub fn parse_datetime(
    s: &str,
    formats: &[String],
    default_tz: FixedOffset,
) -> Option<DateTime<FixedOffset>> {
    if formats.is_empty() {
        return parse_iso_datetime(s, default_tz);
    }
    formats.iter().find_map(|format| {
        if format == ISO_8601 {
            return parse_iso_datetime(s, default_tz);
        }
        DateTime::parse_from_str(s.trim(), format).ok().or_else(|| {
            NaiveDateTime::parse_from_str(s.trim(), format)
                .ok()
                .and_then(|naive| default_tz.from_local_datetime(&naive).single())
        })
    })
}

/// Human-readable list of accepted formats for error messages
pub fn describe_formats(formats: &[String], iso_description: &str) -> String {
    if formats.is_empty() {
        return iso_description.to_string();
    }
    formats
        .iter()
        .map(|f| {
            if f == ISO_8601 {
                iso_description.to_string()
            } else {
                f.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Durations
// ============================================================================

/// Parse `[DD] [[HH:]MM:]ss[.uuuuuu]` or an ISO-8601 `P..` duration
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(caps) = ISO_DURATION_RE.captures(s) {
        return parse_iso_duration(&caps);
    }
    parse_standard_duration(s)
}

fn parse_iso_duration(caps: &regex::Captures<'_>) -> Option<Duration> {
    // Bare "P" / "PT" carry no components
    if (2..=5).all(|i| caps.get(i).is_none()) {
        return None;
    }
    let component = |i: usize, unit_seconds: f64| -> Option<f64> {
        match caps.get(i) {
            Some(m) => Some(m.as_str().replace(',', ".").parse::<f64>().ok()? * unit_seconds),
            None => Some(0.0),
        }
    };
    let seconds = component(2, 86_400.0)?
        + component(3, 3_600.0)?
        + component(4, 60.0)?
        + component(5, 1.0)?;
    let micros = (seconds * 1_000_000.0).round();
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if !micros.is_finite() || micros >= i64::MAX as f64 {
        return None;
    }
    let micros = micros as i64;
    let sign = if &caps[1] == "-" { -1 } else { 1 };
    Some(Duration::microseconds(sign * micros))
}

fn parse_standard_duration(s: &str) -> Option<Duration> {
    let (days, clock) = match s.split_once(' ') {
        Some((days, rest)) => {
            let rest = rest
                .trim_start_matches("days,")
                .trim_start_matches("day,")
                .trim();
            (days.parse::<i64>().ok()?, rest)
        }
        None => (0, s),
    };

    let (sign, clock) = match clock.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, clock),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let (seconds_part, fraction) = match parts[parts.len() - 1].split_once(['.', ',']) {
        Some((secs, frac)) => (secs, Some(frac)),
        None => (parts[parts.len() - 1], None),
    };

    let seconds: i64 = parse_digits(seconds_part)?;
    let minutes: i64 = if parts.len() >= 2 {
        parse_digits(parts[parts.len() - 2])?
    } else {
        0
    };
    let hours: i64 = if parts.len() == 3 { parse_digits(parts[0])? } else { 0 };
    let micros: i64 = match fraction {
        Some(f) if !f.is_empty() && f.len() <= 12 && f.chars().all(|c| c.is_ascii_digit()) => {
            let six: String = f.chars().take(6).collect();
            format!("{:0<6}", six).parse().ok()?
        }
        Some(_) => return None,
        None => 0,
    };

    let clock_micros = hours
        .checked_mul(60)?
        .checked_add(minutes)?
        .checked_mul(60)?
        .checked_add(seconds)?
        .checked_mul(1_000_000)?
        .checked_add(micros)?;
    let day_micros = days.checked_mul(86_400_000_000)?;
    Some(Duration::microseconds(day_micros.checked_add(sign * clock_micros)?))
}

fn parse_digits(s: &str) -> Option<i64> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Render a duration as `[DD ]HH:MM:SS[.uuuuuu]`
pub fn format_duration(duration: Duration) -> String {
    let total_micros = duration.num_microseconds().unwrap_or(i64::MAX);
    let (sign, total_micros) = if total_micros < 0 {
        ("-", -total_micros)
    } else {
        ("", total_micros)
    };
    let micros = total_micros % 1_000_000;
    let total_seconds = total_micros / 1_000_000;
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    let mut out = String::from(sign);
    if days != 0 {
        out.push_str(&format!("{} ", days));
    }
    out.push_str(&format!("{:02}:{:02}:{:02}", hours, minutes, seconds));
    if micros != 0 {
        out.push_str(&format!(".{:06}", micros));
    }
    out
}
