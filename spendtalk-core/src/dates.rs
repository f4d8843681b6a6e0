//! Relative and absolute date resolution for Vietnamese and English text.
//!
//! Rules are checked most-specific first and the first match wins:
//! 1. day before yesterday
//! 2. today
//! 3. yesterday
//! 4. weekday name (optionally "last week")
//! 5. "N days/weeks ago", bare "last week"
//! 6. explicit dd/mm[/yyyy]
//! 7. the reference date
//!
//! The reference date is always passed in; nothing here reads a clock.

use anyhow::Result;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use regex::Regex;
use tracing::{debug, warn};

use crate::text::contains_any;
use crate::transaction::Language;

struct Lexicon {
    day_before_yesterday: &'static [&'static str],
    today: &'static [&'static str],
    yesterday: &'static [&'static str],
    last_week: &'static [&'static str],
}

const VI: Lexicon = Lexicon {
    day_before_yesterday: &["hôm kia", "bữa kia", "hôm trước nữa"],
    today: &["hôm nay", "bữa nay", "sáng nay", "trưa nay", "chiều nay", "tối nay"],
    yesterday: &["hôm qua", "bữa qua", "sáng qua", "trưa qua", "chiều qua", "tối qua", "đêm qua"],
    last_week: &["tuần trước", "tuần rồi", "tuần qua"],
};

const EN: Lexicon = Lexicon {
    day_before_yesterday: &["day before yesterday"],
    today: &["today", "this morning", "this afternoon", "this evening", "tonight"],
    yesterday: &["yesterday", "last night"],
    last_week: &["last week"],
};

fn lexicon(language: Language) -> &'static Lexicon {
    match language {
        Language::Vi => &VI,
        Language::En => &EN,
    }
}

/// Resolve the date a message refers to. Never fails: anything unrecognized
/// or invalid resolves to `reference`.
pub fn parse_date(text: &str, language: Language, reference: NaiveDate) -> NaiveDate {
    match try_parse_date(text, language, reference) {
        Ok(Some(date)) => date,
        Ok(None) => reference,
        Err(e) => {
            warn!("date parsing failed for {text:?}: {e}");
            reference
        }
    }
}

/// Same rules as [`parse_date`], but `None` when no rule produced a date.
pub fn try_parse_date(
    text: &str,
    language: Language,
    reference: NaiveDate,
) -> Result<Option<NaiveDate>> {
    let text = text.to_lowercase();
    let lex = lexicon(language);

    if contains_any(&text, lex.day_before_yesterday) {
        return Ok(days_before(reference, 2));
    }
    if contains_any(&text, lex.today) {
        return Ok(Some(reference));
    }
    if contains_any(&text, lex.yesterday) {
        return Ok(days_before(reference, 1));
    }

    if let Some(weekday) = find_weekday(&text, language)? {
        let last_week = contains_any(&text, lex.last_week);
        debug!(?weekday, last_week, "weekday reference");
        return Ok(past_weekday(reference, weekday, last_week));
    }

    if let Some(date) = relative_offset(&text, language, reference)? {
        return Ok(Some(date));
    }

    explicit_day_month(&text, reference)
}

fn days_before(reference: NaiveDate, n: u64) -> Option<NaiveDate> {
    reference.checked_sub_days(Days::new(n))
}

/// Most recent past `weekday` strictly before `reference`.
fn past_weekday(reference: NaiveDate, weekday: Weekday, last_week: bool) -> Option<NaiveDate> {
    let from = reference.weekday().num_days_from_monday() as i64;
    let to = weekday.num_days_from_monday() as i64;
    let mut back = (from - to).rem_euclid(7);
    if back == 0 {
        back = 7;
    }
    if last_week {
        back += 7;
    }
    days_before(reference, back as u64)
}

fn find_weekday(text: &str, language: Language) -> Result<Option<Weekday>> {
    match language {
        Language::Vi => {
            let re = Regex::new(r"\b(?:thứ\s*(hai|ba|tư|bốn|năm|sáu|bảy|[2-7])|(chủ\s*nhật|cn))\b")?;
            let Some(caps) = re.captures(text) else {
                return Ok(None);
            };
            if caps.get(2).is_some() {
                return Ok(Some(Weekday::Sun));
            }
            let day = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            Ok(match day {
                "hai" | "2" => Some(Weekday::Mon),
                "ba" | "3" => Some(Weekday::Tue),
                "tư" | "bốn" | "4" => Some(Weekday::Wed),
                "năm" | "5" => Some(Weekday::Thu),
                "sáu" | "6" => Some(Weekday::Fri),
                "bảy" | "7" => Some(Weekday::Sat),
                _ => None,
            })
        }
        Language::En => {
            let re = Regex::new(r"\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")?;
            Ok(re
                .captures(text)
                .and_then(|caps| caps[1].parse::<Weekday>().ok()))
        }
    }
}

fn relative_offset(text: &str, language: Language, reference: NaiveDate) -> Result<Option<NaiveDate>> {
    let (days_re, weeks_re) = match language {
        Language::Vi => (
            Regex::new(r"(?:\b(\d+)\s*(?:ngày|hôm)\s*(?:trước|qua)\b|\bcách\s*đây\s*(\d+)\s*(?:ngày|hôm)\b)")?,
            Regex::new(r"(?:\b(\d+)\s*tuần\s*(?:trước|qua)\b|\bcách\s*đây\s*(\d+)\s*tuần\b)")?,
        ),
        Language::En => (
            Regex::new(r"\b(\d+)\s*days?\s+ago\b")?,
            Regex::new(r"\b(\d+)\s*weeks?\s+ago\b")?,
        ),
    };

    if let Some(n) = first_number(&days_re, text) {
        return Ok(days_before(reference, n));
    }
    if let Some(n) = first_number(&weeks_re, text) {
        return Ok(n.checked_mul(7).and_then(|d| days_before(reference, d)));
    }
    if contains_any(text, lexicon(language).last_week) {
        return Ok(days_before(reference, 7));
    }
    Ok(None)
}

/// Value of whichever capture group matched.
fn first_number(re: &Regex, text: &str) -> Option<u64> {
    let caps = re.captures(text)?;
    caps.iter()
        .skip(1)
        .flatten()
        .next()
        .and_then(|m| m.as_str().parse().ok())
}

/// dd/mm, dd-mm or dd.mm with an optional 2- or 4-digit year.
///
/// Without a year, a date after `reference` is moved to the previous year.
fn explicit_day_month(text: &str, reference: NaiveDate) -> Result<Option<NaiveDate>> {
    let re = Regex::new(r"(?:^|[^\d.,/\-])(\d{1,2})[/.\-](\d{1,2})(?:[/.\-](\d{4}|\d{2}))?(?:$|\W)")?;
    let Some(caps) = re.captures(text) else {
        return Ok(None);
    };

    let day: u32 = caps[1].parse()?;
    let month: u32 = caps[2].parse()?;

    if let Some(year) = caps.get(3) {
        let mut year: i32 = year.as_str().parse()?;
        if year < 100 {
            year += 2000;
        }
        return Ok(NaiveDate::from_ymd_opt(year, month, day));
    }

    let Some(this_year) = NaiveDate::from_ymd_opt(reference.year(), month, day) else {
        return Ok(None);
    };
    if this_year > reference {
        return Ok(NaiveDate::from_ymd_opt(reference.year() - 1, month, day));
    }
    Ok(Some(this_year))
}

/// Human phrase for `date` as seen from `reference`.
pub fn describe_date(date: NaiveDate, reference: NaiveDate, language: Language) -> String {
    let days = (reference - date).num_days();
    match (language, days) {
        (Language::Vi, 0) => "hôm nay".to_string(),
        (Language::Vi, 1) => "hôm qua".to_string(),
        (Language::Vi, 2) => "hôm kia".to_string(),
        (Language::Vi, 3..=6) => format!("{days} ngày trước"),
        (Language::Vi, 7..=29) => format!("{} tuần trước", days / 7),
        (Language::Vi, _) => date.format("%d/%m/%Y").to_string(),
        (Language::En, 0) => "today".to_string(),
        (Language::En, 1) => "yesterday".to_string(),
        (Language::En, 2) => "day before yesterday".to_string(),
        (Language::En, 3..=6) => format!("{days} days ago"),
        (Language::En, 7..=13) => "1 week ago".to_string(),
        (Language::En, 14..=29) => format!("{} weeks ago", days / 7),
        (Language::En, _) => date.format("%m/%d/%Y").to_string(),
    }
}
