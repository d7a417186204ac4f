// Copyright 2023 Remi Bernotavicius

use regex::Regex;
use std::sync::OnceLock;

/// Bare numbers above this are not taken as minutes.
const MAX_BARE_MINUTES: i32 = 300;

fn hours_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)\s*(?:hour|hr|h)").unwrap())
}

fn minutes_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*(?:minute|min|m)").unwrap())
}

fn unit_words_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"minutes|minute|mins|min|hours|hour|hrs|hr|h").unwrap())
}

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").unwrap())
}

/// Turns free text like "1 hour 30 min" into a number of minutes. Returns 0 when nothing
/// sensible can be extracted.
pub fn parse_cooking_time(text: &str) -> i32 {
    let text = text.to_lowercase();

    let hours = hours_regex()
        .captures(&text)
        .and_then(|c| c[1].parse::<f64>().ok())
        .map(|h| (h * 60.0) as i32)
        .unwrap_or(0);
    let minutes = minutes_regex()
        .captures(&text)
        .and_then(|c| c[1].parse::<i32>().ok())
        .unwrap_or(0);

    let total = hours.saturating_add(minutes);
    if total != 0 {
        return total;
    }

    let stripped = unit_words_regex().replace_all(&text, "");
    number_regex()
        .find(&stripped)
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .filter(|&m| m <= MAX_BARE_MINUTES)
        .unwrap_or(0)
}

#[test]
fn hours_and_minutes() {
    assert_eq!(parse_cooking_time("1 hour 30 min"), 90);
    assert_eq!(parse_cooking_time("2h15m"), 135);
    assert_eq!(parse_cooking_time("1.5 hours"), 90);
    assert_eq!(parse_cooking_time("25 MIN"), 25);
}

#[test]
fn bare_numbers() {
    assert_eq!(parse_cooking_time("45"), 45);
    assert_eq!(parse_cooking_time("about 20"), 20);
    assert_eq!(parse_cooking_time("300"), 300);
    assert_eq!(parse_cooking_time("500"), 0);
}

#[test]
fn nothing_to_parse() {
    assert_eq!(parse_cooking_time(""), 0);
    assert_eq!(parse_cooking_time("a while"), 0);
}
