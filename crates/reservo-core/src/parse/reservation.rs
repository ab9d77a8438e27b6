//! Free-text reservation extraction.
//!
//! Each field has its own matcher run in a fixed order; within a matcher the
//! first pattern that hits is authoritative, later patterns are not tried.
//! The matchers target disjoint vocabulary, so they are independent of one
//! another.

use std::sync::LazyLock;

use chrono::{NaiveDate, Utc};
use regex::Regex;

use super::types::{Field, ParsedReservation};

// Ordered: an explicit "for <digits>" beats any standalone integer token.
static PEOPLE_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"for\s+(\d+)").expect("static regex is valid"),
        Regex::new(r"(?:^|\s)(\d+)(?:\s|$)").expect("static regex is valid"),
    ]
});

// Ordered: explicit HH:MM beats a bare hour with am/pm, which beats a bare
// standalone number (assumed :00).
static TIME_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?P<h>\d{1,2}):(?P<m>\d{2})\s*(?P<p>am|pm)?").expect("static regex is valid"),
        Regex::new(r"(?P<h>\d{1,2})\s*(?P<p>am|pm)").expect("static regex is valid"),
        Regex::new(r"(?P<h>\d{1,2})(?:\s|$)").expect("static regex is valid"),
    ]
});

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").expect("static regex is valid"));

// Input is lower-cased before matching, so [a-z] covers alphabetic words.
static NAME_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"under\s+([a-z]+(?:\s+[a-z]+){0,2})").expect("static regex is valid"),
        Regex::new(r"for\s+([a-z]+(?:\s+[a-z]+){0,2})").expect("static regex is valid"),
        Regex::new(r"(?:my\s+)?name\s+is\s+([a-z]+(?:\s+[a-z]+){0,2})").expect("static regex is valid"),
    ]
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,})").expect("static regex is valid")
});

/// Parse a free-text reservation request against today's UTC date.
pub fn parse_reservation(input: &str) -> ParsedReservation {
    parse_reservation_at(input, Utc::now().date_naive())
}

/// Parse a free-text reservation request against an explicit "today".
///
/// Never fails: fields that cannot be extracted are reported in `missing`
/// (in check order), and `date` always resolves, defaulting to `today`.
pub fn parse_reservation_at(input: &str, today: NaiveDate) -> ParsedReservation {
    let text = input.trim().to_lowercase();
    let mut result = ParsedReservation::default();

    match extract_people(&text) {
        Some(people) => result.people = Some(people),
        None => result.missing.push(Field::People),
    }

    match extract_time(&text) {
        Some(time) => result.time = Some(time),
        None => result.missing.push(Field::Time),
    }

    result.date = Some(extract_date(&text, today));

    match extract_name(&text) {
        Some(name) => result.name = Some(name),
        None => result.missing.push(Field::Name),
    }

    match extract_email(&text) {
        Some(email) => result.email = Some(email),
        None => result.missing.push(Field::Email),
    }

    result
}

/// Party size: "for <digits>" wins, otherwise any standalone integer token.
fn extract_people(text: &str) -> Option<u32> {
    let caps = PEOPLE_PATTERNS.iter().find_map(|re| re.captures(text))?;
    let digits = caps.get(1).map_or("", |m| m.as_str());
    // An empty capture is tolerated as a party of one.
    Some(digits.parse().unwrap_or(1))
}

/// Clock time, normalized to zero-padded 24-hour "HH:MM".
fn extract_time(text: &str) -> Option<String> {
    let caps = TIME_PATTERNS.iter().find_map(|re| re.captures(text))?;

    let mut hours: u32 = caps.name("h")?.as_str().parse().ok()?;
    let minutes: u32 = caps
        .name("m")
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    let period = caps.name("p").map(|m| m.as_str());

    match period {
        Some("pm") if hours != 12 => hours += 12,
        Some("am") if hours == 12 => hours = 0,
        _ => {}
    }

    Some(format!("{hours:02}:{minutes:02}"))
}

/// Calendar date. Always resolves: "today"/"tomorrow" keywords first, then a
/// verbatim YYYY-MM-DD substring, then today as the default.
fn extract_date(text: &str, today: NaiveDate) -> String {
    if text.contains("today") {
        return today.format("%Y-%m-%d").to_string();
    }
    if text.contains("tomorrow") {
        let tomorrow = today.succ_opt().unwrap_or(today);
        return tomorrow.format("%Y-%m-%d").to_string();
    }
    if let Some(caps) = DATE_RE.captures(text) {
        return caps[1].to_string();
    }
    today.format("%Y-%m-%d").to_string()
}

/// Guest name: 1-3 alphabetic words after "under", "for", or "name is",
/// re-capitalized word by word.
fn extract_name(text: &str) -> Option<String> {
    let caps = NAME_PATTERNS.iter().find_map(|re| re.captures(text))?;
    let words: Vec<String> = caps[1].split_whitespace().map(capitalize).collect();
    Some(words.join(" "))
}

fn extract_email(text: &str) -> Option<String> {
    EMAIL_RE
        .captures(text)
        .map(|caps| caps[1].to_string())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn full_request_extracts_every_field() {
        let parsed = parse_reservation_at(
            "table for 4 at 7:30pm, email a@b.com, under John Doe",
            day("2025-06-01"),
        );

        assert_eq!(parsed.people, Some(4));
        assert_eq!(parsed.time.as_deref(), Some("19:30"));
        assert_eq!(parsed.name.as_deref(), Some("John Doe"));
        assert_eq!(parsed.email.as_deref(), Some("a@b.com"));
        assert_eq!(parsed.date.as_deref(), Some("2025-06-01"));
        assert!(parsed.is_complete());
    }

    #[test]
    fn pm_hours_convert_to_24h() {
        for (input, expected) in [
            ("at 1:00pm", "13:00"),
            ("at 7:30pm", "19:30"),
            ("at 11:15pm", "23:15"),
            ("at 12:00pm", "12:00"),
        ] {
            let parsed = parse_reservation_at(input, day("2025-06-01"));
            assert_eq!(parsed.time.as_deref(), Some(expected), "input: {input}");
        }
    }

    #[test]
    fn midnight_is_zero_hour() {
        let parsed = parse_reservation_at("at 12:30am", day("2025-06-01"));
        assert_eq!(parsed.time.as_deref(), Some("00:30"));
    }

    #[test]
    fn bare_hour_with_pm_marker() {
        let parsed = parse_reservation_at("dinner at 7pm for smith", day("2025-06-01"));
        assert_eq!(parsed.time.as_deref(), Some("19:00"));
    }

    #[test]
    fn bare_number_doubles_as_people_and_time() {
        // A lone standalone number feeds both matchers; they are independent.
        let parsed = parse_reservation_at("table for 2", day("2025-06-01"));
        assert_eq!(parsed.people, Some(2));
        assert_eq!(parsed.time.as_deref(), Some("02:00"));
    }

    #[test]
    fn empty_input_reports_all_missing_but_date() {
        let parsed = parse_reservation_at("", day("2025-06-01"));
        assert_eq!(
            parsed.missing,
            vec![Field::People, Field::Time, Field::Name, Field::Email]
        );
        assert_eq!(parsed.date.as_deref(), Some("2025-06-01"));
    }

    #[test]
    fn vague_input_reports_all_missing_but_date() {
        let parsed = parse_reservation_at("hello, can i get a table please", day("2025-06-01"));
        assert_eq!(
            parsed.missing,
            vec![Field::People, Field::Time, Field::Name, Field::Email]
        );
        assert_eq!(parsed.date.as_deref(), Some("2025-06-01"));
    }

    #[test]
    fn tomorrow_keyword_wins_over_explicit_date() {
        let parsed = parse_reservation_at(
            "tomorrow at noon, actually 2025-12-24 works too",
            day("2025-06-30"),
        );
        assert_eq!(parsed.date.as_deref(), Some("2025-07-01"));
    }

    #[test]
    fn tomorrow_crosses_year_boundary() {
        let parsed = parse_reservation_at("tomorrow", day("2025-12-31"));
        assert_eq!(parsed.date.as_deref(), Some("2026-01-01"));
    }

    #[test]
    fn explicit_iso_date_is_used_verbatim() {
        let parsed = parse_reservation_at("on 2025-12-24 at 6pm", day("2025-06-01"));
        assert_eq!(parsed.date.as_deref(), Some("2025-12-24"));
    }

    #[test]
    fn today_keyword_resolves_to_now() {
        let parsed = parse_reservation_at("today at 8", day("2025-06-01"));
        assert_eq!(parsed.date.as_deref(), Some("2025-06-01"));
    }

    #[test]
    fn under_beats_for_when_naming() {
        let parsed =
            parse_reservation_at("for alice, under bob carter", day("2025-06-01"));
        assert_eq!(parsed.name.as_deref(), Some("Bob Carter"));
    }

    #[test]
    fn name_is_phrase_matches() {
        let parsed = parse_reservation_at("my name is jane doe", day("2025-06-01"));
        assert_eq!(parsed.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn names_are_recapitalized() {
        let parsed = parse_reservation_at("under JOHN MCCLANE", day("2025-06-01"));
        assert_eq!(parsed.name.as_deref(), Some("John Mcclane"));
    }

    #[test]
    fn name_captures_at_most_three_words() {
        let parsed =
            parse_reservation_at("under anna maria van buren", day("2025-06-01"));
        assert_eq!(parsed.name.as_deref(), Some("Anna Maria Van"));
    }

    #[test]
    fn email_extracted_case_insensitively() {
        let parsed = parse_reservation_at("reach me at John.Doe+x@Example.ORG", day("2025-06-01"));
        assert_eq!(parsed.email.as_deref(), Some("john.doe+x@example.org"));
    }

    #[test]
    fn missing_preserves_check_order() {
        // Name and email present, people and time absent.
        let parsed = parse_reservation_at("under smith, smith@mail.com", day("2025-06-01"));
        assert_eq!(parsed.missing, vec![Field::People, Field::Time]);
    }

    #[test]
    fn people_prefers_for_count() {
        let parsed = parse_reservation_at("6 of us, for 4 really", day("2025-06-01"));
        assert_eq!(parsed.people, Some(4));
    }

    #[test]
    fn serializes_with_lowercase_missing_fields() {
        let parsed = parse_reservation_at("", day("2025-06-01"));
        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(
            json["missing"],
            serde_json::json!(["people", "time", "name", "email"])
        );
        assert!(json.get("name").is_none());
    }
}
