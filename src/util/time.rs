//! Timestamp helpers for game API values, clan games windows and Discord formatting.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, TimeZone, Utc};

use crate::error::game_api::GameApiError;

const CLASH_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%.fZ";

/// Clan games start on this day of every month at `CLAN_GAMES_HOUR` UTC.
const CLAN_GAMES_START_DAY: u32 = 22;
/// Clan games end on this day of every month at `CLAN_GAMES_HOUR` UTC.
const CLAN_GAMES_END_DAY: u32 = 28;
const CLAN_GAMES_HOUR: u32 = 8;

/// Parses a game API timestamp such as `20261016T120000.000Z`.
pub fn parse_clash_timestamp(value: &str) -> Result<DateTime<Utc>, GameApiError> {
    NaiveDateTime::parse_from_str(value, CLASH_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| GameApiError::InvalidTimestamp(value.to_string()))
}

/// Returns the clan games period containing `now`, if any.
///
/// # Returns
/// - `Some((start, end))` - `now` is inside the 22nd 08:00 to 28th 08:00 UTC window
/// - `None` - No clan games are running
pub fn clan_games_window(now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc
        .with_ymd_and_hms(now.year(), now.month(), CLAN_GAMES_START_DAY, CLAN_GAMES_HOUR, 0, 0)
        .single()?;
    let end = Utc
        .with_ymd_and_hms(now.year(), now.month(), CLAN_GAMES_END_DAY, CLAN_GAMES_HOUR, 0, 0)
        .single()?;

    if now >= start && now < end {
        Some((start, end))
    } else {
        None
    }
}

/// Discord timestamp markup rendered relative to the reader, e.g. "in 2 hours".
pub fn discord_relative(time: DateTime<Utc>) -> String {
    format!("<t:{}:R>", time.timestamp())
}

/// Discord timestamp markup rendered as a full date and time in the reader's zone.
pub fn discord_full(time: DateTime<Utc>) -> String {
    format!("<t:{}:f>", time.timestamp())
}

/// Short human readable duration such as `1d 4h`, `2h 30m` or `15m`.
///
/// Seconds are dropped; anything under a minute renders as `0m`.
pub fn format_duration(duration: Duration) -> String {
    let total_minutes = duration.num_minutes().max(0);
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes % (24 * 60)) / 60;
    let minutes = total_minutes % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 || parts.is_empty() {
        parts.push(format!("{}m", minutes));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn parses_api_timestamp() {
        let parsed = parse_clash_timestamp("20261016T120000.000Z").unwrap();
        assert_eq!(parsed, utc(2026, 10, 16, 12, 0));
    }

    #[test]
    fn rejects_malformed_api_timestamp() {
        assert!(matches!(
            parse_clash_timestamp("2026-10-16T12:00:00Z"),
            Err(GameApiError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn finds_clan_games_window() {
        let (start, end) = clan_games_window(utc(2026, 10, 25, 17, 30)).unwrap();
        assert_eq!(start, utc(2026, 10, 22, 8, 0));
        assert_eq!(end, utc(2026, 10, 28, 8, 0));
    }

    #[test]
    fn no_clan_games_outside_window() {
        assert!(clan_games_window(utc(2026, 10, 22, 7, 59)).is_none());
        assert!(clan_games_window(utc(2026, 10, 28, 8, 0)).is_none());
        assert!(clan_games_window(utc(2026, 10, 3, 12, 0)).is_none());
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(Duration::minutes(15)), "15m");
        assert_eq!(format_duration(Duration::minutes(150)), "2h 30m");
        assert_eq!(format_duration(Duration::hours(28)), "1d 4h");
        assert_eq!(format_duration(Duration::seconds(20)), "0m");
    }

    #[test]
    fn formats_discord_timestamps() {
        let time = utc(2026, 10, 16, 12, 0);
        assert_eq!(discord_relative(time), format!("<t:{}:R>", time.timestamp()));
        assert_eq!(discord_full(time), format!("<t:{}:f>", time.timestamp()));
    }
}
