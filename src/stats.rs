use crate::models::{AppData, DailyPoint, StatsResponse, WeeklyPoint};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

pub fn build_stats(data: &AppData, table: &str) -> StatsResponse {
    build_stats_at(Utc::now().date_naive(), data, table)
}

#[derive(Default)]
struct DayTally<'a> {
    events: u64,
    page_views: u64,
    sessions: HashSet<&'a str>,
}

impl<'a> DayTally<'a> {
    fn absorb(&mut self, other: &DayTally<'a>) {
        self.events += other.events;
        self.page_views += other.page_views;
        self.sessions.extend(other.sessions.iter().copied());
    }
}

pub fn build_stats_at(today: NaiveDate, data: &AppData, table: &str) -> StatsResponse {
    const WEEK_COUNT: usize = 8;

    let rows = data.tables.get(table).map(Vec::as_slice).unwrap_or_default();
    let mut days: BTreeMap<NaiveDate, DayTally> = BTreeMap::new();
    let mut event_types: BTreeMap<String, u64> = BTreeMap::new();

    for row in rows {
        let event_type = row.get("event_type").and_then(Value::as_str).unwrap_or("unknown");
        *event_types.entry(event_type.to_string()).or_default() += 1;

        let Some(date) = row_date(row) else {
            continue;
        };
        let tally = days.entry(date).or_default();
        tally.events += 1;
        if event_type == "page_view" {
            tally.page_views += 1;
        }
        if let Some(session) = row.get("session_id").and_then(Value::as_str) {
            tally.sessions.insert(session);
        }
    }

    let mut last_7_days = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let date = today - Duration::days(offset);
        let tally = days.get(&date);
        last_7_days.push(DailyPoint {
            date: date.to_string(),
            events: tally.map_or(0, |t| t.events),
            page_views: tally.map_or(0, |t| t.page_views),
            sessions: tally.map_or(0, |t| t.sessions.len() as u64),
        });
    }

    let current_week_start = week_start(today);
    let mut weekly_totals = Vec::with_capacity(WEEK_COUNT);

    for offset in (0..WEEK_COUNT).rev() {
        let start = current_week_start - Duration::weeks(offset as i64);
        let end = start + Duration::days(6);

        let mut week = DayTally::default();
        for (_, tally) in days.range(start..=end) {
            week.absorb(tally);
        }

        weekly_totals.push(WeeklyPoint {
            week: week_label(start),
            start_date: start.to_string(),
            end_date: end.to_string(),
            events: week.events,
            page_views: week.page_views,
            sessions: week.sessions.len() as u64,
        });
    }

    StatsResponse {
        table: table.to_string(),
        last_7_days,
        weekly_totals,
        event_types,
    }
}

fn row_date(row: &Value) -> Option<NaiveDate> {
    let raw = row.get("timestamp").and_then(Value::as_str)?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|at| at.with_timezone(&Utc).date_naive())
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(event_type: &str, session: &str, timestamp: &str) -> Value {
        json!({ "event_type": event_type, "session_id": session, "timestamp": timestamp })
    }

    #[test]
    fn stats_last_7_days_counts_events_and_sessions() {
        let mut data = AppData::default();
        data.tables.insert(
            "user_behavior".into(),
            vec![
                event("page_view", "s1", "2026-01-03T09:00:00.000Z"),
                event("scroll_depth", "s1", "2026-01-03T09:00:05.000Z"),
                event("page_view", "s2", "2026-01-03T18:30:00.000Z"),
                event("page_view", "s3", "2025-12-01T10:00:00.000Z"),
            ],
        );
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

        let stats = build_stats_at(today, &data, "user_behavior");
        assert_eq!(stats.last_7_days.len(), 7);
        let point = stats
            .last_7_days
            .iter()
            .find(|day| day.date == "2026-01-03")
            .expect("missing day");
        assert_eq!(point.events, 3);
        assert_eq!(point.page_views, 2);
        assert_eq!(point.sessions, 2);

        assert_eq!(stats.event_types["page_view"], 3);
        assert_eq!(stats.event_types["scroll_depth"], 1);
    }

    #[test]
    fn stats_weekly_series_lengths() {
        let data = AppData::default();
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let stats = build_stats_at(today, &data, "user_behavior");
        assert_eq!(stats.weekly_totals.len(), 8);
        assert_eq!(stats.last_7_days.len(), 7);
        assert!(stats.event_types.is_empty());
    }

    #[test]
    fn weekly_totals_deduplicate_sessions_across_days() {
        let mut data = AppData::default();
        data.tables.insert(
            "user_behavior".into(),
            vec![
                event("page_view", "s1", "2026-01-05T09:00:00.000Z"),
                event("page_view", "s1", "2026-01-06T09:00:00.000Z"),
                event("page_view", "s2", "2026-01-06T10:00:00.000Z"),
            ],
        );
        let today = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        let stats = build_stats_at(today, &data, "user_behavior");
        let current = stats.weekly_totals.last().unwrap();
        assert_eq!(current.start_date, "2026-01-05");
        assert_eq!(current.events, 3);
        assert_eq!(current.sessions, 2);
    }
}
