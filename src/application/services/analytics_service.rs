//! Click analytics derived from the click log.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::domain::clock::Clock;
use crate::domain::entities::{ClickEvent, DeviceClass};
use crate::domain::expiration::ExpirationPolicy;
use crate::domain::repositories::{ClickRepository, EntryRepository};
use crate::error::DomainError;
use crate::utils::referrer::referrer_source;

/// Half-open time range `[start, end)` for analytics.
///
/// Only [`TimeWindow::new`] and [`TimeWindow::last`] build one, so `end > start`
/// always holds:
///
/// ```compile_fail
/// use chrono::Utc;
/// use linkshrinker::application::services::TimeWindow;
///
/// let now = Utc::now();
/// let reversed = TimeWindow { start: now, end: now };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidWindow`] unless `end > start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DomainError> {
        if end <= start {
            return Err(DomainError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// The preset range ending at `now`.
    pub fn last(range: TimeRange, now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::days(range.days()),
            end: now,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Every UTC calendar day the window touches, in order.
    pub fn days(&self) -> Vec<NaiveDate> {
        let first = self.start.date_naive();
        let last = (self.end - Duration::nanoseconds(1)).date_naive();
        first.iter_days().take_while(|d| *d <= last).collect()
    }
}

/// Named analytics ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    Last7Days,
    #[default]
    Last30Days,
    Last90Days,
    LastYear,
}

impl TimeRange {
    pub fn days(&self) -> i64 {
        match self {
            Self::Last7Days => 7,
            Self::Last30Days => 30,
            Self::Last90Days => 90,
            Self::LastYear => 365,
        }
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7d" => Ok(Self::Last7Days),
            "30d" => Ok(Self::Last30Days),
            "90d" => Ok(Self::Last90Days),
            "1y" => Ok(Self::LastYear),
            other => Err(format!(
                "unknown time range '{other}', expected 7d, 30d, 90d or 1y"
            )),
        }
    }
}

/// Clicks falling on one UTC day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyClicks {
    pub date: NaiveDate,
    pub clicks: u64,
    pub unique_visitors: u64,
}

/// One row of a categorical breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: u64,
    /// `100 * count / total`, one decimal.
    pub percentage: f64,
}

/// Aggregated click statistics for one entry over a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub entry_id: i64,
    pub short_code: String,
    pub window: TimeWindow,
    pub total_clicks: u64,
    /// Distinct visitor ids; events without one count per `(device, country)` pair.
    pub unique_visitors: u64,
    /// `100 * unique_visitors / total_clicks`, one decimal.
    pub click_rate: f64,
    pub daily: Vec<DailyClicks>,
    pub peak_day: Option<NaiveDate>,
    pub peak_clicks: u64,
    pub average_daily: f64,
    pub last_click_at: Option<DateTime<Utc>>,
    pub referrers: Vec<CategoryCount>,
    pub devices: Vec<CategoryCount>,
    pub browsers: Vec<CategoryCount>,
    pub operating_systems: Vec<CategoryCount>,
    pub countries: Vec<CategoryCount>,
    pub cities: Vec<CategoryCount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Created,
    Clicked,
    Expired,
}

/// An item of the recent activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub kind: ActivityKind,
    pub entry_id: i64,
    pub short_code: String,
    pub at: DateTime<Utc>,
}

#[derive(Hash, PartialEq, Eq)]
enum VisitorKey<'a> {
    Id(&'a str),
    Approx(DeviceClass, &'a str),
}

fn visitor_key(event: &ClickEvent) -> VisitorKey<'_> {
    match &event.visitor_id {
        Some(id) => VisitorKey::Id(id),
        None => VisitorKey::Approx(event.device_class, &event.country),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(100.0 * count as f64 / total as f64)
}

fn breakdown<F>(events: &[ClickEvent], key: F) -> Vec<CategoryCount>
where
    F: Fn(&ClickEvent) -> String,
{
    let total = events.len() as u64;
    let mut counts: HashMap<String, u64> = HashMap::new();
    for event in events {
        *counts.entry(key(event)).or_default() += 1;
    }

    let mut rows: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(name, count)| CategoryCount {
            percentage: percentage(count, total),
            name,
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    rows
}

fn daily_series(events: &[ClickEvent], window: &TimeWindow) -> Vec<DailyClicks> {
    let mut per_day: BTreeMap<NaiveDate, (u64, HashSet<VisitorKey<'_>>)> = window
        .days()
        .into_iter()
        .map(|d| (d, (0, HashSet::new())))
        .collect();

    for event in events {
        if let Some((clicks, visitors)) = per_day.get_mut(&event.timestamp.date_naive()) {
            *clicks += 1;
            visitors.insert(visitor_key(event));
        }
    }

    per_day
        .into_iter()
        .map(|(date, (clicks, visitors))| DailyClicks {
            date,
            clicks,
            unique_visitors: visitors.len() as u64,
        })
        .collect()
}

/// Computes [`Metrics`] from the events of one entry. Events outside
/// `window` must already be filtered out.
pub fn summarize_events(
    entry_id: i64,
    short_code: &str,
    window: TimeWindow,
    events: &[ClickEvent],
    last_click_at: Option<DateTime<Utc>>,
) -> Metrics {
    let total_clicks = events.len() as u64;
    let unique_visitors = events.iter().map(visitor_key).collect::<HashSet<_>>().len() as u64;
    let daily = daily_series(events, &window);

    // `max_by_key` keeps the last maximum, so fold for the earliest one.
    let peak = daily
        .iter()
        .filter(|d| d.clicks > 0)
        .fold(None::<&DailyClicks>, |best, d| match best {
            Some(b) if b.clicks >= d.clicks => Some(b),
            _ => Some(d),
        });

    let peak_day = peak.map(|d| d.date);
    let peak_clicks = peak.map_or(0, |d| d.clicks);

    let average_daily = if daily.is_empty() {
        0.0
    } else {
        round1(total_clicks as f64 / daily.len() as f64)
    };

    Metrics {
        entry_id,
        short_code: short_code.to_string(),
        window,
        total_clicks,
        unique_visitors,
        click_rate: percentage(unique_visitors, total_clicks),
        peak_day,
        peak_clicks,
        average_daily,
        last_click_at,
        referrers: breakdown(events, |e| referrer_source(e.referrer.as_deref())),
        devices: breakdown(events, |e| e.device_class.label().to_string()),
        browsers: breakdown(events, |e| e.browser.clone()),
        operating_systems: breakdown(events, |e| e.os.clone()),
        countries: breakdown(events, |e| e.country.clone()),
        cities: breakdown(events, |e| e.city.clone()),
        daily,
    }
}

/// Read-side service over the click log. Never mutates registry state
/// except through the explicit [`AnalyticsService::purge_clicks`] hook.
pub struct AnalyticsService<E: EntryRepository, C: ClickRepository> {
    entries: Arc<E>,
    clicks: Arc<C>,
    clock: Arc<dyn Clock>,
    activity_limit: usize,
}

impl<E: EntryRepository, C: ClickRepository> AnalyticsService<E, C> {
    pub fn new(
        entries: Arc<E>,
        clicks: Arc<C>,
        clock: Arc<dyn Clock>,
        activity_limit: usize,
    ) -> Self {
        Self {
            entries,
            clicks,
            clock,
            activity_limit,
        }
    }

    /// Aggregates the clicks of `entry_id` inside `window`.
    ///
    /// Deleted and expired entries remain summarisable.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if no entry ever had this id.
    pub fn summarize(&self, entry_id: i64, window: TimeWindow) -> Result<Metrics, DomainError> {
        let entry = self
            .entries
            .find_by_id(entry_id)?
            .ok_or_else(|| DomainError::entry_not_found(entry_id))?;

        let events = self
            .clicks
            .clicks_for_entry(entry_id, Some(window.start), Some(window.end))?;

        let metrics = summarize_events(
            entry.id,
            &entry.short_code,
            window,
            &events,
            entry.last_click_at,
        );

        debug!(
            entry_id,
            total_clicks = metrics.total_clicks,
            unique_visitors = metrics.unique_visitors,
            "Analytics computed"
        );

        Ok(metrics)
    }

    /// [`Self::summarize`] over a preset range ending now.
    pub fn summarize_range(&self, entry_id: i64, range: TimeRange) -> Result<Metrics, DomainError> {
        self.summarize(entry_id, TimeWindow::last(range, self.clock.now()))
    }

    /// Newest-first feed of creations, clicks and expiries of non-deleted entries.
    pub fn recent_activity(&self) -> Result<Vec<Activity>, DomainError> {
        let now = self.clock.now();
        let entries = self.entries.list()?;
        let codes: HashMap<i64, &str> = entries
            .iter()
            .map(|e| (e.id, e.short_code.as_str()))
            .collect();

        let mut feed: Vec<Activity> = Vec::new();
        for entry in &entries {
            feed.push(Activity {
                kind: ActivityKind::Created,
                entry_id: entry.id,
                short_code: entry.short_code.clone(),
                at: entry.created_at,
            });
            if ExpirationPolicy::is_expired(entry, now) {
                feed.push(Activity {
                    kind: ActivityKind::Expired,
                    entry_id: entry.id,
                    short_code: entry.short_code.clone(),
                    at: entry.expires_at,
                });
            }
        }

        for event in self.clicks.recent_clicks(self.activity_limit)? {
            if let Some(code) = codes.get(&event.entry_id) {
                feed.push(Activity {
                    kind: ActivityKind::Clicked,
                    entry_id: event.entry_id,
                    short_code: (*code).to_string(),
                    at: event.timestamp,
                });
            }
        }

        feed.sort_by(|a, b| b.at.cmp(&a.at).then(b.entry_id.cmp(&a.entry_id)));
        feed.truncate(self.activity_limit);
        Ok(feed)
    }

    /// Drops the click log of `entry_id`. The click counter is kept.
    pub fn purge_clicks(&self, entry_id: i64) -> Result<usize, DomainError> {
        let removed = self.clicks.purge_clicks(entry_id)?;
        debug!(entry_id, removed, "Click log purged");
        Ok(removed)
    }
}
