mod common;

use chrono::Duration;
use linkshrinker::application::services::{ActivityKind, CategoryCount, TimeRange, TimeWindow};
use linkshrinker::config::Config;
use linkshrinker::domain::clock::Clock;
use linkshrinker::domain::entities::{ClickContext, DeviceClass};
use linkshrinker::error::DomainError;
use linkshrinker::utils::code_generator::RandomCodeGenerator;
use std::sync::Arc;

fn assert_closes_to_100(rows: &[CategoryCount]) {
    if rows.is_empty() {
        return;
    }
    let sum: f64 = rows.iter().map(|r| r.percentage).sum();
    let tolerance = 0.05 * rows.len() as f64 + 1e-9;
    assert!(
        (sum - 100.0).abs() <= tolerance,
        "percentages sum to {sum}: {rows:?}"
    );
}

#[test]
fn test_metrics_over_a_week_of_clicks() {
    let (state, clock) = common::create_test_state();
    let entry = common::create_test_link(&state, "https://example.com", Some("stats"), 43_200);
    let start = clock.now();

    let contexts = [
        ClickContext::default()
            .with_device(DeviceClass::Desktop)
            .with_location("US", "New York")
            .with_referrer("https://www.google.com/"),
        ClickContext::default()
            .with_device(DeviceClass::Mobile)
            .with_location("DE", "Berlin")
            .with_referrer("https://twitter.com/x"),
        ClickContext::default()
            .with_device(DeviceClass::Tablet)
            .with_location("US", "Austin"),
    ];

    // Day 0: 3 clicks, day 2: 1 click, day 5: 3 clicks.
    for (day, ctx_idx) in [(0, 0), (0, 1), (0, 2), (2, 0), (5, 0), (5, 1), (5, 2)] {
        clock.set(start + Duration::days(day) + Duration::minutes(1));
        state
            .resolve_short_url("stats", contexts[ctx_idx].clone())
            .unwrap();
    }

    let window = TimeWindow::new(start, start + Duration::days(7)).unwrap();
    let metrics = state.get_analytics(entry.id, window).unwrap();

    assert_eq!(metrics.total_clicks, 7);
    assert_eq!(metrics.unique_visitors, 3);
    assert_eq!(metrics.click_rate, 42.9);
    // A window starting and ending at noon touches eight calendar days.
    assert_eq!(metrics.daily.len(), 8);
    assert_eq!(
        metrics.daily.iter().map(|d| d.clicks).collect::<Vec<_>>(),
        [3, 0, 1, 0, 0, 3, 0, 0]
    );
    assert_eq!(metrics.peak_day, Some(start.date_naive()));
    assert_eq!(metrics.peak_clicks, 3);
    assert_eq!(metrics.average_daily, 0.9);
    assert_eq!(
        metrics.last_click_at,
        Some(start + Duration::days(5) + Duration::minutes(1))
    );

    assert_eq!(metrics.countries[0].name, "US");
    assert_eq!(metrics.countries[0].count, 5);
    assert_eq!(metrics.countries[0].percentage, 71.4);
    assert_eq!(metrics.referrers[0].name, "google.com");

    for rows in [
        &metrics.referrers,
        &metrics.devices,
        &metrics.browsers,
        &metrics.operating_systems,
        &metrics.countries,
        &metrics.cities,
    ] {
        assert_closes_to_100(rows);
    }
}

#[test]
fn test_percentages_close_for_many_small_categories() {
    let (state, clock) = common::create_test_state();
    let entry = common::create_test_link(&state, "https://example.com", Some("many"), 600);

    for i in 0..7 {
        state
            .resolve_short_url(
                "many",
                ClickContext::default().with_location(format!("C{i}"), "City"),
            )
            .unwrap();
    }

    let metrics = state
        .get_analytics(
            entry.id,
            TimeWindow::new(clock.now() - Duration::hours(1), clock.now() + Duration::hours(1))
                .unwrap(),
        )
        .unwrap();

    assert_eq!(metrics.countries.len(), 7);
    assert!(metrics.countries.iter().all(|c| c.percentage == 14.3));
    assert_closes_to_100(&metrics.countries);
}

#[test]
fn test_window_excludes_outside_clicks() {
    let (state, clock) = common::create_test_state();
    let entry = common::create_test_link(&state, "https://example.com", Some("win"), 10_000);
    let start = clock.now();

    state.resolve_short_url("win", ClickContext::default()).unwrap();
    clock.advance(Duration::days(2));
    state.resolve_short_url("win", ClickContext::default()).unwrap();

    let window = TimeWindow::new(start + Duration::days(1), start + Duration::days(3)).unwrap();
    let metrics = state.get_analytics(entry.id, window).unwrap();

    assert_eq!(metrics.total_clicks, 1);
}

#[test]
fn test_no_clicks_reports_zeroes() {
    let (state, clock) = common::create_test_state();
    let entry = common::create_test_link(&state, "https://example.com", Some("quiet"), 60);

    let metrics = state
        .analytics
        .summarize_range(entry.id, TimeRange::Last7Days)
        .unwrap();

    assert_eq!(metrics.total_clicks, 0);
    assert_eq!(metrics.click_rate, 0.0);
    assert_eq!(metrics.peak_day, None);
    assert_eq!(metrics.window.end(), clock.now());
    assert!(metrics.daily.iter().all(|d| d.clicks == 0));
}

#[test]
fn test_deleted_entries_keep_their_analytics() {
    let (state, clock) = common::create_test_state();
    let entry = common::create_test_link(&state, "https://example.com", Some("hist"), 60);
    state.resolve_short_url("hist", ClickContext::default()).unwrap();
    state.delete_short_url(entry.id).unwrap();
    clock.advance(Duration::minutes(1));

    let metrics = state
        .analytics
        .summarize_range(entry.id, TimeRange::Last30Days)
        .unwrap();

    assert_eq!(metrics.total_clicks, 1);
}

#[test]
fn test_unknown_entry_and_bad_window() {
    let (state, clock) = common::create_test_state();

    assert!(matches!(
        state
            .analytics
            .summarize_range(404, TimeRange::Last30Days),
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        TimeWindow::new(clock.now(), clock.now() - Duration::seconds(1)),
        Err(DomainError::InvalidWindow { .. })
    ));
}

#[test]
fn test_purge_keeps_counter() {
    let (state, _clock) = common::create_test_state();
    let entry = common::create_test_link(&state, "https://example.com", Some("purge"), 60);
    for _ in 0..3 {
        state.resolve_short_url("purge", ClickContext::default()).unwrap();
    }

    assert_eq!(state.analytics.purge_clicks(entry.id).unwrap(), 3);

    let metrics = state
        .analytics
        .summarize_range(entry.id, TimeRange::Last7Days)
        .unwrap();
    assert_eq!(metrics.total_clicks, 0);
    assert_eq!(state.links.get(entry.id).unwrap().click_count, 3);
}

#[test]
fn test_recent_activity_feed() {
    let (state, clock) = common::create_test_state();

    let a = common::create_test_link(&state, "https://example.com/a", Some("first"), 5);
    clock.advance(Duration::minutes(1));
    let b = common::create_test_link(&state, "https://example.com/b", Some("second"), 60);
    clock.advance(Duration::minutes(1));
    state.resolve_short_url("second", ClickContext::default()).unwrap();
    clock.advance(Duration::minutes(10));

    let feed = state.analytics.recent_activity().unwrap();
    let summary: Vec<(ActivityKind, i64)> = feed.iter().map(|a| (a.kind, a.entry_id)).collect();

    assert_eq!(
        summary,
        [
            (ActivityKind::Expired, a.id),
            (ActivityKind::Clicked, b.id),
            (ActivityKind::Created, b.id),
            (ActivityKind::Created, a.id),
        ]
    );
}

#[test]
fn test_recent_activity_ignores_clicks_of_deleted_entries() {
    let config = Config {
        recent_activity_limit: 1,
        ..Config::default()
    };
    let (state, clock) = common::create_test_state_with(&config, Arc::new(RandomCodeGenerator));

    let live = common::create_test_link(&state, "https://example.com/live", Some("live"), 60);
    let gone = common::create_test_link(&state, "https://example.com/gone", Some("gone"), 60);

    clock.advance(Duration::minutes(1));
    state.resolve_short_url("live", ClickContext::default()).unwrap();
    for _ in 0..4 {
        clock.advance(Duration::minutes(1));
        state.resolve_short_url("gone", ClickContext::default()).unwrap();
    }
    state.delete_short_url(gone.id).unwrap();

    let feed = state.analytics.recent_activity().unwrap();

    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].kind, ActivityKind::Clicked);
    assert_eq!(feed[0].entry_id, live.id);
    assert_eq!(feed[0].short_code, "live");
    assert_eq!(feed[0].at, common::t0() + Duration::minutes(1));
}
