mod common;

use chrono::Duration;
use linkshrinker::application::services::{CreateShortUrl, ListQuery, SortOrder, StatusFilter};
use linkshrinker::config::Config;
use linkshrinker::domain::clock::Clock;
use linkshrinker::domain::entities::EntryStatus;
use linkshrinker::error::DomainError;
use std::collections::HashSet;
use std::sync::Arc;

#[test]
fn test_generated_code_shape() {
    let (state, _clock) = common::create_test_state();

    let entry = common::create_test_link(&state, "https://example.com/a", None, 30);

    assert_eq!(entry.short_code.len(), 6);
    assert!(entry.short_code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(entry.expires_at - entry.created_at, Duration::minutes(30));
    assert_eq!(entry.click_count, 0);
    assert!(entry.last_click_at.is_none());
}

#[test]
fn test_custom_code_too_short_then_duplicate() {
    let (state, _clock) = common::create_test_state();

    let err = state
        .create_short_url(CreateShortUrl::new("https://example.com", 30).with_custom_code("ab"))
        .unwrap_err();
    assert!(matches!(err, DomainError::TooShort { length: 2, min: 3 }));

    common::create_test_link(&state, "https://example.com/1", Some("valid_code"), 30);
    let err = state
        .create_short_url(
            CreateShortUrl::new("https://example.com/2", 30).with_custom_code("valid_code"),
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::DuplicateShortCode { code } if code == "valid_code"));

    assert_eq!(state.list_short_urls(&ListQuery::default()).unwrap().len(), 1);
}

#[test]
fn test_rejected_requests_leave_no_trace() {
    let (state, _clock) = common::create_test_state();

    for request in [
        CreateShortUrl::new("example.com", 30),
        CreateShortUrl::new("javascript:alert(1)", 30),
        CreateShortUrl::new("https://example.com", -1),
        CreateShortUrl::new("https://example.com", 30).with_custom_code("no spaces"),
    ] {
        assert!(state.create_short_url(request).unwrap_err().is_validation());
    }

    assert!(state.registry.is_empty());
}

#[test]
fn test_non_http_destinations_are_invalid_urls() {
    let (state, _clock) = common::create_test_state();

    for url in ["ftp://example.com/file", "mailto:a@b.com", "data:text/plain,hi"] {
        let err = state
            .create_short_url(CreateShortUrl::new(url, 30))
            .unwrap_err();
        assert!(
            matches!(&err, DomainError::InvalidUrl { url: rejected, reason }
                if rejected == url && reason == "Only HTTP and HTTPS protocols are allowed"),
            "{url} gave {err:?}"
        );
    }

    assert!(state.registry.is_empty());
}

#[test]
fn test_expired_code_can_be_reused() {
    let (state, clock) = common::create_test_state();

    let first = common::create_test_link(&state, "https://example.com/old", Some("promo"), 5);

    clock.advance(Duration::minutes(5));
    let second = common::create_test_link(&state, "https://example.com/new", Some("promo"), 5);

    assert_ne!(first.id, second.id);
    assert_eq!(state.links.lookup("promo").unwrap().id, second.id);
    // The superseded entry stays readable by id.
    assert_eq!(
        state.links.get(first.id).unwrap().original_url,
        "https://example.com/old"
    );
}

#[test]
fn test_max_ttl_comes_from_config() {
    let config = Config {
        max_ttl_minutes: 60,
        ..Config::default()
    };
    let (state, _clock) = common::create_test_state_with(
        &config,
        Arc::new(common::ScriptedGenerator::new(&["abc123"])),
    );

    assert!(state.create_short_url(CreateShortUrl::new("https://example.com", 60)).is_ok());
    assert!(matches!(
        state.create_short_url(CreateShortUrl::new("https://example.com", 61)),
        Err(DomainError::InvalidTtl { ttl_minutes: 61, max: 60 })
    ));
}

#[test]
fn test_generation_retries_then_exhausts() {
    let config = Config {
        code_generation_attempts: 3,
        ..Config::default()
    };
    let generator = Arc::new(common::ScriptedGenerator::new(&["aaaaaa", "aaaaaa", "bbbbbb"]));
    let (state, _clock) = common::create_test_state_with(&config, generator);

    let first = common::create_test_link(&state, "https://example.com/1", None, 30);
    assert_eq!(first.short_code, "aaaaaa");

    // Second create collides once, then lands on "bbbbbb".
    let second = common::create_test_link(&state, "https://example.com/2", None, 30);
    assert_eq!(second.short_code, "bbbbbb");

    // Every further draw is "bbbbbb": three collisions exhaust the budget.
    let err = state
        .create_short_url(CreateShortUrl::new("https://example.com/3", 30))
        .unwrap_err();
    assert_eq!(err, DomainError::GenerationExhausted { attempts: 3 });
}

#[test]
fn test_delete_frees_code_and_hides_entry() {
    let (state, _clock) = common::create_test_state();

    let entry = common::create_test_link(&state, "https://example.com", Some("gone"), 30);
    state.delete_short_url(entry.id).unwrap();

    assert!(state.list_short_urls(&ListQuery::default()).unwrap().is_empty());
    assert!(matches!(
        state.delete_short_url(entry.id),
        Err(DomainError::NotFound { .. })
    ));
    assert!(
        state
            .create_short_url(CreateShortUrl::new("https://example.org", 30).with_custom_code("gone"))
            .is_ok()
    );
}

#[test]
fn test_pause_and_resume() {
    let (state, clock) = common::create_test_state();
    let entry = common::create_test_link(&state, "https://example.com", Some("hold"), 30);

    let paused = state.links.pause(entry.id).unwrap();
    assert_eq!(paused.status(clock.now()), EntryStatus::Paused);

    let listed = state
        .list_short_urls(&ListQuery::new(StatusFilter::Paused, SortOrder::Newest))
        .unwrap();
    assert_eq!(listed.len(), 1);

    let resumed = state.links.resume(entry.id).unwrap();
    assert_eq!(resumed.status(clock.now()), EntryStatus::Active);
}

#[test]
fn test_list_filters_and_sorts() {
    let (state, clock) = common::create_test_state();

    let short = common::create_test_link(&state, "https://example.com/short", Some("short"), 10);
    clock.advance(Duration::minutes(1));
    let long = common::create_test_link(&state, "https://example.com/long", Some("long"), 120);
    clock.advance(Duration::minutes(1));
    let mid = common::create_test_link(&state, "https://example.com/mid", Some("mid"), 30);

    clock.advance(Duration::minutes(10));

    let ids = |status, sort| -> Vec<i64> {
        state
            .list_short_urls(&ListQuery::new(status, sort))
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect()
    };

    assert_eq!(ids(StatusFilter::All, SortOrder::Newest), [mid.id, long.id, short.id]);
    assert_eq!(ids(StatusFilter::All, SortOrder::Oldest), [short.id, long.id, mid.id]);
    assert_eq!(
        ids(StatusFilter::All, SortOrder::ExpiringSoonFirst),
        [mid.id, long.id, short.id]
    );
    assert_eq!(ids(StatusFilter::Expired, SortOrder::Newest), [short.id]);
    assert_eq!(ids(StatusFilter::Active, SortOrder::Oldest), [long.id, mid.id]);
}

#[test]
fn test_overview_totals() {
    let (state, clock) = common::create_test_state();

    common::create_test_link(&state, "https://example.com/a", Some("aaa"), 5);
    let b = common::create_test_link(&state, "https://example.com/b", Some("bbb"), 60);
    let c = common::create_test_link(&state, "https://example.com/c", Some("ccc"), 60);
    state.links.pause(c.id).unwrap();
    clock.advance(Duration::minutes(5));

    state
        .resolve_short_url(&b.short_code, Default::default())
        .unwrap();

    let overview = state.links.overview().unwrap();
    assert_eq!(overview.total, 3);
    assert_eq!(overview.active, 1);
    assert_eq!(overview.expired, 1);
    assert_eq!(overview.paused, 1);
    assert_eq!(overview.total_clicks, 1);
}

#[test]
fn test_concurrent_creates_of_one_code() {
    let (state, _clock) = common::create_test_state();

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let state = &state;
                s.spawn(move || {
                    state.create_short_url(
                        CreateShortUrl::new(format!("https://example.com/{i}"), 30)
                            .with_custom_code("race"),
                    )
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, DomainError::DuplicateShortCode { .. }))
    );
}

#[test]
fn test_concurrent_generated_codes_are_unique() {
    let (state, _clock) = common::create_test_state();

    std::thread::scope(|s| {
        for t in 0..8 {
            let state = &state;
            s.spawn(move || {
                for i in 0..50 {
                    common::create_test_link(state, &format!("https://example.com/{t}/{i}"), None, 30);
                }
            });
        }
    });

    let entries = state.list_short_urls(&ListQuery::default()).unwrap();
    let codes: HashSet<&str> = entries.iter().map(|e| e.short_code.as_str()).collect();
    assert_eq!(entries.len(), 400);
    assert_eq!(codes.len(), 400);
}
