#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use linkshrinker::application::services::CreateShortUrl;
use linkshrinker::config::Config;
use linkshrinker::domain::clock::ManualClock;
use linkshrinker::domain::entities::Entry;
use linkshrinker::infrastructure::persistence::InMemoryRegistry;
use linkshrinker::state::AppState;
use linkshrinker::utils::code_generator::{CodeGenerator, RandomCodeGenerator};
use parking_lot::Mutex;
use std::sync::Arc;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 24, 12, 0, 0).unwrap()
}

/// Hands out a fixed list of codes, repeating the last one forever.
pub struct ScriptedGenerator {
    codes: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(codes: &[&str]) -> Self {
        let mut codes: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
        codes.reverse();
        Self {
            codes: Mutex::new(codes),
        }
    }
}

impl CodeGenerator for ScriptedGenerator {
    fn generate(&self) -> String {
        let mut codes = self.codes.lock();
        if codes.len() > 1 {
            codes.pop().unwrap()
        } else {
            codes[0].clone()
        }
    }
}

pub fn create_test_state_with(
    config: &Config,
    generator: Arc<dyn CodeGenerator>,
) -> (AppState, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let state = AppState::with_parts(
        config,
        Arc::new(InMemoryRegistry::new()),
        clock.clone(),
        generator,
    );
    (state, clock)
}

pub fn create_test_state() -> (AppState, Arc<ManualClock>) {
    create_test_state_with(&Config::default(), Arc::new(RandomCodeGenerator))
}

pub fn create_test_link(state: &AppState, url: &str, code: Option<&str>, ttl: i64) -> Entry {
    let mut request = CreateShortUrl::new(url, ttl);
    if let Some(code) = code {
        request = request.with_custom_code(code);
    }
    state.create_short_url(request).unwrap()
}
