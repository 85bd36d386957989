//! Filtering, search and ordering of registry listings.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::str::FromStr;

use crate::domain::entities::{Entry, EntryStatus};
use crate::domain::expiration::ExpirationPolicy;

/// Status filter for [`ListQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Expired,
    Paused,
}

impl StatusFilter {
    pub fn matches(&self, status: EntryStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => status == EntryStatus::Active,
            Self::Expired => status == EntryStatus::Expired,
            Self::Paused => status == EntryStatus::Paused,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "paused" => Ok(Self::Paused),
            other => Err(format!(
                "unknown status filter '{other}', expected all, active, expired or paused"
            )),
        }
    }
}

/// Sort order for [`ListQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    MostClicks,
    /// Live entries by ascending expiry, then every expired entry.
    ExpiringSoonFirst,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "most_clicks" | "mostclicks" => Ok(Self::MostClicks),
            "expiring_soon" | "expiring_soon_first" | "expiringsoonfirst" => {
                Ok(Self::ExpiringSoonFirst)
            }
            other => Err(format!(
                "unknown sort order '{other}', expected newest, oldest, most_clicks or expiring_soon"
            )),
        }
    }
}

/// Listing parameters: status filter, sort order and optional search term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub status: StatusFilter,
    pub sort: SortOrder,
    /// Case-insensitive substring matched against the original URL or short code.
    pub search: Option<String>,
}

impl ListQuery {
    pub fn new(status: StatusFilter, sort: SortOrder) -> Self {
        Self {
            status,
            sort,
            search: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = (!search.trim().is_empty()).then_some(search);
        self
    }

    /// Filters and orders `entries` as seen at `now`.
    pub fn apply(&self, entries: Vec<Entry>, now: DateTime<Utc>) -> Vec<Entry> {
        let needle = self.search.as_deref().map(|s| s.trim().to_lowercase());

        let mut selected: Vec<Entry> = entries
            .into_iter()
            .filter(|e| self.status.matches(e.status(now)))
            .filter(|e| match &needle {
                Some(needle) => {
                    e.original_url.to_lowercase().contains(needle)
                        || e.short_code.to_lowercase().contains(needle)
                }
                None => true,
            })
            .collect();

        selected.sort_by(|a, b| compare(self.sort, a, b, now));
        selected
    }
}

fn compare(sort: SortOrder, a: &Entry, b: &Entry, now: DateTime<Utc>) -> Ordering {
    match sort {
        SortOrder::Newest => b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)),
        SortOrder::Oldest => a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)),
        SortOrder::MostClicks => b
            .click_count
            .cmp(&a.click_count)
            .then(b.created_at.cmp(&a.created_at))
            .then(b.id.cmp(&a.id)),
        SortOrder::ExpiringSoonFirst => {
            let a_expired = ExpirationPolicy::is_expired(a, now);
            let b_expired = ExpirationPolicy::is_expired(b, now);
            match (a_expired, b_expired) {
                (true, true) => a.id.cmp(&b.id),
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => a.expires_at.cmp(&b.expires_at).then(a.id.cmp(&b.id)),
            }
        }
    }
}

/// Registry-wide counters for dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryOverview {
    pub total: usize,
    pub active: usize,
    pub expired: usize,
    pub paused: usize,
    pub total_clicks: u64,
}

impl RegistryOverview {
    pub fn from_entries(entries: &[Entry], now: DateTime<Utc>) -> Self {
        entries.iter().fold(Self::default(), |mut acc, entry| {
            acc.total += 1;
            acc.total_clicks += entry.click_count;
            match entry.status(now) {
                EntryStatus::Active => acc.active += 1,
                EntryStatus::Expired => acc.expired += 1,
                EntryStatus::Paused => acc.paused += 1,
            }
            acc
        })
    }
}
