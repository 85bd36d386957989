//! In-memory implementation of the registry repositories.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::domain::entities::{ClickEvent, Entry, NewEntry};
use crate::domain::expiration::ExpirationPolicy;
use crate::domain::repositories::{ClickRepository, EntryRepository};
use crate::error::DomainError;
use crate::infrastructure::persistence::snapshot::Snapshot;

/// Lock-guarded registry of entries, the code index and the click log.
///
/// One `RwLock` covers all three structures, so code reservation, click
/// recording and deletion are each a single critical section and readers
/// never observe a half-applied mutation.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    state: RwLock<RegistryState>,
}

#[derive(Debug)]
struct RegistryState {
    next_id: i64,
    entries: HashMap<i64, Entry>,
    /// Short code → id of the entry currently holding it. Deleted entries are
    /// never indexed; expired ones stay until superseded.
    code_index: HashMap<String, i64>,
    clicks: HashMap<i64, Vec<ClickEvent>>,
}

impl Default for RegistryState {
    fn default() -> Self {
        Self {
            next_id: 1,
            entries: HashMap::new(),
            code_index: HashMap::new(),
            clicks: HashMap::new(),
        }
    }
}

impl RegistryState {
    fn live_entry_mut(&mut self, id: i64) -> Result<&mut Entry, DomainError> {
        self.entries
            .get_mut(&id)
            .filter(|entry| !entry.is_deleted())
            .ok_or_else(|| DomainError::entry_not_found(id))
    }
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a registry from persisted state.
    ///
    /// For each short code the newest non-deleted entry is indexed.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Snapshot`] on duplicate entry ids, an id of
    /// `i64::MAX` (no successor to continue the sequence from) or click
    /// events that reference unknown entries.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, DomainError> {
        let mut state = RegistryState::default();

        for entry in snapshot.entries {
            let id = entry.id;
            if state.entries.insert(id, entry).is_some() {
                return Err(DomainError::Snapshot(format!("duplicate entry id {id}")));
            }
            let after = id
                .checked_add(1)
                .ok_or_else(|| DomainError::Snapshot(format!("entry id {id} is out of range")))?;
            state.next_id = state.next_id.max(after);
        }

        let mut live: Vec<&Entry> = state.entries.values().filter(|e| !e.is_deleted()).collect();
        live.sort_by_key(|e| e.id);
        let code_index = live
            .into_iter()
            .map(|e| (e.short_code.clone(), e.id))
            .collect();
        state.code_index = code_index;

        for click in snapshot.clicks {
            if !state.entries.contains_key(&click.entry_id) {
                return Err(DomainError::Snapshot(format!(
                    "click event references unknown entry {}",
                    click.entry_id
                )));
            }
            state.clicks.entry(click.entry_id).or_default().push(click);
        }

        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Captures the full registry state, entries in id order and clicks in
    /// timestamp order.
    pub fn to_snapshot(&self) -> Snapshot {
        let state = self.state.read();

        let mut entries: Vec<Entry> = state.entries.values().cloned().collect();
        entries.sort_by_key(|e| e.id);

        let mut clicks: Vec<ClickEvent> = state.clicks.values().flatten().cloned().collect();
        clicks.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then(a.entry_id.cmp(&b.entry_id))
        });

        Snapshot::new(entries, clicks)
    }

    /// Number of entries ever registered, including deleted ones.
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EntryRepository for InMemoryRegistry {
    fn insert(&self, new_entry: NewEntry) -> Result<Entry, DomainError> {
        let mut state = self.state.write();

        if let Some(holder) = state
            .code_index
            .get(&new_entry.short_code)
            .and_then(|id| state.entries.get(id))
            && !ExpirationPolicy::is_expired(holder, new_entry.created_at)
        {
            return Err(DomainError::DuplicateShortCode {
                code: new_entry.short_code,
            });
        }

        let id = state.next_id;
        state.next_id += 1;

        let entry = Entry::new(id, new_entry);
        state.code_index.insert(entry.short_code.clone(), id);
        state.entries.insert(id, entry.clone());

        Ok(entry)
    }

    fn find_by_code(&self, code: &str) -> Result<Option<Entry>, DomainError> {
        let state = self.state.read();
        Ok(state
            .code_index
            .get(code)
            .and_then(|id| state.entries.get(id))
            .cloned())
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Entry>, DomainError> {
        Ok(self.state.read().entries.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Entry>, DomainError> {
        let state = self.state.read();
        let mut entries: Vec<Entry> = state
            .entries
            .values()
            .filter(|e| !e.is_deleted())
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.id);
        Ok(entries)
    }

    fn record_click(&self, event: ClickEvent) -> Result<Entry, DomainError> {
        let mut state = self.state.write();

        let entry = state.live_entry_mut(event.entry_id)?;
        if !entry.is_resolvable(event.timestamp) {
            return Err(DomainError::Expired {
                code: entry.short_code.clone(),
            });
        }

        entry.click_count += 1;
        entry.last_click_at = Some(
            entry
                .last_click_at
                .map_or(event.timestamp, |last| last.max(event.timestamp)),
        );
        let updated = entry.clone();

        state.clicks.entry(event.entry_id).or_default().push(event);

        Ok(updated)
    }

    fn delete(&self, id: i64, at: DateTime<Utc>) -> Result<Entry, DomainError> {
        let mut state = self.state.write();

        let entry = state.live_entry_mut(id)?;
        entry.deleted_at = Some(at);
        let deleted = entry.clone();

        if state.code_index.get(&deleted.short_code) == Some(&id) {
            state.code_index.remove(&deleted.short_code);
        }

        Ok(deleted)
    }

    fn set_paused(&self, id: i64, paused: bool) -> Result<Entry, DomainError> {
        let mut state = self.state.write();
        let entry = state.live_entry_mut(id)?;
        entry.paused = paused;
        Ok(entry.clone())
    }
}

impl ClickRepository for InMemoryRegistry {
    fn clicks_for_entry(
        &self,
        entry_id: i64,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<ClickEvent>, DomainError> {
        let state = self.state.read();

        let mut events: Vec<ClickEvent> = state
            .clicks
            .get(&entry_id)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| from.is_none_or(|from| e.timestamp >= from))
                    .filter(|e| to.is_none_or(|to| e.timestamp < to))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        events.sort_by_key(|e| e.timestamp);

        Ok(events)
    }

    fn recent_clicks(&self, limit: usize) -> Result<Vec<ClickEvent>, DomainError> {
        let state = self.state.read();

        let mut events: Vec<&ClickEvent> = state
            .clicks
            .iter()
            .filter(|(id, _)| state.entries.get(*id).is_some_and(|e| !e.is_deleted()))
            .flat_map(|(_, events)| events)
            .collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(events.into_iter().take(limit).cloned().collect())
    }

    fn purge_clicks(&self, entry_id: i64) -> Result<usize, DomainError> {
        let mut state = self.state.write();
        Ok(state.clicks.remove(&entry_id).map_or(0, |events| events.len()))
    }
}
