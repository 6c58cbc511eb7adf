//! Observable in-memory watchlist.
//!
//! Views subscribe to typed change events instead of polling shared storage.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// An item in the watchlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistItem {
    pub symbol: String,
    pub added_at: DateTime<Utc>,
    #[serde(skip)]
    seq: u64,
}

/// Change notification published to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum WatchlistEvent {
    Added(WatchlistItem),
    Removed(String),
}

pub struct WatchlistStore {
    items: DashMap<String, WatchlistItem>,
    next_seq: AtomicU64,
    events: broadcast::Sender<WatchlistEvent>,
}

impl Default for WatchlistStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchlistStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            items: DashMap::new(),
            next_seq: AtomicU64::new(0),
            events,
        }
    }

    /// Receive every change made after this call
    pub fn subscribe(&self) -> broadcast::Receiver<WatchlistEvent> {
        self.events.subscribe()
    }

    /// Add a symbol. Returns false (and publishes nothing) if it was already present.
    pub fn add(&self, symbol: &str) -> bool {
        let symbol = normalize(symbol);
        if symbol.is_empty() {
            return false;
        }

        let item = match self.items.entry(symbol.clone()) {
            Entry::Occupied(_) => return false,
            Entry::Vacant(slot) => {
                let item = WatchlistItem {
                    symbol,
                    added_at: Utc::now(),
                    seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                };
                slot.insert(item.clone());
                item
            }
        };

        tracing::debug!("Watchlist add {}", item.symbol);
        // No subscribers is fine
        let _ = self.events.send(WatchlistEvent::Added(item));
        true
    }

    /// Remove a symbol. Returns false (and publishes nothing) if it was absent.
    pub fn remove(&self, symbol: &str) -> bool {
        let symbol = normalize(symbol);
        match self.items.remove(&symbol) {
            Some((symbol, _)) => {
                tracing::debug!("Watchlist remove {}", symbol);
                let _ = self.events.send(WatchlistEvent::Removed(symbol));
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.items.contains_key(&normalize(symbol))
    }

    /// Snapshot in insertion order
    pub fn items(&self) -> Vec<WatchlistItem> {
        let mut items: Vec<WatchlistItem> = self.items.iter().map(|e| e.value().clone()).collect();
        items.sort_by_key(|item| item.seq);
        items
    }

    pub fn symbols(&self) -> Vec<String> {
        self.items().into_iter().map(|item| item.symbol).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn normalize(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
