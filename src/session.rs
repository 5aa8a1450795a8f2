//! Last published chart per device, guarded by fetch generations.
//!
//! Each chart fetch takes a [`Ticket`] before calling the backend. A finished
//! fetch always answers its own caller, but it is stored as the device's
//! current chart only if no newer ticket has been stored in the meantime, so
//! a slow, older response never replaces a newer one. Failed fetches store
//! nothing, and a device gets an entry only once one of its fetches succeeds.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::models::{Chart, ChartRequest};

// ---

/// Proof that a fetch was started, carrying its generation number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A chart together with the fetch that produced it.
#[derive(Debug, Clone)]
pub struct PublishedChart {
    pub generation: u64,
    pub request: ChartRequest,
    pub chart: Chart,
}

impl PublishedChart {
    pub fn new(ticket: Ticket, request: ChartRequest, chart: Chart) -> Self {
        Self {
            generation: ticket.generation,
            request,
            chart,
        }
    }
}

/// Outcome of [`ChartSessions::publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    /// The chart is now the device's current chart.
    Stored,
    /// A newer fetch is already stored under this generation.
    Superseded(u64),
}

#[derive(Debug, Clone, Default)]
pub struct ChartSessions {
    next_generation: Arc<AtomicU64>,
    current: Arc<Mutex<HashMap<String, Arc<PublishedChart>>>>,
}

impl ChartSessions {
    pub fn begin(&self) -> Ticket {
        Ticket {
            generation: self.next_generation.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }

    pub fn publish(&self, published: Arc<PublishedChart>) -> Publish {
        // ---
        let mut current = lock(&self.current);
        let device_id = &published.request.device_id;

        if let Some(existing) = current.get(device_id) {
            if existing.generation > published.generation {
                tracing::debug!(
                    "Not storing chart generation {} for {}, generation {} is newer",
                    published.generation,
                    device_id,
                    existing.generation
                );
                return Publish::Superseded(existing.generation);
            }
        }

        current.insert(device_id.clone(), published);
        Publish::Stored
    }

    pub fn current(&self, device_id: &str) -> Option<Arc<PublishedChart>> {
        lock(&self.current).get(device_id).cloned()
    }

    /// Number of devices with a stored chart.
    pub fn len(&self) -> usize {
        lock(&self.current).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::Selection;
    use chrono::{TimeZone, Utc};

    fn published(ticket: Ticket, device_id: &str, rows: usize) -> Arc<PublishedChart> {
        // ---
        let request = ChartRequest::new(
            device_id,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap()),
            Selection::default(),
        )
        .unwrap();
        let chart = Chart {
            labels: vec![Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(); rows],
            series: Vec::new(),
        };
        Arc::new(PublishedChart::new(ticket, request, chart))
    }

    #[test]
    fn test_tickets_increase() {
        // ---
        let sessions = ChartSessions::default();
        let first = sessions.begin();
        let second = sessions.begin();
        assert!(second.generation() > first.generation());
    }

    #[test]
    fn test_stale_fetch_cannot_overwrite_newer_chart() {
        // ---
        let sessions = ChartSessions::default();
        let older = sessions.begin();
        let newer = sessions.begin();

        assert_eq!(sessions.publish(published(newer, "m1", 2)), Publish::Stored);
        assert_eq!(
            sessions.publish(published(older, "m1", 5)),
            Publish::Superseded(newer.generation())
        );
        assert_eq!(sessions.current("m1").unwrap().chart.labels.len(), 2);
    }

    #[test]
    fn test_in_order_fetches_replace_each_other() {
        // ---
        let sessions = ChartSessions::default();
        let first = sessions.begin();
        sessions.publish(published(first, "m1", 1));
        let second = sessions.begin();
        sessions.publish(published(second, "m1", 3));

        let current = sessions.current("m1").unwrap();
        assert_eq!(current.generation, second.generation());
        assert_eq!(current.chart.labels.len(), 3);
    }

    #[test]
    fn test_charts_are_per_device() {
        // ---
        let sessions = ChartSessions::default();
        let older = sessions.begin();
        let newer = sessions.begin();

        // A newer chart for another device does not block this one.
        assert_eq!(sessions.publish(published(newer, "b", 1)), Publish::Stored);
        assert_eq!(sessions.publish(published(older, "a", 4)), Publish::Stored);
        assert_eq!(sessions.current("a").unwrap().chart.labels.len(), 4);
        assert!(sessions.current("c").is_none());
    }

    #[test]
    fn test_unpublished_tickets_leave_no_entries() {
        // ---
        let sessions = ChartSessions::default();
        for _ in 0..10_000 {
            sessions.begin();
        }
        assert!(sessions.is_empty());

        let ticket = sessions.begin();
        sessions.publish(published(ticket, "m1", 1));
        assert_eq!(sessions.len(), 1);
    }
}
