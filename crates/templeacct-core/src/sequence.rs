//! Request sequencing for report fragments
//!
//! Every regeneration of a report view takes a ticket before it calls the
//! backend. When the response arrives, only the newest ticket for that view
//! may replace the report; older responses are dropped.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Views not touched for this long are forgotten
pub const IDLE_VIEW_TTL: Duration = Duration::from_secs(30 * 60);

/// Proof of when a request for a view was started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub view_id: String,
    pub seq: u64,
}

#[derive(Debug)]
struct ViewEntry {
    latest: u64,
    touched: Instant,
}

#[derive(Debug)]
pub struct SequenceRegistry {
    views: Mutex<HashMap<String, ViewEntry>>,
    ttl: Duration,
}

impl Default for SequenceRegistry {
    fn default() -> Self {
        Self::new(IDLE_VIEW_TTL)
    }
}

impl SequenceRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            views: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Start a new request for `view_id`, superseding any earlier one
    pub fn issue(&self, view_id: &str) -> Ticket {
        let now = Instant::now();
        let mut views = self.views.lock().unwrap_or_else(|e| e.into_inner());
        let ttl = self.ttl;
        views.retain(|_, entry| now.duration_since(entry.touched) < ttl);

        let entry = views.entry(view_id.to_string()).or_insert(ViewEntry {
            latest: 0,
            touched: now,
        });
        entry.latest += 1;
        entry.touched = now;

        Ticket {
            view_id: view_id.to_string(),
            seq: entry.latest,
        }
    }

    /// True when no newer request for the same view has been issued
    pub fn is_latest(&self, ticket: &Ticket) -> bool {
        let views = self.views.lock().unwrap_or_else(|e| e.into_inner());
        views
            .get(&ticket.view_id)
            .map_or(true, |entry| entry.latest == ticket.seq)
    }

    /// Number of views currently tracked
    pub fn tracked_views(&self) -> usize {
        self.views.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
