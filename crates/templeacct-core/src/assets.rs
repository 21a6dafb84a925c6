//! Reference-counted page stylesheet registry
//!
//! Page components acquire the stylesheets they need and hold the returned
//! lease while they are on the page. The page shell links every stylesheet
//! that still has a live lease, once, in first-acquired order.

use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Entry {
    href: String,
    leases: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    entries: Arc<Mutex<Vec<Entry>>>,
}

/// Keeps a stylesheet linked until dropped
#[derive(Debug)]
#[must_use = "the stylesheet is released as soon as the lease is dropped"]
pub struct AssetLease {
    registry: AssetRegistry,
    href: String,
}

impl AssetLease {
    pub fn href(&self) -> &str {
        &self.href
    }
}

impl Drop for AssetLease {
    fn drop(&mut self) {
        self.registry.release(&self.href);
    }
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, href: &str) -> AssetLease {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.iter_mut().find(|entry| entry.href == href) {
            Some(entry) => entry.leases += 1,
            None => entries.push(Entry {
                href: href.to_string(),
                leases: 1,
            }),
        }
        AssetLease {
            registry: self.clone(),
            href: href.to_string(),
        }
    }

    fn release(&self, href: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.iter_mut().find(|entry| entry.href == href) {
            entry.leases = entry.leases.saturating_sub(1);
        }
        entries.retain(|entry| entry.leases > 0);
    }

    pub fn ref_count(&self, href: &str) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .iter()
            .find(|entry| entry.href == href)
            .map_or(0, |entry| entry.leases)
    }

    /// Stylesheets with at least one live lease
    pub fn loaded(&self) -> Vec<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().map(|entry| entry.href.clone()).collect()
    }
}
