/// Single-slot channel carrying the selected photo between screens
///
/// The gallery writes the selection as JSON; the customize screen takes it
/// exactly once when it opens. A new selection replaces any unread one, so
/// at most one handoff is ever pending. The slot lives only as long as the
/// process.
use std::sync::{Arc, Mutex};

use super::data::GalleryItem;

#[derive(Debug, Clone, Default)]
pub struct Handoff {
    slot: Arc<Mutex<Option<String>>>,
}

impl Handoff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the selection, replacing anything unread
    pub fn put(&self, item: &GalleryItem) -> Result<(), serde_json::Error> {
        let json = item.to_json()?;
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if slot.replace(json).is_some() {
            tracing::debug!("Replaced an unread selection");
        }
        Ok(())
    }

    /// Read and clear the slot
    ///
    /// An unreadable payload is dropped and reported as empty.
    pub fn take(&self) -> Option<GalleryItem> {
        let json = self
            .slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()?;

        match GalleryItem::from_json(&json) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Discarding unreadable selection: {}", e);
                None
            }
        }
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.slot
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    #[cfg(test)]
    pub(crate) fn put_raw(&self, json: &str) {
        *self.slot.lock().unwrap() = Some(json.to_string());
    }
}
