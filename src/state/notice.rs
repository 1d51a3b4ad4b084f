/// Transient, non-blocking notices shown over either screen
use std::time::{Duration, Instant};

/// How long a notice stays on screen
pub const NOTICE_LIFETIME: Duration = Duration::from_secs(4);

/// Oldest notices are dropped beyond this many
const MAX_VISIBLE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: Level,
    pub text: String,
    posted_at: Instant,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Level::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(Level::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Level::Error, text)
    }

    fn new(level: Level, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            posted_at: Instant::now(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Notices {
    items: Vec<Notice>,
}

impl Notices {
    pub fn push(&mut self, notice: Notice) {
        match notice.level {
            Level::Error => tracing::warn!("Notice: {}", notice.text),
            _ => tracing::info!("Notice: {}", notice.text),
        }
        self.items.push(notice);
        if self.items.len() > MAX_VISIBLE {
            let overflow = self.items.len() - MAX_VISIBLE;
            self.items.drain(..overflow);
        }
    }

    pub fn extend(&mut self, notices: impl IntoIterator<Item = Notice>) {
        for notice in notices {
            self.push(notice);
        }
    }

    /// Drop notices older than their lifetime
    pub fn prune(&mut self, now: Instant) {
        self.items
            .retain(|n| now.saturating_duration_since(n.posted_at) < NOTICE_LIFETIME);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_expires_old_notices() {
        let mut notices = Notices::default();
        notices.push(Notice::info("hello"));
        notices.prune(Instant::now());
        assert!(!notices.is_empty());

        notices.prune(Instant::now() + NOTICE_LIFETIME + Duration::from_millis(1));
        assert!(notices.is_empty());
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut notices = Notices::default();
        for i in 0..6 {
            notices.push(Notice::error(format!("n{}", i)));
        }
        let texts: Vec<&str> = notices.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["n2", "n3", "n4", "n5"]);
    }
}
