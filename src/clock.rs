//! Cross-platform wall clock used for solver deadlines and request timing.

/// Tracks elapsed time since creation and an optional deadline
#[derive(Clone, Copy, Debug)]
pub struct TimeTracker {
    #[cfg(not(target_arch = "wasm32"))]
    start: std::time::Instant,
    #[cfg(target_arch = "wasm32")]
    start_ms: f64,
    limit_ms: Option<u64>,
}

impl TimeTracker {
    pub fn new(limit_ms: Option<u64>) -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            start: std::time::Instant::now(),
            #[cfg(target_arch = "wasm32")]
            start_ms: now_ms(),
            limit_ms,
        }
    }

    /// A tracker with no deadline, for timing only
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn limit_ms(&self) -> Option<u64> {
        self.limit_ms
    }

    pub fn elapsed_secs(&self) -> f64 {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.start.elapsed().as_secs_f64()
        }
        #[cfg(target_arch = "wasm32")]
        {
            (now_ms() - self.start_ms) / 1000.0
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.limit_ms {
            None => false,
            Some(limit) => self.elapsed_secs() * 1000.0 >= limit as f64,
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_never_expires() {
        let timer = TimeTracker::unbounded();
        assert!(!timer.is_expired());
        assert_eq!(timer.limit_ms(), None);
        assert!(timer.elapsed_secs() >= 0.0);
    }

    #[test]
    fn test_zero_limit_expires_immediately() {
        let timer = TimeTracker::new(Some(0));
        assert!(timer.is_expired());
    }
}
