use std::sync::atomic::{AtomicBool, Ordering};

/// Counter store connectivity, last writer wins.
///
/// Written only by connection lifecycle events (connect, health check failure,
/// transport errors); read by request handlers to decide on the fallback path.
#[derive(Debug, Default)]
pub struct ConnectionState {
    up: AtomicBool,
}

impl ConnectionState {
    pub fn new(up: bool) -> Self {
        Self { up: AtomicBool::new(up) }
    }

    pub fn is_up(&self) -> bool {
        self.up.load(Ordering::Acquire)
    }

    /// Returns the previous value.
    pub fn mark_up(&self) -> bool {
        self.up.swap(true, Ordering::AcqRel)
    }

    /// Returns the previous value.
    pub fn mark_down(&self) -> bool {
        self.up.swap(false, Ordering::AcqRel)
    }
}
