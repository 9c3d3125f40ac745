use std::sync::atomic::{AtomicU64, Ordering};

/// Mints unique element identifiers for rendered output.
///
/// One allocator is created per session and shared by every renderer; ids are never reused.
pub trait IdAllocator: Send + Sync {
    fn next_id(&self) -> String;
}

/// `"{prefix}-{n}"` ids with a strictly increasing counter starting at 1.
#[derive(Debug)]
pub struct SequentialIdAllocator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdAllocator {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let prefix = if prefix.trim().is_empty() {
            "figura".to_string()
        } else {
            prefix
        };
        Self {
            prefix,
            counter: AtomicU64::new(0),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

impl Default for SequentialIdAllocator {
    fn default() -> Self {
        Self::new("figura")
    }
}

impl IdAllocator for SequentialIdAllocator {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{n}", self.prefix)
    }
}
