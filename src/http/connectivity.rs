//! Connectivity flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared online/offline flag, consulted before every api-class network
/// attempt. Cloning shares the flag.
#[derive(Debug, Clone)]
pub struct Connectivity(Arc<AtomicBool>);

impl Connectivity {
    pub fn online() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn offline() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn is_online(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn set_online(&self, online: bool) {
        self.0.store(online, Ordering::Release);
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::online()
    }
}
