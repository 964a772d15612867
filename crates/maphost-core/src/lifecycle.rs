//! Readiness gate for work that must run against a live page.
//!
//! Deep links and the theme probe suspend here instead of blocking the caller.
//! Each navigation start bumps the generation; a continuation scheduled for an
//! older generation is abandoned when it wakes up.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageState {
    /// Incremented on every navigation start.
    pub generation: u64,
    /// True once the hosting surface exists and accepts scripts/loads.
    pub surface_ready: bool,
}

#[derive(Debug, Clone)]
pub struct PageLifecycle {
    state: Arc<watch::Sender<PageState>>,
}

impl Default for PageLifecycle {
    fn default() -> Self {
        let (tx, _) = watch::channel(PageState::default());
        Self { state: Arc::new(tx) }
    }
}

impl PageLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> PageState {
        *self.state.borrow()
    }

    pub fn generation(&self) -> u64 {
        self.current().generation
    }

    /// Marks the surface ready and wakes all suspended continuations.
    pub fn mark_ready(&self) {
        self.state.send_modify(|s| s.surface_ready = true);
    }

    /// Surface torn down; later continuations wait for the next `mark_ready`.
    pub fn mark_torn_down(&self) {
        self.state.send_modify(|s| {
            s.surface_ready = false;
            s.generation += 1;
        });
    }

    /// Starts a new page load; returns the new generation.
    pub fn begin_page(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|s| {
            s.generation += 1;
            generation = s.generation;
        });
        generation
    }

    /// Suspends until the surface is ready, whatever page it shows.
    pub async fn until_surface_ready(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|s| s.surface_ready).await;
    }

    /// Suspends until the surface is ready while still on `generation`.
    ///
    /// Returns `false` when the page navigated away first.
    pub async fn until_ready_for(&self, generation: u64) -> bool {
        let mut rx = self.state.subscribe();
        let ready = match rx
            .wait_for(|s| s.generation != generation || s.surface_ready)
            .await
        {
            Ok(state) => state.generation == generation && state.surface_ready,
            Err(_) => false,
        };
        ready
    }
}
