//! Process-local state shared by the interception pipeline and the deep-link router.
//!
//! Every field is replaced as a whole (last write wins), so concurrent
//! interceptions never need a lock. A page start clears everything except the
//! active hostname.

use arc_swap::{ArcSwap, ArcSwapOption};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug)]
pub struct SessionState {
    active_hostname: ArcSwap<String>,
    pending_login_label: ArcSwapOption<String>,
    /// Capability token: the vendor bundle rewrite installed `window._hijackedMap`.
    map_handle: AtomicBool,
    /// `Some(true)` for a light status bar, `Some(false)` for dark, `None` until probed.
    light_status_bar: watch::Sender<Option<bool>>,
}

impl SessionState {
    pub fn new(active_hostname: impl Into<String>) -> Self {
        let (light_status_bar, _) = watch::channel(None);
        Self {
            active_hostname: ArcSwap::from_pointee(active_hostname.into()),
            pending_login_label: ArcSwapOption::empty(),
            map_handle: AtomicBool::new(false),
            light_status_bar,
        }
    }

    pub fn active_hostname(&self) -> Arc<String> {
        self.active_hostname.load_full()
    }

    pub fn set_active_hostname(&self, host: impl Into<String>) {
        self.active_hostname.store(Arc::new(host.into()));
    }

    pub fn is_active_host(&self, host: &str) -> bool {
        self.active_hostname.load().as_str() == host
    }

    pub fn pending_login_label(&self) -> Option<Arc<String>> {
        self.pending_login_label.load_full()
    }

    pub fn set_pending_login_label(&self, label: impl Into<String>) {
        self.pending_login_label.store(Some(Arc::new(label.into())));
    }

    pub fn has_map_handle(&self) -> bool {
        self.map_handle.load(Ordering::Acquire)
    }

    pub fn install_map_handle(&self) {
        self.map_handle.store(true, Ordering::Release);
    }

    pub fn light_status_bar(&self) -> Option<bool> {
        *self.light_status_bar.borrow()
    }

    pub fn set_light_status_bar(&self, light: bool) {
        self.light_status_bar.send_replace(Some(light));
    }

    /// Receiver the embedding surface can watch to restyle its status bar.
    pub fn subscribe_appearance(&self) -> watch::Receiver<Option<bool>> {
        self.light_status_bar.subscribe()
    }

    /// Clears page-scoped data before a new page begins loading.
    pub fn reset_for_new_page(&self) {
        self.pending_login_label.store(None);
        self.map_handle.store(false, Ordering::Release);
        self.light_status_bar.send_replace(None);
    }
}
