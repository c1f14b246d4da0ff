// crates/client/src/page.rs

//! Mounting every kind present on a page.
//!
//! Synchronizers are not mounted while the page is still loading: mounting
//! waits for an idle signal, or for a timeout if idle never comes. A kind
//! whose markup is absent is skipped; a kind that fails to mount for any other
//! reason is logged and skipped too, so the rendered list stays usable.

use std::time::Duration;

use tracing::{debug, warn};

use crate::dom::Dom;
use crate::engine::{Synchronizer, UiEvent};
use crate::history::History;
use crate::kinds::KindConfig;
use crate::SyncError;

/// Fallback delay before mounting when no idle signal arrives.
pub const MOUNT_TIMEOUT: Duration = Duration::from_millis(1500);

#[derive(Debug)]
pub struct PageFilters {
    pending: Vec<KindConfig>,
    mounted: Vec<Synchronizer>,
    waited: Duration,
    timeout: Duration,
}

impl PageFilters {
    pub fn new(kinds: Vec<KindConfig>) -> Self {
        Self {
            pending: kinds,
            mounted: Vec::new(),
            waited: Duration::ZERO,
            timeout: MOUNT_TIMEOUT,
        }
    }

    /// Articles, projects, videos and FAQs.
    pub fn standard() -> Self {
        Self::new(vec![
            KindConfig::articles(),
            KindConfig::projects(),
            KindConfig::videos(),
            KindConfig::faqs(),
        ])
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_mounted(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn synchronizers(&self) -> &[Synchronizer] {
        &self.mounted
    }

    pub fn synchronizer(&self, name: &str) -> Option<&Synchronizer> {
        self.mounted.iter().find(|s| s.name() == name)
    }

    /// The page reported idle: mount now.
    pub fn on_idle<D, H>(&mut self, dom: &mut D, history: &mut H)
    where
        D: Dom + ?Sized,
        H: History + ?Sized,
    {
        self.mount_pending(dom, history);
    }

    /// Time passed without an idle signal; mounts once the timeout is reached.
    pub fn tick<D, H>(&mut self, elapsed: Duration, dom: &mut D, history: &mut H)
    where
        D: Dom + ?Sized,
        H: History + ?Sized,
    {
        if self.pending.is_empty() {
            return;
        }
        self.waited += elapsed;
        if self.waited >= self.timeout {
            debug!(waited = ?self.waited, "no idle signal, mounting on timeout");
            self.mount_pending(dom, history);
        }
    }

    fn mount_pending<D, H>(&mut self, dom: &mut D, history: &mut H)
    where
        D: Dom + ?Sized,
        H: History + ?Sized,
    {
        for config in std::mem::take(&mut self.pending) {
            let name = config.name.clone();
            match Synchronizer::mount(config, dom, history) {
                Ok(sync) => self.mounted.push(sync),
                Err(SyncError::NotFound(selector)) => {
                    debug!(kind = %name, %selector, "kind not on this page");
                }
                Err(err) => {
                    warn!(kind = %name, error = %err, "filter unavailable, leaving list as rendered");
                }
            }
        }
    }

    /// Route one event to the first synchronizer that claims it.
    pub fn handle<D, H>(&mut self, dom: &mut D, history: &mut H, event: UiEvent) -> bool
    where
        D: Dom + ?Sized,
        H: History + ?Sized,
    {
        self.mounted
            .iter_mut()
            .any(|sync| sync.handle(dom, history, event))
    }

    /// Drain container mutations for every mounted kind.
    pub fn pump<D, H>(&mut self, dom: &mut D, history: &mut H) -> usize
    where
        D: Dom + ?Sized,
        H: History + ?Sized,
    {
        self.mounted
            .iter_mut()
            .map(|sync| sync.pump(dom, history))
            .filter(|ran| *ran)
            .count()
    }

    pub fn unmount_all<D: Dom + ?Sized>(&mut self, dom: &mut D) {
        for sync in self.mounted.drain(..) {
            sync.unmount(dom);
        }
    }
}
