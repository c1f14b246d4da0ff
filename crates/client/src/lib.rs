//! Client filter synchronizer.
//!
//! Re-applies the discovery filter over already rendered item markup instead
//! of re-querying the server. The rendering layer sits behind [`dom::Dom`]
//! (an in-memory implementation lives in [`memory`]); URL state sits behind
//! [`history::History`]. One [`engine::Synchronizer`] runs per content kind,
//! parameterized by a [`kinds::KindConfig`]; [`page::PageFilters`] mounts
//! them once the page is idle.

pub mod chips;
pub mod dom;
pub mod engine;
pub mod history;
pub mod kinds;
pub mod memory;
pub mod page;
pub mod selector;
pub mod url;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("no element matches `{0}`")]
    NotFound(String),

    #[error("markup error: {0}")]
    Markup(String),
}
