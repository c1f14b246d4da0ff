pub mod cli;
pub mod router;

mod error;

pub use error::EdgeError;
