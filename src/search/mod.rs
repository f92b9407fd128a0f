//! # Filter Queries
//!
//! The service answers filter requests asynchronously: a submission returns
//! a query ID, the status is polled until it reaches a terminal state, and
//! the result IDs are fetched separately.
//!
//! - [`QuerySession`] - explicit poll/wait/results control over one query
//! - [`Results`] - a whole search run on the calling thread or in the
//!   background, exposed as an ordered collection of compounds

mod request;
mod results;
mod session;
mod status;

pub use request::{SearchMode, SearchRequest};
pub use results::Results;
pub use session::{QuerySession, SessionState};
pub use status::QueryStatus;
