//! CLI session layer.
//!
//! Wraps a PTY channel with HiOS prompt handling, pagination control,
//! per-command responses and the confirmation-driven profile download.

mod platform;
mod response;
mod retrieval;
mod shell;

pub use platform::{DISABLE_PAGINATION, Platform};
pub use response::Response;
pub use retrieval::{
    RawChannel, Retrieval, RetrievalPolicy, RetrievalStage, RetrievalState, extract_payload,
};
pub use shell::ShellSession;
