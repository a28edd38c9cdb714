//! Request payloads carried by payload-bearing jobs.

pub mod batch;
pub mod work;

pub use batch::BatchTranslateRequest;
pub use work::{WorkAssignment, WorkAssignmentRequest};
