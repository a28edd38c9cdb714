//! Background job domain entities.

pub mod message;
pub mod model;
pub mod status;

pub use message::JobMessage;
pub use model::{CreateJob, Job};
pub use status::{JobStatus, JobType};
