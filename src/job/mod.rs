mod input;
mod status;
mod types;

pub use input::{Engine, Input, partition_inputs};
pub use status::{JobStatus, JobStatusCode};
pub use types::{Conversion, Job, JobSpec, Output, StatusInfo};
