//! Client for the api2convert file-conversion service.
//!
//! Jobs are created and processed remotely; this crate sends the requests,
//! uploads local files, polls a job until it reaches an awaited status and
//! validates webhook payloads. [`Api`] bundles every endpoint over one
//! [`RequestExecutor`](client::RequestExecutor).

pub mod api;
pub mod callback;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod job;

pub use api::Api;
pub use callback::CallbackHandler;
pub use config::Configuration;
pub use endpoint::WaitOptions;
pub use error::{ConvertError, Result};
pub use job::{Conversion, Engine, Input, Job, JobSpec, JobStatus, JobStatusCode, Output};
