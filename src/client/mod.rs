pub mod executor;
pub mod resources;
pub mod retry;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use executor::{ACCEPTED_STATUS_CODES, RequestExecutor, merge_headers};
pub use resources::generate_url;
pub use retry::RetryPolicy;
pub use transport::{
    Headers, HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, UploadFile,
};
