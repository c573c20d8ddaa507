//! Error types for the search sync repository.

mod document_error;
mod provisioning_error;
mod service_error;

pub use document_error::DocumentError;
pub use provisioning_error::ProvisioningError;
pub use service_error::SearchServiceError;
