use {crate::client::ApiError, thiserror::Error};

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Validation failed: {0}")]
    Validation(&'static str),
    #[error("No customer selected")]
    NoCustomerSelected,
    #[error("Action {0} is already in progress")]
    Busy(&'static str),
    #[error("Customer not found")]
    NotFound(#[source] ApiError),
    #[error("Request rejected as invalid")]
    BadRequest(#[source] ApiError),
    #[error("Customer already exists")]
    Conflict(#[source] ApiError),
    #[error("Failed to communicate with the API: {0}")]
    Communication(#[source] ApiError),
}
