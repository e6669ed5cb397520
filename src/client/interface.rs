use {
    crate::{
        client::error::ApiError,
        models::{PixCustomer, TransactionResult},
    },
    rust_decimal::Decimal,
    std::future::Future,
};

/// Remote operations on PIX customers. Each call issues exactly one request.
pub trait PixCustomerApi {
    /// Looks a customer up by its composite key.
    ///
    /// Resolves to `None` when the server reports no content; any other
    /// non-success status is returned as an error.
    fn lookup(
        &self,
        document: &str,
        account_id: &str,
    ) -> impl Future<Output = Result<Option<PixCustomer>, ApiError>> + Send;

    /// Creates a customer and returns the record as stored by the server.
    fn create(
        &self,
        customer: &PixCustomer,
    ) -> impl Future<Output = Result<PixCustomer, ApiError>> + Send;

    /// Replaces the customer's PIX limit.
    fn update_limit(
        &self,
        document: &str,
        account_id: &str,
        new_limit: Decimal,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn delete(
        &self,
        document: &str,
        account_id: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Debits `value` against the customer's PIX limit.
    fn process_transaction(
        &self,
        document: &str,
        account_id: &str,
        value: Decimal,
    ) -> impl Future<Output = Result<TransactionResult, ApiError>> + Send;
}
