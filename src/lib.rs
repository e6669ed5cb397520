use {
    crate::{
        client::{ApiError, PixCustomerClient},
        config::GestorPixConfig,
        controller::{
            ActionError, ConsoleNotifier, DEFAULT_SEARCH_ACCOUNT_ID, DEFAULT_SEARCH_DOCUMENT,
            PixController,
        },
        models::NewPixCustomer,
    },
    rust_decimal::Decimal,
    tracing::info,
};

pub mod client;
pub mod config;
pub mod controller;
pub mod logging;
mod macros;
pub mod metrics;
pub mod models;

#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct CustomerKey {
    /// Customer document (CPF/CNPJ)
    #[arg(long, default_value = DEFAULT_SEARCH_DOCUMENT)]
    pub document: String,
    /// Account identifier; may contain characters such as '#'
    #[arg(long, default_value = DEFAULT_SEARCH_ACCOUNT_ID)]
    pub account_id: String,
}

/// One user session against the API. Actions on an existing customer load it
/// first, the same way the record has to be on screen before acting on it.
#[derive(clap::Subcommand, Debug, Clone, PartialEq)]
pub enum Action {
    /// Look a customer up by document and account id
    Search {
        #[command(flatten)]
        key: CustomerKey,
    },
    /// Register a new customer
    Create {
        #[arg(long)]
        document: String,
        #[arg(long)]
        account_id: String,
        #[arg(long, allow_negative_numbers = true)]
        limit: Decimal,
        #[arg(long)]
        branch_number: String,
        #[arg(long)]
        account_number: String,
    },
    /// Replace a customer's PIX limit
    UpdateLimit {
        #[command(flatten)]
        key: CustomerKey,
        #[arg(long, allow_negative_numbers = true)]
        limit: Decimal,
    },
    /// Remove a customer
    Delete {
        #[command(flatten)]
        key: CustomerKey,
    },
    /// Process a PIX transaction against a customer's limit
    Transaction {
        #[command(flatten)]
        key: CustomerKey,
        #[arg(long, allow_negative_numbers = true)]
        value: Decimal,
    },
}

pub struct GestorPix {
    controller: PixController<PixCustomerClient, ConsoleNotifier>,
}

impl GestorPix {
    pub fn new(config: GestorPixConfig) -> Result<Self, ApiError> {
        let client = PixCustomerClient::from_config(&config.api)?;
        info!("Using PIX customer API at {}", client.resource_url());

        Ok(GestorPix {
            controller: PixController::new(client, ConsoleNotifier),
        })
    }

    pub fn controller(&self) -> &PixController<PixCustomerClient, ConsoleNotifier> {
        &self.controller
    }

    pub async fn run(&mut self, action: Action) -> Result<(), ActionError> {
        match action {
            Action::Search { key } => self.search(key).await,
            Action::Create {
                document,
                account_id,
                limit,
                branch_number,
                account_number,
            } => {
                self.controller.new_customer = NewPixCustomer {
                    document: Some(document),
                    account_id: Some(account_id),
                    pix_limit: Some(limit),
                    branch_number: Some(branch_number),
                    account_number: Some(account_number),
                };
                self.controller.create_customer().await
            }
            Action::UpdateLimit { key, limit } => {
                self.search(key).await?;
                if let Some(customer) = self.controller.customer_mut() {
                    customer.pix_limit = Some(limit);
                }
                self.controller.update_limit().await
            }
            Action::Delete { key } => {
                self.search(key).await?;
                self.controller.delete_customer().await
            }
            Action::Transaction { key, value } => {
                self.search(key).await?;
                self.controller.transaction_value = Some(value);
                self.controller.process_transaction().await
            }
        }
    }

    async fn search(&mut self, key: CustomerKey) -> Result<(), ActionError> {
        self.controller.search_document = key.document;
        self.controller.search_account_id = key.account_id;
        self.controller.search_customer().await
    }
}
