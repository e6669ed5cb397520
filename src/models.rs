use {
    rust_decimal::Decimal,
    serde::{Deserialize, Serialize},
};

/// A PIX customer as exposed by the API, keyed by `(document, account_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixCustomer {
    #[serde(rename = "documento")]
    pub document: String,
    #[serde(rename = "contaId")]
    pub account_id: String,
    // Nullable on the wire; only validated when submitted.
    #[serde(rename = "limitePix", default)]
    pub pix_limit: Option<Decimal>,
    #[serde(rename = "numeroAgencia")]
    pub branch_number: String,
    #[serde(rename = "numeroConta")]
    pub account_number: String,
}

/// The create form. Fields stay optional until the form is submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPixCustomer {
    pub document: Option<String>,
    pub account_id: Option<String>,
    pub pix_limit: Option<Decimal>,
    pub branch_number: Option<String>,
    pub account_number: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    MissingField,
    NegativeLimit,
}

impl NewPixCustomer {
    /// Builds the record to submit. Blank strings count as missing.
    pub fn to_customer(&self) -> Result<PixCustomer, FormError> {
        fn required(field: &Option<String>) -> Result<String, FormError> {
            match field.as_deref().map(str::trim) {
                Some(value) if !value.is_empty() => Ok(value.to_string()),
                _ => Err(FormError::MissingField),
            }
        }

        let document = required(&self.document)?;
        let account_id = required(&self.account_id)?;
        let branch_number = required(&self.branch_number)?;
        let account_number = required(&self.account_number)?;
        let pix_limit = self.pix_limit.ok_or(FormError::MissingField)?;

        if pix_limit < Decimal::ZERO {
            return Err(FormError::NegativeLimit);
        }

        Ok(PixCustomer {
            document,
            account_id,
            pix_limit: Some(pix_limit),
            branch_number,
            account_number,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateLimitRequest {
    #[serde(rename = "novoLimitePix")]
    pub new_limit: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionRequest {
    #[serde(rename = "valor")]
    pub value: Decimal,
}

/// Outcome of processing a transaction against a customer's PIX limit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionResult {
    #[serde(rename = "aprovado")]
    pub approved: bool,
    #[serde(rename = "mensagem")]
    pub message: String,
    #[serde(rename = "novoLimite", default)]
    pub new_limit: Option<Decimal>,
}
