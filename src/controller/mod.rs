//! Session state for managing PIX customers and the actions that drive the
//! access layer. Every outcome is reported through a [`Notifier`].

pub mod busy;
pub mod error;
pub mod notification;

pub use {
    busy::{BusyFlag, BusyFlags},
    error::ActionError,
    notification::{ConsoleNotifier, Level, Notification, Notifier},
};

use {
    crate::{
        client::{ApiError, PixCustomerApi},
        models::{FormError, NewPixCustomer, PixCustomer},
    },
    reqwest::StatusCode,
    rust_decimal::Decimal,
    tracing::{debug, warn},
};

pub const DEFAULT_SEARCH_DOCUMENT: &str = "12345678900";
pub const DEFAULT_SEARCH_ACCOUNT_ID: &str = "1234#56789-0";

type Message = (&'static str, &'static str);

/// User messages per failure bucket for one action, as `(title, message)`.
/// A bucket left as `None` falls through to `generic`.
struct FailureMessages {
    not_found: Option<Message>,
    bad_request: Option<Message>,
    conflict: Option<Message>,
    generic: Message,
}

const CUSTOMER_REMOVED_ELSEWHERE: Message = (
    "Cliente não encontrado",
    "Cliente não encontrado. Pode ter sido removido por outro usuário.",
);

const SEARCH_FAILURES: FailureMessages = FailureMessages {
    not_found: Some((
        "Cliente não encontrado",
        "Cliente não encontrado. Verifique os dados e tente novamente.",
    )),
    bad_request: Some((
        "Dados inválidos",
        "Dados de busca inválidos. Verifique o documento e ID da conta.",
    )),
    conflict: None,
    generic: (
        "Erro de comunicação",
        "Ocorreu um erro inesperado ao se comunicar com a API.",
    ),
};

const CREATE_FAILURES: FailureMessages = FailureMessages {
    not_found: None,
    bad_request: Some((
        "Dados inválidos",
        "Dados inválidos. Verifique as informações e tente novamente.",
    )),
    conflict: Some((
        "Cliente duplicado",
        "Este cliente (documento/conta) já existe no sistema.",
    )),
    generic: (
        "Erro no servidor",
        "Ocorreu um erro ao criar o cliente. Tente novamente.",
    ),
};

const UPDATE_LIMIT_FAILURES: FailureMessages = FailureMessages {
    not_found: Some(CUSTOMER_REMOVED_ELSEWHERE),
    bad_request: Some(("Dados inválidos", "Dados inválidos para atualização do limite.")),
    conflict: None,
    generic: ("Erro no servidor", "Ocorreu um erro ao atualizar o limite."),
};

const DELETE_FAILURES: FailureMessages = FailureMessages {
    not_found: Some(CUSTOMER_REMOVED_ELSEWHERE),
    bad_request: None,
    conflict: None,
    generic: ("Erro no servidor", "Ocorreu um erro ao remover o cliente."),
};

const TRANSACTION_FAILURES: FailureMessages = FailureMessages {
    not_found: Some((
        "Cliente não encontrado",
        "Cliente não encontrado para processar a transação.",
    )),
    bad_request: Some((
        "Dados inválidos",
        "Dados da transação são inválidos. Verifique o valor informado.",
    )),
    conflict: None,
    generic: (
        "Erro de comunicação",
        "Ocorreu um erro de comunicação com a API.",
    ),
};

impl FailureMessages {
    fn classify(&self, error: ApiError) -> (ActionError, Message) {
        match (error.status(), self) {
            (Some(StatusCode::NOT_FOUND), FailureMessages { not_found: Some(m), .. }) => {
                (ActionError::NotFound(error), *m)
            }
            (Some(StatusCode::BAD_REQUEST), FailureMessages { bad_request: Some(m), .. }) => {
                (ActionError::BadRequest(error), *m)
            }
            (Some(StatusCode::CONFLICT), FailureMessages { conflict: Some(m), .. }) => {
                (ActionError::Conflict(error), *m)
            }
            _ => (ActionError::Communication(error), self.generic),
        }
    }
}

pub struct PixController<A, N> {
    api: A,
    notifier: N,
    flags: BusyFlags,
    customer: Option<PixCustomer>,
    pub search_document: String,
    pub search_account_id: String,
    pub new_customer: NewPixCustomer,
    pub transaction_value: Option<Decimal>,
}

impl<A: PixCustomerApi, N: Notifier> PixController<A, N> {
    pub fn new(api: A, notifier: N) -> Self {
        PixController {
            api,
            notifier,
            flags: BusyFlags::default(),
            customer: None,
            search_document: DEFAULT_SEARCH_DOCUMENT.to_string(),
            search_account_id: DEFAULT_SEARCH_ACCOUNT_ID.to_string(),
            new_customer: NewPixCustomer::default(),
            transaction_value: None,
        }
    }

    /// The record loaded by the last successful search.
    pub fn customer(&self) -> Option<&PixCustomer> {
        self.customer.as_ref()
    }

    /// Edits the held record in place, e.g. to stage a new limit.
    pub fn customer_mut(&mut self) -> Option<&mut PixCustomer> {
        self.customer.as_mut()
    }

    pub fn flags(&self) -> &BusyFlags {
        &self.flags
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn notify(&mut self, level: Level, (title, message): (&str, &str)) {
        self.notifier.notify(Notification::new(level, title, message));
    }

    fn reject(&mut self, error: ActionError, message: Message) -> Result<(), ActionError> {
        debug!("Rejected before sending: {}", error);
        self.notify(Level::Error, message);
        Err(error)
    }

    fn fail(&mut self, failures: &FailureMessages, error: ApiError) -> Result<(), ActionError> {
        let (error, message) = failures.classify(error);
        warn!("{}", error);
        self.notify(Level::Error, message);
        Err(error)
    }

    /// Looks up the customer keyed by the search inputs. The held record is
    /// discarded first, whatever the outcome.
    pub async fn search_customer(&mut self) -> Result<(), ActionError> {
        self.customer = None;

        if self.search_document.trim().is_empty() || self.search_account_id.trim().is_empty() {
            return self.reject(
                ActionError::Validation("search key is incomplete"),
                (
                    "Dados inválidos",
                    "Informe o documento e o ID da conta para buscar.",
                ),
            );
        }

        let _busy = self
            .flags
            .loading
            .try_acquire()
            .ok_or(ActionError::Busy("search"))?;

        let result = self
            .api
            .lookup(&self.search_document, &self.search_account_id)
            .await;

        match result {
            Ok(Some(customer)) => {
                self.customer = Some(customer);
                self.notify(
                    Level::Success,
                    ("Sucesso", "Cliente encontrado com sucesso!"),
                );
                Ok(())
            }
            Ok(None) => {
                self.notify(
                    Level::Info,
                    (
                        "Sem resultados",
                        "Nenhum cliente encontrado com os dados informados.",
                    ),
                );
                Ok(())
            }
            Err(e) => self.fail(&SEARCH_FAILURES, e),
        }
    }

    /// Submits the new-customer form. The form is cleared only on success.
    pub async fn create_customer(&mut self) -> Result<(), ActionError> {
        let customer = match self.new_customer.to_customer() {
            Ok(customer) => customer,
            Err(FormError::MissingField) => {
                return self.reject(
                    ActionError::Validation("every field is required"),
                    ("Erro de Validação", "Todos os campos são obrigatórios."),
                );
            }
            Err(FormError::NegativeLimit) => {
                return self.reject(
                    ActionError::Validation("limit must not be negative"),
                    ("Valor inválido", "O valor do limite não pode ser negativo."),
                );
            }
        };

        let _busy = self
            .flags
            .creating
            .try_acquire()
            .ok_or(ActionError::Busy("create"))?;

        match self.api.create(&customer).await {
            Ok(created) => {
                let message = format!("Cliente {} criado com sucesso!", created.document);
                self.notifier
                    .notify(Notification::new(Level::Success, "Cliente criado", message));
                self.new_customer = NewPixCustomer::default();
                Ok(())
            }
            Err(e) => self.fail(&CREATE_FAILURES, e),
        }
    }

    /// Sends the held record's limit to the server.
    pub async fn update_limit(&mut self) -> Result<(), ActionError> {
        let Some(customer) = &self.customer else {
            return self.reject(
                ActionError::NoCustomerSelected,
                (
                    "Cliente não selecionado",
                    "Nenhum cliente selecionado para atualizar.",
                ),
            );
        };

        let (document, account_id) = (customer.document.clone(), customer.account_id.clone());

        let Some(new_limit) = customer.pix_limit.filter(|limit| *limit >= Decimal::ZERO) else {
            return self.reject(
                ActionError::Validation("limit must be present and not negative"),
                ("Valor inválido", "O valor do limite não pode ser negativo."),
            );
        };

        let _busy = self
            .flags
            .updating
            .try_acquire()
            .ok_or(ActionError::Busy("update_limit"))?;

        match self.api.update_limit(&document, &account_id, new_limit).await {
            Ok(()) => {
                self.notify(
                    Level::Success,
                    ("Limite atualizado", "Limite PIX atualizado com sucesso!"),
                );
                Ok(())
            }
            Err(e) => self.fail(&UPDATE_LIMIT_FAILURES, e),
        }
    }

    /// Deletes the held record; on success nothing is held anymore.
    pub async fn delete_customer(&mut self) -> Result<(), ActionError> {
        let Some(customer) = self.customer.clone() else {
            return Err(ActionError::NoCustomerSelected);
        };

        let _busy = self
            .flags
            .deleting
            .try_acquire()
            .ok_or(ActionError::Busy("delete"))?;

        match self
            .api
            .delete(&customer.document, &customer.account_id)
            .await
        {
            Ok(()) => {
                self.customer = None;
                let message = format!(
                    "Cliente com documento {} foi removido com sucesso.",
                    customer.document
                );
                self.notifier
                    .notify(Notification::new(Level::Success, "Cliente removido", message));
                Ok(())
            }
            Err(e) => self.fail(&DELETE_FAILURES, e),
        }
    }

    /// Processes `transaction_value` against the held record. An approved
    /// transaction carrying a new limit refreshes the held limit.
    pub async fn process_transaction(&mut self) -> Result<(), ActionError> {
        let Some(customer) = &self.customer else {
            return Err(ActionError::NoCustomerSelected);
        };
        let (document, account_id) = (customer.document.clone(), customer.account_id.clone());

        let Some(value) = self.transaction_value.filter(|value| *value > Decimal::ZERO) else {
            return self.reject(
                ActionError::Validation("transaction value must be positive"),
                (
                    "Valor inválido",
                    "Por favor, insira um valor de transação válido e positivo.",
                ),
            );
        };

        let _busy = self
            .flags
            .processing
            .try_acquire()
            .ok_or(ActionError::Busy("process_transaction"))?;

        let result = match self
            .api
            .process_transaction(&document, &account_id, value)
            .await
        {
            Ok(result) => result,
            Err(e) => return self.fail(&TRANSACTION_FAILURES, e),
        };

        if result.approved {
            if let (Some(new_limit), Some(customer)) = (result.new_limit, self.customer.as_mut()) {
                customer.pix_limit = Some(new_limit);
            }
            self.notifier.notify(Notification::new(
                Level::Success,
                "Transação Aprovada",
                result.message,
            ));
        } else {
            self.notifier.notify(Notification::new(
                Level::Warning,
                "Transação Recusada",
                result.message,
            ));
        }
        self.transaction_value = None;

        Ok(())
    }
}
