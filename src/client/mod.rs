//! HTTP access layer for the PIX customer API.
//! Builds URLs from percent-encoded key components and maps responses to
//! domain types or [`ApiError`].

pub mod error;
pub mod interface;

pub use {error::ApiError, interface::PixCustomerApi};

use {
    crate::{
        config::ApiConfig,
        measure_request,
        models::{PixCustomer, TransactionRequest, TransactionResult, UpdateLimitRequest},
    },
    reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode, Url},
    rust_decimal::Decimal,
    serde::de::DeserializeOwned,
    tracing::{Instrument, debug, debug_span, warn},
    uuid::Uuid,
};

const REQUEST_ID_HEADER: &str = "X-Request-Id";
const LIMIT_SEGMENT: &str = "limite";
const TRANSACTION_SEGMENT: &str = "processar-transacao";

pub struct PixCustomerClient {
    http_client: HttpClient,
    resource_url: Url,
}

impl PixCustomerClient {
    pub fn new(base_url: &str, resource: &str) -> Result<Self, ApiError> {
        let mut resource_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl(format!("{base_url}: {e}")))?;

        resource_url
            .path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(format!("{base_url}: cannot carry a path")))?
            .pop_if_empty()
            .push(resource);

        Ok(PixCustomerClient {
            http_client: HttpClient::new(),
            resource_url,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(&config.base_url, &config.resource)
    }

    pub fn resource_url(&self) -> &Url {
        &self.resource_url
    }

    /// `{resource}/{document}/{account_id}[/{extra}...]`, each segment percent-encoded.
    fn customer_url(
        &self,
        document: &str,
        account_id: &str,
        extra: &[&str],
    ) -> Result<Url, ApiError> {
        let mut url = self.resource_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.resource_url.to_string()))?
            .push(document)
            .push(account_id)
            .extend(extra);

        Ok(url)
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, ApiError> {
        let request_id = Uuid::new_v4();
        let span = debug_span!("api_request", operation, %request_id);
        let request = request.header(REQUEST_ID_HEADER, request_id.to_string());

        measure_request!(operation, { Self::dispatch(request).instrument(span).await })
    }

    async fn dispatch(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        debug!(%status, "Response received");

        if !status.is_success() {
            return Err(Self::handle_error_response(status, response).await);
        }

        Ok(response)
    }

    /// Prefers a JSON `message` field, falling back to the raw body.
    async fn handle_error_response(status: StatusCode, response: Response) -> ApiError {
        let body_text = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<serde_json::Value>(&body_text)
            .ok()
            .and_then(|json| json.get("message")?.as_str().map(str::to_string))
            .unwrap_or(body_text);

        if status.is_server_error() {
            warn!("Server error {}: {}", status, message);
        }

        ApiError::from_status(status, message)
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl PixCustomerApi for PixCustomerClient {
    async fn lookup(
        &self,
        document: &str,
        account_id: &str,
    ) -> Result<Option<PixCustomer>, ApiError> {
        let url = self.customer_url(document, account_id, &[])?;
        let response = self.send("lookup", self.http_client.get(url)).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        // A 2xx with an empty body or a JSON null also means "no such customer".
        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        Ok(serde_json::from_slice::<Option<PixCustomer>>(&body)?)
    }

    async fn create(&self, customer: &PixCustomer) -> Result<PixCustomer, ApiError> {
        let request = self
            .http_client
            .post(self.resource_url.clone())
            .json(customer);
        let response = self.send("create", request).await?;

        // Some deployments answer 201 without echoing the record back.
        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(customer.clone());
        }

        Ok(serde_json::from_slice(&body)?)
    }

    async fn update_limit(
        &self,
        document: &str,
        account_id: &str,
        new_limit: Decimal,
    ) -> Result<(), ApiError> {
        let url = self.customer_url(document, account_id, &[LIMIT_SEGMENT])?;
        let request = self
            .http_client
            .patch(url)
            .json(&UpdateLimitRequest { new_limit });
        self.send("update_limit", request).await?;

        Ok(())
    }

    async fn delete(&self, document: &str, account_id: &str) -> Result<(), ApiError> {
        let url = self.customer_url(document, account_id, &[])?;
        self.send("delete", self.http_client.delete(url)).await?;

        Ok(())
    }

    async fn process_transaction(
        &self,
        document: &str,
        account_id: &str,
        value: Decimal,
    ) -> Result<TransactionResult, ApiError> {
        let url = self.customer_url(document, account_id, &[TRANSACTION_SEGMENT])?;
        let request = self
            .http_client
            .post(url)
            .json(&TransactionRequest { value });
        let response = self.send("process_transaction", request).await?;

        Self::json(response).await
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        axum::{
            Json, Router,
            extract::State,
            http::{HeaderMap, Method, Uri},
            routing::{get, patch, post},
        },
        serde_json::{Value, json},
        std::sync::{Arc, Mutex},
    };

    const DOCUMENT: &str = "12345678900";
    const ACCOUNT_ID: &str = "1234#56789-0";
    const ENCODED_CUSTOMER_PATH: &str = "/api/clientepix/12345678900/1234%2356789-0";

    #[derive(Debug, Clone, PartialEq)]
    struct Seen {
        method: Method,
        path: String,
        body: Option<Value>,
    }

    #[derive(Clone, Default)]
    struct Recorder {
        seen: Arc<Mutex<Vec<Seen>>>,
        request_ids: Arc<Mutex<Vec<Option<String>>>>,
    }

    impl Recorder {
        fn record(&self, method: Method, uri: &Uri, headers: &HeaderMap, body: Option<Value>) {
            self.seen.lock().unwrap().push(Seen {
                method,
                path: uri.path().to_string(),
                body,
            });
            self.request_ids.lock().unwrap().push(
                headers
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string),
            );
        }

        fn seen(&self) -> Vec<Seen> {
            self.seen.lock().unwrap().clone()
        }

        fn request_ids(&self) -> Vec<Option<String>> {
            self.request_ids.lock().unwrap().clone()
        }
    }

    fn customer_json() -> Value {
        json!({
            "documento": DOCUMENT,
            "contaId": ACCOUNT_ID,
            "limitePix": 1000.0,
            "numeroAgencia": "1234",
            "numeroConta": "56789-0"
        })
    }

    // Serves `router` on an ephemeral port and returns the API base URL.
    async fn spawn_api(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/api", address)
    }

    async fn client_answering(status: StatusCode, body: &'static str) -> (PixCustomerClient, Recorder) {
        let recorder = Recorder::default();
        let router = Router::new()
            .route(
                "/api/clientepix/{document}/{account_id}",
                get(move |State(recorder): State<Recorder>, method: Method, uri: Uri, headers: HeaderMap| async move {
                    recorder.record(method, &uri, &headers, None);
                    (status, body)
                }),
            )
            .with_state(recorder.clone());

        let base_url = spawn_api(router).await;
        (PixCustomerClient::new(&base_url, "clientepix").unwrap(), recorder)
    }

    #[test]
    fn test_resource_url_composition() {
        for base_url in [
            "http://localhost:8080/api",
            "http://localhost:8080/api/",
        ] {
            let client = PixCustomerClient::new(base_url, "clientepix").unwrap();
            assert_eq!(
                client.resource_url().as_str(),
                "http://localhost:8080/api/clientepix"
            );
        }

        let client = PixCustomerClient::new("http://localhost:8080", "clientepix").unwrap();
        assert_eq!(client.resource_url().as_str(), "http://localhost:8080/clientepix");
    }

    #[test]
    fn test_key_components_are_percent_encoded() {
        let client = PixCustomerClient::new("http://localhost:8080/api", "clientepix").unwrap();

        let url = client
            .customer_url("123 456/78", ACCOUNT_ID, &[LIMIT_SEGMENT])
            .unwrap();

        assert_eq!(
            url.path(),
            "/api/clientepix/123%20456%2F78/1234%2356789-0/limite"
        );
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            PixCustomerClient::new("not a url", "clientepix"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            PixCustomerClient::new("mailto:pix@example.com", "clientepix"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_lookup_no_content_is_absent() {
        let (client, recorder) = client_answering(StatusCode::NO_CONTENT, "").await;

        let result = client.lookup(DOCUMENT, ACCOUNT_ID).await;

        assert!(matches!(result, Ok(None)));
        assert_eq!(
            recorder.seen(),
            vec![Seen {
                method: Method::GET,
                path: ENCODED_CUSTOMER_PATH.to_string(),
                body: None,
            }]
        );
    }

    #[tokio::test]
    async fn test_every_request_carries_fresh_request_id() {
        let (client, recorder) = client_answering(StatusCode::NO_CONTENT, "").await;

        client.lookup(DOCUMENT, ACCOUNT_ID).await.unwrap();
        client.lookup(DOCUMENT, ACCOUNT_ID).await.unwrap();

        let ids: Vec<Uuid> = recorder
            .request_ids()
            .into_iter()
            .map(|id| Uuid::parse_str(&id.expect("missing request id header")).unwrap())
            .collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[tokio::test]
    async fn test_lookup_empty_or_null_body_is_absent() {
        let (client, _) = client_answering(StatusCode::OK, "").await;
        assert!(matches!(client.lookup(DOCUMENT, ACCOUNT_ID).await, Ok(None)));

        let (client, _) = client_answering(StatusCode::OK, "null").await;
        assert!(matches!(client.lookup(DOCUMENT, ACCOUNT_ID).await, Ok(None)));
    }

    #[tokio::test]
    async fn test_lookup_found() {
        let router = Router::new().route(
            "/api/clientepix/{document}/{account_id}",
            get(|| async { Json(customer_json()) }),
        );
        let client = PixCustomerClient::new(&spawn_api(router).await, "clientepix").unwrap();

        let customer = client.lookup(DOCUMENT, ACCOUNT_ID).await.unwrap().unwrap();

        assert_eq!(customer.document, DOCUMENT);
        assert_eq!(customer.account_id, ACCOUNT_ID);
        assert_eq!(customer.pix_limit, Some(Decimal::from(1000)));
        assert_eq!(customer.branch_number, "1234");
        assert_eq!(customer.account_number, "56789-0");
    }

    #[tokio::test]
    async fn test_lookup_errors_are_propagated() {
        let (client, _) = client_answering(StatusCode::NOT_FOUND, "").await;
        assert!(matches!(
            client.lookup(DOCUMENT, ACCOUNT_ID).await,
            Err(ApiError::NotFound(_))
        ));

        let (client, _) =
            client_answering(StatusCode::BAD_REQUEST, r#"{"message":"Documento inválido"}"#).await;
        match client.lookup(DOCUMENT, ACCOUNT_ID).await {
            Err(ApiError::BadRequest(message)) => assert_eq!(message, "Documento inválido"),
            other => panic!("unexpected result: {:?}", other),
        }

        let (client, _) = client_answering(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
        match client.lookup(DOCUMENT, ACCOUNT_ID).await {
            Err(error @ ApiError::Server { .. }) => {
                assert_eq!(error.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
                assert!(error.to_string().contains("boom"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lookup_malformed_body() {
        let (client, _) = client_answering(StatusCode::OK, "{\"documento\":").await;
        assert!(matches!(
            client.lookup(DOCUMENT, ACCOUNT_ID).await,
            Err(ApiError::Deserialization(_))
        ));
    }

    #[tokio::test]
    async fn test_create_posts_to_resource_root() {
        let recorder = Recorder::default();
        let router = Router::new()
            .route(
                "/api/clientepix",
                post(
                    |State(recorder): State<Recorder>, uri: Uri, headers: HeaderMap, Json(body): Json<Value>| async move {
                        recorder.record(Method::POST, &uri, &headers, Some(body.clone()));
                        (StatusCode::CREATED, Json(body))
                    },
                ),
            )
            .with_state(recorder.clone());
        let client = PixCustomerClient::new(&spawn_api(router).await, "clientepix").unwrap();
        let customer: PixCustomer = serde_json::from_value(customer_json()).unwrap();

        let created = client.create(&customer).await.unwrap();

        assert_eq!(created, customer);
        let seen = recorder.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path, "/api/clientepix");
        assert_eq!(seen[0].body.as_ref().unwrap()["contaId"], ACCOUNT_ID);
    }

    #[tokio::test]
    async fn test_create_without_echoed_body_returns_submitted_record() {
        let router = Router::new().route(
            "/api/clientepix",
            post(|| async { StatusCode::CREATED }),
        );
        let client = PixCustomerClient::new(&spawn_api(router).await, "clientepix").unwrap();
        let customer: PixCustomer = serde_json::from_value(customer_json()).unwrap();

        let created = client.create(&customer).await.unwrap();

        assert_eq!(created, customer);
    }

    #[tokio::test]
    async fn test_create_conflict_is_distinct() {
        let router = Router::new().route(
            "/api/clientepix",
            post(|| async {
                (
                    StatusCode::CONFLICT,
                    Json(json!({ "message": "Cliente já cadastrado" })),
                )
            }),
        );
        let client = PixCustomerClient::new(&spawn_api(router).await, "clientepix").unwrap();
        let customer: PixCustomer = serde_json::from_value(customer_json()).unwrap();

        match client.create(&customer).await {
            Err(ApiError::Conflict(message)) => assert_eq!(message, "Cliente já cadastrado"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_limit_patches_limit_path() {
        let recorder = Recorder::default();
        let router = Router::new()
            .route(
                "/api/clientepix/{document}/{account_id}/limite",
                patch(
                    |State(recorder): State<Recorder>, uri: Uri, headers: HeaderMap, Json(body): Json<Value>| async move {
                        recorder.record(Method::PATCH, &uri, &headers, Some(body));
                        StatusCode::NO_CONTENT
                    },
                ),
            )
            .with_state(recorder.clone());
        let client = PixCustomerClient::new(&spawn_api(router).await, "clientepix").unwrap();

        client
            .update_limit(DOCUMENT, ACCOUNT_ID, Decimal::new(75050, 2))
            .await
            .unwrap();

        let seen = recorder.seen();
        assert_eq!(seen[0].path, format!("{ENCODED_CUSTOMER_PATH}/limite"));
        assert_eq!(seen[0].body, Some(json!({ "novoLimitePix": 750.5 })));
    }

    #[tokio::test]
    async fn test_delete() {
        let recorder = Recorder::default();
        let router = Router::new()
            .route(
                "/api/clientepix/{document}/{account_id}",
                axum::routing::delete(
                    |State(recorder): State<Recorder>, method: Method, uri: Uri, headers: HeaderMap| async move {
                        recorder.record(method, &uri, &headers, None);
                        StatusCode::NO_CONTENT
                    },
                ),
            )
            .with_state(recorder.clone());
        let client = PixCustomerClient::new(&spawn_api(router).await, "clientepix").unwrap();

        client.delete(DOCUMENT, ACCOUNT_ID).await.unwrap();

        assert_eq!(recorder.seen()[0].method, Method::DELETE);
        assert_eq!(recorder.seen()[0].path, ENCODED_CUSTOMER_PATH);
    }

    #[tokio::test]
    async fn test_delete_not_found() {
        let router = Router::new().route(
            "/api/clientepix/{document}/{account_id}",
            axum::routing::delete(|| async { StatusCode::NOT_FOUND }),
        );
        let client = PixCustomerClient::new(&spawn_api(router).await, "clientepix").unwrap();

        assert!(matches!(
            client.delete(DOCUMENT, ACCOUNT_ID).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_process_transaction() {
        let recorder = Recorder::default();
        let router = Router::new()
            .route(
                "/api/clientepix/{document}/{account_id}/processar-transacao",
                post(
                    |State(recorder): State<Recorder>, uri: Uri, headers: HeaderMap, Json(body): Json<Value>| async move {
                        recorder.record(Method::POST, &uri, &headers, Some(body));
                        Json(json!({
                            "aprovado": true,
                            "mensagem": "Transação aprovada",
                            "novoLimite": 900.0
                        }))
                    },
                ),
            )
            .with_state(recorder.clone());
        let client = PixCustomerClient::new(&spawn_api(router).await, "clientepix").unwrap();

        let result = client
            .process_transaction(DOCUMENT, ACCOUNT_ID, Decimal::from(100))
            .await
            .unwrap();

        assert_eq!(
            result,
            TransactionResult {
                approved: true,
                message: "Transação aprovada".to_string(),
                new_limit: Some(Decimal::from(900)),
            }
        );
        let seen = recorder.seen();
        assert_eq!(
            seen[0].path,
            format!("{ENCODED_CUSTOMER_PATH}/processar-transacao")
        );
        assert_eq!(seen[0].body, Some(json!({ "valor": 100.0 })));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        // Nothing listens on the discard port.
        let client = PixCustomerClient::new("http://127.0.0.1:9/api", "clientepix").unwrap();

        let error = client.lookup(DOCUMENT, ACCOUNT_ID).await.unwrap_err();

        assert!(matches!(error, ApiError::Request(_)));
        assert_eq!(error.status(), None);
    }

    #[tokio::test]
    async fn test_requests_are_counted() {
        let (client, _) = client_answering(StatusCode::NOT_FOUND, "").await;
        let failures = crate::metrics::API_REQUEST_FAILURES_TOTAL.with_label_values(&["lookup"]);
        let before = failures.get();

        let _ = client.lookup(DOCUMENT, ACCOUNT_ID).await;

        assert!(failures.get() >= before + 1.0);
    }
}
