//! Vault gateway
//!
//! Validates an invocation against the operation catalogue, maps it onto one or more
//! HTTP requests against the vault service and normalizes whatever comes back.

use obsidian_bridge_core::{
    InvocationError, InvocationResult, OperationCatalogue, OperationKind, Params, Payload,
};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ConnectionConfig;
use crate::error::GatewayResult;
use crate::headers::{HeaderBuilder, NoteView, PatchTarget};
use crate::queries::{batch_error_section, batch_section, format_search_results, recent_changes_query};
use crate::response::{extract_files, VaultResponse};
use crate::timeout::TimeoutManager;
use crate::url_builder::UrlBuilder;

/// Body sent with a vault request; content type comes from the header set
#[derive(Debug, Clone)]
enum RequestBody {
    Text(String),
    Json(JsonValue),
}

#[derive(Debug)]
struct VaultRequest {
    method: Method,
    path: String,
    query: Vec<(&'static str, String)>,
    headers: HeaderMap,
    body: Option<RequestBody>,
}

impl VaultRequest {
    fn new(method: Method, path: String, headers: HeaderMap) -> Self {
        Self {
            method,
            path,
            query: Vec::new(),
            headers,
            body: None,
        }
    }

    fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }
}

/// Stateless bridge to the vault service.
///
/// Holds only immutable configuration and a pooled HTTP client, so one instance can
/// serve any number of concurrent invocations.
pub struct VaultGateway {
    catalogue: OperationCatalogue,
    config: Arc<ConnectionConfig>,
    client: Client,
    urls: UrlBuilder,
    headers: HeaderBuilder,
    timeouts: TimeoutManager,
}

impl VaultGateway {
    pub fn new(config: Arc<ConnectionConfig>) -> GatewayResult<Self> {
        Self::with_catalogue(config, OperationCatalogue::new())
    }

    pub fn with_catalogue(
        config: Arc<ConnectionConfig>,
        catalogue: OperationCatalogue,
    ) -> GatewayResult<Self> {
        config.validate()?;

        let timeouts = TimeoutManager::new(config.timeouts);
        let client = timeouts
            .apply_to_client_builder(Client::builder())
            .danger_accept_invalid_certs(!config.verify_ssl)
            .user_agent(concat!("obsidian-bridge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let urls = UrlBuilder::new(&config.base_url())?;
        let headers = HeaderBuilder::new(&config.api_key)?;

        debug!(
            base_url = %urls.base(),
            verify_ssl = config.verify_ssl,
            "vault gateway ready"
        );

        Ok(Self {
            catalogue,
            config,
            client,
            urls,
            headers,
            timeouts,
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn catalogue(&self) -> &OperationCatalogue {
        &self.catalogue
    }

    /// Validate and run one operation by name.
    ///
    /// Validation failures return before any request is sent.
    pub async fn invoke(&self, operation: &str, args: &JsonValue) -> InvocationResult {
        let (kind, params) = self.catalogue.validate(operation, args).inspect_err(|e| {
            debug!(operation, error = %e, "rejected invocation");
        })?;

        debug!(operation = %kind, "invoking");
        let result = self.dispatch(kind, &params).await;

        if let Err(e) = &result {
            warn!(operation = %kind, category = ?e.category(), "{}", e);
        }
        result
    }

    async fn dispatch(&self, kind: OperationKind, params: &Params) -> InvocationResult {
        match kind {
            OperationKind::ListFilesInVault => self.list_files_in_vault().await.map(Payload::Json),
            OperationKind::ListFilesInDir => self
                .list_files_in_dir(params.str("dirpath")?)
                .await
                .map(Payload::Json),
            OperationKind::GetFileContents => self
                .get_file_contents(params.str("filepath")?)
                .await
                .map(Payload::Text),
            OperationKind::BatchGetFileContents => Ok(Payload::Text(
                self.batch_get_file_contents(params.list("filepaths")?).await,
            )),
            OperationKind::Search => self
                .search(params.str("query")?, params.int("context_length")?)
                .await
                .map(Payload::Json),
            OperationKind::ComplexSearch => {
                let query = JsonValue::Object(params.object("query")?.clone());
                self.complex_search(&query).await.map(json_or_empty)
            }
            OperationKind::AppendContent => self
                .append_content(params.str("filepath")?, params.str("content")?)
                .await
                .map(|_| Payload::Empty),
            OperationKind::PatchContent => {
                let target = PatchTarget {
                    operation: params.str("operation")?.parse()?,
                    target_type: params.str("target_type")?.parse()?,
                    target: params.str("target")?.to_string(),
                };
                self.patch_content(params.str("filepath")?, &target, params.str("content")?)
                    .await
                    .map(|_| Payload::Empty)
            }
            OperationKind::PutContent => self
                .put_content(params.str("filepath")?, params.str("content")?)
                .await
                .map(|_| Payload::Empty),
            OperationKind::DeleteFile => self
                .delete_file(params.str("filepath")?)
                .await
                .map(|_| Payload::Empty),
            OperationKind::PeriodicNotes => self
                .periodic_note(params.str("period")?, params.str("type")?.parse()?)
                .await
                .map(Payload::Text),
            OperationKind::RecentPeriodicNotes => self
                .recent_periodic_notes(
                    params.str("period")?,
                    params.int("limit")?,
                    params.bool("include_content")?,
                )
                .await
                .map(json_or_empty),
            OperationKind::RecentChanges => self
                .recent_changes(params.int("limit")?, params.int("days")?)
                .await
                .map(json_or_empty),
        }
    }

    pub async fn list_files_in_vault(&self) -> Result<JsonValue, InvocationError> {
        let request = VaultRequest::new(Method::GET, UrlBuilder::vault_root(), self.headers.base());
        let response = self.send(request).await?;
        Ok(extract_files(response.json()?))
    }

    pub async fn list_files_in_dir(&self, dirpath: &str) -> Result<JsonValue, InvocationError> {
        let request = VaultRequest::new(
            Method::GET,
            UrlBuilder::vault_dir(dirpath)?,
            self.headers.base(),
        );
        let response = self.send(request).await?;
        Ok(extract_files(response.json()?))
    }

    pub async fn get_file_contents(&self, filepath: &str) -> Result<String, InvocationError> {
        let request = VaultRequest::new(
            Method::GET,
            UrlBuilder::vault_file(filepath)?,
            self.headers.base(),
        );
        Ok(self.send(request).await?.into_text())
    }

    /// Read each file in order. A file that fails is reported inline in its own
    /// section; the remaining paths are still read.
    pub async fn batch_get_file_contents(&self, filepaths: &[String]) -> String {
        let mut output = String::new();
        for filepath in filepaths {
            match self.get_file_contents(filepath).await {
                Ok(content) => output.push_str(&batch_section(filepath, &content)),
                Err(e) => {
                    debug!(filepath = %filepath, error = %e, "batch entry failed");
                    output.push_str(&batch_error_section(filepath, &e));
                }
            }
        }
        output
    }

    pub async fn search(
        &self,
        query: &str,
        context_length: i64,
    ) -> Result<JsonValue, InvocationError> {
        let request = VaultRequest::new(Method::POST, UrlBuilder::simple_search(), self.headers.base())
            .query("query", query)
            .query("contextLength", context_length);
        let response = self.send(request).await?;
        Ok(format_search_results(
            response.json()?.unwrap_or_else(|| JsonValue::Array(Vec::new())),
        ))
    }

    pub async fn complex_search(
        &self,
        query: &JsonValue,
    ) -> Result<Option<JsonValue>, InvocationError> {
        let request = VaultRequest::new(Method::POST, UrlBuilder::search(), self.headers.jsonlogic())
            .body(RequestBody::Json(query.clone()));
        self.send(request).await?.json()
    }

    pub async fn append_content(&self, filepath: &str, content: &str) -> Result<(), InvocationError> {
        let request = VaultRequest::new(
            Method::POST,
            UrlBuilder::vault_file(filepath)?,
            self.headers.markdown_write(),
        )
        .body(RequestBody::Text(content.to_string()));
        self.send(request).await.map(|_| ())
    }

    pub async fn patch_content(
        &self,
        filepath: &str,
        target: &PatchTarget,
        content: &str,
    ) -> Result<(), InvocationError> {
        let request = VaultRequest::new(
            Method::PATCH,
            UrlBuilder::vault_file(filepath)?,
            self.headers.patch(target)?,
        )
        .body(RequestBody::Text(content.to_string()));
        self.send(request).await.map(|_| ())
    }

    pub async fn put_content(&self, filepath: &str, content: &str) -> Result<(), InvocationError> {
        let request = VaultRequest::new(
            Method::PUT,
            UrlBuilder::vault_file(filepath)?,
            self.headers.markdown_write(),
        )
        .body(RequestBody::Text(content.to_string()));
        self.send(request).await.map(|_| ())
    }

    pub async fn delete_file(&self, filepath: &str) -> Result<(), InvocationError> {
        let request = VaultRequest::new(
            Method::DELETE,
            UrlBuilder::vault_file(filepath)?,
            self.headers.base(),
        );
        self.send(request).await.map(|_| ())
    }

    /// Current periodic note, as raw markdown or the note's JSON metadata document
    pub async fn periodic_note(&self, period: &str, view: NoteView) -> Result<String, InvocationError> {
        let request = VaultRequest::new(
            Method::GET,
            UrlBuilder::periodic(period),
            self.headers.periodic(view),
        );
        Ok(self.send(request).await?.into_text())
    }

    pub async fn recent_periodic_notes(
        &self,
        period: &str,
        limit: i64,
        include_content: bool,
    ) -> Result<Option<JsonValue>, InvocationError> {
        let request = VaultRequest::new(
            Method::GET,
            UrlBuilder::periodic_recent(period),
            self.headers.base(),
        )
        .query("limit", limit)
        .query("includeContent", include_content);
        self.send(request).await?.json()
    }

    /// Files modified within the trailing `days`, via a DQL query on the generic
    /// search endpoint
    pub async fn recent_changes(
        &self,
        limit: i64,
        days: i64,
    ) -> Result<Option<JsonValue>, InvocationError> {
        let request = VaultRequest::new(Method::POST, UrlBuilder::search(), self.headers.dataview())
            .body(RequestBody::Text(recent_changes_query(limit, days)));
        self.send(request).await?.json()
    }

    /// Send once, read the whole body under the read timeout and fail on non-2xx.
    /// Never retries.
    async fn send(&self, request: VaultRequest) -> Result<VaultResponse, InvocationError> {
        let url = self.urls.url(&request.path)?;
        let mut builder = self
            .client
            .request(request.method, url)
            .headers(request.headers);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match request.body {
            Some(RequestBody::Text(text)) => builder.body(text),
            Some(RequestBody::Json(value)) => {
                let bytes = serde_json::to_vec(&value).map_err(|e| {
                    InvocationError::validation(format!("Failed to encode request body: {}", e))
                })?;
                builder.body(bytes)
            }
            None => builder,
        };

        let http_request = builder.build().map_err(|e| {
            InvocationError::validation(format!("Failed to build request: {}", e))
        })?;
        debug!(method = %http_request.method(), url = %http_request.url(), "vault request");

        let client = &self.client;
        let response = self
            .timeouts
            .execute_with_timeout(async move {
                let response = client.execute(http_request).await?;
                let status = response.status();
                let body = response.text().await?;
                Ok::<_, reqwest::Error>(VaultResponse::new(status, body))
            })
            .await?;

        debug!(status = response.status.as_u16(), "vault response");
        response.error_for_status()
    }
}

fn json_or_empty(value: Option<JsonValue>) -> Payload {
    value.map(Payload::Json).unwrap_or(Payload::Empty)
}
