//! Data loading over the GraphQL collaborator.
//!
//! Screens see every request as `{loading, error, data}` ([`LoadState`]).
//! Responses can arrive out of order; [`QueryHandle`] only applies the one
//! belonging to the most recently issued request. There is no retry and no
//! explicit cancellation: a failed request surfaces as `error`.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::fmt;
use tokio::sync::watch;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Executes a GraphQL document and returns its `data` member.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait QueryClient {
    async fn query(&self, document: &str, variables: Value) -> Result<Value>;
}

/// HTTP GraphQL client.
pub struct GraphqlClient {
    url: String,
    #[cfg_attr(target_arch = "wasm32", allow(dead_code))]
    timeout_ms: u64,
    http: reqwest::Client,
}

impl GraphqlClient {
    pub fn new(url: &str, timeout_ms: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| anyhow!("http client: {e}"))?;
        Ok(Self {
            url: url.to_string(),
            timeout_ms,
            http,
        })
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl QueryClient for GraphqlClient {
    async fn query(&self, document: &str, variables: Value) -> Result<Value> {
        let req = self
            .http
            .post(&self.url)
            .json(&json!({ "query": document, "variables": variables }));
        #[cfg(not(target_arch = "wasm32"))]
        let req = req.timeout(Duration::from_millis(self.timeout_ms));

        let res = req.send().await?;
        if !res.status().is_success() {
            return Err(anyhow!("http {}", res.status()));
        }
        let body: Value = res.json().await?;
        extract_data(body)
    }
}

/// Split a GraphQL response into `data` or a [`LoadError`].
pub fn extract_data(body: Value) -> Result<Value> {
    if let Some(first) = body.get("errors").and_then(Value::as_array).and_then(|e| e.first()) {
        let message = first
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("graphql error")
            .to_string();
        let ext = first.get("extensions");
        let not_found = match ext.and_then(|e| e.get("code")).and_then(Value::as_str) {
            Some("NOT_FOUND") => Some(
                ext.and_then(|e| e.get("entity"))
                    .and_then(Value::as_str)
                    .map(EntityKind::parse)
                    .unwrap_or(EntityKind::Other(String::new())),
            ),
            _ => None,
        };
        return Err(LoadError { message, not_found }.into());
    }
    match body.get("data") {
        Some(Value::Null) | None => Err(anyhow!("graphql response without data")),
        Some(data) => Ok(data.clone()),
    }
}

/// Kind of entity the server reported as missing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Pool,
    Address,
    Transaction,
    Block,
    Epoch,
    Other(String),
}

impl EntityKind {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "pool" | "stakepool" => EntityKind::Pool,
            "address" => EntityKind::Address,
            "transaction" | "tx" => EntityKind::Transaction,
            "block" => EntityKind::Block,
            "epoch" => EntityKind::Epoch,
            other => EntityKind::Other(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadError {
    pub message: String,
    pub not_found: Option<EntityKind>,
}

impl LoadError {
    fn from_anyhow(e: &anyhow::Error) -> Self {
        match e.downcast_ref::<LoadError>() {
            Some(le) => le.clone(),
            None => LoadError {
                message: format!("{e:#}"),
                not_found: None,
            },
        }
    }

    /// Text for the generic error panel.
    pub fn user_message(&self) -> String {
        match &self.not_found {
            Some(EntityKind::Pool) => "Stake pool not found".to_string(),
            Some(EntityKind::Address) => "Address not found".to_string(),
            Some(EntityKind::Transaction) => "Transaction not found".to_string(),
            Some(EntityKind::Block) => "Block not found".to_string(),
            Some(EntityKind::Epoch) => "Epoch not found".to_string(),
            Some(EntityKind::Other(_)) => "Not found".to_string(),
            None => "Could not load data".to_string(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LoadError {}

/// `{loading, error, data}` as seen by a screen. Stale data is kept while a
/// newer request is loading.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadState<T> {
    pub loading: bool,
    pub error: Option<LoadError>,
    pub data: Option<T>,
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self {
            loading: false,
            error: None,
            data: None,
        }
    }
}

/// What the renderer should draw.
#[derive(Debug, PartialEq)]
pub enum View<'a, T> {
    Loading,
    Error(&'a LoadError),
    Empty,
    Ready(&'a T),
}

impl<T> LoadState<T> {
    pub fn view(&self, is_empty: impl Fn(&T) -> bool) -> View<'_, T> {
        if let Some(e) = &self.error {
            return View::Error(e);
        }
        match &self.data {
            _ if self.loading => View::Loading,
            Some(d) if is_empty(d) => View::Empty,
            Some(d) => View::Ready(d),
            None => View::Empty,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct QueryOptions {
    pub variables: Value,
    pub skip: bool,
    pub poll_interval: Option<Duration>,
}

impl QueryOptions {
    pub fn new(variables: Value) -> Self {
        Self {
            variables,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestId(u64);

type Reshape<T> = Box<dyn Fn(Value) -> Result<T>>;

/// One query on one screen: issues requests, applies the latest response,
/// reshapes raw `data` into a view model, and notifies watchers.
pub struct QueryHandle<T> {
    document: &'static str,
    reshape: Reshape<T>,
    latest: u64,
    issued_at: Option<Instant>,
    poll_interval: Option<Duration>,
    state: LoadState<T>,
    version: watch::Sender<u64>,
}

impl<T> QueryHandle<T> {
    pub fn new(document: &'static str, reshape: impl Fn(Value) -> Result<T> + 'static) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            document,
            reshape: Box::new(reshape),
            latest: 0,
            issued_at: None,
            poll_interval: None,
            state: LoadState::default(),
            version,
        }
    }

    pub fn document(&self) -> &'static str {
        self.document
    }

    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    /// Receives a new version number after every state change.
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }

    /// Start a request. `None` when `skip` is set (state is left idle).
    pub fn begin(&mut self, options: &QueryOptions, now: Instant) -> Option<RequestId> {
        self.poll_interval = options.poll_interval;
        if options.skip {
            self.state.loading = false;
            self.bump();
            return None;
        }
        self.latest += 1;
        self.issued_at = Some(now);
        self.state.loading = true;
        self.bump();
        Some(RequestId(self.latest))
    }

    /// Apply a response. Responses for anything but the latest request are
    /// dropped; returns whether this one was applied.
    pub fn complete(&mut self, id: RequestId, result: Result<Value>) -> bool {
        if id.0 != self.latest {
            log::debug!("[loading] dropping stale response {} (latest {})", id.0, self.latest);
            return false;
        }
        self.state.loading = false;
        match result.and_then(|data| (self.reshape)(data)) {
            Ok(data) => {
                self.state.data = Some(data);
                self.state.error = None;
            }
            Err(e) => {
                log::warn!("[loading] {} failed: {e:#}", self.document);
                self.state.error = Some(LoadError::from_anyhow(&e));
            }
        }
        self.bump();
        true
    }

    /// Issue and await one request.
    pub async fn fetch(&mut self, client: &dyn QueryClient, options: &QueryOptions) -> &LoadState<T> {
        if let Some(id) = self.begin(options, Instant::now()) {
            let result = client.query(self.document, options.variables.clone()).await;
            self.complete(id, result);
        }
        &self.state
    }

    /// Whether the poll interval has elapsed since the last request.
    pub fn poll_due(&self, now: Instant) -> bool {
        match (self.poll_interval, self.issued_at) {
            (Some(every), Some(at)) => !self.state.loading && now.saturating_duration_since(at) >= every,
            _ => false,
        }
    }
}
