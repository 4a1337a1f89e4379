use crate::payload::{App, Device, User};

/// Host all reports are delivered to unless an endpoint override is set.
pub const NOTIFY_HOST: &str = "notify.bugsnag.com";

/// Per-client configuration. Built once by the embedding application and
/// handed to [`Client::new`](crate::Client::new); nothing here is process
/// global and nothing is mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Project API key. The notify endpoint rejects payloads without one.
    pub api_key: String,
    /// Deployment stage this process runs in.
    pub release_stage: String,
    /// Stages for which callers honoring the policy should send reports.
    pub notify_release_stages: Vec<String>,
    /// Whether integrations such as the panic hook should report on their
    /// own. The core notify path never consults this.
    pub auto_notify: bool,
    /// Selects the scheme used for the fixed notify host.
    pub use_ssl: bool,
    /// Full endpoint override, e.g. for an on-premise install. Takes
    /// precedence over `use_ssl` when set.
    pub endpoint: Option<String>,
    /// Default user attached to every event built by `notify`.
    pub user: User,
    /// Default app attached to every event built by `notify`.
    pub app: App,
    /// Default device attached to every event built by `notify`.
    pub device: Device,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            release_stage: "production".to_owned(),
            notify_release_stages: vec!["production".to_owned(), "development".to_owned()],
            auto_notify: true,
            use_ssl: true,
            endpoint: None,
            user: User::default(),
            app: App::default(),
            device: Device::default(),
        }
    }

    /// Target URL for report delivery.
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => {
                let scheme = if self.use_ssl { "https" } else { "http" };
                format!("{}://{}", scheme, NOTIFY_HOST)
            }
        }
    }

    /// Whether the configured release stage is one that should be
    /// reported on. This is caller policy: `notify` itself always
    /// dispatches, integrations check here first.
    pub fn should_notify(&self) -> bool {
        self.notify_release_stages
            .iter()
            .any(|stage| stage == &self.release_stage)
    }
}
