//! WANGuard API client
//!
//! Single point of contact with the remote API. Every request goes through
//! the same transport policy, credential handling and response checks, and
//! updates the target's availability signal.
//!
//! # Example
//!
//! ```ignore
//! use wanguard_exporter::client::{ApiClient, Target};
//!
//! let target = Target::new("https://wanguard.example.com", "admin", password, false)?;
//! let client = ApiClient::new(target)?;
//! let count: CountResponse = client.get_parsed("firewall_rules?count=true").await?;
//! ```

mod policy;

pub use policy::{RedirectAction, Target, TransportPolicy, MAX_REDIRECTS};

use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{Client, ClientBuilder, Request, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ConfigError;
use crate::error::ClientError;
use crate::metrics::AvailabilitySignal;

/// Fixed API version segment prefixed to relative paths
pub const API_PREFIX: &str = "/wanguard-api/v1/";

/// Response bodies are cut off after this many bytes
pub const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// Authenticated client for one WANGuard API target
#[derive(Debug)]
pub struct ApiClient {
    client: Client,
    target: Target,
    policy: TransportPolicy,
    availability: AvailabilitySignal,
}

impl ApiClient {
    /// Create a client with its own availability signal
    ///
    /// # Errors
    /// Returns `ConfigError::HttpClient` if the HTTP client cannot be built
    pub fn new(target: Target) -> Result<Self, ConfigError> {
        Self::with_availability(target, AvailabilitySignal::new())
    }

    /// Create a client that records availability into a shared signal
    pub fn with_availability(
        target: Target,
        availability: AvailabilitySignal,
    ) -> Result<Self, ConfigError> {
        let policy = TransportPolicy::for_target(&target);
        Self::with_policy(target, policy, availability)
    }

    /// Create a client with an explicit transport policy
    pub fn with_policy(
        target: Target,
        policy: TransportPolicy,
        availability: AvailabilitySignal,
    ) -> Result<Self, ConfigError> {
        if !policy.verify_certificates {
            warn!(
                address = %target.address(),
                "TLS certificate verification is disabled"
            );
        }

        // Redirects are followed in `get` so credentials can be dropped per hop.
        // The request deadline is applied there too, across all hops.
        let client = ClientBuilder::new()
            .connect_timeout(policy.connect_timeout)
            .pool_max_idle_per_host(policy.max_idle_per_host)
            .pool_idle_timeout(policy.idle_timeout)
            .min_tls_version(policy.min_tls_version)
            .danger_accept_invalid_certs(!policy.verify_certificates)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            target,
            policy,
            availability,
        })
    }

    /// Target this client talks to
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Transport policy in effect
    pub fn policy(&self) -> &TransportPolicy {
        &self.policy
    }

    /// Availability signal updated by every request
    pub fn availability(&self) -> &AvailabilitySignal {
        &self.availability
    }

    /// Build the absolute URL for an API path
    ///
    /// The version prefix is added unless the path already contains it.
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let base = self.target.address();
        let full = if path.contains(API_PREFIX) {
            format!("{}/{}", base, path.trim_start_matches('/'))
        } else {
            format!("{}{}{}", base, API_PREFIX, path.trim_start_matches('/'))
        };

        Url::parse(&full).map_err(ClientError::InvalidUrl)
    }

    /// GET an API path and return the (size-capped) body
    ///
    /// Non-2xx responses and transport failures mark the target down; 2xx
    /// responses mark it up. Bodies longer than [`MAX_RESPONSE_SIZE`] are
    /// truncated to the cap and returned as a successful read. The whole
    /// exchange, redirects and body included, runs under the policy's
    /// request timeout.
    #[instrument(skip(self), fields(address = %self.target.address()))]
    pub async fn get(&self, path: &str) -> Result<Vec<u8>, ClientError> {
        let url = self.endpoint(path)?;
        let deadline = self.policy.request_timeout;

        match tokio::time::timeout(deadline, self.fetch(url)).await {
            Ok(result) => result,
            Err(_) => {
                self.availability.mark_down(self.target.address());
                Err(ClientError::RequestTimeout(deadline))
            }
        }
    }

    async fn fetch(&self, url: Url) -> Result<Vec<u8>, ClientError> {
        let response = match self.send_following_redirects(url).await {
            Ok(response) => response,
            Err(e) => {
                self.availability.mark_down(self.target.address());
                return Err(e);
            }
        };

        let status = response.status();
        if !status.is_success() {
            self.availability.mark_down(self.target.address());
            return Err(ClientError::HttpStatus(status.as_u16()));
        }
        self.availability.mark_up(self.target.address());

        if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
            let content_type = content_type.to_str().unwrap_or_default();
            if !is_json_content_type(content_type) {
                return Err(ClientError::UnexpectedContentType(content_type.to_string()));
            }
        }

        read_capped(response, MAX_RESPONSE_SIZE).await
    }

    /// GET an API path and decode the JSON body into `T`
    pub async fn get_parsed<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let body = self.get(path).await?;
        serde_json::from_slice(&body).map_err(ClientError::Decode)
    }

    async fn send_following_redirects(&self, url: Url) -> Result<Response, ClientError> {
        let original = url.clone();
        let mut current = url;
        let mut keep_auth = true;
        let mut hops = 0;

        loop {
            let response = self.send_once(current.clone(), keep_auth).await?;

            if !response.status().is_redirection() {
                return Ok(response);
            }
            let Some(location) = response.headers().get(LOCATION) else {
                return Ok(response);
            };

            let location = location
                .to_str()
                .map_err(|_| ClientError::Redirect("non-ASCII Location header".to_string()))?;
            let next = current.join(location).map_err(ClientError::InvalidUrl)?;

            match self.policy.check_redirect(&original, &next, hops) {
                RedirectAction::Follow { keep_auth: keep } => {
                    debug!(from = %current, to = %next, keep_auth = keep, "Following redirect");
                    keep_auth = keep;
                    current = next;
                    hops += 1;
                }
                RedirectAction::Refuse(reason) => return Err(ClientError::Redirect(reason)),
            }
        }
    }

    /// Build one GET request, with Basic credentials only if `with_auth`
    pub fn build_request(&self, url: Url, with_auth: bool) -> Result<Request, ClientError> {
        let mut req = self.client.get(url);
        if with_auth {
            req = req.basic_auth(
                self.target.username(),
                Some(self.target.password().expose()),
            );
        }
        req.build().map_err(ClientError::Transport)
    }

    async fn send_once(&self, url: Url, with_auth: bool) -> Result<Response, ClientError> {
        let request = self.build_request(url, with_auth)?;

        // `execute` resolves once headers arrive, which bounds header latency
        match tokio::time::timeout(
            self.policy.response_header_timeout,
            self.client.execute(request),
        )
        .await
        {
            Ok(result) => result.map_err(ClientError::Transport),
            Err(_) => Err(ClientError::HeaderTimeout(
                self.policy.response_header_timeout,
            )),
        }
    }
}

fn is_json_content_type(value: &str) -> bool {
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

async fn read_capped(mut response: Response, cap: usize) -> Result<Vec<u8>, ClientError> {
    let declared = response.content_length();
    let initial = declared.map(|len| (len as usize).min(cap)).unwrap_or(0);
    let mut body = Vec::with_capacity(initial);

    while let Some(chunk) = response.chunk().await.map_err(ClientError::Body)? {
        let remaining = cap - body.len();
        if chunk.len() >= remaining {
            body.extend_from_slice(&chunk[..remaining]);
            if chunk.len() > remaining || declared.is_some_and(|len| len > cap as u64) {
                warn!(cap, "Response body exceeded size cap and was truncated");
            }
            break;
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}
