//! HTTP client for facet-filtered open-data services.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::{
    errors::{Error, TransportError},
    normalize::{normalize_page, NormalizedRecord},
    paginate::{PageCursor, ProgressObserver},
    query::FetchSpec,
    resolve::{resolve_or_fallback, Candidate, FallbackPolicy, PreferenceList},
    retry::{Attempt, RetryPolicy},
    types::{CountResponse, DatasetMetadata, ErrorBody, FacetValuesResponse, RowsetResponse},
};

/// Per-request timeout, applied independently to every attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default window for one facet-value listing request.
const FACET_PAGE_LENGTH: u64 = 5000;

/// Client for one open-data service.
///
/// All configuration is injected at construction: base URL, opaque
/// credential, and retry policy. The credential is forwarded verbatim as a
/// query parameter; its format is never inspected. One `reqwest::Client`
/// is built up front and reused for every request.
pub struct Client {
    base_url: String,
    credential: Option<String>,
    retry: RetryPolicy,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::ClientBuild)?;
        Ok(Client {
            base_url: base_url.trim_end_matches('/').to_string(),
            credential: None,
            retry: RetryPolicy::default(),
            http,
        })
    }

    /// Sets the opaque credential forwarded as the `api_key` parameter.
    pub fn with_credential(mut self, credential: &str) -> Self {
        self.credential = Some(credential.to_string());
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint_url(&self, path: &str, params: &[(String, String)]) -> Result<Url, Error> {
        let mut url = Url::parse(&format!(
            "{}/{}",
            self.base_url,
            path.trim_start_matches('/')
        ))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            if let Some(credential) = &self.credential {
                pairs.append_pair("api_key", credential);
            }
        }
        Ok(url)
    }

    /// One attempt on the wire: transport classification and logical-error
    /// detection, no retries.
    async fn attempt<T: DeserializeOwned>(&self, url: Url) -> Attempt<T> {
        let resp = match self
            .http
            .get(url)
            .header("accept", "application/json")
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => return Attempt::Transport(TransportError::Network(e)),
        };

        let status = resp.status();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => return Attempt::Transport(TransportError::Network(e)),
        };

        if !status.is_success() {
            return Attempt::Transport(TransportError::HttpStatus {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let value: Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(e) => {
                return Attempt::Transport(TransportError::Malformed(format!(
                    "{} | body: {}",
                    e,
                    truncate_body(&body)
                )))
            }
        };

        // An error-shaped 200 is a logical failure, not a transport one.
        if let Some(err) = value.get("error") {
            return Attempt::Rejected(ErrorBody::from_value(err));
        }

        match serde_json::from_value::<T>(value) {
            Ok(parsed) => Attempt::Success(parsed),
            Err(e) => Attempt::Transport(TransportError::Malformed(e.to_string())),
        }
    }

    /// Executes one logical GET against `path`, retrying transport failures
    /// with exponential backoff.
    ///
    /// `params` is a flat set of query-string pairs; array values are
    /// expressed as repeated keys. Service-reported errors surface
    /// immediately as [`Error::ServiceRejected`]; transport failures are
    /// retried until the policy's attempt budget is spent, then escalate to
    /// [`Error::Acquisition`] wrapping the last failure. The backoff sleep
    /// suspends the calling sequence.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, Error> {
        let url = self.endpoint_url(path, params)?;
        let mut attempts = 0u32;
        loop {
            match self.attempt::<T>(url.clone()).await {
                Attempt::Success(parsed) => return Ok(parsed),
                Attempt::Rejected(body) => {
                    tracing::error!(url = %url, "service rejected the request: {}", body);
                    return Err(Error::ServiceRejected(body));
                }
                Attempt::Transport(err) => {
                    attempts += 1;
                    if attempts >= self.retry.max_attempts {
                        tracing::error!(url = %url, attempts, "giving up: {}", err);
                        return Err(Error::Acquisition {
                            attempts,
                            last: err,
                        });
                    }
                    let delay = self.retry.backoff_delay(attempts - 1);
                    tracing::warn!(
                        url = %url,
                        attempt = attempts,
                        "transport failure, retrying in {:?}: {}",
                        delay,
                        err
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Asks how many records match the spec, without transferring rows.
    /// An empty match set is 0, not an error.
    pub async fn count(&self, spec: &FetchSpec) -> Result<u64, Error> {
        let mut params = spec.query_params();
        params.push(("count_only".to_string(), "true".to_string()));
        let resp: CountResponse = self
            .execute(&format!("{}/data", spec.route()), &params)
            .await?;
        Ok(resp.count)
    }

    /// Fetches one page of raw rows at the given offset.
    pub(crate) async fn fetch_page(
        &self,
        spec: &FetchSpec,
        offset: u64,
        limit: u64,
    ) -> Result<RowsetResponse, Error> {
        let mut params = spec.query_params();
        params.push(("offset".to_string(), offset.to_string()));
        params.push(("limit".to_string(), limit.to_string()));
        self.execute(&format!("{}/data", spec.route()), &params)
            .await
    }

    /// Lazy page cursor over everything matching the spec. Each cursor
    /// takes its own count snapshot on the first page request.
    pub fn pages<'a>(&'a self, spec: &'a FetchSpec) -> PageCursor<'a> {
        PageCursor::new(self, spec)
    }

    /// Drives a cursor to completion, normalizing each page as it arrives
    /// and notifying the observer after every page.
    pub async fn fetch_all(
        &self,
        spec: &FetchSpec,
        observer: &dyn ProgressObserver,
    ) -> Result<Vec<NormalizedRecord>, Error> {
        let mut cursor = self.pages(spec);
        let mut records = Vec::new();
        while let Some(page) = cursor.next_page().await? {
            records.extend(normalize_page(&page));
            observer.page_fetched(cursor.fetched(), page.total);
        }
        if cursor.shortfall() > 0 {
            tracing::warn!(
                shortfall = cursor.shortfall(),
                "service under-delivered relative to the count snapshot"
            );
        }
        Ok(records)
    }

    /// Lists the legal values of one facet.
    pub async fn facet_values(&self, route: &str, facet_id: &str) -> Result<Vec<Candidate>, Error> {
        self.facet_values_at(route, facet_id, FACET_PAGE_LENGTH, 0)
            .await
    }

    /// Facet-value listing with explicit window, for facets whose value
    /// lists are themselves paged.
    pub async fn facet_values_at(
        &self,
        route: &str,
        facet_id: &str,
        length: u64,
        offset: u64,
    ) -> Result<Vec<Candidate>, Error> {
        let params = vec![
            ("length".to_string(), length.to_string()),
            ("offset".to_string(), offset.to_string()),
        ];
        let resp: FacetValuesResponse = self
            .execute(
                &format!("{}/facet/{}", route.trim_matches('/'), facet_id),
                &params,
            )
            .await?;
        Ok(resp.facets)
    }

    /// Schema description for a dataset route.
    pub async fn metadata(&self, route: &str) -> Result<DatasetMetadata, Error> {
        self.execute(route.trim_matches('/'), &[]).await
    }

    /// Units declared in the metadata for each requested field; empty
    /// string when the field declares none.
    pub async fn field_units(
        &self,
        route: &str,
        fields: &[&str],
    ) -> Result<BTreeMap<String, String>, Error> {
        let meta = self.metadata(route).await?;
        Ok(fields
            .iter()
            .map(|f| (f.to_string(), meta.units_for(f).unwrap_or("").to_string()))
            .collect())
    }

    /// Resolves a facet value id for `facet_id` on `route` against the
    /// caller's preferences.
    pub async fn resolve_facet(
        &self,
        route: &str,
        facet_id: &str,
        prefs: &PreferenceList,
        policy: FallbackPolicy,
    ) -> Result<String, Error> {
        let candidates = self.facet_values(route, facet_id).await?;
        let id = resolve_or_fallback(facet_id, &candidates, prefs, policy)?;
        Ok(id.to_string())
    }

    /// Resolves which schema field carries a desired quantity (e.g. which
    /// of many column names means "generation").
    pub async fn resolve_column(
        &self,
        route: &str,
        subject: &str,
        prefs: &PreferenceList,
        policy: FallbackPolicy,
    ) -> Result<String, Error> {
        let meta = self.metadata(route).await?;
        let candidates = meta.field_candidates();
        let id = resolve_or_fallback(subject, &candidates, prefs, policy)?;
        Ok(id.to_string())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        format!("{}...[truncated]", &body[..MAX])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_joins_and_appends_credential() {
        let client = Client::new("https://api.example.com/v2/")
            .unwrap()
            .with_credential("SECRET");
        let url = client
            .endpoint_url(
                "/electricity/retail-sales/data",
                &[("start".to_string(), "2021-01".to_string())],
            )
            .unwrap();
        assert_eq!(url.path(), "/v2/electricity/retail-sales/data");
        let query = url.query().unwrap();
        assert!(query.contains("start=2021-01"));
        assert!(query.contains("api_key=SECRET"));
    }

    #[test]
    fn truncate_body_caps_long_bodies() {
        let long = "x".repeat(5000);
        let snippet = truncate_body(&long);
        assert!(snippet.len() < 2100);
        assert!(snippet.ends_with("[truncated]"));
    }
}
