//! HTTP access for remote options sources.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use super::error::ResolveError;

/// Default limit applied to a single options request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimal GET client returning a JSON body.
#[async_trait]
pub trait HttpClient: Send + Sync {
	async fn get_json(&self, url: &Url, headers: &[(String, String)]) -> Result<Value, ResolveError>;
}

/// [`HttpClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
	client: reqwest::Client,
}

impl ReqwestClient {
	pub fn new(timeout: Option<Duration>) -> Result<Self, ResolveError> {
		let mut builder = reqwest::Client::builder();
		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}
		let client = builder
			.build()
			.map_err(|err| ResolveError::transport("<client>", err.to_string()))?;
		Ok(Self { client })
	}
}

#[async_trait]
impl HttpClient for ReqwestClient {
	async fn get_json(&self, url: &Url, headers: &[(String, String)]) -> Result<Value, ResolveError> {
		debug!(%url, "fetching remote options");

		let mut request = self.client.get(url.clone());
		for (name, value) in headers {
			request = request.header(name.as_str(), value.as_str());
		}

		let response = request
			.send()
			.await
			.map_err(|err| ResolveError::transport(url.as_str(), err.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			return Err(ResolveError::transport(
				url.as_str(),
				format!("HTTP {status}"),
			));
		}

		let body = response
			.bytes()
			.await
			.map_err(|err| ResolveError::transport(url.as_str(), err.to_string()))?;
		serde_json::from_slice(&body).map_err(|err| ResolveError::parse("response body", err.to_string()))
	}
}

/// Parse the `url-http-headers` attribute: a JSON object of header names to values.
pub fn parse_header_map(raw: &str) -> Result<Vec<(String, String)>, ResolveError> {
	let document: Value = serde_json::from_str(raw)
		.map_err(|err| ResolveError::parse("HTTP header map", err.to_string()))?;
	let Value::Object(entries) = document else {
		return Err(ResolveError::parse(
			"HTTP header map",
			"expected a JSON object",
		));
	};

	Ok(entries
		.into_iter()
		.map(|(name, value)| {
			let value = match value {
				Value::String(text) => text,
				other => other.to_string(),
			};
			(name, value)
		})
		.collect())
}

/// Check whether a descriptor looks like an absolute or root-relative URL.
pub fn looks_like_url(descriptor: &str) -> bool {
	if Url::parse(descriptor).is_ok() {
		return true;
	}

	let mut chars = descriptor.chars();
	chars.next() == Some('/') && chars.next().is_some_and(|ch| ch != '/' && !ch.is_whitespace())
}

/// Resolve a descriptor against `base`, setting `param=term` when both are present.
pub fn request_url(
	base: &Url,
	descriptor: &str,
	search_param: Option<&str>,
	term: &str,
) -> Result<Url, ResolveError> {
	let mut url = base
		.join(descriptor)
		.map_err(|err| ResolveError::parse("options URL", err.to_string()))?;

	if let Some(param) = search_param.filter(|param| !param.is_empty())
		&& !term.is_empty()
	{
		let retained: Vec<(String, String)> = url
			.query_pairs()
			.filter(|(name, _)| name != param)
			.map(|(name, value)| (name.into_owned(), value.into_owned()))
			.collect();
		url.query_pairs_mut()
			.clear()
			.extend_pairs(retained)
			.append_pair(param, term);
	}

	Ok(url)
}
