use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use super::*;
use crate::engine::host::{async_fn, sync_fn};
use crate::engine::markup::OptionTagParser;
use crate::engine::source::classify;

const SCENARIO_JSON: &str = r#"[{"value":"1","label":"Option 1"},{"value":"2","label":"Option 2"}]"#;

#[derive(Default)]
struct FakeHttp {
	requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
	fail: bool,
}

#[async_trait]
impl HttpClient for FakeHttp {
	async fn get_json(&self, url: &Url, headers: &[(String, String)]) -> Result<Value, ResolveError> {
		self.requests
			.lock()
			.unwrap()
			.push((url.to_string(), headers.to_vec()));
		if self.fail {
			return Err(ResolveError::transport(url.as_str(), "connection refused"));
		}
		Ok(json!([
			{ "value": "1", "label": "Option 1" },
			{ "value": "4", "label": "Aption 4" },
		]))
	}
}

fn collaborators(host: HostRegistry, http: Arc<FakeHttp>) -> Collaborators {
	Collaborators {
		host,
		markup: Arc::new(OptionTagParser),
		http,
		base_url: Url::parse("http://localhost:3000/").unwrap(),
	}
}

fn provider_for(text: &str, host: &HostRegistry, settings: &ProviderSettings) -> OptionsProvider {
	let descriptor = SourceDescriptor::Options(text.to_string());
	OptionsProvider::build(&descriptor, classify(&descriptor, host), settings)
}

fn values(items: &[Item]) -> Vec<&str> {
	items.iter().map(|item| item.value.as_str()).collect()
}

#[tokio::test]
async fn json_literal_scenario() {
	let host = HostRegistry::new();
	let collab = collaborators(host.clone(), Arc::default());
	let provider = provider_for(SCENARIO_JSON, &host, &ProviderSettings::default());
	assert_eq!(provider.kind(), ProviderKind::JsonLiteral);

	let all = provider.resolve("", &collab).await.unwrap();
	assert_eq!(all, vec![Item::new("1", "Option 1"), Item::new("2", "Option 2")]);

	let filtered = provider.resolve("2", &collab).await.unwrap();
	assert_eq!(filtered.len(), 1);
	assert_eq!(filtered[0].value, "2");
	assert_eq!(filtered[0].label, "Option 2");
}

#[tokio::test]
async fn inline_markup_uses_widget_content() {
	let host = HostRegistry::new();
	let collab = collaborators(host.clone(), Arc::default());
	let settings = ProviderSettings {
		inline_markup: "<option value=\"a\">Apple</option><option value=\"b\">Banana</option>"
			.into(),
		..ProviderSettings::default()
	};
	let provider = OptionsProvider::build(
		&SourceDescriptor::Inline,
		classify(&SourceDescriptor::Inline, &host),
		&settings,
	);

	assert_eq!(values(&provider.resolve("", &collab).await.unwrap()), vec!["a", "b"]);
	assert_eq!(values(&provider.resolve("BAN", &collab).await.unwrap()), vec!["b"]);
}

#[tokio::test]
async fn element_reference_reads_current_markup() {
	let host = HostRegistry::new().with_element("fruit", "<option value=\"a\">Apple</option>");
	let collab = collaborators(host.clone(), Arc::default());
	let provider = provider_for("fruit", &host, &ProviderSettings::default());
	assert_eq!(provider.kind(), ProviderKind::ElementRef);

	host.register_element("fruit", "<option value=\"c\">Cherry</option>");
	assert_eq!(values(&provider.resolve("", &collab).await.unwrap()), vec!["c"]);
}

#[tokio::test]
async fn global_reference_filters_client_side() {
	let host = HostRegistry::new().with_object("colors", json!(["Red", "Green", "Blue"]));
	let collab = collaborators(host.clone(), Arc::default());
	let provider = provider_for("colors", &host, &ProviderSettings::default());

	assert_eq!(values(&provider.resolve("e", &collab).await.unwrap()), vec!["Red", "Green", "Blue"]);
	assert_eq!(values(&provider.resolve("re", &collab).await.unwrap()), vec!["Red", "Green"]);

	host.remove("colors");
	let err = provider.resolve("", &collab).await.unwrap_err();
	assert!(matches!(err, ResolveError::ProviderInvocation { .. }));
}

#[tokio::test]
async fn remote_url_with_search_param_skips_client_filter() {
	let host = HostRegistry::new();
	let http = Arc::new(FakeHttp::default());
	let collab = collaborators(host.clone(), Arc::clone(&http));
	let settings = ProviderSettings {
		search_param: Some("search".into()),
		http_headers: Some(r#"{"Authorization":"Bearer t"}"#.into()),
		..ProviderSettings::default()
	};
	let provider = provider_for("/api/options", &host, &settings);
	assert_eq!(provider.kind(), ProviderKind::RemoteUrl);

	// The fake server ignores the parameter, so an unfiltered answer proves
	// the term was delegated rather than applied locally.
	let items = provider.resolve("zzz", &collab).await.unwrap();
	assert_eq!(values(&items), vec!["1", "4"]);

	let requests = http.requests.lock().unwrap();
	assert_eq!(requests[0].0, "http://localhost:3000/api/options?search=zzz");
	assert_eq!(
		requests[0].1,
		vec![("Authorization".to_string(), "Bearer t".to_string())]
	);
}

#[tokio::test]
async fn remote_url_without_search_param_filters_locally() {
	let host = HostRegistry::new();
	let http = Arc::new(FakeHttp::default());
	let collab = collaborators(host.clone(), Arc::clone(&http));
	let provider = provider_for("/api/options", &host, &ProviderSettings::default());

	let items = provider.resolve("aption", &collab).await.unwrap();
	assert_eq!(values(&items), vec!["4"]);
	assert_eq!(http.requests.lock().unwrap()[0].0, "http://localhost:3000/api/options");
}

#[tokio::test]
async fn remote_failures_propagate() {
	let host = HostRegistry::new();
	let http = Arc::new(FakeHttp {
		fail: true,
		..FakeHttp::default()
	});
	let collab = collaborators(host.clone(), http);
	let provider = provider_for("https://example.com/options", &host, &ProviderSettings::default());
	let err = provider.resolve("", &collab).await.unwrap_err();
	assert!(matches!(err, ResolveError::Transport { .. }));

	let settings = ProviderSettings {
		http_headers: Some("not json".into()),
		..ProviderSettings::default()
	};
	let provider = provider_for("/api/options", &host, &settings);
	let err = provider.resolve("", &collab).await.unwrap_err();
	assert!(matches!(err, ResolveError::Parse { .. }));
}

#[tokio::test]
async fn first_resolution_reuses_probe_result() {
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&calls);
	let host = HostRegistry::new().with_function(
		"loadOptions",
		sync_fn(move |args| {
			let call = counter.fetch_add(1, Ordering::SeqCst);
			assert!(args.is_none());
			Ok(json!([format!("call-{call}")]))
		}),
	);
	let collab = collaborators(host.clone(), Arc::default());
	let provider = provider_for("loadOptions", &host, &ProviderSettings::default());
	assert_eq!(provider.kind(), ProviderKind::SyncFn);
	assert_eq!(calls.load(Ordering::SeqCst), 1);

	assert_eq!(values(&provider.resolve("", &collab).await.unwrap()), vec!["call-0"]);
	assert_eq!(calls.load(Ordering::SeqCst), 1);

	assert_eq!(values(&provider.resolve("", &collab).await.unwrap()), vec!["call-1"]);
	assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn promise_function_receives_search_argument() {
	let seen = Arc::new(Mutex::new(Vec::new()));
	let recorder = Arc::clone(&seen);
	let host = HostRegistry::new().with_function(
		"searchOptions",
		async_fn(move |args: Option<Value>| {
			recorder.lock().unwrap().push(args.clone());
			async move { Ok(json!([{ "value": "x", "label": "Xylophone" }, "other"])) }
		}),
	);
	let collab = collaborators(host.clone(), Arc::default());
	let settings = ProviderSettings {
		search_param: Some("q".into()),
		..ProviderSettings::default()
	};
	let provider = provider_for("searchOptions", &host, &settings);
	assert_eq!(provider.kind(), ProviderKind::PromiseFn);

	let items = provider.resolve("xylo", &collab).await.unwrap();
	assert_eq!(values(&items), vec!["x"]);

	let seen = seen.lock().unwrap();
	assert_eq!(seen.len(), 2, "probe plus one real call");
	assert_eq!(seen[0], None);
	assert_eq!(seen[1], Some(json!({ "q": "xylo" })));
}

#[tokio::test]
async fn rejected_promise_is_an_invocation_error() {
	let host = HostRegistry::new().with_function(
		"failing",
		async_fn(|_| async { Err(HostError::new("backend offline")) }),
	);
	let collab = collaborators(host.clone(), Arc::default());
	let provider = provider_for("failing", &host, &ProviderSettings::default());

	let err = provider.resolve("", &collab).await.unwrap_err();
	assert_eq!(
		err,
		ResolveError::ProviderInvocation {
			name: "failing".into(),
			message: "backend offline".into(),
		}
	);
}

#[tokio::test]
async fn unknown_kinds_fail_with_unsupported_kind() {
	let host = HostRegistry::new();
	let collab = collaborators(host.clone(), Arc::default());
	let provider = provider_for("mystery", &host, &ProviderSettings::default());

	let err = provider.resolve("", &collab).await.unwrap_err();
	assert_eq!(
		err,
		ResolveError::UnsupportedKind {
			kind: ProviderKind::Unknown
		}
	);
	assert!(err.to_string().contains("unknown"));
}
