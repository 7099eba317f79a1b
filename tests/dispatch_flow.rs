//! End-to-end dispatch tests over a real TCP listener.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};

use fsrouter::config::{Environment, RouterConfig};
use fsrouter::dispatch::{Handler, HandlerError, HandlerRef, LegacyHandler, Outcome, RequestContext};
use fsrouter::routing::{RouteTable, SharedRouteTable};

mod common;

/// Returns a fixed JSON document.
struct StaticJson(Value);

#[async_trait]
impl Handler for StaticJson {
    async fn call(&self, _ctx: &mut RequestContext) -> Result<Outcome, HandlerError> {
        Ok(Outcome::Json(self.0.clone()))
    }
}

/// Echoes the bound route parameters.
struct EchoParams;

#[async_trait]
impl Handler for EchoParams {
    async fn call(&self, ctx: &mut RequestContext) -> Result<Outcome, HandlerError> {
        Ok(Outcome::Json(json!({ "params": ctx.params() })))
    }
}

/// Middleware that appends its tag to a shared log.
struct SeqMiddleware {
    tag: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait]
impl Handler for SeqMiddleware {
    async fn call(&self, _ctx: &mut RequestContext) -> Result<Outcome, HandlerError> {
        self.log.lock().unwrap().push(self.tag);
        Ok(Outcome::NoContent)
    }
}

fn static_json(value: Value) -> HandlerRef {
    HandlerRef::standard(StaticJson(value))
}

#[tokio::test]
async fn test_method_suffix_routing() {
    let mut builder = RouteTable::builder();
    builder
        .route("test.get.ts", static_json(json!({ "verb": "get" })))
        .unwrap();
    builder
        .route("test.post.ts", static_json(json!({ "verb": "post" })))
        .unwrap();

    let (addr, _shutdown) = common::spawn_server(RouterConfig::default(), builder.build()).await;
    let client = reqwest::Client::new();

    let get: Value = client
        .get(format!("http://{addr}/test"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(get["verb"], "get");

    let post: Value = client
        .post(format!("http://{addr}/test"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(post["verb"], "post");

    let delete = client
        .delete(format!("http://{addr}/test"))
        .send()
        .await
        .unwrap();
    assert_eq!(delete.status().as_u16(), 404);
}

#[tokio::test]
async fn test_named_parameter_binding() {
    let mut builder = RouteTable::builder();
    builder
        .route("hello/[name].ts", HandlerRef::standard(EchoParams))
        .unwrap();

    let (addr, _shutdown) = common::spawn_server(RouterConfig::default(), builder.build()).await;

    let body: Value = reqwest::get(format!("http://{addr}/hello/world"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["params"]["name"], "world");
}

#[tokio::test]
async fn test_catch_all_receives_remainder() {
    let mut builder = RouteTable::builder();
    builder
        .route("foo/[...].ts", HandlerRef::standard(EchoParams))
        .unwrap();

    let (addr, _shutdown) = common::spawn_server(RouterConfig::default(), builder.build()).await;

    let body: Value = reqwest::get(format!("http://{addr}/foo/bar/baz"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["params"]["_"], "bar/baz");
}

#[tokio::test]
async fn test_middleware_order_every_request() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut builder = RouteTable::builder();
    // Registered out of order; execution must follow scan order.
    builder
        .middleware(
            "b.ts",
            HandlerRef::standard(SeqMiddleware {
                tag: "b",
                log: log.clone(),
            }),
        )
        .unwrap();
    builder
        .middleware(
            "a.ts",
            HandlerRef::standard(SeqMiddleware {
                tag: "a",
                log: log.clone(),
            }),
        )
        .unwrap();
    builder
        .route("ping.get.ts", static_json(json!({ "pong": true })))
        .unwrap();

    let (addr, _shutdown) = common::spawn_server(RouterConfig::default(), builder.build()).await;

    for _ in 0..2 {
        let response = reqwest::get(format!("http://{addr}/ping")).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }
    assert_eq!(*log.lock().unwrap(), vec!["a", "b", "a", "b"]);
}

#[tokio::test]
async fn test_middleware_answering_fails_request() {
    struct Answering;

    #[async_trait]
    impl Handler for Answering {
        async fn call(&self, _ctx: &mut RequestContext) -> Result<Outcome, HandlerError> {
            Ok(Outcome::Text("I answered".into()))
        }
    }

    let mut builder = RouteTable::builder();
    builder
        .middleware("rogue.ts", HandlerRef::standard(Answering))
        .unwrap();
    builder
        .route("ping.get.ts", static_json(json!({ "pong": true })))
        .unwrap();

    let (addr, _shutdown) = common::spawn_server(RouterConfig::default(), builder.build()).await;

    let response = reqwest::get(format!("http://{addr}/ping")).await.unwrap();
    assert_eq!(response.status().as_u16(), 500);
}

#[tokio::test]
async fn test_middleware_error_skips_handler() {
    struct Rejecting;

    #[async_trait]
    impl Handler for Rejecting {
        async fn call(&self, _ctx: &mut RequestContext) -> Result<Outcome, HandlerError> {
            Err(HandlerError::new(StatusCode::UNAUTHORIZED, "no token"))
        }
    }

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl Handler for Counting {
        async fn call(&self, _ctx: &mut RequestContext) -> Result<Outcome, HandlerError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Outcome::NoContent)
        }
    }

    let handler_calls = Arc::new(AtomicUsize::new(0));

    let mut builder = RouteTable::builder();
    builder
        .middleware("auth.ts", HandlerRef::standard(Rejecting))
        .unwrap();
    builder
        .route(
            "secret.get.ts",
            HandlerRef::standard(Counting(handler_calls.clone())),
        )
        .unwrap();

    let (addr, _shutdown) = common::spawn_server(RouterConfig::default(), builder.build()).await;

    let response = reqwest::get(format!("http://{addr}/secret")).await.unwrap();
    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(handler_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_handler_error_carries_status() {
    struct WrongVerb;

    #[async_trait]
    impl Handler for WrongVerb {
        async fn call(&self, _ctx: &mut RequestContext) -> Result<Outcome, HandlerError> {
            Err(HandlerError::new(
                StatusCode::METHOD_NOT_ALLOWED,
                "use POST instead",
            ))
        }
    }

    let mut builder = RouteTable::builder();
    builder
        .route("submit.get.ts", HandlerRef::standard(WrongVerb))
        .unwrap();

    let (addr, _shutdown) = common::spawn_server(RouterConfig::default(), builder.build()).await;

    let response = reqwest::get(format!("http://{addr}/submit")).await.unwrap();
    assert_eq!(response.status().as_u16(), 405);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "use POST instead");
}

#[tokio::test]
async fn test_production_masks_server_errors() {
    struct Exploding;

    #[async_trait]
    impl Handler for Exploding {
        async fn call(&self, _ctx: &mut RequestContext) -> Result<Outcome, HandlerError> {
            Err(HandlerError::internal("db password was hunter2"))
        }
    }

    let mut builder = RouteTable::builder();
    builder
        .route("boom.get.ts", HandlerRef::standard(Exploding))
        .unwrap();

    let mut config = RouterConfig::default();
    config.environment = Environment::Production;
    let (addr, _shutdown) = common::spawn_server(config, builder.build()).await;

    let response = reqwest::get(format!("http://{addr}/boom")).await.unwrap();
    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "internal server error");
}

#[tokio::test]
async fn test_legacy_handler_response_passes_through() {
    struct Finalized;

    #[async_trait]
    impl LegacyHandler for Finalized {
        async fn respond(&self, _ctx: &mut RequestContext) -> Result<Response, HandlerError> {
            Ok((
                StatusCode::CREATED,
                [("x-handled-by", "legacy")],
                "made it myself",
            )
                .into_response())
        }
    }

    let mut builder = RouteTable::builder();
    builder
        .route("upload.post.ts", HandlerRef::legacy(Finalized))
        .unwrap();

    let (addr, _shutdown) = common::spawn_server(RouterConfig::default(), builder.build()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/upload"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    assert_eq!(
        response
            .headers()
            .get("x-handled-by")
            .and_then(|v| v.to_str().ok()),
        Some("legacy")
    );
    assert_eq!(response.text().await.unwrap(), "made it myself");
}

#[tokio::test]
async fn test_api_prefix_serving() {
    let mut builder = RouteTable::builder();
    builder
        .api_route("status.get.ts", static_json(json!({ "up": true })))
        .unwrap();

    let (addr, _shutdown) = common::spawn_server(RouterConfig::default(), builder.build()).await;

    let api = reqwest::get(format!("http://{addr}/api/status")).await.unwrap();
    assert_eq!(api.status().as_u16(), 200);

    let bare = reqwest::get(format!("http://{addr}/status")).await.unwrap();
    assert_eq!(bare.status().as_u16(), 404);
}

#[tokio::test]
async fn test_table_swap_observed_by_new_requests() {
    let config = Arc::new(RouterConfig::default());
    let shared = Arc::new(SharedRouteTable::new(RouteTable::default()));
    let (addr, _shutdown) = common::spawn_server_shared(config, shared.clone()).await;

    let before = reqwest::get(format!("http://{addr}/ping")).await.unwrap();
    assert_eq!(before.status().as_u16(), 404);

    let mut builder = RouteTable::builder();
    builder
        .route("ping.get.ts", static_json(json!({ "pong": true })))
        .unwrap();
    shared.replace(builder.build());

    let after = reqwest::get(format!("http://{addr}/ping")).await.unwrap();
    assert_eq!(after.status().as_u16(), 200);
}

#[tokio::test]
async fn test_text_outcome_is_plain_body() {
    struct Plain;

    #[async_trait]
    impl Handler for Plain {
        async fn call(&self, _ctx: &mut RequestContext) -> Result<Outcome, HandlerError> {
            Ok(Outcome::Text("hello there".into()))
        }
    }

    let mut builder = RouteTable::builder();
    builder
        .route("greeting.get.ts", HandlerRef::standard(Plain))
        .unwrap();

    let (addr, _shutdown) = common::spawn_server(RouterConfig::default(), builder.build()).await;

    let response = reqwest::get(format!("http://{addr}/greeting")).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "hello there");
}
