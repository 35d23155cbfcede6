#![allow(dead_code)]

use apigateway::{
    handler::AppRouter,
    state::{AppState, EventSource, Workers},
};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use product::{
    consumer::run_category_aggregator,
    reconciler::{BatchReport, StockReconciler},
};
use serde_json::{Value, json};
use shared::{
    abstract_trait::JwtServiceTrait, config::JwtConfig, domain::event::DomainEvent,
    repository::MemoryStore,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::{broadcast, mpsc};
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";

/// Full HTTP stack over the memory store. The category aggregator runs in
/// the background; order events are held until `reconcile` applies them.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub reconciler: Arc<StockReconciler>,
    events: mpsc::UnboundedReceiver<DomainEvent>,
    token: String,
    _shutdown: broadcast::Sender<()>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let (state, workers) = AppState::in_memory(store.clone(), SECRET);
        let Workers {
            reconciler,
            aggregator,
            events,
            changes,
        } = workers;

        let events = match events {
            EventSource::Memory(rx) => rx,
            #[allow(unreachable_patterns)]
            _ => unreachable!("in-memory state uses the memory bus"),
        };

        let (shutdown, _) = broadcast::channel(1);
        tokio::spawn(run_category_aggregator(
            aggregator,
            changes,
            10,
            shutdown.subscribe(),
        ));

        let token = JwtConfig::new(SECRET).generate_token().unwrap();

        Self {
            router: AppRouter::build(state),
            store,
            reconciler,
            events,
            token,
            _shutdown: shutdown,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    /// Authenticated JSON request.
    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token));

        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).unwrap()).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, None).await
    }

    pub async fn create_product(&self, name: &str, price: f64, category: &str, available: f64) -> Value {
        let (status, body) = self
            .call(
                Method::POST,
                "/products",
                Some(json!({
                    "name": name,
                    "price": price,
                    "category": category,
                    "available": available,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    pub async fn create_order(&self, product: &Value, quantity: i64) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            "/orders",
            Some(json!({
                "productId": product["id"],
                "category": product["category"],
                "quantity": quantity,
            })),
        )
        .await
    }

    pub async fn available(&self, product: &Value) -> f64 {
        let uri = format!(
            "/products/{}/{}",
            product["category"].as_str().unwrap(),
            product["id"].as_str().unwrap()
        );
        let (status, body) = self.get(&uri).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["available"].as_f64().unwrap()
    }

    /// Everything published so far, without applying it.
    pub fn drain_events(&mut self) -> Vec<DomainEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    /// Applies every published event to product stock.
    pub async fn reconcile(&mut self) -> BatchReport {
        let events = self.drain_events();
        self.reconciler.apply_batch(events).await
    }

    /// Polls `uri` until `done` accepts the response.
    pub async fn eventually(
        &self,
        uri: &str,
        done: impl Fn(StatusCode, &Value) -> bool,
    ) -> (StatusCode, Value) {
        for _ in 0..100 {
            let (status, body) = self.get(uri).await;
            if done(status, &body) {
                return (status, body);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("{uri} never reached the expected state");
    }
}
