//! Submission back ends. Exactly one is chosen at startup from [`SubmitBackend`].

use std::rc::Rc;

use async_trait::async_trait;
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use super::ContactPayload;
use crate::config::SubmitBackend;
use crate::dom::{js_value_to_string, window};
use crate::error::SubmitError;
use crate::log;
use crate::storage::KeyValueStore;

#[async_trait(?Send)]
pub trait Submitter {
    fn name(&self) -> &'static str;

    async fn submit(&self, payload: &ContactPayload) -> Result<(), SubmitError>;
}

fn network_error(err: JsValue) -> SubmitError {
    SubmitError::Network(js_value_to_string(&err))
}

fn check_status(status: u16) -> Result<(), SubmitError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(SubmitError::Status(status))
    }
}

/// POSTs `body` as JSON. Any non-2xx status is a failure.
async fn post_json(
    url: &str,
    body: &str,
    headers: &[(&'static str, String)],
) -> Result<(), SubmitError> {
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&JsValue::from_str(body));

    let request = Request::new_with_str_and_init(url, &init).map_err(network_error)?;
    let request_headers = request.headers();
    request_headers
        .set("Content-Type", "application/json")
        .map_err(network_error)?;
    request_headers
        .set("Accept", "application/json")
        .map_err(network_error)?;
    for (name, value) in headers {
        request_headers.set(name, value).map_err(network_error)?;
    }

    let response = JsFuture::from(window().map_err(network_error)?.fetch_with_request(&request))
        .await
        .map_err(network_error)?;
    let response: Response = response.dyn_into().map_err(network_error)?;
    check_status(response.status())
}

#[derive(Serialize)]
struct RelayBody<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

/// Generic form relay; only the user-entered fields are sent.
pub struct RelaySubmitter {
    endpoint: String,
}

impl RelaySubmitter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait(?Send)]
impl Submitter for RelaySubmitter {
    fn name(&self) -> &'static str {
        "relay"
    }

    async fn submit(&self, payload: &ContactPayload) -> Result<(), SubmitError> {
        let body = serde_json::to_string(&RelayBody {
            name: &payload.name,
            email: &payload.email,
            message: &payload.message,
        })?;
        post_json(&self.endpoint, &body, &[]).await
    }
}

/// Data-store REST table insert, authenticated with the project key.
pub struct DataStoreSubmitter {
    url: String,
    key: String,
}

impl DataStoreSubmitter {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
        }
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("apikey", self.key.clone()),
            ("Authorization", format!("Bearer {}", self.key)),
            ("Prefer", "return=minimal".to_string()),
        ]
    }
}

#[async_trait(?Send)]
impl Submitter for DataStoreSubmitter {
    fn name(&self) -> &'static str {
        "data_store"
    }

    async fn submit(&self, payload: &ContactPayload) -> Result<(), SubmitError> {
        let body = serde_json::to_string(payload)?;
        post_json(&self.url, &body, &self.headers()).await
    }
}

/// Keeps messages in browser storage as a JSON array under one key.
pub struct LocalSubmitter {
    store: Rc<dyn KeyValueStore>,
    key: String,
}

impl LocalSubmitter {
    pub fn new(store: Rc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Messages stored so far. An unreadable list is treated as empty.
    pub fn stored(&self) -> Result<Vec<ContactPayload>, SubmitError> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<ContactPayload>>(&raw) {
            Ok(messages) => Ok(messages),
            Err(err) => {
                log::warn("contact_store_corrupt", &err.to_string());
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait(?Send)]
impl Submitter for LocalSubmitter {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn submit(&self, payload: &ContactPayload) -> Result<(), SubmitError> {
        // TODO: cap or rotate the list; it currently grows for as long as the browser keeps it.
        let mut messages = self.stored()?;
        messages.push(payload.clone());
        let encoded = serde_json::to_string(&messages)?;
        self.store.set(&self.key, &encoded)?;
        Ok(())
    }
}

pub fn select_submitter(
    backend: &SubmitBackend,
    store: Rc<dyn KeyValueStore>,
    messages_key: &str,
) -> Box<dyn Submitter> {
    match backend {
        SubmitBackend::Relay { endpoint } => Box::new(RelaySubmitter::new(endpoint.clone())),
        SubmitBackend::DataStore { url, key } => {
            Box::new(DataStoreSubmitter::new(url.clone(), key.clone()))
        }
        SubmitBackend::Local => Box::new(LocalSubmitter::new(store, messages_key)),
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::storage::MemoryStore;

    fn payload(name: &str) -> ContactPayload {
        ContactPayload {
            name: name.to_string(),
            email: "a@b.co".to_string(),
            message: "Hello".to_string(),
            created_at: "2026-10-19T09:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn local_submitter_appends() {
        let store = Rc::new(MemoryStore::default());
        let local = LocalSubmitter::new(store.clone(), "portfolio-messages");

        block_on(local.submit(&payload("Ada"))).unwrap();
        block_on(local.submit(&payload("Grace"))).unwrap();

        let names: Vec<String> = local.stored().unwrap().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["Ada".to_string(), "Grace".to_string()]);

        let raw = store.get("portfolio-messages").unwrap().unwrap();
        assert!(raw.contains("\"created_at\":\"2026-10-19T09:00:00.000Z\""));
    }

    #[test]
    fn corrupt_list_is_replaced() {
        let store = Rc::new(MemoryStore::default());
        store.set("portfolio-messages", "{not json").unwrap();
        let local = LocalSubmitter::new(store.clone(), "portfolio-messages");

        block_on(local.submit(&payload("Ada"))).unwrap();
        assert_eq!(local.stored().unwrap().len(), 1);
    }

    #[test]
    fn relay_body_omits_timestamp() {
        let p = payload("Ada");
        let body = serde_json::to_value(RelayBody {
            name: &p.name,
            email: &p.email,
            message: &p.message,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "name": "Ada", "email": "a@b.co", "message": "Hello" })
        );
    }

    #[test]
    fn data_store_sends_key_headers_and_full_payload() {
        let submitter =
            DataStoreSubmitter::new("https://project.example/rest/v1/messages", "anon-key");
        assert_eq!(
            submitter.headers(),
            vec![
                ("apikey", "anon-key".to_string()),
                ("Authorization", "Bearer anon-key".to_string()),
                ("Prefer", "return=minimal".to_string()),
            ]
        );

        let body = serde_json::to_value(payload("Ada")).unwrap();
        assert_eq!(body["created_at"], "2026-10-19T09:00:00.000Z");
        assert_eq!(body["email"], "a@b.co");
    }

    #[test]
    fn non_success_status_is_an_error() {
        assert!(check_status(200).is_ok());
        assert!(check_status(204).is_ok());
        assert!(matches!(check_status(503), Err(SubmitError::Status(503))));
        assert!(matches!(check_status(302), Err(SubmitError::Status(302))));
    }

    #[test]
    fn backend_selection() {
        let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::default());
        let relay = SubmitBackend::Relay {
            endpoint: "https://relay.example/f/abc".to_string(),
        };
        let data_store = SubmitBackend::DataStore {
            url: "https://project.example/rest/v1/messages".to_string(),
            key: "anon-key".to_string(),
        };

        assert_eq!(select_submitter(&relay, store.clone(), "k").name(), "relay");
        assert_eq!(
            select_submitter(&data_store, store.clone(), "k").name(),
            "data_store"
        );
        assert_eq!(
            select_submitter(&SubmitBackend::Local, store, "k").name(),
            "local"
        );
    }
}
