//! In-memory stand-in for the NSX manager
//!
//! `MockSession` keeps one JSON document per resource type and URI
//! parameters, records every call and can be told to fail upcoming calls.
//! Reads of unknown documents answer 404 like the manager does.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use log::debug;
use serde_json::{json, Value};

use nsx_core::{NsxResult, Session, SessionResponse, UriParameters};

/// Kind of a recorded call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Read,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub resource_type: String,
    pub uri_parameters: UriParameters,
    pub body: Option<Value>,
}

#[derive(Debug)]
struct Failure {
    resource_type: String,
    status: u16,
    message: String,
}

#[derive(Debug, Default)]
struct State {
    documents: HashMap<String, Value>,
    calls: Vec<RecordedCall>,
    failures: VecDeque<Failure>,
    next_id: u64,
}

#[derive(Debug, Default)]
pub struct MockSession {
    state: Mutex<State>,
}

fn document_key(resource_type: &str, uri_parameters: &UriParameters) -> String {
    let params: Vec<String> = uri_parameters
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    format!("{}?{}", resource_type, params.join("&"))
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a document returned by reads of `resource_type`
    pub fn with_document(self, resource_type: &str, uri: &UriParameters, body: Value) -> Self {
        self.set_document(resource_type, uri, body);
        self
    }

    pub fn set_document(&self, resource_type: &str, uri: &UriParameters, body: Value) {
        self.state()
            .documents
            .insert(document_key(resource_type, uri), body);
    }

    pub fn document(&self, resource_type: &str, uri: &UriParameters) -> Option<Value> {
        self.state()
            .documents
            .get(&document_key(resource_type, uri))
            .cloned()
    }

    /// Make the next call on `resource_type` answer with an error status
    pub fn fail_next(&self, resource_type: &str, status: u16, message: &str) {
        self.state().failures.push_back(Failure {
            resource_type: resource_type.to_string(),
            status,
            message: message.to_string(),
        });
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    /// Every call except reads
    pub fn writes(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.kind != CallKind::Read)
            .collect()
    }

    pub fn writes_to(&self, resource_type: &str) -> Vec<RecordedCall> {
        self.writes()
            .into_iter()
            .filter(|c| c.resource_type == resource_type)
            .collect()
    }

    fn record(
        &self,
        kind: CallKind,
        resource_type: &str,
        uri_parameters: &UriParameters,
        body: Option<Value>,
    ) -> Option<SessionResponse> {
        debug!("mock {:?} {} {:?}", kind, resource_type, uri_parameters);
        let mut state = self.state();
        state.calls.push(RecordedCall {
            kind,
            resource_type: resource_type.to_string(),
            uri_parameters: uri_parameters.clone(),
            body,
        });

        let position = state
            .failures
            .iter()
            .position(|f| f.resource_type == resource_type)?;
        let failure = state.failures.remove(position)?;
        Some(SessionResponse::new(
            failure.status,
            json!({ "details": failure.message }),
        ))
    }
}

#[async_trait]
impl Session for MockSession {
    async fn read(
        &self,
        resource_type: &str,
        uri_parameters: &UriParameters,
    ) -> NsxResult<SessionResponse> {
        if let Some(failure) = self.record(CallKind::Read, resource_type, uri_parameters, None) {
            return Ok(failure);
        }
        Ok(match self.document(resource_type, uri_parameters) {
            Some(body) => SessionResponse::ok(body),
            None => SessionResponse::new(
                404,
                json!({ "details": format!("{} not found", resource_type) }),
            ),
        })
    }

    async fn create(
        &self,
        resource_type: &str,
        uri_parameters: &UriParameters,
        body: Option<Value>,
    ) -> NsxResult<SessionResponse> {
        if let Some(failure) = self.record(CallKind::Create, resource_type, uri_parameters, body) {
            return Ok(failure);
        }
        let mut state = self.state();
        state.next_id += 1;
        Ok(SessionResponse::created(format!(
            "{}-{}",
            resource_type.to_lowercase(),
            state.next_id
        )))
    }

    async fn update(
        &self,
        resource_type: &str,
        uri_parameters: &UriParameters,
        body: Option<Value>,
    ) -> NsxResult<SessionResponse> {
        if let Some(failure) =
            self.record(CallKind::Update, resource_type, uri_parameters, body.clone())
        {
            return Ok(failure);
        }
        self.set_document(resource_type, uri_parameters, body.unwrap_or(Value::Null));
        Ok(SessionResponse::no_content())
    }

    async fn delete(
        &self,
        resource_type: &str,
        uri_parameters: &UriParameters,
    ) -> NsxResult<SessionResponse> {
        if let Some(failure) = self.record(CallKind::Delete, resource_type, uri_parameters, None) {
            return Ok(failure);
        }
        self.state()
            .documents
            .remove(&document_key(resource_type, uri_parameters));
        Ok(SessionResponse::no_content())
    }
}
