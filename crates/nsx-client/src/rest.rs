//! HTTP implementation of the session contract

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{header, Client};
use serde_json::Value;

use nsx_config::NsxCredentials;
use nsx_core::{NsxError, NsxResult, Session, SessionResponse, UriParameters};

use crate::resources::{resource, Operation};

fn transport(e: reqwest::Error) -> NsxError {
    NsxError::Transport {
        message: e.to_string(),
    }
}

/// Id of a created object from the `Location` header
pub(crate) fn object_id_from_location(location: &str) -> Option<String> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// REST session authenticated with basic auth
pub struct RestSession {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl RestSession {
    pub fn new(credentials: &NsxCredentials) -> NsxResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(credentials.timeout_secs))
            .danger_accept_invalid_certs(credentials.insecure)
            .build()
            .map_err(transport)?;

        let host = credentials.host.trim_end_matches('/');
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };

        Ok(Self {
            client,
            base_url,
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call(
        &self,
        operation: Operation,
        resource_type: &str,
        uri_parameters: &UriParameters,
        body: Option<Value>,
    ) -> NsxResult<SessionResponse> {
        let resource = resource(resource_type)?;
        if !resource.supports(operation) {
            return Err(NsxError::Unsupported(format!(
                "{} does not support {}",
                resource_type, operation
            )));
        }

        let url = format!("{}{}", self.base_url, resource.path(uri_parameters)?);
        let method = resource.method(operation);
        debug!("NSX {} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .basic_auth(&self.username, Some(&self.password))
            .header(header::ACCEPT, "application/json");

        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(object_id_from_location);

        let text = response.text().await.map_err(transport)?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.trim().to_string()))
        };

        // Creates answer with the new id either in Location or as plain text
        let object_id = location.or_else(|| match (&body, operation) {
            (Value::String(id), Operation::Create) if (200..300).contains(&status) => {
                Some(id.clone())
            }
            _ => None,
        });

        debug!("NSX {} -> {} ({} bytes)", url, status, text.len());

        Ok(SessionResponse {
            status,
            body,
            object_id,
        })
    }
}

#[async_trait]
impl Session for RestSession {
    async fn read(
        &self,
        resource_type: &str,
        uri_parameters: &UriParameters,
    ) -> NsxResult<SessionResponse> {
        self.call(Operation::Read, resource_type, uri_parameters, None)
            .await
    }

    async fn create(
        &self,
        resource_type: &str,
        uri_parameters: &UriParameters,
        body: Option<Value>,
    ) -> NsxResult<SessionResponse> {
        self.call(Operation::Create, resource_type, uri_parameters, body)
            .await
    }

    async fn update(
        &self,
        resource_type: &str,
        uri_parameters: &UriParameters,
        body: Option<Value>,
    ) -> NsxResult<SessionResponse> {
        self.call(Operation::Update, resource_type, uri_parameters, body)
            .await
    }

    async fn delete(
        &self,
        resource_type: &str,
        uri_parameters: &UriParameters,
    ) -> NsxResult<SessionResponse> {
        self.call(Operation::Delete, resource_type, uri_parameters, None)
            .await
    }
}
