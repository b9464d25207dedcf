//! Session contract towards the NSX manager

use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use crate::error::{NsxError, NsxResult};
use crate::normalize::{as_list, lookup_path};
use nsx_shared_types::{SessionResponse, UriParameters};

/// Access to NSX resources by resource type name
///
/// Resource types are the NSX API names (`routingBGP`, `natRules`,
/// `secGroupObject`, ...); the URI of a call is resolved from the resource
/// type and the URI parameters by the implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Session: Send + Sync {
    async fn read(
        &self,
        resource_type: &str,
        uri_parameters: &UriParameters,
    ) -> NsxResult<SessionResponse>;

    async fn create(
        &self,
        resource_type: &str,
        uri_parameters: &UriParameters,
        body: Option<Value>,
    ) -> NsxResult<SessionResponse>;

    async fn update(
        &self,
        resource_type: &str,
        uri_parameters: &UriParameters,
        body: Option<Value>,
    ) -> NsxResult<SessionResponse>;

    async fn delete(
        &self,
        resource_type: &str,
        uri_parameters: &UriParameters,
    ) -> NsxResult<SessionResponse>;
}

/// Turn a non-2xx response into an error carrying the manager's message
pub fn check_raw_result(response: SessionResponse) -> NsxResult<SessionResponse> {
    if response.is_success() {
        return Ok(response);
    }

    let message = ["details", "error/details", "errorCode", "message"]
        .iter()
        .find_map(|path| lookup_path(&response.body, path))
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| match &response.body {
            Value::Null => "no details".to_string(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });

    Err(NsxError::Api {
        status: response.status,
        message,
    })
}

/// Read a resource and return the sub-tree at `path`
pub async fn nsx_read(
    session: &dyn Session,
    path: &str,
    resource_type: &str,
    uri_parameters: &UriParameters,
) -> NsxResult<Value> {
    let response = check_raw_result(session.read(resource_type, uri_parameters).await?)?;
    debug!("{} {:?} -> {}", resource_type, uri_parameters, response.body);

    lookup_path(&response.body, path)
        .cloned()
        .ok_or_else(|| NsxError::MissingElement {
            resource_type: resource_type.to_string(),
            path: path.to_string(),
        })
}

/// Search a listed resource by name
///
/// Returns the `objectId` and the element of the first entry with a matching
/// `name`. A missing list is treated as empty.
pub async fn nsx_search(
    session: &dyn Session,
    path: &str,
    name: &str,
    resource_type: &str,
    uri_parameters: &UriParameters,
) -> NsxResult<Option<(String, Value)>> {
    let response = check_raw_result(session.read(resource_type, uri_parameters).await?)?;

    let found = as_list(lookup_path(&response.body, path))
        .into_iter()
        .find(|item| item.get("name").and_then(Value::as_str) == Some(name))
        .map(|item| {
            let object_id = item
                .get("objectId")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            (object_id, item)
        });

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_raw_result_passes_success() {
        let response = SessionResponse::ok(json!({"a": 1}));
        assert_eq!(check_raw_result(response.clone()).unwrap(), response);
    }

    #[test]
    fn test_check_raw_result_extracts_details() {
        let response = SessionResponse::new(
            400,
            json!({"error": {"details": "Invalid edge id", "errorCode": 202}}),
        );
        match check_raw_result(response) {
            Err(NsxError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid edge id");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let raw = SessionResponse::new(500, json!("boom"));
        assert!(matches!(
            check_raw_result(raw),
            Err(NsxError::Api { status: 500, ref message }) if message == "boom"
        ));
    }

    #[tokio::test]
    async fn test_nsx_read_missing_path() {
        let mut session = MockSession::new();
        session
            .expect_read()
            .withf(|rt, uri| rt == "routingBGP" && uri.get("edgeId") == Some("edge-1"))
            .returning(|_, _| Ok(SessionResponse::ok(json!({"bgp": {"enabled": true}}))));

        let uri = UriParameters::edge("edge-1");
        let bgp = nsx_read(&session, "bgp", "routingBGP", &uri).await.unwrap();
        assert_eq!(bgp, json!({"enabled": true}));

        let missing = nsx_read(&session, "ospf", "routingBGP", &uri).await;
        assert!(matches!(missing, Err(NsxError::MissingElement { .. })));
    }

    #[tokio::test]
    async fn test_nsx_search_singleton_list() {
        let mut session = MockSession::new();
        session.expect_read().returning(|_, _| {
            Ok(SessionResponse::ok(json!({
                "securityTags": {"securityTag": {"objectId": "securitytag-9", "name": "web"}}
            })))
        });

        let uri = UriParameters::new();
        let found = nsx_search(&session, "securityTags/securityTag", "web", "securityTag", &uri)
            .await
            .unwrap();
        assert_eq!(found.map(|(id, _)| id), Some("securitytag-9".to_string()));

        let absent = nsx_search(&session, "securityTags/securityTag", "db", "securityTag", &uri)
            .await
            .unwrap();
        assert!(absent.is_none());
    }
}
