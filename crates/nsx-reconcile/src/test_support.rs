//! Shared helpers for reconciliation tests

use async_trait::async_trait;
use mockall::mock;
use serde_json::Value;

use nsx_core::{NsxResult, Properties, Session, SessionResponse, UriParameters};

mock! {
    pub Api {}

    #[async_trait]
    impl Session for Api {
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
}

pub fn props(value: Value) -> Properties {
    match value {
        Value::Object(map) => map,
        _ => panic!("test properties must be an object"),
    }
}
