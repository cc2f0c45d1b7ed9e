#![forbid(unsafe_code)]

use poem_openapi::{ OpenApi, payload::Json, Object };

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct RootApi;

/// A single greeting message.
#[derive(Object, Debug)]
pub struct RespMessage
{
    message: String,
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl RootApi {
    #[oai(path = "/", method = "get")]
    async fn root(&self) -> Json<RespMessage> {
        Json(RespMessage::new("Hello World"))
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespMessage {
    pub fn new(message: &str) -> Self {
        Self {message: message.to_string()}
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::api::test_support::test_client;

    #[tokio::test]
    async fn root_says_hello_world() {
        let cli = test_client();
        let resp = cli.get("/").send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({"message": "Hello World"})).await;
    }

    #[tokio::test]
    async fn root_ignores_query_parameters() {
        let cli = test_client();
        let resp = cli.get("/?skip=1").send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({"message": "Hello World"})).await;
    }
}
