#![forbid(unsafe_code)]

use poem::Error;
use poem_openapi::{ OpenApi, payload::Json, ApiResponse, param::Path };

use crate::api::root::RespMessage;
use crate::utils::errors::HttpValidationError;

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct HelloApi;

// Path parameters of this endpoint.
const PATH_PARAMS: [&str; 1] = ["name"];

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
#[oai(bad_request_handler = "make_http_422")]
enum HelloResponse {
    #[oai(status = 200)]
    Http200(Json<RespMessage>),
    #[oai(status = 422)]
    Http422(Json<HttpValidationError>),
}

fn make_http_200(resp: RespMessage) -> HelloResponse {
    HelloResponse::Http200(Json(resp))
}
fn make_http_422(err: Error) -> HelloResponse {
    HelloResponse::Http422(Json(HttpValidationError::from_request_error(&err, &PATH_PARAMS)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl HelloApi {
    /// Greet by number.  Non-integer names, and integers outside the signed
    /// 64-bit range, are rejected with 422 before this runs.
    #[oai(path = "/hello/:name", method = "get")]
    async fn say_hello(&self, name: Path<i64>) -> HelloResponse {
        make_http_200(RespMessage::new(&format!("Hello {}", name.0)))
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use poem::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::{body_json, test_client};

    #[tokio::test]
    async fn hello_integer() {
        let cli = test_client();
        let resp = cli.get("/hello/42").send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({"message": "Hello 42"})).await;
    }

    #[tokio::test]
    async fn hello_negative_integer() {
        let cli = test_client();
        let resp = cli.get("/hello/-7").send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({"message": "Hello -7"})).await;
    }

    #[tokio::test]
    async fn hello_text_is_422() {
        let cli = test_client();
        let resp = cli.get("/hello/abc").send().await;
        resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(resp).await;
        assert_eq!(body["detail"][0]["loc"], json!(["path", "name"]));
        assert_eq!(body["detail"][0]["type"], "int_parsing");
    }

    #[tokio::test]
    async fn hello_out_of_range_is_422() {
        let cli = test_client();
        let resp = cli.get("/hello/9223372036854775808").send().await;
        resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(resp).await;
        assert_eq!(body["detail"][0]["loc"], json!(["path", "name"]));
    }

    #[tokio::test]
    async fn hello_largest_integer() {
        let cli = test_client();
        let resp = cli.get("/hello/9223372036854775807").send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({"message": "Hello 9223372036854775807"})).await;
    }

    #[tokio::test]
    async fn hello_decimal_is_422() {
        let cli = test_client();
        let resp = cli.get("/hello/4.2").send().await;
        resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
