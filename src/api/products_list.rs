#![forbid(unsafe_code)]

use poem::Error;
use poem_openapi::{ OpenApi, payload::Json, Object, ApiResponse, param::Query };

use crate::utils::errors::HttpValidationError;
use crate::utils::fixtures::PRODUCT_IDS;

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct ListProductsApi;

#[derive(Object, Debug)]
pub struct ProductsListElement
{
    item_id: String,
}

#[derive(Object, Debug)]
pub struct RespListProducts
{
    items: Vec<ProductsListElement>,
    #[oai(skip_serializing_if_is_none)]
    q: Option<String>,
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
#[oai(bad_request_handler = "make_http_422")]
enum ListProductsResponse {
    #[oai(status = 200)]
    Http200(Json<RespListProducts>),
    #[oai(status = 422)]
    Http422(Json<HttpValidationError>),
}

fn make_http_200(resp: RespListProducts) -> ListProductsResponse {
    ListProductsResponse::Http200(Json(resp))
}
fn make_http_422(err: Error) -> ListProductsResponse {
    ListProductsResponse::Http422(Json(HttpValidationError::from_request_error(&err, &[])))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl ListProductsApi {
    /// List the fixed products, echoing q when it is supplied.  Served at
    /// /products/ as well, the router trims the slash.
    #[oai(path = "/products", method = "get")]
    async fn read_products(&self,
                           #[oai(validator(max_length = 50))] q: Query<Option<String>>)
    -> ListProductsResponse {
        make_http_200(RespListProducts::new(q.0))
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespListProducts {
    /// An empty q counts as absent.
    fn new(q: Option<String>) -> Self {
        let items = PRODUCT_IDS.iter()
            .map(|id| ProductsListElement {item_id: id.to_string()})
            .collect();
        Self {items, q: q.filter(|q| !q.is_empty())}
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
    async fn products_without_q() {
        let cli = test_client();
        let resp = cli.get("/products/").send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({"items": [{"item_id": "Foo"}, {"item_id": "Bar"}]})).await;
    }

    #[tokio::test]
    async fn products_without_trailing_slash() {
        let cli = test_client();
        let resp = cli.get("/products?q=foo").send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({
            "items": [{"item_id": "Foo"}, {"item_id": "Bar"}], "q": "foo"
        })).await;
    }

    #[tokio::test]
    async fn products_echo_q() {
        let cli = test_client();
        let resp = cli.get("/products/?q=foo").send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({
            "items": [{"item_id": "Foo"}, {"item_id": "Bar"}], "q": "foo"
        })).await;
    }

    #[tokio::test]
    async fn empty_q_is_not_echoed() {
        let cli = test_client();
        let resp = cli.get("/products/?q=").send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({"items": [{"item_id": "Foo"}, {"item_id": "Bar"}]})).await;
    }

    #[tokio::test]
    async fn fifty_chars_is_accepted() {
        let cli = test_client();
        let q = "a".repeat(50);
        let resp = cli.get(format!("/products/?q={}", q)).send().await;
        resp.assert_status_is_ok();
        let body = body_json(resp).await;
        assert_eq!(body["q"], json!(q));
    }

    #[tokio::test]
    async fn fifty_one_chars_is_422() {
        let cli = test_client();
        let resp = cli.get(format!("/products/?q={}", "a".repeat(51))).send().await;
        resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(resp).await;
        assert_eq!(body["detail"][0]["loc"], json!(["query", "q"]));
        assert_eq!(body["detail"][0]["type"], "string_too_long");
    }
}
