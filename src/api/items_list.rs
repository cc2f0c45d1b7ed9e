#![forbid(unsafe_code)]

use poem::Error;
use poem_openapi::{ OpenApi, payload::Json, Object, ApiResponse, param::Query };

use crate::utils::errors::HttpValidationError;
use crate::utils::fixtures::{page, FAKE_ITEMS_DB};

// Window applied when the caller omits skip or limit.
const DEFAULT_SKIP  : i64 = 0;
const DEFAULT_LIMIT : i64 = 1;

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct ListItemsApi;

#[derive(Object, Debug)]
pub struct ItemsListElement
{
    item_name: String,
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
#[oai(bad_request_handler = "make_http_422")]
enum ListItemsResponse {
    #[oai(status = 200)]
    Http200(Json<Vec<ItemsListElement>>),
    #[oai(status = 422)]
    Http422(Json<HttpValidationError>),
}

fn make_http_200(resp: Vec<ItemsListElement>) -> ListItemsResponse {
    ListItemsResponse::Http200(Json(resp))
}
fn make_http_422(err: Error) -> ListItemsResponse {
    ListItemsResponse::Http422(Json(HttpValidationError::from_request_error(&err, &[])))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl ListItemsApi {
    /// Page through the fixed item list.  Out-of-range windows are clamped,
    /// never rejected.  Served at /items/ as well, the router trims the slash.
    #[oai(path = "/items", method = "get")]
    async fn read_items(&self, skip: Query<Option<i64>>, limit: Query<Option<i64>>) -> ListItemsResponse {
        let skip = skip.0.unwrap_or(DEFAULT_SKIP);
        let limit = limit.0.unwrap_or(DEFAULT_LIMIT);
        make_http_200(list_items(skip, limit))
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl ItemsListElement {
    fn new(item_name: &str) -> Self {
        Self {item_name: item_name.to_string()}
    }
}

// ***************************************************************************
//                          Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// list_items:
// ---------------------------------------------------------------------------
fn list_items(skip: i64, limit: i64) -> Vec<ItemsListElement> {
    page(&FAKE_ITEMS_DB, skip, limit)
        .iter()
        .map(|name| ItemsListElement::new(name))
        .collect()
}
