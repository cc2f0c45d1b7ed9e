#![forbid(unsafe_code)]

use poem::{Error, Request};
use poem_openapi::{ OpenApi, payload::Json, Object, ApiResponse, param::Path, param::Query };
use log::info;

use crate::utils::errors::HttpValidationError;
use crate::utils::server_utils::{self, RequestDebug};

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct UpdateItemApi;

// Path parameters of this endpoint.
const PATH_PARAMS: [&str; 1] = ["item_id"];

/// An item as submitted by the caller.  Nothing is stored.
#[derive(Object, Debug, Clone)]
pub struct Item
{
    name: String,
    description: Option<String>,
    price: f64,
    tax: Option<f64>,
}

/// The item id merged with every item field.  Absent optional fields are
/// written as null; q only appears when a non-empty value was supplied.
#[derive(Object, Debug)]
pub struct RespUpdateItem
{
    item_id: i64,
    name: String,
    description: Option<String>,
    price: f64,
    tax: Option<f64>,
    #[oai(skip_serializing_if_is_none)]
    q: Option<String>,
}

// Implement the debug record trait for logging.
impl RequestDebug for Item {
    fn get_request_info(&self) -> String {
        // Get optional values in displayable form.
        let description = format!("{:?}", &self.description);
        let tax = format!("{:?}", &self.tax);

        let mut s = String::with_capacity(255);
        s.push_str("  Request body:");
        s.push_str("\n    name: ");
        s.push_str(&self.name);
        s.push_str("\n    description: ");
        s.push_str(&description);
        s.push_str("\n    price: ");
        s.push_str(&self.price.to_string());
        s.push_str("\n    tax: ");
        s.push_str(&tax);
        s
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
#[oai(bad_request_handler = "make_http_422")]
enum UpdateItemResponse {
    #[oai(status = 200)]
    Http200(Json<RespUpdateItem>),
    #[oai(status = 422)]
    Http422(Json<HttpValidationError>),
}

fn make_http_200(resp: RespUpdateItem) -> UpdateItemResponse {
    UpdateItemResponse::Http200(Json(resp))
}
fn make_http_422(err: Error) -> UpdateItemResponse {
    UpdateItemResponse::Http422(Json(HttpValidationError::from_request_error(&err, &PATH_PARAMS)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl UpdateItemApi {
    /// Echo an item back under its id.  An item_id that is not an integer in
    /// the signed 64-bit range is rejected with 422 before this runs.
    #[oai(path = "/items/:item_id", method = "put")]
    async fn update_item(&self, http_req: &Request, item_id: Path<i64>, item: Json<Item>,
                         q: Query<Option<String>>) -> UpdateItemResponse {
        // Conditional logging depending on log level.
        server_utils::debug_request(http_req, &item.0);

        let resp = RespUpdateItem::new(item_id.0, item.0, q.0);
        info!("Item {} updated: {}", resp.item_id, resp.name);
        make_http_200(resp)
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespUpdateItem {
    /// Merge the id and item.  An empty q counts as absent.
    fn new(item_id: i64, item: Item, q: Option<String>) -> Self {
        Self {
            item_id,
            name: item.name,
            description: item.description,
            price: item.price,
            tax: item.tax,
            q: q.filter(|q| !q.is_empty()),
        }
    }
}
