#![forbid(unsafe_code)]

use poem_openapi::error::{ContentTypeError, ParseParamError, ParsePathError, ParseRequestPayloadError};
use poem_openapi::Object;
use thiserror::Error;

/// Error enumerates the errors returned by this application.
#[derive(Error, Debug)]
pub enum Errors {
    /// Input parameter logging.
    #[error("items_server input parameters:\n{}", .0)]
    InputParms(String),

    /// Inaccessible logger configuration file.
    #[error("Unable to initialize Log4rs using {}: {}", .0, .1)]
    Log4rsInitialization(String, String),

    #[error("Reading application configuration file: {}", .0)]
    ReadingConfigFile(String),

    #[error("Unable to parse TOML file: {}", .0)]
    TOMLParseError(String),

    #[error("Data directory error for {}: {}", .0, .1)]
    DirectoryError(String, String),
}

// ***************************************************************************
//                          422 Validation Responses
// ***************************************************************************
// Where a rejected value came from.  The path parameter names of an endpoint
// are known statically, anything else that fails as a parameter is a query.
const LOC_PATH  : &str = "path";
const LOC_QUERY : &str = "query";
const LOC_BODY  : &str = "body";

#[derive(Object, Debug, Clone, PartialEq)]
pub struct ValidationErrorDetail
{
    loc: Vec<String>,
    msg: String,
    #[oai(rename = "type")]
    error_type: String,
}

/// The body of every 422 response.
#[derive(Object, Debug, Clone, PartialEq)]
pub struct HttpValidationError
{
    detail: Vec<ValidationErrorDetail>,
}

impl ValidationErrorDetail {
    fn new(loc: Vec<String>, msg: String, error_type: &str) -> Self {
        Self {loc, msg, error_type: error_type.to_string()}
    }
}

impl HttpValidationError {
    /// Convert a request extraction error raised before a handler runs.
    /// `path_params` lists the endpoint's path parameter names in route order.
    ///
    /// Payload errors are located at ["body"] only: the messages poem-openapi
    /// produces for a rejected object do not name the offending field.
    pub fn from_request_error(err: &poem::Error, path_params: &[&str]) -> Self {
        let detail = if let Some(e) = err.downcast_ref::<ParsePathError>() {
            // The error carries the router's internal name for the segment.
            let name = path_params.first().copied().unwrap_or(e.name);
            ValidationErrorDetail::new(
                vec![LOC_PATH.to_string(), name.to_string()], e.reason.clone(), param_error_type(&e.reason))
        } else if let Some(e) = err.downcast_ref::<ParseParamError>() {
            let location = if path_params.contains(&e.name) {LOC_PATH} else {LOC_QUERY};
            ValidationErrorDetail::new(
                vec![location.to_string(), e.name.to_string()], e.reason.clone(), param_error_type(&e.reason))
        } else if let Some(e) = err.downcast_ref::<ParseRequestPayloadError>() {
            ValidationErrorDetail::new(vec![LOC_BODY.to_string()], e.reason.clone(), payload_error_type(&e.reason))
        } else if let Some(e) = err.downcast_ref::<ContentTypeError>() {
            ValidationErrorDetail::new(vec![LOC_BODY.to_string()], e.to_string(), "missing")
        } else {
            ValidationErrorDetail::new(vec![], err.to_string(), "value_error")
        };

        Self {detail: vec![detail]}
    }

    /// The location of the first rejected value, e.g. ["query", "q"].
    #[cfg(test)]
    pub fn first_loc(&self) -> &[String] {
        match self.detail.first() {
            Some(d) => &d.loc,
            None => &[],
        }
    }
}

// ***************************************************************************
//                          Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// param_error_type:
// ---------------------------------------------------------------------------
// Validator failures read "verification failed. <rule>", conversion failures
// read "failed to parse \"<type>\": <cause>".
fn param_error_type(reason: &str) -> &'static str {
    if reason.starts_with("verification failed") {
        if reason.contains("maxLength") {"string_too_long"} else {"value_error"}
    } else {
        parsed_type_error(reason).unwrap_or("value_error")
    }
}

// ---------------------------------------------------------------------------
// payload_error_type:
// ---------------------------------------------------------------------------
// An absent required field is reported as a null of the expected type.
// Anything not naming a type is a json syntax error.
fn payload_error_type(reason: &str) -> &'static str {
    if reason.contains("found null") {
        "missing"
    } else {
        parsed_type_error(reason).unwrap_or("json_invalid")
    }
}

// ---------------------------------------------------------------------------
// parsed_type_error:
// ---------------------------------------------------------------------------
fn parsed_type_error(reason: &str) -> Option<&'static str> {
    if reason.contains("\"integer") {
        Some("int_parsing")
    } else if reason.contains("\"number") {
        Some("float_parsing")
    } else if reason.contains("\"string\"") {
        Some("string_type")
    } else {
        None
    }
}
