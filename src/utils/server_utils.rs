#![forbid(unsafe_code)]

use path_absolutize::Absolutize;
use std::ops::Deref;
use std::path::Path;

use poem::Request;
use log::{debug, LevelFilter};

// ***************************************************************************
// GENERAL PUBLIC FUNCTIONS
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_absolute_path:
// ---------------------------------------------------------------------------
/** Replace tilde (~) and environment variable values in a path name and
 * then construct the absolute path name.  Unlike canonicalize, absolutize
 * does not care whether the file exists.  Any failure returns the original
 * path unchanged.
 */
pub fn get_absolute_path(path: &str) -> String {
    let s = match shellexpand::full(path) {
        Ok(x) => x,
        Err(_) => return path.to_owned(),
    };

    let p = Path::new(s.deref());
    let p1 = match p.absolutize() {
        Ok(x) => x,
        Err(_) => return path.to_owned(),
    };
    match p1.to_str() {
        Some(x) => x.to_owned(),
        None => path.to_owned(),
    }
}

// ***************************************************************************
//                                  Traits
// ***************************************************************************
/// Requests that can describe themselves in the debug log.
pub trait RequestDebug {
    fn get_request_info(&self) -> String;
}

// ---------------------------------------------------------------------------
// debug_request:
// ---------------------------------------------------------------------------
// Dump http request information to the log.
pub fn debug_request(http_req: &Request, req: &impl RequestDebug) {
    // Check that debug or higher logging is in effect.
    if log::max_level() < LevelFilter::Debug {
        return;
    }
    debug!("{}", format_request(http_req, req));
}

// ---------------------------------------------------------------------------
// format_request:
// ---------------------------------------------------------------------------
fn format_request(http_req: &Request, req: &impl RequestDebug) -> String {
    let mut s = "\n".to_string();

    // Restate the URI.
    let uri = http_req.uri();
    s += format!("  URI: {} {:?}\n", http_req.method(), uri).as_str();

    // Accumulate the headers
    for (name, value) in http_req.headers().iter() {
        s += format!("  Header: {} = {:?} \n", name, value).as_str();
    }

    // List query parameters.
    if let Some(q) = uri.query() {
        s += format!("  Query Parameters: {:?}\n", q).as_str();
    } else {
        s += "  * No Query Parameters\n";
    }

    // Add the request's information.
    s += req.get_request_info().as_str();
    s
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use poem::http::Uri;

    struct SampleBody;
    impl RequestDebug for SampleBody {
        fn get_request_info(&self) -> String {
            "  Request body: sample".to_string()
        }
    }

    #[test]
    fn absolute_paths_are_unchanged() {
        assert_eq!(get_absolute_path("/var/tmp/items"), "/var/tmp/items");
    }

    #[test]
    fn relative_paths_become_absolute() {
        assert!(Path::new(&get_absolute_path("items/config")).is_absolute());
    }

    #[test]
    fn request_dump_lists_query_and_body() {
        let req = Request::builder()
            .uri(Uri::from_static("/items/5?q=hi"))
            .header("x-trace", "1")
            .finish();
        let s = format_request(&req, &SampleBody);
        assert!(s.contains("/items/5?q=hi"));
        assert!(s.contains("Header: x-trace"));
        assert!(s.contains("Query Parameters: \"q=hi\""));
        assert!(s.ends_with("Request body: sample"));
    }

    #[test]
    fn request_dump_without_query() {
        let req = Request::builder().uri(Uri::from_static("/")).finish();
        assert!(format_request(&req, &SampleBody).contains("* No Query Parameters"));
    }
}
