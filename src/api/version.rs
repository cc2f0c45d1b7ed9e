#![forbid(unsafe_code)]

use poem_openapi::{  OpenApi, payload::Json, Object };

// From cargo.toml.
const SERVER_VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct VersionApi;

#[derive(Object, Debug)]
struct RespVersion
{
    result_code: String,
    result_msg: String,
    server_version: String,
    git_branch: String,
    git_commit: String,
    git_dirty: String,
    source_ts: String,
    rustc_version: String,
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl VersionApi {
    #[oai(path = "/version", method = "get")]
    async fn get_version(&self) -> Json<RespVersion> {
        Json(RespVersion::process())
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespVersion {
    #[allow(clippy::too_many_arguments)]
    fn new(result_code: &str, result_msg: &str, server: &str, branch: &str, commit: &str, dirty: &str, ts: &str, rustc: &str)
    -> Self {
        Self {result_code: result_code.to_string(),
              result_msg: result_msg.to_string(),
              server_version: server.to_string(),
              git_branch: branch.to_string(),
              git_commit: commit.to_string(),
              git_dirty:  dirty.to_string(),
              source_ts: ts.to_string(),
              rustc_version: rustc.to_string(),
        }
    }

    fn process() -> RespVersion {
        Self::new("0",
                  "success",
                  SERVER_VERSION.unwrap_or("unknown"),
                  env!("GIT_BRANCH"),
                  env!("GIT_COMMIT_SHORT"),
                  env!("GIT_DIRTY"),
                  env!("SOURCE_TIMESTAMP"),
                  env!("RUSTC_VERSION"))
    }
}

// ***************************************************************************
//                            Public Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// version_summary:
// ---------------------------------------------------------------------------
/** One line of build information for the startup log. */
pub fn version_summary() -> String {
    let v = RespVersion::process();
    format!("*** Running ITEMS_SERVER={}, BRANCH={}, COMMIT={}, DIRTY={}, SRC_TS={}, RUSTC={}",
            v.server_version, v.git_branch, v.git_commit, v.git_dirty, v.source_ts, v.rustc_version)
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{body_json, test_client};

    #[tokio::test]
    async fn version_reports_cargo_version() {
        let cli = test_client();
        let resp = cli.get("/version").send().await;
        resp.assert_status_is_ok();

        let body = body_json(resp).await;
        assert_eq!(body["result_code"], "0");
        assert_eq!(body["server_version"], env!("CARGO_PKG_VERSION"));
        assert!(body["git_commit"].is_string());
    }

    #[test]
    fn summary_names_the_version() {
        assert!(version_summary().contains(env!("CARGO_PKG_VERSION")));
    }
}
