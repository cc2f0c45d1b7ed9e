#![forbid(unsafe_code)]

use std::time::Duration;

use anyhow::Result;
use log::{error, info};
use poem::{listener::TcpListener, Server};

// Server Utilities
use crate::utils::config::{init_log, init_runtime_context, init_server_dirs, RuntimeCtx, SERVER_ARGS};
use crate::utils::errors::Errors;

// Modules
mod api;
mod utils;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const SERVER_NAME : &str = "ItemsServer"; // for poem logging

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<()> {
    // --------------- Initialize Server --------------
    // Announce ourselves.
    println!("Starting items_server!");

    // Initialize the server.
    let runtime_ctx = match server_init()? {
        Some(ctx) => ctx,
        None => return Ok(()),
    };
    let config = &runtime_ctx.parms.config;

    // --------------- Main Loop Set Up ---------------
    let app = api::build_app(config);
    let addr = config.bind_addr();
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    info!("{} listening on {}, documentation at {}/docs", SERVER_NAME, addr, config.server_url());

    // ------------------ Main Loop -------------------
    Server::new(TcpListener::bind(addr))
        .name(SERVER_NAME)
        .run_with_graceful_shutdown(app, shutdown_signal(), Some(grace))
        .await?;

    info!("{} stopped.", SERVER_NAME);
    Ok(())
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// server_init:
// ---------------------------------------------------------------------------
/** Create the data directories, read the configuration and start logging.
 * None is returned when only the directories were requested.
 */
fn server_init() -> Result<Option<RuntimeCtx>> {
    let server_dirs = init_server_dirs()?;
    if SERVER_ARGS.create_dirs_only {
        println!("Data directories created under {}.", server_dirs.root_dir);
        return Ok(None);
    }

    let runtime_ctx = init_runtime_context(server_dirs)?;
    init_log(&runtime_ctx.server_dirs, &runtime_ctx.parms.config)?;

    info!("{}", Errors::InputParms(format!("{:#?}", runtime_ctx)));
    if runtime_ctx.parms.config_file.is_empty() {
        info!("No configuration file found, using defaults.");
    } else {
        info!("Configuration read from {}.", runtime_ctx.parms.config_file);
    }
    info!("{}", api::version::version_summary());
    Ok(Some(runtime_ctx))
}

// ---------------------------------------------------------------------------
// shutdown_signal:
// ---------------------------------------------------------------------------
// Resolves on Ctrl-C.  If the handler can't be installed the server runs
// until it is killed.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested, draining in-flight requests."),
        Err(e) => {
            error!("Unable to listen for the shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
