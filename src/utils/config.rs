#![forbid(unsafe_code)]

use anyhow::{Result, anyhow};
use log::{info, error, LevelFilter};
use serde::Deserialize;
use std::{env, fs, path::Path, str::FromStr};
use fs_mistrust::Mistrust;
use std::os::unix::fs::PermissionsExt;
use lazy_static::lazy_static;
use structopt::StructOpt;

use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;

// Server Utilities
use crate::utils::{server_utils, errors::Errors};

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Directory and file locations. Unless otherwise noted, all files and directories
// are relative to the root directory.
const ENV_ROOT_DIR         : &str = "ITEMS_ROOT_DIR";
const DEFAULT_ROOT_DIR     : &str = "~/.items_server";
const CONFIG_DIR           : &str = "/config";
const LOGS_DIR             : &str = "/logs";
const LOG4RS_CONFIG_FILE   : &str = "/log4rs.yml";  // relative to config dir
const SERVER_CONFIG_FILE   : &str = "/items.toml";  // relative to config dir

// Networking.
const DEFAULT_HTTP_ADDR    : &str = "http://localhost";
const DEFAULT_HTTP_PORT    : u16  = 8000;
const DEFAULT_BIND_HOST    : &str = "127.0.0.1";
const DEFAULT_SHUTDOWN_SECS: u64  = 5;

// Used only when no log4rs.yml file is present.
const DEFAULT_LOG_LEVEL    : &str = "info";
const CONSOLE_LOG_PATTERN  : &str = "{d(%Y-%m-%dT%H:%M:%S%.3f)} {h({l})} {t} - {m}{n}";

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Assign the command line arguments before the runtime context is built in main.
lazy_static! {
    pub static ref SERVER_ARGS: ServerArgs = ServerArgs::from_args();
}

// ***************************************************************************
//                             Directory Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// ServerDirs:
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub struct ServerDirs {
    pub root_dir: String,
    pub config_dir: String,
    pub logs_dir: String,
}

impl ServerDirs {
    /// Lay out the data directories under an absolute root directory.
    pub fn new(root_dir: &str) -> Self {
        let root_dir = root_dir.trim_end_matches('/').to_string();
        Self {
            config_dir: root_dir.clone() + CONFIG_DIR,
            logs_dir: root_dir.clone() + LOGS_DIR,
            root_dir,
        }
    }

    pub fn config_file(&self) -> String {
        self.config_dir.clone() + SERVER_CONFIG_FILE
    }

    pub fn log4rs_file(&self) -> String {
        self.config_dir.clone() + LOG4RS_CONFIG_FILE
    }
}

// ***************************************************************************
//                               Config Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// ServerArgs:
// ---------------------------------------------------------------------------
#[derive(Debug, StructOpt)]
#[structopt(name = "items_server", about = "Command line arguments for the items server.")]
pub struct ServerArgs {
    /// Specify the server's root data directory.
    ///
    /// This directory contains the config and logs directories.
    #[structopt(short, long)]
    pub root_dir: Option<String>,

    /// Create the data directories and then exit.
    ///
    /// The data directories will be rooted at a root directory calculated
    /// using the following priority order:
    ///
    ///   1. If set, the value of the ITEMS_ROOT_DIR environment,
    ///
    ///   2. Otherwise, if set, the value of the --root-dir command line argument,
    ///
    ///   3. Otherwise, ~/.items_server
    ///
    #[structopt(short, long)]
    pub create_dirs_only: bool,
}

// ---------------------------------------------------------------------------
// Parms:
// ---------------------------------------------------------------------------
#[derive(Debug)]
pub struct Parms {
    pub config_file: String,
    pub config: Config,
}

// ---------------------------------------------------------------------------
// RuntimeCtx:
// ---------------------------------------------------------------------------
#[derive(Debug)]
pub struct RuntimeCtx {
    pub parms: Parms,
    pub server_dirs: ServerDirs,
}

// ---------------------------------------------------------------------------
// Config:
// ---------------------------------------------------------------------------
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub http_addr: String,
    pub http_port: u16,
    pub bind_host: String,
    pub shutdown_timeout_secs: u64,
    pub log_level: String,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    /// The externally visible base url advertised in the openapi document.
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.http_addr, self.http_port)
    }

    /// The socket address the listener binds.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.http_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Items Server".to_string(),
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            bind_host: DEFAULT_BIND_HOST.to_string(),
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_SECS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

// ***************************************************************************
//                            Directory Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_server_dirs:
// ---------------------------------------------------------------------------
/** Calculate the external data directories, creating any that don't exist. */
pub fn init_server_dirs() -> Result<ServerDirs> {
    // Initialize the mistrust object.
    let mistrust = get_mistrust()?;

    // Check that each path is absolute and is a directory with the
    // proper permission assigned if it exists.  If it doesn't exist,
    // create it.
    let dirs = ServerDirs::new(&get_root_dir());
    check_server_dir(&dirs.root_dir, "root directory", &mistrust)?;
    check_server_dir(&dirs.config_dir, "config directory", &mistrust)?;
    check_server_dir(&dirs.logs_dir, "logs directory", &mistrust)?;

    Ok(dirs)
}

// ---------------------------------------------------------------------------
// check_server_dir:
// ---------------------------------------------------------------------------
/** Check that the path is absolute and, if it exists, that is has the proper
 * permissions assigned.  If it doesn't exist, create it.  The mistrust package
 * creates directories with 0o700 permissions.
 */
fn check_server_dir(dir: &str, msgname: &str, mistrust: &Mistrust) -> Result<()> {
    let path = Path::new(dir);
    if !path.is_absolute() {
        return Err(Errors::DirectoryError(dir.to_string(),
                    format!("the {} path must be absolute", msgname)).into());
    }

    if path.exists() {
        if !path.is_dir() {
            return Err(Errors::DirectoryError(dir.to_string(),
                        format!("the {} path must be a directory", msgname)).into());
        }

        // Make sure the directory has rwx for owner only.
        let perm = path.metadata()?.permissions().mode();
        if perm & 0o777 != 0o700 {
            return Err(Errors::DirectoryError(dir.to_string(),
                        format!("the {} path must have 0o700 permissions", msgname)).into());
        }
    } else if let Err(e) = mistrust.make_directory(path) {
        return Err(Errors::DirectoryError(dir.to_string(), e.to_string()).into());
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// get_mistrust:
// ---------------------------------------------------------------------------
/** Configure a new mistrust object for initial directory processing. */
fn get_mistrust() -> Result<Mistrust> {
    Mistrust::builder()
        .ignore_prefix(server_utils::get_absolute_path("~"))
        .trust_group(0)
        .build()
        .map_err(|e| anyhow!("Mistrust configuration error: {}", e))
}

// ---------------------------------------------------------------------------
// get_root_dir:
// ---------------------------------------------------------------------------
fn get_root_dir() -> String {
    // Order of precedence:
    //  1. Environment variable
    //  2. Command line --root-dir argument
    //  3. Default location
    //
    let root_dir = env::var(ENV_ROOT_DIR).unwrap_or_else(
        |_| {
            match SERVER_ARGS.root_dir.clone() {
                Some(r) => r,
                None => DEFAULT_ROOT_DIR.to_string(),
            }
        });

    // Canonicalize the path.
    server_utils::get_absolute_path(&root_dir)
}

// ***************************************************************************
//                               Log Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_log:
// ---------------------------------------------------------------------------
/** Initialize log4rs from the log4rs.yml file in the config directory.  When
 * that file doesn't exist, log to the console at the configured level.
 */
pub fn init_log(dirs: &ServerDirs, config: &Config) -> Result<()> {
    let logconfig = dirs.log4rs_file();
    if Path::new(&logconfig).is_file() {
        log4rs::init_file(&logconfig, Default::default())
            .map_err(|e| Errors::Log4rsInitialization(logconfig.clone(), e.to_string()))?;
        info!("Log4rs initialized using: {}", logconfig);
        return Ok(());
    }

    let level = parse_log_level(&config.log_level)?;
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(CONSOLE_LOG_PATTERN)))
        .build();
    let log_config = LogConfig::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))
        .map_err(|e| Errors::Log4rsInitialization("console".to_string(), e.to_string()))?;
    log4rs::init_config(log_config)
        .map_err(|e| Errors::Log4rsInitialization("console".to_string(), e.to_string()))?;
    info!("Log4rs initialized to the console at level {}.", level);
    Ok(())
}

// ---------------------------------------------------------------------------
// parse_log_level:
// ---------------------------------------------------------------------------
fn parse_log_level(level: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(level)
        .map_err(|_| anyhow!("Invalid log_level in configuration: {}", level))
}

// ***************************************************************************
//                             Parms Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_parms:
// ---------------------------------------------------------------------------
/** Retrieve the application parameters from the configuration file in the
 * config directory.  If that file cannot be read, the default values are used.
 */
fn get_parms(dirs: &ServerDirs) -> Result<Parms> {
    // Read the configuration file.
    let config_file_abs = server_utils::get_absolute_path(&dirs.config_file());
    let contents = match fs::read_to_string(&config_file_abs) {
        Ok(c) => c,
        Err(_) => {
            println!("Unable to read configuration at {}. Using default values.", config_file_abs);
            return Ok(Parms { config_file: Default::default(), config: Config::new() });
        }
    };
    println!("{}", Errors::ReadingConfigFile(config_file_abs.clone()));

    let config = parse_config(&contents, &config_file_abs)?;
    Ok(Parms { config_file: config_file_abs, config })
}

// ---------------------------------------------------------------------------
// parse_config:
// ---------------------------------------------------------------------------
/** Parse the toml configuration, filling unspecified fields with defaults. */
pub fn parse_config(contents: &str, config_file: &str) -> Result<Config> {
    let config : Config = match toml::from_str(contents) {
        Ok(c)  => c,
        Err(e) => {
            let msg = format!("{}\n   {}", Errors::TOMLParseError(config_file.to_string()), e);
            error!("{}", msg);
            return Result::Err(anyhow!(msg));
        }
    };

    // Catch a bad log level here rather than at log initialization.
    parse_log_level(&config.log_level)?;
    Ok(config)
}

// ***************************************************************************
//                             Config Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_runtime_context:
// ---------------------------------------------------------------------------
/** Read the configuration from an initialized data directory tree.  Logging
 * is not yet available, so progress goes to stdout.
 */
pub fn init_runtime_context(server_dirs: ServerDirs) -> Result<RuntimeCtx> {
    let parms = get_parms(&server_dirs)?;
    Ok(RuntimeCtx {parms, server_dirs})
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirs_are_rooted() {
        let dirs = ServerDirs::new("/tmp/items/");
        assert_eq!(dirs.root_dir, "/tmp/items");
        assert_eq!(dirs.config_dir, "/tmp/items/config");
        assert_eq!(dirs.logs_dir, "/tmp/items/logs");
        assert_eq!(dirs.config_file(), "/tmp/items/config/items.toml");
        assert_eq!(dirs.log4rs_file(), "/tmp/items/config/log4rs.yml");
    }

    #[test]
    fn default_config() {
        let config = Config::new();
        assert_eq!(config.http_port, 8000);
        assert_eq!(config.server_url(), "http://localhost:8000");
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config = parse_config("title = \"Tutorial\"\nhttp_port = 9090\n", "items.toml")
            .expect("valid toml");
        assert_eq!(config.title, "Tutorial");
        assert_eq!(config.http_port, 9090);
        assert_eq!(config.bind_host, DEFAULT_BIND_HOST);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(parse_config("", "items.toml").expect("valid toml"), Config::new());
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(parse_config("http_port = \"not a port\"", "items.toml").is_err());
        assert!(parse_config("title = ", "items.toml").is_err());
    }

    #[test]
    fn bad_log_level_is_rejected() {
        assert!(parse_config("log_level = \"chatty\"", "items.toml").is_err());
        assert!(parse_config("log_level = \"debug\"", "items.toml").is_ok());
    }
}
