//! CLI arguments and server configuration defaults.

use clap::Parser;

pub const DEFAULT_ROOT_DIR: &str = ".";
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// CLI arguments and environment configuration for the server.
#[derive(Parser, Debug)]
#[command(name = "fileshelf", version, about = "HTTP file server for a single directory tree")]
pub struct Args {
    #[arg(
        short = 'r',
        long,
        env = "SHELF_ROOT_DIR",
        default_value = DEFAULT_ROOT_DIR,
        help = "Directory tree to serve"
    )]
    pub root_dir: String,
    #[arg(
        short = 'b',
        long,
        env = "SHELF_BIND",
        default_value = DEFAULT_BIND,
        help = "Bind address for HTTP"
    )]
    pub host: String,
    #[arg(
        short = 'p',
        long,
        env = "SHELF_PORT",
        default_value_t = DEFAULT_PORT,
        help = "HTTP port"
    )]
    pub port: u16,
}
