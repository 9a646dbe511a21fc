use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "wenmo")]
#[command(about = "WEN MOVED Coin ($WENMO) faucet client", long_about = None)]
pub struct Cli {
    /// Path to the configuration file (defaults to ./wenmo.toml when present)
    #[arg(short, long, value_name = "FILE", env = "WENMO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Node REST endpoint, including the `/v1` suffix
    #[arg(long, value_name = "URL")]
    pub node_url: Option<String>,

    /// File holding the hex-encoded Ed25519 private key
    #[arg(short, long, value_name = "FILE")]
    pub key_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Refresh once and print the faucet view
    Status,

    /// Claim tokens with the configured key
    Claim,

    /// Keep the view up to date; type c/d/r/q + Enter to claim, disconnect, reconnect or quit
    Watch,

    /// Generate a new key file (an existing file is loaded instead)
    GenerateKey {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}
