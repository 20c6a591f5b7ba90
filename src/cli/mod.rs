use std::net::IpAddr;

use clap::{Parser, Subcommand};

use crate::config::{AppConfig, StoreBackend};

#[derive(Debug, Parser)]
#[command(name = "watch-hut-api")]
#[command(about = "Watch Hut storefront API server")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, global = true, help = "Address to bind (overrides HOST)")]
    pub host: Option<IpAddr>,

    #[arg(long, global = true, value_enum, help = "Document store backend (overrides STORE_BACKEND)")]
    pub store: Option<StoreBackend>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Commands {
    #[command(about = "Serve the HTTP API (default)")]
    Serve,

    #[command(about = "Create the store's collections if absent, then exit")]
    InitStore,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }

    /// Apply command-line overrides on top of the environment configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(store) = self.store {
            config.database.backend = store;
        }
        // Store setup never verifies tokens
        if self.command() == Commands::InitStore {
            config.auth.disabled = true;
        }
    }
}
