//! CLI runner - executes commands

use crate::auth::{TokenCache, TokenCacheConfig};
use crate::cli::commands::{Cli, Commands};
use crate::config::Settings;
use crate::error::Result;
use serde_json::{json, Value};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Serve { port } => self.serve(*port).await,
            Commands::Check => self.check().await,
        }
    }

    /// Start the HTTP facade
    async fn serve(&self, port: Option<u16>) -> Result<()> {
        let mut settings = Settings::from_env()?;
        if let Some(port) = port {
            settings.port = port;
        }
        crate::server::serve(&settings).await
    }

    /// Check the configured credentials with a live token request
    async fn check(&self) -> Result<()> {
        let settings = Settings::from_env()?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!("Checking connection to {}", settings.base_url())
            }
        }));

        let cache = TokenCache::new(TokenCacheConfig {
            token_url: settings.token_url(),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            timeout: settings.token_timeout(),
        })?;

        match cache.get_valid_token(settings.mode).await {
            Ok(_) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "SUCCEEDED",
                        "message": "Connection successful"
                    }
                }));
            }
            Err(e) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "FAILED",
                        "message": format!("Connection failed: {e}")
                    }
                }));
            }
        }

        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        if self.cli.verbose {
            println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
        } else {
            println!("{}", serde_json::to_string(msg).unwrap_or_default());
        }
    }
}
