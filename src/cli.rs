use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "askcosc",
    about = "CBIT Hacktoberfest portal companion (registration gate + FAQ chatbot)"
)]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sign in if needed, resolve the registration gate, then open the chat
    Run {
        /// Route to navigate to, e.g. /registration or /teamdetails
        #[arg(long)]
        route: Option<String>,
    },
    /// Open the ASK COSC FAQ chatbot without signing in
    Chat,
    /// Remove the local portal session
    Logout,
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Run { route: None })
    }
}
