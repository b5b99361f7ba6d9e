use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "shopwhisper",
    about = "Conversational product search over a vector index",
    version
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(global = true, long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask one shopping question and print the recommended products
    Ask {
        /// What you are looking for (e.g. "red dress for a summer wedding")
        query: String,

        /// Show every matched product instead of the first three
        #[arg(long)]
        all: bool,

        /// Print the recommendation as JSON
        #[arg(long)]
        json: bool,

        /// Chat provider override (openai, anthropic, ollama)
        #[arg(long)]
        provider: Option<String>,
    },

    /// Open the interactive chat widget
    Chat {
        /// Chat provider override (openai, anthropic, ollama)
        #[arg(long)]
        provider: Option<String>,
    },

    /// Manage service credentials
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand)]
pub enum AuthCommand {
    /// Store credentials for a service
    Login {
        /// Service name (openai, anthropic, pinecone)
        #[arg(long)]
        service: Option<String>,

        /// Use this service as the default chat provider
        #[arg(long = "default")]
        set_default: bool,
    },

    /// List configured services
    List,

    /// Remove stored credentials
    Logout {
        /// Service name to remove
        service: String,
    },

    /// Show the resolved configuration
    Status,

    /// Test connectivity to the embedding service and the vector index
    Test {
        /// Chat provider override (openai, anthropic, ollama)
        #[arg(long)]
        provider: Option<String>,
    },
}
