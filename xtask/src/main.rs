//! See <https://github.com/matklad/cargo-xtask/>
//!
//! Auxiliary commands for the formdesk workspace that are not expressible
//! with plain `cargo`, invoked as `cargo xtask <command>`.

use clap::Parser;

mod dynamodb;
mod prelude;

/// Development tasks for the formdesk workspace
#[derive(Debug, Parser)]
#[command(name = "xtask")]
#[command(about = "Development tasks for formdesk", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: Global,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Silence the command output
    #[clap(long, global = true)]
    pub silent: bool,
}

impl Global {
    pub fn is_silent(&self) -> bool {
        self.silent
    }
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Manage the DynamoDB table backing formdesk
    Dynamodb(dynamodb::DynamodbCommand),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Dynamodb(dynamodb_cmd) => {
            dynamodb::run(dynamodb_cmd, cli.global).await?;
        }
    }

    Ok(())
}
