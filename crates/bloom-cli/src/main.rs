use bloom_core::BloomConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "bloom", version, about = "Bloom agent wallet and token CLI")]
struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Token signing secret. Overrides the configured secret sources.
    #[arg(long, global = true, env = "JWT_SECRET", hide_env_values = true)]
    secret: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the token signing secret.
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },
    /// Manage per-user agent wallets.
    Wallet {
        #[command(subcommand)]
        cmd: WalletCommand,
    },
    /// Issue, verify and inspect agent tokens.
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate a random signing secret.
    Generate {
        /// Directory to write `jwt.secret` into. Prints to stdout otherwise.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum WalletCommand {
    /// Create the user's wallet, or load it if it exists.
    Create {
        #[arg(long)]
        user: String,
    },
    /// Show a stored wallet.
    Show {
        #[arg(long)]
        user: String,
    },
    /// List stored wallets.
    List,
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Issue a token signed by the user's agent wallet.
    Issue {
        #[arg(long)]
        user: String,
        /// Granted scope; repeatable. Defaults to every scope.
        #[arg(long = "scope")]
        scopes: Vec<String>,
        /// Claims lifetime, e.g. "24h", "7d", "30m".
        #[arg(long)]
        expires: Option<String>,
        /// JSON file with the identity profile to embed.
        #[arg(long)]
        identity: Option<PathBuf>,
        #[arg(long = "agent-id")]
        agent_id: Option<String>,
        /// Write the token to a file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Verify a token (literal or file path).
    Verify {
        token: String,
        /// Scope the session must carry; repeatable.
        #[arg(long = "require-scope")]
        require_scopes: Vec<String>,
    },
    /// Decode a token without verifying it.
    Inspect { token: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let secret = cli.secret.as_deref();

    match cli.cmd {
        Command::Keys { cmd } => match cmd {
            KeysCommand::Generate { output } => commands::keys::generate(output),
        },
        Command::Wallet { cmd } => {
            let config = BloomConfig::load(cli.config.as_deref())?;
            match cmd {
                WalletCommand::Create { user } => commands::wallet::create(&config, &user),
                WalletCommand::Show { user } => commands::wallet::show(&config, &user),
                WalletCommand::List => commands::wallet::list(&config),
            }
        }
        Command::Token { cmd } => {
            let config = BloomConfig::load(cli.config.as_deref())?;
            match cmd {
                TokenCommand::Issue {
                    user,
                    scopes,
                    expires,
                    identity,
                    agent_id,
                    output,
                } => {
                    let args = commands::token::IssueArgs {
                        user,
                        scopes,
                        expires,
                        identity,
                        agent_id,
                        output,
                    };
                    commands::token::issue(&config, secret, args).await
                }
                TokenCommand::Verify {
                    token,
                    require_scopes,
                } => commands::token::verify(&config, secret, token, &require_scopes),
                TokenCommand::Inspect { token } => commands::token::inspect(token),
            }
        }
    }
}
