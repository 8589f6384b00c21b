use clap::{CommandFactory, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "notibox-cli", version, about = "Notibox CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inbox listing, counts, and refresh
    Inbox {
        #[command(subcommand)]
        action: commands::inbox::InboxAction,
    },
    /// Mark notifications read (and undo)
    Read {
        #[command(subcommand)]
        action: commands::read::ReadAction,
    },
    /// Archive notifications
    Archive {
        #[command(subcommand)]
        action: commands::archive::ArchiveAction,
    },
    /// Snooze and wake notifications
    Snooze {
        #[command(subcommand)]
        action: commands::snooze::SnoozeAction,
    },
    /// Auto-archive rule management
    Rules {
        #[command(subcommand)]
        action: commands::rules::RulesAction,
    },
    /// Show bucket counts and store health
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the unread badge
    Badge {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the background watch loop
    Watch {
        /// Seconds between remote fetches (defaults to config)
        #[arg(long)]
        interval_secs: Option<u64>,
        /// Run a single iteration and exit
        #[arg(long)]
        once: bool,
    },
    /// Authentication management for GitHub
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Inbox { action } => commands::inbox::run(action),
        Commands::Read { action } => commands::read::run(action),
        Commands::Archive { action } => commands::archive::run(action),
        Commands::Snooze { action } => commands::snooze::run(action),
        Commands::Rules { action } => commands::rules::run(action),
        Commands::Status { json } => commands::status::run(json),
        Commands::Badge { json } => commands::status::badge(json),
        Commands::Watch {
            interval_secs,
            once,
        } => commands::watch::run(interval_secs, once),
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "notibox-cli", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
