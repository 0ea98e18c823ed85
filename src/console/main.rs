use clap::{Parser, Subcommand};
use pcbuilds::console::commands::{self, CallableTrait};
use pcbuilds::models::Role;
use pcbuilds::telemetry::{get_subscriber, init_subscriber};

#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Scraper {
        #[command(subcommand)]
        command: ScraperCommands,
    },
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    MQ {
        #[command(subcommand)]
        command: AppMqCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ScraperCommands {
    /// Scrape every configured category in the foreground
    Run {},
}

#[derive(Debug, Subcommand)]
enum UserCommands {
    /// Assign a role, bypassing the API permission checks
    SetRole {
        #[arg(long)]
        user_id: i32,
        #[arg(long)]
        role: Role,
    },
}

#[derive(Debug, Subcommand)]
enum AppMqCommands {
    /// Forward queued emails to the mail relay
    Listen {},
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = get_subscriber("pcbuilds-console".into(), "info".into(), std::io::stderr);
    init_subscriber(subscriber);

    get_command(cli).call()
}

fn get_command(cli: Cli) -> Box<dyn CallableTrait> {
    match cli.command {
        Commands::Scraper { command } => match command {
            ScraperCommands::Run {} => Box::new(commands::scraper::RunCommand::new()),
        },
        Commands::User { command } => match command {
            UserCommands::SetRole { user_id, role } => {
                Box::new(commands::user::SetRoleCommand::new(user_id, role))
            }
        },
        Commands::MQ { command } => match command {
            AppMqCommands::Listen {} => Box::new(commands::mq::ListenCommand::new()),
        },
    }
}
