use clap::{Parser, Subcommand};
use std::process::ExitCode;
use userdesk::{
    config::AppConfig,
    db,
    models::{ActorRef, BulkAction, TargetIds},
    services::CreateUserRequest,
    AppState,
};

#[derive(Parser)]
#[command(name = "userdesk-cli")]
#[command(about = "CLI tool for managing userdesk accounts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a new user
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// List all users, most recent login first
    List,

    /// Block users
    Block(BulkArgs),

    /// Unblock users
    Unblock(BulkArgs),

    /// Delete users
    Delete(BulkArgs),
}

#[derive(clap::Args)]
struct BulkArgs {
    /// ID of the acting user; must be active
    #[arg(short, long)]
    actor: i64,

    /// Target user IDs
    #[arg(short, long, num_args = 1.., value_delimiter = ',')]
    ids: Vec<i64>,
}

fn get_password(prompt: &str) -> anyhow::Result<String> {
    use std::io::{self, Write};
    print!("{}: ", prompt);
    io::stdout().flush()?;

    Ok(rpassword::read_password()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    let config = AppConfig::from_env()?;
    let pool = db::create_pool(&config).await?;
    db::run_migrations(&pool).await?;

    let app_state = AppState::from_pool(pool.clone());

    let code = match cli.command {
        Commands::User { command } => run_user_command(&app_state, command).await?,
    };

    pool.close().await;
    Ok(code)
}

async fn run_user_command(app_state: &AppState, command: UserCommands) -> anyhow::Result<ExitCode> {
    let (args, action) = match command {
        UserCommands::Create {
            name,
            email,
            password,
        } => {
            let password = match password {
                Some(pw) => pw,
                None => {
                    let password = get_password("Password")?;
                    if password != get_password("Confirm password")? {
                        eprintln!("❌ Passwords do not match");
                        return Ok(ExitCode::FAILURE);
                    }
                    password
                }
            };

            let request = CreateUserRequest {
                name,
                email,
                password,
            };

            return match app_state.user_service.create_user(request).await {
                Ok(user) => {
                    println!("✅ User created successfully!");
                    println!("  ID: {}", user.id);
                    println!("  Email: {}", user.email);
                    println!("  Status: {}", user.status);
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("❌ Failed to create user: {}", err);
                    Ok(ExitCode::FAILURE)
                }
            };
        }

        UserCommands::List => {
            return match app_state.user_service.list_users().await {
                Ok(users) if users.is_empty() => {
                    println!("No users found.");
                    Ok(ExitCode::SUCCESS)
                }
                Ok(users) => {
                    println!(
                        "{:<5} {:<20} {:<32} {:<8} {:<20}",
                        "ID", "Name", "Email", "Status", "Last login"
                    );
                    println!("{}", "-".repeat(89));
                    for user in users {
                        println!(
                            "{:<5} {:<20} {:<32} {:<8} {:<20}",
                            user.id,
                            user.name,
                            user.email,
                            user.status.as_str(),
                            user.last_login_time
                                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                                .unwrap_or_else(|| "never".to_string())
                        );
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("❌ Failed to list users: {}", err);
                    Ok(ExitCode::FAILURE)
                }
            };
        }

        UserCommands::Block(args) => (args, BulkAction::Block),
        UserCommands::Unblock(args) => (args, BulkAction::Unblock),
        UserCommands::Delete(args) => (args, BulkAction::Delete),
    };

    match app_state
        .access_service
        .apply_bulk_action(
            ActorRef::Id(args.actor),
            Some(TargetIds::new(args.ids)),
            action,
        )
        .await
    {
        Ok(outcome) => {
            println!(
                "✅ {} ({} of {} matched)",
                action.success_message(),
                outcome.affected,
                outcome.requested
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("❌ {}", err);
            Ok(ExitCode::FAILURE)
        }
    }
}
