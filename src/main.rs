use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::Level;

use harborctl::config::Config;
use harborctl::harbor::client::{format_harbor_error, HarborClient};
use harborctl::harbor::error::Error as HarborError;
use harborctl::harbor::projects::{self, ProjectConfig};
use harborctl::harbor::robots::{self, RobotSpec, NEVER_EXPIRES};

/// Manage Harbor container registry projects and robot accounts
#[derive(Parser, Debug)]
#[command(name = "harborctl", version, about, long_about = None)]
struct Args {
    /// Harbor base URL (e.g. https://registry.example.com)
    #[arg(long)]
    url: Option<String>,

    /// Harbor username
    #[arg(short, long)]
    username: Option<String>,

    /// Harbor password (prefer the HARBOR_PASSWORD environment variable)
    #[arg(short, long)]
    password: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectCommand,
    },
    /// Manage project robot accounts
    Robot {
        #[command(subcommand)]
        action: RobotCommand,
    },
    /// Show or change the stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    /// Create a project
    Create {
        /// Project name
        name: String,
        /// Make the project publicly readable
        #[arg(long)]
        public: bool,
        /// Automatically scan images on push
        #[arg(long)]
        auto_scan: bool,
    },
    /// Show a project
    Show {
        /// Project ID
        id: String,
    },
    /// Update a project (unset flags keep their current value)
    Update {
        /// Project ID
        id: String,
        /// New project name
        #[arg(long)]
        name: Option<String>,
        /// Public visibility
        #[arg(long)]
        public: Option<bool>,
        /// Automatic image scanning
        #[arg(long)]
        auto_scan: Option<bool>,
    },
    /// Delete a project
    Delete {
        /// Project ID
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum RobotCommand {
    /// Create a robot account and print its one-time token
    Create {
        /// Robot account name
        name: String,
        /// ID of the project the robot belongs to
        #[arg(long)]
        project_id: String,
        /// Free-form description
        #[arg(long, default_value = "")]
        description: String,
        /// Allow pushing images to the project's repositories
        #[arg(long)]
        allow_push: bool,
        /// Allow reading the project's helm charts
        #[arg(long)]
        allow_helm_pull: bool,
        /// Allow creating helm chart versions in the project
        #[arg(long)]
        allow_helm_push: bool,
        /// Expiry as a Unix timestamp in seconds
        #[arg(long, conflicts_with = "never_expires")]
        expires_at: Option<i64>,
        /// Never expire the robot's token
        #[arg(long)]
        never_expires: bool,
    },
    /// Show a robot account
    Show {
        /// Robot account ID
        id: String,
        /// ID of the project the robot belongs to
        #[arg(long)]
        project_id: String,
    },
    /// Delete a robot account
    Delete {
        /// Robot account ID
        id: String,
        /// ID of the project the robot belongs to
        #[arg(long)]
        project_id: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the stored configuration
    Show,
    /// Store connection settings in the config file
    Set {
        /// Harbor base URL
        #[arg(long)]
        url: Option<String>,
        /// Harbor username
        #[arg(long)]
        username: Option<String>,
        /// Skip TLS certificate verification
        #[arg(long)]
        insecure: Option<bool>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .expect("Failed to open log file");

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .init();

    tracing::info!("harborctl started with log level: {:?}", level);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("harborctl").join("harborctl.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".harborctl").join("harborctl.log");
    }
    PathBuf::from("harborctl.log")
}

/// Resolve connection settings (CLI > env > config file) and build a client.
fn build_client(args: &Args, config: &Config) -> Result<HarborClient> {
    let url = args
        .url
        .clone()
        .or_else(|| config.effective_url())
        .context("No Harbor URL configured. Use --url, HARBOR_URL, or `harborctl config set --url`")?;
    url::Url::parse(&url).with_context(|| format!("Invalid Harbor URL: {url}"))?;

    let username = args
        .username
        .clone()
        .or_else(|| config.effective_username())
        .context("No Harbor username configured. Use --username, HARBOR_USERNAME, or `harborctl config set --username`")?;

    let password = args
        .password
        .clone()
        .or_else(|| config.effective_password())
        .context("No Harbor password configured. Use --password or HARBOR_PASSWORD")?;

    let insecure = args.insecure || config.effective_insecure();

    tracing::info!("Using Harbor at {} as {}", url, username);

    Ok(HarborClient::new(&url, &username, &password, insecure)?)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    if let Err(err) = run(args).await {
        let message = match err.downcast_ref::<HarborError>() {
            Some(api_err) => format_harbor_error(api_err),
            None => format!("{err:#}"),
        };
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load();

    match &args.command {
        Command::Config { action } => run_config(action, config),
        Command::Project { action } => {
            let client = build_client(&args, &config)?;
            run_project(&client, action).await
        }
        Command::Robot { action } => {
            let client = build_client(&args, &config)?;
            run_robot(&client, action).await
        }
    }
}

fn run_config(action: &ConfigCommand, mut config: Config) -> Result<()> {
    match action {
        ConfigCommand::Show => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommand::Set {
            url,
            username,
            insecure,
        } => {
            if let Some(url) = url {
                url::Url::parse(url).with_context(|| format!("Invalid Harbor URL: {url}"))?;
                config.url = Some(url.clone());
            }
            if let Some(username) = username {
                config.username = Some(username.clone());
            }
            if let Some(insecure) = insecure {
                config.insecure = Some(*insecure);
            }
            config.save()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }
    Ok(())
}

async fn run_project(client: &HarborClient, action: &ProjectCommand) -> Result<()> {
    match action {
        ProjectCommand::Create {
            name,
            public,
            auto_scan,
        } => {
            let (id, project) = projects::create_project(
                client,
                &ProjectConfig {
                    name: name.clone(),
                    public: *public,
                    auto_scan: *auto_scan,
                },
            )
            .await?;
            println!("Created project {id}");
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        ProjectCommand::Show { id } => {
            let project = projects::get_project(client, id).await?;
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        ProjectCommand::Update {
            id,
            name,
            public,
            auto_scan,
        } => {
            // Full-replacement update: start from the current state and
            // overlay whatever flags were given.
            let current = projects::get_project(client, id).await?;
            let desired = ProjectConfig {
                name: name.clone().unwrap_or(current.name),
                public: public.unwrap_or(current.public),
                auto_scan: auto_scan.unwrap_or(current.auto_scan),
            };
            let project = projects::update_project(client, id, &desired).await?;
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        ProjectCommand::Delete { id } => {
            projects::delete_project(client, id).await?;
            println!("Deleted project {id}");
        }
    }
    Ok(())
}

async fn run_robot(client: &HarborClient, action: &RobotCommand) -> Result<()> {
    match action {
        RobotCommand::Create {
            name,
            project_id,
            description,
            allow_push,
            allow_helm_pull,
            allow_helm_push,
            expires_at,
            never_expires,
        } => {
            let spec = RobotSpec {
                project_id: project_id.clone(),
                name: name.clone(),
                description: description.clone(),
                allow_push: *allow_push,
                allow_helm_pull: *allow_helm_pull,
                allow_helm_push: *allow_helm_push,
                never_expires: *never_expires,
                expires_at: expires_at.unwrap_or(NEVER_EXPIRES),
            };
            let created = robots::create_robot(client, &spec).await?;
            println!("Created robot account {}", created.id);
            println!("Token (shown only once): {}", created.token);
            println!("Expires: {}", format_expiry(created.expires_at));
        }
        RobotCommand::Show { id, project_id } => {
            let account = robots::get_robot(client, project_id, id).await?;
            println!("{}", serde_json::to_string_pretty(&account)?);
            println!("Expires: {}", format_expiry(account.expires_at));
        }
        RobotCommand::Delete { id, project_id } => {
            robots::delete_robot(client, project_id, id).await?;
            println!("Deleted robot account {id}");
        }
    }
    Ok(())
}

fn format_expiry(expires_at: i64) -> String {
    if expires_at == NEVER_EXPIRES {
        return "never".to_string();
    }
    chrono::DateTime::from_timestamp(expires_at, 0)
        .map(|ts| ts.to_rfc3339())
        .unwrap_or_else(|| expires_at.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn format_expiry_handles_never() {
        assert_eq!(format_expiry(NEVER_EXPIRES), "never");
    }

    #[test]
    fn format_expiry_formats_timestamps() {
        assert_eq!(format_expiry(0), "1970-01-01T00:00:00+00:00");
    }
}
