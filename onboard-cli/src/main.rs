//! onboard - Drive the onboarding flow from the command line
//!
//! Unix-style tool exercising the same repositories the UI screens use.

use clap::{Parser, Subcommand};
use libonboard::app::OnboardApp;
use libonboard::types::{CompanyCategory, UserRole};
use libonboard::{OnboardError, Result};

#[derive(Parser, Debug)]
#[command(name = "onboard")]
#[command(version)]
#[command(about = "Manage local onboarding state")]
#[command(long_about = "\
onboard - Manage local onboarding state

DESCRIPTION:
    onboard drives the same user and company repositories the onboarding
    screens use. Use it to register users, sign in and out, assign roles,
    and create companies against the local settings store.

COMMANDS:
    register        Register a new user and make them active
    login           Validate credentials and activate the matching user
    logout          Deactivate the current user
    whoami          Show the active user
    set-role        Assign a role to the active user
    create-company  Create a company owned by the active user
    companies       List companies owned by the active user
    reset           Delete all stored onboarding state

USAGE EXAMPLES:
    # Register and inspect the session
    onboard register --name \"Ana\" --email ana@example.com --password secret1
    onboard whoami

    # Assign a role
    onboard set-role admin

    # Create and list companies
    onboard create-company \"Acme\" --category retail --employees 20
    onboard companies --format json

    # End the session
    onboard logout

CONFIGURATION:
    Configuration file: ~/.config/onboard/config.toml
    Settings location: ~/.local/share/onboard/settings.json

    Override with environment variables:
        ONBOARD_CONFIG      - Path to config file
        ONBOARD_LOG_LEVEL   - Log level filter
        ONBOARD_LOG_FORMAT  - Log format (text, json, pretty)

EXIT CODES:
    0 - Success
    1 - Operation failed
    2 - No active user
    3 - Invalid input (bad role, category, credentials format)
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a new user and make them active
    Register {
        /// Full name of the user
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 6 characters)
        #[arg(short, long)]
        password: String,
    },

    /// Validate credentials and activate the matching user
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },

    /// Deactivate the current user
    Logout,

    /// Show the active user
    Whoami {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Assign a role to the active user
    SetRole {
        /// Role: admin, collaborator, or viewer
        role: String,
    },

    /// Create a company owned by the active user
    CreateCompany {
        /// Company name
        name: String,

        /// Category: general, health, retail, services, manufacturing
        #[arg(short, long, default_value = "general")]
        category: String,

        /// Number of employees
        #[arg(short, long, default_value = "50")]
        employees: u32,
    },

    /// List companies owned by the active user
    Companies {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Delete all stored onboarding state
    Reset,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        libonboard::logging::init_verbose();
    } else {
        libonboard::logging::init_default();
    }

    // Run the main logic and handle errors
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let app = OnboardApp::new().await?;

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => cmd_register(&app, &name, &email, &password).await?,
        Commands::Login { email, password } => cmd_login(&app, &email, &password).await?,
        Commands::Logout => cmd_logout(&app).await?,
        Commands::Whoami { format } => cmd_whoami(&app, &format).await?,
        Commands::SetRole { role } => cmd_set_role(&app, &role).await?,
        Commands::CreateCompany {
            name,
            category,
            employees,
        } => cmd_create_company(&app, &name, &category, employees).await?,
        Commands::Companies { format } => cmd_companies(&app, &format).await?,
        Commands::Reset => cmd_reset(&app).await?,
    }

    Ok(())
}

fn validate_format(format: &str) -> Result<()> {
    if format != "text" && format != "json" {
        return Err(OnboardError::InvalidInput(format!(
            "Invalid format '{}'. Must be 'text' or 'json'",
            format
        )));
    }
    Ok(())
}

/// Register a new user
async fn cmd_register(app: &OnboardApp, name: &str, email: &str, password: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(OnboardError::InvalidInput("Name must not be blank".to_string()));
    }
    if !email.contains('@') {
        return Err(OnboardError::InvalidInput(format!(
            "Invalid email '{}'",
            email
        )));
    }
    if password.chars().count() < 6 {
        return Err(OnboardError::InvalidInput(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let user = app.users().register_user(name, email, password).await?;
    println!("Registered {} <{}> (id {})", user.full_name, user.email, user.id);
    Ok(())
}

/// Validate credentials and activate the user
async fn cmd_login(app: &OnboardApp, email: &str, password: &str) -> Result<()> {
    if app.users().validate_credentials(email, password).await? {
        println!("Signed in as {}", email);
        Ok(())
    } else {
        Err(OnboardError::InvalidInput("Invalid credentials".to_string()))
    }
}

/// Deactivate the current user
async fn cmd_logout(app: &OnboardApp) -> Result<()> {
    if app.users().active_user().await?.is_none() {
        return Err(OnboardError::NoActiveUser);
    }
    app.users().logout().await?;
    println!("Signed out");
    Ok(())
}

/// Show the active user
async fn cmd_whoami(app: &OnboardApp, format: &str) -> Result<()> {
    validate_format(format)?;

    let user = app.users().active_user().await?.ok_or(OnboardError::NoActiveUser)?;

    if format == "json" {
        let json = serde_json::json!({
            "id": user.id,
            "full_name": user.full_name,
            "email": user.email,
            "role": user.role.map(|r| r.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&json).unwrap());
    } else {
        let role = user
            .role
            .map(|r| r.display_name().to_string())
            .unwrap_or_else(|| "none".to_string());
        println!("{} <{}> | role: {}", user.full_name, user.email, role);
    }
    Ok(())
}

/// Assign a role to the active user
async fn cmd_set_role(app: &OnboardApp, role: &str) -> Result<()> {
    let role: UserRole = role.parse().map_err(OnboardError::InvalidInput)?;
    let user = app.users().active_user().await?.ok_or(OnboardError::NoActiveUser)?;

    app.users().update_user_role(user.id, role).await?;
    println!("Set role of {} to {}", user.email, role);
    Ok(())
}

/// Create a company owned by the active user
async fn cmd_create_company(
    app: &OnboardApp,
    name: &str,
    category: &str,
    employees: u32,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(OnboardError::InvalidInput(
            "Company name must not be blank".to_string(),
        ));
    }
    let category: CompanyCategory = category.parse().map_err(OnboardError::InvalidInput)?;
    let user = app.users().active_user().await?.ok_or(OnboardError::NoActiveUser)?;

    let company = app
        .companies()
        .create_company(user.id, name.trim(), category, employees)
        .await?;
    println!("Created {} (id {})", company.name, company.id);
    Ok(())
}

/// List companies owned by the active user
async fn cmd_companies(app: &OnboardApp, format: &str) -> Result<()> {
    validate_format(format)?;

    let user = app.users().active_user().await?.ok_or(OnboardError::NoActiveUser)?;
    let companies = app.companies().companies_for_user(user.id).await?;

    if format == "json" {
        let json: Vec<serde_json::Value> = companies
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id,
                    "name": c.name,
                    "category": c.category.to_string(),
                    "employees_count": c.employees_count,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json).unwrap());
    } else {
        for company in &companies {
            println!(
                "{} | {} | {} employees",
                company.name,
                company.category.display_name(),
                company.employees_count
            );
        }
    }
    Ok(())
}

/// Delete all stored onboarding state
async fn cmd_reset(app: &OnboardApp) -> Result<()> {
    app.storage().clear().await?;
    app.session().clear().await?;
    println!("Cleared all onboarding state");
    Ok(())
}
