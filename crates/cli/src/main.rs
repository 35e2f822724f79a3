//! Navdana CLI - browse the store, manage the cart and run the dashboard.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! navdana categories
//! navdana products --category 66a0f3
//! navdana search "silk saree" --live
//!
//! # Sign in with an emailed code
//! navdana login asha@example.com
//! navdana verify asha@example.com 482913
//!
//! # Cart (kept in the session file between runs)
//! navdana cart add 66b1c0 --size M
//! navdana cart list
//!
//! # Admin dashboard (admin role required)
//! navdana open /dashboard/users
//! navdana admin users list
//! ```
//!
//! # Environment Variables
//!
//! See `navdana_storefront::config`. `RUST_LOG` controls log output, which
//! goes to stderr.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use navdana_admin::UserForm;
use navdana_core::Role;
use navdana_storefront::api::ContactForm;
use navdana_storefront::config::StorefrontConfig;
use navdana_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{CliError, CommandResult};

#[derive(Parser)]
#[command(name = "navdana")]
#[command(author, version, about = "Navdana storefront from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List navigation categories
    Categories,
    /// List products
    Products {
        /// Only products in this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Search products by keyword
    Search {
        keyword: String,

        /// Type the keyword through the debounced search box
        #[arg(long)]
        live: bool,
    },
    /// Email a one-time login code
    Login { email: String },
    /// Sign in with the emailed code
    Verify { email: String, code: String },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Open a storefront path through the route guard
    Open { path: String },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Send a message through the contact form
    Contact {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        message: String,
        #[arg(short, long)]
        phone: Option<String>,
    },
    /// Subscribe to the newsletter
    Subscribe { email: String },
    /// Admin dashboard
    Admin {
        #[command(subcommand)]
        area: AdminArea,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    List,
    /// Add a product
    Add {
        product_id: String,

        /// Size to add; defaults to the first size in stock
        #[arg(short, long)]
        size: Option<String>,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change a line's quantity (0 or less removes it)
    Set {
        product_id: String,
        variant_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        product_id: String,
        variant_id: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum AdminArea {
    /// User accounts
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Contact page messages
    Contacts {
        #[command(subcommand)]
        action: ContactAction,
    },
    /// Newsletter subscribers
    Subscribers {
        #[command(subcommand)]
        action: SubscriberAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    List,
    Create(UserArgs),
    Update {
        id: String,
        #[command(flatten)]
        user: UserArgs,
    },
}

#[derive(Args)]
struct UserArgs {
    #[arg(short, long)]
    name: String,
    #[arg(short, long)]
    email: String,
    /// Leave out on update to keep the current password
    #[arg(long, default_value = "")]
    password: String,
    /// Date of birth (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    dob: String,
    #[arg(long, default_value = "")]
    phone: String,
    /// `admin` or `customer`
    #[arg(short, long, default_value = "customer", value_parser = parse_role)]
    role: Role,
}

impl From<UserArgs> for UserForm {
    fn from(args: UserArgs) -> Self {
        Self {
            name: args.name,
            email: args.email,
            password: args.password,
            dob: args.dob,
            phone_number: args.phone,
            role: args.role,
        }
    }
}

fn parse_role(value: &str) -> Result<Role, String> {
    match value.parse::<Role>() {
        Ok(Role::Other) | Err(_) => Err(format!("unknown role '{value}' (admin, customer)")),
        Ok(role) => Ok(role),
    }
}

#[derive(Subcommand)]
enum ContactAction {
    List,
    Delete { id: String },
}

#[derive(Subcommand)]
enum SubscriberAction {
    List,
    /// Email every subscriber
    Send { message: String },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "navdana=info,navdana_storefront=info,navdana_admin=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            e.report();
            tracing::error!("{}", e.user_message());
            return ExitCode::FAILURE;
        }
    };

    match run(cli, &state).await {
        Ok(output) => {
            #[allow(clippy::print_stdout)]
            {
                print!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            e.report();
            tracing::error!("Command failed: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, state: &AppState) -> CommandResult {
    match cli.command {
        Commands::Categories => commands::catalog::categories(state).await,
        Commands::Products { category } => commands::catalog::products(state, category).await,
        Commands::Search { keyword, live } => commands::catalog::search(state, &keyword, live).await,
        Commands::Login { email } => commands::auth::login(state, &email).await,
        Commands::Verify { email, code } => commands::auth::verify(state, &email, &code).await,
        Commands::Logout => commands::auth::logout(state),
        Commands::Whoami => commands::auth::whoami(state),
        Commands::Open { path } => commands::pages::open(state, &path).await,
        Commands::Cart { action } => run_cart(action, state).await,
        Commands::Contact {
            name,
            email,
            message,
            phone,
        } => {
            let form = ContactForm {
                name,
                email,
                phone,
                message,
            };
            commands::pages::contact(state, form).await
        }
        Commands::Subscribe { email } => commands::pages::subscribe(state, &email).await,
        Commands::Admin { area } => run_admin(area, state).await,
    }
}

async fn run_cart(action: CartAction, state: &AppState) -> CommandResult {
    match action {
        CartAction::List => commands::cart::list(state),
        CartAction::Add {
            product_id,
            size,
            quantity,
        } => commands::cart::add(state, &product_id, size.as_deref(), quantity).await,
        CartAction::Set {
            product_id,
            variant_id,
            quantity,
        } => commands::cart::set(state, &product_id, &variant_id, quantity),
        CartAction::Remove {
            product_id,
            variant_id,
        } => commands::cart::remove(state, &product_id, &variant_id),
        CartAction::Clear => commands::cart::clear(state),
    }
}

async fn run_admin(area: AdminArea, state: &AppState) -> Result<String, CliError> {
    match area {
        AdminArea::Users { action } => match action {
            UserAction::List => commands::admin::list_users(state).await,
            UserAction::Create(user) => commands::admin::create_user(state, &user.into()).await,
            UserAction::Update { id, user } => {
                commands::admin::update_user(state, &id, &user.into()).await
            }
        },
        AdminArea::Contacts { action } => match action {
            ContactAction::List => commands::admin::list_contacts(state).await,
            ContactAction::Delete { id } => commands::admin::delete_contact(state, &id).await,
        },
        AdminArea::Subscribers { action } => match action {
            SubscriberAction::List => commands::admin::list_subscribers(state).await,
            SubscriberAction::Send { message } => commands::admin::send_mail(state, &message).await,
        },
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_role_rejects_unknown() {
        assert_eq!(parse_role("admin"), Ok(Role::Admin));
        assert!(parse_role("manager").is_err());
    }

    #[test]
    fn test_cart_set_accepts_negative_quantity() {
        let cli = Cli::try_parse_from(["navdana", "cart", "set", "p1", "v1", "-1"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Cart {
                action: CartAction::Set { quantity: -1, .. }
            })
        ));
    }
}
