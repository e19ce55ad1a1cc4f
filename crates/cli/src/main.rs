//! Lapak - storefront for small local businesses, from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse and shop
//! lapak products --category Minuman
//! lapak cart add 665f1c2a01
//! lapak cart show
//! lapak checkout --name "Siti"
//!
//! # Account
//! lapak login 081234567890
//! lapak role switch
//!
//! # Admin (after `lapak role switch`)
//! lapak admin product add --name "Sambal Roa Botol" --price 35000 --image https://... --category Bumbu
//! lapak admin order status 665f1c2abc123ef99 selesai
//! ```
//!
//! Configuration comes from the environment; see
//! [`lapak_storefront::config`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use lapak_storefront::config::StorefrontConfig;
use lapak_storefront::error::{AppError, Result};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod commands;
mod output;

use app::App;
use commands::admin::ProductFields;

#[derive(Parser)]
#[command(name = "lapak")]
#[command(author, version, about = "Lapak storefront")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Only this category (Makanan, Minuman, Bumbu, Kerajinan)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one product
    Product {
        /// Product ID
        id: String,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Submit the cart as an order and message the merchant
    Checkout {
        /// Name on the order when not logged in
        #[arg(short, long)]
        name: Option<String>,
    },
    /// List orders, newest first
    Orders,
    /// Show or switch the active role
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },
    /// Log in
    Login {
        /// Phone number
        phone: String,
        /// Password (read from stdin if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Phone number
        phone: String,
        /// Password (read from stdin if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Log out
    Logout,
    /// Store management (admin role only)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show lines and total
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        id: String,
    },
    /// Remove a product's line entirely
    Remove {
        /// Product ID
        id: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum RoleAction {
    /// Show the active role
    Show,
    /// Toggle between admin and customer
    Switch,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Manage products
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage orders
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Bulk-create products from a YAML file
    Seed {
        /// Path to the seed file
        file: PathBuf,
    },
}

#[derive(clap::Args)]
struct ProductArgs {
    #[arg(long)]
    name: Option<String>,
    /// Price in rupiah
    #[arg(long)]
    price: Option<u64>,
    /// Image URL or file:// path
    #[arg(long)]
    image: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    category: Option<String>,
}

impl From<ProductArgs> for ProductFields {
    fn from(args: ProductArgs) -> Self {
        Self {
            name: args.name,
            price: args.price,
            image: args.image,
            description: args.description,
            category: args.category,
        }
    }
}

#[derive(Subcommand)]
enum ProductAction {
    /// Create a product
    Add(ProductArgs),
    /// Edit a product
    Edit {
        /// Product ID
        id: String,
        #[command(flatten)]
        fields: ProductArgs,
    },
    /// Delete a product
    Delete {
        /// Product ID
        id: String,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// Change an order's status (baru, proses, selesai)
    Status {
        /// Order ID
        id: String,
        /// New status
        status: String,
    },
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

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(json: bool) {
    // Defaults to warn so command output stays readable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lapak_storefront=warn,lapak=warn".into());

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            output::notice(&AppError::from(e).notice());
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing(cli.json_logs);

    let mut app = match App::open(&config) {
        Ok((app, problems)) => {
            for problem in &problems {
                output::notice(&problem.report());
            }
            app
        }
        Err(e) => {
            output::notice(&e.report());
            return ExitCode::FAILURE;
        }
    };

    match run(&mut app, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::notice(&e.report());
            ExitCode::FAILURE
        }
    }
}

async fn run(app: &mut App, command: Commands) -> Result<()> {
    match command {
        Commands::Products { category } => {
            commands::shop::products(app, category.as_deref()).await?;
        }
        Commands::Product { id } => commands::shop::product(app, &id).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(app),
            CartAction::Add { id } => commands::cart::add(app, &id).await?,
            CartAction::Remove { id } => commands::cart::remove(app, &id)?,
            CartAction::Clear => commands::cart::clear(app)?,
        },
        Commands::Checkout { name } => commands::shop::checkout(app, name.as_deref()).await?,
        Commands::Orders => commands::shop::orders(app).await?,
        Commands::Role { action } => match action {
            RoleAction::Show => commands::account::show_role(app),
            RoleAction::Switch => commands::account::switch_role(app)?,
        },
        Commands::Login { phone, password } => {
            commands::account::login(app, &phone, password).await?;
        }
        Commands::Register {
            name,
            phone,
            password,
        } => commands::account::register(app, &name, &phone, password).await?,
        Commands::Logout => commands::account::logout(app)?,
        Commands::Admin { action } => match action {
            AdminAction::Product { action } => match action {
                ProductAction::Add(fields) => {
                    commands::admin::add_product(app, fields.into()).await?;
                }
                ProductAction::Edit { id, fields } => {
                    commands::admin::edit_product(app, &id, fields.into()).await?;
                }
                ProductAction::Delete { id } => commands::admin::delete_product(app, &id).await?,
            },
            AdminAction::Order { action } => match action {
                OrderAction::Status { id, status } => {
                    commands::admin::set_order_status(app, &id, &status).await?;
                }
            },
            AdminAction::Seed { file } => commands::admin::seed(app, &file).await?,
        },
    }
    Ok(())
}
