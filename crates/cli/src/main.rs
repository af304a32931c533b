//! Parfumerie CLI - cart, catalog and admin tools for the storefront API.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! parfumerie catalog list
//!
//! # Add two bottles of product 7 to the cart, then check out
//! parfumerie cart add 7 -q 2
//! parfumerie order place -n "Ada Lovelace" -e ada@example.com -a "1 Rue de la Paix"
//!
//! # Admin session
//! parfumerie admin login ada
//! parfumerie admin set-status 12 shipped
//! ```
//!
//! # Commands
//!
//! - `catalog` - List and inspect products
//! - `cart` - Manage the persisted shopping cart
//! - `order` - Place an order from the cart
//! - `admin` - Admin login and order/product management
//! - `prefs` - Display preferences

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};
use parfumerie_client::config::ClientConfig;
use parfumerie_core::{OrderId, OrderStatus, ProductId};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::Context;
use commands::prefs::DarkMode;

#[derive(Parser)]
#[command(name = "parfumerie")]
#[command(author, version, about = "Parfumerie storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place orders
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Admin session and store management
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Display preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List all products
    List,
    /// Show a single product
    Show { id: ProductId },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and total
    Show,
    /// Add a product to the cart
    Add {
        id: ProductId,

        /// Number of units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Remove a product from the cart
    Remove { id: ProductId },
    /// Change a line's quantity by a signed amount
    Update {
        id: ProductId,

        /// Amount to add (negative to subtract)
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrderAction {
    /// Submit the current cart as an order
    Place {
        /// Customer name
        #[arg(short, long)]
        name: String,

        /// Customer email address
        #[arg(short, long)]
        email: String,

        /// Shipping address
        #[arg(short, long)]
        address: String,

        /// Contact phone number
        #[arg(short, long)]
        phone: Option<String>,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Log in (password from `PARFUMERIE_ADMIN_PASSWORD` or stdin)
    Login { username: String },
    /// Forget the stored admin session
    Logout,
    /// Show the logged-in admin
    Whoami,
    /// List all orders
    Orders,
    /// Change an order's status
    SetStatus { id: OrderId, status: OrderStatus },
    /// Create a product
    CreateProduct {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        price: Decimal,
    },
    /// Replace a product's name and price
    UpdateProduct {
        id: ProductId,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        price: Decimal,
    },
    /// Delete a product
    DeleteProduct { id: ProductId },
}

#[derive(Subcommand)]
enum PrefsAction {
    /// Show or change dark mode
    DarkMode {
        /// New setting; omit to show the current one
        #[arg(value_enum)]
        state: Option<DarkMode>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
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

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration is needed before the subscriber so Sentry can hook in
    let config = ClientConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "parfumerie_client=info,parfumerie_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        if e.requires_login() {
            tracing::error!("Command failed: {e} (run `parfumerie admin login <username>`)");
        } else {
            tracing::error!("Command failed: {e}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> parfumerie_client::Result<()> {
    let ctx = Context::open(config)?;

    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::List => commands::catalog::list(&ctx).await?,
            CatalogAction::Show { id } => commands::catalog::show(&ctx, id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx),
            CartAction::Add { id, quantity } => commands::cart::add(&ctx, id, quantity).await?,
            CartAction::Remove { id } => commands::cart::remove(&ctx, id)?,
            CartAction::Update { id, delta } => commands::cart::update(&ctx, id, delta)?,
            CartAction::Clear => commands::cart::clear(&ctx)?,
        },
        Commands::Order { action } => match action {
            OrderAction::Place {
                name,
                email,
                address,
                phone,
            } => {
                let customer = commands::order::customer_details(&name, &email, &address, phone)?;
                commands::order::place(&ctx, customer).await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Login { username } => commands::admin::login(&ctx, &username).await?,
            AdminAction::Logout => commands::admin::logout(&ctx)?,
            AdminAction::Whoami => commands::admin::whoami(&ctx),
            AdminAction::Orders => commands::admin::orders(&ctx).await?,
            AdminAction::SetStatus { id, status } => {
                commands::admin::set_status(&ctx, id, status).await?;
            }
            AdminAction::CreateProduct { name, price } => {
                commands::admin::create_product(&ctx, name, price).await?;
            }
            AdminAction::UpdateProduct { id, name, price } => {
                commands::admin::update_product(&ctx, id, name, price).await?;
            }
            AdminAction::DeleteProduct { id } => commands::admin::delete_product(&ctx, id).await?,
        },
        Commands::Prefs { action } => match action {
            PrefsAction::DarkMode { state } => commands::prefs::dark_mode(&ctx, state)?,
        },
    }
    Ok(())
}
