//! Cartwheel CLI - storefront client for the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password from --password, or read from stdin)
//! cw login -e shopper@example.com
//!
//! # Browse and fill the cart
//! cw products list --category Kitchen
//! cw cart add 12
//! cw cart set 12 3
//!
//! # Pay, then record the order once the provider confirms
//! cw checkout start
//! cw checkout complete
//! ```
//!
//! # Commands
//!
//! - `login`, `logout`, `register`, `whoami` - Account session
//! - `profile update`, `account delete` - Account changes
//! - `cart` - Device cart (works signed out)
//! - `products`, `reviews`, `wishlist`, `orders` - Storefront browsing
//! - `checkout start|complete` - Payment handoff and order creation
//! - `admin` - Admin console (admin accounts only)
//!
//! State is kept in two directory mirrors: `CARTWHEEL_STATE_DIR` (device) and
//! `CARTWHEEL_BROWSER_STATE_DIR` (browser, defaults to the device directory
//! with a `-browser` suffix).

#![cfg_attr(not(test), forbid(unsafe_code))]

use cartwheel_client::ClientConfig;
use cartwheel_core::{OrderId, OrderStatus, Price, ProductId, ReviewId, UserId};
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod commands;
mod render;

use app::App;
use commands::CliError;

#[derive(Parser)]
#[command(name = "cw")]
#[command(author, version, about = "Cartwheel storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Password (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Create a customer account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Password (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Show the signed-in account
    Whoami,
    /// Manage the signed-in profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Manage the signed-in account
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// View your orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Manage your wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Read and write product reviews
    Reviews {
        #[command(subcommand)]
        action: ReviewsAction,
    },
    /// Pay for the cart
    Checkout {
        #[command(subcommand)]
        action: CheckoutAction,
    },
    /// Admin console
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Change name, email, or password
    Update {
        /// New display name
        #[arg(short, long)]
        name: String,

        /// New email address
        #[arg(short, long)]
        email: String,

        /// New password (unchanged when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Permanently delete the signed-in account
    Delete {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and total
    Show,
    /// Add one unit of a product
    Add { product_id: ProductId },
    /// Remove a product's line
    Remove { product_id: ProductId },
    /// Set a line's quantity
    Set {
        product_id: ProductId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,

        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Sort field (e.g. `price`, `name`)
        #[arg(long)]
        sort_by: Option<String>,

        /// Sort direction (`asc` or `desc`)
        #[arg(long)]
        sort_dir: Option<String>,
    },
    /// Show one product
    Show { id: ProductId },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List your orders
    List,
    /// Show one order
    Show { id: OrderId },
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show your wishlist
    Show,
    /// Add a product
    Add { product_id: ProductId },
    /// Remove a product
    Remove { product_id: ProductId },
}

#[derive(Subcommand)]
enum ReviewsAction {
    /// List reviews for a product
    List { product_id: ProductId },
    /// Review a product
    Add {
        product_id: ProductId,

        /// Stars, 1 to 5
        #[arg(short, long)]
        rating: u8,

        /// Review text
        #[arg(short, long, default_value = "")]
        comment: String,
    },
}

#[derive(Subcommand)]
enum CheckoutAction {
    /// Create a payment session and print its URL
    Start,
    /// Record the order after payment succeeded
    Complete,
}

#[derive(Subcommand)]
enum AdminAction {
    /// List admin accounts
    Admins,
    /// Create an admin account
    AddAdmin {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        /// Password (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Delete an admin account
    RemoveAdmin { id: UserId },
    /// List every order
    Orders,
    /// Change an order's status
    SetStatus { id: OrderId, status: OrderStatus },
    /// Add a product to the catalog
    AddProduct {
        #[arg(short, long)]
        name: String,

        #[arg(long)]
        price: Price,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(long)]
        image_url: Option<String>,

        #[arg(long)]
        stock: Option<i64>,
    },
    /// Remove a product from the catalog
    RemoveProduct { id: ProductId },
    /// Remove a review
    RemoveReview { id: ReviewId },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN")
        .ok()
        .filter(|v| !v.trim().is_empty())?;

    let guard = sentry::init((
        dsn,
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
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration first so .env is applied before Sentry reads SENTRY_DSN
    let config = ClientConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cartwheel_client=info,cartwheel_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(CliError::from(e)),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), CliError> {
    let app = App::load(config).await?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::account::login(&app, &email, password).await?;
        }
        Commands::Logout => commands::account::logout(&app).await,
        Commands::Register {
            name,
            email,
            password,
        } => commands::account::register(&app, name, email, password).await?,
        Commands::Whoami => commands::account::whoami(&app),
        Commands::Profile {
            action:
                ProfileAction::Update {
                    name,
                    email,
                    password,
                },
        } => commands::account::update_profile(&app, name, email, password).await?,
        Commands::Account {
            action: AccountAction::Delete { yes },
        } => commands::account::delete_account(&app, yes).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&app),
            CartAction::Add { product_id } => commands::cart::add(&app, product_id).await?,
            CartAction::Remove { product_id } => commands::cart::remove(&app, product_id).await,
            CartAction::Set {
                product_id,
                quantity,
            } => commands::cart::set(&app, product_id, quantity).await?,
            CartAction::Clear => commands::cart::clear(&app).await,
        },
        Commands::Products { action } => match action {
            ProductsAction::List {
                category,
                search,
                sort_by,
                sort_dir,
            } => {
                let filter = cartwheel_client::models::ProductFilter {
                    category,
                    search,
                    sort_by,
                    sort_dir,
                    page_size: None,
                };
                commands::catalog::list_products(&app, &filter).await?;
            }
            ProductsAction::Show { id } => commands::catalog::show_product(&app, id).await?,
        },
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list(&app).await?,
            OrdersAction::Show { id } => commands::orders::show(&app, id).await?,
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => commands::catalog::wishlist(&app).await?,
            WishlistAction::Add { product_id } => {
                commands::catalog::add_to_wishlist(&app, product_id).await?;
            }
            WishlistAction::Remove { product_id } => {
                commands::catalog::remove_from_wishlist(&app, product_id).await?;
            }
        },
        Commands::Reviews { action } => match action {
            ReviewsAction::List { product_id } => {
                commands::catalog::reviews(&app, product_id).await?;
            }
            ReviewsAction::Add {
                product_id,
                rating,
                comment,
            } => commands::catalog::add_review(&app, product_id, rating, &comment).await?,
        },
        Commands::Checkout { action } => match action {
            CheckoutAction::Start => commands::checkout::start(&app).await?,
            CheckoutAction::Complete => commands::checkout::complete(&app).await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Admins => commands::admin::list_admins(&app).await?,
            AdminAction::AddAdmin {
                name,
                email,
                password,
            } => commands::admin::add_admin(&app, name, email, password).await?,
            AdminAction::RemoveAdmin { id } => commands::admin::remove_admin(&app, id).await?,
            AdminAction::Orders => commands::admin::all_orders(&app).await?,
            AdminAction::SetStatus { id, status } => {
                commands::admin::set_status(&app, id, status).await?;
            }
            AdminAction::AddProduct {
                name,
                price,
                description,
                category,
                image_url,
                stock,
            } => {
                let input = cartwheel_client::models::ProductInput {
                    name,
                    price,
                    description,
                    category,
                    image_url,
                    stock,
                };
                commands::admin::add_product(&app, &input).await?;
            }
            AdminAction::RemoveProduct { id } => commands::admin::remove_product(&app, id).await?,
            AdminAction::RemoveReview { id } => commands::admin::remove_review(&app, id).await?,
        },
    }
    Ok(())
}
