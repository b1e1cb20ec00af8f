//! Krisha CLI - drive the cart and wishlist engine from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the persisted cart
//! krisha cart show
//!
//! # Add one unit of a product
//! krisha cart add --product-id p1 --name "Brass Diya" --price 12.50 --stock 3
//!
//! # Set a quantity (0 removes the line)
//! krisha cart set p1 2
//!
//! # Wishlist operations (need KRISHA_SESSION_TOKEN)
//! krisha wishlist list
//! krisha wishlist add p1
//! ```
//!
//! # Commands
//!
//! - `cart` - show, add, set, remove, clear
//! - `wishlist` - list, add, remove

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use krisha_core::{Price, ProductId};
use krisha_storefront::{EngineConfig, EngineError, Storefront};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "krisha")]
#[command(author, version, about = "Krisha cart and wishlist tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and edit the persisted cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Inspect and edit the signed-in user's wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print cart lines and totals
    Show,
    /// Add one unit of a product
    Add {
        /// Catalog product ID
        #[arg(long)]
        product_id: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Unit price (e.g. 12.50)
        #[arg(long)]
        price: Price,

        /// Units available
        #[arg(long)]
        stock: u32,

        /// Image URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Set a line quantity; zero or below removes the line
    Set {
        /// Catalog product ID
        product_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Catalog product ID
        product_id: String,
    },
    /// Remove every line
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Print the wishlist
    List,
    /// Add a product
    Add {
        /// Catalog product ID
        product_id: String,
    },
    /// Remove a product
    Remove {
        /// Catalog product ID
        product_id: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &EngineConfig) -> Option<sentry::ClientInitGuard> {
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
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the tracing subscriber. Defaults to info for our crates if
/// `RUST_LOG` is not set.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "krisha_storefront=info,krisha=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli, &config).await {
        if e.is_transient() {
            tracing::error!("Command failed, try again later: {e}");
        } else {
            tracing::error!("Command failed: {e}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &EngineConfig) -> Result<(), EngineError> {
    let mut storefront = Storefront::from_config(config)?;

    match cli.command {
        Commands::Cart { action } => {
            let cart = storefront.cart_mut();
            match action {
                CartAction::Show => commands::cart::show(cart),
                CartAction::Add {
                    product_id,
                    name,
                    price,
                    stock,
                    image,
                } => commands::cart::add(
                    cart,
                    krisha_core::CartItemInput {
                        product_id: ProductId::new(product_id),
                        name,
                        price,
                        image,
                        stock,
                    },
                ),
                CartAction::Set {
                    product_id,
                    quantity,
                } => commands::cart::set(cart, &ProductId::new(product_id), quantity),
                CartAction::Remove { product_id } => {
                    commands::cart::remove(cart, &ProductId::new(product_id));
                }
                CartAction::Clear => commands::cart::clear(cart),
            }
        }
        Commands::Wishlist { action } => {
            commands::wishlist::sign_in(&storefront).await?;
            match action {
                WishlistAction::List => commands::wishlist::list(storefront.wishlist()),
                WishlistAction::Add { product_id } => {
                    commands::wishlist::add(storefront.wishlist(), &ProductId::new(product_id))
                        .await?;
                }
                WishlistAction::Remove { product_id } => {
                    commands::wishlist::remove(storefront.wishlist(), &ProductId::new(product_id))
                        .await?;
                }
            }
        }
    }

    storefront.shutdown()?;
    Ok(())
}
