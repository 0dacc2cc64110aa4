//! Shopfront CLI - browse the catalog and manage baskets, favorites and the
//! login session from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! shopfront catalog list --search jacket
//!
//! # Work on a basket
//! shopfront basket add 3
//! shopfront basket set 3 2
//! shopfront --user alice basket show
//!
//! # Log in, then check out
//! shopfront auth login -u mor_2314 -p 83r5^_
//! shopfront checkout --full-name "Ada Lovelace" --email ada@example.com ...
//! ```
//!
//! # Commands
//!
//! - `catalog` - List and search products
//! - `basket` - Show or edit a basket
//! - `favorites` - Show or edit favorites
//! - `auth` - Log in, register, log out
//! - `checkout` - Place an order
//!
//! State lives under `SHOPFRONT_DATA_DIR` (default `.shopfront`). Without
//! `--user`, commands act as the logged-in user, or the guest when logged out.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use shopfront::checkout::CheckoutForm;
use shopfront::config::StorefrontConfig;
use shopfront::state::Storefront;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront storefront CLI")]
struct Cli {
    /// Act as this user instead of the logged-in one
    #[arg(long, global = true)]
    user: Option<String>,

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
    /// Show or edit a basket
    Basket {
        #[command(subcommand)]
        action: BasketAction,
    },
    /// Show or edit favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Manage the login session
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Place an order for the current basket
    Checkout(CheckoutArgs),
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products
    List {
        /// Only products whose title or category contains this text
        #[arg(short, long, default_value = "")]
        search: String,
    },
}

#[derive(Subcommand)]
enum BasketAction {
    /// Show basket contents and total
    Show,
    /// Add one unit of a product
    Add { product_id: String },
    /// Remove a product line
    Remove { product_id: String },
    /// Set a line's quantity; zero or less removes it
    Set {
        product_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the basket
    Clear,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorites
    List,
    /// Add or remove a product
    Toggle { product_id: String },
    /// Remove every favorite
    Clear,
}

#[derive(Subcommand)]
enum AuthAction {
    /// Log in with username and password
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
        /// Repeat the password to catch typos
        #[arg(short, long)]
        confirm_password: Option<String>,
    },
    /// Forget the session
    Logout,
    /// Show who is logged in
    Status,
}

#[derive(Args)]
struct CheckoutArgs {
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    postal_code: String,
    #[arg(long)]
    country: String,
    #[arg(long)]
    card_number: String,
    #[arg(long)]
    card_name: String,
    #[arg(long)]
    card_expiry: String,
    #[arg(long)]
    card_cvc: String,
}

impl From<CheckoutArgs> for CheckoutForm {
    fn from(args: CheckoutArgs) -> Self {
        Self {
            full_name: args.full_name,
            email: args.email,
            phone: args.phone,
            address: args.address,
            city: args.city,
            postal_code: args.postal_code,
            country: args.country,
            card_number: args.card_number,
            card_name: args.card_name,
            card_expiry: args.card_expiry,
            card_cvc: args.card_cvc,
        }
    }
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shopfront=warn,shopfront_cli=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let mut shop = Storefront::open(&config)?;
    let user = cli.user.as_deref();

    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::List { search } => commands::catalog::list(&shop, &search).await?,
        },
        Commands::Basket { action } => match action {
            BasketAction::Show => commands::basket::show(&shop, user),
            BasketAction::Add { product_id } => {
                commands::basket::add(&mut shop, &product_id, user).await?;
            }
            BasketAction::Remove { product_id } => {
                commands::basket::remove(&mut shop, &product_id, user);
            }
            BasketAction::Set {
                product_id,
                quantity,
            } => commands::basket::set(&mut shop, &product_id, quantity, user),
            BasketAction::Clear => commands::basket::clear(&mut shop, user),
        },
        Commands::Favorites { action } => match action {
            FavoritesAction::List => commands::favorites::list(&shop, user),
            FavoritesAction::Toggle { product_id } => {
                commands::favorites::toggle(&mut shop, &product_id, user).await?;
            }
            FavoritesAction::Clear => commands::favorites::clear(&mut shop, user),
        },
        Commands::Auth { action } => match action {
            AuthAction::Login { username, password } => {
                commands::auth::login(&mut shop, &username, password).await?;
            }
            AuthAction::Register {
                email,
                username,
                password,
                confirm_password,
            } => {
                commands::auth::register(&shop, &email, &username, password, confirm_password)
                    .await?;
            }
            AuthAction::Logout => commands::auth::logout(&mut shop),
            AuthAction::Status => commands::auth::status(&shop),
        },
        Commands::Checkout(args) => {
            commands::checkout::place_order(&mut shop, &args.into(), user).await?;
        }
    }
    Ok(())
}
