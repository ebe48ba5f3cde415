//! # Seed FAQs Utility
//!
//! Loads the starter knowledge base into the database and mints bearer
//! tokens for support staff.
//!
//! ## Usage
//!
//! ```bash
//! # Insert the starter FAQs (existing questions are left alone)
//! cargo run --package seed-faqs --bin seed_faqs
//!
//! # Create (or reuse) an agent account and print a token for it
//! cargo run --package seed-faqs --bin seed_faqs -- agent dana
//! cargo run --package seed-faqs --bin seed_faqs -- agent omar admin
//! ```

mod catalog;

use clap::{Parser, Subcommand};
use lib_auth::{encode_jwt, Identity, Role};
use lib_core::model::store::{FaqRepository, UserRepository};
use lib_core::{create_pool, run_migrations, Config, DbPool};

#[derive(Parser, Debug)]
#[command(name = "seed_faqs")]
#[command(about = "Seed the support knowledge base and mint staff tokens")]
struct Cli {
    /// Defaults to `faqs`
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Insert the starter FAQs; existing questions are left alone
    Faqs,
    /// Create (or reuse) a staff account and print a bearer token for it
    Agent {
        /// Account username
        username: String,
        /// Staff role: `agent` or `admin`
        #[arg(default_value = "agent", value_parser = parse_staff_role)]
        role: Role,
    },
}

fn parse_staff_role(value: &str) -> Result<Role, String> {
    let role: Role = value.parse()?;
    if !role.can_attend() {
        return Err(format!("role {} cannot attend chats", role));
    }
    Ok(role)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load().map_err(|e| anyhow::anyhow!(e))?;

    println!("============================================");
    println!("  Seed FAQs Utility");
    println!("============================================");
    println!();

    println!("Connecting to database...");
    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;
    println!("Connected successfully.");
    println!();

    match cli.command.unwrap_or(Command::Faqs) {
        Command::Faqs => {
            let (created, existing) = seed_faqs(&pool).await?;
            println!("Created {} FAQ(s), {} already present.", created, existing);
            println!("Total FAQs in database: {}", FaqRepository::count(&pool).await?);
        }
        Command::Agent { username, role } => {
            let identity = ensure_staff(&pool, &username, role).await?;
            let token = encode_jwt(&identity, &config.jwt_secret, config.jwt_expiration_hours)?;
            println!("Staff account: {} (id: {}, role: {})", identity.username, identity.user_id, identity.role);
            println!();
            println!("{}", token);
        }
    }

    Ok(())
}

/// Insert every catalog entry whose question is not stored yet.
///
/// Returns `(created, already_present)`.
async fn seed_faqs(pool: &DbPool) -> anyhow::Result<(usize, usize)> {
    let mut created = 0;
    let mut existing = 0;

    for entry in catalog::entries() {
        if FaqRepository::find_by_question(pool, &entry.question).await?.is_some() {
            println!("Already exists: {}", entry.question);
            existing += 1;
            continue;
        }
        let faq = FaqRepository::create(pool, entry).await?;
        println!("Created: {}", faq.question);
        created += 1;
    }

    Ok((created, existing))
}

/// Staff account for `username`, created with `role` if missing.
///
/// An existing account keeps its stored role.
async fn ensure_staff(pool: &DbPool, username: &str, role: Role) -> anyhow::Result<Identity> {
    let user = UserRepository::find_or_create(pool, username, role).await?;
    if !user.role.can_attend() {
        anyhow::bail!("existing account {} has role {} and cannot attend chats", user.username, user.role);
    }
    Ok(Identity::from(&user))
}
