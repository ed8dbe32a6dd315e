use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wall::Config;
use wall::error::AppResult;
use wall::model::{Database, DatabaseError, entity::PostCreate};

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the wall DB", long_about = None)]
pub struct Cli {
    /// Path to the config file; defaults to the server's lookup
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the schema
    Schema {
        #[command(subcommand)]
        action: SchemaCommands,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage posts
    Post {
        #[command(subcommand)]
        action: PostCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum SchemaCommands {
    /// Create the types, tables and indexes if missing
    Init,
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

/// Post management
#[derive(Subcommand, Debug)]
pub enum PostCommands {
    Add {
        /// Username of the author
        #[arg(long)]
        author: String,
        #[arg(long)]
        text: String,
        #[arg(long)]
        image_uri: Option<String>,
    },
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Cli::parse();
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(cfg!(debug_assertions))?,
    };

    let db = Database::from_config(config.database());
    if !db.connect().await {
        return Err(DatabaseError::NotConnected.into());
    }

    let result = run_command(&db, args.command).await;
    db.close().await;
    result
}

async fn run_command(db: &Database, command: Commands) -> AppResult<()> {
    match command {
        Commands::Schema { action } => match action {
            SchemaCommands::Init => {
                db.startup_database().await?;
                println!("Schema is ready");
            }
        },

        Commands::User { action } => match action {
            UserCommands::Add { username, password } => {
                let hash = match wall::auth::hash_password(&password) {
                    Ok(hash) => hash,
                    Err(e) => {
                        eprintln!("Unable to hash password: {}", e);
                        std::process::exit(1);
                    }
                };
                let user = db.create_user(&username, &hash).await?;
                println!("User created: {:?}", user);
            }
        },

        Commands::Post { action } => match action {
            PostCommands::Add {
                author,
                text,
                image_uri,
            } => {
                let Some(user) = db.get_user_by_username(&author).await? else {
                    eprintln!("No user named {}", author);
                    std::process::exit(1);
                };

                let post = db
                    .create_post(PostCreate {
                        author_id: user.id(),
                        text: Some(text),
                        image_uri,
                    })
                    .await?;
                println!("Post created: {:?}", post);
            }
        },
    }

    Ok(())
}
