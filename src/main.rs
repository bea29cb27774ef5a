//! CLI entry point for adefs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adefs::commands::theme::ThemeAction;
use adefs::content::Category;

#[derive(Parser)]
#[command(name = "adefs")]
#[command(version)]
#[command(about = "Static website generator for the ADEFS church site", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post or page
    New {
        /// Kind of entry (post, page)
        #[arg(short, long, default_value = "post")]
        layout: Category,

        /// Title of the new entry
        title: String,

        /// Identifier (file name without extension) for the new entry
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Disable file watching and live reload
        #[arg(long)]
        r#static: bool,
    },

    /// Clean the public folder
    Clean,

    /// List site content
    List {
        /// Type of content to list (posts, pages)
        #[arg(default_value = "posts")]
        r#type: String,
    },

    /// Show or change the stored light/dark mode
    Theme {
        /// show, toggle, light or dark
        #[arg(default_value = "show")]
        action: ThemeAction,

        /// Treat the system as preferring dark mode when nothing is stored
        #[arg(long)]
        system_dark: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "adefs=debug,info"
    } else {
        "adefs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            adefs::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New {
            layout,
            title,
            path,
        } => {
            let site = adefs::Site::new(&base_dir)?;
            let file =
                adefs::commands::new::create_entry(&site, &title, layout, path.as_deref())?;
            println!("Created: {:?}", file);
        }

        Commands::Generate { watch } => {
            let site = adefs::Site::new(&base_dir)?;
            tracing::info!("Generating static files...");

            site.generate()?;
            println!("Generated successfully!");

            if watch {
                adefs::commands::generate::watch(&site).await?;
            }
        }

        Commands::Server { port, ip, r#static } => {
            let site = adefs::Site::new(&base_dir)?;
            adefs::server::start(&site, &ip, port, !r#static).await?;
        }

        Commands::Clean => {
            let site = adefs::Site::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let site = adefs::Site::new(&base_dir)?;
            adefs::commands::list::run(&site, &r#type)?;
        }

        Commands::Theme {
            action,
            system_dark,
        } => {
            let site = adefs::Site::new(&base_dir)?;
            let mode = adefs::commands::theme::run(&site, action, system_dark)?;
            println!("{}", mode);
        }

        Commands::Version => {
            println!("adefs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
