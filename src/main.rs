use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod build;
mod commands;
mod config;
mod logger;
mod theme;

#[cfg(test)]
mod test_support;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The path to the configuration file
    #[arg(short, long, global = true, default_value = "config.yaml")]
    config: PathBuf,

    /// The command to execute
    #[command(subcommand)]
    command: LikhoCommand,
}

#[derive(Subcommand)]
enum LikhoCommand {
    /// Create a new post or page from a template
    #[command(subcommand)]
    Create(CreateCommand),

    /// Build the site into the output directory
    Generate,

    /// Build the site and serve it on a local port
    Serve(ServeArgs),
}

#[derive(Subcommand)]
enum CreateCommand {
    /// Create a draft post in today's folder
    Post(CreatePostArgs),

    /// Create a page
    Page(CreatePageArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct CreatePostArgs {
    /// Post title
    title: String,

    /// Comma-separated tags
    #[arg(short, long)]
    tags: Option<String>,

    /// Featured image URL
    #[arg(short, long)]
    image: Option<String>,

    /// Short description
    #[arg(short, long)]
    description: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
struct CreatePageArgs {
    /// Page title
    title: String,

    /// Featured image URL
    #[arg(short, long)]
    image: Option<String>,

    /// Short description
    #[arg(short, long)]
    description: Option<String>,
}

#[derive(Args)]
struct ServeArgs {
    /// The address to bind to; defaults to `server.host`
    #[arg(short, long)]
    bind: Option<String>,

    /// The port to bind to; defaults to `server.port`
    #[arg(short, long)]
    port: Option<u16>,

    /// Open the site in the default browser
    #[arg(short, long)]
    open: bool,

    /// Serve without watching for changes
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    let site = commands::Site::load(&cli.config)?;
    logger::init(&site.config.logging.level);

    match cli.command {
        LikhoCommand::Create(CreateCommand::Post(args)) => {
            commands::create::post(&site, &args)?;
        }
        LikhoCommand::Create(CreateCommand::Page(args)) => {
            commands::create::page(&site, &args)?;
        }
        LikhoCommand::Generate => {
            commands::generate::run(&site)?;
        }
        LikhoCommand::Serve(args) => {
            commands::serve::run(site, &args).await?;
        }
    }

    Ok(())
}
