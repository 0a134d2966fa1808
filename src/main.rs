use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use get_opentofu::{
    asset,
    config::{self, UpstreamConfig},
    generator::{self, Generator},
    http::RetryPolicy,
    provider::RepoId,
    server::{self, AppState},
};
use log::info;

/// get-opentofu - OpenTofu installer and releases service
///
/// Serves the installer script and an HTML index of OpenTofu releases,
/// proxied from the GitHub releases API.
///
/// If the GITHUB_TOKEN environment variable is set, it is sent to the API.
/// This raises the API rate limit.
///
/// Examples:
///   get-opentofu serve --assets ./public
///   get-opentofu generate --out ./site
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Release API URL
    #[arg(
        long = "api-url",
        env = "GET_OPENTOFU_API_URL",
        value_name = "URL",
        default_value = config::DEFAULT_API_URL,
        global = true
    )]
    api_url: String,

    /// Repository whose releases are listed
    #[arg(
        long,
        env = "GET_OPENTOFU_REPO",
        value_name = "OWNER/REPO",
        default_value = config::DEFAULT_REPO,
        global = true
    )]
    repo: RepoId,

    /// User agent sent to the release API
    #[arg(
        long = "user-agent",
        env = "GET_OPENTOFU_USER_AGENT",
        default_value = config::DEFAULT_USER_AGENT,
        global = true
    )]
    user_agent: String,

    /// API token
    #[arg(long = "github-token", env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    github_token: Option<String>,

    /// Upstream request timeout in seconds (0 disables the timeout)
    #[arg(
        long = "upstream-timeout",
        env = "GET_OPENTOFU_TIMEOUT",
        value_name = "SECS",
        default_value_t = config::DEFAULT_TIMEOUT_SECS,
        global = true
    )]
    upstream_timeout: u64,

    /// Retries for transient upstream failures
    #[arg(long, env = "GET_OPENTOFU_RETRIES", default_value_t = 0, global = true)]
    retries: usize,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP service
    Serve(ServeArgs),

    /// Write the static releases site to a directory
    Generate(GenerateArgs),
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "GET_OPENTOFU_LISTEN", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,

    /// Installer assets: a directory, or an http(s) origin URL
    #[arg(long, env = "GET_OPENTOFU_ASSETS", value_name = "DIR|URL", default_value = "public")]
    assets: String,
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    /// Target directory
    #[arg(long, short = 'o', value_name = "DIR")]
    out: PathBuf,

    /// Base URL of release downloads
    #[arg(long = "download-url", value_name = "URL", default_value = generator::DEFAULT_DOWNLOAD_URL)]
    download_url: String,
}

impl Cli {
    fn upstream(&self) -> UpstreamConfig {
        UpstreamConfig {
            api_url: self.api_url.clone(),
            repo: self.repo.clone(),
            user_agent: self.user_agent.clone(),
            token: self.github_token.clone(),
            timeout: config::timeout_from_secs(self.upstream_timeout),
            retry: RetryPolicy::new(self.retries),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let upstream = cli.upstream();
    let client = upstream.client()?;

    match cli.command {
        Commands::Serve(args) => {
            let releases = upstream.provider(client.clone())?;
            let assets = asset::from_location(&args.assets, client)?;
            info!("Serving {} releases, assets from {}", upstream.repo, args.assets);

            let state = AppState::new(Arc::new(releases), Arc::from(assets));
            server::serve(args.listen, state).await?
        }
        Commands::Generate(args) => {
            let source = upstream.provider(client)?;
            let generator = Generator::new(source, upstream.repo.clone(), &args.download_url);
            let files = generator.generate().await?;
            generator::write_site(&args.out, &files).await?
        }
    }
    Ok(())
}
