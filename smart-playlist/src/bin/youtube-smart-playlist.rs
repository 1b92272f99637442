use clap::Parser;
use eyre::Context;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use youtube_smart_playlist::{SyncOptions, authenticate, sync};

/// Keep a private YouTube playlist topped up with a channel's latest matching uploads.
///
/// The managed playlist is created if it doesn't exist yet. Videos already in it are
/// left alone.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Name of the managed playlist, matched case-insensitively.
    #[arg(long = "managed_playlist_name", alias = "managed-playlist-name")]
    managed_playlist_name: String,

    /// Handle of the channel to pull videos from, e.g. @GeminiTay.
    #[arg(long = "channel_handle", alias = "channel-handle")]
    channel_handle: String,

    /// Only consider videos matching this search query.
    #[arg(long)]
    query: Option<String>,

    /// OAuth client secrets downloaded from the Google Cloud console.
    #[arg(
        long = "client_secrets",
        alias = "client-secrets",
        env = "YT_SMART_PLAYLIST_CLIENT_SECRETS",
        default_value = "client_secrets.json"
    )]
    client_secrets: PathBuf,

    /// How many of the channel's most recent videos to look at.
    #[arg(
        long = "max_results",
        alias = "max-results",
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(1..=50)
    )]
    max_results: u32,

    /// Print what would be added without modifying the playlist.
    #[arg(long = "dry_run", alias = "dry-run")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let http = reqwest::Client::builder()
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
        .context("build HTTP client")?;
    let yt = authenticate(&args.client_secrets, http).await?;

    let options = SyncOptions {
        managed_playlist_name: args.managed_playlist_name,
        channel_handle: args.channel_handle,
        query: args.query,
        max_results: args.max_results,
        dry_run: args.dry_run,
    };
    let report = sync(&yt, &options).await?;

    for video in &report.added {
        println!("{}\t{}", video.id, video.title);
    }
    tracing::info!(
        playlist = %report.playlist.name,
        created = report.created_playlist,
        existing = report.existing,
        candidates = report.candidates,
        added = report.added.len(),
        dry_run = options.dry_run,
        "sync complete"
    );

    Ok(())
}
