mod assembly;
mod catalog;
mod dedup;
mod error;
mod itunes;
mod matching;
mod normalize;
mod reconcile;
mod report;
mod spotify;
#[cfg(test)]
mod testing;

use std::path::{Path, PathBuf};

use anyhow::{Result, ensure};
use clap::{Args, CommandFactory, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::assembly::Limits;
use crate::dedup::QueryDeduplicator;
use crate::matching::CatalogMatcher;
use crate::reconcile::ReconcileMode;
use crate::report::{AlbumReportFile, ArtistReportFile, ReconciliationReport, read_report, write_report};
use crate::spotify::auth::{self, Scope};

#[derive(Parser)]
#[command(version, author, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Finds the albums of a local library in the Spotify catalog
    ReconcileAlbums {
        /// iTunes / Music "Library.xml" export
        library: PathBuf,

        /// Where to write the report
        #[arg(short, long, default_value = "found_albums.json")]
        report: PathBuf,

        #[command(flatten)]
        spotify: SpotifyArgs,
    },

    /// Finds the album artists of a local library in the Spotify catalog
    ReconcileArtists {
        /// iTunes / Music "Library.xml" export
        library: PathBuf,

        /// Where to write the report
        #[arg(short, long, default_value = "found_artists.json")]
        report: PathBuf,

        #[command(flatten)]
        spotify: SpotifyArgs,
    },

    /// Adds every track of the found albums to new playlists
    BuildPlaylist {
        /// Album report written by `reconcile-albums`
        #[arg(short, long, default_value = "found_albums.json")]
        report: PathBuf,

        /// Name of the first playlist; overflow playlists get a numeric suffix
        #[arg(short = 'n', long, default_value = "Library Albums")]
        playlist_name: String,

        /// Tracks per add request
        #[arg(long, default_value_t = assembly::MAX_ADD_CHUNK_SIZE)]
        add_chunk_size: usize,

        /// Maximum tracks per playlist
        #[arg(long, default_value_t = assembly::DEFAULT_PLAYLIST_SIZE)]
        playlist_size_limit: usize,

        #[command(flatten)]
        spotify: SpotifyArgs,
    },

    /// Saves the found albums to the Spotify library
    SaveLibrary {
        /// Album report written by `reconcile-albums`
        #[arg(short, long, default_value = "found_albums.json")]
        report: PathBuf,

        /// Albums per save request
        #[arg(long, default_value_t = assembly::MAX_SAVE_CHUNK_SIZE)]
        save_chunk_size: usize,

        #[command(flatten)]
        spotify: SpotifyArgs,
    },

    /// Generate shell completions
    Completions {
        /// The shell to generate the completions for
        #[arg(value_enum)]
        shell: clap_complete_command::Shell,
    },
}

#[derive(Args)]
struct SpotifyArgs {
    /// JSON file with client_id, client_secret, redirect_uri and optionally refresh_token
    #[arg(short, long, env = "SPOTIFY_SECRETS", default_value = "spotify_secrets.json")]
    secrets: PathBuf,

    /// User access token for the playlist and library modes
    #[arg(long, env = "SPOTIFY_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Retries for rate-limited, failed or timed out requests
    #[arg(long, default_value_t = 3)]
    max_retries: u32,
}

impl SpotifyArgs {
    fn client(&self, scopes: &[Scope]) -> Result<spotify::Client> {
        let secrets = auth::Secrets::load(&self.secrets)?;
        if !scopes.is_empty() {
            info!(scopes = %auth::scope_list(scopes), "using user authorization");
        }
        let authenticator = auth::Authenticator::new(&secrets, scopes, self.access_token.clone())?;
        Ok(spotify::Client::new(authenticator, self.max_retries)?)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_reconciler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Reports are only written once a run completes, so dropping the run here
    // leaves any previous report untouched.
    tokio::select! {
        result = run(cli.command) => result,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            warn!("interrupted, nothing written");
            std::process::exit(130);
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::ReconcileAlbums {
            library,
            report,
            spotify,
        } => {
            let found = reconcile_library(&library, ReconcileMode::Albums, &spotify).await?;
            write_report(&report, &AlbumReportFile::from(found))?;
            info!(report = %report.display(), "report written");
        }
        Commands::ReconcileArtists {
            library,
            report,
            spotify,
        } => {
            let found = reconcile_library(&library, ReconcileMode::Artists, &spotify).await?;
            write_report(&report, &ArtistReportFile::from(found))?;
            info!(report = %report.display(), "report written");
        }
        Commands::BuildPlaylist {
            report,
            playlist_name,
            add_chunk_size,
            playlist_size_limit,
            spotify,
        } => {
            let limits = Limits {
                add_chunk_size,
                playlist_size: playlist_size_limit,
                ..Limits::default()
            };
            validate_limits(&limits)?;
            ensure!(!playlist_name.trim().is_empty(), "playlist name is empty");

            let albums: AlbumReportFile = read_report(&report)?;
            info!(albums = albums.found_album_uris.len(), "building playlists");
            let client = spotify.client(auth::PLAYLIST_SCOPES)?;
            let containers =
                assembly::build_playlists(&client, &albums.found_album_uris, &playlist_name, limits)
                    .await?;
            for container in &containers {
                info!(
                    playlist = %container.name,
                    id = %container.id,
                    tracks = container.accumulated,
                    "playlist complete"
                );
            }
        }
        Commands::SaveLibrary {
            report,
            save_chunk_size,
            spotify,
        } => {
            let limits = Limits {
                save_chunk_size,
                ..Limits::default()
            };
            validate_limits(&limits)?;

            let albums: AlbumReportFile = read_report(&report)?;
            if albums.found_album_uris.is_empty() {
                info!("no albums to save");
                return Ok(());
            }
            let client = spotify.client(auth::LIBRARY_SCOPES)?;
            let saved =
                assembly::save_albums(&client, &albums.found_album_uris, limits.save_chunk_size)
                    .await?;
            info!(saved, "library save complete");
        }
        Commands::Completions { shell } => {
            shell.generate(&mut Cli::command(), &mut std::io::stdout());
        }
    }
    Ok(())
}

async fn reconcile_library(
    library: &Path,
    mode: ReconcileMode,
    spotify: &SpotifyArgs,
) -> Result<ReconciliationReport> {
    let tracks = itunes::load_library(library)?;
    info!(tracks = tracks.len(), library = %library.display(), "loaded library");

    let client = spotify.client(auth::SEARCH_SCOPES)?;
    let matcher = CatalogMatcher::new(&client);
    let mut dedup = QueryDeduplicator::new();
    let found = reconcile::run(&tracks, mode, &matcher, &mut dedup).await?;

    info!(
        queries = dedup.len(),
        found = found.found.len(),
        missing = found.missing.len(),
        "reconciliation finished"
    );
    Ok(found)
}

fn validate_limits(limits: &Limits) -> Result<()> {
    ensure!(
        (1..=assembly::MAX_ADD_CHUNK_SIZE).contains(&limits.add_chunk_size),
        "add chunk size must be between 1 and {}",
        assembly::MAX_ADD_CHUNK_SIZE,
    );
    ensure!(
        (1..=assembly::MAX_SAVE_CHUNK_SIZE).contains(&limits.save_chunk_size),
        "save chunk size must be between 1 and {}",
        assembly::MAX_SAVE_CHUNK_SIZE,
    );
    ensure!(limits.playlist_size > 0, "playlist size limit must be positive");
    Ok(())
}
