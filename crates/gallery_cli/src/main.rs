//! PicStream - command-line driver for the gallery core
//!
//! Wires configuration, logging, the HTTP client and the state stores
//! together, mirroring what a GUI shell would do. Useful for poking a
//! running backend and for scripted scans.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use gallery_api::ApiClient;
use gallery_core::{
    GalleryConfig, GalleryStore, ScanMonitor, SearchDebouncer, SelectionTree,
};
use gallery_proto::{SortBy, SortOrder};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "picstream")]
#[command(about = "Local photo gallery frontend driver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend base URL (overrides the config file)
    #[arg(long, global = true)]
    server: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List a page of photos under the current filter
    Photos {
        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Sort key: created_at, modified_at, taken_at, file_name, random
        #[arg(short = 's', long, default_value = "created_at")]
        sort_by: String,

        /// Sort order: asc or desc (defaults to the sort key's natural
        /// order)
        #[arg(short = 'o', long)]
        sort_order: Option<String>,

        /// Restrict to a folder path
        #[arg(short, long)]
        folder: Option<String>,

        /// Show only favorites
        #[arg(long)]
        favorites: bool,
    },

    /// Start a full-library scan and wait for completion
    Scan,

    /// Rescan the non-excluded leaf folders of the configured root
    Rescan,

    /// Show the folder selection tree with tri-state markers
    Exclusions,

    /// Search folders and files by name
    Search { query: String },

    /// Show scan status and photo count
    Status,
}

fn parse_sort_by(s: &str) -> Result<SortBy> {
    Ok(match s {
        "created_at" => SortBy::CreatedAt,
        "modified_at" => SortBy::ModifiedAt,
        "taken_at" => SortBy::TakenAt,
        "file_name" => SortBy::FileName,
        "random" => SortBy::Random,
        other => bail!("unknown sort key: {}", other),
    })
}

fn parse_sort_order(s: &str) -> Result<SortOrder> {
    Ok(match s {
        "asc" => SortOrder::Asc,
        "desc" => SortOrder::Desc,
        other => bail!("unknown sort order: {}", other),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = gallery_log::init()?;
    if let Err(e) = gallery_log::cleanup_old_logs(7) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    let mut config = GalleryConfig::load().unwrap_or_default();
    if let Some(server) = cli.server {
        config.server.base_url = server;
    }

    let client = Arc::new(ApiClient::new(
        &config.server.base_url,
        config.server_timeout(),
    )?);
    tracing::info!(server = %config.server.base_url, "picstream starting");

    match cli.command {
        Commands::Photos {
            page,
            sort_by,
            sort_order,
            folder,
            favorites,
        } => {
            let store = GalleryStore::new(client.clone(), config.gallery.per_page);
            let sort_order = sort_order.as_deref().map(parse_sort_order).transpose()?;
            apply_listing_filters(&store, parse_sort_by(&sort_by)?, sort_order, folder, favorites);

            store.fetch_page(page, false).await?;
            let snap = store.snapshot();
            println!(
                "{} photos, page {}/{}",
                snap.total, snap.page, snap.total_pages
            );
            for photo in &snap.photos {
                let marker = if photo.is_favorite { "*" } else { " " };
                println!("{} {:>10}  {}", marker, photo.file_size, photo.file_path);
            }
        }

        Commands::Scan => {
            let monitor = Arc::new(ScanMonitor::new(
                client.clone(),
                config.scan_poll_interval(),
                config.scan_poll_timeout(),
            ));
            let outcome = run_with_progress(&monitor, None).await?;
            report_outcome(outcome);
        }

        Commands::Rescan => {
            let settings = client.settings().await?;
            let selection =
                SelectionTree::load(client.as_ref(), &settings.root_folder, &settings.extensions)
                    .await?;
            let leaves = selection.selected_leaves();

            let monitor = Arc::new(ScanMonitor::new(
                client.clone(),
                config.scan_poll_interval(),
                config.scan_poll_timeout(),
            ));
            let outcome = run_with_progress(&monitor, Some(leaves)).await?;
            report_outcome(outcome);
        }

        Commands::Exclusions => {
            let settings = client.settings().await?;
            let selection =
                SelectionTree::load(client.as_ref(), &settings.root_folder, &settings.extensions)
                    .await?;
            for node in selection.folders() {
                print_tree(&selection, node, 0);
            }
            println!("{} leaf folders selected", selection.selected_leaves().len());
        }

        Commands::Search { query } => {
            let debouncer = SearchDebouncer::new(client.clone(), config.search_debounce());
            if let Some(results) = debouncer.query(&query).await {
                for result in results {
                    println!("{:?}\t{}", result.kind, result.path);
                }
            }
        }

        Commands::Status => {
            let status = client.scan_status().await?;
            let count = client.photo_count().await?;
            println!("photos indexed: {}", count);
            if status.is_scanning {
                println!("scanning: {}/{} files", status.processed, status.total);
                if let Some(file) = status.current_file {
                    println!("current: {}", file);
                }
            } else {
                println!("scanner idle");
            }
            if let Some(error) = status.error {
                println!("last scan error: {}", error);
            }
        }
    }

    Ok(())
}

/// Apply listing filters in an order that preserves the store's own
/// policies: an explicit sort order is applied after the sort key, an
/// absent one leaves the key's natural order (file_name implies asc)
/// alone.
fn apply_listing_filters(
    store: &GalleryStore,
    sort_by: SortBy,
    sort_order: Option<SortOrder>,
    folder: Option<String>,
    favorites: bool,
) {
    store.set_sort_by(sort_by);
    if let Some(order) = sort_order {
        store.set_sort_order(order);
    }
    if folder.is_some() {
        store.set_folder_scope(folder);
    }
    if favorites {
        store.set_favorite_only(true);
    }
}

/// Drive a scan while printing progress lines from the status channel
async fn run_with_progress(
    monitor: &Arc<ScanMonitor>,
    leaves: Option<Vec<String>>,
) -> Result<gallery_core::ScanOutcome> {
    let mut status_rx = monitor.subscribe_status();
    let printer = tokio::spawn(async move {
        while status_rx.changed().await.is_ok() {
            let status = status_rx.borrow_and_update().clone();
            if status.is_scanning {
                println!("scanning {}/{}", status.processed, status.total);
            }
        }
    });

    let outcome = match leaves {
        Some(leaves) => monitor.run_partial_rescan(leaves).await?,
        None => monitor.run_full_scan().await?,
    };
    printer.abort();
    Ok(outcome)
}

fn report_outcome(outcome: gallery_core::ScanOutcome) {
    match outcome {
        gallery_core::ScanOutcome::Completed { processed } => {
            println!("scan complete: {} files processed", processed);
        }
        gallery_core::ScanOutcome::TimedOut => {
            println!("gave up waiting; the scan is still running on the backend");
        }
    }
}

fn print_tree(selection: &SelectionTree, node: &gallery_proto::FolderNode, depth: usize) {
    let marker = match selection.state_of(node) {
        gallery_core::CheckState::Checked => "[x]",
        gallery_core::CheckState::Unchecked => "[ ]",
        gallery_core::CheckState::Indeterminate => "[-]",
    };
    println!("{}{} {}", "  ".repeat(depth), marker, node.name);
    for child in &node.children {
        print_tree(selection, child, depth + 1);
    }
}
