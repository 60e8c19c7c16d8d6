mod cache;
mod catalog;
mod config;
mod error;
mod logging;
mod resolver;
mod sync;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;

use cache::SqliteCache;
use catalog::{CatalogClient, ResolvedEntity};
use resolver::EntityResolver;

#[derive(Parser, Debug)]
#[command(name = "catsync")]
#[command(about = "Synchronize a remote catalog and its associated records into a local cache")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/catsync/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Store every catalog entity in the cache
  Sync,
  /// Show an entity's attributes and associated record count
  Show {
    /// Exact entity name
    name: String,
  },
  /// List associated records two entities have in common
  Overlap {
    name: String,
    other: String,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;
  dotenvy::dotenv().ok();

  let args = Args::parse();

  let config = config::Config::load(args.config.as_deref())?;
  let _log_guard = logging::init(config.log_file.as_deref())?;

  let client = CatalogClient::new(&config.catalog, config.credentials()?);
  let cache = SqliteCache::open(&config.cache_path()?)?;

  // The cache is closed once, after the batch, whatever its outcome.
  let outcome = run(args.command, &client, &cache).await;
  cache.close_after(outcome)
}

async fn run(command: Command, client: &CatalogClient, cache: &SqliteCache) -> Result<()> {
  match command {
    Command::Sync => {
      let summary = sync::sync_catalog(client, cache).await?;
      println!(
        "Stored {} entities from {} pages ({} rows cached).",
        summary.records,
        summary.pages,
        cache.entity_count()?
      );
    }
    Command::Show { name } => {
      let entity = EntityResolver::new(client, cache).find(&name).await?;
      print_entity(&entity);
    }
    Command::Overlap { name, other } => {
      let resolver = EntityResolver::new(client, cache);
      let entity = resolver.find(&name).await?;
      let overlap = resolver.overlaps_with(&entity, &other).await?;

      println!("{} and {} overlap in {} records.", name, other, overlap.len());
      for title in &overlap {
        println!("  {}", title);
      }
    }
  }

  Ok(())
}

fn print_entity(entity: &ResolvedEntity) {
  let details = &entity.details;

  println!("{} ({})", entity.name, entity.id);
  if !details.description.is_empty() {
    println!("  {}", details.description);
  }
  println!("  modified: {}", details.modified);
  if let Some(thumbnail) = &details.thumbnail {
    println!("  thumbnail: {}", thumbnail.url());
  }
  for url in &details.urls {
    println!("  {}: {}", url.kind, url.url);
  }
  println!("  associated records: {}", entity.associated.len());
}
