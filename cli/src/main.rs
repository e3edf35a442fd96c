use clap::Parser;
use config::{BackendKind, PathManager, Settings, load_env_file};
use hoard_core::{
    Asset, AssetId, AssetInput, AssetPatch, AssetStore, DEFAULT_STORAGE_KEY, FsKeyValueStore,
    KeyValueStore, Ledger, MemoryKeyValueStore, Metal, OrnamentType, WeightBasis, WeightType,
};

use anyhow::{Context, bail};
use clap_derive::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Copy, Clone, ValueEnum, Debug, PartialEq, Eq)]
#[clap(rename_all = "lowercase")]
enum Backend {
    File,
    Sqlite,
    Memory,
}

impl From<Backend> for BackendKind {
    fn from(b: Backend) -> Self {
        match b {
            Backend::File => BackendKind::File,
            Backend::Sqlite => BackendKind::Sqlite,
            Backend::Memory => BackendKind::Memory,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Track precious-metal ornaments", long_about = None)]
struct Args {
    /// Directory holding the asset data and settings.toml
    #[arg(long, env = "HOARD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Storage backend (defaults to the one in settings.toml, else file)
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Key the asset list is stored under
    #[arg(long, env = "HOARD_STORAGE_KEY")]
    key: Option<String>,

    #[arg(long, short)]
    tracing: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every recorded asset
    List,

    /// Record a new asset
    Add {
        /// gold, silver, diamond or platinum
        #[arg(long)]
        metal: Metal,

        /// bangle, ring, chain, necklace, earrings, bracelet, pendant, anklet or coin
        #[arg(long = "type")]
        ornament: OrnamentType,

        #[arg(long, default_value_t = 1)]
        count: u64,

        /// Weight in grams
        #[arg(long)]
        weight: Option<f64>,

        /// per_item or total
        #[arg(long)]
        weight_type: Option<WeightType>,
    },

    /// Change fields of a recorded asset
    Update {
        id: String,

        #[arg(long)]
        metal: Option<Metal>,

        #[arg(long = "type")]
        ornament: Option<OrnamentType>,

        #[arg(long)]
        count: Option<u64>,

        #[arg(long, conflicts_with = "clear_weight")]
        weight: Option<f64>,

        /// Forget the recorded weight
        #[arg(long)]
        clear_weight: bool,

        #[arg(long, conflicts_with = "clear_weight_type")]
        weight_type: Option<WeightType>,

        /// Forget whether the weight is per item or total
        #[arg(long)]
        clear_weight_type: bool,
    },

    /// Delete a recorded asset
    Remove { id: String },

    /// Item count and weight per metal
    Summary {
        /// Count a weight marked `total` once instead of once per item
        #[arg(long)]
        declared_weights: bool,
    },

    /// Save the given --backend and --key as defaults in settings.toml
    Config,
}

fn setup_tracing(enable: bool) {
    let result = if enable {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::TRACE)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::ERROR)
            .with_writer(std::io::sink)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };
    if let Err(e) = result {
        eprintln!("Setting default subscriber failed: {}", e);
    }
}

async fn open_backend(kind: BackendKind) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    match kind {
        BackendKind::File => {
            PathManager::ensure_dirs_exist().context("Could not create data directory")?;
            let dir = PathManager::store_dir().context("Could not determine data directory")?;
            Ok(open_file_store(dir).await)
        }
        BackendKind::Sqlite => {
            PathManager::ensure_dirs_exist().context("Could not create data directory")?;
            open_sqlite()
        }
        BackendKind::Memory => {
            eprintln!("(memory backend: changes are not saved)");
            Ok(Arc::new(MemoryKeyValueStore::new()))
        }
    }
}

/// Open the file store, removing temp files an interrupted write left behind
async fn open_file_store(dir: PathBuf) -> Arc<dyn KeyValueStore> {
    let store = FsKeyValueStore::new(dir);
    match store.cleanup_temp_files().await {
        Ok(0) => {}
        Ok(cleaned) => tracing::info!(cleaned, "Removed leftover temp files"),
        Err(e) => tracing::warn!("Failed to clean up temp files: {e:#}"),
    }
    Arc::new(store)
}

#[cfg(feature = "sqlite")]
fn open_sqlite() -> anyhow::Result<Arc<dyn KeyValueStore>> {
    let path = PathManager::db_path().context("Could not determine data directory")?;
    Ok(Arc::new(hoard_core::SqliteStore::open(path)?))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite() -> anyhow::Result<Arc<dyn KeyValueStore>> {
    bail!("hoard was built without SQLite support (rebuild with --features sqlite)")
}

fn format_weight(asset: &Asset) -> Option<String> {
    let weight = asset.weight?;
    Some(match asset.weight_type {
        Some(WeightType::PerItem) => format!(
            "{}g each ({:.1}g total)",
            weight,
            weight * asset.count as f64
        ),
        _ => format!("{}g total", weight),
    })
}

fn format_asset(asset: &Asset) -> String {
    let mut line = format!(
        "{}  {} {}  Count: {}",
        asset.id,
        asset.metal.label(),
        asset.ornament_type.label(),
        asset.count
    );
    if let Some(weight) = format_weight(asset) {
        line.push_str(&format!("  Weight: {}", weight));
    }
    line.push_str(&format!("  Added: {}", asset.created_at.format("%Y-%m-%d")));
    line
}

fn print_summary(ledger: &Ledger) {
    let totals = ledger.totals();
    if totals.is_empty() {
        return;
    }
    println!("Summary");
    for (metal, total) in totals.iter() {
        println!("  {}: {}", metal.label(), total);
    }
}

async fn run(command: Command, ledger: &mut Ledger, defaults: Settings) -> anyhow::Result<()> {
    match command {
        Command::List => {
            if ledger.is_empty() {
                println!("No Assets Yet");
                println!("Start tracking your precious assets with `hoard add`.");
                return Ok(());
            }
            for asset in ledger.assets() {
                println!("{}", format_asset(asset));
            }
            println!();
            print_summary(ledger);
        }
        Command::Add {
            metal,
            ornament,
            count,
            weight,
            weight_type,
        } => {
            let input = AssetInput {
                metal,
                ornament_type: ornament,
                count,
                weight,
                weight_type,
            };
            let asset = ledger.add(input).await?;
            println!("Asset added successfully");
            println!("{}", format_asset(asset));
        }
        Command::Update {
            id,
            metal,
            ornament,
            count,
            weight,
            clear_weight,
            weight_type,
            clear_weight_type,
        } => {
            let patch = AssetPatch {
                metal,
                ornament_type: ornament,
                count,
                weight: if clear_weight { Some(None) } else { weight.map(Some) },
                weight_type: if clear_weight_type {
                    Some(None)
                } else {
                    weight_type.map(Some)
                },
            };
            if patch.is_empty() {
                bail!("Nothing to update: pass at least one field to change");
            }
            let asset = ledger.update(&AssetId::from_string(id), patch).await?;
            println!("Asset updated successfully");
            println!("{}", format_asset(asset));
        }
        Command::Remove { id } => {
            ledger.remove(&AssetId::from_string(id)).await?;
            println!("Asset deleted successfully");
        }
        Command::Summary { declared_weights } => {
            if declared_weights {
                ledger.set_weight_basis(WeightBasis::Declared);
            }
            if ledger.is_empty() {
                println!("No assets recorded");
            }
            print_summary(ledger);
        }
        Command::Config => {
            defaults.save().map_err(anyhow::Error::msg)?;
            println!(
                "Default backend: {}, storage key: {}",
                defaults.backend,
                defaults.storage_key.as_deref().unwrap_or(DEFAULT_STORAGE_KEY)
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env_file();
    let args = Args::parse();

    setup_tracing(args.tracing);

    if let Some(dir) = &args.data_dir {
        PathManager::set_data_dir(dir.clone());
    }

    let settings = Settings::load();
    let defaults = Settings {
        backend: args.backend.map(BackendKind::from).unwrap_or(settings.backend),
        storage_key: args.key.or(settings.storage_key),
    };
    let kind = defaults.backend;
    let key = defaults
        .storage_key
        .clone()
        .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
    tracing::debug!(backend = %kind, key = %key, "Opening asset store");

    let backend = open_backend(kind).await?;
    let store = Arc::new(AssetStore::with_key(backend, key));
    let mut ledger = Ledger::open(store).await;

    run(args.command, &mut ledger, defaults).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn asset(weight: Option<f64>, weight_type: Option<WeightType>) -> Asset {
        let mut input = AssetInput::new(Metal::Gold, OrnamentType::Ring, 3);
        input.weight = weight;
        input.weight_type = weight_type;
        Asset::new(
            AssetId::from_string("abc"),
            input,
            "2024-05-06T07:08:09Z".parse().unwrap(),
        )
    }

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_format_asset_per_item_weight() {
        let line = format_asset(&asset(Some(2.5), Some(WeightType::PerItem)));
        assert_eq!(
            line,
            "abc  Gold Ring  Count: 3  Weight: 2.5g each (7.5g total)  Added: 2024-05-06"
        );
    }

    #[test]
    fn test_format_asset_without_weight() {
        let line = format_asset(&asset(None, None));
        assert_eq!(line, "abc  Gold Ring  Count: 3  Added: 2024-05-06");
    }

    #[test]
    fn test_format_weight_total() {
        assert_eq!(
            format_weight(&asset(Some(12.0), Some(WeightType::Total))).as_deref(),
            Some("12g total")
        );
    }

    #[test]
    fn test_parse_add() {
        let args = Args::try_parse_from([
            "hoard", "--backend", "memory", "add", "--metal", "gold", "--type", "bangle",
            "--count", "2", "--weight", "11.5",
        ])
        .unwrap();
        assert_eq!(args.backend, Some(Backend::Memory));
        match args.command {
            Command::Add { metal, ornament, count, weight, weight_type } => {
                assert_eq!(metal, Metal::Gold);
                assert_eq!(ornament, OrnamentType::Bangle);
                assert_eq!(count, 2);
                assert_eq!(weight, Some(11.5));
                assert_eq!(weight_type, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_update_clear_weight_type() {
        let args = Args::try_parse_from(["hoard", "update", "abc", "--clear-weight-type"]).unwrap();
        match args.command {
            Command::Update { id, weight_type, clear_weight_type, .. } => {
                assert_eq!(id, "abc");
                assert_eq!(weight_type, None);
                assert!(clear_weight_type);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let conflicting = Args::try_parse_from([
            "hoard", "update", "abc", "--weight-type", "total", "--clear-weight-type",
        ]);
        assert!(conflicting.is_err());
    }

    #[tokio::test]
    async fn test_clear_weight_type_reaches_store() {
        let store = Arc::new(AssetStore::new(
            Arc::new(MemoryKeyValueStore::new()) as Arc<dyn KeyValueStore>
        ));
        let mut ledger = Ledger::open(store.clone()).await;
        let id = ledger
            .add(
                AssetInput::new(Metal::Gold, OrnamentType::Chain, 2)
                    .with_weight_type(WeightType::Total),
            )
            .await
            .unwrap()
            .id
            .clone();

        let args =
            Args::try_parse_from(["hoard", "update", id.as_str(), "--clear-weight-type"]).unwrap();
        run(args.command, &mut ledger, Settings::default()).await.unwrap();

        assert_eq!(store.load_all().await[0].weight_type, None);
    }

    #[tokio::test]
    async fn test_open_file_store_removes_leftover_temp_files() {
        let dir = std::env::temp_dir().join(format!("hoard_cli_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let leftover = dir.join("6b6579.tmp");
        std::fs::write(&leftover, "partial").unwrap();

        let store = open_file_store(dir.clone()).await;
        assert!(!leftover.exists());
        store.set("key", "value").await.unwrap();
        assert_eq!(store.get("key").await.unwrap().as_deref(), Some("value"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_parse_rejects_unknown_metal() {
        let result = Args::try_parse_from([
            "hoard", "add", "--metal", "copper", "--type", "ring",
        ]);
        assert!(result.is_err());
    }
}
