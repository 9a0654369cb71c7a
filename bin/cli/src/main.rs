use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use eds_primitives::{Chunk, SparseSquare};
use erasure_commit::{repair_sparse, CodecKind, Config, DefaultTree, ExtendedDataSquare};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the repair configuration, e.g. `{"codec": "rsgf8"}`.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// The codec to use, overrides the configuration.
    #[arg(long)]
    codec: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Erasure code original data into an extended square and print its roots.
    Extend(InputArgs),
    /// Repair a square with missing chunks against its roots.
    Repair(InputArgs),
}

#[derive(Parser, Debug)]
struct InputArgs {
    /// JSON input file
    #[arg(short, long)]
    input: PathBuf,
}

/// The original data of a square, row-major
#[serde_as]
#[derive(Deserialize, Serialize, Debug)]
struct OriginalData {
    #[serde_as(as = "Vec<serde_with::hex::Hex>")]
    chunks: Vec<Chunk>,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => serde_json::from_str::<Config>(&read(path)?)
            .with_context(|| format!("failed to parse config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(codec) = &args.codec {
        config.codec = CodecKind::try_from(codec.as_str()).map_err(|e: String| anyhow!(e))?;
    }
    Ok(config)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// A complete square together with its roots
fn to_sparse(eds: &ExtendedDataSquare) -> SparseSquare {
    SparseSquare::new(eds.roots(), eds.flattened().into_iter().map(Some).collect())
}

fn extend(config: &Config, input: &Path) -> Result<SparseSquare> {
    let original: OriginalData = serde_json::from_str(&read(input)?)?;
    debug!("extending {} chunks with {}", original.chunks.len(), config.codec);
    let eds = ExtendedDataSquare::compute(original.chunks, config.codec.build(), DefaultTree::boxed)
        .map_err(|e| anyhow!("failed to extend square: {}", e))?;
    info!("extended square of width {}", eds.width());
    Ok(to_sparse(&eds))
}

fn repair(config: &Config, input: &Path) -> Result<SparseSquare> {
    let square: SparseSquare = serde_json::from_str(&read(input)?)?;
    debug!(
        "repairing {} of {} chunks with {}",
        square.known(),
        square.chunks.len(),
        config.codec
    );
    let eds = repair_sparse(square, config).map_err(|e| anyhow!("failed to repair square: {}", e))?;
    info!("repaired square of width {}", eds.width());
    Ok(to_sparse(&eds))
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let config = load_config(&args)?;
    let square = match &args.command {
        Commands::Extend(extend_args) => extend(&config, &extend_args.input)?,
        Commands::Repair(repair_args) => repair(&config, &repair_args.input)?,
    };
    println!("{}", serde_json::to_string_pretty(&square)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from(["eds-cli", "--codec", "novelpoly", "repair", "-i", "square.json"]);
        assert!(matches!(args.command, Commands::Repair(_)));
        assert_eq!(load_config(&args).unwrap().codec, CodecKind::NovelPoly);
    }

    #[test]
    fn test_unknown_codec() {
        let args = Args::parse_from(["eds-cli", "--codec", "kzg", "extend", "-i", "data.json"]);
        assert!(load_config(&args).is_err());
    }

    #[test]
    fn test_extend_then_repair() {
        let dir = std::env::temp_dir().join(format!("eds-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let config = Config::default();

        let original = OriginalData {
            chunks: (0..4u8).map(|i| vec![i; 8]).collect(),
        };
        let original_path = dir.join("original.json");
        std::fs::write(&original_path, serde_json::to_string(&original).unwrap()).unwrap();
        let extended = extend(&config, &original_path).unwrap();
        assert_eq!(extended.chunks.len(), 16);

        let mut sparse = extended.clone();
        sparse.chunks[0] = None;
        sparse.chunks[5] = None;
        let sparse_path = dir.join("sparse.json");
        std::fs::write(&sparse_path, serde_json::to_string(&sparse).unwrap()).unwrap();
        assert_eq!(repair(&config, &sparse_path).unwrap(), extended);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
