mod logging;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mfs_core::{
    Algorithm, CopyOptions, Encoding, Format, Mfs, MkdirOptions, ROOT_REF, StatOptions,
    StatOutput, Store,
};
use output::{
    AddOutput, AddedObject, CopyOutput, InitOutput, MkdirOutput, OutputWriter, RootOutput,
    StatCommandOutput,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// MFS - a mutable file tree over a content-addressed Merkle DAG
#[derive(Parser)]
#[command(name = "mfs")]
#[command(about = "Mutable file tree over a content-addressed Merkle DAG", long_about = None)]
#[command(version)]
struct Cli {
    /// Store root directory (defaults to MFS_STORE env var or ./mfs-store)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level unless MFS_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new store with an empty MFS root
    Init {
        /// Hash algorithm to use
        #[arg(long, default_value = "blake3-256")]
        algo: String,

        /// Node format to use
        #[arg(long, default_value = "dag-bin")]
        format: String,
    },

    /// Import local files or directories; reference them as /dag/<hash>
    Add {
        /// Paths to add
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Copy one or more sources to a destination
    Cp {
        /// Source paths followed by the destination path
        #[arg(required = true, num_args = 2..)]
        paths: Vec<String>,

        /// Create missing parent directories
        #[arg(short, long)]
        parents: bool,

        /// Node format for rebuilt directories
        #[arg(long)]
        format: Option<String>,

        /// Hash algorithm for rebuilt directories
        #[arg(long)]
        hash_alg: Option<String>,

        /// Publish the new root without persisting it
        #[arg(long)]
        no_flush: bool,
    },

    /// Show metadata for a path
    Stat {
        /// Path to inspect
        path: String,

        /// Print only the hash
        #[arg(long, conflicts_with = "size")]
        hash: bool,

        /// Print only the cumulative size
        #[arg(long)]
        size: bool,
    },

    /// Create a directory
    Mkdir {
        /// Path of the new directory
        path: String,

        /// Create missing parents and accept an existing directory
        #[arg(short, long)]
        parents: bool,
    },

    /// Show the MFS root hash
    Root {
        /// List every persisted root, oldest first
        #[arg(long)]
        history: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = OutputWriter::new(cli.json);

    if let Err(e) = logging::init_logging(cli.verbose) {
        output.write_error(&e, 1);
        return ExitCode::FAILURE;
    }

    // Determine store root: CLI arg > MFS_STORE env var > ./mfs-store default
    let root = cli
        .root
        .or_else(|| std::env::var("MFS_STORE").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("./mfs-store"));

    let result = match cli.command {
        Commands::Init { algo, format } => cmd_init(&root, &algo, &format, &output).await,
        Commands::Add { paths } => cmd_add(&root, paths, &output),
        Commands::Cp {
            paths,
            parents,
            format,
            hash_alg,
            no_flush,
        } => {
            let options = match copy_options(parents, format, hash_alg, no_flush) {
                Ok(options) => options,
                Err(e) => {
                    output.write_error(&e, 1);
                    return ExitCode::FAILURE;
                }
            };
            cmd_cp(&root, paths, options, &output).await
        }
        Commands::Stat { path, hash, size } => {
            let options = StatOptions {
                hash_only: hash,
                size_only: size,
            };
            cmd_stat(&root, &path, options, &output).await
        }
        Commands::Mkdir { path, parents } => cmd_mkdir(&root, &path, parents, &output).await,
        Commands::Root { history } => cmd_root(&root, history, &output).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            output.write_error(&e, 1);
            ExitCode::FAILURE
        }
    }
}

fn open_store(root: &Path) -> Result<Store> {
    Store::open(root).with_context(|| format!("Failed to open store at {}", root.display()))
}

async fn open_mfs(root: &Path) -> Result<Mfs<Store>> {
    let store = open_store(root)?;
    Mfs::open(store)
        .await
        .with_context(|| format!("Failed to open MFS root in {}", root.display()))
}

fn copy_options(
    parents: bool,
    format: Option<String>,
    hash_alg: Option<String>,
    no_flush: bool,
) -> Result<CopyOptions> {
    let format = format
        .map(|name| Format::parse(&name).with_context(|| format!("Invalid --format: {}", name)))
        .transpose()?;
    let hash_alg = hash_alg
        .map(|name| {
            Algorithm::parse(&name).with_context(|| format!("Invalid --hash-alg: {}", name))
        })
        .transpose()?;

    Ok(CopyOptions {
        parents,
        flush: !no_flush,
        format,
        hash_alg,
    })
}

async fn cmd_init(root: &Path, algo: &str, format: &str, output: &OutputWriter) -> Result<()> {
    let algorithm = Algorithm::parse(algo).with_context(|| format!("Invalid --algo: {}", algo))?;
    let format = Format::parse(format).with_context(|| format!("Invalid --format: {}", format))?;

    let store = Store::init(root, Encoding::new(format, algorithm))
        .with_context(|| format!("Failed to initialize store at {}", root.display()))?;
    let mfs = Mfs::open(store)
        .await
        .with_context(|| format!("Failed to create MFS root in {}", root.display()))?;

    let data = InitOutput {
        success: true,
        result_code: 0,
        store: root.display().to_string(),
        algorithm: algorithm.as_str().to_string(),
        format: format.as_str().to_string(),
        mfs_root: mfs.root(),
    };

    output.write(&data, || {
        format!(
            "Initialized mfs store at {}\nAlgorithm: {}\nFormat: {}\nRoot: {}\n",
            root.display(),
            algorithm.as_str(),
            format.as_str(),
            mfs.root()
        )
    })
}

fn cmd_add(root: &Path, paths: Vec<PathBuf>, output: &OutputWriter) -> Result<()> {
    let store = open_store(root)?;

    let mut objects = Vec::new();
    for path in paths {
        let block = store
            .add_path(&path)
            .with_context(|| format!("Failed to add path: {}", path.display()))?;

        objects.push(AddedObject {
            hash: block.hash,
            path: path.display().to_string(),
            size: block.cumulative_size(),
        });
    }

    let data = AddOutput {
        success: true,
        result_code: 0,
        objects,
    };

    output.write(&data, || {
        data.objects
            .iter()
            .map(|object| format!("{} {}\n", object.hash, object.path))
            .collect()
    })
}

async fn cmd_cp(
    root: &Path,
    mut paths: Vec<String>,
    options: CopyOptions,
    output: &OutputWriter,
) -> Result<()> {
    let destination = paths
        .pop()
        .context("Please supply a source and a destination")?;
    let mfs = open_mfs(root).await?;

    mfs.cp(&paths, &destination, options)
        .await
        .with_context(|| format!("Failed to copy to {}", destination))?;

    if !options.flush {
        tracing::warn!("Root not flushed; it is discarded when this process exits");
    }

    let data = CopyOutput {
        success: true,
        result_code: 0,
        sources: paths,
        destination,
        mfs_root: mfs.root(),
        flushed: options.flush,
    };

    output.write(&data, || format!("{}\n", data.mfs_root))
}

async fn cmd_stat(
    root: &Path,
    path: &str,
    options: StatOptions,
    output: &OutputWriter,
) -> Result<()> {
    let mfs = open_mfs(root).await?;

    let stat = mfs
        .stat(path, options)
        .await
        .with_context(|| format!("Failed to stat {}", path))?;

    let data = StatCommandOutput {
        success: true,
        result_code: 0,
        path: path.to_string(),
        stat,
    };

    output.write(&data, || match data.stat {
        StatOutput::Hash { hash } => format!("{}\n", hash),
        StatOutput::Size { size } => format!("{}\n", size),
        StatOutput::Full(stat) => format!(
            "{}\nSize: {}\nCumulativeSize: {}\nChildBlocks: {}\nType: {}\n",
            stat.hash,
            stat.size,
            stat.cumulative_size,
            stat.blocks,
            stat.kind.as_str()
        ),
    })
}

async fn cmd_mkdir(root: &Path, path: &str, parents: bool, output: &OutputWriter) -> Result<()> {
    let mfs = open_mfs(root).await?;

    let options = MkdirOptions {
        parents,
        ..Default::default()
    };
    mfs.mkdir(path, options)
        .await
        .with_context(|| format!("Failed to create directory {}", path))?;

    let data = MkdirOutput {
        success: true,
        result_code: 0,
        path: path.to_string(),
        mfs_root: mfs.root(),
    };

    output.write(&data, || format!("{}\n", data.mfs_root))
}

async fn cmd_root(root: &Path, history: bool, output: &OutputWriter) -> Result<()> {
    let mfs = open_mfs(root).await?;

    let history = if history {
        Some(
            mfs.store()
                .refs()
                .history(ROOT_REF)
                .with_context(|| "Failed to read root history")?,
        )
    } else {
        None
    };

    let data = RootOutput {
        success: true,
        result_code: 0,
        mfs_root: mfs.root(),
        history,
    };

    output.write(&data, || match &data.history {
        Some(history) => history.iter().map(|hash| format!("{}\n", hash)).collect(),
        None => format!("{}\n", data.mfs_root),
    })
}
