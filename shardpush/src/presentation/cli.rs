use clap::{Args, Parser, Subcommand};
use shardpush_core::codec::CodecId;
use shardpush_core::upload::DEFAULT_UPLOAD_COMMAND;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Pack a directory tree into size-bounded archives, upload and delete them, resumably",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Parameters that decide how the tree is cut into archives.
#[derive(Args, Clone, Debug)]
pub struct TreeArgs {
    /// Directory tree to archive
    pub source: PathBuf,
    /// Scratch directory for archives and the progress ledger
    pub staging: PathBuf,
    /// Maximum uncompressed size of one archive, in GiB
    #[arg(long = "max-size-gb", default_value_t = 50)]
    pub max_size_gb: u64,
    /// Exact ceiling in bytes (overrides --max-size-gb)
    #[arg(long = "max-size-bytes", hide = true)]
    pub max_size_bytes: Option<u64>,
    /// Archive name prefix: <prefix>_part_001.tar.gz
    #[arg(long, default_value = "archive")]
    pub prefix: String,
    /// gzip, zstd or store
    #[arg(long, default_value = "gzip")]
    pub codec: CodecId,
    /// Ignore the ledger and start from the first file
    #[arg(long = "no-resume")]
    pub no_resume: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress, upload and delete archives until the tree is done
    Run {
        #[command(flatten)]
        tree: TreeArgs,
        /// Destination repository identifier
        #[arg(long, env = "SHARDPUSH_REPO")]
        repo: String,
        /// Extra free space required on top of one archive, in GiB
        #[arg(long = "headroom-gb", default_value_t = 10)]
        headroom_gb: u64,
        /// Compression level (codec default when omitted)
        #[arg(long)]
        level: Option<i32>,
        /// Upload command; {repo} and {file} are substituted
        #[arg(long = "upload-cmd", default_value = DEFAULT_UPLOAD_COMMAND)]
        upload_cmd: String,
        /// Disable the progress bar
        #[arg(long = "no-progress")]
        no_progress: bool,
    },

    /// Show the archives a run would produce, without writing anything
    Plan {
        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Print the progress ledger and leftover archives in a staging dir
    Status { staging: PathBuf },

    /// List the entries of a local archive
    Ls { archive: PathBuf },
}
