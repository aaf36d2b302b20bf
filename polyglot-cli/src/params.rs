use std::path::PathBuf;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(name = "polyglot", about = "Uploads problem test data to the E-Olymp object store")]
pub struct Args {
    /// JSON configuration file; defaults apply when it does not exist.
    #[clap(long, env = "POLYGLOT_CONFIG", default_value = "config.json")]
    pub(crate) config: PathBuf,
    #[clap(long, env = "EOLYMP_API_URL")]
    pub(crate) api_url: Option<String>,
    #[clap(long, env = "EOLYMP_TOKEN", hide_env_values = true)]
    pub(crate) token: Option<String>,
    /// Dedup cache file, overrides `Upload.CachePath`.
    #[clap(long)]
    pub(crate) cache: Option<PathBuf>,
    /// Write objects into this directory instead of the remote store.
    #[clap(long)]
    pub(crate) local_store: Option<PathBuf>,
    #[clap(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload files and print their object keys.
    Upload {
        #[clap(required = true)]
        files: Vec<PathBuf>,
    },
    /// Upload every input/answer pair found in a directory.
    Tests {
        dir: PathBuf,
        /// Mark the tests as examples (zero points).
        #[clap(long)]
        examples: bool,
    },
    /// Upload the \exmp samples of a TeX statement.
    Examples {
        statement: PathBuf,
    },
    /// Print content hashes and cached keys without uploading.
    Hash {
        #[clap(required = true)]
        files: Vec<PathBuf>,
    },
}
