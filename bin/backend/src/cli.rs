pub use atb_cli_utils::{
    AtbCli, BaseCli,
    clap::{self, Parser},
};

use crate::opts::{AiOpts, HttpOpts, TransformArgs};

#[derive(Parser, Debug)]
#[clap(
    name = "tonelift",
    rename_all = "kebab-case",
    rename_all_env = "screaming-snake"
)]
pub struct Cli {
    #[clap(flatten)]
    pub base: BaseCli,

    /// Tokio worker threads (optional override)
    #[arg(long, env = "TONELIFT_WORKER_THREADS")]
    pub worker_threads: Option<usize>,

    /// Subcommands
    #[clap(subcommand)]
    pub subcommand: Commands,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server
    Http {
        #[clap(flatten)]
        http: HttpOpts,

        #[clap(flatten)]
        ai: AiOpts,
    },
    /// Transform a single message and print the result
    Transform {
        #[clap(flatten)]
        ai: AiOpts,

        #[clap(flatten)]
        args: TransformArgs,
    },
    /// List the supported situations
    Situations,
}

impl Cli {
    pub fn create_runtime(
        worker_threads: Option<usize>,
    ) -> anyhow::Result<tokio::runtime::Runtime> {
        let mut builder = tokio::runtime::Builder::new_multi_thread();
        if let Some(n) = worker_threads {
            builder.worker_threads(n);
        }
        builder.enable_all().build().map_err(Into::into)
    }
}

const UNKNOWN: &str = "unknown";

impl AtbCli for Cli {
    fn name() -> String {
        env!("CARGO_PKG_NAME").to_owned()
    }
    fn version() -> String {
        env!("CARGO_PKG_VERSION").to_owned()
    }
    fn authors() -> Vec<String> {
        env!("CARGO_PKG_AUTHORS")
            .split(':')
            .map(str::to_string)
            .collect()
    }
    fn description() -> String {
        env!("CARGO_PKG_DESCRIPTION").to_owned()
    }
    fn repository() -> String {
        env!("CARGO_PKG_REPOSITORY").to_owned()
    }
    fn impl_version() -> String {
        option_env!("ATB_CLI_IMPL_VERSION")
            .unwrap_or(env!("CARGO_PKG_VERSION"))
            .to_owned()
    }
    fn commit() -> String {
        option_env!("ATB_CLI_GIT_COMMIT_HASH")
            .unwrap_or(UNKNOWN)
            .to_owned()
    }
    fn branch() -> String {
        option_env!("ATB_CLI_GIT_BRANCH").unwrap_or(UNKNOWN).to_owned()
    }
    fn platform() -> String {
        option_env!("ATB_CLI_PLATFORM").unwrap_or(UNKNOWN).to_owned()
    }
    fn rustc_info() -> String {
        option_env!("ATB_CLI_RUSTC_INFO").unwrap_or(UNKNOWN).to_owned()
    }
}
