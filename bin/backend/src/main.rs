pub mod api;
pub mod cli;

pub mod http;
pub mod model;
pub mod opts;
pub mod transform;

use anyhow::Result;
use atb::logging::init_tracer;
use atb_cli_utils::AtbCli;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    Cli::set_globals(&cli.base);

    match cli.subcommand {
        Commands::Situations => {
            transform::print_situations();
            Ok(())
        }
        Commands::Transform { ai, args } => {
            let _guard = init_tracer(Default::default()).expect("tracer setup succeeds. qed");
            let runtime = Cli::create_runtime(cli.worker_threads)?;
            runtime.block_on(async move { transform::run(ai, args).await })
        }
        Commands::Http { http, ai } => {
            let _guard = init_tracer(Default::default()).expect("tracer setup succeeds. qed");
            let runtime = Cli::create_runtime(cli.worker_threads)?;
            runtime.block_on(async move { http::run(http, ai).await })
        }
    }
}
