use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use dotenv::dotenv;
use github_code_fetcher_lib::{load_tokens, Args, GitHubSearcher, Result, TokenList};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            // Usage errors exit with 1 rather than clap's default of 2.
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    init_logging(args.verbose);

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(args: &Args) -> Result<()> {
    let tokens = TokenList::new(load_tokens(&args.tokens_file).await?)?;
    info!("Loaded {} tokens from {}", tokens.len(), args.tokens_file.display());

    let searcher = GitHubSearcher::new(args, tokens)?;
    let mut stdout = tokio::io::stdout();
    searcher.run(&args.query, &mut stdout).await?;

    Ok(())
}

/// Logs go to stderr; stdout carries only file contents.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "github_code_fetcher=debug,github_code_fetcher_lib=debug,info"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
