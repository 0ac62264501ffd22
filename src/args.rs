use std::path::PathBuf;

use clap::Parser;
use url::Url;

/// Hard ceiling of the code search API: 10 pages of 100 results.
pub const MAX_PAGES: u32 = 10;

/// Search GitHub code and print the decoded contents of every matching file,
/// rotating through a pool of API tokens whenever one is rate limited.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub struct Args {
    /// File with one GitHub API token per line, tried in order.
    #[clap(value_name = "TOKENS_FILE")]
    pub tokens_file: PathBuf,

    /// Code search query, e.g. "tokio::select language:rust".
    #[clap(value_name = "QUERY")]
    pub query: String,

    /// Maximum number of pages to retrieve.
    /// Each page contains up to 100 results.
    #[clap(
        short = 'p',
        long,
        value_name = "NUM",
        default_value_t = MAX_PAGES,
        value_parser = clap::value_parser!(u32).range(1..=MAX_PAGES as i64)
    )]
    pub max_pages: u32,

    /// Base URL of the GitHub REST API.
    #[clap(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub api_url: Url,

    /// Pause after a rate-limited request before trying the next token.
    #[clap(long, env = "GITHUB_BACKOFF_MS", value_name = "MS", default_value_t = 1000)]
    pub backoff_ms: u64,

    /// Enable debug logging.
    #[clap(short, long)]
    pub verbose: bool,
}
