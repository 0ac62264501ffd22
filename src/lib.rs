//! # GitHub Code Fetcher
//!
//! A Rust library for searching code on GitHub and fetching the decoded
//! contents of every match, spreading requests over a pool of API tokens so a
//! single rate-limited token does not stall the run.
//!
//! ## Main Components
//!
//! - [`Dispatcher`]: authenticated GET that falls through the token list on 403/429
//! - [`GitHubSearcher`]: pages through search results and writes decoded file contents
//! - [`load_tokens`] / [`TokenList`]: the token pool, one token per line of a file
//! - [`Args`]: Command line argument structure for configuring the run
//!
//! ## Example
//!
//! ```no_run
//! use github_code_fetcher_lib::{load_tokens, Args, GitHubSearcher, TokenList};
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let args = Args::parse();
//!
//!     let tokens = TokenList::new(load_tokens(&args.tokens_file).await?)?;
//!     let searcher = GitHubSearcher::new(&args, tokens)?;
//!
//!     let mut stdout = tokio::io::stdout();
//!     searcher.run(&args.query, &mut stdout).await?;
//!
//!     Ok(())
//! }
//! ```

mod args;
pub mod content;
pub mod dispatcher;
pub mod error;
mod github_searcher;
mod tokens;

pub use crate::args::{Args, MAX_PAGES};
pub use crate::dispatcher::{is_rate_limited, Dispatched, Dispatcher, Outcome, RateLimit};
pub use crate::error::{Error, ItemError, Result};
pub use crate::github_searcher::{search_url, GitHubSearcher, SearchSummary, PAGE_SIZE};
pub use crate::tokens::{load_tokens, Token, TokenList};
