use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, StatusCode};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::content::{FileContent, ResultItem, SearchEnvelope};
use crate::dispatcher::Dispatcher;
use crate::error::{Error, ItemError, Result};
use crate::tokens::TokenList;
use crate::Args;

/// Results requested per search page; a shorter page is the last one.
pub const PAGE_SIZE: usize = 100;

/// Build the code search URL for `query` and `page`.
pub fn search_url(api_url: &Url, query: &str, page: u32) -> Result<Url> {
    let base = format!("{}/search/code", api_url.as_str().trim_end_matches('/'));
    let mut url = Url::parse(&base).map_err(|source| Error::InvalidUrl { url: base, source })?;

    url.query_pairs_mut()
        .append_pair("per_page", &PAGE_SIZE.to_string())
        .append_pair("type", "Code")
        .append_pair("q", query)
        .append_pair("page", &page.to_string());

    Ok(url)
}

/// Counters for a finished run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchSummary {
    /// Search pages fetched.
    pub pages: u32,
    /// Result items seen across all pages.
    pub items: usize,
    /// Items whose decoded content was written.
    pub written: usize,
    /// Items skipped because their content could not be decoded.
    pub skipped: usize,
}

pub struct GitHubSearcher {
    dispatcher: Dispatcher,
    tokens: TokenList,
    api_url: Url,
    max_pages: u32,
    progress: ProgressBar,
}

impl GitHubSearcher {
    /// Create a new GitHubSearcher from the command line configuration
    pub fn new(args: &Args, tokens: TokenList) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let dispatcher =
            Dispatcher::new(client).with_backoff(Duration::from_millis(args.backoff_ms));

        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {wide_msg}")?
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        Ok(GitHubSearcher {
            dispatcher,
            tokens,
            api_url: args.api_url.clone(),
            max_pages: args.max_pages,
            progress,
        })
    }

    /// Page through the results for `query`, writing each decoded file to `out`.
    pub async fn run<W>(&self, query: &str, out: &mut W) -> Result<SearchSummary>
    where
        W: AsyncWrite + Unpin,
    {
        let mut summary = SearchSummary::default();
        let mut page: u32 = 1;

        self.progress.enable_steady_tick(Duration::from_millis(80));

        let result = loop {
            self.progress
                .set_message(format!("Searching '{}' - page {}", query, page));

            let items = match self.search_page(query, page).await {
                Ok(items) => items,
                Err(e) => break Err(e),
            };
            summary.pages += 1;

            if items.is_empty() {
                debug!("No more results for '{}'", query);
                break Ok(());
            }
            summary.items += items.len();

            for (index, item) in items.iter().enumerate() {
                self.progress.set_message(format!(
                    "Fetching '{}' - page {} item {}/{}",
                    query,
                    page,
                    index + 1,
                    items.len()
                ));

                match self.fetch_content(item).await {
                    Ok(Ok(content)) => {
                        if let Err(e) = write_content(out, &content).await {
                            return Err(self.abandon(e));
                        }
                        summary.written += 1;
                    }
                    Ok(Err(e)) => {
                        warn!("Skipping {}: {}", item.url, e);
                        summary.skipped += 1;
                    }
                    Err(e) => return Err(self.abandon(e)),
                }
            }

            info!("Processed {} results for '{}' page {}", items.len(), query, page);

            if items.len() < PAGE_SIZE {
                debug!("Last page for '{}' reached at page {}", query, page);
                break Ok(());
            }

            page += 1;

            if page > self.max_pages {
                info!(
                    "Max page limit reached for '{}' (limit: {})",
                    query, self.max_pages
                );
                break Ok(());
            }
        };

        match result {
            Ok(()) => {
                self.progress.finish_and_clear();
                info!(
                    "Finished '{}': {} pages, {} items, {} written, {} skipped",
                    query, summary.pages, summary.items, summary.written, summary.skipped
                );
                Ok(summary)
            }
            Err(e) => Err(self.abandon(e)),
        }
    }

    fn abandon(&self, e: Error) -> Error {
        self.progress.abandon_with_message(format!("✗ {}", e));
        e
    }

    /// Fetch one page of results. Any non-200 final status aborts the run.
    async fn search_page(&self, query: &str, page: u32) -> Result<Vec<ResultItem>> {
        let url = search_url(&self.api_url, query, page)?;
        let dispatched = self.dispatcher.get(url.as_str(), &self.tokens).await?;
        let response = dispatched.response;

        if response.status() != StatusCode::OK {
            return Err(Error::Search {
                page,
                status: response.status(),
            });
        }

        let body = response.bytes().await?;
        let envelope: SearchEnvelope =
            serde_json::from_slice(&body).map_err(|source| Error::SearchBody { page, source })?;

        debug!(
            "Page {} for '{}' returned {} items",
            page,
            query,
            envelope.items.len()
        );
        Ok(envelope.items)
    }

    /// Fetch and decode one item. The outer error aborts the run, the inner one skips the item.
    async fn fetch_content(&self, item: &ResultItem) -> Result<Result<Vec<u8>, ItemError>> {
        let dispatched = self.dispatcher.get(&item.url, &self.tokens).await?;
        let response = dispatched.response;

        if !response.status().is_success() {
            return Ok(Err(ItemError::Status(response.status())));
        }

        let body = response.bytes().await?;
        let decoded = serde_json::from_slice::<FileContent>(&body)
            .map_err(ItemError::from)
            .and_then(|file| file.decode().map_err(ItemError::from));

        Ok(decoded)
    }
}

async fn write_content<W>(out: &mut W, content: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(content).await?;
    out.write_all(b"\n").await?;
    out.flush().await?;
    Ok(())
}
