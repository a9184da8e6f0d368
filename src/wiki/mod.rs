//! MediaWiki `allpages` crawling: HTTP client, cache-first batch resolution
//! and the pagination driver that walks the continuation chain.

pub mod api_types;
pub mod client;
pub mod crawl;
pub mod driver;
pub mod error;
pub mod resolver;
pub mod types;

#[cfg(test)]
pub mod fake;

pub use client::WikiClient;
pub use crawl::{fetch_all_pages, CrawlSummary};
pub use driver::{PaginationDriver, RetryPolicy};
pub use resolver::BatchResolver;
