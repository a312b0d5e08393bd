//! Count-then-page enumeration.

use serde_json::Value;

use crate::{client::Client, errors::Error, query::FetchSpec};

/// One bounded slice of a larger result set.
#[derive(Debug)]
pub struct Page {
    /// Offset of the first record in this page.
    pub offset: u64,
    /// Total-count snapshot taken when enumeration started. Staleness
    /// during a long fetch is accepted, not corrected.
    pub total: u64,
    /// Raw items exactly as the service returned them.
    pub items: Vec<Value>,
}

/// Receives a notification after each completed page.
pub trait ProgressObserver {
    /// `fetched` is records delivered so far, `total` the count snapshot.
    fn page_fetched(&self, fetched: u64, total: u64);
}

/// Observer that reports progress through `tracing`.
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn page_fetched(&self, fetched: u64, total: u64) {
        tracing::info!(fetched, total, "page complete");
    }
}

/// Lazy, finite cursor over the pages matching one spec.
///
/// The first call to [`next_page`](Self::next_page) snapshots the total via
/// a count-only query; when the total is zero no page request is ever
/// issued. Page `i` is requested at `offset = i * page_limit` under the
/// spec's stable ordering key, so `ceil(total / page_limit)` requests cover
/// the set with no gaps or repeats. A fresh cursor re-queries the count, so
/// enumeration is restartable.
///
/// One request is in flight at a time per cursor; separate cursors share no
/// state and may run concurrently.
pub struct PageCursor<'a> {
    client: &'a Client,
    spec: &'a FetchSpec,
    total: Option<u64>,
    next_offset: u64,
    fetched: u64,
    shortfall: u64,
    done: bool,
}

impl<'a> PageCursor<'a> {
    pub(crate) fn new(client: &'a Client, spec: &'a FetchSpec) -> Self {
        PageCursor {
            client,
            spec,
            total: None,
            next_offset: 0,
            fetched: 0,
            shortfall: 0,
            done: false,
        }
    }

    /// The count snapshot, once the first page request has been made.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Records delivered so far.
    pub fn fetched(&self) -> u64 {
        self.fetched
    }

    /// Records the service under-delivered relative to the snapshot.
    /// Short pages do not abort enumeration; they accumulate here.
    pub fn shortfall(&self) -> u64 {
        self.shortfall
    }

    /// Fetches the next page, or `None` once the snapshot is covered.
    pub async fn next_page(&mut self) -> Result<Option<Page>, Error> {
        if self.done {
            return Ok(None);
        }

        let total = match self.total {
            Some(total) => total,
            None => {
                let total = self.client.count(self.spec).await?;
                self.total = Some(total);
                total
            }
        };

        if self.next_offset >= total {
            self.done = true;
            return Ok(None);
        }

        let limit = self.spec.page_limit();
        let offset = self.next_offset;
        let rowset = self.client.fetch_page(self.spec, offset, limit).await?;
        let items = rowset.rows;

        let expected = limit.min(total - offset);
        if (items.len() as u64) < expected {
            let short = expected - items.len() as u64;
            self.shortfall += short;
            tracing::warn!(
                offset,
                expected,
                got = items.len(),
                "short page; continuing"
            );
        }

        self.fetched += items.len() as u64;
        self.next_offset = offset + limit;
        Ok(Some(Page {
            offset,
            total,
            items,
        }))
    }
}
