use std::time::Duration;

use tokio::time::sleep;

/// Minimum gap between successive upstream requests.
pub const RATE_LIMIT_DELAY: Duration = Duration::from_millis(100);

/// One page of results from an offset/limit paged endpoint.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, has_next: bool) -> Self {
        Self { items, has_next }
    }

    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            has_next: false,
        }
    }
}

/// Walks an offset/limit paged endpoint, pausing between pages to stay under
/// the upstream rate limit.
#[derive(Debug)]
pub struct PageCursor {
    offset: u32,
    limit: u32,
    delay: Duration,
}

impl PageCursor {
    pub fn new(limit: u32) -> Self {
        Self::starting_at(0, limit)
    }

    pub fn starting_at(offset: u32, limit: u32) -> Self {
        Self {
            offset,
            limit,
            delay: RATE_LIMIT_DELAY,
        }
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Move to the next page. Returns false when the walk is done; otherwise
    /// sleeps for the inter-page delay before returning true.
    pub async fn advance(&mut self, has_next: bool) -> bool {
        if !has_next {
            return false;
        }

        self.offset += self.limit;
        sleep(self.delay).await;

        true
    }
}
