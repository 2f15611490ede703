use serde::{Deserialize, Serialize};

/// `?page=N`, 1-based. Missing or zero means the first page.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    #[serde(default)]
    pub(crate) page: Option<i64>,
}

impl PageQuery {
    pub(crate) fn number(&self) -> i64 {
        self.page.filter(|page| *page > 0).unwrap_or(1)
    }

    pub(crate) fn offset(&self, page_size: i64) -> i64 {
        (self.number() - 1).saturating_mul(page_size)
    }
}

/// Page envelope of the REST resources.
#[derive(Debug, Serialize)]
pub(crate) struct Page<T> {
    pub(crate) count: i64,
    pub(crate) next: Option<String>,
    pub(crate) previous: Option<String>,
    pub(crate) results: Vec<T>,
}

impl<T> Page<T> {
    /// `path` is the collection path the `next`/`previous` links point at.
    pub(crate) fn new(
        results: Vec<T>,
        count: i64,
        query: &PageQuery,
        page_size: i64,
        path: &str,
    ) -> Self {
        let page = query.number();
        let has_next = page.saturating_mul(page_size) < count;
        Self {
            count,
            next: has_next.then(|| format!("{path}?page={}", page + 1)),
            previous: (page > 1).then(|| match page - 1 {
                1 => path.to_string(),
                previous => format!("{path}?page={previous}"),
            }),
            results,
        }
    }
}
