/// Pagination engine
///
/// Computes page boundaries and the windowed list of page links shown under
/// every index page. Everything here is a pure function of its inputs.
///
/// # Link window
///
/// The first page, the last page and every page within two of the current one
/// get a link. Each run of skipped pages collapses into one `...` marker, so
/// there is at most one marker on each side of the current page.
///
/// ```text
/// total = 100, per_page = 10, page = 5
///
/// « Previous  1  ...  3  4  [5]  6  7  ...  10  Next »
/// ```
///
/// # Example
///
/// ```
/// use pingcrm_shared::query::pagination::paginate;
///
/// let page = paginate(vec!["a", "b"], 12, 2, 10, "/contacts");
///
/// assert_eq!(page.meta.last_page, 2);
/// assert_eq!(page.meta.from, 11);
/// assert_eq!(page.meta.to, 12);
/// assert_eq!(page.meta.links[0].url.as_deref(), Some("/contacts?page=1"));
/// ```

use serde::{Deserialize, Serialize};

/// Rows per page on every list
pub const PER_PAGE: u64 = 10;

/// Label of the link to the previous page
pub const PREVIOUS_LABEL: &str = "&laquo; Previous";

/// Label of the link to the next page
pub const NEXT_LABEL: &str = "Next &raquo;";

/// Label of a collapsed run of pages
pub const ELLIPSIS_LABEL: &str = "...";

/// One entry of the pagination link list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationLink {
    /// Target URL, `None` for disabled entries and ellipsis markers
    pub url: Option<String>,

    pub label: String,

    /// True only on the current page's link
    pub active: bool,
}

impl PaginationLink {
    fn page(base_url: &str, page: u64, active: bool) -> Self {
        Self {
            url: Some(page_url(base_url, page)),
            label: page.to_string(),
            active,
        }
    }

    fn ellipsis() -> Self {
        Self {
            url: None,
            label: ELLIPSIS_LABEL.to_string(),
            active: false,
        }
    }

    fn nav(label: &str, url: Option<String>) -> Self {
        Self {
            url,
            label: label.to_string(),
            active: false,
        }
    }

    pub fn is_ellipsis(&self) -> bool {
        self.url.is_none() && self.label == ELLIPSIS_LABEL
    }
}

/// Navigation metadata of one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub links: Vec<PaginationLink>,
    pub current_page: u64,

    /// 1-based index of the first row on this page, 0 when the page is empty
    pub from: u64,

    pub last_page: u64,
    pub per_page: u64,

    /// 1-based index of the last row on this page, 0 when the page is empty
    pub to: u64,

    pub total: u64,
}

/// A page of rows plus its navigation metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    /// Converts every row, keeping the metadata
    pub fn map<U, F>(self, f: F) -> Paginated<U>
    where
        F: FnMut(T) -> U,
    {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

/// Number of pages needed for `total` rows
pub fn last_page(total: u64, per_page: u64) -> u64 {
    total.div_ceil(per_page)
}

/// Offset of the first row of `page`
pub fn offset(page: u64, per_page: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(per_page)
}

/// Computes the metadata of `page`
///
/// `page` is 1-based and `per_page` must be at least 1.
pub fn page_meta(total: u64, page: u64, per_page: u64, base_url: &str) -> PageMeta {
    let last_page = last_page(total, per_page);
    let first_row = offset(page, per_page);

    let (from, to) = if first_row < total {
        (first_row + 1, page.saturating_mul(per_page).min(total))
    } else {
        (0, 0)
    };

    PageMeta {
        links: build_links(page, last_page, base_url),
        current_page: page,
        from,
        last_page,
        per_page,
        to,
        total,
    }
}

/// Wraps already-fetched rows of `page` in the pagination envelope
pub fn paginate<T>(
    data: Vec<T>,
    total: u64,
    page: u64,
    per_page: u64,
    base_url: &str,
) -> Paginated<T> {
    Paginated {
        data,
        meta: page_meta(total, page, per_page, base_url),
    }
}

/// Builds the Previous / pages / Next link list
pub fn build_links(current_page: u64, last_page: u64, base_url: &str) -> Vec<PaginationLink> {
    let mut links = Vec::new();

    let previous = (current_page > 1).then(|| page_url(base_url, current_page - 1));
    links.push(PaginationLink::nav(PREVIOUS_LABEL, previous));

    let mut in_gap = false;
    for page in 1..=last_page {
        let in_window = page.abs_diff(current_page) <= 2;

        if page == 1 || page == last_page || in_window {
            links.push(PaginationLink::page(base_url, page, page == current_page));
            in_gap = false;
        } else if !in_gap {
            links.push(PaginationLink::ellipsis());
            in_gap = true;
        }
    }

    let next = (current_page < last_page).then(|| page_url(base_url, current_page + 1));
    links.push(PaginationLink::nav(NEXT_LABEL, next));

    links
}

/// URL of `page` relative to `base_url`
///
/// Appends with `&` when the base already carries a query string.
pub fn page_url(base_url: &str, page: u64) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}page={page}")
}
