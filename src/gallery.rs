//! The home-gallery pipeline: list → tag filter → text filter → paginate.
//!
//! Filtering is pure and order-preserving; pagination is a derived view over
//! the filtered list, never stored state that can go stale.

use crate::models::Work;

/// Works shown per page.
pub const PAGE_SIZE: usize = 12;

/// Tag chooser contents when no works are loaded yet. An empty corpus still
/// shows a non-empty chooser.
pub const DEFAULT_TAG_POOL: [&str; 6] = ["Website", "Art", "Cars", "Tech", "Nature", "Animals"];

/// Filter works by an optional active tag and a free-text query.
///
/// Tag filtering is exact set membership; the text query matches the title
/// only, case-insensitively, after trimming. Relative order of the input is
/// preserved.
pub fn filter_works<'a>(works: &'a [Work], active_tag: Option<&str>, query: &str) -> Vec<&'a Work> {
    let query = query.trim().to_lowercase();
    works
        .iter()
        .filter(|w| match active_tag {
            Some(tag) => w.tag_names().any(|n| n == tag),
            None => true,
        })
        .filter(|w| query.is_empty() || w.title.to_lowercase().contains(&query))
        .collect()
}

/// The union of tag names across loaded works, sorted; falls back to
/// [`DEFAULT_TAG_POOL`] when no work carries any tag.
pub fn tag_pool(works: &[Work]) -> Vec<String> {
    let mut names: Vec<String> = works
        .iter()
        .flat_map(Work::tag_names)
        .map(str::to_owned)
        .collect();
    names.sort();
    names.dedup();
    if names.is_empty() {
        return DEFAULT_TAG_POOL.iter().map(|s| (*s).to_owned()).collect();
    }
    names
}

/// Number of pages for a filtered count: `max(1, ceil(n / PAGE_SIZE))`.
pub fn page_count(filtered: usize) -> usize {
    filtered.div_ceil(PAGE_SIZE).max(1)
}

/// Clamp a requested page into `[1, page_count]`.
pub fn clamp_page(page: usize, filtered: usize) -> usize {
    page.clamp(1, page_count(filtered))
}

/// Gallery view state: the loaded works plus the active tag, text query, and
/// page number.
#[derive(Debug, Default)]
pub struct Gallery {
    works: Vec<Work>,
    active_tag: Option<String>,
    query: String,
    page: usize,
}

impl Gallery {
    /// An empty gallery on page 1.
    pub fn new() -> Self {
        Self {
            works: Vec::new(),
            active_tag: None,
            query: String::new(),
            page: 1,
        }
    }

    /// Replace the loaded works. The page clamps itself if the list shrank.
    pub fn set_works(&mut self, works: Vec<Work>) {
        self.works = works;
    }

    /// Select a tag; selecting the active tag again toggles it off. Either
    /// way the view resets to page 1.
    pub fn select_tag(&mut self, tag: &str) {
        if self.active_tag.as_deref() == Some(tag) {
            self.active_tag = None;
        } else {
            self.active_tag = Some(tag.to_owned());
        }
        self.page = 1;
    }

    /// Clear the tag filter and reset to page 1.
    pub fn clear_tag(&mut self) {
        self.active_tag = None;
        self.page = 1;
    }

    /// The active tag, if any.
    pub fn active_tag(&self) -> Option<&str> {
        self.active_tag.as_deref()
    }

    /// Set the free-text query and reset to page 1.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_owned();
        self.page = 1;
    }

    /// The current free-text query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Request a page; out-of-range values clamp.
    pub fn set_page(&mut self, page: usize) {
        self.page = clamp_page(page, self.filtered().len());
    }

    /// Move to the next page, saturating at the last one.
    pub fn next_page(&mut self) {
        self.set_page(self.page().saturating_add(1));
    }

    /// Move to the previous page, saturating at page 1.
    pub fn prev_page(&mut self) {
        self.set_page(self.page().saturating_sub(1));
    }

    /// The effective page number, clamped against the current filtered set.
    pub fn page(&self) -> usize {
        clamp_page(self.page, self.filtered().len())
    }

    /// Total pages for the current filtered set.
    pub fn page_count(&self) -> usize {
        page_count(self.filtered().len())
    }

    /// The full filtered list, original order preserved.
    pub fn filtered(&self) -> Vec<&Work> {
        filter_works(&self.works, self.active_tag.as_deref(), &self.query)
    }

    /// The works visible on the current page.
    pub fn current_page(&self) -> Vec<&Work> {
        let filtered = self.filtered();
        let start = (self.page() - 1) * PAGE_SIZE;
        filtered.into_iter().skip(start).take(PAGE_SIZE).collect()
    }

    /// The tag chooser contents for the loaded works.
    pub fn tag_pool(&self) -> Vec<String> {
        tag_pool(&self.works)
    }
}
