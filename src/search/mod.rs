//! Search and pagination state machine
//!
//! [`SearchState`] owns the query, page, results, loading flag and error
//! message. Every operation that needs the network returns a [`FetchTicket`];
//! the caller runs the request and feeds the outcome back through
//! [`SearchState::complete`]. Each ticket carries a sequence number and only
//! the newest one is applied, so a slow response for an old page can never
//! overwrite a newer one.

mod filter;

pub use filter::Filter;

use crate::api::{FetchError, ImageResult, SearchPage, SearchRequest};

/// Shown for every kind of fetch failure
pub const FETCH_ERROR_MESSAGE: &str = "Error fetching images. Try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDelta {
    Previous,
    Next,
}

/// A request the caller must execute on behalf of the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub request: SearchRequest,
}

/// Result of a ticket, sent back from the fetch task
#[derive(Debug)]
pub struct FetchOutcome {
    pub seq: u64,
    pub result: Result<SearchPage, FetchError>,
}

/// What the screen should show right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View<'a> {
    pub loading: bool,
    /// `None` while loading
    pub results: Option<&'a [ImageResult]>,
    pub show_previous: bool,
    pub show_next: bool,
    pub error: Option<&'a str>,
    pub page: u32,
    pub total_pages: u32,
}

#[derive(Debug)]
pub struct SearchState {
    query: String,
    page: u32,
    total_pages: u32,
    total: u64,
    results: Vec<ImageResult>,
    is_loading: bool,
    error_message: String,
    latest_seq: u64,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            page: 1,
            total_pages: 0,
            total: 0,
            results: Vec::new(),
            is_loading: false,
            error_message: String::new(),
            latest_seq: 0,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Total matches reported by the API for the current query
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn results(&self) -> &[ImageResult] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Initial fetch when the screen first appears
    pub fn mount(&mut self) -> Option<FetchTicket> {
        self.fetch_page()
    }

    /// Start a new search from page 1. Empty terms are ignored.
    pub fn submit_search(&mut self, term: &str) -> Option<FetchTicket> {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }

        self.query = term.to_string();
        self.page = 1;
        self.fetch_page()
    }

    /// Same as submitting the filter's term
    pub fn select_filter(&mut self, filter: Filter) -> Option<FetchTicket> {
        self.submit_search(filter.term())
    }

    /// Move one page back or forward, if that page exists
    pub fn go_to_page(&mut self, delta: PageDelta) -> Option<FetchTicket> {
        match delta {
            PageDelta::Previous if self.has_previous() => self.page -= 1,
            PageDelta::Next if self.has_next() => self.page += 1,
            _ => return None,
        }
        self.fetch_page()
    }

    fn fetch_page(&mut self) -> Option<FetchTicket> {
        if self.query.is_empty() {
            return None;
        }

        self.is_loading = true;
        self.error_message.clear();
        self.latest_seq += 1;

        Some(FetchTicket {
            seq: self.latest_seq,
            request: SearchRequest::new(self.query.clone(), self.page),
        })
    }

    /// Apply a finished fetch. Returns false if the outcome was stale.
    pub fn complete(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.seq != self.latest_seq {
            tracing::debug!(
                seq = outcome.seq,
                latest = self.latest_seq,
                "Discarding superseded fetch result"
            );
            return false;
        }

        match outcome.result {
            Ok(page) => {
                tracing::info!(
                    query = %self.query,
                    page = self.page,
                    results = page.results.len(),
                    total_pages = page.total_pages,
                    "Fetched images"
                );
                self.results = page.results;
                self.total_pages = page.total_pages;
                self.total = page.total;
            }
            Err(e) => {
                tracing::warn!(query = %self.query, page = self.page, "Image fetch failed: {}", e);
                self.error_message = FETCH_ERROR_MESSAGE.to_string();
            }
        }
        self.is_loading = false;
        true
    }

    pub fn view(&self) -> View<'_> {
        View {
            loading: self.is_loading,
            results: (!self.is_loading).then_some(self.results.as_slice()),
            show_previous: !self.is_loading && self.has_previous(),
            show_next: !self.is_loading && self.has_next(),
            error: (!self.error_message().is_empty()).then_some(self.error_message()),
            page: self.page,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: &str) -> ImageResult {
        ImageResult {
            id: id.to_string(),
            thumbnail_url: format!("https://images.example.com/{}?w=400", id),
            alt_description: Some(format!("photo {}", id)),
            author: None,
            link: None,
        }
    }

    fn page_of(ids: &[&str], total_pages: u32) -> SearchPage {
        SearchPage {
            results: ids.iter().map(|id| image(id)).collect(),
            total_pages,
            total: total_pages as u64 * 20,
        }
    }

    fn succeed(state: &mut SearchState, ticket: FetchTicket, page: SearchPage) {
        assert!(state.complete(FetchOutcome {
            seq: ticket.seq,
            result: Ok(page),
        }));
    }

    fn network_error() -> FetchError {
        FetchError::Transport("connection refused".to_string())
    }

    /// State sitting on `page` of `total_pages` for "cats"
    fn state_on_page(page: u32, total_pages: u32) -> SearchState {
        let mut state = SearchState::new();
        let ticket = state.submit_search("cats").unwrap();
        succeed(&mut state, ticket, page_of(&["p1a", "p1b"], total_pages));
        while state.page() < page {
            let ticket = state.go_to_page(PageDelta::Next).unwrap();
            let id = format!("p{}", state.page());
            succeed(&mut state, ticket, page_of(&[id.as_str()], total_pages));
        }
        state
    }

    #[test]
    fn test_initial_state() {
        let state = SearchState::new();
        assert_eq!(state.page(), 1);
        assert_eq!(state.total_pages(), 0);
        assert!(state.results().is_empty());
        assert!(!state.is_loading());
        assert!(state.error_message().is_empty());
    }

    #[test]
    fn test_mount_with_empty_query_is_noop() {
        let mut state = SearchState::new();
        assert!(state.mount().is_none());

        let view = state.view();
        assert!(!view.loading);
        assert_eq!(view.results, Some(&[][..]));
        assert!(!view.show_previous);
        assert!(!view.show_next);
        assert!(view.error.is_none());
    }

    #[test]
    fn test_submit_resets_to_first_page() {
        let mut state = state_on_page(3, 5);
        assert_eq!(state.page(), 3);

        let ticket = state.submit_search("ocean").unwrap();
        assert_eq!(state.page(), 1);
        assert_eq!(ticket.request, SearchRequest::new("ocean", 1));
        assert!(state.is_loading());
    }

    #[test]
    fn test_submit_empty_changes_nothing() {
        let mut state = state_on_page(2, 4);
        let before = state.results().to_vec();

        for empty in ["", "   ", "\t\n"] {
            assert!(state.submit_search(empty).is_none());
            assert!(!state.is_loading());
            assert_eq!(state.results(), before.as_slice());
            assert!(state.error_message().is_empty());
            assert_eq!(state.query(), "cats");
            assert_eq!(state.page(), 2);
        }
    }

    #[test]
    fn test_submit_empty_keeps_error_banner() {
        let mut state = SearchState::new();
        let ticket = state.submit_search("cats").unwrap();
        state.complete(FetchOutcome {
            seq: ticket.seq,
            result: Err(network_error()),
        });

        assert!(state.submit_search("").is_none());
        assert_eq!(state.error_message(), FETCH_ERROR_MESSAGE);
    }

    #[test]
    fn test_success_replaces_results_in_order() {
        let mut state = SearchState::new();
        let ticket = state.submit_search("dogs").unwrap();
        succeed(&mut state, ticket, page_of(&["c", "a", "b"], 3));

        let ids: Vec<&str> = state.results().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
        assert_eq!(state.total_pages(), 3);
        assert!(!state.is_loading());

        let view = state.view();
        assert!(!view.show_previous);
        assert!(view.show_next);
    }

    #[test]
    fn test_single_page_shows_no_pager() {
        let mut state = SearchState::new();
        let ticket = state.submit_search("orca").unwrap();
        succeed(&mut state, ticket, page_of(&["x"], 1));

        let view = state.view();
        assert!(!view.show_previous);
        assert!(!view.show_next);
        assert!(state.go_to_page(PageDelta::Next).is_none());
        assert!(state.go_to_page(PageDelta::Previous).is_none());
    }

    #[test]
    fn test_next_from_page_three_of_five() {
        let mut state = state_on_page(3, 5);

        let ticket = state.go_to_page(PageDelta::Next).unwrap();
        assert_eq!(state.page(), 4);
        assert_eq!(ticket.request, SearchRequest::new("cats", 4));

        succeed(&mut state, ticket, page_of(&["p4"], 5));
        let view = state.view();
        assert!(view.show_previous);
        assert!(view.show_next);
    }

    #[test]
    fn test_previous_stops_at_first_page() {
        let mut state = state_on_page(2, 5);

        let ticket = state.go_to_page(PageDelta::Previous).unwrap();
        assert_eq!(ticket.request.page, 1);
        succeed(&mut state, ticket, page_of(&["p1"], 5));

        assert!(state.go_to_page(PageDelta::Previous).is_none());
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_failure_keeps_previous_results() {
        let mut state = state_on_page(1, 5);
        let ticket = state.go_to_page(PageDelta::Next).unwrap();
        succeed(&mut state, ticket, page_of(&["p2a", "p2b"], 5));
        let before = state.results().to_vec();

        // Page 3 fails
        let ticket = state.go_to_page(PageDelta::Next).unwrap();
        assert!(state.complete(FetchOutcome {
            seq: ticket.seq,
            result: Err(FetchError::Status(500)),
        }));

        assert_eq!(state.error_message(), FETCH_ERROR_MESSAGE);
        assert!(!state.is_loading());
        assert_eq!(state.page(), 3);
        assert_eq!(state.results(), before.as_slice());
        assert_eq!(state.total_pages(), 5);
    }

    #[test]
    fn test_network_error_on_page_two() {
        let mut state = state_on_page(2, 4);
        let before = state.results().to_vec();

        // Refetch the current page
        let ticket = state.fetch_page().unwrap();
        assert_eq!(ticket.request.page, 2);
        state.complete(FetchOutcome {
            seq: ticket.seq,
            result: Err(network_error()),
        });

        assert_eq!(state.error_message(), FETCH_ERROR_MESSAGE);
        assert!(!state.is_loading());
        assert_eq!(state.page(), 2);
        assert_eq!(state.results(), before.as_slice());
    }

    #[test]
    fn test_failure_before_any_success_leaves_empty_results() {
        let mut state = SearchState::new();
        let ticket = state.submit_search("lava").unwrap();
        state.complete(FetchOutcome {
            seq: ticket.seq,
            result: Err(network_error()),
        });

        assert!(state.results().is_empty());
        assert_eq!(state.total_pages(), 0);
        assert_eq!(state.view().error, Some(FETCH_ERROR_MESSAGE));
    }

    #[test]
    fn test_new_fetch_clears_error() {
        let mut state = SearchState::new();
        let ticket = state.submit_search("lava").unwrap();
        state.complete(FetchOutcome {
            seq: ticket.seq,
            result: Err(network_error()),
        });
        assert!(!state.error_message().is_empty());

        state.submit_search("lava").unwrap();
        assert!(state.error_message().is_empty());
        assert!(state.is_loading());
    }

    #[test]
    fn test_filter_matches_typed_search() {
        let mut typed = state_on_page(2, 3);
        let mut clicked = state_on_page(2, 3);

        let typed_ticket = typed.submit_search("cats").unwrap();
        let clicked_ticket = clicked.select_filter(Filter::Cats).unwrap();

        assert_eq!(typed_ticket.request, clicked_ticket.request);
        assert_eq!(typed.page(), 1);
        assert_eq!(clicked.page(), 1);
        assert_eq!(clicked.query(), "cats");
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut state = state_on_page(1, 5);

        let older = state.go_to_page(PageDelta::Next).unwrap();
        let newer = state.go_to_page(PageDelta::Next).unwrap();
        assert_eq!(older.request.page, 2);
        assert_eq!(newer.request.page, 3);

        succeed(&mut state, newer, page_of(&["p3"], 5));
        assert!(!state.complete(FetchOutcome {
            seq: older.seq,
            result: Ok(page_of(&["p2"], 5)),
        }));

        assert_eq!(state.results()[0].id, "p3");
        assert_eq!(state.page(), 3);
    }

    #[test]
    fn test_stale_response_keeps_loading() {
        let mut state = SearchState::new();
        let older = state.submit_search("space").unwrap();
        let _newer = state.select_filter(Filter::Dogs).unwrap();

        assert!(!state.complete(FetchOutcome {
            seq: older.seq,
            result: Err(network_error()),
        }));
        assert!(state.is_loading());
        assert!(state.error_message().is_empty());
    }

    #[test]
    fn test_loading_hides_grid_and_pager_but_not_error() {
        let mut state = state_on_page(2, 5);
        state.error_message = FETCH_ERROR_MESSAGE.to_string();
        state.is_loading = true;

        let view = state.view();
        assert!(view.loading);
        assert!(view.results.is_none());
        assert!(!view.show_previous);
        assert!(!view.show_next);
        assert_eq!(view.error, Some(FETCH_ERROR_MESSAGE));
    }
}
