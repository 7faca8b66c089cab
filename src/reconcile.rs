//! Catalog fetch reconciliation
//!
//! Keeps [`FetchState`] a consistent projection of the paginated, filtered
//! page results that arrive in response to user actions. Nothing in here
//! performs I/O: requests are described as [`CatalogQuery`] values and their
//! results are fed back through [`FetchState::on_fetch_resolved`] and
//! [`FetchState::on_fetch_rejected`].

use std::collections::{BTreeSet, HashSet};

use crate::state::{CatalogFilter, CatalogItem, CatalogQuery, FetchState, FetchStatus};

/// Outcome of [`FetchState::request_page`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageRequest {
    /// Perform this request; status is now `Loading`.
    Issue(CatalogQuery),
    /// A short page was already seen for this filter. No request, no change.
    Exhausted,
}

/// Outcome of [`FetchState::on_fetch_resolved`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    Replaced { count: usize },
    Appended { added: usize },
    /// Empty page: the list is kept as is.
    Unchanged,
    /// The result was requested for a filter that is no longer current.
    Stale,
}

impl FetchState {
    pub fn new(limit: u32) -> Self {
        Self {
            items: Vec::new(),
            status: FetchStatus::Idle,
            error: None,
            page: 1,
            limit: limit.max(1),
            filter: CatalogFilter::default(),
            resolved_filter: None,
            all_loaded: false,
        }
    }

    pub fn search_term(&self) -> Option<&str> {
        self.filter.search_term.as_deref()
    }

    pub fn selected_type_filters(&self) -> &BTreeSet<u32> {
        &self.filter.type_ids
    }

    /// Whether a "load more" intent should produce a request at all.
    pub fn can_load_more(&self) -> bool {
        !self.status.is_loading() && !self.all_loaded
    }

    /// Page a "load more" intent asks for. Page 1 until the current filter
    /// has resolved at least once.
    pub fn next_page(&self) -> u32 {
        if self.resolved_filter.as_ref() == Some(&self.filter) {
            self.page + 1
        } else {
            1
        }
    }

    /// Describe the request for `page` under `filter`.
    ///
    /// A filter different from the current one becomes current, as if
    /// [`set_filter`](Self::set_filter) had been called first.
    pub fn request_page(&mut self, page: u32, filter: CatalogFilter) -> PageRequest {
        let page = page.max(1);
        let filter = filter.normalized();
        if filter != self.filter {
            self.set_filter(filter.clone());
        }

        let same_filter = self.resolved_filter.as_ref() == Some(&filter);
        let needed = u64::from(page - 1) * u64::from(self.limit);
        if page > 1 && same_filter && (self.items.len() as u64) < needed {
            return PageRequest::Exhausted;
        }

        self.status = FetchStatus::Loading;
        PageRequest::Issue(CatalogQuery {
            page,
            limit: self.limit,
            filter,
        })
    }

    /// Apply a page result.
    pub fn on_fetch_resolved(
        &mut self,
        query: CatalogQuery,
        items: Vec<CatalogItem>,
    ) -> Reconciliation {
        if query.filter != self.filter {
            return Reconciliation::Stale;
        }

        let new_filter = self.resolved_filter.as_ref() != Some(&query.filter);
        let outcome = if items.is_empty() {
            Reconciliation::Unchanged
        } else if new_filter || query.page <= 1 {
            self.items = dedup_by_id(items);
            Reconciliation::Replaced {
                count: self.items.len(),
            }
        } else {
            let mut seen: HashSet<u32> = self.items.iter().map(|item| item.id).collect();
            let before = self.items.len();
            self.items
                .extend(items.into_iter().filter(|item| seen.insert(item.id)));
            Reconciliation::Appended {
                added: self.items.len() - before,
            }
        };

        self.limit = query.limit.max(1);
        self.page = query.page.max(1);
        self.filter = query.filter.clone();
        self.resolved_filter = Some(query.filter);
        self.status = FetchStatus::Succeeded;
        self.error = None;
        let full = u64::from(self.page) * u64::from(self.limit);
        self.all_loaded =
            outcome == Reconciliation::Unchanged || (self.items.len() as u64) < full;

        outcome
    }

    /// Record a failed request. Returns `false` when the failure belongs to
    /// a filter that is no longer current and was ignored.
    pub fn on_fetch_rejected(&mut self, query: &CatalogQuery, error: impl Into<String>) -> bool {
        if query.filter != self.filter {
            return false;
        }
        self.status = FetchStatus::Failed;
        self.error = Some(error.into());
        true
    }

    /// Switch to a new search term / type selection. The next page 1 result
    /// replaces the list.
    pub fn set_filter(&mut self, filter: CatalogFilter) {
        self.filter = filter.normalized();
        self.page = 1;
        self.all_loaded = false;
    }
}

/// Keep the first occurrence of every id, in order.
fn dedup_by_id(items: Vec<CatalogItem>) -> Vec<CatalogItem> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(id: u32) -> CatalogItem {
        CatalogItem {
            id,
            pokedex_id: id,
            name: format!("item-{id}"),
            ..Default::default()
        }
    }

    fn items(ids: impl IntoIterator<Item = u32>) -> Vec<CatalogItem> {
        ids.into_iter().map(item).collect()
    }

    fn ids(state: &FetchState) -> Vec<u32> {
        state.items.iter().map(|item| item.id).collect()
    }

    fn search(term: &str) -> CatalogFilter {
        CatalogFilter::new(Some(term.to_string()), BTreeSet::new())
    }

    fn issue(state: &mut FetchState, page: u32, filter: CatalogFilter) -> CatalogQuery {
        match state.request_page(page, filter) {
            PageRequest::Issue(query) => query,
            PageRequest::Exhausted => panic!("expected a request for page {page}"),
        }
    }

    #[test]
    fn test_request_sets_loading() {
        let mut state = FetchState::new(50);
        let query = issue(&mut state, 1, CatalogFilter::default());

        assert_eq!(state.status, FetchStatus::Loading);
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 50);
    }

    #[test]
    fn test_append_on_next_page_skips_duplicates() {
        let mut state = FetchState::new(2);
        let q1 = issue(&mut state, 1, CatalogFilter::default());
        state.on_fetch_resolved(q1, items([1, 2]));

        let q2 = issue(&mut state, 2, CatalogFilter::default());
        let outcome = state.on_fetch_resolved(q2, items([2, 3]));

        assert_eq!(outcome, Reconciliation::Appended { added: 1 });
        assert_eq!(ids(&state), vec![1, 2, 3]);
        assert_eq!(state.page, 2);
    }

    #[test]
    fn test_replace_on_new_filter() {
        let mut state = FetchState::new(50);
        let q = issue(&mut state, 1, search("a"));
        state.on_fetch_resolved(q, items([1, 2, 3]));

        state.set_filter(search("b"));
        let q = issue(&mut state, 1, search("b"));
        let outcome = state.on_fetch_resolved(q, items([7, 8]));

        assert_eq!(outcome, Reconciliation::Replaced { count: 2 });
        assert_eq!(ids(&state), vec![7, 8]);
        assert_eq!(state.search_term(), Some("b"));
    }

    #[test]
    fn test_replace_dedups_within_page() {
        let mut state = FetchState::new(50);
        let q = issue(&mut state, 1, CatalogFilter::default());
        state.on_fetch_resolved(q, items([4, 4, 5, 4]));

        assert_eq!(ids(&state), vec![4, 5]);
    }

    #[test]
    fn test_page_one_same_filter_replaces() {
        let mut state = FetchState::new(2);
        let q = issue(&mut state, 1, CatalogFilter::default());
        state.on_fetch_resolved(q, items([1, 2]));
        let q = issue(&mut state, 2, CatalogFilter::default());
        state.on_fetch_resolved(q, items([3, 4]));

        let q = issue(&mut state, 1, CatalogFilter::default());
        state.on_fetch_resolved(q, items([9, 1]));

        assert_eq!(ids(&state), vec![9, 1]);
    }

    #[test]
    fn test_empty_page_keeps_items() {
        let mut state = FetchState::new(2);
        let q = issue(&mut state, 1, CatalogFilter::default());
        state.on_fetch_resolved(q, items([1, 2]));

        let q = issue(&mut state, 2, CatalogFilter::default());
        let outcome = state.on_fetch_resolved(q, Vec::new());

        assert_eq!(outcome, Reconciliation::Unchanged);
        assert_eq!(ids(&state), vec![1, 2]);
        assert_eq!(state.status, FetchStatus::Succeeded);
        assert!(state.all_loaded);
    }

    #[test]
    fn test_empty_page_for_new_filter_keeps_items() {
        let mut state = FetchState::new(50);
        let q = issue(&mut state, 1, CatalogFilter::default());
        state.on_fetch_resolved(q, items([1, 2]));

        let q = issue(&mut state, 1, search("zzz"));
        state.on_fetch_resolved(q, Vec::new());

        assert_eq!(ids(&state), vec![1, 2]);
    }

    #[test]
    fn test_exhaustion_inferred_from_short_page() {
        let mut state = FetchState::new(50);
        let q = issue(&mut state, 1, CatalogFilter::default());
        state.on_fetch_resolved(q, items(1..=37));
        assert!(state.all_loaded);

        let mut state = FetchState::new(50);
        let q = issue(&mut state, 1, CatalogFilter::default());
        state.on_fetch_resolved(q, items(1..=50));
        assert!(!state.all_loaded);
    }

    #[test]
    fn test_short_circuit_after_short_page() {
        let mut state = FetchState::new(50);
        let q = issue(&mut state, 1, CatalogFilter::default());
        state.on_fetch_resolved(q, items(1..=37));

        let request = state.request_page(3, CatalogFilter::default());

        assert_eq!(request, PageRequest::Exhausted);
        assert_eq!(state.status, FetchStatus::Succeeded);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_no_short_circuit_for_new_filter() {
        let mut state = FetchState::new(50);
        let q = issue(&mut state, 1, CatalogFilter::default());
        state.on_fetch_resolved(q, items(1..=3));

        let request = state.request_page(2, search("x"));

        assert!(matches!(request, PageRequest::Issue(_)));
    }

    #[test]
    fn test_set_filter_resets_cursor() {
        let mut state = FetchState::new(2);
        let q = issue(&mut state, 1, CatalogFilter::default());
        state.on_fetch_resolved(q, items([1]));
        state.page = 4;
        assert!(state.all_loaded);

        state.set_filter(search("char"));

        assert_eq!(state.page, 1);
        assert!(!state.all_loaded);
        assert_eq!(state.search_term(), Some("char"));
    }

    #[test]
    fn test_stale_response_discarded() {
        let mut state = FetchState::new(50);
        let bulba = issue(&mut state, 1, search("bulba"));

        state.set_filter(search("char"));
        let char_query = issue(&mut state, 1, search("char"));

        let outcome = state.on_fetch_resolved(bulba, items([1, 2, 3]));
        assert_eq!(outcome, Reconciliation::Stale);
        assert!(state.items.is_empty());
        assert_eq!(state.status, FetchStatus::Loading);

        state.on_fetch_resolved(char_query, items([4, 5, 6]));
        assert_eq!(ids(&state), vec![4, 5, 6]);
    }

    #[test]
    fn test_rejection_keeps_items() {
        let mut state = FetchState::new(2);
        let q = issue(&mut state, 1, CatalogFilter::default());
        state.on_fetch_resolved(q, items([1, 2]));

        let q = issue(&mut state, 2, CatalogFilter::default());
        assert!(state.on_fetch_rejected(&q, "connection refused"));

        assert_eq!(state.status, FetchStatus::Failed);
        assert_eq!(state.error.as_deref(), Some("connection refused"));
        assert_eq!(ids(&state), vec![1, 2]);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_next_page_restarts_after_failed_filter_page() {
        let mut state = FetchState::new(3);
        let q = issue(&mut state, 1, CatalogFilter::default());
        state.on_fetch_resolved(q, items([1, 2, 3]));
        assert_eq!(state.next_page(), 2);

        let q = issue(&mut state, 1, search("char"));
        state.on_fetch_rejected(&q, "timeout");

        assert_eq!(state.next_page(), 1);
        assert_eq!(ids(&state), vec![1, 2, 3]);
    }

    #[test]
    fn test_stale_rejection_ignored() {
        let mut state = FetchState::new(50);
        let old = issue(&mut state, 1, search("old"));
        issue(&mut state, 1, search("new"));

        assert!(!state.on_fetch_rejected(&old, "timeout"));
        assert_eq!(state.status, FetchStatus::Loading);
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_ids_stay_unique_across_sequences() {
        let mut state = FetchState::new(3);
        let pages = [vec![1, 2, 3], vec![3, 4, 1], vec![5, 2, 6], vec![6, 6, 7]];
        for (index, page_ids) in pages.into_iter().enumerate() {
            // request_page would stop at page 3 once page 2 comes back short
            let q = CatalogQuery {
                page: index as u32 + 1,
                limit: 3,
                filter: CatalogFilter::default(),
            };
            state.on_fetch_resolved(q, items(page_ids));

            let unique: HashSet<u32> = ids(&state).into_iter().collect();
            assert_eq!(unique.len(), state.items.len());
        }
        assert_eq!(ids(&state), vec![1, 2, 3, 4, 5, 6, 7]);
    }
}
