//! Effects - side effects declared by the reducer

use crate::state::CatalogQuery;

/// Side effects that can be triggered by actions
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Fetch one catalog page
    FetchPage { query: CatalogQuery },
    /// Restart the search quiet-period timer for this input text
    DebounceSearch { query: String },
    /// Drop a pending search timer
    CancelSearch,
    /// Fetch the type tags
    FetchTypes,
    /// Fetch a single record for the detail view
    FetchItem { id: u32 },
}
