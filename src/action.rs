//! Actions: user intents and async results

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::{CatalogItem, CatalogQuery, TypeTag};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    /// Load type tags and the first page
    Init,

    // ===== Catalog category =====
    /// Intent: next page (scroll proximity or explicit)
    CatalogLoadMore,

    /// Intent: reload page 1 for the current filter
    CatalogRefresh,

    /// Move the list selection to an index
    CatalogSelect(usize),

    /// Move the list selection by a delta (mouse wheel)
    CatalogMove(i16),

    /// Result: a page arrived for `query`
    CatalogDidLoad {
        query: CatalogQuery,
        items: Vec<CatalogItem>,
    },

    /// Result: the page request for `query` failed
    CatalogDidError { query: CatalogQuery, error: String },

    // ===== Search category =====
    SearchOpen,

    SearchClose,

    /// Search box text changed (debounced before it applies)
    SearchQueryChange(String),

    /// Enter in the search box: apply now
    SearchSubmit(String),

    /// The debounce window elapsed for this text
    SearchCommit(String),

    // ===== Filter category =====
    /// Drop search term and type selection
    FilterClear,

    // ===== Types category =====
    TypesDidLoad(Vec<TypeTag>),

    TypesDidError(String),

    // ===== TypePicker category =====
    TypePickerOpen,

    TypePickerClose,

    TypePickerSelect(usize),

    /// Toggle a type id in the filter
    TypePickerToggle(u32),

    TypePickerClear,

    // ===== Detail category =====
    /// Open the detail view for the selected list entry
    DetailOpen,

    DetailClose,

    DetailDidLoad { id: u32, item: CatalogItem },

    DetailDidError { id: u32, error: String },

    // ===== Evolution category =====
    EvolutionSelect(usize),

    /// Open the detail view of the selected evolution
    EvolutionOpen,

    // ===== UI category =====
    /// Switch keyboard focus between list and detail
    UiFocusToggle,

    /// Force a re-render (for cursor movement, etc.)
    Render,

    // ===== Uncategorized (global) =====
    Tick,

    Quit,
}
