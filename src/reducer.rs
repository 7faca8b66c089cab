//! Reducer - pure function: (state, action) -> DispatchResult

use tracing::debug;
use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::effect::Effect;
use crate::reconcile::{PageRequest, Reconciliation};
use crate::state::{AppState, CatalogFilter, FocusArea};

/// The reducer handles all state transitions
pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            let mut effects = Vec::new();
            if !state.types.is_loaded() {
                state.types = DataResource::Loading;
                effects.push(Effect::FetchTypes);
            }
            let filter = state.catalog.filter.clone();
            effects.extend(request_page(state, 1, filter));
            DispatchResult::changed_with_many(effects)
        }

        // ===== Catalog actions =====
        Action::CatalogLoadMore => match load_more(state) {
            Some(effect) => DispatchResult::changed_with(effect),
            None => DispatchResult::unchanged(),
        },

        Action::CatalogRefresh => {
            let filter = state.catalog.filter.clone();
            match request_page(state, 1, filter) {
                Some(effect) => DispatchResult::changed_with(effect),
                None => DispatchResult::unchanged(),
            }
        }

        Action::CatalogSelect(index) => select(state, index),

        Action::CatalogMove(delta) => {
            let last = state.catalog.items.len().saturating_sub(1) as i64;
            let index = (state.selected as i64 + i64::from(delta)).clamp(0, last);
            select(state, index as usize)
        }

        Action::CatalogDidLoad { query, items } => {
            let page = query.page;
            match state.catalog.on_fetch_resolved(query, items) {
                Reconciliation::Stale => {
                    debug!(page, "discarding page for a superseded filter");
                    return DispatchResult::unchanged();
                }
                Reconciliation::Replaced { count } => {
                    debug!(page, count, "catalog replaced");
                    state.selected = 0;
                }
                Reconciliation::Appended { added } => {
                    debug!(page, added, "catalog appended");
                }
                Reconciliation::Unchanged => {
                    debug!(page, "empty page");
                    if page == 1 {
                        state.message = Some(format!("No matches for {}", state.filter_summary()));
                    }
                }
            }
            state.clamp_selection();
            DispatchResult::changed()
        }

        Action::CatalogDidError { query, error } => {
            if state.catalog.on_fetch_rejected(&query, error.clone()) {
                state.message = Some(format!("Catalog error: {error}"));
                DispatchResult::changed()
            } else {
                debug!(page = query.page, "discarding error for a superseded filter");
                DispatchResult::unchanged()
            }
        }

        // ===== Search actions =====
        Action::SearchOpen => {
            state.search_mode = true;
            state.search_input = state.catalog.search_term().unwrap_or_default().to_string();
            DispatchResult::changed()
        }

        Action::SearchClose => {
            state.search_mode = false;
            state.search_input = state.catalog.search_term().unwrap_or_default().to_string();
            DispatchResult::changed_with(Effect::CancelSearch)
        }

        Action::SearchQueryChange(query) => {
            state.search_input = query;
            DispatchResult::changed_with(Effect::DebounceSearch {
                query: state.search_input.clone(),
            })
        }

        Action::SearchSubmit(query) => {
            state.search_mode = false;
            state.search_input = query.trim().to_string();
            let filter = state.catalog.filter.with_search_term(&query);
            let mut effects = vec![Effect::CancelSearch];
            effects.extend(apply_filter(state, filter));
            DispatchResult::changed_with_many(effects)
        }

        Action::SearchCommit(query) => {
            let filter = state.catalog.filter.with_search_term(&query);
            match apply_filter(state, filter) {
                Some(effect) => DispatchResult::changed_with(effect),
                None => DispatchResult::unchanged(),
            }
        }

        // ===== Filter actions =====
        Action::FilterClear => {
            state.search_input.clear();
            match apply_filter(state, CatalogFilter::default()) {
                Some(effect) => DispatchResult::changed_with(effect),
                None => DispatchResult::unchanged(),
            }
        }

        // ===== Types actions =====
        Action::TypesDidLoad(types) => {
            state.types = DataResource::Loaded(types);
            state.type_cursor = state.type_cursor.min(state.type_list().len().saturating_sub(1));
            DispatchResult::changed()
        }

        Action::TypesDidError(error) => {
            state.message = Some(format!("Type error: {error}"));
            state.types = DataResource::Failed(error);
            DispatchResult::changed()
        }

        // ===== Type picker actions =====
        Action::TypePickerOpen => {
            state.type_picker_open = true;
            if state.types.is_failed() || state.types.is_empty() {
                state.types = DataResource::Loading;
                return DispatchResult::changed_with(Effect::FetchTypes);
            }
            DispatchResult::changed()
        }

        Action::TypePickerClose => {
            state.type_picker_open = false;
            DispatchResult::changed()
        }

        Action::TypePickerSelect(index) => {
            if index < state.type_list().len() && index != state.type_cursor {
                state.type_cursor = index;
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::TypePickerToggle(type_id) => {
            let filter = state.catalog.filter.with_type_toggled(type_id);
            match apply_filter(state, filter) {
                Some(effect) => DispatchResult::changed_with(effect),
                None => DispatchResult::changed(),
            }
        }

        Action::TypePickerClear => {
            let filter = state.catalog.filter.without_types();
            match apply_filter(state, filter) {
                Some(effect) => DispatchResult::changed_with(effect),
                None => DispatchResult::unchanged(),
            }
        }

        // ===== Detail actions =====
        Action::DetailOpen => {
            let Some(id) = state.selected_item().map(|item| item.display_number()) else {
                return DispatchResult::unchanged();
            };
            open_detail(state, id)
        }

        Action::DetailClose => {
            if state.detail_id.is_none() {
                return DispatchResult::unchanged();
            }
            state.detail_id = None;
            state.detail = DataResource::Empty;
            state.evolution_selected = 0;
            state.focus = FocusArea::List;
            DispatchResult::changed()
        }

        Action::DetailDidLoad { id, item } => {
            if state.detail_id != Some(id) {
                return DispatchResult::unchanged();
            }
            state.detail = DataResource::Loaded(item);
            DispatchResult::changed()
        }

        Action::DetailDidError { id, error } => {
            if state.detail_id != Some(id) {
                return DispatchResult::unchanged();
            }
            state.detail = DataResource::Failed(error);
            DispatchResult::changed()
        }

        // ===== Evolution actions =====
        Action::EvolutionSelect(index) => {
            let count = state
                .detail
                .data()
                .map(|item| item.evolutions.len())
                .unwrap_or(0);
            if index < count && index != state.evolution_selected {
                state.evolution_selected = index;
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::EvolutionOpen => {
            let target = state
                .detail
                .data()
                .and_then(|item| item.evolutions.get(state.evolution_selected))
                .map(|evolution| evolution.pokedex_id);
            match target {
                Some(id) => open_detail(state, id),
                None => DispatchResult::unchanged(),
            }
        }

        // ===== UI actions =====
        Action::UiFocusToggle => {
            if state.detail_id.is_none() {
                return DispatchResult::unchanged();
            }
            state.focus = match state.focus {
                FocusArea::List => FocusArea::Detail,
                FocusArea::Detail => FocusArea::List,
            };
            DispatchResult::changed()
        }

        Action::Render => DispatchResult::changed(),

        // ===== Global actions =====
        Action::Tick => {
            if state.catalog.status.is_loading() || state.detail.is_loading() {
                state.tick_count = state.tick_count.wrapping_add(1);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn request_page(state: &mut AppState, page: u32, filter: CatalogFilter) -> Option<Effect> {
    match state.catalog.request_page(page, filter) {
        PageRequest::Issue(query) => {
            state.message = None;
            Some(Effect::FetchPage { query })
        }
        PageRequest::Exhausted => {
            debug!(page, "no further pages for this filter");
            None
        }
    }
}

/// Next page, unless one is in flight or the list is known to be complete.
fn load_more(state: &mut AppState) -> Option<Effect> {
    if !state.catalog.can_load_more() {
        return None;
    }
    let next = state.catalog.next_page();
    let filter = state.catalog.filter.clone();
    request_page(state, next, filter)
}

/// Make `filter` current and ask for its first page. `None` when the filter
/// is already current.
fn apply_filter(state: &mut AppState, filter: CatalogFilter) -> Option<Effect> {
    let filter = filter.normalized();
    if filter == state.catalog.filter {
        return None;
    }
    state.catalog.set_filter(filter.clone());
    state.selected = 0;
    request_page(state, 1, filter)
}

fn select(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    if index >= state.catalog.items.len() || index == state.selected {
        return DispatchResult::unchanged();
    }
    state.selected = index;
    if state.near_list_end() {
        if let Some(effect) = load_more(state) {
            return DispatchResult::changed_with(effect);
        }
    }
    DispatchResult::changed()
}

fn open_detail(state: &mut AppState, id: u32) -> DispatchResult<Effect> {
    state.detail_id = Some(id);
    state.detail = DataResource::Loading;
    state.evolution_selected = 0;
    state.focus = FocusArea::Detail;
    DispatchResult::changed_with(Effect::FetchItem { id })
}
