//! End-to-end runs against an in-memory catalog backend
//!
//! Effects are executed against `MemoryCatalog` and their results fed back
//! into the store, the same round trip the runtime performs over HTTP.

use std::sync::Mutex;

use async_trait::async_trait;
use dexview::{
    action::Action,
    api::{ApiError, CatalogSource},
    effect::Effect,
    reducer::reducer,
    state::{AppState, CatalogItem, CatalogQuery, Evolution, TypeTag},
};
use pretty_assertions::assert_eq;
use tui_dispatch::EffectStore;

struct MemoryCatalog {
    items: Vec<CatalogItem>,
    types: Vec<TypeTag>,
    fail_pages: Vec<u32>,
    requests: Mutex<Vec<CatalogQuery>>,
}

impl MemoryCatalog {
    fn new(count: u32) -> Self {
        let types = vec![
            TypeTag {
                id: 1,
                name: "Plante".into(),
                image: String::new(),
            },
            TypeTag {
                id: 2,
                name: "Feu".into(),
                image: String::new(),
            },
        ];
        let items = (1..=count)
            .map(|id| CatalogItem {
                id,
                pokedex_id: id,
                name: if id % 2 == 0 {
                    format!("Salameche{id}")
                } else {
                    format!("Bulbizarre{id}")
                },
                types: vec![types[((id + 1) % 2) as usize].clone()],
                ..Default::default()
            })
            .collect();
        Self {
            items,
            types,
            fail_pages: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CatalogSource for MemoryCatalog {
    async fn fetch_page(&self, query: &CatalogQuery) -> Result<Vec<CatalogItem>, ApiError> {
        self.requests.lock().unwrap().push(query.clone());
        if self.fail_pages.contains(&query.page) {
            return Err(ApiError::Status {
                status: 503,
                url: format!("/pokemons?page={}", query.page),
            });
        }
        let term = query.filter.search_term.as_deref().map(str::to_lowercase);
        let matching: Vec<CatalogItem> = self
            .items
            .iter()
            .filter(|item| {
                term.as_ref()
                    .map_or(true, |term| item.name.to_lowercase().contains(term))
            })
            .filter(|item| {
                query.filter.type_ids.is_empty()
                    || item
                        .types
                        .iter()
                        .any(|tag| query.filter.type_ids.contains(&tag.id))
            })
            .cloned()
            .collect();
        let start = ((query.page - 1) * query.limit) as usize;
        Ok(matching
            .into_iter()
            .skip(start)
            .take(query.limit as usize)
            .collect())
    }

    async fn fetch_item(&self, id: u32) -> Result<CatalogItem, ApiError> {
        self.items
            .iter()
            .find(|item| item.display_number() == id)
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                url: format!("/pokemons/{id}"),
            })
    }

    async fn fetch_types(&self) -> Result<Vec<TypeTag>, ApiError> {
        Ok(self.types.clone())
    }
}

/// Run one effect against the backend and return the action it resolves to.
/// Timer effects resolve immediately.
async fn run_effect(source: &MemoryCatalog, effect: Effect) -> Option<Action> {
    match effect {
        Effect::FetchPage { query } => Some(match source.fetch_page(&query).await {
            Ok(items) => Action::CatalogDidLoad { query, items },
            Err(err) => Action::CatalogDidError {
                query,
                error: err.to_string(),
            },
        }),
        Effect::DebounceSearch { query } => Some(Action::SearchCommit(query)),
        Effect::CancelSearch => None,
        Effect::FetchTypes => Some(match source.fetch_types().await {
            Ok(types) => Action::TypesDidLoad(types),
            Err(err) => Action::TypesDidError(err.to_string()),
        }),
        Effect::FetchItem { id } => Some(match source.fetch_item(id).await {
            Ok(item) => Action::DetailDidLoad { id, item },
            Err(err) => Action::DetailDidError {
                id,
                error: err.to_string(),
            },
        }),
    }
}

/// Dispatch `action` and keep resolving effects until the store settles.
async fn settle(
    store: &mut EffectStore<AppState, Action, Effect>,
    source: &MemoryCatalog,
    action: Action,
) {
    let mut pending = vec![action];
    while let Some(action) = pending.pop() {
        let result = store.dispatch(action);
        for effect in result.effects {
            if let Some(next) = run_effect(source, effect).await {
                pending.push(next);
            }
        }
    }
}

fn ids(state: &AppState) -> Vec<u32> {
    state.catalog.items.iter().map(|item| item.id).collect()
}

#[tokio::test]
async fn test_pages_through_whole_catalog() {
    let source = MemoryCatalog::new(25);
    let mut store = EffectStore::new(AppState::new(10), reducer);

    settle(&mut store, &source, Action::Init).await;
    assert_eq!(store.state().catalog.items.len(), 10);
    assert_eq!(store.state().type_list().len(), 2);

    settle(&mut store, &source, Action::CatalogLoadMore).await;
    settle(&mut store, &source, Action::CatalogLoadMore).await;

    let state = store.state();
    assert_eq!(ids(state), (1..=25).collect::<Vec<_>>());
    assert!(state.catalog.all_loaded);
    assert_eq!(state.catalog.page, 3);

    // Complete list: further intents stay local
    let before = source.request_count();
    settle(&mut store, &source, Action::CatalogLoadMore).await;
    assert_eq!(source.request_count(), before);
}

#[tokio::test]
async fn test_search_then_type_filter() {
    let source = MemoryCatalog::new(12);
    let mut store = EffectStore::new(AppState::new(50), reducer);
    settle(&mut store, &source, Action::Init).await;

    settle(&mut store, &source, Action::SearchQueryChange("sala".into())).await;
    let state = store.state();
    assert_eq!(state.catalog.search_term(), Some("sala"));
    assert_eq!(ids(state), vec![2, 4, 6, 8, 10, 12]);

    settle(&mut store, &source, Action::FilterClear).await;
    settle(&mut store, &source, Action::TypePickerToggle(1)).await;
    let state = store.state();
    assert_eq!(ids(state), vec![1, 3, 5, 7, 9, 11]);
    assert!(state.catalog.all_loaded);
}

#[tokio::test]
async fn test_failed_page_keeps_list_and_retries() {
    let mut source = MemoryCatalog::new(30);
    source.fail_pages = vec![2];
    let mut store = EffectStore::new(AppState::new(10), reducer);
    settle(&mut store, &source, Action::Init).await;

    settle(&mut store, &source, Action::CatalogLoadMore).await;
    let state = store.state();
    assert_eq!(state.catalog.items.len(), 10);
    assert!(state.catalog.error.as_deref().is_some_and(|e| e.contains("503")));

    source.fail_pages.clear();
    settle(&mut store, &source, Action::CatalogLoadMore).await;
    assert_eq!(store.state().catalog.items.len(), 20);
    assert_eq!(store.state().catalog.error, None);
}

#[tokio::test]
async fn test_failed_search_keeps_list_then_recovers() {
    let mut source = MemoryCatalog::new(30);
    let mut store = EffectStore::new(AppState::new(5), reducer);
    settle(&mut store, &source, Action::Init).await;
    assert_eq!(ids(store.state()), vec![1, 2, 3, 4, 5]);

    source.fail_pages = vec![1];
    settle(&mut store, &source, Action::SearchSubmit("sala".into())).await;
    let state = store.state();
    assert_eq!(ids(state), vec![1, 2, 3, 4, 5]);
    assert_eq!(state.catalog.search_term(), Some("sala"));
    assert!(state.catalog.error.is_some());

    source.fail_pages.clear();
    settle(&mut store, &source, Action::CatalogLoadMore).await;
    assert_eq!(ids(store.state()), vec![2, 4, 6, 8, 10]);

    settle(&mut store, &source, Action::CatalogLoadMore).await;
    assert_eq!(ids(store.state()), vec![2, 4, 6, 8, 10, 12, 14, 16, 18, 20]);
}

#[tokio::test]
async fn test_detail_and_evolution_lookup() {
    let mut source = MemoryCatalog::new(3);
    for item in &mut source.items {
        item.id += 100;
    }
    source.items[0].evolutions = vec![Evolution {
        name: "Entry3".into(),
        pokedex_id: 3,
    }];
    let mut store = EffectStore::new(AppState::new(10), reducer);
    settle(&mut store, &source, Action::Init).await;

    settle(&mut store, &source, Action::DetailOpen).await;
    assert_eq!(store.state().detail_id, Some(1));
    assert_eq!(store.state().detail.data().map(|item| item.id), Some(101));

    settle(&mut store, &source, Action::EvolutionOpen).await;
    assert_eq!(store.state().detail_id, Some(3));
    assert_eq!(store.state().detail.data().map(|item| item.id), Some(103));
}
