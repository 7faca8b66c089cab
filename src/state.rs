//! Application state - single source of truth

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use tui_dispatch::DataResource;

/// Page size requested from the backend unless configured otherwise.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Rows from the end of the list at which scrolling asks for the next page.
pub const LOAD_MORE_THRESHOLD: usize = 5;

/// Spinner timing for the status bar while a request is in flight.
pub const SPINNER_TICK_MS: u64 = 90;

/// A type facet: used for colouring and as a request filter
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TypeTag {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub image: String,
}

/// Reference from one catalog entry to the entry it evolves into
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Evolution {
    pub name: String,
    pub pokedex_id: u32,
}

/// Base stats. HP and the two special stats exist under two spellings upstream;
/// decoding prefers `HP` and camelCase, then `hp` and snake_case, then zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(rename = "HP")]
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

#[derive(Deserialize)]
struct RawStats {
    #[serde(rename = "HP")]
    hp: Option<u32>,
    #[serde(rename = "hp")]
    hp_lower: Option<u32>,
    attack: Option<u32>,
    defense: Option<u32>,
    #[serde(rename = "specialAttack")]
    special_attack: Option<u32>,
    #[serde(rename = "special_attack")]
    special_attack_snake: Option<u32>,
    #[serde(rename = "specialDefense")]
    special_defense: Option<u32>,
    #[serde(rename = "special_defense")]
    special_defense_snake: Option<u32>,
    speed: Option<u32>,
}

impl<'de> Deserialize<'de> for Stats {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawStats::deserialize(deserializer)?;
        Ok(Stats {
            hp: raw.hp.or(raw.hp_lower).unwrap_or(0),
            attack: raw.attack.unwrap_or(0),
            defense: raw.defense.unwrap_or(0),
            special_attack: raw.special_attack.or(raw.special_attack_snake).unwrap_or(0),
            special_defense: raw
                .special_defense
                .or(raw.special_defense_snake)
                .unwrap_or(0),
            speed: raw.speed.unwrap_or(0),
        })
    }
}

impl Stats {
    /// Label/value pairs in display order.
    pub fn entries(&self) -> [(&'static str, u32); 6] {
        [
            ("HP", self.hp),
            ("ATK", self.attack),
            ("DEF", self.defense),
            ("SAT", self.special_attack),
            ("SDF", self.special_defense),
            ("SPD", self.speed),
        ]
    }

    pub fn total(&self) -> u32 {
        self.entries().iter().map(|(_, value)| value).sum()
    }
}

/// One record of the catalog
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: u32,
    #[serde(default)]
    pub pokedex_id: u32,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub sprite: String,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub generation: u32,
    #[serde(default)]
    pub evolutions: Vec<Evolution>,
    #[serde(default)]
    pub types: Vec<TypeTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abilities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CatalogItem {
    /// Number shown to the user: the dex number when known, else the id.
    pub fn display_number(&self) -> u32 {
        if self.pokedex_id > 0 {
            self.pokedex_id
        } else {
            self.id
        }
    }
}

/// Request lifecycle of the catalog list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl FetchStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchStatus::Loading)
    }
}

/// Search term and type selection sent along with every page request
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct CatalogFilter {
    pub search_term: Option<String>,
    pub type_ids: BTreeSet<u32>,
}

impl CatalogFilter {
    pub fn new(search_term: Option<String>, type_ids: BTreeSet<u32>) -> Self {
        Self {
            search_term,
            type_ids,
        }
        .normalized()
    }

    /// Trim the search term; blank terms mean "no term".
    pub fn normalized(mut self) -> Self {
        self.search_term = self
            .search_term
            .map(|term| term.trim().to_string())
            .filter(|term| !term.is_empty());
        self
    }

    pub fn with_search_term(&self, term: &str) -> Self {
        Self::new(Some(term.to_string()), self.type_ids.clone())
    }

    pub fn with_type_toggled(&self, type_id: u32) -> Self {
        let mut type_ids = self.type_ids.clone();
        if !type_ids.remove(&type_id) {
            type_ids.insert(type_id);
        }
        Self::new(self.search_term.clone(), type_ids)
    }

    pub fn without_types(&self) -> Self {
        Self::new(self.search_term.clone(), BTreeSet::new())
    }

    pub fn is_empty(&self) -> bool {
        self.search_term.is_none() && self.type_ids.is_empty()
    }
}

/// A page request, echoed back with its result so stale results can be
/// recognized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CatalogQuery {
    pub page: u32,
    pub limit: u32,
    pub filter: CatalogFilter,
}

/// The reconciled catalog list plus its pagination cursor
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FetchState {
    /// Arrival order, unique by id
    pub items: Vec<CatalogItem>,
    pub status: FetchStatus,
    pub error: Option<String>,
    /// 1-based
    pub page: u32,
    pub limit: u32,
    /// Filter the next request is made for
    pub filter: CatalogFilter,
    /// Filter of the last successfully applied page
    pub resolved_filter: Option<CatalogFilter>,
    pub all_loaded: bool,
}

impl Default for FetchState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT)
    }
}

/// Which pane receives navigation keys
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum FocusArea {
    #[default]
    List,
    Detail,
}

/// Application state - everything the UI needs to render
#[derive(Clone, Debug, tui_dispatch::DebugState, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppState {
    // --- Catalog ---
    #[debug(section = "Catalog", label = "Status", debug_fmt)]
    pub catalog: FetchState,

    /// Type facets, loaded once per session
    #[debug(section = "Types", label = "Tags", debug_fmt)]
    pub types: DataResource<Vec<TypeTag>>,

    #[debug(section = "Catalog", label = "Selected")]
    pub selected: usize,

    #[debug(section = "Catalog", label = "Focus", debug_fmt)]
    pub focus: FocusArea,

    // --- Detail view ---
    #[debug(section = "Detail", label = "Id", debug_fmt)]
    pub detail_id: Option<u32>,

    #[debug(section = "Detail", label = "Item", debug_fmt)]
    pub detail: DataResource<CatalogItem>,

    #[debug(skip)]
    pub evolution_selected: usize,

    // --- Search overlay ---
    #[debug(skip)]
    pub search_mode: bool,

    /// Text in the search box; may run ahead of the applied filter while
    /// the debounce timer is pending
    #[debug(skip)]
    pub search_input: String,

    // --- Type picker overlay ---
    #[debug(skip)]
    pub type_picker_open: bool,

    #[debug(skip)]
    pub type_cursor: usize,

    #[debug(section = "Catalog", label = "Message", debug_fmt)]
    pub message: Option<String>,

    #[debug(skip)]
    pub tick_count: u32,
}

impl AppState {
    pub fn new(limit: u32) -> Self {
        Self {
            catalog: FetchState::new(limit),
            types: DataResource::Empty,
            selected: 0,
            focus: FocusArea::List,
            detail_id: None,
            detail: DataResource::Empty,
            evolution_selected: 0,
            search_mode: false,
            search_input: String::new(),
            type_picker_open: false,
            type_cursor: 0,
            message: None,
            tick_count: 0,
        }
    }

    pub fn selected_item(&self) -> Option<&CatalogItem> {
        self.catalog.items.get(self.selected)
    }

    pub fn type_list(&self) -> &[TypeTag] {
        self.types.data().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn type_name(&self, id: u32) -> Option<&str> {
        self.type_list()
            .iter()
            .find(|tag| tag.id == id)
            .map(|tag| tag.name.as_str())
    }

    /// Whether the list is close enough to its end to want another page.
    pub fn near_list_end(&self) -> bool {
        let len = self.catalog.items.len();
        len == 0 || self.selected + LOAD_MORE_THRESHOLD >= len
    }

    pub fn clamp_selection(&mut self) {
        let len = self.catalog.items.len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Human readable summary of the active filter.
    pub fn filter_summary(&self) -> String {
        let filter = &self.catalog.filter;
        let mut parts = Vec::new();
        if let Some(term) = &filter.search_term {
            parts.push(format!("name ~ \"{term}\""));
        }
        if !filter.type_ids.is_empty() {
            let names: Vec<String> = filter
                .type_ids
                .iter()
                .map(|id| {
                    self.type_name(*id)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("#{id}"))
                })
                .collect();
            parts.push(format!("types: {}", names.join(", ")));
        }
        if parts.is_empty() {
            "all".to_string()
        } else {
            parts.join("  ")
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT)
    }
}
