//! Dexview - paginated catalog browser

use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use dexview::action::Action;
use dexview::api::{CatalogSource, HttpCatalog};
use dexview::components::{
    CatalogView, CatalogViewProps, Component, SearchOverlay, SearchOverlayProps, TypePicker,
    TypePickerProps, overlay_area, picker_area,
};
use dexview::config::{
    CatalogConfig, DEFAULT_BASE_URL, DEFAULT_CATALOG_PATH, DEFAULT_DEBOUNCE_MS,
    DEFAULT_TIMEOUT_SECS, DEFAULT_TYPES_PATH,
};
use dexview::effect::Effect;
use dexview::logging;
use dexview::reducer::reducer;
use dexview::state::{AppState, DEFAULT_PAGE_LIMIT, SPINNER_TICK_MS};
use ratatui::{Frame, Terminal, backend::CrosstermBackend, layout::Rect};
use tracing::{info, warn};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventContext, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, RenderContext, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

const SEARCH_TASK: &str = "catalog_search";

/// Dexview - browse a paginated catalog backend
#[derive(Parser, Debug)]
#[command(name = "dexview")]
#[command(about = "Browse, search and filter a paginated catalog REST backend")]
struct Args {
    /// Base URL of the catalog backend
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Collection path of catalog records
    #[arg(long, default_value = DEFAULT_CATALOG_PATH)]
    catalog_path: String,

    /// Collection path of type tags
    #[arg(long, default_value = DEFAULT_TYPES_PATH)]
    types_path: String,

    /// Records per page (minimum 1)
    #[arg(long, short, default_value_t = DEFAULT_PAGE_LIMIT, value_parser = clap::value_parser!(u32).range(1..))]
    limit: u32,

    /// Quiet period before a typed search term is applied
    #[arg(long, default_value_t = DEFAULT_DEBOUNCE_MS)]
    debounce_ms: u64,

    /// Per-request timeout in seconds (minimum 1)
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: u64,

    /// Write logs to this file (filter with DEXVIEW_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum DexComponentId {
    Catalog,
    Search,
    Types,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum DexContext {
    Main,
    Search,
    Types,
}

impl EventRoutingState<DexComponentId, DexContext> for AppState {
    fn focused(&self) -> Option<DexComponentId> {
        self.modal().or(Some(DexComponentId::Catalog))
    }

    fn modal(&self) -> Option<DexComponentId> {
        if self.search_mode {
            Some(DexComponentId::Search)
        } else if self.type_picker_open {
            Some(DexComponentId::Types)
        } else {
            None
        }
    }

    fn binding_context(&self, id: DexComponentId) -> DexContext {
        match id {
            DexComponentId::Catalog => DexContext::Main,
            DexComponentId::Search => DexContext::Search,
            DexComponentId::Types => DexContext::Types,
        }
    }

    fn default_context(&self) -> DexContext {
        DexContext::Main
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let _log_guard = logging::init(args.log_file.as_deref())?;

    let config = CatalogConfig::new(
        &args.base_url,
        &args.catalog_path,
        &args.types_path,
        args.limit,
        args.debounce_ms,
        args.timeout_secs,
    );
    info!(base_url = %config.base_url, limit = config.limit, "starting");
    let catalog = HttpCatalog::new(config.clone()).map_err(io::Error::other)?;

    let debug = DebugSession::new(args.debug);
    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let limit = config.limit;
    let state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState::new(limit))
        })
        .await
        .map_err(debug_error)?;

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, action_recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    // ===== Terminal setup =====
    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(
        &mut terminal,
        &debug,
        store,
        replay_actions,
        Arc::new(catalog),
    )
    .await;

    // ===== Cleanup =====
    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug
        .save_actions(action_recorder.as_ref())
        .map_err(debug_error)?;

    Ok(())
}

struct DexUi {
    view: CatalogView,
    search: SearchOverlay,
    types: TypePicker,
}

impl DexUi {
    fn new() -> Self {
        Self {
            view: CatalogView::new(),
            search: SearchOverlay::new(),
            types: TypePicker::new(),
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
        event_ctx: &mut EventContext<DexComponentId>,
    ) {
        event_ctx.set_component_area(DexComponentId::Catalog, area);

        let overlay_open = state.search_mode || state.type_picker_open;
        self.view.render(
            frame,
            area,
            CatalogViewProps {
                state,
                is_focused: render_ctx.is_focused() && !overlay_open,
            },
        );

        self.search.set_open(state.search_mode);
        if state.search_mode {
            event_ctx.set_component_area(DexComponentId::Search, overlay_area(area));
            let applied = state.filter_summary();
            self.search.render(
                frame,
                area,
                search_props(state, &applied, render_ctx.is_focused()),
            );
        } else {
            event_ctx.component_areas.remove(&DexComponentId::Search);
        }

        if state.type_picker_open {
            event_ctx.set_component_area(
                DexComponentId::Types,
                picker_area(state.type_list().len(), area),
            );
            self.types.render(
                frame,
                area,
                TypePickerProps {
                    state,
                    is_focused: render_ctx.is_focused(),
                },
            );
        } else {
            event_ctx.component_areas.remove(&DexComponentId::Types);
        }
    }

    fn handle_catalog_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let props = CatalogViewProps {
            state,
            is_focused: true,
        };
        let actions: Vec<_> = self.view.handle_event(event, props).into_iter().collect();
        if actions.is_empty() {
            HandlerResponse::ignored()
        } else {
            HandlerResponse {
                actions,
                consumed: true,
                needs_render: false,
            }
        }
    }

    fn handle_search_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        self.search.set_open(state.search_mode);
        let applied = state.filter_summary();
        let actions: Vec<_> = self
            .search
            .handle_event(event, search_props(state, &applied, true))
            .into_iter()
            .collect();
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }

    fn handle_types_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let props = TypePickerProps {
            state,
            is_focused: true,
        };
        let actions: Vec<_> = self.types.handle_event(event, props).into_iter().collect();
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn search_props<'a>(
    state: &'a AppState,
    applied: &'a str,
    is_focused: bool,
) -> SearchOverlayProps<'a> {
    SearchOverlayProps {
        query: &state.search_input,
        applied,
        is_focused,
        is_loading: state.catalog.status.is_loading(),
        on_query_change: Action::SearchQueryChange,
        on_query_submit: Action::SearchSubmit,
    }
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
    catalog: Arc<HttpCatalog>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(DexUi::new()));
    let mut bus: EventBus<AppState, Action, DexComponentId, DexContext> = EventBus::new();
    let keybindings: Keybindings<DexContext> = Keybindings::new();

    let ui_catalog = Rc::clone(&ui);
    bus.register(DexComponentId::Catalog, move |event, state| {
        ui_catalog
            .borrow_mut()
            .handle_catalog_event(&event.kind, state)
    });

    let ui_search = Rc::clone(&ui);
    bus.register(DexComponentId::Search, move |event, state| {
        ui_search
            .borrow_mut()
            .handle_search_event(&event.kind, state)
    });

    let ui_types = Rc::clone(&ui);
    bus.register(DexComponentId::Types, move |event, state| {
        ui_types
            .borrow_mut()
            .handle_types_event(&event.kind, state)
    });

    // Re-render on terminal resize (no action needed, just redraw)
    bus.register_global(|event, _state| match event.kind {
        EventKind::Resize(_, _) => HandlerResponse::ignored().with_render(),
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }

                runtime.subscriptions().interval(
                    "tick",
                    Duration::from_millis(SPINNER_TICK_MS),
                    || Action::Tick,
                );
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(effect, ctx, catalog.clone()),
        )
        .await
}

/// Handle effects by spawning tasks
fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>, catalog: Arc<HttpCatalog>) {
    match effect {
        Effect::FetchPage { query } => {
            ctx.tasks().spawn("catalog_page", async move {
                match catalog.fetch_page(&query).await {
                    Ok(items) => Action::CatalogDidLoad { query, items },
                    Err(err) => {
                        warn!(page = query.page, %err, "page fetch failed");
                        Action::CatalogDidError {
                            query,
                            error: err.to_string(),
                        }
                    }
                }
            });
        }
        Effect::DebounceSearch { query } => {
            let quiet = catalog.config().debounce;
            ctx.tasks()
                .debounce(SEARCH_TASK, quiet, async move { Action::SearchCommit(query) });
        }
        Effect::CancelSearch => {
            ctx.tasks().cancel(&TaskKey::new(SEARCH_TASK));
        }
        Effect::FetchTypes => {
            ctx.tasks().spawn("catalog_types", async move {
                match catalog.fetch_types().await {
                    Ok(types) => Action::TypesDidLoad(types),
                    Err(err) => Action::TypesDidError(err.to_string()),
                }
            });
        }
        Effect::FetchItem { id } => {
            ctx.tasks().spawn("catalog_item", async move {
                match catalog.fetch_item(id).await {
                    Ok(item) => Action::DetailDidLoad { id, item },
                    Err(err) => Action::DetailDidError {
                        id,
                        error: err.to_string(),
                    },
                }
            });
        }
    }
}
