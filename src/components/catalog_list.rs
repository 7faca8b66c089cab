use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps, SelectListStyle,
    SelectionStyle,
};

use super::Component;
use super::palette::{BG_HIGHLIGHT, BG_PANEL, TEXT_DIM, TEXT_MAIN, focus_border, type_color};
use crate::action::Action;
use crate::state::{AppState, CatalogItem, FetchStatus};

/// Rows moved by PageUp/PageDown
const PAGE_JUMP: i16 = 10;

pub struct CatalogListProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

/// Scrollable list of catalog entries
pub struct CatalogList {
    list: SelectList,
}

impl Default for CatalogList {
    fn default() -> Self {
        Self {
            list: SelectList::new(),
        }
    }
}

impl CatalogList {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component<Action> for CatalogList {
    type Props<'a> = CatalogListProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }

        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Enter => vec![Action::DetailOpen],
                KeyCode::Char('m') => vec![Action::CatalogLoadMore],
                KeyCode::Char('r') | KeyCode::F(5) => vec![Action::CatalogRefresh],
                KeyCode::PageDown => vec![Action::CatalogMove(PAGE_JUMP)],
                KeyCode::PageUp => vec![Action::CatalogMove(-PAGE_JUMP)],
                _ => {
                    let items = item_lines(props.state);
                    let list_props = SelectListProps {
                        items: &items,
                        count: items.len(),
                        selected: props.state.selected.min(items.len().saturating_sub(1)),
                        is_focused: true,
                        style: list_style(),
                        behavior: SelectListBehavior {
                            show_scrollbar: true,
                            wrap_navigation: false,
                        },
                        on_select: Action::CatalogSelect,
                        render_item: &|item| item.clone(),
                    };
                    self.list.handle_event(event, list_props).into_iter().collect()
                }
            },
            EventKind::Scroll { delta, .. } => vec![Action::CatalogMove((*delta * 3) as i16)],
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("CATALOG ({})", state.catalog.items.len()))
            .title_bottom(footer_line(state))
            .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
            .border_style(focus_border(props.is_focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if state.catalog.items.is_empty() {
            let message = match state.catalog.status {
                FetchStatus::Idle | FetchStatus::Loading => "Loading catalog...",
                FetchStatus::Failed => "Could not load the catalog. Press r to retry.",
                FetchStatus::Succeeded => "Nothing here.",
            };
            frame.render_widget(
                Paragraph::new(message)
                    .style(Style::default().fg(TEXT_DIM))
                    .wrap(Wrap { trim: true }),
                inner,
            );
            return;
        }

        let items = item_lines(state);
        let list_props = SelectListProps {
            items: &items,
            count: items.len(),
            selected: state.selected.min(items.len().saturating_sub(1)),
            is_focused: props.is_focused,
            style: list_style(),
            behavior: SelectListBehavior {
                show_scrollbar: true,
                wrap_navigation: false,
            },
            on_select: Action::CatalogSelect,
            render_item: &|item| item.clone(),
        };
        self.list.render(frame, inner, list_props);
    }
}

fn item_lines(state: &AppState) -> Vec<Line<'static>> {
    state.catalog.items.iter().map(item_line).collect()
}

fn item_line(item: &CatalogItem) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            format!("#{:03} ", item.display_number()),
            Style::default().fg(TEXT_DIM),
        ),
        Span::raw(item.name.clone()),
    ];
    for tag in &item.types {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            tag.name.clone(),
            Style::default().fg(type_color(&tag.name)),
        ));
    }
    Line::from(spans)
}

fn footer_line(state: &AppState) -> Line<'static> {
    let catalog = &state.catalog;
    let text = if catalog.status.is_loading() {
        " loading... ".to_string()
    } else if catalog.all_loaded {
        " end of results ".to_string()
    } else {
        format!(" page {} - m: more ", catalog.page)
    };
    Line::from(Span::styled(text, Style::default().fg(TEXT_DIM)))
}

fn list_style() -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: None,
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(BG_HIGHLIGHT)
                    .fg(TEXT_MAIN)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}
