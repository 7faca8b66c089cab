use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Borders, Paragraph},
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    BaseStyle, BorderStyle, Padding, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps,
    StatusBarSection, StatusBarStyle,
};

use super::palette::{ACCENT_GOLD, ACCENT_RED, ACCENT_TEAL, BG_PANEL, TEXT_DIM, TEXT_MAIN};
use super::{CatalogList, CatalogListProps, Component, DetailPanel, DetailPanelProps};
use crate::action::Action;
use crate::state::{AppState, FetchStatus, FocusArea};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub struct CatalogViewProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

/// Header, list, detail pane and status bar
pub struct CatalogView {
    list: CatalogList,
    detail: DetailPanel,
    status_bar: StatusBar,
}

impl Default for CatalogView {
    fn default() -> Self {
        Self {
            list: CatalogList::new(),
            detail: DetailPanel::new(),
            status_bar: StatusBar::new(),
        }
    }
}

impl CatalogView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component<Action> for CatalogView {
    type Props<'a> = CatalogViewProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }
        let state = props.state;

        if let EventKind::Key(key) = event {
            match key.code {
                KeyCode::Char('/') => return vec![Action::SearchOpen],
                KeyCode::Char('t') => return vec![Action::TypePickerOpen],
                KeyCode::Char('c') => return vec![Action::FilterClear],
                KeyCode::Char('q') => return vec![Action::Quit],
                KeyCode::Tab => return vec![Action::UiFocusToggle],
                _ => {}
            }
        }

        match state.focus {
            FocusArea::List => self
                .list
                .handle_event(
                    event,
                    CatalogListProps {
                        state,
                        is_focused: true,
                    },
                )
                .into_iter()
                .collect(),
            FocusArea::Detail => self
                .detail
                .handle_event(
                    event,
                    DetailPanelProps {
                        state,
                        is_focused: true,
                    },
                )
                .into_iter()
                .collect(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;
        let chunks = Layout::vertical([
            Constraint::Length(1), // Filter header
            Constraint::Min(3),    // Panes
            Constraint::Length(3), // Status bar
        ])
        .split(area);

        frame.render_widget(Paragraph::new(header_line(state)), chunks[0]);

        let list_focused = props.is_focused && state.focus == FocusArea::List;
        if state.detail_id.is_some() {
            let panes = Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
                .split(chunks[1]);
            self.list.render(
                frame,
                panes[0],
                CatalogListProps {
                    state,
                    is_focused: list_focused,
                },
            );
            self.detail.render(
                frame,
                panes[1],
                DetailPanelProps {
                    state,
                    is_focused: props.is_focused && state.focus == FocusArea::Detail,
                },
            );
        } else {
            self.list.render(
                frame,
                chunks[1],
                CatalogListProps {
                    state,
                    is_focused: list_focused,
                },
            );
        }

        render_status(frame, chunks[2], state, &mut self.status_bar);
    }
}

fn header_line(state: &AppState) -> Line<'static> {
    let catalog = &state.catalog;
    Line::from(vec![
        Span::styled(
            " DEX ",
            Style::default().fg(ACCENT_TEAL).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("filter: {}", state.filter_summary()),
            Style::default().fg(TEXT_MAIN),
        ),
        Span::styled(
            format!("  page {}  {} loaded", catalog.page, catalog.items.len()),
            Style::default().fg(TEXT_DIM),
        ),
    ])
}

/// Spinner while loading, then any error, then the last message.
fn status_text(state: &AppState) -> (String, ratatui::style::Color) {
    let spinner = SPINNER[state.tick_count as usize % SPINNER.len()];
    if state.catalog.status.is_loading() {
        return (format!("{spinner} loading page {}", state.catalog.page), ACCENT_GOLD);
    }
    if state.detail.is_loading() {
        return (format!("{spinner} loading entry"), ACCENT_GOLD);
    }
    if state.catalog.status == FetchStatus::Failed {
        let error = state.catalog.error.as_deref().unwrap_or("request failed");
        return (error.to_string(), ACCENT_RED);
    }
    (state.message.clone().unwrap_or_default(), TEXT_DIM)
}

fn status_hints(state: &AppState) -> Vec<StatusBarHint<'static>> {
    let mut hints = match state.focus {
        FocusArea::List => vec![
            StatusBarHint::new("Enter", "detail"),
            StatusBarHint::new("m", "more"),
            StatusBarHint::new("r", "reload"),
        ],
        FocusArea::Detail => vec![
            StatusBarHint::new("Enter", "evolution"),
            StatusBarHint::new("Esc", "close"),
        ],
    };
    hints.extend([
        StatusBarHint::new("/", "search"),
        StatusBarHint::new("t", "types"),
        StatusBarHint::new("c", "clear"),
    ]);
    if state.detail_id.is_some() {
        hints.push(StatusBarHint::new("Tab", "focus"));
    }
    hints.push(StatusBarHint::new("q", "quit"));
    hints
}

fn render_status(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let (text, color) = status_text(state);
    let hints = status_hints(state);
    let status_span = Span::styled(text.as_str(), Style::default().fg(color));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT_TEAL)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&hints).with_separator("  "),
        center: StatusBarSection::empty(),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}
