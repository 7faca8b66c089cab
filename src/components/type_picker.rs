use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    BaseStyle, Modal, ModalBehavior, ModalProps, ModalStyle, Padding, SelectList,
    SelectListBehavior, SelectListProps, SelectListStyle, SelectionStyle, centered_rect,
};

use super::Component;
use super::palette::{ACCENT_RED, ACCENT_TEAL, BG_HIGHLIGHT, BG_PANEL, TEXT_DIM, TEXT_MAIN, type_color};
use crate::action::Action;
use crate::state::AppState;

/// Multi-select overlay over the type facets
pub struct TypePicker {
    list: SelectList,
    modal: Modal,
}

pub struct TypePickerProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

impl Default for TypePicker {
    fn default() -> Self {
        Self {
            list: SelectList::new(),
            modal: Modal::new(),
        }
    }
}

impl TypePicker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component<Action> for TypePicker {
    type Props<'a> = TypePickerProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }
        let EventKind::Key(key) = event else {
            return Vec::new();
        };

        let state = props.state;
        match key.code {
            KeyCode::Esc | KeyCode::Char('t') => vec![Action::TypePickerClose],
            KeyCode::Char('c') => vec![Action::TypePickerClear],
            KeyCode::Enter | KeyCode::Char(' ') => state
                .type_list()
                .get(state.type_cursor)
                .map(|tag| vec![Action::TypePickerToggle(tag.id)])
                .unwrap_or_default(),
            _ => {
                let items = type_lines(state);
                if items.is_empty() {
                    return Vec::new();
                }
                let list_props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: state.type_cursor.min(items.len().saturating_sub(1)),
                    is_focused: true,
                    style: picker_style(),
                    behavior: SelectListBehavior {
                        show_scrollbar: true,
                        wrap_navigation: true,
                    },
                    on_select: Action::TypePickerSelect,
                    render_item: &|item| item.clone(),
                };
                self.list.handle_event(event, list_props).into_iter().collect()
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        if area.width < 20 || area.height < 8 {
            return;
        }

        let state = props.state;
        let TypePicker { list, modal } = self;
        let modal_area = picker_area(state.type_list().len(), area);
        let mut render_content = |frame: &mut Frame, content_area: Rect| {
            let chunks = Layout::vertical([
                Constraint::Length(1), // Title
                Constraint::Min(1),    // Types
                Constraint::Length(1), // Hints
            ])
            .split(content_area);

            let selected = state.catalog.selected_type_filters().len();
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!(" TYPES ({selected} selected)"),
                    Style::default().fg(ACCENT_TEAL).add_modifier(Modifier::BOLD),
                )),
                chunks[0],
            );

            if state.types.is_loading() {
                frame.render_widget(
                    Paragraph::new(" Loading types...").style(Style::default().fg(TEXT_DIM)),
                    chunks[1],
                );
            } else if let Some(error) = state.types.error() {
                frame.render_widget(
                    Paragraph::new(format!(" {error}")).style(Style::default().fg(ACCENT_RED)),
                    chunks[1],
                );
            } else {
                let items = type_lines(state);
                let list_props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: state.type_cursor.min(items.len().saturating_sub(1)),
                    is_focused: props.is_focused,
                    style: picker_style(),
                    behavior: SelectListBehavior {
                        show_scrollbar: true,
                        wrap_navigation: true,
                    },
                    on_select: Action::TypePickerSelect,
                    render_item: &|item| item.clone(),
                };
                list.render(frame, chunks[1], list_props);
            }

            frame.render_widget(
                Paragraph::new(" space: toggle  c: clear  esc: close")
                    .style(Style::default().fg(TEXT_DIM)),
                chunks[2],
            );
        };

        modal.render(
            frame,
            area,
            ModalProps {
                is_open: true,
                is_focused: props.is_focused,
                area: modal_area,
                style: ModalStyle {
                    base: BaseStyle {
                        bg: Some(BG_PANEL),
                        padding: Padding::default(),
                        border: None,
                        fg: None,
                    },
                    ..Default::default()
                },
                behavior: ModalBehavior::default(),
                on_close: || Action::TypePickerClose,
                render_content: &mut render_content,
            },
        );
    }
}

/// Where the picker sits inside `area`.
pub fn picker_area(type_count: usize, area: Rect) -> Rect {
    let height = (type_count as u16 + 4).clamp(8, area.height.saturating_sub(2).max(8));
    centered_rect(36, height, area)
}

fn type_lines(state: &AppState) -> Vec<Line<'static>> {
    let selected = state.catalog.selected_type_filters();
    state
        .type_list()
        .iter()
        .map(|tag| {
            let mark = if selected.contains(&tag.id) { "[x] " } else { "[ ] " };
            Line::from(vec![
                Span::raw(mark),
                Span::styled(tag.name.clone(), Style::default().fg(type_color(&tag.name))),
            ])
        })
        .collect()
}

fn picker_style() -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: None,
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(Style::default().bg(BG_HIGHLIGHT).fg(TEXT_MAIN)),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}
