use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tui_dispatch::{DataResource, EventKind};
use tui_dispatch_components::{
    BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps, SelectListStyle,
    SelectionStyle,
};

use super::Component;
use super::palette::{
    ACCENT_GOLD, ACCENT_RED, ACCENT_TEAL, BG_HIGHLIGHT, BG_PANEL, TEXT_DIM, TEXT_MAIN,
    focus_border, type_color,
};
use crate::action::Action;
use crate::state::{AppState, CatalogItem, Stats};

/// Longest stat bar, in cells
const STAT_BAR_MAX: usize = 20;

pub struct DetailPanelProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

/// Stats, facts and evolution chain of one entry
pub struct DetailPanel {
    evolutions: SelectList,
}

impl Default for DetailPanel {
    fn default() -> Self {
        Self {
            evolutions: SelectList::new(),
        }
    }
}

impl DetailPanel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component<Action> for DetailPanel {
    type Props<'a> = DetailPanelProps<'a>;

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

        match key.code {
            KeyCode::Esc | KeyCode::Backspace => vec![Action::DetailClose],
            KeyCode::Enter => vec![Action::EvolutionOpen],
            _ => {
                let items = evolution_lines(props.state.detail.data());
                if items.is_empty() {
                    return Vec::new();
                }
                let list_props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: props
                        .state
                        .evolution_selected
                        .min(items.len().saturating_sub(1)),
                    is_focused: true,
                    style: evolution_style(),
                    behavior: SelectListBehavior {
                        show_scrollbar: false,
                        wrap_navigation: false,
                    },
                    on_select: Action::EvolutionSelect,
                    render_item: &|item| item.clone(),
                };
                self.evolutions
                    .handle_event(event, list_props)
                    .into_iter()
                    .collect()
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;
        let block = Block::default()
            .borders(Borders::ALL)
            .title("DETAIL")
            .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
            .border_style(focus_border(props.is_focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let item = match (&state.detail, state.detail_id) {
            (DataResource::Loaded(item), _) => item,
            (DataResource::Loading, Some(id)) => {
                render_note(frame, inner, format!("Loading #{id:03}..."), TEXT_DIM);
                return;
            }
            (DataResource::Failed(error), _) => {
                render_note(frame, inner, format!("Could not load entry: {error}"), ACCENT_RED);
                return;
            }
            _ => {
                render_note(
                    frame,
                    inner,
                    "Select an entry and press Enter.".to_string(),
                    TEXT_DIM,
                );
                return;
            }
        };

        let evolutions = evolution_lines(Some(item));
        let evo_height = if evolutions.is_empty() {
            0
        } else {
            evolutions.len() as u16 + 1
        };
        let chunks = Layout::vertical([
            Constraint::Length(2),          // Name + types
            Constraint::Length(7),          // Stats
            Constraint::Min(1),             // Facts + description
            Constraint::Length(evo_height), // Evolutions
        ])
        .split(inner);

        frame.render_widget(Paragraph::new(header_text(item)), chunks[0]);
        frame.render_widget(Paragraph::new(stats_text(&item.stats)), chunks[1]);
        frame.render_widget(
            Paragraph::new(facts_text(item)).wrap(Wrap { trim: true }),
            chunks[2],
        );

        if evolutions.is_empty() {
            return;
        }
        let evo_chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).split(chunks[3]);
        frame.render_widget(
            Paragraph::new(Span::styled(
                "EVOLUTIONS",
                Style::default().fg(ACCENT_TEAL).add_modifier(Modifier::BOLD),
            )),
            evo_chunks[0],
        );
        let list_props = SelectListProps {
            items: &evolutions,
            count: evolutions.len(),
            selected: state
                .evolution_selected
                .min(evolutions.len().saturating_sub(1)),
            is_focused: props.is_focused,
            style: evolution_style(),
            behavior: SelectListBehavior {
                show_scrollbar: false,
                wrap_navigation: false,
            },
            on_select: Action::EvolutionSelect,
            render_item: &|item| item.clone(),
        };
        self.evolutions.render(frame, evo_chunks[1], list_props);
    }
}

fn render_note(frame: &mut Frame, area: Rect, message: String, color: ratatui::style::Color) {
    frame.render_widget(
        Paragraph::new(message)
            .style(Style::default().fg(color))
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn header_text(item: &CatalogItem) -> Text<'static> {
    let title = Line::from(vec![
        Span::styled(
            format!("#{:03} ", item.display_number()),
            Style::default().fg(TEXT_DIM),
        ),
        Span::styled(
            item.name.clone(),
            Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  gen {}", item.generation),
            Style::default().fg(TEXT_DIM),
        ),
    ]);

    let mut badges = Vec::new();
    for tag in &item.types {
        badges.push(Span::styled(
            format!(" {} ", tag.name),
            Style::default().bg(type_color(&tag.name)).fg(TEXT_MAIN),
        ));
        badges.push(Span::raw(" "));
    }
    Text::from(vec![title, Line::from(badges)])
}

fn stats_text(stats: &Stats) -> Text<'static> {
    let mut lines: Vec<Line<'static>> = stats
        .entries()
        .into_iter()
        .map(|(label, value)| Line::from(stat_line(label, value)))
        .collect();
    lines.push(Line::from(Span::styled(
        format!("{:>4} {:>3}", "TOT", stats.total()),
        Style::default().fg(TEXT_DIM),
    )));
    Text::from(lines)
}

/// `" ATK  49 ####"`, one `#` per ten points.
pub fn stat_line(label: &str, value: u32) -> String {
    let bar_len = (value as usize / 10).clamp(1, STAT_BAR_MAX);
    format!("{label:>4} {value:>3} {}", "#".repeat(bar_len))
}

fn facts_text(item: &CatalogItem) -> Text<'static> {
    let mut lines = Vec::new();
    let mut facts = Vec::new();
    if let Some(height) = item.height {
        facts.push(format!("height {height} m"));
    }
    if let Some(weight) = item.weight {
        facts.push(format!("weight {weight} kg"));
    }
    if !facts.is_empty() {
        lines.push(Line::from(facts.join("  ")));
    }
    if let Some(abilities) = item.abilities.as_ref().filter(|list| !list.is_empty()) {
        lines.push(Line::from(format!("abilities: {}", abilities.join(", "))));
    }
    if let Some(description) = &item.description {
        lines.push(Line::from(Span::styled(
            description.clone(),
            Style::default().fg(TEXT_DIM),
        )));
    }
    Text::from(lines)
}

fn evolution_lines(item: Option<&CatalogItem>) -> Vec<Line<'static>> {
    let Some(item) = item else {
        return Vec::new();
    };
    item.evolutions
        .iter()
        .map(|evolution| Line::from(format!("#{:03} {}", evolution.pokedex_id, evolution.name)))
        .collect()
}

fn evolution_style() -> SelectListStyle {
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
