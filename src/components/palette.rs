use ratatui::style::{Color, Modifier, Style};

pub const BG_PANEL: Color = Color::Rgb(20, 32, 46);
pub const BG_HIGHLIGHT: Color = Color::Rgb(28, 92, 110);
pub const TEXT_MAIN: Color = Color::Rgb(232, 242, 244);
pub const TEXT_DIM: Color = Color::Rgb(176, 195, 207);
pub const ACCENT_TEAL: Color = Color::Rgb(72, 204, 184);
pub const ACCENT_GOLD: Color = Color::Rgb(228, 176, 88);
pub const ACCENT_RED: Color = Color::Rgb(230, 96, 96);

/// Badge colour for a type tag name. Names come from the backend in French.
pub fn type_color(name: &str) -> Color {
    match name {
        "Normal" => Color::Rgb(156, 163, 175),
        "Feu" => Color::Rgb(239, 68, 68),
        "Eau" => Color::Rgb(59, 130, 246),
        "Plante" => Color::Rgb(34, 197, 94),
        "Électrik" => Color::Rgb(250, 204, 21),
        "Glace" => Color::Rgb(147, 197, 253),
        "Combat" => Color::Rgb(185, 28, 28),
        "Poison" => Color::Rgb(168, 85, 247),
        "Sol" => Color::Rgb(202, 138, 4),
        "Vol" => Color::Rgb(165, 180, 252),
        "Psy" => Color::Rgb(236, 72, 153),
        "Insecte" => Color::Rgb(132, 204, 22),
        "Roche" => Color::Rgb(133, 77, 14),
        "Spectre" => Color::Rgb(126, 34, 206),
        "Dragon" => Color::Rgb(79, 70, 229),
        "Ténèbres" => Color::Rgb(31, 41, 55),
        "Acier" => Color::Rgb(107, 114, 128),
        "Fée" => Color::Rgb(249, 168, 212),
        _ => Color::Rgb(156, 163, 175),
    }
}

pub fn focus_border(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_DIM)
    }
}
