//! Operations menu: a two-column grid of tiles.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{MenuItem, SessionContext, MENU_ITEMS};
use crate::tui::styles::WarehouseTheme;

use super::{render_key_hints, render_title_bar};

const COLUMNS: usize = 2;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MenuState {
    pub selected: usize,
}

impl MenuState {
    #[must_use]
    pub fn item(&self) -> MenuItem {
        MENU_ITEMS[self.selected.min(MENU_ITEMS.len() - 1)]
    }

    pub fn left(&mut self) {
        if self.selected % COLUMNS > 0 {
            self.selected -= 1;
        }
    }

    pub fn right(&mut self) {
        if self.selected % COLUMNS + 1 < COLUMNS && self.selected + 1 < MENU_ITEMS.len() {
            self.selected += 1;
        }
    }

    pub fn up(&mut self) {
        if self.selected >= COLUMNS {
            self.selected -= COLUMNS;
        }
    }

    pub fn down(&mut self) {
        if self.selected + COLUMNS < MENU_ITEMS.len() {
            self.selected += COLUMNS;
        }
    }
}

pub fn render_menu(f: &mut Frame, area: Rect, state: &MenuState, session: &SessionContext) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(area);

    let caption = format!(
        "{} │ {} {} │ {}",
        session.display_user(),
        session.ware_code,
        session.ware_name,
        session.workdate
    );
    render_title_bar(f, chunks[0], "Menu", &caption);
    render_grid(f, chunks[1], state);
    render_key_hints(
        f,
        chunks[2],
        &[("←↑↓→", "Move"), ("Enter", "Open"), ("Esc", "Log out")],
    );
}

fn render_grid(f: &mut Frame, area: Rect, state: &MenuState) {
    let rows = MENU_ITEMS.len().div_ceil(COLUMNS);
    let row_constraints: Vec<Constraint> = (0..rows)
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(row_constraints)
        .margin(1)
        .split(area);

    for (i, item) in MENU_ITEMS.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(row_areas[i / COLUMNS]);

        let is_selected = i == state.selected;
        let text_style = match (is_selected, item.is_enabled()) {
            (true, _) => WarehouseTheme::selected(),
            (false, true) => WarehouseTheme::text(),
            (false, false) => WarehouseTheme::disabled(),
        };
        let border_style = if is_selected {
            WarehouseTheme::border_focused()
        } else {
            WarehouseTheme::border()
        };

        let tile = Paragraph::new(Line::from(Span::styled(item.title, text_style)))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style),
            );

        f.render_widget(tile, cols[i % COLUMNS]);
    }
}
