//! Warehousing scanning screen.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::domain::{BoxRecord, SessionContext};
use crate::tui::styles::WarehouseTheme;

use super::{render_key_hints, render_title_bar};

/// Scanner input plus the fields filled from the last accepted box.
#[derive(Debug, Default, Clone)]
pub struct ScanFormState {
    pub barcode: String,
    pub pallet: String,
    pub qty: String,
    /// Last accepted box, shown as the result row.
    pub last: Option<BoxRecord>,
}

impl ScanFormState {
    pub fn input_char(&mut self, c: char) {
        if !c.is_control() {
            self.barcode.push(c);
        }
    }

    pub fn delete_char(&mut self) {
        self.barcode.pop();
    }

    /// Show an accepted box and clear the input for the next scan.
    pub fn accept(&mut self, record: BoxRecord) {
        self.pallet = record.pallet_code.clone();
        self.qty = record.qty.to_string();
        self.last = Some(record);
        self.barcode.clear();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub fn render_scanning(
    f: &mut Frame,
    area: Rect,
    state: &ScanFormState,
    session: &SessionContext,
    batch_len: usize,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(3), // Barcode
            Constraint::Length(3), // Pallet / Qty
            Constraint::Min(0),    // Result
            Constraint::Length(2), // Footer
        ])
        .margin(1)
        .split(area);

    let caption = format!(
        "{} {} │ {} in batch",
        session.ware_code, session.ware_name, batch_len
    );
    render_title_bar(f, chunks[0], "Warehousing Scanning", &caption);

    let barcode = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        if state.barcode.is_empty() {
            Span::styled("scan or type a box barcode", WarehouseTheme::text_muted())
        } else {
            Span::styled(state.barcode.clone(), WarehouseTheme::text())
        },
        Span::styled("▌", WarehouseTheme::cursor()),
    ]))
    .block(
        Block::default()
            .title(Span::styled(" Barcode ", WarehouseTheme::focused()))
            .borders(Borders::ALL)
            .border_style(WarehouseTheme::border_focused()),
    );
    f.render_widget(barcode, chunks[1]);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[2]);
    render_readonly(f, cols[0], "Pallet", &state.pallet);
    render_readonly(f, cols[1], "Qty", &state.qty);

    render_result(f, chunks[3], state.last.as_ref());

    render_key_hints(
        f,
        chunks[4],
        &[("Enter", "Scan"), ("F2", "Confirm batch"), ("Esc", "Menu")],
    );
}

fn render_readonly(f: &mut Frame, area: Rect, label: &str, value: &str) {
    let p = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(value.to_string(), WarehouseTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .title(Span::styled(format!(" {label} "), WarehouseTheme::text_muted()))
            .borders(Borders::ALL)
            .border_style(WarehouseTheme::border()),
    );
    f.render_widget(p, area);
}

fn render_result(f: &mut Frame, area: Rect, last: Option<&BoxRecord>) {
    let block = Block::default()
        .title(Span::styled(" Last scan ", WarehouseTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(WarehouseTheme::border());

    let Some(record) = last else {
        let empty = Paragraph::new(Span::styled("No data scanned", WarehouseTheme::text_muted()))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    };

    let header = Row::new(["Boxcode", "Model", "Color", "Qty"]).style(WarehouseTheme::header());
    let row = Row::new(vec![
        Cell::from(record.box_code.clone()),
        Cell::from(record.model.clone()),
        Cell::from(record.color.clone()),
        Cell::from(record.qty.to_string()),
    ])
    .style(WarehouseTheme::text());

    let table = Table::new(
        vec![row],
        [
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Percentage(25),
            Constraint::Percentage(15),
        ],
    )
    .header(header)
    .block(block);

    f.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_accept_fills_fields_and_clears_input() {
        let mut state = ScanFormState::default();
        for c in "C4554402".chars() {
            state.input_char(c);
        }
        state.accept(BoxRecord::new("C4554402", "SKU-4402", 2, "PLT-77291"));

        assert!(state.barcode.is_empty());
        assert_eq!(state.pallet, "PLT-77291");
        assert_eq!(state.qty, "2");
        assert_eq!(state.last.as_ref().map(|r| r.model.as_str()), Some("SKU-4402"));
    }

    #[test]
    fn test_result_row_shows_color() {
        let mut state = ScanFormState::default();
        state.accept(BoxRecord::new("C4554402", "SKU-4402", 2, "PLT-77291").with_color("Red"));
        let session = SessionContext::new(&ClientConfig::default());

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).expect("terminal");
        terminal
            .draw(|f| render_scanning(f, f.area(), &state, &session, 1))
            .expect("draw");

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Color"));
        assert!(screen.contains("Red"));
    }

    #[test]
    fn test_control_chars_ignored() {
        let mut state = ScanFormState::default();
        state.input_char('\r');
        state.input_char('A');
        state.delete_char();
        state.delete_char();
        assert!(state.barcode.is_empty());
    }
}
