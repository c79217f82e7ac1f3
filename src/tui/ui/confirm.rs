//! Batch confirmation table.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::domain::{BatchSummary, ScanBatch};
use crate::tui::styles::WarehouseTheme;

use super::{render_key_hints, render_title_bar};

/// Cursor and picked row of the batch table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmState {
    pub cursor: usize,
    pub selected: Option<usize>,
}

impl ConfirmState {
    pub fn up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn down(&mut self, len: usize) {
        if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    /// Pick the row under the cursor.
    pub fn select(&mut self, len: usize) {
        if self.cursor < len {
            self.selected = Some(self.cursor);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Body of the confirmation alert.
#[must_use]
pub fn confirm_message(summary: BatchSummary) -> String {
    format!(
        "Review Summary:\n\nTotal Packages: {}\nTotal Units: {}\n\nProceed with confirmation?",
        summary.packages, summary.units
    )
}

pub fn render_confirm(f: &mut Frame, area: Rect, state: &ConfirmState, batch: &ScanBatch) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(3), // Summary
            Constraint::Min(0),    // Table
            Constraint::Length(2), // Footer
        ])
        .margin(1)
        .split(area);

    render_title_bar(
        f,
        chunks[0],
        "Warehousing Scanning Confirm",
        "Batch Confirmation Dashboard",
    );

    let summary = batch.summary();
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    render_summary_card(f, cols[0], "Total Scanned", format!("{} Boxes", summary.packages));
    render_summary_card(f, cols[1], "Net Quantity", format!("{} Units", summary.units));

    render_table(f, chunks[2], state, batch);

    render_key_hints(
        f,
        chunks[3],
        &[
            ("↑↓", "Move"),
            ("Space", "Select"),
            ("D", "Barcode Detail"),
            ("C", "Confirm"),
            ("Esc", "Back"),
        ],
    );
}

fn render_summary_card(f: &mut Frame, area: Rect, label: &str, value: String) {
    let p = Paragraph::new(Line::from(vec![
        Span::styled(format!("{label}: "), WarehouseTheme::text_muted()),
        Span::styled(value, WarehouseTheme::subtitle()),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(WarehouseTheme::border()),
    );
    f.render_widget(p, area);
}

fn render_table(f: &mut Frame, area: Rect, state: &ConfirmState, batch: &ScanBatch) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(WarehouseTheme::border());

    if batch.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "Waiting for scans...",
            WarehouseTheme::text_muted(),
        ))
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let header = Row::new(["No", "Box Code", "Qty", "Model", "Color", "Pallet"])
        .style(WarehouseTheme::header());
    let rows: Vec<Row> = batch
        .boxes()
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let style = if i == state.cursor {
                WarehouseTheme::selected()
            } else if Some(i) == state.selected {
                WarehouseTheme::marked()
            } else {
                WarehouseTheme::text()
            };
            let marker = if Some(i) == state.selected { "●" } else { " " };
            Row::new(vec![
                Cell::from(format!("{marker}{}", i + 1)),
                Cell::from(record.box_code.clone()),
                Cell::from(record.qty.to_string()),
                Cell::from(record.model.clone()),
                Cell::from(record.color.clone()),
                Cell::from(record.pallet_code.clone()),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Percentage(25),
            Constraint::Length(6),
            Constraint::Percentage(20),
            Constraint::Percentage(15),
            Constraint::Percentage(20),
        ],
    )
    .header(header)
    .block(block);

    f.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BoxRecord;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_cursor_and_selection() {
        let mut state = ConfirmState::default();
        state.select(0);
        assert_eq!(state.selected, None);

        state.down(3);
        state.down(3);
        state.down(3);
        assert_eq!(state.cursor, 2);
        state.select(3);
        assert_eq!(state.selected, Some(2));

        state.up();
        assert_eq!(state.cursor, 1);
        assert_eq!(state.selected, Some(2));
    }

    #[test]
    fn test_table_lists_color() {
        let mut batch = ScanBatch::new();
        batch.push(BoxRecord::new("C4554402", "SKU-4402", 2, "PLT-77291").with_color("Red"));

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).expect("terminal");
        terminal
            .draw(|f| render_confirm(f, f.area(), &ConfirmState::default(), &batch))
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
    fn test_confirm_message_lists_totals() {
        let message = confirm_message(BatchSummary {
            packages: 3,
            units: 51,
        });
        assert!(message.contains("Total Packages: 3"));
        assert!(message.contains("Total Units: 51"));
        assert!(message.ends_with("Proceed with confirmation?"));
    }
}
