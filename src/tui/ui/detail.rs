//! SN / IMEI detail of one box.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::domain::{BoxRecord, SnItem};
use crate::tui::styles::WarehouseTheme;

use super::{render_key_hints, render_title_bar};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DetailState {
    pub box_code: String,
    pub pallet_code: String,
    pub sn_items: Vec<SnItem>,
}

impl DetailState {
    #[must_use]
    pub fn from_record(record: &BoxRecord) -> Self {
        Self {
            box_code: record.box_code.clone(),
            pallet_code: record.pallet_code.clone(),
            sn_items: record.sn_items.clone(),
        }
    }

    #[must_use]
    pub fn total_sn(&self) -> usize {
        self.sn_items.len()
    }
}

pub fn render_detail(f: &mut Frame, area: Rect, state: &DetailState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .margin(1)
        .split(area);

    render_title_bar(f, chunks[0], "SN Details", &state.box_code);

    let info = Paragraph::new(Line::from(vec![
        Span::styled("Pallet Code ", WarehouseTheme::text_muted()),
        Span::styled(state.pallet_code.clone(), WarehouseTheme::text()),
        Span::styled("   Box Code ", WarehouseTheme::text_muted()),
        Span::styled(state.box_code.clone(), WarehouseTheme::text()),
        Span::styled("   Total SN ", WarehouseTheme::text_muted()),
        Span::styled(state.total_sn().to_string(), WarehouseTheme::success()),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(WarehouseTheme::border()),
    );
    f.render_widget(info, chunks[1]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(WarehouseTheme::border());

    if state.sn_items.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No SN data available.",
            WarehouseTheme::text_muted(),
        ))
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(empty, chunks[2]);
    } else {
        let rows: Vec<Row> = state
            .sn_items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                Row::new(vec![
                    Cell::from((i + 1).to_string()),
                    Cell::from(item.sn.clone()),
                    Cell::from(item.imei1.clone()),
                    Cell::from(item.imei2.clone()),
                ])
                .style(WarehouseTheme::text())
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Percentage(30),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ],
        )
        .header(Row::new(["No", "SN", "IMEI 1", "IMEI 2"]).style(WarehouseTheme::header()))
        .block(block);
        f.render_widget(table, chunks[2]);
    }

    render_key_hints(f, chunks[3], &[("Esc", "Back")]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_record() {
        let record = BoxRecord::new("C1", "SKU", 2, "P1").with_sn_items(vec![
            SnItem::new("SN-1", "3560", "3561"),
            SnItem::new("SN-2", "3562", "3563"),
        ]);
        let state = DetailState::from_record(&record);
        assert_eq!(state.box_code, "C1");
        assert_eq!(state.pallet_code, "P1");
        assert_eq!(state.total_sn(), 2);
    }
}
