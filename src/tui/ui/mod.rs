//! UI module: View components for the TUI.

pub mod confirm;
pub mod detail;
pub mod login;
pub mod menu;
pub mod scanning;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::domain::SessionContext;
use crate::tui::styles::{WarehouseTheme, LOGO_SMALL};
use crate::IwmError;

/// Action run when a confirmation alert is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    ExitApp,
    Logout,
    ConfirmBatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Info,
    Success,
    Error,
    Confirm(PendingAction),
}

/// Modal message box. While one is shown it receives all input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub kind: AlertKind,
}

impl Alert {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, AlertKind::Info)
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, AlertKind::Success)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, AlertKind::Error)
    }

    pub fn confirm(
        title: impl Into<String>,
        message: impl Into<String>,
        action: PendingAction,
    ) -> Self {
        Self::new(title, message, AlertKind::Confirm(action))
    }

    fn new(title: impl Into<String>, message: impl Into<String>, kind: AlertKind) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
        }
    }
}

impl From<&IwmError> for Alert {
    fn from(err: &IwmError) -> Self {
        Self::error(err.alert_title(), err.to_string())
    }
}

/// A rectangle of the given percentage size centred in `area`.
#[must_use]
pub fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

pub fn render_alert(f: &mut Frame, area: Rect, alert: &Alert) {
    let (title_style, border_style) = match alert.kind {
        AlertKind::Error => (WarehouseTheme::danger(), WarehouseTheme::danger()),
        AlertKind::Success => (WarehouseTheme::success(), WarehouseTheme::success()),
        AlertKind::Confirm(_) => (WarehouseTheme::warning(), WarehouseTheme::warning()),
        AlertKind::Info => (WarehouseTheme::subtitle(), WarehouseTheme::border_focused()),
    };

    let mut lines: Vec<Line> = alert
        .message
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), WarehouseTheme::text())))
        .collect();
    lines.push(Line::from(""));
    lines.push(match alert.kind {
        AlertKind::Confirm(_) => Line::from(vec![
            Span::styled("[Y] ", WarehouseTheme::key_hint()),
            Span::styled("Confirm  ", WarehouseTheme::key_desc()),
            Span::styled("[N] ", WarehouseTheme::key_hint()),
            Span::styled("Cancel", WarehouseTheme::key_desc()),
        ]),
        _ => Line::from(vec![
            Span::styled("[Enter] ", WarehouseTheme::key_hint()),
            Span::styled("OK", WarehouseTheme::key_desc()),
        ]),
    });

    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);
    let popup = centered_rect(60, height, area);

    let block = Block::default()
        .title(Span::styled(format!(" {} ", alert.title), title_style))
        .borders(Borders::ALL)
        .border_style(border_style);

    let p = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, popup);
    f.render_widget(p, popup);
}

/// Screen title bar: product mark, title and a right-hand caption.
pub fn render_title_bar(f: &mut Frame, area: Rect, title: &str, caption: &str) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {LOGO_SMALL} "), WarehouseTheme::header()),
        Span::styled(" ", WarehouseTheme::text()),
        Span::styled(title.to_string(), WarehouseTheme::title()),
        Span::styled(" │ ", WarehouseTheme::text_muted()),
        Span::styled(caption.to_string(), WarehouseTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(WarehouseTheme::border()),
    );

    f.render_widget(header, area);
}

/// Footer of key hints, given as (key, description) pairs.
pub fn render_key_hints(f: &mut Frame, area: Rect, hints: &[(&str, &str)]) {
    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, desc)| {
            [
                Span::styled(format!("[{key}] "), WarehouseTheme::key_hint()),
                Span::styled(format!("{desc}  "), WarehouseTheme::key_desc()),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(WarehouseTheme::border()),
    );

    f.render_widget(footer, area);
}

/// Bottom status line: request in flight, last notice, or who is logged in.
pub fn render_status_bar(
    f: &mut Frame,
    area: Rect,
    session: &SessionContext,
    busy: Option<&str>,
    notice: Option<&str>,
) {
    let line = if let Some(label) = busy {
        Line::from(vec![
            Span::styled(" … ", WarehouseTheme::warning()),
            Span::styled(format!("{label}..."), WarehouseTheme::warning()),
        ])
    } else if let Some(notice) = notice {
        Line::from(vec![
            Span::styled(" ✓ ", WarehouseTheme::success()),
            Span::styled(notice.to_string(), WarehouseTheme::text_secondary()),
        ])
    } else if session.is_logged_in() {
        Line::from(vec![
            Span::styled(" User: ", WarehouseTheme::text_muted()),
            Span::styled(session.display_user().to_string(), WarehouseTheme::text()),
            Span::styled("  Warehouse: ", WarehouseTheme::text_muted()),
            Span::styled(
                format!("{} ({})", session.ware_name, session.ware_code),
                WarehouseTheme::text(),
            ),
            Span::styled("  Workdate: ", WarehouseTheme::text_muted()),
            Span::styled(session.workdate.clone(), WarehouseTheme::text()),
        ])
    } else {
        Line::from(Span::styled(" Not logged in", WarehouseTheme::text_muted()))
    };

    f.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_from_error() {
        let alert = Alert::from(&IwmError::License("License expired".into()));
        assert_eq!(alert.title, "License Error");
        assert_eq!(alert.message, "License expired");
        assert_eq!(alert.kind, AlertKind::Error);
    }

    #[test]
    fn test_centered_rect_fits() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(60, 10, area);
        assert_eq!(popup.height, 10);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.y, 15);

        let tiny = centered_rect(60, 50, Rect::new(0, 0, 20, 5));
        assert!(tiny.height <= 5);
    }
}
