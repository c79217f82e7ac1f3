//! Login form: class, user code, password, warehouse.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use zeroize::{Zeroize, Zeroizing};

use crate::domain::{ClassItem, UserInfo, WarehouseItem};
use crate::tui::styles::WarehouseTheme;

use super::{centered_rect, render_key_hints};

/// Form field, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Class,
    UserCode,
    Password,
    Warehouse,
}

impl LoginField {
    const ORDER: [LoginField; 4] = [
        LoginField::Class,
        LoginField::UserCode,
        LoginField::Password,
        LoginField::Warehouse,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    #[must_use]
    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Class => "Class",
            Self::UserCode => "User Code",
            Self::Password => "Password",
            Self::Warehouse => "Warehouse",
        }
    }

    fn is_select(self) -> bool {
        matches!(self, Self::Class | Self::Warehouse)
    }
}

/// Open selection popup for a select field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Picker {
    pub field: LoginField,
    pub cursor: usize,
}

/// Login form state.
pub struct LoginFormState {
    pub focus: LoginField,
    pub classes: Vec<ClassItem>,
    pub selected_class: Option<usize>,
    pub user_code: String,
    pub password: Zeroizing<String>,
    pub show_password: bool,
    /// User returned by the last successful user check.
    pub user: Option<UserInfo>,
    pub warehouses: Vec<WarehouseItem>,
    pub selected_warehouse: Option<usize>,
    pub picker: Option<Picker>,
}

impl Default for LoginFormState {
    fn default() -> Self {
        Self {
            focus: LoginField::UserCode,
            classes: Vec::new(),
            selected_class: None,
            user_code: String::new(),
            password: Zeroizing::new(String::new()),
            show_password: false,
            user: None,
            warehouses: Vec::new(),
            selected_warehouse: None,
            picker: None,
        }
    }
}

impl LoginFormState {
    pub fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn prev_field(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Replace the class list; the first class is preselected.
    pub fn set_classes(&mut self, classes: Vec<ClassItem>) {
        self.selected_class = if classes.is_empty() { None } else { Some(0) };
        self.classes = classes;
    }

    /// Replace the warehouse list. A single warehouse is preselected.
    pub fn set_warehouses(&mut self, warehouses: Vec<WarehouseItem>) {
        self.selected_warehouse = if warehouses.len() == 1 { Some(0) } else { None };
        self.warehouses = warehouses;
    }

    pub fn input_char(&mut self, c: char) {
        match self.focus {
            LoginField::UserCode => {
                self.user_code.push(c);
                self.invalidate_user();
            }
            LoginField::Password => self.password.push(c),
            LoginField::Class | LoginField::Warehouse => {}
        }
    }

    pub fn delete_char(&mut self) {
        match self.focus {
            LoginField::UserCode => {
                if self.user_code.pop().is_some() {
                    self.invalidate_user();
                }
            }
            LoginField::Password => {
                self.password.pop();
            }
            LoginField::Class | LoginField::Warehouse => {}
        }
    }

    pub fn toggle_password(&mut self) {
        self.show_password = !self.show_password;
    }

    /// A different user code needs a new user check and warehouse list.
    fn invalidate_user(&mut self) {
        self.user = None;
        self.warehouses.clear();
        self.selected_warehouse = None;
    }

    /// Wipe the typed password.
    pub fn clear_password(&mut self) {
        self.password.zeroize();
        self.show_password = false;
    }

    /// Back to a blank form after logout. The class list is kept.
    pub fn reset(&mut self) {
        self.clear_password();
        self.user_code.clear();
        self.invalidate_user();
        self.picker = None;
        self.focus = LoginField::UserCode;
    }

    #[must_use]
    pub fn class(&self) -> Option<&ClassItem> {
        self.selected_class.and_then(|i| self.classes.get(i))
    }

    #[must_use]
    pub fn warehouse(&self) -> Option<&WarehouseItem> {
        self.selected_warehouse.and_then(|i| self.warehouses.get(i))
    }

    fn option_count(&self, field: LoginField) -> usize {
        match field {
            LoginField::Class => self.classes.len(),
            LoginField::Warehouse => self.warehouses.len(),
            LoginField::UserCode | LoginField::Password => 0,
        }
    }

    /// Open the picker for the focused select field. Returns false when the
    /// field has nothing to choose from.
    pub fn open_picker(&mut self) -> bool {
        if !self.focus.is_select() || self.option_count(self.focus) == 0 {
            return false;
        }
        let cursor = match self.focus {
            LoginField::Class => self.selected_class,
            _ => self.selected_warehouse,
        }
        .unwrap_or(0);
        self.picker = Some(Picker {
            field: self.focus,
            cursor,
        });
        true
    }

    pub fn picker_up(&mut self) {
        if let Some(picker) = self.picker.as_mut() {
            picker.cursor = picker.cursor.saturating_sub(1);
        }
    }

    pub fn picker_down(&mut self) {
        let Some(picker) = self.picker else {
            return;
        };
        let last = self.option_count(picker.field).saturating_sub(1);
        if let Some(picker) = self.picker.as_mut() {
            picker.cursor = (picker.cursor + 1).min(last);
        }
    }

    /// Commit the picker cursor to its field and close the picker.
    pub fn picker_accept(&mut self) {
        let Some(picker) = self.picker.take() else {
            return;
        };
        match picker.field {
            LoginField::Class => self.selected_class = Some(picker.cursor),
            LoginField::Warehouse => self.selected_warehouse = Some(picker.cursor),
            LoginField::UserCode | LoginField::Password => {}
        }
    }

    pub fn picker_cancel(&mut self) {
        self.picker = None;
    }

    fn field_value(&self, field: LoginField) -> Option<String> {
        match field {
            LoginField::Class => self
                .class()
                .map(|c| format!("{} - {}", c.classes_code, c.classes_name)),
            LoginField::UserCode => {
                (!self.user_code.is_empty()).then(|| match &self.user {
                    Some(user) if !user.user_name.is_empty() => {
                        format!("{}  ({})", self.user_code, user.user_name)
                    }
                    _ => self.user_code.clone(),
                })
            }
            LoginField::Password => (!self.password.is_empty()).then(|| {
                if self.show_password {
                    self.password.as_str().to_string()
                } else {
                    "•".repeat(self.password.chars().count())
                }
            }),
            LoginField::Warehouse => self
                .warehouse()
                .map(|w| format!("{} - {}", w.ware_house_code, w.ware_house_name)),
        }
    }

    fn field_hint(&self, field: LoginField) -> &'static str {
        match field {
            LoginField::Class if self.classes.is_empty() => "no classes loaded",
            LoginField::Class => "Enter to choose",
            LoginField::UserCode => "type and press Enter",
            LoginField::Password => "type and press Enter",
            LoginField::Warehouse if self.warehouses.is_empty() => "check password first",
            LoginField::Warehouse => "Enter to choose",
        }
    }
}

/// Render the login screen.
pub fn render_login(
    f: &mut Frame,
    area: Rect,
    state: &LoginFormState,
    server_host: &str,
    build_label: &str,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Banner
            Constraint::Min(0),    // Form
            Constraint::Length(2), // Footer
        ])
        .split(area);

    render_banner(f, chunks[0], server_host, build_label);
    render_fields(f, chunks[1], state);
    render_key_hints(
        f,
        chunks[2],
        &[
            ("↑↓", "Field"),
            ("Enter", "Next"),
            ("F2", "Log in"),
            ("Ctrl+R", "Show password"),
            ("Esc", "Exit"),
        ],
    );

    if let Some(picker) = state.picker {
        render_picker(f, area, state, picker);
    }
}

fn render_banner(f: &mut Frame, area: Rect, server_host: &str, build_label: &str) {
    let banner = Paragraph::new(vec![
        Line::from(Span::styled(
            "Intelligent Warehouse Management",
            WarehouseTheme::title(),
        )),
        Line::from(vec![
            Span::styled("Server: ", WarehouseTheme::text_muted()),
            Span::styled(server_host.to_string(), WarehouseTheme::text_secondary()),
            Span::styled("   ", WarehouseTheme::text()),
            Span::styled(build_label.to_string(), WarehouseTheme::text_muted()),
        ]),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(WarehouseTheme::border()),
    );

    f.render_widget(banner, area);
}

fn render_fields(f: &mut Frame, area: Rect, state: &LoginFormState) {
    let column = centered_rect(60, 14, area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(column);

    for (i, field) in LoginField::ORDER.iter().enumerate() {
        let is_focused = *field == state.focus;
        let (border_style, title_style) = if is_focused {
            (WarehouseTheme::border_focused(), WarehouseTheme::focused())
        } else {
            (WarehouseTheme::border(), WarehouseTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label()), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value = match state.field_value(*field) {
            Some(v) => Span::styled(v, WarehouseTheme::text()),
            None => Span::styled(state.field_hint(*field), WarehouseTheme::text_muted()),
        };
        let cursor = if is_focused && !field.is_select() {
            Span::styled("▌", WarehouseTheme::cursor())
        } else if field.is_select() {
            Span::styled("  ▾", WarehouseTheme::text_muted())
        } else {
            Span::raw("")
        };

        let content = Paragraph::new(Line::from(vec![Span::raw(" "), value, cursor])).block(block);
        f.render_widget(content, chunks[i]);
    }
}

fn render_picker(f: &mut Frame, area: Rect, state: &LoginFormState, picker: Picker) {
    let options: Vec<String> = match picker.field {
        LoginField::Class => state
            .classes
            .iter()
            .map(|c| format!("{} - {}", c.classes_code, c.classes_name))
            .collect(),
        LoginField::Warehouse => state
            .warehouses
            .iter()
            .map(|w| format!("{} - {}", w.ware_house_code, w.ware_house_name))
            .collect(),
        LoginField::UserCode | LoginField::Password => Vec::new(),
    };

    let lines: Vec<Line> = options
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            if i == picker.cursor {
                Line::from(Span::styled(format!("▸ {text}"), WarehouseTheme::selected()))
            } else {
                Line::from(Span::styled(format!("  {text}"), WarehouseTheme::text()))
            }
        })
        .collect();

    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);
    let popup = centered_rect(50, height, area);
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", picker.field.label()),
            WarehouseTheme::subtitle(),
        ))
        .borders(Borders::ALL)
        .border_style(WarehouseTheme::border_focused());

    f.render_widget(Clear, popup);
    f.render_widget(Paragraph::new(lines).block(block), popup);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_warehouses() -> LoginFormState {
        let mut state = LoginFormState::default();
        state.user_code = "admin".into();
        state.user = Some(UserInfo::new("admin", "Administrator", "ADMIN", "1234"));
        state.set_warehouses(vec![
            WarehouseItem::new("W01", "Finished Goods"),
            WarehouseItem::new("W02", "Spare Parts"),
        ]);
        state
    }

    #[test]
    fn test_field_cycle() {
        let mut state = LoginFormState::default();
        assert_eq!(state.focus, LoginField::UserCode);
        state.next_field();
        state.next_field();
        assert_eq!(state.focus, LoginField::Warehouse);
        state.next_field();
        assert_eq!(state.focus, LoginField::Class);
        state.prev_field();
        assert_eq!(state.focus, LoginField::Warehouse);
    }

    #[test]
    fn test_editing_user_code_invalidates_user() {
        let mut state = with_warehouses();
        state.selected_warehouse = Some(1);
        state.focus = LoginField::UserCode;
        state.input_char('x');

        assert!(state.user.is_none());
        assert!(state.warehouses.is_empty());
        assert!(state.warehouse().is_none());
    }

    #[test]
    fn test_password_masked_unless_revealed() {
        let mut state = LoginFormState::default();
        state.focus = LoginField::Password;
        for c in "1234".chars() {
            state.input_char(c);
        }
        assert_eq!(state.field_value(LoginField::Password).as_deref(), Some("••••"));

        state.toggle_password();
        assert_eq!(state.field_value(LoginField::Password).as_deref(), Some("1234"));

        state.clear_password();
        assert!(state.password.is_empty());
        assert!(!state.show_password);
    }

    #[test]
    fn test_picker_selects_warehouse() {
        let mut state = with_warehouses();
        assert!(state.warehouse().is_none());

        state.focus = LoginField::Warehouse;
        assert!(state.open_picker());
        state.picker_down();
        state.picker_down();
        state.picker_accept();

        assert!(state.picker.is_none());
        assert_eq!(state.warehouse().map(|w| w.ware_house_code.as_str()), Some("W02"));
    }

    #[test]
    fn test_picker_needs_options() {
        let mut state = LoginFormState::default();
        state.focus = LoginField::Class;
        assert!(!state.open_picker());

        state.set_classes(vec![ClassItem::new("A", "Day Shift")]);
        assert_eq!(state.class().map(|c| c.classes_code.as_str()), Some("A"));
        assert!(state.open_picker());

        state.focus = LoginField::UserCode;
        state.picker_cancel();
        assert!(!state.open_picker());
    }
}
