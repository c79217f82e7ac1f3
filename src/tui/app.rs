//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation and the logged-in guard
//! - Input event handling, including the modal alert
//! - Backend requests via the background worker

use std::io;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::application::{LoginRequest, LoginService, ScanService};
use crate::config::ClientConfig;
use crate::domain::{Route, ScanBatch, SessionContext};
use crate::ports::WarehouseApi;
use crate::IwmError;

use super::ui::{
    confirm::{confirm_message, render_confirm, ConfirmState},
    detail::{render_detail, DetailState},
    login::{render_login, LoginField, LoginFormState},
    menu::{render_menu, MenuState},
    render_alert, render_status_bar,
    scanning::{render_scanning, ScanFormState},
    Alert, AlertKind, PendingAction,
};
use super::worker::{ApiWorker, ApiWorkerHandle, WorkerMessage, WorkerOutcome, WorkerPoll};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Menu,
    Scanning,
    ConfirmBox,
    SnDetail,
}

impl Screen {
    fn requires_login(self) -> bool {
        !matches!(self, Self::Login)
    }
}

/// Main application state
pub struct App {
    screen: Screen,
    should_quit: bool,

    api: Arc<dyn WarehouseApi>,
    session: SessionContext,
    server_host: String,
    build_label: String,

    login: LoginFormState,
    menu: MenuState,
    scan: ScanFormState,
    batch: ScanBatch,
    confirm: ConfirmState,
    detail: DetailState,

    /// Modal alert; while set it takes all input
    alert: Option<Alert>,
    /// Last non-blocking server notice (license, insert confirmation)
    notice: Option<String>,

    /// Running backend job, at most one
    pending: Option<ApiWorkerHandle>,
    /// Label of the request in flight
    busy: Option<&'static str>,
    /// Run the password check once the pending user check succeeds
    password_after_user: bool,
}

impl App {
    /// Create the application and start loading the class list.
    pub fn new(config: &ClientConfig, api: Arc<dyn WarehouseApi>) -> Self {
        let mut app = Self {
            screen: Screen::Login,
            should_quit: false,
            api,
            session: SessionContext::new(config),
            server_host: config.server_host().to_string(),
            build_label: config.build_label.clone(),
            login: LoginFormState::default(),
            menu: MenuState::default(),
            scan: ScanFormState::default(),
            batch: ScanBatch::new(),
            confirm: ConfirmState::default(),
            detail: DetailState::default(),
            alert: None,
            notice: None,
            pending: None,
            busy: None,
            password_after_user: false,
        };
        app.load_classes();
        app
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.poll_worker();

            terminal.draw(|f| self.draw(f))?;

            // Short poll so worker results show up promptly
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());
        let content_area = chunks[0];

        match self.screen {
            Screen::Login => render_login(
                f,
                content_area,
                &self.login,
                &self.server_host,
                &self.build_label,
            ),
            Screen::Menu => render_menu(f, content_area, &self.menu, &self.session),
            Screen::Scanning => render_scanning(
                f,
                content_area,
                &self.scan,
                &self.session,
                self.batch.len(),
            ),
            Screen::ConfirmBox => render_confirm(f, content_area, &self.confirm, &self.batch),
            Screen::SnDetail => render_detail(f, content_area, &self.detail),
        }

        render_status_bar(
            f,
            chunks[1],
            &self.session,
            self.busy,
            self.notice.as_deref(),
        );

        if let Some(alert) = &self.alert {
            let area = f.area();
            render_alert(f, area, alert);
        }
    }

    fn navigate(&mut self, screen: Screen) {
        if screen.requires_login() && !self.session.is_logged_in() {
            tracing::warn!(?screen, "Navigation refused: not logged in");
            self.screen = Screen::Login;
            return;
        }
        tracing::debug!(from = ?self.screen, to = ?screen, "Navigate");
        self.screen = screen;
    }

    // === Background work ===

    fn start<F>(&mut self, busy: &'static str, job: F)
    where
        F: FnOnce(&Sender<WorkerMessage>) -> WorkerOutcome + Send + 'static,
    {
        if self.pending.is_some() {
            return;
        }
        self.notice = None;
        self.busy = Some(busy);
        self.pending = Some(ApiWorker::spawn(job));
    }

    fn login_service(&self) -> LoginService<dyn WarehouseApi> {
        LoginService::new(Arc::clone(&self.api), self.session.factory_code.clone())
    }

    /// Drain worker messages.
    fn poll_worker(&mut self) {
        loop {
            let Some(worker) = self.pending.as_ref() else {
                return;
            };

            match worker.poll() {
                WorkerPoll::Pending => return,
                WorkerPoll::Message(WorkerMessage::Step(step)) => {
                    self.busy = Some(step.label());
                }
                WorkerPoll::Message(WorkerMessage::Done(outcome)) => {
                    self.pending = None;
                    self.busy = None;
                    self.apply_outcome(outcome);
                    return;
                }
                WorkerPoll::Gone => {
                    tracing::error!("Request worker stopped without a result");
                    self.pending = None;
                    self.busy = None;
                    self.password_after_user = false;
                    self.alert = Some(Alert::error(
                        "Error",
                        "Cannot reach server or something went wrong!",
                    ));
                    return;
                }
            }
        }
    }

    fn apply_outcome(&mut self, outcome: WorkerOutcome) {
        match outcome {
            WorkerOutcome::Classes(Ok(classes)) => self.login.set_classes(classes),
            WorkerOutcome::UserChecked(Ok(user)) => {
                self.login.user = Some(user);
                if std::mem::take(&mut self.password_after_user) {
                    self.check_password();
                } else {
                    self.login.focus = LoginField::Password;
                }
            }
            WorkerOutcome::Warehouses(Ok(warehouses)) => {
                if warehouses.is_empty() {
                    tracing::warn!(user_code = %self.login.user_code, "User has no warehouses");
                }
                self.login.set_warehouses(warehouses);
                self.login.focus = LoginField::Warehouse;
            }
            WorkerOutcome::LoggedIn(Ok(outcome)) => {
                outcome.apply_to(&mut self.session);
                self.login.clear_password();
                self.login.picker = None;
                if !outcome.license_message.is_empty() {
                    self.notice = Some(outcome.license_message);
                }
                self.menu = MenuState::default();
                self.navigate(Screen::Menu);
            }
            WorkerOutcome::Scanned(Ok(scanned)) => {
                if !self.batch.push(scanned.record.clone()) {
                    // Stored by the backend but already listed locally
                    tracing::warn!(box_code = %scanned.record.box_code, "Box already in batch");
                }
                self.scan.accept(scanned.record);
                if !scanned.message.is_empty() {
                    self.notice = Some(scanned.message);
                }
            }
            WorkerOutcome::Classes(Err(e))
            | WorkerOutcome::UserChecked(Err(e))
            | WorkerOutcome::Warehouses(Err(e))
            | WorkerOutcome::LoggedIn(Err(e))
            | WorkerOutcome::Scanned(Err(e)) => self.show_error(&e),
        }
    }

    fn show_error(&mut self, err: &IwmError) {
        self.password_after_user = false;
        match err {
            IwmError::BarcodeRequired => return,
            IwmError::PasswordMismatch => {
                self.login.clear_password();
                self.login.focus = LoginField::Password;
            }
            IwmError::UserCodeRequired | IwmError::NoPermission => {
                self.login.focus = LoginField::UserCode;
            }
            IwmError::WarehouseRequired => {
                self.login.focus = LoginField::Warehouse;
            }
            _ => {}
        }
        if self.screen == Screen::Scanning {
            self.scan.barcode.clear();
        }
        self.alert = Some(Alert::from(err));
    }

    fn load_classes(&mut self) {
        let service = self.login_service();
        self.start("Loading classes", move |_| {
            WorkerOutcome::Classes(service.load_classes())
        });
    }

    fn check_user(&mut self) {
        let service = self.login_service();
        let user_code = self.login.user_code.clone();
        self.start("Checking user", move |_| {
            WorkerOutcome::UserChecked(service.check_user(&user_code))
        });
    }

    fn check_password(&mut self) {
        let Some(user) = self.login.user.clone() else {
            // Look the user up first, then come back here
            self.password_after_user = true;
            self.check_user();
            return;
        };
        let service = self.login_service();
        let password = self.login.password.clone();
        self.start("Checking password", move |_| {
            WorkerOutcome::Warehouses(service.check_password(&user, &password))
        });
    }

    fn submit_login(&mut self) {
        let request = LoginRequest {
            user_code: self.login.user_code.clone(),
            password: self.login.password.clone(),
            class: self.login.class().cloned(),
            warehouse: self.login.warehouse().cloned(),
        };
        let service = self.login_service();
        self.start("Logging in", move |tx| {
            let result = service.login(&request, |step| {
                let _ = tx.send(WorkerMessage::Step(step));
            });
            WorkerOutcome::LoggedIn(result)
        });
    }

    fn submit_scan(&mut self) {
        let barcode = self.scan.barcode.trim().to_string();
        if barcode.is_empty() {
            return;
        }
        let service = ScanService::new(Arc::clone(&self.api));
        let session = self.session.clone();
        let batch_codes = self.batch.box_codes();
        self.start("Checking barcode", move |_| {
            WorkerOutcome::Scanned(service.scan(&session, &barcode, &batch_codes))
        });
    }

    // === Input ===

    pub(crate) fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.alert.is_some() {
            self.handle_alert_key(key);
            return;
        }

        // One request at a time; input waits for it
        if self.pending.is_some() {
            return;
        }

        match self.screen {
            Screen::Login => self.handle_login_key(key, modifiers),
            Screen::Menu => self.handle_menu_key(key),
            Screen::Scanning => self.handle_scanning_key(key, modifiers),
            Screen::ConfirmBox => self.handle_confirm_key(key),
            Screen::SnDetail => {
                if key == KeyCode::Esc {
                    self.navigate(Screen::ConfirmBox);
                }
            }
        }
    }

    fn handle_alert_key(&mut self, key: KeyCode) {
        let Some(kind) = self.alert.as_ref().map(|a| a.kind) else {
            return;
        };

        match kind {
            AlertKind::Confirm(action) => match key {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    self.alert = None;
                    self.run_action(action);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.alert = None;
                }
                _ => {}
            },
            AlertKind::Info | AlertKind::Success | AlertKind::Error => {
                if matches!(key, KeyCode::Enter | KeyCode::Esc) {
                    self.alert = None;
                }
            }
        }
    }

    fn run_action(&mut self, action: PendingAction) {
        match action {
            PendingAction::ExitApp => self.should_quit = true,
            PendingAction::Logout => self.logout(),
            PendingAction::ConfirmBatch => {
                let summary = self.batch.summary();
                tracing::info!(
                    packages = summary.packages,
                    units = summary.units,
                    "Batch confirmed"
                );
                self.batch.clear();
                self.confirm.reset();
                self.alert = Some(Alert::success(
                    "Success",
                    "Batch processed and inventory updated.",
                ));
            }
        }
    }

    fn logout(&mut self) {
        tracing::info!(user_code = %self.session.user_code, "Logged out");
        self.session.clear_login();
        self.batch.clear();
        self.scan.reset();
        self.confirm.reset();
        self.detail = DetailState::default();
        self.login.reset();
        self.notice = None;
        self.navigate(Screen::Login);
    }

    fn handle_login_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if self.login.picker.is_some() {
            match key {
                KeyCode::Up => self.login.picker_up(),
                KeyCode::Down => self.login.picker_down(),
                KeyCode::Enter | KeyCode::Char(' ') => self.login.picker_accept(),
                KeyCode::Esc => self.login.picker_cancel(),
                _ => {}
            }
            return;
        }

        if modifiers.contains(KeyModifiers::CONTROL) {
            if matches!(key, KeyCode::Char('r') | KeyCode::Char('R')) {
                self.login.toggle_password();
            }
            return;
        }

        match key {
            KeyCode::Esc => {
                self.alert = Some(Alert::confirm(
                    "Exit",
                    "Close application?",
                    PendingAction::ExitApp,
                ));
            }
            KeyCode::Up | KeyCode::BackTab => self.login.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.login.next_field(),
            KeyCode::F(2) => self.submit_login(),
            KeyCode::Enter => match self.login.focus {
                LoginField::Class => {
                    if !self.login.open_picker() {
                        self.login.next_field();
                    }
                }
                LoginField::UserCode => self.check_user(),
                LoginField::Password => self.check_password(),
                LoginField::Warehouse => {
                    if self.login.warehouse().is_some() || !self.login.open_picker() {
                        self.submit_login();
                    }
                }
            },
            KeyCode::Char(' ')
                if matches!(self.login.focus, LoginField::Class | LoginField::Warehouse) =>
            {
                self.login.open_picker();
            }
            KeyCode::Char(c) => self.login.input_char(c),
            KeyCode::Backspace => self.login.delete_char(),
            _ => {}
        }
    }

    fn handle_menu_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Left => self.menu.left(),
            KeyCode::Right => self.menu.right(),
            KeyCode::Up => self.menu.up(),
            KeyCode::Down => self.menu.down(),
            KeyCode::Enter => {
                let item = self.menu.item();
                match item.route {
                    Some(Route::Scanning) => {
                        self.scan.reset();
                        self.navigate(Screen::Scanning);
                    }
                    None => {
                        tracing::debug!(item = item.title, "Disabled menu item");
                        self.alert = Some(Alert::info(
                            "Restricted Access",
                            "This module is currently undergoing maintenance.",
                        ));
                    }
                }
            }
            KeyCode::Esc => {
                self.alert = Some(Alert::confirm(
                    "Confirm Exit",
                    "Are you sure you want to terminate the current session?",
                    PendingAction::Logout,
                ));
            }
            _ => {}
        }
    }

    fn handle_scanning_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        match key {
            KeyCode::Esc => self.navigate(Screen::Menu),
            KeyCode::F(2) => {
                self.confirm.reset();
                self.navigate(Screen::ConfirmBox);
            }
            KeyCode::Enter => self.submit_scan(),
            KeyCode::Backspace => self.scan.delete_char(),
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                self.scan.input_char(c);
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyCode) {
        let len = self.batch.len();
        match key {
            KeyCode::Up => self.confirm.up(),
            KeyCode::Down => self.confirm.down(len),
            KeyCode::Enter | KeyCode::Char(' ') => self.confirm.select(len),
            KeyCode::Char('d') | KeyCode::Char('D') => {
                match self.confirm.selected.and_then(|i| self.batch.get(i)) {
                    Some(record) => {
                        self.detail = DetailState::from_record(record);
                        self.navigate(Screen::SnDetail);
                    }
                    None => {
                        self.alert = Some(Alert::info(
                            "Select Box",
                            "Please select a box to view details.",
                        ));
                    }
                }
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                if self.batch.is_empty() {
                    self.alert = Some(Alert::info(
                        "System Info",
                        "No active scans found to confirm.",
                    ));
                } else {
                    self.alert = Some(Alert::confirm(
                        "Confirm Batch Processing",
                        confirm_message(self.batch.summary()),
                        PendingAction::ConfirmBatch,
                    ));
                }
            }
            KeyCode::Esc => self.navigate(Screen::Scanning),
            _ => {}
        }
    }
}
