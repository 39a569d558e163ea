//! Application state management for the admin console.
//!
//! This module contains the `App` struct that owns the console state: the
//! active tab, login form, per-view data and queries, and the channels that
//! bring fetch results and session events back to the render loop.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use backoffice_core::auth::{SessionEvent, SignOutReason};
use backoffice_core::config::{Preferences, Settings};
use backoffice_core::data::ViewData;
use backoffice_core::models::{
    AnalyticsReport, AuditLogEntry, AuditLogQuery, CustomerUser, DashboardStats, DateRange, Page,
    Principal, Report, ReportRequest, ReportType, Ticket, TicketPriority, TicketQuery,
    TicketStatus, Transaction, TransactionQuery, TransactionStatus, TransactionType, UserQuery,
    UserStatus,
};
use backoffice_core::models::audit_log::AUDIT_ACTIONS;
use backoffice_core::Services;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the view result channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for the login identifier.
const MAX_USERNAME_LENGTH: usize = 64;

/// Maximum length for the login secret.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for a search query.
const MAX_SEARCH_LENGTH: usize = 64;

/// Remaining session time under which the countdown turns red and
/// extension is offered.
pub const SESSION_WARNING_SECS: i64 = 120;

/// Number of rows in the Settings tab that can be toggled.
pub const SETTINGS_TOGGLE_COUNT: usize = 2;

// ============================================================================
// Tabs and UI State
// ============================================================================

/// Console tabs, one per protected view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Dashboard,
    Users,
    Transactions,
    Tickets,
    Analytics,
    AuditLogs,
    Reports,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 8] = [
        Tab::Dashboard,
        Tab::Users,
        Tab::Transactions,
        Tab::Tickets,
        Tab::Analytics,
        Tab::AuditLogs,
        Tab::Reports,
        Tab::Settings,
    ];

    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Users => "Users",
            Tab::Transactions => "Transactions",
            Tab::Tickets => "Tickets",
            Tab::Analytics => "Analytics",
            Tab::AuditLogs => "Audit Logs",
            Tab::Reports => "Reports",
            Tab::Settings => "Settings",
        }
    }

    fn index(&self) -> usize {
        match self {
            Tab::Dashboard => 0,
            Tab::Users => 1,
            Tab::Transactions => 2,
            Tab::Tickets => 3,
            Tab::Analytics => 4,
            Tab::AuditLogs => 5,
            Tab::Reports => 6,
            Tab::Settings => 7,
        }
    }

    /// Tab bound to a number key (`1`-`8`)
    pub fn from_digit(c: char) -> Option<Self> {
        let n = c.to_digit(10)? as usize;
        n.checked_sub(1).and_then(|i| Tab::ALL.get(i).copied())
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }

    /// Whether the tab's content comes from a fetch
    pub fn fetches(&self) -> bool {
        !matches!(self, Tab::Settings)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Startup token verification has not finished
    Initializing,
    Normal,
    Searching,
    ShowingHelp,
    LoggingIn,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Data delivered by a spawned fetch task.
#[derive(Debug)]
pub enum ViewPayload {
    Dashboard(ViewData<DashboardStats>),
    Users(ViewData<Page<CustomerUser>>),
    Transactions(ViewData<Page<Transaction>>),
    Tickets(ViewData<Vec<Ticket>>),
    Analytics(ViewData<AnalyticsReport>),
    AuditLogs(ViewData<Vec<AuditLogEntry>>),
    Reports(ViewData<Vec<Report>>),
    /// Outcome of a report generation request
    ReportGenerated(std::result::Result<Report, String>),
}

/// A fetch result tagged with the generation it was started under.
#[derive(Debug)]
pub struct ViewUpdate {
    pub tab: Tab,
    pub generation: u64,
    pub payload: ViewPayload,
}

/// Per-tab fetch counters. A result is applied only if its generation is
/// still the tab's current one.
#[derive(Debug, Default, Clone)]
pub struct Generations {
    counters: [u64; 8],
}

impl Generations {
    pub fn current(&self, tab: Tab) -> u64 {
        self.counters[tab.index()]
    }

    /// Invalidate in-flight results for `tab` and return the new generation
    pub fn bump(&mut self, tab: Tab) -> u64 {
        let counter = &mut self.counters[tab.index()];
        *counter += 1;
        *counter
    }

    pub fn bump_all(&mut self) {
        for tab in Tab::ALL {
            self.bump(tab);
        }
    }

    pub fn is_current(&self, tab: Tab, generation: u64) -> bool {
        self.current(tab) == generation
    }
}

/// Result of a login request run off the render loop
#[derive(Debug)]
pub struct LoginOutcome {
    pub username: String,
    pub result: std::result::Result<Principal, String>,
}

/// Loaded data for every view
#[derive(Debug, Default)]
pub struct Views {
    pub dashboard: Option<ViewData<DashboardStats>>,
    pub users: Option<ViewData<Page<CustomerUser>>>,
    pub transactions: Option<ViewData<Page<Transaction>>>,
    pub tickets: Option<ViewData<Vec<Ticket>>>,
    pub analytics: Option<ViewData<AnalyticsReport>>,
    pub audit_logs: Option<ViewData<Vec<AuditLogEntry>>>,
    pub reports: Option<ViewData<Vec<Report>>>,
}

impl Views {
    /// Number of selectable rows in a tab's listing
    pub fn row_count(&self, tab: Tab) -> usize {
        match tab {
            Tab::Users => self.users.as_ref().map_or(0, |v| v.data.items.len()),
            Tab::Transactions => self.transactions.as_ref().map_or(0, |v| v.data.items.len()),
            Tab::Tickets => self.tickets.as_ref().map_or(0, |v| v.data.len()),
            Tab::AuditLogs => self.audit_logs.as_ref().map_or(0, |v| v.data.len()),
            Tab::Reports => self.reports.as_ref().map_or(0, |v| v.data.len()),
            Tab::Settings => SETTINGS_TOGGLE_COUNT,
            Tab::Dashboard | Tab::Analytics => 0,
        }
    }

    pub fn banner(&self, tab: Tab) -> Option<String> {
        let origin = match tab {
            Tab::Dashboard => self.dashboard.as_ref().map(|v| &v.origin),
            Tab::Users => self.users.as_ref().map(|v| &v.origin),
            Tab::Transactions => self.transactions.as_ref().map(|v| &v.origin),
            Tab::Tickets => self.tickets.as_ref().map(|v| &v.origin),
            Tab::Analytics => self.analytics.as_ref().map(|v| &v.origin),
            Tab::AuditLogs => self.audit_logs.as_ref().map(|v| &v.origin),
            Tab::Reports => self.reports.as_ref().map(|v| &v.origin),
            Tab::Settings => None,
        };
        origin.and_then(|o| o.banner())
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub services: Services,
    pub settings: Settings,
    pub preferences: Preferences,
    preferences_path: Option<PathBuf>,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub selection: usize,
    pub search_input: String,
    pub status_message: Option<String>,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,
    /// A login request is in flight
    pub signing_in: bool,

    // View state
    pub views: Views,
    pub loading: HashSet<Tab>,
    pub generations: Generations,
    pub user_query: UserQuery,
    pub transaction_query: TransactionQuery,
    pub ticket_query: TicketQuery,
    pub audit_query: AuditLogQuery,
    pub date_range: DateRange,
    pub report_type: ReportType,
    pub generating_report: bool,

    // Background task communication
    view_tx: mpsc::Sender<ViewUpdate>,
    view_rx: mpsc::Receiver<ViewUpdate>,
    login_tx: mpsc::Sender<LoginOutcome>,
    login_rx: mpsc::Receiver<LoginOutcome>,
    session_events: broadcast::Receiver<SessionEvent>,
    session_epoch: u64,
}

impl App {
    pub fn new(
        settings: Settings,
        services: Services,
        preferences: Preferences,
        preferences_path: Option<PathBuf>,
    ) -> Self {
        let (view_tx, view_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let (login_tx, login_rx) = mpsc::channel(1);
        let session_events = services.session.handle().subscribe();
        let login_username = preferences.last_email.clone().unwrap_or_default();

        Self {
            services,
            settings,
            preferences,
            preferences_path,
            state: AppState::Initializing,
            current_tab: Tab::Dashboard,
            selection: 0,
            search_input: String::new(),
            status_message: None,
            login_username,
            login_password: String::new(),
            login_focus: LoginFocus::Username,
            login_error: None,
            signing_in: false,
            views: Views::default(),
            loading: HashSet::new(),
            generations: Generations::default(),
            user_query: UserQuery::default(),
            transaction_query: TransactionQuery::default(),
            ticket_query: TicketQuery::default(),
            audit_query: AuditLogQuery::default(),
            date_range: DateRange::default(),
            report_type: ReportType::Transactions,
            generating_report: false,
            view_tx,
            view_rx,
            login_tx,
            login_rx,
            session_events,
            session_epoch: 0,
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Verify any stored token, then show either the login form or the
    /// current tab.
    pub async fn initialize(&mut self) {
        self.services.session.initialize().await;
        self.after_ready();
    }

    fn after_ready(&mut self) {
        if self.services.session.handle().is_authenticated() {
            self.state = AppState::Normal;
            self.load_current_tab();
        } else {
            self.start_login();
        }
    }

    pub fn is_demo(&self) -> bool {
        self.services.session.is_demo()
    }

    pub fn principal(&self) -> Option<Principal> {
        self.services.session.handle().principal()
    }

    /// Time left in the current session
    pub fn remaining(&self) -> Option<Duration> {
        self.services.session.handle().remaining()
    }

    /// Whether the countdown is inside the warning window
    pub fn session_warning(&self) -> bool {
        self.remaining()
            .is_some_and(|r| r <= Duration::seconds(SESSION_WARNING_SECS))
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
    }

    /// Submit the login form. The request runs on a spawned task; its
    /// outcome is applied by `check_background_tasks`.
    pub fn attempt_login(&mut self) {
        if self.signing_in {
            return;
        }
        let username = self.login_username.trim().to_string();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_error = Some("Email and password required".to_string());
            return;
        }

        self.login_error = None;
        self.signing_in = true;

        let session = self.services.session.clone();
        let tx = self.login_tx.clone();
        tokio::spawn(async move {
            let result = session
                .login(&username, &password)
                .await
                .map_err(|e| e.user_message());
            let _ = tx.send(LoginOutcome { username, result }).await;
        });
    }

    fn apply_login_outcome(&mut self, outcome: LoginOutcome) {
        self.signing_in = false;
        self.login_password.clear();
        match outcome.result {
            Ok(principal) => {
                self.preferences.last_email = Some(outcome.username);
                if let Err(e) = self.save_preferences() {
                    warn!(error = %e, "Failed to save preferences");
                }
                self.status_message = Some(format!("Signed in as {}", principal.display_name()));
                self.state = AppState::Normal;
                self.selection = 0;
                self.load_current_tab();
            }
            Err(message) => {
                debug!(error = %message, "Login rejected");
                self.login_error = Some(message);
            }
        }
    }

    /// Clear the session now; the server is told in the background.
    pub fn logout(&mut self) {
        let session = self.services.session.clone();
        if let Some(token) = session.sign_out() {
            tokio::spawn(async move { session.revoke(&token).await });
        }
        // The SignedOut event does the rest; drain it now so the overlay
        // appears on this frame.
        self.drain_session_events();
    }

    pub fn extend_session(&mut self) {
        match self.services.session.extend_session() {
            Some(expires_at) => {
                let local = expires_at.with_timezone(&chrono::Local);
                self.status_message =
                    Some(format!("Session extended until {}", local.format("%H:%M:%S")));
            }
            None => {
                self.drain_session_events();
            }
        }
    }

    /// Drop everything loaded under the old session and show the login form.
    fn handle_signed_out(&mut self, reason: SignOutReason) {
        info!(?reason, "Session ended");
        self.clear_views();
        self.login_password.clear();
        self.login_error = match reason {
            SignOutReason::Logout => None,
            SignOutReason::Expired | SignOutReason::Unauthorized => {
                Some(reason.message().to_string())
            }
        };
        self.status_message = Some(reason.message().to_string());
        self.start_login();
    }

    fn clear_views(&mut self) {
        self.views = Views::default();
        self.loading.clear();
        self.generations.bump_all();
        self.session_epoch += 1;
        self.generating_report = false;
        self.selection = 0;
    }

    /// Apply session events broadcast since the last frame.
    pub fn drain_session_events(&mut self) {
        loop {
            match self.session_events.try_recv() {
                Ok(event) => self.handle_session_event(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Session events lagged");
                }
                Err(_) => break,
            }
        }
    }

    fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Ready { .. } => {
                if self.state == AppState::Initializing {
                    self.after_ready();
                }
            }
            SessionEvent::SignedIn { .. } | SessionEvent::Extended { .. } => {}
            SessionEvent::SignedOut { reason } => self.handle_signed_out(reason),
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn switch_tab(&mut self, tab: Tab) {
        if tab == self.current_tab {
            return;
        }
        // Results still in flight for the tab being left are no longer wanted
        self.generations.bump(self.current_tab);
        self.loading.remove(&self.current_tab);
        self.current_tab = tab;
        self.selection = 0;
        self.load_current_tab();
    }

    pub fn select_next(&mut self) {
        let count = self.views.row_count(self.current_tab);
        if count > 0 && self.selection + 1 < count {
            self.selection += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selection = self.selection.saturating_sub(1);
    }

    pub fn next_page(&mut self) {
        match self.current_tab {
            Tab::Users => {
                if self.views.users.as_ref().is_some_and(|v| v.data.has_next()) {
                    self.user_query.page += 1;
                    self.reload();
                }
            }
            Tab::Transactions => {
                if self.views.transactions.as_ref().is_some_and(|v| v.data.has_next()) {
                    self.transaction_query.page += 1;
                    self.reload();
                }
            }
            _ => {}
        }
    }

    pub fn prev_page(&mut self) {
        match self.current_tab {
            Tab::Users => {
                if self.views.users.as_ref().is_some_and(|v| v.data.has_prev()) {
                    self.user_query.page = self.user_query.page.saturating_sub(1).max(1);
                    self.reload();
                }
            }
            Tab::Transactions => {
                if self.views.transactions.as_ref().is_some_and(|v| v.data.has_prev()) {
                    self.transaction_query.page =
                        self.transaction_query.page.saturating_sub(1).max(1);
                    self.reload();
                }
            }
            _ => {}
        }
    }

    // =========================================================================
    // Filters
    // =========================================================================

    pub fn cycle_user_status(&mut self) {
        self.user_query.status = cycle(&UserStatus::FILTERS, self.user_query.status);
        self.user_query.page = 1;
        self.reload();
    }

    pub fn cycle_transaction_type(&mut self) {
        self.transaction_query.kind = cycle(&TransactionType::FILTERS, self.transaction_query.kind);
        self.transaction_query.page = 1;
        self.reload();
    }

    pub fn cycle_transaction_status(&mut self) {
        self.transaction_query.status =
            cycle(&TransactionStatus::FILTERS, self.transaction_query.status);
        self.transaction_query.page = 1;
        self.reload();
    }

    pub fn cycle_ticket_status(&mut self) {
        self.ticket_query.status = cycle(&TicketStatus::FILTERS, self.ticket_query.status);
        self.reload();
    }

    pub fn cycle_ticket_priority(&mut self) {
        self.ticket_query.priority = cycle(&TicketPriority::FILTERS, self.ticket_query.priority);
        self.reload();
    }

    pub fn cycle_audit_action(&mut self) {
        let options: Vec<Option<&str>> = std::iter::once(None)
            .chain(AUDIT_ACTIONS.iter().copied().map(Some))
            .collect();
        let next = cycle(&options, self.audit_query.action.as_deref());
        self.audit_query.action = next.map(str::to_string);
        self.reload();
    }

    pub fn cycle_date_range(&mut self) {
        self.date_range = self.date_range.next();
        self.reload();
    }

    pub fn cycle_report_type(&mut self) {
        self.report_type = cycle(&ReportType::GENERATABLE, self.report_type);
    }

    /// Whether the current tab has a free-text search
    pub fn tab_searchable(&self) -> bool {
        matches!(self.current_tab, Tab::Users | Tab::Transactions)
    }

    pub fn start_search(&mut self) {
        if !self.tab_searchable() {
            return;
        }
        self.search_input = match self.current_tab {
            Tab::Users => self.user_query.search.clone(),
            Tab::Transactions => self.transaction_query.search.clone(),
            _ => String::new(),
        };
        self.state = AppState::Searching;
    }

    pub fn push_search_char(&mut self, c: char) {
        if self.search_input.chars().count() < MAX_SEARCH_LENGTH && is_valid_input_char(c) {
            self.search_input.push(c);
        }
    }

    /// Apply the typed search and refetch from page one
    pub fn apply_search(&mut self) {
        let search = self.search_input.trim().to_string();
        match self.current_tab {
            Tab::Users => {
                self.user_query.search = search;
                self.user_query.page = 1;
            }
            Tab::Transactions => {
                self.transaction_query.search = search;
                self.transaction_query.page = 1;
            }
            _ => {}
        }
        self.state = AppState::Normal;
        self.reload();
    }

    /// Leave search mode, clearing any active search
    pub fn cancel_search(&mut self) {
        self.search_input.clear();
        self.state = AppState::Normal;
        let had_search = match self.current_tab {
            Tab::Users => !std::mem::take(&mut self.user_query.search).is_empty(),
            Tab::Transactions => !std::mem::take(&mut self.transaction_query.search).is_empty(),
            _ => false,
        };
        if had_search {
            self.reload();
        }
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub fn toggle_setting(&mut self, index: usize) {
        match index {
            0 => self.preferences.email_notifications = !self.preferences.email_notifications,
            1 => self.preferences.security_alerts = !self.preferences.security_alerts,
            _ => return,
        }
        self.status_message = Some(match self.save_preferences() {
            Ok(()) => "Settings saved".to_string(),
            Err(e) => {
                warn!(error = %e, "Failed to save preferences");
                format!("Failed to save settings: {}", e)
            }
        });
    }

    fn save_preferences(&self) -> Result<()> {
        match &self.preferences_path {
            Some(path) => self.preferences.save_to(path),
            None => self.preferences.save(),
        }
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Refetch the current tab from scratch
    pub fn reload(&mut self) {
        self.selection = 0;
        self.load_current_tab();
    }

    /// Spawn the fetch for the current tab under a fresh generation.
    pub fn load_current_tab(&mut self) {
        let tab = self.current_tab;
        if !tab.fetches() {
            return;
        }
        // Guard: protected views only fetch for a live session
        if !self.services.session.handle().ensure_active() {
            self.drain_session_events();
            return;
        }

        let generation = self.generations.bump(tab);
        self.loading.insert(tab);

        let data = self.services.data.clone();
        let tx = self.view_tx.clone();
        let user_query = self.user_query.clone();
        let transaction_query = self.transaction_query.clone();
        let ticket_query = self.ticket_query.clone();
        let audit_query = self.audit_query.clone();
        let range = self.date_range;

        debug!(tab = tab.title(), generation, "Fetching view");

        tokio::spawn(async move {
            let payload = match tab {
                Tab::Dashboard => ViewPayload::Dashboard(data.dashboard().await),
                Tab::Users => ViewPayload::Users(data.users(&user_query).await),
                Tab::Transactions => {
                    ViewPayload::Transactions(data.transactions(&transaction_query).await)
                }
                Tab::Tickets => ViewPayload::Tickets(data.tickets(&ticket_query).await),
                Tab::Analytics => ViewPayload::Analytics(data.analytics(range).await),
                Tab::AuditLogs => ViewPayload::AuditLogs(data.audit_logs(&audit_query).await),
                Tab::Reports => ViewPayload::Reports(data.reports().await),
                Tab::Settings => return,
            };
            let _ = tx
                .send(ViewUpdate {
                    tab,
                    generation,
                    payload,
                })
                .await;
        });
    }

    /// Request a new report of the selected type.
    pub fn generate_report(&mut self) {
        if self.generating_report {
            return;
        }
        if !self.services.session.handle().ensure_active() {
            self.drain_session_events();
            return;
        }

        self.generating_report = true;
        self.status_message = Some(format!("Generating {} report...", self.report_type.label()));

        let request = ReportRequest {
            report_type: self.report_type,
            date_from: None,
            date_to: None,
        };
        let data = self.services.data.clone();
        let tx = self.view_tx.clone();
        let epoch = self.session_epoch;

        tokio::spawn(async move {
            let result = data
                .generate_report(&request)
                .await
                .map_err(|e| e.to_string());
            let _ = tx
                .send(ViewUpdate {
                    tab: Tab::Reports,
                    generation: epoch,
                    payload: ViewPayload::ReportGenerated(result),
                })
                .await;
        });
    }

    /// Collect finished fetches and apply the ones still current.
    pub fn check_background_tasks(&mut self) {
        if let Ok(outcome) = self.login_rx.try_recv() {
            self.apply_login_outcome(outcome);
        }

        let mut updates = Vec::new();
        while let Ok(update) = self.view_rx.try_recv() {
            updates.push(update);
        }

        for update in updates {
            self.process_view_update(update);
        }
    }

    fn process_view_update(&mut self, update: ViewUpdate) {
        let ViewUpdate {
            tab,
            generation,
            payload,
        } = update;

        // Writes are tagged with the session epoch rather than the tab
        // generation, so leaving the tab does not lose the new report.
        if let ViewPayload::ReportGenerated(result) = payload {
            if generation != self.session_epoch {
                debug!("Dropping report result from an earlier session");
                return;
            }
            self.generating_report = false;
            match result {
                Ok(report) => {
                    self.status_message = Some(format!("{} queued", report.name));
                    if let Some(reports) = self.views.reports.as_mut() {
                        reports.data.insert(0, report);
                    }
                }
                Err(e) => {
                    self.status_message = Some(format!("Report generation failed: {}", e));
                }
            }
            return;
        }

        if !self.generations.is_current(tab, generation) {
            debug!(tab = tab.title(), generation, "Dropping stale view result");
            return;
        }
        self.loading.remove(&tab);

        match payload {
            ViewPayload::Dashboard(v) => self.views.dashboard = Some(v),
            ViewPayload::Users(v) => self.views.users = Some(v),
            ViewPayload::Transactions(v) => self.views.transactions = Some(v),
            ViewPayload::Tickets(v) => self.views.tickets = Some(v),
            ViewPayload::Analytics(v) => self.views.analytics = Some(v),
            ViewPayload::AuditLogs(v) => self.views.audit_logs = Some(v),
            ViewPayload::Reports(v) => self.views.reports = Some(v),
            ViewPayload::ReportGenerated(_) => {}
        }

        let count = self.views.row_count(tab);
        if tab == self.current_tab && self.selection >= count {
            self.selection = count.saturating_sub(1);
        }
    }

    pub fn is_loading(&self, tab: Tab) -> bool {
        self.loading.contains(&tab)
    }

    /// Wait for the in-flight login request and apply its outcome
    #[cfg(test)]
    pub(crate) async fn finish_login(&mut self) {
        let outcome = tokio::time::timeout(std::time::Duration::from_secs(5), self.login_rx.recv())
            .await
            .expect("login finished")
            .expect("channel open");
        self.apply_login_outcome(outcome);
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Next value after `current` in `options`, wrapping around
fn cycle<T: Copy + PartialEq>(options: &[T], current: T) -> T {
    let idx = options.iter().position(|o| *o == current).unwrap_or(0);
    options
        .get((idx + 1) % options.len().max(1))
        .copied()
        .unwrap_or(current)
}

/// Check if a character is valid for text input fields.
/// Filters out control characters.
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a character can be added to the login identifier.
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a character can be added to the login secret.
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use backoffice_core::auth::MemoryTokenStore;
    use backoffice_core::clock::ManualClock;
    use backoffice_core::config::{AppMode, SessionPolicy, TokenBackend};
    use backoffice_core::data::DataOrigin;
    use chrono::Utc;

    fn demo_settings() -> Settings {
        Settings {
            mode: AppMode::Demo,
            api_base_url: None,
            policy: SessionPolicy::default(),
            token_backend: TokenBackend::File,
        }
    }

    fn demo_app(dir: &tempfile::TempDir) -> (App, Arc<ManualClock>) {
        let settings = demo_settings();
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let services = Services::assemble(
            &settings,
            Arc::new(MemoryTokenStore::new()),
            clock.clone(),
        )
        .expect("services");
        let app = App::new(
            settings,
            services,
            Preferences::default(),
            Some(dir.path().join("config.json")),
        );
        (app, clock)
    }

    async fn signed_in_app(dir: &tempfile::TempDir) -> (App, Arc<ManualClock>) {
        let (mut app, clock) = demo_app(dir);
        app.initialize().await;
        app.login_username = "adminbreakfree".to_string();
        app.login_password = "open4u".to_string();
        app.attempt_login();
        app.finish_login().await;
        (app, clock)
    }

    /// Wait for the next fetch result and apply it
    async fn settle(app: &mut App) {
        let update = tokio::time::timeout(std::time::Duration::from_secs(5), app.view_rx.recv())
            .await
            .expect("fetch finished")
            .expect("channel open");
        app.process_view_update(update);
    }

    // -------------------------------------------------------------------------
    // Tab Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_tab_next() {
        assert_eq!(Tab::Dashboard.next(), Tab::Users);
        assert_eq!(Tab::Reports.next(), Tab::Settings);
        assert_eq!(Tab::Settings.next(), Tab::Dashboard);
    }

    #[test]
    fn test_tab_prev() {
        assert_eq!(Tab::Users.prev(), Tab::Dashboard);
        assert_eq!(Tab::Dashboard.prev(), Tab::Settings);
    }

    #[test]
    fn test_tab_from_digit() {
        assert_eq!(Tab::from_digit('1'), Some(Tab::Dashboard));
        assert_eq!(Tab::from_digit('6'), Some(Tab::AuditLogs));
        assert_eq!(Tab::from_digit('8'), Some(Tab::Settings));
        assert_eq!(Tab::from_digit('0'), None);
        assert_eq!(Tab::from_digit('9'), None);
        assert_eq!(Tab::from_digit('x'), None);
    }

    // -------------------------------------------------------------------------
    // Generation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_generations_are_per_tab() {
        let mut generations = Generations::default();
        let users = generations.bump(Tab::Users);
        generations.bump(Tab::Tickets);
        assert!(generations.is_current(Tab::Users, users));
        generations.bump(Tab::Users);
        assert!(!generations.is_current(Tab::Users, users));
    }

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(cycle(&UserStatus::FILTERS, None), Some(UserStatus::Active));
        assert_eq!(cycle(&UserStatus::FILTERS, Some(UserStatus::Suspended)), None);
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(0, '@'));
        assert!(!can_add_username_char(MAX_USERNAME_LENGTH, 'a'));
        assert!(!can_add_username_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(MAX_PASSWORD_LENGTH - 1, '!'));
        assert!(!can_add_password_char(MAX_PASSWORD_LENGTH, '!'));
        assert!(!can_add_password_char(0, '\t'));
    }

    // -------------------------------------------------------------------------
    // Session Flow Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_initialize_without_token_shows_login() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, _) = demo_app(&dir);
        app.initialize().await;
        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(app.login_focus, LoginFocus::Username);
    }

    #[tokio::test]
    async fn test_login_with_wrong_secret_shows_hint() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, _) = demo_app(&dir);
        app.initialize().await;
        app.login_username = "adminbreakfree".to_string();
        app.login_password = "nope".to_string();
        app.attempt_login();
        assert!(app.signing_in);
        app.finish_login().await;
        assert!(!app.signing_in);

        assert_eq!(app.state, AppState::LoggingIn);
        let error = app.login_error.clone().expect("error shown");
        assert!(error.contains("adminbreakfree / open4u"));
        assert!(app.login_password.is_empty());
    }

    #[tokio::test]
    async fn test_resubmit_while_signing_in_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, _) = demo_app(&dir);
        app.initialize().await;
        app.login_username = "adminbreakfree".to_string();
        app.login_password = "open4u".to_string();
        app.attempt_login();
        app.attempt_login();
        app.finish_login().await;

        assert_eq!(app.state, AppState::Normal);
        let second =
            tokio::time::timeout(std::time::Duration::from_millis(100), app.login_rx.recv()).await;
        assert!(second.is_err(), "only one login request was sent");
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, _) = demo_app(&dir);
        app.initialize().await;
        app.attempt_login();
        assert_eq!(app.login_error.as_deref(), Some("Email and password required"));
        assert!(!app.signing_in);
    }

    #[tokio::test]
    async fn test_login_loads_dashboard_and_remembers_email() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, _) = signed_in_app(&dir).await;
        assert_eq!(app.state, AppState::Normal);
        assert!(app.is_loading(Tab::Dashboard));

        settle(&mut app).await;
        let dashboard = app.views.dashboard.as_ref().expect("dashboard loaded");
        assert_eq!(dashboard.origin, DataOrigin::Demo);
        assert!(!app.is_loading(Tab::Dashboard));

        let saved = Preferences::load_from(&dir.path().join("config.json")).expect("prefs");
        assert_eq!(saved.last_email.as_deref(), Some("adminbreakfree"));
    }

    #[tokio::test]
    async fn test_expiry_returns_to_login_and_clears_views() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, clock) = signed_in_app(&dir).await;
        settle(&mut app).await;
        assert!(app.views.dashboard.is_some());

        clock.advance(Duration::minutes(16));
        app.switch_tab(Tab::Users);

        assert_eq!(app.state, AppState::LoggingIn);
        assert!(app.views.dashboard.is_none());
        assert_eq!(
            app.login_error.as_deref(),
            Some(SignOutReason::Expired.message())
        );
    }

    #[tokio::test]
    async fn test_logout_returns_to_login_without_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, _) = signed_in_app(&dir).await;
        app.logout();
        assert_eq!(app.state, AppState::LoggingIn);
        assert!(app.login_error.is_none());
        assert!(app.principal().is_none());
    }

    #[tokio::test]
    async fn test_session_warning_window() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, clock) = signed_in_app(&dir).await;
        assert!(!app.session_warning());

        clock.advance(Duration::minutes(14));
        assert!(app.session_warning());

        app.extend_session();
        assert!(!app.session_warning());
        assert!(app.status_message.as_deref().is_some_and(|m| m.starts_with("Session extended")));
    }

    // -------------------------------------------------------------------------
    // Fetch Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_stale_result_is_dropped_after_tab_switch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, _) = signed_in_app(&dir).await;

        // Leave the dashboard before its fetch is applied
        app.switch_tab(Tab::Users);
        settle(&mut app).await;
        settle(&mut app).await;

        assert!(app.views.dashboard.is_none());
        assert!(app.views.users.is_some());
    }

    #[tokio::test]
    async fn test_user_filter_refetches_first_page() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, _) = signed_in_app(&dir).await;
        settle(&mut app).await;
        app.switch_tab(Tab::Users);
        settle(&mut app).await;
        let all = app.views.row_count(Tab::Users);
        assert!(all > 0);

        app.cycle_user_status();
        assert_eq!(app.user_query.status, Some(UserStatus::Active));
        settle(&mut app).await;
        let users = app.views.users.as_ref().expect("users");
        assert!(users.data.items.iter().all(|u| u.status == UserStatus::Active));
        assert_eq!(users.data.page, 1);
    }

    #[tokio::test]
    async fn test_paging_stops_at_first_page() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, _) = signed_in_app(&dir).await;
        settle(&mut app).await;
        app.user_query.limit = 1;
        app.switch_tab(Tab::Users);
        settle(&mut app).await;

        app.prev_page();
        assert_eq!(app.user_query.page, 1);
        assert!(!app.is_loading(Tab::Users));

        app.next_page();
        settle(&mut app).await;
        let users = app.views.users.as_ref().expect("users");
        assert_eq!(users.data.page, 2);
        assert!(users.data.has_prev());

        app.prev_page();
        settle(&mut app).await;
        assert_eq!(app.user_query.page, 1);
        assert_eq!(app.views.users.as_ref().expect("users").data.page, 1);
    }

    #[tokio::test]
    async fn test_search_apply_and_cancel() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, _) = signed_in_app(&dir).await;
        settle(&mut app).await;
        app.switch_tab(Tab::Transactions);
        settle(&mut app).await;

        app.start_search();
        assert_eq!(app.state, AppState::Searching);
        for c in "no-such-transaction".chars() {
            app.push_search_char(c);
        }
        app.apply_search();
        settle(&mut app).await;
        assert_eq!(app.transaction_query.search, "no-such-transaction");
        assert_eq!(app.views.row_count(Tab::Transactions), 0);

        app.start_search();
        app.cancel_search();
        settle(&mut app).await;
        assert!(app.transaction_query.search.is_empty());
        assert!(app.views.row_count(Tab::Transactions) > 0);
    }

    #[tokio::test]
    async fn test_generate_report_in_demo_mode() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, _) = signed_in_app(&dir).await;
        settle(&mut app).await;
        app.switch_tab(Tab::Reports);
        settle(&mut app).await;
        let before = app.views.row_count(Tab::Reports);

        app.cycle_report_type();
        assert_eq!(app.report_type, ReportType::Users);
        app.generate_report();
        assert!(app.generating_report);
        settle(&mut app).await;

        assert!(!app.generating_report);
        let reports = app.views.reports.as_ref().expect("reports");
        assert_eq!(reports.data.len(), before + 1);
        assert_eq!(reports.data[0].name, "Users Report");
    }

    #[tokio::test]
    async fn test_toggle_setting_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, _) = demo_app(&dir);
        app.toggle_setting(1);
        assert!(!app.preferences.security_alerts);

        let saved = Preferences::load_from(&dir.path().join("config.json")).expect("prefs");
        assert!(!saved.security_alerts);
        assert!(saved.email_notifications);
    }
}
