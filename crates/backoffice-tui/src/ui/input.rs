//! Keyboard input handling for the TUI.
//!
//! Translates key events into application state changes. Overlays (login,
//! help, quit, search) take every key while open.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{can_add_password_char, can_add_username_char, App, AppState, LoginFocus, Tab};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::Initializing => {
            if matches!(key.code, KeyCode::Esc) {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            return Ok(false);
        }
        AppState::LoggingIn => return handle_login_input(app, key),
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Searching => {
            handle_search_input(app, key);
            return Ok(false);
        }
        AppState::Normal | AppState::Quitting => {}
    }

    app.status_message = None;

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('r') => {
            app.reload();
            return Ok(false);
        }
        KeyCode::Char('x') => {
            app.extend_session();
            return Ok(false);
        }
        KeyCode::Char('o') => {
            app.logout();
            return Ok(false);
        }
        KeyCode::Char('/') => {
            app.start_search();
            return Ok(false);
        }
        KeyCode::Char(c) if c.is_ascii_digit() => {
            if let Some(tab) = Tab::from_digit(c) {
                app.switch_tab(tab);
            }
            return Ok(false);
        }
        KeyCode::Left | KeyCode::BackTab => {
            app.switch_tab(app.current_tab.prev());
            return Ok(false);
        }
        KeyCode::Right | KeyCode::Tab => {
            app.switch_tab(app.current_tab.next());
            return Ok(false);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.select_prev();
            return Ok(false);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.select_next();
            return Ok(false);
        }
        KeyCode::Char(']') | KeyCode::PageDown => {
            app.next_page();
            return Ok(false);
        }
        KeyCode::Char('[') | KeyCode::PageUp => {
            app.prev_page();
            return Ok(false);
        }
        _ => {}
    }

    handle_tab_input(app, key);
    Ok(false)
}

/// Keys that only mean something on one tab
fn handle_tab_input(app: &mut App, key: KeyEvent) {
    match (app.current_tab, key.code) {
        (Tab::Users, KeyCode::Char('s')) => app.cycle_user_status(),
        (Tab::Transactions, KeyCode::Char('t')) => app.cycle_transaction_type(),
        (Tab::Transactions, KeyCode::Char('s')) => app.cycle_transaction_status(),
        (Tab::Tickets, KeyCode::Char('s')) => app.cycle_ticket_status(),
        (Tab::Tickets, KeyCode::Char('p')) => app.cycle_ticket_priority(),
        (Tab::AuditLogs, KeyCode::Char('a')) => app.cycle_audit_action(),
        (Tab::Analytics, KeyCode::Char('d')) => app.cycle_date_range(),
        (Tab::Reports, KeyCode::Char('t')) => app.cycle_report_type(),
        (Tab::Reports, KeyCode::Char('g')) => app.generate_report(),
        (Tab::Settings, KeyCode::Enter | KeyCode::Char(' ')) => app.toggle_setting(app.selection),
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_search(),
        KeyCode::Enter => app.apply_search(),
        KeyCode::Backspace => {
            app.search_input.pop();
        }
        KeyCode::Char(c) => app.push_search_char(c),
        _ => {}
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        // The form is frozen while a request is in flight
        _ if app.signing_in => {}
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => {
                app.login_focus = LoginFocus::Password;
            }
            // Submitting from the password field is the common path
            LoginFocus::Password | LoginFocus::Button => {
                app.attempt_login();
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.chars().count(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use backoffice_core::auth::MemoryTokenStore;
    use backoffice_core::clock::SystemClock;
    use backoffice_core::config::{AppMode, Preferences, SessionPolicy, Settings, TokenBackend};
    use backoffice_core::Services;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(dir: &tempfile::TempDir) -> App {
        let settings = Settings {
            mode: AppMode::Demo,
            api_base_url: None,
            policy: SessionPolicy::default(),
            token_backend: TokenBackend::File,
        };
        let services = Services::assemble(
            &settings,
            Arc::new(MemoryTokenStore::new()),
            Arc::new(SystemClock),
        )
        .expect("services");
        App::new(
            settings,
            services,
            Preferences::default(),
            Some(dir.path().join("config.json")),
        )
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_input(app, key(KeyCode::Char(c))).expect("input");
        }
    }

    #[tokio::test]
    async fn test_login_form_flow() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app(&dir);
        app.initialize().await;
        assert_eq!(app.state, AppState::LoggingIn);

        type_text(&mut app, "adminbreakfree");
        handle_input(&mut app, key(KeyCode::Enter)).expect("input");
        assert_eq!(app.login_focus, LoginFocus::Password);

        type_text(&mut app, "open4u");
        handle_input(&mut app, key(KeyCode::Enter)).expect("input");
        assert!(app.signing_in);

        // Typing is ignored until the request finishes
        handle_input(&mut app, key(KeyCode::Char('z'))).expect("input");
        assert_eq!(app.login_password, "open4u");
        app.finish_login().await;

        assert_eq!(app.state, AppState::Normal);
        assert!(app.principal().is_some());
    }

    #[tokio::test]
    async fn test_escape_on_login_quits() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app(&dir);
        app.initialize().await;
        let quit = handle_input(&mut app, key(KeyCode::Esc)).expect("input");
        assert!(quit);
        assert_eq!(app.state, AppState::Quitting);
    }

    #[tokio::test]
    async fn test_quit_needs_confirmation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app(&dir);
        app.state = AppState::Normal;

        let quit = handle_input(&mut app, key(KeyCode::Char('q'))).expect("input");
        assert!(!quit);
        assert_eq!(app.state, AppState::ConfirmingQuit);

        handle_input(&mut app, key(KeyCode::Char('n'))).expect("input");
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, key(KeyCode::Char('q'))).expect("input");
        let quit = handle_input(&mut app, key(KeyCode::Char('y'))).expect("input");
        assert!(quit);
    }

    #[tokio::test]
    async fn test_digit_keys_switch_tabs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app(&dir);
        app.state = AppState::Normal;

        handle_input(&mut app, key(KeyCode::Char('6'))).expect("input");
        assert_eq!(app.current_tab, Tab::AuditLogs);
        handle_input(&mut app, key(KeyCode::Char('9'))).expect("input");
        assert_eq!(app.current_tab, Tab::AuditLogs);
        handle_input(&mut app, key(KeyCode::Right)).expect("input");
        assert_eq!(app.current_tab, Tab::Reports);
    }

    #[tokio::test]
    async fn test_settings_toggle_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app(&dir);
        app.state = AppState::Normal;

        handle_input(&mut app, key(KeyCode::Char('8'))).expect("input");
        handle_input(&mut app, key(KeyCode::Enter)).expect("input");
        assert!(!app.preferences.email_notifications);
        handle_input(&mut app, key(KeyCode::Down)).expect("input");
        handle_input(&mut app, key(KeyCode::Char(' '))).expect("input");
        assert!(!app.preferences.security_alerts);
    }
}
