//! Application shell: owns the active screen, routes between screens and
//! runs the commands they return.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::Theme;
use crate::api::ProductApi;
use crate::commands::Command;
use crate::config::{GlobalAction, KeyResolver};
use crate::screen::{DashboardScreen, LoginScreen, RegisterScreen, Screen, ScreenMsg};
use crate::session::CredentialStore;
use crate::tui::{Event, Tui};
use crate::ui::{
    Component, ErrorDialog, ErrorDialogEvent, EventResult, Result, STATUS_BAR_HEIGHT, StatusBar,
};
use crate::viewmodel::Route;

const FRAME_RATE: f64 = 30.0;
const TICK_RATE: f64 = 8.0;

/// Messages the App sends to itself.
#[derive(Debug)]
enum AppMessage {
    Quit,
    /// Suspend the process (Ctrl+Z)
    Suspend,
    DisplayError(String),
    /// A command finished; the screen may have messages waiting
    CommandCompleted { name: String, success: bool },
}

pub struct App {
    screen: Box<dyn Screen>,
    api: Arc<dyn ProductApi>,
    credentials: Arc<dyn CredentialStore>,
    resolver: Arc<KeyResolver>,
    theme: Theme,
    status_bar: StatusBar,
    error_dialog: Option<ErrorDialog>,
    /// Pre-filled on every fresh login screen
    login_email: String,
    should_quit: bool,
    should_suspend: bool,
    msg_tx: UnboundedSender<AppMessage>,
    msg_rx: UnboundedReceiver<AppMessage>,
}

impl App {
    /// Build the App on the dashboard if a credential is already stored,
    /// on the login screen otherwise.
    pub fn new(
        api: Arc<dyn ProductApi>,
        credentials: Arc<dyn CredentialStore>,
        resolver: Arc<KeyResolver>,
        theme: Theme,
        api_url: &str,
        login_email: String,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let start = if credentials.get().is_some() {
            Route::Dashboard
        } else {
            Route::Login
        };
        let screen = Self::build_screen(start, &api, &resolver, &login_email);
        Self {
            screen,
            status_bar: StatusBar::new(api_url, Arc::clone(&resolver)),
            api,
            credentials,
            resolver,
            theme,
            error_dialog: None,
            login_email,
            should_quit: false,
            should_suspend: false,
            msg_tx,
            msg_rx,
        }
    }

    /// Run until the user quits.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up, drawn to or restored.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(FRAME_RATE, TICK_RATE)?;
        tui.enter()?;
        self.start();

        loop {
            tokio::select! {
                event = tui.next_event() => match event {
                    Some(event) => self.handle_event(event, &mut tui)?,
                    None => break,
                },
                Some(msg) = self.msg_rx.recv() => self.handle_message(msg),
            }

            if self.should_suspend {
                self.should_suspend = false;
                tui.suspend()?;
                tui.resume()?;
                tui.clear()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        info!("Exiting stockdesk");
        Ok(())
    }

    /// Initialise the first screen.
    fn start(&mut self) {
        info!(route = %self.screen.route(), "Starting");
        self.screen.init();
        self.update_screen();
    }

    fn handle_event(&mut self, event: Event, tui: &mut Tui) -> Result<()> {
        match event {
            Event::Init => {}
            Event::Quit => self.should_quit = true,
            Event::Error(error) => warn!(%error, "Terminal event error"),
            Event::Tick => self.screen.handle_tick(),
            Event::Render => {
                tui.draw(|frame| self.render(frame))?;
            }
            Event::Resize(width, height) => {
                tui.resize(Rect::new(0, 0, width, height))?;
                tui.draw(|frame| self.render(frame))?;
            }
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) => self.handle_paste(&text),
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if let Some(dialog) = &mut self.error_dialog {
            match dialog.handle_key(key) {
                Ok(EventResult::Event(ErrorDialogEvent::Dismissed)) => self.error_dialog = None,
                Ok(_) => {}
                Err(error) => warn!(%error, "Error dialog failed to handle key"),
            }
            return;
        }

        if key.code == KeyCode::Char('z') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.send(AppMessage::Suspend);
            return;
        }

        match self.screen.handle_key(key) {
            Ok(result) if result.is_consumed() => self.update_screen(),
            Ok(_) => {
                if self.resolver.matches_global(&key, GlobalAction::Quit) {
                    self.send(AppMessage::Quit);
                }
            }
            Err(error) => self.show_error(format!("{error:#}")),
        }
    }

    /// Pasted text only ever lands in a text field, never in key bindings.
    fn handle_paste(&mut self, text: &str) {
        if self.error_dialog.is_some() {
            return;
        }
        if self.screen.handle_paste(text) {
            self.update_screen();
        }
    }

    fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Quit => self.should_quit = true,
            AppMessage::Suspend => self.should_suspend = true,
            AppMessage::DisplayError(message) => self.show_error(message),
            AppMessage::CommandCompleted { name, success } => {
                debug!(%name, success, "Command completed");
                self.update_screen();
            }
        }
    }

    fn send(&self, msg: AppMessage) {
        // The receiver is owned by self.
        let _ = self.msg_tx.send(msg);
    }

    /// Let the screen process its queue and act on the outcome.
    fn update_screen(&mut self) {
        match self.screen.update() {
            Ok(msg) => self.apply(msg),
            Err(error) => self.show_error(format!("{error:#}")),
        }
    }

    fn apply(&mut self, msg: ScreenMsg) {
        match msg {
            ScreenMsg::Idle => {}
            ScreenMsg::Run(commands) => {
                for command in commands {
                    self.spawn(command);
                }
            }
            ScreenMsg::Navigate(route) => self.navigate(route),
            ScreenMsg::Logout => self.logout(),
        }
    }

    fn spawn(&self, command: Box<dyn Command>) {
        let name = command.name();
        let tx = self.msg_tx.clone();
        debug!(%name, "Spawning command");
        tokio::spawn(async move {
            let result = command.execute().await;
            if let Err(error) = &result {
                warn!(%name, %error, "Command failed");
                let _ = tx.send(AppMessage::DisplayError(format!("{name} failed: {error}")));
            }
            let _ = tx.send(AppMessage::CommandCompleted {
                name,
                success: result.is_ok(),
            });
        });
    }

    fn build_screen(
        route: Route,
        api: &Arc<dyn ProductApi>,
        resolver: &Arc<KeyResolver>,
        login_email: &str,
    ) -> Box<dyn Screen> {
        let api = Arc::clone(api);
        let resolver = Arc::clone(resolver);
        match route {
            Route::Login => Box::new(LoginScreen::new(login_email, api, resolver)),
            Route::Register => Box::new(RegisterScreen::new(api, resolver)),
            Route::Dashboard => Box::new(DashboardScreen::new(api, resolver)),
        }
    }

    /// Replace the active screen. Responses still in flight for the old
    /// screen are dropped when they arrive.
    fn navigate(&mut self, route: Route) {
        info!(from = %self.screen.route(), to = %route, "Navigating");
        self.screen = Self::build_screen(route, &self.api, &self.resolver, &self.login_email);
        self.screen.init();
        self.update_screen();
    }

    /// Forget the credential and go back to the login screen, whatever state
    /// the dashboard was in.
    fn logout(&mut self) {
        if let Err(error) = self.credentials.clear() {
            warn!(%error, "Failed to clear credential");
            self.show_error(format!("Could not remove the stored session: {error}"));
        }
        info!("Logged out");
        self.navigate(Route::Login);
    }

    fn show_error(&mut self, message: String) {
        self.error_dialog = Some(ErrorDialog::new(message, Arc::clone(&self.resolver)));
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [main, status] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_BAR_HEIGHT)])
                .areas(area);

        self.screen.render(frame, main, &self.theme);
        self.status_bar.render(
            frame,
            status,
            &self.theme,
            &self.screen.route().to_string(),
            self.credentials.get().is_some(),
            &self.screen.keybindings(),
        );

        if let Some(dialog) = &mut self.error_dialog {
            dialog.render(frame, area, &self.theme);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;
    use crate::screen::testing::{FakeApi, key, keys, pen};
    use crate::session::{MemoryCredentialStore, SessionError};

    fn app_with(credentials: Arc<dyn CredentialStore>) -> App {
        App::new(
            Arc::new(FakeApi {
                products: vec![pen()],
            }),
            credentials,
            Arc::new(KeyResolver::default()),
            Theme::default(),
            "http://localhost:3000/",
            String::new(),
        )
    }

    fn signed_in() -> Arc<MemoryCredentialStore> {
        let store = Arc::new(MemoryCredentialStore::new());
        store.set(SecretString::from("t0k3n")).unwrap();
        store
    }

    /// Wait for the next command to finish and let the App react.
    async fn settle(app: &mut App) {
        let msg = tokio::time::timeout(Duration::from_secs(5), app.msg_rx.recv())
            .await
            .unwrap()
            .unwrap();
        app.handle_message(msg);
    }

    #[tokio::test]
    async fn test_starts_on_login_without_credential() {
        let mut app = app_with(Arc::new(MemoryCredentialStore::new()));
        app.start();
        assert_eq!(app.screen.route(), Route::Login);
    }

    #[tokio::test]
    async fn test_starts_on_dashboard_with_credential() {
        let mut app = app_with(signed_in());
        app.start();
        assert_eq!(app.screen.route(), Route::Dashboard);

        // The initial product fetch completes.
        settle(&mut app).await;
        assert_eq!(app.screen.route(), Route::Dashboard);
        assert!(app.error_dialog.is_none());
    }

    #[tokio::test]
    async fn test_login_navigates_to_dashboard() {
        let mut app = app_with(Arc::new(MemoryCredentialStore::new()));
        app.start();
        for event in keys("a@b.com") {
            app.handle_key(event);
        }
        app.handle_key(key(KeyCode::Tab));
        for event in keys("secret") {
            app.handle_key(event);
        }
        app.handle_key(key(KeyCode::Enter));

        settle(&mut app).await;
        assert_eq!(app.screen.route(), Route::Dashboard);
    }

    #[tokio::test]
    async fn test_logout_clears_credential() {
        let store = signed_in();
        let mut app = app_with(store.clone());
        app.start();

        app.handle_key(KeyEvent::new(KeyCode::Char('L'), KeyModifiers::SHIFT));
        assert_eq!(app.screen.route(), Route::Login);
        assert!(store.get().is_none());

        // The fetch started by the dashboard lands after logout and is dropped.
        settle(&mut app).await;
        assert_eq!(app.screen.route(), Route::Login);
    }

    #[tokio::test]
    async fn test_paste_never_triggers_dashboard_bindings() {
        let store = signed_in();
        let mut app = app_with(store.clone());
        app.start();
        settle(&mut app).await;

        app.handle_paste("dy");
        let nothing_ran =
            tokio::time::timeout(Duration::from_millis(200), app.msg_rx.recv()).await;
        assert!(nothing_ran.is_err(), "pasting must not delete a product");

        app.handle_paste("L");
        assert!(app.msg_rx.try_recv().is_err());
        assert_eq!(app.screen.route(), Route::Dashboard);
        assert!(store.get().is_some());
    }

    #[tokio::test]
    async fn test_paste_fills_login_form() {
        let mut app = app_with(Arc::new(MemoryCredentialStore::new()));
        app.start();
        app.handle_paste("a@b.com");
        app.handle_key(key(KeyCode::Tab));
        app.handle_paste("secret");
        app.handle_key(key(KeyCode::Enter));

        settle(&mut app).await;
        assert_eq!(app.screen.route(), Route::Dashboard);
    }

    struct StuckStore;

    impl CredentialStore for StuckStore {
        fn set(&self, _: SecretString) -> std::result::Result<(), SessionError> {
            Ok(())
        }

        fn get(&self) -> Option<SecretString> {
            Some(SecretString::from("t0k3n"))
        }

        fn clear(&self) -> std::result::Result<(), SessionError> {
            Err(SessionError::Remove {
                path: PathBuf::from("/nowhere/authToken"),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        }
    }

    #[tokio::test]
    async fn test_logout_navigates_even_if_clearing_fails() {
        let mut app = app_with(Arc::new(StuckStore));
        app.start();
        app.apply(ScreenMsg::Logout);
        assert_eq!(app.screen.route(), Route::Login);
        assert!(app.error_dialog.is_some());
    }

    #[tokio::test]
    async fn test_register_link_and_back() {
        let mut app = app_with(Arc::new(MemoryCredentialStore::new()));
        app.start();
        app.handle_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL));
        assert_eq!(app.screen.route(), Route::Register);
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.screen.route(), Route::Login);
    }

    #[tokio::test]
    async fn test_quit_only_when_screen_ignores_key() {
        let mut app = app_with(Arc::new(MemoryCredentialStore::new()));
        app.start();
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.msg_rx.try_recv().is_err(), "q is typed into the email field");

        let mut app = app_with(signed_in());
        app.start();
        app.handle_key(key(KeyCode::Char('q')));
        assert!(matches!(app.msg_rx.try_recv(), Ok(AppMessage::Quit)));
    }

    #[tokio::test]
    async fn test_error_dialog_is_modal() {
        let mut app = app_with(signed_in());
        app.start();
        app.handle_message(AppMessage::DisplayError("boom".to_string()));

        app.handle_key(key(KeyCode::Char('L')));
        assert_eq!(app.screen.route(), Route::Dashboard);

        app.handle_key(key(KeyCode::Enter));
        assert!(app.error_dialog.is_none());
    }
}
