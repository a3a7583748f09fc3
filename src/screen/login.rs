//! Login screen.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::Theme;
use crate::api::{ApiResponse, ProductApi};
use crate::config::{FormAction, KeyResolver, LoginAction};
use crate::screen::{Batch, Effects, Screen, ScreenMsg};
use crate::ui::{
    Component, EventResult, Form, FormEvent, Keybinding, MessageLine, Result, TextInput,
};
use crate::viewmodel::{LoginViewModel, Route};

const EMAIL: usize = 0;
const PASSWORD: usize = 1;

enum LoginMsg {
    Submit,
    Response(ApiResponse),
    Redirect(Route),
}

impl From<ApiResponse> for LoginMsg {
    fn from(response: ApiResponse) -> Self {
        Self::Response(response)
    }
}

impl From<Route> for LoginMsg {
    fn from(route: Route) -> Self {
        Self::Redirect(route)
    }
}

pub struct LoginScreen {
    vm: LoginViewModel,
    form: Form,
    message_line: MessageLine,
    effects: Effects<LoginMsg>,
    msg_rx: UnboundedReceiver<LoginMsg>,
    resolver: Arc<KeyResolver>,
}

impl LoginScreen {
    /// `email` pre-fills the email field.
    pub fn new(email: &str, api: Arc<dyn ProductApi>, resolver: Arc<KeyResolver>) -> Self {
        let (tx, msg_rx) = mpsc::unbounded_channel();
        let mut form = Form::new(
            "Sign in",
            vec![
                TextInput::new("Email").with_placeholder("you@example.com"),
                TextInput::new("Password").masked(),
            ],
            Arc::clone(&resolver),
        );
        form.set_value(EMAIL, email);

        Self {
            vm: LoginViewModel::new(email),
            form,
            message_line: MessageLine::new(),
            effects: Effects::new(api, tx),
            msg_rx,
            resolver,
        }
    }

    fn sync_to_vm(&mut self) {
        self.vm.email = self.form.value(EMAIL).to_string();
        self.vm.password = self.form.value(PASSWORD).to_string();
    }

    fn process_message(&mut self, msg: LoginMsg) -> ScreenMsg {
        match msg {
            LoginMsg::Submit => {
                let effect = self.vm.submit();
                self.effects.apply(effect)
            }
            LoginMsg::Redirect(route) => ScreenMsg::Navigate(route),
            LoginMsg::Response(response) => {
                let effect = self.vm.resolve(response);
                self.effects.apply(effect)
            }
        }
    }
}

impl Screen for LoginScreen {
    fn handle_tick(&mut self) {
        self.message_line.handle_tick(self.vm.is_busy());
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        if self.resolver.matches_login(&key, LoginAction::Register) {
            self.effects.queue(LoginMsg::Redirect(Route::Register));
            return Ok(EventResult::Consumed);
        }

        Ok(match self.form.handle_key(key)? {
            EventResult::Event(FormEvent::Changed) => {
                self.sync_to_vm();
                EventResult::Consumed
            }
            EventResult::Event(FormEvent::Submitted) => {
                self.sync_to_vm();
                self.effects.queue(LoginMsg::Submit);
                EventResult::Consumed
            }
            EventResult::Event(FormEvent::Cancelled) | EventResult::Ignored => {
                EventResult::Ignored
            }
            EventResult::Consumed => EventResult::Consumed,
        })
    }

    fn handle_paste(&mut self, text: &str) -> bool {
        let changed = self.form.handle_paste(text);
        if changed {
            self.sync_to_vm();
        }
        changed
    }

    fn update(&mut self) -> Result<ScreenMsg> {
        let mut batch = Batch::default();
        while let Ok(msg) = self.msg_rx.try_recv() {
            let result = self.process_message(msg);
            if let Some(done) = batch.absorb(result) {
                return Ok(done);
            }
        }
        Ok(batch.finish())
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let height = self.form.height() + 3;
        let panel = area.centered(Constraint::Max(64), Constraint::Length(height));
        let [form_area, _, message_area, hint_area] = Layout::vertical([
            Constraint::Length(self.form.height()),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(panel);

        self.form.render(frame, form_area, theme);
        self.message_line.render(
            frame,
            message_area,
            theme,
            self.vm.status(),
            self.vm.is_busy(),
        );

        let hint = format!(
            "No account yet? Press {} to register",
            self.resolver.display_login(LoginAction::Register)
        );
        frame.render_widget(
            Paragraph::new(Line::from(hint).centered()).style(Style::default().fg(theme.overlay1())),
            hint_area,
        );
    }

    fn route(&self) -> Route {
        Route::Login
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::new(self.resolver.display_form(FormAction::Submit), "Sign in"),
            Keybinding::new(self.resolver.display_form(FormAction::Next), "Next field"),
            Keybinding::new(self.resolver.display_login(LoginAction::Register), "Register"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;
    use crate::screen::testing::{FakeApi, key, keys};

    fn screen(email: &str) -> LoginScreen {
        LoginScreen::new(
            email,
            Arc::new(FakeApi { products: vec![] }),
            Arc::new(KeyResolver::default()),
        )
    }

    fn type_text(screen: &mut LoginScreen, text: &str) {
        for event in keys(text) {
            screen.handle_key(event).unwrap();
        }
    }

    #[test]
    fn test_prefilled_email() {
        let screen = screen("a@b.com");
        assert_eq!(screen.form.value(EMAIL), "a@b.com");
        assert_eq!(screen.vm.email, "a@b.com");
    }

    #[test]
    fn test_typing_reaches_view_model() {
        let mut screen = screen("");
        type_text(&mut screen, "a@b.com");
        screen.handle_key(key(KeyCode::Tab)).unwrap();
        type_text(&mut screen, "pw");
        assert_eq!(screen.vm.email, "a@b.com");
        assert_eq!(screen.vm.password, "pw");
    }

    #[test]
    fn test_paste_fills_focused_field() {
        let mut screen = screen("");
        assert!(screen.handle_paste("a@b.com"));
        screen.handle_key(key(KeyCode::Tab)).unwrap();
        assert!(screen.handle_paste("secret"));
        assert_eq!(screen.vm.email, "a@b.com");
        assert_eq!(screen.vm.password, "secret");
        assert!(matches!(screen.update().unwrap(), ScreenMsg::Idle));
    }

    #[test]
    fn test_empty_submit_reports_error_without_request() {
        let mut screen = screen("");
        screen.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(matches!(screen.update().unwrap(), ScreenMsg::Idle));
        assert_eq!(
            screen.vm.status().map(|m| m.text().to_string()),
            Some("Email and password are required".to_string())
        );
    }

    #[test]
    fn test_submit_runs_login_command() {
        let mut screen = screen("a@b.com");
        screen.handle_key(key(KeyCode::Tab)).unwrap();
        type_text(&mut screen, "pw");
        screen.handle_key(key(KeyCode::Enter)).unwrap();

        let ScreenMsg::Run(commands) = screen.update().unwrap() else {
            panic!("expected a command");
        };
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].name(), "Logging in as a@b.com");
        assert!(screen.vm.is_busy());
    }

    #[test]
    fn test_success_navigates_to_dashboard() {
        let mut screen = screen("a@b.com");
        screen.effects.queue(LoginMsg::Response(ApiResponse::LoggedIn(Ok(()))));
        assert!(matches!(
            screen.update().unwrap(),
            ScreenMsg::Navigate(Route::Dashboard)
        ));
    }

    #[test]
    fn test_ctrl_r_opens_registration() {
        let mut screen = screen("");
        let result = screen
            .handle_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL))
            .unwrap();
        assert!(result.is_consumed());
        assert!(matches!(
            screen.update().unwrap(),
            ScreenMsg::Navigate(Route::Register)
        ));
        assert_eq!(screen.form.value(EMAIL), "");
    }
}
