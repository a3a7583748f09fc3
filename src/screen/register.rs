//! Registration screen.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::Theme;
use crate::api::{ApiResponse, ProductApi};
use crate::config::{FormAction, KeyResolver};
use crate::screen::{Batch, Effects, Screen, ScreenMsg};
use crate::ui::{
    Component, EventResult, Form, FormEvent, Keybinding, MessageLine, Result, TextInput,
};
use crate::viewmodel::{RegisterViewModel, Route};

const EMAIL: usize = 0;
const PASSWORD: usize = 1;
const CONFIRM: usize = 2;

enum RegisterMsg {
    Submit,
    Cancel,
    Response(ApiResponse),
    Redirect(Route),
}

impl From<ApiResponse> for RegisterMsg {
    fn from(response: ApiResponse) -> Self {
        Self::Response(response)
    }
}

impl From<Route> for RegisterMsg {
    fn from(route: Route) -> Self {
        Self::Redirect(route)
    }
}

pub struct RegisterScreen {
    vm: RegisterViewModel,
    form: Form,
    message_line: MessageLine,
    effects: Effects<RegisterMsg>,
    msg_rx: UnboundedReceiver<RegisterMsg>,
    resolver: Arc<KeyResolver>,
}

impl RegisterScreen {
    pub fn new(api: Arc<dyn ProductApi>, resolver: Arc<KeyResolver>) -> Self {
        let (tx, msg_rx) = mpsc::unbounded_channel();
        let form = Form::new(
            "Create account",
            vec![
                TextInput::new("Email").with_placeholder("you@example.com"),
                TextInput::new("Password").masked(),
                TextInput::new("Confirm").masked(),
            ],
            Arc::clone(&resolver),
        );

        Self {
            vm: RegisterViewModel::new(),
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
        self.vm.confirm_password = self.form.value(CONFIRM).to_string();
    }

    fn process_message(&mut self, msg: RegisterMsg) -> ScreenMsg {
        match msg {
            RegisterMsg::Submit => {
                let effect = self.vm.submit();
                self.effects.apply(effect)
            }
            RegisterMsg::Cancel => {
                let effect = self.vm.cancel();
                self.effects.apply(Some(effect))
            }
            RegisterMsg::Response(response) => {
                let effect = self.vm.resolve(response);
                self.effects.apply(effect)
            }
            RegisterMsg::Redirect(route) => ScreenMsg::Navigate(route),
        }
    }
}

impl Screen for RegisterScreen {
    fn handle_tick(&mut self) {
        self.message_line.handle_tick(self.vm.is_busy());
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        Ok(match self.form.handle_key(key)? {
            EventResult::Event(FormEvent::Changed) => {
                self.sync_to_vm();
                EventResult::Consumed
            }
            EventResult::Event(FormEvent::Submitted) => {
                self.sync_to_vm();
                self.effects.queue(RegisterMsg::Submit);
                EventResult::Consumed
            }
            EventResult::Event(FormEvent::Cancelled) => {
                self.effects.queue(RegisterMsg::Cancel);
                EventResult::Consumed
            }
            EventResult::Consumed => EventResult::Consumed,
            EventResult::Ignored => EventResult::Ignored,
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
        let panel = area.centered(
            Constraint::Max(64),
            Constraint::Length(self.form.height() + 2),
        );
        let [form_area, _, message_area] = Layout::vertical([
            Constraint::Length(self.form.height()),
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
    }

    fn route(&self) -> Route {
        Route::Register
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::new(self.resolver.display_form(FormAction::Submit), "Register"),
            Keybinding::new(self.resolver.display_form(FormAction::Next), "Next field"),
            Keybinding::new(self.resolver.display_form(FormAction::Cancel), "Back to login"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::KeyCode;

    use super::*;
    use crate::screen::testing::{FakeApi, key, keys};

    fn screen() -> RegisterScreen {
        RegisterScreen::new(
            Arc::new(FakeApi { products: vec![] }),
            Arc::new(KeyResolver::default()),
        )
    }

    fn fill(screen: &mut RegisterScreen, values: &[&str]) {
        for value in values.iter().copied() {
            for event in keys(value) {
                screen.handle_key(event).unwrap();
            }
            screen.handle_key(key(KeyCode::Tab)).unwrap();
        }
    }

    #[test]
    fn test_mismatched_passwords_send_nothing() {
        let mut screen = screen();
        fill(&mut screen, &["a@b.com", "one", "two"]);
        screen.handle_key(key(KeyCode::Enter)).unwrap();

        assert!(matches!(screen.update().unwrap(), ScreenMsg::Idle));
        assert_eq!(
            screen.vm.status().map(|m| m.text().to_string()),
            Some("Passwords do not match".to_string())
        );
    }

    #[test]
    fn test_submit_runs_register_command() {
        let mut screen = screen();
        fill(&mut screen, &["a@b.com", "pw", "pw"]);
        screen.handle_key(key(KeyCode::Enter)).unwrap();

        let ScreenMsg::Run(commands) = screen.update().unwrap() else {
            panic!("expected a command");
        };
        assert_eq!(commands[0].name(), "Registering a@b.com");
    }

    #[test]
    fn test_paste_fills_confirm_field() {
        let mut screen = screen();
        fill(&mut screen, &["a@b.com", "pw"]);
        assert!(screen.handle_paste("pw"));
        assert_eq!(screen.vm.confirm_password, "pw");
    }

    #[test]
    fn test_escape_returns_to_login() {
        let mut screen = screen();
        screen.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(matches!(
            screen.update().unwrap(),
            ScreenMsg::Navigate(Route::Login)
        ));
    }

    #[tokio::test]
    async fn test_success_redirects_to_login_after_delay() {
        let mut screen = screen();
        screen
            .effects
            .queue(RegisterMsg::Response(ApiResponse::Registered(Ok(()))));

        let ScreenMsg::Run(commands) = screen.update().unwrap() else {
            panic!("expected the delayed redirect");
        };
        assert_eq!(
            screen.vm.status().map(|m| m.text().to_string()),
            Some("Registration complete! You can log in now.".to_string())
        );

        // Still on the register screen until the delay fires.
        assert!(matches!(screen.update().unwrap(), ScreenMsg::Idle));

        for command in commands {
            tokio::time::timeout(Duration::from_secs(5), command.execute())
                .await
                .unwrap()
                .unwrap();
        }
        assert!(matches!(
            screen.update().unwrap(),
            ScreenMsg::Navigate(Route::Login)
        ));
    }
}
