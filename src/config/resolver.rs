use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::config::actions::{
    DashboardAction, DialogAction, FormAction, GlobalAction, LoginAction, NavAction, SearchAction,
};
use crate::config::keybindings::KeybindingsConfig;

/// Maps key events to the actions configured for them.
pub struct KeyResolver {
    keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    // Global actions
    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.matches(event),
        }
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.display(),
        }
    }

    // Navigation actions
    pub fn matches_nav(&self, event: &KeyEvent, action: NavAction) -> bool {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => kb.up.matches(event),
            NavAction::Down => kb.down.matches(event),
            NavAction::PageUp => kb.page_up.matches(event),
            NavAction::PageDown => kb.page_down.matches(event),
            NavAction::Home => kb.home.matches(event),
            NavAction::End => kb.end.matches(event),
            NavAction::Select => kb.select.matches(event),
        }
    }

    pub fn display_nav(&self, action: NavAction) -> String {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => kb.up.display(),
            NavAction::Down => kb.down.display(),
            NavAction::PageUp => kb.page_up.display(),
            NavAction::PageDown => kb.page_down.display(),
            NavAction::Home => kb.home.display(),
            NavAction::End => kb.end.display(),
            NavAction::Select => kb.select.display(),
        }
    }

    // Search actions
    pub fn matches_search(&self, event: &KeyEvent, action: SearchAction) -> bool {
        let kb = &self.keybindings.search;
        match action {
            SearchAction::Toggle => kb.toggle.matches(event),
            SearchAction::Exit => kb.exit.matches(event),
        }
    }

    pub fn display_search(&self, action: SearchAction) -> String {
        let kb = &self.keybindings.search;
        match action {
            SearchAction::Toggle => kb.toggle.display(),
            SearchAction::Exit => kb.exit.display(),
        }
    }

    // Form actions
    pub fn matches_form(&self, event: &KeyEvent, action: FormAction) -> bool {
        let kb = &self.keybindings.form;
        match action {
            FormAction::Next => kb.next.matches(event),
            FormAction::Previous => kb.previous.matches(event),
            FormAction::Submit => kb.submit.matches(event),
            FormAction::Cancel => kb.cancel.matches(event),
        }
    }

    pub fn display_form(&self, action: FormAction) -> String {
        let kb = &self.keybindings.form;
        match action {
            FormAction::Next => kb.next.display(),
            FormAction::Previous => kb.previous.display(),
            FormAction::Submit => kb.submit.display(),
            FormAction::Cancel => kb.cancel.display(),
        }
    }

    // Login screen actions
    pub fn matches_login(&self, event: &KeyEvent, action: LoginAction) -> bool {
        let kb = &self.keybindings.login;
        match action {
            LoginAction::Register => kb.register.matches(event),
        }
    }

    pub fn display_login(&self, action: LoginAction) -> String {
        let kb = &self.keybindings.login;
        match action {
            LoginAction::Register => kb.register.display(),
        }
    }

    // Dashboard actions
    pub fn matches_dashboard(&self, event: &KeyEvent, action: DashboardAction) -> bool {
        let kb = &self.keybindings.dashboard;
        match action {
            DashboardAction::New => kb.new.matches(event),
            DashboardAction::Edit => kb.edit.matches(event),
            DashboardAction::Delete => kb.delete.matches(event),
            DashboardAction::Reload => kb.reload.matches(event),
            DashboardAction::Logout => kb.logout.matches(event),
        }
    }

    pub fn display_dashboard(&self, action: DashboardAction) -> String {
        let kb = &self.keybindings.dashboard;
        match action {
            DashboardAction::New => kb.new.display(),
            DashboardAction::Edit => kb.edit.display(),
            DashboardAction::Delete => kb.delete.display(),
            DashboardAction::Reload => kb.reload.display(),
            DashboardAction::Logout => kb.logout.display(),
        }
    }

    // Dialog actions
    pub fn matches_dialog(&self, event: &KeyEvent, action: DialogAction) -> bool {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Confirm => kb.confirm.matches(event),
            DialogAction::Cancel => kb.cancel.matches(event),
            DialogAction::Dismiss => kb.dismiss.matches(event),
        }
    }

    pub fn display_dialog(&self, action: DialogAction) -> String {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Confirm => kb.confirm.display(),
            DialogAction::Cancel => kb.cancel.display(),
            DialogAction::Dismiss => kb.dismiss.display(),
        }
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_default_dashboard_bindings() {
        let resolver = KeyResolver::default();
        assert!(resolver.matches_dashboard(
            &key(KeyCode::Char('L'), KeyModifiers::SHIFT),
            DashboardAction::Logout
        ));
        assert!(!resolver.matches_dashboard(
            &key(KeyCode::Char('l'), KeyModifiers::NONE),
            DashboardAction::Logout
        ));
        assert!(resolver.matches_dashboard(
            &key(KeyCode::Delete, KeyModifiers::NONE),
            DashboardAction::Delete
        ));
        assert_eq!(resolver.display_dashboard(DashboardAction::Delete), "d/Delete");
    }

    #[test]
    fn test_default_form_bindings() {
        let resolver = KeyResolver::default();
        assert!(resolver.matches_form(
            &key(KeyCode::BackTab, KeyModifiers::SHIFT),
            FormAction::Previous
        ));
        assert!(resolver.matches_form(&key(KeyCode::Tab, KeyModifiers::NONE), FormAction::Next));
        assert_eq!(resolver.display_login(LoginAction::Register), "ctrl+r");
    }
}
