use tracing::{debug, warn};

use crate::api::{ApiRequest, ApiResponse};
use crate::model;
use crate::viewmodel::{Effect, Feedback, Route, StatusMessage};

const LOGIN_FAILED: &str = "Login failed. Check your credentials.";

#[derive(Debug, Default)]
pub struct LoginViewModel {
    pub email: String,
    pub password: String,
    feedback: Feedback,
}

impl LoginViewModel {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    pub const fn status(&self) -> Option<&StatusMessage> {
        self.feedback.message()
    }

    pub const fn is_busy(&self) -> bool {
        self.feedback.is_busy()
    }

    pub fn submit(&mut self) -> Option<Effect> {
        if let Err(error) = model::validate_login(&self.email, &self.password) {
            self.feedback.error(error.to_string());
            return None;
        }
        Some(self.feedback.begin(ApiRequest::Login {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }))
    }

    pub fn resolve(&mut self, response: ApiResponse) -> Option<Effect> {
        let result = match response {
            ApiResponse::LoggedIn(result) => result,
            other => {
                debug!(response = ?other, "Login screen ignoring unrelated response");
                return None;
            }
        };
        self.feedback.settle();

        match result {
            Ok(()) => Some(Effect::Navigate(Route::Dashboard)),
            Err(error) => {
                // The cause stays in the log; the user only sees a generic message.
                warn!(%error, "Login failed");
                self.feedback.error(LOGIN_FAILED);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::model::ValidationError;

    fn filled() -> LoginViewModel {
        let mut vm = LoginViewModel::new("a@b.com");
        vm.password = "secret".to_string();
        vm
    }

    #[test]
    fn test_submit_requests_login() {
        let mut vm = filled();
        assert_eq!(
            vm.submit(),
            Some(Effect::Request(ApiRequest::Login {
                email: "a@b.com".to_string(),
                password: "secret".to_string(),
            }))
        );
        assert!(vm.is_busy());
    }

    #[test]
    fn test_blank_fields_never_reach_network() {
        let mut vm = LoginViewModel::new("a@b.com");
        assert_eq!(vm.submit(), None);
        assert_eq!(
            vm.status(),
            Some(&StatusMessage::Error("Email and password are required".to_string()))
        );
        assert!(!vm.is_busy());
    }

    #[test]
    fn test_success_navigates_to_dashboard() {
        let mut vm = filled();
        vm.submit();
        let effect = vm.resolve(ApiResponse::LoggedIn(Ok(())));
        assert_eq!(effect, Some(Effect::Navigate(Route::Dashboard)));
        assert!(!vm.is_busy());
    }

    #[test]
    fn test_failure_shows_generic_message() {
        let mut vm = filled();
        vm.submit();
        let effect = vm.resolve(ApiResponse::LoggedIn(Err(ApiError::Validation(
            ValidationError::MissingCredentials,
        ))));
        assert_eq!(effect, None);
        assert_eq!(vm.status(), Some(&StatusMessage::Error(LOGIN_FAILED.to_string())));
    }

    #[test]
    fn test_unrelated_response_is_ignored() {
        let mut vm = filled();
        vm.submit();
        assert_eq!(vm.resolve(ApiResponse::ProductsLoaded(Ok(vec![]))), None);
        assert!(vm.is_busy());
        assert!(vm.status().is_none());
    }
}
