use std::time::Duration;

use tracing::{debug, warn};

use crate::api::{ApiRequest, ApiResponse};
use crate::model;
use crate::viewmodel::{Effect, Feedback, Route, StatusMessage};

const REGISTERED: &str = "Registration complete! You can log in now.";
const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";

/// How long the success message stays up before returning to login.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Default)]
pub struct RegisterViewModel {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    feedback: Feedback,
}

impl RegisterViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn status(&self) -> Option<&StatusMessage> {
        self.feedback.message()
    }

    pub const fn is_busy(&self) -> bool {
        self.feedback.is_busy()
    }

    pub fn submit(&mut self) -> Option<Effect> {
        if let Err(error) =
            model::validate_registration(&self.email, &self.password, &self.confirm_password)
        {
            self.feedback.error(error.to_string());
            return None;
        }
        Some(self.feedback.begin(ApiRequest::Register {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
        }))
    }

    /// Go back to the login screen without registering.
    pub const fn cancel(&self) -> Effect {
        Effect::Navigate(Route::Login)
    }

    pub fn resolve(&mut self, response: ApiResponse) -> Option<Effect> {
        let result = match response {
            ApiResponse::Registered(result) => result,
            other => {
                debug!(response = ?other, "Register screen ignoring unrelated response");
                return None;
            }
        };
        self.feedback.settle();

        match result {
            Ok(()) => {
                self.feedback.success(REGISTERED);
                Some(Effect::NavigateAfter {
                    delay: REDIRECT_DELAY,
                    route: Route::Login,
                })
            }
            Err(error) => {
                warn!(%error, "Registration failed");
                self.feedback.error(REGISTRATION_FAILED);
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

    fn filled(password: &str, confirm: &str) -> RegisterViewModel {
        RegisterViewModel {
            email: "a@b.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            ..RegisterViewModel::default()
        }
    }

    #[test]
    fn test_mismatch_never_reaches_network() {
        for (password, confirm) in [("secret", "secreT"), ("a", ""), ("", "b"), ("x", "y ")] {
            let mut vm = filled(password, confirm);
            assert_eq!(vm.submit(), None, "{password:?} / {confirm:?}");
            assert!(vm.status().unwrap().is_error());
            assert!(!vm.is_busy());
        }
    }

    #[test]
    fn test_mismatch_message() {
        let mut vm = filled("secret", "other");
        vm.submit();
        assert_eq!(vm.status().unwrap().text(), "Passwords do not match");
    }

    #[test]
    fn test_submit_requests_registration() {
        let mut vm = filled("secret", "secret");
        assert_eq!(
            vm.submit(),
            Some(Effect::Request(ApiRequest::Register {
                email: "a@b.com".to_string(),
                password: "secret".to_string(),
                confirm_password: "secret".to_string(),
            }))
        );
    }

    #[test]
    fn test_success_redirects_to_login_after_delay() {
        let mut vm = filled("secret", "secret");
        vm.submit();
        let effect = vm.resolve(ApiResponse::Registered(Ok(())));
        assert_eq!(
            effect,
            Some(Effect::NavigateAfter {
                delay: REDIRECT_DELAY,
                route: Route::Login,
            })
        );
        assert_eq!(
            vm.status(),
            Some(&StatusMessage::Success(REGISTERED.to_string()))
        );
    }

    #[test]
    fn test_failure_is_generic() {
        let mut vm = filled("secret", "secret");
        vm.submit();
        let effect = vm.resolve(ApiResponse::Registered(Err(ApiError::Validation(
            ValidationError::PasswordMismatch,
        ))));
        assert_eq!(effect, None);
        assert_eq!(vm.status().unwrap().text(), REGISTRATION_FAILED);
    }

    #[test]
    fn test_cancel_returns_to_login() {
        assert_eq!(
            RegisterViewModel::new().cancel(),
            Effect::Navigate(Route::Login)
        );
    }
}
