//! Screen controllers.
//!
//! View-models own form state and the status slot of one screen. They never
//! talk to the network: user actions return an [`Effect`] describing what
//! should happen next, and settled API calls are folded back in through
//! `resolve`, which may in turn request a follow-up effect.

mod dashboard;
mod login;
mod register;

use std::fmt::Display;
use std::time::Duration;

pub use dashboard::DashboardViewModel;
pub use login::LoginViewModel;
pub use register::RegisterViewModel;

use crate::api::ApiRequest;

/// The screens of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login => write!(f, "Login"),
            Self::Register => write!(f, "Register"),
            Self::Dashboard => write!(f, "Products"),
        }
    }
}

/// What a view-model wants to happen after handling an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Call the API; the response is fed back through `resolve`.
    Request(ApiRequest),
    /// Switch screens.
    Navigate(Route),
    /// Switch screens once `delay` has passed.
    NavigateAfter { delay: Duration, route: Route },
    /// Drop the credential and return to the login screen.
    Logout,
}

/// Outcome shown to the user. Only one is ever visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Success(String),
    Error(String),
}

impl StatusMessage {
    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Error(text) => text,
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// The status slot plus a count of requests still in flight.
///
/// Actions overlap freely, so "submitting" is a counter rather than a flag.
#[derive(Debug, Default)]
pub struct Feedback {
    message: Option<StatusMessage>,
    in_flight: usize,
}

impl Feedback {
    pub const fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub const fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    fn success(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage::Success(text.into()));
    }

    fn error(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage::Error(text.into()));
    }

    /// Record that a request was issued and pass it through.
    fn begin(&mut self, request: ApiRequest) -> Effect {
        self.in_flight += 1;
        Effect::Request(request)
    }

    fn settle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_slot_is_exclusive() {
        let mut feedback = Feedback::default();
        assert!(feedback.message().is_none());

        feedback.error("nope");
        feedback.success("yes");
        assert_eq!(
            feedback.message(),
            Some(&StatusMessage::Success("yes".to_string()))
        );

        feedback.error("nope");
        assert!(feedback.message().unwrap().is_error());
        assert_eq!(feedback.message().unwrap().text(), "nope");
    }

    #[test]
    fn test_feedback_counts_overlapping_requests() {
        let mut feedback = Feedback::default();
        feedback.begin(ApiRequest::ListProducts);
        feedback.begin(ApiRequest::DeleteProduct(1));
        feedback.settle();
        assert!(feedback.is_busy());
        feedback.settle();
        feedback.settle();
        assert!(!feedback.is_busy());
    }
}
