use tokio::sync::watch;

use crate::entities::token::Identity;

/// Where the current session stands. Starts `Unknown` until the first
/// resolution arrives.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Unknown,
    Authenticated(Identity),
    Unauthenticated,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    /// Resolution still pending: render nothing, redirect nowhere.
    Loading,
    Redirect(String),
    Render(Identity),
    /// Signed in, but not as the site owner.
    Forbidden,
}

/// Publishes session transitions to any number of guards.
#[derive(Debug, Clone)]
pub struct SessionHub {
    sender: watch::Sender<SessionState>,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHub {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(SessionState::Unknown);
        SessionHub { sender }
    }

    pub fn publish(&self, state: SessionState) {
        // `send_replace` keeps the value even while no guard is subscribed.
        self.sender.send_replace(state);
    }

    pub fn sign_out(&self) {
        self.publish(SessionState::Unauthenticated);
    }

    pub fn guard(&self, login_path: impl Into<String>) -> SessionGuard {
        SessionGuard {
            receiver: self.sender.subscribe(),
            login_path: login_path.into(),
        }
    }
}

/// Gate in front of admin content.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    receiver: watch::Receiver<SessionState>,
    login_path: String,
}

impl SessionGuard {
    pub fn decide(&self) -> GuardDecision {
        decide(&self.receiver.borrow(), &self.login_path)
    }

    /// Waits until the session leaves `Unknown`, then decides. A hub that
    /// goes away before resolving counts as signed out.
    pub async fn resolved(&mut self) -> GuardDecision {
        match self
            .receiver
            .wait_for(|state| !matches!(state, SessionState::Unknown))
            .await
        {
            Ok(state) => decide(&state, &self.login_path),
            Err(_) => GuardDecision::Redirect(self.login_path.clone()),
        }
    }
}

pub fn decide(state: &SessionState, login_path: &str) -> GuardDecision {
    match state {
        SessionState::Unknown => GuardDecision::Loading,
        SessionState::Unauthenticated => GuardDecision::Redirect(login_path.to_string()),
        SessionState::Authenticated(identity) if identity.admin => {
            GuardDecision::Render(identity.clone())
        }
        SessionState::Authenticated(_) => GuardDecision::Forbidden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn owner() -> Identity {
        Identity {
            uid: "admin".into(),
            email: Some("owner@example.dev".into()),
            name: Some("Owner".into()),
            picture: None,
            admin: true,
        }
    }

    #[test]
    fn unknown_state_is_loading() {
        let hub = SessionHub::new();
        let guard = hub.guard("/admin");
        assert_eq!(guard.decide(), GuardDecision::Loading);
    }

    #[test]
    fn transitions_drive_decisions() {
        let hub = SessionHub::new();
        let guard = hub.guard("/admin");

        hub.publish(SessionState::Authenticated(owner()));
        assert_eq!(guard.decide(), GuardDecision::Render(owner()));

        hub.sign_out();
        assert_eq!(guard.decide(), GuardDecision::Redirect("/admin".into()));
    }

    #[test]
    fn visitors_are_forbidden() {
        let mut visitor = owner();
        visitor.admin = false;
        assert_eq!(
            decide(&SessionState::Authenticated(visitor), "/admin"),
            GuardDecision::Forbidden
        );
    }

    #[tokio::test]
    async fn resolved_waits_for_first_answer() {
        let hub = SessionHub::new();
        let mut guard = hub.guard("/admin");

        let publisher = hub.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            publisher.publish(SessionState::Unauthenticated);
        });

        assert_eq!(guard.resolved().await, GuardDecision::Redirect("/admin".into()));
    }

    #[tokio::test]
    async fn dropped_hub_resolves_to_redirect() {
        let hub = SessionHub::new();
        let mut guard = hub.guard("/login");
        drop(hub);

        assert_eq!(guard.resolved().await, GuardDecision::Redirect("/login".into()));
    }
}
