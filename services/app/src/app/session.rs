//! services/app/src/app/session.rs
//!
//! Session bootstrap: resolve the current identity once per page load and
//! publish auth-state changes to whoever subscribed. The provider is an
//! explicit object constructed once at startup and passed down; there is no
//! hidden module-level auth singleton.

use std::sync::Arc;

use learnx_core::domain::{Identity, Registration, Role};
use learnx_core::ports::IdentityService;
use tokio::sync::watch;
use tracing::{info, warn};

/// The current authentication state.
#[derive(Debug, Clone)]
pub enum AuthState {
    /// Identity resolution has not completed yet.
    Resolving,
    SignedIn(Identity),
    SignedOut,
}

/// Where the shell should navigate after bootstrap.
#[derive(Debug, Clone)]
pub enum Route {
    Login,
    Dashboard(Identity),
}

/// Owns the auth state and its change notifications.
///
/// `subscribe` hands out a receiver for auth-state-changed events; dropping
/// the receiver ends that subscription. One provider instance serves the
/// whole application.
pub struct AuthProvider {
    identity: Arc<dyn IdentityService>,
    tx: watch::Sender<AuthState>,
}

impl AuthProvider {
    pub fn new(identity: Arc<dyn IdentityService>) -> Self {
        let (tx, _rx) = watch::channel(AuthState::Resolving);
        Self { identity, tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> AuthState {
        self.tx.borrow().clone()
    }

    /// Resolves the current identity: an optional credential exchange for
    /// the session cookie, then a single `/me` fetch. One failed attempt is
    /// terminal for this page load and routes to the login view; there is
    /// no retry.
    pub async fn bootstrap(&self, id_token: Option<&str>) -> Route {
        if let Some(token) = id_token {
            if let Err(e) = self.identity.session_login(token).await {
                warn!("session login failed: {}", e);
                self.tx.send_replace(AuthState::SignedOut);
                return Route::Login;
            }
        }

        match self.identity.fetch_me().await {
            Ok(identity) => {
                info!(user = %identity.id, role = ?identity.role, "identity resolved");
                self.tx.send_replace(AuthState::SignedIn(identity.clone()));
                Route::Dashboard(identity)
            }
            Err(e) => {
                warn!("failed to resolve identity: {}", e);
                self.tx.send_replace(AuthState::SignedOut);
                Route::Login
            }
        }
    }

    /// Registers a new account, then signs it in: the backend record is
    /// created first, then the credential is exchanged for a session and
    /// the identity resolved, exactly as on a normal bootstrap.
    pub async fn register(&self, role: Role, registration: &Registration) -> Route {
        if let Err(e) = self.identity.register(role, registration).await {
            warn!("registration failed: {}", e);
            self.tx.send_replace(AuthState::SignedOut);
            return Route::Login;
        }
        self.bootstrap(Some(&registration.id_token)).await
    }

    /// Destroys the backend session and publishes the sign-out.
    pub async fn sign_out(&self) {
        if let Err(e) = self.identity.sign_out().await {
            warn!("sign-out request failed: {}", e);
        }
        self.tx.send_replace(AuthState::SignedOut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use learnx_core::domain::Role;
    use learnx_core::ports::{PortError, PortResult};
    use uuid::Uuid;

    struct FakeIdentity {
        me: Option<Identity>,
    }

    #[async_trait]
    impl IdentityService for FakeIdentity {
        async fn register(&self, _role: Role, _registration: &Registration) -> PortResult<()> {
            Ok(())
        }

        async fn session_login(&self, _id_token: &str) -> PortResult<()> {
            Ok(())
        }

        async fn fetch_me(&self) -> PortResult<Identity> {
            self.me.clone().ok_or(PortError::Unauthorized)
        }

        async fn sign_out(&self) -> PortResult<()> {
            Ok(())
        }
    }

    fn identity(role: Role) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "student@example.edu".into(),
            role,
        }
    }

    #[tokio::test]
    async fn successful_bootstrap_routes_to_dashboard() {
        let provider = AuthProvider::new(Arc::new(FakeIdentity {
            me: Some(identity(Role::Student)),
        }));
        let mut events = provider.subscribe();

        match provider.bootstrap(None).await {
            Route::Dashboard(id) => assert_eq!(id.role, Role::Student),
            Route::Login => panic!("expected dashboard route"),
        }

        events.changed().await.unwrap();
        assert!(matches!(*events.borrow(), AuthState::SignedIn(_)));
    }

    #[tokio::test]
    async fn failed_resolution_routes_to_login() {
        let provider = AuthProvider::new(Arc::new(FakeIdentity { me: None }));

        assert!(matches!(provider.bootstrap(None).await, Route::Login));
        assert!(matches!(provider.current(), AuthState::SignedOut));
    }

    #[tokio::test]
    async fn registration_signs_the_new_account_in() {
        let provider = AuthProvider::new(Arc::new(FakeIdentity {
            me: Some(identity(Role::Instructor)),
        }));
        let registration = Registration {
            email: "prof@example.edu".into(),
            password: "hunter2!".into(),
            id_token: "token".into(),
            name: Some("Prof. Example".into()),
            university: Some("Example State".into()),
        };

        let route = provider.register(Role::Instructor, &registration).await;
        assert!(matches!(route, Route::Dashboard(_)));
        assert!(matches!(provider.current(), AuthState::SignedIn(_)));
    }
}
