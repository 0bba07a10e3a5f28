//! services/app/src/adapters/identity.rs
//!
//! Session establishment against the backend: exchanges the
//! identity-provider credential for the session cookie and resolves `/me`.

use async_trait::async_trait;
use learnx_core::domain::{Identity, Registration, Role};
use learnx_core::ports::{IdentityService, PortError, PortResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adapters::http::Backend;

/// An adapter that implements `IdentityService` over the backend HTTP API.
#[derive(Clone)]
pub struct HttpIdentityService {
    backend: Backend,
}

impl HttpIdentityService {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Serialize)]
struct SessionLoginBody<'a> {
    #[serde(rename = "idToken")]
    id_token: &'a str,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(rename = "idToken")]
    id_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    university: Option<&'a str>,
}

#[derive(Deserialize)]
struct MeRecord {
    id: Uuid,
    email: String,
    role: String,
}

impl MeRecord {
    fn to_domain(self) -> Identity {
        Identity {
            id: self.id,
            email: self.email,
            role: Role::parse(&self.role),
        }
    }
}

//=========================================================================================
// `IdentityService` Trait Implementation
//=========================================================================================

#[async_trait]
impl IdentityService for HttpIdentityService {
    async fn register(&self, role: Role, registration: &Registration) -> PortResult<()> {
        let path = match role {
            Role::Student => "/register/student",
            Role::Instructor => "/register/instructor",
            Role::Admin | Role::Unknown => {
                return Err(PortError::Unexpected(format!(
                    "cannot register an account with role {:?}",
                    role
                )))
            }
        };
        let body = RegisterBody {
            email: &registration.email,
            password: &registration.password,
            id_token: &registration.id_token,
            name: registration.name.as_deref(),
            university: registration.university.as_deref(),
        };
        self.backend.post_unit(path, &body).await
    }

    async fn session_login(&self, id_token: &str) -> PortResult<()> {
        self.backend
            .post_unit("/sessionLogin", &SessionLoginBody { id_token })
            .await
    }

    async fn fetch_me(&self) -> PortResult<Identity> {
        let record: MeRecord = self.backend.get_json("/me").await?;
        Ok(record.to_domain())
    }

    async fn sign_out(&self) -> PortResult<()> {
        self.backend.post_empty("/sessionLogout").await
    }
}
