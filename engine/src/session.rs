//! Signed-in user, role lookup and the admin capability token.

use crate::{
    backend::{Profile, ProfileBackend},
    error::Result,
    Error, UserId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role stored on the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Local,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Local => "local",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

impl SessionUser {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// A user plus the role read once when the session was established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: SessionUser,
    role: Role,
}

impl Session {
    /// Resolve the user's role with a single profile read.
    ///
    /// A missing profile or a failed read yields [`Role::Customer`].
    pub async fn establish<P>(profiles: &P, user: SessionUser) -> Self
    where
        P: ProfileBackend + ?Sized,
    {
        let role = match profiles.fetch_profile(&user.id).await {
            Ok(Some(profile)) => profile.role,
            Ok(None) => {
                tracing::debug!(user_id = %user.id, "no profile yet, assuming customer");
                Role::Customer
            }
            Err(e) => {
                tracing::warn!(user_id = %user.id, "profile lookup failed, assuming customer: {}", e);
                Role::Customer
            }
        };

        Self { user, role }
    }

    /// A session with a known role, without consulting the backend.
    pub fn with_role(user: SessionUser, role: Role) -> Self {
        Self { user, role }
    }

    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn email(&self) -> Option<&str> {
        self.user.email.as_deref()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// The token admin operations require. Fails with [`Error::NotAdmin`].
    pub fn admin_capability(&self) -> Result<AdminCapability> {
        if self.is_admin() {
            Ok(AdminCapability {
                user_id: self.user.id.clone(),
            })
        } else {
            Err(Error::NotAdmin)
        }
    }
}

/// Proof that the holder's session has the admin role.
///
/// Only [`Session::admin_capability`] can construct one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCapability {
    user_id: UserId,
}

impl AdminCapability {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// Fetch the user's profile, creating a customer profile if none exists.
pub async fn ensure_profile<P>(profiles: &P, user_id: &str) -> Result<Profile>
where
    P: ProfileBackend + ?Sized,
{
    if let Some(profile) = profiles.fetch_profile(user_id).await? {
        return Ok(profile);
    }

    let profile = Profile::customer(user_id);
    profiles.insert_profile(&profile).await?;
    tracing::info!(%user_id, "created customer profile");
    Ok(profile)
}
