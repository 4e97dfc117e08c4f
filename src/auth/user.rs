use crate::known_errors::KnownErrors;
use crate::known_errors::RedirectOnError;
use axum::response::Redirect;
use axum_login::AuthSession;
use axum_login::AuthnBackend;
use bitflags::bitflags;
use dashmap::DashMap;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Manager,
    Director,
    ManagingDirector,
    Super,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Manager => "manager",
            UserRole::Director => "director",
            UserRole::ManagingDirector => "managing_director",
            UserRole::Super => "super",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            UserRole::User => "Member",
            UserRole::Manager => "Manager",
            UserRole::Director => "Director",
            UserRole::ManagingDirector => "Managing Director",
            UserRole::Super => "Super Admin",
        }
    }

    /// Each role inherits everything the roles below it can do.
    pub fn capabilities(&self) -> Capabilities {
        match self {
            UserRole::User => Capabilities::empty(),
            UserRole::Manager => Capabilities::APPROVE_TICKETS,
            UserRole::Director => Capabilities::APPROVE_TICKETS | Capabilities::CREATE_NEWS,
            UserRole::ManagingDirector => {
                Capabilities::APPROVE_TICKETS
                    | Capabilities::CREATE_NEWS
                    | Capabilities::MANAGE_USERS
            }
            UserRole::Super => Capabilities::all(),
        }
    }
}

bitflags! {
    #[derive(Serialize, Deserialize, Hash, Default, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u8 {
        const APPROVE_TICKETS = 1 << 0;
        const CREATE_NEWS = 1 << 1;
        const MANAGE_USERS = 1 << 2;
        const ACCESS_SETTINGS = 1 << 3;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub roles: Vec<UserRole>,
    pub name: String,
}

impl User {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }

    pub fn has_any_role(&self, roles: &[UserRole]) -> bool {
        roles.iter().any(|role| self.has_role(*role))
    }

    pub fn highest_role(&self) -> UserRole {
        self.roles.iter().copied().max().unwrap_or(UserRole::User)
    }

    pub fn is_admin_level(&self) -> bool {
        self.roles.iter().any(|role| *role >= UserRole::Manager)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.roles
            .iter()
            .fold(Capabilities::empty(), |acc, role| acc | role.capabilities())
    }

    pub fn can(&self, required: Capabilities) -> bool {
        self.capabilities().contains(required)
    }

    pub fn require(&self, required: Capabilities) -> Result<(), KnownErrors> {
        if self.can(required) {
            Ok(())
        } else {
            Err(KnownErrors::PermissionError { required })
        }
    }

    /// "JS" for "John Smith", used for avatar fallbacks.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase()
    }
}

impl axum_login::AuthUser for User {
    type Id = UserId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn session_auth_hash(&self) -> &[u8] {
        // sessions are tied to the login itself, there is no credential rotation
        self.username.as_bytes()
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

struct Account {
    username: &'static str,
    password: &'static str,
    role: UserRole,
    name: &'static str,
}

const ACCOUNTS: &[Account] = &[
    Account {
        username: "user",
        password: "user",
        role: UserRole::User,
        name: "Regular User",
    },
    Account {
        username: "manager",
        password: "manager",
        role: UserRole::Manager,
        name: "Department Manager",
    },
    Account {
        username: "director",
        password: "director",
        role: UserRole::Director,
        name: "Company Director",
    },
    Account {
        username: "managing_director",
        password: "managing_director",
        role: UserRole::ManagingDirector,
        name: "Managing Director",
    },
    Account {
        username: "super",
        password: "super",
        role: UserRole::Super,
        name: "Super Administrator",
    },
];

#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    #[error("user not found")]
    UserNotFound,
}

struct ActiveUser {
    user: User,
    last_seen: Instant,
}

/// Users exist only between login and logout (or until they go idle), in
/// process memory.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    active: Arc<DashMap<UserId, ActiveUser>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn forget(&self, user_id: &UserId) -> Result<User, UserStoreError> {
        self.active
            .remove(user_id)
            .map(|(_, active)| active.user)
            .ok_or(UserStoreError::UserNotFound)
    }

    /// Drops users not seen for `max_idle`. Returns how many went.
    pub fn prune_idle(&self, max_idle: Duration) -> usize {
        self.prune_idle_at(max_idle, Instant::now())
    }

    fn prune_idle_at(&self, max_idle: Duration, now: Instant) -> usize {
        let before = self.active.len();
        self.active
            .retain(|_, active| now.saturating_duration_since(active.last_seen) <= max_idle);
        before - self.active.len()
    }
}

impl AuthnBackend for MemoryUserStore {
    type User = User;
    type Credentials = Credentials;
    type Error = UserStoreError;

    async fn authenticate(
        &self,
        creds: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        let Some(account) = ACCOUNTS
            .iter()
            .find(|a| a.username == creds.username && a.password == creds.password)
        else {
            return Ok(None);
        };

        let user = User {
            id: UserId::new(),
            username: account.username.to_string(),
            roles: vec![account.role],
            name: account.name.to_string(),
        };
        self.active.insert(
            user.id,
            ActiveUser {
                user: user.clone(),
                last_seen: Instant::now(),
            },
        );

        Ok(Some(user))
    }

    async fn get_user(&self, user_id: &UserId) -> Result<Option<Self::User>, Self::Error> {
        Ok(self.active.get_mut(user_id).map(|mut active| {
            active.last_seen = Instant::now();
            active.user.clone()
        }))
    }
}

pub fn get_user<T>(session: AuthSession<T>) -> Result<User, Redirect>
where
    T: AuthnBackend<User = User>,
{
    session
        .user
        .ok_or(KnownErrors::NotLoggedIn)
        .or_redirect("/signin")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_only_known_pairs_authenticate() {
        let store = MemoryUserStore::new();

        let expected = [
            ("user", UserRole::User),
            ("manager", UserRole::Manager),
            ("director", UserRole::Director),
            ("managing_director", UserRole::ManagingDirector),
            ("super", UserRole::Super),
        ];

        for (name, role) in expected {
            let user = store
                .authenticate(creds(name, name))
                .await
                .expect("authenticate should not fail")
                .expect("known pair should log in");
            assert_eq!(user.roles, vec![role]);
            assert_eq!(user.username, name);
        }

        assert_eq!(store.active_count(), 5);

        for (name, password) in [
            ("user", "manager"),
            ("admin", "admin"),
            ("", ""),
            ("User", "user"),
            ("user", "  user  "),
            (" user", "user"),
        ] {
            assert!(
                store
                    .authenticate(creds(name, password))
                    .await
                    .expect("authenticate should not fail")
                    .is_none()
            );
        }
    }

    #[tokio::test]
    async fn test_logout_forgets_user() {
        let store = MemoryUserStore::new();
        let user = store
            .authenticate(creds("manager", "manager"))
            .await
            .expect("authenticate should not fail")
            .expect("manager should log in");

        assert!(
            AuthnBackend::get_user(&store, &user.id)
                .await
                .expect("lookup should not fail")
                .is_some()
        );

        store.forget(&user.id).expect("user should be active");

        assert!(
            AuthnBackend::get_user(&store, &user.id)
                .await
                .expect("lookup should not fail")
                .is_none()
        );
        assert!(matches!(
            store.forget(&user.id),
            Err(UserStoreError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_idle_users_are_pruned() {
        let store = MemoryUserStore::new();
        let idle = store
            .authenticate(creds("user", "user"))
            .await
            .expect("authenticate should not fail")
            .expect("user should log in");
        let busy = store
            .authenticate(creds("super", "super"))
            .await
            .expect("authenticate should not fail")
            .expect("super should log in");

        let max_idle = Duration::from_secs(60);
        let later = Instant::now() + Duration::from_secs(30);
        assert_eq!(store.prune_idle_at(max_idle, later), 0);

        // a lookup counts as activity
        if let Some(mut active) = store.active.get_mut(&busy.id) {
            active.last_seen = later;
        }

        let much_later = later + Duration::from_secs(45);
        assert_eq!(store.prune_idle_at(max_idle, much_later), 1);
        assert_eq!(store.active_count(), 1);
        assert!(
            AuthnBackend::get_user(&store, &idle.id)
                .await
                .expect("lookup should not fail")
                .is_none()
        );
        assert!(
            AuthnBackend::get_user(&store, &busy.id)
                .await
                .expect("lookup should not fail")
                .is_some()
        );
    }

    #[test]
    fn test_role_hierarchy() {
        let user = User {
            id: UserId::new(),
            username: "director".into(),
            roles: vec![UserRole::Director],
            name: "Company Director".into(),
        };

        assert!(user.is_admin_level());
        assert!(user.has_role(UserRole::Director));
        assert!(!user.has_role(UserRole::Manager));
        assert!(user.has_any_role(&[UserRole::Manager, UserRole::Director]));
        assert_eq!(user.highest_role(), UserRole::Director);
        assert!(user.can(Capabilities::APPROVE_TICKETS | Capabilities::CREATE_NEWS));
        assert!(!user.can(Capabilities::MANAGE_USERS));
        assert_eq!(user.initials(), "CD");
    }

    #[test]
    fn test_regular_user_is_not_admin() {
        let user = User {
            id: UserId::new(),
            username: "user".into(),
            roles: vec![UserRole::User],
            name: "Regular User".into(),
        };

        assert!(!user.is_admin_level());
        assert!(user.capabilities().is_empty());
        assert_eq!(
            user.require(Capabilities::APPROVE_TICKETS),
            Err(KnownErrors::PermissionError {
                required: Capabilities::APPROVE_TICKETS
            })
        );
    }

    #[test]
    fn test_super_has_everything() {
        assert_eq!(UserRole::Super.capabilities(), Capabilities::all());
        assert!(UserRole::Super > UserRole::ManagingDirector);
        assert_eq!(UserRole::ManagingDirector.as_str(), "managing_director");
    }
}
