//! User management commands.

use super::{CommandResult, current_user, require_admin};
use crate::auth::hash_password;
use crate::models::{User, UserLevel};
use crate::storage::Storage;
use crate::{Error, Result};
use serde::Serialize;

/// A user as shown to callers. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub username: String,
    pub level: UserLevel,
    pub email: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            level: user.level,
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<UserView>,
}

impl CommandResult for UserList {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("{} user(s):", self.users.len())];
        for user in &self.users {
            let mut line = format!("  {:<16} {}", user.username, user.level);
            if !user.email.is_empty() {
                line.push_str(&format!("  <{}>", user.email));
            }
            lines.push(line);
        }
        lines.join("\n")
    }
}

pub fn user_list(storage: &Storage) -> Result<UserList> {
    let user = current_user(storage)?;
    require_admin(&user, "list users")?;
    let users = storage.load_users()?;
    Ok(UserList {
        users: users.values().map(UserView::from).collect(),
    })
}

#[derive(Debug, Serialize)]
pub struct UserResult {
    #[serde(skip)]
    pub message: String,
    #[serde(flatten)]
    pub user: UserView,
}

impl CommandResult for UserResult {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

/// Create a new account. Administrators only.
pub fn user_add(
    storage: &Storage,
    username: &str,
    password: &str,
    level: UserLevel,
    email: &str,
) -> Result<UserResult> {
    let actor = current_user(storage)?;
    require_admin(&actor, "add users")?;

    let username = username.trim();
    if username.is_empty() {
        return Err(Error::InvalidInput("Username is required".to_string()));
    }
    if password.is_empty() {
        return Err(Error::InvalidInput("Password is required".to_string()));
    }

    let mut users = storage.load_users()?;
    if users.contains_key(username) {
        return Err(Error::AlreadyExists(format!("User {}", username)));
    }

    let user = User::new(username, hash_password(password), level, email.trim());
    let view = UserView::from(&user);
    users.insert(username.to_string(), user);
    storage.save_users(&users)?;
    tracing::info!(username, level = %level, by = %actor.username, "user added");

    Ok(UserResult {
        message: format!("Added user {} ({})", view.username, view.level),
        user: view,
    })
}

/// Change a password. Users may change their own; administrators anyone's.
pub fn user_passwd(storage: &Storage, username: Option<&str>, password: &str) -> Result<UserResult> {
    let actor = current_user(storage)?;
    let target = username.unwrap_or(actor.username.as_str()).to_string();
    if target != actor.username {
        require_admin(&actor, "change other users' passwords")?;
    }
    if password.is_empty() {
        return Err(Error::InvalidInput("Password is required".to_string()));
    }

    let mut users = storage.load_users()?;
    let user = users
        .get_mut(&target)
        .ok_or_else(|| Error::NotFound(format!("User {}", target)))?;
    user.password_hash = hash_password(password);
    let view = UserView::from(&*user);
    storage.save_users(&users)?;
    tracing::info!(username = %target, by = %actor.username, "password changed");

    Ok(UserResult {
        message: format!("Password changed for {}", target),
        user: view,
    })
}

/// Change a user's level. Administrators only, and never their own demotion.
pub fn user_set_level(storage: &Storage, username: &str, level: UserLevel) -> Result<UserResult> {
    let actor = current_user(storage)?;
    require_admin(&actor, "change user levels")?;
    if username == actor.username && level != UserLevel::Admin {
        return Err(Error::InvalidInput(
            "Administrators cannot demote themselves".to_string(),
        ));
    }

    let mut users = storage.load_users()?;
    let user = users
        .get_mut(username)
        .ok_or_else(|| Error::NotFound(format!("User {}", username)))?;
    user.level = level;
    let view = UserView::from(&*user);
    storage.save_users(&users)?;
    tracing::info!(username, level = %level, by = %actor.username, "user level changed");

    Ok(UserResult {
        message: format!("{} is now {}", username, level),
        user: view,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::authenticate;
    use crate::commands::test_support::{add_operator, login_as};
    use crate::test_utils::TestEnv;

    #[test]
    fn test_admin_adds_user_who_can_log_in() {
        let env = TestEnv::new();
        let storage = env.storage();
        login_as(&storage, "admin");

        let added = user_add(&storage, "carla", "s3cret", UserLevel::Operator, "c@x.org").unwrap();
        assert_eq!(added.user.username, "carla");

        let users = storage.load_users().unwrap();
        assert!(authenticate(&users, "carla", "s3cret").is_ok());
        assert_ne!(users["carla"].password_hash, "s3cret");
    }

    #[test]
    fn test_add_duplicate_and_empty_password() {
        let env = TestEnv::new();
        let storage = env.storage();
        login_as(&storage, "admin");

        assert!(matches!(
            user_add(&storage, "admin", "x", UserLevel::Admin, ""),
            Err(Error::AlreadyExists(_))
        ));
        assert!(matches!(
            user_add(&storage, "dan", "", UserLevel::Operator, ""),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_operator_cannot_manage_users() {
        let env = TestEnv::new();
        let storage = add_operator(&env, "ana");
        login_as(&storage, "ana");

        assert!(matches!(user_list(&storage), Err(Error::PermissionDenied(_))));
        assert!(matches!(
            user_add(&storage, "eve", "pw", UserLevel::Admin, ""),
            Err(Error::PermissionDenied(_))
        ));
        assert!(matches!(
            user_passwd(&storage, Some("admin"), "owned"),
            Err(Error::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_operator_changes_own_password() {
        let env = TestEnv::new();
        let storage = add_operator(&env, "ana");
        login_as(&storage, "ana");

        user_passwd(&storage, None, "newpw").unwrap();
        let users = storage.load_users().unwrap();
        assert!(authenticate(&users, "ana", "newpw").is_ok());
        assert!(authenticate(&users, "ana", "pw").is_err());
    }

    #[test]
    fn test_set_level_and_self_demotion() {
        let env = TestEnv::new();
        let storage = add_operator(&env, "ana");
        login_as(&storage, "admin");

        user_set_level(&storage, "ana", UserLevel::Admin).unwrap();
        assert!(storage.load_users().unwrap()["ana"].is_admin());

        assert!(matches!(
            user_set_level(&storage, "admin", UserLevel::Operator),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            user_set_level(&storage, "ghost", UserLevel::Admin),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_list_hides_hashes() {
        let env = TestEnv::new();
        let storage = env.storage();
        login_as(&storage, "admin");

        let json = user_list(&storage).unwrap().to_json();
        assert!(json.contains("\"username\":\"admin\""));
        assert!(!json.contains("password_hash"));
    }
}
