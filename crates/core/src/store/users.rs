//! User collection operations and the bootstrap admin account.

use uuid::Uuid;

use crate::domain::{Role, User};
use crate::error::{HcmsError, HcmsResult};

use super::DocumentStore;

/// Username reserved for the bootstrap admin account.
const ADMIN_USERNAME: &str = "admin";

impl DocumentStore {
    /// Inserts a new user. Usernames are unique.
    pub async fn insert_user(&self, user: User) -> HcmsResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.username == user.username) {
            return Err(HcmsError::Validation(
                "Username is already taken".to_string(),
            ));
        }
        users.insert(user.id, user);
        Ok(())
    }

    pub async fn user(&self, id: Uuid) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }

    /// Resolves a bearer token to its account. Inactive accounts do
    /// not resolve.
    pub async fn user_by_token(&self, token: &str) -> Option<User> {
        self.users
            .read()
            .await
            .values()
            .find(|user| user.is_active && user.token == token)
            .cloned()
    }

    /// Lists all users ordered by username.
    pub async fn list_users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }

    /// Ensures the bootstrap admin account exists and carries the
    /// configured token. Safe to call on every startup.
    pub async fn bootstrap_admin(&self, token: &str) -> User {
        let mut users = self.users.write().await;
        if let Some(admin) = users
            .values_mut()
            .find(|user| user.username == ADMIN_USERNAME)
        {
            admin.token = token.to_string();
            admin.is_active = true;
            return admin.clone();
        }
        let admin = User::new(
            ADMIN_USERNAME.to_string(),
            "Administrator".to_string(),
            Role::Admin,
            token.to_string(),
        );
        users.insert(admin.id, admin.clone());
        admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str, token: &str) -> User {
        User::new(
            username.to_string(),
            "Test User".to_string(),
            Role::Reception,
            token.to_string(),
        )
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let store = DocumentStore::new();
        store
            .insert_user(user("reception", "token-a"))
            .await
            .expect("First insert should succeed");
        let result = store.insert_user(user("reception", "token-b")).await;
        assert!(matches!(result, Err(HcmsError::Validation(_))));
    }

    #[tokio::test]
    async fn tokens_resolve_only_active_accounts() {
        let store = DocumentStore::new();
        let mut account = user("reception", "token-a");
        account.is_active = false;
        store
            .insert_user(account)
            .await
            .expect("Insert should succeed");
        assert!(store.user_by_token("token-a").await.is_none());
    }

    #[tokio::test]
    async fn bootstrap_admin_is_idempotent_and_rotates_the_token() {
        let store = DocumentStore::new();
        let first = store.bootstrap_admin("initial-admin-token").await;
        let second = store.bootstrap_admin("rotated-admin-token").await;
        assert_eq!(first.id, second.id);
        assert!(store.user_by_token("initial-admin-token").await.is_none());
        let resolved = store
            .user_by_token("rotated-admin-token")
            .await
            .expect("Rotated token should resolve");
        assert_eq!(resolved.role, Role::Admin);
    }
}
