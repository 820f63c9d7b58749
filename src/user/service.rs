use crate::auth::service::AuthService;
use crate::user;

use super::model::{User, UserDto, UserInfo};
use super::Repository;

#[derive(Clone)]
pub struct UserService {
    repo: Repository,
    auth_service: AuthService,
}

impl UserService {
    pub fn new(repo: Repository, auth_service: AuthService) -> Self {
        Self { repo, auth_service }
    }
}

impl UserService {
    /// Nickname-based login. Generates a fresh identity and mirrors it
    /// into the backend; the caller persists the returned record locally.
    pub async fn login(&self, nickname: &str) -> super::Result<UserDto> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(user::Error::EmptyNickname);
        }

        let user = User::new(nickname);
        self.repo.insert(&user).await?;

        Ok(UserDto::from(user))
    }

    pub async fn find_user_info(&self, id: &user::Id) -> super::Result<UserInfo> {
        self.repo.find_by_id(id).await.map(UserInfo::from)
    }

    /// Admin console listing, newest first. Fails closed: non-admin callers
    /// get an empty list instead of an error.
    pub async fn find_all(&self, caller: &UserInfo) -> super::Result<Vec<UserDto>> {
        if !caller.is_admin {
            return Ok(Vec::new());
        }

        let users = self.repo.find_all().await?;

        Ok(users.into_iter().map(UserDto::from).collect())
    }

    pub async fn rename(
        &self,
        caller: &UserInfo,
        id: &user::Id,
        nickname: &str,
    ) -> super::Result<()> {
        if !caller.is_admin {
            return Err(user::Error::NotAdmin);
        }

        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(user::Error::EmptyNickname);
        }

        self.repo.find_by_id(id).await?;
        self.repo.update_nickname(id, nickname).await
    }

    /// Deletes an identity. An admin target additionally requires the shared
    /// secret to be re-submitted. Room participant entries referencing the
    /// identity are intentionally left in place.
    pub async fn delete(
        &self,
        caller: &UserInfo,
        id: &user::Id,
        password: Option<&str>,
    ) -> super::Result<()> {
        if !caller.is_admin {
            return Err(user::Error::NotAdmin);
        }

        let target = self.repo.find_by_id(id).await?;
        if target.is_admin {
            let confirmed = password.is_some_and(|p| self.auth_service.check(p));
            if !confirmed {
                return Err(user::Error::ConfirmationRequired);
            }
        }

        self.repo.delete(id).await
    }

    /// Flags the identity as admin. Sticky: there is no demotion path.
    pub async fn promote(&self, id: &user::Id) -> super::Result<()> {
        self.repo.set_admin(id).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::user;
    use crate::user::repository::UserRepository;

    #[derive(Default)]
    struct InMemoryUsers {
        users: Mutex<HashMap<user::Id, User>>,
    }

    #[async_trait]
    impl UserRepository for InMemoryUsers {
        async fn insert(&self, user: &User) -> user::Result<()> {
            self.users
                .lock()
                .unwrap()
                .insert(user.id.clone(), user.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &user::Id) -> user::Result<User> {
            self.users
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or(user::Error::NotFound(id.to_owned()))
        }

        async fn find_all(&self) -> user::Result<Vec<User>> {
            let mut users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
            users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(users)
        }

        async fn update_nickname(&self, id: &user::Id, nickname: &str) -> user::Result<()> {
            if let Some(u) = self.users.lock().unwrap().get_mut(id) {
                u.nickname = nickname.to_string();
            }
            Ok(())
        }

        async fn set_admin(&self, id: &user::Id) -> user::Result<()> {
            if let Some(u) = self.users.lock().unwrap().get_mut(id) {
                u.is_admin = true;
            }
            Ok(())
        }

        async fn delete(&self, id: &user::Id) -> user::Result<()> {
            self.users.lock().unwrap().remove(id);
            Ok(())
        }
    }

    fn service() -> (UserService, Arc<InMemoryUsers>) {
        let repo = Arc::new(InMemoryUsers::default());
        let auth = AuthService::new("4490");
        (UserService::new(repo.clone(), auth), repo)
    }

    fn admin() -> UserInfo {
        UserInfo {
            id: user::Id::random(),
            nickname: "운영자".to_string(),
            is_admin: true,
        }
    }

    fn member(nickname: &str) -> UserInfo {
        UserInfo {
            id: user::Id::random(),
            nickname: nickname.to_string(),
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn login_creates_non_admin_identity() {
        let (service, repo) = service();

        let dto = service.login("  kevin  ").await.unwrap();

        assert_eq!(dto.nickname, "kevin");
        assert!(!dto.is_admin);
        assert!(repo.users.lock().unwrap().contains_key(&dto.id));
    }

    #[tokio::test]
    async fn login_rejects_blank_nickname() {
        let (service, _) = service();

        let result = service.login("   ").await;

        assert!(matches!(result, Err(user::Error::EmptyNickname)));
    }

    #[tokio::test]
    async fn find_all_fails_closed_for_non_admin() {
        let (service, _) = service();
        service.login("a").await.unwrap();
        service.login("b").await.unwrap();

        let listed = service.find_all(&member("a")).await.unwrap();

        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn find_all_returns_newest_first_for_admin() {
        let (service, repo) = service();
        for (i, nickname) in ["first", "second", "third"].iter().enumerate() {
            let mut u = User::new(nickname);
            u.created_at = i as i64;
            repo.insert(&u).await.unwrap();
        }

        let listed = service.find_all(&admin()).await.unwrap();

        let nicknames: Vec<&str> = listed.iter().map(|u| u.nickname.as_str()).collect();
        assert_eq!(nicknames, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn rename_requires_admin() {
        let (service, _) = service();
        let dto = service.login("kevin").await.unwrap();

        let result = service.rename(&member("mallory"), &dto.id, "other").await;

        assert!(matches!(result, Err(user::Error::NotAdmin)));
    }

    #[tokio::test]
    async fn rename_overwrites_nickname() {
        let (service, repo) = service();
        let dto = service.login("kevin").await.unwrap();

        service.rename(&admin(), &dto.id, "케빈").await.unwrap();

        let stored = repo.find_by_id(&dto.id).await.unwrap();
        assert_eq!(stored.nickname, "케빈");
    }

    #[tokio::test]
    async fn delete_non_admin_target_is_immediate() {
        let (service, repo) = service();
        let dto = service.login("kevin").await.unwrap();

        service.delete(&admin(), &dto.id, None).await.unwrap();

        assert!(repo.users.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_admin_target_requires_reconfirmation() {
        let (service, repo) = service();
        let dto = service.login("kevin").await.unwrap();
        service.promote(&dto.id).await.unwrap();

        let denied = service.delete(&admin(), &dto.id, None).await;
        assert!(matches!(denied, Err(user::Error::ConfirmationRequired)));

        let denied = service.delete(&admin(), &dto.id, Some("0000")).await;
        assert!(matches!(denied, Err(user::Error::ConfirmationRequired)));
        assert!(repo.users.lock().unwrap().contains_key(&dto.id));

        service.delete(&admin(), &dto.id, Some("4490")).await.unwrap();
        assert!(repo.users.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn promote_is_sticky() {
        let (service, repo) = service();
        let dto = service.login("kevin").await.unwrap();

        service.promote(&dto.id).await.unwrap();
        service.promote(&dto.id).await.unwrap();

        assert!(repo.find_by_id(&dto.id).await.unwrap().is_admin);
    }
}
