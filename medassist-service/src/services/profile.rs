//! Account and profile operations over a user's own row.
//!
//! Every call re-reads the row from the store; nothing is cached between requests.
//! Mutations send only the columns they change, so overlapping requests keep each
//! other's writes.

use serde_json::Value;
use std::sync::Arc;

use super::jwt::JwtService;
use super::store::UserStore;
use super::ServiceError;
use crate::dtos::non_empty;
use crate::dtos::profile::{ChangePasswordRequest, UpdateHealthRequest, UpdateProfileRequest};
use crate::models::{NewUser, User, UserChanges, UserView};
use crate::utils::{hash_password, verify_password, Password};

#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserStore>,
    jwt: JwtService,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserStore>, jwt: JwtService) -> Self {
        Self { users, jwt }
    }

    pub async fn register(
        &self,
        email: String,
        password: Password,
        name: Option<String>,
        contact: Option<String>,
    ) -> Result<i64, ServiceError> {
        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(ServiceError::UserAlreadyExists);
        }

        let password_hash = hash_password(&password).map_err(|e| {
            ServiceError::Internal(anyhow::anyhow!("Password hashing error: {}", e))
        })?;

        let mut new_user = NewUser::new(email, password_hash);
        if let Some(name) = name {
            new_user.name = name;
        }
        new_user.contact = contact;

        let user = self.users.insert_user(new_user).await?;
        tracing::info!(user_id = user.id, "User registered");
        Ok(user.id)
    }

    /// Check credentials and issue an access token.
    pub async fn login(&self, email: &str, password: Password) -> Result<String, ServiceError> {
        let user = self
            .users
            .find_user_by_email(email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !verify_password(&password, &user.password_hash)? {
            tracing::info!(user_id = user.id, "Login rejected: wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.jwt.generate_access_token(user.id)?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok(token)
    }

    pub async fn get_profile(&self, user_id: i64) -> Result<UserView, ServiceError> {
        Ok(self.load(user_id).await?.view())
    }

    /// Apply the keys present in `req`. A bad age rejects the whole update.
    pub async fn update_profile(
        &self,
        user_id: i64,
        req: UpdateProfileRequest,
    ) -> Result<UserView, ServiceError> {
        self.load(user_id).await?;

        let age = match &req.age {
            Some(value) => Some(parse_age(value.as_ref().unwrap_or(&Value::Null))?),
            None => None,
        };

        let changes = UserChanges {
            name: req.name,
            age,
            gender: req.gender,
            contact: req.contact,
            address: req.address,
            language: req.language,
            ..Default::default()
        };
        self.save(user_id, &changes).await
    }

    pub async fn update_health(
        &self,
        user_id: i64,
        req: UpdateHealthRequest,
    ) -> Result<UserView, ServiceError> {
        self.load(user_id).await?;

        let changes = UserChanges {
            blood_group: req.blood_group,
            blood_pressure: req.blood_pressure,
            ..Default::default()
        };
        self.save(user_id, &changes).await
    }

    /// Replace the password hash. The user is looked up before the fields are checked,
    /// so an unknown user is 404 even for an incomplete request.
    pub async fn change_password(
        &self,
        user_id: i64,
        req: ChangePasswordRequest,
    ) -> Result<(), ServiceError> {
        let user = self.load(user_id).await?;

        let (Some(old_password), Some(new_password)) =
            (non_empty(req.old_password), non_empty(req.new_password))
        else {
            return Err(ServiceError::ValidationError(
                "old_password and new_password required".to_string(),
            ));
        };

        if !verify_password(&Password::new(old_password), &user.password_hash)? {
            return Err(ServiceError::IncorrectPassword);
        }

        let password_hash = hash_password(&Password::new(new_password)).map_err(|e| {
            ServiceError::Internal(anyhow::anyhow!("Password hashing error: {}", e))
        })?;
        self.users
            .update_user(user_id, &UserChanges::password(password_hash))
            .await?;

        tracing::info!(user_id, "Password changed");
        Ok(())
    }

    async fn load(&self, user_id: i64) -> Result<User, ServiceError> {
        self.users
            .find_user_by_id(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound)
    }

    async fn save(&self, user_id: i64, changes: &UserChanges) -> Result<UserView, ServiceError> {
        self.users.update_user(user_id, changes).await?;
        Ok(self.load(user_id).await?.view())
    }
}

/// Interpret a submitted age.
///
/// Falsy values (`null`, `false`, `0`, `""`, `[]`, `{}`) clear the age. `true` counts as 1,
/// integers and integer strings are stored, and non-zero floats truncate toward zero
/// (so `0.5` stores 0). Everything else is invalid.
pub fn parse_age(value: &Value) -> Result<Option<i32>, ServiceError> {
    let invalid = || ServiceError::ValidationError("Invalid age".to_string());

    match value {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::Bool(true) => Ok(Some(1)),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::Array(a) if a.is_empty() => Ok(None),
        Value::Object(o) if o.is_empty() => Ok(None),
        Value::String(s) => s.trim().parse::<i32>().map(Some).map_err(|_| invalid()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return match i {
                    0 => Ok(None),
                    _ => i32::try_from(i).map(Some).map_err(|_| invalid()),
                };
            }
            let f = n.as_f64().ok_or_else(invalid)?;
            if f == 0.0 {
                return Ok(None);
            }
            let f = f.trunc();
            if f.is_finite() && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
                Ok(Some(f as i32))
            } else {
                Err(invalid())
            }
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::services::MemoryStore;
    use async_trait::async_trait;
    use secrecy::Secret;
    use serde_json::json;
    use std::time::Duration;

    fn service_with(users: Arc<dyn UserStore>) -> ProfileService {
        let jwt = JwtService::new(&JwtConfig {
            secret: Secret::new("test-secret".to_string()),
            access_token_expiry_days: 30,
        });
        ProfileService::new(users, jwt)
    }

    fn service() -> ProfileService {
        service_with(Arc::new(MemoryStore::new()))
    }

    fn pw(s: &str) -> Password {
        Password::new(s.to_string())
    }

    fn passwords(old: &str, new: &str) -> ChangePasswordRequest {
        ChangePasswordRequest {
            old_password: Some(old.to_string()),
            new_password: Some(new.to_string()),
        }
    }

    /// Holds `update_user` calls that set the address to "slow" so another update can
    /// land in between.
    struct SlowStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl UserStore for SlowStore {
        async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, ServiceError> {
            self.inner.find_user_by_id(user_id).await
        }

        async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
            self.inner.find_user_by_email(email).await
        }

        async fn insert_user(&self, user: NewUser) -> Result<User, ServiceError> {
            self.inner.insert_user(user).await
        }

        async fn update_user(
            &self,
            user_id: i64,
            changes: &UserChanges,
        ) -> Result<(), ServiceError> {
            if changes.address == Some(Some("slow".to_string())) {
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            self.inner.update_user(user_id, changes).await
        }

        async fn health_check(&self) -> Result<(), ServiceError> {
            self.inner.health_check().await
        }
    }

    #[test]
    fn parse_age_accepts_integers_and_clears_falsy_values() {
        assert_eq!(parse_age(&json!(41)).unwrap(), Some(41));
        assert_eq!(parse_age(&json!("41")).unwrap(), Some(41));
        assert_eq!(parse_age(&json!(" 41 ")).unwrap(), Some(41));
        assert_eq!(parse_age(&json!(41.9)).unwrap(), Some(41));
        assert_eq!(parse_age(&json!("")).unwrap(), None);
        assert_eq!(parse_age(&json!(null)).unwrap(), None);
        assert_eq!(parse_age(&json!(0)).unwrap(), None);
        assert_eq!(parse_age(&json!(false)).unwrap(), None);
        assert_eq!(parse_age(&json!(0.0)).unwrap(), None);
    }

    #[test]
    fn parse_age_follows_integer_coercion() {
        assert_eq!(parse_age(&json!(true)).unwrap(), Some(1));
        assert_eq!(parse_age(&json!(0.5)).unwrap(), Some(0));
        assert_eq!(parse_age(&json!(-0.5)).unwrap(), Some(0));
        assert_eq!(parse_age(&json!(-3.7)).unwrap(), Some(-3));
    }

    #[test]
    fn parse_age_rejects_everything_else() {
        for bad in [json!("abc"), json!("4.5"), json!("  "), json!([3]), json!({"a": 1}), json!(1e12)] {
            assert!(
                matches!(parse_age(&bad), Err(ServiceError::ValidationError(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn register_applies_defaults_and_overrides() {
        let service = service();
        let id = service
            .register("a@b.com".into(), pw("pw123"), None, Some("555".into()))
            .await
            .unwrap();

        let profile = service.get_profile(id).await.unwrap();
        assert_eq!(profile.name.as_deref(), Some("Guest"));
        assert_eq!(profile.language.as_deref(), Some("English"));
        assert_eq!(profile.contact.as_deref(), Some("555"));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let service = service();
        service
            .register("a@b.com".into(), pw("pw123"), None, None)
            .await
            .unwrap();
        let second = service
            .register("a@b.com".into(), pw("other"), None, None)
            .await;
        assert!(matches!(second, Err(ServiceError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn login_checks_password() {
        let service = service();
        service
            .register("a@b.com".into(), pw("pw123"), None, None)
            .await
            .unwrap();

        assert!(service.login("a@b.com", pw("pw123")).await.is_ok());
        assert!(matches!(
            service.login("a@b.com", pw("nope")).await,
            Err(ServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login("x@y.com", pw("pw123")).await,
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn invalid_age_leaves_row_untouched() {
        let service = service();
        let id = service
            .register("a@b.com".into(), pw("pw123"), None, None)
            .await
            .unwrap();

        let req = UpdateProfileRequest {
            age: Some(Some(json!(30))),
            ..Default::default()
        };
        service.update_profile(id, req).await.unwrap();

        let req = UpdateProfileRequest {
            name: Some(Some("Changed".into())),
            age: Some(Some(json!("abc"))),
            ..Default::default()
        };
        assert!(service.update_profile(id, req).await.is_err());

        let profile = service.get_profile(id).await.unwrap();
        assert_eq!(profile.age, Some(30));
        assert_eq!(profile.name.as_deref(), Some("Guest"));
    }

    #[tokio::test]
    async fn explicit_null_clears_field() {
        let service = service();
        let id = service
            .register("a@b.com".into(), pw("pw123"), None, None)
            .await
            .unwrap();

        let req = UpdateProfileRequest {
            language: Some(None),
            ..Default::default()
        };
        let profile = service.update_profile(id, req).await.unwrap();
        assert_eq!(profile.language, None);
        assert_eq!(profile.name.as_deref(), Some("Guest"));
    }

    #[tokio::test]
    async fn change_password_requires_old_password() {
        let service = service();
        let id = service
            .register("a@b.com".into(), pw("pw123"), None, None)
            .await
            .unwrap();

        let wrong = service.change_password(id, passwords("bad", "new")).await;
        assert!(matches!(wrong, Err(ServiceError::IncorrectPassword)));

        service
            .change_password(id, passwords("pw123", "new"))
            .await
            .unwrap();
        assert!(service.login("a@b.com", pw("pw123")).await.is_err());
        assert!(service.login("a@b.com", pw("new")).await.is_ok());
    }

    #[tokio::test]
    async fn change_password_checks_user_before_fields() {
        let service = service();
        let incomplete = ChangePasswordRequest {
            old_password: Some("pw123".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.change_password(99, incomplete).await,
            Err(ServiceError::UserNotFound)
        ));

        let id = service
            .register("a@b.com".into(), pw("pw123"), None, None)
            .await
            .unwrap();
        let incomplete = ChangePasswordRequest {
            old_password: Some("pw123".to_string()),
            new_password: Some(String::new()),
        };
        assert!(matches!(
            service.change_password(id, incomplete).await,
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn overlapping_updates_keep_each_others_columns() {
        let service = service_with(Arc::new(SlowStore {
            inner: MemoryStore::new(),
        }));
        let id = service
            .register("a@b.com".into(), pw("old"), None, None)
            .await
            .unwrap();

        let profile_update = service.update_profile(
            id,
            UpdateProfileRequest {
                address: Some(Some("slow".into())),
                ..Default::default()
            },
        );
        let password_update = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            service.change_password(id, passwords("old", "new")).await
        };
        let (profile, password) = tokio::join!(profile_update, password_update);

        assert_eq!(profile.unwrap().address.as_deref(), Some("slow"));
        password.unwrap();
        assert!(service.login("a@b.com", pw("new")).await.is_ok());
        assert!(service.login("a@b.com", pw("old")).await.is_err());
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let service = service();
        assert!(matches!(
            service.get_profile(99).await,
            Err(ServiceError::UserNotFound)
        ));
    }
}
