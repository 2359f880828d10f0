//! Storage seams for users and hospitals.
//!
//! `Database` is the PostgreSQL implementation; `MemoryStore` keeps rows in process
//! memory and is used by tests and local experiments.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::models::{Hospital, NewHospital, NewUser, User, UserChanges};
use crate::services::ServiceError;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, ServiceError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError>;

    /// Insert a user. A duplicate email yields `ServiceError::UserAlreadyExists`.
    async fn insert_user(&self, user: NewUser) -> Result<User, ServiceError>;

    /// Write only the columns set in `changes`; concurrent updates to other columns survive.
    async fn update_user(&self, user_id: i64, changes: &UserChanges) -> Result<(), ServiceError>;

    async fn health_check(&self) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait HospitalStore: Send + Sync {
    async fn has_hospitals(&self) -> Result<bool, ServiceError>;

    async fn insert_hospitals(&self, hospitals: Vec<NewHospital>) -> Result<(), ServiceError>;

    async fn list_hospitals(&self) -> Result<Vec<Hospital>, ServiceError>;
}

#[derive(Default)]
struct MemoryTables {
    users: BTreeMap<i64, User>,
    hospitals: BTreeMap<i64, Hospital>,
    next_user_id: i64,
    next_hospital_id: i64,
}

/// In-memory store with the same uniqueness rules as the SQL schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<MemoryTables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryTables>, ServiceError> {
        self.tables
            .lock()
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Memory store mutex poisoned: {}", e)))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, ServiceError> {
        Ok(self.lock()?.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, ServiceError> {
        let mut tables = self.lock()?;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(ServiceError::UserAlreadyExists);
        }

        tables.next_user_id += 1;
        let user = user.into_user(tables.next_user_id);
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, user_id: i64, changes: &UserChanges) -> Result<(), ServiceError> {
        let mut tables = self.lock()?;
        let row = tables
            .users
            .get_mut(&user_id)
            .ok_or(ServiceError::UserNotFound)?;
        changes.apply_to(row);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        self.lock().map(|_| ())
    }
}

#[async_trait]
impl HospitalStore for MemoryStore {
    async fn has_hospitals(&self) -> Result<bool, ServiceError> {
        Ok(!self.lock()?.hospitals.is_empty())
    }

    async fn insert_hospitals(&self, hospitals: Vec<NewHospital>) -> Result<(), ServiceError> {
        let mut tables = self.lock()?;
        for hospital in hospitals {
            tables.next_hospital_id += 1;
            let id = tables.next_hospital_id;
            tables.hospitals.insert(id, hospital.into_hospital(id));
        }
        Ok(())
    }

    async fn list_hospitals(&self) -> Result<Vec<Hospital>, ServiceError> {
        Ok(self.lock()?.hospitals.values().cloned().collect())
    }
}
