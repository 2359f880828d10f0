//! User model - one row per registered account.

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

pub const DEFAULT_NAME: &str = "Guest";
pub const DEFAULT_LANGUAGE: &str = "English";

/// User entity as stored. Holds the password hash, so it is never serialized directly.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub blood_group: Option<String>,
    pub blood_pressure: Option<String>,
    pub language: Option<String>,
}

impl User {
    /// Convert to the public view (no password hash).
    pub fn view(&self) -> UserView {
        UserView::from(self.clone())
    }
}

/// Values for a row about to be inserted; the id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub contact: Option<String>,
    pub language: String,
}

impl NewUser {
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            email,
            password_hash,
            name: DEFAULT_NAME.to_string(),
            contact: None,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn into_user(self, id: i64) -> User {
        User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            name: Some(self.name),
            age: None,
            gender: None,
            contact: self.contact,
            address: None,
            blood_group: None,
            blood_pressure: None,
            language: Some(self.language),
        }
    }
}

/// Columns to write on an existing row. An outer `None` leaves the column as stored,
/// `Some(None)` writes NULL.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub password_hash: Option<String>,
    pub name: Option<Option<String>>,
    pub age: Option<Option<i32>>,
    pub gender: Option<Option<String>>,
    pub contact: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub blood_group: Option<Option<String>>,
    pub blood_pressure: Option<Option<String>>,
    pub language: Option<Option<String>>,
}

impl UserChanges {
    pub fn password(password_hash: String) -> Self {
        Self {
            password_hash: Some(password_hash),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.password_hash.is_none()
            && self.name.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.contact.is_none()
            && self.address.is_none()
            && self.blood_group.is_none()
            && self.blood_pressure.is_none()
            && self.language.is_none()
    }

    /// Write the set columns into `user`, leaving the others alone.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(hash) = &self.password_hash {
            user.password_hash = hash.clone();
        }
        set(&mut user.name, &self.name);
        set(&mut user.age, &self.age);
        set(&mut user.gender, &self.gender);
        set(&mut user.contact, &self.contact);
        set(&mut user.address, &self.address);
        set(&mut user.blood_group, &self.blood_group);
        set(&mut user.blood_pressure, &self.blood_pressure);
        set(&mut user.language, &self.language);
    }
}

fn set<T: Clone>(column: &mut Option<T>, change: &Option<Option<T>>) {
    if let Some(value) = change {
        *column = value.clone();
    }
}

/// User profile returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserView {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub blood_group: Option<String>,
    pub blood_pressure: Option<String>,
    pub language: Option<String>,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            age: u.age,
            gender: u.gender,
            contact: u.contact,
            address: u.address,
            blood_group: u.blood_group,
            blood_pressure: u.blood_pressure,
            language: u.language,
        }
    }
}
