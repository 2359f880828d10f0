//! PostgreSQL database service.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, Postgres};
use sqlx::query_builder::Separated;
use sqlx::QueryBuilder;

use crate::models::{Hospital, NewHospital, NewUser, User, UserChanges};
use crate::services::store::{HospitalStore, UserStore};
use crate::services::ServiceError;

/// PostgreSQL database wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database wrapper from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(e: sqlx::Error) -> ServiceError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            ServiceError::UserAlreadyExists
        }
        _ => ServiceError::Database(e),
    }
}

fn set_column<'args, T>(
    columns: &mut Separated<'_, 'args, Postgres, &'static str>,
    column: &'static str,
    change: &Option<Option<T>>,
) where
    T: Clone + Send + 'args + sqlx::Encode<'args, Postgres> + sqlx::Type<Postgres>,
{
    if let Some(value) = change {
        columns
            .push(column)
            .push_unseparated(" = ")
            .push_bind_unseparated(value.clone());
    }
}

#[async_trait]
impl UserStore for Database {
    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, ServiceError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, ServiceError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, name, contact, language)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.contact)
        .bind(&user.language)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    async fn update_user(&self, user_id: i64, changes: &UserChanges) -> Result<(), ServiceError> {
        if changes.is_empty() {
            return match self.find_user_by_id(user_id).await? {
                Some(_) => Ok(()),
                None => Err(ServiceError::UserNotFound),
            };
        }

        let mut query = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        {
            let mut columns = query.separated(", ");
            if let Some(hash) = &changes.password_hash {
                columns
                    .push("password_hash = ")
                    .push_bind_unseparated(hash.clone());
            }
            set_column(&mut columns, "name", &changes.name);
            set_column(&mut columns, "age", &changes.age);
            set_column(&mut columns, "gender", &changes.gender);
            set_column(&mut columns, "contact", &changes.contact);
            set_column(&mut columns, "address", &changes.address);
            set_column(&mut columns, "blood_group", &changes.blood_group);
            set_column(&mut columns, "blood_pressure", &changes.blood_pressure);
            set_column(&mut columns, "language", &changes.language);
        }
        query.push(" WHERE id = ").push_bind(user_id);

        let result = query.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::UserNotFound);
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl HospitalStore for Database {
    async fn has_hospitals(&self) -> Result<bool, ServiceError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM hospitals)")
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn insert_hospitals(&self, hospitals: Vec<NewHospital>) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;
        for hospital in &hospitals {
            sqlx::query(
                r#"
                INSERT INTO hospitals (name, distance, doctors, beds, ventilators, blood)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(hospital.name)
            .bind(hospital.distance)
            .bind(hospital.doctors)
            .bind(hospital.beds)
            .bind(hospital.ventilators)
            .bind(hospital.blood)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_hospitals(&self) -> Result<Vec<Hospital>, ServiceError> {
        let hospitals = sqlx::query_as::<_, Hospital>("SELECT * FROM hospitals")
            .fetch_all(&self.pool)
            .await?;
        Ok(hospitals)
    }
}
