use async_trait::async_trait;
use dao_utils::is_unique_violation;
use sql_connection::SqlConnect;
use tokio_postgres::Row;
use tracing::{instrument, warn};
use user_errors::UserError;
use user_models::{NewUser, Role, User};
use user_store::UserStore;

const COLUMNS: &str = "id, username, password_hash, phone_number, role, name";

#[derive(Clone)]
pub struct UserDao {
    db: SqlConnect,
}

impl UserDao {
    pub fn new(db: SqlConnect) -> Self { Self { db } }

    fn map_row(row: &Row) -> Result<User, UserError> {
        let role: String = row.try_get("role")?;
        let role = role.parse::<Role>().map_err(UserError::InternalError)?;

        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            phone_number: row.try_get("phone_number")?,
            role,
            name: row.try_get("name")?,
        })
    }
}

#[async_trait]
impl UserStore for UserDao {
    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<User, UserError> {
        let client = self.db.get_client().await?;
        let stmt = client
            .prepare(&format!("SELECT {COLUMNS} FROM users WHERE username = $1"))
            .await?;
        let rows = client.query(&stmt, &[&username]).await?;

        match rows.first() {
            Some(row) => Self::map_row(row),
            None => {
                Err(UserError::NameNotFound {
                    username: username.to_owned(),
                })
            }
        }
    }

    #[instrument(skip(self, user), fields(user.username = %user.username))]
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut client = self.db.get_client().await?;
        let tx = client.transaction().await?;

        let sql = format!(
            "INSERT INTO users (username, password_hash, phone_number, role, name)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let inserted = tx
            .query_one(sql.as_str(), &[
                &user.username,
                &user.password_hash,
                &user.phone_number,
                &user.role.as_str(),
                &user.name,
            ])
            .await;

        let row = match inserted {
            Ok(row) => row,
            Err(e) if is_unique_violation(&e) => {
                warn!(username = %user.username, "username already taken");
                return Err(UserError::NameExists);
            }
            Err(e) => return Err(e.into()),
        };
        let created = Self::map_row(&row)?;
        tx.commit().await?;

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use test_utils::TestPostgresContainer;

    use super::*;

    fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            username: username.into(),
            password_hash: "$argon2id$stub".into(),
            phone_number: "+79990001122".into(),
            role,
            name: "Ann".into(),
        }
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn created_users_are_found_by_name() {
        let container = TestPostgresContainer::new().await.unwrap();
        let dao = UserDao::new(container.sql_connect());

        let created = dao.create(new_user("ann", Role::Owner)).await.unwrap();
        let found = dao.find_by_username("ann").await.unwrap();

        assert_eq!(found, created);
        assert_eq!(found.role, Role::Owner);
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn duplicate_username_is_rejected() {
        let container = TestPostgresContainer::new().await.unwrap();
        let dao = UserDao::new(container.sql_connect());
        dao.create(new_user("ann", Role::Client)).await.unwrap();

        let err = dao.create(new_user("ann", Role::Client)).await.unwrap_err();

        assert!(matches!(err, UserError::NameExists));
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn unknown_username_is_not_found() {
        let container = TestPostgresContainer::new().await.unwrap();
        let dao = UserDao::new(container.sql_connect());

        let err = dao.find_by_username("ghost").await.unwrap_err();

        assert!(matches!(err, UserError::NameNotFound { .. }));
    }
}
