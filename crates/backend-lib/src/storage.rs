// ============================
// crates/backend-lib/src/storage.rs
// ============================
//! Storage abstraction with flat-file implementation.
//!
//! Users and genres live in two JSON documents under the data directory.
//! Every write goes through one async mutex, so the uniqueness checks and the
//! insert that follows them happen as one step.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use exlibris_common::{Genre, UserPublic};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::{fs as tokio_fs, sync::Mutex};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;

const USERS_FILE: &str = "users.json";
const GENRES_FILE: &str = "genres.json";

/// A stored user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub(crate) password_hash: String,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn to_public(&self) -> UserPublic {
        UserPublic {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            is_admin: self.is_admin,
            created_at: Some(self.created_at),
        }
    }
}

/// Fields needed to create a user; the store assigns id and timestamp
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Persistent user records backing registration and login
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user with `is_admin = false`, enforcing unique email and username
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError>;

    /// Find a user whose email or username equals `identifier`
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Grant or revoke the admin flag of the user matching `identifier`
    async fn set_admin(&self, identifier: &str, is_admin: bool) -> Result<User, AppError>;
}

/// Persistent genre records managed from the admin pages
#[async_trait]
pub trait GenreStore: Send + Sync {
    /// All genres ordered by name
    async fn list_genres(&self) -> Result<Vec<Genre>, AppError>;

    async fn create_genre(&self, name: &str) -> Result<Genre, AppError>;

    async fn rename_genre(&self, id: &str, name: &str) -> Result<Genre, AppError>;

    async fn delete_genre(&self, id: &str) -> Result<(), AppError>;
}

fn email_matches(stored: &str, candidate: &str) -> bool {
    stored.eq_ignore_ascii_case(candidate)
}

fn identifier_matches(user: &User, identifier: &str) -> bool {
    email_matches(&user.email, identifier) || user.username == identifier
}

/// Flat-file implementation of [`UserStore`] and [`GenreStore`]
#[derive(Clone)]
pub struct FlatFileStorage {
    root: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FlatFileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, AppError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_doc<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, AppError> {
        let path = self.root.join(name);
        match tokio_fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Ok(T::default()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace a document via a temp file and rename. Caller holds `write_lock`.
    async fn write_doc<T: Serialize>(&self, name: &str, doc: &T) -> Result<(), AppError> {
        let path = self.root.join(name);
        let tmp = self.root.join(format!("{name}.tmp"));
        let json = serde_json::to_string_pretty(doc)?;
        tokio_fs::write(&tmp, json).await?;
        tokio_fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn find_user<F>(&self, pred: F) -> Result<Option<User>, AppError>
    where
        F: Fn(&User) -> bool + Send,
    {
        let users: Vec<User> = self.read_doc(USERS_FILE).await?;
        Ok(users.into_iter().find(|u| pred(u)))
    }
}

#[async_trait]
impl UserStore for FlatFileStorage {
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut users: Vec<User> = self.read_doc(USERS_FILE).await?;

        if users.iter().any(|u| email_matches(&u.email, &user.email)) {
            return Err(AppError::DuplicateEmail);
        }
        if users.iter().any(|u| u.username == user.username) {
            return Err(AppError::DuplicateUsername);
        }

        let created = User {
            id: Uuid::new_v4().to_string(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            is_admin: false,
            created_at: Utc::now(),
        };
        users.push(created.clone());
        self.write_doc(USERS_FILE, &users).await?;

        info!(user_id = %created.id, username = %created.username, "user created");
        Ok(created)
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, AppError> {
        self.find_user(|u| identifier_matches(u, identifier)).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find_user(|u| email_matches(&u.email, email)).await
    }

    async fn set_admin(&self, identifier: &str, is_admin: bool) -> Result<User, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut users: Vec<User> = self.read_doc(USERS_FILE).await?;

        let user = users
            .iter_mut()
            .find(|u| identifier_matches(u, identifier))
            .ok_or_else(|| AppError::NotFound(format!("user {identifier}")))?;
        user.is_admin = is_admin;
        let updated = user.clone();

        self.write_doc(USERS_FILE, &users).await?;
        info!(user_id = %updated.id, is_admin, "admin flag changed");
        Ok(updated)
    }
}

#[async_trait]
impl GenreStore for FlatFileStorage {
    async fn list_genres(&self) -> Result<Vec<Genre>, AppError> {
        let mut genres: Vec<Genre> = self.read_doc(GENRES_FILE).await?;
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    async fn create_genre(&self, name: &str) -> Result<Genre, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut genres: Vec<Genre> = self.read_doc(GENRES_FILE).await?;

        if genres.iter().any(|g| g.name == name) {
            return Err(AppError::DuplicateGenre(name.to_string()));
        }

        let genre = Genre {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };
        genres.push(genre.clone());
        self.write_doc(GENRES_FILE, &genres).await?;
        Ok(genre)
    }

    async fn rename_genre(&self, id: &str, name: &str) -> Result<Genre, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut genres: Vec<Genre> = self.read_doc(GENRES_FILE).await?;

        if genres.iter().any(|g| g.name == name && g.id != id) {
            return Err(AppError::DuplicateGenre(name.to_string()));
        }

        let genre = genres
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| AppError::NotFound(format!("genre {id}")))?;
        genre.name = name.to_string();
        let updated = genre.clone();

        self.write_doc(GENRES_FILE, &genres).await?;
        Ok(updated)
    }

    async fn delete_genre(&self, id: &str) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let mut genres: Vec<Genre> = self.read_doc(GENRES_FILE).await?;

        let before = genres.len();
        genres.retain(|g| g.id != id);
        if genres.len() == before {
            return Err(AppError::NotFound(format!("genre {id}")));
        }

        self.write_doc(GENRES_FILE, &genres).await
    }
}
