use crate::db::errors::{DBError, InMemoryError};
use crate::db::product::TrackedProduct;
use crate::db::user::User;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use uuid::Uuid;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FileStructure {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub products: Vec<TrackedProduct>,
}

impl FileStructure {
    fn load(path: &Path) -> Result<Option<Self>, DBError> {
        if !path.is_file() {
            return Ok(None);
        }
        let data = fs::read_to_string(path).map_err(InMemoryError::IoError)?;
        let stored = serde_json::from_str(&data).map_err(InMemoryError::SerdeError)?;
        Ok(Some(stored))
    }
}

/// Registry kept in memory, optionally mirrored to a JSON file.
///
/// The file may be shared with other processes (the shell and a cron run).
/// Reads pick up the latest file contents. Writes reload the file under an
/// exclusive lock, change only the record they touch and write it back.
#[derive(Debug, Default)]
pub struct InMemoryDB {
    users: RwLock<Vec<User>>,
    products: RwLock<Vec<TrackedProduct>>,
    file_path: Option<PathBuf>,
    file_lock: Mutex<()>,
}

impl TryFrom<String> for InMemoryDB {
    type Error = DBError;

    fn try_from(file_path: String) -> Result<Self, Self::Error> {
        let path = PathBuf::from(file_path);
        let db = FileStructure::load(&path)?.unwrap_or_default();
        Ok(Self {
            users: RwLock::new(db.users),
            products: RwLock::new(db.products),
            file_path: Some(path),
            file_lock: Mutex::new(()),
        })
    }
}

fn poisoned<T>(_: T) -> DBError {
    DBError::InMemoryError(InMemoryError::Poisoned)
}

impl InMemoryDB {
    pub fn all_users(&self) -> Result<Vec<User>, DBError> {
        self.refresh()?;
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.clone())
    }

    pub fn get_user_by(&self, id: Uuid) -> Result<User, DBError> {
        self.refresh()?;
        let users = self.users.read().map_err(poisoned)?;
        users
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .ok_or(DBError::UnknownUser)
    }

    pub fn save_user(&self, user: &User) -> Result<(), DBError> {
        self.transact(|state| {
            match state.users.iter_mut().find(|stored| stored.id == user.id) {
                Some(stored) => *stored = user.clone(),
                None => state.users.push(user.clone()),
            }
            Ok(())
        })
    }

    /// Removes the user together with everything they track.
    pub fn delete_user(&self, id: Uuid) -> Result<(), DBError> {
        self.transact(|state| {
            let before = state.users.len();
            state.users.retain(|user| user.id != id);
            if state.users.len() == before {
                return Err(DBError::UnknownUser);
            }
            state.products.retain(|product| product.user_id != id);
            Ok(())
        })
    }

    pub fn all_products(&self) -> Result<Vec<TrackedProduct>, DBError> {
        self.refresh()?;
        let products = self.products.read().map_err(poisoned)?;
        Ok(products.clone())
    }

    pub fn products_for(&self, user_id: Uuid) -> Result<Vec<TrackedProduct>, DBError> {
        self.refresh()?;
        let products = self.products.read().map_err(poisoned)?;
        Ok(products
            .iter()
            .filter(|product| product.user_id == user_id)
            .cloned()
            .collect())
    }

    pub fn get_product_by(&self, id: Uuid) -> Result<TrackedProduct, DBError> {
        self.refresh()?;
        let products = self.products.read().map_err(poisoned)?;
        products
            .iter()
            .find(|product| product.id == id)
            .cloned()
            .ok_or(DBError::UnknownProduct)
    }

    pub fn save_product(&self, product: &TrackedProduct) -> Result<(), DBError> {
        self.transact(|state| {
            if !state.users.iter().any(|user| user.id == product.user_id) {
                return Err(DBError::UnknownUser);
            }
            match state.products.iter_mut().find(|stored| stored.id == product.id) {
                Some(stored) => *stored = product.clone(),
                None => state.products.push(product.clone()),
            }
            Ok(())
        })
    }

    pub fn delete_product(&self, id: Uuid) -> Result<(), DBError> {
        self.transact(|state| {
            let before = state.products.len();
            state.products.retain(|product| product.id != id);
            if state.products.len() == before {
                return Err(DBError::UnknownProduct);
            }
            Ok(())
        })
    }

    /// Replaces the cached records with the file contents, if there is a file.
    fn refresh(&self) -> Result<(), DBError> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        if let Some(stored) = FileStructure::load(path)? {
            *self.users.write().map_err(poisoned)? = stored.users;
            *self.products.write().map_err(poisoned)? = stored.products;
        }
        Ok(())
    }

    /// Applies `change` to the freshest state and persists it when it succeeds.
    fn transact<T>(
        &self,
        change: impl FnOnce(&mut FileStructure) -> Result<T, DBError>,
    ) -> Result<T, DBError> {
        let _guard = self.file_lock.lock().map_err(poisoned)?;
        let _file_guard = self.lock_file()?;
        self.refresh()?;
        let mut users = self.users.write().map_err(poisoned)?;
        let mut products = self.products.write().map_err(poisoned)?;
        let mut state = FileStructure {
            users: mem::take(&mut *users),
            products: mem::take(&mut *products),
        };
        let outcome = change(&mut state).and_then(|value| {
            self.write_file(&state)?;
            Ok(value)
        });
        *users = state.users;
        *products = state.products;
        outcome
    }

    /// Exclusive lock shared with other processes using the same file.
    /// Released when the returned handle is dropped.
    fn lock_file(&self) -> Result<Option<File>, DBError> {
        let Some(path) = &self.file_path else {
            return Ok(None);
        };
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path.with_extension("lock"))
            .map_err(InMemoryError::IoError)?;
        lock.lock_exclusive().map_err(InMemoryError::IoError)?;
        Ok(Some(lock))
    }

    fn write_file(&self, state: &FileStructure) -> Result<(), DBError> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        let data = serde_json::to_string_pretty(state).map_err(InMemoryError::SerdeError)?;
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, data).map_err(InMemoryError::IoError)?;
        fs::rename(&tmp_path, path).map_err(InMemoryError::IoError)?;
        Ok(())
    }
}
