//! Durable [`StoragePort`] backed by LMDB.
//!
//! One environment per store directory (`<name>.lmdb/`) with a single named
//! database, `slots`, mapping slot key to the JSON text of that slot. Every write
//! is its own committed transaction, so a slot is always either the previous
//! array or the new one.

use std::fs;
use std::path::{Path, PathBuf};

use lmdb::{Cursor, Database, DatabaseFlags, Environment, Transaction, WriteFlags};
use log::{info, warn};

use crate::app_response::AppResponse;
use crate::config::StoreConfig;
use crate::storage_port::StoragePort;

const SLOTS_DB: &str = "slots";

pub struct SlotDb {
    env: Option<Environment>,
    db: Option<Database>,
    path: PathBuf,
    map_size: usize,
    max_dbs: u32,
}

impl SlotDb {
    /// Opens (or creates) `<name>.lmdb` with default sizing.
    pub fn init(name: impl AsRef<str>) -> Result<Self, AppResponse> {
        Self::init_with(name, &StoreConfig::default())
    }

    pub fn init_with(name: impl AsRef<str>, config: &StoreConfig) -> Result<Self, AppResponse> {
        let path = PathBuf::from(format!("{}.lmdb", name.as_ref()));
        let (env, db) = open_env(&path, config.map_size_bytes, config.max_dbs)?;

        Ok(Self {
            env: Some(env),
            db: Some(db),
            path,
            map_size: config.map_size_bytes,
            max_dbs: config.max_dbs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.env.is_some()
    }

    fn handles(&self) -> Result<(&Environment, Database), AppResponse> {
        match (&self.env, self.db) {
            (Some(env), Some(db)) => Ok((env, db)),
            _ => Err(AppResponse::DatabaseError("Slot database is closed".to_string())),
        }
    }

    /// Keys of every populated slot, in LMDB key order.
    pub fn slot_keys(&self) -> Result<Vec<String>, AppResponse> {
        let (env, db) = self.handles()?;
        let txn = env.begin_ro_txn()?;
        let mut keys = Vec::new();
        {
            let mut cursor = txn.open_ro_cursor(db)?;
            for (key, _) in cursor.iter_start() {
                keys.push(String::from_utf8_lossy(key).into_owned());
            }
        }
        txn.commit()?;
        Ok(keys)
    }

    /// Empties every slot but keeps the environment open.
    pub fn clear_all_slots(&self) -> Result<(), AppResponse> {
        let (env, db) = self.handles()?;
        let mut txn = env.begin_rw_txn()?;
        txn.clear_db(db)?;
        txn.commit()?;
        info!("Cleared all slots in {}", self.path.display());
        Ok(())
    }

    /// Closes the environment, deletes `<name>.lmdb` and opens a fresh one there.
    pub fn reset_database(&mut self, name: &str) -> Result<(), AppResponse> {
        self.close_database()?;

        let path = PathBuf::from(format!("{name}.lmdb"));
        if path.exists() {
            fs::remove_dir_all(&path).map_err(|e| {
                AppResponse::DatabaseError(format!("Could not remove {}: {e}", path.display()))
            })?;
        }

        let (env, db) = open_env(&path, self.map_size, self.max_dbs)?;
        self.env = Some(env);
        self.db = Some(db);
        self.path = path;
        info!("Slot database reset at {}", self.path.display());
        Ok(())
    }

    /// Flushes and drops the environment. Later calls fail with `DatabaseError`.
    pub fn close_database(&mut self) -> Result<(), AppResponse> {
        self.db = None;
        if let Some(env) = self.env.take() {
            env.sync(true)?;
            info!("Slot database closed at {}", self.path.display());
        }
        Ok(())
    }
}

fn open_env(path: &Path, map_size: usize, max_dbs: u32) -> Result<(Environment, Database), AppResponse> {
    fs::create_dir_all(path).map_err(|e| {
        AppResponse::DatabaseError(format!("Could not create {}: {e}", path.display()))
    })?;

    let env = Environment::new()
        .set_max_dbs(max_dbs)
        .set_map_size(map_size)
        .open(path)?;
    let db = env.create_db(Some(SLOTS_DB), DatabaseFlags::empty())?;

    info!("Slot database open at {}", path.display());
    Ok((env, db))
}

impl StoragePort for SlotDb {
    fn get(&self, key: &str) -> Result<Option<String>, AppResponse> {
        let (env, db) = self.handles()?;
        let txn = env.begin_ro_txn()?;

        let value = match txn.get(db, &key) {
            Ok(bytes) => Some(String::from_utf8(bytes.to_vec()).map_err(|e| {
                AppResponse::SerializationError(format!("Slot '{key}' is not UTF-8: {e}"))
            })?),
            Err(lmdb::Error::NotFound) => None,
            Err(e) => return Err(e.into()),
        };

        txn.commit()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        let (env, db) = self.handles()?;
        let mut txn = env.begin_rw_txn()?;
        txn.put(db, &key, &value, WriteFlags::empty())?;
        txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppResponse> {
        let (env, db) = self.handles()?;
        let mut txn = env.begin_rw_txn()?;

        match txn.del(db, &key, None) {
            Ok(()) => {}
            Err(lmdb::Error::NotFound) => {
                txn.abort();
                return Ok(());
            }
            Err(e) => {
                warn!("Failed to remove slot '{key}': {e}");
                return Err(e.into());
            }
        }

        txn.commit()?;
        Ok(())
    }
}

impl Drop for SlotDb {
    fn drop(&mut self) {
        if let Err(e) = self.close_database() {
            warn!("Error closing slot database on drop: {e}");
        }
    }
}
