//! Per-thread SQLite connections to a GeoPackage file.
//!
//! [`ConnectionManager`] keeps at most one read-only connection per thread. The slot of a
//! thread is either absent (unopened) or holds the open connection; [`acquire`] opens it on
//! first use and [`release`] closes it again. Nothing is closed implicitly: whoever owns a
//! worker thread calls [`release`] before the thread ends or is handed to another task.
//!
//! Connections are opened through [`SqliteConnectionManager`], the same factory the
//! r2d2 pools of the MBTiles containers use, but they are never pooled or shared.
//!
//! [`acquire`]: ConnectionManager::acquire
//! [`release`]: ConnectionManager::release

use anyhow::{Context, Result};
use dashmap::DashMap;
use parking_lot::Mutex;
use r2d2::ManageConnection;
use r2d2_sqlite::{
	SqliteConnectionManager,
	rusqlite::{Connection, OpenFlags},
};
use std::{
	fmt::{self, Debug},
	path::{Path, PathBuf},
	sync::Arc,
	thread::{self, ThreadId},
};
use tilecache_core::{CacheError, CacheLogger};

/// Handle to the connection of the calling thread.
pub type ConnectionHandle = Arc<Mutex<Connection>>;

pub struct ConnectionManager {
	path: PathBuf,
	factory: SqliteConnectionManager,
	slots: DashMap<ThreadId, ConnectionHandle>,
	log: CacheLogger,
}

impl ConnectionManager {
	#[must_use]
	pub fn new(path: &Path, log: CacheLogger) -> ConnectionManager {
		let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI;
		ConnectionManager {
			path: path.to_path_buf(),
			factory: SqliteConnectionManager::file(path).with_flags(flags),
			slots: DashMap::new(),
			log,
		}
	}

	#[must_use]
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Returns the connection of the calling thread, opening it on first use.
	///
	/// # Errors
	/// Returns [`CacheError::Connection`] if the file cannot be opened.
	pub fn acquire(&self) -> Result<ConnectionHandle> {
		let id = thread::current().id();
		if let Some(handle) = self.slots.get(&id) {
			return Ok(handle.value().clone());
		}

		let handle = Arc::new(Mutex::new(self.open(id)?));
		self.slots.insert(id, handle.clone());
		Ok(handle)
	}

	/// Closes the connection of the calling thread. Does nothing if none is open.
	///
	/// # Errors
	/// Returns [`CacheError::ConnectionInUse`] if a handle to the connection is still held;
	/// the connection then stays registered and `release` can be called again once the
	/// handle is dropped. Returns an error if SQLite refuses to close the connection.
	pub fn release(&self) -> Result<()> {
		let id = thread::current().id();
		let Some((_, handle)) = self.slots.remove(&id) else {
			return Ok(());
		};

		let connection = match Arc::try_unwrap(handle) {
			Ok(connection) => connection,
			Err(handle) => {
				self.slots.insert(id, handle);
				return Err(CacheError::ConnectionInUse { path: self.path.clone() }.into());
			}
		};

		self.log.debug(format_args!("close {:?} for {id:?}", self.path));
		connection
			.into_inner()
			.close()
			.map_err(|(_, err)| err)
			.with_context(|| format!("closing connection to {:?}", self.path))
	}

	/// True if the calling thread holds an open connection.
	#[must_use]
	pub fn is_open(&self) -> bool {
		self.slots.contains_key(&thread::current().id())
	}

	/// Number of threads currently holding an open connection.
	#[must_use]
	pub fn open_connections(&self) -> usize {
		self.slots.len()
	}

	fn open(&self, id: ThreadId) -> Result<Connection> {
		self.log.debug(format_args!("open {:?} for {id:?}", self.path));

		if !self.path.is_file() {
			return Err(CacheError::Connection {
				path: self.path.clone(),
				reason: String::from("file does not exist"),
			}
			.into());
		}

		let connection_error = |reason: String| CacheError::Connection {
			path: self.path.clone(),
			reason,
		};

		let connection = self.factory.connect().map_err(|err| connection_error(err.to_string()))?;

		// SQLite reads the header lazily, so make it look at the file now
		connection
			.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
			.map_err(|err| connection_error(err.to_string()))?;

		Ok(connection)
	}
}

impl Debug for ConnectionManager {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConnectionManager")
			.field("path", &self.path)
			.field("open_connections", &self.slots.len())
			.finish()
	}
}
