//! Blinds controller: the routes the device actually serves.
//!
//! State lives in the persistent store so it survives restarts:
//!
//! | addr | type   | meaning                              |
//! |------|--------|--------------------------------------|
//! | 0    | i32    | position, 0 closed / 1 open          |
//! | 4    | i32    | daily opening time, minutes past 0:00|
//! | 8    | i64    | last clock sync, Unix seconds        |
//! | 16   | string | last command served (max 32 bytes)   |

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use crate::device::store::{ByteStore, StoreError, StoreExt};
use crate::http::registry::{HandlerRegistry, RegistryError};
use crate::http::request::query_param;

pub const POSITION_ADDR: usize = 0;
pub const OPEN_AT_ADDR: usize = 4;
pub const SYNCED_AT_ADDR: usize = 8;
pub const LAST_COMMAND_ADDR: usize = 16;
pub const LAST_COMMAND_MAX: usize = 32;

/// Minimum store size for the layout above.
pub const STORE_SIZE: usize = LAST_COMMAND_ADDR + 2 + LAST_COMMAND_MAX;

const MINUTES_PER_DAY: i32 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Closed,
    Open,
}

impl Position {
    fn as_i32(self) -> i32 {
        match self {
            Position::Closed => 0,
            Position::Open => 1,
        }
    }
}

/// Shared handle to the controller state. Cloned into each route handler.
///
/// Handlers are synchronous, so store writes run on the calling tokio
/// worker. With a [`FileStore`](crate::device::FileStore) each value is one
/// positioned write plus `sync_data`; `/open` and `/close` do two of those
/// while holding the lock.
pub struct Blinds<S> {
    store: Arc<Mutex<S>>,
}

impl<S> Clone for Blinds<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> Blinds<S>
where
    S: ByteStore + Send + 'static,
{
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    pub fn position(&self) -> Result<Option<Position>, StoreError> {
        Ok(match self.store.lock().read_i32(POSITION_ADDR)? {
            0 => Some(Position::Closed),
            1 => Some(Position::Open),
            _ => None,
        })
    }

    pub fn set_position(&self, position: Position) -> Result<(), StoreError> {
        let mut store = self.store.lock();
        store.write_i32(POSITION_ADDR, position.as_i32())?;
        let command = match position {
            Position::Closed => "close",
            Position::Open => "open",
        };
        store.write_string(LAST_COMMAND_ADDR, command)
    }

    /// Daily opening time in minutes past midnight, if one was scheduled.
    pub fn open_at(&self) -> Result<Option<i32>, StoreError> {
        let minutes = self.store.lock().read_i32(OPEN_AT_ADDR)?;
        Ok((0..MINUTES_PER_DAY).contains(&minutes).then_some(minutes))
    }

    pub fn schedule_open(&self, minutes: i32) -> Result<bool, StoreError> {
        if !(0..MINUTES_PER_DAY).contains(&minutes) {
            return Ok(false);
        }
        let mut store = self.store.lock();
        store.write_i32(OPEN_AT_ADDR, minutes)?;
        store.write_string(LAST_COMMAND_ADDR, "schedule")?;
        Ok(true)
    }

    pub fn record_sync(&self, time: SystemTime) -> Result<(), StoreError> {
        let seconds = time
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        self.store.lock().write_i64(SYNCED_AT_ADDR, seconds)
    }

    pub fn synced_at(&self) -> Result<i64, StoreError> {
        self.store.lock().read_i64(SYNCED_AT_ADDR)
    }

    pub fn last_command(&self) -> Result<String, StoreError> {
        self.store.lock().read_string(LAST_COMMAND_ADDR, LAST_COMMAND_MAX)
    }

    /// Registers `/open`, `/close` and `/schedule`.
    pub fn register_routes(&self, registry: &mut HandlerRegistry) -> Result<(), RegistryError> {
        let blinds = self.clone();
        registry.register("/open", move |_: &str| {
            report("/open", blinds.set_position(Position::Open))
        })?;

        let blinds = self.clone();
        registry.register("/close", move |_: &str| {
            report("/close", blinds.set_position(Position::Closed))
        })?;

        let blinds = self.clone();
        registry.register("/schedule", move |params: &str| {
            let Some(minutes) = query_param(params, "open_at").and_then(|v| v.parse::<i32>().ok())
            else {
                tracing::debug!(params, "missing or invalid open_at");
                return false;
            };
            blinds.schedule_open(minutes).unwrap_or_else(|e| {
                tracing::error!(error = %e, "store write failed");
                false
            })
        })?;

        Ok(())
    }
}

fn report(route: &str, result: Result<(), StoreError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(route, error = %e, "store write failed");
            false
        }
    }
}
