//! SQLite trend state store.

use crate::domain::error::TrendwatchError;
use crate::domain::trend::{HistoryKind, TrendHistoryEvent, TrendState};
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::TrendStateStore;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, params};
use tracing::info;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS current_trend (
        symbol TEXT PRIMARY KEY NOT NULL,
        up_trend INTEGER NOT NULL,
        down_trend INTEGER NOT NULL,
        heavy_volume_reversal INTEGER NOT NULL DEFAULT 0,
        trend_start_date TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS trend_history (
        symbol TEXT NOT NULL,
        occurrence_date TEXT NOT NULL,
        trend_type TEXT NOT NULL,
        PRIMARY KEY (symbol, occurrence_date)
    );";

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

fn query_err(e: rusqlite::Error) -> TrendwatchError {
    TrendwatchError::store(e)
}

fn parse_date(s: &str) -> Result<NaiveDate, TrendwatchError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| TrendwatchError::store(format!("bad date '{s}' in store: {e}")))
}

impl SqliteStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TrendwatchError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| TrendwatchError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4).max(1) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| TrendwatchError::store(e))?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, TrendwatchError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| TrendwatchError::store(e))?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, TrendwatchError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| TrendwatchError::store(e))
    }

    pub fn initialize_schema(&self) -> Result<(), TrendwatchError> {
        self.conn()?.execute_batch(SCHEMA).map_err(query_err)
    }

    /// Drop both tables and recreate them empty.
    pub fn reset(&self) -> Result<(), TrendwatchError> {
        self.conn()?
            .execute_batch(
                "DROP TABLE IF EXISTS current_trend;
                 DROP TABLE IF EXISTS trend_history;",
            )
            .map_err(query_err)?;
        info!("dropped trend tables");
        self.initialize_schema()
    }
}

impl TrendStateStore for SqliteStore {
    fn get_state(&self, symbol: &str) -> Result<Option<TrendState>, TrendwatchError> {
        let conn = self.conn()?;
        let row: Option<(bool, bool, bool, String)> = conn
            .query_row(
                "SELECT up_trend, down_trend, heavy_volume_reversal, trend_start_date
                 FROM current_trend WHERE symbol = ?1",
                params![symbol],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()
            .map_err(query_err)?;

        match row {
            None => Ok(None),
            Some((up_trend, down_trend, heavy_volume_reversal, start)) => Ok(Some(TrendState {
                symbol: symbol.to_string(),
                up_trend,
                down_trend,
                heavy_volume_reversal,
                trend_start_date: parse_date(&start)?,
            })),
        }
    }

    fn put_state(&self, state: &TrendState) -> Result<(), TrendwatchError> {
        self.conn()?
            .execute(
                "INSERT OR REPLACE INTO current_trend
                 (symbol, up_trend, down_trend, heavy_volume_reversal, trend_start_date)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    state.symbol,
                    state.up_trend,
                    state.down_trend,
                    state.heavy_volume_reversal,
                    state.trend_start_date.format("%Y-%m-%d").to_string(),
                ],
            )
            .map_err(query_err)?;
        Ok(())
    }

    fn append_history(&self, event: &TrendHistoryEvent) -> Result<(), TrendwatchError> {
        self.conn()?
            .execute(
                "INSERT OR REPLACE INTO trend_history (symbol, occurrence_date, trend_type)
                 VALUES (?1, ?2, ?3)",
                params![
                    event.symbol,
                    event.occurrence_date.format("%Y-%m-%d").to_string(),
                    event.trend_type.as_str(),
                ],
            )
            .map_err(query_err)?;
        Ok(())
    }

    fn list_history(&self, symbol: &str) -> Result<Vec<TrendHistoryEvent>, TrendwatchError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT occurrence_date, trend_type FROM trend_history
                 WHERE symbol = ?1 ORDER BY occurrence_date ASC",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(params![symbol], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(query_err)?;

        let mut events = Vec::new();
        for row in rows {
            let (date, kind) = row.map_err(query_err)?;
            events.push(TrendHistoryEvent {
                symbol: symbol.to_string(),
                occurrence_date: parse_date(&date)?,
                trend_type: kind
                    .parse::<HistoryKind>()
                    .map_err(TrendwatchError::store)?,
            });
        }

        Ok(events)
    }
}
