use super::{PersistenceError, PersistenceResult, PlannerStore};
use crate::item::AcademicItem;
use crate::item_validation;
use crate::planner::AcademicPlanner;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::sync::{Mutex, MutexGuard};
use tracing::info;

/// Planner snapshot kept in a SQLite database, one JSON row per item.
pub struct SqlitePlannerStore {
    connection: Mutex<Connection>,
}

impl SqlitePlannerStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS planner_meta (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                owner_name TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS items (
                position INTEGER PRIMARY KEY,
                item_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite connection lock poisoned".into()))
    }

    fn save_owner(tx: &Transaction, owner_name: &str) -> PersistenceResult<()> {
        tx.execute("DELETE FROM planner_meta", [])?;
        tx.execute(
            "INSERT INTO planner_meta (id, owner_name) VALUES (1, ?1)",
            params![owner_name],
        )?;
        Ok(())
    }

    fn save_items(tx: &Transaction, items: &[AcademicItem]) -> PersistenceResult<()> {
        tx.execute("DELETE FROM items", [])?;
        let mut stmt = tx.prepare("INSERT INTO items (position, item_json) VALUES (?1, ?2)")?;
        for (position, item) in items.iter().enumerate() {
            let json = serde_json::to_string(item)?;
            stmt.execute(params![position as i64, json])?;
        }
        Ok(())
    }
}

impl PlannerStore for SqlitePlannerStore {
    fn save_planner(&self, planner: &AcademicPlanner) -> PersistenceResult<()> {
        super::validate_planner(planner)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        Self::save_owner(&tx, planner.owner_name())?;
        Self::save_items(&tx, planner.items())?;
        tx.commit()?;
        info!(items = planner.len(), "saved planner to sqlite");
        Ok(())
    }

    fn load_planner(&self) -> PersistenceResult<Option<AcademicPlanner>> {
        let conn = self.lock()?;

        let owner_name: Option<String> = conn
            .query_row("SELECT owner_name FROM planner_meta WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        let Some(owner_name) = owner_name else {
            return Ok(None);
        };

        let mut stmt = conn.prepare("SELECT item_json FROM items ORDER BY position ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut items = Vec::new();
        for json in rows {
            let item: AcademicItem = serde_json::from_str(&json?)?;
            items.push(item);
        }

        item_validation::validate_items(&items)?;
        Ok(Some(AcademicPlanner::with_items(owner_name, items)))
    }
}
