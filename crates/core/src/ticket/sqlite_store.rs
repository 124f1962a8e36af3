//! SQLite-backed ticket store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::types::now;
use super::{NewTicket, Ticket, TicketChanges, TicketError, TicketFilter, TicketState, TicketStore};

const SELECT_COLUMNS: &str = "SELECT id, title, description, created_at, updated_at, closed_at FROM ticket";

/// SQLite-backed ticket store.
pub struct SqliteTicketStore {
    conn: Mutex<Connection>,
}

impl SqliteTicketStore {
    /// Create a new SQLite ticket store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, TicketError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite ticket store (useful for testing).
    pub fn in_memory() -> Result<Self, TicketError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), TicketError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS ticket (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;

        // Migration: add closed_at column if it doesn't exist
        let _ = conn.execute("ALTER TABLE ticket ADD COLUMN closed_at TEXT", []);

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_ticket_closed_at ON ticket(closed_at)",
            [],
        )?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, TicketError> {
        self.conn
            .lock()
            .map_err(|_| TicketError::Database("connection mutex poisoned".to_string()))
    }

    fn where_clause(filter: &TicketFilter) -> &'static str {
        match filter.state {
            None => "",
            Some(TicketState::Open) => "WHERE closed_at IS NULL",
            Some(TicketState::Closed) => "WHERE closed_at IS NOT NULL",
        }
    }

    fn row_to_ticket(row: &rusqlite::Row) -> rusqlite::Result<Ticket> {
        let created_at: String = row.get(3)?;
        let updated_at: String = row.get(4)?;
        let closed_at: Option<String> = row.get(5)?;

        Ok(Ticket {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            created_at: parse_timestamp(3, &created_at)?,
            updated_at: parse_timestamp(4, &updated_at)?,
            closed_at: closed_at
                .map(|s| parse_timestamp(5, &s))
                .transpose()?,
        })
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Option<Ticket>, TicketError> {
        let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
        let ticket = conn
            .query_row(&sql, params![id], Self::row_to_ticket)
            .optional()?;
        Ok(ticket)
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_timestamp(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
        })
}

impl TicketStore for SqliteTicketStore {
    fn create(&self, ticket: NewTicket) -> Result<Ticket, TicketError> {
        let conn = self.lock()?;
        let ts = now();

        conn.execute(
            "INSERT INTO ticket (title, description, created_at, updated_at, closed_at) VALUES (?, ?, ?, ?, NULL)",
            params![
                ticket.title,
                ticket.description,
                format_timestamp(&ts),
                format_timestamp(&ts),
            ],
        )?;

        Ok(Ticket {
            id: conn.last_insert_rowid(),
            title: ticket.title,
            description: ticket.description,
            created_at: ts,
            updated_at: ts,
            closed_at: None,
        })
    }

    fn get(&self, id: i64) -> Result<Option<Ticket>, TicketError> {
        let conn = self.lock()?;
        Self::fetch(&conn, id)
    }

    fn update(&self, id: i64, changes: TicketChanges) -> Result<Ticket, TicketError> {
        let conn = self.lock()?;

        let current = Self::fetch(&conn, id)?.ok_or_else(|| TicketError::NotFound(id.to_string()))?;

        let updated = Ticket {
            title: changes.title.unwrap_or(current.title),
            description: changes.description.unwrap_or(current.description),
            closed_at: changes.closed_at.or(current.closed_at),
            updated_at: now(),
            ..current
        };

        conn.execute(
            "UPDATE ticket SET title = ?, description = ?, updated_at = ?, closed_at = ? WHERE id = ?",
            params![
                updated.title,
                updated.description,
                format_timestamp(&updated.updated_at),
                updated.closed_at.as_ref().map(format_timestamp),
                id,
            ],
        )?;

        Ok(updated)
    }

    fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketError> {
        let conn = self.lock()?;

        let sql = format!(
            "{} {} ORDER BY id ASC LIMIT ? OFFSET ?",
            SELECT_COLUMNS,
            Self::where_clause(filter)
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![filter.limit, filter.offset], Self::row_to_ticket)?;

        let mut tickets = Vec::new();
        for row_result in rows {
            tickets.push(row_result?);
        }

        Ok(tickets)
    }

    fn count(&self, filter: &TicketFilter) -> Result<i64, TicketError> {
        let conn = self.lock()?;

        let sql = format!("SELECT COUNT(*) FROM ticket {}", Self::where_clause(filter));
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteTicketStore {
        SqliteTicketStore::in_memory().unwrap()
    }

    fn create_test_ticket(n: usize) -> NewTicket {
        NewTicket {
            title: format!("Ticket {}", n),
            description: format!("Description for ticket {}", n),
        }
    }

    #[test]
    fn test_create_ticket() {
        let store = create_test_store();
        let ticket = store.create(create_test_ticket(1)).unwrap();

        assert!(ticket.id > 0);
        assert_eq!(ticket.title, "Ticket 1");
        assert_eq!(ticket.description, "Description for ticket 1");
        assert_eq!(ticket.created_at, ticket.updated_at);
        assert!(ticket.closed_at.is_none());
        assert_eq!(ticket.state(), TicketState::Open);
    }

    #[test]
    fn test_ids_increase_in_insertion_order() {
        let store = create_test_store();
        let first = store.create(create_test_ticket(1)).unwrap();
        let second = store.create(create_test_ticket(2)).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_get_ticket_round_trips() {
        let store = create_test_store();
        let created = store.create(create_test_ticket(1)).unwrap();

        let fetched = store.get(created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_get_nonexistent_ticket() {
        let store = create_test_store();
        assert!(store.get(42).unwrap().is_none());
    }

    #[test]
    fn test_update_title_keeps_description() {
        let store = create_test_store();
        let ticket = store.create(create_test_ticket(1)).unwrap();

        let updated = store
            .update(
                ticket.id,
                TicketChanges {
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.id, ticket.id);
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.description, ticket.description);
        assert_eq!(updated.created_at, ticket.created_at);

        let fetched = store.get(ticket.id).unwrap().unwrap();
        assert_eq!(fetched, updated);
    }

    #[test]
    fn test_update_sets_closed_at() {
        let store = create_test_store();
        let ticket = store.create(create_test_ticket(1)).unwrap();
        let closed_at = now();

        let updated = store
            .update(
                ticket.id,
                TicketChanges {
                    closed_at: Some(closed_at),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.closed_at, Some(closed_at));
        let fetched = store.get(ticket.id).unwrap().unwrap();
        assert_eq!(fetched.closed_at, Some(closed_at));
        assert_eq!(fetched.state(), TicketState::Closed);
    }

    #[test]
    fn test_update_without_closed_at_keeps_it() {
        let store = create_test_store();
        let ticket = store.create(create_test_ticket(1)).unwrap();
        let closed_at = now();
        store
            .update(
                ticket.id,
                TicketChanges {
                    closed_at: Some(closed_at),
                    ..Default::default()
                },
            )
            .unwrap();

        let updated = store
            .update(
                ticket.id,
                TicketChanges {
                    description: Some("More detail".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.closed_at, Some(closed_at));
    }

    #[test]
    fn test_update_nonexistent_ticket() {
        let store = create_test_store();
        let result = store.update(7, TicketChanges::default());
        assert!(matches!(result, Err(TicketError::NotFound(id)) if id == "7"));
    }

    #[test]
    fn test_list_pagination_in_insertion_order() {
        let store = create_test_store();
        for i in 1..=5 {
            store.create(create_test_ticket(i)).unwrap();
        }

        let page = store
            .list(&TicketFilter::new().with_limit(2).with_offset(0))
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].title, "Ticket 1");
        assert_eq!(page[1].title, "Ticket 2");

        let page = store
            .list(&TicketFilter::new().with_limit(2).with_offset(4))
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "Ticket 5");

        let page = store
            .list(&TicketFilter::new().with_limit(2).with_offset(10))
            .unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_list_and_count_by_state() {
        let store = create_test_store();
        store.create(create_test_ticket(1)).unwrap();
        let closed = store.create(create_test_ticket(2)).unwrap();
        store
            .update(
                closed.id,
                TicketChanges {
                    closed_at: Some(now()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(store.count(&TicketFilter::new()).unwrap(), 2);
        assert_eq!(
            store
                .count(&TicketFilter::new().with_state(TicketState::Open))
                .unwrap(),
            1
        );

        let closed_list = store
            .list(&TicketFilter::new().with_state(TicketState::Closed))
            .unwrap();
        assert_eq!(closed_list.len(), 1);
        assert_eq!(closed_list[0].id, closed.id);
    }

    #[test]
    fn test_count_empty_store() {
        let store = create_test_store();
        assert_eq!(store.count(&TicketFilter::new()).unwrap(), 0);
    }

    #[test]
    fn test_file_based_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("tickets.db");

        let id = {
            let store = SqliteTicketStore::new(&db_path).unwrap();
            store.create(create_test_ticket(1)).unwrap().id
        };

        assert!(db_path.exists());

        // Reopening runs the schema setup again against existing tables
        let store = SqliteTicketStore::new(&db_path).unwrap();
        let fetched = store.get(id).unwrap();
        assert!(fetched.is_some());
    }
}
