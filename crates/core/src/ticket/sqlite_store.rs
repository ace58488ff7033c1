//! SQLite-backed ticket store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use tracing::debug;

use super::{
    validate_draft, Ticket, TicketDraft, TicketError, TicketFilter, TicketPatch, TicketStatus,
    TicketStore,
};

const SELECT_COLUMNS: &str =
    "SELECT id, title, description, created_by, priority, status, created_at, updated_at FROM tickets";

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
            CREATE TABLE IF NOT EXISTS tickets (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                created_by TEXT NOT NULL,
                priority TEXT NOT NULL DEFAULT 'Low',
                status TEXT NOT NULL DEFAULT 'Open',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
            CREATE INDEX IF NOT EXISTS idx_tickets_priority ON tickets(priority);
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, TicketError> {
        self.conn
            .lock()
            .map_err(|_| TicketError::Database("connection mutex poisoned".to_string()))
    }

    fn build_where_clause(filter: &TicketFilter) -> (String, Vec<&'static str>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(status) = filter.status {
            conditions.push("status = ?");
            params.push(status.as_str());
        }

        if let Some(priority) = filter.priority {
            conditions.push("priority = ?");
            params.push(priority.as_str());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    fn row_to_ticket(row: &rusqlite::Row) -> rusqlite::Result<Ticket> {
        let priority_str: String = row.get(4)?;
        let status_str: String = row.get(5)?;
        let created_at_str: String = row.get(6)?;
        let updated_at_str: String = row.get(7)?;

        let priority = priority_str
            .parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
        let status = status_str
            .parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

        // Timestamps are always written as RFC 3339 by this store
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());
        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(created_at);

        Ok(Ticket {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            created_by: row.get(3)?,
            priority,
            status,
            created_at,
            updated_at,
        })
    }

    fn fetch(conn: &Connection, id: &str) -> Result<Option<Ticket>, TicketError> {
        let result = conn.query_row(
            &format!("{} WHERE id = ?", SELECT_COLUMNS),
            params![id],
            Self::row_to_ticket,
        );

        match result {
            Ok(ticket) => Ok(Some(ticket)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl TicketStore for SqliteTicketStore {
    fn create(&self, draft: TicketDraft) -> Result<Ticket, TicketError> {
        validate_draft(&draft)?;

        let conn = self.conn()?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let status = TicketStatus::Open;

        conn.execute(
            "INSERT INTO tickets (id, title, description, created_by, priority, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                draft.title,
                draft.description,
                draft.created_by,
                draft.priority.as_str(),
                status.as_str(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;

        debug!(ticket_id = %id, "Inserted ticket");

        Ok(Ticket {
            id,
            title: draft.title,
            description: draft.description,
            created_by: draft.created_by,
            priority: draft.priority,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError> {
        let conn = self.conn()?;
        Self::fetch(&conn, id)
    }

    fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketError> {
        let conn = self.conn()?;

        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!("{} {} ORDER BY rowid ASC", SELECT_COLUMNS, where_clause);

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params), Self::row_to_ticket)?;

        let mut tickets = Vec::new();
        for row_result in rows {
            tickets.push(row_result?);
        }

        Ok(tickets)
    }

    fn count(&self, filter: &TicketFilter) -> Result<i64, TicketError> {
        let conn = self.conn()?;

        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM tickets {}", where_clause);

        let count: i64 =
            conn.query_row(&sql, rusqlite::params_from_iter(params), |row| row.get(0))?;

        Ok(count)
    }

    fn update(&self, id: &str, patch: TicketPatch) -> Result<Ticket, TicketError> {
        if patch.is_empty() {
            return Err(TicketError::Validation(
                "update must set priority or status".to_string(),
            ));
        }

        let conn = self.conn()?;

        let current = Self::fetch(&conn, id)?.ok_or_else(|| TicketError::NotFound(id.to_string()))?;

        let priority = patch.priority.unwrap_or(current.priority);
        let status = patch.status.unwrap_or(current.status);
        let now = Utc::now();

        conn.execute(
            "UPDATE tickets SET priority = ?, status = ?, updated_at = ? WHERE id = ?",
            params![priority.as_str(), status.as_str(), now.to_rfc3339(), id],
        )?;

        Ok(Ticket {
            priority,
            status,
            updated_at: now,
            ..current
        })
    }

    fn delete(&self, id: &str) -> Result<Ticket, TicketError> {
        let conn = self.conn()?;

        // Fetch first so the caller gets the removed ticket back
        let ticket = Self::fetch(&conn, id)?.ok_or_else(|| TicketError::NotFound(id.to_string()))?;

        conn.execute("DELETE FROM tickets WHERE id = ?", params![id])?;

        Ok(ticket)
    }
}
