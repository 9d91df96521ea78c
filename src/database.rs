use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Result, Row};

use crate::errors::LottoError;
use crate::types::{
    Draw, LottoNumbers, RoundRow, RoundStatistics, SalesPerformanceRow, TicketKind, TicketRow,
};

const ROUND_COLUMNS: &str = "r.id, r.round_number, r.drawn_at, r.num1, r.num2, r.num3, r.num4, \
     r.num5, r.num6, r.bonus_number, r.created_at";

const TICKET_COLUMNS: &str = "t.id, t.owner, t.round_id, t.kind, t.num1, t.num2, t.num3, t.num4, \
     t.num5, t.num6, t.purchased_at";
const TICKET_COLUMN_COUNT: usize = 11;

const STATISTICS_COLUMNS: &str = "s.total_sales, s.total_winners, s.rank1_winners, \
     s.rank2_winners, s.rank3_winners, s.rank4_winners, s.rank5_winners";

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS rounds (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            round_number INTEGER NOT NULL UNIQUE,
            drawn_at TEXT,
            num1 INTEGER,
            num2 INTEGER,
            num3 INTEGER,
            num4 INTEGER,
            num5 INTEGER,
            num6 INTEGER,
            bonus_number INTEGER,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tickets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner TEXT NOT NULL,
            round_id INTEGER REFERENCES rounds (id) ON DELETE SET NULL,
            kind TEXT NOT NULL CHECK (kind IN ('M', 'A')),
            num1 INTEGER NOT NULL,
            num2 INTEGER NOT NULL,
            num3 INTEGER NOT NULL,
            num4 INTEGER NOT NULL,
            num5 INTEGER NOT NULL,
            num6 INTEGER NOT NULL,
            purchased_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tickets_owner ON tickets (owner);
        CREATE INDEX IF NOT EXISTS idx_tickets_round ON tickets (round_id);

        CREATE TABLE IF NOT EXISTS round_statistics (
            round_id INTEGER PRIMARY KEY REFERENCES rounds (id) ON DELETE CASCADE,
            total_sales INTEGER NOT NULL DEFAULT 0,
            total_winners INTEGER NOT NULL DEFAULT 0,
            rank1_winners INTEGER NOT NULL DEFAULT 0,
            rank2_winners INTEGER NOT NULL DEFAULT 0,
            rank3_winners INTEGER NOT NULL DEFAULT 0,
            rank4_winners INTEGER NOT NULL DEFAULT 0,
            rank5_winners INTEGER NOT NULL DEFAULT 0
        );",
    )
}

fn conversion_error(index: usize, e: LottoError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(e))
}

fn numbers_from_row(row: &Row, offset: usize) -> Result<LottoNumbers> {
    let mut values = Vec::with_capacity(6);
    for i in offset..offset + 6 {
        values.push(row.get::<_, i64>(i)?);
    }
    LottoNumbers::try_from_values(&values).map_err(|e| conversion_error(offset, e))
}

fn round_from_row(row: &Row, offset: usize) -> Result<RoundRow> {
    let first: Option<i64> = row.get(offset + 3)?;
    let draw = match first {
        Some(_) => {
            let winning = numbers_from_row(row, offset + 3)?;
            let bonus: i64 = row.get(offset + 9)?;
            let bonus = u8::try_from(bonus)
                .map_err(|_| conversion_error(offset + 9, LottoError::InvalidNumber(bonus)))?;
            Some(Draw::new(winning, bonus).map_err(|e| conversion_error(offset + 9, e))?)
        }
        None => None,
    };

    Ok(RoundRow {
        id: row.get(offset)?,
        round_number: row.get(offset + 1)?,
        drawn_at: row.get(offset + 2)?,
        draw,
        created_at: row.get(offset + 10)?,
    })
}

fn ticket_from_row(row: &Row, offset: usize) -> Result<TicketRow> {
    Ok(TicketRow {
        id: row.get(offset)?,
        owner: row.get(offset + 1)?,
        round_id: row.get(offset + 2)?,
        kind: row.get(offset + 3)?,
        numbers: numbers_from_row(row, offset + 4)?,
        purchased_at: row.get(offset + 10)?,
    })
}

fn statistics_from_row(row: &Row, offset: usize) -> Result<RoundStatistics> {
    Ok(RoundStatistics {
        total_sales: row.get(offset)?,
        total_winners: row.get(offset + 1)?,
        rank1_winners: row.get(offset + 2)?,
        rank2_winners: row.get(offset + 3)?,
        rank3_winners: row.get(offset + 4)?,
        rank4_winners: row.get(offset + 5)?,
        rank5_winners: row.get(offset + 6)?,
    })
}

// ─────────────────────────────
// Rounds
// ─────────────────────────────

pub fn insert_round(
    conn: &Connection,
    round_number: i64,
    created_at: DateTime<Utc>,
) -> Result<RoundRow> {
    conn.execute(
        "INSERT INTO rounds (round_number, created_at) VALUES (?1, ?2)",
        (round_number, created_at),
    )?;

    Ok(RoundRow {
        id: conn.last_insert_rowid(),
        round_number,
        drawn_at: None,
        draw: None,
        created_at,
    })
}

pub fn get_latest_round(conn: &Connection) -> Result<Option<RoundRow>> {
    let query = format!(
        "SELECT {} FROM rounds r ORDER BY r.round_number DESC LIMIT 1",
        ROUND_COLUMNS
    );
    conn.query_row(&query, [], |row| round_from_row(row, 0))
        .optional()
}

/// Highest-numbered round that has not been drawn yet.
pub fn get_open_round(conn: &Connection) -> Result<Option<RoundRow>> {
    let query = format!(
        "SELECT {} FROM rounds r WHERE r.num1 IS NULL ORDER BY r.round_number DESC LIMIT 1",
        ROUND_COLUMNS
    );
    conn.query_row(&query, [], |row| round_from_row(row, 0))
        .optional()
}

pub fn get_round_by_number(conn: &Connection, round_number: i64) -> Result<Option<RoundRow>> {
    let query = format!(
        "SELECT {} FROM rounds r WHERE r.round_number = ?1",
        ROUND_COLUMNS
    );
    conn.query_row(&query, [round_number], |row| round_from_row(row, 0))
        .optional()
}

/// Writes the draw onto a round that has none yet. Returns the number of rows
/// changed, so 0 means the round was missing or already drawn.
pub fn set_round_draw(
    conn: &Connection,
    round_id: i64,
    draw: &Draw,
    drawn_at: DateTime<Utc>,
) -> Result<usize> {
    let n = draw.winning.as_slice();
    conn.execute(
        "UPDATE rounds
         SET num1 = ?1, num2 = ?2, num3 = ?3, num4 = ?4, num5 = ?5, num6 = ?6,
             bonus_number = ?7, drawn_at = ?8
         WHERE id = ?9 AND num1 IS NULL",
        rusqlite::params![n[0], n[1], n[2], n[3], n[4], n[5], draw.bonus, drawn_at, round_id],
    )
}

pub fn delete_round(conn: &Connection, round_number: i64) -> Result<usize> {
    conn.execute("DELETE FROM rounds WHERE round_number = ?1", [round_number])
}

// ─────────────────────────────
// Tickets
// ─────────────────────────────

pub fn insert_ticket(
    conn: &Connection,
    owner: &str,
    round_id: i64,
    kind: TicketKind,
    numbers: &LottoNumbers,
    purchased_at: DateTime<Utc>,
) -> Result<TicketRow> {
    let n = numbers.as_slice();
    conn.execute(
        "INSERT INTO tickets (
            owner, round_id, kind, num1, num2, num3, num4, num5, num6, purchased_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rusqlite::params![owner, round_id, kind, n[0], n[1], n[2], n[3], n[4], n[5], purchased_at],
    )?;

    Ok(TicketRow {
        id: conn.last_insert_rowid(),
        owner: owner.to_string(),
        round_id: Some(round_id),
        kind,
        numbers: *numbers,
        purchased_at,
    })
}

pub fn get_tickets_by_round(conn: &Connection, round_id: i64) -> Result<Vec<TicketRow>> {
    let query = format!(
        "SELECT {} FROM tickets t WHERE t.round_id = ?1 ORDER BY t.id",
        TICKET_COLUMNS
    );
    let mut stmt = conn.prepare(&query)?;
    let ticket_iter = stmt.query_map([round_id], |row| ticket_from_row(row, 0))?;

    let mut tickets = Vec::new();
    for ticket in ticket_iter {
        tickets.push(ticket?);
    }
    Ok(tickets)
}

/// Every ticket of an owner, newest first, alongside its round when the round still exists.
pub fn get_tickets_with_rounds_by_owner(
    conn: &Connection,
    owner: &str,
) -> Result<Vec<(TicketRow, Option<RoundRow>)>> {
    let query = format!(
        "SELECT {}, {}
         FROM tickets t
         LEFT JOIN rounds r ON t.round_id = r.id
         WHERE t.owner = ?1
         ORDER BY t.purchased_at DESC, t.id DESC",
        TICKET_COLUMNS, ROUND_COLUMNS
    );
    let mut stmt = conn.prepare(&query)?;
    let result_iter = stmt.query_map([owner], |row| {
        let ticket = ticket_from_row(row, 0)?;
        let round_id: Option<i64> = row.get(TICKET_COLUMN_COUNT)?;
        let round = match round_id {
            Some(_) => Some(round_from_row(row, TICKET_COLUMN_COUNT)?),
            None => None,
        };
        Ok((ticket, round))
    })?;

    let mut results = Vec::new();
    for result in result_iter {
        results.push(result?);
    }
    Ok(results)
}

pub fn count_tickets(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM tickets", [], |row| row.get(0))
}

// ─────────────────────────────
// Statistics
// ─────────────────────────────

pub fn insert_round_statistics(
    conn: &Connection,
    round_id: i64,
    stats: &RoundStatistics,
) -> Result<()> {
    conn.execute(
        "INSERT INTO round_statistics (
            round_id, total_sales, total_winners,
            rank1_winners, rank2_winners, rank3_winners, rank4_winners, rank5_winners
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            round_id,
            stats.total_sales,
            stats.total_winners,
            stats.rank1_winners,
            stats.rank2_winners,
            stats.rank3_winners,
            stats.rank4_winners,
            stats.rank5_winners,
        ],
    )?;
    Ok(())
}

pub fn get_round_statistics(conn: &Connection, round_id: i64) -> Result<Option<RoundStatistics>> {
    let query = format!(
        "SELECT {} FROM round_statistics s WHERE s.round_id = ?1",
        STATISTICS_COLUMNS
    );
    conn.query_row(&query, [round_id], |row| statistics_from_row(row, 0))
        .optional()
}

pub fn get_all_sales_performance(conn: &Connection) -> Result<Vec<SalesPerformanceRow>> {
    let query = format!(
        "SELECT r.round_number, r.drawn_at, {}
         FROM round_statistics s
         JOIN rounds r ON s.round_id = r.id
         ORDER BY r.round_number DESC",
        STATISTICS_COLUMNS
    );
    let mut stmt = conn.prepare(&query)?;
    let sales_iter = stmt.query_map([], |row| {
        Ok(SalesPerformanceRow {
            round_number: row.get(0)?,
            drawn_at: row.get(1)?,
            statistics: statistics_from_row(row, 2)?,
        })
    })?;

    let mut results = Vec::new();
    for sales in sales_iter {
        results.push(sales?);
    }
    Ok(results)
}
