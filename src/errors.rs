use thiserror::Error;

use crate::types::{MAX_NUMBER, MIN_NUMBER, NUMBERS_PER_TICKET};

#[derive(Debug, Error)]
pub enum LottoError {
    // ─────────────────────────────
    // Ticket input
    // ─────────────────────────────
    #[error("number {0} is outside {min}..={max}", min = MIN_NUMBER, max = MAX_NUMBER)]
    InvalidNumber(i64),

    #[error("number {0} was picked more than once; pick {count} distinct numbers", count = NUMBERS_PER_TICKET)]
    DuplicateNumber(u8),

    #[error("expected {count} numbers, got {0}", count = NUMBERS_PER_TICKET)]
    WrongCount(usize),

    #[error("missing field {0}")]
    MissingField(String),

    #[error("field {0} is not a whole number")]
    NotANumber(String),

    // ─────────────────────────────
    // Round lifecycle
    // ─────────────────────────────
    #[error("no round is open; create the next round first")]
    NoOpenRound,

    #[error("round {0} is still open; finalize it before creating the next one")]
    RoundAlreadyOpen(i64),

    #[error("round {0} does not exist")]
    RoundNotFound(i64),

    // ─────────────────────────────
    // Access control
    // ─────────────────────────────
    #[error("user {0:?} is not allowed to do that")]
    Unauthorized(String),

    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

pub type LottoResult<T> = std::result::Result<T, LottoError>;
