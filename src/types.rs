use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

use crate::errors::{LottoError, LottoResult};

pub const MIN_NUMBER: u8 = 1;
pub const MAX_NUMBER: u8 = 45;
pub const NUMBERS_PER_TICKET: usize = 6;

/// Six distinct numbers in `MIN_NUMBER..=MAX_NUMBER`, kept sorted ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LottoNumbers([u8; NUMBERS_PER_TICKET]);

impl LottoNumbers {
    pub fn try_from_values(values: &[i64]) -> LottoResult<Self> {
        if values.len() != NUMBERS_PER_TICKET {
            return Err(LottoError::WrongCount(values.len()));
        }

        let mut numbers = [0u8; NUMBERS_PER_TICKET];
        let mut seen = HashSet::with_capacity(NUMBERS_PER_TICKET);
        for (slot, &value) in numbers.iter_mut().zip(values) {
            let number = u8::try_from(value)
                .ok()
                .filter(|n| (MIN_NUMBER..=MAX_NUMBER).contains(n))
                .ok_or(LottoError::InvalidNumber(value))?;
            if !seen.insert(number) {
                return Err(LottoError::DuplicateNumber(number));
            }
            *slot = number;
        }

        numbers.sort_unstable();
        Ok(Self(numbers))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn contains(&self, number: u8) -> bool {
        self.0.contains(&number)
    }

    pub fn matches(&self, other: &LottoNumbers) -> usize {
        self.0.iter().filter(|n| other.contains(**n)).count()
    }
}

impl fmt::Display for LottoNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}", joined)
    }
}

/// Winning numbers of a finalized round. The bonus is never one of the six.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Draw {
    pub winning: LottoNumbers,
    pub bonus: u8,
}

impl Draw {
    pub fn new(winning: LottoNumbers, bonus: u8) -> LottoResult<Self> {
        if !(MIN_NUMBER..=MAX_NUMBER).contains(&bonus) {
            return Err(LottoError::InvalidNumber(bonus.into()));
        }
        if winning.contains(bonus) {
            return Err(LottoError::DuplicateNumber(bonus));
        }
        Ok(Self { winning, bonus })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketKind {
    Manual,
    Auto,
}

impl TicketKind {
    pub fn code(&self) -> &'static str {
        match self {
            TicketKind::Manual => "M",
            TicketKind::Auto => "A",
        }
    }
}

impl ToSql for TicketKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for TicketKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "M" => Ok(TicketKind::Manual),
            "A" => Ok(TicketKind::Auto),
            other => Err(FromSqlError::Other(
                format!("unknown ticket kind {:?}", other).into(),
            )),
        }
    }
}

/// Prize tier. `None` means the ticket did not win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    None = 0,
    First = 1,
    Second = 2,
    Third = 3,
    Fourth = 4,
    Fifth = 5,
}

impl Rank {
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn is_winner(self) -> bool {
        self != Rank::None
    }
}

impl Serialize for Rank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.value())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundRow {
    pub id: i64,
    pub round_number: i64,
    pub drawn_at: Option<DateTime<Utc>>,
    pub draw: Option<Draw>,
    pub created_at: DateTime<Utc>,
}

impl RoundRow {
    pub fn is_open(&self) -> bool {
        self.draw.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RoundState {
    NoActiveRound,
    Open { round_number: i64 },
    Finalized { round_number: i64 },
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketRow {
    pub id: i64,
    pub owner: String,
    pub round_id: Option<i64>,
    pub kind: TicketKind,
    pub numbers: LottoNumbers,
    pub purchased_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoundStatistics {
    pub total_sales: i64,
    pub total_winners: i64,
    pub rank1_winners: i64,
    pub rank2_winners: i64,
    pub rank3_winners: i64,
    pub rank4_winners: i64,
    pub rank5_winners: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesPerformanceRow {
    pub round_number: i64,
    pub drawn_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub statistics: RoundStatistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Pending,
    RoundDeleted,
    Drawn { rank: Rank },
}

#[derive(Debug, Clone, Serialize)]
pub struct WinningCheck {
    pub ticket_id: i64,
    pub kind: TicketKind,
    pub numbers: LottoNumbers,
    pub purchased_at: DateTime<Utc>,
    pub round_number: Option<i64>,
    pub draw: Option<Draw>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub latest_round: Option<RoundRow>,
    pub next_round_number: i64,
    pub sales: Vec<SalesPerformanceRow>,
}
