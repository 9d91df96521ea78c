use chrono::Utc;
use rand::Rng;
use rusqlite::Connection;
use serde::Serialize;
use tracing::{info, warn};

use crate::database::{
    get_latest_round, get_open_round, get_tickets_by_round, insert_round,
    insert_round_statistics, set_round_draw,
};
use crate::errors::{LottoError, LottoResult};
use crate::generator::draw_winning_numbers;
use crate::statistics::aggregate;
use crate::types::{Draw, RoundRow, RoundState, RoundStatistics};

#[derive(Debug, Clone, Serialize)]
pub struct FinalizedRound {
    pub round: RoundRow,
    pub statistics: RoundStatistics,
}

pub fn round_state(conn: &Connection) -> LottoResult<RoundState> {
    let state = match get_latest_round(conn)? {
        None => RoundState::NoActiveRound,
        Some(latest) if latest.is_open() => RoundState::Open {
            round_number: latest.round_number,
        },
        Some(latest) => match get_open_round(conn)? {
            // an older round can still be open if a newer one was created by hand
            Some(open) => RoundState::Open {
                round_number: open.round_number,
            },
            None => RoundState::Finalized {
                round_number: latest.round_number,
            },
        },
    };
    Ok(state)
}

/// Opens the round after the latest one, or round 1 on an empty database.
pub fn create_next_round(conn: &Connection) -> LottoResult<RoundRow> {
    let tx = conn.unchecked_transaction()?;

    if let Some(open) = get_open_round(&tx)? {
        warn!(round = open.round_number, "refusing to open a second round");
        return Err(LottoError::RoundAlreadyOpen(open.round_number));
    }

    let next_round_number = get_latest_round(&tx)?
        .map(|latest| latest.round_number + 1)
        .unwrap_or(1);

    let round = insert_round(&tx, next_round_number, Utc::now())?;
    tx.commit()?;

    info!(round = round.round_number, "🎟️ round opened for sales");
    Ok(round)
}

pub fn finalize_round<R: Rng + ?Sized>(
    conn: &Connection,
    rng: &mut R,
) -> LottoResult<FinalizedRound> {
    let draw = draw_winning_numbers(rng)?;
    finalize_round_with_draw(conn, draw)
}

/// Draws the open round and stores its statistics in one transaction.
/// Nothing is written when any step fails.
pub fn finalize_round_with_draw(conn: &Connection, draw: Draw) -> LottoResult<FinalizedRound> {
    let tx = conn.unchecked_transaction()?;

    let Some(mut round) = get_open_round(&tx)? else {
        warn!("finalize requested with no open round");
        return Err(LottoError::NoOpenRound);
    };

    let drawn_at = Utc::now();
    if set_round_draw(&tx, round.id, &draw, drawn_at)? == 0 {
        return Err(LottoError::NoOpenRound);
    }
    round.draw = Some(draw);
    round.drawn_at = Some(drawn_at);

    let tickets = get_tickets_by_round(&tx, round.id)?;
    let statistics = aggregate(&tickets, &draw);
    insert_round_statistics(&tx, round.id, &statistics)?;

    tx.commit()?;

    info!(
        round = round.round_number,
        winning = %draw.winning,
        bonus = draw.bonus,
        sales = statistics.total_sales,
        winners = statistics.total_winners,
        "round finalized"
    );
    Ok(FinalizedRound { round, statistics })
}

/// Removes a round. Its tickets stay with no round; its statistics go with it.
pub fn delete_round(conn: &Connection, round_number: i64) -> LottoResult<()> {
    if crate::database::delete_round(conn, round_number)? == 0 {
        return Err(LottoError::RoundNotFound(round_number));
    }
    info!(round = round_number, "round deleted");
    Ok(())
}
