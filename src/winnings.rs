use rusqlite::Connection;

use crate::database::get_tickets_with_rounds_by_owner;
use crate::errors::LottoResult;
use crate::rank::determine_rank;
use crate::types::{Outcome, WinningCheck};

/// All tickets of `owner`, newest first, each judged against its round's draw.
pub fn check_winnings(conn: &Connection, owner: &str) -> LottoResult<Vec<WinningCheck>> {
    let rows = get_tickets_with_rounds_by_owner(conn, owner)?;

    let checks = rows
        .into_iter()
        .map(|(ticket, round)| {
            let draw = round.as_ref().and_then(|r| r.draw);
            let outcome = match (&round, &draw) {
                (None, _) => Outcome::RoundDeleted,
                (Some(_), None) => Outcome::Pending,
                (Some(_), Some(draw)) => Outcome::Drawn {
                    rank: determine_rank(&ticket.numbers, draw),
                },
            };

            WinningCheck {
                ticket_id: ticket.id,
                kind: ticket.kind,
                numbers: ticket.numbers,
                purchased_at: ticket.purchased_at,
                round_number: round.map(|r| r.round_number),
                draw,
                outcome,
            }
        })
        .collect();

    Ok(checks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::memory_conn;
    use crate::purchase::{ManualPurchaseForm, purchase_manual};
    use crate::rounds::{create_next_round, delete_round, finalize_round_with_draw};
    use crate::types::{Draw, LottoNumbers, Rank};

    #[test]
    fn outcome_follows_round_lifecycle() {
        let conn = memory_conn().unwrap();
        let form = ManualPurchaseForm::new(vec![1, 2, 3, 4, 5, 7]);

        create_next_round(&conn).unwrap();
        purchase_manual(&conn, "alice", &form).unwrap();
        purchase_manual(&conn, "bob", &form).unwrap();

        let pending = check_winnings(&conn, "alice").unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].outcome, Outcome::Pending);
        assert_eq!(pending[0].round_number, Some(1));
        assert!(pending[0].draw.is_none());

        let draw = Draw::new(LottoNumbers::try_from_values(&[1, 2, 3, 4, 5, 6]).unwrap(), 7).unwrap();
        finalize_round_with_draw(&conn, draw).unwrap();

        let drawn = check_winnings(&conn, "alice").unwrap();
        assert_eq!(drawn[0].outcome, Outcome::Drawn { rank: Rank::Second });
        assert_eq!(drawn[0].draw, Some(draw));

        delete_round(&conn, 1).unwrap();
        let deleted = check_winnings(&conn, "alice").unwrap();
        assert_eq!(deleted[0].outcome, Outcome::RoundDeleted);
        assert_eq!(deleted[0].round_number, None);
    }

    #[test]
    fn newest_ticket_comes_first() {
        let conn = memory_conn().unwrap();
        create_next_round(&conn).unwrap();
        let first = purchase_manual(&conn, "alice", &ManualPurchaseForm::new(vec![1, 2, 3, 4, 5, 6])).unwrap();
        let second = purchase_manual(&conn, "alice", &ManualPurchaseForm::new(vec![7, 8, 9, 10, 11, 12])).unwrap();

        let ids: Vec<i64> = check_winnings(&conn, "alice")
            .unwrap()
            .iter()
            .map(|c| c.ticket_id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn unknown_owner_has_no_tickets() {
        let conn = memory_conn().unwrap();
        assert!(check_winnings(&conn, "nobody").unwrap().is_empty());
    }
}
