use rusqlite::Connection;

use crate::database::{get_all_sales_performance, get_latest_round};
use crate::errors::LottoResult;
use crate::rank::determine_rank;
use crate::types::{Dashboard, Draw, Rank, RoundStatistics, TicketRow};

/// Tallies every ticket of a round against its draw.
pub fn aggregate(tickets: &[TicketRow], draw: &Draw) -> RoundStatistics {
    let mut stats = RoundStatistics {
        total_sales: tickets.len() as i64,
        ..RoundStatistics::default()
    };

    for ticket in tickets {
        let rank = determine_rank(&ticket.numbers, draw);
        match rank {
            Rank::First => stats.rank1_winners += 1,
            Rank::Second => stats.rank2_winners += 1,
            Rank::Third => stats.rank3_winners += 1,
            Rank::Fourth => stats.rank4_winners += 1,
            Rank::Fifth => stats.rank5_winners += 1,
            Rank::None => {}
        }
        if rank.is_winner() {
            stats.total_winners += 1;
        }
    }

    stats
}

pub fn dashboard(conn: &Connection) -> LottoResult<Dashboard> {
    let latest_round = get_latest_round(conn)?;
    let next_round_number = latest_round
        .as_ref()
        .map(|round| round.round_number + 1)
        .unwrap_or(1);

    Ok(Dashboard {
        latest_round,
        next_round_number,
        sales: get_all_sales_performance(conn)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LottoNumbers, TicketKind};
    use chrono::Utc;

    fn ticket(id: i64, values: [i64; 6]) -> TicketRow {
        TicketRow {
            id,
            owner: "alice".to_string(),
            round_id: Some(1),
            kind: TicketKind::Manual,
            numbers: LottoNumbers::try_from_values(&values).unwrap(),
            purchased_at: Utc::now(),
        }
    }

    #[test]
    fn counts_each_rank_and_total_winners() {
        let draw = Draw::new(
            LottoNumbers::try_from_values(&[1, 2, 3, 4, 5, 6]).unwrap(),
            7,
        )
        .unwrap();
        let tickets = vec![
            ticket(1, [1, 2, 3, 4, 5, 6]),
            ticket(2, [1, 2, 3, 4, 5, 7]),
            ticket(3, [1, 2, 3, 4, 5, 8]),
            ticket(4, [1, 2, 3, 4, 5, 9]),
            ticket(5, [1, 2, 3, 4, 9, 10]),
            ticket(6, [1, 2, 3, 9, 10, 11]),
            ticket(7, [1, 2, 9, 10, 11, 12]),
            ticket(8, [40, 41, 42, 43, 44, 45]),
        ];

        let stats = aggregate(&tickets, &draw);
        assert_eq!(
            stats,
            RoundStatistics {
                total_sales: 8,
                total_winners: 6,
                rank1_winners: 1,
                rank2_winners: 1,
                rank3_winners: 2,
                rank4_winners: 1,
                rank5_winners: 1,
            }
        );
    }

    #[test]
    fn empty_round_has_zero_everything() {
        let draw = Draw::new(
            LottoNumbers::try_from_values(&[10, 20, 30, 40, 41, 42]).unwrap(),
            1,
        )
        .unwrap();
        assert_eq!(aggregate(&[], &draw), RoundStatistics::default());
    }

    #[test]
    fn dashboard_on_empty_database_points_at_round_one() {
        let conn = crate::connection::memory_conn().unwrap();
        let dashboard = dashboard(&conn).unwrap();
        assert!(dashboard.latest_round.is_none());
        assert_eq!(dashboard.next_round_number, 1);
        assert!(dashboard.sales.is_empty());
    }
}
