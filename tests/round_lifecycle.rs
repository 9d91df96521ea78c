use lotto_lib::connection::memory_conn;
use lotto_lib::database::{count_tickets, get_round_statistics};
use lotto_lib::{
    Draw, LottoError, LottoNumbers, ManualPurchaseForm, Outcome, Rank, RoundState,
    RoundStatistics, check_winnings, create_next_round, dashboard, determine_rank, finalize_round,
    finalize_round_with_draw, purchase_auto, purchase_manual, round_state,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn numbers(values: [i64; 6]) -> LottoNumbers {
    LottoNumbers::try_from_values(&values).unwrap()
}

#[test]
fn stored_statistics_match_per_ticket_ranks() {
    let conn = memory_conn().unwrap();
    let mut rng = StdRng::seed_from_u64(99);

    let round = create_next_round(&conn).unwrap();
    for _ in 0..200 {
        purchase_auto(&conn, "bulk", &mut rng).unwrap();
    }
    purchase_manual(&conn, "alice", &ManualPurchaseForm::new(vec![1, 2, 3, 4, 5, 6])).unwrap();

    let finalized = finalize_round(&conn, &mut rng).unwrap();
    let draw = finalized.round.draw.unwrap();
    assert!(!draw.winning.contains(draw.bonus));

    let mut expected = RoundStatistics {
        total_sales: 201,
        ..RoundStatistics::default()
    };
    for owner in ["bulk", "alice"] {
        for check in check_winnings(&conn, owner).unwrap() {
            let Outcome::Drawn { rank } = check.outcome else {
                panic!("ticket {} not drawn", check.ticket_id);
            };
            assert_eq!(rank, determine_rank(&check.numbers, &draw));
            match rank {
                Rank::First => expected.rank1_winners += 1,
                Rank::Second => expected.rank2_winners += 1,
                Rank::Third => expected.rank3_winners += 1,
                Rank::Fourth => expected.rank4_winners += 1,
                Rank::Fifth => expected.rank5_winners += 1,
                Rank::None => {}
            }
            if rank.is_winner() {
                expected.total_winners += 1;
            }
        }
    }

    assert_eq!(finalized.statistics, expected);
    assert_eq!(get_round_statistics(&conn, round.id).unwrap(), Some(expected));
}

#[test]
fn rounds_number_sequentially_across_the_lifecycle() {
    let conn = memory_conn().unwrap();
    let mut rng = StdRng::seed_from_u64(5);

    for expected in 1..=5 {
        assert_eq!(create_next_round(&conn).unwrap().round_number, expected);
        finalize_round(&conn, &mut rng).unwrap();
    }

    let dashboard = dashboard(&conn).unwrap();
    assert_eq!(dashboard.next_round_number, 6);
    let listed: Vec<i64> = dashboard.sales.iter().map(|s| s.round_number).collect();
    assert_eq!(listed, vec![5, 4, 3, 2, 1]);
    assert_eq!(round_state(&conn).unwrap(), RoundState::Finalized { round_number: 5 });
}

#[test]
fn closed_round_takes_no_more_tickets() {
    let conn = memory_conn().unwrap();
    create_next_round(&conn).unwrap();
    let draw = Draw::new(numbers([8, 13, 21, 34, 40, 45]), 2).unwrap();
    finalize_round_with_draw(&conn, draw).unwrap();

    let result = purchase_manual(&conn, "alice", &ManualPurchaseForm::new(vec![8, 13, 21, 34, 40, 45]));
    assert!(matches!(result, Err(LottoError::NoOpenRound)));
    assert_eq!(count_tickets(&conn).unwrap(), 0);

    assert!(matches!(
        finalize_round_with_draw(&conn, draw),
        Err(LottoError::NoOpenRound)
    ));
}
