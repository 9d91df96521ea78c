use crate::types::{Draw, LottoNumbers, Rank};

/// Compares a purchased set against a draw.
///
/// Five main matches split on the bonus number: with it the ticket takes
/// second prize, without it third.
pub fn determine_rank(purchased: &LottoNumbers, draw: &Draw) -> Rank {
    let match_count = purchased.matches(&draw.winning);
    let has_bonus = purchased.contains(draw.bonus);

    match (match_count, has_bonus) {
        (6, _) => Rank::First,
        (5, true) => Rank::Second,
        (5, false) => Rank::Third,
        (4, _) => Rank::Fourth,
        (3, _) => Rank::Fifth,
        _ => Rank::None,
    }
}
