use rand::Rng;
use rand::seq::index;

use crate::errors::LottoResult;
use crate::types::{Draw, LottoNumbers, MAX_NUMBER, NUMBERS_PER_TICKET};

fn sample_distinct<R: Rng + ?Sized>(rng: &mut R, amount: usize) -> Vec<i64> {
    index::sample(rng, MAX_NUMBER as usize, amount)
        .into_iter()
        .map(|i| i as i64 + 1)
        .collect()
}

/// Six distinct numbers, uniform over the pool, sorted ascending.
pub fn pick_ticket_numbers<R: Rng + ?Sized>(rng: &mut R) -> LottoResult<LottoNumbers> {
    LottoNumbers::try_from_values(&sample_distinct(rng, NUMBERS_PER_TICKET))
}

/// Seven distinct numbers in draw order: the first six win, the seventh is the bonus.
pub fn draw_winning_numbers<R: Rng + ?Sized>(rng: &mut R) -> LottoResult<Draw> {
    let drawn = sample_distinct(rng, NUMBERS_PER_TICKET + 1);
    let winning = LottoNumbers::try_from_values(&drawn[..NUMBERS_PER_TICKET])?;
    Draw::new(winning, drawn[NUMBERS_PER_TICKET] as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MIN_NUMBER;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn ticket_numbers_are_distinct_sorted_and_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let numbers = pick_ticket_numbers(&mut rng).unwrap();
            let slice = numbers.as_slice();
            assert_eq!(slice.len(), NUMBERS_PER_TICKET);
            assert!(slice.windows(2).all(|w| w[0] < w[1]));
            assert!(slice.iter().all(|n| (MIN_NUMBER..=MAX_NUMBER).contains(n)));
        }
    }

    #[test]
    fn bonus_never_lands_in_winning_set() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let draw = draw_winning_numbers(&mut rng).unwrap();
            assert!(!draw.winning.contains(draw.bonus));
            assert!((MIN_NUMBER..=MAX_NUMBER).contains(&draw.bonus));
        }
    }

    #[test]
    fn every_number_can_come_up() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            seen.extend(pick_ticket_numbers(&mut rng).unwrap().as_slice().iter().copied());
        }
        assert_eq!(seen.len(), MAX_NUMBER as usize);
    }

    #[test]
    fn same_seed_same_draw() {
        let a = draw_winning_numbers(&mut StdRng::seed_from_u64(3)).unwrap();
        let b = draw_winning_numbers(&mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(a, b);
    }
}
