//! Exhaustive enumeration of candidate melds.
//!
//! Every structurally valid set and run that can be built from a hand is
//! produced, with no pruning and no deduplication. The optimizer decides
//! which of them to keep.

use itertools::Itertools;
use tracing::debug;

use crate::{Color, Hand, MAX_RANK, MIN_RANK, Meld, Tile};

const MIN_MELD_LEN: usize = 3;
const MAX_SET_LEN: usize = 4;

/// Enumerate every candidate meld in `hand`.
///
/// Performance: the number of candidates grows combinatorially with the
/// number of jokers and with duplicate copies of the same tile. A hand of
/// ordinary size with two jokers yields a few thousand candidates at most,
/// but a hand stuffed with jokers or repeated tiles can blow up.
pub fn enumerate_melds(hand: &Hand) -> Vec<Meld> {
    let jokers = hand.joker_indices();
    let mut melds = Vec::new();

    for rank in MIN_RANK..=MAX_RANK {
        generate_sets_for_rank(hand, rank, &jokers, &mut melds);
    }
    let set_count = melds.len();

    for color in Color::ALL {
        generate_runs_for_color(hand, color, &jokers, &mut melds);
    }

    debug!(
        tiles = hand.len(),
        jokers = jokers.len(),
        sets = set_count,
        runs = melds.len() - set_count,
        "enumerated candidate melds"
    );
    melds
}

/// Generate all sets at `rank`: size 3 or 4, at least one real tile,
/// real tiles pairwise distinct in color, jokers filling the rest
fn generate_sets_for_rank(hand: &Hand, rank: u8, jokers: &[usize], melds: &mut Vec<Meld>) {
    let real: Vec<&Tile> = hand
        .iter()
        .filter(|t| !t.is_joker() && t.rank() == rank)
        .collect();
    if real.is_empty() {
        return;
    }

    let max_len = MAX_SET_LEN.min(real.len() + jokers.len());
    for len in MIN_MELD_LEN..=max_len {
        let min_real = len.saturating_sub(jokers.len()).max(1);
        for real_count in min_real..=len.min(real.len()) {
            for picked in choose(&real, real_count) {
                if !distinct_colors(&picked) {
                    continue;
                }
                for wilds in choose(jokers, len - real_count) {
                    let indices = picked.iter().map(|t| t.index()).chain(wilds).collect();
                    melds.push(Meld::set(rank, indices));
                }
            }
        }
    }
}

fn distinct_colors(tiles: &[&Tile]) -> bool {
    tiles
        .iter()
        .enumerate()
        .all(|(i, a)| tiles[i + 1..].iter().all(|b| a.color() != b.color()))
}

/// Generate all runs of `color`: every window of 3..=13 ranks with at
/// least one real tile, gaps filled by jokers. Duplicate copies of a rank
/// each get their own candidate.
fn generate_runs_for_color(hand: &Hand, color: Color, jokers: &[usize], melds: &mut Vec<Meld>) {
    let mut by_rank: [Vec<usize>; MAX_RANK as usize + 1] = Default::default();
    for tile in hand.iter().filter(|t| !t.is_joker() && t.color() == color) {
        by_rank[tile.rank() as usize].push(tile.index());
    }
    if by_rank.iter().all(Vec::is_empty) {
        return;
    }

    for len in MIN_MELD_LEN as u8..=MAX_RANK {
        for start in MIN_RANK..=MAX_RANK - len + 1 {
            let present: Vec<&[usize]> = (start..start + len)
                .map(|rank| by_rank[rank as usize].as_slice())
                .filter(|copies| !copies.is_empty())
                .collect();
            let missing = len as usize - present.len();
            if present.is_empty() || missing > jokers.len() {
                continue;
            }

            let choices = present.iter().map(|copies| copies.iter().copied());
            for reals in choices.multi_cartesian_product() {
                for wilds in choose(jokers, missing) {
                    let mut indices = reals.clone();
                    indices.extend(wilds);
                    melds.push(Meld::run(color, start, len, indices));
                }
            }
        }
    }
}

/// All ways of picking `k` items from `pool`, in lexicographic order of position
fn choose<T: Copy>(pool: &[T], k: usize) -> impl Iterator<Item = Vec<T>> + '_ {
    pool.iter().copied().combinations(k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Indicator, MeldKind};

    fn hand(tokens: &str) -> Hand {
        let indicator = Indicator::new(Color::Red, 9).unwrap();
        Hand::from_tokens(tokens, Some(indicator)).unwrap()
    }

    fn sets(melds: &[Meld]) -> Vec<&Meld> {
        melds
            .iter()
            .filter(|m| matches!(m.kind, MeldKind::Set { .. }))
            .collect()
    }

    fn runs(melds: &[Meld]) -> Vec<&Meld> {
        melds
            .iter()
            .filter(|m| matches!(m.kind, MeldKind::Run { .. }))
            .collect()
    }

    #[test]
    fn test_choose() {
        let pool = [7, 8, 9, 10];
        let pairs: Vec<Vec<u8>> = choose(&pool, 2).collect();
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[0], vec![7, 8]);
        assert_eq!(pairs[5], vec![9, 10]);

        assert_eq!(choose(&pool, 0).collect::<Vec<_>>(), vec![Vec::<u8>::new()]);
        assert_eq!(choose(&pool, 5).count(), 0);
    }

    #[test]
    fn test_two_joker_window() {
        // 5 _ _ 8 takes both jokers
        let melds = enumerate_melds(&hand("y5 y8 j j"));
        assert!(melds.iter().any(|m| m.kind
            == MeldKind::Run {
                color: Color::Yellow,
                start: 5,
                len: 4
            }
            && m.len() == 4));
    }

    #[test]
    fn test_single_set() {
        let melds = enumerate_melds(&hand("r5 b5 k5"));
        assert_eq!(melds.len(), 1);
        assert_eq!(melds[0].kind, MeldKind::Set { rank: 5 });
        assert_eq!(melds[0].indices, vec![0, 1, 2]);
        assert_eq!(melds[0].weight, 15);
    }

    #[test]
    fn test_set_rejects_repeated_colors() {
        // Two red 5s can never share a set
        let melds = enumerate_melds(&hand("r5 r5 b5"));
        assert!(melds.is_empty());

        let melds = enumerate_melds(&hand("r5 r5 b5 k5"));
        let indices: Vec<Vec<usize>> = melds.iter().map(|m| m.indices.clone()).collect();
        assert_eq!(indices, vec![vec![0, 2, 3], vec![1, 2, 3]]);
    }

    #[test]
    fn test_run_with_joker() {
        let melds = enumerate_melds(&hand("r7 r8 j"));
        let runs = runs(&melds);
        // 6-7-8, 7-8-9 and the four-long windows need two jokers
        assert_eq!(runs.len(), 2);
        let weights: Vec<u32> = runs.iter().map(|m| m.weight).collect();
        assert!(weights.contains(&21));
        assert!(weights.contains(&24));
        assert!(runs.iter().all(|m| m.indices == vec![0, 1, 2]));
    }

    #[test]
    fn test_no_joker_only_melds() {
        let melds = enumerate_melds(&hand("j j j"));
        assert!(melds.is_empty());
    }

    #[test]
    fn test_runs_do_not_wrap() {
        let melds = enumerate_melds(&hand("y12 y13 y1"));
        assert!(melds.is_empty());
    }

    #[test]
    fn test_duplicate_copies_each_get_a_run() {
        let melds = enumerate_melds(&hand("b1 b2 b3 b1 b2 b3"));
        let runs = runs(&melds);
        assert_eq!(runs.len(), 8);
        assert!(runs.iter().any(|m| m.indices == vec![0, 1, 2]));
        assert!(runs.iter().any(|m| m.indices == vec![3, 4, 5]));
    }

    #[test]
    fn test_sets_of_three_and_four_with_jokers() {
        // Indicator red 9 makes "f" a red 10
        let melds = enumerate_melds(&hand("r10 b10 k10 f j j"));
        let sets = sets(&melds);
        assert!(sets.iter().any(|m| m.len() == 3));
        assert!(sets.iter().any(|m| m.len() == 4));
        assert!(sets.iter().all(|m| m.kind == MeldKind::Set { rank: 10 }));
        assert!(sets.iter().all(|m| m.weight == 10 * m.len() as u32));

        // The fake joker is a red 10, so it never joins the real red 10
        assert!(!sets.iter().any(|m| m.contains(0) && m.contains(3)));
    }

    #[test]
    fn test_run_weight_counts_joker_slots() {
        let melds = enumerate_melds(&hand("k1 k3 j"));
        assert_eq!(melds.len(), 1);
        assert_eq!(
            melds[0].kind,
            MeldKind::Run {
                color: Color::Black,
                start: 1,
                len: 3
            }
        );
        assert_eq!(melds[0].weight, 6);
    }

    #[test]
    fn test_empty_hand() {
        assert!(enumerate_melds(&Hand::default()).is_empty());
    }
}
