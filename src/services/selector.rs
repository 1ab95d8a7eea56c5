// src/services/selector.rs

//! Picks the question ids for a new session, unseen questions first.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::utils::percent::rounded_percentage;

/// Outcome of a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Exactly the requested number of distinct ids, in presentation order.
    pub question_ids: Vec<i64>,
    /// The user's ledger must be cleared before the selection is recorded.
    pub reset_ledger: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientQuestions {
    pub available: usize,
    pub requested: usize,
}

/// Selects `count` ids from `pool`, preferring ids not in `seen`.
///
/// * enough unseen: a shuffled sample of the unseen ids.
/// * some unseen: every unseen id (shuffled), then shuffled seen ids to fill up.
/// * none unseen, or progress already rounds to 100%: the ledger is reset and the
///   whole pool is sampled.
pub fn select_question_ids<R: Rng + ?Sized>(
    pool: &[i64],
    seen: &HashSet<i64>,
    count: usize,
    rng: &mut R,
) -> Result<Selection, InsufficientQuestions> {
    let mut unique_pool: Vec<i64> = Vec::with_capacity(pool.len());
    let mut dedup = HashSet::with_capacity(pool.len());
    for id in pool {
        if dedup.insert(*id) {
            unique_pool.push(*id);
        }
    }

    if unique_pool.len() < count {
        return Err(InsufficientQuestions {
            available: unique_pool.len(),
            requested: count,
        });
    }

    let (mut unseen, mut already_seen): (Vec<i64>, Vec<i64>) =
        unique_pool.iter().copied().partition(|id| !seen.contains(id));

    let progress = rounded_percentage(already_seen.len(), unique_pool.len());
    if unseen.is_empty() || progress >= 100 {
        unique_pool.shuffle(rng);
        unique_pool.truncate(count);
        return Ok(Selection {
            question_ids: unique_pool,
            reset_ledger: true,
        });
    }

    unseen.shuffle(rng);
    if unseen.len() >= count {
        unseen.truncate(count);
        return Ok(Selection {
            question_ids: unseen,
            reset_ledger: false,
        });
    }

    already_seen.shuffle(rng);
    let missing = count - unseen.len();
    unseen.extend(already_seen.into_iter().take(missing));
    Ok(Selection {
        question_ids: unseen,
        reset_ledger: false,
    })
}
