//! Bounded enumeration of normal forms.
//!
//! Words come out of a breadth-first walk over an automaton with an
//! explicit frontier. Each level is emitted in lexicographic order, so the
//! full output is in ShortLex order.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::automaton::{Automaton, StateId};
use crate::normal_form::NormalForm;
use crate::ray::Ray;
use crate::word::Word;

/// Which finite piece of a horosphere a request looks at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    /// Elements of word length at most `length`.
    #[default]
    Ball,
    /// Elements γ(|s| − b)·s whose horocyclic suffix s has length at most
    /// `length`.
    Suffix,
}

/// Every word accepted by `automaton` of length at most `max_len`.
pub fn accepted_words(automaton: &Automaton, max_len: usize) -> Vec<Word> {
    let mut out = vec![Word::identity()];
    let mut frontier: Vec<(Vec<_>, StateId)> = vec![(Vec::new(), Automaton::START)];

    for _ in 0..max_len {
        let mut next = Vec::new();
        for (letters, state) in &frontier {
            for letter in automaton.legal(*state).iter() {
                let Some(target) = automaton.next(*state, letter) else {
                    continue;
                };
                let mut extended = letters.clone();
                extended.push(letter);
                next.push((extended, target));
            }
        }
        if next.is_empty() {
            break;
        }
        out.extend(
            next.iter()
                .map(|(letters, _)| Word::from_canonical(letters.clone())),
        );
        frontier = next;
    }
    out
}

/// All normal forms of length at most `radius`.
pub fn ball(nf: &NormalForm, radius: usize) -> Vec<Word> {
    let words = accepted_words(nf.automaton(), radius);
    tracing::debug!("ball of radius {radius}: {} elements", words.len());
    words
}

/// All normal forms of length exactly `length`.
pub fn sphere(nf: &NormalForm, length: usize) -> Vec<Word> {
    ball(nf, length)
        .into_iter()
        .filter(|w| w.len() == length)
        .collect()
}

/// The ball of radius `radius`, grouped by Busemann value.
pub fn busemann_buckets(nf: &NormalForm, ray: &Ray, radius: usize) -> BTreeMap<i64, BTreeSet<Word>> {
    let mut buckets: BTreeMap<i64, BTreeSet<Word>> = BTreeMap::new();
    for word in ball(nf, radius) {
        buckets
            .entry(ray.busemann(nf, &word))
            .or_default()
            .insert(word);
    }
    buckets
}

/// Elements of the level-`busemann_value` horosphere whose horocyclic
/// suffix has length at most `length`. `suffix_automaton` must be the
/// suffix recognizer for `ray`.
///
/// Each point carries a ray prefix of length |s| − `busemann_value`, so
/// very negative levels build very long words. Levels whose offset does
/// not fit a `usize` give an empty window.
pub fn suffix_window(
    nf: &NormalForm,
    ray: &Ray,
    suffix_automaton: &Automaton,
    length: usize,
    busemann_value: i64,
) -> BTreeSet<Word> {
    let words: BTreeSet<Word> = accepted_words(suffix_automaton, length)
        .into_iter()
        .filter_map(|s| {
            // k = |s| − B; levels too far out for any suffix give nothing
            let k = i64::try_from(s.len()).ok()?.checked_sub(busemann_value)?;
            let k = usize::try_from(k).ok()?;
            Some(ray.point(nf, k, &s))
        })
        .collect();
    tracing::debug!(
        "suffix window of length {length} at level {busemann_value}: {} elements",
        words.len()
    );
    words
}
