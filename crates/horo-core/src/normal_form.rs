//! ShortLex normal forms and the group operations on them.
//!
//! Every element has exactly one ShortLex-minimal reduced word. Products
//! are computed one letter at a time: a letter either cancels against an
//! earlier copy it commutes back to, or is appended and the word resorted.

use crate::automaton::Automaton;
use crate::error::Result;
use crate::presentation::{Letter, Presentation};
use crate::word::Word;

/// Group arithmetic on ShortLex normal forms.
///
/// Owns the presentation and its ShortLex automaton. Immutable after
/// construction, so one instance can be shared across threads.
#[derive(Clone, Debug)]
pub struct NormalForm {
    presentation: Presentation,
    shortlex: Automaton,
}

impl NormalForm {
    pub fn new(presentation: Presentation) -> Self {
        let shortlex = Automaton::shortlex(&presentation);
        Self {
            presentation,
            shortlex,
        }
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn automaton(&self) -> &Automaton {
        &self.shortlex
    }

    /// True when `letters` is the ShortLex normal form of its element.
    pub fn is_canonical(&self, letters: &[Letter]) -> bool {
        self.shortlex.accepts(letters)
    }

    /// True when `letter` occurs in `letters` and commutes with everything
    /// before its first occurrence, so some geodesic word for the element
    /// starts with it. `letters` must be reduced.
    pub fn leads_with(&self, letters: &[Letter], letter: Letter) -> bool {
        for l in letters {
            if *l == letter {
                return true;
            }
            if !self.presentation.commutes(*l, letter) {
                return false;
            }
        }
        false
    }

    /// Rearrange a reduced word into ShortLex order: repeatedly emit the
    /// smallest letter that commutes with every letter still ahead of it.
    pub(crate) fn sort_reduced(&self, mut rest: Vec<Letter>) -> Word {
        let mut out = Vec::with_capacity(rest.len());
        while !rest.is_empty() {
            let mut best = 0;
            for i in 1..rest.len() {
                if rest[i] < rest[best]
                    && rest[..i].iter().all(|l| self.presentation.commutes(*l, rest[i]))
                {
                    best = i;
                }
            }
            out.push(rest.remove(best));
        }
        Word::from_canonical(out)
    }

    /// Normal form of `word · letter`.
    pub fn rmul(&self, word: &Word, letter: Letter) -> Word {
        let letters = word.letters();
        for i in (0..letters.len()).rev() {
            if letters[i] == letter {
                let mut rest = letters.to_vec();
                rest.remove(i);
                return self.sort_reduced(rest);
            }
            if !self.presentation.commutes(letters[i], letter) {
                break;
            }
        }
        let mut extended = Vec::with_capacity(letters.len() + 1);
        extended.extend_from_slice(letters);
        extended.push(letter);
        if self.is_canonical(&extended) {
            Word::from_canonical(extended)
        } else {
            self.sort_reduced(extended)
        }
    }

    /// Normal form of an arbitrary generator sequence.
    pub fn reduce(&self, letters: &[Letter]) -> Word {
        letters
            .iter()
            .fold(Word::identity(), |w, l| self.rmul(&w, *l))
    }

    /// Parse labels and reduce them to a normal form.
    pub fn parse(&self, text: &str) -> Result<Word> {
        Ok(self.reduce(&self.presentation.parse_word(text)?))
    }

    pub fn mul(&self, left: &Word, right: &Word) -> Word {
        right
            .letters()
            .iter()
            .fold(left.clone(), |w, l| self.rmul(&w, *l))
    }

    pub fn inverse(&self, word: &Word) -> Word {
        let reversed: Vec<Letter> = word.letters().iter().rev().copied().collect();
        self.reduce(&reversed)
    }

    /// Word-metric distance in the Cayley graph.
    pub fn distance(&self, u: &Word, v: &Word) -> usize {
        self.mul(&self.inverse(u), v).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::{BTreeSet, VecDeque};

    fn pentagon() -> NormalForm {
        NormalForm::new(
            Presentation::from_edges(
                &["a", "b", "c", "d", "e"],
                &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e"), ("e", "a")],
            )
            .unwrap(),
        )
    }

    /// Shortest words reachable from `letters` by swapping adjacent
    /// commuting letters and deleting adjacent pairs xx. These are exactly
    /// the geodesic spellings of its element.
    fn shortest_rewrites(p: &Presentation, letters: &[Letter]) -> BTreeSet<Vec<Letter>> {
        let mut seen: BTreeSet<Vec<Letter>> = [letters.to_vec()].into_iter().collect();
        let mut queue = VecDeque::from([letters.to_vec()]);
        while let Some(w) = queue.pop_front() {
            for i in 0..w.len().saturating_sub(1) {
                let mut next = w.clone();
                if w[i] == w[i + 1] {
                    next.drain(i..i + 2);
                } else if p.commutes(w[i], w[i + 1]) {
                    next.swap(i, i + 1);
                } else {
                    continue;
                }
                if seen.insert(next.clone()) {
                    queue.push_back(next);
                }
            }
        }
        let shortest = seen.iter().map(Vec::len).min().unwrap_or(0);
        seen.into_iter().filter(|w| w.len() == shortest).collect()
    }

    fn show(nf: &NormalForm, w: &Word) -> String {
        w.render(nf.presentation())
    }

    #[test]
    fn test_reduce_sorts_commuting_letters() {
        let nf = pentagon();
        assert_eq!(show(&nf, &nf.parse("ba").unwrap()), "ab");
        assert_eq!(show(&nf, &nf.parse("ea").unwrap()), "ae");
        assert_eq!(show(&nf, &nf.parse("dca").unwrap()), "cda");
        assert_eq!(show(&nf, &nf.parse("da").unwrap()), "da");
    }

    #[test]
    fn test_reduce_cancels() {
        let nf = pentagon();
        assert!(nf.parse("aa").unwrap().is_identity());
        // b commutes past c, then cancels
        assert_eq!(show(&nf, &nf.parse("bcb").unwrap()), "c");
        assert_eq!(show(&nf, &nf.parse("acdca").unwrap()), "ada");
        assert_eq!(show(&nf, &nf.parse("adca").unwrap()), "acda");
    }

    #[test]
    fn test_inverse_and_distance() {
        let nf = pentagon();
        let w = nf.parse("acd").unwrap();
        let inv = nf.inverse(&w);
        assert_eq!(show(&nf, &inv), "cda");
        assert!(nf.mul(&w, &inv).is_identity());
        let u = nf.parse("ac").unwrap();
        assert_eq!(nf.distance(&u, &w), 1);
        assert_eq!(nf.distance(&w, &w), 0);
        assert_eq!(nf.distance(&Word::identity(), &w), 3);
    }

    #[test]
    fn test_leads_with() {
        let nf = pentagon();
        let p = nf.presentation();
        let w = p.parse_word("cda").unwrap();
        assert!(nf.leads_with(&w, p.generator("c").unwrap()));
        assert!(nf.leads_with(&w, p.generator("d").unwrap()));
        assert!(!nf.leads_with(&w, p.generator("a").unwrap()));
        assert!(!nf.leads_with(&w, p.generator("b").unwrap()));
    }

    proptest! {
        #[test]
        fn prop_reduce_is_canonical_and_idempotent(seq in proptest::collection::vec(0usize..5, 0..12)) {
            let nf = pentagon();
            let letters: Vec<Letter> = seq.iter().map(|i| Letter::new(*i)).collect();
            let w = nf.reduce(&letters);
            prop_assert!(nf.is_canonical(w.letters()));
            prop_assert!(w.len() <= letters.len());
            prop_assert_eq!(nf.reduce(w.letters()), w);
        }

        #[test]
        fn prop_reduce_agrees_with_rewriting(
            first in proptest::collection::vec(0usize..5, 0..7),
            second in proptest::collection::vec(0usize..5, 0..7),
            inserts in proptest::collection::vec((0usize..8, 0usize..5), 0..3),
            related in any::<bool>(),
        ) {
            let nf = pentagon();
            let p = nf.presentation();
            let first: Vec<Letter> = first.iter().map(|i| Letter::new(*i)).collect();
            let second: Vec<Letter> = if related {
                // same element: slip in cancelling pairs, then swap a
                // commuting neighbor pair when one follows
                let mut w = first.clone();
                for (pos, i) in &inserts {
                    let pos = pos % (w.len() + 1);
                    let x = Letter::new(*i);
                    w.splice(pos..pos, [x, x]);
                    if pos + 2 < w.len() && p.commutes(w[pos + 1], w[pos + 2]) {
                        w.swap(pos + 1, pos + 2);
                    }
                }
                w
            } else {
                second.iter().map(|i| Letter::new(*i)).collect()
            };

            let first_geodesics = shortest_rewrites(p, &first);
            let second_geodesics = shortest_rewrites(p, &second);
            let u = nf.reduce(&first);
            let v = nf.reduce(&second);
            prop_assert!(first_geodesics.contains(u.letters()));
            prop_assert_eq!(u == v, first_geodesics == second_geodesics);
            if related {
                prop_assert_eq!(u, v);
            }
        }

        #[test]
        fn prop_inverse_cancels(seq in proptest::collection::vec(0usize..5, 0..12)) {
            let nf = pentagon();
            let letters: Vec<Letter> = seq.iter().map(|i| Letter::new(*i)).collect();
            let w = nf.reduce(&letters);
            prop_assert!(nf.mul(&w, &nf.inverse(&w)).is_identity());
            prop_assert_eq!(nf.inverse(&w).len(), w.len());
        }
    }
}
