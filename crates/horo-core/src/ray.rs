//! The basepoint ray γ and Busemann values relative to it.
//!
//! γ alternates two non-commuting generators, γ(k) being its length-k
//! prefix. The Busemann value of w is lim_k d(w, γ(k)) − k. Writing c(w)
//! for the longest ray prefix some geodesic word for w starts with, the
//! limit has the closed form |w| − 2·c(w), and w factors as γ(c(w))·s with
//! s a horocyclic suffix no ray letter can be commuted to the front of.

use serde::{Deserialize, Serialize};

use crate::constants::BUSEMANN_LOOKAHEAD;
use crate::error::Result;
use crate::normal_form::NormalForm;
use crate::presentation::{Letter, LetterSet, Presentation};
use crate::word::Word;

/// The infinite alternation `(first, second, first, …)`.
///
/// The two letters must be distinct and must not commute; this is not
/// checked here (see [`Presentation::check_preconditions`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ray {
    letters: [Letter; 2],
}

impl Ray {
    pub fn new(letters: [Letter; 2]) -> Self {
        Self { letters }
    }

    pub fn from_labels(presentation: &Presentation, labels: [&str; 2]) -> Result<Self> {
        Ok(Self::new([
            presentation.generator(labels[0])?,
            presentation.generator(labels[1])?,
        ]))
    }

    pub fn letters(&self) -> [Letter; 2] {
        self.letters
    }

    pub fn as_set(&self) -> LetterSet {
        LetterSet::singleton(self.letters[0]).with(self.letters[1])
    }

    /// The letter at position `k` of the ray.
    pub fn letter(&self, k: usize) -> Letter {
        self.letters[k % 2]
    }

    /// γ(k), already in normal form.
    pub fn prefix(&self, k: usize) -> Word {
        Word::from_canonical((0..k).map(|i| self.letter(i)).collect())
    }

    /// c(w): how many leading ray letters can be peeled off the front of w.
    pub fn prefix_length(&self, nf: &NormalForm, word: &Word) -> usize {
        self.decompose(nf, word).0
    }

    /// Factor w as γ(k)·s with k = c(w) and s a horocyclic suffix.
    pub fn decompose(&self, nf: &NormalForm, word: &Word) -> (usize, Word) {
        let mut rest = word.letters().to_vec();
        let mut k = 0;
        loop {
            let next = self.letter(k);
            let Some(pos) = frontable_position(nf.presentation(), &rest, next) else {
                break;
            };
            rest.remove(pos);
            k += 1;
        }
        (k, nf.sort_reduced(rest))
    }

    /// The horosphere point γ(k)·s.
    pub fn point(&self, nf: &NormalForm, k: usize, suffix: &Word) -> Word {
        nf.mul(&self.prefix(k), suffix)
    }

    /// True when no ray letter can be commuted to the front of `word`.
    pub fn is_suffix(&self, nf: &NormalForm, word: &Word) -> bool {
        !self
            .letters
            .iter()
            .any(|r| nf.leads_with(word.letters(), *r))
    }

    /// Busemann value by the closed form |w| − 2·c(w).
    pub fn busemann(&self, nf: &NormalForm, word: &Word) -> i64 {
        word.len() as i64 - 2 * self.prefix_length(nf, word) as i64
    }

    /// Busemann value as d(w, γ(k)) − k for k past the point where the
    /// sequence is constant.
    pub fn busemann_limit(&self, nf: &NormalForm, word: &Word) -> i64 {
        let k = word.len() + BUSEMANN_LOOKAHEAD;
        nf.distance(word, &self.prefix(k)) as i64 - k as i64
    }
}

fn frontable_position(presentation: &Presentation, letters: &[Letter], letter: Letter) -> Option<usize> {
    for (i, l) in letters.iter().enumerate() {
        if *l == letter {
            return Some(i);
        }
        if !presentation.commutes(*l, letter) {
            return None;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn setup() -> (NormalForm, Ray) {
        let p = Presentation::from_edges(
            &["a", "b", "c", "d", "e"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e"), ("e", "a")],
        )
        .unwrap();
        let ray = Ray::from_labels(&p, ["a", "c"]).unwrap();
        (NormalForm::new(p), ray)
    }

    #[test]
    fn test_prefix_alternates() {
        let (nf, ray) = setup();
        assert_eq!(ray.prefix(5).render(nf.presentation()), "acaca");
        assert!(ray.prefix(0).is_identity());
        assert!(nf.is_canonical(ray.prefix(7).letters()));
    }

    #[test]
    fn test_busemann_values() {
        let (nf, ray) = setup();
        let cases = [
            ("", 0),
            ("a", -1),
            ("c", 1),
            ("b", 1),
            ("ac", -2),
            ("ab", 0),
            ("ca", 2),
            ("acd", -1),
        ];
        for (text, expected) in cases {
            let w = nf.parse(text).unwrap();
            assert_eq!(ray.busemann(&nf, &w), expected, "busemann of {text}");
            assert_eq!(ray.busemann_limit(&nf, &w), expected, "limit of {text}");
        }
    }

    #[test]
    fn test_ray_points_descend() {
        let (nf, ray) = setup();
        for k in 0..6 {
            assert_eq!(ray.busemann(&nf, &ray.prefix(k)), -(k as i64));
        }
    }

    #[test]
    fn test_decompose() {
        let (nf, ray) = setup();
        let w = nf.parse("acd").unwrap();
        let (k, s) = ray.decompose(&nf, &w);
        assert_eq!(k, 2);
        assert_eq!(s.render(nf.presentation()), "d");
        assert!(ray.is_suffix(&nf, &s));
        assert_eq!(ray.point(&nf, k, &s), w);

        // b commutes with a, so a still peels off
        let w = nf.parse("ba").unwrap();
        let (k, s) = ray.decompose(&nf, &w);
        assert_eq!(k, 1);
        assert_eq!(s.render(nf.presentation()), "b");
        assert!(!ray.is_suffix(&nf, &w));
    }

    proptest! {
        #[test]
        fn prop_closed_form_matches_limit(seq in proptest::collection::vec(0usize..5, 0..10)) {
            let (nf, ray) = setup();
            let letters: Vec<Letter> = seq.iter().map(|i| Letter::new(*i)).collect();
            let w = nf.reduce(&letters);
            prop_assert_eq!(ray.busemann(&nf, &w), ray.busemann_limit(&nf, &w));
        }

        #[test]
        fn prop_decomposition_recomposes(seq in proptest::collection::vec(0usize..5, 0..10)) {
            let (nf, ray) = setup();
            let letters: Vec<Letter> = seq.iter().map(|i| Letter::new(*i)).collect();
            let w = nf.reduce(&letters);
            let (k, s) = ray.decompose(&nf, &w);
            prop_assert!(ray.is_suffix(&nf, &s));
            prop_assert_eq!(k + s.len(), w.len());
            prop_assert_eq!(ray.point(&nf, k, &s), w);
        }
    }
}
