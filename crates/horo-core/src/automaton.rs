//! Finite-state recognizers over the generator alphabet.
//!
//! Every machine here is built once, breadth-first, into an explicit
//! transition table. All states are accepting; a word is rejected only by
//! running into a missing transition.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use crate::presentation::{Letter, LetterSet, Presentation};

pub type StateId = usize;

/// An explicit deterministic automaton with state 0 as its start state.
#[derive(Clone, Debug)]
pub struct Automaton {
    alphabet: LetterSet,
    table: Vec<Vec<Option<StateId>>>,
}

impl Automaton {
    pub const START: StateId = 0;

    /// Explore `step` from `start` and record every reachable state.
    fn explore<K, F>(width: usize, alphabet: LetterSet, start: K, step: F) -> Self
    where
        K: Clone + Eq + Hash,
        F: Fn(&K, Letter) -> Option<K>,
    {
        let mut ids: HashMap<K, StateId> = HashMap::new();
        let mut table: Vec<Vec<Option<StateId>>> = Vec::new();
        let mut frontier = VecDeque::new();

        ids.insert(start.clone(), 0);
        table.push(vec![None; width]);
        frontier.push_back((start, 0));

        while let Some((state, id)) = frontier.pop_front() {
            for letter in alphabet.iter() {
                let Some(next) = step(&state, letter) else {
                    continue;
                };
                let next_id = match ids.get(&next) {
                    Some(existing) => *existing,
                    None => {
                        let fresh = table.len();
                        ids.insert(next.clone(), fresh);
                        table.push(vec![None; width]);
                        frontier.push_back((next, fresh));
                        fresh
                    }
                };
                table[id][letter.index()] = Some(next_id);
            }
        }

        Self { alphabet, table }
    }

    /// Recognizer of ShortLex normal forms.
    ///
    /// A state is the set of letters that may not come next, either because
    /// they would cancel or because ShortLex order would have written them
    /// earlier.
    pub fn shortlex(presentation: &Presentation) -> Self {
        Self::shortlex_on(presentation, presentation.alphabet())
    }

    /// ShortLex recognizer of the special subgroup generated by `alphabet`.
    pub fn shortlex_on(presentation: &Presentation, alphabet: LetterSet) -> Self {
        let machine = Self::explore(presentation.len(), alphabet, LetterSet::EMPTY, |forbidden, x| {
            shortlex_next(presentation, alphabet, *forbidden, x)
        });
        tracing::debug!(
            "shortlex automaton: {} states, {} transitions",
            machine.state_count(),
            machine.transition_count()
        );
        machine
    }

    /// Recognizer of geodesic (reduced) words.
    pub fn geodesic(presentation: &Presentation) -> Self {
        Self::geodesic_on(presentation, presentation.alphabet())
    }

    /// Geodesic recognizer of the special subgroup generated by `alphabet`.
    pub fn geodesic_on(presentation: &Presentation, alphabet: LetterSet) -> Self {
        Self::explore(presentation.len(), alphabet, LetterSet::EMPTY, |forbidden, x| {
            (!forbidden.contains(x)).then(|| forbidden.intersection(presentation.link(x)).with(x))
        })
    }

    /// Accepts exactly the words in which no letter of `excluded` can be
    /// commuted to the front. A state is the set of excluded letters that
    /// could still get there.
    pub fn first_letter_excluder(presentation: &Presentation, excluded: LetterSet) -> Self {
        Self::explore(presentation.len(), presentation.alphabet(), excluded, |open, x| {
            (!open.contains(x)).then(|| open.intersection(presentation.link(x)))
        })
    }

    /// Recognizer of canonical horocyclic suffixes: ShortLex words that no
    /// ray letter can be commuted to the front of.
    pub fn shortlex_suffix(presentation: &Presentation, ray: [Letter; 2]) -> Self {
        let excluded = LetterSet::singleton(ray[0]).with(ray[1]);
        let machine = Self::shortlex(presentation)
            .intersection(&Self::first_letter_excluder(presentation, excluded));
        tracing::debug!(
            "suffix automaton: {} states, {} transitions",
            machine.state_count(),
            machine.transition_count()
        );
        machine
    }

    /// Recognizer of geodesic horocyclic suffixes: reduced words that no
    /// ray letter can be commuted to the front of. Every spelling of a
    /// suffix is accepted, not only the ShortLex one.
    pub fn geodesic_suffix(presentation: &Presentation, ray: [Letter; 2]) -> Self {
        let excluded = LetterSet::singleton(ray[0]).with(ray[1]);
        let machine = Self::geodesic(presentation)
            .intersection(&Self::first_letter_excluder(presentation, excluded));
        tracing::debug!(
            "geodesic suffix automaton: {} states, {} transitions",
            machine.state_count(),
            machine.transition_count()
        );
        machine
    }

    /// Product automaton accepting the words both machines accept.
    /// Only the accessible part is kept.
    pub fn intersection(&self, other: &Self) -> Self {
        let width = self.width().max(other.width());
        let alphabet = self.alphabet.intersection(other.alphabet);
        Self::explore(width, alphabet, (Self::START, Self::START), |(a, b), x| {
            Some((self.next(*a, x)?, other.next(*b, x)?))
        })
    }

    fn width(&self) -> usize {
        self.table.first().map_or(0, Vec::len)
    }

    pub fn alphabet(&self) -> LetterSet {
        self.alphabet
    }

    pub fn next(&self, state: StateId, letter: Letter) -> Option<StateId> {
        self.table[state].get(letter.index()).copied().flatten()
    }

    /// Letters readable from `state`.
    pub fn legal(&self, state: StateId) -> LetterSet {
        self.alphabet
            .iter()
            .filter(|l| self.next(state, *l).is_some())
            .collect()
    }

    /// State reached after reading `letters` from the start, if any.
    pub fn run(&self, letters: &[Letter]) -> Option<StateId> {
        self.run_from(Self::START, letters)
    }

    pub fn run_from(&self, state: StateId, letters: &[Letter]) -> Option<StateId> {
        letters
            .iter()
            .try_fold(state, |state, letter| self.next(state, *letter))
    }

    pub fn accepts(&self, letters: &[Letter]) -> bool {
        self.run(letters).is_some()
    }

    pub fn state_count(&self) -> usize {
        self.table.len()
    }

    pub fn transition_count(&self) -> usize {
        self.table
            .iter()
            .map(|row| row.iter().filter(|t| t.is_some()).count())
            .sum()
    }
}

/// One ShortLex step inside the special subgroup on `within`: the forbidden
/// set after reading `x`, or `None` when `x` is outside `within` or
/// forbidden.
pub(crate) fn shortlex_next(
    presentation: &Presentation,
    within: LetterSet,
    forbidden: LetterSet,
    x: Letter,
) -> Option<LetterSet> {
    if !within.contains(x) || forbidden.contains(x) {
        return None;
    }
    Some(
        forbidden
            .intersection(presentation.link(x))
            .union(presentation.lesser_star(x).intersection(within))
            .with(x),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pentagon() -> Presentation {
        Presentation::from_edges(
            &["a", "b", "c", "d", "e"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e"), ("e", "a")],
        )
        .unwrap()
    }

    fn letters(p: &Presentation, labels: &[&str]) -> LetterSet {
        labels.iter().map(|l| p.generator(l).unwrap()).collect()
    }

    #[test]
    fn test_shortlex_machine_size() {
        let p = pentagon();
        let m = Automaton::shortlex(&p);
        assert_eq!(m.state_count(), 8);
        assert_eq!(m.transition_count(), 24);
    }

    #[test]
    fn test_restricted_machines() {
        let p = pentagon();
        let abc = letters(&p, &["a", "b", "c"]);
        let m = Automaton::shortlex_on(&p, abc);
        assert_eq!(m.state_count(), 4);
        assert_eq!(m.transition_count(), 7);
        assert!(!m.accepts(&p.parse_word("ad").unwrap()));

        let empty = Automaton::shortlex_on(&p, LetterSet::EMPTY);
        assert_eq!(empty.state_count(), 1);
        assert_eq!(empty.transition_count(), 0);
    }

    #[test]
    fn test_geodesic_machine_size() {
        let m = Automaton::geodesic(&pentagon());
        assert_eq!(m.state_count(), 11);
        assert_eq!(m.transition_count(), 40);
    }

    #[test]
    fn test_first_letter_excluder() {
        let p = pentagon();
        let m = Automaton::first_letter_excluder(&p, letters(&p, &["d"]));
        assert_eq!(m.state_count(), 2);
        assert_eq!(m.transition_count(), 9);
        // d commutes past c to the front
        assert!(!m.accepts(&p.parse_word("cd").unwrap()));
        assert!(m.accepts(&p.parse_word("bd").unwrap()));
    }

    #[test]
    fn test_suffix_machine_size() {
        let p = pentagon();
        let ray = [p.generator("a").unwrap(), p.generator("c").unwrap()];
        let m = Automaton::shortlex_suffix(&p, ray);
        assert_eq!(m.state_count(), 13);
        assert_eq!(m.transition_count(), 34);
    }

    #[test]
    fn test_geodesic_suffix_machine() {
        let p = pentagon();
        let ray = [p.generator("a").unwrap(), p.generator("c").unwrap()];
        let m = Automaton::geodesic_suffix(&p, ray);
        assert_eq!(m.state_count(), 16);
        assert_eq!(m.transition_count(), 52);
        // both spellings of a commuting pair, but never a leading ray letter
        assert!(m.accepts(&p.parse_word("de").unwrap()));
        assert!(m.accepts(&p.parse_word("ed").unwrap()));
        assert!(!m.accepts(&p.parse_word("bc").unwrap()));
        assert!(!m.accepts(&p.parse_word("dd").unwrap()));
        let sl = Automaton::shortlex_suffix(&p, ray);
        assert!(!sl.accepts(&p.parse_word("ed").unwrap()));
    }

    #[test]
    fn test_restricted_geodesic_machine() {
        let p = pentagon();
        let m = Automaton::geodesic_on(&p, letters(&p, &["a", "b", "c"]));
        assert_eq!(m.state_count(), 6);
        assert_eq!(m.transition_count(), 11);
        assert!(m.accepts(&p.parse_word("ba").unwrap()));
        assert!(!m.accepts(&p.parse_word("bab").unwrap()));
    }

    #[test]
    fn test_shortlex_rejects_non_normal_forms() {
        let p = pentagon();
        let m = Automaton::shortlex(&p);
        for ok in ["", "a", "ab", "ac", "acd", "da", "dab"] {
            assert!(m.accepts(&p.parse_word(ok).unwrap()), "{ok} should be accepted");
        }
        // commuting letters are written in rank order
        for bad in ["aa", "abb", "ba", "ea"] {
            assert!(!m.accepts(&p.parse_word(bad).unwrap()), "{bad} should be rejected");
        }
    }
}
