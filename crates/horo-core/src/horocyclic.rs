//! Horocyclic words: the normal forms the divergence rule works with.
//!
//! A point at offset k along the ray is γ(k)·h, and h is spelled in four
//! consecutive subwords. The first two hold letters that commute with the
//! ray letter about to be passed and sort before it. The third holds
//! letters below the leading ray letter, and the fourth holds the rest.
//! Which ray letter leads depends on the parity of k, so there is one
//! machine per [`Form`].

use std::collections::{HashSet, VecDeque};

use crate::automaton::shortlex_next;
use crate::presentation::{Letter, LetterSet, Presentation};

/// Parity of the ray offset a horocyclic word hangs from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Form {
    Even,
    Odd,
}

impl Form {
    /// The form of a word hanging from γ(k).
    pub fn of_offset(k: usize) -> Self {
        if k % 2 == 0 { Self::Even } else { Self::Odd }
    }

    pub fn flip(self) -> Self {
        match self {
            Self::Even => Self::Odd,
            Self::Odd => Self::Even,
        }
    }

    pub fn is_odd(self) -> bool {
        self == Self::Odd
    }

    pub fn index(self) -> usize {
        match self {
            Self::Even => 0,
            Self::Odd => 1,
        }
    }

    /// (leading, other) ray letters for this form.
    pub fn ray_roles(self, ray: [Letter; 2]) -> (Letter, Letter) {
        match self {
            Self::Even => (ray[0], ray[1]),
            Self::Odd => (ray[1], ray[0]),
        }
    }
}

/// A horocyclic suffix split into its four subwords.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HorocyclicWord {
    parts: [Vec<Letter>; 4],
    form: Form,
}

impl HorocyclicWord {
    pub fn empty(form: Form) -> Self {
        Self {
            parts: Default::default(),
            form,
        }
    }

    pub fn from_parts(parts: [Vec<Letter>; 4], form: Form) -> Self {
        Self { parts, form }
    }

    pub fn form(&self) -> Form {
        self.form
    }

    pub fn parts(&self) -> &[Vec<Letter>; 4] {
        &self.parts
    }

    pub fn part(&self, index: usize) -> &[Letter] {
        &self.parts[index]
    }

    /// The subwords written one after another.
    pub fn letters(&self) -> Vec<Letter> {
        self.parts.concat()
    }

    pub fn len(&self) -> usize {
        self.parts.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(Vec::is_empty)
    }

    /// Copy with subword `index` replaced.
    pub fn with_part(&self, index: usize, part: Vec<Letter>) -> Self {
        let mut parts = self.parts.clone();
        parts[index] = part;
        Self {
            parts,
            form: self.form,
        }
    }

    /// Copy with `letter` appended to subword `index`.
    pub fn pushed(&self, index: usize, letter: Letter) -> Self {
        let mut parts = self.parts.clone();
        parts[index].push(letter);
        Self {
            parts,
            form: self.form,
        }
    }

    pub fn render(&self, presentation: &Presentation) -> String {
        self.parts
            .iter()
            .map(|p| presentation.render(p))
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// State of a [`HorocyclicMachine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MachineState {
    /// Subword currently being written, 0 to 3.
    part: usize,
    /// ShortLex forbidden set inside the current subword.
    shortlex: LetterSet,
    /// Letters of the third subword still blocked in the current one.
    excluded: LetterSet,
    /// Letters blocked for the rest of the word once the tail has opened.
    tail: LetterSet,
    /// Ray letters that could still be commuted to the front.
    ray: LetterSet,
}

impl MachineState {
    fn new(part: usize, shortlex: LetterSet, excluded: LetterSet, tail: LetterSet, ray: LetterSet) -> Self {
        Self {
            part,
            shortlex,
            excluded,
            tail,
            ray,
        }
    }

    /// Subword the last letter read went into.
    pub fn part(&self) -> usize {
        self.part
    }
}

/// Recognizer of horocyclic words of one form.
///
/// Each step also reports which subword the letter lands in, so a run
/// spells a [`HorocyclicWord`].
#[derive(Clone, Debug)]
pub struct HorocyclicMachine<'a> {
    presentation: &'a Presentation,
    form: Form,
    first: LetterSet,
    second: LetterSet,
    third: LetterSet,
    third_excluded: LetterSet,
    tail_excluded: LetterSet,
    ray: LetterSet,
    reachable: LetterSet,
    state_count: usize,
    transition_count: usize,
}

impl<'a> HorocyclicMachine<'a> {
    pub fn new(presentation: &'a Presentation, ray: [Letter; 2], form: Form) -> Self {
        let [r0, r1] = ray;
        let (lead, other) = form.ray_roles(ray);
        let upper_r1 = presentation.link(r1).difference(presentation.lesser_star(r1));
        let mut machine = Self {
            presentation,
            form,
            first: presentation.link(r0).intersection(presentation.lesser_star(r1)),
            second: presentation.lesser_star(r0).intersection(upper_r1),
            third: presentation.lesser_star(lead),
            third_excluded: presentation.link(other),
            tail_excluded: presentation
                .lesser_star(other)
                .intersection(presentation.link(lead))
                .with(other),
            ray: LetterSet::singleton(r0).with(r1),
            reachable: LetterSet::EMPTY,
            state_count: 0,
            transition_count: 0,
        };
        machine.explore();
        tracing::debug!(
            "{:?} horocyclic machine: {} states, {} transitions",
            form,
            machine.state_count,
            machine.transition_count
        );
        machine
    }

    fn explore(&mut self) {
        let start = self.start();
        let mut seen: HashSet<MachineState> = [start].into_iter().collect();
        let mut frontier = VecDeque::from([start]);
        let mut reachable = LetterSet::EMPTY;
        let mut transitions = 0;
        while let Some(state) = frontier.pop_front() {
            for x in self.presentation.letters() {
                let Some((next, _)) = self.step(&state, x) else {
                    continue;
                };
                reachable.insert(x);
                transitions += 1;
                if seen.insert(next) {
                    frontier.push_back(next);
                }
            }
        }
        self.reachable = reachable;
        self.state_count = seen.len();
        self.transition_count = transitions;
    }

    pub fn form(&self) -> Form {
        self.form
    }

    pub fn start(&self) -> MachineState {
        MachineState::new(0, LetterSet::EMPTY, LetterSet::EMPTY, LetterSet::EMPTY, self.ray)
    }

    /// Leave the first two subwords with `x`, which starts the third or the
    /// fourth.
    fn open_tail(&self, x: Letter, tail: LetterSet, ray: LetterSet) -> Option<(MachineState, usize)> {
        let p = self.presentation;
        if tail.contains(x) {
            return None;
        }
        let link = p.link(x);
        if self.third.contains(x) {
            if self.third_excluded.contains(x) {
                return None;
            }
            let sl = shortlex_next(p, self.third, LetterSet::EMPTY, x)?;
            return Some((
                MachineState::new(2, sl, self.third_excluded.intersection(link), tail.intersection(link), ray),
                2,
            ));
        }
        let sl = shortlex_next(p, p.alphabet(), LetterSet::EMPTY, x)?;
        Some((
            MachineState::new(3, sl, self.third.intersection(link), tail.intersection(link), ray),
            3,
        ))
    }

    /// Read `x` from `state`: the next state and the subword `x` joins.
    pub fn step(&self, state: &MachineState, x: Letter) -> Option<(MachineState, usize)> {
        let p = self.presentation;
        if state.ray.contains(x) {
            return None;
        }
        let ray = state.ray.intersection(p.link(x));
        let leading =
            |part: usize, shortlex: LetterSet| MachineState::new(part, shortlex, LetterSet::EMPTY, LetterSet::EMPTY, ray);
        match state.part {
            0 => {
                if let Some(sl) = shortlex_next(p, self.first, state.shortlex, x) {
                    return Some((leading(0, sl), 0));
                }
                if let Some(sl) = shortlex_next(p, self.second, LetterSet::EMPTY, x) {
                    return Some((leading(1, sl), 1));
                }
                self.open_tail(x, self.tail_excluded, ray)
            }
            1 => {
                if let Some(sl) = shortlex_next(p, self.second, state.shortlex, x) {
                    return Some((leading(1, sl), 1));
                }
                self.open_tail(x, self.tail_excluded, ray)
            }
            part => {
                if state.tail.contains(x) {
                    return None;
                }
                let link = p.link(x);
                let tail = state.tail.intersection(link);
                if part == 2 {
                    if let Some(sl) = shortlex_next(p, self.third, state.shortlex, x)
                        && !state.excluded.contains(x)
                    {
                        return Some((MachineState::new(2, sl, state.excluded.intersection(link), tail, ray), 2));
                    }
                    if self.third.contains(x) {
                        return None;
                    }
                    let sl = shortlex_next(p, p.alphabet(), LetterSet::EMPTY, x)?;
                    return Some((MachineState::new(3, sl, self.third.intersection(link), tail, ray), 3));
                }
                if state.excluded.contains(x) {
                    return None;
                }
                let sl = shortlex_next(p, p.alphabet(), state.shortlex, x)?;
                Some((MachineState::new(3, sl, state.excluded.intersection(link), tail, ray), 3))
            }
        }
    }

    /// State after reading `letters` from the start.
    pub fn run(&self, letters: &[Letter]) -> Option<MachineState> {
        letters
            .iter()
            .try_fold(self.start(), |state, x| self.step(&state, *x).map(|(next, _)| next))
    }

    pub fn accepts(&self, letters: &[Letter]) -> bool {
        self.run(letters).is_some()
    }

    /// Letters readable from `state`. A run that got stuck reads as every
    /// letter the machine can read anywhere.
    pub fn readable(&self, state: Option<&MachineState>) -> LetterSet {
        match state {
            None => self.reachable,
            Some(state) => self
                .presentation
                .letters()
                .filter(|x| self.step(state, *x).is_some())
                .collect(),
        }
    }

    pub fn state_count(&self) -> usize {
        self.state_count
    }

    pub fn transition_count(&self) -> usize {
        self.transition_count
    }
}

/// Every horocyclic word of length at most `max_len`. Even lengths are
/// spelled in `even_length_form` and odd lengths in the other form, which
/// is what one level of the horosphere needs: a word of length |h| at
/// level B hangs from γ(|h| − B).
///
/// `machines` is indexed by [`Form::index`].
pub fn horocyclic_words(
    machines: &[HorocyclicMachine<'_>; 2],
    max_len: usize,
    even_length_form: Form,
) -> Vec<HorocyclicWord> {
    let mut out = Vec::new();
    for (form, parity) in [(even_length_form, 0), (even_length_form.flip(), 1)] {
        let machine = &machines[form.index()];
        let mut level = vec![(machine.start(), HorocyclicWord::empty(form))];
        for depth in 0..=max_len {
            if depth % 2 == parity {
                out.extend(level.iter().map(|(_, w)| w.clone()));
            }
            if depth == max_len {
                break;
            }
            level = level
                .iter()
                .flat_map(|(state, word)| {
                    machine
                        .presentation
                        .letters()
                        .filter_map(move |x| {
                            machine
                                .step(state, x)
                                .map(|(next, part)| (next, word.pushed(part, x)))
                        })
                })
                .collect();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pentagon() -> (Presentation, [Letter; 2]) {
        let p = Presentation::from_edges(
            &["a", "b", "c", "d", "e"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e"), ("e", "a")],
        )
        .unwrap();
        let ray = [p.generator("a").unwrap(), p.generator("c").unwrap()];
        (p, ray)
    }

    #[test]
    fn test_form_roles() {
        let (_, ray) = pentagon();
        assert_eq!(Form::of_offset(0), Form::Even);
        assert_eq!(Form::of_offset(3), Form::Odd);
        assert_eq!(Form::Even.flip(), Form::Odd);
        assert_eq!(Form::Even.ray_roles(ray), (ray[0], ray[1]));
        assert_eq!(Form::Odd.ray_roles(ray), (ray[1], ray[0]));
    }

    #[test]
    fn test_machines_reject_leading_ray_letters() {
        let (p, ray) = pentagon();
        for form in [Form::Even, Form::Odd] {
            let m = HorocyclicMachine::new(&p, ray, form);
            assert_eq!(m.state_count(), 13);
            assert_eq!(m.transition_count(), 34);
            assert!(!m.accepts(&p.parse_word("a").unwrap()));
            assert!(!m.accepts(&p.parse_word("ba").unwrap()));
            assert!(m.accepts(&p.parse_word("d").unwrap()));
            assert!(m.readable(None).contains(p.generator("b").unwrap()));
        }
    }

    #[test]
    fn test_words_per_level_match_suffix_counts() {
        let (p, ray) = pentagon();
        let machines = [
            HorocyclicMachine::new(&p, ray, Form::Even),
            HorocyclicMachine::new(&p, ray, Form::Odd),
        ];
        // level 0 of the length-3 suffix window has 29 points
        let words = horocyclic_words(&machines, 3, Form::Even);
        assert_eq!(words.len(), 29);
        assert!(words.iter().all(|w| w.form() == Form::of_offset(w.len())));

        let words = horocyclic_words(&machines, 1, Form::Even);
        let shown: Vec<String> = words.iter().map(|w| w.render(&p)).collect();
        assert_eq!(words.len(), 4);
        assert!(shown.contains(&"|||".to_string()));
    }

    #[test]
    fn test_subwords_follow_ray_roles() {
        let (p, ray) = pentagon();
        let even = HorocyclicMachine::new(&p, ray, Form::Even);
        // b commutes with a and sorts below c: first subword
        let (state, part) = even.step(&even.start(), p.generator("b").unwrap()).unwrap();
        assert_eq!(part, 0);
        let (_, part) = even.step(&state, p.generator("d").unwrap()).unwrap();
        assert_eq!(part, 3);
    }
}
