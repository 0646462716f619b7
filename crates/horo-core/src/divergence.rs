//! Divergence adjacency: two horosphere points are joined when geodesic
//! rays leaving them along the horosphere stay a bounded distance apart.
//!
//! Each point is a horocyclic word h hanging from γ(|h| − B). Candidate
//! neighbors come from two searches:
//!
//! - same length: undo the last `d` letters of h (d the clique number of
//!   Γ) in every order ShortLex allows, then grow every geodesic
//!   continuation of the same length;
//! - shorter: words of the level that are shorter than h, padded with ray
//!   letters so the two can be compared letter by letter.
//!
//! A candidate survives the [`EdgeChecker`] when it differs from h by
//! pairwise commuting letters. It is a neighbor when some letter both
//! words can still read fails to commute with a letter commuting with that
//! difference, so the two can keep alternating inside a flat strip.
//!
//! Points whose element has no horocyclic word (only level points led by
//! the second ray letter with no ray prefix) stay isolated.

use std::collections::{BTreeSet, HashSet};

use rayon::prelude::*;

use crate::automaton::{Automaton, StateId, shortlex_next};
use crate::edge_checker::{CheckerState, EdgeChecker, SubwordTags};
use crate::graph::Edge;
use crate::horocyclic::{Form, HorocyclicMachine, HorocyclicWord, horocyclic_words};
use crate::normal_form::NormalForm;
use crate::presentation::{Letter, LetterSet, Presentation};
use crate::ray::Ray;
use crate::word::Word;

pub struct DivergenceRule<'a> {
    nf: &'a NormalForm,
    ray: Ray,
    geodesic_suffix: &'a Automaton,
    machines: [HorocyclicMachine<'a>; 2],
    tags: [SubwordTags; 2],
    different: SubwordTags,
    depth: usize,
}

impl<'a> DivergenceRule<'a> {
    /// `geodesic_suffix` must be [`Automaton::geodesic_suffix`] for `ray`.
    pub fn new(nf: &'a NormalForm, ray: Ray, geodesic_suffix: &'a Automaton) -> Self {
        let presentation = nf.presentation();
        let letters = ray.letters();
        let depth = presentation.clique_number();
        tracing::debug!("divergence rule: search depth {depth}");
        Self {
            nf,
            ray,
            geodesic_suffix,
            machines: [
                HorocyclicMachine::new(presentation, letters, Form::Even),
                HorocyclicMachine::new(presentation, letters, Form::Odd),
            ],
            tags: [
                SubwordTags::same_length(presentation, letters, Form::Even),
                SubwordTags::same_length(presentation, letters, Form::Odd),
            ],
            different: SubwordTags::different_length(presentation, letters),
            depth,
        }
    }

    fn presentation(&self) -> &'a Presentation {
        self.nf.presentation()
    }

    pub fn machine(&self, form: Form) -> &HorocyclicMachine<'a> {
        &self.machines[form.index()]
    }

    /// How many letters are undone and regrown when searching for
    /// same-length neighbors.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Letters that can be commuted to the end of `letters`.
    fn last_letters(&self, letters: &[Letter]) -> LetterSet {
        let p = self.presentation();
        letters
            .iter()
            .fold(LetterSet::EMPTY, |acc, x| acc.intersection(p.link(*x)).with(*x))
    }

    /// Every way of removing `steps` letters from the end of `word`, one
    /// removal order per ShortLex word of removed letters.
    fn backtrack(&self, word: &HorocyclicWord, steps: usize, removed: LetterSet, out: &mut Vec<HorocyclicWord>) {
        if steps == 0 {
            out.push(word.clone());
            return;
        }
        let p = self.presentation();
        for x in self.last_letters(&word.letters()).iter() {
            let Some(next) = shortlex_next(p, p.alphabet(), removed, x) else {
                continue;
            };
            let Some(i) = (0..4).rev().find(|i| word.part(*i).contains(&x)) else {
                continue;
            };
            let mut part = word.part(i).to_vec();
            if let Some(j) = part.iter().rposition(|l| *l == x) {
                part.remove(j);
            }
            self.backtrack(&word.with_part(i, part), steps - 1, next, out);
        }
    }

    /// Insert `x` into `part` at its ShortLex position among the letters it
    /// commutes past.
    fn shortlex_insert(&self, part: &mut Vec<Letter>, x: Letter) {
        let p = self.presentation();
        let mut pos = part.len();
        for i in (0..part.len()).rev() {
            if !p.commutes(part[i], x) {
                break;
            }
            if part[i] > x {
                pos = i;
            }
        }
        part.insert(pos, x);
    }

    /// Every geodesic continuation of `word` by `steps` letters, each new
    /// letter placed in the earliest subword it can commute back into.
    fn successors(&self, word: &HorocyclicWord, steps: usize, state: Option<StateId>, out: &mut Vec<HorocyclicWord>) {
        if steps == 0 {
            out.push(word.clone());
            return;
        }
        let Some(state) = state else {
            return;
        };
        let p = self.presentation();
        let tags = &self.tags[word.form().index()];
        for x in p.letters() {
            let Some(next) = self.geodesic_suffix.next(state, x) else {
                continue;
            };
            let earliest = tags.tag(x) - 1;
            let mut i = 3;
            while i > earliest && word.part(i).iter().all(|l| *l == x || p.commutes(*l, x)) {
                i -= 1;
            }
            let mut part = word.part(i).to_vec();
            self.shortlex_insert(&mut part, x);
            self.successors(&word.with_part(i, part), steps - 1, Some(next), out);
        }
    }

    fn grow(&self, roots: &[HorocyclicWord], steps: usize) -> Vec<HorocyclicWord> {
        let mut out = Vec::new();
        for root in roots {
            let state = self.geodesic_suffix.run(&root.letters());
            self.successors(root, steps, state, &mut out);
        }
        out
    }

    /// Whether some letter readable by both sides (or a ray letter) fails
    /// to commute with something in `common`.
    fn alternates(&self, common: LetterSet, first: LetterSet, second: LetterSet) -> bool {
        let p = self.presentation();
        let ray = self.ray.as_set();
        let both = first.union(ray).intersection(second.union(ray)).intersection(common);
        both.iter()
            .any(|x| !common.difference(p.link(x).with(x)).is_empty())
    }

    /// Neighbors of `h` among words of the same length and form.
    pub fn same_length_neighbors(&self, h: &HorocyclicWord) -> Vec<HorocyclicWord> {
        let p = self.presentation();
        let roots = if h.len() <= self.depth {
            vec![HorocyclicWord::empty(h.form())]
        } else {
            let mut roots = Vec::new();
            self.backtrack(h, self.depth, LetterSet::EMPTY, &mut roots);
            roots
        };
        let candidates = self.grow(&roots, h.len().min(self.depth));

        let machine = self.machine(h.form());
        let checker = EdgeChecker::new(p, &self.tags[h.form().index()]);
        let mut seen: HashSet<HorocyclicWord> = [h.clone()].into_iter().collect();
        let mut out = Vec::new();
        for c in candidates {
            if !seen.insert(c.clone()) {
                continue;
            }
            let Some(end) = checker.check(&h.letters(), &c.letters()) else {
                continue;
            };
            let tail = end.part(3);
            let (longer, other) = if end.second_cancels() {
                ([h.letters(), tail.to_vec()].concat(), c.letters())
            } else {
                ([c.letters(), tail.to_vec()].concat(), h.letters())
            };
            let first = machine.readable(machine.run(&longer).as_ref());
            let second = machine.readable(machine.run(&other).as_ref());
            if self.alternates(end.common(), first, second) {
                out.push(c);
            }
        }
        out
    }

    /// The same letters with the fourth subword split at the ray letter of
    /// the other form, read in that form.
    fn switch_form(&self, word: &HorocyclicWord) -> HorocyclicWord {
        let [r0, r1] = self.ray.letters();
        let split = if word.form().is_odd() { r0 } else { r1 };
        let tail = word.part(3);
        let i = tail.iter().position(|l| *l > split).unwrap_or(tail.len());
        HorocyclicWord::from_parts(
            [
                word.part(0).to_vec(),
                word.part(1).to_vec(),
                tail[..i].to_vec(),
                tail[i..].to_vec(),
            ],
            word.form().flip(),
        )
    }

    fn shorter_candidates(&self, h: &HorocyclicWord) -> Vec<HorocyclicWord> {
        if h.part(3).is_empty() {
            let even_length_form = if h.form().is_odd() == (h.len() % 2 == 1) {
                Form::Odd
            } else {
                Form::Even
            };
            return horocyclic_words(&self.machines, h.len() - 1, even_length_form);
        }
        let roots = if h.len() < self.depth {
            vec![HorocyclicWord::empty(h.form().flip())]
        } else {
            let mut roots = Vec::new();
            self.backtrack(&self.switch_form(h), self.depth, LetterSet::EMPTY, &mut roots);
            roots
        };
        self.grow(&roots, h.len().min(self.depth).saturating_sub(1))
    }

    /// Drop the extension letters the checker left over that do not belong
    /// to the lagging word: the padding when `h` had no fourth subword, the
    /// first pad letter when it commutes below the fourth subword, and any
    /// ray letter that commutes with everything kept so far.
    fn lagging_tail(&self, h: &HorocyclicWord, end: &CheckerState, gap: usize, pad: &[Letter]) -> Vec<Letter> {
        let p = self.presentation();
        let mut tail = end.part(2).to_vec();
        if h.part(3).is_empty() {
            tail = tail.get(gap..).map(<[Letter]>::to_vec).unwrap_or_default();
        } else {
            let below = h
                .part(3)
                .iter()
                .fold(p.alphabet(), |acc, l| acc.intersection(p.lesser_star(*l)));
            if pad.first().is_some_and(|x| below.contains(*x)) && !tail.is_empty() {
                tail.remove(0);
            }
        }
        let ray = self.ray.as_set();
        let letters = h.letters();
        let mut kept: Vec<Letter> = Vec::new();
        for l in tail {
            let absorbed = ray.contains(l)
                && letters.iter().chain(kept.iter()).all(|m| p.commutes(l, *m));
            if !absorbed {
                kept.push(l);
            }
        }
        kept
    }

    /// Neighbors of `h` among shorter words, compared after padding them
    /// with ray letters.
    pub fn shorter_neighbors(&self, h: &HorocyclicWord) -> Vec<HorocyclicWord> {
        let p = self.presentation();
        if h.is_empty() || !h.part(2).is_empty() {
            return Vec::new();
        }
        let [r0, r1] = self.ray.letters();
        let allowed = p.link(if h.form().is_odd() { r0 } else { r1 });
        if h.part(3).iter().any(|l| !allowed.contains(*l)) {
            return Vec::new();
        }
        let shift = if h.form().is_odd() { 0 } else { 1 };
        let pad: Vec<Letter> = (0..self.depth).map(|k| self.ray.letter(k + shift)).collect();

        let checker = EdgeChecker::new(p, &self.different);
        let h_machine = self.machine(h.form());
        let mut seen: HashSet<HorocyclicWord> = HashSet::new();
        let mut out = Vec::new();
        for c in self.shorter_candidates(h) {
            if !seen.insert(c.clone()) {
                continue;
            }
            let gap = h.len() - c.len();
            let padded = [
                c.part(0),
                c.part(1),
                c.part(2),
                &pad[..gap.min(pad.len())],
                c.part(3),
            ]
            .concat();
            let Some(end) = checker.check(&h.letters(), &padded) else {
                continue;
            };
            let c_machine = self.machine(c.form());
            let (h_state, c_state) = if end.second_cancels() {
                let tail = self.lagging_tail(h, &end, gap, &pad);
                (
                    h_machine.run(&[h.letters(), tail].concat()),
                    c_machine.run(&c.letters()),
                )
            } else {
                let tail = end.part(2);
                (
                    h_machine.run(&h.letters()),
                    c_machine.run(&[c.letters(), tail.to_vec()].concat()),
                )
            };
            let first = h_machine.readable(h_state.as_ref());
            let second = c_machine.readable(c_state.as_ref());
            if self.alternates(end.common(), first, second) {
                out.push(c);
            }
        }
        out
    }

    /// Same-length and shorter neighbors of `h`.
    pub fn neighbors(&self, h: &HorocyclicWord) -> Vec<HorocyclicWord> {
        let mut out = self.same_length_neighbors(h);
        out.extend(self.shorter_neighbors(h));
        out
    }

    /// The element γ(|h| − B)·h, or `None` when h is longer than the ray
    /// offset allows at this level.
    pub fn element(&self, word: &HorocyclicWord, busemann_value: i64) -> Option<Word> {
        let k = i64::try_from(word.len()).ok()?.checked_sub(busemann_value)?;
        let k = usize::try_from(k).ok()?;
        let mut letters: Vec<Letter> = (0..k).map(|i| self.ray.letter(i)).collect();
        letters.extend(word.letters());
        Some(self.nf.reduce(&letters))
    }

    /// Divergence edges among `vertices`, all of which lie at level
    /// `busemann_value`.
    pub fn edges(&self, vertices: &BTreeSet<Word>, busemann_value: i64) -> BTreeSet<Edge> {
        let longest = vertices
            .iter()
            .map(|v| self.ray.decompose(self.nf, v).1.len())
            .max()
            .unwrap_or(0);
        let even_length_form = if busemann_value.rem_euclid(2) == 1 {
            Form::Odd
        } else {
            Form::Even
        };
        let words: Vec<(HorocyclicWord, Word)> = horocyclic_words(&self.machines, longest, even_length_form)
            .into_iter()
            .filter_map(|h| {
                let u = self.element(&h, busemann_value)?;
                vertices.contains(&u).then_some((h, u))
            })
            .collect();
        if words.len() < vertices.len() {
            tracing::debug!(
                "{} of {} vertices have no horocyclic word and stay isolated",
                vertices.len() - words.len(),
                vertices.len()
            );
        }

        let edges: BTreeSet<Edge> = words
            .par_iter()
            .flat_map_iter(|(h, u)| {
                self.neighbors(h).into_iter().filter_map(move |c| {
                    let v = self.element(&c, busemann_value)?;
                    (v != *u && vertices.contains(&v)).then(|| Edge::new(u.clone(), v))
                })
            })
            .collect();

        tracing::debug!(
            "divergence rule: {} edges among {} vertices",
            edges.len(),
            vertices.len()
        );
        edges
    }
}
