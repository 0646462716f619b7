//! Defining data of a right-angled Coxeter group.
//!
//! Generators are involutions; two generators commute exactly when they are
//! adjacent in the defining graph Γ. Every generator is stored as a dense
//! index equal to its position in the ShortLex order, so comparing letters
//! compares ranks.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_GENERATORS;
use crate::error::{ConfigurationError, Result};

/// A generator, identified by its rank in the total order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Letter(u8);

impl Letter {
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index < MAX_GENERATORS);
        Self(index as u8)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A set of generators packed into a 64-bit mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LetterSet(u64);

impl LetterSet {
    pub const EMPTY: Self = Self(0);

    pub fn singleton(letter: Letter) -> Self {
        Self(1 << letter.0)
    }

    /// Every letter of rank strictly below `letter`.
    pub fn below(letter: Letter) -> Self {
        Self((1u64 << letter.0) - 1)
    }

    /// The first `n` letters.
    pub fn first(n: usize) -> Self {
        if n >= MAX_GENERATORS {
            Self(u64::MAX)
        } else {
            Self((1u64 << n) - 1)
        }
    }

    pub fn contains(self, letter: Letter) -> bool {
        self.0 & (1 << letter.0) != 0
    }

    pub fn insert(&mut self, letter: Letter) {
        self.0 |= 1 << letter.0;
    }

    pub fn remove(&mut self, letter: Letter) {
        self.0 &= !(1 << letter.0);
    }

    pub fn with(self, letter: Letter) -> Self {
        Self(self.0 | (1 << letter.0))
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn is_subset(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Lowest-ranked member, if any.
    pub fn min(self) -> Option<Letter> {
        (self.0 != 0).then(|| Letter(self.0.trailing_zeros() as u8))
    }

    /// Members in ascending rank.
    pub fn iter(self) -> impl Iterator<Item = Letter> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let i = bits.trailing_zeros();
            bits &= bits - 1;
            Some(Letter(i as u8))
        })
    }
}

impl FromIterator<Letter> for LetterSet {
    fn from_iter<I: IntoIterator<Item = Letter>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for letter in iter {
            set.insert(letter);
        }
        set
    }
}

/// Generators, their total order and their commutation relation.
#[derive(Clone, Debug)]
pub struct Presentation {
    labels: Vec<String>,
    index: HashMap<String, Letter>,
    links: Vec<LetterSet>,
    single_char: bool,
}

impl Presentation {
    /// Build a presentation from a commutation map and a rank map.
    ///
    /// `order` assigns each label its rank; the alphabet is exactly its key
    /// set. `commutation` lists, for each label, the labels it commutes
    /// with. A label absent from `commutation` commutes with nothing.
    pub fn new(
        commutation: &BTreeMap<String, BTreeSet<String>>,
        order: &BTreeMap<String, i64>,
    ) -> Result<Self> {
        if order.is_empty() {
            return Err(ConfigurationError::EmptyAlphabet.into());
        }
        if order.len() > MAX_GENERATORS {
            return Err(ConfigurationError::TooManyGenerators(order.len()).into());
        }

        let mut ranked: Vec<(&String, i64)> = order.iter().map(|(l, r)| (l, *r)).collect();
        ranked.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        for pair in ranked.windows(2) {
            if pair[0].1 == pair[1].1 {
                return Err(ConfigurationError::DuplicateRank {
                    first: pair[0].0.clone(),
                    second: pair[1].0.clone(),
                    rank: pair[0].1,
                }
                .into());
            }
        }

        let labels: Vec<String> = ranked.into_iter().map(|(l, _)| l.clone()).collect();
        let index: HashMap<String, Letter> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), Letter::new(i)))
            .collect();
        let lookup = |label: &str| {
            index
                .get(label)
                .copied()
                .ok_or_else(|| ConfigurationError::UnknownGenerator(label.to_string()))
        };

        let mut links = vec![LetterSet::EMPTY; labels.len()];
        for (label, partners) in commutation {
            let letter = lookup(label)?;
            for partner in partners {
                let other = lookup(partner)?;
                if other == letter {
                    return Err(ConfigurationError::SelfCommutation(label.clone()).into());
                }
                links[letter.index()].insert(other);
            }
        }
        for (i, link) in links.iter().enumerate() {
            for other in link.iter() {
                if !links[other.index()].contains(Letter::new(i)) {
                    return Err(ConfigurationError::AsymmetricCommutation {
                        from: labels[i].clone(),
                        to: labels[other.index()].clone(),
                    }
                    .into());
                }
            }
        }

        let single_char = labels.iter().all(|l| l.chars().count() == 1);
        Ok(Self {
            labels,
            index,
            links,
            single_char,
        })
    }

    /// Build a presentation from labels listed in rank order and the edges
    /// of Γ. Edges are symmetric by construction.
    pub fn from_edges(order: &[&str], edges: &[(&str, &str)]) -> Result<Self> {
        let order_map: BTreeMap<String, i64> = order
            .iter()
            .enumerate()
            .map(|(i, l)| (l.to_string(), i as i64))
            .collect();
        let mut commutation: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (a, b) in edges {
            commutation
                .entry(a.to_string())
                .or_default()
                .insert(b.to_string());
            commutation
                .entry(b.to_string())
                .or_default()
                .insert(a.to_string());
        }
        Self::new(&commutation, &order_map)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn alphabet(&self) -> LetterSet {
        LetterSet::first(self.labels.len())
    }

    pub fn letters(&self) -> impl Iterator<Item = Letter> + '_ {
        (0..self.labels.len()).map(Letter::new)
    }

    pub fn generator(&self, label: &str) -> Result<Letter> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| ConfigurationError::UnknownGenerator(label.to_string()).into())
    }

    pub fn label(&self, letter: Letter) -> &str {
        &self.labels[letter.index()]
    }

    pub fn commutes(&self, a: Letter, b: Letter) -> bool {
        self.links[a.index()].contains(b)
    }

    /// Generators commuting with `letter` (never `letter` itself).
    pub fn link(&self, letter: Letter) -> LetterSet {
        self.links[letter.index()]
    }

    /// Commuting partners of `letter` that precede it in the order.
    pub fn lesser_star(&self, letter: Letter) -> LetterSet {
        self.links[letter.index()].intersection(LetterSet::below(letter))
    }

    /// Parse a word written with this presentation's labels.
    ///
    /// Labels may be separated by whitespace or commas. When every label is
    /// a single character an unseparated string is read one character per
    /// letter.
    pub fn parse_word(&self, text: &str) -> Result<Vec<Letter>> {
        let text = text.trim();
        if text.contains(|c: char| c.is_whitespace() || c == ',') {
            text.split(|c: char| c.is_whitespace() || c == ',')
                .filter(|t| !t.is_empty())
                .map(|t| self.generator(t))
                .collect()
        } else if self.single_char {
            text.chars()
                .map(|c| self.generator(c.encode_utf8(&mut [0; 4])))
                .collect()
        } else if text.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![self.generator(text)?])
        }
    }

    /// Render letters with their labels, concatenated when every label is a
    /// single character and space separated otherwise.
    pub fn render(&self, letters: &[Letter]) -> String {
        let sep = if self.single_char { "" } else { " " };
        letters
            .iter()
            .map(|l| self.label(*l))
            .collect::<Vec<_>>()
            .join(sep)
    }

    /// Every non-empty clique of Γ, in depth-first rank order.
    pub fn cliques(&self) -> Vec<LetterSet> {
        let mut out = Vec::new();
        self.extend_cliques(LetterSet::EMPTY, self.alphabet(), &mut out);
        out
    }

    fn extend_cliques(&self, current: LetterSet, candidates: LetterSet, out: &mut Vec<LetterSet>) {
        let mut rest = candidates;
        while let Some(letter) = rest.min() {
            rest.remove(letter);
            let clique = current.with(letter);
            out.push(clique);
            self.extend_cliques(clique, rest.intersection(self.link(letter)), out);
        }
    }

    /// Size of the largest clique of Γ.
    pub fn clique_number(&self) -> usize {
        self.cliques().iter().map(|c| c.len()).max().unwrap_or(0)
    }

    /// Check the structural assumptions the horosphere constructions rely
    /// on: Γ is not a clique, has no induced square and no separating
    /// clique, and the ray letters are distinct and do not commute.
    ///
    /// Never called implicitly; violating graphs give unspecified results.
    pub fn check_preconditions(&self, ray: [Letter; 2]) -> Result<()> {
        let violated =
            |msg: String| -> Result<()> { Err(ConfigurationError::PreconditionViolated(msg).into()) };

        if ray[0] == ray[1] || self.commutes(ray[0], ray[1]) {
            return violated(format!(
                "ray letters {} and {} must be distinct and must not commute",
                self.label(ray[0]),
                self.label(ray[1])
            ));
        }
        if self.letters().all(|l| self.link(l).with(l) == self.alphabet()) {
            return violated("the defining graph is a clique".to_string());
        }
        if let Some([a, b, c, d]) = self.induced_square() {
            return violated(format!(
                "induced square {} {} {} {}",
                self.label(a),
                self.label(b),
                self.label(c),
                self.label(d)
            ));
        }
        // only non-empty cliques count, so a disconnected Γ on two letters
        // passes
        for clique in self.cliques() {
            let rest = self.alphabet().difference(clique);
            if self.components(rest) > 1 {
                let names: Vec<&str> = clique.iter().map(|l| self.label(l)).collect();
                return violated(format!("separating clique {{{}}}", names.join(", ")));
            }
        }
        Ok(())
    }

    fn induced_square(&self) -> Option<[Letter; 4]> {
        for a in self.letters() {
            for c in self.letters().filter(|c| *c > a && !self.commutes(a, *c)) {
                let common = self.link(a).intersection(self.link(c));
                for b in common.iter() {
                    let far = common.difference(self.link(b)).difference(LetterSet::singleton(b));
                    if let Some(d) = far.iter().find(|d| *d > b) {
                        return Some([a, b, c, d]);
                    }
                }
            }
        }
        None
    }

    /// Number of connected components of the subgraph induced on `vertices`.
    fn components(&self, vertices: LetterSet) -> usize {
        let mut unseen = vertices;
        let mut count = 0;
        while let Some(start) = unseen.min() {
            count += 1;
            let mut frontier = LetterSet::singleton(start);
            unseen.remove(start);
            while let Some(letter) = frontier.min() {
                frontier.remove(letter);
                let next = self.link(letter).intersection(unseen);
                unseen = unseen.difference(next);
                frontier = frontier.union(next);
            }
        }
        count
    }
}

impl fmt::Display for Presentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, label) in self.labels.iter().enumerate() {
            let partners: Vec<&str> = self.links[i].iter().map(|l| self.label(l)).collect();
            writeln!(f, "{label}: {}", partners.join(" "))?;
        }
        Ok(())
    }
}
