use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::presentation::{Letter, Presentation};

/// A canonical (ShortLex-minimal reduced) word, standing for one group
/// element. Clones share the letter buffer.
///
/// Ordering is ShortLex: shorter words first, equal lengths compared
/// letter by letter by rank.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Word(Arc<[Letter]>);

impl Word {
    pub fn identity() -> Self {
        Self(Arc::from(Vec::new()))
    }

    /// Wrap letters already known to be canonical.
    pub(crate) fn from_canonical(letters: Vec<Letter>) -> Self {
        Self(Arc::from(letters))
    }

    pub fn letters(&self) -> &[Letter] {
        &self.0
    }

    /// Word length, which is the distance from the identity.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_identity(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<Letter> {
        self.0.last().copied()
    }

    /// Display adapter rendering the word with the presentation's labels.
    /// The identity renders as `ε`.
    pub fn display<'a>(&'a self, presentation: &'a Presentation) -> WordDisplay<'a> {
        WordDisplay {
            word: self,
            presentation,
        }
    }

    /// Labels of the word, the empty string for the identity.
    pub fn render(&self, presentation: &Presentation) -> String {
        presentation.render(&self.0)
    }
}

impl Ord for Word {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Word {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indices: Vec<usize> = self.0.iter().map(|l| l.index()).collect();
        write!(f, "Word{indices:?}")
    }
}

pub struct WordDisplay<'a> {
    word: &'a Word,
    presentation: &'a Presentation,
}

impl fmt::Display for WordDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.word.is_identity() {
            f.write_str("ε")
        } else {
            f.write_str(&self.word.render(self.presentation))
        }
    }
}
