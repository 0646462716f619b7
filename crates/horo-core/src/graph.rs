//! Horosphere graphs: vertex and edge sets of one level, with a labelled
//! copy for export.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::presentation::Presentation;
use crate::word::Word;

/// An unordered pair of distinct vertices, stored smaller-first in
/// ShortLex order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge(Word, Word);

impl Edge {
    pub fn new(a: Word, b: Word) -> Self {
        debug_assert!(a != b, "self-loops are not edges");
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    pub fn endpoints(&self) -> (&Word, &Word) {
        (&self.0, &self.1)
    }

    pub fn contains(&self, word: &Word) -> bool {
        &self.0 == word || &self.1 == word
    }
}

/// Vertex and edge sets of one horosphere, built fresh per request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HorosphereGraph {
    vertices: BTreeSet<Word>,
    edges: BTreeSet<Edge>,
}

impl HorosphereGraph {
    pub fn new(vertices: BTreeSet<Word>, edges: BTreeSet<Edge>) -> Self {
        debug_assert!(edges
            .iter()
            .all(|e| vertices.contains(&e.0) && vertices.contains(&e.1)));
        Self { vertices, edges }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &BTreeSet<Word> {
        &self.vertices
    }

    pub fn edges(&self) -> &BTreeSet<Edge> {
        &self.edges
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertices that touch at least one edge.
    pub fn covered_vertices(&self) -> BTreeSet<Word> {
        self.edges
            .iter()
            .flat_map(|e| [e.0.clone(), e.1.clone()])
            .collect()
    }

    /// Every vertex mapped to its neighbor set. Isolated vertices map to
    /// an empty set.
    pub fn adjacency(&self) -> BTreeMap<Word, BTreeSet<Word>> {
        let mut map: BTreeMap<Word, BTreeSet<Word>> = self
            .vertices
            .iter()
            .map(|v| (v.clone(), BTreeSet::new()))
            .collect();
        for Edge(a, b) in &self.edges {
            map.entry(a.clone()).or_default().insert(b.clone());
            map.entry(b.clone()).or_default().insert(a.clone());
        }
        map
    }

    pub fn degree(&self, vertex: &Word) -> usize {
        self.edges.iter().filter(|e| e.contains(vertex)).count()
    }

    pub fn max_degree(&self) -> usize {
        self.adjacency().values().map(BTreeSet::len).max().unwrap_or(0)
    }

    /// Copy of the graph with words rendered as label strings, for handing
    /// to an external graph tool.
    pub fn labelled(&self, presentation: &Presentation) -> LabelledGraph {
        LabelledGraph {
            vertices: self.vertices.iter().map(|v| v.render(presentation)).collect(),
            edges: self
                .edges
                .iter()
                .map(|Edge(a, b)| [a.render(presentation), b.render(presentation)])
                .collect(),
        }
    }
}

/// Serializable form of a [`HorosphereGraph`]. The identity renders as the
/// empty string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelledGraph {
    pub vertices: Vec<String>,
    pub edges: Vec<[String; 2]>,
}
