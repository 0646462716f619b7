//! Rips adjacency: two horosphere points are joined when their word
//! distance is exactly 2.

use std::collections::BTreeSet;

use rayon::prelude::*;

use crate::constants::RIPS_DISTANCE;
use crate::enumerate::sphere;
use crate::graph::Edge;
use crate::normal_form::NormalForm;
use crate::word::Word;

/// Edges between members of `vertices` at distance exactly 2.
///
/// v is at distance 2 from u exactly when v = u·t for a normal form t of
/// length 2, so each vertex tries the finitely many such t and looks the
/// product up. Vertices are handled in parallel.
pub fn rips_edges(nf: &NormalForm, vertices: &BTreeSet<Word>) -> BTreeSet<Edge> {
    let offsets = sphere(nf, RIPS_DISTANCE);
    let offsets = &offsets;
    vertices
        .par_iter()
        .flat_map_iter(move |u| {
            offsets.iter().filter_map(move |t| {
                let v = nf.mul(u, t);
                (v > *u && vertices.contains(&v)).then(|| Edge::new(u.clone(), v))
            })
        })
        .collect()
}
