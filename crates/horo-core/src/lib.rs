//! Horosphere engine for hyperbolic right-angled Coxeter groups.
//!
//! Given a defining graph Γ (generators are vertices, edges are
//! commutation relations) and a basepoint ray γ alternating two
//! non-commuting generators, enumerates group elements by ShortLex normal
//! form, buckets them by Busemann value relative to γ, and joins points of
//! one level under either the Rips rule (word distance exactly 2) or the
//! divergence rule (geodesic rays leaving both points stay close).
//!
//! Zero I/O. Pure computation with no opinions about where defining data
//! comes from or where graphs go.

pub mod automaton;
pub mod constants;
pub mod divergence;
pub mod edge_checker;
pub mod enumerate;
pub mod error;
pub mod graph;
pub mod horocyclic;
pub mod horosphere;
pub mod normal_form;
pub mod presentation;
pub mod ray;
pub mod rips;
pub mod word;

pub use automaton::{Automaton, StateId};
pub use constants::{BUSEMANN_LOOKAHEAD, MAX_GENERATORS, MIN_SUFFIX_LEVEL, RIPS_DISTANCE};
pub use divergence::DivergenceRule;
pub use edge_checker::{CheckerState, EdgeChecker, SubwordTags};
pub use enumerate::{Window, accepted_words, ball, busemann_buckets, sphere, suffix_window};
pub use error::{ConfigurationError, HoroError, Result};
pub use graph::{Edge, HorosphereGraph, LabelledGraph};
pub use horocyclic::{Form, HorocyclicMachine, HorocyclicWord, MachineState, horocyclic_words};
pub use horosphere::{EdgeRule, HorosphereGenerator, HorosphereRequest};
pub use normal_form::NormalForm;
pub use presentation::{Letter, LetterSet, Presentation};
pub use ray::Ray;
pub use rips::rips_edges;
pub use word::{Word, WordDisplay};
