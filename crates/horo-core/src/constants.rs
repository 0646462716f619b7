/// Largest alphabet a presentation may carry (letter sets are 64-bit masks)
pub const MAX_GENERATORS: usize = 64;

/// Ray prefix beyond |w| used by the bounded-limit Busemann evaluation.
/// Any k ≥ |w| + 1 already gives the limit; the extra step is slack.
pub const BUSEMANN_LOOKAHEAD: usize = 2;

/// Most negative level a suffix-window request may ask for. Points at
/// level B carry a ray prefix of length |s| − B.
pub const MIN_SUFFIX_LEVEL: i64 = -(1 << 16);

/// Length of the offset words tried by the Rips rule
pub const RIPS_DISTANCE: usize = 2;
