/// Data retrieval from external sources.
///
/// Submodules:
/// - `vpts`     - object-store URL construction, HTTP fetch, CSV validation.
/// - `baseline` - prior-year fetches with per-year failure isolation.
/// - `fixtures` - (test only) representative vpts CSV bodies.

pub mod baseline;
pub mod vpts;

#[cfg(test)]
pub(crate) mod fixtures;
