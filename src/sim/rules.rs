use std::fmt;
use std::str::FromStr;

use crate::error::SwarmError;

/// Pure mapping from (own state, neighbor states) to the next state.
///
/// Implementations must be deterministic and must not depend on agent
/// identity or anything outside the two arguments. Any closure with the
/// matching signature qualifies, so callers can plug in their own rules.
pub trait UpdateRule {
    fn next_state(&self, current: f64, neighbors: &[f64]) -> f64;
}

impl<F> UpdateRule for F
where
    F: Fn(f64, &[f64]) -> f64,
{
    fn next_state(&self, current: f64, neighbors: &[f64]) -> f64 {
        self(current, neighbors)
    }
}

/// The rules shipped with the simulator, selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinRule {
    Average,
    Majority,
}

impl BuiltinRule {
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinRule::Average => "average",
            BuiltinRule::Majority => "majority",
        }
    }

    /// Resolve the variant to its update function. The returned pointer
    /// satisfies [`UpdateRule`] like any other callable.
    pub fn as_fn(&self) -> fn(f64, &[f64]) -> f64 {
        match self {
            BuiltinRule::Average => average,
            BuiltinRule::Majority => majority,
        }
    }
}

impl fmt::Display for BuiltinRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BuiltinRule {
    type Err = SwarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "average" => Ok(BuiltinRule::Average),
            "majority" => Ok(BuiltinRule::Majority),
            other => Err(SwarmError::InvalidConfiguration(format!(
                "unknown rule '{}', expected 'average' or 'majority'",
                other
            ))),
        }
    }
}

/// Equal-weight mean of the agent's own state and its neighbors' states.
/// An agent with no neighbors never moves.
pub fn average(current: f64, neighbors: &[f64]) -> f64 {
    if neighbors.is_empty() {
        return current;
    }
    let sum = current + neighbors.iter().sum::<f64>();
    sum / (neighbors.len() + 1) as f64
}

/// Binary vote over states in {0, 1}. States are rounded first so the
/// rule tolerates near-binary floating noise; ties go to 1.
pub fn majority(current: f64, neighbors: &[f64]) -> f64 {
    let self_vote = current.round() as i64;
    if neighbors.is_empty() {
        return self_vote as f64;
    }

    let ones: i64 = neighbors.iter().map(|v| v.round() as i64).sum::<i64>() + self_vote;
    let zeros = neighbors.len() as i64 + 1 - ones;

    if ones >= zeros {
        1.0
    } else {
        0.0
    }
}
