//! Structural classification of a chain
//!
//! Every check here looks at connectivity only (`P[i][j] > 0`), except the
//! absorbing-state test which inspects the probability mass of each row.

use crate::chain::{ROW_SUM_TOLERANCE, State, StateId, TransitionMatrix};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Longest path explored when collecting return times
pub const MAX_RETURN_STEPS: usize = 20;

/// Distinct return times collected per state before giving up
pub const MAX_RETURN_SAMPLES: usize = 10;

/// Structural properties of a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainProperties {
    /// Irreducible and aperiodic
    pub is_ergodic: bool,
    pub is_irreducible: bool,
    pub is_aperiodic: bool,
    /// State ids grouped by communicating class
    pub communicating_classes: Vec<Vec<StateId>>,
    pub has_absorbing_states: bool,
    pub absorbing_states: Vec<StateId>,
}

impl ChainProperties {
    /// All-false properties of the empty chain
    pub fn empty() -> Self {
        Self {
            is_ergodic: false,
            is_irreducible: false,
            is_aperiodic: false,
            communicating_classes: Vec::new(),
            has_absorbing_states: false,
            absorbing_states: Vec::new(),
        }
    }
}

/// Direction in which edges are followed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Reverse,
}

/// Depth-first reachability from `start`. Returns states in discovery order.
fn reachable_from(matrix: &TransitionMatrix, start: usize, direction: Direction) -> Vec<usize> {
    let n = matrix.size();
    let mut seen = vec![false; n];
    let mut order = vec![start];
    let mut stack = vec![start];
    seen[start] = true;

    while let Some(current) = stack.pop() {
        for next in 0..n {
            let edge = match direction {
                Direction::Forward => matrix.has_edge(current, next),
                Direction::Reverse => matrix.has_edge(next, current),
            };
            if edge && !seen[next] {
                seen[next] = true;
                order.push(next);
                stack.push(next);
            }
        }
    }

    order
}

/// Every state reaches, and is reached from, state 0
pub fn is_irreducible(matrix: &TransitionMatrix) -> bool {
    let n = matrix.size();
    if n == 0 {
        return false;
    }

    if reachable_from(matrix, 0, Direction::Forward).len() != n {
        return false;
    }

    reachable_from(matrix, 0, Direction::Reverse).len() == n
}

/// Partition state indices into communicating classes.
///
/// Classes come out in order of their first member; members are listed in
/// forward discovery order from that member.
pub fn find_communicating_classes(matrix: &TransitionMatrix) -> Vec<Vec<usize>> {
    let n = matrix.size();
    let mut classified = vec![false; n];
    let mut classes = Vec::new();

    for i in 0..n {
        if classified[i] {
            continue;
        }

        let forward = reachable_from(matrix, i, Direction::Forward);
        let mut backward = vec![false; n];
        for s in reachable_from(matrix, i, Direction::Reverse) {
            backward[s] = true;
        }

        let class: Vec<usize> = forward.into_iter().filter(|&s| backward[s]).collect();
        for &s in &class {
            classified[s] = true;
        }
        classes.push(class);
    }

    classes
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Return times to `state` observed by a breadth-first walk of at most
/// [`MAX_RETURN_STEPS`] steps, stopping after [`MAX_RETURN_SAMPLES`] distinct values.
fn return_times(matrix: &TransitionMatrix, state: usize) -> Vec<usize> {
    let n = matrix.size();
    let mut returns: Vec<usize> = Vec::new();
    let mut visited: HashSet<(usize, usize)> = HashSet::new();
    let mut queue = VecDeque::from([(state, 0usize)]);

    while returns.len() < MAX_RETURN_SAMPLES {
        let Some((current, steps)) = queue.pop_front() else {
            break;
        };
        if !visited.insert((current, steps)) {
            continue;
        }

        if current == state && steps > 0 && !returns.contains(&steps) {
            returns.push(steps);
        }

        if steps < MAX_RETURN_STEPS {
            for next in 0..n {
                if matrix.has_edge(current, next) {
                    queue.push_back((next, steps + 1));
                }
            }
        }
    }

    returns
}

/// Bounded aperiodicity check.
///
/// This is an approximation: return paths longer than [`MAX_RETURN_STEPS`]
/// are never seen, so a state whose short returns share a common divisor is
/// reported periodic even if a longer return would break the pattern. States
/// without any observed return impose no constraint.
pub fn is_aperiodic(matrix: &TransitionMatrix) -> bool {
    let n = matrix.size();
    if n == 0 {
        return false;
    }

    for i in 0..n {
        let returns = return_times(matrix, i);
        if let Some(&first) = returns.first() {
            let period = returns.iter().fold(first, |acc, &s| gcd(acc, s));
            if period != 1 {
                tracing::debug!("State index {} has period {}", i, period);
                return false;
            }
        }
    }

    true
}

/// Ids of states whose whole row is a self-loop of mass 1
pub fn find_absorbing_states(matrix: &TransitionMatrix, states: &[State]) -> Vec<StateId> {
    (0..matrix.size())
        .filter(|&i| {
            (matrix.get(i, i) - 1.0).abs() < ROW_SUM_TOLERANCE
                && (matrix.row_sum(i) - 1.0).abs() < ROW_SUM_TOLERANCE
        })
        .map(|i| states[i].id.clone())
        .collect()
}

/// Run every structural check and map classes back to state ids
pub fn classify(matrix: &TransitionMatrix, states: &[State]) -> ChainProperties {
    let is_irreducible = is_irreducible(matrix);
    let is_aperiodic = is_aperiodic(matrix);
    let communicating_classes = find_communicating_classes(matrix)
        .into_iter()
        .map(|class| class.into_iter().map(|i| states[i].id.clone()).collect())
        .collect();
    let absorbing_states = find_absorbing_states(matrix, states);

    ChainProperties {
        is_ergodic: is_irreducible && is_aperiodic,
        is_irreducible,
        is_aperiodic,
        communicating_classes,
        has_absorbing_states: !absorbing_states.is_empty(),
        absorbing_states,
    }
}
