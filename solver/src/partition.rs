use std::collections::{BTreeSet, VecDeque};

use crate::board::Point;
use crate::constraint::Constraint;

/// A maximal group of constraints connected through shared frontier cells,
/// together with the union of the cells they range over.
///
/// Components are independent of each other except through the global mine
/// budget, which is exactly what lets the probability engine enumerate them
/// separately. They are rebuilt from scratch every solving cycle.
#[derive(Debug, Clone)]
pub struct Component {
    pub constraints: Vec<Constraint>,
    /// Ascending coordinate order; this is the enumeration order too.
    pub cells: Vec<Point>,
}

/// Split the constraint set into independent components via BFS over the
/// "shares a frontier cell" graph. Constraints left empty by the
/// deterministic engine never reach this point.
pub fn partition(constraints: &[Constraint]) -> Vec<Component> {
    let mut visited = vec![false; constraints.len()];
    let mut components = Vec::new();

    for start in 0..constraints.len() {
        if visited[start] || constraints[start].cells.is_empty() {
            continue;
        }

        let mut member_indices = Vec::new();
        let mut cells: BTreeSet<Point> = BTreeSet::new();
        let mut queue = VecDeque::from([start]);
        visited[start] = true;

        while let Some(i) = queue.pop_front() {
            member_indices.push(i);
            cells.extend(constraints[i].cells.iter().copied());

            for (j, other) in constraints.iter().enumerate() {
                if !visited[j] && !constraints[i].cells.is_disjoint(&other.cells) {
                    visited[j] = true;
                    queue.push_back(j);
                }
            }
        }

        member_indices.sort_unstable();
        components.push(Component {
            constraints: member_indices
                .into_iter()
                .map(|i| constraints[i].clone())
                .collect(),
            cells: cells.into_iter().collect(),
        });
    }

    components
}
