use std::collections::{BTreeMap, BTreeSet};

use crate::board::Point;
use crate::error::SolverError;
use crate::partition::Component;

/// Per-cell mine probabilities for every hidden cell, frontier and interior
/// alike. Invoked only when the deterministic engine found nothing certain.
///
/// Each component is enumerated independently; the per-mine-count
/// configuration counts are then weighted against the global budget by
/// counting the ways the leftover mines fit into the unconstrained pool
/// (interior-unknown cells plus the cells of any component whose enumeration
/// hit the configuration cap).
pub fn estimate(
    components: &[Component],
    mines_remaining: usize,
    interior: &BTreeSet<Point>,
    max_configurations: usize,
) -> Result<BTreeMap<Point, f64>, SolverError> {
    let mut completed: Vec<Enumeration> = Vec::new();
    let mut pooled: BTreeSet<Point> = interior.clone();

    for component in components {
        match enumerate_component(component, mines_remaining, max_configurations)? {
            Outcome::Complete(enumeration) => completed.push(enumeration),
            Outcome::Capped => {
                // Non-fatal: the component is excluded from enumeration and
                // its cells estimated from the global budget instead.
                tracing::warn!(
                    cells = component.cells.len(),
                    cap = max_configurations,
                    "enumeration cap exceeded, using uniform fallback for component"
                );
                pooled.extend(component.cells.iter().copied());
            }
        }
    }

    let pool_size = pooled.len();
    let budget = mines_remaining;

    let dists: Vec<Vec<f64>> = completed
        .iter()
        .map(|e| e.configs_by_k.iter().map(|&n| n as f64).collect())
        .collect();
    let ways_all = dists.iter().fold(vec![1.0], |acc, d| convolve(&acc, d));

    // Total weight over every globally consistent placement, and the
    // expected number of mines left for the pool.
    let mut total_weight = 0.0;
    let mut pooled_mines = 0.0;
    for (frontier_mines, &ways) in ways_all.iter().enumerate() {
        if ways == 0.0 {
            continue;
        }
        let Some(leftover) = budget.checked_sub(frontier_mines) else {
            continue;
        };
        let weight = ways * binomial(pool_size, leftover);
        total_weight += weight;
        pooled_mines += weight * leftover as f64;
    }
    if total_weight == 0.0 {
        return Err(SolverError::inconsistency(
            "no mine configuration fits the remaining budget",
        ));
    }

    let mut probabilities = BTreeMap::new();

    for (i, enumeration) in completed.iter().enumerate() {
        let ways_other = dists
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .fold(vec![1.0], |acc, (_, d)| convolve(&acc, d));

        // weight_by_k[k]: ways to complete a k-mine configuration of this
        // component across the other components and the pool.
        let weight_by_k: Vec<f64> = (0..enumeration.configs_by_k.len())
            .map(|k| {
                ways_other
                    .iter()
                    .enumerate()
                    .filter(|&(_, &ways)| ways != 0.0)
                    .filter_map(|(s, &ways)| {
                        let leftover = budget.checked_sub(k + s)?;
                        Some(ways * binomial(pool_size, leftover))
                    })
                    .sum()
            })
            .collect();

        let denom: f64 = enumeration
            .configs_by_k
            .iter()
            .zip(&weight_by_k)
            .map(|(&n, &w)| n as f64 * w)
            .sum();
        if denom == 0.0 {
            return Err(SolverError::inconsistency(
                "component has no configuration consistent with the global budget",
            ));
        }

        for (cell_index, &cell) in enumeration.cells.iter().enumerate() {
            let numer: f64 = enumeration.tallies[cell_index]
                .iter()
                .zip(&weight_by_k)
                .map(|(&n, &w)| n as f64 * w)
                .sum();
            probabilities.insert(cell, numer / denom);
        }
    }

    if pool_size > 0 {
        let pool_probability = pooled_mines / (pool_size as f64 * total_weight);
        for &cell in &pooled {
            probabilities.insert(cell, pool_probability);
        }
    }

    Ok(probabilities)
}

/// A completed component enumeration, bucketed by mine count so it can be
/// weighted against the global budget afterwards.
struct Enumeration {
    cells: Vec<Point>,
    /// `configs_by_k[k]`: valid configurations placing exactly k mines.
    configs_by_k: Vec<u64>,
    /// `tallies[cell][k]`: k-mine configurations where `cells[cell]` is a mine.
    tallies: Vec<Vec<u64>>,
}

enum Outcome {
    Complete(Enumeration),
    Capped,
}

/// Backtracking enumeration over the component's cells in ascending order.
///
/// A partial assignment is pruned as soon as any constraint can no longer be
/// satisfied: either it already holds too many mines, or its unassigned
/// cells cannot supply the rest. Zero valid configurations means the
/// snapshot itself is contradictory.
fn enumerate_component(
    component: &Component,
    mines_remaining: usize,
    max_configurations: usize,
) -> Result<Outcome, SolverError> {
    let cells = &component.cells;
    let index_of: BTreeMap<Point, usize> =
        cells.iter().enumerate().map(|(i, &p)| (p, i)).collect();

    let required: Vec<usize> = component.constraints.iter().map(|c| c.required).collect();
    let mut touching: Vec<Vec<usize>> = vec![Vec::new(); cells.len()];
    for (ci, constraint) in component.constraints.iter().enumerate() {
        for cell in &constraint.cells {
            touching[index_of[cell]].push(ci);
        }
    }

    let mut search = Search {
        required,
        touching,
        assigned: vec![0; component.constraints.len()],
        unassigned: component
            .constraints
            .iter()
            .map(|c| c.cells.len())
            .collect(),
        assignment: vec![false; cells.len()],
        budget: mines_remaining,
        cap: max_configurations,
        found: 0,
        configs_by_k: vec![0; cells.len() + 1],
        tallies: vec![vec![0; cells.len() + 1]; cells.len()],
    };

    if !search.run(0, 0) {
        return Ok(Outcome::Capped);
    }
    if search.found == 0 {
        return Err(SolverError::inconsistency(
            "a constraint component admits no valid mine configuration",
        ));
    }

    Ok(Outcome::Complete(Enumeration {
        cells: cells.clone(),
        configs_by_k: search.configs_by_k,
        tallies: search.tallies,
    }))
}

struct Search {
    required: Vec<usize>,
    /// cell index -> indices of constraints referencing it.
    touching: Vec<Vec<usize>>,
    /// Per constraint: mines assigned so far / cells not yet assigned.
    assigned: Vec<usize>,
    unassigned: Vec<usize>,
    assignment: Vec<bool>,
    budget: usize,
    cap: usize,
    found: u64,
    configs_by_k: Vec<u64>,
    tallies: Vec<Vec<u64>>,
}

impl Search {
    /// Returns false when the valid-configuration cap was exceeded.
    fn run(&mut self, depth: usize, mines_placed: usize) -> bool {
        if depth == self.assignment.len() {
            self.found += 1;
            if self.found > self.cap as u64 {
                return false;
            }
            self.configs_by_k[mines_placed] += 1;
            for (i, &is_mine) in self.assignment.iter().enumerate() {
                if is_mine {
                    self.tallies[i][mines_placed] += 1;
                }
            }
            return true;
        }

        for is_mine in [false, true] {
            if is_mine && mines_placed == self.budget {
                continue;
            }
            if !self.place(depth, is_mine) {
                self.unplace(depth, is_mine);
                continue;
            }
            self.assignment[depth] = is_mine;
            let ok = self.run(depth + 1, mines_placed + usize::from(is_mine));
            self.assignment[depth] = false;
            self.unplace(depth, is_mine);
            if !ok {
                return false;
            }
        }
        true
    }

    /// Commit one cell assignment; returns false if any touched constraint
    /// becomes unsatisfiable.
    fn place(&mut self, cell: usize, is_mine: bool) -> bool {
        let mut feasible = true;
        for &ci in &self.touching[cell] {
            self.unassigned[ci] -= 1;
            if is_mine {
                self.assigned[ci] += 1;
            }
            if self.assigned[ci] > self.required[ci]
                || self.assigned[ci] + self.unassigned[ci] < self.required[ci]
            {
                feasible = false;
            }
        }
        feasible
    }

    fn unplace(&mut self, cell: usize, is_mine: bool) {
        for &ci in &self.touching[cell] {
            self.unassigned[ci] += 1;
            if is_mine {
                self.assigned[ci] -= 1;
            }
        }
    }
}

/// n choose k in f64, zero when k > n. The pool can hold hundreds of cells,
/// so the exact integer value overflows u64 long before the ratio stops
/// being meaningful.
fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut result = 1.0;
    for i in 0..k {
        result = result * (n - i) as f64 / (i + 1) as f64;
    }
    result
}

/// Polynomial product of two mine-count distributions.
fn convolve(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}
