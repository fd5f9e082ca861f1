//! Reference solvers and custom assertions

use super::builders::GraphProgram;
use std::collections::BTreeSet;

/// Naive chaotic-iteration fixpoint over the part reachable from `roots`
///
/// `tokens[v] = filter_v(seeds[v] ∪ ⋃ tokens[u] for reachable u -> v)`
pub fn reference_fixpoint(program: &GraphProgram, roots: &[u32]) -> Vec<Vec<u32>> {
    let n = program.node_count as usize;

    let mut reachable = vec![false; n];
    let mut stack: Vec<u32> = roots.to_vec();
    while let Some(v) = stack.pop() {
        if reachable[v as usize] {
            continue;
        }
        reachable[v as usize] = true;
        stack.extend(program.successors(v));
    }

    let mut tokens: Vec<BTreeSet<u32>> = vec![BTreeSet::new(); n];
    loop {
        let mut changed = false;
        for v in 0..n {
            if !reachable[v] {
                continue;
            }
            let mut next: BTreeSet<u32> = program
                .seeds
                .get(&(v as u32))
                .into_iter()
                .flatten()
                .copied()
                .collect();
            for &(from, to) in &program.edges {
                if to as usize == v && reachable[from as usize] {
                    next.extend(tokens[from as usize].iter().copied());
                }
            }
            if let Some(&modulus) = program.filters.get(&(v as u32)) {
                next.retain(|t| t % modulus != 0);
            }
            if next != tokens[v] {
                tokens[v] = next;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    tokens.into_iter().map(|set| set.into_iter().collect()).collect()
}

/// Assert that every token set in `later` contains the matching one in `earlier`
pub fn assert_monotone(earlier: &[Vec<u32>], later: &[Vec<u32>]) {
    assert_eq!(earlier.len(), later.len());
    for (node, (before, after)) in earlier.iter().zip(later).enumerate() {
        let after: BTreeSet<u32> = after.iter().copied().collect();
        for token in before {
            assert!(
                after.contains(token),
                "node {} lost token {}: {:?} -> {:?}",
                node,
                token,
                before,
                after
            );
        }
    }
}
