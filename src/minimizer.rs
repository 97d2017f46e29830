// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Minimization of deterministic finite-state automata
//!

use std::fmt::Display;

use log::trace;

use crate::partitions::Partition;

//
// The automaton is defined by
// - a finite set of state S = [0 .. N-1]
// - an alphabet A = [0 .. M-1]
// - a total transition function delta: S x A -> S
// - a set of final states F
//
// Moore's algorithm
// -----------------
// - start with two blocks: F and S - F
// - at each round, compute a signature for every state s:
//     sig(s) = (block(delta(s, 0)), ..., block(delta(s, M-1)))
//   where block() is the partition computed by the previous round.
// - split every block into classes of states with equal signatures
// - stop when a round doesn't split any block.
//
// Blocks are split by Partition::split_block_by_key, which is stable.
// The result only depends on the numbering of states and characters.
//

#[derive(Debug, Clone)]
pub struct Minimizer<D> {
    // Automaton description
    num_states: u32,
    alphabet_size: u32,
    delta: D,
    // Current partition
    partition: Partition,
    // Number of refinement rounds so far
    rounds: u32,
}

impl<D> Display for Minimizer<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Minimizer: {} states, {} chars, {} rounds",
            self.num_states, self.alphabet_size, self.rounds
        )?;
        write!(f, "{}", self.partition)
    }
}

impl<D> Minimizer<D>
where
    D: Fn(u32, u32) -> u32,
{
    pub fn new<F>(num_states: u32, alphabet_size: u32, delta: D, is_final: F) -> Self
    where
        F: Fn(u32) -> bool,
    {
        let mut partition = Partition::new(num_states);
        if num_states > 0 {
            partition.refine_block(0, &is_final);
        }
        Minimizer {
            num_states,
            alphabet_size,
            delta,
            partition,
            rounds: 0,
        }
    }

    //
    // One round of refinement
    // - return true if at least one block was split
    //
    fn refine_round(&mut self) -> bool {
        let previous = self.partition.block_ids();
        let delta = &self.delta;
        let alphabet_size = self.alphabet_size;
        let signature = |s: u32| -> Vec<u32> {
            (0..alphabet_size)
                .map(|c| previous[delta(s, c) as usize])
                .collect()
        };

        let mut changed = false;
        let num_blocks = self.partition.num_blocks();
        for b in 0..num_blocks {
            if self.partition.block_size(b) > 1 && self.partition.split_block_by_key(b, &signature) > 0 {
                changed = true;
            }
        }
        self.rounds += 1;
        trace!(
            "refinement round {}: {} blocks",
            self.rounds,
            self.partition.num_blocks()
        );
        changed
    }

    ///
    /// Refine the state partition until fix point
    /// - return the result (i.e., equivalence relation on states)
    ///
    pub fn refine(&mut self) -> &Partition {
        while self.partition.num_blocks() < self.num_states && self.refine_round() {}
        &self.partition
    }
}

#[cfg(test)]
mod test {
    use super::*;

    //
    // Automaton for (ab)* with a sink state, states 0 .. 5
    // - 0, 2, 4 are final and equivalent
    // - 1, 3 are equivalent
    // - 5 is the sink
    //
    fn delta(s: u32, c: u32) -> u32 {
        match (s, c) {
            (0, 0) => 1,
            (1, 1) => 2,
            (2, 0) => 3,
            (3, 1) => 4,
            (4, 0) => 1,
            _ => 5,
        }
    }

    fn is_final(s: u32) -> bool {
        s == 0 || s == 2 || s == 4
    }

    #[test]
    fn test_minimizer() {
        let mut minimizer = Minimizer::new(6, 2, delta, is_final);
        println!("{minimizer}");
        let p = minimizer.refine();
        println!("Result:\n{p}");
        assert_eq!(p.num_blocks(), 3);
        assert_eq!(p.block_id(0), p.block_id(2));
        assert_eq!(p.block_id(0), p.block_id(4));
        assert_eq!(p.block_id(1), p.block_id(3));
        assert_ne!(p.block_id(1), p.block_id(5));
        assert_ne!(p.block_id(0), p.block_id(1));
    }

    #[test]
    fn test_already_minimal() {
        // single state, all final
        let mut minimizer = Minimizer::new(1, 3, |_, _| 0, |_| true);
        let p = minimizer.refine();
        assert_eq!(p.num_blocks(), 1);
    }
}
