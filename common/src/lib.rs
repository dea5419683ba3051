pub mod peg;

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::FxHashSet;

pub use crate::peg::{Action, Move, Peg};

pub const NR_PEGS: usize = 3;

/// Upper bound on the disk count, from the two-bits-per-disk packing in
/// [`StateKey`].
pub const MAX_DISKS: u8 = 32;

/// Disk size rank. Higher means larger.
pub type Disk = u8;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("invalid number of disks: {0} (expected 1 to {MAX_DISKS})")]
    InvalidDiskCount(u8),
}

/// A full assignment of disks to pegs.
///
/// Each peg holds a stack of disk ranks, last element on top. States are
/// immutable values; applying an action produces a fresh copy.
///
/// Invariant: no disk ever rests on a smaller one. The initial state
/// satisfies this and every legal action preserves it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct State {
    pegs: [Vec<Disk>; NR_PEGS],
}

/// Canonical comparable key of a [`State`]: two bits per disk rank, holding
/// the index of the peg the disk sits on.
///
/// The stack order on a peg follows from which disks are on it, so for
/// states over the same disk set equal keys mean equal peg contents.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct StateKey(u64);

impl State {
    /// The starting configuration: all disks stacked on the source peg,
    /// largest at the bottom.
    pub fn initial(nr_disks: u8) -> State {
        let mut pegs: [Vec<Disk>; NR_PEGS] = Default::default();
        pegs[Peg::Source.index()] = (1..=nr_disks).rev().collect();
        State { pegs }
    }

    /// Build a state directly from three stacks, given bottom-to-top.
    ///
    /// Panics if a rank appears twice, is out of range, or rests on a
    /// smaller disk.
    pub fn from_stacks(pegs: [Vec<Disk>; NR_PEGS]) -> State {
        let mut seen = [false; MAX_DISKS as usize + 1];

        for stack in &pegs {
            for pair in stack.windows(2) {
                assert!(
                    pair[0] > pair[1],
                    "disk {} may not rest on disk {}",
                    pair[1],
                    pair[0]
                );
            }
            for &disk in stack {
                assert!(
                    disk >= 1 && disk <= MAX_DISKS,
                    "disk rank {disk} out of range"
                );
                assert!(!seen[disk as usize], "duplicate disk {disk}");
                seen[disk as usize] = true;
            }
        }

        State { pegs }
    }

    /// The stack of the given peg, bottom-to-top.
    pub fn stack(&self, peg: Peg) -> &[Disk] {
        &self.pegs[peg.index()]
    }

    pub fn top(&self, peg: Peg) -> Option<Disk> {
        self.stack(peg).last().copied()
    }

    /// Goal test: every disk has arrived on the destination peg.
    pub fn is_goal(&self, nr_disks: u8) -> bool {
        self.stack(Peg::Destination).len() == nr_disks as usize
    }

    /// Check the classical constraint for a single move: the donor peg must
    /// be non-empty, and its top disk must fit onto the receiving peg.
    pub fn can_move(&self, action: Action) -> bool {
        match (self.top(action.from), self.top(action.to)) {
            (Some(moved), Some(resident)) => moved < resident,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Apply a legal action, returning the successor state and the rank of
    /// the disk that was moved. The original state is left untouched.
    ///
    /// Panics if the action is illegal. Callers check [`State::can_move`]
    /// first; the solver only ever expands legal actions.
    pub fn apply(&self, action: Action) -> (State, Disk) {
        assert!(
            self.can_move(action),
            "illegal action: {} to {}",
            action.from,
            action.to
        );

        let mut next = self.clone();
        let disk = next.pegs[action.from.index()]
            .pop()
            .expect("donor peg was checked to be non-empty");
        next.pegs[action.to.index()].push(disk);

        (next, disk)
    }

    pub fn key(&self) -> StateKey {
        let mut packed = 0u64;
        for peg in Peg::all() {
            for &disk in self.stack(peg) {
                packed |= (peg.index() as u64) << (2 * (disk - 1));
            }
        }
        StateKey(packed)
    }
}

/// All actions that may be taken from the given state.
pub fn legal_actions(state: &State) -> impl Iterator<Item = Action> + '_ {
    Action::all()
        .into_iter()
        .filter(|&action| state.can_move(action))
}

/// Per-peg weights of the cost estimate. Passed explicitly so the heuristic
/// carries no ambient configuration.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Weights {
    pub source: u32,
    pub staging: u32,
    pub destination: u32,
}

impl Weights {
    pub fn for_peg(&self, peg: Peg) -> u32 {
        match peg {
            Peg::Source => self.source,
            Peg::Staging => self.staging,
            Peg::Destination => self.destination,
        }
    }
}

impl Default for Weights {
    /// Disks still on the source peg are penalized hardest, disks already
    /// on the destination not at all.
    fn default() -> Self {
        Weights {
            source: 4,
            staging: 2,
            destination: 0,
        }
    }
}

/// Estimated remaining cost: each disk contributes `(rank + 1)` times the
/// weight of the peg it sits on. Zero exactly on goal states.
///
/// Not proven admissible, so returned solutions are heuristically good
/// rather than certified shortest.
pub fn heuristic(state: &State, weights: &Weights) -> u32 {
    let mut total = 0;
    for peg in Peg::all() {
        let weight = weights.for_peg(peg);
        for &disk in state.stack(peg) {
            total += (disk as u32 + 1) * weight;
        }
    }
    total
}

#[derive(PartialEq, Eq, Debug)]
pub enum SolveResult {
    Solved(Vec<Move>),
    Exhausted,
    TimedOut,
}

/// Frontier entry. Ordered by estimated total cost, then path cost, then
/// insertion order, so that equal-cost ties break deterministically.
struct Node {
    cost: u32,
    path_cost: u32,
    seq: u64,
    state: State,
    path: Vec<Move>,
}

impl Node {
    fn rank(&self) -> (u32, u32, u64) {
        (self.cost, self.path_cost, self.seq)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.rank() == other.rank()
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, flip so the cheapest entry pops first
        other.rank().cmp(&self.rank())
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A Towers of Hanoi instance: disk count plus heuristic weights.
#[derive(Debug)]
pub struct Problem {
    nr_disks: u8,
    weights: Weights,
}

impl Problem {
    pub fn new(nr_disks: u8) -> Result<Problem, Error> {
        Self::with_weights(nr_disks, Weights::default())
    }

    pub fn with_weights(nr_disks: u8, weights: Weights) -> Result<Problem, Error> {
        if nr_disks == 0 || nr_disks > MAX_DISKS {
            return Err(Error::InvalidDiskCount(nr_disks));
        }

        Ok(Problem { nr_disks, weights })
    }

    pub fn nr_disks(&self) -> u8 {
        self.nr_disks
    }

    pub fn initial_state(&self) -> State {
        State::initial(self.nr_disks)
    }

    /// Run A* to completion.
    pub fn solve(&self) -> SolveResult {
        self.solve_bounded(u64::MAX)
    }

    /// Run A*, giving up with [`SolveResult::TimedOut`] once more than
    /// `max_expansions` states have been expanded.
    pub fn solve_bounded(&self, max_expansions: u64) -> SolveResult {
        let initial = self.initial_state();

        let mut frontier = BinaryHeap::new();
        let mut explored: FxHashSet<StateKey> = FxHashSet::default();
        let mut seq = 0u64;
        let mut expanded = 0u64;
        let mut skipped = 0u64;

        frontier.push(Node {
            cost: heuristic(&initial, &self.weights),
            path_cost: 0,
            seq,
            state: initial,
            path: Vec::new(),
        });

        while let Some(node) = frontier.pop() {
            if explored.contains(&node.state.key()) {
                // a cheaper copy of this state was already expanded
                skipped += 1;
                continue;
            }

            if node.state.is_goal(self.nr_disks) {
                log::info!(
                    "solved with {} moves. expanded {expanded} states. skipped {skipped}",
                    node.path.len()
                );
                return SolveResult::Solved(node.path);
            }

            if expanded >= max_expansions {
                log::warn!("giving up after {expanded} expansions");
                return SolveResult::TimedOut;
            }
            expanded += 1;

            explored.insert(node.state.key());

            for action in legal_actions(&node.state) {
                let (child, disk) = node.state.apply(action);
                if explored.contains(&child.key()) {
                    continue;
                }

                let path_cost = node.path_cost + 1;
                let mut path = node.path.clone();
                path.push(Move { action, disk });

                seq += 1;
                frontier.push(Node {
                    cost: path_cost + heuristic(&child, &self.weights),
                    path_cost,
                    seq,
                    state: child,
                    path,
                });
            }
        }

        log::warn!("frontier exhausted after {expanded} expansions");
        SolveResult::Exhausted
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::{prop_assert, proptest};
    use rand::{RngCore, SeedableRng};

    use super::*;

    /// Replay a move list from the initial state, checking legality and
    /// disk conservation at every step.
    fn replay(nr_disks: u8, moves: &[Move]) -> State {
        let mut state = State::initial(nr_disks);

        for mv in moves {
            assert!(state.can_move(mv.action), "illegal move in solution: {mv}");
            let (next, disk) = state.apply(mv.action);
            assert_eq!(disk, mv.disk);
            assert_conserved(&next, nr_disks);
            state = next;
        }

        state
    }

    fn assert_conserved(state: &State, nr_disks: u8) {
        let mut ranks: Vec<Disk> = Peg::all()
            .into_iter()
            .flat_map(|peg| state.stack(peg).iter().copied())
            .collect();
        ranks.sort_unstable();

        let expected: Vec<Disk> = (1..=nr_disks).collect();
        assert_eq!(ranks, expected);
    }

    #[test]
    fn test_initial_state() {
        let state = State::initial(3);

        assert_eq!(state.stack(Peg::Source), &[3, 2, 1]);
        assert!(state.stack(Peg::Staging).is_empty());
        assert!(state.stack(Peg::Destination).is_empty());
        assert_eq!(state.top(Peg::Source), Some(1));
        assert!(!state.is_goal(3));
    }

    #[test]
    fn test_initial_legal_actions() {
        let state = State::initial(3);
        let actions: Vec<Action> = legal_actions(&state).collect();

        assert_eq!(actions.len(), 2);
        assert!(actions.iter().all(|a| a.from == Peg::Source));
    }

    #[test]
    fn test_apply_moves_top_disk() {
        let state = State::initial(2);
        let (next, disk) = state.apply(Action {
            from: Peg::Source,
            to: Peg::Staging,
        });

        assert_eq!(disk, 1);
        assert_eq!(next.stack(Peg::Source), &[2]);
        assert_eq!(next.stack(Peg::Staging), &[1]);
        // the original is untouched
        assert_eq!(state.stack(Peg::Source), &[2, 1]);
    }

    #[test]
    #[should_panic(expected = "illegal action")]
    fn test_apply_rejects_illegal_action() {
        let state = State::initial(2);
        state.apply(Action {
            from: Peg::Staging,
            to: Peg::Destination,
        });
    }

    #[test]
    fn test_larger_disk_cannot_rest_on_smaller() {
        let state = State::from_stacks([vec![2], vec![1], vec![]]);

        assert!(!state.can_move(Action {
            from: Peg::Source,
            to: Peg::Staging,
        }));
        assert!(state.can_move(Action {
            from: Peg::Staging,
            to: Peg::Source,
        }));
    }

    #[test]
    fn test_heuristic_is_zero_on_goal() {
        let goal = State::from_stacks([vec![], vec![], vec![3, 2, 1]]);
        assert_eq!(heuristic(&goal, &Weights::default()), 0);
    }

    #[test]
    fn test_heuristic_on_initial_state() {
        // disks 1..=3 on source: (2 + 3 + 4) * 4
        let state = State::initial(3);
        assert_eq!(heuristic(&state, &Weights::default()), 36);
    }

    #[test]
    fn test_keys_identify_equal_contents() {
        let a = State::from_stacks([vec![3], vec![2], vec![1]]);
        let b = State::from_stacks([vec![3], vec![2], vec![1]]);
        let c = State::from_stacks([vec![3], vec![2, 1], vec![]]);

        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn test_keys_unique_over_all_three_disk_states() {
        let mut keys = HashSet::new();

        for assignment in 0..27u32 {
            let mut pegs: [Vec<Disk>; NR_PEGS] = Default::default();
            for disk in (1..=3u8).rev() {
                let peg = (assignment / 3u32.pow(u32::from(disk) - 1)) % 3;
                pegs[peg as usize].push(disk);
            }
            keys.insert(State::from_stacks(pegs).key());
        }

        assert_eq!(keys.len(), 27);
    }

    #[test]
    fn test_solve_one_disk() {
        let problem = Problem::new(1).unwrap();
        let SolveResult::Solved(moves) = problem.solve() else {
            panic!("one disk should be solvable");
        };

        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].disk, 1);
        assert_eq!(
            moves[0].action,
            Action {
                from: Peg::Source,
                to: Peg::Destination,
            }
        );
    }

    #[test]
    fn test_solve_two_disks_reaches_goal() {
        let problem = Problem::new(2).unwrap();
        let SolveResult::Solved(moves) = problem.solve() else {
            panic!("two disks should be solvable");
        };

        assert!(moves.len() >= 3);
        assert!(replay(2, &moves).is_goal(2));
    }

    #[test]
    fn test_solve_three_disks_reaches_goal() {
        let problem = Problem::new(3).unwrap();
        let SolveResult::Solved(moves) = problem.solve() else {
            panic!("three disks should be solvable");
        };

        assert!(moves.len() >= 7);
        assert!(replay(3, &moves).is_goal(3));

        if moves.len() != 7 {
            println!(
                "note: found {} moves, the classical optimum is 7",
                moves.len()
            );
        }
    }

    #[test]
    fn test_invalid_disk_counts_rejected() {
        assert_eq!(Problem::new(0).unwrap_err(), Error::InvalidDiskCount(0));
        assert_eq!(Problem::new(33).unwrap_err(), Error::InvalidDiskCount(33));
        assert!(Problem::new(MAX_DISKS).is_ok());
    }

    #[test]
    fn test_tiny_budget_times_out() {
        let problem = Problem::new(3).unwrap();
        assert!(matches!(problem.solve_bounded(1), SolveResult::TimedOut));
    }

    #[test]
    fn test_random_walks_stay_valid() {
        let mut rng = rand::rngs::StdRng::from_seed([7; 32]);
        let mut state = State::initial(4);

        for _ in 0..500 {
            let actions: Vec<Action> = legal_actions(&state).collect();
            assert!(!actions.is_empty());

            let action = actions[rng.next_u64() as usize % actions.len()];
            let (next, _) = state.apply(action);
            assert_conserved(&next, 4);
            state = next;
        }
    }

    proptest! {
        #[test]
        fn test_solver_returns_valid_sequence_of_moves(nr_disks in 1u8..=5) {
            let problem = Problem::new(nr_disks).unwrap();
            let SolveResult::Solved(moves) = problem.solve() else {
                panic!("hanoi is always solvable");
            };

            prop_assert!(!moves.is_empty());
            prop_assert!(replay(nr_disks, &moves).is_goal(nr_disks));
        }
    }
}
