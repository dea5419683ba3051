use std::fmt;

use crate::Disk;

/// One of the three pegs of the puzzle.
///
/// Invariant: pegs are only ever addressed through this enum, never through
/// raw indices or string labels.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum Peg {
    Source,
    Staging,
    Destination,
}

impl Peg {
    pub const fn index(self) -> usize {
        match self {
            Peg::Source => 0,
            Peg::Staging => 1,
            Peg::Destination => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Peg::Source => "source",
            Peg::Staging => "staging",
            Peg::Destination => "destination",
        }
    }

    pub const fn all() -> [Peg; 3] {
        [Peg::Source, Peg::Staging, Peg::Destination]
    }
}

impl fmt::Display for Peg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Move the top disk of `from` onto `to`.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct Action {
    pub from: Peg,
    pub to: Peg,
}

impl Action {
    /// All ordered pairs of distinct pegs.
    pub fn all() -> [Action; 6] {
        let mut v = Vec::with_capacity(6);

        for from in Peg::all() {
            for to in Peg::all() {
                if from != to {
                    v.push(Action { from, to });
                }
            }
        }

        v.try_into().expect("should find exactly 6 ordered peg pairs")
    }
}

/// A single applied move: the action together with the rank of the disk that
/// was moved. These make up the solution trace.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct Move {
    pub action: Action,
    pub disk: Disk,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mover disco {} de {} para {}",
            self.disk, self.action.from, self.action.to
        )
    }
}
