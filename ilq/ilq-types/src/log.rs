//! Append-only record of solver iterates.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{OperatingPoint, Strategy};

/// One logged solver iterate: the operating point, every player's strategy,
/// and the per-player total trajectory costs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverIterate {
    /// The nominal trajectory produced by this iteration's rollout.
    pub operating_point: OperatingPoint,
    /// The (modified) strategies that will seed the next rollout.
    pub strategies: Vec<Strategy>,
    /// Total trajectory cost per player along the operating point.
    pub player_costs: Vec<f64>,
}

/// Append-only log of solver iterates, bounded by the iteration cap.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverLog {
    iterates: Vec<SolverIterate>,
}

impl SolverLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one iterate.
    pub fn add_iterate(
        &mut self,
        operating_point: OperatingPoint,
        strategies: Vec<Strategy>,
        player_costs: Vec<f64>,
    ) {
        self.iterates.push(SolverIterate {
            operating_point,
            strategies,
            player_costs,
        });
    }

    /// Number of logged iterates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iterates.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iterates.is_empty()
    }

    /// The most recent iterate, if any.
    #[must_use]
    pub fn last(&self) -> Option<&SolverIterate> {
        self.iterates.last()
    }

    /// All logged iterates in order.
    #[must_use]
    pub fn iterates(&self) -> &[SolverIterate] {
        &self.iterates
    }

    /// Persist the log under `dir`.
    ///
    /// Each iterate is written to a zero-padded subdirectory containing
    /// `xs.txt` (one row per time step, the joint state as
    /// whitespace-separated floats) and `costs.txt` (one row of per-player
    /// totals).
    ///
    /// # Errors
    ///
    /// Returns any filesystem error encountered while creating directories
    /// or writing files.
    pub fn save(&self, dir: &Path) -> std::io::Result<()> {
        for (index, iterate) in self.iterates.iter().enumerate() {
            let iterate_dir = dir.join(format!("{index:04}"));
            fs::create_dir_all(&iterate_dir)?;

            let mut xs = String::new();
            for x in &iterate.operating_point.xs {
                for (d, value) in x.iter().enumerate() {
                    if d > 0 {
                        xs.push(' ');
                    }
                    let _ = write!(xs, "{value}");
                }
                xs.push('\n');
            }
            fs::write(iterate_dir.join("xs.txt"), xs)?;

            let mut costs = String::new();
            for (i, cost) in iterate.player_costs.iter().enumerate() {
                if i > 0 {
                    costs.push(' ');
                }
                let _ = write!(costs, "{cost}");
            }
            costs.push('\n');
            fs::write(iterate_dir.join("costs.txt"), costs)?;
        }
        Ok(())
    }
}
