use anyhow::Result;
use log::{debug, info, trace, warn};
use std::path::{Path, PathBuf};

use crate::{
    cone::cone,
    expression::ExprId,
    io::Scratch,
    printer::BtorPrinter,
    runner::{Oracle, Status},
    table::ExprTable,
};

/// Next block size of the search. Small intervals step down directly
/// instead of halving.
///
/// ```
/// use deltabtor_rust::next_interval;
/// assert_eq!(next_interval(99), 50);
/// assert_eq!(next_interval(5), 3);
/// assert_eq!(next_interval(1), 0);
/// ```
pub fn next_interval(interval: usize) -> usize {
    match interval {
        4..=7 => 3,
        3 => 2,
        2 => 1,
        1 => 0,
        _ => interval.div_ceil(2),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReduceOptions {
    /// Where to create the scratch directory. Defaults to the system
    /// temporary directory.
    pub scratch_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReductionStats {
    /// Oracle status of the unmodified program.
    pub golden: Status,
    /// Full sweeps over the table, across all intervals.
    pub rounds: usize,
    /// Oracle invocations, including the baseline run.
    pub runs: usize,
    /// Block trials that were accepted.
    pub accepted: usize,
    /// Expressions replaced by constants in accepted trials.
    pub fixed: usize,
    /// Number of expressions in the final output.
    pub final_size: u32,
}

pub(crate) struct Reducer<'a, O> {
    table: &'a mut ExprTable,
    oracle: O,
    scratch: Scratch,
    output: &'a Path,
    rounds: usize,
    runs: usize,
    accepted: usize,
    fixed: usize,
    best_size: u32,
}

/// Renders the current configuration: cone, print, clear.
pub(crate) fn render(table: &mut ExprTable) -> Result<(Vec<u8>, u32)> {
    let size = cone(table)?;
    let source = BtorPrinter::new(table).print();
    table.clear();
    Ok((source, size))
}

impl<'a, O: Oracle> Reducer<'a, O> {
    pub(crate) fn new(
        table: &'a mut ExprTable,
        oracle: O,
        output: &'a Path,
        options: &ReduceOptions,
    ) -> Result<Self> {
        let scratch = Scratch::new(options.scratch_dir.as_deref())?;
        Ok(Self {
            table,
            oracle,
            scratch,
            output,
            rounds: 0,
            runs: 0,
            accepted: 0,
            fixed: 0,
            best_size: 0,
        })
    }

    // Writes the current configuration to the scratch file.
    fn write_candidate(&mut self) -> Result<u32> {
        let (source, size) = render(self.table)?;
        self.scratch.write(&source)?;
        Ok(size)
    }

    fn baseline(&mut self) -> Result<Status> {
        self.best_size = self.write_candidate()?;
        self.runs += 1;
        let golden = self.oracle.check(self.scratch.path())?;
        info!("golden {}", golden);
        self.scratch.promote(self.output)?;
        Ok(golden)
    }

    fn candidates(&self, block: &[ExprId]) -> Vec<ExprId> {
        block
            .iter()
            .copied()
            .filter(|&id| match self.table.get(id) {
                Some(expr) => expr.is_alive() && expr.op.is_substitutable(),
                None => false,
            })
            .collect()
    }

    /// Replaces all candidates of `block` by zero (or its complement) and
    /// keeps the change if the oracle still reports `golden`.
    fn try_block(&mut self, block: &[ExprId], negated: bool, golden: Status) -> Result<bool> {
        let candidates = self.candidates(block);
        if candidates.is_empty() {
            return Ok(false);
        }

        self.table.checkpoint();
        for &id in candidates.iter() {
            let width = self.table.expr(id).width;
            self.table.substitute(id, width, negated);
        }
        trace!(
            "trying to set {} expressions {} .. {} to {}",
            candidates.len(),
            block[0],
            block[block.len() - 1],
            if negated { "all one" } else { "zero" }
        );

        let size = match self.write_candidate() {
            Ok(size) => size,
            Err(err) => {
                self.table.restore();
                return Err(err);
            }
        };
        self.runs += 1;
        let status = match self.oracle.check(self.scratch.path()) {
            Ok(status) => Some(status),
            Err(err) => {
                warn!("{:#}", err);
                None
            }
        };

        if status == Some(golden) {
            self.accepted += 1;
            self.fixed += candidates.len();
            self.best_size = size;
            debug!("fixed {} expressions", candidates.len());
            if let Err(err) = self.scratch.promote(self.output) {
                self.table.restore();
                return Err(err);
            }
            debug!("saved {} expressions in '{}'", size, self.output.display());
            Ok(true)
        } else {
            trace!("restored {} expressions", candidates.len());
            self.table.restore();
            Ok(false)
        }
    }

    // One pass over all non-synthetic ids in blocks of `interval`.
    fn sweep(&mut self, interval: usize, golden: Status) -> Result<bool> {
        self.rounds += 1;
        debug!("round {}", self.rounds);
        let first = self.table.reserved() as usize + 1;
        let ids: Vec<ExprId> = (first..self.table.size()).map(|id| id as ExprId).collect();
        let mut changed = false;
        for block in ids.chunks(interval) {
            for negated in [false, true] {
                changed |= self.try_block(block, negated, golden)?;
            }
        }
        Ok(changed)
    }

    pub(crate) fn run(mut self) -> Result<ReductionStats> {
        let golden = self.baseline()?;

        let mut interval = self.table.size() - self.table.reserved() as usize;
        while interval > 0 {
            info!("interval {}", interval);
            while self.sweep(interval, golden)? {}
            interval = next_interval(interval);
        }

        debug!("{} rounds", self.rounds);
        debug!("{} runs", self.runs);
        info!(
            "fixed {} expressions, {} remain in '{}'",
            self.fixed,
            self.best_size,
            self.output.display()
        );
        Ok(ReductionStats {
            golden,
            rounds: self.rounds,
            runs: self.runs,
            accepted: self.accepted,
            fixed: self.fixed,
            final_size: self.best_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_interval_schedule() {
        let mut interval = 99;
        let mut schedule = vec![interval];
        while interval > 0 {
            interval = next_interval(interval);
            schedule.push(interval);
        }
        assert_eq!(schedule, vec![99, 50, 25, 13, 7, 3, 2, 1, 0]);
    }

    #[test]
    fn test_interval_small_values() {
        assert_eq!(next_interval(8), 4);
        assert_eq!(next_interval(4), 3);
        assert_eq!(next_interval(3), 2);
        assert_eq!(next_interval(2), 1);
        assert_eq!(next_interval(1), 0);
        assert_eq!(next_interval(9), 5);
    }
}
