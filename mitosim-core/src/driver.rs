//! The time-bounded run loop: builds a [`Structure`], wires the four
//! [`Reaction`]s per the config's `use_*` flags, drives the
//! [`Selector`] until a stop condition fires, and periodically streams
//! snapshots. Iterates every run index in a requested range, each with
//! its own seed.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{MitosimError, Result};
use crate::reactions::{
    FissionReaction, Fusion11Reaction, Fusion12Reaction, Fusion1LReaction, Reaction,
};
use crate::rng::SmallRngSource;
use crate::seed::SeedTable;
use crate::selector::{Selector, StepOutcome};
use crate::snapshot;
use crate::structure::Structure;

/// Why a run's Gillespie loop stopped.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StopReason {
    /// The configured total simulated time elapsed.
    TimeBudgetExhausted,
    /// No reaction currently has positive score.
    NoActiveReactions,
}

/// Summary of one completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunOutcome {
    /// Which run index this summarises.
    pub run_index: u64,
    /// Number of reactions fired.
    pub iterations: u64,
    /// Simulated time elapsed when the run stopped.
    pub final_time: f64,
    /// Why the run's Gillespie loop stopped.
    pub stopped_because: StopReason,
}

/// Drives one or more runs against files under `working_dir`.
pub struct Driver {
    working_dir: PathBuf,
    config_suffix: String,
}

impl Driver {
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>, config_suffix: impl Into<String>) -> Self {
        Self { working_dir: working_dir.into(), config_suffix: config_suffix.into() }
    }

    /// Runs every index in `run_ini..=run_end`, reading the config once
    /// and reusing it across runs, and reading (extending if needed) the
    /// seed table for per-run reproducibility.
    ///
    /// # Errors
    /// Returns [`MitosimError`] if the config cannot be read, or if a
    /// run's snapshot I/O fails.
    pub fn run_range(&self, run_ini: u64, run_end: u64) -> Result<Vec<RunOutcome>> {
        let config = Config::read(&self.working_dir, &self.config_suffix)?;
        let mut seeds = SeedTable::read(&self.seed_path())?;

        let mut outcomes = Vec::new();
        for run_index in run_ini..=run_end {
            let seed = seeds.seed_for(run_index as usize);
            let outcome = self.run_one(&config, run_index, seed)?;
            outcomes.push(outcome);
        }

        seeds.persist(&self.seed_path())?;
        Ok(outcomes)
    }

    fn seed_path(&self) -> PathBuf {
        self.working_dir.join("seeds.bin")
    }

    fn snapshot_path(&self, run_index: u64) -> PathBuf {
        self.working_dir.join(format!("mitos_{run_index}.bin"))
    }

    fn last_snapshot_path(&self, run_index: u64) -> PathBuf {
        self.working_dir.join(format!("mitos_{run_index}_last.bin"))
    }

    fn run_one(&self, config: &Config, run_index: u64, seed: u32) -> Result<RunOutcome> {
        let span = tracing::info_span!("run", run_index, seed);
        let _enter = span.enter();

        let mut structure = Structure::seed_linear(config.mtmassini, config.segmassini);
        let mut rng = SmallRngSource::from_seed_u32(seed);
        let mut selector = Selector::new(wire_reactions(config));

        let mut sequence = 0u64;
        let mut snapshot_file = open_snapshot_sink(&self.snapshot_path(run_index))?;

        selector.refresh_all(&mut structure);

        let mut time = 0.0;
        let mut iterations = 0u64;
        let stopped_because = loop {
            if time >= config.time_total {
                break StopReason::TimeBudgetExhausted;
            }
            match selector.step(&mut structure, &mut rng) {
                StepOutcome::Exhausted => break StopReason::NoActiveReactions,
                StepOutcome::Fired { dt, .. } => {
                    time += dt;
                    iterations += 1;
                }
            }

            if iterations % config.log_frequency == 0 {
                log_progress(iterations, time, &selector, &structure);
            }
            if iterations % config.save_frequency == 0 {
                sequence += 1;
                write_snapshot(&mut snapshot_file, &structure, time, sequence, &self.snapshot_path(run_index))?;
            }
        };

        let mut last_file = open_snapshot_sink(&self.last_snapshot_path(run_index))?;
        write_snapshot(&mut last_file, &structure, time, 0, &self.last_snapshot_path(run_index))?;

        Ok(RunOutcome { run_index, iterations, final_time: time, stopped_because })
    }
}

fn wire_reactions(config: &Config) -> Vec<Box<dyn Reaction>> {
    let mut reactions: Vec<Box<dyn Reaction>> = Vec::new();
    if config.use_fission {
        reactions.push(Box::new(FissionReaction::new(config.rate_fission)));
    }
    if config.use_11_fusion {
        reactions.push(Box::new(Fusion11Reaction::new(config.fusion_rate_11)));
    }
    if config.use_12_fusion {
        reactions.push(Box::new(Fusion12Reaction::new(config.fusion_rate_12)));
    }
    if config.use_1l_fusion {
        reactions.push(Box::new(Fusion1LReaction::new(config.fusion_rate_1l)));
    }
    reactions
}

fn log_progress(iterations: u64, time: f64, selector: &Selector, structure: &Structure) {
    tracing::info!(
        iterations,
        time,
        total_score = selector.total_score(),
        segments = structure.segment_count(),
        clusters = structure.cluster_count(),
        "progress"
    );
}

fn open_snapshot_sink(path: &Path) -> Result<std::io::BufWriter<std::fs::File>> {
    let file = std::fs::File::create(path)
        .map_err(|source| MitosimError::Io { path: path.display().to_string(), source })?;
    Ok(std::io::BufWriter::new(file))
}

fn write_snapshot(
    sink: &mut impl std::io::Write,
    structure: &Structure,
    time: f64,
    sequence: u64,
    path: &Path,
) -> Result<()> {
    let counts = structure.node_counts();
    #[expect(clippy::cast_possible_truncation, reason = "node counts fit comfortably in a u64")]
    let (nn1max, nn2max) = (counts[0] as u64, counts[1] as u64);
    snapshot::write_record(
        sink,
        structure,
        time,
        structure.segment_count() as u64,
        nn1max,
        nn2max,
        sequence,
    )
    .map_err(|source| MitosimError::Io { path: path.display().to_string(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, suffix: &str, body: &str) {
        std::fs::write(dir.join(format!("config_{suffix}.txt")), body).unwrap();
    }

    #[test]
    fn run_range_stops_on_exhaustion_and_writes_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            "t",
            "\
timeTotal=1000.0
logFrequency=1
saveFrequency=1
edgeLength=0.1
mtmassini=8
segmassini=4
use_fission=false
rate_fission=0.0
use_11_fusion=true
fusion_rate_11=1.0
use_12_fusion=false
fusion_rate_12=0.0
use_1L_fusion=false
fusion_rate_1L=0.0
",
        );

        let driver = Driver::new(dir.path(), "t");
        let outcomes = driver.run_range(0, 0).unwrap();
        assert_eq!(outcomes.len(), 1);
        let outcome = &outcomes[0];
        assert_eq!(outcome.run_index, 0);
        // Two free-standing 11-segments carry 4 tips; every 11-fusion
        // consumes exactly two tips, so the run is exhausted after 2 fires.
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.stopped_because, StopReason::NoActiveReactions);

        assert!(dir.path().join("mitos_0_last.bin").exists());
        assert!(dir.path().join("seeds.bin").exists());
    }
}
