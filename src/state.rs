//! Module `state` is a collection of internal data about the solve in
//! progress: the phase machine, statistics, the cancellation token and
//! the push-based progress listeners.

use {
    crate::{config::Config, types::*},
    std::{
        fmt,
        ops::{Index, IndexMut},
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
        time::Instant,
    },
};

/// stat index.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stat {
    /// the number of full saturation passes
    SaturationPass = 0,
    /// the number of links added by saturation
    DerivedLink,
    /// the number of base rules extracted
    BaseRule,
    /// the number of resolvents that survived pruning
    Resolvent,
    /// the number of clauses discarded by subsumption
    Subsumed,
    /// the number of candidate columns emitted
    Column,
    /// the number of rows dropped by reduction
    RowDrop,
    /// the number of columns dropped by reduction
    ColDrop,
    /// the number of LP relaxations solved
    SimplexCall,
    /// the number of branch-and-bound nodes entered
    Branch,
    /// the number of nodes pruned by the relaxation bound
    Prune,
    /// the number of improved incumbents
    Incumbent,
    /// the number of outer growing iterations
    GrowPass,
    /// don't use this dummy.
    EndOfStatIndex,
}

/// The coarse-grained phase machine. Cancellation is honored only at
/// phase and loop boundaries, never inside the branch-and-bound
/// recursion.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Phase {
    #[default]
    Idle,
    Completing,
    Reducing,
    BuildingBase,
    Solving,
    Stopping,
    Done,
}

impl Phase {
    pub fn to_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Completing => "completing",
            Phase::Reducing => "reducing",
            Phase::BuildingBase => "building base rules",
            Phase::Solving => "solving",
            Phase::Stopping => "stopping",
            Phase::Done => "done",
        }
    }
}

/// API for progress observers; callbacks arrive on the solving thread.
pub trait ProgressIF {
    /// the solve advanced to `fraction` (0.0 ..= 1.0) of the current run.
    fn progress_change(&mut self, fraction: f64);
    /// the solve reached `Phase::Done`.
    fn finished(&mut self);
}

/// returned by `pause` when the current phase refuses to stop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CannotPause;

/// Data about one solver run. Created per solve, discarded after.
pub struct State {
    pub phase: Phase,
    /// statistics
    stats: [usize; Stat::EndOfStatIndex as usize],
    listeners: Vec<Box<dyn ProgressIF>>,
    cancel: Arc<AtomicBool>,
    progress: f64,
    pub start: Instant,
    pub config: Config,
    pub target: ModelDescription,
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("State")
            .field("phase", &self.phase)
            .field("progress", &self.progress)
            .field("target", &self.target)
            .finish()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tm = self.start.elapsed().as_secs_f64();
        write!(
            f,
            "{}, #phase:{:>20}, prg:{:>6.4}, time:{:>9.2}",
            self.target,
            self.phase.to_str(),
            self.progress,
            tm
        )
    }
}

impl Instantiate for State {
    fn instantiate(config: &Config, desc: &ModelDescription) -> State {
        State {
            phase: Phase::Idle,
            stats: [0; Stat::EndOfStatIndex as usize],
            listeners: Vec::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            progress: 0.0,
            start: Instant::now(),
            config: config.clone(),
            target: desc.clone(),
        }
    }
}

impl Index<Stat> for State {
    type Output = usize;
    #[inline]
    fn index(&self, i: Stat) -> &usize {
        &self.stats[i as usize]
    }
}

impl IndexMut<Stat> for State {
    #[inline]
    fn index_mut(&mut self, i: Stat) -> &mut usize {
        &mut self.stats[i as usize]
    }
}

impl State {
    pub fn add_listener(&mut self, l: Box<dyn ProgressIF>) {
        self.listeners.push(l);
    }
    /// a clonable handle onto the cancellation flag.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }
    pub fn is_canceled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
    pub fn clear_cancel(&self) {
        self.cancel.store(false, Ordering::Relaxed);
    }
    /// request a stop; honored at the next phase or loop boundary.
    pub fn request_stop(&self) -> Result<(), CannotPause> {
        if self.pausable() {
            self.cancel.store(true, Ordering::Relaxed);
            Ok(())
        } else {
            Err(CannotPause)
        }
    }
    /// every phase pauses except the terminal ones.
    pub fn pausable(&self) -> bool {
        !matches!(self.phase, Phase::Stopping | Phase::Done)
    }
    /// a human-readable phase name.
    pub fn state_message(&self) -> &'static str {
        if self.is_canceled() && self.phase != Phase::Done {
            Phase::Stopping.to_str()
        } else {
            self.phase.to_str()
        }
    }

    pub fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.set_progress(0.0);
        if self.config.progress_log {
            println!("c {self}");
        }
    }
    /// report a 0-1 fraction through the current phase.
    pub fn set_progress(&mut self, fraction: f64) {
        self.progress = fraction.clamp(0.0, 1.0);
        let p = self.progress;
        for l in self.listeners.iter_mut() {
            l.progress_change(p);
        }
    }
    pub fn finish(&mut self) {
        self.phase = Phase::Done;
        self.progress = 1.0;
        for l in self.listeners.iter_mut() {
            l.finished();
        }
        if self.config.progress_log {
            println!("c {self}");
        }
    }

    /// one-line statistics dump for `progress_log` runs.
    pub fn flush_stats(&self) {
        if !self.config.progress_log {
            return;
        }
        println!(
            "c  #pass:{:>5}, #derived:{:>7}, #base:{:>7}, #resolvent:{:>7}, #column:{:>7}",
            self[Stat::SaturationPass],
            self[Stat::DerivedLink],
            self[Stat::BaseRule],
            self[Stat::Resolvent],
            self[Stat::Column],
        );
        println!(
            "c  #lp:{:>7}, #branch:{:>8}, #prune:{:>8}, #incumbent:{:>4}, #grow:{:>4}",
            self[Stat::SimplexCall],
            self[Stat::Branch],
            self[Stat::Prune],
            self[Stat::Incumbent],
            self[Stat::GrowPass],
        );
    }
}
