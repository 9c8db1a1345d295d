use tomasim_core::config::CoreConfig;
use tomasim_core::isa::Instruction;
use tomasim_core::sim::{InitialState, Simulator};
use tomasim_core::snapshot::CycleSnapshot;

/// Hard cycle cap for every test run; anything longer is a hang.
pub const CYCLE_CAP: u64 = 10_000;

/// The standard register/memory preset used by the end-to-end suites:
/// `R2 = 100`, doubles 1.0 / 2.0 / 3.0 at addresses 100 / 108 / 120, and
/// `F1..F4 = 10, 2, 3, 4`.
pub fn standard_initial_state() -> InitialState {
    InitialState::new()
        .with_register(2, 100.0)
        .with_register(tomasim_core::common::reg::fp(1), 10.0)
        .with_register(tomasim_core::common::reg::fp(2), 2.0)
        .with_register(tomasim_core::common::reg::fp(3), 3.0)
        .with_register(tomasim_core::common::reg::fp(4), 4.0)
        .with_memory(100, 1.0)
        .with_memory(108, 2.0)
        .with_memory(120, 3.0)
}

pub struct TestContext {
    pub sim: Simulator,
    pub snapshots: Vec<CycleSnapshot>,
}

impl TestContext {
    /// Creates a context with the default config and the standard preset.
    pub fn standard(program: Vec<Instruction>) -> Self {
        Self::with_setup(program, CoreConfig::default(), standard_initial_state())
    }

    /// Creates a context with the default config and no initial state.
    pub fn bare(program: Vec<Instruction>) -> Self {
        Self::with_setup(program, CoreConfig::default(), InitialState::new())
    }

    /// Creates a context with explicit config and initial state.
    pub fn with_setup(
        program: Vec<Instruction>,
        config: CoreConfig,
        init: InitialState,
    ) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut sim = Simulator::new(program, config).expect("test config is valid");
        sim.apply_initial_state(&init);
        Self {
            sim,
            snapshots: Vec::new(),
        }
    }

    /// Steps one cycle, keeping the snapshot.
    pub fn step(&mut self) -> &CycleSnapshot {
        let snap = self.sim.step();
        self.snapshots.push(snap);
        self.snapshots.last().expect("snapshot just pushed")
    }

    /// Runs until the core drains. Panics if `CYCLE_CAP` is exceeded.
    pub fn run_to_completion(&mut self) -> u64 {
        while !self.sim.is_finished() {
            self.step();
            assert!(
                self.snapshots.len() < CYCLE_CAP as usize,
                "simulation did not terminate within {} cycles",
                CYCLE_CAP
            );
        }
        self.sim.stats().cycles
    }

    /// Reads a floating-point register by `Fn` number.
    pub fn fp(&self, n: usize) -> f64 {
        self.sim.read_fp(n)
    }

    /// Reads an integer register.
    pub fn int(&self, n: usize) -> i64 {
        self.sim.read_int(n)
    }

    /// All log lines across all collected snapshots.
    pub fn log_lines(&self) -> Vec<&str> {
        self.snapshots
            .iter()
            .flat_map(|s| s.log.iter().map(String::as_str))
            .collect()
    }

    /// The cycle in which a tag was broadcast, if it was.
    pub fn broadcast_cycle(&self, tag: tomasim_core::common::tag::Tag) -> Option<u64> {
        self.snapshots
            .iter()
            .find(|s| s.broadcast.map(|m| m.tag) == Some(tag))
            .map(|s| s.cycle)
    }
}
