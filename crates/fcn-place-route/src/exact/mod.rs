//! Exact physical design
//!
//! Finds a gate-level layout of minimal area for a logic network by
//! formulating placement and routing as SAT. Candidate layout sizes are tried
//! in ascending order of area; the first satisfiable one wins. Optionally the
//! number of wires and then the number of crossings is minimized within that
//! size.
//!
//! Candidates are handed to `num_threads` worker threads per batch. The result
//! is always the lowest-ordered satisfiable candidate, so the outcome does not
//! depend on the thread count.

mod encoding;
mod extract;

use crate::error::{PhysicalDesignError, Result};
use crate::sat::{SatBackend, SequentialCounter, VarisatBackend};
use encoding::{Encoding, EncodingOptions, Instance, Placement};
use fcn_layout::{get_clocking_scheme, ClockingScheme, GateLevelLayout};
use fcn_network::{fanout_substitution, FanoutParams, LogicNetwork};
use fcn_verify::{gate_level_drvs, DrvParams};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Largest gate arity of the supported gate library
const MAX_GATE_ARITY: usize = 3;

// ============================================================================
// Parameters and statistics
// ============================================================================

/// Technology-specific restrictions on top of the clocking scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TechnologyConstraints {
    /// iNML as supported by ToPoliNano: two-input gates, fanouts of degree
    /// two and no gate next to a crossing
    Topolinano,
}

/// Exact physical design configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExactParams {
    /// Name of the clocking scheme
    pub scheme: String,
    /// Largest layout width to try; unbounded if `None`
    pub upper_bound_x: Option<u32>,
    /// Largest layout height to try; unbounded if `None`
    pub upper_bound_y: Option<u32>,
    /// Only try the size given by both upper bounds
    pub fixed_size: bool,
    /// Allow wires to cross on a second layer
    pub crossings: bool,
    /// Primary inputs and outputs must sit on the layout border
    pub border_io: bool,
    /// Drop the requirement that all operands of a gate arrive in the same
    /// clock phase
    pub desynchronize: bool,
    /// Inverters pass their signal straight through
    pub straight_inverters: bool,
    /// Allow wires that hold their signal for an extra clock cycle
    pub synchronization_elements: bool,
    pub technology_specifics: Option<TechnologyConstraints>,
    pub num_threads: usize,
    pub minimize_wires: bool,
    pub minimize_crossings: bool,
    /// Time limit in seconds; unlimited if `None`
    pub timeout: Option<f64>,
}

impl Default for ExactParams {
    fn default() -> Self {
        Self {
            scheme: fcn_layout::clocking::DEFAULT_SCHEME.to_string(),
            upper_bound_x: None,
            upper_bound_y: None,
            fixed_size: false,
            crossings: false,
            border_io: false,
            desynchronize: false,
            straight_inverters: false,
            synchronization_elements: false,
            technology_specifics: None,
            num_threads: 1,
            minimize_wires: false,
            minimize_crossings: false,
            timeout: None,
        }
    }
}

impl ExactParams {
    /// Default parameters with another clocking scheme
    pub fn with_scheme(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            ..Default::default()
        }
    }

    /// Allow crossings and minimize wires and crossings (slower)
    pub fn high_quality() -> Self {
        Self {
            crossings: true,
            minimize_wires: true,
            minimize_crossings: true,
            ..Default::default()
        }
    }

    /// The time limit, if any
    pub fn timeout_duration(&self) -> Option<Duration> {
        let secs = self.timeout?;
        if secs.is_infinite() && secs > 0.0 {
            return None;
        }
        Some(Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO))
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout.map(|d| d.as_secs_f64());
    }

    fn max_fanin(&self, scheme: &ClockingScheme) -> usize {
        let arity = match self.technology_specifics {
            Some(TechnologyConstraints::Topolinano) => 2,
            None => MAX_GATE_ARITY,
        };
        scheme.max_in_degree.min(arity)
    }

    fn fanout_degree(&self, scheme: &ClockingScheme) -> usize {
        match self.technology_specifics {
            Some(TechnologyConstraints::Topolinano) => scheme.max_out_degree.min(2),
            None => scheme.max_out_degree,
        }
    }

    fn encoding_options(&self) -> EncodingOptions {
        EncodingOptions {
            crossings: self.crossings,
            border_io: self.border_io,
            synchronize: !self.desynchronize,
            straight_inverters: self.straight_inverters,
            synchronization_elements: self.synchronization_elements && !self.desynchronize,
            topolinano: self.technology_specifics == Some(TechnologyConstraints::Topolinano),
        }
    }
}

/// Statistics of an `exact` run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExactStats {
    pub x_size: u32,
    pub y_size: u32,
    pub num_gates: usize,
    pub num_wires: usize,
    pub num_crossings: usize,
    pub time_total: Duration,
    /// Candidate sizes whose satisfiability was decided
    pub candidates_tried: usize,
    /// Largest size handed to the solver
    pub last_bound: Option<(u32, u32)>,
    /// Size of the winning formula
    pub num_vars: usize,
    pub num_clauses: usize,
}

impl fmt::Display for ExactStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[i] total time  = {:.2} secs", self.time_total.as_secs_f64())?;
        writeln!(f, "[i] layout size = {} x {}", self.x_size, self.y_size)?;
        writeln!(f, "[i] num. gates  = {}", self.num_gates)?;
        writeln!(f, "[i] num. wires  = {}", self.num_wires)?;
        writeln!(f, "[i] crossings   = {}", self.num_crossings)?;
        writeln!(f, "[i] candidates  = {}", self.candidates_tried)?;
        if let Some((x, y)) = self.last_bound {
            writeln!(f, "[i] last bound  = {} x {}", x, y)?;
        }
        write!(f, "[i] formula     = {} vars, {} clauses", self.num_vars, self.num_clauses)
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// Place and route `ntk` exactly.
///
/// Returns `Ok(None)` if no layout was found within the size bounds or before
/// the timeout expired. Structural problems (unknown scheme, gates with too
/// many inputs) are reported as errors before any solving starts.
pub fn exact(
    ntk: &LogicNetwork,
    params: &ExactParams,
    stats: Option<&mut ExactStats>,
) -> Result<Option<GateLevelLayout>> {
    let start = Instant::now();
    let mut st = ExactStats::default();
    let result = run(ntk, params, &mut st, start);
    st.time_total = start.elapsed();
    if let Some(stats) = stats {
        *stats = st;
    }
    result
}

fn run(
    ntk: &LogicNetwork,
    params: &ExactParams,
    stats: &mut ExactStats,
    start: Instant,
) -> Result<Option<GateLevelLayout>> {
    let scheme = get_clocking_scheme(&params.scheme)
        .ok_or_else(|| PhysicalDesignError::UnknownClockingScheme(params.scheme.clone()))?;

    if ntk.size() == 0 && ntk.num_pos() == 0 {
        return Err(PhysicalDesignError::EmptyNetwork);
    }
    ntk.validate()?;

    let max_fanin = params.max_fanin(&scheme);
    for (id, node) in ntk.gates() {
        if node.fanins.len() > max_fanin {
            return Err(PhysicalDesignError::HighDegreeFanin {
                node: ntk
                    .node_name(id)
                    .map(str::to_string)
                    .unwrap_or_else(|| id.to_string()),
                fanin: node.fanins.len(),
                max: max_fanin,
            });
        }
    }

    let ntk = prepare_fanouts(ntk, params, &scheme)?;
    let instance = Instance::from_network(&ntk);
    let candidates = candidate_sizes(instance.num_vertices(), params);

    log::info!(
        "Exact physical design of '{}': {} vertices, {} edges, scheme {}, {} candidate sizes",
        ntk.name(),
        instance.num_vertices(),
        instance.edges.len(),
        scheme.name,
        candidates.len()
    );

    let deadline = params
        .timeout_duration()
        .and_then(|limit| start.checked_add(limit));
    let ctx = Arc::new(SolveContext {
        instance,
        scheme: Arc::clone(&scheme),
        options: params.encoding_options(),
        minimize_wires: params.minimize_wires,
        minimize_crossings: params.minimize_crossings && params.crossings,
    });

    let Some(winner) = search(&ctx, &candidates, params.num_threads, deadline, stats)? else {
        log::info!("No layout found for '{}'", ntk.name());
        return Ok(None);
    };

    let lyt = extract::build_layout(&ntk, &ctx.instance, &winner.placement, scheme);

    let drv_params = DrvParams {
        border_io: params.border_io,
        ..Default::default()
    };
    let drvs = gate_level_drvs(&lyt, &drv_params, None);
    if drvs.drvs > 0 {
        log::warn!("Extracted layout of '{}' has {} DRVs", ntk.name(), drvs.drvs);
        return Err(PhysicalDesignError::DesignRuleViolations(drvs.drvs));
    }

    stats.x_size = winner.placement.width;
    stats.y_size = winner.placement.height;
    stats.num_gates = lyt.num_gates();
    stats.num_wires = lyt.num_wires();
    stats.num_crossings = lyt.num_crossings();
    stats.num_vars = winner.num_vars;
    stats.num_clauses = winner.num_clauses;

    log::info!(
        "Found {}x{} layout with {} gates and {} wires",
        stats.x_size,
        stats.y_size,
        stats.num_gates,
        stats.num_wires
    );
    Ok(Some(lyt))
}

/// Insert fanout buffers so that every branching signal has its own node
fn prepare_fanouts(
    ntk: &LogicNetwork,
    params: &ExactParams,
    scheme: &ClockingScheme,
) -> Result<LogicNetwork> {
    if ntk.max_fanout_size() <= 1 {
        return Ok(ntk.clone());
    }
    let degree = params.fanout_degree(scheme);
    if degree < 2 {
        return Err(PhysicalDesignError::UnsupportedFanout {
            max_out_degree: scheme.max_out_degree,
        });
    }
    Ok(fanout_substitution(
        ntk,
        &FanoutParams {
            degree,
            threshold: 1,
        },
    )?)
}

/// Layout sizes to try, ordered by area, then squareness, then width.
///
/// Without explicit bounds each side is limited by the number of vertices.
fn candidate_sizes(num_vertices: usize, params: &ExactParams) -> Vec<(u32, u32)> {
    let default_bound = num_vertices.max(1) as u32;
    let max_x = params.upper_bound_x.unwrap_or(default_bound).max(1);
    let max_y = params.upper_bound_y.unwrap_or(default_bound).max(1);

    if params.fixed_size && params.upper_bound_x.is_some() && params.upper_bound_y.is_some() {
        return vec![(max_x, max_y)];
    }

    let mut sizes: Vec<(u32, u32)> = (1..=max_x)
        .flat_map(|w| (1..=max_y).map(move |h| (w, h)))
        .filter(|(w, h)| (*w as usize) * (*h as usize) >= num_vertices)
        .collect();
    sizes.sort_by_key(|&(w, h)| (w as u64 * h as u64, w.abs_diff(h), w));
    sizes
}

// ============================================================================
// Solving
// ============================================================================

struct SolveContext {
    instance: Instance,
    scheme: Arc<ClockingScheme>,
    options: EncodingOptions,
    minimize_wires: bool,
    minimize_crossings: bool,
}

struct Winner {
    placement: Placement,
    num_vars: usize,
    num_clauses: usize,
}

enum WorkerMessage {
    Unsat {
        slot: usize,
    },
    /// A layout for the candidate; `done` once no further improvement follows
    Sat {
        slot: usize,
        placement: Placement,
        done: bool,
        num_vars: usize,
        num_clauses: usize,
    },
    Failed {
        slot: usize,
        error: String,
    },
}

enum Slot {
    Pending,
    Unsat,
    Sat {
        placement: Placement,
        done: bool,
        num_vars: usize,
        num_clauses: usize,
    },
    Failed(String),
}

enum Decision {
    Wait,
    Winner(usize),
    NextBatch,
    Failed(String),
}

/// The lowest satisfiable slot decides, but only once every slot before it is
/// known to be unsatisfiable
fn decide(slots: &[Slot]) -> Decision {
    for (i, slot) in slots.iter().enumerate() {
        match slot {
            Slot::Pending => return Decision::Wait,
            Slot::Unsat => continue,
            Slot::Sat { done: true, .. } => return Decision::Winner(i),
            Slot::Sat { done: false, .. } => return Decision::Wait,
            Slot::Failed(error) => return Decision::Failed(error.clone()),
        }
    }
    Decision::NextBatch
}

fn take_winner(slots: &mut [Slot], i: usize) -> Option<Winner> {
    match std::mem::replace(&mut slots[i], Slot::Pending) {
        Slot::Sat {
            placement,
            num_vars,
            num_clauses,
            ..
        } => Some(Winner {
            placement,
            num_vars,
            num_clauses,
        }),
        _ => None,
    }
}

enum BatchOutcome {
    Winner(Winner),
    Exhausted,
    TimedOut,
}

fn search(
    ctx: &Arc<SolveContext>,
    candidates: &[(u32, u32)],
    num_threads: usize,
    deadline: Option<Instant>,
    stats: &mut ExactStats,
) -> Result<Option<Winner>> {
    for batch in candidates.chunks(num_threads.max(1)) {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            log::info!("Timeout before trying {}x{}", batch[0].0, batch[0].1);
            return Ok(None);
        }

        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        let mut workers = Vec::with_capacity(batch.len());
        for (slot, &(w, h)) in batch.iter().enumerate() {
            log::debug!("Trying {}x{}", w, h);
            let ctx = Arc::clone(ctx);
            let worker_cancel = Arc::clone(&cancel);
            let tx = tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("exact-{}x{}", w, h))
                .spawn(move || solve_candidate(&ctx, slot, w, h, &worker_cancel, &tx));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    cancel.store(true, Ordering::Relaxed);
                    join_workers(workers);
                    return Err(PhysicalDesignError::Internal(e.to_string()));
                }
            }
            stats.last_bound = Some((w, h));
        }
        drop(tx);

        let outcome = await_batch(&rx, batch.len(), deadline, stats);
        cancel.store(true, Ordering::Relaxed);
        join_workers(workers);

        match outcome? {
            BatchOutcome::Winner(winner) => return Ok(Some(winner)),
            BatchOutcome::Exhausted => {}
            BatchOutcome::TimedOut => return Ok(None),
        }
    }
    Ok(None)
}

/// Collect worker results until the batch is decided. A timeout discards
/// every layout that is not final, including ones still being minimized.
fn await_batch(
    rx: &Receiver<WorkerMessage>,
    batch_len: usize,
    deadline: Option<Instant>,
    stats: &mut ExactStats,
) -> Result<BatchOutcome> {
    let mut slots: Vec<Slot> = (0..batch_len).map(|_| Slot::Pending).collect();
    loop {
        match decide(&slots) {
            Decision::Wait => {}
            Decision::Winner(i) => {
                stats.candidates_tried += i + 1;
                return Ok(take_winner(&mut slots, i).map_or(BatchOutcome::Exhausted, BatchOutcome::Winner));
            }
            Decision::NextBatch => {
                stats.candidates_tried += batch_len;
                return Ok(BatchOutcome::Exhausted);
            }
            Decision::Failed(error) => return Err(PhysicalDesignError::Solver(error)),
        }

        let message = match deadline {
            Some(d) => match rx.recv_timeout(d.saturating_duration_since(Instant::now())) {
                Ok(message) => message,
                Err(RecvTimeoutError::Timeout) => {
                    stats.candidates_tried += slots.iter().filter(|s| matches!(s, Slot::Unsat)).count();
                    log::info!("Timeout while solving");
                    return Ok(BatchOutcome::TimedOut);
                }
                Err(RecvTimeoutError::Disconnected) => return Err(worker_lost()),
            },
            None => rx.recv().map_err(|_| worker_lost())?,
        };

        match message {
            WorkerMessage::Unsat { slot } => slots[slot] = Slot::Unsat,
            WorkerMessage::Sat {
                slot,
                placement,
                done,
                num_vars,
                num_clauses,
            } => {
                slots[slot] = Slot::Sat {
                    placement,
                    done,
                    num_vars,
                    num_clauses,
                }
            }
            WorkerMessage::Failed { slot, error } => slots[slot] = Slot::Failed(error),
        }
    }
}

/// Wait for cancelled workers. A running SAT call cannot be interrupted, so
/// this returns once the calls in flight have finished; workers notice the
/// cancellation between solver calls.
fn join_workers(workers: Vec<JoinHandle<()>>) {
    for worker in workers {
        let name = worker.thread().name().unwrap_or("exact").to_string();
        if worker.join().is_err() {
            log::warn!("Solver worker {} panicked", name);
        }
    }
}

fn worker_lost() -> PhysicalDesignError {
    PhysicalDesignError::Internal("solver worker exited without a result".into())
}

fn solve_candidate(
    ctx: &SolveContext,
    slot: usize,
    width: u32,
    height: u32,
    cancel: &AtomicBool,
    tx: &Sender<WorkerMessage>,
) {
    if let Err(e) = try_candidate(ctx, slot, width, height, cancel, tx) {
        // the receiver may be gone after a timeout
        let _ = tx.send(WorkerMessage::Failed {
            slot,
            error: e.to_string(),
        });
    }
}

fn try_candidate(
    ctx: &SolveContext,
    slot: usize,
    width: u32,
    height: u32,
    cancel: &AtomicBool,
    tx: &Sender<WorkerMessage>,
) -> Result<()> {
    if cancel.load(Ordering::Relaxed) {
        return Ok(());
    }
    let mut backend = VarisatBackend::new();
    let enc = Encoding::new(
        &mut backend,
        &ctx.instance,
        &ctx.scheme,
        &ctx.options,
        width,
        height,
    );
    log::debug!(
        "{}x{}: {} variables, {} clauses",
        width,
        height,
        backend.num_vars(),
        backend.num_clauses()
    );

    if cancel.load(Ordering::Relaxed) {
        return Ok(());
    }
    if !backend.solve()? {
        let _ = tx.send(WorkerMessage::Unsat { slot });
        return Ok(());
    }

    let (num_vars, num_clauses) = (backend.num_vars(), backend.num_clauses());
    let mut best = enc.decode(&backend, &ctx.instance)?;
    let optimizing = ctx.minimize_wires || ctx.minimize_crossings;
    let report = |placement: &Placement, done: bool| {
        let _ = tx.send(WorkerMessage::Sat {
            slot,
            placement: placement.clone(),
            done,
            num_vars,
            num_clauses,
        });
    };
    report(&best, !optimizing);
    if !optimizing {
        return Ok(());
    }

    if ctx.minimize_wires {
        best = minimize(&mut backend, &enc, &ctx.instance, Objective::Wires, best, cancel, &report)?;
    }
    if ctx.minimize_crossings && !cancel.load(Ordering::Relaxed) {
        best = minimize(&mut backend, &enc, &ctx.instance, Objective::Crossings, best, cancel, &report)?;
    }
    // an interrupted minimization is never final
    if !cancel.load(Ordering::Relaxed) {
        report(&best, true);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Objective {
    Wires,
    Crossings,
}

impl Objective {
    fn count(self, placement: &Placement) -> usize {
        match self {
            Objective::Wires => placement.num_wires(),
            Objective::Crossings => placement.num_crossings(),
        }
    }
}

/// Tighten an upper bound on the objective until the formula becomes
/// unsatisfiable. The optimum stays asserted afterwards so that later
/// objectives cannot trade it away.
fn minimize<B: SatBackend>(
    backend: &mut B,
    enc: &Encoding,
    inst: &Instance,
    objective: Objective,
    mut best: Placement,
    cancel: &AtomicBool,
    report: &dyn Fn(&Placement, bool),
) -> Result<Placement> {
    let mut bound = objective.count(&best);
    if bound == 0 {
        return Ok(best);
    }
    let inputs = match objective {
        Objective::Wires => enc.wire_occupancy(),
        Objective::Crossings => enc.crossing_occupancy(),
    };
    // one wider than the start value so the final bound can be asserted
    let counter = SequentialCounter::new(backend, inputs, bound + 1);

    while bound > 0 && !cancel.load(Ordering::Relaxed) {
        let Some(limit) = counter.at_most(bound - 1) else {
            break;
        };
        backend.push();
        backend.add_clause(&[limit]);
        let improved = match backend.solve() {
            Ok(true) => Some(enc.decode(&*backend, inst)),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        };
        backend.pop();

        let Some(placement) = improved else {
            break;
        };
        let placement = placement?;
        bound = objective.count(&placement);
        log::debug!("{:?} reduced to {}", objective, bound);
        best = placement;
        report(&best, false);
    }

    if let Some(limit) = counter.at_most(bound) {
        backend.add_clause(&[limit]);
    }
    Ok(best)
}
