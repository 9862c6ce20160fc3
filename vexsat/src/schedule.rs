//! Scheduling of solving steps.
//!
//! Each schedule step checks the configured resource limits, fires restarts and clause database
//! maintenance when due, and then performs a single conflict step.
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use log::info;

use partial_ref::{partial, PartialRef};

use crate::cdcl::conflict_step;
use crate::clause::gc::collect_garbage;
use crate::clause::reduce::reduce;
use crate::config::RestartPolicy;
use crate::context::{parts::*, Context};
use crate::prop::restart;
use crate::state::SatState;

mod ema;
mod luby;

use ema::Ema;
use luby::LubySequence;

/// Minimum number of conflicts between two glucose style restarts.
const EMA_RESTART_HOLDOFF: u64 = 50;

/// Conflicts before the glue averages are considered meaningful.
const EMA_WARMUP_CONFLICTS: u64 = 100;

/// Weight for the moving average of trail lengths used for restart postponement.
const TRAIL_ALPHA: f64 = 1.0 / 5000.0;

/// Trail lengths this far above their moving average postpone a restart.
const TRAIL_POSTPONE_FACTOR: f64 = 1.4;

/// Conflicts between polls of the wall clock and the cancellation flag.
const POLL_INTERVAL: u64 = 64;

/// Scheduling of restarts, clause database maintenance and resource limit checks.
pub struct Schedule {
    /// Conflict count at which the next Luby restart fires, 0 before the first restart is
    /// scheduled.
    next_restart: u64,
    luby: LubySequence,
    /// Fast moving average of learned clause glue.
    glue_fast: Ema,
    /// Slow moving average of learned clause glue.
    glue_slow: Ema,
    /// Moving average of the trail length at conflicts.
    trail_avg: Ema,
    conflicts_at_last_restart: u64,
    /// Live redundant clause count that triggers the next reduction, 0 before the first trigger
    /// is scheduled.
    next_reduce: u64,
    /// Wall clock deadline of the current solve call.
    deadline: Option<Instant>,
    /// Conflict count at which the clock and cancellation flag are polled next.
    next_poll: u64,
}

impl Default for Schedule {
    fn default() -> Schedule {
        let config = crate::config::SolverConfig::default();
        Schedule {
            next_restart: 0,
            luby: LubySequence::default(),
            glue_fast: Ema::new(config.glucose_fast_alpha),
            glue_slow: Ema::new(config.glucose_slow_alpha),
            trail_avg: Ema::new(TRAIL_ALPHA),
            conflicts_at_last_restart: 0,
            next_reduce: 0,
            deadline: None,
            next_poll: 0,
        }
    }
}

/// Prepare the schedule for a solve call.
///
/// Rearms the wall clock deadline and picks up configuration changes.
pub fn prepare_solve(mut ctx: partial!(Context, mut ScheduleP, SolverConfigP)) {
    let (schedule, ctx) = ctx.split_part_mut(ScheduleP);
    let config = ctx.part(SolverConfigP);

    schedule.deadline = config
        .max_time_seconds
        .map(|seconds| Instant::now() + Duration::from_secs_f64(seconds));
    schedule.next_poll = 0;
    schedule.glue_fast.set_alpha(config.glucose_fast_alpha);
    schedule.glue_slow.set_alpha(config.glucose_slow_alpha);
}

/// Perform one step of the schedule.
///
/// Returns `false` when the search is finished or a resource limit stops it.
pub fn schedule_step(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut AssumptionsP,
        mut BinaryClausesP,
        mut ClauseActivityP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut ScheduleP,
        mut SolverStateP,
        mut StatsP,
        mut TmpDataP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
        SolverConfigP,
    ),
) -> bool {
    let (schedule, mut ctx) = ctx.split_part_mut(ScheduleP);

    if ctx.part(SolverStateP).sat_state != SatState::Unknown {
        return false;
    }

    if limits_hit(schedule, ctx.borrow()) {
        return false;
    }

    let conflicts = ctx.part(StatsP).conflicts;

    if conflicts > 0 && conflicts % 5000 == 0 {
        let db = ctx.part(ClauseDbP);
        let units = ctx.part(TrailP).top_level_assignment_count();
        info!(
            "confl: {}k rest: {} vars: {} bin: {} irred: {} red: {} deleted: {}",
            conflicts / 1000,
            ctx.part(StatsP).restarts,
            ctx.part(AssignmentP).assignment().len() - units,
            ctx.part(BinaryClausesP).count(),
            db.irredundant_count(),
            db.redundant_count(),
            ctx.part(StatsP).deleted_clauses,
        );
    }

    let restart_policy = ctx.part(SolverConfigP).restart_policy;
    match restart_policy {
        RestartPolicy::Luby => {
            let luby_base = ctx.part(SolverConfigP).luby_base;
            if schedule.next_restart == 0 {
                schedule.next_restart = conflicts + luby_base * schedule.luby.advance();
            }
            if conflicts >= schedule.next_restart {
                restart(ctx.borrow());
                ctx.part_mut(StatsP).restarts += 1;
                schedule.next_restart = conflicts + luby_base * schedule.luby.advance();
            }
        }
        RestartPolicy::GlucoseEma => {
            let margin = ctx.part(SolverConfigP).glucose_restart_margin;
            let postpone_size = ctx.part(SolverConfigP).glucose_postpone_trail_size;

            if conflicts >= EMA_WARMUP_CONFLICTS
                && conflicts >= schedule.conflicts_at_last_restart + EMA_RESTART_HOLDOFF
                && schedule.glue_fast.get() > schedule.glue_slow.get() * margin
            {
                let trail_len = ctx.part(TrailP).trail().len();
                // A trail well above its average length means the search is making progress and
                // the restart is skipped.
                let postponed = postpone_size != 0
                    && trail_len > postpone_size
                    && trail_len as f64 > schedule.trail_avg.get() * TRAIL_POSTPONE_FACTOR;

                if !postponed {
                    restart(ctx.borrow());
                    ctx.part_mut(StatsP).restarts += 1;
                    schedule.conflicts_at_last_restart = conflicts;
                    // Forget the glue spike that triggered this restart.
                    schedule.glue_fast.reset_to(schedule.glue_slow.get());
                }
            }
        }
        RestartPolicy::None => {}
    }

    if schedule.next_reduce == 0 {
        schedule.next_reduce = ctx.part(SolverConfigP).reduce_initial_limit;
    }
    if ctx.part(ClauseDbP).redundant_count() as u64 > schedule.next_reduce {
        reduce(ctx.borrow());
        schedule.next_reduce = schedule.next_reduce * ctx.part(SolverConfigP).reduce_growth / 100;
        collect_garbage(ctx.borrow());
    }

    if let Some(glue) = conflict_step(ctx.borrow()) {
        schedule.glue_fast.update(glue as f64);
        schedule.glue_slow.update(glue as f64);
        schedule
            .trail_avg
            .update(ctx.part(TrailP).trail().len() as f64);
    }

    true
}

/// Whether a configured resource limit or the cancellation flag stops the search.
///
/// The conflict and decision counters are checked on every step, the wall clock and the
/// cancellation flag only periodically.
fn limits_hit(
    schedule: &mut Schedule,
    mut ctx: partial!(Context, SolverConfigP, SolverStateP, StatsP),
) -> bool {
    let config = ctx.part(SolverConfigP);
    let stats = ctx.part(StatsP);

    if let Some(max_conflicts) = config.max_conflicts {
        if stats.conflicts >= max_conflicts {
            return true;
        }
    }

    if let Some(max_decisions) = config.max_decisions {
        if stats.decisions >= max_decisions {
            return true;
        }
    }

    if stats.conflicts >= schedule.next_poll {
        schedule.next_poll = stats.conflicts + POLL_INTERVAL;

        if ctx.part(SolverStateP).cancel.load(Ordering::Relaxed) {
            return true;
        }

        if let Some(deadline) = schedule.deadline {
            if Instant::now() >= deadline {
                return true;
            }
        }
    }

    false
}
