#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timed obstacle-avoidance mini-game.
//!
//! A [`Session`] owns every piece of mini-game state. Hosts drive it with
//! [`SessionCommand`] values through [`apply`]: `Start` and `Nudge` from user
//! input, `Advance` once per rendered frame with the real time elapsed, and
//! `Teardown` when the mini-game is dismissed. Obstacle spawns and the
//! once-per-second score tick are timers in a single queue; every timer carries
//! the epoch of the run that scheduled it and is discarded once that run ends.

mod collision;
mod schedule;
mod spawner;

use std::time::Duration;

use tropical_trouble_core::{
    ObstacleId, ObstacleSnapshot, SessionCommand, SessionConfig, SessionEvent, SessionStatus,
    StartRejection, Steer,
};

pub use collision::{CollisionDetector, HitBox};
pub use spawner::ObstacleSpawner;

use schedule::{Job, Scheduler};

const SCORE_INTERVAL: Duration = Duration::from_secs(1);
const PLAYER_START_PERCENT: f32 = 50.0;

/// Host-facing classification of a finished run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The player survived the full duration.
    Won,
    /// The player was hit and attempts remain.
    Crashed,
    /// The player was hit and no attempts remain.
    OutOfAttempts,
}

/// Complete state of one mini-game session.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    detector: CollisionDetector,
    status: SessionStatus,
    score: u32,
    time_remaining: u32,
    attempts_remaining: u32,
    high_score: u32,
    player_x_percent: f32,
    obstacles: Vec<ObstacleSnapshot>,
    outcome: Option<Outcome>,
    runs: u32,
    epoch: u64,
    clock: Duration,
    scheduler: Scheduler,
    spawner: ObstacleSpawner,
    next_obstacle: u32,
    torn_down: bool,
}

impl Session {
    /// Creates an idle session with the configured number of attempts.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            detector: CollisionDetector::new(&config),
            status: SessionStatus::Idle,
            score: 0,
            time_remaining: config.duration_secs,
            attempts_remaining: config.initial_attempts,
            high_score: 0,
            player_x_percent: PLAYER_START_PERCENT,
            obstacles: Vec::new(),
            outcome: None,
            runs: 0,
            epoch: 0,
            clock: Duration::ZERO,
            scheduler: Scheduler::default(),
            spawner: ObstacleSpawner::for_run(config.seed, 0),
            next_obstacle: 0,
            torn_down: false,
            config,
        }
    }

    fn start(&mut self, out_events: &mut Vec<SessionEvent>) {
        let rejection = if self.torn_down {
            Some(StartRejection::TornDown)
        } else if self.status == SessionStatus::Running {
            Some(StartRejection::RunInProgress)
        } else if self.attempts_remaining == 0 {
            Some(StartRejection::NoAttemptsLeft)
        } else {
            None
        };
        if let Some(reason) = rejection {
            tracing::warn!(?reason, "mini-game start rejected");
            out_events.push(SessionEvent::StartRejected { reason });
            return;
        }

        self.runs = self.runs.saturating_add(1);
        self.epoch = self.epoch.wrapping_add(1);
        self.status = SessionStatus::Running;
        self.score = 0;
        self.time_remaining = self.config.duration_secs;
        self.player_x_percent = PLAYER_START_PERCENT;
        self.obstacles.clear();
        self.outcome = None;
        self.clock = Duration::ZERO;
        self.next_obstacle = 0;
        self.spawner = ObstacleSpawner::for_run(self.config.seed, self.runs);
        self.scheduler.clear();
        self.scheduler
            .schedule(Duration::ZERO, self.epoch, Job::SpawnObstacle);
        self.scheduler
            .schedule(SCORE_INTERVAL, self.epoch, Job::ScoreTick);

        tracing::debug!(run = self.runs, attempts = self.attempts_remaining, "mini-game run started");
        out_events.push(SessionEvent::RunStarted {
            run: self.runs,
            attempts_remaining: self.attempts_remaining,
        });
    }

    fn nudge(&mut self, steer: Steer, out_events: &mut Vec<SessionEvent>) {
        if self.status != SessionStatus::Running {
            return;
        }
        let half_width = self.detector.player_width_percent() / 2.0;
        let step = match steer {
            Steer::Left => -self.config.player_step_percent,
            Steer::Right => self.config.player_step_percent,
        };
        let moved = (self.player_x_percent + step).clamp(half_width, 100.0 - half_width);
        if moved != self.player_x_percent {
            self.player_x_percent = moved;
            out_events.push(SessionEvent::PlayerMoved { x_percent: moved });
        }
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<SessionEvent>) {
        if self.status != SessionStatus::Running {
            return;
        }

        let window_end = self.clock.saturating_add(dt);
        while let Some((due, job)) = self.scheduler.pop_due(window_end, self.epoch) {
            self.clock = due;
            match job {
                Job::SpawnObstacle => self.spawn_obstacle(due, out_events),
                Job::ScoreTick => self.tick_score(due, out_events),
            }
            if self.status != SessionStatus::Running {
                return;
            }
        }
        self.clock = window_end;

        let frame = dt.min(self.config.max_frame_delta());
        self.advect(frame, out_events);

        let blamed = self
            .detector
            .first_hit(self.player_x_percent, &self.obstacles)
            .map(|hit| hit.id);
        if blamed.is_some() {
            self.end_run(false, self.score, blamed, out_events);
        }
    }

    fn spawn_obstacle(&mut self, due: Duration, out_events: &mut Vec<SessionEvent>) {
        let id = ObstacleId::new(self.next_obstacle);
        self.next_obstacle = self.next_obstacle.wrapping_add(1);
        let x_percent = self
            .spawner
            .spawn_x(self.detector.obstacle_width_percent());
        self.obstacles.push(ObstacleSnapshot {
            id,
            x_percent,
            y_percent: 0.0,
            spawned_at: due,
        });
        out_events.push(SessionEvent::ObstacleSpawned {
            obstacle: id,
            x_percent,
        });

        let window = self.config.spawn_delay.window_at(self.progress(due));
        let delay = self.spawner.next_delay(window);
        self.scheduler
            .schedule(due.saturating_add(delay), self.epoch, Job::SpawnObstacle);
    }

    fn tick_score(&mut self, due: Duration, out_events: &mut Vec<SessionEvent>) {
        if self.time_remaining <= 1 {
            self.time_remaining = 0;
            let final_score = self.score.saturating_add(1);
            out_events.push(SessionEvent::ScoreTicked {
                score: final_score,
                time_remaining: 0,
            });
            self.end_run(true, final_score, None, out_events);
            return;
        }
        self.score = self.score.saturating_add(1);
        self.time_remaining -= 1;
        out_events.push(SessionEvent::ScoreTicked {
            score: self.score,
            time_remaining: self.time_remaining,
        });
        self.scheduler
            .schedule(due.saturating_add(SCORE_INTERVAL), self.epoch, Job::ScoreTick);
    }

    fn advect(&mut self, frame: Duration, out_events: &mut Vec<SessionEvent>) {
        let fall = frame.as_secs_f32() * 1_000.0 * self.config.fall_rate;
        for obstacle in &mut self.obstacles {
            obstacle.y_percent += fall;
        }
        self.obstacles.retain(|obstacle| {
            let keep = obstacle.y_percent < 100.0;
            if !keep {
                out_events.push(SessionEvent::ObstacleCleared {
                    obstacle: obstacle.id,
                });
            }
            keep
        });
    }

    fn progress(&self, at: Duration) -> f32 {
        let duration = self.config.duration();
        if duration.is_zero() {
            return 1.0;
        }
        at.as_secs_f32() / duration.as_secs_f32()
    }

    fn end_run(
        &mut self,
        survived: bool,
        final_score: u32,
        blamed: Option<ObstacleId>,
        out_events: &mut Vec<SessionEvent>,
    ) {
        self.high_score = self.high_score.max(final_score);
        if !survived {
            self.attempts_remaining = self.attempts_remaining.saturating_sub(1);
        }
        self.score = final_score;
        self.status = SessionStatus::Over;
        self.epoch = self.epoch.wrapping_add(1);
        self.scheduler.clear();
        let outcome = if survived {
            Outcome::Won
        } else if self.attempts_remaining == 0 {
            Outcome::OutOfAttempts
        } else {
            Outcome::Crashed
        };
        self.outcome = Some(outcome);

        tracing::info!(
            ?outcome,
            final_score,
            attempts = self.attempts_remaining,
            high_score = self.high_score,
            "mini-game run ended"
        );
        out_events.push(SessionEvent::RunEnded {
            survived,
            final_score,
            attempts_remaining: self.attempts_remaining,
            high_score: self.high_score,
            blamed,
        });
    }

    fn teardown(&mut self, out_events: &mut Vec<SessionEvent>) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.epoch = self.epoch.wrapping_add(1);
        self.scheduler.clear();
        self.obstacles.clear();
        if self.status == SessionStatus::Running {
            self.status = SessionStatus::Over;
        }
        out_events.push(SessionEvent::TornDown);
    }
}

/// Applies the provided command to the session, mutating state deterministically.
pub fn apply(session: &mut Session, command: SessionCommand, out_events: &mut Vec<SessionEvent>) {
    match command {
        SessionCommand::Start => session.start(out_events),
        SessionCommand::Nudge { steer } => session.nudge(steer, out_events),
        SessionCommand::Advance { dt } => session.advance(dt, out_events),
        SessionCommand::Teardown => session.teardown(out_events),
    }
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use std::time::Duration;

    use tropical_trouble_core::{SessionSnapshot, SessionStatus};

    use super::{Outcome, Session};

    /// Captures the host-visible state of the session.
    #[must_use]
    pub fn snapshot(session: &Session) -> SessionSnapshot {
        SessionSnapshot {
            status: session.status,
            score: session.score,
            time_remaining: session.time_remaining,
            attempts_remaining: session.attempts_remaining,
            high_score: session.high_score,
            player_x_percent: session.player_x_percent,
            obstacles: session.obstacles.clone(),
        }
    }

    /// Lifecycle state of the session.
    #[must_use]
    pub fn status(session: &Session) -> SessionStatus {
        session.status
    }

    /// Classification of the latest finished run, if any.
    #[must_use]
    pub fn outcome(session: &Session) -> Option<Outcome> {
        session.outcome
    }

    /// Run time accumulated since the current or latest run started.
    #[must_use]
    pub fn run_clock(session: &Session) -> Duration {
        session.clock
    }

    /// Number of timers that will still fire for the current run.
    #[must_use]
    pub fn pending_timers(session: &Session) -> usize {
        session.scheduler.pending(session.epoch)
    }

    /// Reports whether the host has retired the session.
    #[must_use]
    pub fn is_torn_down(session: &Session) -> bool {
        session.torn_down
    }
}
