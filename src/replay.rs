//! Timed replay of a captured pointer trail.
//!
//! The engine is a small state machine advanced by scheduler callbacks. Each
//! callback reveals exactly one more sample. At most one advance is pending at
//! any time; restarting or stopping cancels it.

use clap::ValueEnum;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::clock::{elapsed_between, Timestamp};
use crate::phase::classify;
use crate::schedule::{Scheduler, TimerId};
use crate::session::FrozenSession;
use crate::surface::{DisplayList, DrawingSurface};

pub const DEFAULT_TICK_MS: u64 = 10;
pub const DEFAULT_PAUSE_THRESHOLD_MS: u64 = 1000;

// Canvas units are terminal cells
const PAUSE_DOT_RADIUS: f64 = 0.6;
const PAUSE_LABEL_OFFSET: f64 = 1.5;
const HIGHLIGHT_OUTER_RADIUS: f64 = 1.5;
const HIGHLIGHT_INNER_RADIUS: f64 = 0.75;
const HIGHLIGHT_OUTER_OPACITY: f64 = 0.53;

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ReplayStrategy {
    /// one sample per fixed tick, ignoring the recorded spacing
    #[default]
    FixedTick,
    /// reproduce the recorded inter-sample delays, pauses included
    TimeAccurate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySettings {
    pub strategy: ReplayStrategy,
    pub tick_ms: u64,
    pub pause_threshold_ms: u64,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            strategy: ReplayStrategy::FixedTick,
            tick_ms: DEFAULT_TICK_MS,
            pause_threshold_ms: DEFAULT_PAUSE_THRESHOLD_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayState {
    Idle,
    Playing { started_at: Timestamp },
    Done,
}

#[derive(Debug)]
pub struct ReplayEngine {
    settings: ReplaySettings,
    state: ReplayState,
    frame: usize,
    pending: Option<TimerId>,
}

impl ReplayEngine {
    pub fn new(settings: ReplaySettings) -> Self {
        Self {
            settings,
            state: ReplayState::Idle,
            frame: 0,
            pending: None,
        }
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    /// Number of samples revealed so far
    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state, ReplayState::Playing { .. })
    }

    pub fn pending_timer(&self) -> Option<TimerId> {
        self.pending
    }

    pub fn settings(&self) -> ReplaySettings {
        self.settings
    }

    /// Begin (or restart) from frame 0. A replay already in flight is cancelled.
    /// Returns false without scheduling anything when there is nothing to replay.
    pub fn start<S: Scheduler>(
        &mut self,
        session: &FrozenSession,
        now: Timestamp,
        scheduler: &mut S,
    ) -> bool {
        self.cancel_pending(scheduler);

        if session.samples().is_empty() {
            self.state = ReplayState::Idle;
            self.frame = 0;
            return false;
        }

        tracing::info!(
            samples = session.samples().len(),
            strategy = %self.settings.strategy,
            "replay started"
        );
        self.frame = 0;
        self.state = ReplayState::Playing { started_at: now };
        self.schedule_next(session, now, scheduler);
        true
    }

    /// Handle a fired timer. Stale ids (cancelled or superseded) are ignored.
    /// Returns true if a frame was advanced.
    pub fn on_timer<S: Scheduler>(
        &mut self,
        id: TimerId,
        session: &FrozenSession,
        now: Timestamp,
        scheduler: &mut S,
    ) -> bool {
        if self.pending != Some(id) || !self.is_animating() {
            return false;
        }
        self.pending = None;

        let total = session.samples().len();
        self.frame = (self.frame + 1).min(total);

        if self.frame >= total {
            tracing::info!(frames = self.frame, "replay finished");
            self.state = ReplayState::Done;
        } else {
            self.schedule_next(session, now, scheduler);
        }
        true
    }

    /// Cancel any pending advance, e.g. when the results view goes away
    pub fn stop<S: Scheduler>(&mut self, scheduler: &mut S) {
        if self.cancel_pending(scheduler) {
            tracing::info!(frame = self.frame, "replay cancelled");
        }
        if self.is_animating() {
            self.state = ReplayState::Idle;
        }
    }

    /// Draw the trail revealed so far. Safe to call at any time, e.g. after
    /// the surface was resized; it never advances or resets the replay.
    pub fn render<D: DrawingSurface + ?Sized>(&self, session: &FrozenSession, surface: &mut D) {
        let (width, height) = surface.size();
        surface.clear_rect(0.0, 0.0, width, height);

        let revealed = &session.samples()[..self.frame.min(session.samples().len())];

        for (prev, cur) in revealed.iter().tuple_windows() {
            let gap = elapsed_between(prev.timestamp, cur.timestamp);
            if gap > self.settings.pause_threshold_ms {
                surface.fill_arc(prev.x, prev.y, PAUSE_DOT_RADIUS, prev.phase.color(), 1.0);
                surface.fill_text(
                    &format!("{:.1}s", gap as f64 / 1000.0),
                    prev.x + PAUSE_LABEL_OFFSET,
                    prev.y,
                    ratatui::style::Color::DarkGray,
                );
            }

            surface.begin_path();
            surface.move_to(prev.x, prev.y);
            surface.line_to(cur.x, cur.y);
            surface.stroke(cur.phase.base().color());
        }

        if let Some(current) = revealed.last() {
            let color = classify(session, current.timestamp, current.question_id).color();
            surface.fill_arc(
                current.x,
                current.y,
                HIGHLIGHT_OUTER_RADIUS,
                color,
                HIGHLIGHT_OUTER_OPACITY,
            );
            surface.fill_arc(current.x, current.y, HIGHLIGHT_INNER_RADIUS, color, 1.0);
        }
    }

    /// Resize the recording surface and redraw the trail at the current frame
    pub fn resize(&self, session: &FrozenSession, width: f64, height: f64, surface: &mut DisplayList) {
        surface.resize(width, height);
        self.render(session, surface);
    }

    fn schedule_next<S: Scheduler>(
        &mut self,
        session: &FrozenSession,
        now: Timestamp,
        scheduler: &mut S,
    ) {
        let delay = match self.settings.strategy {
            ReplayStrategy::FixedTick => self.settings.tick_ms,
            ReplayStrategy::TimeAccurate => self.time_accurate_delay(session, now),
        };
        self.pending = Some(scheduler.schedule(now, delay));
    }

    fn time_accurate_delay(&self, session: &FrozenSession, now: Timestamp) -> u64 {
        let ReplayState::Playing { started_at } = self.state else {
            return 0;
        };
        let samples = session.samples();
        let Some(upcoming) = samples.get(self.frame) else {
            return 0;
        };

        let origin = session
            .start_time()
            .unwrap_or_else(|| samples[0].timestamp);
        let due_after = elapsed_between(origin, upcoming.timestamp);
        let replayed = elapsed_between(started_at, now);
        due_after.saturating_sub(replayed)
    }

    fn cancel_pending<S: Scheduler>(&mut self, scheduler: &mut S) -> bool {
        match self.pending.take() {
            Some(id) => scheduler.cancel(id),
            None => false,
        }
    }
}
