//! One-time entry overlay played on the first dashboard load of a session.
//!
//! Phases run `Intro → Reveal → Glow → Hold → Done`, each for a fixed time.
//! Every transition lives in `TRANSITIONS`; `EntryAnimation` steps through it
//! with explicit ticks and `EntryAnimationHandle` drives it on a tokio task.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::state::AppContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPhase {
    Intro,
    Reveal,
    Glow,
    Hold,
    Done,
}

/// `(phase, how long it lasts, phase that follows)`.
const TRANSITIONS: &[(EntryPhase, Duration, EntryPhase)] = &[
    (EntryPhase::Intro, Duration::from_millis(600), EntryPhase::Reveal),
    (EntryPhase::Reveal, Duration::from_millis(800), EntryPhase::Glow),
    (EntryPhase::Glow, Duration::from_millis(700), EntryPhase::Hold),
    (EntryPhase::Hold, Duration::from_millis(900), EntryPhase::Done),
];

impl EntryPhase {
    /// Scheduled transition out of this phase. `Done` has none.
    pub fn transition(&self) -> Option<(Duration, EntryPhase)> {
        TRANSITIONS
            .iter()
            .find(|(from, _, _)| from == self)
            .map(|(_, after, to)| (*after, *to))
    }

    pub fn is_done(&self) -> bool {
        *self == EntryPhase::Done
    }
}

/// Manually ticked state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryAnimation {
    phase: EntryPhase,
    in_phase: Duration,
}

impl Default for EntryAnimation {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryAnimation {
    pub fn new() -> Self {
        Self {
            phase: EntryPhase::Intro,
            in_phase: Duration::ZERO,
        }
    }

    pub fn phase(&self) -> EntryPhase {
        self.phase
    }

    /// Advance by `dt`, crossing as many transitions as it covers.
    pub fn tick(&mut self, dt: Duration) -> EntryPhase {
        self.in_phase += dt;
        while let Some((after, next)) = self.phase.transition() {
            if self.in_phase < after {
                break;
            }
            self.in_phase -= after;
            self.phase = next;
        }
        if self.phase.is_done() {
            self.in_phase = Duration::ZERO;
        }
        self.phase
    }

    /// Phase reached `elapsed` after start.
    pub fn phase_at(elapsed: Duration) -> EntryPhase {
        let mut anim = Self::new();
        anim.tick(elapsed)
    }

    pub fn total_duration() -> Duration {
        TRANSITIONS.iter().map(|(_, after, _)| *after).sum()
    }
}

/// Whether the overlay should play for this context. True once per session.
pub fn should_play(ctx: &AppContext) -> bool {
    ctx.claim_entry_animation()
}

/// Running overlay. Dropping the handle stops the timer task.
pub struct EntryAnimationHandle {
    phase: watch::Receiver<EntryPhase>,
    task: JoinHandle<()>,
}

impl EntryAnimationHandle {
    /// Spawn the timer task on the current runtime.
    pub fn start() -> Self {
        let (tx, rx) = watch::channel(EntryPhase::Intro);
        let task = tokio::spawn(async move {
            let mut current = EntryPhase::Intro;
            while let Some((after, next)) = current.transition() {
                tokio::time::sleep(after).await;
                current = next;
                if tx.send(next).is_err() {
                    break;
                }
            }
        });
        Self { phase: rx, task }
    }

    pub fn phase(&self) -> EntryPhase {
        *self.phase.borrow()
    }

    /// A receiver for rendering code that wants to follow phase changes.
    pub fn subscribe(&self) -> watch::Receiver<EntryPhase> {
        self.phase.clone()
    }

    /// Wait until the overlay reaches `Done`.
    pub async fn finished(&mut self) {
        while !self.phase.borrow_and_update().is_done() {
            if self.phase.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Drop for EntryAnimationHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::memory_context;

    #[test]
    fn test_phase_sequence_from_table() {
        let mut phase = EntryPhase::Intro;
        let mut seen = vec![phase];
        while let Some((_, next)) = phase.transition() {
            phase = next;
            seen.push(phase);
        }
        assert_eq!(
            seen,
            vec![
                EntryPhase::Intro,
                EntryPhase::Reveal,
                EntryPhase::Glow,
                EntryPhase::Hold,
                EntryPhase::Done
            ]
        );
    }

    #[test]
    fn test_tick_crosses_multiple_phases() {
        let mut anim = EntryAnimation::new();
        assert_eq!(anim.tick(Duration::from_millis(599)), EntryPhase::Intro);
        assert_eq!(anim.tick(Duration::from_millis(1)), EntryPhase::Reveal);
        assert_eq!(anim.tick(Duration::from_millis(1500)), EntryPhase::Hold);
        assert_eq!(anim.tick(Duration::from_secs(60)), EntryPhase::Done);
        assert_eq!(anim.tick(Duration::from_secs(1)), EntryPhase::Done);
    }

    #[test]
    fn test_phase_at_total_is_done() {
        let total = EntryAnimation::total_duration();
        assert_eq!(total, Duration::from_millis(3000));
        assert_eq!(EntryAnimation::phase_at(total - Duration::from_millis(1)), EntryPhase::Hold);
        assert_eq!(EntryAnimation::phase_at(total), EntryPhase::Done);
    }

    #[test]
    fn test_should_play_once_per_session() {
        let ctx = memory_context();
        assert!(should_play(&ctx));
        assert!(!should_play(&ctx));
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_publishes_phases() {
        let mut handle = EntryAnimationHandle::start();
        assert_eq!(handle.phase(), EntryPhase::Intro);

        tokio::time::sleep(Duration::from_millis(650)).await;
        assert_eq!(handle.phase(), EntryPhase::Reveal);

        handle.finished().await;
        assert_eq!(handle.phase(), EntryPhase::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timer_task() {
        let handle = EntryAnimationHandle::start();
        let rx = handle.subscribe();
        drop(handle);

        tokio::time::sleep(EntryAnimation::total_duration() * 2).await;
        assert_eq!(*rx.borrow(), EntryPhase::Intro);
    }
}
