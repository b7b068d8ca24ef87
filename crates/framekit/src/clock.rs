//! Fixed-timestep clock.
//!
//! The clock turns variable frame times into a whole number of fixed ticks
//! (60 Hz by default) using an accumulator, capped at `max_substeps` ticks per
//! frame so a long stall cannot snowball into an ever-growing backlog.
//!
//! # Failure Handling
//!
//! A tick callback may fail. The failing tick still counts, the remaining
//! ticks of that frame are dropped, and the error is returned to the caller.
//! The clock itself keeps running: the next call to [`Clock::run`] proceeds
//! normally.

use tracing::warn;

use crate::config::LoopConfig;

/// Per-tick information handed to the tick callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    /// Zero-based tick number
    pub tick: u64,
    /// Fixed timestep in seconds
    pub dt: f32,
    /// Simulated time at the start of this tick, in seconds
    pub time: f64,
}

/// Fixed-timestep accumulator clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Clock {
    dt: f32,
    max_substeps: u32,
    accumulator: f32,
    tick: u64,
}

impl Clock {
    /// Creates a clock from the loop configuration.
    #[must_use]
    pub fn new(config: &LoopConfig) -> Self {
        Self {
            dt: config.dt(),
            max_substeps: config.max_substeps.max(1),
            accumulator: 0.0,
            tick: 0,
        }
    }

    /// Fixed timestep in seconds.
    #[must_use]
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Number of ticks run so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Context for the next tick.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn next_context(&self) -> TickContext {
        TickContext {
            tick: self.tick,
            dt: self.dt,
            time: self.tick as f64 * f64::from(self.dt),
        }
    }

    /// Runs exactly one tick regardless of accumulated time.
    ///
    /// # Errors
    ///
    /// Returns the callback's error. The tick still counts.
    pub fn step<E>(&mut self, mut tick: impl FnMut(TickContext) -> Result<(), E>) -> Result<(), E> {
        let ctx = self.next_context();
        self.tick += 1;
        tick(ctx)
    }

    /// Accumulates `elapsed` seconds and runs as many fixed ticks as fit, up to
    /// the substep cap. Returns the number of ticks run.
    ///
    /// # Errors
    ///
    /// Returns the first callback error. The remaining ticks of this frame and
    /// any leftover accumulated time are dropped.
    pub fn run<E>(
        &mut self,
        elapsed: f32,
        mut tick: impl FnMut(TickContext) -> Result<(), E>,
    ) -> Result<u32, E> {
        if elapsed.is_finite() && elapsed > 0.0 {
            self.accumulator += elapsed;
        }

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < self.max_substeps {
            self.accumulator -= self.dt;
            substeps += 1;
            if let Err(err) = self.step(&mut tick) {
                warn!(tick = self.tick - 1, "tick aborted");
                self.accumulator = 0.0;
                return Err(err);
            }
        }

        // Spiral-of-death guard: drop backlog beyond the cap
        if substeps == self.max_substeps && self.accumulator >= self.dt {
            self.accumulator = 0.0;
        }
        Ok(substeps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> Clock {
        Clock::new(&LoopConfig::default())
    }

    #[test]
    fn runs_one_tick_per_nominal_frame() {
        let mut clock = clock();
        let mut seen = Vec::new();
        let ran = clock
            .run(1.0 / 60.0 + 1e-6, |ctx| {
                seen.push(ctx.tick);
                Ok::<_, ()>(())
            })
            .unwrap();
        assert_eq!(ran, 1);
        assert_eq!(seen, vec![0]);
        assert_eq!(clock.ticks(), 1);
    }

    #[test]
    fn accumulates_short_frames() {
        let mut clock = clock();
        let mut count = 0;
        for _ in 0..4 {
            clock
                .run(1.0 / 240.0 + 1e-6, |_| {
                    count += 1;
                    Ok::<_, ()>(())
                })
                .unwrap();
        }
        assert_eq!(count, 1);
    }

    #[test]
    fn caps_substeps_and_drops_backlog() {
        let mut clock = clock();
        let ran = clock.run(10.0, |_| Ok::<_, ()>(())).unwrap();
        assert_eq!(ran, 8);

        let ran = clock.run(0.0, |_| Ok::<_, ()>(())).unwrap();
        assert_eq!(ran, 0);
    }

    #[test]
    fn failing_tick_aborts_frame_but_clock_keeps_running() {
        let mut clock = clock();
        let mut calls = 0;
        let result = clock.run(4.0 / 60.0 + 1e-4, |ctx| {
            calls += 1;
            if ctx.tick == 1 {
                Err("boom")
            } else {
                Ok(())
            }
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(calls, 2);
        assert_eq!(clock.ticks(), 2);

        let ran = clock.run(1.0 / 60.0 + 1e-6, |_| Ok::<_, &str>(())).unwrap();
        assert_eq!(ran, 1);
        assert_eq!(clock.ticks(), 3);
    }

    #[test]
    fn context_reports_time() {
        let mut clock = clock();
        for _ in 0..60 {
            clock.step(|_| Ok::<_, ()>(())).unwrap();
        }
        let ctx = clock.next_context();
        assert_eq!(ctx.tick, 60);
        assert!((ctx.time - 1.0).abs() < 1e-4);
    }

    #[test]
    fn ignores_negative_and_nan_elapsed() {
        let mut clock = clock();
        assert_eq!(clock.run(-1.0, |_| Ok::<_, ()>(())).unwrap(), 0);
        assert_eq!(clock.run(f32::NAN, |_| Ok::<_, ()>(())).unwrap(), 0);
    }
}
