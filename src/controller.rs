/*
 *  controller.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Refresh cycle state machine: fetch, lay out, render, present, sleep
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::{error, info, warn};
use std::future::Future;
use std::time::Duration;

use crate::display::BoxedSink;
use crate::error::AppError;
use crate::layout::{LayoutEngine, LayoutSpec};
use crate::render;
use crate::weather::{SourceError, WeatherProvider, WeatherSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Fetching,
    Rendering,
    Presenting,
    Sleeping,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// weather frame shown (possibly from a stale cache)
    Presented,
    /// no snapshot at all; the error frame was shown instead
    NoData { reason: String },
    /// the sink refused the frame
    PresentFailed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub final_state: CycleState,
    pub stale: bool,
    pub outcome: CycleOutcome,
}

impl CycleReport {
    pub fn is_success(&self) -> bool {
        self.outcome == CycleOutcome::Presented
    }

    /// The report when the weather frame was shown, otherwise the failure
    /// as an [`AppError`].
    pub fn into_result(self) -> Result<CycleReport, AppError> {
        match self.outcome {
            CycleOutcome::Presented => Ok(self),
            CycleOutcome::NoData { reason } => Err(AppError::NoDataAvailable(reason)),
            CycleOutcome::PresentFailed { reason } => Err(AppError::PresentFailed(reason)),
        }
    }
}

/// Drives refresh cycles. Owns the source (and its cache), the layout and
/// the sink for the life of the process. One cycle at a time.
pub struct RefreshController<P> {
    source: WeatherSource<P>,
    engine: LayoutEngine,
    layout: LayoutSpec,
    sink: BoxedSink,
    interval: Duration,
    state: CycleState,
    history: Vec<CycleState>,
}

impl<P: WeatherProvider> RefreshController<P> {
    pub fn new(source: WeatherSource<P>, engine: LayoutEngine, layout: LayoutSpec, sink: BoxedSink, interval: Duration) -> Self {
        Self {
            source,
            engine,
            layout,
            sink,
            interval,
            state: CycleState::Idle,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    /// States visited by the most recent cycle, in order.
    pub fn history(&self) -> &[CycleState] {
        &self.history
    }

    pub fn source(&self) -> &WeatherSource<P> {
        &self.source
    }

    fn transition(&mut self, next: CycleState) {
        if next != self.state {
            info!("state: {:?} -> {:?}", self.state, next);
        }
        self.state = next;
        self.history.push(next);
    }

    /// One full fetch, layout, render and present pass.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.history.clear();
        self.transition(CycleState::Idle);
        self.transition(CycleState::Fetching);

        let (instructions, stale, no_data) = match self.source.current_snapshot().await {
            Ok(reading) => {
                if reading.is_stale {
                    warn!("showing stale data from {}", reading.snapshot.timestamp);
                }
                self.transition(CycleState::Rendering);
                let ins = self.engine.build_instructions(&reading.snapshot, &self.layout, reading.is_stale);
                (ins, reading.is_stale, None)
            }
            Err(SourceError::NoDataAvailable { cause }) => {
                error!("no weather data available: {}", cause);
                self.transition(CycleState::Failed);
                self.transition(CycleState::Rendering);
                let reason = cause.to_string();
                (self.engine.build_error_instructions(&self.layout, &reason), false, Some(reason))
            }
        };

        let canvas = render::paint(&instructions, self.layout.size());
        self.transition(CycleState::Presenting);
        let presented = self.sink.present(canvas);
        if let Err(e) = self.sink.sleep() {
            warn!("{}: sleep failed: {}", self.sink.name(), e);
        }

        match (presented, no_data) {
            (Err(e), _) => {
                error!("{}: present failed: {}", self.sink.name(), e);
                self.transition(CycleState::Failed);
                CycleReport {
                    final_state: CycleState::Failed,
                    stale,
                    outcome: CycleOutcome::PresentFailed { reason: e.to_string() },
                }
            }
            (Ok(()), Some(reason)) => CycleReport {
                final_state: CycleState::Failed,
                stale: false,
                outcome: CycleOutcome::NoData { reason },
            },
            (Ok(()), None) => {
                info!("{}: frame presented{}", self.sink.name(), if stale { " (stale)" } else { "" });
                CycleReport { final_state: CycleState::Presenting, stale, outcome: CycleOutcome::Presented }
            }
        }
    }

    /// Single-shot mode: one cycle, then done.
    pub async fn run_once(&mut self) -> CycleReport {
        self.run_cycle().await
    }

    /// Cycle, then sleep for the refresh interval, until `shutdown`
    /// resolves. Shutdown is only noticed while sleeping. Returns the number
    /// of cycles run.
    pub async fn run_loop<F>(&mut self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycles = 0;
        loop {
            let report = self.run_cycle().await;
            cycles += 1;
            if !report.is_success() {
                warn!("cycle {} ended with {:?}", cycles, report.outcome);
            }

            self.transition(CycleState::Sleeping);
            info!("next refresh in {}s", self.interval.as_secs());
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut shutdown => {
                    info!("shutdown requested after {} cycles", cycles);
                    break;
                }
            }
        }
        cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayError, DisplaySink};
    use crate::i18n::I18n;
    use crate::layout::LayoutConfig;
    use crate::render::{CanvasPair, Plane};
    use crate::weather::{Condition, FetchError, SourcePolicy, Units, WeatherSnapshot};
    use chrono::{TimeZone, Utc};
    use embedded_graphics::prelude::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    struct Scripted {
        replies: VecDeque<Result<WeatherSnapshot, FetchError>>,
        calls: usize,
    }

    impl WeatherProvider for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn fetch(&mut self) -> Result<WeatherSnapshot, FetchError> {
            self.calls += 1;
            self.replies.pop_front().unwrap_or(Err(FetchError::Timeout))
        }
    }

    #[derive(Clone, Default)]
    struct Recorder {
        frames: Arc<Mutex<Vec<CanvasPair>>>,
        refuse: bool,
    }

    impl DisplaySink for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn size(&self) -> Size {
            Size::new(800, 480)
        }

        fn present(&mut self, canvas: CanvasPair) -> Result<(), DisplayError> {
            if self.refuse {
                return Err(DisplayError::Spi("bus gone".into()));
            }
            self.frames.lock().unwrap().push(canvas);
            Ok(())
        }
    }

    fn snapshot() -> WeatherSnapshot {
        let ts = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        WeatherSnapshot::new(ts, "Oslo", Units::Metric, -4.5, Condition::new(600, "13d", "light snow"))
    }

    fn controller(replies: Vec<Result<WeatherSnapshot, FetchError>>, ttl: Duration, sink: Recorder) -> RefreshController<Scripted> {
        let provider = Scripted { replies: replies.into(), calls: 0 };
        let source = WeatherSource::new(provider, SourcePolicy { ttl, retry_backoff: Duration::ZERO });
        let layout = LayoutSpec::from_config(&LayoutConfig::default(), Size::new(800, 480)).unwrap();
        RefreshController::new(source, LayoutEngine::new(I18n::english()), layout, Box::new(sink), Duration::from_millis(10))
    }

    #[tokio::test]
    async fn successful_cycle_walks_the_happy_path() {
        let sink = Recorder::default();
        let mut ctl = controller(vec![Ok(snapshot())], Duration::from_secs(600), sink.clone());

        let report = ctl.run_once().await;
        assert!(report.is_success());
        assert!(!report.stale);
        assert_eq!(report.clone().into_result().unwrap(), report);
        assert_eq!(
            ctl.history(),
            &[CycleState::Idle, CycleState::Fetching, CycleState::Rendering, CycleState::Presenting]
        );
        let frames = sink.frames.lock().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].size(), Size::new(800, 480));
        assert!(frames[0].black.ink_count() > 0);
    }

    #[tokio::test]
    async fn no_data_shows_error_frame_and_fails() {
        let sink = Recorder::default();
        let mut ctl = controller(vec![Err(FetchError::Connect("dns".into()))], Duration::from_secs(600), sink.clone());

        let report = ctl.run_once().await;
        assert!(!report.is_success());
        assert_eq!(report.final_state, CycleState::Failed);
        assert!(matches!(report.outcome, CycleOutcome::NoData { .. }));
        assert!(matches!(report.clone().into_result(), Err(AppError::NoDataAvailable(r)) if r == "request timed out"));
        assert_eq!(
            ctl.history(),
            &[CycleState::Idle, CycleState::Fetching, CycleState::Failed, CycleState::Rendering, CycleState::Presenting]
        );
        // error frame: headline on black, frame on red
        let frames = sink.frames.lock().unwrap();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].plane(Plane::Black).ink_count() > 0);
        assert!(frames[0].plane(Plane::Red).ink_count() > 0);
    }

    #[tokio::test]
    async fn failed_refresh_after_success_presents_stale_frame() {
        let sink = Recorder::default();
        let mut ctl = controller(vec![Ok(snapshot()), Err(FetchError::Status(500))], Duration::ZERO, sink.clone());

        assert!(ctl.run_cycle().await.is_success());
        let report = ctl.run_cycle().await;
        assert!(report.is_success());
        assert!(report.stale);

        let frames = sink.frames.lock().unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames[1].red.ink_count() > frames[0].red.ink_count());
        assert_eq!(frames[0].black, frames[1].black);
    }

    #[tokio::test]
    async fn sink_failure_is_reported() {
        let sink = Recorder { refuse: true, ..Recorder::default() };
        let mut ctl = controller(vec![Ok(snapshot())], Duration::from_secs(600), sink);

        let report = ctl.run_once().await;
        assert_eq!(report.final_state, CycleState::Failed);
        assert!(matches!(report.outcome, CycleOutcome::PresentFailed { .. }));
        assert_eq!(ctl.state(), CycleState::Failed);
        let err = report.into_result().unwrap_err();
        assert_eq!(err.to_string(), "frame not presented: SPI communication error: bus gone");
    }

    #[tokio::test]
    async fn loop_stops_on_shutdown_while_sleeping() {
        let sink = Recorder::default();
        let mut ctl = controller(vec![Ok(snapshot())], Duration::from_secs(600), sink.clone());

        let cycles = ctl.run_loop(async {}).await;
        assert_eq!(cycles, 1);
        assert_eq!(ctl.state(), CycleState::Sleeping);
        assert_eq!(sink.frames.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn loop_reuses_cache_between_cycles() {
        let sink = Recorder::default();
        let mut ctl = controller(vec![Ok(snapshot())], Duration::from_secs(600), sink.clone());

        let cycles = ctl.run_loop(tokio::time::sleep(Duration::from_millis(300))).await;
        assert!(cycles >= 2);
        assert_eq!(ctl.source().provider().calls, 1);
        assert_eq!(sink.frames.lock().unwrap().len() as u64, cycles);
    }
}
