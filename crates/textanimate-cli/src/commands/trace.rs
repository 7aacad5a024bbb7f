use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use textanimate_core::runtime::HostStats;
use textanimate_core::timing::as_millis_f64;
use textanimate_core::{AnimationRequest, Host, Phase, Runtime, Signal, TextAnimate, TriggerMode, Visual};

pub struct TraceOptions {
    pub run_for: u64,
    pub step: u64,
    pub activate_at: Option<u64>,
    pub realtime: bool,
}

/// One line of trace output
#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub time_ms: f64,
    pub phase: Phase,
    pub runs: u32,
    pub visual: Visual,
    pub stats: HostStats,
}

impl Snapshot {
    fn capture(animator: &TextAnimate, runtime: &Runtime) -> Self {
        Self {
            time_ms: as_millis_f64(runtime.now()),
            phase: animator.phase(),
            runs: animator.runs(),
            visual: animator.view(),
            stats: *runtime.stats(),
        }
    }
}

/// Signal that starts an animation with the given trigger
fn activation(trigger: TriggerMode) -> Option<Signal> {
    match trigger {
        TriggerMode::Hover => Some(Signal::PointerEnter),
        TriggerMode::Click => Some(Signal::Click),
        TriggerMode::View => Some(Signal::Intersection { ratio: 1.0 }),
        TriggerMode::Auto | TriggerMode::Manual => None,
    }
}

pub async fn run(request: AnimationRequest, options: TraceOptions) -> Result<()> {
    let step = Duration::from_millis(options.step.max(1));
    let mut tracer = Tracer::new(request, &options);
    while let Some(snapshot) = tracer.next_snapshot() {
        println!("{}", serde_json::to_string(&snapshot)?);
        if options.realtime {
            tokio::time::sleep(step).await;
        }
    }
    let stats = tracer.finish();
    info!(balanced = stats.balanced(), "Trace finished");
    Ok(())
}

struct Tracer {
    runtime: Runtime,
    animator: TextAnimate,
    signal: Option<(Duration, Signal)>,
    step: Duration,
    end: Duration,
    next: Option<Duration>,
}

impl Tracer {
    fn new(request: AnimationRequest, options: &TraceOptions) -> Self {
        let trigger = request.trigger;
        let signal = match (options.activate_at, activation(trigger)) {
            (Some(at), Some(signal)) => Some((Duration::from_millis(at), signal)),
            (Some(_), None) => {
                warn!(%trigger, "Trigger has no activation signal, ignoring --activate-at");
                None
            }
            (None, _) => None,
        };

        let mut runtime = Runtime::new();
        let mut animator = TextAnimate::new(request);
        animator.mount(&mut runtime);

        Self {
            runtime,
            animator,
            signal,
            step: Duration::from_millis(options.step.max(1)),
            end: Duration::from_millis(options.run_for),
            next: Some(Duration::ZERO),
        }
    }

    fn advance(&mut self, until: Duration) {
        let animator = &mut self.animator;
        self.runtime.advance_to(until, |wakeup, runtime| {
            animator.on_wakeup(wakeup, runtime);
        });
    }

    fn next_snapshot(&mut self) -> Option<Snapshot> {
        let at = self.next?;
        if let Some((when, signal)) = self.signal {
            if when <= at {
                self.advance(when);
                self.animator.handle(signal, &mut self.runtime);
                self.signal = None;
            }
        }
        self.advance(at);

        self.next = (at < self.end).then(|| (at + self.step).min(self.end));
        Some(Snapshot::capture(&self.animator, &self.runtime))
    }

    fn finish(mut self) -> HostStats {
        self.animator.unmount(&mut self.runtime);
        *self.runtime.stats()
    }
}
