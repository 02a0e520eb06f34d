//! Shared fixtures for the controller integration tests.
//!
//! [`ScriptedQueue`] answers polls and notifications from a script and logs
//! every call with the (paused) tokio clock, and [`station`] wires it to mock
//! hardware the way the binary wires the real devices.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use queuepost_core::{JobId, StationConfig};
use queuepost_hardware::mock::{
    MockButtonPanel, MockDisplay, MockDisplayHandle, MockLamp, MockLampHandle,
};
use queuepost_hardware::{ButtonInput, HardwareContext};
use queuepost_network::QueueService;
use queuepost_station::{DisplayDriver, JobController, StatusLamp};
use tokio::time::Instant;

/// One call made against the scripted queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueCall {
    Poll,
    Start(String),
    End(String),
}

#[derive(Debug, Default)]
struct Script {
    polls: VecDeque<Option<JobId>>,
    start_results: VecDeque<bool>,
    end_results: VecDeque<bool>,
    calls: Vec<(QueueCall, Instant)>,
    panic_on_start: bool,
}

/// Queue service driven by a script.
///
/// Polls return the scripted ids in order and `None` once the script runs
/// out. Notifications succeed unless a failure was scripted.
#[derive(Debug, Clone, Default)]
pub struct ScriptedQueue {
    script: Arc<Mutex<Script>>,
}

impl ScriptedQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue that hands out `ids` on consecutive polls.
    pub fn with_jobs(ids: &[u32]) -> Self {
        let queue = Self::new();
        for id in ids {
            queue.push_poll(Some(JobId::from(*id)));
        }
        queue
    }

    pub fn push_poll(&self, result: Option<JobId>) {
        self.lock().polls.push_back(result);
    }

    pub fn push_start_result(&self, acknowledged: bool) {
        self.lock().start_results.push_back(acknowledged);
    }

    pub fn push_end_result(&self, acknowledged: bool) {
        self.lock().end_results.push_back(acknowledged);
    }

    /// Panic inside the next job start notification.
    pub fn panic_on_start(&self) {
        self.lock().panic_on_start = true;
    }

    pub fn calls(&self) -> Vec<QueueCall> {
        self.lock().calls.iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn timed_calls(&self) -> Vec<(QueueCall, Instant)> {
        self.lock().calls.clone()
    }

    /// When each poll was made.
    pub fn poll_times(&self) -> Vec<Instant> {
        self.lock()
            .calls
            .iter()
            .filter(|(c, _)| *c == QueueCall::Poll)
            .map(|(_, at)| *at)
            .collect()
    }

    /// When the first call matching `call` was made.
    pub fn time_of(&self, call: &QueueCall) -> Option<Instant> {
        self.lock()
            .calls
            .iter()
            .find(|(c, _)| c == call)
            .map(|(_, at)| *at)
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: QueueCall) {
        self.lock().calls.push((call, Instant::now()));
    }
}

impl QueueService for ScriptedQueue {
    async fn poll_for_job(&self) -> Option<JobId> {
        self.record(QueueCall::Poll);
        self.lock().polls.pop_front().flatten()
    }

    async fn notify_job_start(&self, id: &JobId) -> bool {
        self.record(QueueCall::Start(id.to_string()));
        let mut script = self.lock();
        if script.panic_on_start {
            script.panic_on_start = false;
            drop(script);
            panic!("scripted failure in job start");
        }
        script.start_results.pop_front().unwrap_or(true)
    }

    async fn notify_job_end(&self, id: &JobId) -> bool {
        self.record(QueueCall::End(id.to_string()));
        self.lock().end_results.pop_front().unwrap_or(true)
    }
}

/// Controller wired to mock hardware, plus handles to observe it.
pub struct Station {
    pub context: HardwareContext,
    pub controller: JobController<ScriptedQueue, MockDisplay, MockLamp>,
    pub queue: ScriptedQueue,
    pub display: MockDisplayHandle,
    pub lamp: MockLampHandle,
    pub panel: MockButtonPanel,
}

/// Build a station around `queue` with the default timing and bounce window.
pub async fn station(queue: ScriptedQueue) -> Station {
    let context = HardwareContext::new();
    let (display, display_handle) = MockDisplay::new(&context).unwrap();
    let (lamp, lamp_handle) = MockLamp::new(&context, 26).unwrap();
    let buttons =
        ButtonInput::new(&context, 21, 20, StationConfig::default().bounce_window()).unwrap();
    let panel = MockButtonPanel::new(&buttons);

    let display = DisplayDriver::init(display, 7).await.unwrap();
    let lamp = StatusLamp::init(lamp).await.unwrap();
    let controller = JobController::new(queue.clone(), display, lamp, buttons);

    Station {
        context,
        controller,
        queue,
        display: display_handle,
        lamp: lamp_handle,
        panel,
    }
}

/// Sleep until `offset` after `origin` on the tokio clock.
pub async fn at(origin: Instant, offset_ms: u64) {
    tokio::time::sleep_until(origin + Duration::from_millis(offset_ms)).await;
}

/// Milliseconds from `origin` to `instant`.
pub fn ms_since(origin: Instant, instant: Instant) -> u64 {
    instant.duration_since(origin).as_millis() as u64
}
