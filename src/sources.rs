/* The tracker never talks to a sensor or a timer directly. The host hands
it providers; each successful `subscribe` returns a `Subscription` that
the tracker keeps for exactly as long as it is running. Providers only
decide whether inputs may flow, the inputs themselves are still pushed
into `Tracker::on_location` / `Tracker::on_tick` by the host.
*/
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::AcquisitionError;

/// Monotonic milliseconds. Only differences between readings matter.
pub trait Clock: Send {
    fn now_ms(&self) -> u64;
}

pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// A clock that only moves when told to. Clones share the same time, so a
/// replay or a test can keep one handle and give the other to a tracker.
#[derive(Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ms(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

pub trait Subscription: Send {
    /// Stop delivering. Must not block on the tracker, it may be called
    /// while the tracker is locked.
    fn release(&mut self);
}

/// Owns a subscription and releases it exactly once, on drop at the latest.
pub struct SubscriptionGuard {
    name: &'static str,
    inner: Option<Box<dyn Subscription>>,
}

impl SubscriptionGuard {
    pub fn new(name: &'static str, subscription: Box<dyn Subscription>) -> Self {
        SubscriptionGuard {
            name,
            inner: Some(subscription),
        }
    }

    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(mut subscription) = self.inner.take() {
            subscription.release();
            debug!("[sources] {} subscription released", self.name);
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.release_inner();
    }
}

pub trait LocationProvider: Send {
    fn subscribe(&mut self) -> Result<Box<dyn Subscription>, AcquisitionError>;
}

pub trait TickProvider: Send {
    fn subscribe(&mut self, interval: Duration) -> Result<Box<dyn Subscription>, AcquisitionError>;
}

/// Ticks from a dedicated thread. The thread is not joined on release: it
/// notices the stop flag on its next wake-up and exits, so releasing from
/// inside a locked tracker cannot deadlock with a tick waiting on that lock.
pub struct ThreadTicker {
    on_tick: Arc<dyn Fn() + Send + Sync>,
}

impl ThreadTicker {
    pub fn new(on_tick: impl Fn() + Send + Sync + 'static) -> Self {
        ThreadTicker {
            on_tick: Arc::new(on_tick),
        }
    }
}

struct ThreadTickerSubscription {
    stopped: Arc<AtomicBool>,
}

impl Subscription for ThreadTickerSubscription {
    fn release(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

impl TickProvider for ThreadTicker {
    fn subscribe(&mut self, interval: Duration) -> Result<Box<dyn Subscription>, AcquisitionError> {
        let stopped = Arc::new(AtomicBool::new(false));
        let thread_stopped = stopped.clone();
        let on_tick = self.on_tick.clone();
        thread::Builder::new()
            .name("stride-ticker".to_string())
            .spawn(move || loop {
                thread::sleep(interval);
                if thread_stopped.load(Ordering::SeqCst) {
                    break;
                }
                on_tick();
            })
            .map_err(|e| AcquisitionError::Unavailable(format!("ticker thread: {e}")))?;
        Ok(Box::new(ThreadTickerSubscription { stopped }))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum LocationPermission {
    Unknown = 0,
    Granted = 1,
    Denied = 2,
    Unavailable = 3,
}

impl LocationPermission {
    fn of_u8(i: u8) -> Self {
        match i {
            1 => LocationPermission::Granted,
            2 => LocationPermission::Denied,
            3 => LocationPermission::Unavailable,
            _ => LocationPermission::Unknown,
        }
    }
}

/// Location source backed by the host's own location callbacks. The host
/// reports the permission outcome and looks at `updates_wanted` to decide
/// whether its GPS should be on.
#[derive(Clone, Default)]
pub struct HostLocation {
    permission: Arc<AtomicU8>,
    wanted: Arc<AtomicBool>,
}

impl HostLocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_permission(&self, permission: LocationPermission) {
        self.permission.store(permission as u8, Ordering::SeqCst);
    }

    pub fn permission(&self) -> LocationPermission {
        LocationPermission::of_u8(self.permission.load(Ordering::SeqCst))
    }

    pub fn updates_wanted(&self) -> bool {
        self.wanted.load(Ordering::SeqCst)
    }
}

struct HostLocationSubscription {
    wanted: Arc<AtomicBool>,
}

impl Subscription for HostLocationSubscription {
    fn release(&mut self) {
        self.wanted.store(false, Ordering::SeqCst);
    }
}

impl LocationProvider for HostLocation {
    fn subscribe(&mut self) -> Result<Box<dyn Subscription>, AcquisitionError> {
        match self.permission() {
            LocationPermission::Granted => {
                self.wanted.store(true, Ordering::SeqCst);
                Ok(Box::new(HostLocationSubscription {
                    wanted: self.wanted.clone(),
                }))
            }
            LocationPermission::Denied => Err(AcquisitionError::PermissionDenied),
            LocationPermission::Unavailable => Err(AcquisitionError::Unavailable(
                "location services are off".to_string(),
            )),
            LocationPermission::Unknown => Err(AcquisitionError::Unavailable(
                "location permission has not been requested".to_string(),
            )),
        }
    }
}
