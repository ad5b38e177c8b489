//! Event plumbing
//!
//! Host events enter through the [`EventDispatcher`], become [`AppEvent`]s
//! on the shared [`EventBus`], and reach subscribers synchronously.
//! [`timing`] holds the keyed throttle and debounce helpers the dispatcher
//! uses for high-frequency input.

pub mod bus;
pub mod dispatcher;
pub mod timing;

pub use bus::{AppEvent, BusStats, EventBus, EventKind, PanicSink, Subscription, SwipeDirection};
pub use dispatcher::{Dispatch, DispatcherMetrics, EventDispatcher, HostEvent, KeyInput};
pub use timing::{Debounced, Debouncer, Throttle, ThrottleCache};
