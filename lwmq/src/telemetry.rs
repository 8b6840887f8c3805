// src/telemetry.rs

//! Debug instrumentation for queue setup and contract rejections. Compiled to
//! no-ops unless the `lwmq_telemetry` feature is on. Never called on the
//! successful push/pop path.

#[cfg(feature = "lwmq_telemetry")]
mod enabled {
  use parking_lot::Mutex;
  use std::collections::HashMap;
  use std::fmt::{self, Write as _};
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::thread::{self, ThreadId};
  use std::time::Instant;

  static NEXT_EVENT_SEQUENCE_ID: AtomicUsize = AtomicUsize::new(0);

  /// One recorded occurrence.
  #[derive(Clone)]
  pub struct TelemetryEvent {
    /// Global sequence number across all events.
    pub seq_id: usize,
    /// When the event was recorded.
    pub timestamp: Instant,
    /// Recording thread.
    pub os_thread_id: ThreadId,
    /// Channel the event concerns, if any.
    pub channel: Option<usize>,
    /// Code location, e.g. `queue::MessageQueue::channel_input`.
    pub location: &'static str,
    /// Event kind, e.g. `ProducerClaimed`.
    pub event_type: &'static str,
    /// Optional free-form detail.
    pub message: Option<String>,
  }

  impl fmt::Debug for TelemetryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("TelemetryEvent")
        .field("seq", &self.seq_id)
        .field("os_tid", &self.os_thread_id)
        .field("channel", &self.channel)
        .field("loc", &self.location)
        .field("evt", &self.event_type)
        .field("msg", &self.message.as_deref().unwrap_or(""))
        .finish()
    }
  }

  type CounterKey = (&'static str, &'static str); // (location, counter_name)

  struct CollectorData {
    events: Vec<TelemetryEvent>,
    counters: HashMap<CounterKey, usize>,
    start_time: Instant,
  }

  impl CollectorData {
    fn new() -> Self {
      CollectorData {
        events: Vec::new(),
        counters: HashMap::new(),
        start_time: Instant::now(),
      }
    }
  }

  lazy_static::lazy_static! {
    static ref GLOBAL_COLLECTOR: Mutex<CollectorData> = Mutex::new(CollectorData::new());
  }

  /// Records an event.
  pub fn log_event_fn(
    channel: Option<usize>,
    location: &'static str,
    event_type: &'static str,
    message: Option<String>,
  ) {
    let event = TelemetryEvent {
      seq_id: NEXT_EVENT_SEQUENCE_ID.fetch_add(1, Ordering::Relaxed),
      timestamp: Instant::now(),
      os_thread_id: thread::current().id(),
      channel,
      location,
      event_type,
      message,
    };
    GLOBAL_COLLECTOR.lock().events.push(event);
  }

  /// Bumps the named counter at `location`.
  pub fn increment_counter_fn(location: &'static str, counter_name: &'static str) {
    *GLOBAL_COLLECTOR
      .lock()
      .counters
      .entry((location, counter_name))
      .or_insert(0) += 1;
  }

  /// Current value of a counter; 0 if never bumped.
  pub fn counter_value_fn(location: &'static str, counter_name: &'static str) -> usize {
    GLOBAL_COLLECTOR
      .lock()
      .counters
      .get(&(location, counter_name))
      .copied()
      .unwrap_or(0)
  }

  /// Snapshot of all events in sequence order.
  pub fn events_fn() -> Vec<TelemetryEvent> {
    let mut events = GLOBAL_COLLECTOR.lock().events.clone();
    events.sort_by_key(|e| e.seq_id);
    events
  }

  /// Renders all events and counters as text.
  pub fn telemetry_report_fn() -> String {
    let collector = GLOBAL_COLLECTOR.lock();
    let mut out = String::new();
    let _ = writeln!(out, "--- lwmq Telemetry Report (Feature: lwmq_telemetry) ---");

    if collector.events.is_empty() {
      let _ = writeln!(out, "[Events] No events recorded.");
    } else {
      let _ = writeln!(out, "[Events] Recorded Events ({}):", collector.events.len());
      let mut sorted_events = collector.events.clone();
      sorted_events.sort_by_key(|e| e.seq_id);
      for event in sorted_events.iter() {
        let since_start = event.timestamp.duration_since(collector.start_time);
        let _ = writeln!(
          out,
          "  +{:<10.6}s [Seq:{:<5}] TID:{:<12} Chan:{:<4} Loc:{:<40} Evt:{:<20} Msg: {}",
          since_start.as_secs_f64(),
          event.seq_id,
          format!("{:?}", event.os_thread_id),
          event.channel.map_or_else(|| "-".to_string(), |c| c.to_string()),
          event.location,
          event.event_type,
          event.message.as_deref().unwrap_or("")
        );
      }
    }

    if collector.counters.is_empty() {
      let _ = writeln!(out, "[Counters] No counters recorded.");
    } else {
      let _ = writeln!(out, "[Counters] Recorded Counters ({}):", collector.counters.len());
      let mut sorted_counters: Vec<_> = collector.counters.iter().collect();
      sorted_counters.sort_by_key(|(k, _v)| **k);
      for ((loc, name), count) in sorted_counters {
        let _ = writeln!(out, "  Loc:{:<40} Counter:{:<20} Value: {}", loc, name, count);
      }
    }
    let _ = writeln!(out, "--- End of Telemetry Report ---");
    out
  }

  /// Prints the report to stdout.
  pub fn print_telemetry_report_fn() {
    println!("{}", telemetry_report_fn());
  }

  /// Drops all recorded events and counters.
  pub fn clear_telemetry_fn() {
    let mut collector = GLOBAL_COLLECTOR.lock();
    collector.events.clear();
    collector.counters.clear();
    collector.start_time = Instant::now();
    NEXT_EVENT_SEQUENCE_ID.store(0, Ordering::Relaxed);
  }
}

#[cfg(not(feature = "lwmq_telemetry"))]
mod disabled {
  /// Records an event.
  #[inline(always)]
  pub fn log_event_fn(
    _channel: Option<usize>,
    _location: &'static str,
    _event_type: &'static str,
    _message: Option<String>,
  ) {
  }
  /// Bumps the named counter at `location`.
  #[inline(always)]
  pub fn increment_counter_fn(_location: &'static str, _counter_name: &'static str) {}
  /// Current value of a counter; 0 if never bumped.
  #[inline(always)]
  pub fn counter_value_fn(_location: &'static str, _counter_name: &'static str) -> usize {
    0
  }
  /// Renders all events and counters as text.
  #[inline(always)]
  pub fn telemetry_report_fn() -> String {
    String::new()
  }
  /// Prints the report to stdout.
  #[inline(always)]
  pub fn print_telemetry_report_fn() {}
  /// Drops all recorded events and counters.
  #[inline(always)]
  pub fn clear_telemetry_fn() {}
}

#[cfg(feature = "lwmq_telemetry")]
pub use enabled::{
  clear_telemetry_fn as clear_telemetry, counter_value_fn as counter_value, events_fn as events,
  increment_counter_fn as increment_counter, log_event_fn as log_event,
  print_telemetry_report_fn as print_telemetry_report, telemetry_report_fn as telemetry_report,
  TelemetryEvent,
};

#[cfg(not(feature = "lwmq_telemetry"))]
pub use disabled::{
  clear_telemetry_fn as clear_telemetry, counter_value_fn as counter_value,
  increment_counter_fn as increment_counter, log_event_fn as log_event,
  print_telemetry_report_fn as print_telemetry_report, telemetry_report_fn as telemetry_report,
};
