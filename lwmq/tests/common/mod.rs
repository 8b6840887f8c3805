#![allow(dead_code)]

use std::time::Duration;

pub const STRESS_TIMEOUT: Duration = Duration::from_secs(60);
pub const ITEMS_LOW: usize = 50;
pub const ITEMS_MEDIUM: usize = 200;
pub const ITEMS_HIGH: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
  pub value: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tagged {
  pub char_value: u8,
  pub uint_value: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
  pub uint_value: u32,
  pub double_value: f64,
}

lwmq::message_universe! {
  #[derive(Debug, PartialEq)]
  pub enum TestMessage: TestMessageType {
    Counter(Counter),
    Tagged(Tagged),
    Measurement(Measurement),
  }
}

/// Installs a test-writer subscriber so library logs show up under `--nocapture`.
pub fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::new("lwmq=trace"))
    .with_test_writer()
    .try_init();
}
