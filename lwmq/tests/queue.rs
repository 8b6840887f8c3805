mod common;
use common::*;

use lwmq::{MessageQueue, PopError, PushError, QueueError};

#[test]
fn push_increments_pending_count() {
  let queue = MessageQueue::<TestMessage, 1, 1>::new();
  let output = queue.channel_output(0).unwrap();
  let input = queue.channel_input(0).unwrap();

  assert_eq!(output.pending_count(), 0);
  input.push(Counter { value: 0 });
  assert_eq!(output.pending_count(), 1);
}

#[test]
fn pop_returns_tagged_message() {
  let queue = MessageQueue::<TestMessage, 1, 1>::new();
  let output = queue.channel_output(0).unwrap();
  let input = queue.channel_input(0).unwrap();

  input.push(Tagged {
    char_value: 3,
    uint_value: 5,
  });

  let container = output.pop();
  assert_eq!(output.pending_count(), 0);
  assert_eq!(container.tag(), TestMessageType::Tagged);
  let popped = container.read::<Tagged>();
  assert_eq!(popped.char_value, 3);
  assert_eq!(popped.uint_value, 5);
}

#[test]
fn is_full_per_channel() {
  let queue = MessageQueue::<TestMessage, 2, 2>::new();
  let output0 = queue.channel_output(0).unwrap();
  let input0 = queue.channel_input(0).unwrap();
  let output1 = queue.channel_output(1).unwrap();
  let input1 = queue.channel_input(1).unwrap();

  let message = Counter { value: 0 };
  input0.push(message);
  input1.push(message);
  assert!(!input0.is_full());
  assert!(!input1.is_full());

  input0.push(message);
  input1.push(message);
  assert!(input0.is_full());
  assert!(input1.is_full());

  output0.pop();
  assert!(!input0.is_full());
  assert!(input1.is_full());
  output0.pop();
  output1.pop();
  output1.pop();
  assert!(!input0.is_full());
  assert!(!input1.is_full());
  assert_eq!(output0.pending_count(), 0);
  assert_eq!(output1.pending_count(), 0);
}

#[test]
fn fifo_order_with_distinct_payloads() {
  let queue = MessageQueue::<TestMessage, 256, 1>::new();
  let input = queue.channel_input(0).unwrap();
  let output = queue.channel_output(0).unwrap();

  for i in 0..ITEMS_MEDIUM as u32 {
    match i % 3 {
      0 => input.push(Counter { value: i }),
      1 => input.push(Tagged {
        char_value: i as u8,
        uint_value: i,
      }),
      _ => input.push(Measurement {
        uint_value: i,
        double_value: i as f64 * 0.5,
      }),
    }
  }

  for i in 0..ITEMS_MEDIUM as u32 {
    let container = output.pop();
    match container.into_inner() {
      TestMessage::Counter(c) => {
        assert_eq!(i % 3, 0);
        assert_eq!(c.value, i);
      }
      TestMessage::Tagged(t) => {
        assert_eq!(i % 3, 1);
        assert_eq!((t.char_value, t.uint_value), (i as u8, i));
      }
      TestMessage::Measurement(m) => {
        assert_eq!(i % 3, 2);
        assert_eq!(m.uint_value, i);
        assert_eq!(m.double_value.to_bits(), (i as f64 * 0.5).to_bits());
      }
    }
  }
  assert!(output.is_empty());
}

#[test]
fn occupancy_after_pushes_and_pops() {
  const CAP: usize = 16;
  let queue = MessageQueue::<TestMessage, CAP, 1>::new();
  let input = queue.channel_input(0).unwrap();
  let output = queue.channel_output(0).unwrap();

  for k in 0..CAP {
    assert_eq!(input.occupancy(), k);
    input.push(Counter { value: k as u32 });
  }
  assert_eq!(output.pending_count(), CAP);
  assert!(input.is_full());

  for m in 1..=CAP {
    output.pop();
    assert_eq!(output.pending_count(), CAP - m);
    assert!(!input.is_full());
  }
  assert_eq!(queue.occupancy(0), Some(0));
}

#[test]
fn channels_are_isolated() {
  let queue = MessageQueue::<TestMessage, 8, 4>::new();
  let inputs: Vec<_> = (0..4).map(|i| queue.channel_input(i).unwrap()).collect();
  let outputs = queue.channel_outputs().unwrap();

  for (i, input) in inputs.iter().enumerate() {
    for _ in 0..=i {
      input.push(Counter { value: i as u32 });
    }
  }
  for (i, output) in outputs.iter().enumerate() {
    assert_eq!(output.pending_count(), i + 1);
  }

  outputs[2].drain(|c| assert_eq!(c.read::<Counter>().value, 2));
  assert_eq!(outputs[2].pending_count(), 0);
  assert_eq!(outputs[1].pending_count(), 2);
  assert_eq!(outputs[3].pending_count(), 4);
}

#[test]
fn checked_variants_report_errors() {
  init_tracing();
  let queue = MessageQueue::<TestMessage, 2, 1>::new();
  let input = queue.channel_input(0).unwrap();
  let output = queue.channel_output(0).unwrap();

  assert_eq!(output.try_pop().unwrap_err(), PopError::Empty);
  input.try_push(Counter { value: 1 }).unwrap();
  input.try_push(Counter { value: 2 }).unwrap();

  let rejected = Tagged {
    char_value: b'x',
    uint_value: 3,
  };
  match input.try_push(rejected) {
    Err(PushError::Full(back)) => assert_eq!(back, rejected),
    other => panic!("Expected PushError::Full, got {:?}", other),
  }
  // The rejected message did not overwrite anything.
  assert_eq!(output.try_pop().unwrap().read::<Counter>().value, 1);
  assert_eq!(output.try_pop().unwrap().read::<Counter>().value, 2);
  assert_eq!(output.try_pop().unwrap_err(), PopError::Empty);
}

#[test]
#[should_panic(expected = "push to a full channel (capacity 1)")]
fn push_to_full_channel_panics() {
  init_tracing();
  let queue = MessageQueue::<TestMessage, 1, 1>::new();
  let input = queue.channel_input(0).unwrap();
  input.push(Counter { value: 1 });
  input.push(Counter { value: 2 });
}

#[test]
#[should_panic(expected = "pop from an empty channel")]
fn pop_from_empty_channel_panics() {
  let queue = MessageQueue::<TestMessage, 4, 1>::new();
  let output = queue.channel_output(0).unwrap();
  output.pop();
}

#[test]
fn push_message_accepts_wrapped_values() {
  let queue = MessageQueue::<TestMessage, 4, 1>::new();
  let input = queue.channel_input(0).unwrap();
  let output = queue.channel_output(0).unwrap();
  input.push_message(TestMessage::Counter(Counter { value: 77 }));
  assert_eq!(
    output.pop().into_inner(),
    TestMessage::Counter(Counter { value: 77 })
  );
}

#[test]
fn unchecked_fast_path_round_trip() {
  let queue = MessageQueue::<TestMessage, 64, 1>::new();
  let input = queue.channel_input(0).unwrap();
  let output = queue.channel_output(0).unwrap();

  for i in 0..ITEMS_LOW as u32 {
    assert!(!input.is_full());
    unsafe { input.push_unchecked(Counter { value: i }) };
  }
  let pending = output.pending_count();
  assert_eq!(pending, ITEMS_LOW);
  for i in 0..pending as u32 {
    let container = unsafe { output.pop_unchecked() };
    assert!(container.is::<Counter>());
    assert_eq!(unsafe { container.read_unchecked::<Counter>() }.value, i);
  }
}

#[test]
fn handle_errors_at_acquisition() {
  init_tracing();
  let queue = MessageQueue::<TestMessage, 4, 2>::new();
  assert_eq!(
    queue.channel_input(2).unwrap_err(),
    QueueError::IndexOutOfRange {
      index: 2,
      channels: 2
    }
  );
  let _input = queue.channel_input(0).unwrap();
  assert_eq!(
    queue.channel_input(0).unwrap_err(),
    QueueError::ProducerClaimed { index: 0 }
  );
}

#[test]
fn producer_handle_moves_between_threads() {
  let queue = MessageQueue::<TestMessage, 2048, 2>::new();
  let outputs = queue.channel_outputs().unwrap();

  std::thread::scope(|s| {
    for index in 0..2 {
      let input = queue.channel_input(index).unwrap();
      s.spawn(move || {
        for i in 0..ITEMS_HIGH as u32 {
          assert!(!input.is_full());
          input.push(Tagged {
            char_value: index as u8,
            uint_value: i,
          });
        }
      });
    }
  });

  for (index, output) in outputs.iter().enumerate() {
    let mut next = 0;
    let drained = output.drain(|c| {
      let tagged = c.read::<Tagged>();
      assert_eq!(tagged.char_value as usize, index);
      assert_eq!(tagged.uint_value, next);
      next += 1;
    });
    assert_eq!(drained, ITEMS_HIGH);
  }
}

#[test]
fn drain_with_reentrant_pop_keeps_occupancy_in_bounds() {
  let queue = MessageQueue::<TestMessage, 4, 1>::new();
  let input = queue.channel_input(0).unwrap();
  let output = queue.channel_output(0).unwrap();
  input.push(Counter { value: 1 });
  input.push(Counter { value: 2 });

  let mut seen = Vec::new();
  let drained = output.drain(|container| {
    seen.push(container.read::<Counter>().value);
    let _ = output.try_pop();
  });
  assert_eq!(drained, 1);
  assert_eq!(seen, vec![1]);
  assert_eq!(output.pending_count(), 0);
  assert_eq!(queue.occupancy(0), Some(0));

  for i in 0..4 {
    input.push(Counter { value: i });
  }
  assert!(input.is_full());
  assert!(input.try_push(Counter { value: 9 }).is_err());
  for i in 0..4 {
    assert_eq!(output.pop().read::<Counter>().value, i);
  }
}
