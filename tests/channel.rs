#![cfg(not(loom))]

use bounded_buffer::channel::{Consumer, Producer};
use bounded_buffer::{channel, Builder, TakeError};
use std::thread;
use std::time::Duration;

fn seq_test(amt: u32, cap: usize) {
    let (tx, rx) = channel(cap).unwrap();
    let t = thread::spawn(move || send_sequence(amt, tx));

    let mut n = 0;
    for i in &rx {
        assert_eq!(i, n);
        n += 1;
    }
    assert_eq!(n, amt);

    t.join().unwrap();
}

fn send_sequence(n: u32, producer: Producer<u32>) {
    for x in 0..n {
        producer.put(x).unwrap();
    }
}

#[test]
#[cfg_attr(miri, ignore)]
fn channel_test() {
    const COUNT: usize = 100;

    for _ in 0..COUNT {
        seq_test(10000, 1);
    }

    for _ in 0..COUNT {
        seq_test(10000, 100);
    }
}

fn drain(consumer: Consumer<(usize, u32)>) -> Vec<(usize, u32)> {
    consumer.into_iter().collect()
}

#[test]
#[cfg_attr(miri, ignore)]
fn cloned_handles_fan_in_and_out() {
    let (producer, consumer) = Builder::new(4).name("fan").channel().unwrap();

    let producers: Vec<_> = (0..3)
        .map(|id| {
            let producer = producer.clone();
            thread::spawn(move || {
                for seq in 0..1000 {
                    producer.put((id, seq)).unwrap();
                }
            })
        })
        .collect();
    // only the clones keep the channel open from here on
    drop(producer);

    let consumers: Vec<_> = (0..3)
        .map(|_| {
            let consumer = consumer.clone();
            thread::spawn(move || drain(consumer))
        })
        .collect();
    drop(consumer);

    for producer in producers {
        producer.join().unwrap();
    }

    let mut all: Vec<_> = consumers
        .into_iter()
        .flat_map(|consumer| consumer.join().unwrap())
        .collect();
    all.sort_unstable();

    let expected: Vec<_> = (0..3)
        .flat_map(|id| (0..1000).map(move |seq| (id, seq)))
        .collect();
    assert_eq!(all, expected);
}

#[test]
fn timeouts_on_handles() {
    let (producer, consumer) = channel(1).unwrap();

    assert_eq!(
        consumer.take_timeout(Duration::from_millis(10)),
        Err(TakeError::Timeout)
    );

    producer.put_timeout(1, Duration::from_millis(10)).unwrap();
    assert!(producer
        .put_timeout(2, Duration::from_millis(10))
        .unwrap_err()
        .is_timeout());
    assert!(producer.try_put(3).unwrap_err().is_full());

    assert_eq!(consumer.len(), 1);
    assert_eq!(consumer.capacity(), 1);
    assert_eq!(consumer.try_take(), Ok(1));
    assert!(consumer.is_empty());
}

#[test]
fn shutdown_trigger_from_watcher_thread() {
    let (producer, consumer) = channel::<u64>(2).unwrap();
    let shutdown = consumer.close_handle();

    // stands in for a signal watcher: it only ever calls close()
    let watcher = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        shutdown.close()
    });

    let worker = thread::spawn(move || {
        let mut sent = 0;
        while producer.put(sent).is_ok() {
            sent += 1;
        }
        sent
    });

    let mut received = 0;
    for _ in &consumer {
        received += 1;
        thread::sleep(Duration::from_millis(1));
    }

    assert!(watcher.join().unwrap());
    let sent = worker.join().unwrap();
    assert_eq!(received, sent);
    assert_eq!(consumer.stats().takes, sent);
}
