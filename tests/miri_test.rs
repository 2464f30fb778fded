#![cfg(not(loom))]

use bounded_buffer::{channel, BoundedBuffer, TakeError};
use std::sync::Arc;
use std::thread;

#[test]
fn bounded_drop_test() {
    let (tx, rx) = channel(64).unwrap();

    tx.put(Box::new([1; 8])).unwrap();
    tx.put(Box::new([1; 8])).unwrap();
    tx.put(Box::new([1; 8])).unwrap();

    std::mem::drop(rx);
    std::mem::drop(tx);
}

#[test]
fn bounded_put_take() {
    let (tx, rx) = channel(64).unwrap();

    tx.put(String::from("a")).unwrap();
    tx.put(String::from("b")).unwrap();
    tx.put(String::from("c")).unwrap();

    assert_eq!(rx.take().unwrap(), "a");
    assert_eq!(rx.take().unwrap(), "b");
    assert_eq!(rx.take().unwrap(), "c");
}

#[test]
fn bounded_close_test() {
    let (tx, rx) = channel(64).unwrap();

    tx.put([1; 8]).unwrap();
    tx.put([1; 8]).unwrap();
    tx.put([1; 8]).unwrap();

    rx.close();

    assert!(tx.put([1; 8]).unwrap_err().is_closed());

    let _ = rx.take().unwrap();
    let _ = rx.take().unwrap();
    let _ = rx.take().unwrap();
    assert_eq!(rx.take(), Err(TakeError::Closed));
}

#[test]
fn leftover_items_dropped_with_wrapped_ring() {
    let marker = Arc::new(());
    let buffer = BoundedBuffer::new(3).unwrap();

    for _ in 0..3 {
        buffer.put(marker.clone()).unwrap();
    }
    drop(buffer.take().unwrap());
    drop(buffer.take().unwrap());
    buffer.put(marker.clone()).unwrap();
    buffer.put(marker.clone()).unwrap();
    assert_eq!(Arc::strong_count(&marker), 4);

    drop(buffer);
    assert_eq!(Arc::strong_count(&marker), 1);
}

#[test]
fn rejected_item_is_not_leaked() {
    let marker = Arc::new(());
    let buffer = BoundedBuffer::new(1).unwrap();
    buffer.close();

    let back = buffer.put(marker.clone()).unwrap_err().into_inner();
    assert_eq!(Arc::strong_count(&marker), 2);
    drop(back);
    assert_eq!(Arc::strong_count(&marker), 1);
}

#[test]
fn small_threaded_exchange() {
    let (tx, rx) = channel(2).unwrap();

    let t = thread::spawn(move || {
        for i in 0..16 {
            tx.put(vec![i; 4]).unwrap();
        }
    });

    let got: Vec<_> = rx.into_iter().map(|v| v[0]).collect();
    assert_eq!(got, (0..16).collect::<Vec<_>>());

    t.join().unwrap();
}
