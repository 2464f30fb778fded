use bounded_buffer::{trace, Builder};
use std::thread;
use std::time::Duration;

const PRODUCERS: usize = 2;
const CONSUMERS: usize = 2;
const ITEMS: usize = 20;

fn main() {
    trace::init_tracing();

    let (producer, consumer) = Builder::new(5).name("prodcons").channel().unwrap();

    let producers: Vec<_> = (1..=PRODUCERS)
        .map(|id| {
            let producer = producer.clone();
            thread::spawn(move || {
                for item in 0..ITEMS {
                    thread::sleep(Duration::from_millis(10));
                    if producer.put(item).is_err() {
                        println!("producer {} stopped: buffer closed", id);
                        return;
                    }
                    println!("producer {} produced item {} (buffer count: {})", id, item, producer.len());
                }
            })
        })
        .collect();
    drop(producer);

    let consumers: Vec<_> = (1..=CONSUMERS)
        .map(|id| {
            let consumer = consumer.clone();
            thread::spawn(move || {
                let mut consumed = 0;
                for item in &consumer {
                    println!("consumer {} consumed item {} (buffer count: {})", id, item, consumer.len());
                    consumed += 1;
                    thread::sleep(Duration::from_millis(20));
                }
                consumed
            })
        })
        .collect();
    drop(consumer);

    for producer in producers {
        producer.join().unwrap();
    }

    let total: usize = consumers.into_iter().map(|c| c.join().unwrap()).sum();
    println!("consumed {} of {} items", total, PRODUCERS * ITEMS);
}
