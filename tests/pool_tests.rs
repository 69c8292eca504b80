use elog::flush::{flush_ordered, flush_unordered};
use elog::record::SlotStatus;
use elog::{efficient_clock, severity, LogValue, RecordPool};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

const PRODUCERS: u32 = 6;
const PER_PRODUCER: u32 = 5_000;

/// Drives `PRODUCERS` threads through a small pool while one consumer
/// drains it with `pass`, then checks every record was seen exactly once.
fn run(pass: impl Fn(&RecordPool, &mut Vec<u8>) + Sync) {
    let pool = RecordPool::new(16);
    let done = AtomicBool::new(false);

    let out = thread::scope(|s| {
        let consumer = s.spawn(|| {
            let mut out = Vec::new();
            while !done.load(Ordering::Acquire) {
                pass(&pool, &mut out);
                thread::yield_now();
            }
            pass(&pool, &mut out);
            out
        });
        let producers: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let pool = &pool;
                s.spawn(move || {
                    for seq in 0..PER_PRODUCER {
                        pool.acquire().publish(severity::INFO, &[&p, &"/", &seq]);
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }
        done.store(true, Ordering::Release);
        consumer.join().unwrap()
    });

    assert_eq!(pool.occupied(), 0);
    let mut counts: HashMap<String, u32> = HashMap::new();
    for line in String::from_utf8(out).unwrap().lines() {
        let payload = line.split_once(") ").unwrap().1.to_owned();
        *counts.entry(payload).or_default() += 1;
    }
    assert_eq!(counts.len(), (PRODUCERS * PER_PRODUCER) as usize);
    assert!(counts.values().all(|&n| n == 1), "a record was rendered twice");
}

#[test]
fn test_every_record_drained_once_unordered() {
    run(|pool, out| {
        let mut drain = pool.drain().unwrap();
        flush_unordered(&mut drain, out);
    });
}

#[test]
fn test_every_record_drained_once_ordered() {
    run(|pool, out| {
        let mut drain = pool.drain().unwrap();
        let mut batch = Vec::new();
        flush_ordered(&mut drain, out, efficient_clock::now(), &mut batch);
    });
}

#[test]
fn test_full_pool_blocks_until_released() {
    let pool = RecordPool::new(2);
    let a = pool.acquire();
    let b = pool.acquire();
    assert!(pool.try_acquire().is_none());

    thread::scope(|s| {
        let waiter = s.spawn(|| pool.acquire().index());
        thread::sleep(std::time::Duration::from_millis(20));
        assert!(!waiter.is_finished());
        let freed = b.index();
        drop(b);
        assert_eq!(waiter.join().unwrap(), freed);
    });
    drop(a);
}

#[test]
fn test_published_fields_visible_to_consumer() {
    let pool = RecordPool::new(4);
    let before = efficient_clock::now();
    thread::scope(|s| {
        s.spawn(|| {
            pool.acquire()
                .publish(severity::WARN, &[&-1i8, &2u16, &-3i32, &4u64, &0.5f32, &"end"]);
        });
    });
    let mut drain = pool.drain().unwrap();
    let index = (0..4).find(|&i| pool.status(i) == Some(SlotStatus::Filled)).unwrap();
    let record = drain.take(index).unwrap();
    let body = record.body();
    assert_eq!(body.severity(), severity::WARN);
    assert!(body.captured_at() >= before);
    assert_ne!(body.thread_id(), elog::record::current_thread_id());
    let values: Vec<_> = body.values().iter().collect();
    assert_eq!(
        values,
        vec![
            LogValue::I8(-1),
            LogValue::U16(2),
            LogValue::I32(-3),
            LogValue::U64(4),
            LogValue::F32(0.5),
            LogValue::Text(b"end"),
        ]
    );
    record.release();
    assert_eq!(pool.status(index), Some(SlotStatus::Free));
}
