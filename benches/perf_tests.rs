use criterion::{black_box, criterion_group, criterion_main, Criterion};
use elog::{elog_info, FlushOrder, Logger, LoggerConfig};
use log::{info, LevelFilter};
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use std::sync::Once;
use std::thread;
use tempfile::tempdir;

const ITERATIONS: usize = 10_000;
const THREADS: usize = 4;

static LOGGER_INIT: Once = Once::new();

fn setup_log4rs(log_file: &str) {
    LOGGER_INIT.call_once(|| {
        let logfile = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{d} [{T}]({l}) {m}{n}")))
            .append(true)
            .build(log_file)
            .unwrap();

        let config = Config::builder()
            .appender(Appender::builder().build("logfile", Box::new(logfile)))
            .build(Root::builder().appender("logfile").build(LevelFilter::Info))
            .unwrap();

        log4rs::init_config(config).unwrap();
    });
}

fn bench_elog(c: &mut Criterion) {
    let mut group = c.benchmark_group("elog");
    group.sample_size(20);
    let dir = tempdir().unwrap();

    for order in [FlushOrder::Unordered, FlushOrder::Ordered] {
        let logger = Logger::new();
        logger
            .init(LoggerConfig::new(dir.path().join(format!("{:?}.log", order))).with_order(order))
            .unwrap();

        group.bench_function(format!("{:?}/single_thread", order), |b| {
            b.iter(|| {
                for i in 0..ITERATIONS {
                    elog_info!(logger, "Test perf: iteration=", i, " value=", 2.5f64).unwrap();
                }
            })
        });

        group.bench_function(format!("{:?}/{}_threads", order, THREADS), |b| {
            b.iter(|| {
                thread::scope(|s| {
                    for t in 0..THREADS {
                        let logger = &logger;
                        s.spawn(move || {
                            for i in 0..ITERATIONS / THREADS {
                                elog_info!(logger, "thread ", t, " iteration=", i).unwrap();
                            }
                        });
                    }
                });
            })
        });

        logger.cleanup();
    }
    group.finish();
}

fn bench_traditional(c: &mut Criterion) {
    let mut group = c.benchmark_group("traditional");
    group.sample_size(10);
    let dir = tempdir().unwrap();

    let log4rs_file = dir.path().join("log4rs.log");
    setup_log4rs(log4rs_file.to_str().unwrap());
    group.bench_function("log4rs", |b| {
        b.iter(|| {
            for i in 0..ITERATIONS {
                info!("Test perf: iteration={} value={}", i, black_box(2.5f64));
            }
        })
    });

    let appender = tracing_appender::rolling::never(dir.path(), "tracing.log");
    let (writer, _guard) = tracing_appender::non_blocking(appender);
    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        group.bench_function("tracing_appender_non_blocking", |b| {
            b.iter(|| {
                for i in 0..ITERATIONS {
                    tracing::info!(iteration = i, value = black_box(2.5f64), "Test perf");
                }
            })
        });
    });

    group.finish();
}

criterion_group!(benches, bench_elog, bench_traditional);
criterion_main!(benches);
