use std::env;
use std::process::ExitCode;
use std::thread;

use elog::{elog_fatal, elog_info, Logger, LoggerConfig};
use tracing_subscriber::EnvFilter;

const THREADS: usize = 4;
const RECORDS_PER_THREAD: usize = 100_000;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = env::args().nth(1).unwrap_or_else(|| "test.log".to_string());
    let logger = Logger::new();
    if let Err(e) = logger.init(LoggerConfig::new(&path)) {
        eprintln!("elog: {}", e);
        return ExitCode::FAILURE;
    }

    let result = thread::scope(|s| {
        let workers: Vec<_> = (0..THREADS)
            .map(|worker| {
                let logger = &logger;
                s.spawn(move || -> elog::Result<()> {
                    elog_info!(logger, "This ", "is ", "a ", 123, " test!")?;
                    for i in 0..RECORDS_PER_THREAD {
                        elog_info!(logger, file!(), ":", line!(), " worker ", worker, " counter ", i)?;
                        if i % 1000 == 0 {
                            elog_fatal!(logger, "This is a test!")?;
                        }
                    }
                    Ok(())
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|w| w.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect::<elog::Result<Vec<_>>>()
    });
    logger.cleanup();

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("elog: {}", e);
            ExitCode::FAILURE
        }
    }
}
