mod parameters;
mod streaming;

use log::LevelFilter;
use parameters::parameters;
#[cfg(not(feature = "disable-struct-parameters"))]
use parameters::struct_parameters;
use sluice::Executor;
use std::env;
use streaming::{early_stop, nested_relays, streaming};

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

pub async fn execute_tests<E: Executor>(mut executor: E) {
    streaming(&mut executor).await;
    nested_relays(&mut executor).await;
    early_stop(&mut executor).await;
    parameters(&mut executor).await;
    #[cfg(not(feature = "disable-struct-parameters"))]
    struct_parameters(&mut executor).await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
