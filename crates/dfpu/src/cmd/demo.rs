use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dfpu_decimal::{Decimal, Packed, LANES};
use dfpu_dispatch::{Dispatcher, Route};
use dfpu_frame::Operation;
use tracing::info;

use crate::cmd::{parse_duration, DemoArgs};
use crate::exit::{CliError, CliResult, FAILURE, INTERNAL, SUCCESS};
use crate::output::{print_dispatch, OutputFormat};

const DEMO_A: Packed = [Decimal::new(3, 2, 12345); LANES];
const DEMO_B: Packed = [Decimal::new(1, 3, 6789); LANES];

/// Granularity at which the watch loop notices Ctrl-C.
const POLL_STEP: Duration = Duration::from_millis(50);

pub fn run(args: DemoArgs, format: OutputFormat) -> CliResult<i32> {
    let interval = args.watch.as_deref().map(parse_duration).transpose()?;
    let dispatcher = args.target.dispatcher()?;

    let Some(interval) = interval else {
        let code = run_once(&dispatcher, format);
        dispatcher.terminate();
        return Ok(code);
    };

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    while running.load(Ordering::SeqCst) {
        if args.target.uses_hardware() && !dispatcher.is_connected() {
            if let Ok(device) = dispatcher.reconnect() {
                info!(device = %device, "accelerator back");
            }
        }
        run_once(&dispatcher, format);
        sleep_while_running(&running, interval);
    }

    dispatcher.terminate();
    Ok(SUCCESS)
}

fn run_once(dispatcher: &Dispatcher, format: OutputFormat) -> i32 {
    let mut code = SUCCESS;
    for operation in Operation::ALL {
        let dispatch = dispatcher.dispatch(operation, &DEMO_A, &DEMO_B);
        print_dispatch(operation, &DEMO_A, &DEMO_B, &dispatch, format);
        if dispatch.route == Route::Aborted {
            code = FAILURE;
        }
    }
    code
}

fn sleep_while_running(running: &AtomicBool, interval: Duration) {
    let deadline = Instant::now() + interval;
    while running.load(Ordering::SeqCst) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        std::thread::sleep(remaining.min(POLL_STEP));
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_returns_early_once_stopped() {
        let running = AtomicBool::new(false);
        let start = Instant::now();
        sleep_while_running(&running, Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn sleep_waits_for_interval() {
        let running = AtomicBool::new(true);
        let start = Instant::now();
        sleep_while_running(&running, Duration::from_millis(60));
        assert!(start.elapsed() >= Duration::from_millis(60));
    }
}
