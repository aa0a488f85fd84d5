//! Basic usage example for the time wheel

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use time_wheel::{CancellationToken, Duration, TimeWheel, WheelConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    // 100ms ticks over 20 slots: one rotation every 2 seconds
    let config = WheelConfig::new(Duration::from_millis(100), 20).with_name("example_wheel");
    let (wheel, handle) = TimeWheel::new(config, CancellationToken::new())?;

    // Spawn the command loop
    let wheel_task = wheel.start();

    let fired = Arc::new(AtomicUsize::new(0));
    let (done_tx, mut done_rx) = tokio::sync::mpsc::unbounded_channel();

    // Schedule several jobs, the last one needing more than one rotation
    for (key, secs) in [("short_job", 1), ("medium_job", 2), ("long_job", 3)] {
        let fired = fired.clone();
        let done_tx = done_tx.clone();
        handle
            .schedule(Duration::from_secs(secs), key, move || {
                fired.fetch_add(1, Ordering::SeqCst);
                println!("Job '{}' fired!", key);
                let _ = done_tx.send(key);
            })
            .await?;
    }

    // Futures work too
    let done = done_tx.clone();
    handle
        .schedule_async(Duration::from_millis(1500), "async_job", async move {
            println!("Job 'async_job' fired!");
            let _ = done.send("async_job");
        })
        .await?;

    println!("Jobs scheduled! Waiting for them to fire...");
    for _ in 0..4 {
        done_rx.recv().await;
    }

    // Demonstrate replacement and cancellation
    handle
        .schedule(Duration::from_secs(10), "cancelled_job", || {
            println!("never printed");
        })
        .await?;
    handle
        .schedule(Duration::from_secs(20), "cancelled_job", || {
            println!("never printed either");
        })
        .await?;
    println!("Scheduled a job that will be cancelled...");

    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.cancel("cancelled_job").await?;
    println!("Job cancelled!");

    // Shutdown gracefully
    handle.stop().await?;
    wheel_task.await?;

    println!(
        "Time wheel shut down successfully after {} job(s)!",
        fired.load(Ordering::SeqCst)
    );
    Ok(())
}
