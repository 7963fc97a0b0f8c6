//! # Example: table
//!
//! Spawns a handful of children, signals one, waits for all of them and
//! prints the status table.
//!
//! Shows how to:
//! - Build a [`Supervisor`] with the built-in [`LogWriter`] subscriber.
//! - Redirect a child's stdout into a pipe.
//! - Read the numeric status codes after [`Supervisor::wait_all`].
//!
//! ## Run
//! ```bash
//! RUST_LOG=procvisor=debug cargo run --example table
//! ```

use std::{io::Read, sync::Arc, time::Duration};

use procvisor::{LogWriter, ProcessSpec, Supervisor, SupervisorConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cfg = SupervisorConfig {
        poll_interval: Duration::from_millis(100),
        ..SupervisorConfig::default()
    };
    let sup = Supervisor::builder(cfg)
        .with_subscriber(Arc::new(LogWriter::new()))
        .build()?;

    let (read, write) = nix::unistd::pipe()?;
    let echo = sup.create(ProcessSpec::new(["sh", "-c", "echo from-child"]).with_stdout(write))?;
    let failing = sup.spawn(["sh", "-c", "exit 7"])?;
    let sleeper = sup.spawn(["sleep", "60"])?;
    let missing = sup.spawn(["procvisor-no-such-program"])?;
    sup.spawn(["sh", "-c", "sleep 0.1 & exit 0"])?;

    sup.send_signal(sleeper, libc::SIGTERM)?;

    let mut line = String::new();
    std::fs::File::from(read).read_to_string(&mut line)?;
    sup.wait_all().await?;

    // Give the background grandchild time to be reaped as an orphan.
    tokio::time::sleep(Duration::from_millis(300)).await;

    println!("child said: {}", line.trim_end());
    println!(
        "echo={} failing={} sleeper={} missing={}",
        sup.status_code(echo)?,
        sup.status_code(failing)?,
        sup.status_code(sleeper)?,
        sup.status_code(missing)?,
    );
    print!("{}", sup.render());

    sup.shutdown();
    Ok(())
}
