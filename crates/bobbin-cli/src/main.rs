use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bobbin_core::impls::handlers::{DataProcessingTask, EmailTask, NotificationTask};
use bobbin_core::ports::{IdGenerator, SystemClock, UlidGenerator};
use bobbin_core::{Pool, PoolBuilder, PoolConfig, Task, TaskPayload};

const ENV_CONFIG: &str = "BOBBIN_CONFIG";

/// Background task processor backed by a bounded worker pool.
#[derive(Parser, Debug)]
#[command(name = "bobbin", version, about, long_about = None)]
struct Args {
    /// JSON config file (or BOBBIN_CONFIG); BOBBIN_* environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of workers
    #[arg(short = 'n', long)]
    workers: Option<usize>,

    /// Queue capacity; submissions beyond it are dropped
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Seconds to wait for the queue to drain on SIGINT / SIGTERM
    #[arg(long)]
    shutdown_timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long)]
    log_level: Option<String>,

    /// JSON-lines file of tasks ({"id", "type", "data"}) submitted at startup
    #[arg(long)]
    tasks: Option<PathBuf>,

    /// Milliseconds between demo tasks; 0 disables the demo producer
    #[arg(long, default_value_t = 5_000)]
    interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args, |key| std::env::var(key).ok())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        workers = config.worker_count,
        queue_capacity = config.queue_capacity,
        "starting bobbin v{}",
        env!("CARGO_PKG_VERSION")
    );

    let pool = PoolBuilder::from_config(&config)
        .with_builtin_handlers()?
        .build()?;

    let cancel = CancellationToken::new();
    let runner = tokio::spawn({
        let pool = pool.clone();
        let cancel = cancel.clone();
        async move { pool.start(cancel).await }
    });

    if let Some(path) = &args.tasks {
        let submitted = submit_file(&pool, path).await?;
        info!(submitted, path = %path.display(), "submitted tasks from file");
    }

    let producer_stop = CancellationToken::new();
    let producer = (args.interval_ms > 0).then(|| {
        tokio::spawn(produce(
            pool.clone(),
            Duration::from_millis(args.interval_ms),
            producer_stop.clone(),
        ))
    });

    let mut signals = ShutdownSignal::install()?;
    info!("running, press Ctrl+C to stop");
    let signal = signals.recv().await?;
    info!(signal, "shutdown signal received, draining queue");

    producer_stop.cancel();
    if let Some(producer) = producer {
        producer.await?;
    }

    match pool.shutdown(config.shutdown_timeout).await {
        Ok(()) => info!("all queued tasks finished"),
        Err(e) => error!(error = %e, "graceful shutdown failed, forcing workers to stop"),
    }
    cancel.cancel();
    runner.await??;

    let stats = pool.stats();
    info!(
        accepted = stats.accepted,
        dropped = stats.dropped,
        dequeued = stats.dequeued(),
        processed = stats.processed,
        failed = stats.failed,
        unknown_type = stats.unknown_type,
        abandoned = stats.abandoned,
        "bobbin stopped"
    );
    Ok(())
}

/// Resolve the config: file (flag, then BOBBIN_CONFIG), then BOBBIN_* variables, then flags.
fn load_config(args: &Args, lookup: impl Fn(&str) -> Option<String>) -> Result<PoolConfig> {
    let path = args.config.clone().or_else(|| {
        lookup(ENV_CONFIG)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    });
    let base = match &path {
        Some(path) => PoolConfig::from_json_file(path)
            .with_context(|| format!("load config from {}", path.display()))?,
        None => PoolConfig::default(),
    };
    let mut config = base.with_env(lookup)?;

    if let Some(workers) = args.workers {
        config.worker_count = workers;
    }
    if let Some(capacity) = args.queue_capacity {
        config.queue_capacity = capacity;
    }
    if let Some(secs) = args.shutdown_timeout_secs {
        config.shutdown_timeout = Duration::from_secs(secs);
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.to_lowercase();
    }

    config.validate()?;
    Ok(config)
}

/// SIGINT (Ctrl-C) and, on unix, SIGTERM. Installed up front so neither is missed.
struct ShutdownSignal {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl ShutdownSignal {
    fn install() -> Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            terminate: tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .context("install SIGTERM handler")?,
        })
    }

    /// Wait for the first signal and return its name.
    async fn recv(&mut self) -> Result<&'static str> {
        #[cfg(unix)]
        {
            tokio::select! {
                res = tokio::signal::ctrl_c() => {
                    res.context("listen for SIGINT")?;
                    Ok("SIGINT")
                }
                _ = self.terminate.recv() => Ok("SIGTERM"),
            }
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.context("listen for Ctrl-C")?;
            Ok("SIGINT")
        }
    }
}

/// Submit every line of a JSON-lines file. Malformed lines are skipped with a warning.
async fn submit_file(pool: &Pool, path: &Path) -> Result<usize> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read tasks from {}", path.display()))?;

    let mut submitted = 0;
    for (line_no, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Task>(line) {
            Ok(task) => {
                pool.submit(task);
                submitted += 1;
            }
            Err(e) => warn!(line = line_no + 1, error = %e, "skipping malformed task"),
        }
    }
    Ok(submitted)
}

/// Demo producer: one task per tick, cycling over the built-in task types.
async fn produce(pool: Pool, every: Duration, stop: CancellationToken) {
    let ids = UlidGenerator::new(SystemClock);
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;

    for seq in 1u64.. {
        tokio::select! {
            _ = stop.cancelled() => return,
            _ = ticker.tick() => {}
        }
        if !pool.state().accepts_tasks() {
            return;
        }

        match demo_task(seq, ids.generate_task_id()) {
            Ok(task) => {
                info!(task_id = %task.id(), task_type = %task.task_type(), "submitting task");
                pool.submit(task);
            }
            Err(e) => warn!(error = %e, "could not build demo task"),
        }
    }
}

fn demo_task(seq: u64, id: bobbin_core::TaskId) -> Result<Task, serde_json::Error> {
    match seq % 3 {
        0 => DataProcessingTask { size: seq % 300 }.into_task(id),
        1 => EmailTask {
            to: "user@example.com".to_string(),
            subject: format!("task notice #{seq}"),
            body: "this is a test task".to_string(),
        }
        .into_task(id),
        _ => NotificationTask {
            user_id: format!("user-{}", seq % 7),
            message: format!("you have {seq} new messages"),
        }
        .into_task(id),
    }
}
