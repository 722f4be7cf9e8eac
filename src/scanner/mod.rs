//! Scan engine - probes every (address, port) pair concurrently.
//!
//! Work flows through three stages:
//!
//! 1. A producer enumerates addresses x ports into a bounded job queue.
//! 2. A fixed pool of workers pulls jobs, probes, and on success publishes a
//!    [`PartialResult`] on an unbounded result channel.
//! 3. A supervisor joins producer and workers. Once the last worker exits
//!    its result sender is dropped, which ends the result stream.
//!
//! The queue bound gives backpressure, so in-flight probes never exceed the
//! configured concurrency no matter how many targets were expanded.

pub mod resolver;
pub mod tcp;
pub mod traits;

use crate::aggregate::{aggregate, ScanReport};
use crate::services::ServiceTable;
use crate::types::{Port, ScanAddress};
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

pub use resolver::{DnsReverseResolver, HostnameCache};
pub use tcp::TcpConnectProber;
pub use traits::{NoReverseLookup, PartialResult, Prober, ReverseResolver};

/// Configuration for a scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Number of worker tasks, i.e. the maximum number of in-flight probes.
    pub concurrency: usize,
    /// Per-connection timeout.
    pub timeout: Duration,
    /// Capacity of the job queue between producer and workers.
    pub queue_capacity: usize,
    /// Reverse-resolve hostnames of responsive IPs.
    pub resolve_hostnames: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(2))
    }
}

impl ScanConfig {
    /// Create a configuration. A concurrency of zero is raised to one.
    pub fn new(concurrency: usize, timeout: Duration) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            concurrency,
            timeout,
            queue_capacity: concurrency.saturating_mul(2),
            resolve_hostnames: true,
        }
    }

    /// Set the job queue capacity (minimum one).
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Disable reverse hostname lookups.
    pub fn without_hostnames(mut self) -> Self {
        self.resolve_hostnames = false;
        self
    }
}

/// One unit of work: probe `port` on `address`.
struct Job {
    address: Arc<ScanAddress>,
    port: Port,
}

/// Shared, read-only state for workers.
struct ProbeContext {
    prober: Arc<dyn Prober>,
    hostnames: HostnameCache,
    services: Arc<ServiceTable>,
    timeout: Duration,
    progress: Option<ProgressBar>,
}

/// A running scan.
pub struct ScanHandle {
    /// Stream of partial results; ends when every task has finished.
    pub results: mpsc::UnboundedReceiver<PartialResult>,
    supervisor: JoinHandle<()>,
}

impl ScanHandle {
    /// Wait for the supervisor to finish.
    pub async fn join(self) {
        if let Err(e) = self.supervisor.await {
            warn!(error = %e, "scan supervisor failed");
        }
    }
}

/// The scan engine.
pub struct ScanEngine {
    config: ScanConfig,
    services: Arc<ServiceTable>,
    prober: Arc<dyn Prober>,
    resolver: Arc<dyn ReverseResolver>,
    progress: Option<ProgressBar>,
}

impl ScanEngine {
    /// Create an engine that probes with TCP connect and, if enabled,
    /// reverse-resolves through the system DNS configuration.
    pub fn new(config: ScanConfig, services: Arc<ServiceTable>) -> Self {
        let resolver: Arc<dyn ReverseResolver> = if config.resolve_hostnames {
            Arc::new(DnsReverseResolver::from_system())
        } else {
            Arc::new(NoReverseLookup)
        };

        Self {
            config,
            services,
            prober: Arc::new(TcpConnectProber::new()),
            resolver,
            progress: None,
        }
    }

    /// Replace the prober.
    pub fn with_prober(mut self, prober: Arc<dyn Prober>) -> Self {
        self.prober = prober;
        self
    }

    /// Replace the reverse resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn ReverseResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Tick `progress` once per finished probe.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Start probing every address against every port.
    ///
    /// Must be called from within a tokio runtime. Cancelling `cancel` stops
    /// new probes from starting and abandons those in flight; the result
    /// stream then ends with whatever had already been published.
    pub fn start(
        &self,
        addresses: Vec<ScanAddress>,
        ports: Vec<Port>,
        cancel: CancellationToken,
    ) -> ScanHandle {
        let (job_tx, job_rx) = mpsc::channel::<Job>(self.config.queue_capacity);
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        let total = addresses.len() * ports.len();
        info!(
            addresses = addresses.len(),
            ports = ports.len(),
            probes = total,
            workers = self.config.concurrency,
            "starting scan"
        );

        let context = Arc::new(ProbeContext {
            prober: Arc::clone(&self.prober),
            hostnames: HostnameCache::new(Arc::clone(&self.resolver)),
            services: Arc::clone(&self.services),
            timeout: self.config.timeout,
            progress: self.progress.clone(),
        });

        let mut tasks = JoinSet::new();
        tasks.spawn(produce(addresses, ports, job_tx, cancel.clone()));

        let job_rx = Arc::new(Mutex::new(job_rx));
        for id in 0..self.config.concurrency {
            tasks.spawn(work(
                id,
                Arc::clone(&job_rx),
                Arc::clone(&context),
                result_tx.clone(),
                cancel.clone(),
            ));
        }
        // Workers now own every sender; the stream ends when they exit.
        drop(result_tx);

        let supervisor = tokio::spawn(async move {
            let started = Instant::now();
            while let Some(joined) = tasks.join_next().await {
                if let Err(e) = joined {
                    warn!(error = %e, "scan task failed");
                }
            }
            info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                cancelled = cancel.is_cancelled(),
                "scan tasks finished"
            );
        });

        ScanHandle {
            results: result_rx,
            supervisor,
        }
    }

    /// Run a scan to completion and aggregate the results per host.
    pub async fn run(
        &self,
        addresses: Vec<ScanAddress>,
        ports: Vec<Port>,
        cancel: CancellationToken,
    ) -> ScanReport {
        let mut handle = self.start(addresses, ports, cancel);
        let report = aggregate(&mut handle.results).await;
        handle.join().await;

        info!(
            hosts = report.len(),
            open_ports = report.open_port_count(),
            "scan complete"
        );
        report
    }
}

async fn produce(
    addresses: Vec<ScanAddress>,
    ports: Vec<Port>,
    jobs: mpsc::Sender<Job>,
    cancel: CancellationToken,
) {
    for address in addresses {
        let address = Arc::new(address);
        for &port in &ports {
            let job = Job {
                address: Arc::clone(&address),
                port,
            };
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("producer cancelled");
                    return;
                }
                sent = jobs.send(job) => {
                    if sent.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

async fn work(
    id: usize,
    jobs: Arc<Mutex<mpsc::Receiver<Job>>>,
    context: Arc<ProbeContext>,
    results: mpsc::UnboundedSender<PartialResult>,
    cancel: CancellationToken,
) {
    loop {
        let job = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            job = async { jobs.lock().await.recv().await } => match job {
                Some(job) => job,
                None => break,
            },
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            outcome = context.prober.probe(&job.address, job.port, context.timeout) => outcome,
        };

        if let Some(ref pb) = context.progress {
            pb.inc(1);
        }

        if let Err(e) = outcome {
            trace!(address = %job.address, port = %job.port, error = %e, "port not open");
            continue;
        }

        let hostname = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            name = context.hostnames.lookup(&job.address) => name,
        };
        let service = context.services.classify(job.port).to_string();
        debug!(address = %job.address, port = %job.port, %service, "open port");

        if let Some(ref pb) = context.progress {
            pb.set_message(format!("open: {}:{}", job.address, job.port));
        }

        let partial = PartialResult::new(job.address.to_string(), job.port, service)
            .with_hostname(hostname);
        if results.send(partial).is_err() {
            break;
        }
    }
    trace!(worker = id, "worker exiting");
}
