//! Reverse hostname resolution with a per-address cache.
//!
//! Every open port on a host reports the same hostname, so the lookup is
//! done at most once per IP. Concurrent callers for the same IP wait on a
//! shared cell instead of issuing duplicate queries.

use crate::scanner::traits::ReverseResolver;
use crate::types::ScanAddress;
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// PTR lookups through the system resolver configuration.
pub struct DnsReverseResolver {
    resolver: TokioAsyncResolver,
}

impl DnsReverseResolver {
    /// Build a resolver from `/etc/resolv.conf` (or the platform
    /// equivalent), falling back to the library defaults.
    pub fn from_system() -> Self {
        let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
            warn!(error = %e, "system resolver configuration unavailable, using defaults");
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });
        Self { resolver }
    }
}

#[async_trait]
impl ReverseResolver for DnsReverseResolver {
    async fn reverse(&self, ip: IpAddr) -> Option<String> {
        match self.resolver.reverse_lookup(ip).await {
            Ok(names) => names
                .iter()
                .next()
                .map(|name| name.to_string().trim_end_matches('.').to_string()),
            Err(e) => {
                debug!(%ip, error = %e, "reverse lookup failed");
                None
            }
        }
    }
}

/// Caches reverse lookups per IP for the lifetime of one scan.
pub struct HostnameCache {
    resolver: Arc<dyn ReverseResolver>,
    entries: Mutex<HashMap<IpAddr, Arc<OnceCell<Option<String>>>>>,
}

impl HostnameCache {
    pub fn new(resolver: Arc<dyn ReverseResolver>) -> Self {
        Self {
            resolver,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Hostname for an address. Hostname targets are not reverse-resolved.
    pub async fn lookup(&self, address: &ScanAddress) -> Option<String> {
        let ip = address.ip()?;

        let cell = {
            let mut entries = self.entries.lock().await;
            Arc::clone(entries.entry(ip).or_default())
        };

        cell.get_or_init(|| self.resolver.reverse(ip)).await.clone()
    }
}
