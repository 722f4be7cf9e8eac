//! Per-host aggregation of partial results.
//!
//! Partial results arrive in completion order, which races. Each address
//! gets one [`HostRecord`] whose port and service lists grow in arrival
//! order; nothing is sorted or deduplicated.

use crate::scanner::PartialResult;
use crate::types::Port;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Everything found open on one address.
///
/// `open_ports` and `services` always have the same length and entry `i`
/// of one belongs to entry `i` of the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostRecord {
    #[serde(rename = "ip")]
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hostname: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    open_ports: Vec<Port>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    services: Vec<String>,
}

impl HostRecord {
    fn seed(partial: PartialResult) -> Self {
        Self {
            address: partial.address,
            hostname: partial.hostname,
            open_ports: vec![partial.port],
            services: vec![partial.service],
        }
    }

    fn append(&mut self, port: Port, service: String) {
        self.open_ports.push(port);
        self.services.push(service);
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    pub fn open_ports(&self) -> &[Port] {
        &self.open_ports
    }

    pub fn services(&self) -> &[String] {
        &self.services
    }

    /// Ports paired with their service labels, in arrival order.
    pub fn entries(&self) -> impl Iterator<Item = (Port, &str)> {
        self.open_ports
            .iter()
            .copied()
            .zip(self.services.iter().map(String::as_str))
    }
}

/// Aggregated results: one record per responsive address, in the order
/// each address first reported an open port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScanReport {
    hosts: Vec<HostRecord>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ScanReport {
    pub fn hosts(&self) -> &[HostRecord] {
        &self.hosts
    }

    /// Look up the record for an address.
    pub fn get(&self, address: &str) -> Option<&HostRecord> {
        self.index.get(address).map(|&i| &self.hosts[i])
    }

    /// Number of responsive hosts.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Total open ports across all hosts.
    pub fn open_port_count(&self) -> usize {
        self.hosts.iter().map(|h| h.open_ports.len()).sum()
    }
}

/// Merges partial results into per-host records.
#[derive(Debug, Default)]
pub struct Aggregator {
    report: ScanReport,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one partial result into the report.
    pub fn push(&mut self, partial: PartialResult) {
        let report = &mut self.report;
        match report.index.get(&partial.address) {
            Some(&i) => report.hosts[i].append(partial.port, partial.service),
            None => {
                report
                    .index
                    .insert(partial.address.clone(), report.hosts.len());
                report.hosts.push(HostRecord::seed(partial));
            }
        }
    }

    pub fn finish(self) -> ScanReport {
        self.report
    }
}

/// Consume a result stream until it closes.
pub async fn aggregate(results: &mut mpsc::UnboundedReceiver<PartialResult>) -> ScanReport {
    let mut aggregator = Aggregator::new();
    while let Some(partial) = results.recv().await {
        aggregator.push(partial);
    }
    aggregator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn partial(address: &str, port: u16, service: &str) -> PartialResult {
        PartialResult::new(address, Port::new(port).unwrap(), service)
    }

    fn sample() -> Vec<PartialResult> {
        vec![
            partial("10.0.0.1", 22, "SSH").with_hostname(Some("gw".to_string())),
            partial("10.0.0.2", 80, "HTTP"),
            partial("10.0.0.1", 443, "HTTPS").with_hostname(Some("gw".to_string())),
            partial("10.0.0.1", 8080, "HTTP-Alt").with_hostname(Some("gw".to_string())),
        ]
    }

    fn pairs(record: &HostRecord) -> BTreeSet<(u16, String)> {
        record
            .entries()
            .map(|(port, service)| (port.as_u16(), service.to_string()))
            .collect()
    }

    #[test]
    fn test_merges_by_address_in_arrival_order() {
        let mut aggregator = Aggregator::new();
        for p in sample() {
            aggregator.push(p);
        }
        let report = aggregator.finish();

        assert_eq!(report.len(), 2);
        assert_eq!(report.hosts()[0].address(), "10.0.0.1");
        assert_eq!(report.hosts()[1].address(), "10.0.0.2");

        let gw = report.get("10.0.0.1").unwrap();
        assert_eq!(gw.hostname(), Some("gw"));
        let ports: Vec<u16> = gw.open_ports().iter().map(|p| p.as_u16()).collect();
        assert_eq!(ports, vec![22, 443, 8080]);
        assert_eq!(gw.services(), &["SSH", "HTTPS", "HTTP-Alt"]);
        assert_eq!(report.open_port_count(), 4);
    }

    #[test]
    fn test_first_hostname_wins() {
        let mut aggregator = Aggregator::new();
        aggregator.push(partial("10.0.0.9", 22, "SSH"));
        aggregator.push(partial("10.0.0.9", 80, "HTTP").with_hostname(Some("late".to_string())));

        let report = aggregator.finish();
        assert_eq!(report.get("10.0.0.9").unwrap().hostname(), None);
    }

    #[test]
    fn test_order_independent_contents() {
        let forward = sample();
        let mut reversed = sample();
        reversed.reverse();
        let rotated: Vec<PartialResult> = sample().into_iter().cycle().skip(2).take(4).collect();

        let reports: Vec<ScanReport> = [forward, reversed, rotated]
            .into_iter()
            .map(|order| {
                let mut aggregator = Aggregator::new();
                order.into_iter().for_each(|p| aggregator.push(p));
                aggregator.finish()
            })
            .collect();

        for report in &reports[1..] {
            assert_eq!(report.len(), reports[0].len());
            for host in reports[0].hosts() {
                let other = report.get(host.address()).unwrap();
                assert_eq!(pairs(other), pairs(host));
                assert_eq!(other.open_ports().len(), other.services().len());
            }
        }
    }

    #[test]
    fn test_aggregate_stream() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        for p in sample() {
            tx.send(p).unwrap();
        }
        drop(tx);

        let report = tokio_test::block_on(aggregate(&mut rx));
        assert_eq!(report.len(), 2);
        assert_eq!(report.open_port_count(), 4);
    }

    #[test]
    fn test_empty_stream() {
        let (tx, mut rx) = mpsc::unbounded_channel::<PartialResult>();
        drop(tx);
        assert!(tokio_test::block_on(aggregate(&mut rx)).is_empty());
    }

    #[test]
    fn test_json_shape() {
        let mut aggregator = Aggregator::new();
        aggregator.push(partial("10.0.0.5", 80, "HTTP"));
        let json = serde_json::to_value(aggregator.finish()).unwrap();

        assert_eq!(
            json,
            serde_json::json!([{ "ip": "10.0.0.5", "open_ports": [80], "services": ["HTTP"] }])
        );
    }
}
