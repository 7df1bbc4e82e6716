//! Decoding of the host agent's forwarder payload into metric samples
//!
//! The agent ships two payload flavors. A payload carrying a `series` key
//! comes from the statistics-aggregation subsystem: each entry names a
//! metric and a list of `[timestamp, value]` points. Anything else is a
//! collector payload: a flat object of system readings plus a `metrics`
//! array, `ioStats`, process info and load averages.
//!
//! Per-sample problems (null value, non-numeric value, non-string tag) skip
//! that sample only; payload-level problems abort the invocation before
//! anything is sent.

use crate::config::EmitterConfig;
use crate::error::PayloadError;
use crate::line::{camel_to_dotted, sanitize_tag};
use crate::sample::MetricSample;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Load-average keys shipped as-is at the top level of collector payloads
const LOAD_METRIC_NAMES: [&str; 6] = [
    "system.load.1",
    "system.load.5",
    "system.load.15",
    "system.load.norm.1",
    "system.load.norm.5",
    "system.load.norm.15",
];

/// Decode one agent payload into a batch of samples
///
/// # Errors
/// [`PayloadError`] when the payload is not an object or a collector
/// payload lacks `collection_timestamp` / `internalHostname`.
pub fn decode(payload: &Value, config: &EmitterConfig) -> Result<Vec<MetricSample>, PayloadError> {
    let message = payload.as_object().ok_or(PayloadError::NotAnObject)?;
    if message.contains_key("series") {
        Ok(decode_series(message))
    } else {
        decode_collector(message, config)
    }
}

/// Aggregation series flavor: `series[].{metric, host, tags, points}`
fn decode_series(message: &Map<String, Value>) -> Vec<MetricSample> {
    let mut samples = Vec::new();
    let series = message
        .get("series")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for entry in series {
        let Some(name) = entry.get("metric").and_then(Value::as_str) else {
            debug!("skipping series entry without a metric name");
            continue;
        };
        let Some(host) = entry.get("host").and_then(Value::as_str) else {
            debug!(metric = name, "skipping series entry without a host");
            continue;
        };

        let mut tags = BTreeMap::new();
        if let Some(jtags) = entry.get("tags").and_then(Value::as_array) {
            for tag in jtags.iter().filter_map(Value::as_str) {
                let mut parts = tag.split(':');
                if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
                    tags.insert(key.to_string(), value.to_string());
                }
            }
        }

        let points = entry
            .get("points")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for point in points {
            let (Some(timestamp), Some(value)) = (
                point.get(0).and_then(Value::as_f64),
                point.get(1).and_then(Value::as_f64),
            ) else {
                debug!(metric = name, "skipping point with a non-numeric field");
                continue;
            };
            let mut tags = tags.clone();
            let source = resolve_source(host, &mut tags);
            let mut sample = MetricSample::new(name, value, timestamp as i64, source);
            sample.tags = tags;
            samples.push(sample);
        }
    }
    samples
}

/// Collector flavor: flat system readings plus `metrics`, `ioStats`,
/// `processes` and load averages, all stamped with `collection_timestamp`
fn decode_collector(
    message: &Map<String, Value>,
    config: &EmitterConfig,
) -> Result<Vec<MetricSample>, PayloadError> {
    let timestamp = message
        .get("collection_timestamp")
        .and_then(Value::as_f64)
        .ok_or(PayloadError::MissingField("collection_timestamp"))? as i64;
    let host = message
        .get("internalHostname")
        .and_then(Value::as_str)
        .ok_or(PayloadError::MissingField("internalHostname"))?;

    let point_tags = collect_point_tags(message, config);
    let mut samples = Vec::new();

    // cpu* / mem* top-level readings, camel-case keys dotted
    for (key, value) in message {
        if !(key.starts_with("cpu") || key.starts_with("mem")) {
            continue;
        }
        let Some(value) = value.as_f64() else {
            debug!(key, "skipping non-numeric system reading");
            continue;
        };
        let name = format!("system.{}", camel_to_dotted(key));
        samples.push(MetricSample::new(name, value, timestamp, host));
    }

    // metrics array: [name, timestamp, value, tags]
    let metrics = message
        .get("metrics")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for metric in metrics {
        let (Some(name), Some(ts), Some(value)) = (
            metric.get(0).and_then(Value::as_str),
            metric.get(1).and_then(Value::as_f64),
            metric.get(2).and_then(Value::as_f64),
        ) else {
            debug!("skipping metrics entry with a missing or non-numeric field");
            continue;
        };

        let mut tags = BTreeMap::new();
        if let Some(jtags) = metric.get(3).and_then(Value::as_object) {
            for (key, value) in jtags {
                // non-string tag values are dropped
                if let Some(value) = value.as_str() {
                    tags.insert(key.clone(), value.to_string());
                }
            }
        }
        let source = resolve_source("=hostname", &mut tags);
        let mut sample = MetricSample::new(name, value, ts as i64, source);
        sample.tags = tags;
        samples.push(sample);
    }

    // per-disk ioStats
    if let Some(iostats) = message.get("ioStats").and_then(Value::as_object) {
        for (disk, stats) in iostats {
            let Some(stats) = stats.as_object() else {
                continue;
            };
            for (stat, value) in stats {
                let Some(value) = value.as_f64() else {
                    debug!(disk, stat, "skipping non-numeric io stat");
                    continue;
                };
                let name = format!("system.io.{}", stat.replace('%', "").replace('/', "_"));
                samples.push(
                    MetricSample::new(name, value, timestamp, host).with_tag("disk", disk),
                );
            }
        }
    }

    // process count
    if let Some(processes) = message
        .get("processes")
        .and_then(|p| p.get("processes"))
        .and_then(Value::as_array)
    {
        samples.push(MetricSample::new(
            "system.processes.count",
            processes.len() as f64,
            timestamp,
            host,
        ));
    }

    // load averages
    for name in LOAD_METRIC_NAMES {
        if let Some(value) = message.get(name).and_then(Value::as_f64) {
            samples.push(MetricSample::new(name, value, timestamp, host));
        }
    }

    // point tags render last in the original, so they win over sample tags
    if !point_tags.is_empty() {
        for sample in &mut samples {
            for (key, value) in &point_tags {
                sample.tags.insert(key.clone(), value.clone());
            }
        }
    }

    Ok(samples)
}

/// Host tags (`host-tags.system`) plus configured meta keys, applied as
/// point tags to every collector sample of this invocation only
fn collect_point_tags(
    message: &Map<String, Value>,
    config: &EmitterConfig,
) -> BTreeMap<String, String> {
    let mut point_tags = BTreeMap::new();

    if let Some(host_tags) = message
        .get("host-tags")
        .and_then(|t| t.get("system"))
        .and_then(Value::as_array)
    {
        for tag in host_tags.iter().filter_map(Value::as_str) {
            let mut parts = tag.split(':');
            if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
                point_tags.insert(sanitize_tag(key), sanitize_tag(value));
            }
        }
    }

    if let Some(meta) = message.get("meta").and_then(Value::as_object) {
        for key in &config.meta_tags {
            if let Some(value) = meta.get(key).and_then(Value::as_str) {
                point_tags.insert(key.clone(), value.to_string());
            }
        }
    }

    point_tags
}

/// Resolve the `=hostname` source indirection
///
/// When the source marker is `=<key>` and the tags carry that key, the tag
/// value becomes the source and the tag is dropped from the rendered set.
/// Without a matching tag the literal marker is kept as the source.
fn resolve_source(marker: &str, tags: &mut BTreeMap<String, String>) -> String {
    if let Some(key) = marker.strip_prefix('=') {
        if let Some(value) = tags.remove(key) {
            return value;
        }
    }
    marker.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> EmitterConfig {
        EmitterConfig::new("proxy-host")
    }

    #[test]
    fn test_rejects_non_object_payload() {
        let err = decode(&json!([1, 2, 3]), &config()).unwrap_err();
        assert!(matches!(err, PayloadError::NotAnObject));
    }

    #[test]
    fn test_series_flavor() {
        let payload = json!({
            "series": [{
                "metric": "app.requests",
                "host": "web-1",
                "tags": ["env:prod", "role:frontend"],
                "points": [[1_700_000_000.0, 12.0], [1_700_000_010.0, 15.5]]
            }]
        });
        let samples = decode(&payload, &config()).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].name, "app.requests");
        assert_eq!(samples[0].source, "web-1");
        assert_eq!(samples[0].timestamp, 1_700_000_000);
        assert_eq!(samples[0].tags.get("env").map(String::as_str), Some("prod"));
        assert_eq!(samples[1].value, 15.5);
    }

    #[test]
    fn test_series_null_tags_and_null_values() {
        let payload = json!({
            "series": [{
                "metric": "app.requests",
                "host": "web-1",
                "tags": null,
                "points": [[1_700_000_000.0, null], [1_700_000_010.0, 3.0]]
            }]
        });
        let samples = decode(&payload, &config()).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, 3.0);
        assert!(samples[0].tags.is_empty());
    }

    #[test]
    fn test_collector_requires_timestamp_and_hostname() {
        let err = decode(&json!({"cpuIdle": 99.0}), &config()).unwrap_err();
        assert!(matches!(
            err,
            PayloadError::MissingField("collection_timestamp")
        ));

        let err = decode(
            &json!({"collection_timestamp": 1_700_000_000.5}),
            &config(),
        )
        .unwrap_err();
        assert!(matches!(err, PayloadError::MissingField("internalHostname")));
    }

    #[test]
    fn test_collector_cpu_mem_keys() {
        let payload = json!({
            "collection_timestamp": 1_700_000_000.9,
            "internalHostname": "host1",
            "cpuIdle": 99.33,
            "memPhysFree": 1024.0,
            "cpuModelName": "some-cpu",
            "uptime": 5.0
        });
        let samples = decode(&payload, &config()).unwrap();
        let names: Vec<_> = samples.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"system.cpu.idle"));
        assert!(names.contains(&"system.mem.phys.free"));
        // non-numeric cpu* key skipped, unrelated key ignored
        assert_eq!(samples.len(), 2);
        // fractional collection timestamp truncates
        assert_eq!(samples[0].timestamp, 1_700_000_000);
        assert_eq!(samples[0].source, "host1");
    }

    #[test]
    fn test_collector_metrics_array_with_hostname_indirection() {
        let payload = json!({
            "collection_timestamp": 1_700_000_000.0,
            "internalHostname": "host1",
            "metrics": [
                ["app.latency", 1_700_000_001.0, 0.25,
                 {"hostname": "web-7", "env": "prod", "pid": 42}],
                ["app.errors", 1_700_000_002.0, 3.0, {"env": "prod"}],
                ["app.nulls", 1_700_000_003.0, null, {}]
            ]
        });
        let samples = decode(&payload, &config()).unwrap();
        assert_eq!(samples.len(), 2);

        // hostname tag becomes the source and is dropped from the tags
        assert_eq!(samples[0].name, "app.latency");
        assert_eq!(samples[0].source, "web-7");
        assert_eq!(samples[0].timestamp, 1_700_000_001);
        assert!(!samples[0].tags.contains_key("hostname"));
        // non-string tag values are dropped
        assert!(!samples[0].tags.contains_key("pid"));
        assert_eq!(samples[0].tags.get("env").map(String::as_str), Some("prod"));

        // no hostname tag: the literal marker is kept as the source
        assert_eq!(samples[1].source, "=hostname");
    }

    #[test]
    fn test_collector_iostats_and_processes_and_load() {
        let payload = json!({
            "collection_timestamp": 1_700_000_000.0,
            "internalHostname": "host1",
            "ioStats": {
                "sda": {"%util": 1.5, "rkb/s": 200.0},
                "sdb": {"await": "n/a"}
            },
            "processes": {"host": "other-name", "processes": [[], [], []]},
            "system.load.1": 0.5,
            "system.load.norm.5": 0.1
        });
        let samples = decode(&payload, &config()).unwrap();
        let by_name = |name: &str| samples.iter().find(|s| s.name == name).unwrap();

        let util = by_name("system.io.util");
        assert_eq!(util.value, 1.5);
        assert_eq!(util.tags.get("disk").map(String::as_str), Some("sda"));
        let rkb = by_name("system.io.rkb_s");
        assert_eq!(rkb.value, 200.0);

        assert_eq!(by_name("system.processes.count").value, 3.0);
        assert_eq!(by_name("system.load.1").value, 0.5);
        assert_eq!(by_name("system.load.norm.5").value, 0.1);
        // non-numeric io stat skipped
        assert_eq!(samples.len(), 5);
    }

    #[test]
    fn test_collector_point_tags_from_host_tags_and_meta() {
        let mut config = config();
        config.meta_tags = vec!["socket-fqdn".to_string(), "absent".to_string()];
        let payload = json!({
            "collection_timestamp": 1_700_000_000.0,
            "internalHostname": "host1",
            "cpuIdle": 99.0,
            "host-tags": {"system": ["zone:us-[\"west\"]", "team:infra"]},
            "meta": {"socket-fqdn": "host1.example.com", "ignored": "x"}
        });
        let samples = decode(&payload, &config).unwrap();
        let tags = &samples[0].tags;
        assert_eq!(tags.get("zone").map(String::as_str), Some("us-west"));
        assert_eq!(tags.get("team").map(String::as_str), Some("infra"));
        assert_eq!(
            tags.get("socket-fqdn").map(String::as_str),
            Some("host1.example.com")
        );
        assert!(!tags.contains_key("absent"));
    }

    #[test]
    fn test_point_tags_overwrite_sample_tags() {
        let payload = json!({
            "collection_timestamp": 1_700_000_000.0,
            "internalHostname": "host1",
            "metrics": [["app.latency", 1_700_000_000.0, 1.0, {"env": "staging"}]],
            "host-tags": {"system": ["env:prod"]}
        });
        let samples = decode(&payload, &config()).unwrap();
        assert_eq!(samples[0].tags.get("env").map(String::as_str), Some("prod"));
    }
}
