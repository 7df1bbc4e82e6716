//! Wavefront line-protocol rendering
//!
//! One sample becomes one line:
//!
//! ```text
//! <name> <value> <timestamp> source=<source> [<key>=<value> ...]
//! ```
//!
//! Strings made of `[A-Za-z0-9._-]` render bare; anything else is wrapped
//! in double quotes with embedded `"` and `\` escaped, so a hostile tag
//! value cannot corrupt the line.

use crate::error::MalformedSample;
use crate::sample::MetricSample;

/// Render one sample into a Wavefront line (without trailing newline)
///
/// # Errors
/// Returns [`MalformedSample`] when the name is empty or the value is not
/// finite. Callers skip the sample and continue with the batch.
pub fn render(sample: &MetricSample) -> Result<String, MalformedSample> {
    if sample.name.is_empty() {
        return Err(MalformedSample::EmptyName);
    }
    if !sample.value.is_finite() {
        return Err(MalformedSample::NonFiniteValue {
            name: sample.name.clone(),
        });
    }

    let mut line = format!(
        "{} {} {} source={}",
        quote(&sample.name),
        sample.value,
        sample.timestamp,
        quote(&sample.source)
    );
    for (key, value) in &sample.tags {
        line.push(' ');
        line.push_str(&quote(key));
        line.push('=');
        line.push_str(&quote(value));
    }
    Ok(line)
}

/// Quote a field unless it is safe to render bare
fn quote(s: &str) -> String {
    if is_bare(s) {
        return s.to_string();
    }
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for ch in s.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

fn is_bare(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}

/// Convert a camel-case collector key to a dotted metric name
///
/// `"memPhysFree"` becomes `"mem.phys.free"`.
pub fn camel_to_dotted(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('.');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Strip `[`, `]` and `"` from a host-tag fragment
pub fn sanitize_tag(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, '[' | ']' | '"')).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn make_sample() -> MetricSample {
        MetricSample::new("cpu.load", 0.42, 1_700_000_000, "host1").with_tag("env", "prod")
    }

    #[test]
    fn test_render_example_line() {
        let line = render(&make_sample()).unwrap();
        assert_eq!(line, "cpu.load 0.42 1700000000 source=host1 env=prod");
    }

    #[test]
    fn test_render_integer_value_without_fraction() {
        let sample = MetricSample::new("system.processes.count", 42.0, 100, "h");
        assert_eq!(render(&sample).unwrap(), "system.processes.count 42 100 source=h");
    }

    #[test]
    fn test_render_tags_in_sorted_order() {
        let sample = MetricSample::new("m", 1.0, 1, "h")
            .with_tag("zone", "b")
            .with_tag("app", "a");
        assert_eq!(render(&sample).unwrap(), "m 1 1 source=h app=a zone=b");
    }

    #[test]
    fn test_render_quotes_unsafe_values() {
        let sample = MetricSample::new("m", 1.0, 1, "my host").with_tag("note", "a \"b\" \\c");
        assert_eq!(
            render(&sample).unwrap(),
            r#"m 1 1 source="my host" note="a \"b\" \\c""#
        );
    }

    #[test]
    fn test_render_quotes_empty_source() {
        let sample = MetricSample::new("m", 1.0, 1, "");
        assert_eq!(render(&sample).unwrap(), r#"m 1 1 source="""#);
    }

    #[test]
    fn test_render_rejects_empty_name() {
        let sample = MetricSample::new("", 1.0, 1, "h");
        assert_eq!(render(&sample), Err(MalformedSample::EmptyName));
    }

    #[test]
    fn test_render_rejects_non_finite_values() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let sample = MetricSample::new("m", bad, 1, "h");
            assert!(matches!(
                render(&sample),
                Err(MalformedSample::NonFiniteValue { .. })
            ));
        }
    }

    #[test]
    fn test_camel_to_dotted() {
        assert_eq!(camel_to_dotted("memPhysFree"), "mem.phys.free");
        assert_eq!(camel_to_dotted("cpuIdle"), "cpu.idle");
        assert_eq!(camel_to_dotted("cpu"), "cpu");
    }

    #[test]
    fn test_sanitize_tag() {
        assert_eq!(sanitize_tag("availability-zone[\"us-east\"]"), "availability-zoneus-east");
        assert_eq!(sanitize_tag("plain"), "plain");
    }
}
