//! rendering of lookup results for the terminal

use serde_json::{json, Map, Value};

use crate::dns::protocol::{DnsRecord, QueryType};
use crate::dns::resolve::Result;

pub fn no_records(qtype: QueryType) -> String {
    format!("No {} records found", qtype)
}

/// Records as display strings, or the "no records" sentinel when the lookup
/// came back empty for whatever reason.
pub fn display_records(qtype: QueryType, result: &Result<Vec<DnsRecord>>) -> Vec<String> {
    match *result {
        Ok(ref records) if !records.is_empty() => records.iter().map(|x| x.to_string()).collect(),
        _ => vec![no_records(qtype)],
    }
}

pub fn render_section(title: &str, records: &[String]) -> String {
    let mut output = vec![String::new(), title.to_string(), "=".repeat(50)];
    for record in records {
        output.push(format!("   * {}", record));
    }

    output.join("\n")
}

pub fn render_report(domain: &str, results: &[(QueryType, Vec<String>)]) -> String {
    let mut output = vec![
        String::new(),
        format!("DNS Lookup Results for: {}", domain),
        "=".repeat(60),
    ];

    for (qtype, records) in results {
        output.push(String::new());
        output.push(format!("{} Records:", qtype));
        for record in records {
            output.push(format!("   * {}", record));
        }
    }

    output.join("\n")
}

pub fn report_json(domain: &str, results: &[(QueryType, Vec<String>)]) -> Value {
    let mut types = Map::new();
    for (qtype, records) in results {
        types.insert(qtype.to_string(), json!(records));
    }

    let mut root = Map::new();
    root.insert(domain.to_string(), Value::Object(types));

    Value::Object(root)
}

pub fn keyed_json(key: &str, records: &[String]) -> Value {
    let mut root = Map::new();
    root.insert(key.to_string(), json!(records));

    Value::Object(root)
}
