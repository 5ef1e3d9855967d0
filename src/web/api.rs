use std::collections::BTreeMap;
use std::sync::Arc;

use regex::{Captures, Regex};
use serde_derive::Serialize;
use tiny_http::{Request, Response};

use crate::dns::lookup::DnsLookup;
use crate::dns::protocol::QueryType;
use crate::dns::resolve::DnsResolver;
use crate::web::server::{header, Action, WebServer};
use crate::web::util::parse_query;
use crate::web::Result;

#[derive(Debug, Serialize, PartialEq)]
pub struct AnswerEntry {
    pub data: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DnsApiResponse {
    #[serde(rename = "Status")]
    pub status: u8,
    #[serde(rename = "Answer")]
    pub answer: Vec<AnswerEntry>,
}

impl DnsApiResponse {
    /// Status 0 when anything was found, 2 otherwise.
    pub fn from_answers(answers: Vec<String>) -> DnsApiResponse {
        let answer: Vec<AnswerEntry> = answers
            .into_iter()
            .filter(|x| !x.is_empty())
            .map(|data| AnswerEntry { data })
            .collect();

        DnsApiResponse {
            status: if answer.is_empty() { 2 } else { 0 },
            answer,
        }
    }
}

/// Map the numeric type parameter of the api onto a record type. Anything
/// unrecognized is treated as an address query.
pub fn api_query_type(code: Option<&str>) -> QueryType {
    match code.and_then(|x| x.parse::<u16>().ok()) {
        Some(1) => QueryType::A,
        Some(28) => QueryType::AAAA,
        Some(15) => QueryType::MX,
        Some(2) => QueryType::NS,
        Some(5) => QueryType::CNAME,
        Some(16) => QueryType::TXT,
        Some(6) => QueryType::SOA,
        _ => QueryType::A,
    }
}

pub struct DnsApiAction {
    context: Arc<DnsLookup>,
    regex: Regex,
}

impl DnsApiAction {
    pub fn new(context: Arc<DnsLookup>) -> Result<DnsApiAction> {
        Ok(DnsApiAction {
            context,
            regex: Regex::new(r"^/api/dns/?(?:\?(.*))?$")?,
        })
    }
}

impl Action for DnsApiAction {
    fn get_regex(&self) -> &Regex {
        &self.regex
    }

    fn handle(&self, server: &WebServer, request: Request, caps: &Captures<'_>) -> Result<()> {
        let params: BTreeMap<String, String> = caps
            .get(1)
            .map(|x| parse_query(x.as_str()))
            .unwrap_or_default()
            .into_iter()
            .collect();

        let domain = match params.get("name").filter(|x| !x.is_empty()) {
            Some(x) => x,
            None => return server.error_response(request, 400, "Missing domain parameter"),
        };

        let qtype = api_query_type(params.get("type").map(|x| x.as_str()));
        let answers = self.context.resolve_strings(domain, qtype.name());

        let output = serde_json::to_string(&DnsApiResponse::from_answers(answers))?;

        let mut response = Response::from_string(output);
        response.add_header(header("Content-Type", "application/json")?);
        response.add_header(header("Access-Control-Allow-Origin", "*")?);
        request.respond(response)?;

        Ok(())
    }
}
