use std::io::{Error, ErrorKind};
use std::sync::Arc;
use std::thread;

use ascii::AsciiString;
use log::{info, warn};
use regex::{Captures, Regex};
use tiny_http::{Header, HeaderField, Request, Response, Server, StatusCode};

use crate::web::{Result, WebError};

pub trait Action: Send + Sync {
    fn get_regex(&self) -> &Regex;
    fn handle(&self, server: &WebServer, request: Request, path_match: &Captures<'_>)
        -> Result<()>;
}

pub fn header(field: &str, value: &str) -> Result<Header> {
    let field = field
        .parse::<HeaderField>()
        .map_err(|_| WebError::InvalidHeader(field.to_string()))?;
    let value = value
        .parse::<AsciiString>()
        .map_err(|_| WebError::InvalidHeader(value.to_string()))?;

    Ok(Header { field, value })
}

pub struct WebServer {
    pub port: u16,
    pub actions: Vec<Box<dyn Action>>,
}

impl WebServer {
    pub fn new(port: u16) -> WebServer {
        WebServer {
            port,
            actions: Vec::new(),
        }
    }

    pub fn register_action(&mut self, action: Box<dyn Action>) {
        self.actions.push(action);
    }

    /// Serve forever, handling each request on its own thread.
    pub fn run_webserver(self) -> Result<()> {
        let webserver = Server::http(("0.0.0.0", self.port))
            .map_err(|e| Error::new(ErrorKind::AddrInUse, e.to_string()))?;

        info!("HTTP server listening on port {}", self.port);

        let shared = Arc::new(self);
        for request in webserver.incoming_requests() {
            let server = shared.clone();
            let _ = thread::spawn(move || server.handle_request(request));
        }

        Ok(())
    }

    pub fn handle_request(&self, request: Request) {
        info!("HTTP {:?} {:?}", request.method(), request.url());

        let url = request.url().to_string();
        let action = self.actions.iter().find(|x| x.get_regex().is_match(&url));

        let result = match action.and_then(|x| x.get_regex().captures(&url).map(|c| (x, c))) {
            Some((action, caps)) => action.handle(self, request, &caps),
            None => request
                .respond(Response::empty(StatusCode(404)))
                .map_err(WebError::from),
        };

        if let Err(e) = result {
            warn!("HTTP request for {} failed: {}", url, e);
        }
    }

    pub fn error_response(&self, request: Request, status: u16, error: &str) -> Result<()> {
        let response = Response::from_string(error.to_string()).with_status_code(StatusCode(status));
        request.respond(response)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    use crate::dns::lookup::DnsLookup;
    use crate::web::api::DnsApiAction;

    #[test]
    fn test_register_action() {
        let lookup = Arc::new(DnsLookup::with_resolvers(Vec::new()));

        let mut server = WebServer::new(8080);
        server.register_action(Box::new(DnsApiAction::new(lookup).unwrap()));

        assert_eq!(8080, server.port);
        assert_eq!(1, server.actions.len());
        assert!(server.actions[0].get_regex().is_match("/api/dns?name=example.com"));
    }

    #[test]
    fn test_header() {
        let cors = header("Access-Control-Allow-Origin", "*").unwrap();
        assert_eq!("*", cors.value.as_str());
        assert!(header("X-Name", "caf\u{e9}").is_err());
    }
}
