mod dns;
mod output;
mod validate;
mod web;

use std::env;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use getopts::{Matches, Options};
use log::error;

use crate::dns::context::{parse_server, ResolverConfig};
use crate::dns::lookup::DnsLookup;
use crate::dns::name::NameDecoding;
use crate::dns::protocol::QueryType;
use crate::dns::resolve::DnsResolver;
use crate::validate::Validator;
use crate::web::api::DnsApiAction;
use crate::web::server::WebServer;

fn print_usage(program: &str, opts: &Options) {
    let brief = format!(
        "Usage: {} [options] DOMAIN\n\n\
         Examples:\n  \
         {0} google.com              lookup all record types\n  \
         {0} google.com -t MX        lookup only MX records\n  \
         {0} 8.8.8.8 -r              reverse lookup\n  \
         {0} google.com --json       JSON output\n  \
         {0} --web -p 8080           serve the JSON api",
        program
    );
    print!("{}", opts.usage(&brief));
}

fn build_config(matches: &Matches) -> Result<ResolverConfig, String> {
    let mut config = ResolverConfig::default();

    let servers = matches.opt_strs("server");
    if !servers.is_empty() {
        config.servers = servers
            .iter()
            .map(|x| parse_server(x).ok_or_else(|| format!("Invalid server address: {}", x)))
            .collect::<Result<Vec<_>, String>>()?;
    }

    if let Some(timeout) = matches.opt_str("timeout") {
        let secs = timeout
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite() && *x > 0.0)
            .ok_or_else(|| format!("Invalid timeout: {}", timeout))?;
        config.timeout = Duration::from_secs_f64(secs);
    }

    if matches.opt_present("legacy-id") {
        config.randomize_id = false;
        config.verify_response = false;
    }

    if matches.opt_present("follow-chains") {
        config.name_decoding = NameDecoding::FullChain;
    }

    config.external_fallback = !matches.opt_present("no-fallback");

    Ok(config)
}

fn run_web(lookup: DnsLookup, port: u16) -> web::Result<()> {
    let mut server = WebServer::new(port);
    server.register_action(Box::new(DnsApiAction::new(Arc::new(lookup))?));

    println!("Serving DNS api at http://localhost:{}/api/dns?name=<domain>&type=<code>", port);
    server.run_webserver()
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(x) => println!("{}", x),
        Err(e) => error!("Failed to encode output: {}", e),
    }
}

fn run_lookup(lookup: &DnsLookup, domain: &str, matches: &Matches) -> Result<(), String> {
    let json_output = matches.opt_present("json");
    let validator = Validator::new().map_err(|e| e.to_string())?;

    if matches.opt_present("reverse") {
        if !validator.is_valid_ip(domain) {
            return Err("Invalid IP address for reverse lookup".to_string());
        }

        let records: Vec<String> = match lookup.reverse_lookup(domain) {
            Ok(ref x) if !x.is_empty() => x.iter().map(|r| r.to_string()).collect(),
            Ok(_) | Err(dns::resolve::LookupError::NoRecords) => vec![output::no_records(QueryType::PTR)],
            Err(e) => vec![format!("Reverse lookup failed: {}", e)],
        };

        if json_output {
            print_json(&output::keyed_json(&format!("PTR_{}", domain), &records));
        } else {
            let title = format!("Reverse DNS Lookup for: {}", domain);
            println!("{}", output::render_section(&title, &records));
        }

        return Ok(());
    }

    if !validator.is_valid_domain(domain) {
        return Err("Invalid domain name".to_string());
    }

    let type_name = matches.opt_str("type").unwrap_or_else(|| "ALL".to_string());

    if type_name.eq_ignore_ascii_case("ALL") {
        let results = lookup
            .lookup_all(domain)
            .iter()
            .map(|(qtype, result)| (*qtype, output::display_records(*qtype, result)))
            .collect::<Vec<_>>();

        if json_output {
            print_json(&output::report_json(domain, &results));
        } else {
            println!("{}", output::render_report(domain, &results));
        }

        return Ok(());
    }

    let qtype = QueryType::from_name(&type_name)
        .ok_or_else(|| format!("Unsupported record type: {}", type_name))?;
    let records = output::display_records(qtype, &lookup.resolve(domain, qtype));

    if json_output {
        print_json(&output::keyed_json(&format!("{}_{}", qtype, domain), &records));
    } else {
        let title = format!("{} Records for: {}", qtype, domain);
        println!("{}", output::render_section(&title, &records));
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt(
        "t",
        "type",
        "record type to look up: A, AAAA, MX, NS, CNAME, TXT, SOA, PTR or ALL (default)",
        "TYPE",
    );
    opts.optflag("r", "reverse", "reverse lookup of an IP address");
    opts.optflag("", "json", "print results as JSON");
    opts.optflag("", "web", "serve lookups over HTTP");
    opts.optopt("p", "port", "port for the web server (default 8080)", "PORT");
    opts.optmulti("s", "server", "resolver to query, may be repeated", "IP[:PORT]");
    opts.optopt("", "timeout", "seconds to wait for each server (default 5)", "SECONDS");
    opts.optflag("", "no-fallback", "only use the built in wire protocol client");
    opts.optflag("", "legacy-id", "use a fixed transaction id and skip reply checks");
    opts.optflag("", "follow-chains", "resolve chained compression pointers");
    opts.optflag("h", "help", "print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => {
            eprintln!("Error: {}", f);
            print_usage(&program, &opts);
            process::exit(1);
        }
    };

    if matches.opt_present("h") {
        print_usage(&program, &opts);
        return;
    }

    let config = match build_config(&matches) {
        Ok(x) => x,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let lookup = DnsLookup::new(&config);

    if matches.opt_present("web") {
        let port = match matches.opt_get_default("port", 8080u16) {
            Ok(x) => x,
            Err(e) => {
                eprintln!("Error: invalid port: {}", e);
                process::exit(1);
            }
        };

        if let Err(e) = run_web(lookup, port) {
            eprintln!("Error: failed to run web server: {}", e);
            process::exit(1);
        }
        return;
    }

    let domain = match matches.free.first() {
        Some(x) => x.clone(),
        None => {
            eprintln!("Error: a domain name is required unless --web is given");
            print_usage(&program, &opts);
            process::exit(1);
        }
    };

    println!("Performing DNS lookup...");
    if let Err(e) = run_lookup(&lookup, &domain, &matches) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
