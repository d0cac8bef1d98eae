//! `json-visit`: print the values of a JSON document (stdin) that match a
//! path pattern.
//!
//! Usage:
//!   json-visit <pattern> [--first | --limit N] [--max-depth N] [--paths]
//!
//! One compact JSON value per line; with `--paths` each line is prefixed by
//! the dotted path of the match and a tab. Exits with 1 when nothing matched
//! and 2 on bad arguments, a bad pattern or malformed input.

use json_visitor::query::accept_all;
use json_visitor::{Query, StreamConfig};
use std::io::{self, BufWriter, Write};

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("json-visit: {message}");
    std::process::exit(2);
}

fn parse_count(flag: &str, value: Option<&String>) -> usize {
    match value.map(|v| v.parse::<usize>()) {
        Some(Ok(n)) => n,
        _ => fail(format!("{flag} expects a non-negative integer")),
    }
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let mut pattern: Option<String> = None;
    let mut limit = usize::MAX;
    let mut config = StreamConfig::default();
    let mut with_paths = false;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--first" => limit = 1,
            "--limit" => {
                i += 1;
                limit = parse_count("--limit", args.get(i));
            }
            "--max-depth" => {
                i += 1;
                config.max_depth = parse_count("--max-depth", args.get(i));
            }
            "--paths" => with_paths = true,
            other if pattern.is_none() => pattern = Some(other.to_string()),
            other => fail(format!("unexpected argument '{other}'")),
        }
        i += 1;
    }

    let Some(pattern) = pattern else {
        fail("usage: json-visit <pattern> [--first | --limit N] [--max-depth N] [--paths]");
    };
    let query = match Query::compile(&pattern) {
        Ok(query) => query.with_config(config),
        Err(e) => fail(format!("bad pattern '{pattern}': {e}")),
    };

    let hits = match query.find_reader(io::stdin().lock(), limit, accept_all) {
        Ok(hits) => hits,
        Err(e) => fail(e),
    };

    let mut out = BufWriter::new(io::stdout().lock());
    for hit in &hits {
        let written = if with_paths {
            writeln!(out, "{}\t{}", hit.path_string(), hit.value)
        } else {
            writeln!(out, "{}", hit.value)
        };
        if let Err(e) = written {
            fail(e);
        }
    }
    if let Err(e) = out.flush() {
        fail(e);
    }

    if hits.is_empty() {
        std::process::exit(1);
    }
}
