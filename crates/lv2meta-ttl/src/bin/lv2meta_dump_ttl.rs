use std::{env, fs, io};

use lv2meta_ttl::{parse_document, parse_into, DumpSink, ParseOptions};

const USAGE: &str = "usage: lv2meta_dump_ttl [--lenient] [--json] <file.ttl>";

fn main() {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let mut options = ParseOptions::strict();
    let mut json = false;
    let mut path = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--lenient" => options = ParseOptions::lenient(),
            "--json" => json = true,
            _ if path.is_none() && !arg.starts_with("--") => path = Some(arg),
            _ => {
                eprintln!("{USAGE}");
                std::process::exit(2);
            }
        }
    }
    let Some(path) = path else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let text = match fs::read_to_string(&path) {
        Ok(v) => v,
        Err(err) => {
            eprintln!("failed to read `{path}`: {err}");
            std::process::exit(2);
        }
    };

    if json {
        match parse_document(&path, &text, &options) {
            Ok(doc) => match serde_json::to_string_pretty(&doc) {
                Ok(out) => println!("{out}"),
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(1);
                }
            },
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(1);
            }
        }
        return;
    }

    let stdout = io::stdout();
    let mut sink = DumpSink::new(stdout.lock());
    match parse_into(&path, &text, &options, &mut sink) {
        Ok(stats) => {
            if let Err(err) = sink.finish() {
                eprintln!("{err}");
                std::process::exit(1);
            }
            eprintln!(
                "ok: triples={} prefixes={} blank_nodes={} skipped={}",
                stats.triples, stats.prefixes, stats.blank_nodes, stats.skipped
            );
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
