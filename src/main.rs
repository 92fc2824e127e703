//! Netcache CLI

use std::path::PathBuf;
use std::process;

use netcache::config::CacheConfig;
use netcache::{RecordKind, UrlPattern};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "check" => {
            if args.len() < 3 {
                eprintln!("Usage: netcache check <config.toml>");
                process::exit(1);
            }

            check_config(&PathBuf::from(&args[2]));
        }
        "match" => {
            if args.len() < 4 {
                eprintln!("Usage: netcache match <pattern> <url>...");
                process::exit(1);
            }

            match_urls(&args[2], &args[3..]);
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!("Run 'netcache' for usage information.");
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Netcache v{}", env!("CARGO_PKG_VERSION"));
    eprintln!();
    eprintln!("Usage: netcache <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  check     Validate a config file and print effective settings");
    eprintln!("  match     Test a URL pattern against sample URLs");
}

fn check_config(path: &std::path::Path) {
    let config = match CacheConfig::from_file(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    println!("Config: {}", path.display());
    for kind in [RecordKind::Request, RecordKind::Response] {
        let settings = config.for_kind(kind);
        println!(
            "  {kind:<8}  capacity = {:<6}  timeout = {} ms",
            settings.capacity,
            settings.timeout.as_millis()
        );
    }
}

fn match_urls(pattern: &str, urls: &[String]) {
    let pattern = match UrlPattern::new(pattern) {
        Ok(pattern) => pattern,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let mut any = false;
    for url in urls {
        let matched = pattern.matches_url(url);
        any |= matched;
        println!("{}  {url}", if matched { "match" } else { "-    " });
    }

    if !any {
        process::exit(2);
    }
}
