use std::fs;
use std::io::{self, Read};

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command, command, value_parser};
use scribe::fuzzy::{self, Candidate};
use scribe::sanitize::sanitize;
use serde_json::Value;

fn cli() -> Command {
    command!() // requires `cargo` feature
        .subcommand_required(true)
        .subcommand(
            Command::new("search")
                .about("Fuzzy-search a JSON array of patient records by name")
                .arg(
                    Arg::new("file")
                        .short('f')
                        .long("file")
                        .required(true)
                        .help("JSON file holding an array of records with a `name` field"),
                )
                .arg(
                    Arg::new("query")
                        .short('q')
                        .long("query")
                        .required(true),
                )
                .arg(
                    Arg::new("limit")
                        .short('l')
                        .long("limit")
                        .value_parser(value_parser!(usize))
                        .default_value("20"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print matching records as JSON"),
                ),
        )
        .subcommand(
            Command::new("sanitize")
                .about("Strip Markdown from a note, reading stdin when no file is given")
                .arg(Arg::new("file").short('f').long("file")),
        )
}

fn load_records(path: &str) -> anyhow::Result<Vec<Value>> {
    let raw = fs::read_to_string(path).with_context(|| format!("cannot read {path}"))?;
    serde_json::from_str(&raw).with_context(|| format!("{path} is not a JSON array"))
}

fn run_search(matches: &ArgMatches) -> anyhow::Result<()> {
    let path = matches.get_one::<String>("file").context("--file is required")?;
    let query = matches.get_one::<String>("query").context("--query is required")?;
    let limit = matches.get_one::<usize>("limit").copied().unwrap_or(20);

    let as_json = matches.get_flag("json");

    let records = load_records(path)?;
    let results: Vec<_> = fuzzy::score_candidates(query, &records)
        .into_iter()
        .take(limit)
        .collect();

    if results.is_empty() {
        eprintln!("no matches for {query:?}");
    }
    for m in &results {
        if as_json {
            println!("{}", m.candidate);
        } else {
            println!(
                "{:>6.2}  {:<16}  {}",
                m.score,
                m.kind.as_str(),
                m.candidate.name().unwrap_or_default()
            );
        }
    }
    Ok(())
}

fn run_sanitize(matches: &ArgMatches) -> anyhow::Result<()> {
    let text = match matches.get_one::<String>("file") {
        Some(path) => fs::read_to_string(path).with_context(|| format!("cannot read {path}"))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    println!("{}", sanitize(&text));
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("search", sub)) => run_search(sub),
        Some(("sanitize", sub)) => run_sanitize(sub),
        _ => unreachable!("subcommand_required"),
    }
}
