use std::env;
use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use movie_recommender::model::DEFAULT_RECOMMENDATIONS;
use movie_recommender::resolver::DEFAULT_SCORE_CUTOFF;
use movie_recommender::{CorpusBuilder, CsvColumns, Model, QueryError, Recommender};

// Matches the original catalog cap used to keep the artifact small.
const DEFAULT_CORPUS_CAP: usize = 5000;
const DEFAULT_MODEL_PATH: &str = "model.cbor";

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("build") => run_build(args),
        Some("query") => run_query(args),
        Some("-h") | Some("--help") | None => {
            print_usage();
            Ok(())
        }
        Some(other) => {
            print_usage();
            bail!("unknown command: {other}");
        }
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  movie-recommender build --data FILE.csv [--data MORE.csv] [--model FILE]");
    eprintln!("                          [--cap N] [--title-col NAME] [--text-col NAME]");
    eprintln!("                          [--votes-col NAME|none]");
    eprintln!("  movie-recommender query [--model FILE] [--title \"TEXT\"] [--top N] [--cutoff S]");
    eprintln!();
    eprintln!("build ingests CSV catalogs (deduplicated by title, first seen wins),");
    eprintln!("keeps the --cap most voted entries (default {DEFAULT_CORPUS_CAP}, 0 = no cap)");
    eprintln!("and writes the model artifact. query loads the artifact and prints the");
    eprintln!("titles most similar to --title; without --title it runs interactively.");
}

fn run_build(mut args: impl Iterator<Item = String>) -> Result<()> {
    let mut data_paths: Vec<String> = Vec::new();
    let mut model_path = DEFAULT_MODEL_PATH.to_string();
    let mut cap = Some(DEFAULT_CORPUS_CAP);
    let mut columns = CsvColumns::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data" => data_paths.push(expect_value(&mut args, "--data")?),
            "--model" => model_path = expect_value(&mut args, "--model")?,
            "--cap" => {
                let raw = expect_value(&mut args, "--cap")?;
                let n: usize = raw.parse().context("--cap needs a non-negative integer")?;
                cap = (n > 0).then_some(n);
            }
            "--title-col" => columns.title = expect_value(&mut args, "--title-col")?,
            "--text-col" => columns.text = expect_value(&mut args, "--text-col")?,
            "--votes-col" => {
                let name = expect_value(&mut args, "--votes-col")?;
                columns.popularity = (name != "none").then_some(name);
            }
            other => bail!("unknown build flag: {other}"),
        }
    }
    if data_paths.is_empty() {
        bail!("build requires at least one --data FILE.csv");
    }

    let mut builder = CorpusBuilder::new();
    for path in &data_paths {
        builder
            .read_csv_path(path, &columns)
            .with_context(|| format!("ingesting {path}"))?;
    }
    let corpus = builder.build(cap);
    if corpus.is_empty() {
        tracing::warn!("corpus is empty; the model will answer nothing");
    }

    let model = Model::build(corpus);
    model
        .save(&model_path)
        .with_context(|| format!("writing model artifact {model_path}"))?;
    println!("model written to {model_path}");
    Ok(())
}

fn run_query(mut args: impl Iterator<Item = String>) -> Result<()> {
    let mut model_path = DEFAULT_MODEL_PATH.to_string();
    let mut title: Option<String> = None;
    let mut top = DEFAULT_RECOMMENDATIONS;
    let mut cutoff = DEFAULT_SCORE_CUTOFF;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--model" => model_path = expect_value(&mut args, "--model")?,
            "--title" => title = Some(expect_value(&mut args, "--title")?),
            "--top" => {
                top = expect_value(&mut args, "--top")?
                    .parse()
                    .context("--top needs a positive integer")?;
            }
            "--cutoff" => {
                cutoff = expect_value(&mut args, "--cutoff")?
                    .parse()
                    .context("--cutoff needs a number in 0..=100")?;
            }
            other => bail!("unknown query flag: {other}"),
        }
    }

    let service = Recommender::new();
    service
        .load(&model_path)
        .with_context(|| format!("loading model artifact {model_path}"))?;

    match title {
        Some(title) => answer(&service, &title, top, cutoff),
        None => run_interactive(&service, top, cutoff),
    }
}

fn answer(service: &Recommender, input: &str, top: usize, cutoff: f64) -> Result<()> {
    match service.recommend(input, top, cutoff) {
        Ok(rec) => {
            println!("matched: {}", rec.matched_title);
            for (rank, title) in rec.recommendations.iter().enumerate() {
                println!("{}\t{}", rank + 1, title);
            }
            if rec.recommendations.is_empty() {
                println!("(nothing similar in the catalog)");
            }
            Ok(())
        }
        Err(QueryError::NoMatch { input }) => {
            println!("no catalog title close enough to {input:?}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn run_interactive(service: &Recommender, top: usize, cutoff: f64) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("Title> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("exit")
            || trimmed.eq_ignore_ascii_case("quit")
        {
            break;
        }
        answer(service, trimmed, top, cutoff)?;
    }
    Ok(())
}

fn expect_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .with_context(|| format!("{flag} requires a value"))
}
