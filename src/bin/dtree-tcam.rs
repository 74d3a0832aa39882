//! Compile a scikit-learn decision tree dump into TCAM table entries.
//!
//! Usage:
//!   dtree-tcam -i model.json -d domains.json [-o rules.txt] [--format table-add|match]
//!              [--limit N] [--reject-over-limit] [--threads N] [-v|-vv]

use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

use dtree_tcam::compat::SklearnTree;
use dtree_tcam::compile::Compiler;
use dtree_tcam::config::{CompileConfig, LimitAction};
use dtree_tcam::domain::FeatureDomains;
use dtree_tcam::emit::{emit_rules, MatchFormat, RuleFormat, TableAddFormat, WriterSink};
use dtree_tcam::logger::Verbosity;

const USAGE: &str = "\
dtree-tcam

  -i, --input <path>      scikit-learn tree JSON (tree_ arrays + classes)
  -d, --domains <path>    feature domain table JSON
  -o, --output <path>     output file (default: stdout)
  --format <fmt>          table-add (default) | match
  --limit <n>             warn when the rule count exceeds n
  --reject-over-limit     fail instead of warning above --limit
  --threads <n>           expansion threads (default: all cores)
  -v, -vv                 info / debug logging on stderr";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    TableAdd,
    Match,
}

#[derive(Debug)]
struct Args {
    input: PathBuf,
    domains: PathBuf,
    output: Option<PathBuf>,
    format: Format,
    limit: Option<u64>,
    reject_over_limit: bool,
    threads: Option<NonZeroUsize>,
    verbosity: Verbosity,
}

fn parse_args() -> Result<Args, String> {
    let mut input = None;
    let mut domains = None;
    let mut output = None;
    let mut format = Format::TableAdd;
    let mut limit = None;
    let mut reject_over_limit = false;
    let mut threads = None;
    let mut verbosity = Verbosity::Warning;

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = |flag: &str| it.next().ok_or_else(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "-i" | "--input" => input = Some(PathBuf::from(value(&arg)?)),
            "-d" | "--domains" => domains = Some(PathBuf::from(value(&arg)?)),
            "-o" | "--output" => output = Some(PathBuf::from(value(&arg)?)),
            "--format" => {
                format = match value(&arg)?.as_str() {
                    "table-add" => Format::TableAdd,
                    "match" => Format::Match,
                    other => return Err(format!("unknown format: {other}")),
                }
            }
            "--limit" => {
                let raw = value(&arg)?;
                limit = Some(raw.parse().map_err(|_| format!("invalid --limit: {raw}"))?);
            }
            "--reject-over-limit" => reject_over_limit = true,
            "--threads" => {
                let raw = value(&arg)?;
                threads = Some(raw.parse().map_err(|_| format!("invalid --threads: {raw}"))?);
            }
            "-v" => verbosity = Verbosity::Info,
            "-vv" => verbosity = Verbosity::Debug,
            "-h" | "--help" => {
                eprintln!("{USAGE}");
                std::process::exit(0);
            }
            other => return Err(format!("unknown arg: {other}")),
        }
    }

    Ok(Args {
        input: input.ok_or("missing --input")?,
        domains: domains.ok_or("missing --domains")?,
        output,
        format,
        limit,
        reject_over_limit,
        threads,
        verbosity,
    })
}

fn write_rules<W: Write>(
    writer: W,
    format: Format,
    rules: &[dtree_tcam::Rule],
) -> Result<usize, Box<dyn Error>> {
    fn drive<W: Write, F: RuleFormat>(
        writer: W,
        format: F,
        rules: &[dtree_tcam::Rule],
    ) -> Result<usize, Box<dyn Error>> {
        let mut sink = WriterSink::new(writer, format);
        Ok(emit_rules(rules, &mut sink)?)
    }

    match format {
        Format::TableAdd => drive(writer, TableAddFormat::default(), rules),
        Format::Match => drive(writer, MatchFormat::default(), rules),
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let model = SklearnTree::from_json_reader(BufReader::new(File::open(&args.input)?))?;
    let tree = model.to_tree()?;
    let domains = FeatureDomains::from_json_reader(BufReader::new(File::open(&args.domains)?))?;

    let limit_action = if args.reject_over_limit {
        LimitAction::Reject
    } else {
        LimitAction::Warn
    };
    let config = CompileConfig::builder()
        .maybe_rule_limit(args.limit)
        .limit_action(limit_action)
        .maybe_n_threads(args.threads)
        .verbosity(args.verbosity)
        .build()?;

    let output = Compiler::new(config).compile(&tree, &domains)?;

    let written = match &args.output {
        Some(path) => write_rules(BufWriter::new(File::create(path)?), args.format, &output.rules)?,
        None => write_rules(io::stdout().lock(), args.format, &output.rules)?,
    };

    let stats = &output.stats;
    eprintln!(
        "{written} rules from {} leaves ({} unreachable, max {} rules per leaf)",
        stats.n_regions, stats.n_unreachable, stats.max_rules_per_leaf
    );
    if let Some(path) = &args.output {
        eprintln!("Rules written to: {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("error: {msg}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
