#![deny(missing_docs)]

//! `semisplit`: index unlabeled tile corpora and build labeled/unlabeled splits.

use std::path::PathBuf;
use std::sync::Arc;

use rand::{SeedableRng, rngs::StdRng};
use semisplit::config::RunConfig;
use semisplit::dataset::manifest::{SplitManifest, write_manifest};
use semisplit::dataset::{Dataset, ImageFolder, Magnification, UnlabeledCorpus, build_split};
use semisplit::logging::{self, LogOptions};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

enum Command {
    Index(RunConfig),
    Split(RunConfig),
}

fn run() -> Result<(), String> {
    let Some((command, log_options)) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    if let Err(err) = logging::init(&log_options) {
        eprintln!("Logging to file disabled: {err}");
    }
    match command {
        Command::Index(config) => run_index(&config),
        Command::Split(config) => run_split(&config),
    }
}

fn run_index(config: &RunConfig) -> Result<(), String> {
    let options = config.corpus.to_options().map_err(|err| err.to_string())?;
    let corpus = UnlabeledCorpus::open(options).map_err(|err| err.to_string())?;
    println!(
        "Indexed {} tiles from {} cases at magnification {} under {}",
        corpus.len(),
        corpus.case_count(),
        corpus.magnification(),
        corpus.root().display()
    );
    Ok(())
}

fn run_split(config: &RunConfig) -> Result<(), String> {
    let root = config
        .split
        .root
        .clone()
        .ok_or_else(|| "--root is required".to_string())?;
    let dataset = Arc::new(ImageFolder::open(root).map_err(|err| err.to_string())?);
    let options = config.split.to_options();
    let seed = config.split.seed;
    let split = match seed {
        Some(seed) => build_split(dataset.clone(), &options, &mut StdRng::seed_from_u64(seed)),
        None => build_split(dataset.clone(), &options, &mut rand::rng()),
    }
    .map_err(|err| err.to_string())?;

    println!(
        "Labeled {} / unlabeled {} items across {} classes",
        split.labeled.len(),
        split.unlabeled.len(),
        options.num_classes
    );
    for (class_idx, name) in dataset.classes().iter().enumerate().take(options.num_classes) {
        println!("  {class_idx}: {name}");
    }
    if let Some(out) = &config.split.manifest_out {
        let manifest = SplitManifest::from_split(&split, &options, seed);
        write_manifest(out, &manifest).map_err(|err| err.to_string())?;
        println!("Wrote split manifest to {}", out.display());
    }
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<Option<(Command, LogOptions)>, String> {
    let Some(subcommand) = args.first() else {
        return Err(format!("Missing command\n\n{}", help_text()));
    };
    if matches!(subcommand.as_str(), "-h" | "--help") {
        println!("{}", help_text());
        return Ok(None);
    }
    let rest = &args[1..];
    let config_path = find_config_flag(rest)?;
    let mut config = match config_path {
        Some(path) => RunConfig::load(&path).map_err(|err| err.to_string())?,
        None => RunConfig::default(),
    };
    let mut log_options = LogOptions::default();

    let mut idx = 0usize;
    while idx < rest.len() {
        let flag = rest[idx].as_str();
        match (subcommand.as_str(), flag) {
            (_, "-h" | "--help") => {
                println!("{}", help_text());
                return Ok(None);
            }
            (_, "-v" | "--verbose") => log_options.verbose = true,
            (_, "--config") => idx += 1,
            (_, "--log-dir") => {
                log_options.dir = Some(PathBuf::from(value(rest, &mut idx, flag)?));
            }
            ("index", "--root") => {
                config.corpus.root = Some(PathBuf::from(value(rest, &mut idx, flag)?));
            }
            ("index", "--magnification") => {
                let raw = value(rest, &mut idx, flag)?;
                config.corpus.magnification =
                    Some(raw.parse::<Magnification>().map_err(|err| err.to_string())?);
            }
            ("index", "--exclude-list") => {
                config.corpus.exclude_list = Some(PathBuf::from(value(rest, &mut idx, flag)?));
            }
            ("index", "--limit") => {
                config.corpus.limit = Some(parse_number(value(rest, &mut idx, flag)?, flag)?);
            }
            ("split", "--root") => {
                config.split.root = Some(PathBuf::from(value(rest, &mut idx, flag)?));
            }
            ("split", "--per-class") => {
                config.split.images_per_class =
                    Some(parse_number(value(rest, &mut idx, flag)?, flag)?);
            }
            ("split", "--classes") => {
                config.split.num_classes = Some(parse_number(value(rest, &mut idx, flag)?, flag)?);
            }
            ("split", "--total-size") => {
                config.split.total_size = Some(parse_number(value(rest, &mut idx, flag)?, flag)?);
            }
            ("split", "--seed") => {
                config.split.seed = Some(parse_number(value(rest, &mut idx, flag)?, flag)?);
            }
            ("split", "--out") => {
                config.split.manifest_out = Some(PathBuf::from(value(rest, &mut idx, flag)?));
            }
            (_, unknown) => {
                return Err(format!("Unknown argument: {unknown}\n\n{}", help_text()));
            }
        }
        idx += 1;
    }

    let command = match subcommand.as_str() {
        "index" => Command::Index(config),
        "split" => Command::Split(config),
        other => return Err(format!("Unknown command: {other}\n\n{}", help_text())),
    };
    Ok(Some((command, log_options)))
}

fn find_config_flag(args: &[String]) -> Result<Option<PathBuf>, String> {
    match args.iter().position(|arg| arg == "--config") {
        Some(pos) => args
            .get(pos + 1)
            .map(|path| Some(PathBuf::from(path)))
            .ok_or_else(|| "--config requires a value".to_string()),
        None => Ok(None),
    }
}

fn value<'a>(args: &'a [String], idx: &mut usize, flag: &str) -> Result<&'a str, String> {
    *idx += 1;
    args.get(*idx)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_number<T: std::str::FromStr>(raw: &str, flag: &str) -> Result<T, String> {
    raw.parse::<T>()
        .map_err(|_| format!("Invalid {flag} value: {raw}"))
}

fn help_text() -> String {
    [
        "semisplit",
        "",
        "Indexes unlabeled tile corpora and builds stratified labeled/unlabeled splits.",
        "",
        "Usage:",
        "  semisplit index --root <dir> [options]",
        "  semisplit split --root <dir> [options]",
        "",
        "Common options:",
        "  --config <file>          TOML run config; flags override its values.",
        "  --log-dir <dir>          Write log files here (default: app data location).",
        "  -v, --verbose            Debug logging unless RUST_LOG is set.",
        "",
        "index options:",
        "  --root <dir>             Folder holding <case>-files/<magnification>/ tiles.",
        "  --magnification <level>  One of 40.0, 20.0, 10.0, 5.0 (default: 20.0).",
        "  --exclude-list <file>    Slide names to leave out, one per line.",
        "  --limit <usize>          Root entries to scan (entries, not matches).",
        "",
        "split options:",
        "  --root <dir>             Class-per-folder labeled image dataset.",
        "  --per-class <usize>      Labeled items drawn per class (default: 5).",
        "  --classes <usize>        Classes 0..N are sampled (default: 9).",
        "  --total-size <usize>     Index range for the unlabeled complement (default: dataset size).",
        "  --seed <u64>             Seed for reproducible sampling.",
        "  --out <file>             Write a JSON split manifest.",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_split_flags() {
        let (command, log) = parse_args(args(&[
            "split", "--root", "/data", "--per-class", "3", "--seed", "9", "-v",
        ]))
        .unwrap()
        .unwrap();
        let Command::Split(config) = command else {
            panic!("expected split command");
        };
        assert_eq!(config.split.images_per_class, Some(3));
        assert_eq!(config.split.seed, Some(9));
        assert!(log.verbose);
    }

    #[test]
    fn rejects_bad_magnification() {
        let err = parse_args(args(&["index", "--root", "/d", "--magnification", "7.5"]))
            .err()
            .unwrap();
        assert!(err.contains("magnification"));
    }

    #[test]
    fn flags_are_scoped_to_command() {
        assert!(parse_args(args(&["index", "--seed", "1"])).is_err());
    }
}
