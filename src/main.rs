use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fluent_pretranslate::config::{FailurePolicy, PretranslationConfig};
use fluent_pretranslate::flatten::flatten_source;
use fluent_pretranslate::locale::{IcuPluralLocale, PluralLocale, StaticPluralLocale};
use fluent_pretranslate::mt::{
    MockMode, MockTranslator, Pretranslator, expand_plurals_in_pattern, prepare_pattern,
    translation_units,
};
use fluent_pretranslate::parser::Parser;
use fluent_pretranslate::preview::preview;
use fluent_pretranslate::serializer::{serialize_entry, serialize_pattern};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn source_args() -> [Arg; 2] {
    [
        Arg::new("source")
            .help("Fluent entry, e.g. 'hello = Hello { $user }!' (reads stdin if omitted)")
            .index(1),
        Arg::new("file")
            .long("file")
            .short('f')
            .help("Read the entry from a file")
            .conflicts_with("source"),
    ]
}

fn locale_args() -> [Arg; 2] {
    [
        Arg::new("locale")
            .long("locale")
            .short('l')
            .help("Target locale code (e.g., fr, ru, ar)")
            .required(true),
        Arg::new("categories")
            .long("categories")
            .short('c')
            .help("Comma-separated plural categories instead of ICU data (e.g., one,few,many,other)"),
    ]
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Print JSON instead of FTL")
        .action(ArgAction::SetTrue)
}

#[tokio::main]
async fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("fluent-pretranslate")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Flatten, expand and pretranslate Fluent messages")
        .subcommand_required(true)
        .subcommand(
            Command::new("preview")
                .about("Show the single-string preview of an entry")
                .args(source_args()),
        )
        .subcommand(
            Command::new("flatten")
                .about("Move text around selectors into every variant")
                .args(source_args()),
        )
        .subcommand(
            Command::new("expand")
                .about("Expand plural selectors to the locale's categories")
                .args(source_args())
                .args(locale_args()),
        )
        .subcommand(
            Command::new("wrap")
                .about("Show the marker-wrapped text sent to translation")
                .args(source_args())
                .args(locale_args())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("pretranslate")
                .about("Run the full pipeline through the mock translator")
                .args(source_args())
                .args(locale_args())
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .short('m')
                        .help("Mock translator mode")
                        .value_parser(["suffix", "noop", "reorder"])
                        .default_value("suffix"),
                )
                .arg(
                    Arg::new("whole-entry")
                        .long("whole-entry")
                        .help("Fail the whole entry when one attribute fails")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("no-verify")
                        .long("no-verify")
                        .help("Do not re-parse the output")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("keep-newlines")
                        .long("keep-newlines")
                        .help("Send newlines to the translator unchanged")
                        .action(ArgAction::SetTrue),
                )
                .arg(json_arg()),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("preview", sub)) => println!("{}", preview(&read_source(sub)?)),
        Some(("flatten", sub)) => print!("{}", flatten_source(&read_source(sub)?)),
        Some(("expand", sub)) => run_expand(sub)?,
        Some(("wrap", sub)) => run_wrap(sub)?,
        Some(("pretranslate", sub)) => run_pretranslate(sub).await?,
        _ => unreachable!("subcommand is required"),
    }

    Ok(())
}

fn read_source(matches: &ArgMatches) -> CliResult<String> {
    if let Some(source) = matches.get_one::<String>("source") {
        return Ok(source.clone());
    }
    if let Some(path) = matches.get_one::<String>("file") {
        return std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path, e).into());
    }
    Ok(std::io::read_to_string(std::io::stdin())?)
}

fn load_locale(matches: &ArgMatches) -> CliResult<Box<dyn PluralLocale>> {
    let code = matches
        .get_one::<String>("locale")
        .ok_or("--locale is required")?;
    match matches.get_one::<String>("categories") {
        Some(list) => {
            let names: Vec<&str> = list.split(',').map(str::trim).collect();
            Ok(Box::new(StaticPluralLocale::from_names(code, &names)?))
        }
        None => Ok(Box::new(IcuPluralLocale::new(code)?)),
    }
}

fn run_expand(matches: &ArgMatches) -> CliResult<()> {
    let source = read_source(matches)?;
    let locale = load_locale(matches)?;
    let mut entry = Parser::new(&source).parse_entry()?;
    for pattern in entry.patterns_mut() {
        expand_plurals_in_pattern(pattern, locale.as_ref());
    }
    print!("{}", serialize_entry(&entry));
    Ok(())
}

fn run_wrap(matches: &ArgMatches) -> CliResult<()> {
    let source = read_source(matches)?;
    let locale = load_locale(matches)?;
    let entry = Parser::new(&source).parse_entry()?;

    let mut units = Vec::new();
    for (unit, pattern) in translation_units(&entry) {
        let prepared = prepare_pattern(pattern, locale.as_ref());
        units.push((unit, serialize_pattern(&prepared.pattern), prepared.records));
    }

    if matches.get_flag("json") {
        let output: Vec<_> = units
            .iter()
            .map(|(unit, wrapped, records)| {
                json!({
                    "unit": unit.to_string(),
                    "wrapped": wrapped,
                    "records": records.iter().collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for (unit, wrapped, records) in &units {
            println!("{}: {}", unit, wrapped);
            for (index, literal) in records.iter().enumerate() {
                println!("  [{}] {}", index, literal);
            }
        }
    }
    Ok(())
}

async fn run_pretranslate(matches: &ArgMatches) -> CliResult<()> {
    let source = read_source(matches)?;
    let locale = load_locale(matches)?;

    let mode = match matches.get_one::<String>("mode").map(String::as_str) {
        Some("noop") => MockMode::NoOp,
        Some("reorder") => MockMode::Reorder,
        _ => MockMode::Suffix,
    };

    let mut config = PretranslationConfig::from_env()?;
    if matches.get_flag("whole-entry") {
        config = config.with_failure_policy(FailurePolicy::WholeEntry);
    }
    if matches.get_flag("no-verify") {
        config = config.with_verify_output(false);
    }
    if matches.get_flag("keep-newlines") {
        config = config.with_collapse_newlines(false);
    }
    info!("Using {:?}", config);

    let pretranslator = Pretranslator::new(MockTranslator::new(mode)).with_config(config);
    let report = pretranslator
        .pretranslate_entry(&source, locale.as_ref())
        .await?;

    if matches.get_flag("json") {
        let units: Vec<_> = report
            .units
            .iter()
            .map(|unit| match &unit.outcome {
                Ok(services) => json!({ "unit": unit.unit.to_string(), "services": services }),
                Err(e) => json!({ "unit": unit.unit.to_string(), "error": e.to_string() }),
            })
            .collect();
        let output = json!({
            "id": report.id,
            "ftl": report.to_ftl(),
            "complete": report.is_complete(),
            "services": report.services(),
            "units": units,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", report.to_ftl());
    }
    Ok(())
}
