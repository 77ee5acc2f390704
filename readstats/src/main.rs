//! # readstats
//!
//! A CLI for build-time reading statistics of Quarto projects.
//!
//! ## Overview
//!
//! readstats is built on top of readstatslib and is meant to run from a
//! project's pre- and post-render hooks. It keeps a reading-stats record next
//! to every document, writes per-directory totals, exports word-cloud data and
//! measures how long a render takes.
//!
//! ## Usage
//!
//! ```bash
//! # Refresh stale reading stats (default command)
//! readstats
//! readstats stats --root site --aggregate posts --force
//!
//! # Count one document and list the counted words
//! readstats count posts/hello.qmd --words --no-punct
//!
//! # Word-cloud files for a document
//! readstats ngrams posts/hello.qmd --max-ngram 3 --min-count 2=2
//!
//! # Around a render
//! readstats timer start
//! quarto render
//! readstats timer end
//! ```

mod render;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use outstanding::cli::{App, CommandContext, HandlerResult, Output, RunResult};
use readstatslib::ngram::{parse_min_count, ProperNames};
use readstatslib::{
    count_document, elapsed_seconds, emit_render_times, export_ngram_files, precompute,
    project_root, start_timer, AutoLoader, CountOptions, FilterConfig, FocusRule, Language,
    NgramOptions, OrderBy, Ordering, PandocLoader, PrecomputeOptions, ProjectConfig, StatsTable,
};
use render::{
    build_table_context, create_theme, render_template, OutputMode, ReportLine, RunSummary,
    REPORT_TEMPLATE, STATS_TABLE_TEMPLATE,
};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Arguments shared by the root command and `stats`
fn stats_args() -> Vec<Arg> {
    vec![
        Arg::new("include")
            .short('i')
            .long("include")
            .action(ArgAction::Append)
            .help("Include documents matching glob pattern (replaces configured includes)"),
        Arg::new("exclude")
            .short('e')
            .long("exclude")
            .action(ArgAction::Append)
            .help("Exclude documents matching glob pattern"),
        Arg::new("aggregate")
            .short('a')
            .long("aggregate")
            .action(ArgAction::Append)
            .help("Directory prefix to aggregate (can be specified multiple times)"),
        Arg::new("force")
            .long("force")
            .action(ArgAction::SetTrue)
            .help("Rebuild every record, even when it is current"),
        Arg::new("word-log")
            .long("word-log")
            .action(ArgAction::SetTrue)
            .help("Write <stem>_words.tmp next to rebuilt documents"),
        Arg::new("order-by")
            .long("order-by")
            .value_parser(["label", "words", "syllables", "seconds"])
            .default_value("label")
            .help("Order rows by field"),
    ]
}

/// Arguments that shape how a document is counted
fn count_args() -> Vec<Arg> {
    vec![
        Arg::new("lang")
            .short('l')
            .long("lang")
            .help("Language of labels and hashes (defaults to the configured lang)"),
        Arg::new("seconds-per-syllable")
            .long("seconds-per-syllable")
            .value_parser(value_parser!(f64))
            .help("Reading speed"),
        Arg::new("focus")
            .long("focus")
            .action(ArgAction::Append)
            .help("Only count inside Divs/Spans with this class"),
        Arg::new("pandoc")
            .long("pandoc")
            .help("pandoc executable"),
    ]
}

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("readstats")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Reading time, word counts and word clouds for Quarto projects")
        .arg(
            Arg::new("root")
                .short('r')
                .long("root")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Project root (defaults to $QUARTO_PROJECT_DIR, then .)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Log more (-v info, -vv debug)"),
        )
        .args(stats_args())
        .args(count_args())
        .subcommand(
            Command::new("stats")
                .about("Refresh reading-stats records (default command)")
                .args(stats_args())
                .args(count_args()),
        )
        .subcommand(
            Command::new("count")
                .about("Count a single document")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Document to count"),
                )
                .args(count_args())
                .arg(
                    Arg::new("words")
                        .long("words")
                        .action(ArgAction::SetTrue)
                        .help("Print the counted words, one per line"),
                )
                .arg(
                    Arg::new("no-punct")
                        .long("no-punct")
                        .action(ArgAction::SetTrue)
                        .help("Strip punctuation from printed words"),
                ),
        )
        .subcommand(
            Command::new("ngrams")
                .about("Export word-cloud files for a document or word log")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Document, or a <stem>_words.tmp word log"),
                )
                .args(count_args())
                .arg(
                    Arg::new("max-ngram")
                        .short('n')
                        .long("max-ngram")
                        .value_parser(value_parser!(usize))
                        .help("Largest n-gram size"),
                )
                .arg(
                    Arg::new("top-k")
                        .short('k')
                        .long("top-k")
                        .value_parser(value_parser!(usize))
                        .help("Rows kept per table"),
                )
                .arg(
                    Arg::new("min-count")
                        .long("min-count")
                        .action(ArgAction::Append)
                        .help("Minimum count for an n-gram size, as n=count"),
                )
                .arg(
                    Arg::new("stopword")
                        .long("stopword")
                        .action(ArgAction::Append)
                        .help("Additional stopword"),
                )
                .arg(
                    Arg::new("proper-name")
                        .long("proper-name")
                        .action(ArgAction::Append)
                        .help("Proper name spelling to keep"),
                )
                .arg(
                    Arg::new("pretty")
                        .long("pretty")
                        .action(ArgAction::SetTrue)
                        .help("Indent <stem>_words.json"),
                ),
        )
        .subcommand(
            Command::new("timer")
                .about("Measure a whole render")
                .subcommand_required(true)
                .subcommand(Command::new("start").about("Record the render start time"))
                .subcommand(
                    Command::new("end")
                        .about("Emit render times and report the elapsed time"),
                ),
        )
        .subcommand(
            Command::new("emit-render-times")
                .about("Merge per-document render times into JSON")
                .arg(
                    Arg::new("lang")
                        .short('l')
                        .long("lang")
                        .action(ArgAction::Append)
                        .help("Language to emit (defaults to the configured languages)"),
                ),
        )
}

/// Install the stderr log subscriber. RUST_LOG wins over -v.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    // first handler to run installs it
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|v| v.cloned().collect())
        .unwrap_or_default()
}

/// Resolve the project root and load its config
fn load_project(matches: &ArgMatches) -> anyhow::Result<(PathBuf, ProjectConfig)> {
    init_logging(matches.get_count("verbose"));
    let root = project_root(matches.get_one::<PathBuf>("root").map(PathBuf::as_path));
    let config = ProjectConfig::load(&root)?;
    debug!(root = %root.display(), lang = %config.lang, "loaded project");
    Ok((root, config))
}

/// Apply the counting flags on top of configured options
fn apply_count_args(matches: &ArgMatches, mut options: CountOptions) -> CountOptions {
    if let Some(lang) = matches.get_one::<String>("lang") {
        options = options.language(Language::new(lang));
    }
    if let Some(sps) = matches.get_one::<f64>("seconds-per-syllable") {
        options = options.seconds_per_syllable(*sps);
    }
    let focus = strings(matches, "focus");
    if !focus.is_empty() {
        options = options.focus(FocusRule::new(focus));
    }
    if let Some(pandoc) = matches.get_one::<String>("pandoc") {
        options = options.loader(AutoLoader::new(PandocLoader::new().program(pandoc)));
    }
    options
}

fn ordering(matches: &ArgMatches) -> anyhow::Result<Ordering> {
    let by: OrderBy = matches
        .get_one::<String>("order-by")
        .map(|s| s.parse::<OrderBy>())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();
    let ordering = Ordering {
        by,
        ..Ordering::default()
    };
    Ok(match by {
        OrderBy::Label => ordering.ascending(),
        _ => ordering.descending(),
    })
}

/// Build PrecomputeOptions from config and flags
fn build_precompute_options(
    matches: &ArgMatches,
    config: &ProjectConfig,
) -> anyhow::Result<PrecomputeOptions> {
    let mut options = PrecomputeOptions::from_config(config)?;

    let includes = strings(matches, "include");
    let mut excludes = config.reading_time.exclude.clone();
    excludes.extend(strings(matches, "exclude"));
    let includes = if includes.is_empty() {
        config.reading_time.include.clone()
    } else {
        includes
    };
    options = options.filter(
        FilterConfig::new()
            .include_many(&includes)?
            .exclude_many(&excludes)?,
    );

    let aggregate = strings(matches, "aggregate");
    if !aggregate.is_empty() {
        options = options.aggregate(aggregate);
    }
    if matches.get_flag("word-log") {
        options = options.word_log(true);
    }
    let count = apply_count_args(matches, options.count.clone());
    Ok(options.count(count).force(matches.get_flag("force")))
}

/// Handler for the stats command
fn stats_handler(matches: &ArgMatches, ctx: &CommandContext) -> HandlerResult<serde_json::Value> {
    let (root, config) = load_project(matches)?;
    let options = build_precompute_options(matches, &config)?;

    let report = precompute(&root, &options, &options.count.loader)?;

    // For JSON mode, return raw data
    if ctx.output_mode.is_structured() {
        return Ok(Output::Render(serde_json::to_value(&report)?));
    }

    let table = StatsTable::from_precompute(&report, ordering(matches)?, &options.count.language);
    let context = build_table_context(&table, Some(RunSummary::from_report(&report)));
    Ok(Output::Render(serde_json::to_value(&context)?))
}

/// Handler for the count command
fn count_handler(matches: &ArgMatches, ctx: &CommandContext) -> HandlerResult<serde_json::Value> {
    let (_, config) = load_project(matches)?;
    let options = apply_count_args(matches, CountOptions::from_config(&config));
    let file = matches
        .get_one::<PathBuf>("file")
        .context("missing document path")?;

    let report = count_document(file, &options)?;

    if matches.get_flag("words") {
        let words = if matches.get_flag("no-punct") {
            report.words_without_punctuation()
        } else {
            report.words.clone()
        };
        if ctx.output_mode.is_structured() {
            return Ok(Output::Render(serde_json::to_value(&words)?));
        }
        // Plain list, one word per line
        for word in words {
            println!("{}", word);
        }
        return Ok(Output::Silent);
    }

    if ctx.output_mode.is_structured() {
        return Ok(Output::Render(serde_json::to_value(&report)?));
    }

    let table = StatsTable::from_documents(
        std::slice::from_ref(&report),
        Ordering::by_label(),
        &options.language,
    );
    let context = build_table_context(&table, None);
    Ok(Output::Render(serde_json::to_value(&context)?))
}

/// `posts/hello_words.tmp` -> `posts/hello.qmd`
fn source_for_word_log(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = stem.strip_suffix("_words").unwrap_or(&stem);
    path.with_file_name(format!("{}.qmd", stem))
}

fn is_word_log(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "tmp" || ext == "txt")
}

/// Handler for the ngrams command
fn ngrams_handler(matches: &ArgMatches, _ctx: &CommandContext) -> HandlerResult<serde_json::Value> {
    let (_, config) = load_project(matches)?;
    let file = matches
        .get_one::<PathBuf>("file")
        .context("missing document path")?;

    let (source, tokens) = if is_word_log(file) {
        let text = fs::read_to_string(file)
            .with_context(|| format!("failed to read word log '{}'", file.display()))?;
        let tokens: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        (source_for_word_log(file), tokens)
    } else {
        let options = apply_count_args(matches, CountOptions::from_config(&config));
        let report = count_document(file, &options)?;
        (file.clone(), report.words_without_punctuation())
    };

    let wordcloud = &config.wordcloud;
    let mut opts = NgramOptions::from_config(wordcloud);
    if let Some(n) = matches.get_one::<usize>("max-ngram") {
        opts = opts.max_ngram(*n);
    }
    if let Some(k) = matches.get_one::<usize>("top-k") {
        opts = opts.top_k(*k);
    }
    for setting in strings(matches, "min-count") {
        let (n, count) = parse_min_count(&setting)?;
        opts = opts.min_count(n, count);
    }
    opts.stopwords.extend(strings(matches, "stopword"));
    let extra_names = strings(matches, "proper-name");
    if !extra_names.is_empty() {
        let names = wordcloud.proper_names.iter().cloned().chain(extra_names);
        opts = opts.proper_names(ProperNames::new(names));
    }
    let compressed = wordcloud.compressed && !matches.get_flag("pretty");

    let (freqs, report) = export_ngram_files(&source, &tokens, &opts, compressed)?;

    let mut lines = Vec::new();
    if let Some(path) = &report.words_json {
        lines.push(ReportLine::new(
            "wrote",
            format!("{} ({} terms)", path.display(), freqs.unigrams().len()),
        ));
    }
    for path in &report.ngram_files {
        lines.push(ReportLine::new("wrote", path.display().to_string()));
    }
    if lines.is_empty() {
        lines.push(ReportLine::new("ngrams", "no terms to export"));
    }

    Ok(Output::Render(json!({
        "lines": lines,
        "words_json": report.words_json,
        "ngram_files": report.ngram_files,
    })))
}

/// Emit render times for each language, one report line per written file
fn emit_languages(root: &Path, languages: &[String]) -> anyhow::Result<Vec<ReportLine>> {
    let mut lines = Vec::new();
    for lang in languages {
        let report = emit_render_times(root, lang)?;
        match (&report.output, &report.times) {
            (Some(path), Some(times)) => lines.push(ReportLine::new(
                "render times",
                format!(
                    "{}: {} files, {:.3} ms -> {}",
                    lang,
                    times.count,
                    times.total,
                    path.display()
                ),
            )),
            _ => debug!(lang = %lang, found = report.tmp_files, "no render times emitted"),
        }
    }
    Ok(lines)
}

/// Handler for the timer command
fn timer_handler(matches: &ArgMatches, _ctx: &CommandContext) -> HandlerResult<serde_json::Value> {
    let (root, config) = load_project(matches)?;
    let lines = match matches.subcommand() {
        Some(("start", _)) => {
            start_timer(&root)?;
            vec![ReportLine::new("render timer", "started")]
        }
        Some(("end", _)) => {
            // Without a start time nothing is emitted
            let elapsed = elapsed_seconds(&root)?;
            let mut lines = emit_languages(&root, &config.render_time.languages)?;
            lines.push(ReportLine::new(
                "Total render time:",
                format!("{:.2} s", elapsed),
            ));
            lines
        }
        _ => return Err(anyhow::anyhow!("expected 'timer start' or 'timer end'")),
    };
    Ok(Output::Render(json!({ "lines": lines })))
}

/// Handler for the emit-render-times command
fn emit_handler(matches: &ArgMatches, _ctx: &CommandContext) -> HandlerResult<serde_json::Value> {
    let (root, config) = load_project(matches)?;
    let languages = strings(matches, "lang");
    let languages = if languages.is_empty() {
        config.render_time.languages
    } else {
        languages
    };
    let lines = emit_languages(&root, &languages)?;
    Ok(Output::Render(json!({ "lines": lines })))
}

/// Output mode chosen with --output (outstanding adds _output_mode)
fn output_mode(matches: &ArgMatches) -> OutputMode {
    matches
        .get_one::<String>("_output_mode")
        .map(|s| match s.as_str() {
            "json" => OutputMode::Json,
            "text" => OutputMode::Text,
            "term-debug" => OutputMode::TermDebug,
            "term" => OutputMode::Term,
            _ => OutputMode::Auto,
        })
        .unwrap_or(OutputMode::Auto)
}

/// Root command without a subcommand - treat as stats
fn run_default(matches: &ArgMatches) -> ExitCode {
    let output_mode = output_mode(matches);
    let ctx = CommandContext {
        output_mode,
        command_path: vec![],
    };

    match stats_handler(matches, &ctx) {
        Ok(Output::Render(value)) => {
            if output_mode.is_structured() {
                match serde_json::to_string_pretty(&value) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                match render_template(STATS_TABLE_TEMPLATE, &value, output_mode) {
                    Ok(output) => print!("{}", output),
                    Err(e) => {
                        eprintln!("Error: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Ok(Output::Silent) => ExitCode::SUCCESS,
        Ok(Output::Binary { .. }) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let cmd = build_command();

    let result = App::builder()
        .theme(create_theme())
        .command("stats", stats_handler, STATS_TABLE_TEMPLATE)
        .command("count", count_handler, STATS_TABLE_TEMPLATE)
        .command("ngrams", ngrams_handler, REPORT_TEMPLATE)
        .command("timer", timer_handler, REPORT_TEMPLATE)
        .command("emit-render-times", emit_handler, REPORT_TEMPLATE)
        .run_to_string(cmd, std::env::args());

    match result {
        RunResult::Handled(output) => {
            if !output.is_empty() {
                // Handler errors come back as text
                if output.starts_with("Error:") {
                    eprintln!("{}", output);
                    return ExitCode::FAILURE;
                }
                print!("{}", output);
            }
            ExitCode::SUCCESS
        }
        RunResult::Binary(_, _) => ExitCode::SUCCESS,
        RunResult::NoMatch(matches) => run_default(&matches),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_valid() {
        build_command().debug_assert();
    }

    #[test]
    fn test_source_for_word_log() {
        assert_eq!(
            source_for_word_log(Path::new("posts/hello_words.tmp")),
            PathBuf::from("posts/hello.qmd")
        );
        assert_eq!(
            source_for_word_log(Path::new("notes.txt")),
            PathBuf::from("notes.qmd")
        );
    }

    #[test]
    fn test_ordering_direction() {
        let matches = build_command()
            .try_get_matches_from(["readstats", "--order-by", "words"])
            .unwrap();
        assert_eq!(ordering(&matches).unwrap(), Ordering::by_words());

        let matches = build_command().try_get_matches_from(["readstats"]).unwrap();
        assert_eq!(ordering(&matches).unwrap(), Ordering::by_label());
    }

    #[test]
    fn test_count_args_override_config() {
        let matches = build_command()
            .try_get_matches_from([
                "readstats",
                "count",
                "post.qmd",
                "--lang",
                "en",
                "--seconds-per-syllable",
                "0.25",
                "--focus",
                "summary",
            ])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let options = apply_count_args(sub, CountOptions::new());

        assert_eq!(options.language, Language::new("en"));
        assert_eq!(options.seconds_per_syllable, 0.25);
        assert!(options.focus.is_enabled());
    }
}
