use std::fmt;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

use backend::HttpGateway;
use services::{
    Clock, ConjugationDrillService, DrillPhase, DrillSession, DrillView, InputOutcome,
    SubmitOutcome, TickOutcome, WordDrillService,
};
use vocab_core::model::{
    ConjugationDrillConfig, DirectionChoice, DrillSummary, PronominalFilter, VerbFilter,
    VerbGroup, WordDrillConfig,
};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidTimeLimit { raw: String },
    InvalidDirection { raw: String },
    InvalidVerbFilter { raw: String },
    InvalidPronominal { raw: String },
    InvalidGroups { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidTimeLimit { raw } => write!(f, "invalid --time-limit value: {raw}"),
            ArgsError::InvalidDirection { raw } => write!(f, "invalid --direction value: {raw}"),
            ArgsError::InvalidVerbFilter { raw } => write!(f, "invalid --verbs value: {raw}"),
            ArgsError::InvalidPronominal { raw } => write!(f, "invalid --pronominal value: {raw}"),
            ArgsError::InvalidGroups { raw } => write!(f, "invalid --groups value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- drill     [--api <url>] [--time-limit <secs>] [--direction <source|target|both>] [--ungraded] [--zen]");
    eprintln!("  cargo run -p app -- conjugate [--api <url>] [--time-limit <secs>] [--verbs <regular|irregular|both>] [--tenses <a,b>] [--groups <1,2>] [--pronominal <only|exclude|both>] [--ungraded] [--zen]");
    eprintln!("  cargo run -p app -- words     [--api <url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api http://localhost:5000");
    eprintln!("  --time-limit 300");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  VOCAB_API_URL");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Drill,
    Conjugate,
    Words,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "drill" => Some(Self::Drill),
            "conjugate" => Some(Self::Conjugate),
            "words" => Some(Self::Words),
            _ => None,
        }
    }
}

fn default_api_url() -> String {
    std::env::var("VOCAB_API_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| "http://localhost:5000".into())
}

struct DrillArgs {
    api_url: String,
    time_limit_secs: u32,
    direction: DirectionChoice,
    ungraded: bool,
    zen: bool,
}

impl DrillArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            api_url: default_api_url(),
            time_limit_secs: 300,
            direction: DirectionChoice::SourceToTarget,
            ungraded: false,
            zen: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api" => parsed.api_url = require_value(args, "--api")?,
                "--time-limit" => {
                    let value = require_value(args, "--time-limit")?;
                    parsed.time_limit_secs = parse_time_limit(&value)?;
                }
                "--direction" => {
                    let value = require_value(args, "--direction")?;
                    parsed.direction = match value.as_str() {
                        "source" => DirectionChoice::SourceToTarget,
                        "target" => DirectionChoice::TargetToSource,
                        "both" => DirectionChoice::Both,
                        _ => return Err(ArgsError::InvalidDirection { raw: value }),
                    };
                }
                "--ungraded" => parsed.ungraded = true,
                "--zen" => parsed.zen = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

struct ConjugateArgs {
    api_url: String,
    time_limit_secs: u32,
    verbs: VerbFilter,
    tenses: Option<Vec<String>>,
    groups: Option<Vec<VerbGroup>>,
    pronominal: PronominalFilter,
    ungraded: bool,
    zen: bool,
}

impl ConjugateArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            api_url: default_api_url(),
            time_limit_secs: 300,
            verbs: VerbFilter::Both,
            tenses: None,
            groups: None,
            pronominal: PronominalFilter::Both,
            ungraded: false,
            zen: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api" => parsed.api_url = require_value(args, "--api")?,
                "--time-limit" => {
                    let value = require_value(args, "--time-limit")?;
                    parsed.time_limit_secs = parse_time_limit(&value)?;
                }
                "--verbs" => {
                    let value = require_value(args, "--verbs")?;
                    parsed.verbs = match value.as_str() {
                        "regular" => VerbFilter::Regular,
                        "irregular" => VerbFilter::Irregular,
                        "both" => VerbFilter::Both,
                        _ => return Err(ArgsError::InvalidVerbFilter { raw: value }),
                    };
                }
                "--tenses" => {
                    let value = require_value(args, "--tenses")?;
                    let tenses: Vec<String> = value
                        .split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string)
                        .collect();
                    parsed.tenses = if tenses.is_empty() { None } else { Some(tenses) };
                }
                "--groups" => {
                    let value = require_value(args, "--groups")?;
                    let mut groups = Vec::new();
                    for raw in value.split(',').map(str::trim).filter(|g| !g.is_empty()) {
                        let number: u8 = raw
                            .parse()
                            .map_err(|_| ArgsError::InvalidGroups { raw: value.clone() })?;
                        let group = VerbGroup::new(number)
                            .map_err(|_| ArgsError::InvalidGroups { raw: value.clone() })?;
                        groups.push(group);
                    }
                    parsed.groups = if groups.is_empty() { None } else { Some(groups) };
                }
                "--pronominal" => {
                    let value = require_value(args, "--pronominal")?;
                    parsed.pronominal = match value.as_str() {
                        "only" => PronominalFilter::Only,
                        "exclude" => PronominalFilter::Exclude,
                        "both" => PronominalFilter::Both,
                        _ => return Err(ArgsError::InvalidPronominal { raw: value }),
                    };
                }
                "--ungraded" => parsed.ungraded = true,
                "--zen" => parsed.zen = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

fn parse_time_limit(raw: &str) -> Result<u32, ArgsError> {
    raw.parse::<u32>()
        .ok()
        .filter(|secs| *secs > 0)
        .ok_or_else(|| ArgsError::InvalidTimeLimit {
            raw: raw.to_string(),
        })
}

struct WordsArgs {
    api_url: String,
}

impl WordsArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            api_url: default_api_url(),
        };
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api" => parsed.api_url = require_value(args, "--api")?,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(parsed)
    }
}

//
// ─── SESSION LOOP ──────────────────────────────────────────────────────────────
//

/// Drive one session over stdin lines.
///
/// The wall-clock timer is re-checked cooperatively around every line. A
/// `quit` (or end of input) abandons the session: the loop stops and no
/// end-of-session report is sent.
async fn run_session(
    session: &mut DrillSession,
    clock: Clock,
    zen: bool,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let ungraded = session.grading().is_ungraded();

    loop {
        if let TickOutcome::Expired = session.on_tick(clock.now()) {
            println!("\nTime is up!");
            return Ok(false);
        }

        let view = DrillView::from_session(session, zen);
        let Some(prompt) = view.prompt.as_deref() else {
            return Ok(false);
        };

        match view.tag.as_deref() {
            Some(tag) => println!("\n[{tag}] {prompt}"),
            None => println!("\nTranslate: {prompt}"),
        }
        if let Some(remaining) = view.time_remaining_secs {
            let accuracy = view.live_accuracy_pct.unwrap_or(0.0);
            println!("  ({remaining}s left, accuracy {accuracy:.2}%)");
        }

        let Some(line) = lines.next_line().await? else {
            // stdin closed: treat as walking away mid-session.
            return Ok(true);
        };
        let input = line.trim();
        if input == "quit" {
            return Ok(true);
        }

        // Re-check the deadline before grading; a late answer is discarded.
        if let TickOutcome::Expired = session.on_tick(clock.now()) {
            println!("\nTime is up!");
            return Ok(false);
        }

        if ungraded {
            match session.update_input(input, clock.now())? {
                InputOutcome::Matched { session_ended } => {
                    println!("  ✓");
                    if session_ended {
                        return Ok(false);
                    }
                }
                InputOutcome::Pending | InputOutcome::Ignored => {}
            }
        } else {
            match session.submit(input, clock.now())? {
                SubmitOutcome::Answered {
                    correct,
                    session_ended,
                } => {
                    println!("  {}", if correct { "Correct!" } else { "Wrong!" });
                    if session_ended {
                        return Ok(false);
                    }
                }
                SubmitOutcome::Ignored => {}
            }
        }
    }
}

fn print_summary(summary: &DrillSummary, ungraded: bool) {
    println!("\n─── Session summary ───");
    println!("Total attempts:  {}", summary.attempts());
    println!("Correct answers: {}", summary.correct());
    println!("Accuracy:        {:.2}%", summary.accuracy_pct());

    if ungraded {
        if !summary.slowest().is_empty() {
            println!("\nLongest time spent:");
            for result in summary.slowest() {
                println!(
                    "  {:>4}s  {}  ({})",
                    result.time_spent_secs, result.display_label, result.user_answer
                );
            }
        }
    } else if summary.is_perfect() {
        println!("\nPerfect score, congratulations!");
    } else if !summary.mistakes().is_empty() {
        println!("\nMistakes:");
        for result in summary.mistakes() {
            println!(
                "  {}  you: {}  correct: {}",
                result.display_label, result.user_answer, result.correct_answer
            );
        }
    }
}

//
// ─── COMMANDS ──────────────────────────────────────────────────────────────────
//

async fn run_drill(args: DrillArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = WordDrillConfig::new(
        args.time_limit_secs,
        args.direction,
        args.ungraded,
        args.zen,
    )?;
    let gateway = Arc::new(HttpGateway::new(&args.api_url));
    let service = WordDrillService::new(Clock::default_clock(), gateway);

    let mut session = match service.start(&config).await {
        Ok(session) => session,
        Err(services::DrillError::EmptyQueue) => {
            eprintln!("No words available. Add vocabulary first.");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let abandoned = run_session(&mut session, service.clock(), args.zen, &mut lines).await?;
    if abandoned {
        // Walking away sends nothing; there is no partial-session record.
        return Ok(());
    }

    if session.phase() == DrillPhase::Ended {
        print_summary(&session.summary()?, args.ungraded);
        if let Err(err) = service.report_if_ended(&mut session, &config).await {
            warn!(%err, "failed to persist session results");
            eprintln!("Warning: results could not be saved ({err}).");
        }
    }
    Ok(())
}

async fn run_conjugate(args: ConjugateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConjugationDrillConfig::new(
        args.time_limit_secs,
        args.verbs,
        args.tenses.clone(),
        args.groups.clone(),
        args.pronominal,
        args.ungraded,
        args.zen,
    )?;
    let gateway = Arc::new(HttpGateway::new(&args.api_url));
    let service = ConjugationDrillService::new(Clock::default_clock(), gateway);

    let mut session = match service.start(&config).await {
        Ok(session) => session,
        Err(services::DrillError::EmptyQueue) => {
            eprintln!("No conjugations match these filters. Loosen them and retry.");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let abandoned = run_session(&mut session, service.clock(), args.zen, &mut lines).await?;
    if abandoned {
        return Ok(());
    }

    if session.phase() == DrillPhase::Ended {
        print_summary(&session.summary()?, args.ungraded);
        if let Err(err) = service.report_if_ended(&mut session, &config).await {
            warn!(%err, "failed to persist session results");
            eprintln!("Warning: results could not be saved ({err}).");
        }
    }
    Ok(())
}

async fn run_words(args: WordsArgs) -> Result<(), Box<dyn std::error::Error>> {
    use backend::WordCatalog;

    let gateway = HttpGateway::new(&args.api_url);
    let words = gateway.list_words().await?;
    if words.is_empty() {
        println!("No vocabulary yet.");
        return Ok(());
    }
    for word in &words {
        let article = word.article().map(|a| format!("{a} ")).unwrap_or_default();
        println!(
            "{:>5}  {}{}  - {}",
            word.id(),
            article,
            word.word(),
            word.translations().join(", ")
        );
    }
    Ok(())
}

//
// ─── ENTRY POINT ───────────────────────────────────────────────────────────────
//

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Drill,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Drill,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let result = match cmd {
        Command::Drill => match DrillArgs::parse(&mut iter) {
            Ok(args) => run_drill(args).await,
            Err(err) => {
                eprintln!("{err}");
                print_usage();
                return Err(err.into());
            }
        },
        Command::Conjugate => match ConjugateArgs::parse(&mut iter) {
            Ok(args) => run_conjugate(args).await,
            Err(err) => {
                eprintln!("{err}");
                print_usage();
                return Err(err.into());
            }
        },
        Command::Words => match WordsArgs::parse(&mut iter) {
            Ok(args) => run_words(args).await,
            Err(err) => {
                eprintln!("{err}");
                print_usage();
                return Err(err.into());
            }
        },
    };
    result
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("app=info".parse().expect("valid directive"))
                .add_directive("services=info".parse().expect("valid directive"))
                .add_directive("backend=info".parse().expect("valid directive")),
        )
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
