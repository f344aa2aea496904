//! ryzn-cli: talk to the tutoring backend from a terminal.
//!
//! Usage:
//!   ryzn-cli health                                   Check the backend
//!   ryzn-cli chunk <text>                             Show speech units
//!   ryzn-cli speak [--mute] [--voice <v>] [--format <f>] <text>
//!   ryzn-cli ask [--client <id>] [--context <t>] <q>  Ask a study question
//!   ryzn-cli conversations <user_id>                  List conversations

use anyhow::{bail, Context};
use ryzn_tutor::client::StudyContent;
use ryzn_tutor::tts::{
    chunk_text, AudioFormat, AudioPlayer, CommandPlayer, SilentPlayer, StreamOptions, TtsOptions,
};
use ryzn_tutor::TutorClient;
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "health" => cmd_health().await,
        "chunk" => cmd_chunk(&args[2..]),
        "speak" => cmd_speak(&args[2..]).await,
        "ask" => cmd_ask(&args[2..]).await,
        "conversations" => cmd_conversations(&args[2..]).await,
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        error!("{:#}", e);
        if let Some(err) = e.downcast_ref::<ryzn_tutor::Error>() {
            eprintln!("{}", err.payload().message);
        }
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"ryzn-cli: tutoring backend command-line client

USAGE:
    ryzn-cli <COMMAND> [OPTIONS]

COMMANDS:
    health                                  Check that the backend answers
    chunk <text>                            Print the speech units of a text
    speak [--mute] [--voice <v>] [--format <f>] <text>
                                            Speak a text unit by unit
    ask [--client <id>] [--context <t>] <q> Ask a question about study material
    conversations <user_id>                 List a user's conversations
    version                                 Show version information
    help                                    Show this help message

ENVIRONMENT:
    RYZN_BACKEND_URL    Backend base URL (default http://localhost:8000)
    RUST_LOG            Log filter (default info)"#
    );
}

fn cmd_version() {
    println!("ryzn-cli {}", env!("CARGO_PKG_VERSION"));
}

/// Split `args` into `--flag value` options, bare `--switch`es, and the
/// remaining words joined by spaces.
struct Parsed {
    options: Vec<(String, String)>,
    switches: Vec<String>,
    rest: String,
}

impl Parsed {
    fn option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn switch(&self, name: &str) -> bool {
        self.switches.iter().any(|s| s == name)
    }
}

fn parse(args: &[String], valued: &[&str]) -> anyhow::Result<Parsed> {
    let mut options = Vec::new();
    let mut switches = Vec::new();
    let mut words = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if valued.contains(&arg.as_str()) {
            let value = iter
                .next()
                .with_context(|| format!("{arg} needs a value"))?;
            options.push((arg.clone(), value.clone()));
        } else if arg.starts_with("--") {
            switches.push(arg.clone());
        } else {
            words.push(arg.as_str());
        }
    }
    Ok(Parsed {
        options,
        switches,
        rest: words.join(" "),
    })
}

async fn cmd_health() -> anyhow::Result<()> {
    let client = TutorClient::from_env()?;
    client.health().await?;
    println!("ok: {}", client.config().base_url);
    Ok(())
}

fn cmd_chunk(args: &[String]) -> anyhow::Result<()> {
    let text = args.join(" ");
    let chunks = chunk_text(&text);
    println!("rule: {:?}", chunks.rule());
    for unit in chunks.units() {
        println!("[{}] {:?}", unit.index, unit.text);
    }
    Ok(())
}

async fn cmd_speak(args: &[String]) -> anyhow::Result<()> {
    let parsed = parse(args, &["--voice", "--format"])?;
    if parsed.rest.trim().is_empty() {
        bail!("nothing to speak");
    }
    let client = TutorClient::from_env()?;
    let mut tts = TtsOptions::new();
    if let Some(voice) = parsed.option("--voice") {
        tts = tts.with_voice(voice);
    }
    if let Some(format) = parsed.option("--format") {
        tts = tts.with_format(AudioFormat::from_name(format));
    }
    let options = StreamOptions::from_config(client.config()).with_tts(tts);

    if parsed.switch("--mute") {
        speak_with(&client, SilentPlayer, options, &parsed.rest).await
    } else {
        speak_with(&client, CommandPlayer::system_default(), options, &parsed.rest).await
    }
}

async fn speak_with<P: AudioPlayer>(
    client: &TutorClient,
    player: P,
    options: StreamOptions,
    text: &str,
) -> anyhow::Result<()> {
    let streamer = client.streamer(player).with_options(options);
    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let mut shown = 0;
    let report = streamer
        .stream_with_cancel(
            text,
            |displayed| {
                print!("{}", &displayed[shown..]);
                let _ = std::io::stdout().flush();
                shown = displayed.len();
            },
            &cancel,
        )
        .await?;
    println!();

    if report.cancelled {
        eprintln!(
            "stopped after {} of {} units",
            report.spoken + report.degraded.len(),
            report.units
        );
    }
    if report.is_degraded() {
        eprintln!(
            "audio unavailable for {} of {} units",
            report.degraded.len(),
            report.units
        );
    }
    Ok(())
}

async fn cmd_ask(args: &[String]) -> anyhow::Result<()> {
    let parsed = parse(args, &["--client", "--context"])?;
    if parsed.rest.trim().is_empty() {
        bail!("missing question");
    }
    let client = TutorClient::from_env()?;
    let content = StudyContent::text(parsed.option("--context").unwrap_or_default());
    let answer = client
        .ask(
            parsed.option("--client").unwrap_or(ryzn_tutor::client::UNKNOWN_CLIENT),
            &content,
            &parsed.rest,
        )
        .await?;
    match answer.text() {
        Some(text) => println!("{text}"),
        None => println!("{}", serde_json::to_string_pretty(&answer)?),
    }
    Ok(())
}

async fn cmd_conversations(args: &[String]) -> anyhow::Result<()> {
    let user_id = args.first().context("missing user id")?;
    let client = TutorClient::from_env()?;
    let conversations = client.list_conversations(user_id).await?;
    if conversations.is_empty() {
        println!("no conversations");
    }
    for c in conversations {
        println!(
            "{}  {}  ({}, {} messages)",
            c.id,
            c.topic,
            c.difficulty_level,
            c.messages.len()
        );
    }
    Ok(())
}
