//! webscout binary entry point.

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use webscout::agent::ChatSession;
use webscout::agent_loop::{AgentEvent, LoopState, GREETING};
use webscout::cli::{model_listing, Cli, ReplInput, REPL_HELP};
use webscout::error::ScoutError;

const PREVIEW_CHARS: usize = 200;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        report(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ScoutError> {
    let config = cli.load_config()?;
    let mut session = ChatSession::new(&config)?.with_event_sink(Arc::new(render_event));

    if let Some(prompt) = cli.prompt.as_deref() {
        return ask(&mut session, prompt).await;
    }

    println!("{GREETING}");
    println!("(model: {}, /help for commands)", config.model.label());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match ReplInput::parse(&line) {
            ReplInput::Empty => continue,
            ReplInput::Quit => break,
            ReplInput::Help => println!("{REPL_HELP}"),
            ReplInput::Models => println!("{}", model_listing(session.model())),
            ReplInput::Clear => {
                session.clear();
                println!("{GREETING}");
            }
            ReplInput::Usage => {
                let usage = session.usage();
                match session.cost() {
                    Some(cost) => println!(
                        "{} tokens ({} in / {} out), about ${:.4}",
                        usage.total_tokens, usage.input_tokens, usage.output_tokens, cost.total_cost
                    ),
                    None => println!(
                        "{} tokens ({} in / {} out)",
                        usage.total_tokens, usage.input_tokens, usage.output_tokens
                    ),
                }
            }
            ReplInput::Ask(prompt) => {
                if let Err(e) = ask(&mut session, &prompt).await {
                    if matches!(e, ScoutError::Authentication(_) | ScoutError::Configuration(_)) {
                        return Err(e);
                    }
                    report(&e);
                }
            }
        }
    }
    Ok(())
}

/// One turn; Ctrl-C cancels it.
async fn ask(session: &mut ChatSession, prompt: &str) -> Result<(), ScoutError> {
    let cancel = CancellationToken::new();
    let guard = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            guard.cancel();
        }
    });

    let result = session.submit(prompt, &cancel).await;
    ctrl_c.abort();
    let outcome = result?;

    match outcome.state {
        LoopState::Canceled => eprintln!("(canceled)"),
        _ => println!("\n{}\n", outcome.answer_text()),
    }
    Ok(())
}

fn report(err: &ScoutError) {
    eprintln!("Error: {err}");
    eprintln!("  hint: {}", err.recovery_suggestion().hint());
}

fn render_event(event: AgentEvent) {
    match event {
        AgentEvent::ToolExecutionStart { call, .. } => {
            eprintln!("-> {} {}", call.name, call.arguments);
        }
        AgentEvent::ToolExecutionEnd {
            tool_name, result, ..
        } => {
            let marker = if result.is_error { "!!" } else { "<-" };
            eprintln!("{marker} {tool_name}: {}", preview(&result.result.to_string()));
        }
        AgentEvent::RunEnd {
            state: LoopState::Aborted,
            iterations,
            ..
        } => {
            eprintln!("(stopped after {iterations} tool rounds)");
        }
        AgentEvent::RunFailed { error, .. } => eprintln!("!! {error}"),
        _ => {}
    }
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
