// ---------------------------------------------------------------------------
// Interactive shell
// ---------------------------------------------------------------------------
//
// Analysis runs on a background task so the shell keeps taking commands while
// a request is outstanding. Completions come back over a channel and are
// handed to the session, which drops any that a reload has made stale.

use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use summarizer_client::{parse_indices, ClientError, Completion, Controller, Notice, Ticket};
use summarizer_core::HostSummary;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use crate::render;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Sample,
    Upload(PathBuf),
    List,
    Toggle(Vec<usize>),
    SelectAll,
    SelectNone,
    Analyze,
    Results,
    Clear,
    Export(PathBuf),
    Health,
    Dismiss,
    Status,
    Help,
    Quit,
}

const HELP: &str = "\
commands:
  sample             load the sample dataset
  upload <file>      load hosts from a JSON file
  list               show hosts and selection
  toggle <i[,j-k]>   flip selection of hosts
  all | none         select every host / no host
  analyze            analyze selected hosts in the background
  results            show the latest results
  clear              drop results
  export <file>      write results (.csv for CSV, JSON otherwise)
  health             query the analysis service
  dismiss            hide the current notice
  status             show session state
  help | quit";

impl Command {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };
        let need_arg = |name: &str| {
            if rest.is_empty() { Err(format!("usage: {name} <arg>")) } else { Ok(rest) }
        };
        let cmd = match word.to_ascii_lowercase().as_str() {
            "" => return Ok(None),
            "sample" => Command::Sample,
            "upload" | "load" => Command::Upload(PathBuf::from(need_arg("upload")?)),
            "list" | "ls" => Command::List,
            "toggle" | "t" => {
                let indices = parse_indices(need_arg("toggle")?).map_err(|e| e.to_string())?;
                Command::Toggle(indices)
            }
            "all" => Command::SelectAll,
            "none" => Command::SelectNone,
            "analyze" | "run" => Command::Analyze,
            "results" => Command::Results,
            "clear" => Command::Clear,
            "export" => Command::Export(PathBuf::from(need_arg("export")?)),
            "health" => Command::Health,
            "dismiss" => Command::Dismiss,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("unknown command: {other} (try help)")),
        };
        Ok(Some(cmd))
    }
}

type Outcome = (Ticket, Result<Vec<HostSummary>, ClientError>);

pub async fn run(mut controller: Controller) -> Result<()> {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Outcome>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("host summarizer shell, service at {}", controller.api().base_url());
    println!("{HELP}");
    prompt()?;
    loop {
        tokio::select! {
            Some((ticket, outcome)) = done_rx.recv() => {
                report_completion(&mut controller, ticket, outcome);
                prompt()?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(cmd)) => execute(&mut controller, cmd, &done_tx).await?,
                    Ok(None) => {}
                    Err(msg) => println!("{msg}"),
                }
                prompt()?;
            }
        }
    }
    Ok(())
}

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}

fn print_error(e: &ClientError) {
    println!("error: {e}");
}

async fn execute(c: &mut Controller, cmd: Command, done: &mpsc::UnboundedSender<Outcome>) -> Result<()> {
    match cmd {
        Command::Sample => match c.load_sample().await {
            Ok(n) => println!("loaded {n} hosts from {}", c.sample_source()),
            Err(e) => print_error(&e),
        },
        Command::Upload(path) => match c.upload(&path, None).await {
            Ok(n) => println!("loaded {n} hosts from {}", path.display()),
            Err(e) => print_error(&e),
        },
        Command::List => {
            let s = c.session();
            if s.hosts().is_empty() {
                println!("no hosts loaded");
            }
            for (i, host) in s.hosts().iter().enumerate() {
                println!("{}", render::host_line(i, host, s.selection().contains(i), s.summary_for(i)));
            }
        }
        Command::Toggle(indices) => {
            for i in indices {
                match c.session_mut().toggle(i) {
                    Ok(true) => println!("selected {i}"),
                    Ok(false) => println!("deselected {i}"),
                    Err(e) => {
                        print_error(&e);
                        break;
                    }
                }
            }
        }
        Command::SelectAll => {
            c.session_mut().select_all();
            println!("{} selected", c.session().selection().len());
        }
        Command::SelectNone => {
            c.session_mut().select_none();
            println!("selection cleared");
        }
        Command::Analyze => match c.session_mut().begin_analysis() {
            Ok(dispatch) => {
                println!("analyzing {} hosts...", dispatch.hosts.len());
                let api = c.api().clone();
                let done = done.clone();
                tokio::spawn(async move {
                    let outcome = api.summarize(&dispatch.hosts).await;
                    if done.send((dispatch.ticket, outcome)).is_err() {
                        debug!("shell exited before analysis finished");
                    }
                });
            }
            Err(e) => print_error(&e),
        },
        Command::Results => {
            let results = c.session().results();
            if results.is_empty() {
                println!("no results");
            }
            for s in results {
                println!("{}", render::summary_text(s));
            }
        }
        Command::Clear => {
            c.session_mut().clear_results();
            println!("results cleared");
        }
        Command::Export(path) => {
            let results = c.session().results();
            if results.is_empty() {
                println!("no results to export");
            } else if let Err(e) = render::export(&path, results, false) {
                println!("error: export failed: {e}");
            } else {
                println!("wrote {} results to {}", results.len(), path.display());
            }
        }
        Command::Health => match c.api().health().await {
            Ok(h) => println!(
                "ok={} mode={}{}",
                h.ok,
                h.mode,
                h.model.map(|m| format!(" model={m}")).unwrap_or_default()
            ),
            Err(e) => print_error(&e),
        },
        Command::Dismiss => c.session_mut().dismiss_notice(),
        Command::Status => println!("{}", render::status_line(c.session())),
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}

fn report_completion(c: &mut Controller, ticket: Ticket, outcome: Result<Vec<HostSummary>, ClientError>) {
    println!();
    match c.session_mut().complete_analysis(ticket, outcome) {
        Ok(Completion::Applied { received, submitted }) => {
            if let Some(Notice::Advisory(msg)) = c.session().notice() {
                println!("{msg}");
            } else {
                println!("analysis complete: {received} of {submitted} hosts (type 'results')");
            }
        }
        Ok(Completion::Stale) => println!("ignored a response for a previous host list"),
        Err(e) => print_error(&e),
    }
}
