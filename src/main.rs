//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `scoreboard` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All database behavior is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::process;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use scoreboard::config::{Command, Opt};
use scoreboard::initialization::{
    init_aggregator, init_logger_with, init_pool, init_recorder, init_repository,
};
use scoreboard::session::{render_table, Submitted};
use scoreboard::{
    ensure_schema, AddOutcome, Config, ConnectionPool, Decision, Game, ScoreRecord,
    StatementOutcome, SystemProbe, TransactionSession,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Allow SCOREBOARD_DATABASE_URL to come from a .env file
    let _ = dotenvy::dotenv();

    let opt = Opt::parse();
    let config = opt.to_config();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = run(opt.command, &config).await {
        eprintln!("scoreboard error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn run(command: Command, config: &Config) -> Result<()> {
    let pool = init_pool(config)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    let result = dispatch(command, &pool, config).await;
    pool.close().await;
    result
}

async fn dispatch(command: Command, pool: &ConnectionPool, config: &Config) -> Result<()> {
    let repository = init_repository(pool, config);

    match command {
        Command::Init => {
            ensure_schema(pool).await.context("Failed to create tables")?;
            println!("Tables are ready");
        }
        Command::Resolve { game } => {
            let table = repository.resolve_table(Game::parse(&game)?).await?;
            println!("{table}");
        }
        Command::Add {
            game,
            player,
            score,
        } => match repository.add_score(Game::parse(&game)?, &player, score).await? {
            AddOutcome::Inserted => println!("Recorded {score} for {player}"),
            AddOutcome::AlreadyRecorded => println!("{player} already has a record"),
        },
        Command::Show { game, json } => {
            let aggregator = init_aggregator(&repository);
            let results = aggregator.read(Game::parse(&game)?).await?;
            if json {
                let tables: Vec<_> = results
                    .iter()
                    .map(|t| match &t.outcome {
                        Ok(rows) => json!({ "table": t.table.as_str(), "rows": rows }),
                        Err(e) => json!({ "table": t.table.as_str(), "error": e.to_string() }),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&tables)?);
            } else {
                for t in &results {
                    println!("{}", t.table);
                    match &t.outcome {
                        Ok(rows) => println!("{}", score_table(rows)),
                        Err(e) => println!("  failed: {e}"),
                    }
                }
            }
        }
        Command::Update {
            game,
            player,
            delta,
        } => {
            let affected = repository
                .update_score(Game::parse(&game)?, &player, delta)
                .await?;
            if affected == 0 {
                println!("No record for {player}");
            } else {
                println!("Updated {player} by {delta}");
            }
        }
        Command::Reset { game } => {
            let affected = repository.reset_scores(Game::parse(&game)?).await?;
            println!("Reset {affected} scores");
        }
        Command::Clear { game } => {
            repository.clear_table(Game::parse(&game)?).await?;
            println!("Cleared {game}");
        }
        Command::LogAndClear { game } => {
            let summary = repository
                .log_and_clear(Game::parse(&game)?, &config.log_table)
                .await?;
            println!(
                "Logged {} rows for {} into {} and zeroed {} scores",
                summary.logged, summary.log_date, config.log_table, summary.zeroed
            );
        }
        Command::ServiceCheck { name } => {
            let recorder = init_recorder(pool, config, SystemProbe);
            let state = recorder.check(&name).await?;
            println!("{name}: {state}");
        }
        Command::ServiceStatus => {
            let recorder = init_recorder(pool, config, SystemProbe);
            let columns = ["Name", "Status", "Restart"].map(String::from);
            let rows: Vec<Vec<String>> = recorder
                .list()
                .await?
                .into_iter()
                .map(|s| {
                    let restart = if s.needs_restart { "Y" } else { "N" };
                    vec![s.name, s.status.to_string(), restart.to_string()]
                })
                .collect();
            println!("{}", render_table(&columns, &rows));
        }
        Command::Service { name, action } => {
            let recorder = init_recorder(pool, config, SystemProbe);
            if !recorder.control(&name, action).await? {
                anyhow::bail!("{action} {name} exited with a failure status");
            }
        }
        Command::Sql => run_sql_session(pool, config).await?,
    }
    Ok(())
}

fn score_table(rows: &[ScoreRecord]) -> String {
    let columns = ["Name", "Score", "Code"].map(String::from);
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| vec![r.player.clone(), r.score.to_string(), r.code.clone()])
        .collect();
    render_table(&columns, &cells)
}

/// Runs statements from stdin one line at a time, printing each result,
/// until `exit`/`quit` or end of input. Lines after the exit command answer
/// the commit and save prompts; without them the answers are read from the
/// terminal.
async fn run_sql_session(pool: &ConnectionPool, config: &Config) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session = TransactionSession::open(pool).await?;
    let mut executed = 0;

    eprintln!("Enter SQL statements, one per line; `exit` to finish.");
    while let Some(line) = lines.next_line().await? {
        let entry = match session.submit(&line).await? {
            Submitted::Exit => break,
            Submitted::Blank => continue,
            Submitted::Executed(entry) => entry,
        };
        executed += 1;
        match &entry.outcome {
            StatementOutcome::Rows { columns, rows } => {
                println!("{}", render_table(columns, rows))
            }
            StatementOutcome::Affected(n) => println!("{n} rows affected"),
            StatementOutcome::Failed(message) => println!("ERROR: {message}"),
        }
    }

    let commit = ask(
        &format!("Commit {executed} statements? [y/N]"),
        false,
        &mut lines,
    )
    .await;
    let decision = if commit {
        Decision::Commit
    } else {
        Decision::Rollback
    };
    let finished = session.finish(decision).await;

    let save = ask("Save session log? [Y/n]", true, &mut lines).await;
    if save {
        session
            .audit_log()
            .append_to_file(&config.audit_log_path)?;
    }

    let state = finished?;
    println!("Session {state:?}");
    Ok(())
}

async fn ask(question: &str, default: bool, stdin: &mut Lines<BufReader<Stdin>>) -> bool {
    eprint!("{question} ");
    let answer = match stdin.next_line().await.ok().flatten() {
        Some(answer) => Some(answer),
        None => read_tty_line().await,
    };
    match answer.as_deref().map(str::trim) {
        Some(a) if a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case("yes") => true,
        Some(a) if a.eq_ignore_ascii_case("n") || a.eq_ignore_ascii_case("no") => false,
        _ => default,
    }
}

async fn read_tty_line() -> Option<String> {
    let tty = tokio::fs::File::open("/dev/tty").await.ok()?;
    BufReader::new(tty).lines().next_line().await.ok().flatten()
}
