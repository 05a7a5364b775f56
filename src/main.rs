use std::borrow::Cow;
use std::sync::Arc;

use dotenvy::dotenv;
use tracing::level_filters;
use tracing_subscriber::fmt::format::FmtSpan;

use rustquizcli::commands::{dispatch, Command};
use rustquizcli::database::connection::Connection;
use rustquizcli::output::{Color, Console, Term};
use rustquizcli::session::{Session, TermSession};

#[tokio::main]
async fn main() {
    dotenv().ok();
    let rust_log = std::env::var("LOG_LEVEL").unwrap_or("error".into());
    tracing_subscriber::fmt()
        .with_max_level(level_filters::LevelFilter::from_level(
            rust_log.parse().unwrap_or(tracing::Level::ERROR),
        ))
        .json()
        .with_span_events(FmtSpan::ENTER)
        .log_internal_errors(true)
        .with_writer(std::io::stderr)
        .with_line_number(true)
        .with_target(false)
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:quizzes.sqlite?mode=rwc".into());
    let connection = Arc::new(
        Connection::connect(Cow::Owned(database_url))
            .await
            .expect("Failed to connect to database"),
    );
    connection
        .initialize()
        .await
        .expect("Failed to initialize database");

    log::info!("Starting quiz session...");

    let console = Term;
    let mut session = TermSession::new();
    console.biglog("CLI Quiz", Color::Magenta);
    session.prompt();

    while let Some(line) = session.next_line().await {
        let Some(command) = Command::parse(&line) else {
            session.prompt();
            continue;
        };
        if dispatch(command, &mut session, &console, &connection)
            .await
            .is_break()
        {
            break;
        }
    }

    console.biglog("Adios", Color::Magenta);
}
