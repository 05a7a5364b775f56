use std::ops::ControlFlow;
use std::sync::Arc;

use thiserror::Error;

use crate::database::connection::{CreateQuiz, DeleteQuiz, RetrieveQuiz, SaveQuiz, StoreError};
use crate::output::{colorize, Color, Console};
use crate::session::Session;

/// Errors a command sequence can surface at its boundary.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing the <id> parameter.")]
    MissingArgument,
    #[error("The <id> parameter is not a number.")]
    InvalidArgument,
    #[error("There is no quiz associated with id={0}.")]
    NotFound(i64),
    /// One human-readable message per violated field constraint.
    #[error("The quiz is invalid:")]
    Validation(Vec<String>),
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl From<StoreError> for CommandError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Validation(messages) => Self::Validation(messages),
            other => Self::Other(other.into()),
        }
    }
}

type CommandResult = Result<(), CommandError>;

/// A parsed command line: a command word plus at most one trailing argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    List,
    Show(Option<String>),
    Add,
    Delete(Option<String>),
    Edit(Option<String>),
    Test(Option<String>),
    Play,
    Credits,
    Quit,
    Unknown(String),
}

impl Command {
    /// Splits an input line into a command word and its argument, resolving
    /// the short aliases. Returns `None` for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let word = parts.next()?;
        let argument = parts.next().map(str::to_string);
        Some(match word.to_lowercase().as_str() {
            "h" | "help" => Self::Help,
            "list" => Self::List,
            "show" => Self::Show(argument),
            "add" => Self::Add,
            "delete" => Self::Delete(argument),
            "edit" => Self::Edit(argument),
            "test" => Self::Test(argument),
            "p" | "play" => Self::Play,
            "credits" => Self::Credits,
            "q" | "quit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        })
    }
}

/// Runs one command to completion. Every command except `quit` re-issues the
/// prompt exactly once, whether it succeeded or failed; no error escapes to
/// the caller.
pub async fn dispatch<S, Sess, C>(
    command: Command,
    session: &mut Sess,
    console: &C,
    store: &Arc<S>,
) -> ControlFlow<()>
where
    S: RetrieveQuiz + CreateQuiz + SaveQuiz + DeleteQuiz,
    Sess: Session,
    C: Console,
{
    let outcome = match command {
        Command::Help => {
            help(console);
            Ok(())
        }
        Command::List => list(console, store).await,
        Command::Show(argument) => show(console, store, argument.as_deref()).await,
        Command::Add => add(session, console, store).await,
        Command::Delete(argument) => delete(store, argument.as_deref()).await,
        Command::Edit(argument) => edit(session, console, store, argument.as_deref()).await,
        Command::Test(argument) => test(session, console, store, argument.as_deref()).await,
        Command::Play => {
            play(console);
            Ok(())
        }
        Command::Credits => {
            credits(console);
            Ok(())
        }
        Command::Quit => {
            session.close();
            return ControlFlow::Break(());
        }
        Command::Unknown(word) => {
            console.errorlog(&format!(
                "Unknown command '{word}'. Type 'help' to list commands."
            ));
            Ok(())
        }
    };

    if let Err(error) = outcome {
        report(console, &error);
    }
    session.prompt();
    ControlFlow::Continue(())
}

/// The single per-command failure handler: one line per error, except
/// validation failures which list every violated constraint.
fn report<C: Console>(console: &C, error: &CommandError) {
    match error {
        CommandError::Validation(messages) => {
            console.errorlog("The quiz is invalid:");
            for message in messages {
                console.errorlog(&format!("  {message}"));
            }
        }
        other => console.errorlog(&other.to_string()),
    }
}

/// Validates the raw `<id>` argument before any store access. The numeric
/// prefix of an otherwise invalid string is accepted, as permissive integer
/// parsing would.
fn validate_id(raw: Option<&str>) -> Result<i64, CommandError> {
    let raw = raw.ok_or(CommandError::MissingArgument)?;
    let digits = numeric_prefix(raw);
    digits.parse().map_err(|_| CommandError::InvalidArgument)
}

fn numeric_prefix(text: &str) -> &str {
    let mut end = 0;
    for (index, character) in text.char_indices() {
        if character.is_ascii_digit() || (index == 0 && character == '-') {
            end = index + character.len_utf8();
        } else {
            break;
        }
    }
    &text[..end]
}

fn help<C: Console>(console: &C) {
    console.log("Commands:");
    console.log("  h|help - Show this help.");
    console.log("  list - List the existing quizzes.");
    console.log("  show <id> - Show the question and the answer of the given quiz.");
    console.log("  add - Add a new quiz interactively.");
    console.log("  delete <id> - Delete the given quiz.");
    console.log("  edit <id> - Edit the given quiz.");
    console.log("  test <id> - Try to answer the given quiz.");
    console.log("  p|play - Answer all quizzes in random order.");
    console.log("  credits - Show the authors.");
    console.log("  q|quit - Leave the program.");
}

async fn list<C, S>(console: &C, store: &Arc<S>) -> CommandResult
where
    C: Console,
    S: RetrieveQuiz,
{
    for quiz in store.find_all().await? {
        console.log(&format!(
            "{}: {}",
            colorize(&quiz.id().to_string(), Color::Magenta),
            quiz.question()
        ));
    }
    Ok(())
}

async fn show<C, S>(console: &C, store: &Arc<S>, raw_id: Option<&str>) -> CommandResult
where
    C: Console,
    S: RetrieveQuiz,
{
    let id = validate_id(raw_id)?;
    let quiz = store
        .find_by_id(id)
        .await?
        .ok_or(CommandError::NotFound(id))?;
    console.log(&format!(
        "{}: {} {} {}",
        colorize(&id.to_string(), Color::Magenta),
        quiz.question(),
        colorize("=>", Color::Magenta),
        quiz.answer()
    ));
    Ok(())
}

/// The answer prompt is only issued once the question text has arrived, and
/// nothing is persisted before both replies are in.
async fn add<Sess, C, S>(session: &mut Sess, console: &C, store: &Arc<S>) -> CommandResult
where
    Sess: Session,
    C: Console,
    S: CreateQuiz,
{
    let question = session.question("Enter a question:").await;
    let answer = session.question("Enter the answer:").await;
    let quiz = store.create(&question, &answer).await?;
    log::info!("created quiz id={}", quiz.id());
    console.log(&format!(
        "{}: {} {} {}",
        colorize("Added", Color::Magenta),
        quiz.question(),
        colorize("=>", Color::Magenta),
        quiz.answer()
    ));
    Ok(())
}

async fn delete<S>(store: &Arc<S>, raw_id: Option<&str>) -> CommandResult
where
    S: DeleteQuiz,
{
    let id = validate_id(raw_id)?;
    let removed = store.destroy(id).await?;
    log::info!("delete id={id} removed {removed} rows");
    Ok(())
}

async fn edit<Sess, C, S>(
    session: &mut Sess,
    console: &C,
    store: &Arc<S>,
    raw_id: Option<&str>,
) -> CommandResult
where
    Sess: Session,
    C: Console,
    S: RetrieveQuiz + SaveQuiz,
{
    let id = validate_id(raw_id)?;
    let mut quiz = store
        .find_by_id(id)
        .await?
        .ok_or(CommandError::NotFound(id))?;

    session.write(quiz.question());
    let question = session.question("Enter a question:").await;
    session.write(quiz.answer());
    let answer = session.question("Enter the answer:").await;

    quiz.set_question(question);
    quiz.set_answer(answer);
    let quiz = store.save(&quiz).await?;
    log::info!("updated quiz id={}", quiz.id());
    console.log(&format!(
        "Changed quiz {} to: {} {} {}",
        colorize(&quiz.id().to_string(), Color::Magenta),
        quiz.question(),
        colorize("=>", Color::Magenta),
        quiz.answer()
    ));
    Ok(())
}

async fn test<Sess, C, S>(
    session: &mut Sess,
    console: &C,
    store: &Arc<S>,
    raw_id: Option<&str>,
) -> CommandResult
where
    Sess: Session,
    C: Console,
    S: RetrieveQuiz,
{
    let id = validate_id(raw_id)?;
    let quiz = store
        .find_by_id(id)
        .await?
        .ok_or(CommandError::NotFound(id))?;

    let reply = session.question(&format!("{}?", quiz.question())).await;
    if answers_match(&reply, quiz.answer()) {
        console.log("Your answer is correct.");
        console.biglog("Correct", Color::Green);
    } else {
        console.log("Your answer is incorrect.");
        console.biglog("Incorrect", Color::Red);
    }
    Ok(())
}

fn answers_match(given: &str, expected: &str) -> bool {
    given.trim().to_lowercase() == expected.trim().to_lowercase()
}

fn play<C: Console>(console: &C) {
    console.log(&colorize("Play is not available yet.", Color::Red));
}

fn credits<C: Console>(console: &C) {
    console.log("Authors of the practice:");
    console.log(&colorize("The rustquizcli team", Color::Green));
}
