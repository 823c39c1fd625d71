use std::{
    fs,
    io::{self, BufRead, Write},
    thread,
    time::Duration,
};

use anyhow::{anyhow, Context as _, Result};

use crate::{
    cli::{Cli, Command},
    domain::{
        self,
        route::Route,
        transcript::{Transcript, WELCOME_MESSAGE},
    },
    infra::{self, storage_layout::StorageLayout},
    portal::{self, FirebaseIdentityClient, FirestoreTeamLookup, GroqCompletionClient},
    usecases::{
        self, bootstrap,
        chat_turn::{ChatTurnHandler, SubmitError},
        context::AppContext,
        guided_auth::{run_guided_auth, GuidedAuthOutcome, RetryPolicy, StdTerminal},
        logout::logout_and_reset,
        navigate::{Applied, EvaluationOutcome, Navigator},
    },
};

pub fn run(cli: Cli) -> Result<()> {
    match cli.command_or_default() {
        Command::Run { route } => {
            let context = bootstrap_with_banner(&cli)?;
            run_portal(&context, route.as_deref())
        }
        Command::Chat => {
            let context = bootstrap_with_banner(&cli)?;
            run_chat(&context)
        }
        Command::Logout => {
            let outcome = logout_and_reset()?;
            tracing::info!(
                session_removed = outcome.session_removed,
                "portal session reset"
            );
            if outcome.session_removed {
                println!("Signed out. Run askcosc again to sign back in.");
            } else {
                println!("No local session to remove.");
            }
            Ok(())
        }
    }
}

fn bootstrap_with_banner(cli: &Cli) -> Result<AppContext> {
    let context = bootstrap::bootstrap(cli.config.as_deref())?;

    tracing::debug!(
        domain = domain::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        portal = portal::module_name(),
        "module boundaries loaded"
    );

    Ok(context)
}

fn run_portal(context: &AppContext, requested: Option<&str>) -> Result<()> {
    let layout = StorageLayout::resolve()?;
    layout.ensure_dirs()?;
    let session_file = layout.session_file();

    let mut identity = FirebaseIdentityClient::new(&context.config.firebase)
        .map_err(|error| anyhow!("identity provider unavailable: {error:?}"))?;

    if let Ok(saved) = fs::read_to_string(&session_file) {
        let saved = saved.trim();
        if !saved.is_empty() {
            identity.restore_token(saved.to_owned());
        }
    }

    if identity.id_token().is_none() {
        let mut terminal = StdTerminal;
        let outcome = run_guided_auth(
            &mut terminal,
            &mut identity,
            &session_file,
            &RetryPolicy::default(),
        )?;

        if outcome == GuidedAuthOutcome::ExitWithGuidance {
            return Ok(());
        }
    }

    tracing::info!(uid = identity.uid(), "portal session ready");

    // Keep the fresh token for the next run; the probe re-validates it.
    if let Some(token) = identity.id_token() {
        fs::write(&session_file, token).with_context(|| {
            format!("failed to persist session at {}", session_file.display())
        })?;
    }

    let lookup = FirestoreTeamLookup::new(
        &context.config.firebase,
        identity.id_token().map(str::to_owned),
    )
    .map_err(|error| anyhow!("record store unavailable: {}", error.code()))?;

    let route = Route::from_path(requested.unwrap_or("/registration"));
    let mut navigator = Navigator::new();

    match navigator.evaluate(&identity, &lookup, route) {
        Applied::Latest(EvaluationOutcome::Decided { decision, .. }) => {
            if let Some(notice) = decision.notice {
                show_toast(notice);
            }
            let landed = decision.target.unwrap_or(route);
            println!("You are on {}", landed.as_path());
        }
        Applied::Latest(EvaluationOutcome::Blocked { code }) => {
            println!("Cannot navigate right now ({code}). Please retry in a moment.");
            return Ok(());
        }
        Applied::Superseded => unreachable!("single evaluation cannot be superseded"),
    }

    run_chat(context)
}

fn run_chat(context: &AppContext) -> Result<()> {
    let client = GroqCompletionClient::new(&context.config.groq)
        .map_err(|error| anyhow!("completion endpoint unavailable: {error:?}"))?;

    let mut handler = ChatTurnHandler::new(Transcript::with_welcome());
    let reveal_ms = context.config.chat.typing_reveal_ms;

    reveal_reply(WELCOME_MESSAGE, reveal_ms)?;

    let stdin = io::stdin();
    loop {
        print!("You: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line == "/quit" {
            break;
        }

        match handler.submit(&client, line) {
            Ok(reply) => {
                let message = reply.message.clone();
                reveal_reply(&message, reveal_ms)?;
            }
            Err(SubmitError::EmptyMessage) => continue,
            Err(SubmitError::TurnInFlight) => {
                // Unreachable in this synchronous loop, but the contract
                // rejects rather than queues.
                continue;
            }
        }
    }

    Ok(())
}

fn show_toast(notice: &str) {
    println!("!! {notice}");
}

/// Prints the bot reply, optionally one character at a time. Presentation
/// only; the transcript already holds the full text.
fn reveal_reply(message: &str, delay_ms: u64) -> Result<()> {
    print!("Ask COSC: ");
    if delay_ms == 0 {
        println!("{message}");
        return Ok(());
    }

    let mut stdout = io::stdout();
    for ch in message.chars() {
        write!(stdout, "{ch}")?;
        stdout.flush()?;
        thread::sleep(Duration::from_millis(delay_ms));
    }
    writeln!(stdout)?;

    Ok(())
}
