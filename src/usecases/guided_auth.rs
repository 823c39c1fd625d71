//! Guided sign-in / sign-up flow for the hackathon portal, run from the
//! terminal when no local session is present.

use std::{fs, io, path::Path};

use crate::infra::secrets::sanitize_error_code;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub email_attempts: usize,
    pub password_attempts: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            email_attempts: 3,
            password_attempts: 3,
        }
    }
}

/// Result of a credential exchange with the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    /// Signed in and the account's email is verified.
    Verified,
    /// Signed in but the email still needs verification.
    VerificationPending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthBackendError {
    InvalidCredentials,
    UserNotFound,
    EmailAlreadyInUse,
    WeakPassword,
    Timeout,
    TooManyAttempts,
    Transient { code: &'static str, message: String },
}

/// Identity-provider operations the flow needs.
pub trait PortalAuthClient {
    fn sign_in(&mut self, email: &str, password: &str) -> Result<SignInOutcome, AuthBackendError>;
    fn sign_up(&mut self, email: &str, password: &str) -> Result<SignInOutcome, AuthBackendError>;
    fn resend_verification(&mut self) -> Result<(), AuthBackendError>;
}

pub trait AuthTerminal {
    fn print_line(&mut self, line: &str) -> io::Result<()>;
    fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
    fn prompt_secret(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

pub struct StdTerminal;

impl AuthTerminal for StdTerminal {
    fn print_line(&mut self, line: &str) -> io::Result<()> {
        println!("{line}");
        Ok(())
    }

    fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        use std::io::Write;

        print!("{prompt}");
        io::stdout().flush()?;

        let mut line = String::new();
        let bytes = io::stdin().read_line(&mut line)?;
        if bytes == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim().to_owned()))
    }

    fn prompt_secret(&mut self, prompt: &str) -> io::Result<Option<String>> {
        match rpassword::prompt_password(prompt) {
            Ok(password) => Ok(Some(password.trim().to_owned())),
            Err(source) if source.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(source) => Err(source),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuidedAuthOutcome {
    Authenticated,
    /// Signed in, but gated routes stay behind the verify-email page until
    /// the user clicks the link that was (re)sent.
    VerificationPending,
    ExitWithGuidance,
}

pub fn run_guided_auth(
    terminal: &mut dyn AuthTerminal,
    auth_client: &mut dyn PortalAuthClient,
    session_path: &Path,
    retry_policy: &RetryPolicy,
) -> io::Result<GuidedAuthOutcome> {
    terminal.print_line("No portal session found. Starting guided sign-in.")?;

    let Some(email) = collect_email(terminal, retry_policy.email_attempts)? else {
        return Ok(GuidedAuthOutcome::ExitWithGuidance);
    };

    let Some(outcome) = exchange_credentials(
        terminal,
        auth_client,
        &email,
        retry_policy.password_attempts,
    )?
    else {
        return Ok(GuidedAuthOutcome::ExitWithGuidance);
    };

    match outcome {
        SignInOutcome::Verified => {
            persist_session_marker(session_path)?;
            terminal.print_line("Signed in. Session saved.")?;
            Ok(GuidedAuthOutcome::Authenticated)
        }
        SignInOutcome::VerificationPending => {
            if let Err(error) = auth_client.resend_verification() {
                report_backend_error(terminal, error, 0, "verification")?;
            } else {
                terminal.print_line("Verification email sent. Check your inbox.")?;
            }
            persist_session_marker(session_path)?;
            terminal
                .print_line("Your email is not verified yet; verify it to reach gated pages.")?;
            Ok(GuidedAuthOutcome::VerificationPending)
        }
    }
}

fn collect_email(terminal: &mut dyn AuthTerminal, attempts: usize) -> io::Result<Option<String>> {
    for attempt in 1..=attempts {
        terminal.print_line("Step 1/2 — Enter the email you use on the portal.")?;
        let Some(email) = terminal.prompt_line("Email: ")? else {
            terminal.print_line("Input cancelled (EOF). Run askcosc again to retry.")?;
            return Ok(None);
        };

        if !is_valid_email(&email) {
            terminal.print_line(&format!(
                "That does not look like an email address. Attempts left: {}",
                attempts.saturating_sub(attempt)
            ))?;
            continue;
        }

        return Ok(Some(email));
    }

    terminal.print_line("Email step failed too many times. Please restart askcosc.")?;
    Ok(None)
}

fn exchange_credentials(
    terminal: &mut dyn AuthTerminal,
    auth_client: &mut dyn PortalAuthClient,
    email: &str,
    attempts: usize,
) -> io::Result<Option<SignInOutcome>> {
    for attempt in 1..=attempts {
        terminal.print_line("Step 2/2 — Enter your portal password.")?;
        let Some(password) = terminal.prompt_secret("Password: ")? else {
            terminal.print_line("Input cancelled (EOF). Run askcosc again to retry.")?;
            return Ok(None);
        };

        if password.trim().is_empty() {
            terminal.print_line(&format!(
                "Password cannot be empty. Attempts left: {}",
                attempts.saturating_sub(attempt)
            ))?;
            continue;
        }

        match auth_client.sign_in(email, &password) {
            Ok(outcome) => return Ok(Some(outcome)),
            Err(AuthBackendError::UserNotFound) => {
                terminal.print_line("No account found for that email.")?;
                let Some(answer) = terminal.prompt_line("Create one now? [y/N]: ")? else {
                    return Ok(None);
                };
                if !answer.eq_ignore_ascii_case("y") {
                    terminal.print_line("Sign-up declined. Run askcosc again to retry.")?;
                    return Ok(None);
                }

                match auth_client.sign_up(email, &password) {
                    Ok(outcome) => {
                        terminal.print_line("Account created.")?;
                        return Ok(Some(outcome));
                    }
                    Err(error) => {
                        if !report_backend_error(
                            terminal,
                            error,
                            attempts.saturating_sub(attempt),
                            "sign-up",
                        )? {
                            return Ok(None);
                        }
                    }
                }
            }
            Err(error) => {
                if !report_backend_error(
                    terminal,
                    error,
                    attempts.saturating_sub(attempt),
                    "sign-in",
                )? {
                    return Ok(None);
                }
            }
        }
    }

    terminal.print_line("Sign-in failed too many times. Please restart askcosc later.")?;
    Ok(None)
}

fn report_backend_error(
    terminal: &mut dyn AuthTerminal,
    error: AuthBackendError,
    attempts_left: usize,
    step: &str,
) -> io::Result<bool> {
    match error {
        AuthBackendError::InvalidCredentials => {
            terminal.print_line(&format!(
                "AUTH_INVALID_CREDENTIALS: Email or password is incorrect. Attempts left: {attempts_left}"
            ))?;
            Ok(attempts_left > 0)
        }
        AuthBackendError::UserNotFound => {
            terminal.print_line(&format!(
                "AUTH_USER_NOT_FOUND: No account for that email. Attempts left: {attempts_left}"
            ))?;
            Ok(attempts_left > 0)
        }
        AuthBackendError::EmailAlreadyInUse => {
            terminal.print_line(
                "AUTH_EMAIL_IN_USE: An account already exists for that email. Sign in instead.",
            )?;
            Ok(attempts_left > 0)
        }
        AuthBackendError::WeakPassword => {
            terminal.print_line(&format!(
                "AUTH_WEAK_PASSWORD: Password must be at least 6 characters. Attempts left: {attempts_left}"
            ))?;
            Ok(attempts_left > 0)
        }
        AuthBackendError::Timeout => {
            terminal.print_line(&format!(
                "AUTH_TIMEOUT: Request timed out at {step} step. Check network and retry. Attempts left: {attempts_left}"
            ))?;
            Ok(attempts_left > 0)
        }
        AuthBackendError::TooManyAttempts => {
            terminal.print_line(
                "AUTH_TOO_MANY_ATTEMPTS: The provider is rate limiting this account. Try again later.",
            )?;
            Ok(false)
        }
        AuthBackendError::Transient { code, .. } => {
            let safe_code = sanitize_error_code(code);
            terminal.print_line(&format!(
                "{safe_code}: temporary issue at {step} step. Please retry. Attempts left: {attempts_left}"
            ))?;
            Ok(attempts_left > 0)
        }
    }
}

fn persist_session_marker(path: &Path) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, b"signed-in")?;
    fs::rename(tmp_path, path)
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}
