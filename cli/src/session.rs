//! Interactive session: line commands in, screens out.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use pv_core::{ProfileForm, Screen, Snapshot, SubmitOutcome};

pub const HELP: &str = "\
Commands:
  phone <number>   edit the phone number
  submit           save the profile (starts verification if the phone changed)
  otp <code>       enter the OTP
  verify           submit the OTP
  resend           request another OTP
  change           go back and change the phone
  status           show the current screen
  help             show this help
  quit             exit";

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Phone(String),
    Submit,
    Otp(String),
    Verify,
    Resend,
    Change,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command `{0}`")]
    Unknown(String),

    #[error("`{0}` needs a value")]
    MissingArgument(&'static str),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default().to_ascii_lowercase();
        let argument = parts.collect::<Vec<_>>().join(" ");

        let required = |command: &'static str| {
            if argument.is_empty() {
                Err(CommandError::MissingArgument(command))
            } else {
                Ok(argument.clone())
            }
        };

        match name.as_str() {
            "phone" => required("phone").map(Command::Phone),
            "otp" => required("otp").map(Command::Otp),
            "submit" | "save" => Ok(Command::Submit),
            "verify" => Ok(Command::Verify),
            "resend" => Ok(Command::Resend),
            "change" => Ok(Command::Change),
            "status" => Ok(Command::Status),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Phone(_) => "phone",
            Command::Submit => "submit",
            Command::Otp(_) => "otp",
            Command::Verify => "verify",
            Command::Resend => "resend",
            Command::Change => "change",
            Command::Status => "status",
            Command::Help => "help",
            Command::Quit => "quit",
        }
    }

    /// Whether the control behind this command is shown on `screen`
    pub fn available_on(&self, screen: Screen) -> bool {
        match self {
            Command::Phone(_) | Command::Submit => matches!(screen, Screen::Profile { .. }),
            Command::Otp(_) | Command::Verify => {
                matches!(screen, Screen::OtpEntry { verifying: false, .. })
            }
            Command::Resend | Command::Change => matches!(
                screen,
                Screen::SendFailed | Screen::OtpEntry { verifying: false, .. }
            ),
            Command::Status | Command::Help | Command::Quit => true,
        }
    }
}

/// Render a screen as text
pub fn render_screen(screen: Screen, snapshot: &Snapshot) -> String {
    let context = &snapshot.context;
    match screen {
        Screen::Profile {
            just_verified,
            verification_needed,
        } => {
            let mut lines = vec![
                "== Update Profile ==".to_string(),
                format!(
                    "  phone: {} [{}]",
                    context.phone,
                    if verification_needed {
                        "needs verification"
                    } else {
                        "verified"
                    }
                ),
                format!(
                    "  submit to {}",
                    if verification_needed { "proceed" } else { "save" }
                ),
            ];
            if just_verified {
                lines.push("  OTP verified and phone saved".to_string());
            }
            lines.join("\n")
        }
        Screen::SendingOtp => "== Verify OTP ==\n  Sending OTP...".to_string(),
        Screen::SendFailed => {
            "== Verify OTP ==\n  Couldn't send OTP\n  resend | change".to_string()
        }
        Screen::OtpEntry {
            verifying,
            verify_failed,
        } => {
            let mut lines = vec![
                "== Verify OTP ==".to_string(),
                format!("  otp: {}", context.otp),
            ];
            if verifying {
                lines.push("  Verifying OTP...".to_string());
            } else {
                if verify_failed {
                    lines.push("  OTP verification failed".to_string());
                }
                lines.push("  verify | resend | change".to_string());
            }
            lines.join("\n")
        }
    }
}

fn render(form: &ProfileForm, json_output: bool) -> String {
    let snapshot = form.snapshot();
    let screen = form.screen();
    if json_output {
        json!({ "screen": screen, "snapshot": snapshot }).to_string()
    } else {
        render_screen(screen, &snapshot)
    }
}

/// Apply one command. Returns a message for the user, if any.
pub fn apply(form: &ProfileForm, command: Command) -> Option<String> {
    let screen = form.screen();
    if !command.available_on(screen) {
        return Some(format!("`{}` is not available on this screen", command.name()));
    }

    match command {
        Command::Phone(phone) => form.update_phone(phone),
        Command::Otp(otp) => form.update_otp(otp),
        Command::Verify => form.submit_otp(),
        Command::Resend => form.resend_otp(),
        Command::Change => form.change_phone(),
        Command::Submit => match form.submit() {
            SubmitOutcome::Saved => return Some("Everything saved!".to_string()),
            SubmitOutcome::VerificationStarted => {}
            SubmitOutcome::Ignored => {
                return Some("`submit` is not available on this screen".to_string())
            }
        },
        Command::Status | Command::Help | Command::Quit => {}
    }
    None
}

/// Run the session until `quit` or end of input
pub async fn run(form: Arc<ProfileForm>, json_output: bool) -> Result<()> {
    if !json_output {
        println!("{HELP}\n");
    }
    println!("{}", render(&form, json_output));

    let printer = tokio::spawn(print_transitions(Arc::clone(&form), json_output));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(Command::Status) => println!("{}", render(&form, json_output)),
            Ok(Command::Help) => println!("{HELP}"),
            Ok(command) => {
                debug!(command = command.name(), "Applying command");
                if let Some(message) = apply(&form, command) {
                    println!("{message}");
                }
            }
            Err(e) => println!("{e}. Type `help` for the list of commands."),
        }
    }

    printer.abort();
    Ok(())
}

/// Print the screen after every committed transition
async fn print_transitions(form: Arc<ProfileForm>, json_output: bool) {
    let mut snapshots = form.machine().watch();
    while snapshots.changed().await.is_ok() {
        println!("{}", render(&form, json_output));
    }
}
