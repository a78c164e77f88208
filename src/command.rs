//! Command vocabulary and asynchronous input sources

use crate::error::{Error, Result};
use crate::shared::SharedState;
use std::fmt;
use std::io::BufRead;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Minimum classifier confidence for a voice command to be accepted
pub const VOICE_CONFIDENCE_SCORE: f32 = 0.5;

/// The supervisor's command vocabulary. Anything else is ignored at the
/// input boundary and never reaches the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Idle in standby
    Wait,
    /// Follow the target with the pan/tilt mount only
    Pan,
    /// Follow the target with pan/tilt and drive toward it
    Track,
    /// Sweep until the target is spotted, then hand off to track
    Find,
    /// Constant-rotation drive diagnostic
    Drive,
    /// Clean shutdown
    Goodbye,
}

impl Command {
    /// Parse a single command word; `None` for anything outside the
    /// vocabulary.
    pub fn parse(word: &str) -> Option<Self> {
        match word {
            "wait" => Some(Command::Wait),
            "pan" => Some(Command::Pan),
            "track" => Some(Command::Track),
            "find" => Some(Command::Find),
            "drive" => Some(Command::Drive),
            "goodbye" => Some(Command::Goodbye),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Command::Wait => "wait",
            Command::Pan => "pan",
            Command::Track => "track",
            Command::Find => "find",
            Command::Drive => "drive",
            Command::Goodbye => "goodbye",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse one console line: the first token is the command, the remainder
/// (if any) names the target object. `None` if the line is empty or the
/// command is not in the vocabulary.
pub fn parse_line(line: &str) -> Option<(Command, Option<String>)> {
    let mut words = line.split_whitespace();
    let command = Command::parse(words.next()?)?;
    let rest = words.collect::<Vec<_>>().join(" ");
    let target = if rest.is_empty() { None } else { Some(rest) };
    Some((command, target))
}

/// Spawn the console input thread. Reads stdin line by line and pushes
/// parsed commands into the shared state; unsupported input is dropped.
/// The thread ends on shutdown, EOF, or after pushing goodbye. It is left
/// detached by callers since a blocking stdin read cannot be interrupted.
pub fn spawn_console_listener(shared: Arc<SharedState>) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("cmd-listener".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            let mut line = String::new();
            while !shared.should_shutdown() {
                line.clear();
                match stdin.lock().read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) => match parse_line(&line) {
                        Some((command, target)) => {
                            let goodbye = command == Command::Goodbye;
                            shared.set_command(command, target);
                            if goodbye {
                                break;
                            }
                        }
                        None => {
                            let trimmed = line.trim();
                            if !trimmed.is_empty() {
                                log::debug!(
                                    "CommandInput: ignoring unsupported command '{}'",
                                    trimmed
                                );
                            }
                        }
                    },
                    Err(e) => {
                        log::warn!("CommandInput: stdin read failed: {}", e);
                        break;
                    }
                }
            }
            log::debug!("CommandInput: console listener stopped");
        })
        .map_err(|e| Error::Thread(format!("Failed to spawn command listener: {}", e)))
}

/// Adapter for an external voice-classification callback.
///
/// The classifier calls [`voice_input`](VoiceCommandInput::voice_input)
/// with each (label, score) result; the adapter filters by confidence and
/// vocabulary and pushes accepted commands. The return value follows the
/// classifier convention: `true` to keep listening, `false` to stop.
pub struct VoiceCommandInput {
    shared: Arc<SharedState>,
}

impl VoiceCommandInput {
    pub fn new(shared: Arc<SharedState>) -> Self {
        Self { shared }
    }

    /// Process one classification result. Low-confidence results and
    /// labels outside the vocabulary are dropped. Only the label's last
    /// word is considered ("go goodbye" → "goodbye"). Stops listening
    /// once goodbye has been pushed.
    pub fn voice_input(&self, label: &str, score: f32) -> bool {
        if score < VOICE_CONFIDENCE_SCORE {
            return true;
        }

        let Some(word) = label.split_whitespace().last() else {
            return true;
        };
        let Some(command) = Command::parse(word) else {
            return true;
        };

        log::info!("VoiceInput: '{}' accepted (score {:.2})", command, score);
        self.shared.set_command(command, None);

        command != Command::Goodbye
    }
}
