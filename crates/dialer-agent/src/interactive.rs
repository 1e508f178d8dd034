//! Interactive keypad over stdin.
//!
//! Each line is either a command or digits to append. Once eight digits are
//! entered the number is submitted; the buffer resets only after a
//! successful send, so a failed number can be retried with `send`.

use anyhow::Result;
use dialer_client::{Delivery, Dialer, SubmissionOutcome};
use dialer_core::{SUFFIX_LEN, format_partial};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
digits      append to the number (submits when it reaches 8 digits)
<           delete the last digit
clear       clear the number
send        submit the current number again
resend      retry the last send that found the socket closed
reconnect   reopen the current endpoint
endpoint U  save and connect to U
status      show connection state
quit        exit";

/// Digits typed so far.
#[derive(Debug, Default)]
pub(crate) struct Keypad {
    digits: String,
}

impl Keypad {
    /// Append digits from `input`, ignoring separators and anything past
    /// eight digits. Returns true only when this call completed the number;
    /// input to an already full keypad is dropped.
    pub(crate) fn push(&mut self, input: &str) -> bool {
        if self.is_complete() {
            return false;
        }
        for c in input.chars().filter(char::is_ascii_digit) {
            if self.digits.len() == SUFFIX_LEN {
                break;
            }
            self.digits.push(c);
        }
        self.is_complete()
    }

    /// Whether `line` is keypad input: digits with optional spaces or dashes.
    pub(crate) fn accepts(line: &str) -> bool {
        line.chars().any(|c| c.is_ascii_digit())
            && line.chars().all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
    }

    pub(crate) fn backspace(&mut self) {
        let _ = self.digits.pop();
    }

    pub(crate) fn clear(&mut self) {
        self.digits.clear();
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.digits.len() == SUFFIX_LEN
    }

    pub(crate) fn digits(&self) -> &str {
        &self.digits
    }

    pub(crate) fn display(&self) -> String {
        format_partial(&self.digits)
    }
}

enum Action {
    Quit,
    Continue,
}

/// Run the keypad until `quit`, end of input, or Ctrl-C.
pub(crate) async fn run(dialer: &Dialer) -> Result<()> {
    let state = dialer.start().await?;
    println!("connection {state}; type `help` for commands");

    let mut states = dialer.subscribe();
    let _ = states.borrow_and_update();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut keypad = Keypad::default();
    let mut pending: Option<Delivery> = None;

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *states.borrow_and_update();
                println!("connection {state}");
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match handle_line(dialer, line.trim(), &mut keypad, &mut pending).await? {
                    Action::Quit => break,
                    Action::Continue => {}
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    dialer.shutdown();
    Ok(())
}

async fn handle_line(
    dialer: &Dialer,
    line: &str,
    keypad: &mut Keypad,
    pending: &mut Option<Delivery>,
) -> Result<Action> {
    match line {
        "" => {}
        "quit" | "exit" => return Ok(Action::Quit),
        "help" => println!("{HELP}"),
        "status" => println!(
            "connection {} ({})",
            dialer.state(),
            dialer.active_endpoint().unwrap_or_else(|| "none".to_string())
        ),
        "reconnect" => match dialer.reconnect().await {
            Ok(state) => println!("connection {state}"),
            Err(e) => println!("reconnect failed: {e}"),
        },
        "<" => {
            keypad.backspace();
            println!("{}", keypad.display());
        }
        "clear" => {
            keypad.clear();
            println!("{}", keypad.display());
        }
        "send" => {
            if keypad.is_complete() {
                submit(dialer, keypad, pending).await;
            } else {
                println!("enter all {SUFFIX_LEN} digits first");
            }
        }
        "resend" => match pending.take() {
            Some(delivery) => report(dialer.resend(delivery), keypad, pending),
            None => println!("nothing to resend"),
        },
        cmd if cmd.starts_with("endpoint ") => {
            let url = cmd.trim_start_matches("endpoint ");
            match dialer.change_endpoint(url).await {
                Ok(state) => println!("endpoint saved; connection {state}"),
                Err(e) => println!("endpoint not changed: {e}"),
            }
        }
        input if Keypad::accepts(input) => {
            if keypad.is_complete() {
                println!("number is complete; use `send`, `<`, or `clear`");
            } else if keypad.push(input) {
                println!("{}", keypad.display());
                submit(dialer, keypad, pending).await;
            } else {
                println!("{}", keypad.display());
            }
        }
        other => println!("unknown command `{other}`; type `help`"),
    }
    Ok(Action::Continue)
}

async fn submit(dialer: &Dialer, keypad: &mut Keypad, pending: &mut Option<Delivery>) {
    let outcome = dialer.submit(keypad.digits()).await;
    report(outcome, keypad, pending);
}

fn report(outcome: SubmissionOutcome, keypad: &mut Keypad, pending: &mut Option<Delivery>) {
    println!("{}", crate::describe(&outcome));
    match outcome {
        SubmissionOutcome::Sent(_) => {
            keypad.clear();
            *pending = None;
        }
        SubmissionOutcome::SocketNotOpen(delivery) => *pending = Some(*delivery),
        _ => {}
    }
}
