use std::io::BufRead;
use std::sync::mpsc;

use super::keymap::{resolve_key, KeyCommand, KEY_HELP};
use super::{InputPoll, InputSource};

/// Keyboard stand-in for the device buttons.
///
/// Lines are read on a background thread so polling never blocks the loop.
#[derive(Debug)]
pub struct ConsoleInput {
    rx: mpsc::Receiver<KeyCommand>,
    closed: bool,
}

impl ConsoleInput {
    pub fn stdin() -> Self {
        tracing::info!("{KEY_HELP}");
        Self::spawn(std::io::BufReader::new(std::io::stdin()))
    }

    pub fn spawn<R>(reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<KeyCommand>();
        std::thread::spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        tracing::warn!(?err, "console input read failed");
                        break;
                    }
                };
                match resolve_key(&line) {
                    Some(command) => {
                        if tx.send(command).is_err() {
                            break;
                        }
                    }
                    None => tracing::info!(key = %line.trim(), "unknown key; {KEY_HELP}"),
                }
            }
        });
        Self { rx, closed: false }
    }

    /// Block until the next command; used by tests to wait for the reader thread.
    #[cfg(test)]
    fn wait(&mut self) -> InputPoll {
        match self.rx.recv() {
            Ok(command) => to_poll(command),
            Err(_) => InputPoll::Closed,
        }
    }
}

fn to_poll(command: KeyCommand) -> InputPoll {
    match command {
        KeyCommand::Button(event) => InputPoll::Pressed(event),
        KeyCommand::Quit => InputPoll::Closed,
    }
}

impl InputSource for ConsoleInput {
    fn poll(&mut self) -> InputPoll {
        if self.closed {
            return InputPoll::Closed;
        }
        let poll = match self.rx.try_recv() {
            Ok(command) => to_poll(command),
            Err(mpsc::TryRecvError::Empty) => InputPoll::Idle,
            Err(mpsc::TryRecvError::Disconnected) => InputPoll::Closed,
        };
        self.closed = poll == InputPoll::Closed;
        poll
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ButtonEvent;
    use std::io::Cursor;

    #[test]
    fn lines_become_button_events_until_quit() {
        let mut input = ConsoleInput::spawn(Cursor::new("s\nzz\nb\nq\nu\n"));

        assert_eq!(input.wait(), InputPoll::Pressed(ButtonEvent::ShutterShort));
        assert_eq!(input.wait(), InputPoll::Pressed(ButtonEvent::Select));
        assert_eq!(input.wait(), InputPoll::Closed);
    }

    #[test]
    fn exhausted_reader_closes_the_source() {
        let mut input = ConsoleInput::spawn(Cursor::new(""));
        assert_eq!(input.wait(), InputPoll::Closed);

        input.closed = true;
        assert_eq!(input.poll(), InputPoll::Closed);
    }
}
