use super::ButtonEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Button(ButtonEvent),
    Quit,
}

/// Map one line of console input to a device control.
///
/// An empty line confirms, matching the ok button.
pub fn resolve_key(line: &str) -> Option<KeyCommand> {
    let key = line.trim();
    let command = match key {
        "" | "o" | "ok" => KeyCommand::Button(ButtonEvent::Ok),
        "s" | "shoot" => KeyCommand::Button(ButtonEvent::ShutterShort),
        "f" | "focus" => KeyCommand::Button(ButtonEvent::ShutterLong),
        "u" | "up" => KeyCommand::Button(ButtonEvent::Up),
        "n" | "down" => KeyCommand::Button(ButtonEvent::Down),
        "l" | "left" => KeyCommand::Button(ButtonEvent::Left),
        "r" | "right" => KeyCommand::Button(ButtonEvent::Right),
        "b" | "select" => KeyCommand::Button(ButtonEvent::Select),
        "q" | "quit" => KeyCommand::Quit,
        _ => return None,
    };
    Some(command)
}

pub(crate) const KEY_HELP: &str =
    "keys: s=shoot f=focus u/n=prompt up/down l/r=left/right b=select o|enter=ok q=quit";
