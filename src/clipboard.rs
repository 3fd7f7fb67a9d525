use std::io::{self, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub trait Clipboard {
    fn copy(&mut self, text: &str) -> io::Result<()>;
}

/// Copies through the terminal with an OSC 52 escape sequence, which also
/// works over SSH. Terminals without OSC 52 support silently ignore it.
pub struct TerminalClipboard;

impl Clipboard for TerminalClipboard {
    fn copy(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(osc52_sequence(text).as_bytes())?;
        stdout.flush()
    }
}

/// `ESC ] 52 ; c ; <base64> BEL`, targeting the system clipboard.
fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}
