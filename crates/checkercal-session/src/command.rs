/// Operator commands recognised during a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Keep the current detection as a sample.
    Save,
    /// Run the calibration on the collected samples.
    Calibrate,
    /// Leave the current phase.
    Quit,
}

impl Command {
    /// Map a key press to a command. Unbound keys map to `None`.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            's' => Some(Command::Save),
            'c' => Some(Command::Calibrate),
            'q' => Some(Command::Quit),
            _ => None,
        }
    }
}
