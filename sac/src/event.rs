use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// External state changes fed into the simulator from outside.
///
/// Attaching and detaching a drum's backing medium is the business of
/// the hosting program (it owns the file, if there is one).  The core
/// only ever consults the resulting attached/not-attached predicate
/// when it validates a request.
#[derive(Debug)]
pub enum InputEvent {
    AttachDrumMedium,
    DetachDrumMedium,
}

#[derive(Debug, PartialEq, Eq)]
pub enum InputEventError {
    /// The event was addressed to an exchange unit number with no
    /// registered unit.  Likely a configuration inconsistency between
    /// the hosting program and the simulator core.
    UnknownUnit(u8),

    /// The addressed unit exists but the event makes no sense for it
    /// (for example, attaching a medium to the console).
    InputEventNotValidForDevice,
}

impl Display for InputEventError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            InputEventError::UnknownUnit(unit) => {
                write!(f, "input event for unknown exchange unit {unit}")
            }
            InputEventError::InputEventNotValidForDevice => {
                f.write_str("input event is not valid for this device")
            }
        }
    }
}

impl Error for InputEventError {}
