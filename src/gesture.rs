use std::fmt;

/// Closed set of gesture labels.
///
/// `None` means no sample was available this tick. It is not a recognized
/// pose; a closed hand is `Fist`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureLabel {
    Fist,
    OneFinger,
    TwoFingers,
    ThreeFingers,
    OpenPalm,
    None,
}

impl GestureLabel {
    /// Label for a count of extended fingers. Four and five both read as an open palm.
    pub fn from_finger_count(count: usize) -> Self {
        match count {
            0 => Self::Fist,
            1 => Self::OneFinger,
            2 => Self::TwoFingers,
            3 => Self::ThreeFingers,
            _ => Self::OpenPalm,
        }
    }

    /// Canonical UTF-8 token the remote receiver expects. Must stay bit-exact.
    pub fn token(&self) -> Option<&'static str> {
        match self {
            Self::Fist => Some("puño"),
            Self::OneFinger => Some("uno"),
            Self::TwoFingers => Some("dos"),
            Self::ThreeFingers => Some("tres"),
            Self::OpenPalm => Some("palm"),
            Self::None => None,
        }
    }

    /// Controller action the receiver conventionally binds to this gesture.
    pub fn action_hint(&self) -> &'static str {
        match self {
            Self::Fist => "land",
            Self::OneFinger => "move forward",
            Self::TwoFingers => "turn right",
            Self::ThreeFingers => "turn left",
            Self::OpenPalm => "take off",
            Self::None => "none",
        }
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token() {
            Some(token) => f.write_str(token),
            None => f.write_str("-"),
        }
    }
}
