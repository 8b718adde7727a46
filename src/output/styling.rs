use console::{style, StyledObject};

use crate::reminder::DispatchOutcome;

/// How good a number or outcome is, as shown on the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Good,
    Degraded,
    Bad,
    Quiet,
}

impl Tone {
    pub fn of(outcome: Option<&DispatchOutcome>) -> Self {
        match outcome {
            None => Self::Quiet,
            Some(DispatchOutcome::Delivered) => Self::Good,
            Some(DispatchOutcome::Saved(_)) => Self::Degraded,
            Some(DispatchOutcome::Failed(_)) => Self::Bad,
        }
    }
}

pub fn toned(text: impl std::fmt::Display, tone: Tone) -> StyledObject<String> {
    let styled = style(text.to_string());
    match tone {
        Tone::Good => styled.bright().green(),
        Tone::Degraded => styled.bright().yellow(),
        Tone::Bad => styled.bright().red(),
        Tone::Quiet => styled.dim(),
    }
}

pub fn dim(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn bright(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).bright()
}

pub fn magenta_bold(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_tone_of_outcome() {
        assert_eq!(Tone::of(None), Tone::Quiet);
        assert_eq!(Tone::of(Some(&DispatchOutcome::Delivered)), Tone::Good);
        assert_eq!(
            Tone::of(Some(&DispatchOutcome::Saved(PathBuf::from("r.html")))),
            Tone::Degraded
        );
        assert_eq!(
            Tone::of(Some(&DispatchOutcome::Failed("smtp down".to_string()))),
            Tone::Bad
        );
    }
}
