//! Mode-specific prompt composition for the AI proxy.

pub const SOLUTION_SUFFIX: &str =
  "((only optimized code for leetcode problem, no explanation only code)";

pub const EXPLAIN_SUFFIX: &str =
  "(optimized code for leetcode problem with simple, crisp explanation)";

pub const HINT_SUFFIX: &str = "(generate list of only hints(points) for leetcode problem and \
                               no solution no heading in bold no markdown no pretext)";

/// What the caller wants back from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// Optimised code only.
  Solution,
  /// Optimised code plus a short explanation.
  Explain,
  /// A plain list of hints.
  Hint,
  /// Any other (or absent) mode: the question is sent as-is.
  Passthrough,
}

impl Mode {
  /// Map the raw request value onto a mode. Unrecognised values, including
  /// `None`, become [`Mode::Passthrough`].
  pub fn parse(raw: Option<&str>) -> Self {
    match raw {
      Some("solution") => Mode::Solution,
      Some("explain") => Mode::Explain,
      Some("hint") => Mode::Hint,
      _ => Mode::Passthrough,
    }
  }

  pub fn suffix(self) -> Option<&'static str> {
    match self {
      Mode::Solution => Some(SOLUTION_SUFFIX),
      Mode::Explain => Some(EXPLAIN_SUFFIX),
      Mode::Hint => Some(HINT_SUFFIX),
      Mode::Passthrough => None,
    }
  }

  /// Build the prompt sent to the model for `question`.
  pub fn compose(self, question: &str) -> String {
    match self.suffix() {
      Some(suffix) => format!("{question} {suffix}"),
      None => question.to_owned(),
    }
  }
}
