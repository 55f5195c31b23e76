use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// One screen of the 5-4-3-2-1 grounding exercise, in session order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Intro,
    See,
    Touch,
    Encouragement,
    Hear,
    Smell,
    Taste,
}

/// Progress bar fill per step. `See` and `Touch` share a bucket and the
/// intro shows an empty bar, so this is a table rather than a formula.
const PROGRESS: [f32; 7] = [0.0, 0.2, 0.2, 0.4, 0.6, 0.8, 1.0];

impl Step {
    pub const COUNT: usize = 7;

    pub fn all() -> &'static [Step] {
        &[
            Step::Intro,
            Step::See,
            Step::Touch,
            Step::Encouragement,
            Step::Hear,
            Step::Smell,
            Step::Taste,
        ]
    }

    pub fn first() -> Step {
        Step::Intro
    }

    pub fn from_index(index: usize) -> Option<Step> {
        Step::all().get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Step> {
        Step::from_index(self.index() + 1)
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }

    pub fn progress(self) -> f32 {
        PROGRESS[self.index()]
    }

    /// The intro and encouragement screens carry no sensory prompt and can
    /// always be advanced.
    pub fn requires_evidence(self) -> bool {
        !matches!(self, Step::Intro | Step::Encouragement)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Intro => "intro",
            Step::See => "see",
            Step::Touch => "touch",
            Step::Encouragement => "encouragement",
            Step::Hear => "hear",
            Step::Smell => "smell",
            Step::Taste => "taste",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// InputMode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    Voice,
    Text,
}

impl InputMode {
    pub fn toggled(self) -> InputMode {
        match self {
            InputMode::Voice => InputMode::Text,
            InputMode::Text => InputMode::Voice,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InputMode::Voice => "voice",
            InputMode::Text => "text",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// Visual theme of an avatar. Parsing never fails: anything that is not a
/// known theme is kept verbatim in `Unknown` so it can be reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Theme {
    #[default]
    Human,
    Ghibli,
    Unknown(String),
}

impl Theme {
    pub fn parse(raw: &str) -> Theme {
        match raw.trim().to_ascii_lowercase().as_str() {
            "human" => Theme::Human,
            "ghibli" => Theme::Ghibli,
            _ => Theme::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Theme::Human => "human",
            Theme::Ghibli => "ghibli",
            Theme::Unknown(raw) => raw,
        }
    }
}

impl From<String> for Theme {
    fn from(raw: String) -> Self {
        Theme::parse(&raw)
    }
}

impl From<Theme> for String {
    fn from(theme: Theme) -> Self {
        theme.as_str().to_string()
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Narration language of an avatar. Same never-fail parsing as [`Theme`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    #[default]
    English,
    Japanese,
    Unknown(String),
}

impl Language {
    pub fn parse(raw: &str) -> Language {
        match raw.trim().to_ascii_lowercase().as_str() {
            "english" | "en" | "default" => Language::English,
            "japanese" | "ja" | "jp" => Language::Japanese,
            _ if raw.trim() == "日本語" => Language::Japanese,
            _ => Language::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Language::English => "english",
            Language::Japanese => "japanese",
            Language::Unknown(raw) => raw,
        }
    }

    pub fn is_japanese(&self) -> bool {
        matches!(self, Language::Japanese)
    }
}

impl From<String> for Language {
    fn from(raw: String) -> Self {
        Language::parse(&raw)
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.as_str().to_string()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_matches_table() {
        let expected = [0.0, 0.2, 0.2, 0.4, 0.6, 0.8, 1.0];
        for (step, want) in Step::all().iter().zip(expected) {
            assert_eq!(step.progress(), want, "progress for {step}");
        }
        assert_eq!(Step::See.progress(), Step::Touch.progress());
    }

    #[test]
    fn steps_are_ordered_and_indexed() {
        assert_eq!(Step::all().len(), Step::COUNT);
        for (i, step) in Step::all().iter().enumerate() {
            assert_eq!(step.index(), i);
            assert_eq!(Step::from_index(i), Some(*step));
        }
        assert_eq!(Step::from_index(Step::COUNT), None);
        assert_eq!(Step::Intro.next(), Some(Step::See));
        assert_eq!(Step::Taste.next(), None);
        assert!(Step::Taste.is_last());
        assert!(!Step::Smell.is_last());
    }

    #[test]
    fn only_intro_and_encouragement_are_exempt() {
        let exempt: Vec<Step> = Step::all()
            .iter()
            .copied()
            .filter(|s| !s.requires_evidence())
            .collect();
        assert_eq!(exempt, vec![Step::Intro, Step::Encouragement]);
    }

    #[test]
    fn theme_parses_case_insensitively() {
        assert_eq!(Theme::parse("Ghibli"), Theme::Ghibli);
        assert_eq!(Theme::parse(" HUMAN "), Theme::Human);
        assert_eq!(Theme::parse("Calm"), Theme::Unknown("Calm".to_string()));
    }

    #[test]
    fn language_parses_and_falls_through() {
        assert_eq!(Language::parse("Japanese"), Language::Japanese);
        assert_eq!(Language::parse("日本語"), Language::Japanese);
        assert_eq!(Language::parse("English"), Language::English);
        assert_eq!(
            Language::parse("Klingon"),
            Language::Unknown("Klingon".to_string())
        );
    }

    #[test]
    fn theme_yaml_keeps_unknown_raw_value() {
        let theme: Theme = serde_yaml::from_str("Energetic").unwrap();
        assert_eq!(theme, Theme::Unknown("Energetic".to_string()));
        let yaml = serde_yaml::to_string(&theme).unwrap();
        assert_eq!(yaml.trim(), "Energetic");
    }

    #[test]
    fn input_mode_toggles() {
        assert_eq!(InputMode::Voice.toggled(), InputMode::Text);
        assert_eq!(InputMode::Text.toggled(), InputMode::Voice);
    }
}
