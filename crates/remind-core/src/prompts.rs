//! Localized prompt text for each grounding step.

use crate::types::{Language, Step};

const ENGLISH: [&str; Step::COUNT] = [
    "Its OKAY, I Got U",
    "Now, What are 5 things you can SEE?",
    "Now, Tell me 4 things you can TOUCH?",
    "You are doing GREAT!!",
    "Now, Tell me 3 things you HEAR?",
    "Focus on 2 things you can SMELL?",
    "Now, Tell me 1 thing you can TASTE?",
];

const JAPANESE: [&str; Step::COUNT] = [
    "大丈夫、私がついているよ",
    "見えるものを5つ教えて",
    "触れられるものを4つ教えて",
    "とても上手にできているよ！",
    "聞こえるものを3つ教えて",
    "匂いを2つ感じてみて",
    "味わえるものを1つ教えて",
];

/// The full prompt sequence for a language. Unknown languages get English.
pub fn sequence(language: &Language) -> &'static [&'static str; Step::COUNT] {
    match language {
        Language::Japanese => &JAPANESE,
        Language::English | Language::Unknown(_) => &ENGLISH,
    }
}

pub fn prompt(step: Step, language: &Language) -> &'static str {
    sequence(language)[step.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_prompts_follow_the_exercise() {
        assert_eq!(prompt(Step::Intro, &Language::English), "Its OKAY, I Got U");
        assert!(prompt(Step::See, &Language::English).contains("5 things"));
        assert!(prompt(Step::Touch, &Language::English).contains("TOUCH"));
        assert!(prompt(Step::Taste, &Language::English).contains("1 thing"));
    }

    #[test]
    fn japanese_prompts_are_distinct() {
        for step in Step::all() {
            assert_ne!(
                prompt(*step, &Language::Japanese),
                prompt(*step, &Language::English)
            );
        }
    }

    #[test]
    fn unknown_language_uses_english() {
        let lang = Language::parse("Spanish");
        for step in Step::all() {
            assert_eq!(prompt(*step, &lang), prompt(*step, &Language::English));
        }
    }
}
