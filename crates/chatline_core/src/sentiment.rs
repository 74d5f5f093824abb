//! Keyword-based sentiment tagging.
//!
//! Keyword groups are checked in priority order: a text carrying both a
//! positive and a negative keyword is positive.

use crate::error::ChatResult;
use crate::types::{ConversationState, Sentiment};

/// Keywords that mark a message as positive. Checked first.
pub const POSITIVE_KEYWORDS: &[&str] = &["good", "happy", "great"];

/// Keywords that mark a message as negative.
pub const NEGATIVE_KEYWORDS: &[&str] = &["bad", "sad", "angry"];

/// Classify `text` by case-insensitive substring match.
pub fn classify(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let contains_any = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

    if contains_any(POSITIVE_KEYWORDS) {
        Sentiment::Positive
    } else if contains_any(NEGATIVE_KEYWORDS) {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Tag `state` with the sentiment of its last turn.
pub fn analyze(mut state: ConversationState) -> ChatResult<ConversationState> {
    let sentiment = classify(&state.last_turn()?.content);
    state.sentiment = Some(sentiment);
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;

    #[test]
    fn test_positive_keywords() {
        for text in ["I am so happy today", "good job", "This is GREAT"] {
            assert_eq!(classify(text), Sentiment::Positive, "{text}");
        }
    }

    #[test]
    fn test_negative_keywords() {
        for text in ["This is a bad and sad day", "I'm ANGRY", "so sad"] {
            assert_eq!(classify(text), Sentiment::Negative, "{text}");
        }
    }

    #[test]
    fn test_neutral_when_no_keyword() {
        assert_eq!(classify("The weather is cloudy"), Sentiment::Neutral);
        assert_eq!(classify(""), Sentiment::Neutral);
    }

    #[test]
    fn test_positive_wins_ties() {
        assert_eq!(classify("I feel good but angry"), Sentiment::Positive);
        assert_eq!(classify("sad, bad, but great"), Sentiment::Positive);
    }

    #[test]
    fn test_substring_matching() {
        // Matching is by substring, so embedded keywords count.
        assert_eq!(classify("goodbye"), Sentiment::Positive);
        assert_eq!(classify("badge"), Sentiment::Negative);
    }

    #[test]
    fn test_analyze_writes_state_not_turn() {
        let state = analyze(ConversationState::from_user("happy")).unwrap();
        assert_eq!(state.sentiment, Some(Sentiment::Positive));
        assert_eq!(state.turns[0].content, "happy");
    }

    #[test]
    fn test_analyze_empty() {
        let err = analyze(ConversationState::default()).unwrap_err();
        assert!(matches!(err, ChatError::EmptyConversation));
    }
}
