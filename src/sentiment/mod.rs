//! Sentiment labeling over transcript text.
//!
//! A VADER compound polarity score thresholded at zero; two labels only,
//! so an empty transcript scores Positive.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
        }
    }
}

/// Label `text` from its compound polarity score.
pub fn score(text: &str) -> SentimentLabel {
    let analyzer = vader_sentiment::SentimentIntensityAnalyzer::new();
    let scores = analyzer.polarity_scores(text);
    let compound = scores.get("compound").copied().unwrap_or(0.0);
    if compound >= 0.0 {
        SentimentLabel::Positive
    } else {
        SentimentLabel::Negative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn praise_scores_positive() {
        assert_eq!(score("What a wonderful, lovely recording!"), SentimentLabel::Positive);
    }

    #[test]
    fn complaint_scores_negative() {
        assert_eq!(
            score("This is awful, I hate everything about it."),
            SentimentLabel::Negative
        );
    }

    #[test]
    fn empty_text_falls_on_the_positive_side() {
        assert_eq!(score(""), SentimentLabel::Positive);
    }

    #[test]
    fn label_strings() {
        assert_eq!(SentimentLabel::Positive.as_str(), "Positive");
        assert_eq!(SentimentLabel::Negative.as_str(), "Negative");
    }
}
