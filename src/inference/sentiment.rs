use super::{Features, InferenceError, Prediction, Predictor, text};

const POSITIVE_WORDS: [&str; 7] = [
    "love",
    "satisfied",
    "amazing",
    "fantastic",
    "wonderful",
    "pleased",
    "best",
];
const NEGATIVE_WORDS: [&str; 5] = ["hate", "terrible", "worst", "disappointed", "awful"];

// [num_words, num_positive_words, num_complaints]
const WEIGHTS: [f64; 3] = [-0.021, 1.094, -1.087];
const INTERCEPT: f64 = 0.052;

const LABELS: [&str; 2] = ["Negative", "Positive"];

/// Keyword-count logistic regression over review text.
pub struct SentimentAnalyzer {
    weights: [f64; 3],
    intercept: f64,
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self {
            weights: WEIGHTS,
            intercept: INTERCEPT,
        }
    }
}

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    // each listed word counts once if it appears anywhere, case-insensitive
    pub fn extract(review: &str) -> [f64; 3] {
        let lower = review.to_lowercase();
        let num_words = review.split_whitespace().count();
        let positive = POSITIVE_WORDS.iter().filter(|w| lower.contains(**w)).count();
        let negative = NEGATIVE_WORDS.iter().filter(|w| lower.contains(**w)).count();
        [num_words as f64, positive as f64, negative as f64]
    }

    fn positive_probability(&self, x: [f64; 3]) -> f64 {
        let z = self.intercept
            + x.iter()
                .zip(self.weights.iter())
                .map(|(xi, wi)| xi * wi)
                .sum::<f64>();
        1.0 / (1.0 + (-z).exp())
    }
}

impl Predictor for SentimentAnalyzer {
    fn name(&self) -> &str {
        "sentiment"
    }

    fn predict(&self, features: &Features) -> Result<Prediction, InferenceError> {
        let review = text(features, "text")?;
        let p_pos = self.positive_probability(Self::extract(review));
        let probabilities = vec![1.0 - p_pos, p_pos];
        let class = usize::from(p_pos > 0.5);

        Ok(Prediction {
            label: LABELS[class].to_string(),
            confidence: probabilities[class],
            probabilities,
        })
    }
}
