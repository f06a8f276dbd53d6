//! Interpretation of the model output.
//!
use std::fmt;

pub use common::protocol::Label;
use common::protocol::PredictResponse;

/// Outputs up to this value are read as "cat".
pub const CAT_MAX_PROBABILITY: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prediction {
    pub label: Label,
    /// Probability of `label`, always at least `0.5` for a probability input.
    pub confidence: f32,
    /// Raw sigmoid output of the model.
    pub dog_probability: f32,
}

impl Prediction {
    pub fn from_probability(dog_probability: f32) -> Self {
        let (label, confidence) = match dog_probability {
            p if p <= CAT_MAX_PROBABILITY => (Label::Cat, 1.0 - p),
            p => (Label::Dog, p),
        };

        Self {
            label,
            confidence,
            dog_probability,
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:5.2}%", self.label, self.confidence * 100.0)
    }
}

impl From<Prediction> for PredictResponse {
    fn from(prediction: Prediction) -> Self {
        PredictResponse {
            label: prediction.label,
            confidence: prediction.confidence,
            dog_probability: prediction.dog_probability,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_threshold() {
        let prediction = Prediction::from_probability(0.5);
        assert_eq!(prediction.label, Label::Cat);
        assert_eq!(prediction.confidence, 0.5);

        let prediction = Prediction::from_probability(0.500_1);
        assert_eq!(prediction.label, Label::Dog);

        let prediction = Prediction::from_probability(0.0);
        assert_eq!(prediction.label, Label::Cat);
        assert_eq!(prediction.confidence, 1.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Prediction::from_probability(0.25).to_string(), "cat 75.00%");
        assert_eq!(Prediction::from_probability(1.0).to_string(), "dog 100.00%");
    }

    #[test]
    fn test_into_response() {
        let response = PredictResponse::from(Prediction::from_probability(0.75));
        assert_eq!(response.label, Label::Dog);
        assert_eq!(response.confidence, 0.75);
        assert_eq!(response.dog_probability, 0.75);
    }
}
