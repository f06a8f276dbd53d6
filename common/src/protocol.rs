//! Messages exchanged with the classification server.
//!
use std::fmt;

use serde::{Deserialize, Serialize};

/// Class predicted for an image.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Cat,
    Dog,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Cat => "cat",
            Label::Dog => "dog",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a successful prediction.
///
/// `confidence` is the probability of `label`, `dog_probability` the raw model output.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PredictResponse {
    pub label: Label,
    pub confidence: f32,
    pub dog_probability: f32,
}

impl PredictResponse {
    /// Format as `"<label> <confidence>%"` with two decimals.
    pub fn summary(&self) -> String {
        format!("{} {:5.2}%", self.label, self.confidence * 100.0)
    }
}

/// Body of a failed request.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::Error;

    #[test]
    fn test_json_serde() -> Result<(), Error> {
        let response = PredictResponse {
            label: Label::Cat,
            confidence: 0.75,
            dog_probability: 0.25,
        };

        let serialized = serde_json::to_string(&response)?;
        assert_eq!(
            serialized,
            r#"{"label":"cat","confidence":0.75,"dog_probability":0.25}"#
        );

        let deserialized: PredictResponse = serde_json::from_str(&serialized)?;
        assert_eq!(response, deserialized);

        Ok(())
    }

    #[test]
    fn test_summary() {
        let response = PredictResponse {
            label: Label::Dog,
            confidence: 0.9731,
            dog_probability: 0.9731,
        };
        assert_eq!(response.summary(), "dog 97.31%");
    }
}
