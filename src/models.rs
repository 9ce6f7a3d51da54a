use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::inference::{FeatureValue, Features};

// Sentiment request format
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct CommentRequest {
    pub text: String,
}

// Sentiment response format
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct CommentResponse {
    pub text: String,
    pub sentiment: String,
    pub confidence: f64,
    pub status: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Reviews {
    pub texts: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct BatchAccepted {
    pub message: String,
    pub queued: usize,
}

// Penguin request, structured measurements
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct PenguinV1 {
    pub bill_length_mm: f64,
    pub bill_depth_mm: f64,
    pub flipper_length_mm: i64,
    pub body_mass_g: i64,
}

// Penguin request, measurements packed into one string
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct PenguinV2 {
    pub data: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct PredictionResponse {
    pub predicted_species: Vec<String>,
    pub confidence: Vec<Vec<f64>>,
}

// Batch job - texts handed to the background worker
#[derive(Debug)]
pub struct BatchJob {
    pub texts: Vec<String>,
    pub requested_by: String, // key fingerprint, for logs
}

pub fn text_features(text: &str) -> Features {
    let mut features = Features::new();
    features.insert("text".to_string(), FeatureValue::Text(text.to_string()));
    features
}

impl CommentRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.text.trim().is_empty() {
            return Err(ApiError::Validation("Empty text provided".to_string()));
        }
        Ok(())
    }
}

impl Reviews {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.texts.is_empty() {
            return Err(ApiError::Validation(
                "The 'texts' list must contain at least one item.".to_string(),
            ));
        }
        if let Some(i) = self.texts.iter().position(|t| t.trim().is_empty()) {
            return Err(ApiError::Validation(format!("Empty text provided at index {}", i)));
        }
        Ok(())
    }
}

impl PenguinV1 {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.bill_length_mm <= 0.0
            || self.bill_depth_mm <= 0.0
            || self.flipper_length_mm <= 0
            || self.body_mass_g <= 0
        {
            return Err(ApiError::Validation(
                "All measurements must be positive values.".to_string(),
            ));
        }
        Ok(())
    }

    pub fn features(&self) -> Features {
        [
            ("bill_length_mm", self.bill_length_mm),
            ("bill_depth_mm", self.bill_depth_mm),
            ("flipper_length_mm", self.flipper_length_mm as f64),
            ("body_mass_g", self.body_mass_g as f64),
        ]
        .into_iter()
        .map(|(name, v)| (name.to_string(), FeatureValue::Number(v)))
        .collect()
    }
}

impl TryFrom<PenguinV2> for PenguinV1 {
    type Error = ApiError;

    fn try_from(v2: PenguinV2) -> Result<Self, Self::Error> {
        if v2.data.trim().is_empty() {
            return Err(ApiError::Validation("Data must not be empty.".to_string()));
        }
        let values: Vec<&str> = v2.data.split_whitespace().collect();
        let &[bill_length, bill_depth, flipper, mass] = values.as_slice() else {
            return Err(ApiError::Validation(
                "Data must contain exactly 4 space-separated values.".to_string(),
            ));
        };

        let bad = |field: &str, raw: &str| {
            ApiError::Validation(format!("Invalid value '{}' for {}", raw, field))
        };
        let v1 = PenguinV1 {
            bill_length_mm: bill_length.parse().map_err(|_| bad("bill_length_mm", bill_length))?,
            bill_depth_mm: bill_depth.parse().map_err(|_| bad("bill_depth_mm", bill_depth))?,
            flipper_length_mm: flipper.parse().map_err(|_| bad("flipper_length_mm", flipper))?,
            body_mass_g: mass.parse().map_err(|_| bad("body_mass_g", mass))?,
        };
        v1.validate()?;
        Ok(v1)
    }
}
