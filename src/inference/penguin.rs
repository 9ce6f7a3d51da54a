use super::{Features, InferenceError, Prediction, Predictor, number};

pub const FEATURES: [&str; 4] = [
    "bill_length_mm",
    "bill_depth_mm",
    "flipper_length_mm",
    "body_mass_g",
];

const SPECIES: [&str; 3] = ["Adelie", "Chinstrap", "Gentoo"];

// per-species means, same order as FEATURES
const CENTROIDS: [[f64; 4]; 3] = [
    [38.79, 18.35, 189.95, 3700.66],
    [48.83, 18.42, 195.82, 3733.09],
    [47.50, 14.98, 217.19, 5076.02],
];

// population spread used to put features on one scale
const SCALE: [f64; 4] = [5.46, 1.97, 14.06, 801.95];

/// Nearest-centroid species classifier over standardized body measurements.
#[derive(Default)]
pub struct PenguinClassifier;

impl PenguinClassifier {
    pub fn new() -> Self {
        Self
    }

    fn distances(x: [f64; 4]) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (d, centroid) in out.iter_mut().zip(CENTROIDS.iter()) {
            *d = x
                .iter()
                .zip(centroid.iter())
                .zip(SCALE.iter())
                .map(|((xi, ci), si)| ((xi - ci) / si).powi(2))
                .sum();
        }
        out
    }
}

// softmax over negative squared distance
fn probabilities(distances: [f64; 3]) -> Vec<f64> {
    let best = distances.iter().cloned().fold(f64::INFINITY, f64::min);
    let weights: Vec<f64> = distances.iter().map(|d| (best - d).exp()).collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

impl Predictor for PenguinClassifier {
    fn name(&self) -> &str {
        "penguin_classifier"
    }

    fn predict(&self, features: &Features) -> Result<Prediction, InferenceError> {
        let mut x = [0.0; 4];
        for (slot, name) in x.iter_mut().zip(FEATURES) {
            *slot = number(features, name)?;
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::failure(
                "Prediction error",
                "measurements must be finite",
            ));
        }

        // huge but finite inputs can still overflow once squared
        let distances = Self::distances(x);
        if distances.iter().any(|d| !d.is_finite()) {
            return Err(InferenceError::failure(
                "Prediction error",
                "measurements are out of range",
            ));
        }

        let probabilities = probabilities(distances);
        let (class, confidence) = probabilities
            .iter()
            .cloned()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, p)| if p > best.1 { (i, p) } else { best });

        Ok(Prediction {
            label: SPECIES[class].to_string(),
            confidence,
            probabilities,
        })
    }
}
