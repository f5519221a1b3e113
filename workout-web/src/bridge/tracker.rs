//! `WorkoutTracker` - one workout session exposed to JavaScript
//!
//! Keypoints arrive as a flat `Float32Array` of `[x, y, score] * 17` with a
//! `performance.now()` style timestamp in milliseconds. Results go back as
//! plain JS objects with snake_case keys.

use log::info;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::AnalyzerConfig;
use crate::error::AnalysisError;
use crate::session::{Frame, WorkoutSession};

#[wasm_bindgen]
pub struct WorkoutTracker {
    /// `None` once `finish()` has been called
    session: Option<WorkoutSession>,
}

#[wasm_bindgen]
impl WorkoutTracker {
    /// Tracker with the built-in exercise table
    #[wasm_bindgen(constructor)]
    pub fn new() -> WorkoutTracker {
        Self {
            session: Some(WorkoutSession::default()),
        }
    }

    /// Tracker with a TOML configuration. Missing keys fall back to defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(toml: &str) -> Result<WorkoutTracker, JsValue> {
        let config = AnalyzerConfig::from_toml_str(toml).map_err(to_js_error)?;
        info!("tracker: loaded config with {} exercises", config.exercises.len());
        Ok(Self {
            session: Some(WorkoutSession::new(config).map_err(to_js_error)?),
        })
    }

    /// Analyze one frame. `exercise` forces an exercise type ("push_up",
    /// "squat", "plank", "jumping_jack") instead of auto-detection.
    #[wasm_bindgen(js_name = analyzeFrame)]
    pub fn analyze_frame(&mut self, keypoints: &[f32], timestamp_ms: f64, exercise: Option<String>) -> Result<JsValue, JsValue> {
        let session = self.session.as_mut().ok_or_else(|| to_js_error(AnalysisError::SessionEnded))?;
        let frame = Frame::from_flat(keypoints, timestamp_ms / 1000.0, exercise.as_deref()).map_err(to_js_error)?;
        let result = session.analyze(&frame).map_err(to_js_error)?;
        to_js_value(&result)
    }

    #[wasm_bindgen(getter, js_name = repCount)]
    pub fn rep_count(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| s.state().rep_count())
    }

    #[wasm_bindgen(getter, js_name = holdSeconds)]
    pub fn hold_seconds(&self) -> f64 {
        self.session.as_ref().map_or(0.0, |s| s.state().hold_seconds())
    }

    /// End the session and return its summary. Later calls fail.
    pub fn finish(&mut self) -> Result<JsValue, JsValue> {
        let session = self.session.take().ok_or_else(|| to_js_error(AnalysisError::SessionEnded))?;
        to_js_value(&session.end())
    }
}

impl Default for WorkoutTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Maps become plain objects rather than `Map`
fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
