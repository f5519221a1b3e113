//! Workout Web - exercise recognition, rep counting and form feedback
//!
//! Entry point for the crate. Only contains:
//! - Module declarations and re-exports
//! - wasm_bindgen entry points that delegate to the bridge
//!
//! The analysis core is plain Rust and runs natively as well; the JS
//! surface is only compiled for `wasm32`.

pub mod classifier;
pub mod config;
pub mod error;
pub mod physics;
pub mod pose;
pub mod scoring;
pub mod session;

#[cfg(target_arch = "wasm32")]
mod bridge;

pub use classifier::{ExerciseType, Feature};
pub use config::{AnalyzerConfig, ExerciseProfile, Tracking};
pub use error::{AnalysisError, ConfigError, FrameResult};
pub use physics::{JointAngle, JointAngles, JointName};
pub use pose::{BodyPart, Keypoint, Pose};
pub use scoring::{FeedbackEntry, FormAssessment, Severity};
pub use session::{AnalysisResult, ExerciseTally, Frame, SessionSummary, Stage, WorkoutSession};

#[cfg(target_arch = "wasm32")]
pub use bridge::WorkoutTracker;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Called automatically when WASM module loads
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Route `log` output to the browser console
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: &str) {
    let level = match level {
        "trace" => log::Level::Trace,
        "debug" => log::Level::Debug,
        "warn" => log::Level::Warn,
        "error" => log::Level::Error,
        _ => log::Level::Info,
    };
    wasm_logger::init(wasm_logger::Config::new(level));
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
