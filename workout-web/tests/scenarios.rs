//! End-to-end sessions driven by synthetic side-view poses

use approx::assert_relative_eq;
use proptest::prelude::*;

use workout_web::pose::KEYPOINT_COUNT;
use workout_web::{
    AnalysisError, AnalysisResult, AnalyzerConfig, BodyPart, ExerciseType, Frame, Keypoint, Stage, WorkoutSession,
};

const FPS: f64 = 30.0;

// ============================================================================
// POSE BUILDERS
// ============================================================================

fn body(points: &[(BodyPart, BodyPart, f32, f32)], score: f32) -> Vec<Keypoint> {
    let mut kps = vec![Keypoint::new(0.0, 0.0, score); KEYPOINT_COUNT];
    for &(left, right, x, y) in points {
        kps[left.index()] = Keypoint::new(x, y, score);
        kps[right.index()] = Keypoint::new(x, y, score);
    }
    kps
}

/// Horizontal body (push-up / plank) with the given elbow angle
fn horizontal(elbow: f32) -> Vec<Keypoint> {
    let t = elbow.to_radians();
    let mut kps = body(
        &[
            (BodyPart::LeftShoulder, BodyPart::RightShoulder, 100.0, 200.0),
            (BodyPart::LeftElbow, BodyPart::RightElbow, 100.0, 250.0),
            (BodyPart::LeftWrist, BodyPart::RightWrist, 100.0 + 50.0 * t.sin(), 250.0 - 50.0 * t.cos()),
            (BodyPart::LeftHip, BodyPart::RightHip, 200.0, 200.0),
            (BodyPart::LeftKnee, BodyPart::RightKnee, 300.0, 200.0),
            (BodyPart::LeftAnkle, BodyPart::RightAnkle, 400.0, 200.0),
        ],
        0.9,
    );
    kps[BodyPart::Nose.index()] = Keypoint::new(70.0, 200.0, 0.9);
    kps
}

/// Upright body with arms held forward and the given knee angle
fn squat(knee: f32) -> Vec<Keypoint> {
    let t = knee.to_radians();
    let (hx, hy) = (200.0 + 100.0 * t.sin(), 300.0 + 100.0 * t.cos());
    let mut kps = body(
        &[
            (BodyPart::LeftShoulder, BodyPart::RightShoulder, hx, hy - 150.0),
            (BodyPart::LeftElbow, BodyPart::RightElbow, hx + 50.0, hy - 150.0),
            (BodyPart::LeftWrist, BodyPart::RightWrist, hx + 100.0, hy - 150.0),
            (BodyPart::LeftHip, BodyPart::RightHip, hx, hy),
            (BodyPart::LeftKnee, BodyPart::RightKnee, 200.0, 300.0),
            (BodyPart::LeftAnkle, BodyPart::RightAnkle, 200.0, 400.0),
        ],
        0.9,
    );
    kps[BodyPart::Nose.index()] = Keypoint::new(hx, hy - 180.0, 0.9);
    kps
}

/// Upright at rest, arms hanging
fn standing() -> Vec<Keypoint> {
    jumping_jack(0.0)
}

/// Upright with straight legs and both arms raised `arms` degrees away
/// from the torso
fn jumping_jack(arms: f32) -> Vec<Keypoint> {
    let t = arms.to_radians();
    let (dx, dy) = (t.sin(), t.cos());
    body(
        &[
            (BodyPart::LeftShoulder, BodyPart::RightShoulder, 200.0, 100.0),
            (BodyPart::LeftElbow, BodyPart::RightElbow, 200.0 + 50.0 * dx, 100.0 + 50.0 * dy),
            (BodyPart::LeftWrist, BodyPart::RightWrist, 200.0 + 100.0 * dx, 100.0 + 100.0 * dy),
            (BodyPart::LeftHip, BodyPart::RightHip, 200.0, 200.0),
            (BodyPart::LeftKnee, BodyPart::RightKnee, 200.0, 300.0),
            (BodyPart::LeftAnkle, BodyPart::RightAnkle, 200.0, 400.0),
        ],
        0.9,
    )
}

fn blind() -> Vec<Keypoint> {
    vec![Keypoint::new(150.0, 150.0, 0.0); KEYPOINT_COUNT]
}

/// Feeds poses at 30 fps, remembering the clock between calls
struct Driver {
    session: WorkoutSession,
    frame: u32,
    exercise: Option<ExerciseType>,
    results: Vec<AnalysisResult>,
}

impl Driver {
    fn new(config: AnalyzerConfig) -> Self {
        Self {
            session: WorkoutSession::new(config).unwrap(),
            frame: 0,
            exercise: None,
            results: Vec::new(),
        }
    }

    fn with_override(mut self, exercise: ExerciseType) -> Self {
        self.exercise = Some(exercise);
        self
    }

    fn hold(&mut self, pose: &[Keypoint], frames: u32) -> &AnalysisResult {
        for _ in 0..frames {
            let mut frame = Frame::new(pose.to_vec(), f64::from(self.frame) / FPS);
            frame.exercise_override = self.exercise;
            let result = self.session.analyze(&frame).unwrap();
            self.results.push(result);
            self.frame += 1;
        }
        self.results.last().unwrap()
    }

    /// Stages in the order they were entered, starting from neutral
    fn stage_sequence(&self) -> Vec<Stage> {
        let mut seen = vec![Stage::Neutral];
        for r in &self.results {
            if seen.last() != Some(&r.stage) {
                seen.push(r.stage);
            }
        }
        seen
    }
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn push_up_cycle_counts_one_rep() {
    let mut d = Driver::new(AnalyzerConfig::default()).with_override(ExerciseType::PushUp);
    d.hold(&horizontal(170.0), 20);
    d.hold(&horizontal(80.0), 20);
    let last = d.hold(&horizontal(170.0), 20).clone();

    assert_eq!(last.rep_count, 1);
    assert_eq!(last.stage, Stage::Up);
    assert_eq!(d.stage_sequence(), [Stage::Neutral, Stage::Down, Stage::Up]);
    assert_relative_eq!(last.calories, 0.5);
}

#[test]
fn push_up_is_detected_without_override() {
    let mut d = Driver::new(AnalyzerConfig::default());
    let top = d.hold(&horizontal(170.0), 20).clone();
    // straight arms read as a plank until the elbows bend
    assert_eq!(top.exercise_type, ExerciseType::Plank);

    let bottom = d.hold(&horizontal(80.0), 20).clone();
    assert_eq!(bottom.exercise_type, ExerciseType::PushUp);
    assert_eq!(bottom.stage, Stage::Down);

    let last = d.hold(&horizontal(170.0), 20).clone();
    assert_eq!(last.exercise_type, ExerciseType::PushUp);
    assert_eq!(last.rep_count, 1);
    assert!(last.form_score > 0.9);
}

#[test]
fn zero_confidence_changes_nothing() {
    let mut d = Driver::new(AnalyzerConfig::default());
    let result = d.hold(&blind(), 10).clone();

    assert!(!result.exercise_detected);
    assert!(result.feedback.is_empty());
    assert_eq!(result.stage, Stage::Neutral);
    assert_eq!(result.rep_count, 0);
    assert_eq!(result.calories, 0.0);
}

#[test]
fn tracking_loss_freezes_the_stage_machine() {
    let mut d = Driver::new(AnalyzerConfig::default()).with_override(ExerciseType::Squat);
    d.hold(&squat(170.0), 20);
    let down = d.hold(&squat(70.0), 20).clone();
    assert_eq!(down.stage, Stage::Down);

    d.exercise = None;
    let lost = d.hold(&blind(), 10).clone();
    assert!(!lost.exercise_detected);
    assert_eq!(lost.stage, Stage::Down);
    assert_eq!(lost.rep_count, 0);
}

#[test]
fn rapid_squat_cycles_count_once() {
    let config = AnalyzerConfig {
        smoothing_alpha: 0.0,
        ..AnalyzerConfig::default()
    };
    let mut session = WorkoutSession::new(config).unwrap();
    let mut rep_count = 0;
    for (t, knee) in [(0.0, 170.0), (0.4, 70.0), (0.8, 170.0), (0.9, 70.0), (1.0, 170.0)] {
        let frame = Frame::new(squat(knee), t).with_override(ExerciseType::Squat);
        rep_count = session.analyze(&frame).unwrap().rep_count;
    }
    assert_eq!(rep_count, 1);
}

#[test]
fn squats_are_detected_and_counted() {
    let mut d = Driver::new(AnalyzerConfig::default());
    for _ in 0..2 {
        d.hold(&squat(170.0), 20);
        let bottom = d.hold(&squat(70.0), 20);
        assert_eq!(bottom.exercise_type, ExerciseType::Squat);
    }
    let last = d.hold(&squat(170.0), 20).clone();

    assert_eq!(last.exercise_type, ExerciseType::Squat);
    assert_eq!(last.rep_count, 2);
    assert_relative_eq!(last.calories, 0.64, epsilon = 1e-9);
    assert!(last.feedback.iter().any(|f| f.criterion == "chest_up"));
}

#[test]
fn squat_survives_a_dropped_frame_at_the_bottom() {
    let mut d = Driver::new(AnalyzerConfig::default());
    for _ in 0..3 {
        d.hold(&squat(170.0), 20);
        d.hold(&squat(70.0), 20);
        let lost = d.hold(&blind(), 1);
        assert!(!lost.exercise_detected);
        // fully upright is outside the squat signature on its own
        let top = d.hold(&squat(178.0), 20);
        assert_eq!(top.exercise_type, ExerciseType::Squat);
    }
    assert_eq!(d.session.state().rep_count(), 3);
}

#[test]
fn idle_standing_detects_nothing() {
    let mut d = Driver::new(AnalyzerConfig::default());
    let last = d.hold(&standing(), 60).clone();

    assert!(d.results.iter().all(|r| !r.exercise_detected));
    assert_eq!(last.rep_count, 0);
    assert_eq!(last.calories, 0.0);

    let summary = d.session.end();
    assert_eq!(summary.exercise_type, ExerciseType::None);
    assert!(summary.exercises.is_empty());
}

#[test]
fn jumping_jacks_keep_counting_with_arms_down() {
    let mut d = Driver::new(AnalyzerConfig::default());
    let first = d.hold(&jumping_jack(160.0), 20);
    assert_eq!(first.exercise_type, ExerciseType::JumpingJack);

    for _ in 0..3 {
        let down = d.hold(&jumping_jack(10.0), 20);
        assert_eq!(down.exercise_type, ExerciseType::JumpingJack);
        assert_eq!(down.stage, Stage::Down);
        d.hold(&jumping_jack(160.0), 20);
    }
    assert_eq!(d.results.last().unwrap().rep_count, 3);
    assert_eq!(d.session.end().exercise_type, ExerciseType::JumpingJack);
}

#[test]
fn summary_names_the_exercise_that_did_the_work() {
    let mut d = Driver::new(AnalyzerConfig::default());
    d.hold(&horizontal(170.0), 20);
    for _ in 0..3 {
        d.hold(&horizontal(80.0), 20);
        d.hold(&horizontal(170.0), 20);
    }
    d.hold(&blind(), 5);
    let idle = d.hold(&standing(), 60).clone();
    assert!(!idle.exercise_detected);

    let summary = d.session.end();
    assert_eq!(summary.exercise_type, ExerciseType::PushUp);
    assert_eq!(summary.reps, 3);
    let push_ups = summary.exercises.iter().find(|t| t.exercise == ExerciseType::PushUp).unwrap();
    assert_eq!(push_ups.reps, 3);
    assert_relative_eq!(push_ups.calories, 1.5, epsilon = 1e-9);
    // the opening straight-arm frames were credited as plank time
    assert!(summary.exercises.iter().any(|t| t.exercise == ExerciseType::Plank && t.hold_seconds > 0.0));
}

#[test]
fn plank_hold_accumulates_time() {
    let mut d = Driver::new(AnalyzerConfig::default());
    let last = d.hold(&horizontal(175.0), 45 * 30 + 1).clone();

    assert_eq!(last.exercise_type, ExerciseType::Plank);
    assert_relative_eq!(last.hold_seconds, 45.0, epsilon = 1e-6);
    assert_eq!(last.rep_count, 0);
    assert_eq!(last.stage, Stage::Neutral);
    assert_relative_eq!(last.calories, 45.0 * 0.07, epsilon = 1e-6);
}

#[test]
fn plank_tracking_loss_pauses_the_hold() {
    let mut d = Driver::new(AnalyzerConfig::default());
    d.hold(&horizontal(175.0), 301);

    let mut hips_lost = horizontal(175.0);
    hips_lost[BodyPart::LeftHip.index()].score = 0.0;
    hips_lost[BodyPart::RightHip.index()].score = 0.0;
    let lost = d.hold(&hips_lost, 30).clone();
    assert!(!lost.exercise_detected);
    assert_relative_eq!(lost.hold_seconds, 10.0, epsilon = 1e-6);

    let last = d.hold(&horizontal(175.0), 270).clone();
    // the first frame after recovery restarts the timer without credit
    assert_relative_eq!(last.hold_seconds, (300.0 + 269.0) / FPS, epsilon = 1e-6);
}

#[test]
fn stale_frame_is_dropped() {
    let mut session = WorkoutSession::default();
    session.analyze(&Frame::new(horizontal(175.0), 1.0)).unwrap();
    let err = session.analyze(&Frame::new(horizontal(175.0), 0.5)).unwrap_err();
    assert_eq!(err, AnalysisError::StaleFrame { timestamp: 0.5, last: 1.0 });
    assert_eq!(session.state().frames(), 1);
}

#[test]
fn summary_reports_the_session() {
    let mut d = Driver::new(AnalyzerConfig::default()).with_override(ExerciseType::PushUp);
    d.hold(&horizontal(170.0), 20);
    d.hold(&horizontal(80.0), 20);
    d.hold(&horizontal(170.0), 21);
    let summary = d.session.end();

    assert_eq!(summary.exercise_type, ExerciseType::PushUp);
    assert_eq!(summary.reps, 1);
    assert_eq!(summary.frames, 61);
    assert_relative_eq!(summary.duration_seconds, 2.0, epsilon = 1e-9);
    assert!(summary.form_score > 0.9 && summary.form_score <= 1.0);
}

#[test]
fn config_file_round_trip() {
    let path = std::env::temp_dir().join(format!("workout-web-{}.toml", std::process::id()));
    let config = AnalyzerConfig {
        debounce_seconds: 0.5,
        ..AnalyzerConfig::default()
    };
    std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();
    let loaded = AnalyzerConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded, config);
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn identical_input_gives_identical_output(elbows in prop::collection::vec(40.0f32..180.0, 1..80)) {
        let run = || {
            let mut session = WorkoutSession::default();
            elbows
                .iter()
                .enumerate()
                .map(|(i, e)| session.analyze(&Frame::new(horizontal(*e), i as f64 / FPS)).unwrap())
                .collect::<Vec<_>>()
        };
        prop_assert_eq!(run(), run());
    }

    #[test]
    fn totals_never_decrease(elbows in prop::collection::vec(40.0f32..180.0, 1..80)) {
        let mut session = WorkoutSession::default();
        let (mut reps, mut kcal, mut held) = (0, 0.0, 0.0);
        for (i, e) in elbows.iter().enumerate() {
            let r = session.analyze(&Frame::new(horizontal(*e), i as f64 * 0.1)).unwrap();
            prop_assert!(r.rep_count >= reps);
            prop_assert!(r.calories >= kcal);
            prop_assert!(r.hold_seconds >= held);
            prop_assert!((0.0..=1.0).contains(&r.form_score));
            reps = r.rep_count;
            kcal = r.calories;
            held = r.hold_seconds;
        }
    }
}
