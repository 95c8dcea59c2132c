//! Integration tests for the live tracing session
//!
//! These tests exercise the handoff between the live-input path and stroke
//! finalization across threads:
//! - Samples accepted for a stroke are replayed with that stroke, in order
//! - No sample is lost or duplicated when finish races with on_sample
//! - A misconfigured feedback kind never stops recording

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use trace_trainer::analysis::FeedbackKind;
use trace_trainer::config::{FeedbackConfig, ThresholdConfig};
use trace_trainer::error::SessionError;
use trace_trainer::{
    AppConfig, ComparisonMetric, FinalizedStroke, Sample, Stroke, Trace, TraceRole, TracingSession,
};

fn expert() -> Trace {
    let samples = (0..200)
        .map(|i| Sample::new(i as f64, (i as f64 / 15.0).sin() * 10.0, 0.5, i as f64 * 4.0))
        .collect::<Vec<_>>();
    Trace::with_strokes(TraceRole::Expert, vec![Stroke::try_from(samples).unwrap()])
}

fn student_sample(i: usize) -> Sample {
    Sample::new(i as f64 * 0.05, 2.0, 0.5 + (i % 7) as f64 * 0.05, i as f64 * 4.0)
}

fn assert_replay_matches_stroke(finalized: &FinalizedStroke) {
    assert_eq!(finalized.segments().len(), finalized.len());
    for (segment, sample) in finalized.segments().iter().zip(finalized.stroke.samples()) {
        assert_eq!(segment.sample, *sample);
    }
}

/// The producer keeps feeding samples and reopens a stroke whenever the
/// finalizer closes one; the finalizer closes strokes as fast as it can.
/// Every sample must come back exactly once, in production order.
#[test]
fn test_concurrent_producer_and_finalizer_lose_nothing() {
    const TOTAL: usize = 5_000;
    let session = Arc::new(TracingSession::new(AppConfig::default(), expert()));
    let producing = Arc::new(AtomicBool::new(true));

    let producer = {
        let session = Arc::clone(&session);
        let producing = Arc::clone(&producing);
        thread::spawn(move || {
            for i in 0..TOTAL {
                loop {
                    match session.on_sample(student_sample(i)) {
                        Ok(_) => break,
                        Err(SessionError::StrokeNotOpen) => match session.begin_stroke() {
                            Ok(_) | Err(SessionError::StrokeAlreadyOpen { .. }) => continue,
                            Err(err) => panic!("begin_stroke failed: {}", err),
                        },
                        Err(err) => panic!("on_sample failed: {}", err),
                    }
                }
            }
            producing.store(false, Ordering::Release);
        })
    };

    let finalizer = {
        let session = Arc::clone(&session);
        let producing = Arc::clone(&producing);
        thread::spawn(move || {
            let mut finalized = Vec::new();
            while producing.load(Ordering::Acquire) {
                match session.finish_stroke() {
                    Ok(Some(stroke)) => finalized.push(stroke),
                    Ok(None) | Err(SessionError::StrokeNotOpen) => thread::yield_now(),
                    Err(err) => panic!("finish_stroke failed: {}", err),
                }
            }
            finalized
        })
    };

    producer.join().unwrap();
    let mut finalized = finalizer.join().unwrap();
    match session.finish_stroke() {
        Ok(Some(stroke)) => finalized.push(stroke),
        Ok(None) | Err(SessionError::StrokeNotOpen) => {}
        Err(err) => panic!("final finish_stroke failed: {}", err),
    }

    assert!(finalized.windows(2).all(|w| w[0].stroke_id < w[1].stroke_id));
    for stroke in &finalized {
        assert_eq!(stroke.discarded_segments, 0);
        assert_replay_matches_stroke(stroke);
    }

    let replayed: Vec<Sample> = finalized
        .iter()
        .flat_map(|stroke| stroke.replay().map(|(sample, _)| sample))
        .collect();
    let expected: Vec<Sample> = (0..TOTAL).map(student_sample).collect();
    assert_eq!(replayed.len(), TOTAL);
    assert_eq!(replayed, expected);

    let student = session.student_trace().unwrap();
    assert_eq!(student.sample_count(), TOTAL);
    assert_eq!(student.strokes.len(), finalized.len());
}

/// Strokes drawn from a background thread while subscribers watch
#[test]
fn test_subscribers_see_every_sample_and_stroke() {
    let session = Arc::new(TracingSession::new(AppConfig::default(), expert()));
    let mut feedback = session.subscribe_feedback().unwrap();
    let mut strokes = session.subscribe_strokes().unwrap();

    let writer = {
        let session = Arc::clone(&session);
        thread::spawn(move || {
            for stroke in 0..3 {
                session.begin_stroke().unwrap();
                for i in 0..40 {
                    session.on_sample(student_sample(stroke * 40 + i)).unwrap();
                }
                session.finish_stroke().unwrap().unwrap();
            }
        })
    };
    writer.join().unwrap();

    let mut samples_seen = 0;
    while let Ok(live) = feedback.try_recv() {
        assert!(live.visual.is_some());
        samples_seen += 1;
    }
    assert_eq!(samples_seen, 120);

    let mut strokes_seen = Vec::new();
    while let Ok(stroke) = strokes.try_recv() {
        assert_eq!(stroke.len(), 40);
        strokes_seen.push(stroke.stroke_id);
    }
    assert_eq!(strokes_seen.len(), 3);
}

#[test]
fn test_stroke_lifecycle_errors() {
    let session = TracingSession::new(AppConfig::default(), expert());

    assert_eq!(
        session.on_sample(student_sample(0)),
        Err(SessionError::StrokeNotOpen)
    );

    let id = session.begin_stroke().unwrap();
    assert_eq!(
        session.begin_stroke(),
        Err(SessionError::StrokeAlreadyOpen { stroke_id: id })
    );

    session.on_sample(student_sample(0)).unwrap();
    assert!(session.finish_stroke().unwrap().is_some());
    assert_eq!(session.finish_stroke(), Err(SessionError::StrokeNotOpen));
}

#[test]
fn test_unconfigured_kind_keeps_writing_functional() {
    let config = AppConfig {
        thresholds: ThresholdConfig {
            pressure: None,
            tilt: None,
            ..ThresholdConfig::default()
        },
        feedback: FeedbackConfig {
            visual: Some(FeedbackKind::Accuracy),
            audio: Some(FeedbackKind::Pressure),
            ..FeedbackConfig::default()
        },
        ..AppConfig::default()
    };
    let session = TracingSession::new(config, expert());

    session.begin_stroke().unwrap();
    for i in 0..25 {
        let live = session.on_sample(student_sample(i)).unwrap();
        assert!(live.visual.as_ref().unwrap().error.is_none());
        assert!(live.audio.as_ref().unwrap().error.is_some());
    }
    let finalized = session.finish_stroke().unwrap().unwrap();
    assert_eq!(finalized.len(), 25);

    // Accuracy still compares; pressure reports the missing configuration
    assert!(session.compare(ComparisonMetric::Accuracy).is_ok());
    assert!(session.compare(ComparisonMetric::Pressure).is_err());
}

#[test]
fn test_wet_and_dry_ink_agree() {
    let session = TracingSession::new(AppConfig::default(), expert());
    session.begin_stroke().unwrap();

    // Drift away from the expert so the pen color changes along the stroke
    let mut wet = Vec::new();
    for i in 0..60 {
        let sample = Sample::new(i as f64, i as f64 * 0.8, 0.5, i as f64 * 4.0);
        wet.push(session.on_sample(sample).unwrap().pen);
    }

    let finalized = session.finish_stroke().unwrap().unwrap();
    let dry: Vec<_> = finalized.replay().map(|(_, pen)| pen).collect();
    assert_eq!(dry, wet);
    assert_ne!(wet.first(), wet.last());
}
