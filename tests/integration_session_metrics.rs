use hovertrace::metrics::{self, MetricsUnavailable};
use hovertrace::phase::{classify, InteractionTimeline, Phase, PhaseTag};
use hovertrace::replay::{ReplayEngine, ReplaySettings, ReplayStrategy};
use hovertrace::sampler::MouseSampler;
use hovertrace::schedule::TimerQueue;
use hovertrace::session::{FrozenSession, Session};
use hovertrace::surface::{DisplayList, DrawOp};
use hovertrace::survey::{QuestionId, SurveyMode};

use assert_matches::assert_matches;

fn no_question(_: f64, _: f64) -> Option<QuestionId> {
    None
}

/// Two stacked questions: rows 0..10 are question 1, rows 10..20 question 2
fn two_rows(_: f64, y: f64) -> Option<QuestionId> {
    match y {
        y if (0.0..10.0).contains(&y) => Some(1),
        y if (10.0..20.0).contains(&y) => Some(2),
        _ => None,
    }
}

fn single_session(
    first: Option<u64>,
    last: Option<u64>,
    submit: Option<u64>,
    moves: &[u64],
) -> FrozenSession {
    let mut session = Session::new(SurveyMode::Single, vec![1]);
    let mut sampler = MouseSampler::new(1, false);
    session.set_start_time(0);

    let mut events: Vec<(u64, &str)> = moves.iter().map(|&t| (t, "move")).collect();
    events.extend(first.map(|t| (t, "first")));
    events.extend(last.map(|t| (t, "last")));
    events.sort_by_key(|(t, kind)| (*t, *kind != "move"));

    for (i, (t, kind)) in events.into_iter().enumerate() {
        match kind {
            "first" => session.set_first_interaction(1, t),
            "last" => session.set_last_interaction(1, t),
            _ => {
                sampler.on_pointer_move(&mut session, i as f64, 1.0, t, &no_question);
            }
        }
    }
    if let Some(t) = submit {
        session.set_submit_time(t);
    }
    session.freeze()
}

#[test]
fn completed_session_splits_into_documented_shares() {
    let frozen = single_session(Some(1000), Some(4000), Some(5000), &[500, 2000, 4500]);
    let m = metrics::compute(&frozen);
    let q = m.for_question(1).unwrap().as_ref().unwrap();

    assert_eq!(q.pre_ms(), 1000);
    assert_eq!(q.during.elapsed_ms, 3000);
    assert_eq!(q.post.elapsed_ms, 1000);
    assert_eq!(q.total_ms, 5000);
    assert_eq!(q.during.percentage, 60.0);
    assert!((q.percentage_sum() - 100.0).abs() <= 0.1 + 1e-9);
}

#[test]
fn missing_last_interaction_collapses_during() {
    let frozen = single_session(Some(2000), None, Some(3000), &[]);
    let q = metrics::compute(&frozen).questions[0].1.clone().unwrap();

    assert_eq!(q.pre_ms(), 2000);
    assert_eq!(q.during.elapsed_ms, 0);
    assert_eq!(q.post.elapsed_ms, 1000);
    assert_eq!(q.pre.unwrap().percentage, 66.7);
    assert_eq!(q.post.percentage, 33.3);
}

#[test]
fn unsubmitted_session_has_no_metrics() {
    let frozen = single_session(Some(2000), None, None, &[100]);
    assert_matches!(
        metrics::compute(&frozen).questions[0].1,
        Err(MetricsUnavailable::MissingSubmit)
    );
    assert!(!metrics::compute(&frozen).any_available());
}

#[test]
fn sample_phases_follow_milestones_at_capture_time() {
    let frozen = single_session(Some(1000), Some(4000), Some(5000), &[500, 2000, 4500]);
    let phases: Vec<Phase> = frozen.samples().iter().map(|s| s.phase.phase).collect();
    assert_eq!(phases, vec![Phase::Pre, Phase::During, Phase::Post]);

    // retrospective classification agrees for every captured sample
    for s in frozen.samples() {
        assert_eq!(classify(&frozen, s.timestamp, None), s.phase);
    }
}

#[test]
fn multi_question_transition_bounds_both_windows() {
    let mut session = Session::new(SurveyMode::Multi, vec![1, 2]);
    let mut sampler = MouseSampler::new(1, false);
    session.set_start_time(0);

    sampler.on_pointer_move(&mut session, 5.0, 2.0, 100, &two_rows);
    session.set_first_interaction(1, 300);
    sampler.on_pointer_move(&mut session, 5.0, 3.0, 400, &two_rows);
    sampler.on_pointer_move(&mut session, 5.0, 12.0, 600, &two_rows);
    sampler.on_pointer_move(&mut session, 5.0, 4.0, 700, &two_rows);
    session.set_first_interaction(2, 900);
    session.set_last_interaction(2, 1000);
    sampler.on_pointer_move(&mut session, 5.0, 30.0, 1100, &two_rows);
    session.set_submit_time(1200);

    let frozen = session.freeze();
    let tags: Vec<PhaseTag> = frozen.samples().iter().map(|s| s.phase).collect();
    assert_eq!(
        tags,
        vec![
            PhaseTag::new(Phase::Pre, Some(1)),
            PhaseTag::new(Phase::During, Some(1)),
            PhaseTag::new(Phase::Pre, Some(2)),
            // back over question 1 after the transition keeps its own tag
            PhaseTag::new(Phase::During, Some(1)),
            // below every question: falls back to the last one hovered
            PhaseTag::new(Phase::During, Some(1)),
        ]
    );
    assert_eq!(frozen.transition_into(2), Some(600));

    let m = metrics::compute(&frozen);
    let q1 = m.for_question(1).unwrap().as_ref().unwrap();
    assert_eq!(q1.pre_ms(), 300);
    assert_eq!(q1.post.elapsed_ms, 300);

    let q2 = m.for_question(2).unwrap().as_ref().unwrap();
    assert_eq!(q2.pre_ms(), 300);
    assert_eq!(q2.during.elapsed_ms, 100);
    assert_eq!(q2.post.elapsed_ms, 200);
    assert_eq!(frozen.window(Some(2)).last, Some(1000));
}

#[test]
fn question_never_hovered_has_no_pre_share() {
    let mut session = Session::new(SurveyMode::Multi, vec![1, 2]);
    session.set_start_time(0);
    session.set_first_interaction(1, 100);
    session.set_first_interaction(2, 300);
    session.set_submit_time(500);

    let m = metrics::compute(&session.freeze());
    let q1 = m.for_question(1).unwrap().as_ref().unwrap();
    let q2 = m.for_question(2).unwrap().as_ref().unwrap();

    assert_eq!(q1.post.elapsed_ms, 400);
    assert_eq!(q2.pre, None);
    assert_eq!(q2.post.elapsed_ms, 200);
    assert_eq!(q2.post.percentage, 100.0);
}

#[test]
fn full_replay_draws_trail_with_pause_markers() {
    let frozen = single_session(Some(1000), None, Some(9000), &[100, 200, 2500, 2600]);
    let mut engine = ReplayEngine::new(ReplaySettings {
        strategy: ReplayStrategy::FixedTick,
        tick_ms: 10,
        pause_threshold_ms: 1000,
    });
    let mut timers = TimerQueue::new();
    let mut surface = DisplayList::new(80.0, 24.0);

    assert!(engine.start(&frozen, 0, &mut timers));
    let mut advances = 0;
    while let Some(deadline) = timers.next_deadline() {
        for id in timers.take_due(deadline) {
            if engine.on_timer(id, &frozen, deadline, &mut timers) {
                advances += 1;
            }
        }
    }
    engine.render(&frozen, &mut surface);

    assert_eq!(advances, 4);
    assert!(!engine.is_animating());
    assert_eq!(surface.segment_count(), 3);
    assert_eq!(surface.texts().collect::<Vec<_>>(), vec!["2.3s"]);

    let dots = surface
        .ops()
        .iter()
        .filter(|op| matches!(op, DrawOp::Dot { .. }))
        .count();
    // one pause marker plus the two highlight rings
    assert_eq!(dots, 3);
}

#[test]
fn empty_trail_never_starts() {
    let frozen = single_session(Some(1000), None, Some(2000), &[]);
    let mut engine = ReplayEngine::new(ReplaySettings::default());
    let mut timers = TimerQueue::new();
    let mut surface = DisplayList::new(80.0, 24.0);

    assert!(!engine.start(&frozen, 0, &mut timers));
    assert!(timers.is_empty());
    engine.render(&frozen, &mut surface);
    assert!(surface.ops().is_empty());
}
