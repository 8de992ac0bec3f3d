//! End-to-end session scenarios against a scripted tracker.

mod common;

use common::{ScriptedTracker, Shot, ready_session};
use std::time::Duration;
use strictly_rps::events::{self, GameEvent};
use strictly_rps::invariants::check_session;
use strictly_rps::{
    AbortReason, Gesture, Mode, Outcome, SessionConfig, SessionError, SessionState, play,
};

fn computer(rounds: i64) -> SessionConfig {
    SessionConfig::new(Mode::Computer, "Ada", None, rounds).expect("valid")
}

fn human(rounds: i64) -> SessionConfig {
    SessionConfig::new(Mode::Human, "Ada", Some("Bo".into()), rounds).expect("valid")
}

#[tokio::test]
async fn test_computer_mode_three_rounds() {
    let (tracker, counters) =
        ScriptedTracker::single([Gesture::Rock, Gesture::Paper, Gesture::Scissors]);
    let mut session = ready_session(
        computer(3),
        tracker,
        [Gesture::Scissors, Gesture::Paper, Gesture::Paper],
    )
    .await;

    let mut outcomes = Vec::new();
    while !session.is_finished() {
        let record = session.advance().await.expect("round plays");
        outcomes.push(record.outcome());
    }

    assert_eq!(outcomes, vec![Outcome::WinA, Outcome::Tie, Outcome::WinA]);
    let result = session.final_result().expect("finished");
    assert_eq!(result.score_a, 2);
    assert_eq!(result.score_b, 0);
    assert_eq!(result.ties, 1);
    assert_eq!(result.rounds_played, 3);
    assert_eq!(result.winner, "Ada");
    assert_eq!(result.aborted, None);
    assert_eq!(session.state(), &SessionState::Finished);

    assert_eq!(counters.opens(), 1);
    assert_eq!(counters.releases(), 1);
    assert!(!session.device_open());
}

#[tokio::test]
async fn test_computer_mode_records_computer_gesture_without_a_hand() {
    let (tracker, _) = ScriptedTracker::new([Shot::Hands(vec![])]);
    let mut session = ready_session(computer(1), tracker, [Gesture::Paper]).await;

    let record = session.advance().await.expect("round plays");
    assert_eq!(record.gesture_a(), None);
    assert_eq!(record.gesture_b(), Some(Gesture::Paper));
    assert_eq!(record.outcome(), Outcome::Incomplete);
    assert_eq!(session.describe(&record), "No gesture detected!");

    let result = session.final_result().expect("finished");
    assert_eq!(result.incomplete, 1);
    assert!(result.is_draw());
}

#[tokio::test]
async fn test_computer_mode_reads_only_the_first_hand() {
    let (tracker, _) = ScriptedTracker::new([Shot::Hands(vec![Gesture::Rock, Gesture::Paper])]);
    let mut session = ready_session(computer(1), tracker, [Gesture::Scissors]).await;

    let record = session.advance().await.expect("round plays");
    assert_eq!(record.gesture_a(), Some(Gesture::Rock));
    assert_eq!(record.gesture_b(), Some(Gesture::Scissors));
    assert_eq!(record.outcome(), Outcome::WinA);
}

#[tokio::test]
async fn test_human_mode_two_rounds() {
    let (tracker, _) = ScriptedTracker::new([
        Shot::Hands(vec![Gesture::Rock, Gesture::Scissors]),
        Shot::Hands(vec![Gesture::Paper]),
    ]);
    let mut session = ready_session(human(2), tracker, []).await;

    let first = session.advance().await.expect("round 1");
    assert_eq!(first.gesture_a(), Some(Gesture::Rock));
    assert_eq!(first.gesture_b(), Some(Gesture::Scissors));
    assert_eq!(first.outcome(), Outcome::WinA);
    assert_eq!(session.describe(&first), "Ada Wins!");

    let second = session.advance().await.expect("round 2");
    assert_eq!(second.gesture_a(), Some(Gesture::Paper));
    assert_eq!(second.gesture_b(), None);
    assert_eq!(second.outcome(), Outcome::Incomplete);
    assert_eq!(session.describe(&second), "Waiting for both players...");

    let result = session.final_result().expect("finished");
    assert_eq!((result.score_a, result.score_b), (1, 0));
    assert_eq!(result.incomplete, 1);
    assert_eq!(result.winner, "Ada");
}

#[tokio::test]
async fn test_level_scores_are_a_draw() {
    let (tracker, _) = ScriptedTracker::new([
        Shot::Hands(vec![Gesture::Rock, Gesture::Scissors]),
        Shot::Hands(vec![Gesture::Rock, Gesture::Paper]),
        Shot::Hands(vec![Gesture::Paper, Gesture::Rock]),
        Shot::Hands(vec![Gesture::Scissors, Gesture::Rock]),
    ]);
    let mut session = ready_session(human(4), tracker, []).await;

    let outcome = play(&mut session, Duration::ZERO).await.expect("plays");
    assert_eq!((outcome.score_a, outcome.score_b), (2, 2));
    assert_eq!(outcome.winner, "Draw");
    assert!(outcome.is_draw());
}

#[tokio::test]
async fn test_scoring_winner_b() {
    let (tracker, _) = ScriptedTracker::single([Gesture::Rock]);
    let mut session = ready_session(computer(1), tracker, [Gesture::Paper]).await;

    let record = session.advance().await.expect("round plays");
    assert_eq!(record.outcome(), Outcome::WinB);
    assert_eq!(session.describe(&record), "Computer Wins!");
    assert_eq!(session.final_result().expect("finished").winner, "Computer");
}

#[tokio::test]
async fn test_capture_failure_aborts_and_keeps_partial_result() {
    let (tracker, counters) = ScriptedTracker::new([Shot::Hands(vec![Gesture::Rock]), Shot::Fail]);
    let mut session = ready_session(computer(5), tracker, [Gesture::Scissors]).await;

    session.advance().await.expect("round 1");
    let err = session.advance().await.unwrap_err();
    match err {
        SessionError::Aborted { round, reason } => {
            assert_eq!(round, 2);
            assert!(matches!(reason, AbortReason::CaptureFailed(_)));
        }
        other => panic!("expected abort, got {other:?}"),
    }

    assert_eq!(session.round_log().len(), 1);
    assert!(session.is_finished());
    assert!(matches!(session.state(), SessionState::Aborted(_)));
    assert!(!session.device_open());
    assert_eq!(counters.releases(), 1);

    let result = session.final_result().expect("available after abort");
    assert_eq!(result.score_a, 1);
    assert_eq!(result.rounds_played, 1);
    assert_eq!(result.winner, "Ada");
    assert!(result.aborted.is_some());

    assert_eq!(session.advance().await, Err(SessionError::Terminal));
    drop(session);
    assert_eq!(counters.releases(), 1);
}

#[tokio::test]
async fn test_stop_before_round_aborts_without_touching_device() {
    let (tracker, counters) = ScriptedTracker::single([Gesture::Rock]);
    let mut session = ready_session(computer(3), tracker, [Gesture::Rock]).await;

    session.stop_handle().cancel();
    let err = session.advance().await.unwrap_err();
    assert_eq!(
        err,
        SessionError::Aborted {
            round: 1,
            reason: AbortReason::Stopped
        }
    );
    assert_eq!(session.state(), &SessionState::Aborted(AbortReason::Stopped));
    assert!(session.round_log().is_empty());
    assert_eq!(counters.opens(), 0);
    assert_eq!(counters.captures(), 0);

    let result = session.final_result().expect("available after abort");
    assert_eq!(result.rounds_played, 0);
    assert_eq!(result.winner, "Draw");
    assert_eq!(result.aborted, Some(AbortReason::Stopped));
}

#[tokio::test]
async fn test_advance_after_finish_is_terminal() {
    let (tracker, counters) = ScriptedTracker::single([Gesture::Rock]);
    let mut session = ready_session(computer(1), tracker, [Gesture::Rock]).await;

    session.advance().await.expect("round plays");
    assert_eq!(session.advance().await, Err(SessionError::Terminal));
    assert_eq!(session.round_log().len(), 1);
    assert_eq!(counters.captures(), 1);
}

#[tokio::test]
async fn test_counts_add_up_after_every_round() {
    let (tracker, _) = ScriptedTracker::new([
        Shot::Hands(vec![Gesture::Rock, Gesture::Scissors]),
        Shot::Hands(vec![]),
        Shot::Hands(vec![Gesture::Paper, Gesture::Paper]),
        Shot::Hands(vec![Gesture::Scissors, Gesture::Rock]),
        Shot::Hands(vec![Gesture::Rock]),
    ]);
    let mut session = ready_session(human(5), tracker, []).await;

    while !session.is_finished() {
        session.advance().await.expect("round plays");
        let board = session.scoreboard();
        assert_eq!(
            board.score_a + board.score_b + board.ties + board.incomplete,
            board.rounds_played
        );
        assert_eq!(session.round_log().len() as u32, session.current_round());
        assert!(check_session(&session).is_ok());
    }

    let board = session.scoreboard();
    assert_eq!(board.score_a, 1);
    assert_eq!(board.score_b, 1);
    assert_eq!(board.ties, 1);
    assert_eq!(board.incomplete, 2);
    for (i, record) in session.round_log().iter().enumerate() {
        assert_eq!(record.index() as usize, i + 1);
        assert_eq!(record.sequence() as usize, i);
    }
}

#[tokio::test]
async fn test_events_follow_round_phases() {
    let (tx, mut rx) = events::channel();
    let (tracker, _) = ScriptedTracker::single([Gesture::Paper]);
    let mut session = ready_session(computer(1), tracker, [Gesture::Rock])
        .await
        .with_events(tx);

    session.advance().await.expect("round plays");
    drop(session);

    let mut received = Vec::new();
    while let Some(event) = rx.recv().await {
        received.push(event);
    }

    assert_eq!(
        &received[..4],
        &[
            GameEvent::CountdownTick { round: 1, remaining: 3 },
            GameEvent::CountdownTick { round: 1, remaining: 2 },
            GameEvent::CountdownTick { round: 1, remaining: 1 },
            GameEvent::Capturing { round: 1 },
        ]
    );
    match &received[4] {
        GameEvent::RoundSealed {
            record,
            scoreboard,
            summary,
        } => {
            assert_eq!(record.outcome(), Outcome::WinA);
            assert_eq!(scoreboard.score_a, 1);
            assert_eq!(summary, "Ada Wins!");
        }
        other => panic!("expected RoundSealed, got {other:?}"),
    }
    match &received[5] {
        GameEvent::SessionFinished(result) => assert_eq!(result.winner, "Ada"),
        other => panic!("expected SessionFinished, got {other:?}"),
    }
    assert_eq!(received.len(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_play_holds_result_between_rounds() {
    let (tracker, _) = ScriptedTracker::single([Gesture::Rock, Gesture::Rock, Gesture::Rock]);
    let mut session = ready_session(
        computer(3),
        tracker,
        [Gesture::Scissors, Gesture::Scissors, Gesture::Paper],
    )
    .await;

    let started = tokio::time::Instant::now();
    let result = play(&mut session, Duration::from_secs(2)).await.expect("plays");

    // Two holds between three rounds; none after the last.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(4), "held {elapsed:?}");
    assert!(elapsed < Duration::from_secs(6), "held {elapsed:?}");
    assert_eq!((result.score_a, result.score_b), (2, 1));
    assert_eq!(result.winner, "Ada");
}

#[tokio::test]
async fn test_play_returns_partial_result_after_abort() {
    let (tracker, _) = ScriptedTracker::new([Shot::Hands(vec![Gesture::Rock]), Shot::Fail]);
    let mut session = ready_session(computer(3), tracker, [Gesture::Paper]).await;

    let result = play(&mut session, Duration::ZERO).await.expect("partial result");
    assert_eq!(result.rounds_played, 1);
    assert_eq!(result.score_b, 1);
    assert_eq!(result.winner, "Computer");
    assert!(matches!(result.aborted, Some(AbortReason::CaptureFailed(_))));
}
