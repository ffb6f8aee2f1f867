use super::*;

fn question(correct: usize) -> QuizQuestion {
    QuizQuestion {
        question: format!("Which is option {}?", correct),
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct_answer: correct,
        explanation: "It is.".into(),
    }
}

fn five_questions() -> Vec<QuizQuestion> {
    vec![question(0), question(1), question(2), question(3), question(0)]
}

// Answers each question with the given option and returns the completion score.
fn run(session: &mut QuizSession, answers: &[usize]) -> Option<u32> {
    let mut result = None;
    for &a in answers {
        session.select(a).unwrap();
        result = session.advance().unwrap();
    }
    result
}

#[test]
fn test_empty_quiz_is_refused() {
    assert_eq!(QuizSession::new(Vec::new()).unwrap_err(), QuizError::NoQuestions);
}

#[test]
fn test_new_session_starts_at_first_question() {
    let session = QuizSession::new(five_questions()).unwrap();
    assert_eq!(session.state(), QuizState::Answering { index: 0 });
    assert_eq!(session.correct_so_far(), 0);
    assert_eq!(session.progress_percent(), 0);
    assert_eq!(session.current_question().unwrap().correct_answer, 0);
}

#[test]
fn test_all_correct_scores_100() {
    let mut session = QuizSession::new(five_questions()).unwrap();
    assert_eq!(run(&mut session, &[0, 1, 2, 3, 0]), Some(100));
    assert_eq!(session.state(), QuizState::Completed { score_percent: 100 });
}

#[test]
fn test_none_correct_scores_0() {
    let mut session = QuizSession::new(five_questions()).unwrap();
    assert_eq!(run(&mut session, &[1, 2, 3, 0, 1]), Some(0));
}

#[test]
fn test_three_of_five_scores_60() {
    let mut session = QuizSession::new(five_questions()).unwrap();
    assert_eq!(run(&mut session, &[0, 1, 2, 0, 1]), Some(60));
}

#[test]
fn test_first_answer_wins() {
    let mut session = QuizSession::new(five_questions()).unwrap();
    assert_eq!(session.select(3), Ok(true));
    assert_eq!(session.select(0), Ok(false));
    assert_eq!(session.state(), QuizState::Revealed { index: 0, chosen: 3 });

    session.advance().unwrap();
    assert_eq!(session.correct_so_far(), 0);
    assert_eq!(session.state(), QuizState::Answering { index: 1 });
}

#[test]
fn test_advance_requires_an_answer() {
    let mut session = QuizSession::new(five_questions()).unwrap();
    assert_eq!(session.advance(), Err(QuizError::NotAnswered));
}

#[test]
fn test_invalid_option_is_rejected() {
    let mut session = QuizSession::new(five_questions()).unwrap();
    assert_eq!(session.select(4), Err(QuizError::InvalidOption(4)));
    assert_eq!(session.state(), QuizState::Answering { index: 0 });
}

#[test]
fn test_completion_is_reported_once() {
    let mut session = QuizSession::new(vec![question(2)]).unwrap();
    session.select(2).unwrap();
    assert_eq!(session.advance(), Ok(Some(100)));
    assert_eq!(session.advance(), Err(QuizError::AlreadyCompleted));
    assert_eq!(session.select(1), Err(QuizError::AlreadyCompleted));
    assert!(session.current_question().is_none());
    assert_eq!(session.progress_percent(), 100);
}

#[test]
fn test_retry_resets_the_attempt() {
    let mut session = QuizSession::new(five_questions()).unwrap();
    assert_eq!(session.retry(), Err(QuizError::NotCompleted));

    run(&mut session, &[0, 1, 2, 3, 0]);
    session.retry().unwrap();
    assert_eq!(session.state(), QuizState::Answering { index: 0 });
    assert_eq!(session.correct_so_far(), 0);

    assert_eq!(run(&mut session, &[0, 0, 0, 0, 0]), Some(40));
}

#[test]
fn test_progress_tracks_position() {
    let mut session = QuizSession::new(five_questions()).unwrap();
    session.select(0).unwrap();
    session.advance().unwrap();
    session.select(0).unwrap();
    assert_eq!(session.progress_percent(), 20);
}

#[test]
fn test_score_rounding() {
    assert_eq!(score_percent(1, 3), 33);
    assert_eq!(score_percent(2, 3), 67);
    assert_eq!(score_percent(1, 8), 13);
    assert_eq!(score_percent(0, 0), 0);
}

#[test]
fn test_state_serializes_with_tag() {
    let json = serde_json::to_value(QuizState::Completed { score_percent: 80 }).unwrap();
    assert_eq!(json, serde_json::json!({"state": "completed", "scorePercent": 80}));
}
