use std::sync::Arc;

use chrono::Duration;

use backend::InMemoryGateway;
use services::{
    Clock, ConjugationDrillService, DrillError, DrillPhase, TickOutcome, WordDrillService,
};
use vocab_core::model::{
    Conjugation, ConjugationDraft, ConjugationDrillConfig, ConjugationId, DirectionChoice,
    PronominalFilter, VerbFilter, VerbGroup, Word, WordDraft, WordDrillConfig, WordId,
};
use vocab_core::time::fixed_now;

fn word(id: u64, word: &str, translation: &str) -> Word {
    WordDraft {
        word: word.into(),
        translations: vec![translation.into()],
        part_of_speech: None,
        article: None,
    }
    .validate(WordId::new(id))
    .unwrap()
}

fn conjugation(id: u64, tense: &str, irregular: bool) -> Conjugation {
    ConjugationDraft {
        verb: "parler".into(),
        person: "je".into(),
        tense: tense.into(),
        conjugation: "parle".into(),
        irregular,
        pronominal: false,
        group: 1,
    }
    .validate(ConjugationId::new(id))
    .unwrap()
}

fn seeded_gateway(words: u64) -> InMemoryGateway {
    let gateway = InMemoryGateway::new();
    gateway.seed_words(
        (1..=words)
            .map(|i| word(i, &format!("mot{i}"), &format!("word{i}")))
            .collect(),
    );
    gateway
}

fn word_config(limit: u32) -> WordDrillConfig {
    WordDrillConfig::new(limit, DirectionChoice::SourceToTarget, false, false).unwrap()
}

#[tokio::test]
async fn full_graded_run_reports_exactly_once() {
    let gateway = seeded_gateway(5);
    let service = WordDrillService::new(Clock::fixed(fixed_now()), Arc::new(gateway.clone()));
    let config = word_config(120);

    let mut session = service.start(&config).await.unwrap();
    let mut now = fixed_now();
    for i in 1..=5 {
        now += Duration::seconds(10);
        session.submit(&format!("word{i}"), now).unwrap();
    }

    // Finished by exhaustion well inside the limit.
    assert_eq!(session.phase(), DrillPhase::Ended);
    assert!(session.remaining_secs() > 0);

    assert!(service.report_if_ended(&mut session, &config).await.unwrap());
    // Duplicate trigger: the latch suppresses a second delivery.
    assert!(!service.report_if_ended(&mut session, &config).await.unwrap());

    let reports = gateway.word_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].total_attempts, 5);
    assert_eq!(reports[0].correct, 5);
    assert_eq!(reports[0].results.len(), 5);
}

#[tokio::test]
async fn no_report_before_the_session_ends() {
    let gateway = seeded_gateway(3);
    let service = WordDrillService::new(Clock::fixed(fixed_now()), Arc::new(gateway.clone()));
    let config = word_config(120);

    let mut session = service.start(&config).await.unwrap();
    session.submit("word1", fixed_now() + Duration::seconds(5)).unwrap();

    assert!(!service.report_if_ended(&mut session, &config).await.unwrap());
    assert!(gateway.word_reports().is_empty());
}

#[tokio::test]
async fn timer_expiry_reports_the_partial_log() {
    let gateway = seeded_gateway(5);
    let service = WordDrillService::new(Clock::fixed(fixed_now()), Arc::new(gateway.clone()));
    let config = word_config(60);

    let mut session = service.start(&config).await.unwrap();
    session.submit("word1", fixed_now() + Duration::seconds(10)).unwrap();
    session.submit("word2", fixed_now() + Duration::seconds(25)).unwrap();

    assert_eq!(
        session.on_tick(fixed_now() + Duration::seconds(60)),
        TickOutcome::Expired
    );
    assert_eq!(session.phase(), DrillPhase::Ended);

    assert!(service.report_if_ended(&mut session, &config).await.unwrap());
    let reports = gateway.word_reports();
    assert_eq!(reports.len(), 1);
    // The item on screen at expiry was discarded, never force-submitted.
    assert_eq!(reports[0].results.len(), 2);
}

#[tokio::test]
async fn failed_report_keeps_summary_and_can_be_retried() {
    let gateway = seeded_gateway(1);
    let service = WordDrillService::new(Clock::fixed(fixed_now()), Arc::new(gateway.clone()));
    let config = word_config(120);

    let mut session = service.start(&config).await.unwrap();
    session.submit("word1", fixed_now() + Duration::seconds(3)).unwrap();

    gateway.set_fail_reports(true);
    let err = service.report_if_ended(&mut session, &config).await.unwrap_err();
    assert!(matches!(err, DrillError::Backend(_)));

    // The summary is local state; a failed report does not touch it.
    let summary = session.summary().unwrap();
    assert_eq!(summary.attempts(), 1);
    assert!(!session.reported());

    gateway.set_fail_reports(false);
    assert!(service.report_if_ended(&mut session, &config).await.unwrap());
    assert_eq!(gateway.word_reports().len(), 1);
}

#[tokio::test]
async fn empty_queue_refuses_to_start() {
    let gateway = InMemoryGateway::new();
    let service = WordDrillService::new(Clock::fixed(fixed_now()), Arc::new(gateway));
    let err = service.start(&word_config(120)).await.unwrap_err();
    assert!(matches!(err, DrillError::EmptyQueue));
}

#[tokio::test]
async fn fetch_failure_is_recoverable() {
    let gateway = seeded_gateway(2);
    gateway.set_fail_fetch(true);
    let service = WordDrillService::new(Clock::fixed(fixed_now()), Arc::new(gateway.clone()));

    let err = service.start(&word_config(120)).await.unwrap_err();
    assert!(matches!(err, DrillError::Backend(_)));

    // Manual retry after the transient failure clears.
    gateway.set_fail_fetch(false);
    let session = service.start(&word_config(120)).await.unwrap();
    assert_eq!(session.phase(), DrillPhase::Active);
}

#[tokio::test]
async fn ungraded_run_logs_matches_only() {
    let gateway = seeded_gateway(2);
    let service = WordDrillService::new(Clock::fixed(fixed_now()), Arc::new(gateway.clone()));
    let config = WordDrillConfig::new(120, DirectionChoice::SourceToTarget, true, false).unwrap();

    let mut session = service.start(&config).await.unwrap();
    let t = fixed_now() + Duration::seconds(2);
    session.update_input("w", t).unwrap();
    session.update_input("word", t).unwrap();
    session.update_input("word1", t).unwrap();
    session.update_input("word2", t + Duration::seconds(1)).unwrap();

    assert_eq!(session.phase(), DrillPhase::Ended);
    assert_eq!(session.attempts(), session.correct_count());

    service.report_if_ended(&mut session, &config).await.unwrap();
    let reports = gateway.word_reports();
    assert_eq!(reports[0].total_attempts, 2);
    assert!(reports[0].results.iter().all(|r| r.correct));
}

#[tokio::test]
async fn conjugation_run_honors_filters_and_reports_once() {
    let gateway = InMemoryGateway::new();
    gateway.seed_conjugations(vec![
        conjugation(1, "présent", false),
        conjugation(2, "imparfait", false),
        conjugation(3, "présent", true),
    ]);
    let service =
        ConjugationDrillService::new(Clock::fixed(fixed_now()), Arc::new(gateway.clone()));
    let config = ConjugationDrillConfig::new(
        120,
        VerbFilter::Regular,
        Some(vec!["présent".into()]),
        Some(vec![VerbGroup::new(1).unwrap()]),
        PronominalFilter::Both,
        false,
        false,
    )
    .unwrap();

    let mut session = service.start(&config).await.unwrap();
    assert_eq!(session.total_items(), 1);
    assert_eq!(session.current_item().unwrap().tag(), Some("présent"));

    session.submit("parle", fixed_now() + Duration::seconds(4)).unwrap();
    assert_eq!(session.phase(), DrillPhase::Ended);

    assert!(service.report_if_ended(&mut session, &config).await.unwrap());
    assert!(!service.report_if_ended(&mut session, &config).await.unwrap());

    let reports = gateway.conjugation_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].correct, 1);
    assert_eq!(reports[0].config.tenses().unwrap(), ["présent"]);
}

#[tokio::test]
async fn over_filtered_conjugation_queue_is_empty() {
    let gateway = InMemoryGateway::new();
    gateway.seed_conjugations(vec![conjugation(1, "présent", false)]);
    let service = ConjugationDrillService::new(Clock::fixed(fixed_now()), Arc::new(gateway));
    let config = ConjugationDrillConfig::new(
        120,
        VerbFilter::Irregular,
        Some(vec!["imparfait".into()]),
        None,
        PronominalFilter::Both,
        false,
        false,
    )
    .unwrap();

    let err = service.start(&config).await.unwrap_err();
    assert!(matches!(err, DrillError::EmptyQueue));
}
