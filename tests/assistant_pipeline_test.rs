mod common;

use chrono::Duration;
use common::TestApp;
use lesson_assist::domain::models::{estimate_tokens, ChatRole, NewStudentQuestion};
use lesson_assist::domain::ports::QuestionLog;
use lesson_assist::services::prompt::NO_CONTEXT;
use lesson_assist::services::{AskRequest, AssistantError, UsageGate};

const STUDENT: i64 = 7;

async fn app_with_student() -> TestApp {
    let app = TestApp::new().await;
    app.seed_user(STUDENT, "ada").await;
    app
}

async fn log_questions_today(app: &TestApp, count: usize) {
    for i in 0..count {
        app.log
            .record(NewStudentQuestion::new(STUDENT, format!("question {i}"), "answer"))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_ask_with_no_indexed_content() {
    let app = app_with_student().await;
    let assistant = app.assistant(100);

    let response = assistant
        .ask(STUDENT, AskRequest::new("What is Python?"))
        .await
        .unwrap();

    assert!(response.sources.is_empty());
    assert_eq!(response.usage_today, 1);

    let messages = app.model.last_messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, ChatRole::System);
    assert!(messages[0].content.ends_with(NO_CONTEXT));
    assert_eq!(messages[1].role, ChatRole::User);
    assert_eq!(messages[1].content, "What is Python?");
}

#[tokio::test]
async fn test_ask_logs_one_row_with_token_estimates() {
    let app = app_with_student().await;
    app.model.set_reply("Recursion is a function calling itself.");
    let assistant = app.assistant(100);

    assistant
        .ask(STUDENT, AskRequest::new("  What is recursion?  "))
        .await
        .unwrap();

    let logged = app.log.recent(STUDENT, 10).await.unwrap();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].question, "What is recursion?");
    assert_eq!(logged[0].answer, "Recursion is a function calling itself.");
    assert_eq!(
        logged[0].tokens_out,
        estimate_tokens("Recursion is a function calling itself.")
    );

    let system = &app.model.last_messages()[0].content;
    assert_eq!(
        logged[0].tokens_in,
        estimate_tokens(&format!("{system}What is recursion?"))
    );
}

#[tokio::test]
async fn test_sources_carry_lesson_label_and_excerpt() {
    let app = app_with_student().await;
    app.seed_lesson(1, "CS201", "Recursion", "Functions that call themselves.").await;
    let long = format!("recursion base case {}", "x".repeat(300));
    app.store_chunks(1, &[long.as_str()]).await;

    let response = app
        .assistant(100)
        .ask(STUDENT, AskRequest::new("explain the recursion base case"))
        .await
        .unwrap();

    assert_eq!(response.sources.len(), 1);
    assert_eq!(response.sources[0].lesson, "CS201 - Recursion");
    assert_eq!(response.sources[0].excerpt.chars().count(), 153);
    assert!(response.sources[0].excerpt.ends_with("..."));

    let system = &app.model.last_messages()[0].content;
    assert!(system.contains("[From CS201 - Recursion]\nrecursion base case"));
}

#[tokio::test]
async fn test_profile_reaches_the_prompt() {
    let app = app_with_student().await;
    app.seed_lesson(1, "CS101", "Variables", "Names bound to values.").await;
    app.enroll(STUDENT, 1).await;

    app.assistant(100)
        .ask(STUDENT, AskRequest::new("What should I study?"))
        .await
        .unwrap();

    let system = &app.model.last_messages()[0].content;
    assert!(system.contains("ada"));
    assert!(system.contains("CS101"));
}

#[tokio::test]
async fn test_lesson_hint_fills_first_slots() {
    let app = app_with_student().await;
    app.seed_lesson(1, "CS102", "Loops", "Repeating work.").await;
    app.seed_lesson(2, "CS201", "Recursion", "Self reference.").await;
    app.store_chunks(
        1,
        &[
            "for loops iterate over ranges",
            "while loops repeat until false",
            "break exits a loop early",
            "continue skips an iteration",
        ],
    )
    .await;
    app.store_chunks(
        2,
        &[
            "recursion needs a base case",
            "recursion and the call stack",
            "tail recursion explained",
            "recursion versus iteration",
        ],
    )
    .await;

    let response = app
        .assistant(100)
        .ask(STUDENT, AskRequest::new("how does recursion work").for_lesson(1))
        .await
        .unwrap();

    // top_k 5 reserves three slots for the hinted lesson
    assert_eq!(response.sources.len(), 5);
    assert!(response.sources[..3].iter().all(|s| s.lesson == "CS102 - Loops"));
    assert!(response.sources[3..].iter().all(|s| s.lesson == "CS201 - Recursion"));
}

#[tokio::test]
async fn test_quota_denies_at_limit() {
    let app = app_with_student().await;
    log_questions_today(&app, 5).await;
    let assistant = app.assistant(5);

    let err = assistant
        .ask(STUDENT, AskRequest::new("One more?"))
        .await
        .unwrap_err();

    assert!(matches!(err, AssistantError::QuotaExceeded { limit: 5 }));
    assert!(err.to_string().contains('5'));
    assert_eq!(app.model.completion_requests(), 0);
    assert_eq!(app.logged_questions(STUDENT).await, 5);
}

#[tokio::test]
async fn test_quota_admits_below_limit() {
    let app = app_with_student().await;
    log_questions_today(&app, 4).await;

    let response = app
        .assistant(5)
        .ask(STUDENT, AskRequest::new("Last one?"))
        .await
        .unwrap();

    assert_eq!(response.usage_today, 5);
    assert_eq!(app.logged_questions(STUDENT).await, 5);
}

#[tokio::test]
async fn test_yesterdays_questions_do_not_count() {
    let app = app_with_student().await;
    let (start_of_today, _) = UsageGate::day_bounds(UsageGate::today());
    for i in 0..5 {
        app.log
            .record(
                NewStudentQuestion::new(STUDENT, format!("old {i}"), "answer")
                    .recorded_at(start_of_today - Duration::minutes(1 + i)),
            )
            .await
            .unwrap();
    }

    let assistant = app.assistant(5);
    assert_eq!(assistant.usage(STUDENT).await.unwrap().questions_today, 0);

    let response = assistant
        .ask(STUDENT, AskRequest::new("Fresh day?"))
        .await
        .unwrap();
    assert_eq!(response.usage_today, 1);
}

#[tokio::test]
async fn test_empty_message_is_rejected_before_anything_else() {
    let app = app_with_student().await;

    let err = app
        .assistant(100)
        .ask(STUDENT, AskRequest::new("   \n\t"))
        .await
        .unwrap_err();

    assert!(matches!(err, AssistantError::BadInput(_)));
    assert_eq!(err.to_string(), "Message is required");
    assert_eq!(app.model.embed_requests(), 0);
    assert_eq!(app.logged_questions(STUDENT).await, 0);
}

#[tokio::test]
async fn test_unavailable_store_short_circuits() {
    let app = app_with_student().await;
    let assistant = app.assistant_with_store(100, app.unavailable_store());

    let err = assistant
        .ask(STUDENT, AskRequest::new(""))
        .await
        .unwrap_err();
    assert!(matches!(err, AssistantError::ServiceUnavailable(_)));

    let usage = assistant.usage(STUDENT).await.unwrap();
    assert!(!usage.available);
    assert_eq!(usage.questions_today, 0);
    assert_eq!(usage.daily_limit, 100);
    assert!(usage.message.unwrap().contains("sqlite-vec"));
}

#[tokio::test]
async fn test_generation_failure_writes_no_log_row() {
    let app = app_with_student().await;
    app.model.fail_completions(true);

    let err = app
        .assistant(100)
        .ask(STUDENT, AskRequest::new("Will this fail?"))
        .await
        .unwrap_err();

    assert!(matches!(err, AssistantError::GenerationFailed(_)));
    assert_eq!(err.to_string(), "Failed to generate response. Please try again.");
    assert_eq!(app.logged_questions(STUDENT).await, 0);
}

#[tokio::test]
async fn test_embedding_failure_degrades_to_no_context() {
    let app = app_with_student().await;
    app.seed_lesson(1, "CS101", "Variables", "Names bound to values.").await;
    app.store_chunks(1, &["variables hold values"]).await;
    app.model.fail_embeddings(true);

    let response = app
        .assistant(100)
        .ask(STUDENT, AskRequest::new("what are variables"))
        .await
        .unwrap();

    assert!(response.sources.is_empty());
    assert!(app.model.last_messages()[0].content.ends_with(NO_CONTEXT));
    assert_eq!(app.logged_questions(STUDENT).await, 1);
}

#[tokio::test]
async fn test_usage_counts_today() {
    let app = app_with_student().await;
    log_questions_today(&app, 3).await;

    let usage = app.assistant(10).usage(STUDENT).await.unwrap();

    assert!(usage.available);
    assert_eq!(usage.questions_today, 3);
    assert_eq!(usage.daily_limit, 10);
    assert!(usage.message.is_none());
}
