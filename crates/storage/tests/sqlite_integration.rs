use sqlx::Row;
use storage::repository::{QUESTION_BANK_KEY, QuestionBankRepository};
use storage::sqlite::SqliteRepository;
use trivia_core::model::{AuthoredQuestion, Difficulty, QuestionId, QuestionRecord};

fn build_question(id: u64, text: &str) -> AuthoredQuestion {
    let record = QuestionRecord::new(
        text,
        "correct",
        vec!["wrong one".into(), "wrong two".into(), "wrong three".into()],
        "General Knowledge",
        Difficulty::Easy,
    )
    .unwrap();
    AuthoredQuestion::new(QuestionId::new(id), record)
}

#[tokio::test]
async fn absent_key_reads_as_empty_bank() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_absent?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let bank = repo.load_bank().await.unwrap();
    assert!(bank.is_empty());
}

#[tokio::test]
async fn bank_round_trips_through_kv_row() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let bank = vec![
        build_question(1_714_521_600_000, "First question?"),
        build_question(1_714_521_600_001, "Second question?"),
    ];
    repo.replace_bank(&bank).await.unwrap();

    let loaded = repo.load_bank().await.unwrap();
    assert_eq!(loaded, bank);
}

#[tokio::test]
async fn replace_rewrites_the_single_value_in_full() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_rewrite?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.replace_bank(&[
        build_question(1, "Keep me?"),
        build_question(2, "Drop me?"),
    ])
    .await
    .unwrap();
    repo.replace_bank(&[build_question(1, "Keep me?")])
        .await
        .unwrap();

    let loaded = repo.load_bank().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id(), QuestionId::new(1));

    // Exactly one row under the fixed key, holding the whole bank as JSON.
    let rows = sqlx::query("SELECT key, value FROM kv_store")
        .fetch_all(repo.pool())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    let key: String = rows[0].try_get("key").unwrap();
    let value: String = rows[0].try_get("value").unwrap();
    assert_eq!(key, QUESTION_BANK_KEY);
    assert!(value.contains("\"correctAnswer\":\"correct\""));
}

#[tokio::test]
async fn migrate_is_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    repo.replace_bank(&[build_question(1, "Still here?")])
        .await
        .unwrap();
    assert_eq!(repo.load_bank().await.unwrap().len(), 1);
}
