//! Memory agent integration tests.

use mnemos_core::{AgentMode, AgentSettings, ConversationAgent, LongTermContext, MemoryAgent};
use mnemos_llm::{Message, Role};
use mnemos_memory::{Digest, FileLongTermStore, LongTermRecord, LongTermStore};
use mnemos_test_utils::ScriptedLLM;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::tempdir;

fn settings(window_turns: usize) -> AgentSettings {
    AgentSettings::default().with_window_turns(window_turns)
}

/// The third input in a two-turn window folds the first turn into the digest.
#[tokio::test]
async fn third_turn_compresses_first_turn() {
    let llm = Arc::new(ScriptedLLM::with_replies(["A1", "A2", "- User opened with U1", "A3"]));
    let mut agent = MemoryAgent::new(llm.clone(), settings(2));

    agent.respond("U1").await.expect("turn 1");
    agent.respond("U2").await.expect("turn 2");
    let report = agent.respond("U3").await.expect("turn 3");

    assert!(report.compressed);
    assert_eq!(report.reply, "A3");
    let requests = llm.requests.lock().clone();
    assert_eq!(requests.len(), 4);

    let summary_request = &requests[2];
    assert!(
        summary_request.messages[1]
            .content()
            .ends_with("NEW TURNS TO INCORPORATE:\nUser: U1\nAssistant: A1")
    );

    let chat_request = &requests[3];
    assert_eq!(chat_request.messages[0].role(), Role::System);
    assert!(
        chat_request.messages[0]
            .content()
            .contains("- User opened with U1")
    );
    assert_eq!(
        &chat_request.messages[1..],
        &[
            Message::user("U2"),
            Message::assistant("A2"),
            Message::user("U3"),
        ]
    );
    assert_eq!(
        agent.session().turns.messages(),
        &[
            Message::user("U2"),
            Message::assistant("A2"),
            Message::user("U3"),
            Message::assistant("A3"),
        ]
    );
    assert_eq!(agent.session().transcript.len(), 6);
    assert_eq!(
        agent.session().digest,
        Some(Digest::Bullets(vec!["User opened with U1".to_string()]))
    );
}

/// Facts learned in one session show up in the next session's prompt.
#[tokio::test]
async fn long_term_memory_carries_across_sessions() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("memories").join("user_memories.json");
    let store: Arc<dyn LongTermStore> = Arc::new(FileLongTermStore::new(&path));

    let llm = Arc::new(ScriptedLLM::with_replies([
        "Nice to meet you, Ana.",
        r#"{"facts": ["Works as a nurse"], "preferences": []}"#,
    ]));
    let context = LongTermContext::load(llm.clone(), &settings(4), store.clone(), "Ana")
        .await
        .expect("context");
    let mut agent = MemoryAgent::new(llm.clone(), settings(4)).with_long_term(context);
    assert_eq!(agent.mode(), AgentMode::LongTerm);

    agent
        .respond("Hi, I'm Ana and I work as a nurse.")
        .await
        .expect("turn");
    let first_prompt = llm.requests.lock()[0].messages[0]
        .content()
        .to_string();
    assert!(first_prompt.contains("(No long-term memory yet for this user)"));

    let saved = agent.finish().await.expect("finish").expect("saved");
    assert_eq!(saved.facts, vec!["Works as a nurse".to_string()]);
    assert_eq!(store.identities().await.expect("ids"), vec!["ana"]);

    let llm = Arc::new(ScriptedLLM::with_replies(["You're a nurse."]));
    let context = LongTermContext::load(llm.clone(), &settings(4), store.clone(), " ANA ")
        .await
        .expect("context");
    assert_eq!(context.identity(), "ana");
    let mut agent = MemoryAgent::new(llm.clone(), settings(4)).with_long_term(context);
    agent.respond("What do I do?").await.expect("turn");

    let prompt = llm.last_request().expect("request").messages[0]
        .content()
        .to_string();
    assert!(prompt.contains("Facts about this user:\n- Works as a nurse"));
}

/// A failed extraction never touches the stored record.
#[tokio::test]
async fn failed_extraction_keeps_stored_record() {
    let temp = tempdir().expect("tempdir");
    let store: Arc<dyn LongTermStore> =
        Arc::new(FileLongTermStore::new(temp.path().join("user_memories.json")));
    let existing = LongTermRecord::new(vec!["Has a cat".to_string()], Vec::new());
    store.save("bo", &existing).await.expect("seed");

    let llm = Arc::new(ScriptedLLM::with_replies(["Hello Bo", "this is not json"]));
    let context = LongTermContext::load(llm.clone(), &settings(4), store.clone(), "bo")
        .await
        .expect("context");
    let mut agent = MemoryAgent::new(llm, settings(4)).with_long_term(context);
    agent.respond("hello").await.expect("turn");

    assert_eq!(agent.finish().await.expect("finish"), None);
    assert_eq!(store.load("bo").await.expect("load"), existing);
}

/// Sessions with no exchanged messages skip extraction entirely.
#[tokio::test]
async fn empty_session_skips_extraction() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("user_memories.json");
    let store: Arc<dyn LongTermStore> = Arc::new(FileLongTermStore::new(&path));
    let llm = Arc::new(ScriptedLLM::new());
    let context = LongTermContext::load(llm.clone(), &settings(4), store, "ana")
        .await
        .expect("context");
    let mut agent = MemoryAgent::new(llm.clone(), settings(4)).with_long_term(context);

    assert_eq!(agent.finish().await.expect("finish"), None);
    assert_eq!(llm.request_count(), 0);
    assert!(!path.exists());
}

/// Lowering the item budget never rewrites items that are already stored.
#[tokio::test]
async fn tighter_item_budget_keeps_stored_items() {
    let temp = tempdir().expect("tempdir");
    let store: Arc<dyn LongTermStore> =
        Arc::new(FileLongTermStore::new(temp.path().join("user_memories.json")));
    let existing = LongTermRecord::new(
        vec!["Has a cat".to_string()],
        vec!["Likes tea".to_string()],
    );
    store.save("bo", &existing).await.expect("seed");

    let mut settings = settings(4);
    settings.extraction.max_item_chars = 3;
    let llm = Arc::new(ScriptedLLM::with_replies([
        "Hello Bo",
        r#"{"facts": [], "preferences": []}"#,
    ]));
    let context = LongTermContext::load(llm.clone(), &settings, store.clone(), "bo")
        .await
        .expect("context");
    let mut agent = MemoryAgent::new(llm, settings).with_long_term(context);
    agent.respond("hello").await.expect("turn");

    let saved = agent.finish().await.expect("finish").expect("saved");
    assert_eq!(saved.facts, existing.facts);
    assert_eq!(saved.preferences, existing.preferences);
    assert_eq!(store.load("bo").await.expect("load").facts, existing.facts);
}
