//! End-to-end query scenarios through `RagSystem`.

use super::fixtures::{empty_store, mcp_store, sample_store, MCP_TITLE, SAMPLE_COURSE_DOC};
use crate::rag::{create_generator, GenerationSettings, RagSystem};
use crate::store::SemanticStore;
use lectern_core::RagSettings;
use lectern_llm::{ChatResponse, ContentBlock, LlmUsage, MockClient, StopReason};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn system(store: Arc<dyn SemanticStore>, client: Arc<MockClient>) -> RagSystem {
    let generator = create_generator(client, GenerationSettings::new("mock", 800), None).unwrap();
    RagSystem::new(store, generator, RagSettings::default())
}

fn search_request(input: serde_json::Value) -> ChatResponse {
    ChatResponse {
        content: vec![ContentBlock::ToolUse {
            id: "toolu_1".to_string(),
            name: "search_course_content".to_string(),
            input,
        }],
        model: "mock".to_string(),
        stop_reason: StopReason::ToolUse,
        usage: LlmUsage::default(),
    }
}

#[tokio::test]
async fn test_native_query_with_citations() {
    let client = Arc::new(MockClient::native());
    client
        .push(Ok(search_request(
            json!({"query": "What is MCP?", "course_name": "MCP"}),
        )))
        .push_text("MCP is the Model Context Protocol.");

    let rag = system(mcp_store().await, client.clone());
    let response = rag.query("What is MCP?", None).await.unwrap();

    assert_eq!(response.answer, "MCP is the Model Context Protocol.");
    assert_eq!(client.call_count(), 2);
    assert!(!response.session_id.is_empty());
    assert!(!response.sources.is_empty());
    assert!(response.sources.len() <= 5);
    assert!(response.sources.iter().all(|s| s.starts_with(MCP_TITLE)));
}

#[tokio::test]
async fn test_citations_reset_between_turns() {
    let client = Arc::new(MockClient::native());
    client
        .push(Ok(search_request(json!({"query": "MCP servers"}))))
        .push_text("Servers expose tools.")
        .push_text("You're welcome.");

    let rag = system(mcp_store().await, client.clone());
    let first = rag.query("What do MCP servers do?", None).await.unwrap();
    assert!(!first.sources.is_empty());

    let second = rag
        .query("Thanks!", Some(&first.session_id))
        .await
        .unwrap();
    assert_eq!(second.session_id, first.session_id);
    assert!(second.sources.is_empty());

    let system_prompt = client.requests()[2].system.clone().unwrap();
    assert!(system_prompt
        .contains("Previous conversation:\nUser: What do MCP servers do?\nAssistant: Servers expose tools."));
}

#[tokio::test]
async fn test_history_keeps_last_exchanges() {
    let client = Arc::new(MockClient::native());
    for answer in ["a1", "a2", "a3", "a4"] {
        client.push_text(answer);
    }

    let rag = system(mcp_store().await, client.clone());
    let session = rag.create_session();
    for question in ["q1", "q2", "q3", "q4"] {
        rag.query(question, Some(&session)).await.unwrap();
    }

    let system_prompt = client.requests()[3].system.clone().unwrap();
    assert!(!system_prompt.contains("User: q1"));
    assert!(system_prompt.contains("User: q2\nAssistant: a2\nUser: q3\nAssistant: a3"));
}

#[tokio::test]
async fn test_emulated_query_single_call() {
    let client = Arc::new(MockClient::emulated());
    client.push_text("Lesson 1 covers tools and resources.");

    let rag = system(mcp_store().await, client.clone());
    let response = rag
        .query("What is covered in lesson 1 of the MCP course?", None)
        .await
        .unwrap();

    assert_eq!(client.call_count(), 1);
    assert_eq!(
        response.sources,
        vec![
            "Introduction to MCP - Lesson 1".to_string(),
            "Introduction to MCP - Lesson 1".to_string()
        ]
    );
}

#[tokio::test]
async fn test_empty_store_scenario() {
    let client = Arc::new(MockClient::native());
    client
        .push(Ok(search_request(json!({"query": "What is MCP?"}))))
        .push_text("MCP is a protocol for connecting models to tools.")
        .push(Ok(search_request(
            json!({"query": "What is MCP?", "course_name": "MCP"}),
        )))
        .push_text("I don't know that course.");

    let rag = system(empty_store(), client.clone());

    let response = rag.query("What is MCP?", None).await.unwrap();
    assert_eq!(
        response.answer,
        "MCP is a protocol for connecting models to tools."
    );
    assert!(response.sources.is_empty());

    let tool_result = &client.requests()[1].messages[2].content[0];
    match tool_result {
        ContentBlock::ToolResult { content, .. } => {
            assert_eq!(content, "No relevant content found");
        }
        other => panic!("Expected tool result, got {:?}", other),
    }

    let response = rag.query("What is MCP?", None).await.unwrap();
    assert!(response.sources.is_empty());
    match &client.requests()[3].messages[2].content[0] {
        ContentBlock::ToolResult { content, is_error, .. } => {
            assert_eq!(content, "No course found matching 'MCP'");
            assert!(is_error);
        }
        other => panic!("Expected tool result, got {:?}", other),
    }

    let analytics = rag.get_analytics().await.unwrap();
    assert_eq!(analytics.total_courses, 0);
    assert!(analytics.course_titles.is_empty());
}

#[tokio::test]
async fn test_analytics_idempotent() {
    let rag = system(sample_store().await, Arc::new(MockClient::native()));

    let first = rag.get_analytics().await.unwrap();
    let second = rag.get_analytics().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.total_courses, 2);
    assert_eq!(
        first.course_titles,
        vec![
            "Introduction to MCP".to_string(),
            "Building with Anthropic Claude".to_string()
        ]
    );
}

#[tokio::test]
async fn test_concurrent_turns_keep_citations_apart() {
    let client = Arc::new(MockClient::emulated());
    let rag = Arc::new(system(sample_store().await, client));

    let (mcp, claude) = tokio::join!(
        rag.query("What is covered in lesson 2 of the MCP course?", None),
        rag.query("Tell me about lesson 1 of the Claude course", None),
    );

    let mcp = mcp.unwrap();
    let claude = claude.unwrap();
    assert_ne!(mcp.session_id, claude.session_id);
    assert_eq!(mcp.sources, vec!["Introduction to MCP - Lesson 2".to_string()]);
    assert_eq!(
        claude.sources,
        vec!["Building with Anthropic Claude - Lesson 1".to_string()]
    );
    assert!(mcp.answer.starts_with("Mock response to:"));
}

#[tokio::test]
async fn test_ingest_then_query() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("course1_script.txt"), SAMPLE_COURSE_DOC).unwrap();

    let client = Arc::new(MockClient::emulated());
    client.push_text("Streaming and pagination.");

    let rag = system(empty_store(), client.clone());
    let stats = rag.add_course_folder(temp.path(), false).await.unwrap();
    assert_eq!(stats.courses_added, 1);
    assert_eq!(stats.fragments_added, 3);

    let outline = rag.course_outline("mcp").await;
    assert!(outline.is_found());
    assert!(outline.content.contains("Total Lessons: 3"));
    assert!(outline.content.contains("Lesson 0: Getting Started"));

    let response = rag
        .query("What advanced topics does lesson 2 of the MCP course cover?", None)
        .await
        .unwrap();
    assert_eq!(response.sources, vec!["Introduction to MCP - Lesson 2".to_string()]);

    let system_prompt = client.requests()[0].system.clone().unwrap();
    assert!(system_prompt.contains("Lesson 2 content: Advanced MCP features"));
}
