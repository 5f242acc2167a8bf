//! RAG answering orchestration.
//!
//! Retrieves the posts nearest to a question and asks the generation model to
//! answer from them. The generation call is made exactly once, even when
//! nothing was retrieved; a failure becomes the answer text instead of an
//! error.

use crate::embeddings::EmbeddingProvider;
use crate::rag::search::search;
use crate::rag::types::{RagResponse, RagSourceRef};
use crate::types::SearchResult;
use crate::vector_index::VectorIndex;
use tweetrag_core::{AppError, AppResult};
use tweetrag_llm::{LlmClient, LlmRequest};

/// Maximum snippet length (in characters) for source references.
pub const MAX_SNIPPET_LENGTH: usize = 100;

/// Retrieve `k` posts for `query` and generate an answer grounded in them.
///
/// # Errors
/// Retrieval failures propagate. Generation failures do not: they produce a
/// response with `generation_failed` set.
pub async fn ask(
    index: &dyn VectorIndex,
    embedder: &dyn EmbeddingProvider,
    llm: &dyn LlmClient,
    generation_model: &str,
    query: &str,
    k: usize,
) -> AppResult<RagResponse> {
    let retrieved = search(index, embedder, query, k).await?;

    if retrieved.documents.is_empty() {
        tracing::info!("No posts retrieved, generating without context");
    }

    let sources = map_to_sources(&retrieved);
    let documents = retrieved.documents;

    tracing::info!(
        retrieved = documents.len(),
        model = generation_model,
        "Generating answer"
    );

    match generate_answer(llm, generation_model, query, &documents).await {
        Ok(answer) => Ok(RagResponse::new(query, answer, documents, sources)),
        Err(e) => {
            tracing::warn!(error = %e, "Generation failed");
            let message = match e {
                AppError::Generation(message) => message,
                other => other.to_string(),
            };
            Ok(RagResponse::generation_error(query, &message, documents, sources))
        }
    }
}

/// Build the grounding prompt: one bulleted line per post, then the question.
pub fn build_prompt(query: &str, documents: &[String]) -> String {
    let context = documents
        .iter()
        .map(|doc| format!("- {}", doc))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Based on the following tweets:\n\n{}\n\n\
         Please respond to this question: {}\n\n\
         Use the information from the tweets to provide a relevant and helpful response.",
        context, query
    )
}

async fn generate_answer(
    llm: &dyn LlmClient,
    model: &str,
    query: &str,
    documents: &[String],
) -> AppResult<String> {
    let request = LlmRequest::new(build_prompt(query, documents), model);

    let response = llm
        .complete(&request)
        .await
        .map_err(|e| match e {
            AppError::Llm(message) => AppError::Generation(message),
            other => AppError::Generation(other.to_string()),
        })?;

    Ok(response.content)
}

fn map_to_sources(result: &SearchResult) -> Vec<RagSourceRef> {
    let metadatas = result.metadatas.as_deref().unwrap_or_default();
    let distances = result.distances.as_deref().unwrap_or_default();

    result
        .documents
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            let metadata = metadatas.get(i);
            RagSourceRef {
                id: metadata.map(|m| m.id.clone()).unwrap_or_default(),
                timestamp: metadata.and_then(|m| m.timestamp.clone()),
                url: metadata.and_then(|m| m.url.clone()),
                distance: distances.get(i).copied(),
                snippet: truncate_snippet(doc, MAX_SNIPPET_LENGTH),
            }
        })
        .collect()
}

/// Truncate to at most `max_chars` characters, appending "..." when cut.
pub fn truncate_snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((end, _)) => format!("{}...", &text[..end]),
    }
}
