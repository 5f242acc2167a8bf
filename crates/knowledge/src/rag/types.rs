//! RAG response types.

use serde::{Deserialize, Serialize};

/// One retrieved post used as grounding for an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagSourceRef {
    /// Record id of the post
    pub id: String,

    /// Post timestamp, when the archive had one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Status URL, when the archive had one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Cosine distance to the query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,

    /// Short preview of the post text
    pub snippet: String,
}

/// Response from a RAG answering query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResponse {
    pub query: String,

    /// Generated answer, or the user-visible generation error
    pub answer: String,

    /// Full text of the retrieved posts, nearest first
    pub documents: Vec<String>,

    /// Retrieved posts as source references, aligned with `documents`
    pub sources: Vec<RagSourceRef>,

    /// Whether `answer` is an error message rather than generated text
    #[serde(default)]
    pub generation_failed: bool,
}

impl RagResponse {
    /// Create a response carrying a generated answer.
    pub fn new(
        query: impl Into<String>,
        answer: String,
        documents: Vec<String>,
        sources: Vec<RagSourceRef>,
    ) -> Self {
        Self {
            query: query.into(),
            answer,
            documents,
            sources,
            generation_failed: false,
        }
    }

    /// Create a response for a failed generation call. Retrieved posts are
    /// kept so the caller can still show them.
    pub fn generation_error(
        query: impl Into<String>,
        error: &str,
        documents: Vec<String>,
        sources: Vec<RagSourceRef>,
    ) -> Self {
        Self {
            query: query.into(),
            answer: format!("Error generating response: {}", error),
            documents,
            sources,
            generation_failed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_response() {
        let response = RagResponse::generation_error(
            "what?",
            "connection refused",
            vec!["a post".to_string()],
            Vec::new(),
        );

        assert!(response.generation_failed);
        assert_eq!(response.answer, "Error generating response: connection refused");
        assert_eq!(response.documents.len(), 1);
    }

    #[test]
    fn test_source_ref_skips_absent_fields() {
        let source = RagSourceRef {
            id: "md_0".to_string(),
            timestamp: None,
            url: None,
            distance: Some(0.25),
            snippet: "hello".to_string(),
        };

        let json = serde_json::to_value(&source).unwrap();
        assert!(json.get("url").is_none());
        assert_eq!(json["distance"], 0.25);
    }
}
