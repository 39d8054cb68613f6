//! Assistant prompt assembly

use crate::retrieval::RetrievalResult;

/// Truncate to `max_chars` characters, marking the cut with `...`
fn truncate_content(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

/// Render the assistant prompt for `query` around the retrieved documents.
///
/// Each document's full content is cut to `max_content_length` characters
/// before the results are embedded as pretty-printed JSON.
pub fn build_prompt(
    persona: &str,
    query: &str,
    results: &[RetrievalResult],
    max_content_length: usize,
) -> String {
    let truncated: Vec<RetrievalResult> = results
        .iter()
        .cloned()
        .map(|mut result| {
            result.full_document_content =
                truncate_content(&result.full_document_content, max_content_length);
            result
        })
        .collect();
    let retrieval = serde_json::to_string_pretty(&truncated).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"You are an AI assistant impersonating {persona}, the AI/ML and software engineer.
You will be asked about my portfolio and your job is to answer as if you were me answering a visitor's question about it.
Answer concisely in one short paragraph in a chat format. Keep the tone informal so the user feels they are talking to a human.

REALLY IMPORTANT => Do not answer if the question is not related to my portfolio.

Here's the user prompt:
<user_prompt>
{query}
</user_prompt>

Use the retrieved information only if it helps answer the question.
If the question does not need specific information, ignore the retrieval context below.
Make sure you mention the project where the information was found!

This is the retrieval JSON schema:
[
  {{
    "document_name": "<document_filename>",
    "type": "<project_details or code>",
    "cosine_sentence_score": [
      {{ "score": <the_score:float>, "sentence": "<the sentence:string>" }},
      ... (top sentences)
    ],
    "full_document_content": "<full text/json content>"
  }},
  ... (other documents)
]
Rely on the highest scoring documents first.

Here is the result of the cosine similarity search:
<retrieval>
{retrieval}
</retrieval>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::{DocumentKind, ScoredSentence};

    fn result(content: &str) -> RetrievalResult {
        RetrievalResult {
            document_name: "demo.txt".to_string(),
            kind: DocumentKind::Code,
            cosine_sentence_score: vec![ScoredSentence {
                score: 0.91,
                sentence: "It parses trees.".to_string(),
            }],
            full_document_content: content.to_string(),
        }
    }

    #[test]
    fn test_truncate_content() {
        assert_eq!(truncate_content("abcdef", 3), "abc...");
        assert_eq!(truncate_content("abc", 3), "abc");
        assert_eq!(truncate_content("ééé", 2), "éé...");
    }

    #[test]
    fn test_prompt_embeds_query_persona_and_truncated_results() {
        let long = "x".repeat(1500);
        let prompt = build_prompt("Jane Doe", "What is repograph?", &[result(&long)], 1000);

        assert!(prompt.starts_with("You are an AI assistant impersonating Jane Doe"));
        assert!(prompt.contains("<user_prompt>\nWhat is repograph?\n</user_prompt>"));
        assert!(prompt.contains("\"document_name\": \"demo.txt\""));
        assert!(prompt.contains(&format!("\"{}...\"", "x".repeat(1000))));
        assert!(!prompt.contains(&"x".repeat(1001)));
        assert!(prompt.ends_with("</retrieval>"));
    }

    #[test]
    fn test_prompt_without_results() {
        let prompt = build_prompt("Jane Doe", "hi", &[], 1000);
        assert!(prompt.contains("<retrieval>\n[]\n</retrieval>"));
    }
}
