//! Built-in prompt definitions used by the answer pipeline.
//!
//! A workspace may override any of them by placing a file with the same id
//! under `.guardiane/prompts/`.

/// Prompt that turns retrieved context plus a question into an answer.
pub const RAG_ANSWER_ID: &str = "rag.answer";

/// Prompt that asks the model for paraphrases of a question.
pub const RAG_EXPAND_ID: &str = "rag.expand";

/// Phrase the answer prompt tells the model to use when the context is
/// insufficient. The pipeline detects it and substitutes its own fallback.
pub const REFUSAL_PHRASE: &str = "I'm sorry, I could not find that information.";

const RAG_ANSWER_YAML: &str = r#"
id: rag.answer
title: Guardiane answer
apiVersion: "1.0"
system: |
  You are Guardiané, a friendly and knowledgeable assistant helping parents understand teen safety, digital wellness, and mental health.
  Be clear, supportive, and conversational.
  Answer using only the information in the context you are given. Do not invent facts, phone numbers, or websites that are not in the context.
  If the context does not contain the answer, reply exactly: "{{refusal}}"
  Avoid repeating formatting labels like 'Context' or 'Question' in your response.
template: |
  {{context}}

  Question: {{question}}
"#;

const RAG_EXPAND_YAML: &str = r#"
id: rag.expand
title: Guardiane query expansion
apiVersion: "1.0"
system: "You rewrite questions so a document search finds more relevant passages."
template: |
  Write {{count}} different versions of the question below, as a parent might ask it about teen safety or digital wellness.
  Put each version on its own line, with no numbering and no commentary.

  Question: {{question}}
"#;

/// YAML source of a built-in prompt, if one exists for `id`.
pub fn builtin_source(id: &str) -> Option<&'static str> {
    match id {
        RAG_ANSWER_ID => Some(RAG_ANSWER_YAML),
        RAG_EXPAND_ID => Some(RAG_EXPAND_YAML),
        _ => None,
    }
}
