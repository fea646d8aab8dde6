//! Fixtures and provider doubles shared by the crate's tests.

use crate::embeddings::providers::MockProvider;
use crate::embeddings::EmbeddingProvider;
use crate::records::KnowledgeSources;
use async_trait::async_trait;
use guardiane_core::{AppConfig, AppError, AppResult};
use guardiane_llm::{LlmClient, LlmRequest, LlmResponse};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const FAQ_JSON: &str = r#"[
  {
    "question": "What are the signs of cyberbullying?",
    "answer": "Common cyberbullying warning signs include withdrawing from friends, hiding the phone, and seeming upset after being online."
  },
  {
    "question": "How much screen time is healthy?",
    "answer": "Agree on screen time limits together and keep devices out of the bedroom overnight so sleep is protected."
  },
  {
    "question": "How do I talk about online strangers?",
    "answer": "Explain that people online may not be who they claim to be, and ask your teen to tell you about any request for photos or secrecy."
  },
  {
    "question": "What if my teen seems depressed?",
    "answer": "Listen without judgment, keep communication open, and reach out to a doctor or counselor if low mood lasts more than two weeks."
  }
]"#;

pub const HOTLINES_JSON: &str = r#"[
  {
    "organization": "988 Suicide & Crisis Lifeline",
    "topic": "suicide prevention and emotional distress",
    "phone": "988",
    "website": "https://988lifeline.org"
  },
  {
    "organization": "Cyber Civil Rights Initiative",
    "topic": "image-based abuse",
    "phone": "844-878-2274",
    "website": "https://cybercivilrights.org"
  }
]"#;

/// Write the fixture files under `<root>/data/`, where the default config
/// looks for them.
pub fn write_sources(root: &Path) -> KnowledgeSources {
    let data = root.join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(data.join("faq.json"), FAQ_JSON).unwrap();
    std::fs::write(data.join("hotlines.json"), HOTLINES_JSON).unwrap();
    KnowledgeSources::new(data.join("faq.json"), data.join("hotlines.json"))
}

/// Config rooted at `root` using the offline embedding provider.
pub fn test_config(root: &Path) -> AppConfig {
    let mut config = AppConfig {
        workspace: root.to_path_buf(),
        ..Default::default()
    };
    config.embedding.provider = "mock".to_string();
    config.embedding.dimensions = 128;
    config.embedding.batch_size = 2;
    config
}

/// Embedder that counts embedded texts and can fail its first N batches.
#[derive(Debug)]
pub struct CountingEmbedder {
    inner: MockProvider,
    embedded: AtomicUsize,
    failures_left: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self::failing(dimensions, 0)
    }

    pub fn failing(dimensions: usize, failures: usize) -> Self {
        Self {
            inner: MockProvider::new(dimensions),
            embedded: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(failures),
        }
    }

    /// Number of texts embedded so far.
    pub fn embedded(&self) -> usize {
        self.embedded.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    fn provider_name(&self) -> &str {
        "counting"
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        // Let concurrent callers interleave
        tokio::task::yield_now().await;

        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(AppError::Embedding("connection refused".to_string()));
        }

        self.embedded.fetch_add(texts.len(), Ordering::SeqCst);
        self.inner.embed_batch(texts).await
    }
}

type Script = Box<dyn Fn(&LlmRequest) -> AppResult<String> + Send + Sync>;

/// LLM double answering from a closure and recording every request.
pub struct ScriptedLlm {
    script: Script,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn new(script: impl Fn(&LlmRequest) -> AppResult<String> + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answers `text`, paraphrase requests included.
    pub fn replying(text: &'static str) -> Self {
        Self::new(move |_| Ok(text.to_string()))
    }

    /// Fails every request like an unreachable server.
    pub fn failing() -> Self {
        Self::new(|_| Err(AppError::Llm("connection refused".to_string())))
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let content = (self.script)(request)?;
        Ok(LlmResponse::text(content, request.model.clone()))
    }
}

/// Whether a request is the paraphrasing step rather than the answer.
pub fn is_expansion(request: &LlmRequest) -> bool {
    request.prompt.contains("different versions of the question")
}
