//! End-to-end pipeline tests: Session process / ask / reset driven with
//! deterministic fake providers instead of live network calls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;

use doc_chat::chat::unwrap_question;
use doc_chat::config::Config;
use doc_chat::embedding::EmbeddingProvider;
use doc_chat::generation::ChatModel;
use doc_chat::models::{ChatRole, ChatTurn, FileStatus, UploadedFile};
use doc_chat::session::{AskOutcome, Session, NOT_READY_GUIDANCE};

/// Deterministic embeddings: a small histogram over keyword hits, so texts
/// about the same word land near each other. Can be flipped into a failure
/// mode to exercise provider-error paths.
struct FakeEmbeddings {
    fail: Arc<AtomicBool>,
}

impl FakeEmbeddings {
    fn new() -> (Arc<Self>, Arc<AtomicBool>) {
        let fail = Arc::new(AtomicBool::new(false));
        (
            Arc::new(Self {
                fail: Arc::clone(&fail),
            }),
            fail,
        )
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbeddings {
    fn model_name(&self) -> &str {
        "fake-embeddings"
    }

    fn dims(&self) -> usize {
        4
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("embedding provider unavailable");
        }
        Ok(texts
            .iter()
            .map(|t| {
                let lower = t.to_lowercase();
                vec![
                    lower.matches("alpha").count() as f32 + 0.01,
                    lower.matches("beta").count() as f32,
                    lower.matches("gamma").count() as f32,
                    lower.matches("delta").count() as f32,
                ]
            })
            .collect())
    }
}

/// Canned chat model: always answers with a fixed string, recording nothing.
struct CannedChat;

#[async_trait]
impl ChatModel for CannedChat {
    fn model_name(&self) -> &str {
        "canned-chat"
    }

    async fn generate(&self, _messages: &[ChatTurn]) -> Result<String> {
        Ok("The documents discuss alpha.".to_string())
    }
}

fn test_session() -> (Session, Arc<AtomicBool>) {
    let (embeddings, fail) = FakeEmbeddings::new();
    let session = Session::new(Config::default(), embeddings, Arc::new(CannedChat));
    (session, fail)
}

/// Minimal docx (ZIP) containing word/document.xml with one paragraph.
fn minimal_docx(text: &str) -> Vec<u8> {
    use std::io::Write;
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        let xml = format!(
            "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>",
            text
        );
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    buf
}

#[tokio::test]
async fn ask_before_process_returns_guidance() {
    let (mut session, _) = test_session();

    let outcome = session.ask("anything?").await.unwrap();
    match outcome {
        AskOutcome::NotReady(msg) => assert_eq!(msg, NOT_READY_GUIDANCE),
        AskOutcome::Answer(_) => panic!("must not answer without an index"),
    }
    assert!(!session.is_ready());
    assert!(session.records().is_empty());
}

#[tokio::test]
async fn process_then_ask_round_trip() {
    let (mut session, _) = test_session();

    let files = vec![UploadedFile::new(
        "notes.txt",
        b"alpha is the first topic\nbeta is the second".to_vec(),
    )];
    let summary = session.process(&files).await.unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 0);
    assert!(summary.chunks >= 1);
    assert!(session.is_ready());

    let outcome = session.ask("Tell me about alpha").await.unwrap();
    match outcome {
        AskOutcome::Answer(answer) => assert_eq!(answer, "The documents discuss alpha."),
        AskOutcome::NotReady(_) => panic!("session was ready"),
    }
}

#[tokio::test]
async fn transcript_shows_original_questions() {
    let (mut session, _) = test_session();
    session
        .process(&[UploadedFile::new("a.txt", b"alpha beta gamma".to_vec())])
        .await
        .unwrap();

    session.ask("What is alpha?").await.unwrap();
    session.ask("And beta?").await.unwrap();

    let transcript = session.engine().unwrap().transcript();
    assert_eq!(transcript.len(), 4);
    assert_eq!(transcript[0], (ChatRole::User, "What is alpha?".to_string()));
    assert_eq!(transcript[2], (ChatRole::User, "And beta?".to_string()));
    assert_eq!(transcript[1].0, ChatRole::Assistant);
    // Stored user turns are wrapped; display must never leak the prefix.
    assert!(!transcript[0].1.contains("SYSTEM INSTRUCTIONS"));
}

#[tokio::test]
async fn unsupported_files_warn_without_records() {
    let (mut session, _) = test_session();

    let files = vec![
        UploadedFile::new("data.csv", b"a,b,c".to_vec()),
        UploadedFile::new("ok.txt", b"alpha content".to_vec()),
    ];
    let summary = session.process(&files).await.unwrap();

    assert_eq!(session.records().len(), 1);
    assert_eq!(session.records()[0].name, "ok.txt");
    assert!(summary
        .warnings
        .iter()
        .any(|w| w.contains("Unsupported file type: data.csv")));
}

#[tokio::test]
async fn docx_and_bad_pdf_records() {
    let (mut session, _) = test_session();

    let files = vec![
        UploadedFile::new("report.docx", minimal_docx("alpha inside a docx")),
        UploadedFile::new("broken.pdf", b"not a valid pdf".to_vec()),
    ];
    let summary = session.process(&files).await.unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 1);

    let records = session.records();
    assert_eq!(records[0].status, FileStatus::Processed);
    assert_eq!(records[0].info, "DOCX - 1 paragraphs");
    assert_eq!(records[1].status, FileStatus::Failed);
    assert_eq!(records[1].info, "No text found");
}

#[tokio::test]
async fn empty_corpus_rejected_and_prior_state_kept() {
    let (mut session, _) = test_session();
    session
        .process(&[UploadedFile::new("good.txt", b"alpha text".to_vec())])
        .await
        .unwrap();
    let prior_records = session.records().len();

    let err = session
        .process(&[UploadedFile::new("blank.txt", b"   ".to_vec())])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No text could be extracted"));

    // Failed process must not clobber the working session.
    assert!(session.is_ready());
    assert_eq!(session.records().len(), prior_records);
    assert_eq!(session.records()[0].name, "good.txt");
}

#[tokio::test]
async fn process_with_no_files_is_an_error() {
    let (mut session, _) = test_session();
    let err = session.process(&[]).await.unwrap_err();
    assert!(err.to_string().contains("at least one document"));
    assert!(!session.is_ready());
}

#[tokio::test]
async fn provider_failure_during_ask_leaves_memory_unchanged() {
    let (mut session, fail) = test_session();
    session
        .process(&[UploadedFile::new("a.txt", b"alpha beta".to_vec())])
        .await
        .unwrap();
    session.ask("first question about alpha").await.unwrap();
    assert_eq!(session.engine().unwrap().transcript().len(), 2);

    fail.store(true, Ordering::SeqCst);
    let err = session.ask("second question").await.unwrap_err();
    assert!(err.to_string().contains("Error generating response"));
    assert_eq!(session.engine().unwrap().transcript().len(), 2);

    // The prior index is still usable once the provider recovers.
    fail.store(false, Ordering::SeqCst);
    match session.ask("second question again").await.unwrap() {
        AskOutcome::Answer(_) => {}
        AskOutcome::NotReady(_) => panic!("index must survive a failed ask"),
    }
    assert_eq!(session.engine().unwrap().transcript().len(), 4);
}

#[tokio::test]
async fn embedding_failure_during_process_keeps_prior_index() {
    let (mut session, fail) = test_session();
    session
        .process(&[UploadedFile::new("a.txt", b"alpha".to_vec())])
        .await
        .unwrap();

    fail.store(true, Ordering::SeqCst);
    let err = session
        .process(&[UploadedFile::new("b.txt", b"beta".to_vec())])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Error processing documents"));

    assert!(session.is_ready());
    assert_eq!(session.records()[0].name, "a.txt");
}

#[tokio::test]
async fn reset_is_idempotent() {
    let (mut session, _) = test_session();
    session
        .process(&[UploadedFile::new("a.txt", b"alpha".to_vec())])
        .await
        .unwrap();
    session.ask("a question").await.unwrap();

    session.reset();
    assert!(!session.is_ready());
    assert!(session.records().is_empty());

    session.reset();
    assert!(!session.is_ready());
    assert!(session.records().is_empty());

    match session.ask("after reset?").await.unwrap() {
        AskOutcome::NotReady(_) => {}
        AskOutcome::Answer(_) => panic!("reset must drop the index"),
    }
}

#[tokio::test]
async fn files_loaded_from_disk_round_trip() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("notes.txt");
    std::fs::write(&path, "alpha on disk\nbeta too\n").unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let files = vec![UploadedFile::new("notes.txt", bytes)];

    let (mut session, _) = test_session();
    let summary = session.process(&files).await.unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(session.records()[0].info, "TXT - 2 lines");
}

#[test]
fn wrapped_question_round_trip_via_marker() {
    let question = "What does the contract say about termination?";
    let wrapped = doc_chat::chat::wrap_question(question);
    assert_eq!(unwrap_question(&wrapped), question);
}
