//! Shared fixtures for unit tests.

use crate::error::OutcomeError;
use crate::transfer::{Artifact, TransferClient, Transport, UploadRequest};
use crate::types::{AnalysisFeedback, ResumeFile, SubmissionInput};
use async_trait::async_trait;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Smallest content the validator recognizes as a PDF
pub(crate) const SAMPLE_PDF: &[u8] = b"%PDF-1.7\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n%%EOF\n";

/// OLE2 compound file header followed by filler
pub(crate) const SAMPLE_DOC: &[u8] = &[
    0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Minimal ZIP container with a Word main document part
pub(crate) fn sample_docx() -> Vec<u8> {
    zip_with_entry("word/document.xml", b"<w:document/>")
}

/// Valid ZIP archive that is not a Word document
pub(crate) fn sample_zip_without_word_part() -> Vec<u8> {
    zip_with_entry("notes.txt", b"not a resume")
}

fn zip_with_entry(name: &str, body: &[u8]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buf);
        let options =
            zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Stored);
        writer.start_file(name, options).unwrap();
        writer.write_all(body).unwrap();
        writer.finish().unwrap();
    }
    buf.into_inner()
}

/// A valid PDF submission for the given job role
pub(crate) fn pdf_submission(job_role: &str) -> SubmissionInput {
    SubmissionInput::new(
        ResumeFile::new("resume.pdf", SAMPLE_PDF).with_declared_type("application/pdf"),
        job_role,
    )
}

/// Feedback shaped like a typical service answer
pub(crate) fn sample_feedback() -> AnalysisFeedback {
    AnalysisFeedback {
        overall_score: 8.0,
        strengths: vec!["Clear formatting".to_string()],
        improvements: vec!["Add metrics".to_string()],
        actionable_changes: vec!["Quantify impact in bullet 3".to_string()],
        artifact_reference: "/d/1".to_string(),
        service_message: Some("File uploaded and processed".to_string()),
    }
}

/// Scripted answer of a [`FakeTransport`] call
#[derive(Clone, Debug)]
pub(crate) enum Reply<T> {
    /// Answer immediately
    Ready(Result<T, OutcomeError>),
    /// Answer after a delay
    After(Duration, Result<T, OutcomeError>),
    /// Never answer
    Hang,
}

/// In-memory transport with call and abort counters
pub(crate) struct FakeTransport {
    pub(crate) uploads: AtomicU32,
    pub(crate) fetches: AtomicU32,
    pub(crate) aborted: Arc<AtomicU32>,
    upload_reply: Mutex<Reply<AnalysisFeedback>>,
    fetch_reply: Mutex<Reply<Artifact>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self {
            uploads: AtomicU32::new(0),
            fetches: AtomicU32::new(0),
            aborted: Arc::new(AtomicU32::new(0)),
            upload_reply: Mutex::new(Reply::Ready(Ok(sample_feedback()))),
            fetch_reply: Mutex::new(Reply::Ready(Ok(sample_artifact()))),
        }
    }

    pub(crate) fn on_upload(&self, reply: Reply<AnalysisFeedback>) {
        *self.upload_reply.lock().unwrap() = reply;
    }

    pub(crate) fn on_fetch(&self, reply: Reply<Artifact>) {
        *self.fetch_reply.lock().unwrap() = reply;
    }

    pub(crate) fn upload_count(&self) -> u32 {
        self.uploads.load(Ordering::SeqCst)
    }

    pub(crate) fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn abort_count(&self) -> u32 {
        self.aborted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn upload(&self, _request: &UploadRequest) -> Result<AnalysisFeedback, OutcomeError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        let reply = self.upload_reply.lock().unwrap().clone();
        play(reply, self.aborted.clone()).await
    }

    async fn fetch(&self, _reference: &str) -> Result<Artifact, OutcomeError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let reply = self.fetch_reply.lock().unwrap().clone();
        play(reply, self.aborted.clone()).await
    }
}

/// Counts calls dropped before they produced a result
struct AbortGuard {
    counter: Arc<AtomicU32>,
    finished: bool,
}

impl Drop for AbortGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

async fn play<T>(reply: Reply<T>, aborted: Arc<AtomicU32>) -> Result<T, OutcomeError> {
    let mut guard = AbortGuard {
        counter: aborted,
        finished: false,
    };
    let result = match reply {
        Reply::Ready(result) => result,
        Reply::After(delay, result) => {
            tokio::time::sleep(delay).await;
            result
        }
        Reply::Hang => std::future::pending().await,
    };
    guard.finished = true;
    result
}

/// Optimized document as the fake service returns it
pub(crate) fn sample_artifact() -> Artifact {
    Artifact {
        content: bytes::Bytes::from_static(SAMPLE_PDF),
        content_type: Some("application/pdf".to_string()),
        file_name: "optimized_resume.pdf".to_string(),
    }
}

/// Client over a shared fake transport
pub(crate) fn fake_client() -> (TransferClient, Arc<FakeTransport>) {
    let transport = Arc::new(FakeTransport::new());
    (TransferClient::new(transport.clone()), transport)
}
