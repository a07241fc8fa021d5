//! Resume documents and service response bodies

use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// Smallest content the validator accepts as a PDF
pub const SAMPLE_PDF: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n%%EOF\n";

/// PNG signature, for files that lie about being PDFs
pub const SAMPLE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

/// A successful analysis body with the given artifact reference
pub fn analysis_body(download_url: &str) -> Value {
    json!({
        "message": "File uploaded and processed",
        "download_url": download_url,
        "ai_feedback": {
            "overall_score": 8,
            "strengths": ["Clear formatting", "Relevant experience"],
            "improvements": ["Add metrics"],
            "actionable_changes": ["Quantify impact in bullet 3"]
        }
    })
}

/// Write `content` to `dir/name` and return the path
pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write fixture");
    path
}
