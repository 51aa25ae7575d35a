//! Shared fixtures for integration tests: synthetic resume documents, a
//! deterministic embedder, and a canned-response completion service.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use lopdf::{dictionary, Document, Object, Stream};
use secrecy::SecretString;

use cvsift::config::ExtractorConfig;
use cvsift::rank::{Embedder, RankError};

/// Builds a minimal single-page PDF with the given line of text and writes it
/// into `dir` under `name`.
pub fn write_text_pdf(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.new_object_id();
    let resources_id = doc.new_object_id();
    let content_id = doc.new_object_id();
    let page_id = doc.new_object_id();

    doc.objects.insert(
        font_id,
        Object::Dictionary(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        }),
    );

    doc.objects.insert(
        resources_id,
        Object::Dictionary(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        }),
    );

    let content = format!("BT /F1 12 Tf 50 700 Td ({}) Tj ET", text);
    let content_stream = Stream::new(dictionary! {}, content.into_bytes());
    doc.objects
        .insert(content_id, Object::Stream(content_stream));

    doc.objects.insert(
        page_id,
        Object::Dictionary(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        }),
    );

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut pdf_bytes = Vec::new();
    doc.save_to(&mut pdf_bytes).unwrap();

    let path = dir.join(name);
    std::fs::write(&path, &pdf_bytes).unwrap();
    path
}

/// Deterministic embedder: each dimension counts occurrences of a fixed
/// vocabulary word. Texts sharing vocabulary with the job description score
/// higher; texts with none of it embed to the zero vector.
pub struct KeywordEmbedder;

const VOCABULARY: [&str; 5] = ["rust", "distributed", "systems", "cooking", "gardening"];

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RankError> {
        Ok(texts
            .iter()
            .map(|text| {
                let lowered = text.to_lowercase();
                VOCABULARY
                    .iter()
                    .map(|word| lowered.matches(word).count() as f32)
                    .collect()
            })
            .collect())
    }
}

/// Canned-response completion service: serves one HTTP response per
/// connection, in order, then stops accepting.
pub struct StubCompletionService {
    pub endpoint: String,
    pub hits: Arc<AtomicUsize>,
}

impl StubCompletionService {
    pub fn serve(responses: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_counter = hits.clone();

        std::thread::spawn(move || {
            for response in responses {
                let (mut stream, _) = match listener.accept() {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                read_request(&mut stream);
                hits_counter.fetch_add(1, Ordering::SeqCst);
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        Self {
            endpoint: format!("http://{}/v1/chat/completions", addr),
            hits,
        }
    }

    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn read_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    while !buf.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte) {
            Ok(0) | Err(_) => return,
            Ok(_) => buf.push(byte[0]),
        }
    }
    let headers = String::from_utf8_lossy(&buf).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; content_length];
    let _ = stream.read_exact(&mut body);
}

/// Formats a raw HTTP response with the given status line and JSON body.
pub fn http_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    )
}

/// A valid completion reply whose content double-encodes the given fields.
pub fn completion_reply(name: &str) -> String {
    let inner = serde_json::json!({
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "phone": "+1 555 0100",
        "skills": ["Rust"],
        "experience": ["Engineer"]
    })
    .to_string();

    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": inner}}]
    })
    .to_string()
}

/// Extractor configuration pointed at a stub endpoint, with no cooldown so
/// tests run fast.
pub fn test_extractor_config(endpoint: &str) -> ExtractorConfig {
    ExtractorConfig {
        endpoint: endpoint.to_string(),
        model: "test-model".to_string(),
        api_key: SecretString::from("test-key".to_string()),
        cooldown_secs: 0,
        max_retries: 3,
    }
}
