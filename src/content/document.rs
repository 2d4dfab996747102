//! Binary document (PDF) text extraction seam

/// Turns a binary document into text
///
/// `None` means "no usable text": the URL is recorded as `no_text` and the
/// crawl moves on. Implementations must not panic on malformed input.
pub trait DocumentTextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Option<String>;
}

/// Extractor used when no document backend is configured
///
/// Always yields `None`, so PDFs are skipped without failing the run.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDocumentSupport;

impl DocumentTextExtractor for NoDocumentSupport {
    fn extract_text(&self, bytes: &[u8]) -> Option<String> {
        tracing::debug!("No document backend; skipping {} byte document", bytes.len());
        None
    }
}

/// Tries each extractor in order, returning the first non-empty text
///
/// Mirrors the direct-extraction-then-OCR arrangement: put the fast
/// extractor first and the slow image-based one after it.
pub struct FallbackDocumentExtractor {
    extractors: Vec<Box<dyn DocumentTextExtractor>>,
}

impl FallbackDocumentExtractor {
    pub fn new(extractors: Vec<Box<dyn DocumentTextExtractor>>) -> Self {
        Self { extractors }
    }
}

impl DocumentTextExtractor for FallbackDocumentExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Option<String> {
        self.extractors
            .iter()
            .filter_map(|extractor| extractor.extract_text(bytes))
            .find(|text| !text.trim().is_empty())
    }
}
