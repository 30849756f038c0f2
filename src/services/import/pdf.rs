use crate::error::{AppError, AppResult};
use crate::models::ApiDraft;

/// One raw-text draft per non-blank page. Blocking; run it off the runtime.
pub fn parse(file: &str, bytes: &[u8]) -> AppResult<Vec<ApiDraft>> {
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| AppError::import(file, e))?;
    Ok(pages(&text))
}

// pdf-extract separates pages with form feeds
fn pages(text: &str) -> Vec<ApiDraft> {
    text.split('\x0C')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .map(ApiDraft::from_raw_text)
        .collect()
}
