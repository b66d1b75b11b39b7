use lingora_core::models::ReorderUpdate;

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Parse a reorder batch from a JSON array of `{"id": ..., "order": ...}`
/// pairs, as exported by the admin UI.
pub fn parse_reorder_batch(json: &str) -> anyhow::Result<Vec<ReorderUpdate>> {
    let updates: Vec<ReorderUpdate> = serde_json::from_str(json)?;
    Ok(updates)
}

/// Map a file extension to the MIME type declared on upload. Only the
/// allowlisted formats are mapped; anything else is rejected before the
/// upload pipeline runs.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "mp4" => Some("video/mp4"),
        "mov" => Some("video/quicktime"),
        "avi" => Some("video/x-msvideo"),
        "mkv" => Some("video/x-matroska"),
        "webm" => Some("video/webm"),
        "mp3" => Some("audio/mpeg"),
        "wav" => Some("audio/wav"),
        "ogg" => Some("audio/ogg"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_extensions_case_insensitively() {
        assert_eq!(mime_for_extension("PNG"), Some("image/png"));
        assert_eq!(mime_for_extension("mov"), Some("video/quicktime"));
        assert_eq!(mime_for_extension("exe"), None);
    }

    #[test]
    fn parses_reorder_batch() {
        let json = r#"[
            {"id": "4b4a4a7e-3c55-4df5-9d07-6e33a4e6f661", "order": 1},
            {"id": "37f5bd6e-2f6c-4f61-b1b5-2d1f9d1a2b3c", "order": 2}
        ]"#;
        let updates = parse_reorder_batch(json).unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].order, 1);
        assert_eq!(updates[1].order, 2);
    }

    #[test]
    fn rejects_malformed_batch() {
        assert!(parse_reorder_batch(r#"[{"id": "not-a-uuid", "order": 1}]"#).is_err());
        assert!(parse_reorder_batch("{}").is_err());
    }
}
