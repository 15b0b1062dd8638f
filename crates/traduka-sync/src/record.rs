use serde::Deserialize;

/// One physical object to fetch: the compressed attachment of a record.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    /// Hex SHA-256 of the transmitted (compressed) bytes.
    pub hash: String,
    pub size: u64,
    pub filename: String,
    /// Path relative to the CDN base.
    pub location: String,
    pub mimetype: String,
}

/// The catalog's closed set of model-file roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Model,
    Lex,
    Vocab,
    SrcVocab,
    TrgVocab,
}

/// One logical model file as published by the catalog.
///
/// Immutable once decoded. A missing required field in any record makes the
/// whole catalog decode fail; a malformed catalog aborts the run rather than
/// being skipped record by record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    pub name: String,
    pub schema: u64,
    pub version: String,
    pub file_type: FileType,
    pub attachment: Attachment,
    /// Architecture tag driving selection. Absent on records that apply to
    /// every architecture; those never match a filter query.
    #[serde(default)]
    pub architecture: Option<String>,
    pub source_language: String,
    pub target_language: String,
    /// Hex SHA-256 of the decompressed content. Records without one skip
    /// post-decompression verification entirely.
    #[serde(default)]
    pub decompressed_hash: Option<String>,
    #[serde(default)]
    pub decompressed_size: Option<u64>,
    /// Opaque passthrough from the settings service.
    #[serde(default, rename = "filter_expression")]
    pub filter_expression: String,
    pub id: String,
    /// Epoch milliseconds; stamped onto the decompressed file for downstream
    /// freshness checks.
    #[serde(rename = "last_modified")]
    pub last_modified: u64,
}

impl ModelRecord {
    /// Resolve the attachment's download URL against a CDN base.
    pub fn download_url(&self, cdn_base: &str) -> String {
        format!("{cdn_base}{}", self.attachment.location)
    }

    /// Storage subdirectory name, `<source>_<target>`.
    pub fn language_pair(&self) -> String {
        format!("{}_{}", self.source_language, self.target_language)
    }

    /// Final on-disk name: the attachment filename with its `.zst` suffix
    /// stripped. Kept as-is when the suffix is absent.
    pub fn decompressed_filename(&self) -> &str {
        self.attachment
            .filename
            .strip_suffix(".zst")
            .unwrap_or(&self.attachment.filename)
    }
}

/// Select the records whose architecture tag equals `architecture` exactly.
///
/// Pure, case-sensitive, order-preserving, and idempotent. An empty result is
/// not an error; the orchestrator treats it as a no-op.
pub fn select_by_architecture(records: &[ModelRecord], architecture: &str) -> Vec<ModelRecord> {
    records
        .iter()
        .filter(|r| r.architecture.as_deref() == Some(architecture))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, architecture: Option<&str>) -> ModelRecord {
        ModelRecord {
            name: name.to_string(),
            schema: 1,
            version: "1.0".to_string(),
            file_type: FileType::Model,
            attachment: Attachment {
                hash: String::new(),
                size: 0,
                filename: format!("{name}.intgemm.alphas.bin.zst"),
                location: format!("main/translations-models/{name}.bin.zst"),
                mimetype: "application/octet-stream".to_string(),
            },
            architecture: architecture.map(str::to_string),
            source_language: "en".to_string(),
            target_language: "de".to_string(),
            decompressed_hash: None,
            decompressed_size: None,
            filter_expression: String::new(),
            id: name.to_string(),
            last_modified: 0,
        }
    }

    #[test]
    fn filter_is_exact_and_order_preserving() {
        let records = vec![
            record("a", Some("base-memory")),
            record("b", Some("base")),
            record("c", Some("tiny")),
            record("d", Some("base")),
            record("e", None),
        ];

        let selected = select_by_architecture(&records, "base");
        let names: Vec<_> = selected.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["b", "d"]);
    }

    #[test]
    fn filter_is_case_sensitive() {
        let records = vec![record("a", Some("Base"))];
        assert!(select_by_architecture(&records, "base").is_empty());
    }

    #[test]
    fn base_does_not_match_base_memory() {
        let records = vec![record("a", Some("base-memory"))];
        assert!(select_by_architecture(&records, "base").is_empty());
    }

    #[test]
    fn filter_is_idempotent() {
        let records = vec![
            record("a", Some("tiny")),
            record("b", Some("base")),
            record("c", Some("tiny")),
        ];

        let once = select_by_architecture(&records, "tiny");
        let twice = select_by_architecture(&once, "tiny");
        let names =
            |rs: &[ModelRecord]| rs.iter().map(|r| r.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&once), names(&twice));
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let records = vec![record("a", Some("base"))];
        assert!(select_by_architecture(&records, "gigantic").is_empty());
    }

    #[test]
    fn derived_url_and_language_pair() {
        let r = record("model.ende", Some("base"));
        assert_eq!(
            r.download_url("https://cdn.example/"),
            "https://cdn.example/main/translations-models/model.ende.bin.zst"
        );
        assert_eq!(r.language_pair(), "en_de");
        assert_eq!(r.decompressed_filename(), "model.ende.intgemm.alphas.bin");
    }

    #[test]
    fn filename_without_zst_suffix_is_kept() {
        let mut r = record("odd", Some("base"));
        r.attachment.filename = "vocab.spm".to_string();
        assert_eq!(r.decompressed_filename(), "vocab.spm");
    }
}
