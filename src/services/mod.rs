pub mod artifact_store;
pub mod ingestion;

pub use artifact_store::ArtifactStore;
pub use ingestion::AttachmentIngestor;
