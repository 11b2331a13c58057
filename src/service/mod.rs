//! Remote lookups consumed by the widget.
//!
//! [`Backend`] is the seam between the widget and the network: the gene
//! lookup service, the accession cross-reference lookup, the structure
//! download and the structure description endpoint. The record types here
//! mirror the JSON shapes those endpoints return, so any substitute (the
//! HTTP client or a test double) must produce exactly these shapes.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpBackend;
use serde::{Deserialize, Serialize};

use crate::error::StructviewError;

/// Gene record returned by the gene lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneRecord {
    /// Proteins encoded by the gene, in service order.
    #[serde(default)]
    pub proteins: Vec<ProteinRecord>,
}

/// Protein entry nested in a [`GeneRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProteinRecord {
    /// Stable sequence accession.
    pub primary_accession: String,
}

/// One record of the structure description endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureDescription {
    /// Deposited title of the entry.
    pub title: String,
    /// Structure identifier echoed back by the service.
    #[serde(default)]
    pub structure_id: Option<String>,
    /// Experimental method, when reported.
    #[serde(default)]
    pub exp_method: Option<String>,
}

/// Source of every remote answer the widget needs.
///
/// Implementations are called from worker threads, one call per request.
pub trait Backend: Send + Sync {
    /// Look up the gene record for `gene_id` against `service_url`.
    fn gene_to_protein(
        &self,
        gene_id: &str,
        service_url: &str,
    ) -> Result<GeneRecord, StructviewError>;

    /// Ordered structure identifiers cross-referenced by `accession`.
    fn accession_to_pdb(
        &self,
        accession: &str,
    ) -> Result<Vec<String>, StructviewError>;

    /// Raw structure file for `id`.
    fn download_structure(&self, id: &str) -> Result<String, StructviewError>;

    /// Description records for `id`.
    fn describe_structure(
        &self,
        id: &str,
    ) -> Result<Vec<StructureDescription>, StructviewError>;
}
