use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[schemars(title = "Endpoints", inline)]
#[serde(default)]
/// URL templates of every remote call. `{id}` and `{accession}` are
/// substituted per request.
pub struct EndpointOptions {
    /// Structure file download.
    pub structure_download: String,
    /// Structure description record.
    pub structure_describe: String,
    /// Human-facing record page linked from the list.
    pub structure_page: String,
    /// Accession record listing PDB cross references.
    pub uniprot_entry: String,
    /// Query path appended to the gene lookup service URL.
    pub query_path: String,
    /// Per-request timeout in seconds. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for EndpointOptions {
    fn default() -> Self {
        Self {
            structure_download: "https://files.rcsb.org/download/{id}.pdb"
                .into(),
            structure_describe:
                "https://www.rcsb.org/pdb/json/describePDB?structureId={id}"
                    .into(),
            structure_page: "https://www.rcsb.org/structure/{id}".into(),
            uniprot_entry: "https://rest.uniprot.org/uniprotkb/{accession}.json"
                .into(),
            query_path: "/service/query/results".into(),
            timeout_secs: None,
        }
    }
}

impl EndpointOptions {
    /// Download URL of a structure file.
    #[must_use]
    pub fn structure_download_url(&self, id: &str) -> String {
        self.structure_download.replace("{id}", id)
    }

    /// Description URL of a structure.
    #[must_use]
    pub fn structure_describe_url(&self, id: &str) -> String {
        self.structure_describe.replace("{id}", id)
    }

    /// Record page of a structure.
    #[must_use]
    pub fn structure_page_url(&self, id: &str) -> String {
        self.structure_page.replace("{id}", id)
    }

    /// Accession record URL.
    #[must_use]
    pub fn uniprot_entry_url(&self, accession: &str) -> String {
        self.uniprot_entry.replace("{accession}", accession)
    }

    /// Gene lookup query URL for a service root.
    #[must_use]
    pub fn query_url(&self, service_url: &str) -> String {
        format!("{}{}", service_url.trim_end_matches('/'), self.query_path)
    }
}
