//! Blocking HTTP implementation of [`Backend`] on top of ureq.

use std::time::Duration;

use serde::Deserialize;

use super::{Backend, GeneRecord, StructureDescription};
use crate::error::StructviewError;
use crate::options::EndpointOptions;

/// [`Backend`] talking to InterMine, UniProt and RCSB over HTTP.
pub struct HttpBackend {
    agent: ureq::Agent,
    endpoints: EndpointOptions,
}

/// Envelope of an InterMine `jsonobjects` result.
#[derive(Deserialize)]
struct QueryResults {
    #[serde(default)]
    results: Vec<GeneRecord>,
    #[serde(default)]
    error: Option<String>,
}

/// Error body InterMine sends with non-2xx statuses.
#[derive(Deserialize)]
struct ServiceError {
    error: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UniprotEntry {
    #[serde(default, rename = "uniProtKBCrossReferences")]
    cross_references: Vec<CrossReference>,
}

#[derive(Deserialize)]
struct CrossReference {
    database: String,
    id: String,
}

impl HttpBackend {
    /// Create a backend for the given endpoint templates.
    #[must_use]
    pub fn new(endpoints: EndpointOptions) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(endpoints.timeout_secs.map(Duration::from_secs))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            endpoints,
        }
    }

    /// GET `url` (with optional query pairs) and return the body text.
    fn get_text(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<String, StructviewError> {
        log::debug!("GET {url}");
        let mut request = self.agent.get(url);
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        let response = request
            .call()
            .map_err(|e| StructviewError::Http(format!("{url}: {e}")))?;
        let status = response.status();
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| StructviewError::Http(format!("{url}: {e}")))?;

        if status.is_success() {
            return Ok(body);
        }
        // Services that explain themselves get their message surfaced.
        match serde_json::from_str::<ServiceError>(&body) {
            Ok(err) => Err(StructviewError::Message(err.error)),
            Err(_) => Err(StructviewError::Http(format!(
                "{url}: status {}",
                status.as_u16()
            ))),
        }
    }
}

impl Backend for HttpBackend {
    fn gene_to_protein(
        &self,
        gene_id: &str,
        service_url: &str,
    ) -> Result<GeneRecord, StructviewError> {
        let query = gene_query_xml(gene_id);
        let url = self.endpoints.query_url(service_url);
        let body = self.get_text(
            &url,
            &[("query", &query), ("format", "jsonobjects")],
        )?;
        let parsed: QueryResults = serde_json::from_str(&body)?;
        if let Some(msg) = parsed.error {
            return Err(StructviewError::Message(msg));
        }
        parsed.results.into_iter().next().ok_or_else(|| {
            StructviewError::NoProteins {
                gene_id: gene_id.to_owned(),
            }
        })
    }

    fn accession_to_pdb(
        &self,
        accession: &str,
    ) -> Result<Vec<String>, StructviewError> {
        let url = self.endpoints.uniprot_entry_url(accession);
        let body = self.get_text(&url, &[])?;
        pdb_ids(&body)
    }

    fn download_structure(&self, id: &str) -> Result<String, StructviewError> {
        let url = self.endpoints.structure_download_url(id);
        log::info!("Downloading {id} from {url}");
        self.get_text(&url, &[])
    }

    fn describe_structure(
        &self,
        id: &str,
    ) -> Result<Vec<StructureDescription>, StructviewError> {
        let url = self.endpoints.structure_describe_url(id);
        let body = self.get_text(&url, &[])?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// PDB identifiers cross-referenced by a UniProt entry, in response order.
fn pdb_ids(body: &str) -> Result<Vec<String>, StructviewError> {
    let entry: UniprotEntry = serde_json::from_str(body)?;
    Ok(entry
        .cross_references
        .into_iter()
        .filter(|r| r.database == "PDB")
        .map(|r| r.id)
        .collect())
}

/// InterMine path query selecting the proteins of one gene object.
fn gene_query_xml(gene_id: &str) -> String {
    format!(
        "<query model=\"genomic\" view=\"Gene.proteins.primaryAccession\">\
         <constraint path=\"Gene.id\" op=\"=\" value=\"{}\"/></query>",
        xml_escape(gene_id)
    )
}

fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
