//! Gene → candidate structure resolution.

use crate::error::StructviewError;
use crate::service::Backend;

/// Resolve the ordered candidate structure identifiers for `gene_id`.
///
/// Looks up the gene's proteins against `service_url`, takes the first
/// protein's primary accession and returns the structure identifiers
/// cross-referenced by it, in service order.
///
/// # Errors
///
/// Propagates lookup failures; a gene without proteins yields
/// [`StructviewError::NoProteins`].
pub fn resolve(
    backend: &dyn Backend,
    gene_id: &str,
    service_url: &str,
) -> Result<Vec<String>, StructviewError> {
    log::info!("resolving structures for gene {gene_id} via {service_url}");
    let gene = backend.gene_to_protein(gene_id, service_url)?;
    let accession = gene
        .proteins
        .into_iter()
        .next()
        .map(|p| p.primary_accession)
        .ok_or_else(|| StructviewError::NoProteins {
            gene_id: gene_id.to_owned(),
        })?;
    log::debug!("gene {gene_id} → accession {accession}");

    let ids = backend.accession_to_pdb(&accession)?;
    log::info!("{} structure(s) for {accession}", ids.len());
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RESOLVE_FALLBACK_MESSAGE;
    use crate::service::mock::{Call, MockBackend};
    use crate::service::GeneRecord;

    #[test]
    fn returns_ids_in_lookup_order() {
        let backend = MockBackend::with_ids(&["2XYZ", "1ABC", "3DEF"]);
        let ids = resolve(&backend, "G1", "https://mine.example").unwrap();
        assert_eq!(ids, vec!["2XYZ", "1ABC", "3DEF"]);
        assert_eq!(
            backend.calls(),
            vec![
                Call::GeneToProtein("G1".into(), "https://mine.example".into()),
                Call::AccessionToPdb("P1".into()),
            ]
        );
    }

    #[test]
    fn gene_without_proteins_fails_before_second_lookup() {
        let backend = MockBackend {
            gene: Some(GeneRecord::default()),
            ..MockBackend::with_ids(&["1ABC"])
        };
        let err = resolve(&backend, "G1", "url").unwrap_err();
        assert!(matches!(err, StructviewError::NoProteins { .. }));
        assert_eq!(err.user_message(), RESOLVE_FALLBACK_MESSAGE);
        assert_eq!(backend.calls().len(), 1);
    }

    #[test]
    fn lookup_failure_propagates() {
        let backend = MockBackend {
            gene_error: Some("connection reset".into()),
            ..MockBackend::default()
        };
        let err = resolve(&backend, "G1", "url").unwrap_err();
        assert_eq!(err.user_message(), RESOLVE_FALLBACK_MESSAGE);
    }
}
