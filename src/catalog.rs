//! Form Field Catalog
//!
//! Static table of the psychological document types the assistant drafts and
//! the fields each one asks for, in the order they appear on the form.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DocumentType {
    Declaracao,
    Atestado,
    RelatorioPsicologico,
    RelatorioMultiprofissional,
    Laudo,
    Parecer,
}

impl DocumentType {
    /// Selector order.
    pub const ALL: [DocumentType; 6] = [
        DocumentType::Declaracao,
        DocumentType::Atestado,
        DocumentType::RelatorioPsicologico,
        DocumentType::RelatorioMultiprofissional,
        DocumentType::Laudo,
        DocumentType::Parecer,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Declaracao => "Declaração Psicológica",
            DocumentType::Atestado => "Atestado Psicológico",
            DocumentType::RelatorioPsicologico => "Relatório Psicológico",
            DocumentType::RelatorioMultiprofissional => "Relatório Multiprofissional",
            DocumentType::Laudo => "Laudo Psicológico",
            DocumentType::Parecer => "Parecer Psicológico",
        }
    }

    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            DocumentType::Declaracao => &[
                "nome completo do(a) paciente",
                "finalidade da declaração",
                "informações sobre o atendimento",
            ],
            DocumentType::Atestado => &[
                "nome da pessoa/instituição atendida",
                "solicitante",
                "finalidade",
                "descrição das condições psicológicas",
                "cid (opcional)",
                "observações finais",
            ],
            DocumentType::RelatorioPsicologico | DocumentType::RelatorioMultiprofissional => &[
                "identificação",
                "descrição da demanda",
                "procedimento",
                "análise",
                "conclusão",
            ],
            DocumentType::Laudo => &[
                "identificação",
                "descrição da demanda",
                "procedimento",
                "análise",
                "conclusão",
                "referências",
            ],
            DocumentType::Parecer => &[
                "identificação",
                "descrição da demanda",
                "análise",
                "conclusão",
                "referências",
            ],
        }
    }

    /// Case-insensitive match on the label, ignoring surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.label().to_lowercase() == wanted)
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered field names for a document type label. Unknown labels yield an
/// empty list.
pub fn fields_for(document_type: &str) -> Vec<String> {
    DocumentType::from_label(document_type)
        .map(|t| t.fields().iter().map(|f| f.to_string()).collect())
        .unwrap_or_default()
}

/// Catalog entry as served to the form.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub document_type: &'static str,
    pub fields: Vec<&'static str>,
}

pub fn catalog() -> Vec<CatalogEntry> {
    DocumentType::ALL
        .iter()
        .map(|t| CatalogEntry {
            document_type: t.label(),
            fields: t.fields().to_vec(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_for_relatorio() {
        assert_eq!(
            fields_for("Relatório Psicológico"),
            vec!["identificação", "descrição da demanda", "procedimento", "análise", "conclusão"]
        );
    }

    #[test]
    fn test_fields_for_is_case_insensitive() {
        assert_eq!(fields_for("laudo psicológico"), fields_for("Laudo Psicológico"));
        assert_eq!(fields_for("  PARECER PSICOLÓGICO "), fields_for("Parecer Psicológico"));
        assert_eq!(fields_for("Parecer Psicológico").len(), 5);
    }

    #[test]
    fn test_fields_for_unknown_is_empty() {
        assert!(fields_for("Receita Médica").is_empty());
        assert!(fields_for("").is_empty());
    }

    #[test]
    fn test_fields_for_is_deterministic() {
        for t in DocumentType::ALL {
            assert_eq!(fields_for(t.label()), fields_for(t.label()));
        }
    }

    #[test]
    fn test_every_type_has_three_to_seven_fields() {
        for t in DocumentType::ALL {
            let n = t.fields().len();
            assert!((3..=7).contains(&n), "{} has {} fields", t, n);
        }
    }

    #[test]
    fn test_catalog_keeps_selector_order() {
        let labels: Vec<_> = catalog().into_iter().map(|e| e.document_type).collect();
        assert_eq!(labels.first(), Some(&"Declaração Psicológica"));
        assert_eq!(labels.last(), Some(&"Parecer Psicológico"));
        assert_eq!(labels.len(), 6);
    }
}
