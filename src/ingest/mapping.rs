//! Column-to-field mapping built from observed headers.

use crate::models::{CanonicalField, MappedColumn};

use super::resolver::{HeaderResolver, MatchTier};

/// Which column feeds which canonical field.
///
/// Each field maps to at most one column and each column feeds at most one
/// field. Columns are kept in canonical field order, so a full-name column is
/// always applied before explicit surname or given-name columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: Vec<MappedColumn>,
}

impl ColumnMapping {
    /// Builds a mapping from `(column key, header text)` pairs.
    ///
    /// Assignment is greedy by match quality: the pending field with the best
    /// resolver tier claims its header first, ties going to the field listed
    /// earlier in [`CanonicalField::ALL`]. A claimed header is withdrawn from
    /// the candidates of every other field.
    pub fn build(resolver: &HeaderResolver<'_>, headers: &[(String, String)]) -> Self {
        let mut claimed = vec![false; headers.len()];
        let mut pending: Vec<CanonicalField> = CanonicalField::ALL.to_vec();
        let mut columns = Vec::new();

        loop {
            let available: Vec<usize> = (0..headers.len()).filter(|i| !claimed[*i]).collect();
            let texts: Vec<&str> = available.iter().map(|i| headers[*i].1.as_str()).collect();

            let mut best: Option<(MatchTier, usize, usize)> = None;
            for (field_index, field) in pending.iter().enumerate() {
                let Some(found) = resolver.resolve_with_tier(*field, &texts) else {
                    continue;
                };
                let Some(position) = texts.iter().position(|text| *text == found.header) else {
                    continue;
                };
                if best.is_none_or(|(tier, _, _)| found.tier < tier) {
                    best = Some((found.tier, field_index, available[position]));
                }
            }

            let Some((_, field_index, header_index)) = best else {
                break;
            };
            let field = pending.remove(field_index);
            claimed[header_index] = true;
            let (column, header) = &headers[header_index];
            columns.push(MappedColumn {
                field,
                column: column.clone(),
                header: header.clone(),
            });
        }

        columns.sort_by_key(|mapped| mapped.field);
        Self { columns }
    }

    /// Builds a mapping where each column key is its own header text.
    pub fn from_keys<'k>(
        resolver: &HeaderResolver<'_>,
        keys: impl IntoIterator<Item = &'k str>,
    ) -> Self {
        let headers: Vec<(String, String)> = keys
            .into_iter()
            .map(|key| (key.to_string(), key.to_string()))
            .collect();
        Self::build(resolver, &headers)
    }

    /// The mapped columns in canonical field order.
    pub fn columns(&self) -> &[MappedColumn] {
        &self.columns
    }

    /// The column feeding `field`, if any.
    pub fn column_for(&self, field: CanonicalField) -> Option<&str> {
        self.columns
            .iter()
            .find(|mapped| mapped.field == field)
            .map(|mapped| mapped.column.as_str())
    }

    /// Number of mapped fields.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if no field was mapped.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
