//! Reference/enrichment join for the derived view

use std::collections::HashMap;

use serde_json::Value;

use crate::models::{EnrichedPokemon, MergedPokemon, RankedPokemon};

/// Inner-join reference and enrichment records on identifier.
///
/// Callers must skip the merge stage entirely when `enriched` is empty:
/// downstream treats "nothing new this run" as a distinct case from
/// "nothing matched".
pub fn merge(reference: &[RankedPokemon], enriched: &[EnrichedPokemon]) -> Vec<MergedPokemon> {
    let by_id: HashMap<i64, &EnrichedPokemon> =
        enriched.iter().map(|record| (record.id, record)).collect();

    reference
        .iter()
        .filter_map(|record| by_id.get(&record.id).map(|e| merge_one(record, e)))
        .collect()
}

fn merge_one(record: &RankedPokemon, enrichment: &EnrichedPokemon) -> MergedPokemon {
    let mut fields = record.attributes.clone();

    let enrichment_fields = [
        ("types", &enrichment.types),
        ("abilities", &enrichment.abilities),
        ("generation", &enrichment.generation),
    ];

    for (name, value) in enrichment_fields {
        // Suffix both sides only when the names actually collide
        if let Some(existing) = fields.remove(name) {
            fields.insert(format!("{name}_ref"), existing);
            fields.insert(format!("{name}_api"), Value::String(value.clone()));
        } else {
            fields.insert(name.to_string(), Value::String(value.clone()));
        }
    }

    MergedPokemon {
        id: record.id,
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn enriched(id: i64) -> EnrichedPokemon {
        EnrichedPokemon {
            id,
            types: "grass, poison".to_string(),
            abilities: "overgrow".to_string(),
            generation: "generation-i".to_string(),
        }
    }

    #[test]
    fn test_inner_join_keeps_only_matches() {
        let reference = vec![
            RankedPokemon::new(1).with_attribute("rank", json!(3)),
            RankedPokemon::new(2).with_attribute("rank", json!(7)),
        ];
        let merged = merge(&reference, &[enriched(1)]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, 1);
        assert_eq!(merged[0].fields["rank"], json!(3));
        assert_eq!(merged[0].fields["types"], json!("grass, poison"));
        assert_eq!(merged[0].fields["generation"], json!("generation-i"));
    }

    #[test]
    fn test_no_matches_yields_empty_join() {
        let reference = vec![RankedPokemon::new(4)];
        let merged = merge(&reference, &[enriched(9)]);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_colliding_names_are_suffixed() {
        let reference =
            vec![RankedPokemon::new(1).with_attribute("generation", json!("from-warehouse"))];
        let merged = merge(&reference, &[enriched(1)]);

        let fields = &merged[0].fields;
        assert_eq!(fields["generation_ref"], json!("from-warehouse"));
        assert_eq!(fields["generation_api"], json!("generation-i"));
        assert!(!fields.contains_key("generation"));
        // Non-colliding enrichment fields keep their plain names
        assert_eq!(fields["abilities"], json!("overgrow"));
    }

    #[test]
    fn test_duplicate_reference_rows_each_join() {
        let reference = vec![RankedPokemon::new(1), RankedPokemon::new(1)];
        let merged = merge(&reference, &[enriched(1)]);
        assert_eq!(merged.len(), 2);
    }
}
