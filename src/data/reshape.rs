use super::model::{RelianceRecord, RelianceType, Study};

/// Melt the wide study table into one record per recorded reliance outcome.
///
/// Rows come out in study order, and within a study in outcome-column order
/// (over, under, appropriate). Empty outcome cells produce nothing.
pub fn melt(studies: &[Study]) -> Vec<RelianceRecord> {
    let mut records = Vec::with_capacity(studies.len() * RelianceType::ALL.len());

    for study in studies {
        for kind in RelianceType::ALL {
            let Some(effect) = study.outcome(kind) else {
                continue;
            };
            if effect.is_empty() {
                continue;
            }
            records.push(RelianceRecord {
                attributes: study.attributes.clone(),
                reliance_type: kind,
                effect: effect.to_string(),
            });
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::study;
    use crate::data::model::Column;

    #[test]
    fn r1_expands_into_over_and_appropriate_rows() {
        let records = melt(&[study("R1", "Visual", "Heatmap", ["Increase", "", "Decrease"])]);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].reliance_type, RelianceType::OverReliance);
        assert_eq!(records[0].effect, "Increase");
        assert_eq!(records[1].reliance_type, RelianceType::AppropriateReliance);
        assert_eq!(records[1].effect, "Decrease");
        for r in &records {
            assert_eq!(r.value(Column::Ref), Some("R1"));
            assert_eq!(r.value(Column::Modality), Some("Visual"));
        }
    }

    #[test]
    fn emits_one_row_per_non_empty_outcome() {
        let studies = [
            study("A", "Visual", "Chart", ["", "", ""]),
            study("B", "Visual", "Chart", ["Increase", "", ""]),
            study("C", "Textual", "Rules", ["Increase", "Decrease", ""]),
            study("D", "Textual", "Rules", ["Decrease", "Increase", "Increase"]),
        ];
        let records = melt(&studies);

        for (s, expected) in studies.iter().zip([0, 1, 2, 3]) {
            let produced: Vec<_> = records
                .iter()
                .filter(|r| r.attributes == s.attributes)
                .collect();
            assert_eq!(produced.len(), expected);
        }
        assert!(records.iter().all(|r| !r.effect.is_empty()));
    }

    #[test]
    fn keeps_study_then_outcome_order() {
        let records = melt(&[
            study("A", "Visual", "Chart", ["", "Decrease", "Increase"]),
            study("B", "Visual", "Chart", ["Increase", "", ""]),
        ]);
        let order: Vec<_> = records
            .iter()
            .map(|r| (r.value(Column::Ref).unwrap_or_default(), r.reliance_type))
            .collect();
        assert_eq!(
            order,
            vec![
                ("A", RelianceType::UnderReliance),
                ("A", RelianceType::AppropriateReliance),
                ("B", RelianceType::OverReliance),
            ]
        );
    }

    #[test]
    fn missing_identifier_propagates_as_missing() {
        let records = melt(&[study("", "", "Chart", ["Increase", "", ""])]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value(Column::Ref), None);
        assert_eq!(records[0].value(Column::Modality), None);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        assert!(melt(&[]).is_empty());
    }
}
