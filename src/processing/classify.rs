use crate::processing::types::{
    Category, ClassifiedWorkouts, Discipline, DisciplineSubset, WorkoutRecord,
};

/// Map a raw `WorkoutType` tag onto a discipline.
///
/// Exact tags win; otherwise a case-insensitive substring match catches free
/// text such as "Open Water Swim" or "Indoor Cycling".
pub fn classify_tag(tag: Option<&str>) -> Category {
    let Some(tag) = tag.map(str::trim).filter(|tag| !tag.is_empty()) else {
        return Category::Unclassified;
    };

    match tag {
        "Swim" => return Category::Discipline(Discipline::Swim),
        "Bike" | "Ride" => return Category::Discipline(Discipline::Bike),
        "Run" => return Category::Discipline(Discipline::Run),
        _ => {}
    }

    let lowered = tag.to_lowercase();
    if lowered.contains("swim") {
        Category::Discipline(Discipline::Swim)
    } else if lowered.contains("bike") || lowered.contains("cycl") {
        Category::Discipline(Discipline::Bike)
    } else if lowered.contains("run") {
        Category::Discipline(Discipline::Run)
    } else {
        Category::Other
    }
}

/// A record only counts towards statistics with positive distance, duration
/// and velocity.
pub fn is_valid(record: &WorkoutRecord) -> bool {
    record.distance_m > 0.0 && record.duration_h > 0.0 && record.velocity_mps > 0.0
}

pub fn classify(records: &[WorkoutRecord]) -> ClassifiedWorkouts {
    let mut classified = ClassifiedWorkouts {
        swim: DisciplineSubset::new(Discipline::Swim),
        bike: DisciplineSubset::new(Discipline::Bike),
        run: DisciplineSubset::new(Discipline::Run),
        other: Vec::new(),
        unclassified: Vec::new(),
        excluded: Vec::new(),
    };

    for record in records {
        match classify_tag(record.discipline_tag.as_deref()) {
            Category::Discipline(_) if !is_valid(record) => {
                classified.excluded.push(record.clone());
            }
            Category::Discipline(Discipline::Swim) => classified.swim.records.push(record.clone()),
            Category::Discipline(Discipline::Bike) => classified.bike.records.push(record.clone()),
            Category::Discipline(Discipline::Run) => classified.run.records.push(record.clone()),
            Category::Other => classified.other.push(record.clone()),
            Category::Unclassified => classified.unclassified.push(record.clone()),
        }
    }

    classified
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workout(tag: &str, distance_m: f64) -> WorkoutRecord {
        WorkoutRecord {
            discipline_tag: Some(tag.to_string()),
            distance_m,
            duration_h: 1.0,
            velocity_mps: 2.5,
            ..WorkoutRecord::default()
        }
    }

    #[test]
    fn free_text_tags_fall_back_to_patterns() {
        assert_eq!(
            classify_tag(Some("Ride")),
            Category::Discipline(Discipline::Bike)
        );
        assert_eq!(
            classify_tag(Some("Indoor Cycling")),
            Category::Discipline(Discipline::Bike)
        );
        assert_eq!(
            classify_tag(Some("Open Water Swim")),
            Category::Discipline(Discipline::Swim)
        );
        assert_eq!(
            classify_tag(Some("Trail Running")),
            Category::Discipline(Discipline::Run)
        );
        assert_eq!(classify_tag(Some("Strength")), Category::Other);
        assert_eq!(classify_tag(Some("Day Off")), Category::Other);
        assert_eq!(classify_tag(None), Category::Unclassified);
        assert_eq!(classify_tag(Some("  ")), Category::Unclassified);
    }

    #[test]
    fn non_positive_distance_never_reaches_a_subset() {
        let records = vec![
            workout("Run", 10_000.0),
            workout("Run", 0.0),
            workout("Swim", -50.0),
            workout("Strength", 0.0),
        ];

        let classified = classify(&records);
        assert_eq!(classified.run.len(), 1);
        assert!(classified.swim.is_empty());
        assert_eq!(classified.excluded.len(), 2);
        assert_eq!(classified.other.len(), 1);
        assert!(classified.validated().all(|record| record.distance_m > 0.0));
    }

    #[test]
    fn reclassifying_a_subset_is_idempotent() {
        let records = vec![
            workout("Bike", 40_000.0),
            workout("Indoor Cycling", 30_000.0),
            workout("Run", 8_000.0),
        ];

        let first = classify(&records);
        let again = classify(&first.bike.records);

        assert_eq!(again.bike, first.bike);
        assert!(again.run.is_empty() && again.excluded.is_empty());
    }
}
