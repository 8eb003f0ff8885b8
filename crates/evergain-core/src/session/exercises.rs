use std::collections::BTreeMap;

use crate::models::Exercise;

/// Group exercises by primary muscle group. Groups are sorted by name;
/// exercises keep their server order within a group.
pub fn group_by_muscle(exercises: &[Exercise]) -> BTreeMap<String, Vec<Exercise>> {
    let mut groups: BTreeMap<String, Vec<Exercise>> = BTreeMap::new();
    for exercise in exercises {
        groups
            .entry(exercise.muscle_group.clone())
            .or_default()
            .push(exercise.clone());
    }
    groups
}

/// Exercise display line: name plus the secondary muscle when there is one.
pub fn describe(exercise: &Exercise) -> String {
    match exercise.secondary_muscle() {
        Some(secondary) => format!("{} ({} / {})", exercise.name, exercise.muscle_group, secondary),
        None => format!("{} ({})", exercise.name, exercise.muscle_group),
    }
}
