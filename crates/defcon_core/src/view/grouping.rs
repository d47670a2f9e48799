//! Grouping of tasks by urgency level.

use crate::model::task::{Level, Task};
use std::collections::BTreeMap;

/// Tasks partitioned by level, iterated in ascending level order.
pub type GroupedTasks = BTreeMap<Level, Vec<Task>>;

/// Stable partition of `tasks` by `level`.
///
/// Levels without tasks have no entry at all; an empty group never appears.
pub fn group_by_level(tasks: &[Task]) -> GroupedTasks {
    let mut groups = GroupedTasks::new();
    for task in tasks {
        groups.entry(task.level).or_default().push(task.clone());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::group_by_level;
    use crate::model::task::{Level, Task};

    fn task(id: i64, level: i64) -> Task {
        Task::new(id, Level(level), format!("task {id}"), 0)
    }

    #[test]
    fn partitions_stably_in_ascending_level_order() {
        let tasks = vec![task(1, 1), task(2, 3), task(3, 1), task(4, 2)];
        let groups = group_by_level(&tasks);

        let keys: Vec<_> = groups.keys().map(|level| level.value()).collect();
        assert_eq!(keys, vec![1, 2, 3]);

        let level_one: Vec<_> = groups[&Level(1)].iter().map(|task| task.id).collect();
        assert_eq!(level_one, vec![1, 3]);
        assert_eq!(groups[&Level(2)].len(), 1);
        assert_eq!(groups[&Level(3)].len(), 1);
        assert!(!groups.contains_key(&Level(4)));
        assert!(!groups.contains_key(&Level(5)));
    }

    #[test]
    fn emptied_level_disappears() {
        let mut tasks = vec![task(1, 4), task(2, 1)];
        assert!(group_by_level(&tasks).contains_key(&Level(4)));

        tasks.retain(|task| task.id != 1);
        let groups = group_by_level(&tasks);
        assert!(!groups.contains_key(&Level(4)));
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn unrecognized_levels_keep_their_literal_key() {
        let groups = group_by_level(&[task(1, 0), task(2, 42), task(3, -1)]);
        let keys: Vec<_> = groups.keys().map(|level| level.value()).collect();
        assert_eq!(keys, vec![-1, 0, 42]);
    }

    #[test]
    fn empty_input_has_no_groups() {
        assert!(group_by_level(&[]).is_empty());
    }
}
