//! Lesson count reconciliation
//!
//! Merges or splits lessons until the total section count matches the
//! target computed for the processing style, then renumbers everything
//! sequentially. Merging collapses the last two sections of the smallest
//! topic that still has at least two; splitting halves the section with the
//! longest learning content at its line midpoint.
//!
//! The merge loop is guarded: when no topic is eligible to shrink, one
//! filler topic is appended and the next miss terminates the loop with the
//! closest achievable result. Running the reconciler on an already balanced
//! analysis only re-applies the (identical) numbering.

use tracing::{debug, info};

use crate::course::schema::{CourseAnalysis, CourseSection, CourseTopic};

/// Title of the filler topic appended when no topic can be merged.
const FALLBACK_TOPIC_TITLE: &str = "Combined Insights";

/// Force the analysis to contain exactly `target` sections, best effort.
pub fn adjust_lesson_count(analysis: &mut CourseAnalysis, target: usize) {
    let mut current = analysis.section_count();
    debug!("Reconciling lesson count: current {}, target {}", current, target);

    let mut fallback_added = false;
    while current > target {
        match smallest_mergeable_topic(&analysis.topics) {
            Some(index) => {
                merge_last_two_sections(&mut analysis.topics[index]);
                current -= 1;
            }
            None if !fallback_added => {
                // Appending an empty topic cannot reduce the count, so the
                // loop must not take this branch twice.
                analysis.topics.push(CourseTopic {
                    title: FALLBACK_TOPIC_TITLE.to_string(),
                    sections: Vec::new(),
                    related_note_ids: Vec::new(),
                });
                fallback_added = true;
            }
            None => {
                info!(
                    "Reconciliation stopped early: {} sections, target {}",
                    current, target
                );
                break;
            }
        }
    }

    while current < target {
        let Some((topic_index, section_index)) = longest_section(&analysis.topics) else {
            // Undershoot against an empty analysis is not an error
            break;
        };
        split_section(&mut analysis.topics[topic_index], section_index);
        current += 1;
    }

    renumber(analysis);
}

/// Index of the topic with the fewest sections among those with at least
/// two. Ties go to the first occurrence.
fn smallest_mergeable_topic(topics: &[CourseTopic]) -> Option<usize> {
    topics
        .iter()
        .enumerate()
        .filter(|(_, topic)| topic.sections.len() >= 2)
        .min_by_key(|(_, topic)| topic.sections.len())
        .map(|(index, _)| index)
}

/// Collapse the topic's last two sections into one.
fn merge_last_two_sections(topic: &mut CourseTopic) {
    let Some(last) = topic.sections.pop() else {
        return;
    };
    let Some(second_last) = topic.sections.pop() else {
        topic.sections.push(last);
        return;
    };

    let mut note_ids = second_last.note_ids.clone();
    for id in &last.note_ids {
        if !note_ids.contains(id) {
            note_ids.push(*id);
        }
    }

    let merged = CourseSection {
        number: second_last.number.clone(),
        title: format!("{} & {}", second_last.title, last.title),
        learning_content: format!(
            "{}\n\nAdditionally: {}",
            second_last.learning_content, last.learning_content
        ),
        story: format!("{}\n\nRelated story: {}", second_last.story, last.story),
        reflection_question: format!(
            "{}\nAlso consider: {}",
            second_last.reflection_question, last.reflection_question
        ),
        note_ids: note_ids.clone(),
        selected: second_last.selected || last.selected,
    };

    topic.sections.push(merged);
    for id in note_ids {
        if !topic.related_note_ids.contains(&id) {
            topic.related_note_ids.push(id);
        }
    }
}

/// Locate the section with the longest learning content. First occurrence
/// wins ties.
fn longest_section(topics: &[CourseTopic]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, usize)> = None;
    for (topic_index, topic) in topics.iter().enumerate() {
        for (section_index, section) in topic.sections.iter().enumerate() {
            let len = section.learning_content.len();
            if best.map_or(true, |(_, _, best_len)| len > best_len) {
                best = Some((topic_index, section_index, len));
            }
        }
    }
    best.map(|(topic_index, section_index, _)| (topic_index, section_index))
}

/// Replace a section with two halves split at the line midpoint.
fn split_section(topic: &mut CourseTopic, section_index: usize) {
    let original = topic.sections.remove(section_index);
    let lines: Vec<&str> = original.learning_content.split('\n').collect();
    let midpoint = lines.len() / 2;

    let first = CourseSection {
        number: format!("{}a", original.number),
        title: format!("{} (Part 1)", original.title),
        learning_content: lines[..midpoint].join("\n"),
        story: original.story.clone(),
        reflection_question: original.reflection_question.clone(),
        note_ids: original.note_ids.clone(),
        selected: original.selected,
    };
    let second = CourseSection {
        number: format!("{}b", original.number),
        title: format!("{} (Part 2)", original.title),
        learning_content: lines[midpoint..].join("\n"),
        story: original.story,
        reflection_question: original.reflection_question,
        note_ids: original.note_ids,
        selected: original.selected,
    };

    topic.sections.insert(section_index, second);
    topic.sections.insert(section_index, first);
}

/// Renumber every section as "<topicIndex+1>.<sectionIndex+1>".
fn renumber(analysis: &mut CourseAnalysis) {
    for (topic_index, topic) in analysis.topics.iter_mut().enumerate() {
        for (section_index, section) in topic.sections.iter_mut().enumerate() {
            section.number = format!("{}.{}", topic_index + 1, section_index + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(title: &str, content: &str, note_id: i64) -> CourseSection {
        CourseSection {
            number: "0.0".to_string(),
            title: title.to_string(),
            learning_content: content.to_string(),
            story: format!("{} story", title),
            reflection_question: format!("{}?", title),
            note_ids: vec![note_id],
            selected: true,
        }
    }

    fn topic_with(counts: &str, sections: Vec<CourseSection>) -> CourseTopic {
        CourseTopic {
            title: counts.to_string(),
            sections,
            related_note_ids: Vec::new(),
        }
    }

    fn analysis_with_counts(counts: &[usize]) -> CourseAnalysis {
        let topics = counts
            .iter()
            .enumerate()
            .map(|(ti, &n)| {
                let sections = (0..n)
                    .map(|si| section(&format!("t{}s{}", ti, si), "line one\nline two", ti as i64))
                    .collect();
                topic_with(&format!("topic{}", ti), sections)
            })
            .collect();
        CourseAnalysis {
            topics,
            unused_note_ids: Vec::new(),
            recommended_lessons: 0,
            total_notes_processed: 0,
        }
    }

    fn numbers(analysis: &CourseAnalysis) -> Vec<String> {
        analysis
            .topics
            .iter()
            .flat_map(|t| t.sections.iter().map(|s| s.number.clone()))
            .collect()
    }

    #[test]
    fn test_overshoot_merges_down_to_target() {
        let mut analysis = analysis_with_counts(&[1, 3, 2]);
        adjust_lesson_count(&mut analysis, 4);
        assert_eq!(analysis.section_count(), 4);
    }

    #[test]
    fn test_overshoot_always_picks_smallest_eligible_topic() {
        // [1, 3, 2]: first merge must hit the 2-section topic (index 2),
        // leaving [1, 3, 1]; second merge must hit the 3-section topic.
        let mut analysis = analysis_with_counts(&[1, 3, 2]);

        adjust_lesson_count(&mut analysis, 5);
        let counts: Vec<_> = analysis.topics.iter().map(|t| t.sections.len()).collect();
        assert_eq!(counts, vec![1, 3, 1]);

        adjust_lesson_count(&mut analysis, 4);
        let counts: Vec<_> = analysis.topics.iter().map(|t| t.sections.len()).collect();
        assert_eq!(counts, vec![1, 2, 1]);
    }

    #[test]
    fn test_merge_concatenates_fields_and_unions_ids() {
        let mut topic = topic_with(
            "t",
            vec![
                section("First", "c1", 1),
                section("Second", "c2", 2),
            ],
        );
        topic.sections[1].note_ids = vec![2, 1];
        merge_last_two_sections(&mut topic);

        assert_eq!(topic.sections.len(), 1);
        let merged = &topic.sections[0];
        assert_eq!(merged.title, "First & Second");
        assert_eq!(merged.learning_content, "c1\n\nAdditionally: c2");
        assert_eq!(merged.story, "First story\n\nRelated story: Second story");
        assert_eq!(merged.reflection_question, "First?\nAlso consider: Second?");
        assert_eq!(merged.note_ids, vec![1, 2]);
        assert!(merged.selected);
        assert_eq!(topic.related_note_ids, vec![1, 2]);
    }

    #[test]
    fn test_overshoot_with_no_mergeable_topic_stops_early() {
        // Three single-section topics: nothing can merge, target unreachable
        let mut analysis = analysis_with_counts(&[1, 1, 1]);
        adjust_lesson_count(&mut analysis, 2);

        assert_eq!(analysis.section_count(), 3);
        // Exactly one filler topic was appended
        let fillers: Vec<_> = analysis
            .topics
            .iter()
            .filter(|t| t.title == FALLBACK_TOPIC_TITLE)
            .collect();
        assert_eq!(fillers.len(), 1);
        assert!(fillers[0].sections.is_empty());
    }

    #[test]
    fn test_undershoot_splits_preserving_content() {
        let content = "alpha\nbravo\ncharlie\ndelta";
        let mut analysis = CourseAnalysis {
            topics: vec![topic_with("t", vec![section("Long", content, 1)])],
            unused_note_ids: Vec::new(),
            recommended_lessons: 2,
            total_notes_processed: 4,
        };
        adjust_lesson_count(&mut analysis, 2);

        let sections = &analysis.topics[0].sections;
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Long (Part 1)");
        assert_eq!(sections[1].title, "Long (Part 2)");
        assert_eq!(sections[0].learning_content, "alpha\nbravo");
        assert_eq!(sections[1].learning_content, "charlie\ndelta");
        // Halves keep the original story, question, and note ids
        assert_eq!(sections[0].story, sections[1].story);
        assert_eq!(sections[0].note_ids, vec![1]);
    }

    #[test]
    fn test_undershoot_splits_longest_section_first() {
        let mut analysis = CourseAnalysis {
            topics: vec![topic_with(
                "t",
                vec![
                    section("Short", "one line", 1),
                    section("Long", "a\nb\nc\nd\ne\nf", 1),
                ],
            )],
            unused_note_ids: Vec::new(),
            recommended_lessons: 3,
            total_notes_processed: 0,
        };
        adjust_lesson_count(&mut analysis, 3);

        let titles: Vec<_> = analysis.topics[0]
            .sections
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Short", "Long (Part 1)", "Long (Part 2)"]);
    }

    #[test]
    fn test_undershoot_against_empty_analysis_is_a_no_op() {
        let mut analysis = CourseAnalysis::empty();
        adjust_lesson_count(&mut analysis, 5);
        assert_eq!(analysis.section_count(), 0);
    }

    #[test]
    fn test_renumbering_is_contiguous() {
        let mut analysis = analysis_with_counts(&[2, 1, 3]);
        adjust_lesson_count(&mut analysis, 6);
        assert_eq!(
            numbers(&analysis),
            vec!["1.1", "1.2", "2.1", "3.1", "3.2", "3.3"]
        );
    }

    #[test]
    fn test_reconciler_is_idempotent_on_balanced_input() {
        let mut analysis = analysis_with_counts(&[1, 3, 2]);
        adjust_lesson_count(&mut analysis, 4);
        let first_pass = analysis.clone();

        adjust_lesson_count(&mut analysis, 4);
        assert_eq!(analysis, first_pass);
    }
}
