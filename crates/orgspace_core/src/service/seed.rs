//! Example entities used to initialize an empty or unreadable store.

use crate::model::checklist::ChecklistItem;
use crate::model::entity::{generate_entity_id, Entity, EntityType, Priority};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::{json, Map};

/// Number of entities in the seed dataset.
pub const SEED_ENTITY_COUNT: usize = 6;

/// Builds the seed dataset with freshly generated ids.
pub fn seed_entities() -> Vec<Entity> {
    let mut website = seed(
        EntityType::Project,
        "Website Redesign",
        "Complete overhaul of company website with modern design",
        Priority::High,
        &["work", "design"],
        "#6366f1",
        (2025, 1, 15),
    );
    website.due_date = NaiveDate::from_ymd_opt(2025, 3, 1);
    website.checklist = items(&[
        ("Create wireframes", true),
        ("Design mockups", true),
        ("Develop frontend", false),
        ("Test on all devices", false),
    ]);

    let mut review = seed(
        EntityType::Task,
        "Review quarterly goals",
        "Assess progress and adjust targets for Q2",
        Priority::Medium,
        &["planning"],
        "#10b981",
        (2025, 2, 1),
    );
    review.due_date = NaiveDate::from_ymd_opt(2025, 2, 15);

    let mut spanish = seed(
        EntityType::Goal,
        "Learn Spanish",
        "Achieve conversational fluency by end of year",
        Priority::Medium,
        &["personal", "learning"],
        "#f59e0b",
        (2025, 1, 1),
    );
    spanish.due_date = NaiveDate::from_ymd_opt(2025, 12, 31);
    spanish.checklist = items(&[
        ("Complete Duolingo basics", true),
        ("Practice 30 min daily", false),
        ("Watch Spanish TV shows", false),
        ("Have first conversation", false),
    ]);
    let mut goal_fields = Map::new();
    goal_fields.insert("progress".to_string(), json!(35));
    spanish.custom_fields = goal_fields;

    let meeting = seed(
        EntityType::Note,
        "Meeting Notes - Jan 10",
        "Discussed Q1 strategy and team assignments. Key takeaways include new project timeline and resource allocation.",
        Priority::Low,
        &["work", "meetings"],
        "#8b5cf6",
        (2025, 1, 10),
    );

    let mut routine = seed(
        EntityType::Checklist,
        "Morning Routine",
        "Daily morning routine to start the day right",
        Priority::High,
        &["routine", "daily"],
        "#ec4899",
        (2025, 1, 5),
    );
    routine.checklist = items(&[
        ("Wake up at 6 AM", false),
        ("Drink water", false),
        ("Exercise for 30 minutes", false),
        ("Shower and get ready", false),
        ("Healthy breakfast", false),
        ("Review daily goals", false),
    ]);

    let mut troubleshooting = seed(
        EntityType::Checklist,
        "Computer Troubleshooting",
        "Steps to diagnose and fix common computer issues",
        Priority::Medium,
        &["tech", "troubleshooting"],
        "#06b6d4",
        (2025, 1, 8),
    );
    troubleshooting.checklist = items(&[
        ("Restart the computer", false),
        ("Check all cable connections", false),
        ("Run antivirus scan", false),
        ("Update all drivers", false),
        ("Clear browser cache", false),
        ("Check for system updates", false),
    ]);

    vec![website, review, spanish, meeting, routine, troubleshooting]
}

fn seed(
    kind: EntityType,
    title: &str,
    description: &str,
    priority: Priority,
    tags: &[&str],
    color: &str,
    created: (i32, u32, u32),
) -> Entity {
    let mut entity = Entity::new(kind, title);
    entity.id = generate_entity_id();
    entity.description = Some(description.to_string());
    entity.priority = priority;
    entity.tags = tags.iter().map(|tag| (*tag).to_string()).collect();
    entity.color = color.to_string();
    entity.created_at = midnight_utc(created);
    entity
}

fn items(rows: &[(&str, bool)]) -> Vec<ChecklistItem> {
    rows.iter()
        .map(|(text, completed)| ChecklistItem {
            completed: *completed,
            ..ChecklistItem::new(*text)
        })
        .collect()
}

fn midnight_utc((year, month, day): (i32, u32, u32)) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}
