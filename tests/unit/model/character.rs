use serde_json::json;

use super::*;

#[test]
fn team_accepts_american_spelling() {
    let t: Team = serde_json::from_value(json!("traveler")).unwrap();
    assert_eq!(t, Team::Traveller);
    assert_eq!(serde_json::to_value(Team::Traveller).unwrap(), json!("traveller"));
}

#[test]
fn image_ref_accepts_string_or_list() {
    let c: Character = serde_json::from_value(json!({
        "id": "imp", "name": "Imp", "team": "demon", "image": "https://x/imp.png"
    }))
    .unwrap();
    assert_eq!(c.image.primary(), Some("https://x/imp.png"));

    let c: Character = serde_json::from_value(json!({
        "id": "imp", "name": "Imp", "team": "demon", "image": ["", "a.png", "b.png"]
    }))
    .unwrap();
    assert_eq!(c.image.urls(), vec!["a.png", "b.png"]);
    assert_eq!(c.image.primary(), Some("a.png"));

    let c: Character = serde_json::from_value(json!({"id": "x", "name": "X"})).unwrap();
    assert_eq!(c.image, ImageRef::None);
    assert_eq!(c.image.primary(), None);
}

#[test]
fn reminders_include_global_and_skip_blank() {
    let c: Character = serde_json::from_value(json!({
        "id": "poisoner",
        "name": "Poisoner",
        "team": "minion",
        "reminders": ["Poisoned", " "],
        "remindersGlobal": ["Is the Poisoner"],
        "firstNightReminder": "The Poisoner chooses a player."
    }))
    .unwrap();
    assert_eq!(
        c.all_reminders().collect::<Vec<_>>(),
        vec!["Poisoned", "Is the Poisoner"]
    );
    assert_eq!(c.reminder_count(), 2);
    assert!(!c.first_night_reminder.is_empty());
}
