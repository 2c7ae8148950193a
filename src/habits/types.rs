use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub streak: u32,
    /// Last day the habit was marked done, stored as `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_done: Option<NaiveDate>,
}

/// What a tick did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StreakTransition {
    /// Done yesterday too: streak grew by one.
    Continued,
    /// First tick, or a gap of two or more days: streak is 1.
    Restarted,
    /// Already ticked today: nothing changed.
    AlreadyDone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickOutcome {
    pub habit: Habit,
    pub transition: StreakTransition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_done_is_plain_date_and_optional() {
        let fresh = Habit { id: "h".into(), title: "Uống nước".into(), streak: 0, last_done: None };
        let json = serde_json::to_string(&fresh).unwrap();
        assert!(!json.contains("lastDone"));

        let stored: Habit =
            serde_json::from_str(r#"{"id":"h","title":"t","streak":3,"lastDone":"2024-01-02"}"#).unwrap();
        assert_eq!(stored.last_done, NaiveDate::from_ymd_opt(2024, 1, 2));
    }
}
