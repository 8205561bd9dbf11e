use crate::repositories::{GoalInput, Scope};
use chrono::NaiveDate;

/// 生成される要約の最大文字数（プロンプト内の指示として使う）
const SUMMARY_CHAR_LIMIT: usize = 480;

/// 期間の開始日をスコープに応じた表記にする
/// week -> "June 2, 2025" / month -> "June 2025" / year -> "2025"
pub fn format_period(scope: Scope, week_start: NaiveDate) -> String {
    match scope {
        Scope::Week => week_start.format("%B %-d, %Y").to_string(),
        Scope::Month => week_start.format("%B %Y").to_string(),
        Scope::Year => week_start.format("%Y").to_string(),
    }
}

/// 目標・達成事項リストから要約プロバイダに渡すプロンプトを組み立てる。
/// 入力が同じなら出力も必ず同じになる（決定的）。
pub fn compose_summary_prompt(
    scope: Scope,
    summary_title: &str,
    week_start: NaiveDate,
    goals: &[GoalInput],
) -> String {
    let period = format_period(scope, week_start);

    let mut prompt = String::new();
    prompt.push_str(&format!(
        "You are writing a {} summary titled \"{}\".\n",
        scope, summary_title
    ));
    prompt.push_str("Here are the goals and accomplishments to summarize:\n\n");

    for goal in goals {
        prompt.push_str(&format!("Goal: {}\n", goal.title));
        prompt.push_str(&format!("Description: {}\n", goal.description));
        prompt.push_str(&format!("Category: {}\n", goal.category));

        // ステータス未設定の場合は "Not provided" を明示する
        match goal.status.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(status) => prompt.push_str(&format!("Status: {}\n", status)),
            None => prompt.push_str("Status: Not provided\n"),
        }
        if let Some(notes) = goal.status_notes.as_deref().filter(|s| !s.trim().is_empty()) {
            prompt.push_str(&format!("Status notes: {}\n", notes));
        }

        prompt.push_str("Accomplishments:\n");
        for (index, accomplishment) in goal.accomplishments.iter().enumerate() {
            prompt.push_str(&format!(
                "{}. {}: {} <br/>Impact: {}\n",
                index + 1,
                accomplishment.title,
                accomplishment.description,
                accomplishment.impact
            ));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        "Write an encouraging narrative summary of the work above. \
        Keep the final summary under {} characters and do not repeat the goals \
        or accomplishments as a raw list. This summary covers the {} of {}.",
        SUMMARY_CHAR_LIMIT, scope, period
    ));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::AccomplishmentInput;

    fn sample_goal() -> GoalInput {
        GoalInput {
            title: "Ship X".to_string(),
            description: "desc".to_string(),
            category: "Technical skills".to_string(),
            status: None,
            status_notes: None,
            status_set_at: None,
            accomplishments: vec![AccomplishmentInput {
                title: "Wrote tests".to_string(),
                description: "unit tests".to_string(),
                impact: "Medium".to_string(),
            }],
        }
    }

    fn june_2_2025() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    #[test]
    fn formats_period_per_scope() {
        let date = june_2_2025();
        assert_eq!(format_period(Scope::Week, date), "June 2, 2025");
        assert_eq!(format_period(Scope::Month, date), "June 2025");
        assert_eq!(format_period(Scope::Year, date), "2025");
    }

    #[test]
    fn composition_is_deterministic() {
        let goals = vec![sample_goal()];
        let first = compose_summary_prompt(Scope::Week, "Summary for week", june_2_2025(), &goals);
        let second = compose_summary_prompt(Scope::Week, "Summary for week", june_2_2025(), &goals);
        assert_eq!(first, second);
    }

    #[test]
    fn missing_status_falls_back_to_not_provided() {
        let goals = vec![sample_goal()];
        let prompt = compose_summary_prompt(Scope::Week, "Summary", june_2_2025(), &goals);
        assert!(prompt.contains("Status: Not provided"));
        assert!(!prompt.contains("Status notes:"));
    }

    #[test]
    fn status_and_notes_are_rendered_when_present() {
        let mut goal = sample_goal();
        goal.status = Some("On track".to_string());
        goal.status_notes = Some("Halfway done".to_string());
        let prompt = compose_summary_prompt(Scope::Week, "Summary", june_2_2025(), &[goal]);
        assert!(prompt.contains("Status: On track"));
        assert!(prompt.contains("Status notes: Halfway done"));
    }

    #[test]
    fn accomplishments_are_numbered() {
        let mut goal = sample_goal();
        goal.accomplishments.push(AccomplishmentInput {
            title: "Fixed bug".to_string(),
            description: "login issue".to_string(),
            impact: "High".to_string(),
        });
        let prompt = compose_summary_prompt(Scope::Week, "Summary", june_2_2025(), &[goal]);
        assert!(prompt.contains("1. Wrote tests: unit tests <br/>Impact: Medium"));
        assert!(prompt.contains("2. Fixed bug: login issue <br/>Impact: High"));
    }

    #[test]
    fn empty_accomplishment_list_is_allowed() {
        let mut goal = sample_goal();
        goal.accomplishments.clear();
        let prompt = compose_summary_prompt(Scope::Week, "Summary", june_2_2025(), &[goal]);
        assert!(prompt.contains("Accomplishments:\n\n"));
    }

    #[test]
    fn instruction_includes_character_limit() {
        let prompt = compose_summary_prompt(Scope::Month, "Summary", june_2_2025(), &[]);
        assert!(prompt.contains("under 480 characters"));
        assert!(prompt.ends_with("This summary covers the month of June 2025."));
    }
}
