// All LLM prompt text for the coaching generator lives here.
// The numbered output items are what the coaching panel expects back; change
// them here or nowhere.

/// System role for every coaching call.
pub const COACHING_SYSTEM: &str = "You are a leadership coach.";

/// Coaching request template.
/// Filled by `render_coaching_prompt`: {profile_block}, {history_block}
pub const COACHING_PROMPT_TEMPLATE: &str = r#"당신은 전설적인 실리콘밸리 리더십 코치 Bill Campbell 스타일의 AI 코치입니다.

[직원 정보]
{profile_block}

[최근 면담 기록]
{history_block}

위 정보를 바탕으로,

1. 이 직원과 면담 시 참고하면 좋을 리더십 명언 하나 (Bill Campbell의 명언이 아닌, 동서양을 막론한 명언으로)

2. 관리자가 1:1 면담에서 활용할 수 있는 실전 코칭 가이드를 300자 내외로

3. 가장 최근 면담에 대한 팔로업 방향성

4. 마지막으로, 이 직원과 면담 시 주의해야 할 점 1가지

조건:
- 이해가 잘 되도록 조언할 것
- 평가하지 말 것
- 따뜻하지만 핵심을 찌를 것
- 한국어로 답할 것"#;

/// Stands in for a missing or unparseable interview date.
pub const UNKNOWN_DATE: &str = "날짜 미상";

/// Separator between the fields of one history line.
pub const HISTORY_FIELD_SEPARATOR: &str = " · ";

/// Marks a value cut to fit the prompt bounds.
pub const TRUNCATION_MARK: &str = "…";

/// Fills the template in a single left-to-right pass. Inserted blocks are
/// never rescanned, so placeholder text inside a sheet cell stays literal.
pub fn render_coaching_prompt(profile_block: &str, history_block: &str) -> String {
    let mut out = String::with_capacity(
        COACHING_PROMPT_TEMPLATE.len() + profile_block.len() + history_block.len(),
    );
    let mut rest = COACHING_PROMPT_TEMPLATE;
    for (placeholder, value) in [
        ("{profile_block}", profile_block),
        ("{history_block}", history_block),
    ] {
        if let Some((head, tail)) = rest.split_once(placeholder) {
            out.push_str(head);
            out.push_str(value);
            rest = tail;
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_has_each_placeholder_once_in_order() {
        let profile_at = COACHING_PROMPT_TEMPLATE.find("{profile_block}").unwrap();
        let history_at = COACHING_PROMPT_TEMPLATE.find("{history_block}").unwrap();
        assert!(profile_at < history_at);
        assert_eq!(COACHING_PROMPT_TEMPLATE.matches("{profile_block}").count(), 1);
        assert_eq!(COACHING_PROMPT_TEMPLATE.matches("{history_block}").count(), 1);
    }

    #[test]
    fn test_placeholder_text_in_values_stays_literal() {
        let rendered = render_coaching_prompt("메모: {history_block}", "- 기록 {profile_block}");
        assert!(rendered.contains("[직원 정보]\n메모: {history_block}\n"));
        assert!(rendered.contains("[최근 면담 기록]\n- 기록 {profile_block}\n"));
        assert_eq!(rendered.matches("- 기록").count(), 1);
    }
}
