//! 와일드카드(`*`, `?`) 매칭과 부분 문자열 검색
//!
//! 대소문자 무시는 ASCII 범위에서만 적용됩니다.

/// 패턴에 와일드카드 문자가 포함되어 있는지 확인합니다.
pub fn has_wildcards(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

/// 패턴이 문자열 전체와 일치하는지 검사합니다.
///
/// `*`는 빈 문자열을 포함한 임의의 문자열, `?`는 정확히 한 문자와 일치합니다.
/// 마지막 `*` 위치로 되돌아가는 반복 방식이므로 재귀 깊이나 지수적 시간이 없습니다.
pub fn wildcard_match(pattern: &str, subject: &str, case_insensitive: bool) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let subject: Vec<char> = subject.chars().collect();

    let mut p = 0;
    let mut s = 0;
    // (마지막 `*`의 패턴 위치, 그 `*`가 현재 삼킨 끝 위치)
    let mut backtrack: Option<(usize, usize)> = None;

    while s < subject.len() {
        if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, s));
            p += 1;
        } else if p < pattern.len()
            && (pattern[p] == '?' || chars_equal(pattern[p], subject[s], case_insensitive))
        {
            p += 1;
            s += 1;
        } else if let Some((star, consumed)) = backtrack {
            p = star + 1;
            s = consumed + 1;
            backtrack = Some((star, s));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

/// `haystack`에 `needle`이 포함되어 있는지 검사합니다. 빈 `needle`은 항상 일치합니다.
pub fn contains_text(haystack: &str, needle: &str, case_insensitive: bool) -> bool {
    if needle.is_empty() {
        return true;
    }
    if !case_insensitive {
        return haystack.contains(needle);
    }
    // ASCII 폴딩은 멀티바이트 시퀀스를 바꾸지 않으므로 바이트 단위 비교로 충분합니다.
    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

fn chars_equal(a: char, b: char, case_insensitive: bool) -> bool {
    if case_insensitive {
        a.eq_ignore_ascii_case(&b)
    } else {
        a == b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_pattern_is_exact_match() {
        assert!(wildcard_match("GET", "GET", false));
        assert!(!wildcard_match("GET", "GETS", false));
        assert!(!wildcard_match("GET", "GE", false));
    }

    #[test]
    fn star_matches_any_run() {
        assert!(wildcard_match("*", "", false));
        assert!(wildcard_match("*", "/anything/at/all", false));
        assert!(wildcard_match("10.*", "10.0.0.1", false));
        assert!(!wildcard_match("10.*", "192.168.0.10", false));
        assert!(wildcard_match("*login*", "/user/login?next=/", false));
        assert!(wildcard_match("/api/*/items", "/api/v2/items", false));
    }

    #[test]
    fn question_mark_matches_one_char() {
        assert!(wildcard_match("5??", "503", false));
        assert!(!wildcard_match("5??", "50", false));
        assert!(!wildcard_match("5??", "5034", false));
        assert!(wildcard_match("?", "한", false));
    }

    #[test]
    fn backtracks_to_last_star() {
        assert!(wildcard_match("*ab*cd", "xabyabzcd", false));
        assert!(wildcard_match("a*b*c", "aXbYbZc", false));
        assert!(!wildcard_match("a*b*c", "aXbYbZ", false));
    }

    #[test]
    fn trailing_stars_match_empty() {
        assert!(wildcard_match("abc***", "abc", false));
        assert!(wildcard_match("**", "", false));
    }

    #[test]
    fn literal_star_in_subject_is_still_wildcard_in_pattern() {
        assert!(wildcard_match("a*", "a*b", false));
        assert!(!wildcard_match("a", "*", false));
    }

    #[test]
    fn case_insensitive_is_ascii_folding() {
        assert!(wildcard_match("get", "GET", true));
        assert!(!wildcard_match("get", "GET", false));
        assert!(wildcard_match("*CURL*", "agent curl/8.0", true));
    }

    #[test]
    fn contains_text_empty_needle_matches() {
        assert!(contains_text("", "", false));
        assert!(contains_text("abc", "", true));
    }

    #[test]
    fn contains_text_case_handling() {
        assert!(contains_text("Mozilla/5.0", "zill", false));
        assert!(!contains_text("Mozilla/5.0", "ZILL", false));
        assert!(contains_text("Mozilla/5.0", "ZILL", true));
        assert!(!contains_text("ab", "abc", true));
    }

    #[test]
    fn contains_text_with_multibyte() {
        assert!(contains_text("/검색?q=TEST", "q=test", true));
        assert!(contains_text("/검색?q=test", "검색", true));
    }

    #[test]
    fn has_wildcards_detects_both_kinds() {
        assert!(has_wildcards("a*"));
        assert!(has_wildcards("a?"));
        assert!(!has_wildcards("abc"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn star_matches_everything(subject in ".{0,100}") {
                prop_assert!(wildcard_match("*", &subject, false));
            }

            #[test]
            fn literal_matches_itself(subject in "[a-zA-Z0-9/._-]{0,60}") {
                prop_assert!(wildcard_match(&subject, &subject, false));
                prop_assert!(wildcard_match(&subject.to_ascii_uppercase(), &subject, true));
            }

            #[test]
            fn prefix_star_matches_suffix(prefix in "[a-z]{0,10}", rest in "[a-z]{0,20}") {
                let subject = format!("{prefix}{rest}");
                let pattern = format!("{prefix}*");
                prop_assert!(wildcard_match(&pattern, &subject, false));
            }

            #[test]
            fn arbitrary_patterns_do_not_panic(pattern in ".{0,40}", subject in ".{0,80}") {
                let _ = wildcard_match(&pattern, &subject, true);
                let _ = contains_text(&subject, &pattern, true);
            }
        }
    }
}
