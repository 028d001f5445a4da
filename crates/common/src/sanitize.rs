// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

const USERNAME_MAX_VISIBLE: usize = 15;
const USERNAME_TRUNCATE_AT: usize = 12;

/// Trim, collapse internal whitespace runs to a single space, strip control
/// characters, and truncate to 15 visible characters (appending `...` at
/// position 12 when the original was longer). Used only for the
/// `SessionConnected` notification payload; the sanitized form never gates
/// `/connect` success.
pub fn sanitize_username(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw.trim());
    if collapsed.chars().count() > USERNAME_MAX_VISIBLE {
        let head: String = collapsed.chars().take(USERNAME_TRUNCATE_AT).collect();
        format!("{head}...")
    } else {
        collapsed
    }
}

/// Collapse whitespace runs and strip control characters from a VSID's text,
/// ahead of shape/reservation validation by `VisualIdentifier::new`.
pub fn sanitize_vsid_text(raw: &str) -> String {
    collapse_whitespace(raw)
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = false;
    for c in s.chars() {
        if c.is_control() {
            continue;
        }
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_collapses_whitespace() {
        assert_eq!(sanitize_username("  hello   world  "), "hello world");
    }

    #[test]
    fn strips_control_characters() {
        assert_eq!(sanitize_username("al\u{0007}ice"), "alice");
    }

    #[test]
    fn truncates_long_names_with_ellipsis() {
        let long = "a very long username indeed";
        let sanitized = sanitize_username(long);
        assert_eq!(sanitized, "a very long ...");
        assert_eq!(sanitized.chars().count(), USERNAME_TRUNCATE_AT + 3);
    }

    #[test]
    fn leaves_short_names_untouched() {
        assert_eq!(sanitize_username("alice"), "alice");
    }

    #[test]
    fn exactly_fifteen_chars_is_not_truncated() {
        let name = "a".repeat(USERNAME_MAX_VISIBLE);
        assert_eq!(sanitize_username(&name), name);
    }

    #[test]
    fn vsid_text_collapses_internal_whitespace_runs() {
        assert_eq!(sanitize_vsid_text("a   b"), "a b");
        assert_eq!(sanitize_vsid_text("[]"), "[]");
    }
}
