//! Text exports of the change log.

use core::fmt::Write;

use super::Change;

/// Turns a change description into code-like text.
///
/// Bracketed qualifiers such as `[static]` or `[#12]` are dropped, numeric
/// indexers like `[3]` are kept, and `(Name)::Type` becomes
/// `Type.Find("Name")`. The result is meant for reading; it is not
/// guaranteed to compile.
///
/// # Examples
///
/// ```
/// use ri_inspector::history::pseudo_code;
///
/// assert_eq!(
///     pseudo_code("(Main Camera)::Camera.fieldOfView = 60.0"),
///     r#"Camera.Find("Main Camera").fieldOfView = 60.0"#,
/// );
/// assert_eq!(pseudo_code("Spawner [static].count = 3"), "Spawner.count = 3");
/// assert_eq!(pseudo_code("List [#4][2] = 7"), "List[2] = 7");
/// ```
pub fn pseudo_code(description: &str) -> String {
    rewrite_named_objects(&strip_qualifiers(description))
}

fn strip_qualifiers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let after = &rest[open..];
        let Some(close) = after.find(']') else {
            out.push_str(after);
            return out;
        };
        let inner = &after[1..close];
        if !inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit()) {
            out.push_str(&after[..=close]);
        } else if out.ends_with(' ') {
            out.pop();
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

fn rewrite_named_objects(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut rest = text;
    while let Some(open) = rest.find('(') {
        let after = &rest[open + 1..];
        let named = after.find(")::").and_then(|close| {
            let name = &after[..close];
            let tail = &after[close + 3..];
            let ty_len = tail
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(tail.len());
            (!name.contains('(') && ty_len > 0).then(|| (name, &tail[..ty_len], &tail[ty_len..]))
        });

        match named {
            Some((name, ty, tail)) => {
                out.push_str(&rest[..open]);
                let _ = write!(out, "{ty}.Find({name:?})");
                rest = tail;
            }
            None => {
                out.push_str(&rest[..=open]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Renders one record as a statement.
///
/// Assignments end with `;`, actions become comments.
pub(super) fn pseudo_code_line(change: &Change) -> String {
    let code = pseudo_code(change.description());
    if change.is_action() {
        format!("// {code}")
    } else {
        format!("{code};")
    }
}

#[cfg(test)]
mod tests {
    use super::pseudo_code;

    #[test]
    fn unmatched_brackets_survive() {
        assert_eq!(pseudo_code("a [b"), "a [b");
        assert_eq!(pseudo_code("f(x) = (y"), "f(x) = (y");
        assert_eq!(pseudo_code("weird ()::"), "weird ()::");
    }

    #[test]
    fn nested_parentheses_in_text() {
        assert_eq!(
            pseudo_code("Log(1) (Cube)::Transform.position = Vector3(1.0, 0.0, 0.0)"),
            r#"Log(1) Transform.Find("Cube").position = Vector3(1.0, 0.0, 0.0)"#
        );
    }

    #[test]
    fn unnamed_and_struct_targets() {
        assert_eq!(pseudo_code("Rigidbody [#12].mass = 2.0"), "Rigidbody.mass = 2.0");
        assert_eq!(pseudo_code("Vector3 [struct].x = 1.0"), "Vector3.x = 1.0");
        assert_eq!(pseudo_code("items[0] = 1"), "items[0] = 1");
    }
}
