//! Line-based unified diff generation
//!
//! Renders the workaround preview as a standard unified diff: `---`/`+++`
//! headers naming the file path twice, each suffixed with the current
//! instant, three lines of surrounding context, and `@@` hunk markers.
//! Trailing empty lines are dropped before comparison, matching the
//! line-splitting behavior the rest of the rewrite pipeline uses.

use chrono::{SecondsFormat, Utc};

const CONTEXT_LINES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Equal,
    Delete,
    Insert,
}

#[derive(Debug)]
struct Op<'a> {
    tag: Tag,
    text: &'a str,
    /// 0-based line offset in the original before this op is consumed
    orig: usize,
    /// 0-based line offset in the transformed text before this op
    new: usize,
}

/// Generate a unified diff between original and transformed text.
/// Returns an empty string when the texts are identical.
pub fn unified_diff(original: &str, transformed: &str, file_name: &str) -> String {
    if original == transformed {
        return String::new();
    }

    let original_lines = split_lines(original);
    let transformed_lines = split_lines(transformed);
    let ops = diff_ops(&original_lines, &transformed_lines);

    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
    let mut output = String::new();
    output.push_str(&format!("--- {file_name}\t{timestamp}\n"));
    output.push_str(&format!("+++ {file_name}\t{timestamp}\n"));

    for (start, end) in hunk_ranges(&ops) {
        let lo = start.saturating_sub(CONTEXT_LINES);
        let hi = usize::min(end + CONTEXT_LINES, ops.len().saturating_sub(1));

        let orig_count = ops[lo..=hi].iter().filter(|op| op.tag != Tag::Insert).count();
        let new_count = ops[lo..=hi].iter().filter(|op| op.tag != Tag::Delete).count();
        // Empty ranges are anchored to the line before, per the unified format
        let orig_start = if orig_count == 0 { ops[lo].orig } else { ops[lo].orig + 1 };
        let new_start = if new_count == 0 { ops[lo].new } else { ops[lo].new + 1 };

        output.push_str(&format!(
            "@@ -{orig_start},{orig_count} +{new_start},{new_count} @@\n"
        ));
        for op in &ops[lo..=hi] {
            let prefix = match op.tag {
                Tag::Equal => ' ',
                Tag::Delete => '-',
                Tag::Insert => '+',
            };
            output.push(prefix);
            output.push_str(op.text);
            output.push('\n');
        }
    }

    output
}

/// Split into lines the way the rewrite pass does: on `\n`, dropping
/// trailing empty strings.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    while lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}

/// Longest-common-subsequence line diff. Files here are single compilation
/// units, so the quadratic table stays small.
fn diff_ops<'a>(original: &[&'a str], transformed: &[&'a str]) -> Vec<Op<'a>> {
    let n = original.len();
    let m = transformed.len();

    let mut table = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if original[i] == transformed[j] {
                table[i + 1][j + 1] + 1
            } else {
                u32::max(table[i + 1][j], table[i][j + 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0usize, 0usize);
    while i < n && j < m {
        if original[i] == transformed[j] {
            ops.push(Op { tag: Tag::Equal, text: original[i], orig: i, new: j });
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            ops.push(Op { tag: Tag::Delete, text: original[i], orig: i, new: j });
            i += 1;
        } else {
            ops.push(Op { tag: Tag::Insert, text: transformed[j], orig: i, new: j });
            j += 1;
        }
    }
    while i < n {
        ops.push(Op { tag: Tag::Delete, text: original[i], orig: i, new: j });
        i += 1;
    }
    while j < m {
        ops.push(Op { tag: Tag::Insert, text: transformed[j], orig: i, new: j });
        j += 1;
    }

    ops
}

/// Group change runs into hunks: changes separated by at most
/// `2 * CONTEXT_LINES` equal lines share one hunk.
fn hunk_ranges(ops: &[Op<'_>]) -> Vec<(usize, usize)> {
    let mut groups = Vec::new();
    let mut i = 0;

    while i < ops.len() {
        if ops[i].tag == Tag::Equal {
            i += 1;
            continue;
        }

        let start = i;
        let mut end = i;
        let mut j = i;
        while j < ops.len() {
            if ops[j].tag != Tag::Equal {
                end = j;
                j += 1;
            } else {
                let mut k = j;
                while k < ops.len() && ops[k].tag == Tag::Equal {
                    k += 1;
                }
                if k < ops.len() && k - j <= 2 * CONTEXT_LINES {
                    j = k;
                } else {
                    break;
                }
            }
        }

        groups.push((start, end));
        i = end + 1;
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_text_produces_no_diff() {
        assert_eq!(unified_diff("a\nb\n", "a\nb\n", "A.java"), "");
    }

    #[test]
    fn test_headers_name_file_twice_with_timestamp() {
        let diff = unified_diff("a\n", "b\n", "src/A.java");
        let mut lines = diff.lines();

        let minus = lines.next().unwrap();
        let plus = lines.next().unwrap();
        assert!(minus.starts_with("--- src/A.java\t"));
        assert!(plus.starts_with("+++ src/A.java\t"));
        // RFC 3339 instant after the tab
        assert!(minus.rsplit('\t').next().unwrap().contains('T'));
    }

    #[test]
    fn test_single_insertion_hunk() {
        let original = "one\ntwo\nthree\nfour\nfive\nsix\nseven\n";
        let transformed = "one\ntwo\nthree\ninserted\nfour\nfive\nsix\nseven\n";

        let diff = unified_diff(original, transformed, "A.java");

        assert!(diff.contains("@@ -1,6 +1,7 @@\n"));
        assert!(diff.contains("+inserted\n"));
        assert!(
            diff.lines().skip(2).all(|line| !line.starts_with('-')),
            "insertion-only diff has no deletions: {diff}"
        );
    }

    #[test]
    fn test_context_is_three_lines() {
        let original = (1..=20).map(|n| format!("line{n}")).collect::<Vec<_>>().join("\n");
        let transformed = original.replace("line10", "line10\nextra");

        let diff = unified_diff(&original, &transformed, "A.java");

        // 3 lines of context either side of the single insertion
        assert!(diff.contains("@@ -8,6 +8,7 @@\n"), "unexpected hunks: {diff}");
        assert!(diff.contains(" line8\n"));
        assert!(diff.contains(" line13\n"));
        assert!(!diff.contains(" line7\n"));
        assert!(!diff.contains(" line14\n"));
    }

    #[test]
    fn test_nearby_changes_share_a_hunk() {
        let original = (1..=12).map(|n| format!("line{n}")).collect::<Vec<_>>().join("\n");
        let transformed = original
            .replace("line3", "line3\nfirst")
            .replace("line6", "line6\nsecond");

        let diff = unified_diff(&original, &transformed, "A.java");

        assert_eq!(diff.matches("@@ -").count(), 1);
        assert!(diff.contains("+first\n"));
        assert!(diff.contains("+second\n"));
    }

    #[test]
    fn test_replacement_emits_delete_and_insert() {
        let diff = unified_diff("alpha\nbeta\ngamma\n", "alpha\nBETA\ngamma\n", "A.java");

        assert!(diff.contains("-beta\n"));
        assert!(diff.contains("+BETA\n"));
    }
}
