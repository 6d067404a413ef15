//! Line-oriented text diff used for change logs.
//!
//! The output mirrors the classic `ndiff` layout: every line is prefixed
//! with two characters, `"  "` for context, `"- "` for a deleted line and
//! `"+ "` for an inserted one. It is computed from a longest-common-
//! subsequence table, which is plenty for build definitions of a few dozen
//! lines.

/// Builds the diff between `old` and `new` as a single string.
///
/// Lines keep their original terminators, so the result can be logged as-is.
pub fn line_diff(old: &str, new: &str) -> String {
    let a: Vec<&str> = old.split_inclusive('\n').collect();
    let b: Vec<&str> = new.split_inclusive('\n').collect();

    // lcs[i][j] = length of the LCS of a[i..] and b[j..]
    let mut lcs = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for i in (0..a.len()).rev() {
        for j in (0..b.len()).rev() {
            lcs[i][j] = if a[i] == b[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut out = String::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        if i < a.len() && j < b.len() && a[i] == b[j] {
            push_line(&mut out, "  ", a[i]);
            i += 1;
            j += 1;
        } else if i < a.len() && (j == b.len() || lcs[i + 1][j] >= lcs[i][j + 1]) {
            push_line(&mut out, "- ", a[i]);
            i += 1;
        } else {
            push_line(&mut out, "+ ", b[j]);
            j += 1;
        }
    }
    out
}

fn push_line(out: &mut String, marker: &str, line: &str) {
    out.push_str(marker);
    out.push_str(line);
    if !line.ends_with('\n') {
        out.push('\n');
    }
}
