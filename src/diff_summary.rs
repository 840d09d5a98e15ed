/// Appended when the budget cuts the diff short.
pub const TRUNCATION_MARKER: &str = "... (diff truncated)";

/// Structural markers are kept in preference to content lines: file-pair
/// headers and hunk ranges carry most of the signal per character.
fn is_structural(line: &str) -> bool {
    line.starts_with("diff --git")
        || line.starts_with("+++")
        || line.starts_with("---")
        || line.starts_with("@@")
}

/// Bound a unified diff to roughly `budget` characters.
///
/// Structural lines are kept while they fit. Added/removed lines are kept
/// only while the accumulated size is below 70% of the budget, leaving
/// headroom for headers of files that appear later in the diff. Once the
/// budget is reached the marker is appended and the rest of the input is
/// dropped. Works on any text; a non-diff input simply yields no lines.
pub fn summarize_diff(diff: &str, budget: usize) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut used = 0usize;
    let content_ceiling = budget * 7 / 10;

    for line in diff.lines() {
        // A marker from a previous pass is carried through uncounted so
        // that re-summarizing an already-truncated summary is a no-op.
        if line == TRUNCATION_MARKER {
            kept.push(line);
            continue;
        }

        let cost = line.len() + 1;

        if is_structural(line) {
            if used + cost > budget {
                kept.push(TRUNCATION_MARKER);
                break;
            }
            kept.push(line);
            used += cost;
        } else if line.starts_with('+') || line.starts_with('-') {
            if used < content_ceiling && used + cost <= budget {
                kept.push(line);
                used += cost;
            }
        }

        if used >= budget {
            kept.push(TRUNCATION_MARKER);
            break;
        }
    }

    kept.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "diff --git a/file.py b/file.py\n\
        --- a/file.py\n\
        +++ b/file.py\n\
        @@ -1,5 +1,5 @@\n\
        +new line\n\
        -old line\n\
        unchanged context\n";

    #[test]
    fn keeps_headers_and_content() {
        let summary = summarize_diff(SAMPLE, 500);
        assert!(summary.contains("diff --git"));
        assert!(summary.contains("@@ -1,5 +1,5 @@"));
        assert!(summary.contains("+new line"));
        assert!(summary.contains("-old line"));
        assert!(!summary.contains("unchanged context"));
    }

    #[test]
    fn output_never_exceeds_budget_plus_marker() {
        let long_diff = format!(
            "diff --git a/x b/x\n@@ -1 +1 @@\n{}",
            "+added content line with some length\n".repeat(200)
        );
        for budget in [10, 50, 100, 333, 1000] {
            let summary = summarize_diff(&long_diff, budget);
            assert!(
                summary.len() <= budget + TRUNCATION_MARKER.len() + 1,
                "budget {budget} produced {} chars",
                summary.len()
            );
        }
    }

    #[test]
    fn resummarizing_is_stable() {
        let long_diff = format!(
            "diff --git a/x b/x\n@@ -1 +1 @@\n{}",
            "+line of added content here\n".repeat(100)
        );
        let first = summarize_diff(&long_diff, 400);
        let second = summarize_diff(&first, 400);
        assert_eq!(first, second);

        let larger = summarize_diff(&first, 4000);
        assert_eq!(first, larger);
    }

    #[test]
    fn appends_marker_when_truncated() {
        let many_hunks = "@@ -1 +1 @@\n".repeat(50);
        let summary = summarize_diff(&many_hunks, 60);
        assert!(summary.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn handles_empty_and_non_diff_input() {
        assert_eq!(summarize_diff("", 100), "");
        assert_eq!(summarize_diff("just some prose\nanother line", 100), "");
    }
}
