#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanKind {
    Equal,
    Insert,
    Delete,
}

/// A run of characters that is either shared by both texts, only present in
/// the new text (`Insert`) or only present in the old text (`Delete`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffSpan {
    pub kind: SpanKind,
    pub text: String,
    /// Length of `text` in chars.
    pub count: usize,
}

impl DiffSpan {
    pub fn is_change(&self) -> bool {
        self.kind != SpanKind::Equal
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Edit {
    Equal(char),
    Insert(char),
    Delete(char),
}

impl Edit {
    fn split(self) -> (SpanKind, char) {
        match self {
            Edit::Equal(ch) => (SpanKind::Equal, ch),
            Edit::Insert(ch) => (SpanKind::Insert, ch),
            Edit::Delete(ch) => (SpanKind::Delete, ch),
        }
    }
}

/// Character-level diff from `old` to `new`.
///
/// Common prefix and suffix are stripped before running Myers' shortest edit
/// script on the middle, so the result is a minimal edit script and adjacent
/// spans never share a kind.
pub fn diff_chars(old: &str, new: &str) -> Vec<DiffSpan> {
    let a: Vec<char> = old.chars().collect();
    let b: Vec<char> = new.chars().collect();

    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let mut spans = SpanBuilder::default();
    for &ch in &a[..prefix] {
        spans.push(SpanKind::Equal, ch);
    }
    for edit in shortest_edit(&a[prefix..a.len() - suffix], &b[prefix..b.len() - suffix]) {
        let (kind, ch) = edit.split();
        spans.push(kind, ch);
    }
    for &ch in &a[a.len() - suffix..] {
        spans.push(SpanKind::Equal, ch);
    }
    spans.finish()
}

/// Number of inserted plus deleted characters between `a` and `b`.
pub fn count_changed_characters(a: &str, b: &str) -> usize {
    diff_chars(a, b)
        .iter()
        .filter(|span| span.is_change())
        .map(|span| span.count)
        .sum()
}

fn shortest_edit(a: &[char], b: &[char]) -> Vec<Edit> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    let max = n + m;
    if max == 0 {
        return Vec::new();
    }

    let offset = max;
    let mut v = vec![0isize; (2 * max + 1) as usize];
    // trace[d] holds v[-d..=d] as it was before round d ran.
    let mut trace: Vec<Vec<isize>> = Vec::new();

    'search: for d in 0..=max {
        trace.push(v[(offset - d) as usize..=(offset + d) as usize].to_vec());
        let mut k = -d;
        while k <= d {
            let idx = (k + offset) as usize;
            let mut x = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
                v[idx + 1]
            } else {
                v[idx - 1] + 1
            };
            let mut y = x - k;
            while x < n && y < m && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }
            v[idx] = x;
            if x >= n && y >= m {
                break 'search;
            }
            k += 2;
        }
    }

    let mut edits = Vec::with_capacity((n.max(m)) as usize);
    let (mut x, mut y) = (n, m);
    for d in (1..trace.len() as isize).rev() {
        let snapshot = &trace[d as usize];
        let at = |k: isize| snapshot[(k + d) as usize];
        let k = x - y;
        let prev_k = if k == -d || (k != d && at(k - 1) < at(k + 1)) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = at(prev_k);
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            edits.push(Edit::Equal(a[(x - 1) as usize]));
            x -= 1;
            y -= 1;
        }
        if x == prev_x {
            edits.push(Edit::Insert(b[(y - 1) as usize]));
        } else {
            edits.push(Edit::Delete(a[(x - 1) as usize]));
        }
        x = prev_x;
        y = prev_y;
    }
    while x > 0 && y > 0 {
        edits.push(Edit::Equal(a[(x - 1) as usize]));
        x -= 1;
        y -= 1;
    }

    edits.reverse();
    edits
}

#[derive(Default)]
struct SpanBuilder {
    spans: Vec<DiffSpan>,
}

impl SpanBuilder {
    fn push(&mut self, kind: SpanKind, ch: char) {
        match self.spans.last_mut() {
            Some(last) if last.kind == kind => {
                last.text.push(ch);
                last.count += 1;
            }
            _ => self.spans.push(DiffSpan {
                kind,
                text: ch.to_string(),
                count: 1,
            }),
        }
    }

    fn finish(self) -> Vec<DiffSpan> {
        self.spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(spans: &[DiffSpan], keep: SpanKind) -> String {
        spans
            .iter()
            .filter(|s| s.kind == SpanKind::Equal || s.kind == keep)
            .map(|s| s.text.as_str())
            .collect()
    }

    #[test]
    fn test_identical_texts_have_no_changes() {
        let spans = diff_chars("let x = 1;", "let x = 1;");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind, SpanKind::Equal);
        assert_eq!(count_changed_characters("let x = 1;", "let x = 1;"), 0);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(diff_chars("", "").is_empty());
        assert_eq!(count_changed_characters("", "abc"), 3);
        assert_eq!(count_changed_characters("abc", ""), 3);
    }

    #[test]
    fn test_single_substitution_counts_two() {
        assert_eq!(count_changed_characters("1", "2"), 2);
        assert_eq!(count_changed_characters("cat", "cut"), 2);
    }

    #[test]
    fn test_appended_text_is_insert() {
        let spans = diff_chars("3", "355");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].kind, SpanKind::Insert);
        assert_eq!(spans[1].text, "55");
        assert_eq!(spans[1].count, 2);
    }

    #[test]
    fn test_spans_reconstruct_both_sides() {
        let old = "let x=1;\nfoo(x);";
        let new = "let total=1;\nfoo(total);";
        let spans = diff_chars(old, new);
        assert_eq!(side(&spans, SpanKind::Delete), old);
        assert_eq!(side(&spans, SpanKind::Insert), new);
    }

    #[test]
    fn test_adjacent_spans_differ_in_kind() {
        let spans = diff_chars("abcdefgh", "axcyefzh");
        for pair in spans.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind);
        }
    }

    #[test]
    fn test_edit_script_is_minimal() {
        // LCS of "ABCABBA" and "CBABAC" has length 4.
        assert_eq!(count_changed_characters("ABCABBA", "CBABAC"), 7 + 6 - 2 * 4);
    }

    #[test]
    fn test_count_is_symmetric() {
        let pairs = [
            ("interface T {\n  a: number;\n}", "interface T {\n}"),
            ("sum += items[i]", "total += items[i]"),
            ("", "x"),
            ("héllo wörld", "hello world"),
        ];
        for (a, b) in pairs {
            assert_eq!(count_changed_characters(a, b), count_changed_characters(b, a));
        }
    }

    #[test]
    fn test_diff_is_deterministic() {
        let a = "function applyDiscount(total) {\n  return total * 0.9;\n}";
        let b = "function applyDiscount(amount) {\n  return amount * 0.9;\n}";
        assert_eq!(diff_chars(a, b), diff_chars(a, b));
    }

    #[test]
    fn test_multibyte_chars_count_as_one() {
        assert_eq!(count_changed_characters("→", "←"), 2);
        assert_eq!(count_changed_characters("a→b", "ab"), 1);
    }
}
