/// Represents the parsed components of a GitHub PR URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrUrl {
    pub owner: String,
    pub repo: String,
    pub pr_number: u64,
}

/// A single review comment on a pull request.
#[derive(Debug, Clone)]
pub struct Comment {
    /// Commenter's GitHub login
    pub author: String,
    /// Comment body as written (markdown allowed; the summarizer handles it)
    pub body: String,
}

/// Everything fetched for one pull request: metadata, discussion, and diff.
///
/// Assembled once per request and read-only afterwards. `description` and
/// `diff` may be empty: a PR without a body is common, and the diff read
/// is best-effort.
#[derive(Debug, Clone)]
pub struct PullRequestBundle {
    pub title: String,
    pub description: String,
    pub comments: Vec<Comment>,
    pub diff: String,
}

impl PullRequestBundle {
    /// Concatenate the review comments into one block of discussion text,
    /// one `author: body` line per comment. Empty when there are none.
    pub fn comments_text(&self) -> String {
        self.comments
            .iter()
            .map(|c| format!("{}: {}", c.author, c.body))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render the bundle as a single text block bounded by `max_chars`.
    ///
    /// Title, description, and comments are always kept in full; only the
    /// diff is truncated to fit, since it is typically the largest part and
    /// the least essential for a narrative summary.
    pub fn bundle_text(&self, max_chars: usize) -> String {
        let mut text = format!("Title: {}\n", self.title);
        if !self.description.is_empty() {
            text.push_str(&format!("Description: {}\n", self.description));
        }
        if !self.comments.is_empty() {
            text.push_str("Review comments:\n");
            text.push_str(&self.comments_text());
            text.push('\n');
        }

        if self.diff.is_empty() {
            return text;
        }

        const DIFF_HEADER: &str = "Diff:\n";
        const TRUNCATION_MARK: &str = "\n[diff truncated]";
        let budget = max_chars
            .saturating_sub(text.len())
            .saturating_sub(DIFF_HEADER.len());

        text.push_str(DIFF_HEADER);
        if self.diff.len() <= budget {
            text.push_str(&self.diff);
        } else {
            let keep = budget.saturating_sub(TRUNCATION_MARK.len());
            text.push_str(truncate_at_boundary(&self.diff, keep));
            text.push_str(TRUNCATION_MARK);
        }
        text
    }
}

/// Cut `s` to at most `max` bytes without splitting a UTF-8 character.
fn truncate_at_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
