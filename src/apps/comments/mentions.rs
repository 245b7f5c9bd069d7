use once_cell::sync::Lazy;
use regex::Regex;

static MENTION: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"(?:^|[^\w@])@([A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,})")
		.expect("mention pattern is valid")
});

/// Email addresses mentioned as `@email` in `content`, lowercased, each
/// once, in order of appearance.
///
/// # Examples
///
/// ```
/// use taskflow::apps::comments::mentions::mentioned_emails;
///
/// let emails = mentioned_emails("ping @Bob@example.com and @carol@example.org, thanks @bob@example.com");
/// assert_eq!(emails, vec!["bob@example.com", "carol@example.org"]);
/// ```
pub fn mentioned_emails(content: &str) -> Vec<String> {
	let mut emails: Vec<String> = Vec::new();
	for captures in MENTION.captures_iter(content) {
		let email = captures[1].trim_end_matches('.').to_lowercase();
		if !emails.contains(&email) {
			emails.push(email);
		}
	}
	emails
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("no mentions here", &[])]
	#[case("@ada@example.com", &["ada@example.com"])]
	#[case("mail ada@example.com directly", &[])]
	#[case("thanks @ada@example.com.", &["ada@example.com"])]
	#[case("(@ada@example.com)", &["ada@example.com"])]
	fn test_mentioned_emails(#[case] content: &str, #[case] expected: &[&str]) {
		assert_eq!(mentioned_emails(content), expected);
	}
}
