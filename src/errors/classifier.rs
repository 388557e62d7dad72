//! Ordered error classifier
//!
//! Each supported tag owns a table of `(pattern, builder)` pairs scanned in
//! order against git's raw error output. The first matching pattern wins and
//! its capture groups feed the builder. Unrecognised output falls back to a
//! generic diagnostic that quotes the raw message.

use super::{CHECKOUT_FAILED_TAG, DetailedError, FETCH_FAILED_TAG, UPDATE_SUBMODULE_FAILED_TAG};
use regex::Regex;
use std::sync::LazyLock;

const UNKNOWN_PARAM: &str = "::unknown::";

/// Match data handed to a diagnostic builder
struct Matched<'a> {
    groups: Vec<&'a str>,
    raw: &'a str,
}

impl Matched<'_> {
    /// Capture group `index` (0 is the first group), or a placeholder
    fn param(&self, index: usize) -> &str {
        self.groups.get(index).copied().unwrap_or(UNKNOWN_PARAM)
    }
}

type Builder = fn(&Matched<'_>) -> DetailedError;

struct Rule {
    pattern: Regex,
    build: Builder,
}

fn rules(table: Vec<(&str, Builder)>) -> Vec<Rule> {
    table
        .into_iter()
        .map(|(pattern, build)| Rule {
            pattern: Regex::new(pattern).expect("valid error pattern"),
            build,
        })
        .collect()
}

fn generic_description(raw: &str) -> String {
    format!("Our auto-configurator returned the following error:\n{raw}")
}

fn access_denied_ssh(_: &Matched<'_>) -> DetailedError {
    DetailedError::new(
        "We couldn’t access your repository.",
        "Please abort the process, double-check your SSH key and try again.",
    )
}

fn repository_not_found(m: &Matched<'_>) -> DetailedError {
    DetailedError::new(
        format!("We couldn’t find a git repository at '{}'.", m.param(0)),
        "Please abort the process, double-check your repository URL and try again.",
    )
}

fn access_denied_http(_: &Matched<'_>) -> DetailedError {
    DetailedError::new(
        "We couldn’t access your repository.",
        "Please abort the process and try again, by providing the repository with SSH URL.",
    )
}

fn connection_failed(m: &Matched<'_>) -> DetailedError {
    DetailedError::new(
        format!("We couldn’t connect to '{}'.", m.param(0)),
        "Please abort the process, double-check your repository URL and try again.",
    )
}

fn saml_sso_enforced(_: &Matched<'_>) -> DetailedError {
    DetailedError::new(
        "To access this repository, you need to use SAML SSO.",
        "Please abort the process, update your SSH settings and try again. You can find out more about using SAML SSO in the GitHub docs: https://docs.github.com/en/authentication/authenticating-with-saml-single-sign-on/authorizing-an-ssh-key-for-use-with-saml-single-sign-on",
    )
}

fn branch_not_found(m: &Matched<'_>) -> DetailedError {
    super::branch_not_found(m.param(0))
}

fn submodule_access_denied(m: &Matched<'_>) -> DetailedError {
    DetailedError::new(
        "We couldn’t access one or more of your Git submodules.",
        format!(
            "You can try accessing your submodules using an SSH key. Your builds will fail unless you fix this issue.\n{}",
            generic_description(m.raw)
        ),
    )
}

static FETCH_FAILED_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    rules(vec![
        (r"Permission denied \((.+)\)", access_denied_ssh as Builder),
        (r"fatal: repository '(.+)' not found", repository_not_found),
        (r"fatal: '(.+)' does not appear to be a git repository", repository_not_found),
        (r"fatal: (.+)/info/refs not valid: is this a git repository\?", repository_not_found),
        (r"ERROR: The `(.+)' organization has enabled or enforced SAML SSO", saml_sso_enforced),
        (
            r"ssh: connect to host (\S+) port (\d+): (?:Connection timed out|Connection refused|Network is unreachable)",
            connection_failed,
        ),
        (r"ssh: Could not resolve hostname (.+): Name or service not known", connection_failed),
        (r"unable to access '.+': Could not resolve host: (\S+)", connection_failed),
        (
            r"(?s)remote: HTTP Basic: Access denied.*fatal: Authentication failed for",
            access_denied_http,
        ),
        (r"remote: Invalid username or password\(\.\)", access_denied_http),
        (r"Unauthorized", access_denied_http),
        (r"Forbidden", access_denied_http),
        (
            r"unable to access '.+': Failed to connect to .+: Connection timed out",
            access_denied_http,
        ),
        (
            r"unable to access '.+': The requested URL returned error: (\d+)",
            access_denied_http,
        ),
    ])
});

static CHECKOUT_FAILED_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    rules(vec![(
        r"pathspec '(.+)' did not match any file\(s\) known to git",
        branch_not_found as Builder,
    )])
});

static UPDATE_SUBMODULE_FAILED_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    rules(vec![
        (r"Repository not found", submodule_access_denied as Builder),
        (r"Invalid username or password", submodule_access_denied),
        (r"Permission denied \((.+)\)", submodule_access_denied),
        (r"HTTP Basic: Access denied", submodule_access_denied),
        (r"Permission denied, please try again", submodule_access_denied),
        (r"Unauthorized", submodule_access_denied),
        (r"could not be found", submodule_access_denied),
        (r"User not found", submodule_access_denied),
    ])
});

fn generic(tag: &str, raw: &str) -> Option<DetailedError> {
    let title = match tag {
        FETCH_FAILED_TAG => "We couldn’t fetch your repository.",
        CHECKOUT_FAILED_TAG => "We couldn’t checkout your branch.",
        UPDATE_SUBMODULE_FAILED_TAG => "We couldn’t update your submodules.",
        _ => return None,
    };
    Some(DetailedError::new(title, generic_description(raw)))
}

/// Translate raw git output for `tag` into a user-facing diagnostic
///
/// Returns `None` for tags without a table.
pub fn classify(tag: &str, raw: &str) -> Option<DetailedError> {
    let table: &[Rule] = match tag {
        FETCH_FAILED_TAG => FETCH_FAILED_RULES.as_slice(),
        CHECKOUT_FAILED_TAG => CHECKOUT_FAILED_RULES.as_slice(),
        UPDATE_SUBMODULE_FAILED_TAG => UPDATE_SUBMODULE_FAILED_RULES.as_slice(),
        _ => return None,
    };

    for rule in table {
        if let Some(captures) = rule.pattern.captures(raw) {
            let matched = Matched {
                groups: captures
                    .iter()
                    .skip(1)
                    .map(|group| group.map_or(UNKNOWN_PARAM, |g| g.as_str()))
                    .collect(),
                raw,
            };
            return Some((rule.build)(&matched));
        }
    }

    generic(tag, raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(tag: &str, raw: &str) -> String {
        classify(tag, raw).map(|d| d.title).unwrap_or_default()
    }

    #[test]
    fn test_every_pattern_compiles() {
        assert_eq!(FETCH_FAILED_RULES.len(), 14);
        assert_eq!(CHECKOUT_FAILED_RULES.len(), 1);
        assert_eq!(UPDATE_SUBMODULE_FAILED_RULES.len(), 8);
    }

    #[test]
    fn test_unknown_tag_is_not_classified() {
        assert_eq!(classify("merge_failed", "CONFLICT (content)"), None);
    }

    #[test]
    fn test_checkout_generic() {
        let raw = "error: fatal: /master: '/master' is outside repository";
        assert_eq!(
            classify(CHECKOUT_FAILED_TAG, raw),
            Some(DetailedError::new(
                "We couldn’t checkout your branch.",
                format!("Our auto-configurator returned the following error:\n{raw}")
            ))
        );
    }

    #[test]
    fn test_checkout_invalid_branch() {
        let raw = "error: pathspec 'master' did not match any file(s) known to git.";
        assert_eq!(
            classify(CHECKOUT_FAILED_TAG, raw),
            Some(DetailedError::new(
                "We couldn't find the branch 'master'.",
                "Please choose another branch and try again."
            ))
        );
    }

    #[test]
    fn test_fetch_generic() {
        let detail = classify(FETCH_FAILED_TAG, "fetch failed, error: exit status 128").unwrap();
        assert_eq!(detail.title, "We couldn’t fetch your repository.");
        assert!(detail.description.ends_with("\nfetch failed, error: exit status 128"));
    }

    #[test]
    fn test_fetch_permission_denied() {
        for raw in [
            "Permission denied (publickey).",
            "Permission denied (publickey,gssapi-keyex,gssapi-with-mic,password).",
        ] {
            let detail = classify(FETCH_FAILED_TAG, raw).unwrap();
            assert_eq!(detail.title, "We couldn’t access your repository.");
            assert_eq!(
                detail.description,
                "Please abort the process, double-check your SSH key and try again."
            );
        }
    }

    #[test]
    fn test_fetch_repository_not_found() {
        let cases = [
            ("fatal: repository 'http://localhost/repo.git' not found", "http://localhost/repo.git"),
            (
                "fatal: 'totally.not.made.up' does not appear to be a git repository",
                "totally.not.made.up",
            ),
            (
                "fatal: https://www.example.com/channel/abc/info/refs not valid: is this a git repository?",
                "https://www.example.com/channel/abc",
            ),
        ];
        for (raw, url) in cases {
            assert_eq!(
                title(FETCH_FAILED_TAG, raw),
                format!("We couldn’t find a git repository at '{url}'.")
            );
        }
    }

    #[test]
    fn test_fetch_http_access_denied() {
        for raw in [
            "remote: HTTP Basic: Access denied\nfatal: Authentication failed for 'https://localhost/repo.git'",
            "remote: Invalid username or password(.)\nfatal: Authentication failed for 'https://localhost/repo.git'",
            "Unauthorized",
            "Forbidden",
            "fatal: unable to access 'https://git.something.com/group/repo.git/': Failed to connect to git.something.com port 443: Connection timed out",
            "fatal: unable to access 'https://github.com/group/repo.git)/': The requested URL returned error: 400",
        ] {
            let detail = classify(FETCH_FAILED_TAG, raw).unwrap();
            assert_eq!(detail.title, "We couldn’t access your repository.", "{raw}");
            assert_eq!(
                detail.description,
                "Please abort the process and try again, by providing the repository with SSH URL."
            );
        }
    }

    #[test]
    fn test_fetch_connection_failed() {
        let cases = [
            ("ssh: connect to host git.something.com port 22: Connection timed out", "git.something.com"),
            ("ssh: connect to host git.something.com port 22: Connection refused", "git.something.com"),
            ("ssh: connect to host git.something.com port 22: Network is unreachable", "git.something.com"),
            (
                "ssh: Could not resolve hostname git.something.com: Name or service not known",
                "git.something.com",
            ),
            (
                "fatal: unable to access 'https://site.google.com/view/something/': Could not resolve host: site.google.com",
                "site.google.com",
            ),
        ];
        for (raw, host) in cases {
            assert_eq!(
                title(FETCH_FAILED_TAG, raw),
                format!("We couldn’t connect to '{host}'.")
            );
        }
    }

    #[test]
    fn test_fetch_saml_sso() {
        assert_eq!(
            title(
                FETCH_FAILED_TAG,
                "ERROR: The `my-company' organization has enabled or enforced SAML SSO"
            ),
            "To access this repository, you need to use SAML SSO."
        );
    }

    #[test]
    fn test_submodule_generic() {
        let raw = "fatal: no submodule mapping found in .gitmodules for path 'web'";
        let detail = classify(UPDATE_SUBMODULE_FAILED_TAG, raw).unwrap();
        assert_eq!(detail.title, "We couldn’t update your submodules.");
        assert!(detail.description.ends_with(raw));
    }

    #[test]
    fn test_submodule_access_denied_quotes_raw_message() {
        for raw in [
            "ERROR: Repository not found.",
            "remote: Invalid username or password(.)",
            "Permission denied (publickey).",
            "remote: HTTP Basic: Access denied\nfatal: Authentication failed for 'https://example.com/repo.git/'",
            "Permission denied, please try again.",
            "Unauthorized",
            "remote: The project you were looking for could not be found.",
            "remote: Unauthorized LoginAndPassword(Username for 'https/***): User not found",
        ] {
            let detail = classify(UPDATE_SUBMODULE_FAILED_TAG, raw).unwrap();
            assert_eq!(detail.title, "We couldn’t access one or more of your Git submodules.");
            assert!(detail.description.ends_with(raw), "{raw}");
        }
    }

    #[test]
    fn test_missing_capture_uses_placeholder() {
        let matched = Matched {
            groups: vec![],
            raw: "",
        };
        assert_eq!(matched.param(0), UNKNOWN_PARAM);
    }
}
