use url::Url;

/// Returns true when `input` is an absolute URL with both a scheme and a
/// network location. Never fails: anything that does not parse is text.
///
/// Input is classified as given. Callers that want surrounding whitespace
/// ignored must trim first.
pub fn is_valid_url(input: &str) -> bool {
    // A scheme has to start the string
    if !input.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return false;
    }

    let Ok(url) = Url::parse(input) else {
        return false;
    };

    // The parser repairs `http:example.com` and `https:///host` into URLs with
    // a host; neither spells out an authority, so neither counts.
    let has_authority = input
        .get(url.scheme().len() + 1..)
        .is_some_and(|rest| rest.starts_with("//") && !rest.starts_with("///"));

    has_authority && url.host_str().is_some_and(|host| !host.is_empty())
}
