use std::sync::LazyLock;

use regex::{Captures, Regex};

static DIAGRAM_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[Image of (.*?)\]").expect("diagram pattern is valid"));

/// Style prefix so the generator draws a schematic rather than a photo
const DIAGRAM_STYLE: &str = "educational scientific diagram schematic white on black background: ";

/// Build the image URL for a diagram subject. The seed is the subject's
/// length in UTF-16 code units so the same subject always requests the
/// same image.
pub fn diagram_url(endpoint: &str, subject: &str) -> String {
    let prompt = urlencoding::encode(&format!("{}{}", DIAGRAM_STYLE, subject)).into_owned();
    format!(
        "{}/{}?width=800&height=450&nologo=true&seed={}",
        endpoint.trim_end_matches('/'),
        prompt,
        subject.encode_utf16().count()
    )
}

/// Replace every `[Image of X]` directive with a markdown image pointing at
/// the generation endpoint. Expanded text contains no directives, so running
/// this twice is the same as running it once.
pub fn expand_diagrams(text: &str, endpoint: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    DIAGRAM_DIRECTIVE
        .replace_all(text, |caps: &Captures| {
            let subject = &caps[1];
            format!("\n\n![{}]({})\n\n", subject, diagram_url(endpoint, subject))
        })
        .into_owned()
}
