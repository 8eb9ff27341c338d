use stonemark::{Document, Options};
use typed_arena::Arena;

/// Parse `input` with default options and render it, panicking on any
/// parse or render error (every test here is expected to succeed).
pub fn html(input: &str) -> String {
    html_with(input, Options::default())
}

pub fn html_with(input: &str, options: Options) -> String {
    let arena = Arena::new();
    let document = Document::parse(&arena, input, options).expect("parse");
    document.to_html().expect("render")
}

/// Parse `input`, returning the error StoneMark raised.
pub fn err(input: &str) -> stonemark::StoneMarkError {
    let arena = Arena::new();
    Document::parse(&arena, input, Options::default())
        .map(|_| ())
        .expect_err("expected a parse error")
}
