use herald_derive::herald_error;
use std::borrow::Cow;

#[herald_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Rejected{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), DemoError> {
    Err(std::io::Error::other("disk gone")).context("Reading the manifest")
}

fn reject() -> Result<(), DemoError> {
    Err(DemoError::Rejected { message: "nope".into(), context: None }).context("Second attempt")
}

fn main() {
    let error = read().unwrap_err();
    assert_eq!(error.to_string(), "IO error (Reading the manifest): disk gone");

    let error = reject().unwrap_err();
    assert_eq!(error.to_string(), "Rejected (Second attempt): nope");
}
