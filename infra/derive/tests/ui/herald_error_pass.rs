use herald_derive::herald_error;
use std::borrow::Cow;

#[herald_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Rejected{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Exhausted after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

fn main() {
    let error: DemoError = std::io::Error::other("disk gone").into();
    assert!(matches!(error, DemoError::Io { context: None, .. }));

    let error = DemoError::Exhausted { attempts: 3 };
    assert_eq!(error.to_string(), "Exhausted after 3 attempts");
}
