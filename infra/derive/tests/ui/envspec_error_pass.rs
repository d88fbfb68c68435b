use envspec_derive::envspec_error;
use std::borrow::Cow;

#[envspec_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Variable {name} is not defined")]
    Undefined { name: Cow<'static, str> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let err = DemoError::Undefined { name: "PORT".into() };
    assert_eq!(err.variant_name(), "Undefined");

    let internal: DemoError = "boom".into();
    assert_eq!(internal.variant_name(), "Internal");

    let io: Result<(), std::io::Error> = Err(std::io::Error::other("denied"));
    let wrapped = io.context("reading PORT").unwrap_err();
    assert_eq!(wrapped.to_string(), "IO error (reading PORT): denied");
}
