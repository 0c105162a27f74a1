/// Log an error together with its whole chain of sources.
///
/// The second form wraps the error in a [`snafu::Whatever`] carrying
/// `$message` first, so the log line reads from the outermost context.
#[macro_export]
macro_rules! tracing_report {
    ($error:expr) => {
        ::tracing::error!(err = %snafu::Report::from_error(&$error));
    };
    ($error:expr, $message:expr) => {
        let whatever_error = <snafu::Whatever as snafu::FromString>::with_source(
            ::std::boxed::Box::new($error),
            $message.to_string(),
        );
        ::tracing::error!(err = %snafu::Report::from_error(whatever_error));
    };
}
