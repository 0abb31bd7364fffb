use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum PathError {
    #[error("Path is empty")]
    #[diagnostic(code(pkgdex_utils::path::empty))]
    Empty,

    #[error("Failed to get current directory: {source}")]
    #[diagnostic(code(pkgdex_utils::path::current_dir))]
    CurrentDir {
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable `{var}` not set in `{input}`")]
    #[diagnostic(
        code(pkgdex_utils::path::missing_env),
        help("Export the variable or use an absolute path")
    )]
    MissingEnvVar { var: String, input: String },

    #[error("Unclosed variable expression starting at `{input}`")]
    #[diagnostic(code(pkgdex_utils::path::unclosed_variable))]
    UnclosedVariable { input: String },
}

pub type PathResult<T> = std::result::Result<T, PathError>;
