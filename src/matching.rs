//! Path matching and sequential execution helpers.
//!
//! Pure leaf functions. Matching here is deliberate and small: exact or
//! whole-segment prefix alignment, plus trailing-identifier extraction.
//! There is no pattern syntax and no parameter capture — which handlers
//! even land on the stack is decided per request from these three checks.

use std::future::Future;
use std::pin::Pin;

use crate::error::Error;

/// True iff `path` is absolute and carries no wildcard or query component.
pub fn is_valid_path(path: &str) -> bool {
    path.starts_with('/') && !path.contains('*') && !path.contains('?')
}

/// True iff `req_path` equals `base` or extends it at a whole-segment
/// boundary. `/foo/bar` is aligned with `/foo`; `/foobar` is not.
pub fn is_valid_route(req_path: &str, base: &str) -> bool {
    match req_path.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// The trailing segment, when `req_path` strictly extends `base` by exactly
/// one `/<segment>`. Absent on exact equality, multi-segment extensions,
/// and prefix mismatch.
pub fn resource_id<'a>(req_path: &'a str, base: &str) -> Option<&'a str> {
    let rest = req_path.strip_prefix(base)?.strip_prefix('/')?;

    if rest.is_empty() || rest.contains('/') {
        return None;
    }
    Some(rest)
}

/// One step of an ordered asynchronous sequence: receives the previous
/// step's settled value (the first receives none) and yields its own.
pub type SeqFn<T> =
    Box<dyn FnOnce(Option<T>) -> Pin<Box<dyn Future<Output = Result<T, Error>> + Send>> + Send>;

/// Boxes a closure into a [`SeqFn`] step.
pub fn step<T, F, Fut>(func: F) -> SeqFn<T>
where
    F: FnOnce(Option<T>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, Error>> + Send + 'static,
{
    Box::new(move |value| Box::pin(func(value)))
}

/// Runs `steps` strictly in sequence — each fully settles before the next
/// begins — threading every settled value into the following step and
/// resolving with the final one. A fatal error short-circuits the rest.
pub async fn run_sequence<T>(steps: Vec<SeqFn<T>>) -> Result<Option<T>, Error> {
    let mut value = None;

    for step in steps {
        value = Some(step(value).await?);
    }
    Ok(value)
}
