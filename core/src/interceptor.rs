//! Interceptor chain composed around the network call.
//!
//! # Design
//! A `Handler` takes the in-flight request and produces a `Reply`. The
//! innermost handler performs the transport call; every interceptor wraps
//! the handler it is given and returns a new one. [`compose`] folds the
//! registered list from the back, so the first-registered interceptor ends
//! up outermost: it runs first on the way in and last on the way out.
//!
//! An interceptor may mutate the request before delegating, inspect the
//! reply afterwards, or answer on its own without calling `next` at all.

use crate::error::ClientError;
use crate::http::{Reply, Request};

/// One step of the chain; consumed when called.
pub type Handler<'a> = Box<dyn FnOnce(&mut Request) -> Result<Reply, ClientError> + 'a>;

/// Wraps the next handler in the chain.
pub trait Interceptor: Send + Sync {
    fn wrap<'a>(&'a self, next: Handler<'a>) -> Handler<'a>;
}

/// Interceptor built from a closure receiving the request and the next
/// handler.
pub struct FnInterceptor<F> {
    f: F,
}

impl<F> Interceptor for FnInterceptor<F>
where
    F: Fn(&mut Request, Handler<'_>) -> Result<Reply, ClientError> + Send + Sync,
{
    fn wrap<'a>(&'a self, next: Handler<'a>) -> Handler<'a> {
        Box::new(move |request: &mut Request| (self.f)(request, next))
    }
}

/// Build an interceptor from a closure.
///
/// ```ignore
/// client.use_interceptor(from_fn(|request, next| {
///     request.headers.insert("x-trace", "on".parse().unwrap());
///     next(request)
/// }));
/// ```
pub fn from_fn<F>(f: F) -> FnInterceptor<F>
where
    F: Fn(&mut Request, Handler<'_>) -> Result<Reply, ClientError> + Send + Sync,
{
    FnInterceptor { f }
}

/// Wrap `innermost` with every interceptor, last-registered closest to it.
pub fn compose<'a>(interceptors: &'a [Box<dyn Interceptor>], innermost: Handler<'a>) -> Handler<'a> {
    interceptors
        .iter()
        .rev()
        .fold(innermost, |next, interceptor| interceptor.wrap(next))
}
