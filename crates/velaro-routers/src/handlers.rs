//! Conversion of registration arguments into handler chains.

use std::sync::Arc;
use velaro_http::Handler;

/// Anything accepted where a registration call wants handlers: a single
/// handler, a tuple of handlers run in order, or an explicit `Vec`.
///
/// The `M` marker parameter only disambiguates the implementations; callers
/// never name it.
///
/// # Examples
///
/// ```
/// use velaro_http::handler_fn;
/// use velaro_routers::Router;
///
/// let auth = handler_fn(|_req, _res, next| {
///     Box::pin(async move {
///         next.proceed();
///         Ok(())
///     })
/// });
/// let show = handler_fn(|_req, res: &mut velaro_http::Response, _next| {
///     Box::pin(async move {
///         res.send("profile");
///         Ok(())
///     })
/// });
///
/// // A tuple registers an ordered two-handler chain on one entry.
/// let router = Router::new().get("/profile", (auth, show)).unwrap();
/// # let _ = router;
/// ```
pub trait IntoHandlers<M> {
	/// Converts into the ordered handler chain of one registry entry.
	fn into_handlers(self) -> Vec<Arc<dyn Handler>>;
}

#[doc(hidden)]
pub struct OneHandler;

#[doc(hidden)]
pub struct HandlerList;

#[doc(hidden)]
pub struct HandlerPair;

#[doc(hidden)]
pub struct HandlerTriple;

impl<H: Handler + 'static> IntoHandlers<OneHandler> for H {
	fn into_handlers(self) -> Vec<Arc<dyn Handler>> {
		vec![Arc::new(self)]
	}
}

impl IntoHandlers<HandlerList> for Vec<Arc<dyn Handler>> {
	fn into_handlers(self) -> Vec<Arc<dyn Handler>> {
		self
	}
}

impl<H1, H2> IntoHandlers<HandlerPair> for (H1, H2)
where
	H1: Handler + 'static,
	H2: Handler + 'static,
{
	fn into_handlers(self) -> Vec<Arc<dyn Handler>> {
		vec![Arc::new(self.0), Arc::new(self.1)]
	}
}

impl<H1, H2, H3> IntoHandlers<HandlerTriple> for (H1, H2, H3)
where
	H1: Handler + 'static,
	H2: Handler + 'static,
	H3: Handler + 'static,
{
	fn into_handlers(self) -> Vec<Arc<dyn Handler>> {
		vec![Arc::new(self.0), Arc::new(self.1), Arc::new(self.2)]
	}
}
