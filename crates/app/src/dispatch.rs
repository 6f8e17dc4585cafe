//! Request dispatch infrastructure.
//!
//! Every command and query is a [`Request`] with exactly one [`Handler`],
//! registered in the [`Dispatcher`] at startup. `send` runs the request
//! through the ordered [`PipelineBehavior`] chain before the handler
//! executes, so cross-cutting stages (logging, validation) apply uniformly
//! without being wired into handler bodies.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::validate::FieldViolation;

/// A boxed future, as returned by the erased handler layer.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Type-erased handler output, downcast back to `R::Output` in `send`.
pub type ErasedOutput = Box<dyn Any + Send>;

/// Per-request execution context.
///
/// Carries the cancellation signal. Handlers check it before committing so a
/// cancelled request never leaves a partial unit of work behind.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
}

impl RequestContext {
    /// Creates a context that is never cancelled externally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context driven by the given cancellation token.
    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Returns the cancellation token.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fails with [`AppError::Cancelled`] if the request was cancelled.
    pub fn ensure_active(&self) -> Result<(), AppError> {
        if self.cancel.is_cancelled() {
            Err(AppError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Object-safe request facts, available to pipeline behaviors.
pub trait RequestMeta: Send + Sync {
    /// Returns the request type name, used for logging.
    fn name(&self) -> &'static str;

    /// Evaluates the field-level validation rules for this request.
    ///
    /// A non-empty result makes the validation behavior short-circuit the
    /// pipeline before the handler runs.
    fn violations(&self) -> Vec<FieldViolation> {
        Vec::new()
    }
}

/// A command or query with its result type.
pub trait Request: RequestMeta + 'static {
    /// The projection returned on success.
    type Output: Send + 'static;
}

/// The unit of business logic for exactly one request type.
#[async_trait]
pub trait Handler<R: Request>: Send + Sync {
    async fn handle(&self, request: R, ctx: &RequestContext) -> Result<R::Output, AppError>;
}

/// Snapshot of request facts handed to each behavior.
#[derive(Debug)]
pub struct RequestInfo {
    pub name: &'static str,
    pub violations: Vec<FieldViolation>,
}

/// Continuation representing the rest of the pipeline.
///
/// A behavior either awaits `run` to continue, or drops it to short-circuit;
/// the underlying handler future is lazy and never executes in that case.
pub struct Next<'a> {
    behaviors: &'a [Arc<dyn PipelineBehavior>],
    info: &'a RequestInfo,
    finish: BoxFuture<'a, Result<ErasedOutput, AppError>>,
}

impl Next<'_> {
    /// Runs the remaining behaviors and, last, the handler itself.
    pub async fn run(self) -> Result<ErasedOutput, AppError> {
        let Self {
            behaviors,
            info,
            finish,
        } = self;
        match behaviors.split_first() {
            Some((behavior, rest)) => {
                behavior
                    .handle(
                        info,
                        Next {
                            behaviors: rest,
                            info,
                            finish,
                        },
                    )
                    .await
            }
            None => finish.await,
        }
    }
}

/// A cross-cutting stage wrapped around every handler invocation.
#[async_trait]
pub trait PipelineBehavior: Send + Sync {
    async fn handle(&self, info: &RequestInfo, next: Next<'_>) -> Result<ErasedOutput, AppError>;
}

#[async_trait]
trait ErasedHandler: Send + Sync {
    async fn call(
        &self,
        request: Box<dyn Any + Send>,
        ctx: &RequestContext,
    ) -> Result<ErasedOutput, AppError>;
}

struct HandlerAdapter<R, H> {
    handler: H,
    _marker: PhantomData<fn(R)>,
}

#[async_trait]
impl<R, H> ErasedHandler for HandlerAdapter<R, H>
where
    R: Request,
    H: Handler<R> + 'static,
{
    async fn call(
        &self,
        request: Box<dyn Any + Send>,
        ctx: &RequestContext,
    ) -> Result<ErasedOutput, AppError> {
        match request.downcast::<R>() {
            Ok(request) => {
                let output = self.handler.handle(*request, ctx).await?;
                Ok(Box::new(output))
            }
            Err(_) => Err(AppError::unexpected(
                "request type does not match registered handler",
            )),
        }
    }
}

/// Maps each request type to its single handler and runs the behavior chain.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<TypeId, Arc<dyn ErasedHandler>>,
    behaviors: Vec<Arc<dyn PipelineBehavior>>,
}

impl Dispatcher {
    /// Creates an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a behavior to the chain. The first behavior added is the
    /// outermost stage.
    pub fn with_behavior(mut self, behavior: Arc<dyn PipelineBehavior>) -> Self {
        self.behaviors.push(behavior);
        self
    }

    /// Registers the handler for a request type.
    ///
    /// Wiring happens once at startup; a second registration for the same
    /// type is a configuration bug.
    pub fn register<R: Request>(&mut self, handler: impl Handler<R> + 'static) {
        let previous = self.handlers.insert(
            TypeId::of::<R>(),
            Arc::new(HandlerAdapter {
                handler,
                _marker: PhantomData,
            }),
        );
        assert!(
            previous.is_none(),
            "handler already registered for {}",
            std::any::type_name::<R>()
        );
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Dispatches a request through the behavior chain to its handler.
    pub async fn send<R: Request>(
        &self,
        request: R,
        ctx: &RequestContext,
    ) -> Result<R::Output, AppError> {
        let Some(handler) = self.handlers.get(&TypeId::of::<R>()) else {
            return Err(AppError::unexpected(format!(
                "no handler registered for {}",
                request.name()
            )));
        };

        let info = RequestInfo {
            name: request.name(),
            violations: request.violations(),
        };
        let finish = handler.call(Box::new(request), ctx);

        let next = Next {
            behaviors: &self.behaviors,
            info: &info,
            finish,
        };
        let output = next.run().await?;

        match output.downcast::<R::Output>() {
            Ok(output) => Ok(*output),
            Err(_) => Err(AppError::unexpected(format!(
                "handler for {} produced an unexpected output type",
                info.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Echo {
        message: String,
    }

    impl RequestMeta for Echo {
        fn name(&self) -> &'static str {
            "Echo"
        }
    }

    impl Request for Echo {
        type Output = String;
    }

    struct EchoHandler;

    #[async_trait]
    impl Handler<Echo> for EchoHandler {
        async fn handle(&self, request: Echo, _ctx: &RequestContext) -> Result<String, AppError> {
            Ok(request.message)
        }
    }

    #[tokio::test]
    async fn send_routes_to_registered_handler() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register::<Echo>(EchoHandler);

        let result = dispatcher
            .send(
                Echo {
                    message: "hello".into(),
                },
                &RequestContext::new(),
            )
            .await
            .unwrap();

        assert_eq!(result, "hello");
    }

    #[tokio::test]
    async fn send_without_handler_fails() {
        let dispatcher = Dispatcher::new();
        let result = dispatcher
            .send(Echo { message: "x".into() }, &RequestContext::new())
            .await;
        assert!(matches!(result, Err(AppError::Unexpected(_))));
    }

    #[test]
    #[should_panic(expected = "handler already registered")]
    fn duplicate_registration_panics() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register::<Echo>(EchoHandler);
        dispatcher.register::<Echo>(EchoHandler);
    }

    #[tokio::test]
    async fn cancelled_context_reports_inactive() {
        let token = CancellationToken::new();
        let ctx = RequestContext::with_cancel(token.clone());
        assert!(ctx.ensure_active().is_ok());

        token.cancel();
        assert!(matches!(ctx.ensure_active(), Err(AppError::Cancelled)));
    }

    struct ShortCircuit;

    #[async_trait]
    impl PipelineBehavior for ShortCircuit {
        async fn handle(
            &self,
            _info: &RequestInfo,
            _next: Next<'_>,
        ) -> Result<ErasedOutput, AppError> {
            Err(AppError::Forbidden("short-circuited"))
        }
    }

    #[tokio::test]
    async fn behavior_can_short_circuit_without_running_handler() {
        let mut dispatcher = Dispatcher::new().with_behavior(Arc::new(ShortCircuit));
        dispatcher.register::<Echo>(EchoHandler);

        let result = dispatcher
            .send(Echo { message: "x".into() }, &RequestContext::new())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
