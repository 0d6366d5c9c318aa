// File: src/actions.rs
// Purpose: Intent-based dispatch of one form submission to a named handler

use crate::config::FormsConfig;
use crate::error::ActionError;
use crate::intent::FormAction;
use crate::query::{FormData, QueryParams};
use crate::request_context::{ActionArgs, InvalidSubmission, ValidatedContext};
use crate::validation::{ErrorDisplay, FieldErrors, SafeValidator};
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, warn};

/// Boxed future returned by erased handlers
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Handler registered without a validator
pub type SimpleHandlerFn = Arc<dyn Fn(ActionArgs) -> BoxFuture<Response> + Send + Sync>;

/// Responds to a submission its validator rejected
pub type InvalidHandlerFn = Arc<dyn Fn(InvalidSubmission) -> BoxFuture<Response> + Send + Sync>;

/// Submission handed back by a guard whose validator failed.
struct Rejected {
    args: ActionArgs,
    errors: FieldErrors,
}

/// A validator paired with the handler it guards, with the data type erased.
trait GuardedHandler: Send + Sync {
    /// Validate the query view; on success return the handler's future.
    fn run(&self, args: ActionArgs) -> Result<BoxFuture<Response>, Box<Rejected>>;
}

struct Guarded<V, T, H> {
    validator: V,
    handler: H,
    _marker: PhantomData<fn() -> T>,
}

impl<V, T, H, Fut, R> GuardedHandler for Guarded<V, T, H>
where
    V: SafeValidator<T>,
    T: Send + 'static,
    H: Fn(ValidatedContext<T>) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn run(&self, args: ActionArgs) -> Result<BoxFuture<Response>, Box<Rejected>> {
        let data = match self.validator.safe_parse(&args.query).into_result() {
            Ok(data) => data,
            Err(errors) => return Err(Box::new(Rejected { args, errors })),
        };
        let ctx = ValidatedContext {
            data,
            intent: args.intent,
            request: args.request,
            form: args.form,
            query: args.query,
        };
        let fut = (self.handler)(ctx);
        Ok(Box::pin(async move { fut.await.into_response() }))
    }
}

#[derive(Clone)]
enum HandlerKind {
    Simple(SimpleHandlerFn),
    Validated(Arc<dyn GuardedHandler>),
}

/// One registry entry: a bare handler, or a validator plus handler.
#[derive(Clone)]
pub struct ActionHandler {
    kind: HandlerKind,
}

impl ActionHandler {
    pub fn is_validated(&self) -> bool {
        matches!(self.kind, HandlerKind::Validated(_))
    }
}

impl fmt::Debug for ActionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            HandlerKind::Simple(_) => "simple",
            HandlerKind::Validated(_) => "validated",
        };
        f.debug_struct("ActionHandler").field("kind", &kind).finish()
    }
}

/// Builder for an [`Actions`] registry (functional builder pattern)
///
/// ```ignore
/// let actions = Actions::builder()
///     .validated("addTodo", garde_validator::<TodoInput>(), |ctx| async move {
///         Json(store.add(ctx.data.title).await)
///     })
///     .action("deleteTodo", |args| async move {
///         Json(store.remove(args.query.get("id")).await)
///     })
///     .build()?;
/// ```
pub struct ActionsBuilder {
    entries: Vec<(String, ActionHandler)>,
    on_invalid: Option<InvalidHandlerFn>,
    error_display: ErrorDisplay,
    body_limit: usize,
}

impl ActionsBuilder {
    fn new() -> Self {
        let forms = FormsConfig::default();
        Self {
            entries: Vec::new(),
            on_invalid: None,
            error_display: forms.error_display,
            body_limit: forms.body_limit,
        }
    }

    /// Register a handler that receives the raw submission.
    pub fn action<H, Fut, R>(mut self, intent: impl Into<String>, handler: H) -> Self
    where
        H: Fn(ActionArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        let handler: SimpleHandlerFn = Arc::new(move |args: ActionArgs| -> BoxFuture<Response> {
            let fut = handler(args);
            Box::pin(async move { fut.await.into_response() })
        });
        self.entries.push((
            intent.into(),
            ActionHandler {
                kind: HandlerKind::Simple(handler),
            },
        ));
        self
    }

    /// Register a handler that only ever sees data accepted by `validator`.
    pub fn validated<V, T, H, Fut, R>(
        mut self,
        intent: impl Into<String>,
        validator: V,
        handler: H,
    ) -> Self
    where
        V: SafeValidator<T> + 'static,
        T: Send + 'static,
        H: Fn(ValidatedContext<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        let guarded = Guarded {
            validator,
            handler,
            _marker: PhantomData,
        };
        self.entries.push((
            intent.into(),
            ActionHandler {
                kind: HandlerKind::Validated(Arc::new(guarded)),
            },
        ));
        self
    }

    /// Respond to rejected submissions yourself, e.g. by re-rendering the
    /// page with the messages inline for clients that did not ask for JSON.
    ///
    /// Without a hook every rejection is answered with
    /// [`ValidationErrors`](crate::response::ValidationErrors).
    pub fn on_invalid<H, Fut, R>(mut self, handler: H) -> Self
    where
        H: Fn(InvalidSubmission) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.on_invalid = Some(Arc::new(move |invalid: InvalidSubmission| -> BoxFuture<Response> {
            let fut = handler(invalid);
            Box::pin(async move { fut.await.into_response() })
        }));
        self
    }

    /// Messages per field in validation error responses
    pub fn error_display(mut self, display: ErrorDisplay) -> Self {
        self.error_display = display;
        self
    }

    /// Largest accepted body, in bytes
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Apply the `[forms]` section of the config file
    pub fn config(self, forms: &FormsConfig) -> Self {
        self.error_display(forms.error_display)
            .body_limit(forms.body_limit)
    }

    /// Freeze the registry. Fails if an intent was registered twice.
    pub fn build(self) -> Result<Actions, ActionError> {
        let mut handlers = HashMap::with_capacity(self.entries.len());
        for (intent, handler) in self.entries {
            if handlers.contains_key(&intent) {
                return Err(ActionError::DuplicateIntent(intent));
            }
            handlers.insert(intent, handler);
        }

        Ok(Actions {
            inner: Arc::new(ActionsInner {
                handlers,
                on_invalid: self.on_invalid,
                error_display: self.error_display,
                body_limit: self.body_limit,
            }),
        })
    }
}

struct ActionsInner {
    handlers: HashMap<String, ActionHandler>,
    on_invalid: Option<InvalidHandlerFn>,
    error_display: ErrorDisplay,
    body_limit: usize,
}

/// Immutable intent → handler registry and the dispatch entry point.
///
/// Cheap to clone; clones share the registry.
#[derive(Clone)]
pub struct Actions {
    inner: Arc<ActionsInner>,
}

/// Outcome of looking up the handler for a submission.
#[derive(Debug)]
pub struct Resolved<'a> {
    pub intent: String,
    pub handler: &'a ActionHandler,
    pub query: QueryParams,
}

impl Actions {
    pub fn builder() -> ActionsBuilder {
        ActionsBuilder::new()
    }

    pub fn contains(&self, intent: &str) -> bool {
        self.inner.handlers.contains_key(intent)
    }

    pub fn len(&self) -> usize {
        self.inner.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.handlers.is_empty()
    }

    /// Registered intent names, sorted
    pub fn intents(&self) -> Vec<&str> {
        let mut intents: Vec<&str> = self.inner.handlers.keys().map(String::as_str).collect();
        intents.sort_unstable();
        intents
    }

    pub fn error_display(&self) -> ErrorDisplay {
        self.inner.error_display
    }

    /// Pick the handler for a submission without running anything.
    ///
    /// `_action` may be a bare intent or a composed `intent?k=v` string. The
    /// query view is the composed parameters overlaid with every other
    /// submitted field.
    pub fn resolve(&self, form: &FormData) -> Result<Resolved<'_>, ActionError> {
        let (intent, mut query) = form
            .intent()
            .map(FormAction::parse)
            .map(FormAction::into_parts)
            .ok_or(ActionError::MissingIntent)?;

        if intent.is_empty() {
            return Err(ActionError::MissingIntent);
        }

        let handler = self
            .inner
            .handlers
            .get(&intent)
            .ok_or_else(|| ActionError::UnknownIntent(intent.clone()))?;

        for (key, value) in form.to_query() {
            query.set(key, value);
        }

        Ok(Resolved {
            intent,
            handler,
            query,
        })
    }

    /// Read the request body as a form and dispatch it.
    pub async fn dispatch(&self, request: Request) -> Response {
        let (parts, body) = request.into_parts();
        match read_form(&parts.headers, body, self.inner.body_limit).await {
            Ok(form) => self.dispatch_form(parts, form).await,
            Err(error) => {
                warn!(%error, "rejected form body");
                error.into_response()
            }
        }
    }

    /// Dispatch an already-parsed submission.
    pub async fn dispatch_form(&self, request: Parts, form: FormData) -> Response {
        let Resolved {
            intent,
            handler,
            query,
        } = match self.resolve(&form) {
            Ok(resolved) => resolved,
            Err(error) => {
                warn!(%error, "rejected form submission");
                return error.into_response();
            }
        };

        debug!(%intent, fields = query.len(), validated = handler.is_validated(), "dispatching form action");

        let args = ActionArgs {
            intent,
            request,
            form,
            query,
        };

        match &handler.kind {
            HandlerKind::Simple(handler) => handler(args).await,
            HandlerKind::Validated(guarded) => match guarded.run(args) {
                Ok(fut) => fut.await,
                Err(rejected) => {
                    let Rejected { args, errors } = *rejected;
                    debug!(intent = %args.intent, fields = errors.len(), "form validation failed");
                    let invalid = InvalidSubmission {
                        intent: args.intent,
                        request: args.request,
                        form: args.form,
                        query: args.query,
                        errors,
                        display: self.inner.error_display,
                    };
                    match &self.inner.on_invalid {
                        Some(on_invalid) => on_invalid(invalid).await,
                        None => invalid.into_validation_errors().into_response(),
                    }
                }
            },
        }
    }
}

impl fmt::Debug for Actions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actions")
            .field("intents", &self.intents())
            .field("on_invalid", &self.inner.on_invalid.is_some())
            .field("error_display", &self.inner.error_display)
            .field("body_limit", &self.inner.body_limit)
            .finish()
    }
}

/// Axum handler dispatching with an [`Actions`] router state.
///
/// ```ignore
/// let app = Router::new()
///     .route("/", post(form_xn::handle_actions))
///     .with_state(actions);
/// ```
pub async fn handle_actions(State(actions): State<Actions>, request: Request) -> Response {
    actions.dispatch(request).await
}

/// Parse a request body as form entries.
///
/// Urlencoded bodies (or bodies without a content type) are forms; multipart
/// bodies contribute their text parts; a JSON object contributes its string
/// members; anything else is rejected.
pub async fn read_form(
    headers: &HeaderMap,
    body: Body,
    limit: usize,
) -> Result<FormData, ActionError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    let is_json = match essence.as_str() {
        "" | "application/x-www-form-urlencoded" => false,
        "application/json" => true,
        "multipart/form-data" => {
            let boundary = multer::parse_boundary(content_type).map_err(invalid_body)?;
            return read_multipart(body, boundary, limit).await;
        }
        _ => return Err(ActionError::UnsupportedMediaType(content_type.to_string())),
    };

    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(invalid_body)?;

    if is_json {
        let json: serde_json::Value = serde_json::from_slice(&bytes).map_err(invalid_body)?;
        Ok(FormData::from_json(&json))
    } else {
        Ok(FormData::from_urlencoded(&bytes))
    }
}

/// Text parts in submission order. File parts are skipped.
async fn read_multipart(
    body: Body,
    boundary: String,
    limit: usize,
) -> Result<FormData, ActionError> {
    let constraints =
        multer::Constraints::new().size_limit(multer::SizeLimit::new().whole_stream(limit as u64));
    let mut multipart =
        multer::Multipart::with_constraints(body.into_data_stream(), boundary, constraints);

    let mut form = FormData::new();
    while let Some(field) = multipart.next_field().await.map_err(invalid_body)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if field.file_name().is_some() {
            debug!(%name, "skipping file part");
            continue;
        }
        let value = field.text().await.map_err(invalid_body)?;
        form.append(name, value);
    }
    Ok(form)
}

fn invalid_body(error: impl fmt::Display) -> ActionError {
    ActionError::InvalidBody(error.to_string())
}
