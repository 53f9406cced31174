//! Binding of domain handlers to a schema-described service.
//!
//! [`bind`] resolves every method's request and response types once and
//! precomputes their field converters. Each call of the resulting
//! [`WireMethod`] then runs:
//!
//! 1. request conversion, wire to domain
//! 2. the pre-processors, in order, threading the [`CallContext`]
//! 3. the handler
//! 4. the null-response check
//! 5. response conversion, domain to wire
//!
//! Any failure ends the call with the [`Status`] its [`Error`] maps to.

use super::handler::{Handler, Handlers};
use super::service::{MethodDefinition, ServiceDefinition};
use super::tree::map_leaves;
use crate::auth::{CallContext, PreProcessor};
use crate::error::{Error, Result};
use crate::extract::{extract_converters, FieldConverter};
use crate::schema::SchemaIndex;
use crate::value::{Message, Value};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tonic::metadata::MetadataMap;
use tonic::Status;
use tracing::{debug, debug_span, info, warn, Instrument};

/// Decoded request together with its transport metadata.
#[derive(Debug, Clone, Default)]
pub struct WireCall {
    pub request: Message,
    pub metadata: MetadataMap,
}

impl WireCall {
    pub fn new(request: Message) -> Self {
        Self {
            request,
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: MetadataMap) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Responder for methods bound without a handler.
struct UnimplementedHandler;

#[async_trait]
impl Handler for UnimplementedHandler {
    async fn handle(&self, ctx: &CallContext, _request: Message) -> Result<Option<Message>> {
        Err(Error::Unimplemented(ctx.method().to_owned()))
    }
}

struct BoundMethod {
    definition: MethodDefinition,
    request_converters: Vec<FieldConverter>,
    response_converters: Vec<FieldConverter>,
    handler: Arc<dyn Handler>,
    pre_processors: Arc<[Arc<dyn PreProcessor>]>,
}

/// A method ready to serve calls. Cheap to clone; shared by concurrent calls.
#[derive(Clone)]
pub struct WireMethod {
    inner: Arc<BoundMethod>,
}

impl WireMethod {
    pub fn name(&self) -> &str {
        &self.inner.definition.name
    }

    pub fn path(&self) -> &str {
        &self.inner.definition.path
    }

    pub fn definition(&self) -> &MethodDefinition {
        &self.inner.definition
    }

    pub fn request_converters(&self) -> &[FieldConverter] {
        &self.inner.request_converters
    }

    pub fn response_converters(&self) -> &[FieldConverter] {
        &self.inner.response_converters
    }

    /// Serve one call.
    pub async fn call(&self, call: WireCall) -> std::result::Result<Message, Status> {
        let span = debug_span!("rpc", method = self.path());
        async move {
            match self.dispatch(call).await {
                Ok(response) => {
                    debug!("Call completed");
                    Ok(response)
                }
                Err(err) => {
                    let status = Status::from(err);
                    warn!(code = ?status.code(), message = status.message(), "Call failed");
                    Err(status)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Serve one call and hand the outcome to `deliver`, exactly once.
    pub async fn invoke<F>(&self, call: WireCall, deliver: F)
    where
        F: FnOnce(std::result::Result<Message, Status>),
    {
        deliver(self.call(call).await);
    }

    async fn dispatch(&self, call: WireCall) -> Result<Message> {
        let method = &*self.inner;
        let WireCall {
            mut request,
            metadata,
        } = call;

        convert(&mut request, &method.request_converters, FieldConverter::to_domain)?;

        let mut ctx = CallContext::new(method.definition.path.as_str(), metadata);
        for pre_processor in method.pre_processors.iter() {
            ctx = pre_processor.process(ctx).await?;
        }

        let mut response = method
            .handler
            .handle(&ctx, request)
            .await?
            .ok_or_else(|| Error::NullResponse(method.definition.path.clone()))?;

        convert(&mut response, &method.response_converters, FieldConverter::to_wire)?;
        Ok(response)
    }
}

fn convert(
    message: &mut Message,
    converters: &[FieldConverter],
    direction: fn(&FieldConverter, Value) -> Result<Value>,
) -> Result<()> {
    for converter in converters {
        map_leaves(message, &converter.path, &converter.name, &|value| {
            direction(converter, value)
        })?;
    }
    Ok(())
}

/// All methods of a bound service.
#[derive(Clone)]
pub struct WireService {
    name: String,
    methods: Vec<WireMethod>,
    by_name: HashMap<String, usize>,
}

impl WireService {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self, name: &str) -> Option<&WireMethod> {
        self.by_name.get(name).map(|&i| &self.methods[i])
    }

    /// Look up a method by gRPC route, `/pkg.Service/Method`.
    pub fn route(&self, path: &str) -> Option<&WireMethod> {
        self.methods.iter().find(|m| m.path() == path)
    }

    /// Methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &WireMethod> {
        self.methods.iter()
    }
}

/// Bind `handlers` to the methods of `service`.
///
/// Fails when a request or response type, or any message type they reach,
/// cannot be resolved in `index`. Methods without a handler answer every
/// call with `Unimplemented`.
pub fn bind(
    service: &ServiceDefinition,
    handlers: &Handlers,
    pre_processors: Vec<Arc<dyn PreProcessor>>,
    index: &SchemaIndex<'_>,
) -> Result<WireService> {
    let pre_processors: Arc<[Arc<dyn PreProcessor>]> = pre_processors.into();

    for name in handlers.methods() {
        if service.method(name).is_none() {
            warn!(service = %service.name, method = name, "Handler registered for unknown method");
        }
    }

    let mut methods = Vec::with_capacity(service.methods.len());
    let mut by_name = HashMap::with_capacity(service.methods.len());

    for definition in &service.methods {
        let request_converters = extract_converters(index.message(&definition.request_type)?, index)?;
        let response_converters = extract_converters(index.message(&definition.response_type)?, index)?;

        let handler = handlers.get(&definition.name).unwrap_or_else(|| {
            warn!(method = %definition.path, "No handler registered, calls will be rejected as unimplemented");
            let responder: Arc<dyn Handler> = Arc::new(UnimplementedHandler);
            responder
        });

        debug!(
            method = %definition.path,
            request_converters = request_converters.len(),
            response_converters = response_converters.len(),
            "Bound method"
        );

        by_name.insert(definition.name.clone(), methods.len());
        methods.push(WireMethod {
            inner: Arc::new(BoundMethod {
                definition: definition.clone(),
                request_converters,
                response_converters,
                handler,
                pre_processors: Arc::clone(&pre_processors),
            }),
        });
    }

    info!(service = %service.name, methods = methods.len(), "Service bound");

    Ok(WireService {
        name: service.name.clone(),
        methods,
        by_name,
    })
}
