//! Generic CRUD flow
//!
//! One request per operation. Each public function takes the shared context
//! and the resource's state, and reports the outcome as [`Diagnostics`]
//! (empty means success).

use super::{ReadResult, ResourceKind, ResourceState};
use crate::error::{Action, Diagnostics, OperationError};
use crate::lts::client::ProviderContext;
use crate::lts::http::{check_deleted, ApiRequest, ApiResponse, ReadOutcome};

/// Create the remote resource, assign its identity and refresh state
pub async fn create<K: ResourceKind>(
    ctx: &ProviderContext,
    state: &mut ResourceState<K::Fields>,
) -> Diagnostics {
    try_create::<K>(ctx, state).await.into()
}

/// Refresh state from the remote copy; clears identity if it is gone
pub async fn read<K: ResourceKind>(
    ctx: &ProviderContext,
    state: &mut ResourceState<K::Fields>,
) -> Diagnostics {
    if !state.is_present() {
        return Diagnostics::new();
    }
    refresh::<K>(ctx, state).await.into()
}

/// Push declared fields to the remote resource
pub async fn update<K: ResourceKind>(
    ctx: &ProviderContext,
    state: &mut ResourceState<K::Fields>,
) -> Diagnostics {
    try_update::<K>(ctx, state).await.into()
}

/// Delete the remote resource and retire its identity
pub async fn delete<K: ResourceKind>(
    ctx: &ProviderContext,
    state: &mut ResourceState<K::Fields>,
) -> Diagnostics {
    if !state.is_present() {
        return Diagnostics::new();
    }
    match try_delete::<K>(ctx, state).await {
        Ok(true) => Diagnostics::new(),
        Ok(false) => {
            let mut diags = Diagnostics::new();
            diags.push_warning(format!(
                "{} was already deleted remotely",
                K::TYPE_NAME
            ));
            diags
        }
        Err(err) => err.into(),
    }
}

async fn try_create<K: ResourceKind>(
    ctx: &ProviderContext,
    state: &mut ResourceState<K::Fields>,
) -> Result<(), OperationError> {
    let request = K::create_request(ctx, state).map_err(url_error::<K>)?;
    let response = execute::<K>(ctx, &request, Action::Create).await?;
    if !K::CREATE_OK.contains(&response.status) {
        return Err(status_error::<K>(Action::Create, &request, response));
    }

    let identity = K::create_identity(&response.body, state)
        .map_err(|err| err.with_payload(request.payload_text()))?;
    if let Some(id) = identity {
        state.set_id(id);
    }

    refresh::<K>(ctx, state).await?;

    if !state.is_present() {
        return Err(OperationError::MissingIdentity {
            kind: K::TYPE_NAME,
            action: Action::Create,
        });
    }
    Ok(())
}

async fn refresh<K: ResourceKind>(
    ctx: &ProviderContext,
    state: &mut ResourceState<K::Fields>,
) -> Result<(), OperationError> {
    let request = K::read_request(ctx, state).map_err(url_error::<K>)?;
    let response = execute::<K>(ctx, &request, Action::Read).await?;

    match check_deleted(response) {
        ReadOutcome::Gone => {
            tracing::warn!("{} {} no longer exists, removing from state", K::TYPE_NAME, state.id_str());
            state.clear_id();
            Ok(())
        }
        ReadOutcome::Failed { status, body } => Err(OperationError::Status {
            kind: K::TYPE_NAME,
            action: Action::Read,
            status,
            payload: request.payload_text(),
            body,
        }),
        ReadOutcome::Found(body) => {
            let region = ctx.region(state.region.as_deref()).to_string();
            state.region = Some(region);

            let applied = K::apply_read(&body, state)
                .map_err(|err| err.with_payload(request.payload_text()))?;
            if applied == ReadResult::Gone {
                tracing::warn!("{} {} returned no record, removing from state", K::TYPE_NAME, state.id_str());
                state.clear_id();
            }
            Ok(())
        }
    }
}

async fn try_update<K: ResourceKind>(
    ctx: &ProviderContext,
    state: &mut ResourceState<K::Fields>,
) -> Result<(), OperationError> {
    if !state.is_present() {
        return Err(OperationError::MissingIdentity {
            kind: K::TYPE_NAME,
            action: Action::Update,
        });
    }

    let request = K::update_request(ctx, state).map_err(url_error::<K>)?;
    let response = execute::<K>(ctx, &request, Action::Update).await?;
    if !K::UPDATE_OK.contains(&response.status) {
        return Err(status_error::<K>(Action::Update, &request, response));
    }
    K::apply_update(&response.body, state).map_err(|err| err.with_payload(request.payload_text()))
}

/// `Ok(false)` when the resource was already gone
async fn try_delete<K: ResourceKind>(
    ctx: &ProviderContext,
    state: &mut ResourceState<K::Fields>,
) -> Result<bool, OperationError> {
    let request = K::delete_request(ctx, state).map_err(url_error::<K>)?;
    let response = execute::<K>(ctx, &request, Action::Delete).await?;

    if K::DELETE_OK.contains(&response.status) {
        state.clear_id();
        return Ok(true);
    }
    if response.status == 404 {
        state.clear_id();
        return Ok(false);
    }
    Err(status_error::<K>(Action::Delete, &request, response))
}

async fn execute<K: ResourceKind>(
    ctx: &ProviderContext,
    request: &ApiRequest,
    action: Action,
) -> Result<ApiResponse, OperationError> {
    ctx.send(request)
        .await
        .map_err(|source| OperationError::Transport {
            kind: K::TYPE_NAME,
            action,
            payload: request.payload_text(),
            source,
        })
}

fn status_error<K: ResourceKind>(
    action: Action,
    request: &ApiRequest,
    response: ApiResponse,
) -> OperationError {
    OperationError::Status {
        kind: K::TYPE_NAME,
        action,
        status: response.status,
        payload: request.payload_text(),
        body: response.body,
    }
}

fn url_error<K: ResourceKind>(err: url::ParseError) -> OperationError {
    OperationError::Url {
        kind: K::TYPE_NAME,
        message: err.to_string(),
    }
}
