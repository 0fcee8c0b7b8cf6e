//! # Effects
//!
//! Runs the I/O an `Effect` describes against a `HelixService` and turns
//! the outcome back into an `Action`. The TUI spawns one task per effect;
//! tests await `perform` directly.

use log::{debug, info};
use tokio::sync::mpsc::Sender;

use crate::api::{HelixService, SessionChunk};
use crate::core::action::{Action, Effect};

/// Flattens nested batches into the effects that actually do I/O.
pub fn flatten(effect: Effect) -> Vec<Effect> {
    match effect {
        Effect::None => Vec::new(),
        Effect::Batch(effects) => effects.into_iter().flat_map(flatten).collect(),
        other => vec![other],
    }
}

/// Executes one effect. `Quit`, `None` and `Batch` are handled by the caller
/// and produce nothing here.
pub async fn perform(
    effect: Effect,
    service: &dyn HelixService,
    chunks: Sender<SessionChunk>,
) -> Option<Action> {
    debug!("Performing effect: {:?}", effect);
    match effect {
        Effect::None | Effect::Quit | Effect::Batch(_) => None,

        Effect::StartInference { ticket, request } => {
            let prompt = request.message.clone();
            match service.start_inference(request, chunks).await {
                Ok(Some(session)) => {
                    info!("Session {} started (ticket={})", session.id, ticket);
                    Some(Action::InferenceStarted {
                        ticket,
                        session,
                        prompt,
                    })
                }
                Ok(None) => Some(Action::InferenceEmpty { ticket }),
                Err(e) => Some(Action::InferenceFailed {
                    ticket,
                    message: e.to_string(),
                }),
            }
        }

        Effect::ReloadSessions { ticket, then } => Some(Action::SessionsReloaded {
            ticket,
            result: service.list_sessions().await,
            then,
        }),

        Effect::LoadApps => Some(Action::AppsLoaded(service.list_apps().await)),

        Effect::CreateEmptyApp => Some(Action::AppCreated(service.create_empty_app().await)),

        Effect::FetchAccount => Some(Action::AccountLoaded(service.current_user().await)),

        Effect::Login { api_key } => {
            service.set_api_key(api_key);
            Some(Action::LoginCompleted(service.current_user().await))
        }

        Effect::LoadModels => Some(Action::ModelsLoaded(service.list_models().await)),
    }
}
