//! Energy-saving tip handler.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use greenmachine_app::ports::{Backend, TipGenerator};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TipBody {
    pub tip: String,
    /// Whether a text-generation backend is configured at all.
    pub configured: bool,
}

/// `GET /api/tip`: never fails; falls back to a canned tip.
pub async fn get<B, T>(State(state): State<AppState<B, T>>) -> Json<TipBody>
where
    B: Backend,
    T: TipGenerator + Send + Sync + 'static,
{
    Json(TipBody {
        tip: state.tips.energy_saving_tip().await,
        configured: state.tips.is_configured(),
    })
}
