//! Green points handler.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use greenmachine_app::ports::{Backend, TipGenerator};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PointsBody {
    pub points: u64,
}

pub enum PointsResponse {
    Ok(Json<PointsBody>),
}

impl IntoResponse for PointsResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/points`
pub async fn get<B, T>(State(state): State<AppState<B, T>>) -> Result<PointsResponse, ApiError>
where
    B: Backend,
    T: TipGenerator + Send + Sync + 'static,
{
    let points = state.ctx.backend().get_points().await?;
    Ok(PointsResponse::Ok(Json(PointsBody { points })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing;
    use greenmachine_adapter_simulated::SimulatedStore;
    use greenmachine_domain::points::PointsLedger;

    #[tokio::test]
    async fn should_return_balance() {
        let store = SimulatedStore {
            points: PointsLedger::new(30),
            ..SimulatedStore::default()
        };

        let PointsResponse::Ok(Json(body)) =
            get(State(testing::state_with(store, None))).await.unwrap();

        assert_eq!(body.points, 30);
    }
}
