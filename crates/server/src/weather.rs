use agrichat_agent::{WeatherAdvice, WeatherQuery};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{debug, warn};

use crate::routes::AppState;

/// Never fails: an unreadable body is answered for the default conditions
/// and a failing model is replaced by the heuristic advisor.
pub async fn get_weather(
    State(state): State<AppState>,
    payload: Result<Json<WeatherQuery>, JsonRejection>,
) -> Json<WeatherAdvice> {
    let query = match payload {
        Ok(Json(query)) => query,
        Err(rejection) => {
            warn!(
                event_name = "server.weather.invalid_query",
                reason = %rejection.body_text(),
                "weather query unreadable, using default conditions"
            );
            WeatherQuery::default()
        }
    };
    debug!(
        event_name = "server.weather.query",
        temperature = query.temperature,
        humidity = query.humidity,
        pressure = query.pressure,
        "weather advice requested"
    );

    Json(state.weather.advise(&query, state.weather_model.as_ref()).await)
}

#[cfg(test)]
mod tests {
    use agrichat_agent::WeatherAdvice;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    use crate::routes::{router, test_support::state};

    async fn post(body: String) -> Result<WeatherAdvice, String> {
        let request = Request::post("/api/get-weather")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .map_err(|error| error.to_string())?;
        let response = router(state(Ok(String::new())), None)
            .oneshot(request)
            .await
            .map_err(|error| error.to_string())?;
        if response.status() != StatusCode::OK {
            return Err(format!("unexpected status {}", response.status()));
        }
        let bytes = to_bytes(response.into_body(), 8 * 1024).await.map_err(|error| error.to_string())?;
        serde_json::from_slice(&bytes).map_err(|error| error.to_string())
    }

    #[tokio::test]
    async fn offline_model_falls_back_to_heuristic_advice() -> Result<(), String> {
        let advice = post(json!({ "temperature": "34", "humidity": 40, "pressure": 1008 }).to_string()).await?;

        assert_eq!(advice.description, "Hot and Dry");
        assert_eq!(advice.advice, "Irrigate crops and provide shade for livestock.");
        assert_eq!(advice.forecast, 0.5);
        assert_eq!(advice.temperature, 34.0);
        Ok(())
    }

    #[tokio::test]
    async fn missing_fields_use_default_conditions() -> Result<(), String> {
        let advice = post("{}".to_string()).await?;
        assert_eq!(advice.description, "Mild Weather");
        assert_eq!((advice.temperature, advice.humidity, advice.pressure), (25.0, 80.0, 1012.0));

        let unreadable = post("not json".to_string()).await?;
        assert_eq!(unreadable, advice);
        Ok(())
    }

    #[tokio::test]
    async fn blank_form_field_keeps_the_other_values() -> Result<(), String> {
        let advice =
            post(json!({ "temperature": "34", "humidity": "", "pressure": "1008" }).to_string())
                .await?;

        assert_eq!((advice.temperature, advice.humidity, advice.pressure), (34.0, 80.0, 1008.0));
        assert_eq!(advice.description, "Mild Weather");
        Ok(())
    }
}
