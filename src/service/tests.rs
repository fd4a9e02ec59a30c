use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::api::tests::{
    current_conditions_body, forecast_body, london_geocoding_body, mock_config,
};

fn mock_service(server: &MockServer) -> WeatherService {
    WeatherService::new(&mock_config(server)).expect("service builds")
}

#[tokio::test]
async fn city_lookup_hits_cache_on_second_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_geocoding_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_conditions_body()))
        .expect(1)
        .mount(&server)
        .await;

    let service = mock_service(&server);

    let first = service
        .current_by_city("London")
        .await
        .expect("first lookup succeeds");
    let second = service
        .current_by_city("London")
        .await
        .expect("second lookup succeeds");

    // Byte-identical text, and the upstream mocks verify exactly one call each.
    assert_eq!(first, second);
}

#[tokio::test]
async fn city_keys_are_case_insensitive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_geocoding_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_conditions_body()))
        .expect(1)
        .mount(&server)
        .await;

    let service = mock_service(&server);

    let first = service.current_by_city("London").await.expect("succeeds");
    let second = service.current_by_city("LONDON").await.expect("succeeds");
    assert_eq!(first, second);
}

#[tokio::test]
async fn forecasts_cache_per_day_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_geocoding_body()))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("forecast_days", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(3)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("forecast_days", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(5)))
        .expect(1)
        .mount(&server)
        .await;

    let service = mock_service(&server);

    let three_day = service
        .forecast_by_city("London", 3)
        .await
        .expect("3-day forecast succeeds");
    let five_day = service
        .forecast_by_city("London", 5)
        .await
        .expect("5-day forecast succeeds");
    assert_ne!(three_day, five_day);

    // Repeats are served from cache; the per-day-count mocks verify one call each.
    let cached = service
        .forecast_by_city("London", 3)
        .await
        .expect("cached forecast succeeds");
    assert_eq!(cached, three_day);
}

#[tokio::test]
async fn empty_city_is_rejected_before_any_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let service = mock_service(&server);

    assert!(matches!(
        service.current_by_city("   ").await,
        Err(ServiceError::EmptyCity)
    ));
    assert!(matches!(
        service.forecast_by_city("", DEFAULT_FORECAST_DAYS).await,
        Err(ServiceError::EmptyCity)
    ));
}

#[tokio::test]
async fn out_of_range_coordinates_are_rejected_before_any_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let service = mock_service(&server);

    assert!(matches!(
        service.current_by_coordinates(90.0001, 0.0).await,
        Err(ServiceError::InvalidLatitude(_))
    ));
    assert!(matches!(
        service.current_by_coordinates(0.0, -180.5).await,
        Err(ServiceError::InvalidLongitude(_))
    ));
}

#[tokio::test]
async fn boundary_coordinates_are_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_conditions_body()))
        .mount(&server)
        .await;

    let service = mock_service(&server);

    let report = service
        .current_by_coordinates(90.0, 180.0)
        .await
        .expect("boundary coordinates succeed");
    assert!(report.contains("90.0000, 180.0000"));
}

#[tokio::test]
async fn coordinate_lookups_are_never_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_conditions_body()))
        .expect(2)
        .mount(&server)
        .await;

    let service = mock_service(&server);

    service
        .current_by_coordinates(51.5, -0.1)
        .await
        .expect("first lookup succeeds");
    service
        .current_by_coordinates(51.5, -0.1)
        .await
        .expect("second lookup succeeds");
    // Mock verifies two live fetches on drop.
}

#[tokio::test]
async fn unknown_city_surfaces_location_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})),
        )
        .mount(&server)
        .await;

    let service = mock_service(&server);

    let err = service
        .current_by_city("Nowhereland")
        .await
        .expect_err("lookup fails");
    assert!(err.to_string().contains("Nowhereland"));
    assert!(matches!(
        err,
        ServiceError::Api(ApiError::LocationNotFound { .. })
    ));
}
