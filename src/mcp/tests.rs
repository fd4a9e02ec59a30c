//! MCP Implementation Tests
//!
//! Unit tests for tool/resource definitions, response-shape conversion, and
//! URI template matching.

#[cfg(test)]
mod tool_definition_tests {
    use crate::mcp::tools::{
        GetForecastHandler, GetWeatherByCoordinatesHandler, GetWeatherHandler,
    };

    #[test]
    fn get_weather_tool_definition() {
        let tool = GetWeatherHandler::tool_definition();

        assert_eq!(tool.name, "get_weather");
        assert!(tool.description.is_some());

        let schema = tool.input_schema;
        let properties = schema["properties"].as_object().expect("has properties");
        assert!(properties.contains_key("city"));
        assert_eq!(schema["properties"]["city"]["type"], "string");

        let required = schema["required"].as_array().expect("has required array");
        assert_eq!(required.len(), 1);
        assert_eq!(required[0], "city");
    }

    #[test]
    fn get_forecast_tool_definition() {
        let tool = GetForecastHandler::tool_definition();

        assert_eq!(tool.name, "get_forecast");

        let schema = tool.input_schema;
        let properties = schema["properties"].as_object().expect("has properties");
        assert!(properties.contains_key("city"));
        assert!(properties.contains_key("days"));

        // days is optional with a documented 1-14 range
        let required = schema["required"].as_array().expect("has required array");
        assert_eq!(required.len(), 1);
        assert_eq!(required[0], "city");
        assert_eq!(schema["properties"]["days"]["minimum"], 1);
        assert_eq!(schema["properties"]["days"]["maximum"], 14);
    }

    #[test]
    fn get_weather_by_coordinates_tool_definition() {
        let tool = GetWeatherByCoordinatesHandler::tool_definition();

        assert_eq!(tool.name, "get_weather_by_coordinates");

        let schema = tool.input_schema;
        let required = schema["required"].as_array().expect("has required array");
        assert_eq!(required.len(), 2);
        assert_eq!(schema["properties"]["latitude"]["type"], "number");
        assert_eq!(schema["properties"]["longitude"]["type"], "number");
    }
}

#[cfg(test)]
mod handler_output_tests {
    use crate::mcp::protocol::{CallToolResult, ToolContent};
    use crate::mcp::server::HandlerOutput;
    use serde_json::json;

    #[test]
    fn text_output_becomes_a_single_text_item() {
        let response = HandlerOutput::Text("sunny".to_string())
            .into_tool_response()
            .expect("conversion succeeds");

        assert_eq!(response["content"][0]["type"], "text");
        assert_eq!(response["content"][0]["text"], "sunny");
        assert_eq!(response["isError"], false);
    }

    #[test]
    fn structured_output_is_pretty_printed() {
        let response = HandlerOutput::Structured(json!({"temperature": 18.3}))
            .into_tool_response()
            .expect("conversion succeeds");

        let text = response["content"][0]["text"].as_str().expect("has text");
        assert!(text.contains("\"temperature\": 18.3"));
        // Pretty-printed, so the payload spans multiple lines.
        assert!(text.contains('\n'));
    }

    #[test]
    fn envelope_output_passes_through_unchanged() {
        let envelope = serde_json::to_value(CallToolResult {
            content: vec![ToolContent::Text {
                text: "Error retrieving weather: boom".to_string(),
            }],
            is_error: Some(true),
        })
        .expect("envelope serializes");

        let response = HandlerOutput::Envelope(envelope.clone())
            .into_tool_response()
            .expect("conversion succeeds");

        assert_eq!(response, envelope);
    }

    #[test]
    fn resource_responses_are_keyed_by_the_requested_uri() {
        let response = HandlerOutput::Text("report".to_string())
            .into_resource_response("currentweather://London")
            .expect("conversion succeeds");

        assert_eq!(response["contents"][0]["uri"], "currentweather://London");
        assert_eq!(response["contents"][0]["mimeType"], "text/plain");
        assert_eq!(response["contents"][0]["text"], "report");
    }

    #[test]
    fn structured_resource_responses_are_json() {
        let response = HandlerOutput::Structured(json!({"ok": true}))
            .into_resource_response("currentweather://London")
            .expect("conversion succeeds");

        assert_eq!(response["contents"][0]["mimeType"], "application/json");
    }
}

#[cfg(test)]
mod resource_template_tests {
    use crate::mcp::resources::{CURRENT_WEATHER_TEMPLATE, city_from_uri, template_matches};

    #[test]
    fn template_matching() {
        assert!(template_matches(
            CURRENT_WEATHER_TEMPLATE,
            "currentweather://London"
        ));
        assert!(template_matches(
            CURRENT_WEATHER_TEMPLATE,
            "currentweather://San%20Francisco"
        ));

        assert!(!template_matches(CURRENT_WEATHER_TEMPLATE, "currentweather://"));
        assert!(!template_matches(CURRENT_WEATHER_TEMPLATE, "tides://London"));
    }

    #[test]
    fn literal_templates_match_exactly() {
        assert!(template_matches("about://server", "about://server"));
        assert!(!template_matches("about://server", "about://other"));
    }

    #[test]
    fn city_extraction_percent_decodes() {
        assert_eq!(
            city_from_uri("currentweather://London").as_deref(),
            Some("London")
        );
        assert_eq!(
            city_from_uri("currentweather://San%20Francisco").as_deref(),
            Some("San Francisco")
        );
        assert_eq!(city_from_uri("currentweather://"), None);
        assert_eq!(city_from_uri("tides://London"), None);
    }
}
