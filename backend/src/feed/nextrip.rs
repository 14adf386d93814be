//! NexTrip v2 route listing (`GET /nextripv2/routes`).

use crate::error::{EngineError, EngineResult};
use crate::models::RouteInfo;

/// Parse the JSON array returned by the NexTrip routes endpoint.
pub fn parse_routes(body: &[u8]) -> EngineResult<Vec<RouteInfo>> {
    serde_json::from_slice(body)
        .map_err(|e| EngineError::upstream(format!("Failed to parse routes: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_routes() {
        let body = br#"[
            {"route_id": "901", "agency_id": 0, "route_label": "METRO Blue Line"},
            {"route_id": "902", "agency_id": 0, "route_label": "METRO Green Line"},
            {"route_id": "2", "route_label": "Franklin Av - Riverside Av"}
        ]"#;

        let routes = parse_routes(body).unwrap();
        assert_eq!(routes.len(), 3);
        assert_eq!(routes[0].route_label, "METRO Blue Line");
        assert_eq!(routes[2].agency_id, 0);
    }

    #[test]
    fn test_malformed_routes_are_upstream_error() {
        let err = parse_routes(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, EngineError::UpstreamUnavailable(_)));
    }
}
