//! GTFS-realtime adapter for the Metro Transit feeds.
//!
//! Decoding is split from fetching: the `decode_*` functions turn a raw
//! protobuf body into domain records and are what the tests exercise.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gtfs_rt::{FeedEntity, FeedMessage, TranslatedString};
use log::debug;
use prost::Message;
use std::time::Duration;

use super::nextrip;
use super::TransitFeed;
use crate::config::FeedConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{RouteInfo, ServiceAlert, TripUpdateSummary, VehicleId, VehicleReport};

/// HTTP client for the GTFS-realtime and NexTrip endpoints.
#[derive(Debug, Clone)]
pub struct GtfsRealtimeClient {
    http: reqwest::Client,
    config: FeedConfig,
}

impl GtfsRealtimeClient {
    /// Build a client with the configured request timeout.
    ///
    /// # Errors
    /// `Configuration` if the TLS backend cannot be initialised.
    pub fn new(config: FeedConfig) -> EngineResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EngineError::configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    async fn fetch_bytes(&self, url: &str) -> EngineResult<Vec<u8>> {
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        debug!("fetched {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}

#[async_trait]
impl TransitFeed for GtfsRealtimeClient {
    async fn fetch_vehicle_positions(&self) -> EngineResult<Vec<VehicleReport>> {
        let body = self.fetch_bytes(&self.config.vehicle_positions_url).await?;
        decode_vehicle_positions(&body)
    }

    async fn fetch_trip_updates(&self) -> EngineResult<Vec<TripUpdateSummary>> {
        let body = self.fetch_bytes(&self.config.trip_updates_url).await?;
        decode_trip_updates(&body)
    }

    async fn fetch_alerts(&self) -> EngineResult<Vec<ServiceAlert>> {
        let body = self.fetch_bytes(&self.config.alerts_url).await?;
        decode_alerts(&body)
    }

    async fn fetch_routes(&self) -> EngineResult<Vec<RouteInfo>> {
        let body = self.fetch_bytes(&self.config.routes_url).await?;
        nextrip::parse_routes(&body)
    }
}

fn timestamp(secs: u64) -> Option<DateTime<Utc>> {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

fn first_translation(text: Option<&TranslatedString>) -> Option<String> {
    text.and_then(|t| t.translation.first())
        .map(|t| t.text.clone())
}

/// Decode a vehicle positions feed.
///
/// Entities without a vehicle or without a position are skipped. The report
/// time falls back to the feed header time, then to now.
pub fn decode_vehicle_positions(body: &[u8]) -> EngineResult<Vec<VehicleReport>> {
    let feed = FeedMessage::decode(body)?;
    let feed_time = feed.header.timestamp.and_then(timestamp);

    let reports = feed
        .entity
        .into_iter()
        .filter_map(|entity| vehicle_report(entity, feed_time))
        .collect();
    Ok(reports)
}

fn vehicle_report(entity: FeedEntity, feed_time: Option<DateTime<Utc>>) -> Option<VehicleReport> {
    let vehicle = entity.vehicle?;
    let position = vehicle.position?;

    let vehicle_id = vehicle
        .vehicle
        .as_ref()
        .and_then(|v| v.id.clone())
        .unwrap_or(entity.id);
    let (route_id, trip_id) = match vehicle.trip {
        Some(trip) => (trip.route_id.unwrap_or_default(), trip.trip_id),
        None => (String::new(), None),
    };

    Some(VehicleReport {
        vehicle_id: VehicleId::new(vehicle_id),
        route_id,
        trip_id,
        latitude: f64::from(position.latitude),
        longitude: f64::from(position.longitude),
        speed: position.speed,
        timestamp: vehicle
            .timestamp
            .and_then(timestamp)
            .or(feed_time)
            .unwrap_or_else(Utc::now),
    })
}

/// Decode a trip updates feed, keeping the first stop-time update of each trip.
pub fn decode_trip_updates(body: &[u8]) -> EngineResult<Vec<TripUpdateSummary>> {
    let feed = FeedMessage::decode(body)?;

    let updates = feed
        .entity
        .into_iter()
        .filter_map(|entity| entity.trip_update)
        .map(|update| {
            let relationship = update.trip.schedule_relationship().as_str_name().to_string();
            let first_stop = update.stop_time_update.first();
            let event_time = |event: Option<&gtfs_rt::trip_update::StopTimeEvent>| {
                event
                    .and_then(|e| e.time)
                    .and_then(|t| DateTime::from_timestamp(t, 0))
            };

            TripUpdateSummary {
                trip_id: update.trip.trip_id.clone().unwrap_or_default(),
                route_id: update.trip.route_id.clone(),
                schedule_relationship: relationship,
                stop_id: first_stop.and_then(|s| s.stop_id.clone()),
                arrival: event_time(first_stop.and_then(|s| s.arrival.as_ref())),
                departure: event_time(first_stop.and_then(|s| s.departure.as_ref())),
            }
        })
        .collect();
    Ok(updates)
}

/// Decode a service alerts feed.
pub fn decode_alerts(body: &[u8]) -> EngineResult<Vec<ServiceAlert>> {
    let feed = FeedMessage::decode(body)?;

    let alerts = feed
        .entity
        .into_iter()
        .filter_map(|entity| entity.alert.map(|alert| (entity.id, alert)))
        .map(|(id, alert)| ServiceAlert {
            id,
            header: first_translation(alert.header_text.as_ref())
                .unwrap_or_else(|| "No header".to_string()),
            description: first_translation(alert.description_text.as_ref())
                .unwrap_or_else(|| "No description".to_string()),
            effect: alert.effect().as_str_name().to_string(),
            cause: alert.cause().as_str_name().to_string(),
            affected_routes: alert
                .informed_entity
                .iter()
                .filter_map(|e| e.route_id.clone())
                .filter(|r| !r.is_empty())
                .collect(),
        })
        .collect();
    Ok(alerts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtfs_rt::translated_string::Translation;
    use gtfs_rt::trip_update::{StopTimeEvent, StopTimeUpdate};
    use gtfs_rt::{
        Alert, EntitySelector, FeedHeader, Position, TripDescriptor, TripUpdate,
        VehicleDescriptor, VehiclePosition,
    };

    fn feed(entities: Vec<FeedEntity>) -> Vec<u8> {
        FeedMessage {
            header: FeedHeader {
                gtfs_realtime_version: "2.0".to_string(),
                timestamp: Some(1_700_000_000),
                ..Default::default()
            },
            entity: entities,
        }
        .encode_to_vec()
    }

    fn vehicle_entity(id: &str, route: &str, lat: f32, lon: f32, ts: Option<u64>) -> FeedEntity {
        FeedEntity {
            id: format!("entity-{}", id),
            vehicle: Some(VehiclePosition {
                trip: Some(TripDescriptor {
                    trip_id: Some(format!("trip-{}", id)),
                    route_id: Some(route.to_string()),
                    ..Default::default()
                }),
                vehicle: Some(VehicleDescriptor {
                    id: Some(id.to_string()),
                    ..Default::default()
                }),
                position: Some(Position {
                    latitude: lat,
                    longitude: lon,
                    speed: Some(12.5),
                    ..Default::default()
                }),
                timestamp: ts,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn text(s: &str) -> TranslatedString {
        TranslatedString {
            translation: vec![Translation {
                text: s.to_string(),
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_decode_vehicle_positions() {
        let body = feed(vec![
            vehicle_entity("1101", "901", 44.9748, -93.2592, Some(1_700_000_123)),
            vehicle_entity("1102", "902", 44.9467, -93.1018, None),
        ]);

        let vehicles = decode_vehicle_positions(&body).unwrap();
        assert_eq!(vehicles.len(), 2);

        let first = &vehicles[0];
        assert_eq!(first.vehicle_id.as_str(), "1101");
        assert_eq!(first.route_id, "901");
        assert_eq!(first.trip_id.as_deref(), Some("trip-1101"));
        assert!((first.latitude - 44.9748).abs() < 1e-4);
        assert_eq!(first.speed, Some(12.5));
        assert_eq!(first.timestamp.timestamp(), 1_700_000_123);

        // Falls back to the header timestamp
        assert_eq!(vehicles[1].timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_entities_without_position_are_skipped() {
        let mut no_position = vehicle_entity("7", "901", 0.0, 0.0, None);
        if let Some(vehicle) = no_position.vehicle.as_mut() {
            vehicle.position = None;
        }
        let alert_only = FeedEntity {
            id: "alert".to_string(),
            alert: Some(Alert::default()),
            ..Default::default()
        };
        let body = feed(vec![no_position, alert_only, vehicle_entity("8", "901", 45.0, -93.0, None)]);

        let vehicles = decode_vehicle_positions(&body).unwrap();
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].vehicle_id.as_str(), "8");
    }

    #[test]
    fn test_missing_vehicle_descriptor_uses_entity_id() {
        let mut entity = vehicle_entity("9", "902", 44.95, -93.1, None);
        if let Some(vehicle) = entity.vehicle.as_mut() {
            vehicle.vehicle = None;
        }
        let vehicles = decode_vehicle_positions(&feed(vec![entity])).unwrap();
        assert_eq!(vehicles[0].vehicle_id.as_str(), "entity-9");
    }

    #[test]
    fn test_garbage_body_is_upstream_error() {
        let err = decode_vehicle_positions(&[0xff, 0xff, 0xff, 0xff]).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_decode_trip_updates_first_stop() {
        let update = FeedEntity {
            id: "tu-1".to_string(),
            trip_update: Some(TripUpdate {
                trip: TripDescriptor {
                    trip_id: Some("T100".to_string()),
                    route_id: Some("901".to_string()),
                    ..Default::default()
                },
                stop_time_update: vec![
                    StopTimeUpdate {
                        stop_id: Some("51405".to_string()),
                        arrival: Some(StopTimeEvent {
                            time: Some(1_700_000_600),
                            ..Default::default()
                        }),
                        ..Default::default()
                    },
                    StopTimeUpdate {
                        stop_id: Some("51408".to_string()),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }),
            ..Default::default()
        };

        let updates = decode_trip_updates(&feed(vec![update])).unwrap();
        assert_eq!(updates.len(), 1);
        let summary = &updates[0];
        assert_eq!(summary.trip_id, "T100");
        assert_eq!(summary.route_id.as_deref(), Some("901"));
        assert_eq!(summary.schedule_relationship, "SCHEDULED");
        assert_eq!(summary.stop_id.as_deref(), Some("51405"));
        assert_eq!(summary.arrival.map(|t| t.timestamp()), Some(1_700_000_600));
        assert_eq!(summary.departure, None);
    }

    #[test]
    fn test_trip_update_without_stops() {
        let update = FeedEntity {
            id: "tu-2".to_string(),
            trip_update: Some(TripUpdate::default()),
            ..Default::default()
        };
        let updates = decode_trip_updates(&feed(vec![update])).unwrap();
        assert_eq!(updates[0].stop_id, None);
        assert_eq!(updates[0].arrival, None);
    }

    #[test]
    fn test_decode_alerts() {
        let alert = FeedEntity {
            id: "A1".to_string(),
            alert: Some(Alert {
                header_text: Some(text("Blue Line delays")),
                description_text: Some(text("Single tracking near 38th St")),
                informed_entity: vec![
                    EntitySelector {
                        route_id: Some("901".to_string()),
                        ..Default::default()
                    },
                    EntitySelector {
                        stop_id: Some("51405".to_string()),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }),
            ..Default::default()
        };

        let alerts = decode_alerts(&feed(vec![alert])).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].id, "A1");
        assert_eq!(alerts[0].header, "Blue Line delays");
        assert_eq!(alerts[0].description, "Single tracking near 38th St");
        assert_eq!(alerts[0].affected_routes, vec!["901".to_string()]);
        assert_eq!(alerts[0].effect, "UNKNOWN_EFFECT");
        assert_eq!(alerts[0].cause, "UNKNOWN_CAUSE");
    }

    #[test]
    fn test_alert_text_defaults() {
        let alert = FeedEntity {
            id: "A2".to_string(),
            alert: Some(Alert::default()),
            ..Default::default()
        };
        let alerts = decode_alerts(&feed(vec![alert])).unwrap();
        assert_eq!(alerts[0].header, "No header");
        assert_eq!(alerts[0].description, "No description");
        assert!(alerts[0].affected_routes.is_empty());
    }
}
