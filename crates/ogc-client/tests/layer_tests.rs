//! Tests for feature loading, legends and layer restyling.

use std::sync::Arc;

use ogc_client::{ClientConfig, FeatureClient, LayerEvent, ResponseCache, Session};
use ogc_common::{ExceptionRecord, LayerSource, OgcError, ServiceType};
use serde_json::json;
use test_utils::{
    assert_err_kind, endpoints, exceptions, feature_collection_json, geojson, legends,
    MockTransport,
};
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::broadcast::Receiver;

fn wells() -> LayerSource {
    LayerSource::wfs(endpoints::WFS, "wells").with_title("Water wells")
}

fn session(transport: &Arc<MockTransport>) -> Session {
    Session::new(ClientConfig::default(), transport.clone()).unwrap()
}

fn drain(rx: &mut Receiver<LayerEvent>) -> Vec<LayerEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return events,
            Err(TryRecvError::Lagged(_)) => continue,
        }
    }
}

// ============================================================================
// FeatureClient
// ============================================================================

#[tokio::test]
async fn test_get_feature_request_shape() {
    let transport = Arc::new(MockTransport::new().respond("GetFeature", geojson::WELLS));
    let session = session(&transport);
    let extra = vec![("maxFeatures".to_string(), "50".to_string())];

    let features = session
        .features()
        .load_features(&wells(), &extra)
        .await
        .unwrap();

    assert_eq!(features.len(), 3);
    assert_eq!(
        transport.calls(),
        vec![format!(
            "{}?service=WFS&version=1.1.0&request=GetFeature&typename=wells&outputformat=GeoJSON&maxFeatures=50",
            endpoints::WFS
        )]
    );
}

#[tokio::test]
async fn test_load_events_in_order() {
    let transport = Arc::new(MockTransport::new().respond("GetFeature", geojson::WELLS));
    let session = session(&transport);
    let mut rx = session.features().subscribe();

    session.features().load_features(&wells(), &[]).await.unwrap();

    assert_eq!(
        drain(&mut rx),
        vec![
            LayerEvent::Loading {
                layer: "wells".to_string()
            },
            LayerEvent::Loaded {
                layer: "wells".to_string(),
                count: 3
            },
        ]
    );
}

#[tokio::test]
async fn test_service_exception_scenario() {
    let transport = Arc::new(
        MockTransport::new().respond("GetFeature", exceptions::INVALID_PARAMETER),
    );
    let session = session(&transport);
    let mut rx = session.features().subscribe();

    let err = session
        .features()
        .load_features(&wells(), &[])
        .await
        .unwrap_err();

    let expected = OgcError::ServiceException(vec![ExceptionRecord::new(
        "bad layer",
        Some("InvalidParameterValue".to_string()),
    )]);
    assert_eq!(err, expected);

    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], LayerEvent::Loading { .. }));
    assert_eq!(
        events[1],
        LayerEvent::Failed {
            layer: "wells".to_string(),
            error: expected,
        }
    );
}

#[tokio::test]
async fn test_wms_source_is_unsupported() {
    let transport = Arc::new(MockTransport::new());
    let session = session(&transport);
    let mut rx = session.features().subscribe();

    let source = LayerSource::wms(endpoints::WMS, "elevation");
    let err = session
        .features()
        .load_features(&source, &[])
        .await
        .unwrap_err();

    assert_eq!(err, OgcError::UnsupportedService(ServiceType::Wms));
    assert_eq!(transport.call_count(), 0);
    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    assert!(events[1].is_terminal());
}

#[tokio::test]
async fn test_malformed_and_unparseable_bodies() {
    let transport = Arc::new(
        MockTransport::new()
            .respond("typename=a", geojson::NO_FEATURES_FIELD)
            .respond("typename=b", "<html>gateway timeout</html>"),
    );
    let session = session(&transport);

    let a = LayerSource::wfs(endpoints::WFS, "a");
    let b = LayerSource::wfs(endpoints::WFS, "b");
    assert_err_kind!(
        session.features().load_features(&a, &[]).await,
        "malformed_response"
    );
    assert_err_kind!(session.features().load_features(&b, &[]).await, "parse");
}

#[tokio::test]
async fn test_invalid_utf8_body_is_parse_error() {
    let mut body = br#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"name": "caf"#
        .to_vec();
    body.push(0xE9);
    body.extend_from_slice(br#""}, "geometry": null}]}"#);

    let transport = Arc::new(MockTransport::new().respond_bytes("GetFeature", body));
    let session = session(&transport);
    let mut rx = session.features().subscribe();

    assert_err_kind!(
        session.features().load_features(&wells(), &[]).await,
        "parse"
    );
    assert_eq!(
        session.features().get_property_names(),
        Err(OgcError::EmptyCollection)
    );
    assert!(matches!(
        drain(&mut rx).last(),
        Some(LayerEvent::Failed { .. })
    ));
}

#[tokio::test]
async fn test_invalid_utf8_legend_descriptor_is_parse_error() {
    let transport = Arc::new(
        MockTransport::new().respond_bytes("legends", vec![b'{', 0xFF, 0xFE, b'}']),
    );
    let session = session(&transport);
    let catalog = session.legend_catalog();

    assert_err_kind!(catalog.load_legends(endpoints::LEGENDS).await, "parse");
    assert!(!catalog.is_loaded());
}

#[tokio::test]
async fn test_property_names_follow_last_successful_load() {
    let transport = Arc::new(
        MockTransport::new()
            .respond("typename=wells", geojson::WELLS)
            .respond("typename=empty", geojson::EMPTY)
            .respond("typename=broken", exceptions::INVALID_PARAMETER),
    );
    let session = session(&transport);
    let client = session.features();

    assert_eq!(client.get_property_names(), Err(OgcError::EmptyCollection));

    client.load_features(&wells(), &[]).await.unwrap();
    assert_eq!(
        client.get_property_names().unwrap(),
        ["name", "depth", "status"]
    );

    // A failed load leaves the last successful one in place
    let broken = LayerSource::wfs(endpoints::WFS, "broken");
    assert!(client.load_features(&broken, &[]).await.is_err());
    assert_eq!(client.get_property_names().unwrap().len(), 3);

    let empty = LayerSource::wfs(endpoints::WFS, "empty");
    client.load_features(&empty, &[]).await.unwrap();
    assert_eq!(client.get_property_names(), Err(OgcError::EmptyCollection));
}

#[tokio::test]
async fn test_configured_wfs_version() {
    let transport = Arc::new(MockTransport::new().respond("GetFeature", geojson::EMPTY));
    let config = ClientConfig {
        wfs_version: "2.0.0".to_string(),
        ..ClientConfig::default()
    };
    let cache = Arc::new(ResponseCache::new("wfs-v2", transport.clone()));
    let client = FeatureClient::from_config(cache, &config);

    client.load_features(&wells(), &[]).await.unwrap();
    assert_eq!(transport.calls_matching("version=2.0.0"), 1);
}

// ============================================================================
// LegendCatalog
// ============================================================================

#[tokio::test]
async fn test_legends_loaded_through_cache() {
    let transport = Arc::new(MockTransport::new().respond("legends", legends::WELLS));
    let session = session(&transport);
    let catalog = session.legend_catalog();

    assert!(catalog.get_legend("depth").is_none());
    let loaded = catalog.load_legends(endpoints::LEGENDS).await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(catalog.get_legend("depth").unwrap().title, "Depth (m)");
    assert!(catalog.get_legend("name").is_none());

    // Second catalog for the same descriptor hits the shared cache
    session
        .legend_catalog()
        .load_legends(endpoints::LEGENDS)
        .await
        .unwrap();
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_unsorted_range_legend_rejected() {
    let descriptor = r##"{"legends": [{"property": "pop", "type": "range", "entries": [
        {"hi": 1000, "color": "yellow"}, {"hi": 100, "color": "green"}
    ]}]}"##;
    let transport = Arc::new(MockTransport::new().respond("legends", descriptor));
    let session = session(&transport);
    let catalog = session.legend_catalog();

    assert_err_kind!(
        catalog.load_legends(endpoints::LEGENDS).await,
        "invalid_legend"
    );
    assert!(!catalog.is_loaded());
}

// ============================================================================
// FilterableLayer
// ============================================================================

#[tokio::test]
async fn test_restyle_without_network() {
    let transport = Arc::new(
        MockTransport::new()
            .respond("GetFeature", geojson::WELLS)
            .respond("legends", legends::WELLS),
    );
    let session = session(&transport);
    let catalog = session.legend_catalog();
    catalog.load_legends(endpoints::LEGENDS).await.unwrap();

    let layer = session.layer(wells()).with_legends(catalog);
    layer.load(&[]).await.unwrap();
    let calls_after_load = transport.call_count();

    let mut rx = layer.subscribe();
    let styles = layer.set_active_property(Some("depth"));

    // The well without a depth is filtered out
    assert_eq!(styles.len(), 2);
    assert_eq!(styles.features[0].style.color, "#0000ff");
    assert_eq!(styles.features[0].tooltip.as_deref(), Some("depth: 40"));
    assert_eq!(styles.features[1].style.color, "#ff0000");
    assert_eq!(styles.features[1].popup.title, "Water wells");
    assert_eq!(transport.call_count(), calls_after_load);

    match drain(&mut rx).as_slice() {
        [LayerEvent::Restyled { layer, styles: sent }] => {
            assert_eq!(layer, "wells");
            assert_eq!(sent, &styles);
        }
        other => panic!("unexpected events: {:?}", other),
    }

    let by_status = layer.set_active_property(Some("status"));
    assert_eq!(by_status.len(), 3);
    assert_eq!(by_status.features[1].style.color, "#888888");
    assert_eq!(layer.active_property().as_deref(), Some("status"));
}

#[tokio::test]
async fn test_no_active_property_styles_everything_as_no_value() {
    let transport = Arc::new(MockTransport::new().respond("GetFeature", geojson::WELLS));
    let session = session(&transport);
    let layer = session.layer(wells());

    layer.load(&[]).await.unwrap();
    let styles = layer.styles();

    assert_eq!(styles.len(), 3);
    assert!(styles.features.iter().all(|f| f.style.radius == 2));
    assert!(styles.features.iter().all(|f| f.tooltip.is_none()));
}

#[tokio::test]
async fn test_property_without_legend_falls_back_to_no_data() {
    let body = feature_collection_json("pop", &[json!(0), json!(""), json!(12)]);
    let transport = Arc::new(MockTransport::new().respond("GetFeature", body));
    let session = session(&transport);
    let layer = session.layer(LayerSource::wfs(endpoints::WFS, "towns"));

    layer.load(&[]).await.unwrap();
    let styles = layer.set_active_property(Some("pop"));

    // 0 is a value, "" is not
    assert_eq!(styles.len(), 2);
    assert!(styles
        .features
        .iter()
        .all(|f| f.style.color == "gray" && f.style.radius == 4));
}

#[tokio::test]
async fn test_reload_bypasses_cache() {
    let transport = Arc::new(
        MockTransport::new()
            .respond("GetFeature", geojson::WELLS)
            .respond("GetFeature", geojson::EMPTY),
    );
    let session = session(&transport);
    let layer = session.layer(wells());

    assert_err_kind!(layer.reload().await, "not_loaded");

    assert_eq!(layer.load(&[]).await.unwrap(), 3);
    assert_eq!(layer.load(&[]).await.unwrap(), 3);
    assert_eq!(transport.call_count(), 1);

    assert_eq!(layer.reload().await.unwrap(), 0);
    assert_eq!(transport.call_count(), 2);
    assert_eq!(layer.feature_count(), 0);
}

#[tokio::test]
async fn test_failed_load_keeps_previous_features() {
    let transport = Arc::new(
        MockTransport::new()
            .respond("GetFeature", geojson::WELLS)
            .respond("GetFeature", exceptions::LAYER_NOT_DEFINED),
    );
    let session = session(&transport);
    let layer = session.layer(wells());

    layer.load(&[]).await.unwrap();
    assert_err_kind!(layer.reload().await, "service_exception");
    assert_eq!(layer.feature_count(), 3);
    assert_eq!(layer.redraw().len(), 3);
}

#[tokio::test]
async fn test_default_legend_from_loaded_values() {
    let values: Vec<_> = (0..8).map(|v| json!(v * 10)).collect();
    let body = feature_collection_json("pop", &values);
    let transport = Arc::new(MockTransport::new().respond("GetFeature", body));
    let session = session(&transport);
    let layer = session
        .layer(LayerSource::wfs(endpoints::WFS, "towns"))
        .with_default_legends();

    layer.load(&[]).await.unwrap();
    let styles = layer.set_active_property(Some("pop"));

    assert_eq!(styles.len(), 8);
    assert_eq!(styles.features[0].style.color, "#0000ff");
    assert_eq!(styles.features[7].style.color, "#ff0000");
}
