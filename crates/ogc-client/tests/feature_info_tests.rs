//! Tests for WMS GetFeatureInfo point queries.

use std::sync::Arc;

use ogc_client::FeatureInfoClient;
use ogc_common::{InfoRow, LayerSource, OgcError, PropertyAllowList, ServiceType};
use test_utils::{assert_err_kind, endpoints, exceptions, feature_info, MockTransport};

#[tokio::test]
async fn test_vector_point_query() {
    let transport = Arc::new(MockTransport::new().respond("GetFeatureInfo", feature_info::WELLS));
    let client = FeatureInfoClient::new(transport.clone());
    let source = LayerSource::wms(endpoints::WMS, "wells")
        .with_title("Water wells")
        .with_allow_list(PropertyAllowList::parse("name,depth"));

    let rows = client.query(&source, -1.3, 36.8).await.unwrap();

    assert_eq!(
        rows,
        vec![
            InfoRow::attribute("Water wells", "name", "Kibera"),
            InfoRow::attribute("Water wells", "depth", "80"),
        ]
    );

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains("request=GetFeatureInfo"));
    assert!(calls[0].contains("query_layers=wells"));
    assert!(calls[0].contains("info_format=text%2Fxml"));
    assert!(calls[0].contains("propertyName=name%2Cdepth"));
}

#[tokio::test]
async fn test_point_queries_are_not_cached() {
    let transport = Arc::new(MockTransport::new().respond("GetFeatureInfo", feature_info::RASTER));
    let client = FeatureInfoClient::new(transport.clone());
    let source = LayerSource::wms(endpoints::WMS, "elevation");

    for _ in 0..2 {
        let rows = client.query(&source, 10.0, 20.0).await.unwrap();
        assert_eq!(rows, vec![InfoRow::raster("elevation", "1523.5")]);
    }
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn test_exception_report_surfaces() {
    let transport = Arc::new(
        MockTransport::new().respond("GetFeatureInfo", exceptions::LAYER_NOT_DEFINED),
    );
    let client = FeatureInfoClient::new(transport);
    let source = LayerSource::wms(endpoints::WMS, "roads");

    let err = client.query(&source, 0.0, 0.0).await.unwrap_err();
    assert_eq!(err.exception_records().map(<[_]>::len), Some(1));
}

#[tokio::test]
async fn test_http_error_and_wfs_source() {
    let transport = Arc::new(MockTransport::new().respond_status("GetFeatureInfo", 500, "oops"));
    let client = FeatureInfoClient::new(transport);

    assert_err_kind!(
        client
            .query(&LayerSource::wms(endpoints::WMS, "wells"), 0.0, 0.0)
            .await,
        "transport"
    );
    assert_eq!(
        client
            .query(&LayerSource::wfs(endpoints::WFS, "wells"), 0.0, 0.0)
            .await
            .unwrap_err(),
        OgcError::UnsupportedService(ServiceType::Wfs)
    );
}
